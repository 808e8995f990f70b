//! # Scan orchestration
//! One batch sweep over the recent-listings universe:
//! `FetchUniverse → per symbol { FetchHistory → VolumeGate? → ATH → RecencyGate
//! → Corroboration → Decide → Notify? }`.
//!
//! Every per-symbol failure ends that symbol's iteration only; nothing here
//! aborts the run.

use chrono::NaiveDate;
use metrics::{counter, describe_counter};
use once_cell::sync::OnceCell;
use tracing::{debug, info, warn};

use crate::ath::{self, MIN_BARS_SINCE_ATH};
use crate::config::ScanConfig;
use crate::decision::{CorroborationSignals, ScanDecision};
use crate::engine::SignalAggregator;
use crate::ingest::types::{HistoryStore, SignalSources, UniverseProvider};
use crate::notify::{render_alert, Notifier};
use crate::outcome::Outcome;
use crate::volume::{self, MIN_VOLUME_BARS};

fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("scan_symbols_total", "Symbols taken from the universe.");
        describe_counter!("scan_skipped_total", "Symbols dropped before a decision.");
        describe_counter!("scan_alerts_total", "Alerts handed to the notifier.");
        describe_counter!(
            "scan_signal_failures_total",
            "Corroboration lookups that failed and read as false."
        );
    });
}

/// Why a symbol left the pipeline before a decision.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SkipReason {
    #[error("no price history")]
    NoHistory,
    #[error("history fetch failed: {0}")]
    HistoryFailed(String),
    #[error("{bars} bars, volume gate needs {min}", min = MIN_VOLUME_BARS)]
    InsufficientBars { bars: usize },
    #[error("no volume spike (vol {latest}, avg2 {prior_avg:.0})")]
    NoVolumeSpike { latest: u64, prior_avg: f64 },
    #[error("ATH unavailable")]
    AthUnavailable,
    #[error("ATH too recent ({sessions} sessions since, need {min})", min = MIN_BARS_SINCE_ATH)]
    AthTooRecent { sessions: usize },
}

#[derive(Debug, Clone, PartialEq)]
pub enum SymbolOutcome {
    Skipped { symbol: String, reason: SkipReason },
    Decided(ScanDecision),
}

/// Summary of one sweep; the process itself exits 0 regardless.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScanReport {
    pub universe_failed: bool,
    pub scanned: usize,
    pub skipped: Vec<(String, SkipReason)>,
    pub decisions: Vec<ScanDecision>,
}

impl ScanReport {
    pub fn alerts(&self) -> impl Iterator<Item = &ScanDecision> {
        self.decisions.iter().filter(|d| d.should_alert)
    }

    pub fn alert_count(&self) -> usize {
        self.alerts().count()
    }
}

/// Collapse a signal lookup to a bool, counting failures.
fn signal(name: &'static str, symbol: &str, out: Outcome<bool>) -> bool {
    if out.is_failed() {
        debug!(signal = name, symbol, "signal unavailable, reading as false");
        counter!("scan_signal_failures_total", "signal" => name).increment(1);
    }
    out.as_signal()
}

pub struct Scanner {
    cfg: ScanConfig,
    universe: Box<dyn UniverseProvider>,
    history: Box<dyn HistoryStore>,
    signals: Box<dyn SignalSources>,
    notifier: Box<dyn Notifier>,
}

impl Scanner {
    pub fn new(
        cfg: ScanConfig,
        universe: Box<dyn UniverseProvider>,
        history: Box<dyn HistoryStore>,
        signals: Box<dyn SignalSources>,
        notifier: Box<dyn Notifier>,
    ) -> Self {
        Self {
            cfg,
            universe,
            history,
            signals,
            notifier,
        }
    }

    pub fn config(&self) -> &ScanConfig {
        &self.cfg
    }

    fn aggregator(&self) -> SignalAggregator {
        SignalAggregator::new(self.cfg.threshold, self.cfg.require_corroboration)
    }

    async fn corroborate(&self, symbol: &str) -> CorroborationSignals {
        let (bulk, news, insider) = tokio::join!(
            self.signals.bulk_deal(symbol),
            self.signals.positive_news(symbol),
            self.signals.insider_buying(symbol),
        );
        CorroborationSignals {
            bulk_deal: signal("bulk_deal", symbol, bulk),
            positive_news: signal("positive_news", symbol, news),
            insider_buying: signal("insider_buying", symbol, insider),
        }
    }

    /// Run one symbol's pipeline up to (not including) notification.
    pub async fn evaluate_symbol(
        &self,
        symbol: &str,
        listing_date: Option<NaiveDate>,
    ) -> SymbolOutcome {
        let skip = |reason: SkipReason| SymbolOutcome::Skipped {
            symbol: symbol.to_string(),
            reason,
        };

        let history = match self.history.history(symbol).await {
            Outcome::Ok(h) if !h.is_empty() => h,
            Outcome::Ok(_) | Outcome::Absent => return skip(SkipReason::NoHistory),
            Outcome::Failed(r) => return skip(SkipReason::HistoryFailed(r)),
        };

        let spike = if self.cfg.enable_volume_gate {
            let Some(v) = volume::volume_spike(&history) else {
                return skip(SkipReason::InsufficientBars {
                    bars: history.len(),
                });
            };
            if !v.is_spike() {
                return skip(SkipReason::NoVolumeSpike {
                    latest: v.latest,
                    prior_avg: v.prior_avg,
                });
            }
            Some(v)
        } else {
            None
        };

        let Some(ath) = ath::evaluate(&history) else {
            return skip(SkipReason::AthUnavailable);
        };
        if !ath.is_recency_eligible() {
            return skip(SkipReason::AthTooRecent {
                sessions: ath.bars_since_ath,
            });
        }

        let signals = self.corroborate(symbol).await;

        match self.aggregator().decide(symbol, &history, &ath, signals) {
            Some(d) => SymbolOutcome::Decided(
                d.with_volume(spike)
                    .with_listing_date(listing_date.or_else(|| history.first().map(|b| b.date))),
            ),
            None => skip(SkipReason::NoHistory),
        }
    }

    /// Full sweep. Alerts are delivered as they are decided.
    pub async fn run(&self) -> ScanReport {
        ensure_metrics_described();
        let mut report = ScanReport::default();

        info!(
            window_days = self.cfg.listing_window_days,
            threshold = self.cfg.threshold,
            volume_gate = self.cfg.enable_volume_gate,
            require_corroboration = self.cfg.require_corroboration,
            provider = self.universe.name(),
            "Fetching recent listings..."
        );

        let listings = match self.universe.recent_listings(self.cfg.listing_window_days).await {
            Outcome::Ok(v) => v,
            Outcome::Absent => Vec::new(),
            Outcome::Failed(reason) => {
                warn!(%reason, "universe unavailable; nothing to scan");
                report.universe_failed = true;
                return report;
            }
        };

        let symbols: Vec<&str> = listings.iter().map(|l| l.symbol.as_str()).collect();
        info!(count = listings.len(), symbols = ?symbols, "found recent listings");

        for listed in &listings {
            let sym = listed.symbol.as_str();
            info!(symbol = sym, "checking");
            report.scanned += 1;
            counter!("scan_symbols_total").increment(1);

            match self.evaluate_symbol(sym, Some(listed.listing_date)).await {
                SymbolOutcome::Skipped { symbol, reason } => {
                    info!(symbol = %symbol, reason = %reason, "skipped");
                    counter!("scan_skipped_total").increment(1);
                    report.skipped.push((symbol, reason));
                }
                SymbolOutcome::Decided(d) => {
                    if d.should_alert {
                        info!(symbol = sym, distance_pct = d.distance_pct, "ALERT");
                        counter!("scan_alerts_total").increment(1);
                        if let Err(e) = self.notifier.send(&render_alert(&d)).await {
                            warn!(symbol = sym, error = %format!("{e:#}"), "alert delivery failed");
                        }
                    } else {
                        info!(
                            symbol = sym,
                            distance_pct = d.distance_pct,
                            near_ath = d.near_ath,
                            "not near ATH"
                        );
                    }
                    report.decisions.push(d);
                }
            }
        }

        info!(
            scanned = report.scanned,
            skipped = report.skipped.len(),
            alerts = report.alert_count(),
            "Scan complete"
        );
        report
    }
}
