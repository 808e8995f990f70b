//! # Signal aggregation
//! Pure, testable logic that maps `(history, ath, corroboration)` → `ScanDecision`.
//! No I/O, suitable for unit tests and offline evaluation.
//!
//! Policy: the alert fires on price proximity alone (latest close within
//! `threshold` below the ATH, inclusive). Corroboration signals are reported
//! alongside; they only gate the alert when `require_corroboration` is set.

use crate::ath::AthResult;
use crate::decision::{CorroborationSignals, ScanDecision};
use crate::history::PriceHistory;

pub const DEFAULT_THRESHOLD: f64 = 0.03;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignalAggregator {
    pub threshold: f64,
    /// AND the proximity rule with "at least one corroboration signal".
    pub require_corroboration: bool,
}

impl Default for SignalAggregator {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            require_corroboration: false,
        }
    }
}

impl SignalAggregator {
    pub fn new(threshold: f64, require_corroboration: bool) -> Self {
        Self {
            threshold,
            require_corroboration,
        }
    }

    /// `None` only when the history has no bars to read a close from.
    pub fn decide(
        &self,
        symbol: &str,
        history: &PriceHistory,
        ath: &AthResult,
        signals: CorroborationSignals,
    ) -> Option<ScanDecision> {
        let current_price = history.latest()?.close;
        let near = near_ath(current_price, ath.ath_price, self.threshold);
        let should_alert = near && (!self.require_corroboration || signals.any());

        Some(ScanDecision {
            symbol: symbol.to_string(),
            current_price,
            ath: *ath,
            distance_pct: distance_pct(ath.ath_price, current_price),
            signals,
            near_ath: near,
            should_alert,
            listing_date: history.first().map(|b| b.date),
            volume: None,
        })
    }
}

/// Annotation-only decision with an explicit threshold.
pub fn decide(
    symbol: &str,
    history: &PriceHistory,
    ath: &AthResult,
    signals: CorroborationSignals,
    threshold: f64,
) -> Option<ScanDecision> {
    SignalAggregator::new(threshold, false).decide(symbol, history, ath, signals)
}

/// Inclusive lower bound: `current >= ath * (1 - threshold)`.
pub fn near_ath(current: f64, ath_price: f64, threshold: f64) -> bool {
    current >= ath_price * (1.0 - threshold)
}

/// `(ath - current) / ath * 100`, rounded to 2 dp. A close above the recorded
/// high (bad print) reads as 0.
pub fn distance_pct(ath_price: f64, current: f64) -> f64 {
    if ath_price <= 0.0 {
        return 0.0;
    }
    round2(((ath_price - current) / ath_price * 100.0).max(0.0))
}

pub fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}
