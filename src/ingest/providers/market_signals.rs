use async_trait::async_trait;
use metrics::counter;
use reqwest::Client;

use super::nse_bulk::NseDealReports;
use super::nse_insider::NseInsiderTrades;
use super::yahoo_news::YahooNews;
use crate::config::{ScanConfig, Timeouts};
use crate::ingest::types::SignalSources;
use crate::outcome::Outcome;

/// Live corroboration sources: exchange deal reports, headline search and
/// insider disclosures. Build one per run so the deal-report cache is fresh.
pub struct MarketSignals {
    deals: NseDealReports,
    news: YahooNews,
    insider: NseInsiderTrades,
}

impl MarketSignals {
    pub fn new(client: Client, cfg: &ScanConfig) -> Self {
        let t = &cfg.timeouts;
        Self {
            deals: NseDealReports::new(client.clone(), Timeouts::of(t.bulk_deal_secs)),
            news: YahooNews::new(client.clone(), Timeouts::of(t.news_secs), cfg.news_count),
            insider: NseInsiderTrades::new(
                client,
                Timeouts::of(t.insider_secs),
                cfg.insider_window_days,
            ),
        }
    }
}

fn log_failure(signal: &'static str, symbol: &str, out: &Outcome<bool>) {
    if let Outcome::Failed(reason) = out {
        tracing::warn!(signal, symbol, reason = %reason, "corroboration check failed");
        counter!("provider_errors_total", "provider" => signal).increment(1);
    }
}

#[async_trait]
impl SignalSources for MarketSignals {
    async fn bulk_deal(&self, symbol: &str) -> Outcome<bool> {
        let out = self.deals.contains(symbol).await;
        log_failure("bulk_deal", symbol, &out);
        out
    }

    async fn positive_news(&self, symbol: &str) -> Outcome<bool> {
        let out = self.news.has_positive(symbol).await;
        log_failure("positive_news", symbol, &out);
        out
    }

    async fn insider_buying(&self, symbol: &str) -> Outcome<bool> {
        let out = self.insider.has_buying(symbol).await;
        log_failure("insider_buying", symbol, &out);
        out
    }
}
