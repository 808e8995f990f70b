// src/ingest/types.rs
use chrono::NaiveDate;

use crate::history::PriceHistory;
use crate::outcome::Outcome;

/// One row of the listed-securities master after normalization.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
pub struct ListedSymbol {
    pub symbol: String,
    pub listing_date: NaiveDate,
}

/// Raw, unparsed listing row as published by the exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingRow {
    pub symbol: String,
    pub series: String,
    pub listing_date: String,
}

#[async_trait::async_trait]
pub trait UniverseProvider: Send + Sync {
    /// Symbols listed within the trailing `window_days`, earliest listing first.
    async fn recent_listings(&self, window_days: u32) -> Outcome<Vec<ListedSymbol>>;
    fn name(&self) -> &'static str;
}

#[async_trait::async_trait]
pub trait HistoryStore: Send + Sync {
    /// Full daily history, or `Absent` when the feed has nothing for the symbol.
    async fn history(&self, symbol: &str) -> Outcome<PriceHistory>;
    fn name(&self) -> &'static str;
}

/// Corroboration lookups. Each is independent; `Failed`/`Absent` read as false.
#[async_trait::async_trait]
pub trait SignalSources: Send + Sync {
    async fn bulk_deal(&self, symbol: &str) -> Outcome<bool>;
    async fn positive_news(&self, symbol: &str) -> Outcome<bool>;
    async fn insider_buying(&self, symbol: &str) -> Outcome<bool>;
}
