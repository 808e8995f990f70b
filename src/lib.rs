// src/lib.rs
// Public library surface for the binary, integration tests and reuse.

pub mod ath;
pub mod config;
pub mod decision;
pub mod engine;
pub mod history;
pub mod outcome;
pub mod sentiment;
pub mod volume;

// External collaborators: universe, price history, corroboration feeds
pub mod ingest;

// Alert delivery
pub mod notify;

// Per-run orchestration
pub mod scanner;

// ---- Re-exports for stable public API ----
pub use crate::config::ScanConfig;
pub use crate::decision::{CorroborationSignals, ScanDecision};
pub use crate::notify::{Notifier, NotifierMux};
pub use crate::outcome::Outcome;
pub use crate::scanner::{ScanReport, Scanner, SkipReason, SymbolOutcome};

use crate::config::Timeouts;
use crate::ingest::http::build_client;
use crate::ingest::providers::{
    market_signals::MarketSignals, nse_equity::NseEquityList, yahoo_chart::YahooChart,
};

/// Wire the live exchange/quote providers and configured notifiers.
pub fn live_scanner(cfg: ScanConfig) -> anyhow::Result<Scanner> {
    let client = build_client()?;
    let t = cfg.timeouts;
    let universe = NseEquityList::new(client.clone(), Timeouts::of(t.universe_secs));
    let history = YahooChart::new(client.clone(), Timeouts::of(t.history_secs));
    let signals = MarketSignals::new(client.clone(), &cfg);
    let notifier = NotifierMux::from_config(client, &cfg);
    Ok(Scanner::new(
        cfg,
        Box::new(universe),
        Box::new(history),
        Box::new(signals),
        Box::new(notifier),
    ))
}
