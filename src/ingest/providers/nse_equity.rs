// src/ingest/providers/nse_equity.rs
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use metrics::counter;
use reqwest::Client;
use std::time::Duration;

use super::{column_index, csv_reader};
use crate::ingest::http::fetch_bytes;
use crate::ingest::types::{ListedSymbol, ListingRow, UniverseProvider};
use crate::ingest::{exchange_today, normalize_universe};
use crate::outcome::Outcome;

pub const EQUITY_LIST_URL: &str = "https://archives.nseindia.com/content/equities/EQUITY_L.csv";

/// Parse the exchange's equity master CSV into raw rows.
/// Required columns: SYMBOL, SERIES, DATE OF LISTING.
pub fn parse_equity_csv(data: &[u8]) -> Result<Vec<ListingRow>> {
    let mut rdr = csv_reader(data);
    let headers = rdr.headers().context("equity list headers")?.clone();
    let i_sym = column_index(&headers, "SYMBOL")?;
    let i_series = column_index(&headers, "SERIES")?;
    let i_date = column_index(&headers, "DATE OF LISTING")?;

    let mut out = Vec::new();
    for rec in rdr.records() {
        // A torn line drops only itself.
        let Ok(rec) = rec else { continue };
        let field = |i: usize| rec.get(i).unwrap_or_default().to_string();
        out.push(ListingRow {
            symbol: field(i_sym),
            series: field(i_series),
            listing_date: field(i_date),
        });
    }
    Ok(out)
}

enum Mode {
    Fixture(Vec<u8>),
    Http { client: Client, url: String },
}

/// Universe of recent listings from the exchange equity master.
pub struct NseEquityList {
    mode: Mode,
    timeout: Duration,
    today: Option<NaiveDate>,
}

impl NseEquityList {
    pub fn new(client: Client, timeout: Duration) -> Self {
        Self {
            mode: Mode::Http {
                client,
                url: EQUITY_LIST_URL.to_string(),
            },
            timeout,
            today: None,
        }
    }

    pub fn from_fixture_str(s: &str) -> Self {
        Self {
            mode: Mode::Fixture(s.as_bytes().to_vec()),
            timeout: Duration::from_secs(1),
            today: None,
        }
    }

    /// Pin "today" (tests); defaults to the exchange calendar date.
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    async fn load(&self, window_days: u32) -> Result<Vec<ListedSymbol>> {
        let rows = match &self.mode {
            Mode::Fixture(b) => parse_equity_csv(b)?,
            Mode::Http { client, url } => {
                let body = fetch_bytes(client, url, self.timeout).await?;
                parse_equity_csv(&body)?
            }
        };
        let today = self.today.unwrap_or_else(exchange_today);
        let (kept, unparseable) = normalize_universe(rows, today, window_days);
        if unparseable > 0 {
            tracing::debug!(unparseable, "dropped listing rows with unparseable dates");
        }
        Ok(kept)
    }
}

#[async_trait]
impl UniverseProvider for NseEquityList {
    async fn recent_listings(&self, window_days: u32) -> Outcome<Vec<ListedSymbol>> {
        let res = self.load(window_days).await;
        if let Err(e) = &res {
            tracing::warn!(error = ?e, provider = self.name(), "universe fetch failed");
            counter!("provider_errors_total", "provider" => self.name()).increment(1);
        }
        Outcome::from_result(res)
    }

    fn name(&self) -> &'static str {
        "nse-equity-list"
    }
}
