// src/ingest/providers/nse_bulk.rs
use anyhow::{Context, Result};
use reqwest::Client;
use std::collections::HashSet;
use std::time::Duration;
use tokio::sync::OnceCell;

use super::{column_index, csv_reader};
use crate::ingest::http::fetch_bytes;
use crate::outcome::Outcome;

pub const BULK_DEALS_URL: &str = "https://archives.nseindia.com/content/equities/bulk.csv";
pub const BLOCK_DEALS_URL: &str = "https://archives.nseindia.com/content/equities/block.csv";

/// Upper-cased symbols appearing in a daily deals report.
pub fn parse_deal_symbols(data: &[u8]) -> Result<HashSet<String>> {
    let mut rdr = csv_reader(data);
    let headers = rdr.headers().context("deals report headers")?.clone();
    let i_sym = column_index(&headers, "SYMBOL")?;
    Ok(rdr
        .records()
        .filter_map(|r| r.ok())
        .filter_map(|r| r.get(i_sym).map(|s| s.trim().to_ascii_uppercase()))
        .filter(|s| !s.is_empty())
        .collect())
}

enum Mode {
    Fixture(HashSet<String>),
    Http { client: Client, urls: Vec<String> },
}

/// Today's bulk/block deal participants. The reports are fetched once per
/// run on first use and shared by every symbol lookup after that.
pub struct NseDealReports {
    mode: Mode,
    timeout: Duration,
    cache: OnceCell<Result<HashSet<String>, String>>,
}

impl NseDealReports {
    pub fn new(client: Client, timeout: Duration) -> Self {
        Self {
            mode: Mode::Http {
                client,
                urls: vec![BULK_DEALS_URL.to_string(), BLOCK_DEALS_URL.to_string()],
            },
            timeout,
            cache: OnceCell::new(),
        }
    }

    /// Replace the report URLs (mirror host, tests). Fixture mode is unchanged.
    pub fn with_urls(mut self, report_urls: Vec<String>) -> Self {
        if let Mode::Http { urls, .. } = &mut self.mode {
            *urls = report_urls;
        }
        self
    }

    pub fn from_fixture_str(s: &str) -> Result<Self> {
        Ok(Self {
            mode: Mode::Fixture(parse_deal_symbols(s.as_bytes())?),
            timeout: Duration::from_secs(1),
            cache: OnceCell::new(),
        })
    }

    /// Union over all reports. One unreachable report still lets the
    /// others answer; only a total failure is a failure.
    async fn load(&self) -> Result<HashSet<String>, String> {
        match &self.mode {
            Mode::Fixture(set) => Ok(set.clone()),
            Mode::Http { client, urls } => {
                let mut all = HashSet::new();
                let mut errors = Vec::new();
                for url in urls {
                    let res = match fetch_bytes(client, url, self.timeout).await {
                        Ok(body) => parse_deal_symbols(&body),
                        Err(e) => Err(e),
                    };
                    match res {
                        Ok(set) => all.extend(set),
                        Err(e) => {
                            tracing::warn!(error = ?e, url = %url, "deals report unavailable");
                            errors.push(format!("{e:#}"));
                        }
                    }
                }
                if errors.len() == urls.len() {
                    Err(errors.join("; "))
                } else {
                    Ok(all)
                }
            }
        }
    }

    pub async fn contains(&self, symbol: &str) -> Outcome<bool> {
        let sym = symbol.trim().to_ascii_uppercase();
        match self.cache.get_or_init(|| self.load()).await {
            Ok(set) => Outcome::Ok(set.contains(&sym)),
            Err(reason) => Outcome::Failed(reason.clone()),
        }
    }
}
