// src/ingest/providers/nse_insider.rs
use anyhow::{bail, Context, Result};
use chrono::{Duration as ChronoDuration, NaiveDate};
use reqwest::{Client, Url};
use serde::Deserialize;
use std::time::Duration;
use tokio::sync::OnceCell;

use crate::ingest::exchange_today;
use crate::ingest::http::fetch_text;
use crate::outcome::Outcome;

pub const NSE_HOME_URL: &str = "https://www.nseindia.com";
pub const PIT_API_URL: &str = "https://www.nseindia.com/api/corporates-pit";

const BUY_MARKERS: &[&str] = &["acquisition", "buy", "purchase"];

#[derive(Debug, Deserialize)]
struct PitResponse {
    #[serde(default)]
    data: Vec<PitRecord>,
}

#[derive(Debug, Deserialize)]
struct PitRecord {
    #[serde(rename = "acqMode")]
    acq_mode: Option<String>,
    #[serde(rename = "tdpTransactionType")]
    transaction_type: Option<String>,
}

impl PitRecord {
    fn is_buy(&self) -> bool {
        [&self.acq_mode, &self.transaction_type]
            .into_iter()
            .flatten()
            .any(|f| {
                let f = f.to_lowercase();
                BUY_MARKERS.iter().any(|m| f.contains(m))
            })
    }
}

/// True iff any disclosure in the payload is an acquisition/buy/purchase.
/// HTML error pages and other non-JSON bodies are errors.
pub fn parse_insider_buying(body: &str) -> Result<bool> {
    let trimmed = body.trim_start();
    if trimmed.starts_with('<') {
        bail!("insider feed returned HTML");
    }
    let resp: PitResponse = serde_json::from_str(trimmed).context("parsing insider json")?;
    Ok(resp.data.iter().any(PitRecord::is_buy))
}

pub struct NseInsiderTrades {
    client: Client,
    timeout: Duration,
    window_days: u32,
    home_url: String,
    api_url: String,
    warmed: OnceCell<()>,
}

impl NseInsiderTrades {
    pub fn new(client: Client, timeout: Duration, window_days: u32) -> Self {
        Self {
            client,
            timeout,
            window_days,
            home_url: NSE_HOME_URL.to_string(),
            api_url: PIT_API_URL.to_string(),
            warmed: OnceCell::new(),
        }
    }

    /// Point the landing page and disclosure API elsewhere (mirror, tests).
    pub fn with_endpoints(
        mut self,
        home_url: impl Into<String>,
        api_url: impl Into<String>,
    ) -> Self {
        self.home_url = home_url.into();
        self.api_url = api_url.into();
        self
    }

    fn url(&self, symbol: &str, today: NaiveDate) -> Result<Url> {
        let from = today - ChronoDuration::days(i64::from(self.window_days));
        let symbol = symbol.trim().to_ascii_uppercase();
        let from = from.format("%d-%m-%Y").to_string();
        let to = today.format("%d-%m-%Y").to_string();
        Url::parse_with_params(
            &self.api_url,
            [
                ("index", "equities"),
                ("symbol", symbol.as_str()),
                ("from_date", from.as_str()),
                ("to_date", to.as_str()),
            ],
        )
        .context("building insider url")
    }

    /// The API only answers with the session cookie set by the landing page.
    /// The cookie jar is shared, so one visit per run is enough.
    async fn warm_up(&self) {
        self.warmed
            .get_or_init(|| async {
                if let Err(e) = fetch_text(&self.client, &self.home_url, self.timeout).await {
                    tracing::debug!(error = ?e, "exchange landing page warm-up failed");
                }
            })
            .await;
    }

    pub async fn has_buying(&self, symbol: &str) -> Outcome<bool> {
        self.warm_up().await;
        let res = match self.url(symbol, exchange_today()) {
            Ok(url) => match fetch_text(&self.client, url.as_str(), self.timeout).await {
                Ok(body) => parse_insider_buying(&body),
                Err(e) => Err(e),
            },
            Err(e) => Err(e),
        };
        Outcome::from_result(res)
    }
}
