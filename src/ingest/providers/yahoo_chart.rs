use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use chrono::DateTime;
use metrics::counter;
use reqwest::{Client, Url};
use serde::Deserialize;
use std::time::Duration;

use super::yahoo_ticker;
use crate::history::{PriceBar, PriceHistory};
use crate::ingest::http::fetch_text;
use crate::ingest::types::HistoryStore;
use crate::outcome::Outcome;

pub const CHART_BASE_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";

// `chart` schema
#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    chart: ChartBody,
}

#[derive(Debug, Deserialize)]
struct ChartBody {
    result: Option<Vec<ChartResult>>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    #[serde(default)]
    meta: Option<Meta>,
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Meta {
    #[serde(default)]
    gmtoffset: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<Quote>,
}

// Columns carry nulls for halted sessions.
#[derive(Debug, Default, Deserialize)]
struct Quote {
    open: Option<Vec<Option<f64>>>,
    high: Option<Vec<Option<f64>>>,
    low: Option<Vec<Option<f64>>>,
    close: Option<Vec<Option<f64>>>,
    volume: Option<Vec<Option<f64>>>,
}

/// Parse a chart response. `Ok(None)` means the feed has no usable series
/// for the symbol (no result, no timestamps, or no `high` column).
pub fn parse_chart_json(body: &str) -> Result<Option<PriceHistory>> {
    let env: ChartEnvelope = serde_json::from_str(body).context("parsing chart json")?;
    let Some(base) = env.chart.result.and_then(|r| r.into_iter().next()) else {
        return Ok(None);
    };
    let Some(ts) = base.timestamp else {
        return Ok(None);
    };
    let Some(q) = base.indicators.quote.into_iter().next() else {
        return Ok(None);
    };
    let Some(high) = q.high else {
        return Ok(None);
    };
    let offset = base.meta.and_then(|m| m.gmtoffset).unwrap_or(0);

    let open = q.open.unwrap_or_default();
    let low = q.low.unwrap_or_default();
    let close = q.close.unwrap_or_default();
    let volume = q.volume.unwrap_or_default();
    let at = |v: &Vec<Option<f64>>, i: usize| v.get(i).copied().flatten();

    let mut bars = Vec::with_capacity(ts.len());
    for (i, t) in ts.iter().enumerate() {
        let (Some(o), Some(h), Some(l), Some(c)) =
            (at(&open, i), at(&high, i), at(&low, i), at(&close, i))
        else {
            continue;
        };
        let Some(dt) = DateTime::from_timestamp(t + offset, 0) else {
            continue;
        };
        let vol = at(&volume, i).unwrap_or(0.0).max(0.0) as u64;
        bars.push(PriceBar::new(dt.date_naive(), o, h, l, c, vol));
    }

    if bars.is_empty() {
        return Ok(None);
    }
    Ok(Some(PriceHistory::new(bars)))
}

pub struct YahooChart {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl YahooChart {
    pub fn new(client: Client, timeout: Duration) -> Self {
        Self {
            client,
            base_url: CHART_BASE_URL.to_string(),
            timeout,
        }
    }

    fn url(&self, symbol: &str) -> Result<Url> {
        let mut url = Url::parse(&self.base_url).context("parsing chart base url")?;
        url.path_segments_mut()
            .map_err(|_| anyhow!("chart base url cannot take a path"))?
            .push(&yahoo_ticker(symbol));
        url.query_pairs_mut()
            .append_pair("range", "max")
            .append_pair("interval", "1d")
            .append_pair("events", "history");
        Ok(url)
    }
}

#[async_trait]
impl HistoryStore for YahooChart {
    async fn history(&self, symbol: &str) -> Outcome<PriceHistory> {
        let res = match self.url(symbol) {
            Ok(url) => match fetch_text(&self.client, url.as_str(), self.timeout).await {
                Ok(body) => parse_chart_json(&body),
                Err(e) => Err(e),
            },
            Err(e) => Err(e),
        };
        if let Err(e) = &res {
            tracing::warn!(error = ?e, symbol, provider = self.name(), "history fetch failed");
            counter!("provider_errors_total", "provider" => self.name()).increment(1);
        }
        Outcome::from_optional(res)
    }

    fn name(&self) -> &'static str {
        "yahoo-chart"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drops_null_rows_and_uses_offset() {
        let body = r#"{"chart":{"result":[{
            "meta":{"gmtoffset":19800},
            "timestamp":[1704425400,1704511800,1704771000],
            "indicators":{"quote":[{
                "open":[10.0,null,12.0],
                "high":[11.0,12.5,13.0],
                "low":[9.5,10.0,11.0],
                "close":[10.5,12.0,12.5],
                "volume":[1000,2000,null]
            }]}
        }],"error":null}}"#;
        let h = parse_chart_json(body).unwrap().unwrap();
        assert_eq!(h.len(), 2);
        assert_eq!(h.latest().unwrap().volume, 0);
        assert_eq!(h.first().unwrap().date.to_string(), "2024-01-05");
    }

    #[test]
    fn url_targets_ticker_path() {
        let c = YahooChart::new(Client::new(), Duration::from_secs(1));
        let url = c.url("m&m").unwrap();
        assert_eq!(url.path(), "/v8/finance/chart/M&M.NS");
        let q: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(q.len(), 3);
        assert!(q.contains(&("range".into(), "max".into())));
    }

    #[test]
    fn missing_high_is_absent() {
        let body = r#"{"chart":{"result":[{"timestamp":[1],"indicators":{"quote":[{"close":[1.0]}]}}]}}"#;
        assert!(parse_chart_json(body).unwrap().is_none());
    }

    #[test]
    fn null_result_is_absent() {
        let body = r#"{"chart":{"result":null,"error":{"code":"Not Found"}}}"#;
        assert!(parse_chart_json(body).unwrap().is_none());
    }

    #[test]
    fn html_is_error() {
        assert!(parse_chart_json("<html>rate limited</html>").is_err());
    }
}
