use anyhow::{Context, Result};
use reqwest::{Client, Url};
use serde::Deserialize;
use std::time::Duration;

use super::yahoo_ticker;
use crate::ingest::http::fetch_text;
use crate::outcome::Outcome;
use crate::sentiment;

pub const SEARCH_URL: &str = "https://query2.finance.yahoo.com/v1/finance/search";

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    news: Vec<NewsItem>,
}

#[derive(Debug, Deserialize)]
struct NewsItem {
    title: Option<String>,
    // newer payloads nest the headline
    content: Option<NewsContent>,
}

#[derive(Debug, Deserialize)]
struct NewsContent {
    title: Option<String>,
}

/// Headline titles from a search response; items without a title are skipped.
pub fn parse_headlines(body: &str) -> Result<Vec<String>> {
    let resp: SearchResponse = serde_json::from_str(body).context("parsing news search json")?;
    Ok(resp
        .news
        .into_iter()
        .filter_map(|n| n.title.or_else(|| n.content.and_then(|c| c.title)))
        .filter(|t| !t.trim().is_empty())
        .collect())
}

pub struct YahooNews {
    client: Client,
    timeout: Duration,
    count: u32,
}

impl YahooNews {
    pub fn new(client: Client, timeout: Duration, count: u32) -> Self {
        Self {
            client,
            timeout,
            count,
        }
    }

    fn url(&self, symbol: &str) -> Result<Url> {
        let ticker = yahoo_ticker(symbol);
        let count = self.count.to_string();
        Url::parse_with_params(
            SEARCH_URL,
            [
                ("q", ticker.as_str()),
                ("quotesCount", "0"),
                ("newsCount", count.as_str()),
            ],
        )
        .context("building news search url")
    }

    pub async fn headlines(&self, symbol: &str) -> Result<Vec<String>> {
        let url = self.url(symbol)?;
        let body = fetch_text(&self.client, url.as_str(), self.timeout).await?;
        parse_headlines(&body)
    }

    /// True iff any recent headline carries a positive term.
    pub async fn has_positive(&self, symbol: &str) -> Outcome<bool> {
        match self.headlines(symbol).await {
            Ok(titles) if titles.is_empty() => Outcome::Absent,
            Ok(titles) => Outcome::Ok(sentiment::any_positive(titles.iter().map(String::as_str))),
            Err(e) => Outcome::Failed(format!("{e:#}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_flat_and_nested_titles() {
        let body = r#"{"news":[
            {"title":"Abc shares surge on debut"},
            {"content":{"title":"Abc wins order"}},
            {"title":""},
            {"uuid":"x"}
        ]}"#;
        let t = parse_headlines(body).unwrap();
        assert_eq!(t, vec!["Abc shares surge on debut", "Abc wins order"]);
    }

    #[test]
    fn ampersand_symbol_is_encoded_in_query() {
        let n = YahooNews::new(Client::new(), Duration::from_secs(1), 10);
        let url = n.url("j&kbank").unwrap();
        let q: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(
            q,
            vec![
                ("q".to_string(), "J&KBANK.NS".to_string()),
                ("quotesCount".to_string(), "0".to_string()),
                ("newsCount".to_string(), "10".to_string()),
            ]
        );
    }

    #[test]
    fn no_news_key_is_empty() {
        assert!(parse_headlines(r#"{"quotes":[]}"#).unwrap().is_empty());
    }
}
