// src/ingest/http.rs
use anyhow::{Context, Result};
use reqwest::Client;
use std::time::Duration;

/// Exchange endpoints reject non-browser agents.
pub const BROWSER_UA: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

/// Shared client: browser UA, cookie jar (exchange API needs the session
/// cookie from its landing page), short connect timeout. Per-request
/// timeouts are set by each provider.
pub fn build_client() -> Result<Client> {
    Client::builder()
        .user_agent(BROWSER_UA)
        .cookie_store(true)
        .connect_timeout(Duration::from_secs(5))
        .build()
        .context("building http client")
}

/// GET `url` and return the body; non-2xx is an error.
pub async fn fetch_text(client: &Client, url: &str, timeout: Duration) -> Result<String> {
    client
        .get(url)
        .timeout(timeout)
        .send()
        .await
        .with_context(|| format!("GET {url}"))?
        .error_for_status()
        .with_context(|| format!("GET {url} non-2xx"))?
        .text()
        .await
        .with_context(|| format!("read body of {url}"))
}

pub async fn fetch_bytes(client: &Client, url: &str, timeout: Duration) -> Result<Vec<u8>> {
    let bytes = client
        .get(url)
        .timeout(timeout)
        .send()
        .await
        .with_context(|| format!("GET {url}"))?
        .error_for_status()
        .with_context(|| format!("GET {url} non-2xx"))?
        .bytes()
        .await
        .with_context(|| format!("read body of {url}"))?;
    Ok(bytes.to_vec())
}
