use anyhow::{Context, Result};
use reqwest::Client;
use std::time::Duration;

use super::Notifier;

pub struct SlackNotifier {
    webhook_url: String,
    client: Client,
    timeout: Duration,
}

impl SlackNotifier {
    pub fn new(client: Client, url: String) -> Self {
        Self {
            webhook_url: url,
            client,
            timeout: Duration::from_secs(10),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait::async_trait]
impl Notifier for SlackNotifier {
    async fn send(&self, text: &str) -> Result<()> {
        // Slack mrkdwn bolds with single asterisks too, so the text passes as-is.
        let body = serde_json::json!({ "text": text });

        self.client
            .post(&self.webhook_url)
            .timeout(self.timeout)
            .json(&body)
            .send()
            .await
            .context("slack post")?
            .error_for_status()
            .context("slack non-2xx")?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "slack"
    }
}
