use anyhow::{anyhow, Context, Result};
use reqwest::Client;
use std::time::Duration;

use super::Notifier;

pub const TELEGRAM_API: &str = "https://api.telegram.org";

pub struct TelegramNotifier {
    bot_token: Option<String>,
    chat_id: Option<String>,
    client: Client,
    api_base: String,
    timeout: Duration,
}

impl TelegramNotifier {
    pub fn new(client: Client, bot_token: Option<String>, chat_id: Option<String>) -> Self {
        Self {
            bot_token,
            chat_id,
            client,
            api_base: TELEGRAM_API.to_string(),
            timeout: Duration::from_secs(10),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Point at a different Bot API host (self-hosted server, tests).
    pub fn with_api_base(mut self, base: impl Into<String>) -> Self {
        self.api_base = base.into();
        self
    }

    pub fn is_configured(&self) -> bool {
        self.bot_token.is_some() && self.chat_id.is_some()
    }
}

#[async_trait::async_trait]
impl Notifier for TelegramNotifier {
    async fn send(&self, text: &str) -> Result<()> {
        let (Some(token), Some(chat_id)) = (&self.bot_token, &self.chat_id) else {
            tracing::info!("Telegram credentials missing (BOT_TOKEN / CHAT_ID); alert not sent");
            return Ok(());
        };

        let url = format!("{}/bot{}/sendMessage", self.api_base, token);
        let form = [
            ("chat_id", chat_id.as_str()),
            ("text", text),
            ("parse_mode", "Markdown"),
        ];

        let rsp = self
            .client
            .post(&url)
            .timeout(self.timeout)
            .form(&form)
            .send()
            .await
            .context("telegram post")?;

        let status = rsp.status();
        if !status.is_success() {
            let body = rsp.text().await.unwrap_or_default();
            let snippet: String = body.chars().take(200).collect();
            return Err(anyhow!("telegram HTTP {status}: {snippet}"));
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "telegram"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::http::stub;

    #[tokio::test]
    async fn missing_credentials_is_noop() {
        let n = TelegramNotifier::new(Client::new(), None, Some("42".into()));
        assert!(!n.is_configured());
        // would fail to connect if it tried to post
        let n = n.with_api_base("http://127.0.0.1:9");
        assert!(n.send("hello").await.is_ok());
    }

    #[tokio::test]
    async fn non_2xx_is_an_error_and_not_retried() {
        let api = stub::serve(500, r#"{"ok":false,"description":"boom"}"#).await;
        let n = TelegramNotifier::new(Client::new(), Some("t".into()), Some("42".into()))
            .with_api_base(api.base.clone());

        let err = n.send("hello").await.unwrap_err().to_string();
        assert!(err.contains("500"), "{err}");
        assert!(err.contains("boom"), "{err}");
        assert_eq!(api.hits(), 1);
    }
}
