pub mod slack;
pub mod telegram;

use anyhow::{bail, Result};
use reqwest::Client;
use std::time::Duration;

use crate::config::{ScanConfig, Timeouts};
use crate::decision::ScanDecision;

pub use slack::SlackNotifier;
pub use telegram::TelegramNotifier;

/// Delivery channel for a preformatted alert. Implementations do not retry.
#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, text: &str) -> Result<()>;
    fn name(&self) -> &'static str;
}

/// Markdown alert text for one decision.
pub fn render_alert(d: &ScanDecision) -> String {
    let listing = d
        .listing_date
        .map(|x| x.to_string())
        .unwrap_or_else(|| "-".to_string());

    let mut msg = format!(
        "🚨 *IPO Near All-Time High!*\n\
         *Symbol:* {}\n\
         *Listing Date:* {}\n\
         *ATH:* {:.2}\n\
         *CMP:* {:.2}\n\
         *Distance from ATH:* {:.2}%\n\
         *Sessions since ATH:* {}\n",
        d.symbol,
        listing,
        d.ath.ath_price,
        d.current_price,
        d.distance_pct,
        d.ath.bars_since_ath,
    );
    if let Some(v) = d.volume {
        msg.push_str(&format!(
            "*Volume Spike:* {} (avg2 = {})\n",
            v.latest,
            v.prior_avg.round() as u64
        ));
    }
    msg.push_str(&format!(
        "*Bulk Deal:* {}\n*Positive News:* {}\n*Insider Buying:* {}",
        d.signals.bulk_label(),
        d.signals.news_label(),
        d.signals.insider_label()
    ));
    msg
}

/// Fans one message out to every configured channel. A failing channel is
/// logged and does not stop delivery to the rest.
pub struct NotifierMux {
    channels: Vec<Box<dyn Notifier>>,
}

impl NotifierMux {
    pub fn new(channels: Vec<Box<dyn Notifier>>) -> Self {
        Self { channels }
    }

    /// Telegram is always wired (it logs and no-ops without credentials);
    /// Slack only when a webhook is configured.
    pub fn from_config(client: Client, cfg: &ScanConfig) -> Self {
        let timeout: Duration = Timeouts::of(cfg.timeouts.notify_secs);
        let mut channels: Vec<Box<dyn Notifier>> = vec![Box::new(
            TelegramNotifier::new(
                client.clone(),
                cfg.telegram_bot_token.clone(),
                cfg.telegram_chat_id.clone(),
            )
            .with_timeout(timeout),
        )];
        if let Some(url) = &cfg.slack_webhook_url {
            channels.push(Box::new(
                SlackNotifier::new(client, url.clone()).with_timeout(timeout),
            ));
        }
        Self::new(channels)
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// Names of the channels that failed.
    pub async fn notify(&self, text: &str) -> Vec<&'static str> {
        let mut failed = Vec::new();
        for ch in &self.channels {
            if let Err(e) = ch.send(text).await {
                tracing::warn!(channel = ch.name(), error = %format!("{e:#}"), "notification failed");
                failed.push(ch.name());
            }
        }
        failed
    }
}

#[async_trait::async_trait]
impl Notifier for NotifierMux {
    /// Err when any channel failed; the others have still been tried.
    async fn send(&self, text: &str) -> Result<()> {
        let failed = self.notify(text).await;
        if !failed.is_empty() {
            bail!("{} of {} channels failed: {}", failed.len(), self.len(), failed.join(", "));
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "mux"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ath::AthResult;
    use crate::decision::CorroborationSignals;
    use crate::volume::VolumeSpike;
    use chrono::NaiveDate;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn decision() -> ScanDecision {
        ScanDecision {
            symbol: "ABC".into(),
            current_price: 245.0,
            ath: AthResult {
                ath_price: 250.0,
                ath_index: 5,
                bars_since_ath: 4,
            },
            distance_pct: 2.0,
            signals: CorroborationSignals {
                bulk_deal: true,
                positive_news: false,
                insider_buying: false,
            },
            near_ath: true,
            should_alert: true,
            listing_date: NaiveDate::from_ymd_opt(2024, 1, 5),
            volume: None,
        }
    }

    #[test]
    fn renders_core_fields() {
        let text = render_alert(&decision());
        assert!(text.contains("*Symbol:* ABC"));
        assert!(text.contains("*Listing Date:* 2024-01-05"));
        assert!(text.contains("*ATH:* 250.00"));
        assert!(text.contains("*CMP:* 245.00"));
        assert!(text.contains("*Distance from ATH:* 2.00%"));
        assert!(text.contains("*Bulk Deal:* Yes"));
        assert!(text.contains("*Positive News:* No"));
        assert!(!text.contains("Volume Spike"));
    }

    #[test]
    fn renders_volume_line_when_present() {
        let d = decision().with_volume(Some(VolumeSpike {
            latest: 5000,
            prior_avg: 1500.4,
        }));
        assert!(render_alert(&d).contains("*Volume Spike:* 5000 (avg2 = 1500)"));
    }

    struct Channel {
        name: &'static str,
        fail: bool,
        sent: Arc<AtomicUsize>,
    }

    #[async_trait::async_trait]
    impl Notifier for Channel {
        async fn send(&self, _text: &str) -> Result<()> {
            self.sent.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                bail!("{} down", self.name);
            }
            Ok(())
        }

        fn name(&self) -> &'static str {
            self.name
        }
    }

    #[tokio::test]
    async fn mux_tries_every_channel_and_reports_failures() {
        let sent = Arc::new(AtomicUsize::new(0));
        let channel = |name, fail| -> Box<dyn Notifier> {
            Box::new(Channel {
                name,
                fail,
                sent: sent.clone(),
            })
        };
        let mux = NotifierMux::new(vec![channel("telegram", true), channel("slack", false)]);

        let err = mux.send("hi").await.unwrap_err().to_string();
        assert_eq!(sent.load(Ordering::SeqCst), 2);
        assert!(err.contains("1 of 2"), "{err}");
        assert!(err.contains("telegram"), "{err}");

        let ok = NotifierMux::new(vec![channel("slack", false)]);
        assert!(ok.send("hi").await.is_ok());
    }
}
