// src/config.rs
//! Scan configuration, built once at process start and passed by reference.
//!
//! Precedence (lowest → highest): built-in defaults, TOML file, environment.

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::engine::DEFAULT_THRESHOLD;

pub const ENV_CONFIG_PATH: &str = "SCANNER_CONFIG_PATH";
pub const DEFAULT_CONFIG_PATH: &str = "config/scanner.toml";

pub const DEFAULT_LISTING_WINDOW_DAYS: u32 = 120;

fn default_window() -> u32 {
    DEFAULT_LISTING_WINDOW_DAYS
}
fn default_threshold() -> f64 {
    DEFAULT_THRESHOLD
}
fn default_true() -> bool {
    true
}
fn default_news_count() -> u32 {
    10
}
fn default_insider_window() -> u32 {
    30
}

/// Per-endpoint request timeouts, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Timeouts {
    pub universe_secs: u64,
    pub history_secs: u64,
    pub bulk_deal_secs: u64,
    pub news_secs: u64,
    pub insider_secs: u64,
    pub notify_secs: u64,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            universe_secs: 40,
            history_secs: 20,
            bulk_deal_secs: 30,
            news_secs: 10,
            insider_secs: 20,
            notify_secs: 10,
        }
    }
}

impl Timeouts {
    pub fn of(secs: u64) -> Duration {
        Duration::from_secs(secs.max(1))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Symbols listed within this many days are scanned.
    #[serde(default = "default_window")]
    pub listing_window_days: u32,
    /// Max fractional drop below ATH still counted as "near" (0.03 = 3%).
    #[serde(default = "default_threshold")]
    pub threshold: f64,
    #[serde(default = "default_true")]
    pub enable_volume_gate: bool,
    #[serde(default)]
    pub require_corroboration: bool,
    /// Headlines requested from the news search.
    #[serde(default = "default_news_count")]
    pub news_count: u32,
    #[serde(default = "default_insider_window")]
    pub insider_window_days: u32,
    #[serde(default)]
    pub timeouts: Timeouts,

    // Credentials only ever come from the environment.
    #[serde(skip)]
    pub telegram_bot_token: Option<String>,
    #[serde(skip)]
    pub telegram_chat_id: Option<String>,
    #[serde(skip)]
    pub slack_webhook_url: Option<String>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            listing_window_days: default_window(),
            threshold: default_threshold(),
            enable_volume_gate: true,
            require_corroboration: false,
            news_count: default_news_count(),
            insider_window_days: default_insider_window(),
            timeouts: Timeouts::default(),
            telegram_bot_token: None,
            telegram_chat_id: None,
            slack_webhook_url: None,
        }
    }
}

impl ScanConfig {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read_to_string(path)
            .with_context(|| format!("reading scanner config from {}", path.display()))?;
        let mut cfg: ScanConfig = toml::from_str(&data)
            .with_context(|| format!("parsing scanner config {}", path.display()))?;
        cfg.sanitize();
        Ok(cfg)
    }

    /// Resolve the file layer, then apply environment overrides:
    /// 1) $SCANNER_CONFIG_PATH (must exist)
    /// 2) config/scanner.toml if present
    /// 3) built-in defaults
    pub fn load_default() -> Result<Self> {
        let mut cfg = if let Ok(p) = std::env::var(ENV_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if !pb.exists() {
                return Err(anyhow!("{ENV_CONFIG_PATH} points to non-existent path"));
            }
            Self::load_from_file(&pb)?
        } else if Path::new(DEFAULT_CONFIG_PATH).exists() {
            Self::load_from_file(DEFAULT_CONFIG_PATH)?
        } else {
            Self::default()
        };
        cfg.apply_env();
        Ok(cfg)
    }

    pub fn apply_env(&mut self) {
        if let Some(v) = env_parse::<u32>("SCAN_LISTING_WINDOW_DAYS") {
            self.listing_window_days = v;
        }
        if let Some(v) = env_parse::<f64>("SCAN_THRESHOLD") {
            self.threshold = v;
        }
        if let Some(v) = env_flag("SCAN_VOLUME_GATE") {
            self.enable_volume_gate = v;
        }
        if let Some(v) = env_flag("SCAN_REQUIRE_CORROBORATION") {
            self.require_corroboration = v;
        }
        self.telegram_bot_token = env_nonempty("BOT_TOKEN");
        self.telegram_chat_id = env_nonempty("CHAT_ID");
        self.slack_webhook_url = env_nonempty("SLACK_WEBHOOK_URL");
        self.sanitize();
    }

    /// Out-of-range values fall back to defaults instead of failing the run.
    pub fn sanitize(&mut self) {
        if !(self.threshold > 0.0 && self.threshold < 1.0) {
            tracing::warn!(threshold = self.threshold, "threshold out of (0,1), using default");
            self.threshold = default_threshold();
        }
        if self.listing_window_days == 0 {
            self.listing_window_days = default_window();
        }
        if self.insider_window_days == 0 {
            self.insider_window_days = default_insider_window();
        }
        if self.news_count == 0 {
            self.news_count = default_news_count();
        }
    }
}

fn env_nonempty(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    let raw = env_nonempty(key)?;
    match raw.parse() {
        Ok(v) => Some(v),
        Err(_) => {
            tracing::warn!(key, value = %raw, "ignoring unparseable env override");
            None
        }
    }
}

fn env_flag(key: &str) -> Option<bool> {
    let raw = env_nonempty(key)?;
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => {
            tracing::warn!(key, value = %raw, "ignoring unparseable env flag");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_latest_rule_set() {
        let c = ScanConfig::default();
        assert_eq!(c.listing_window_days, 120);
        assert_eq!(c.threshold, 0.03);
        assert!(c.enable_volume_gate);
        assert!(!c.require_corroboration);
        assert_eq!(c.timeouts.universe_secs, 40);
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let mut c: ScanConfig = toml::from_str(
            r#"
threshold = 0.05
[timeouts]
news_secs = 3
"#,
        )
        .unwrap();
        c.sanitize();
        assert_eq!(c.threshold, 0.05);
        assert_eq!(c.listing_window_days, 120);
        assert_eq!(c.timeouts.news_secs, 3);
        assert_eq!(c.timeouts.history_secs, 20);
    }

    #[test]
    fn sanitize_rejects_bad_threshold() {
        let mut c = ScanConfig {
            threshold: 1.5,
            listing_window_days: 0,
            ..Default::default()
        };
        c.sanitize();
        assert_eq!(c.threshold, 0.03);
        assert_eq!(c.listing_window_days, 120);
    }
}
