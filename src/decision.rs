//! decision.rs — per-symbol outcome of one scan.
//!
//! A `ScanDecision` is created fresh for every symbol that reaches the
//! aggregation step and is handed straight to the notifier; nothing here is
//! persisted between runs.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::ath::AthResult;
use crate::volume::VolumeSpike;

/// Auxiliary market signals. Each one is `false` when its source failed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorroborationSignals {
    pub bulk_deal: bool,
    pub positive_news: bool,
    pub insider_buying: bool,
}

impl CorroborationSignals {
    pub fn any(&self) -> bool {
        self.bulk_deal || self.positive_news || self.insider_buying
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanDecision {
    pub symbol: String,
    /// Close of the most recent session (CMP).
    pub current_price: f64,
    pub ath: AthResult,
    /// Percent below ATH, rounded to two decimals.
    pub distance_pct: f64,
    pub signals: CorroborationSignals,
    /// Price-proximity rule alone.
    pub near_ath: bool,
    pub should_alert: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub listing_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume: Option<VolumeSpike>,
}

impl ScanDecision {
    pub fn with_listing_date(mut self, date: Option<NaiveDate>) -> Self {
        self.listing_date = date;
        self
    }

    pub fn with_volume(mut self, spike: Option<VolumeSpike>) -> Self {
        self.volume = spike;
        self
    }
}

fn yes_no(b: bool) -> &'static str {
    if b {
        "Yes"
    } else {
        "No"
    }
}

impl CorroborationSignals {
    pub fn bulk_label(&self) -> &'static str {
        yes_no(self.bulk_deal)
    }
    pub fn news_label(&self) -> &'static str {
        yes_no(self.positive_news)
    }
    pub fn insider_label(&self) -> &'static str {
        yes_no(self.insider_buying)
    }
}
