//! history.rs — daily OHLCV bars for one symbol.
//!
//! A `PriceHistory` is always chronological with unique dates; the last bar is
//! the most recent session. Construction enforces that, so evaluators can index
//! from the back without re-checking.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One trading session.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

impl PriceBar {
    pub fn new(date: NaiveDate, open: f64, high: f64, low: f64, close: f64, volume: u64) -> Self {
        Self {
            date,
            open,
            high,
            low,
            close,
            volume,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceHistory {
    bars: Vec<PriceBar>,
}

impl PriceHistory {
    /// Sorts by date and keeps the last bar seen for a duplicated date
    /// (quote feeds repaint the running session).
    pub fn new(mut bars: Vec<PriceBar>) -> Self {
        bars.sort_by_key(|b| b.date);
        let mut out: Vec<PriceBar> = Vec::with_capacity(bars.len());
        for b in bars {
            match out.last_mut() {
                Some(last) if last.date == b.date => *last = b,
                _ => out.push(b),
            }
        }
        Self { bars: out }
    }

    pub fn bars(&self) -> &[PriceBar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// Most recent session.
    pub fn latest(&self) -> Option<&PriceBar> {
        self.bars.last()
    }

    /// First recorded session; for a new listing this is the listing day.
    pub fn first(&self) -> Option<&PriceBar> {
        self.bars.first()
    }
}

impl From<Vec<PriceBar>> for PriceHistory {
    fn from(bars: Vec<PriceBar>) -> Self {
        Self::new(bars)
    }
}
