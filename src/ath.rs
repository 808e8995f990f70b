//! All-time-high evaluation over a symbol's full daily history.

use serde::{Deserialize, Serialize};

use crate::history::PriceHistory;

/// Complete sessions that must separate the ATH bar from the latest bar
/// before a symbol can alert. Fixed rule, not configurable.
pub const MIN_BARS_SINCE_ATH: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AthResult {
    pub ath_price: f64,
    /// Position of the first bar carrying the maximum high.
    pub ath_index: usize,
    /// `len - 1 - ath_index`
    pub bars_since_ath: usize,
}

impl AthResult {
    /// Same-day or next-day highs are noise; require three full sessions since.
    pub fn is_recency_eligible(&self) -> bool {
        self.bars_since_ath >= MIN_BARS_SINCE_ATH
    }
}

/// Returns `None` for an empty history or one without a usable high
/// (non-finite values are treated as missing). Ties keep the earliest bar.
pub fn evaluate(history: &PriceHistory) -> Option<AthResult> {
    let mut best: Option<(usize, f64)> = None;
    for (i, bar) in history.bars().iter().enumerate() {
        if !bar.high.is_finite() {
            continue;
        }
        match best {
            Some((_, h)) if bar.high <= h => {}
            _ => best = Some((i, bar.high)),
        }
    }

    let (ath_index, ath_price) = best?;
    Some(AthResult {
        ath_price,
        ath_index,
        bars_since_ath: history.len() - 1 - ath_index,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::PriceBar;
    use chrono::{Duration, NaiveDate};

    fn from_highs(highs: &[f64]) -> PriceHistory {
        let d0 = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        highs
            .iter()
            .enumerate()
            .map(|(i, h)| PriceBar::new(d0 + Duration::days(i as i64), *h, *h, *h, *h, 100))
            .collect::<Vec<_>>()
            .into()
    }

    #[test]
    fn empty_history_is_absent() {
        assert!(evaluate(&PriceHistory::default()).is_none());
    }

    #[test]
    fn all_nan_highs_are_absent() {
        assert!(evaluate(&from_highs(&[f64::NAN, f64::NAN])).is_none());
    }

    #[test]
    fn earliest_maximum_wins_ties() {
        let r = evaluate(&from_highs(&[10.0, 12.0, 11.0, 12.0, 9.0])).unwrap();
        assert_eq!(r.ath_price, 12.0);
        assert_eq!(r.ath_index, 1);
        assert_eq!(r.bars_since_ath, 3);
        assert!(r.is_recency_eligible());
    }

    #[test]
    fn single_bar_is_its_own_ath() {
        let r = evaluate(&from_highs(&[5.0])).unwrap();
        assert_eq!(r.ath_index, 0);
        assert_eq!(r.bars_since_ath, 0);
        assert!(!r.is_recency_eligible());
    }

    #[test]
    fn nan_high_is_skipped() {
        let r = evaluate(&from_highs(&[3.0, f64::NAN, 2.0])).unwrap();
        assert_eq!(r.ath_index, 0);
        assert_eq!(r.bars_since_ath, 2);
    }
}
