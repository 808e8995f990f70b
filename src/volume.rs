//! Volume-spike gate: latest session volume versus the two sessions before it.

use serde::{Deserialize, Serialize};

use crate::history::PriceHistory;

/// Bars required before the gate can be evaluated at all.
pub const MIN_VOLUME_BARS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VolumeSpike {
    pub latest: u64,
    /// Mean of the two sessions preceding the latest one.
    pub prior_avg: f64,
}

impl VolumeSpike {
    pub fn is_spike(&self) -> bool {
        self.latest as f64 > self.prior_avg
    }
}

/// `None` when the history is shorter than [`MIN_VOLUME_BARS`]; callers must
/// drop the symbol rather than read that as "no spike".
pub fn volume_spike(history: &PriceHistory) -> Option<VolumeSpike> {
    let bars = history.bars();
    if bars.len() < MIN_VOLUME_BARS {
        return None;
    }
    let n = bars.len();
    let v1 = bars[n - 2].volume as f64;
    let v2 = bars[n - 3].volume as f64;
    Some(VolumeSpike {
        latest: bars[n - 1].volume,
        prior_avg: (v1 + v2) / 2.0,
    })
}

pub fn has_spike(history: &PriceHistory) -> Option<bool> {
    volume_spike(history).map(|v| v.is_spike())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::PriceBar;
    use chrono::{Duration, NaiveDate};

    fn from_volumes(vols: &[u64]) -> PriceHistory {
        let d0 = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        vols.iter()
            .enumerate()
            .map(|(i, v)| PriceBar::new(d0 + Duration::days(i as i64), 1.0, 1.0, 1.0, 1.0, *v))
            .collect::<Vec<_>>()
            .into()
    }

    #[test]
    fn too_few_bars_is_excluded() {
        assert!(volume_spike(&from_volumes(&[])).is_none());
        assert!(volume_spike(&from_volumes(&[10, 20])).is_none());
    }

    #[test]
    fn strictly_greater_than_average() {
        // avg(100, 200) = 150
        assert_eq!(has_spike(&from_volumes(&[999, 100, 200, 151])), Some(true));
        assert_eq!(has_spike(&from_volumes(&[999, 100, 200, 150])), Some(false));
        assert_eq!(has_spike(&from_volumes(&[100, 200, 10])), Some(false));
    }

    #[test]
    fn reports_inputs() {
        let v = volume_spike(&from_volumes(&[100, 300, 500])).unwrap();
        assert_eq!(v.latest, 500);
        assert_eq!(v.prior_avg, 200.0);
    }
}
