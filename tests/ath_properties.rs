// tests/ath_properties.rs
//
// ATH evaluation over deterministic pseudo-random histories.

use chrono::{Duration, NaiveDate};
use ipo_ath_scanner::ath::{evaluate, MIN_BARS_SINCE_ATH};
use ipo_ath_scanner::history::{PriceBar, PriceHistory};
use rand::{rngs::StdRng, Rng, SeedableRng};

fn from_highs(highs: &[f64]) -> PriceHistory {
    let d0 = NaiveDate::from_ymd_opt(2023, 6, 1).unwrap();
    highs
        .iter()
        .enumerate()
        .map(|(i, h)| {
            let day = d0 + Duration::days(i as i64);
            PriceBar::new(day, h - 1.0, *h, h - 2.0, h - 0.5, 1_000)
        })
        .collect::<Vec<_>>()
        .into()
}

fn random_highs(seed: u64, n: usize) -> Vec<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    // coarse buckets so ties actually happen
    (0..n)
        .map(|_| 100.0 + rng.random_range(0..20u32) as f64)
        .collect()
}

#[test]
fn ath_is_max_high_at_first_occurrence() {
    for seed in 1..60u64 {
        let n = 1 + (seed as usize % 40);
        let highs = random_highs(seed, n);
        let r = evaluate(&from_highs(&highs)).expect("non-empty history");

        let max = highs.iter().cloned().fold(f64::MIN, f64::max);
        let first = highs.iter().position(|h| *h == max).unwrap();

        assert_eq!(r.ath_price, max, "seed {seed}");
        assert_eq!(r.ath_index, first, "seed {seed}");
        assert_eq!(r.bars_since_ath, n - 1 - first, "seed {seed}");
    }
}

#[test]
fn recency_rule_needs_three_sessions() {
    assert_eq!(MIN_BARS_SINCE_ATH, 3);

    // max at index 6 of 10 → 3 sessions since → eligible
    let mut highs = vec![100.0; 10];
    highs[6] = 150.0;
    assert!(evaluate(&from_highs(&highs)).unwrap().is_recency_eligible());

    // max at index 7 of 10 → 2 sessions since → not eligible
    let mut highs = vec![100.0; 10];
    highs[7] = 150.0;
    let r = evaluate(&from_highs(&highs)).unwrap();
    assert_eq!(r.bars_since_ath, 2);
    assert!(!r.is_recency_eligible());
}

#[test]
fn empty_history_is_absent_not_error() {
    assert!(evaluate(&PriceHistory::default()).is_none());
}
