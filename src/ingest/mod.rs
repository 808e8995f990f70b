// src/ingest/mod.rs
pub mod http;
pub mod providers;
pub mod types;

use chrono::{Duration, NaiveDate, Utc};
use metrics::{counter, describe_counter};
use once_cell::sync::OnceCell;
use std::collections::HashMap;

use crate::ingest::types::{ListedSymbol, ListingRow};

/// Series code of ordinary equity shares on the exchange.
pub const EQUITY_SERIES: &str = "EQ";

/// Accepted listing-date layouts, tried in order. Numeric forms are day-first.
const DATE_FORMATS: &[&str] = &[
    "%d-%b-%Y", // 05-JAN-2024 (exchange master file)
    "%Y-%m-%d",
    "%d-%m-%Y",
    "%d/%m/%Y",
    "%Y/%m/%d",
    "%d %b %Y",
    "%d-%B-%Y",
    "%d %B %Y",
    "%b %d, %Y",
];

pub(crate) fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("universe_rows_total", "Rows read from the listings master.");
        describe_counter!(
            "universe_unparseable_dates_total",
            "Listing rows dropped for an unparseable date."
        );
        describe_counter!(
            "provider_errors_total",
            "External fetch/parse failures, by provider."
        );
    });
}

/// Calendar date at the exchange (IST, UTC+05:30).
pub fn exchange_today() -> NaiveDate {
    (Utc::now().naive_utc() + Duration::minutes(330)).date()
}

/// Parse a listing date in any of the tolerated textual layouts.
pub fn parse_listing_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
}

/// Series filter, date parsing, earliest-date dedup, then the listing window.
/// Returns the kept symbols (earliest listing first) and the count of rows
/// dropped for an unparseable date.
pub fn normalize_universe(
    rows: Vec<ListingRow>,
    today: NaiveDate,
    window_days: u32,
) -> (Vec<ListedSymbol>, usize) {
    ensure_metrics_described();
    counter!("universe_rows_total").increment(rows.len() as u64);

    let mut unparseable = 0usize;
    let mut earliest: HashMap<String, NaiveDate> = HashMap::new();

    for row in rows {
        if !row.series.trim().eq_ignore_ascii_case(EQUITY_SERIES) {
            continue;
        }
        let symbol = row.symbol.trim().to_ascii_uppercase();
        if symbol.is_empty() {
            continue;
        }
        let Some(date) = parse_listing_date(&row.listing_date) else {
            unparseable += 1;
            continue;
        };
        earliest
            .entry(symbol)
            .and_modify(|d| {
                if date < *d {
                    *d = date;
                }
            })
            .or_insert(date);
    }

    counter!("universe_unparseable_dates_total").increment(unparseable as u64);

    let cutoff = today - Duration::days(i64::from(window_days));
    let mut out: Vec<ListedSymbol> = earliest
        .into_iter()
        .filter(|(_, d)| *d >= cutoff)
        .map(|(symbol, listing_date)| ListedSymbol {
            symbol,
            listing_date,
        })
        .collect();
    out.sort_by(|a, b| {
        a.listing_date
            .cmp(&b.listing_date)
            .then_with(|| a.symbol.cmp(&b.symbol))
    });

    (out, unparseable)
}
