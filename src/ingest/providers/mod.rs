pub mod market_signals;
pub mod nse_bulk;
pub mod nse_equity;
pub mod nse_insider;
pub mod yahoo_chart;
pub mod yahoo_news;

use anyhow::{anyhow, Result};

/// Exchange symbols trade on Yahoo under the `.NS` suffix.
pub fn yahoo_ticker(symbol: &str) -> String {
    format!("{}.NS", symbol.trim().to_ascii_uppercase())
}

/// CSV reader over a published report. Headers are trimmed since the
/// exchange pads them with spaces.
pub(crate) fn csv_reader(data: &[u8]) -> csv::Reader<&[u8]> {
    csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(data)
}

/// Index of a header, compared case-insensitively after trimming.
pub(crate) fn column_index(headers: &csv::StringRecord, name: &str) -> Result<usize> {
    headers
        .iter()
        .position(|h| h.trim().eq_ignore_ascii_case(name))
        .ok_or_else(|| anyhow!("missing column {name:?}"))
}
