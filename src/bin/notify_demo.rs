//! Sends one sample alert through the configured channels (logs only when
//! credentials are missing).

use chrono::NaiveDate;
use ipo_ath_scanner::ath::AthResult;
use ipo_ath_scanner::ingest::http::build_client;
use ipo_ath_scanner::notify::render_alert;
use ipo_ath_scanner::volume::VolumeSpike;
use ipo_ath_scanner::{CorroborationSignals, NotifierMux, ScanConfig, ScanDecision};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt().with_target(false).init();

    let cfg = ScanConfig::load_default()?;
    let mux = NotifierMux::from_config(build_client()?, &cfg);

    let sample = ScanDecision {
        symbol: "DEMO".into(),
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
        volume: Some(VolumeSpike {
            latest: 120_000,
            prior_avg: 80_000.0,
        }),
    };

    let failed = mux.notify(&render_alert(&sample)).await;
    println!("notify-demo done ({} channel(s), failed: {failed:?})", mux.len());
    Ok(())
}
