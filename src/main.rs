//! Near-ATH scanner for recent listings — binary entrypoint.
//! One sweep per invocation; scheduling is left to cron or similar.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use ipo_ath_scanner::{live_scanner, ScanConfig};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact().with_target(false))
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env in local/dev; no-op when absent.
    let _ = dotenvy::dotenv();
    init_tracing();

    let cfg = ScanConfig::load_default()?;
    let scanner = live_scanner(cfg)?;
    let report = scanner.run().await;

    if report.universe_failed {
        tracing::warn!("scan finished without a universe");
    }
    println!("\n✔ Scan Complete");
    Ok(())
}
