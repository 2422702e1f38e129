//! marketwatch - scheduled technical analysis for a crypto watch-list
//!
//! # Usage
//! ```sh
//! MODE=mock cargo run -- --once
//! TELEGRAM_BOT_TOKEN=... TELEGRAM_CHAT_ID=... cargo run
//! ```
//!
//! Set `LOG_FORMAT=json` for structured log lines.

use anyhow::Result;
use clap::Parser;
use marketwatch::application::system::Application;
use marketwatch::config::Config;
use marketwatch::domain::market::Interval;
use tracing::{Level, info};
use tracing_subscriber::prelude::*;

#[derive(Parser, Debug)]
#[command(author, version, about = "Scheduled market analysis and signal alerts")]
struct Cli {
    /// Run a single pass over the watch-list and exit
    #[arg(long)]
    once: bool,

    /// Override DEFAULT_INTERVAL (1min, 5min, 15min, 30min, 1hour, 1day, 1week)
    #[arg(long)]
    interval: Option<Interval>,
}

fn init_logging() {
    let filter =
        tracing_subscriber::EnvFilter::from_default_env().add_directive(Level::INFO.into());
    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_target(false).json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_target(false).pretty())
            .init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_logging();

    info!("marketwatch {} starting...", env!("CARGO_PKG_VERSION"));

    let mut config = Config::from_env()?;
    if let Some(interval) = cli.interval {
        config.watchlist.default_interval = interval;
    }
    info!(
        "Configuration loaded: Mode={:?}, Symbols={}, Interval={}",
        config.mode,
        config.watchlist.symbols.len(),
        config.watchlist.default_interval
    );

    let app = Application::build(config).await?;

    if cli.once {
        let report = app.scheduler.run_now().await?;
        info!(
            "Single pass done: {} delivered, {} notice(s)",
            report.delivered_count(),
            report.notice_count()
        );
        return Ok(());
    }

    let handle = app.start().await?;
    info!("Running. Press Ctrl+C to shutdown.");

    tokio::signal::ctrl_c().await?;
    info!("Shutdown signal received.");
    handle.shutdown().await;

    Ok(())
}
