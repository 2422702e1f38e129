//! Initial watch-list contents and scheduling cadence.

use super::{optional_env, parse_env};
use crate::domain::market::{Interval, Symbol};
use anyhow::{Context, Result, ensure};
use std::time::Duration;

const DEFAULT_SYMBOLS: &str = "BTC-USDT,ETH-USDT,SOL-USDT,LDO-USDT,AAVE-USDT";

#[derive(Debug, Clone)]
pub struct WatchListEnvConfig {
    pub symbols: Vec<Symbol>,
    pub default_interval: Interval,
    pub schedule_period: Duration,
    pub auto_start: bool,
}

impl WatchListEnvConfig {
    pub fn from_env() -> Result<Self> {
        let raw_symbols =
            optional_env("WATCHLIST_SYMBOLS").unwrap_or_else(|| DEFAULT_SYMBOLS.to_string());
        let symbols = Self::parse_symbols(&raw_symbols)?;

        let default_interval: Interval = parse_env("DEFAULT_INTERVAL", Interval::OneHour)?;

        let minutes: u64 = parse_env("SCHEDULE_PERIOD_MINUTES", 30)?;
        ensure!(minutes > 0, "SCHEDULE_PERIOD_MINUTES must be greater than 0");

        Ok(Self {
            symbols,
            default_interval,
            schedule_period: Duration::from_secs(minutes * 60),
            auto_start: parse_env("AUTO_START", false)?,
        })
    }

    /// Comma-separated list; blank entries are skipped
    pub fn parse_symbols(raw: &str) -> Result<Vec<Symbol>> {
        raw.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| {
                Symbol::parse(s)
                    .with_context(|| format!("Invalid symbol in WATCHLIST_SYMBOLS: '{}'", s))
            })
            .collect()
    }
}
