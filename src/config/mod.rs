//! Configuration module for marketwatch.
//!
//! Structured loading from environment variables, organized by concern:
//! market data, analysis, watch-list and Telegram. Invalid values fail
//! startup; nothing is silently coerced.

mod analysis_config;
mod market_data_config;
mod telegram_config;
mod watchlist_config;

pub use analysis_config::AnalysisEnvConfig;
pub use market_data_config::MarketDataEnvConfig;
pub use telegram_config::TelegramEnvConfig;
pub use watchlist_config::WatchListEnvConfig;

use anyhow::{Context, Result};
use std::env;
use std::str::FromStr;

/// Which market data source backs the fetcher
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Mock,
    Kucoin,
}

impl FromStr for Mode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mock" => Ok(Mode::Mock),
            "kucoin" => Ok(Mode::Kucoin),
            _ => anyhow::bail!("Invalid MODE: {}. Must be 'mock' or 'kucoin'", s),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub mode: Mode,
    pub market_data: MarketDataEnvConfig,
    pub analysis: AnalysisEnvConfig,
    pub watchlist: WatchListEnvConfig,
    /// `None` when no bot token is configured
    pub telegram: Option<TelegramEnvConfig>,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        let mode_str = env::var("MODE").unwrap_or_else(|_| "kucoin".to_string());
        let mode = Mode::from_str(&mode_str)?;

        let market_data =
            MarketDataEnvConfig::from_env().context("Failed to load market data config")?;
        let analysis = AnalysisEnvConfig::from_env().context("Failed to load analysis config")?;
        let watchlist =
            WatchListEnvConfig::from_env().context("Failed to load watch-list config")?;
        let telegram = TelegramEnvConfig::from_env().context("Failed to load Telegram config")?;

        Ok(Self {
            mode,
            market_data,
            analysis,
            watchlist,
            telegram,
        })
    }
}

/// Reads `key`, falling back to `default` when unset
pub(crate) fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Failed to parse {}='{}'", key, raw)),
        Err(_) => Ok(default),
    }
}

/// Unset or blank values count as absent
pub(crate) fn optional_env(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
