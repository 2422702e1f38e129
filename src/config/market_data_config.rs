//! Market data source configuration: exchange endpoint and HTTP behaviour.

use super::{optional_env, parse_env};
use anyhow::{Result, ensure};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct MarketDataEnvConfig {
    pub kucoin_base_url: String,
    pub http_timeout: Duration,
    pub http_max_retries: u32,
}

impl MarketDataEnvConfig {
    pub fn from_env() -> Result<Self> {
        let timeout_secs: u64 = parse_env("HTTP_TIMEOUT_SECS", 10)?;
        ensure!(timeout_secs > 0, "HTTP_TIMEOUT_SECS must be greater than 0");

        let kucoin_base_url = optional_env("KUCOIN_BASE_URL")
            .unwrap_or_else(|| "https://api.kucoin.com".to_string());
        url::Url::parse(&kucoin_base_url)
            .map_err(|e| anyhow::anyhow!("Invalid KUCOIN_BASE_URL '{}': {}", kucoin_base_url, e))?;

        Ok(Self {
            kucoin_base_url,
            http_timeout: Duration::from_secs(timeout_secs),
            http_max_retries: parse_env("HTTP_MAX_RETRIES", 2)?,
        })
    }
}
