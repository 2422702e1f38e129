//! KuCoin public candle endpoint.
//!
//! `GET /api/v1/market/candles?type=<interval>&symbol=<symbol>` returns
//! rows of `[time, open, close, high, low, volume, turnover]`, every
//! field a string, newest first. A payload is accepted whole or not at
//! all: one malformed row makes the fetch `DataUnavailable`.

use crate::domain::errors::MarketDataError;
use crate::domain::market::{Candle, Interval, Series, Symbol};
use crate::domain::ports::MarketDataService;
use crate::infrastructure::core::http_client_factory::{HttpClientFactory, build_url_with_query};
use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use chrono::Utc;
use reqwest_middleware::ClientWithMiddleware;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

const CANDLES_PATH: &str = "/api/v1/market/candles";
const SUCCESS_CODE: &str = "200000";
/// Candles requested per fetch; comfortably above every indicator window
const HISTORY_CANDLES: i64 = 200;

#[derive(Debug, Deserialize)]
struct KucoinResponse {
    code: String,
    #[serde(default)]
    data: Option<Vec<Vec<String>>>,
    #[serde(default)]
    msg: Option<String>,
}

pub struct KucoinMarketDataService {
    client: ClientWithMiddleware,
    base_url: String,
}

impl KucoinMarketDataService {
    pub fn builder() -> KucoinMarketDataServiceBuilder {
        KucoinMarketDataServiceBuilder::default()
    }

    /// Candle request covering the last `HISTORY_CANDLES` buckets up to `end`
    fn candles_url(&self, symbol: &Symbol, interval: Interval, end: i64) -> Result<Url> {
        let start = end - HISTORY_CANDLES * interval.to_seconds();
        build_url_with_query(
            &self.base_url,
            CANDLES_PATH,
            &[
                ("type", interval.as_str().to_string()),
                ("symbol", symbol.as_str().to_string()),
                ("startAt", start.to_string()),
                ("endAt", end.to_string()),
            ],
        )
        .context("Invalid KuCoin base URL")
    }

    async fn fetch_internal(&self, symbol: &Symbol, interval: Interval) -> Result<Series> {
        let url = self.candles_url(symbol, interval, Utc::now().timestamp())?;

        debug!("KucoinMarketDataService: GET {}", url);
        let response = self
            .client
            .get(url)
            .send()
            .await
            .context("Failed to fetch candles from KuCoin")?;

        let status = response.status();
        if !status.is_success() {
            bail!("KuCoin returned HTTP {}", status);
        }

        let body = response
            .text()
            .await
            .context("Failed to read KuCoin response body")?;
        parse_candles(symbol, interval, &body)
    }
}

/// Decodes a KuCoin candle payload into an ascending [`Series`]
pub fn parse_candles(symbol: &Symbol, interval: Interval, body: &str) -> Result<Series> {
    let response: KucoinResponse =
        serde_json::from_str(body).context("Failed to parse KuCoin candles response")?;

    if response.code != SUCCESS_CODE {
        bail!(
            "KuCoin error code {}: {}",
            response.code,
            response.msg.unwrap_or_default()
        );
    }

    let rows = response.data.unwrap_or_default();
    let candles = rows
        .iter()
        .enumerate()
        .map(|(i, row)| parse_row(row).with_context(|| format!("Malformed candle row {}", i)))
        .collect::<Result<Vec<_>>>()?;

    Series::from_unordered(symbol.clone(), interval, candles)
        .context("KuCoin candles failed validation")
}

fn parse_row(row: &[String]) -> Result<Candle> {
    if row.len() < 6 {
        bail!("expected at least 6 fields, got {}", row.len());
    }

    let field = |idx: usize, name: &str| -> Result<f64> {
        row[idx]
            .parse::<f64>()
            .with_context(|| format!("{} '{}' is not a number", name, row[idx]))
    };

    Ok(Candle {
        timestamp: row[0]
            .parse::<i64>()
            .with_context(|| format!("time '{}' is not an integer", row[0]))?,
        open: field(1, "open")?,
        close: field(2, "close")?,
        high: field(3, "high")?,
        low: field(4, "low")?,
        volume: field(5, "volume")?,
    })
}

#[async_trait]
impl MarketDataService for KucoinMarketDataService {
    async fn fetch(&self, symbol: &Symbol, interval: Interval) -> Result<Series, MarketDataError> {
        match self.fetch_internal(symbol, interval).await {
            Ok(series) => {
                info!(
                    "KucoinMarketDataService: Fetched {} candles for {} ({})",
                    series.len(),
                    symbol,
                    interval
                );
                Ok(series)
            }
            Err(e) => {
                warn!("KucoinMarketDataService: {} unavailable: {:#}", symbol, e);
                Err(MarketDataError::DataUnavailable {
                    symbol: symbol.clone(),
                    reason: format!("{:#}", e),
                })
            }
        }
    }
}

#[derive(Default)]
pub struct KucoinMarketDataServiceBuilder {
    base_url: Option<String>,
    timeout: Option<Duration>,
    max_retries: Option<u32>,
}

impl KucoinMarketDataServiceBuilder {
    pub fn base_url(mut self, base_url: String) -> Self {
        self.base_url = Some(base_url);
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = Some(max_retries);
        self
    }

    pub fn build(self) -> KucoinMarketDataService {
        let client = HttpClientFactory::create_client(
            self.timeout.unwrap_or(Duration::from_secs(10)),
            self.max_retries.unwrap_or(2),
        );

        KucoinMarketDataService {
            client,
            base_url: self
                .base_url
                .unwrap_or_else(|| "https://api.kucoin.com".to_string()),
        }
    }
}
