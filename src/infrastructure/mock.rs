//! In-process doubles for the ports, used by `MODE=mock` and the tests.

use crate::domain::analysis::{AugmentedSeries, FeatureVector, ModelLabel};
use crate::domain::errors::{DeliveryError, MarketDataError, ModelError, RenderError};
use crate::domain::market::{Candle, Interval, Series, Symbol};
use crate::domain::ports::{
    Alert, AlertSink, ChartArtifact, ChartRenderer, MarketDataService, RecommendationModel,
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

const BASE_TIMESTAMP: i64 = 1_700_000_000;

/// Scripted candle source. Symbols without a script are unavailable
/// unless a default script is set.
pub struct MockMarketDataService {
    scripts: Mutex<HashMap<Symbol, Result<Vec<Candle>, String>>>,
    fallback: Option<Vec<Candle>>,
    delay: Option<Duration>,
    fetches: AtomicUsize,
}

impl Default for MockMarketDataService {
    fn default() -> Self {
        Self::new()
    }
}

impl MockMarketDataService {
    pub fn new() -> Self {
        Self {
            scripts: Mutex::new(HashMap::new()),
            fallback: None,
            delay: None,
            fetches: AtomicUsize::new(0),
        }
    }

    /// Every symbol without its own script gets a synthetic 100-candle series
    pub fn with_synthetic_data() -> Self {
        Self {
            fallback: Some(Self::zigzag_candles(100)),
            ..Self::new()
        }
    }

    /// Each fetch sleeps before answering
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    fn scripts(&self) -> MutexGuard<'_, HashMap<Symbol, Result<Vec<Candle>, String>>> {
        self.scripts.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn set_candles(&self, symbol: &Symbol, candles: Vec<Candle>) {
        self.scripts().insert(symbol.clone(), Ok(candles));
    }

    pub fn set_unavailable(&self, symbol: &Symbol, reason: &str) {
        self.scripts()
            .insert(symbol.clone(), Err(reason.to_string()));
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    /// Hourly candles on a slight uptrend that alternate one point above
    /// and below it. Even length ends on a trough.
    pub fn zigzag_candles(len: usize) -> Vec<Candle> {
        (0..len)
            .map(|i| {
                let base = 100.0 + 0.1 * i as f64;
                let close = if i % 2 == 0 { base + 1.0 } else { base - 1.0 };
                Candle {
                    timestamp: BASE_TIMESTAMP + i as i64 * 3600,
                    open: base,
                    high: base.max(close) + 0.5,
                    low: base.min(close) - 0.5,
                    close,
                    volume: 10.0,
                }
            })
            .collect()
    }
}

#[async_trait]
impl MarketDataService for MockMarketDataService {
    async fn fetch(&self, symbol: &Symbol, interval: Interval) -> Result<Series, MarketDataError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let script = self
            .scripts()
            .get(symbol)
            .cloned()
            .or_else(|| self.fallback.clone().map(Ok))
            .unwrap_or_else(|| Err("no data scripted".to_string()));

        let unavailable = |reason: String| MarketDataError::DataUnavailable {
            symbol: symbol.clone(),
            reason,
        };
        let candles = script.map_err(unavailable)?;
        Series::from_unordered(symbol.clone(), interval, candles)
            .map_err(|e| unavailable(e.to_string()))
    }
}

/// Records every alert; optionally fails deliveries instead
#[derive(Default)]
pub struct RecordingSink {
    alerts: Mutex<Vec<Alert>>,
    failing: AtomicBool,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        let sink = Self::default();
        sink.set_failing(true);
        sink
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn alerts(&self) -> Vec<Alert> {
        self.alerts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn texts(&self) -> Vec<String> {
        self.alerts().into_iter().map(|a| a.text).collect()
    }
}

#[async_trait]
impl AlertSink for RecordingSink {
    async fn deliver(&self, alert: &Alert) -> Result<(), DeliveryError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(DeliveryError::Failed("sink rejected alert".to_string()));
        }
        self.alerts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(alert.clone());
        Ok(())
    }
}

/// Model that always answers with the same label
pub struct StaticModel(pub ModelLabel);

impl RecommendationModel for StaticModel {
    fn predict(&self, _features: &FeatureVector) -> Result<ModelLabel, ModelError> {
        Ok(self.0)
    }

    fn name(&self) -> &str {
        "static"
    }
}

/// Model whose every prediction fails
pub struct FailingModel;

impl RecommendationModel for FailingModel {
    fn predict(&self, _features: &FeatureVector) -> Result<ModelLabel, ModelError> {
        Err(ModelError::PredictionFailed("model offline".to_string()))
    }

    fn name(&self) -> &str {
        "failing"
    }
}

/// Renderer whose every chart fails, as when the chart directory is unwritable
pub struct FailingChartRenderer;

impl ChartRenderer for FailingChartRenderer {
    fn render(&self, _series: &AugmentedSeries) -> Result<Option<ChartArtifact>, RenderError> {
        Err(RenderError::Failed("disk full".to_string()))
    }
}
