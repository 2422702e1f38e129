use crate::domain::analysis::{AugmentedSeries, FeatureVector, ModelLabel};
use crate::domain::errors::{DeliveryError, MarketDataError, ModelError, RenderError};
use crate::domain::market::{Interval, Series, Symbol};
use async_trait::async_trait;
use std::path::PathBuf;

#[async_trait]
pub trait MarketDataService: Send + Sync {
    /// Ordered candles for one symbol. Every transport or payload problem
    /// is reported as `DataUnavailable`; no caching, no retries here
    /// beyond what the HTTP client does.
    async fn fetch(&self, symbol: &Symbol, interval: Interval) -> Result<Series, MarketDataError>;
}

/// Opaque handle to a rendered chart, passed through to the sink
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartArtifact {
    pub path: PathBuf,
    pub mime: &'static str,
}

/// Rendering may touch the filesystem; callers run it off the async executor.
pub trait ChartRenderer: Send + Sync {
    fn render(&self, series: &AugmentedSeries) -> Result<Option<ChartArtifact>, RenderError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub text: String,
    pub artifact: Option<ChartArtifact>,
}

impl Alert {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            artifact: None,
        }
    }
}

#[async_trait]
pub trait AlertSink: Send + Sync {
    async fn deliver(&self, alert: &Alert) -> Result<(), DeliveryError>;
}

/// Interface for the optional buy/sell/hold classifier
pub trait RecommendationModel: Send + Sync {
    fn predict(&self, features: &FeatureVector) -> Result<ModelLabel, ModelError>;

    /// Get model name/type
    fn name(&self) -> &str;
}
