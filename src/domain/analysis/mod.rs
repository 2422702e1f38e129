// Indicator, signal and result types
pub mod indicators;
pub mod result;
pub mod signal;

pub use indicators::{AugmentedSeries, IndicatorParams, IndicatorPoint, IndicatorSet};
pub use result::{
    AnalysisResult, Insights, Notice, NoticeKind, PassReport, PassTrigger, SymbolOutcome,
};
pub use signal::{
    BollingerZone, FeatureVector, ModelLabel, Recommendation, RsiThresholds, RsiZone, Trend,
    FEATURE_NAMES,
};
