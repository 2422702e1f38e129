use crate::domain::analysis::indicators::IndicatorPoint;
use crate::domain::analysis::signal::{BollingerZone, Recommendation, RsiZone, Trend};
use crate::domain::market::{Interval, Symbol};
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisResult {
    pub symbol: Symbol,
    pub interval: Interval,
    pub latest: IndicatorPoint,
    pub bollinger_zone: BollingerZone,
    pub rsi_zone: RsiZone,
    pub trend: Trend,
    /// Threshold policy output, always committed
    pub rule_signal: Recommendation,
    /// Final recommendation; `Unavailable` when the model could not answer
    pub recommendation: Recommendation,
    pub generated_at: DateTime<Utc>,
}

impl AnalysisResult {
    pub fn price(&self) -> f64 {
        self.latest.candle.close
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum NoticeKind {
    InsufficientData,
    Failed(String),
}

/// User-visible replacement for a result that could not be produced
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub symbol: Symbol,
    pub kind: NoticeKind,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum SymbolOutcome {
    Delivered(Box<AnalysisResult>),
    Notice(Notice),
}

impl SymbolOutcome {
    pub fn symbol(&self) -> &Symbol {
        match self {
            SymbolOutcome::Delivered(result) => &result.symbol,
            SymbolOutcome::Notice(notice) => &notice.symbol,
        }
    }

    pub fn as_result(&self) -> Option<&AnalysisResult> {
        match self {
            SymbolOutcome::Delivered(result) => Some(result),
            SymbolOutcome::Notice(_) => None,
        }
    }

    pub fn as_notice(&self) -> Option<&Notice> {
        match self {
            SymbolOutcome::Notice(notice) => Some(notice),
            SymbolOutcome::Delivered(_) => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PassTrigger {
    Scheduled,
    OnDemand,
}

/// Outcome of one full iteration over the watch-list
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PassReport {
    pub trigger: PassTrigger,
    pub interval: Interval,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub outcomes: Vec<SymbolOutcome>,
}

impl PassReport {
    pub fn delivered_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.as_result().is_some()).count()
    }

    pub fn notice_count(&self) -> usize {
        self.outcomes.len() - self.delivered_count()
    }
}

/// Detailed single-symbol view behind `/insights`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Insights {
    pub analysis: AnalysisResult,
    pub volume: f64,
    pub volume_average: f64,
    pub volume_spike: bool,
}
