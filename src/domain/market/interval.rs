use crate::domain::errors::InvalidInterval;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Candle sampling granularity.
///
/// Exactly one interval is active process-wide; unknown names are
/// rejected, never coerced to a default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Interval {
    OneMin,
    FiveMin,
    FifteenMin,
    ThirtyMin,
    OneHour,
    OneDay,
    OneWeek,
}

impl Interval {
    /// Returns the duration in seconds
    pub fn to_seconds(&self) -> i64 {
        match self {
            Interval::OneMin => 60,
            Interval::FiveMin => 300,
            Interval::FifteenMin => 900,
            Interval::ThirtyMin => 1_800,
            Interval::OneHour => 3_600,
            Interval::OneDay => 86_400,
            Interval::OneWeek => 604_800,
        }
    }

    /// Canonical name, also the KuCoin `type` query value
    pub fn as_str(&self) -> &'static str {
        match self {
            Interval::OneMin => "1min",
            Interval::FiveMin => "5min",
            Interval::FifteenMin => "15min",
            Interval::ThirtyMin => "30min",
            Interval::OneHour => "1hour",
            Interval::OneDay => "1day",
            Interval::OneWeek => "1week",
        }
    }

    /// Returns all available intervals in ascending order
    pub fn all() -> [Interval; 7] {
        [
            Interval::OneMin,
            Interval::FiveMin,
            Interval::FifteenMin,
            Interval::ThirtyMin,
            Interval::OneHour,
            Interval::OneDay,
            Interval::OneWeek,
        ]
    }
}

impl FromStr for Interval {
    type Err = InvalidInterval;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Interval::all()
            .into_iter()
            .find(|i| i.as_str() == wanted)
            .ok_or_else(|| InvalidInterval(s.to_string()))
    }
}

impl TryFrom<String> for Interval {
    type Error = InvalidInterval;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Interval> for String {
    fn from(interval: Interval) -> Self {
        interval.as_str().to_string()
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
