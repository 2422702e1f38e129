//! Indicator windows, classifier thresholds, model and chart output.

use super::{optional_env, parse_env};
use crate::application::orchestrator::VolumeParams;
use crate::domain::analysis::{IndicatorParams, RsiThresholds};
use anyhow::{Result, ensure};
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct AnalysisEnvConfig {
    pub indicators: IndicatorParams,
    pub thresholds: RsiThresholds,
    pub volume: VolumeParams,
    pub model_path: Option<PathBuf>,
    pub chart_dir: PathBuf,
}

impl AnalysisEnvConfig {
    pub fn from_env() -> Result<Self> {
        let indicators = IndicatorParams {
            rsi_period: parse_env("RSI_PERIOD", 14)?,
            bb_period: parse_env("BB_PERIOD", 20)?,
            bb_std_dev: parse_env("BB_STD_DEV", 2.0)?,
            ma_period: parse_env("MA_PERIOD", 20)?,
        };
        ensure!(
            indicators.rsi_period > 0 && indicators.bb_period > 0 && indicators.ma_period > 0,
            "Indicator periods must be greater than 0"
        );
        ensure!(
            indicators.bb_std_dev.is_finite() && indicators.bb_std_dev > 0.0,
            "BB_STD_DEV must be a positive number"
        );

        let thresholds = RsiThresholds {
            oversold: parse_env("RSI_OVERSOLD", 30.0)?,
            overbought: parse_env("RSI_OVERBOUGHT", 70.0)?,
        };
        ensure!(
            (0.0..=100.0).contains(&thresholds.oversold)
                && (0.0..=100.0).contains(&thresholds.overbought)
                && thresholds.oversold < thresholds.overbought,
            "RSI thresholds must satisfy 0 <= RSI_OVERSOLD < RSI_OVERBOUGHT <= 100"
        );

        let volume = VolumeParams {
            average_period: parse_env("VOLUME_AVG_PERIOD", 10)?,
            spike_multiplier: parse_env("VOLUME_SPIKE_MULTIPLIER", 2.0)?,
        };
        ensure!(
            volume.average_period > 0,
            "VOLUME_AVG_PERIOD must be greater than 0"
        );

        Ok(Self {
            indicators,
            thresholds,
            volume,
            model_path: optional_env("MODEL_PATH").map(PathBuf::from),
            chart_dir: optional_env("CHART_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("charts")),
        })
    }
}
