//! Runs one analysis pass over a watch-list snapshot.
//!
//! Each symbol goes fetch -> indicators -> classify -> render -> deliver.
//! Failures are caught per symbol and become a [`Notice`], so one symbol
//! never aborts the batch. Outcomes keep watch-list order.

use crate::application::formatter::AlertFormatter;
use crate::application::indicator_engine::{IndicatorEngine, mean_volume};
use crate::application::signal_classifier::SignalClassifier;
use crate::domain::analysis::{
    AnalysisResult, AugmentedSeries, FeatureVector, IndicatorPoint, Insights, Notice, NoticeKind,
    PassReport, PassTrigger, SymbolOutcome, Trend,
};
use crate::domain::errors::{AnalysisError, IndicatorError, RenderError, WatchListError};
use crate::domain::market::{Interval, Symbol};
use crate::domain::ports::{Alert, AlertSink, ChartArtifact, ChartRenderer, MarketDataService};
use crate::domain::watchlist::{WatchList, WatchListSnapshot};
use chrono::Utc;
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Upper bound on in-flight market-data requests during a pass
const MAX_CONCURRENT_FETCHES: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VolumeParams {
    pub average_period: usize,
    pub spike_multiplier: f64,
}

impl Default for VolumeParams {
    fn default() -> Self {
        Self {
            average_period: 10,
            spike_multiplier: 2.0,
        }
    }
}

pub struct AnalysisOrchestrator {
    market_data: Arc<dyn MarketDataService>,
    engine: IndicatorEngine,
    classifier: SignalClassifier,
    renderer: Arc<dyn ChartRenderer>,
    sink: Arc<dyn AlertSink>,
    watchlist: Arc<WatchList>,
    volume: VolumeParams,
}

impl AnalysisOrchestrator {
    pub fn new(
        market_data: Arc<dyn MarketDataService>,
        engine: IndicatorEngine,
        classifier: SignalClassifier,
        renderer: Arc<dyn ChartRenderer>,
        sink: Arc<dyn AlertSink>,
        watchlist: Arc<WatchList>,
        volume: VolumeParams,
    ) -> Self {
        Self {
            market_data,
            engine,
            classifier,
            renderer,
            sink,
            watchlist,
            volume,
        }
    }

    pub fn watchlist(&self) -> &Arc<WatchList> {
        &self.watchlist
    }

    /// Fetch, compute and classify one symbol. No rendering, no delivery.
    pub async fn analyze(
        &self,
        symbol: &Symbol,
        interval: Interval,
    ) -> Result<(AnalysisResult, AugmentedSeries), AnalysisError> {
        let series = self.market_data.fetch(symbol, interval).await?;
        let augmented = self.engine.compute(&series)?;

        let Some(latest) = augmented.latest().copied() else {
            return Err(IndicatorError::InsufficientHistory {
                required: self.engine.params().warmup() + 1,
                available: series.len(),
            }
            .into());
        };

        let result = self.build_result(symbol, interval, latest);
        debug!(
            "Orchestrator: {} {} -> {} (rule {})",
            symbol, interval, result.recommendation, result.rule_signal
        );
        Ok((result, augmented))
    }

    fn build_result(
        &self,
        symbol: &Symbol,
        interval: Interval,
        latest: IndicatorPoint,
    ) -> AnalysisResult {
        let indicators = latest.indicators;
        let price = latest.candle.close;
        let (bollinger_zone, rsi_zone) = self.classifier.classify(
            price,
            indicators.rsi,
            indicators.bb_upper,
            indicators.bb_lower,
        );
        let features = FeatureVector {
            price,
            rsi: indicators.rsi,
            bb_upper: indicators.bb_upper,
            bb_lower: indicators.bb_lower,
            pct_change: indicators.pct_change,
        };

        AnalysisResult {
            symbol: symbol.clone(),
            interval,
            latest,
            bollinger_zone,
            rsi_zone,
            trend: Trend::classify(price, indicators.moving_average),
            rule_signal: SignalClassifier::rule_signal(rsi_zone, bollinger_zone),
            recommendation: self.classifier.recommend(&features),
            generated_at: Utc::now(),
        }
    }

    /// Runs the whole snapshot. At most `MAX_CONCURRENT_FETCHES` fetches
    /// are in flight; delivery is sequential so messages arrive in
    /// watch-list order.
    pub async fn run_once(&self, snapshot: &WatchListSnapshot, trigger: PassTrigger) -> PassReport {
        let started_at = Utc::now();
        let interval = snapshot.interval;
        info!(
            "Orchestrator: Starting {:?} pass over {} symbol(s) at {}",
            trigger,
            snapshot.symbols.len(),
            interval
        );

        let pending: Vec<_> = snapshot
            .symbols
            .iter()
            .map(|symbol| self.analyze(symbol, interval))
            .collect();
        let analyses: Vec<_> = stream::iter(pending)
            .buffered(MAX_CONCURRENT_FETCHES)
            .collect()
            .await;

        let mut outcomes = Vec::with_capacity(analyses.len());
        for (symbol, analysis) in snapshot.symbols.iter().zip(analyses) {
            let outcome = match self.publish(analysis).await {
                Ok(result) => SymbolOutcome::Delivered(Box::new(result)),
                Err(e) => {
                    let notice = Self::notice_for(symbol, &e);
                    self.deliver_notice(&notice).await;
                    SymbolOutcome::Notice(notice)
                }
            };
            outcomes.push(outcome);
        }

        PassReport {
            trigger,
            interval,
            started_at,
            finished_at: Utc::now(),
            outcomes,
        }
    }

    async fn publish(
        &self,
        analysis: Result<(AnalysisResult, AugmentedSeries), AnalysisError>,
    ) -> Result<AnalysisResult, AnalysisError> {
        let (result, augmented) = analysis?;
        let artifact = self.render(augmented).await?;
        let alert = Alert {
            text: AlertFormatter::analysis(&result),
            artifact,
        };
        self.sink.deliver(&alert).await?;
        Ok(result)
    }

    /// Chart rendering writes files, so it runs on the blocking pool
    async fn render(&self, series: AugmentedSeries) -> Result<Option<ChartArtifact>, RenderError> {
        let renderer = self.renderer.clone();
        tokio::task::spawn_blocking(move || renderer.render(&series))
            .await
            .map_err(|e| RenderError::Failed(format!("render task aborted: {}", e)))?
    }

    fn notice_for(symbol: &Symbol, error: &AnalysisError) -> Notice {
        let kind = if error.is_insufficient_data() {
            NoticeKind::InsufficientData
        } else {
            NoticeKind::Failed(error.to_string())
        };
        warn!("Orchestrator: {} skipped: {}", symbol, error);
        Notice {
            symbol: symbol.clone(),
            kind,
        }
    }

    async fn deliver_notice(&self, notice: &Notice) {
        let alert = Alert::text(AlertFormatter::notice(notice));
        if let Err(e) = self.sink.deliver(&alert).await {
            warn!(
                "Orchestrator: Could not deliver notice for {}: {}",
                notice.symbol, e
            );
        }
    }

    /// Single-symbol detailed view. Runs regardless of the active flag.
    pub async fn insights(&self, symbol: &Symbol) -> Result<Insights, AnalysisError> {
        if !self.watchlist.contains(symbol) {
            return Err(WatchListError::NotFound(symbol.clone()).into());
        }
        let interval = self.watchlist.get_interval();
        let (analysis, augmented) = self.analyze(symbol, interval).await?;

        let candles: Vec<_> = augmented.points.iter().map(|p| p.candle).collect();
        let volume = analysis.latest.candle.volume;
        let volume_average = mean_volume(&candles, self.volume.average_period)
            .unwrap_or_else(|| candles.iter().map(|c| c.volume).sum::<f64>() / candles.len() as f64);

        Ok(Insights {
            volume_spike: volume > self.volume.spike_multiplier * volume_average,
            analysis,
            volume,
            volume_average,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::signal_classifier::ModelPolicy;
    use crate::domain::analysis::{IndicatorParams, Recommendation, RsiThresholds};
    use crate::infrastructure::chart::NoopChartRenderer;
    use crate::infrastructure::mock::{MockMarketDataService, RecordingSink};
    use std::time::Duration;

    fn sym(s: &str) -> Symbol {
        Symbol::parse(s).unwrap()
    }

    fn orchestrator(
        market: Arc<MockMarketDataService>,
        sink: Arc<RecordingSink>,
        symbols: Vec<Symbol>,
    ) -> AnalysisOrchestrator {
        AnalysisOrchestrator::new(
            market,
            IndicatorEngine::new(IndicatorParams::default()).unwrap(),
            SignalClassifier::new(RsiThresholds::default(), ModelPolicy::RuleBased),
            Arc::new(NoopChartRenderer),
            sink,
            Arc::new(WatchList::new(symbols, Interval::OneHour)),
            VolumeParams::default(),
        )
    }

    #[tokio::test]
    async fn test_short_series_becomes_insufficient_data_notice() {
        let market = Arc::new(MockMarketDataService::new());
        market.set_candles(&sym("BTC-USDT"), MockMarketDataService::zigzag_candles(5));
        let sink = Arc::new(RecordingSink::new());
        let orch = orchestrator(market, sink.clone(), vec![sym("BTC-USDT")]);

        let err = orch.analyze(&sym("BTC-USDT"), Interval::OneHour).await.unwrap_err();
        assert!(err.is_insufficient_data());

        let report = orch
            .run_once(&orch.watchlist().snapshot(), PassTrigger::OnDemand)
            .await;
        assert_eq!(report.delivered_count(), 0);
        assert_eq!(
            report.outcomes[0].as_notice().map(|n| &n.kind),
            Some(&NoticeKind::InsufficientData)
        );
        assert_eq!(sink.texts(), vec!["⚠️ Insufficient data for BTC-USDT".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetch_concurrency_is_bounded() {
        let market = Arc::new(
            MockMarketDataService::with_synthetic_data().with_delay(Duration::from_millis(100)),
        );
        let symbols: Vec<Symbol> = (0..8).map(|i| sym(&format!("C{}-USDT", i))).collect();
        let sink = Arc::new(RecordingSink::new());
        let orch = orchestrator(market.clone(), sink.clone(), symbols.clone());

        let started = tokio::time::Instant::now();
        let report = orch
            .run_once(&orch.watchlist().snapshot(), PassTrigger::Scheduled)
            .await;
        let elapsed = started.elapsed();

        // Two waves of four: slower than fully parallel, faster than serial
        assert!(elapsed >= Duration::from_millis(200), "{:?}", elapsed);
        assert!(elapsed < Duration::from_millis(400), "{:?}", elapsed);
        assert_eq!(market.fetch_count(), 8);

        let order: Vec<_> = report.outcomes.iter().map(|o| o.symbol().clone()).collect();
        assert_eq!(order, symbols);
        assert_eq!(sink.alerts().len(), 8);
    }

    #[tokio::test]
    async fn test_insights_rejects_unknown_symbol() {
        let market = Arc::new(MockMarketDataService::new());
        let orch = orchestrator(market, Arc::new(RecordingSink::new()), vec![sym("BTC-USDT")]);

        let err = orch.insights(&sym("DOGE-USDT")).await.unwrap_err();
        assert_eq!(
            err,
            AnalysisError::WatchList(WatchListError::NotFound(sym("DOGE-USDT")))
        );
    }

    #[tokio::test]
    async fn test_insights_flags_volume_spike() {
        let market = Arc::new(MockMarketDataService::new());
        let mut candles = MockMarketDataService::zigzag_candles(30);
        if let Some(last) = candles.last_mut() {
            last.volume *= 5.0;
        }
        market.set_candles(&sym("BTC-USDT"), candles);
        let orch = orchestrator(market, Arc::new(RecordingSink::new()), vec![sym("BTC-USDT")]);

        let insights = orch.insights(&sym("BTC-USDT")).await.unwrap();
        assert!(insights.volume_spike);
        assert!(insights.volume > insights.volume_average);
        assert_eq!(insights.analysis.rule_signal, Recommendation::Hold);
    }
}
