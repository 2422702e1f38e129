#![allow(dead_code)]

use marketwatch::application::signal_classifier::ModelPolicy;
use marketwatch::application::system::Application;
use marketwatch::config::{
    AnalysisEnvConfig, Config, MarketDataEnvConfig, Mode, WatchListEnvConfig,
};
use marketwatch::domain::analysis::{IndicatorParams, RsiThresholds};
use marketwatch::domain::market::{Interval, Symbol};
use marketwatch::domain::ports::ChartRenderer;
use marketwatch::infrastructure::chart::NoopChartRenderer;
use marketwatch::infrastructure::mock::{MockMarketDataService, RecordingSink};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

pub fn sym(s: &str) -> Symbol {
    Symbol::parse(s).unwrap()
}

pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_test_writer()
        .try_init();
}

pub fn config(symbols: &[&str]) -> Config {
    Config {
        mode: Mode::Mock,
        market_data: MarketDataEnvConfig {
            kucoin_base_url: "https://api.kucoin.com".to_string(),
            http_timeout: Duration::from_secs(10),
            http_max_retries: 0,
        },
        analysis: AnalysisEnvConfig {
            indicators: IndicatorParams::default(),
            thresholds: RsiThresholds::default(),
            volume: Default::default(),
            model_path: None,
            chart_dir: PathBuf::from("charts"),
        },
        watchlist: WatchListEnvConfig {
            symbols: symbols.iter().map(|s| sym(s)).collect(),
            default_interval: Interval::OneHour,
            schedule_period: Duration::from_secs(1800),
            auto_start: false,
        },
        telegram: None,
    }
}

/// Application wired around a scripted market and a recording sink
pub struct Harness {
    pub app: Application,
    pub market: Arc<MockMarketDataService>,
    pub sink: Arc<RecordingSink>,
}

pub fn harness(symbols: &[&str], market: MockMarketDataService, policy: ModelPolicy) -> Harness {
    harness_with_renderer(symbols, market, policy, Arc::new(NoopChartRenderer))
}

pub fn harness_with_renderer(
    symbols: &[&str],
    market: MockMarketDataService,
    policy: ModelPolicy,
    renderer: Arc<dyn ChartRenderer>,
) -> Harness {
    init_logging();
    let market = Arc::new(market);
    let sink = Arc::new(RecordingSink::new());
    let app = Application::with_components(
        config(symbols),
        market.clone(),
        renderer,
        sink.clone(),
        policy,
    )
    .unwrap();
    Harness { app, market, sink }
}
