use crate::application::commands::CommandService;
use crate::application::indicator_engine::IndicatorEngine;
use crate::application::orchestrator::AnalysisOrchestrator;
use crate::application::scheduler::{AnalysisScheduler, SchedulerState};
use crate::application::signal_classifier::{ModelPolicy, SignalClassifier};
use crate::config::{Config, Mode};
use crate::domain::ports::{AlertSink, ChartRenderer, MarketDataService};
use crate::domain::watchlist::WatchList;
use crate::infrastructure::chart::SvgChartRenderer;
use crate::infrastructure::console::LogSink;
use crate::infrastructure::kucoin::KucoinMarketDataService;
use crate::infrastructure::ml::load_policy;
use crate::infrastructure::mock::MockMarketDataService;
use crate::infrastructure::telegram::{TelegramClient, TelegramCommandPoller};
use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Running system. Dropping it leaves the background tasks running;
/// call [`SystemHandle::shutdown`] to stop them.
pub struct SystemHandle {
    pub watchlist: Arc<WatchList>,
    pub scheduler: Arc<AnalysisScheduler>,
    pub commands: Arc<CommandService>,
    shutdown_tx: watch::Sender<bool>,
    tasks: Vec<JoinHandle<()>>,
}

impl SystemHandle {
    /// Signals the scheduler loop and the poller, then waits for both.
    /// A pass already in flight, including one started by `/now`,
    /// finishes first.
    pub async fn shutdown(self) {
        info!("Initiating graceful shutdown...");
        let _ = self.shutdown_tx.send(true);
        for task in self.tasks {
            if let Err(e) = task.await {
                warn!("Background task ended abnormally: {}", e);
            }
        }
        if self.scheduler.state() == SchedulerState::Running {
            info!("Waiting for the in-flight pass to finish...");
        }
        self.scheduler.wait_idle().await;
        info!("Shutdown complete.");
    }
}

pub struct Application {
    pub config: Config,
    pub watchlist: Arc<WatchList>,
    pub scheduler: Arc<AnalysisScheduler>,
    pub commands: Arc<CommandService>,
    telegram: Option<Arc<TelegramClient>>,
}

impl Application {
    /// Builds the adapters selected by `config.mode` and the optional
    /// Telegram transport.
    pub async fn build(config: Config) -> Result<Self> {
        info!("Building marketwatch (Mode: {:?})...", config.mode);

        let market_data: Arc<dyn MarketDataService> = match config.mode {
            Mode::Mock => Arc::new(MockMarketDataService::with_synthetic_data()),
            Mode::Kucoin => Arc::new(
                KucoinMarketDataService::builder()
                    .base_url(config.market_data.kucoin_base_url.clone())
                    .timeout(config.market_data.http_timeout)
                    .max_retries(config.market_data.http_max_retries)
                    .build(),
            ),
        };

        let telegram = config.telegram.as_ref().map(|t| {
            Arc::new(TelegramClient::new(
                t.api_url.clone(),
                t.bot_token.clone(),
                t.chat_id,
                t.poll_timeout,
            ))
        });
        let sink: Arc<dyn AlertSink> = match &telegram {
            Some(client) => client.clone(),
            None => {
                warn!("TELEGRAM_BOT_TOKEN not set. Alerts will only be logged.");
                Arc::new(LogSink)
            }
        };

        let renderer = Arc::new(SvgChartRenderer::new(config.analysis.chart_dir.clone()));
        let policy = load_policy(config.analysis.model_path.as_deref());

        let mut app = Self::with_components(config, market_data, renderer, sink, policy)?;
        app.telegram = telegram;
        Ok(app)
    }

    /// Wires the core around caller-supplied adapters
    pub fn with_components(
        config: Config,
        market_data: Arc<dyn MarketDataService>,
        renderer: Arc<dyn ChartRenderer>,
        sink: Arc<dyn AlertSink>,
        policy: ModelPolicy,
    ) -> Result<Self> {
        let watchlist = Arc::new(WatchList::new(
            config.watchlist.symbols.clone(),
            config.watchlist.default_interval,
        ));

        let engine = IndicatorEngine::new(config.analysis.indicators)
            .context("Invalid indicator configuration")?;
        let classifier = SignalClassifier::new(config.analysis.thresholds, policy);

        let orchestrator = Arc::new(AnalysisOrchestrator::new(
            market_data,
            engine,
            classifier,
            renderer,
            sink,
            watchlist.clone(),
            config.analysis.volume,
        ));
        let scheduler = Arc::new(AnalysisScheduler::new(
            orchestrator,
            config.watchlist.schedule_period,
        ));
        let commands = Arc::new(CommandService::new(scheduler.clone()));

        Ok(Self {
            config,
            watchlist,
            scheduler,
            commands,
            telegram: None,
        })
    }

    pub async fn start(self) -> Result<SystemHandle> {
        if self.config.watchlist.auto_start {
            self.watchlist.set_active(true);
        }

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let mut tasks = Vec::new();

        let scheduler = self.scheduler.clone();
        let scheduler_rx = shutdown_rx.clone();
        tasks.push(tokio::spawn(async move {
            scheduler.run(scheduler_rx).await;
        }));

        match (&self.telegram, &self.config.telegram) {
            (Some(client), Some(telegram)) => {
                let poller = TelegramCommandPoller::new(
                    client.clone(),
                    self.commands.clone(),
                    telegram.poll_timeout,
                );
                tasks.push(tokio::spawn(poller.run(shutdown_rx)));
            }
            _ => info!("No chat transport configured; command surface disabled."),
        }

        info!(
            "System running: {} symbol(s), interval {}, every {} min, {}",
            self.watchlist.list().len(),
            self.watchlist.get_interval(),
            self.config.watchlist.schedule_period.as_secs() / 60,
            if self.watchlist.is_active() { "active" } else { "paused" }
        );

        Ok(SystemHandle {
            watchlist: self.watchlist,
            scheduler: self.scheduler,
            commands: self.commands,
            shutdown_tx,
            tasks,
        })
    }
}
