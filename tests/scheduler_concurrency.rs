mod common;

use common::harness;
use marketwatch::application::scheduler::SchedulerState;
use marketwatch::application::signal_classifier::ModelPolicy;
use marketwatch::domain::analysis::PassTrigger;
use marketwatch::domain::errors::SchedulerError;
use marketwatch::infrastructure::mock::MockMarketDataService;
use std::time::Duration;
use tokio::time::sleep;
use tokio_test::{assert_err, assert_ok};

fn slow_market() -> MockMarketDataService {
    MockMarketDataService::with_synthetic_data().with_delay(Duration::from_millis(300))
}

#[tokio::test]
async fn test_second_on_demand_pass_is_rejected_while_running() {
    let h = harness(&["BTC-USDT", "ETH-USDT"], slow_market(), ModelPolicy::RuleBased);
    let scheduler = h.app.scheduler.clone();

    let first = assert_ok!(scheduler.trigger_now());
    sleep(Duration::from_millis(50)).await;
    assert_eq!(scheduler.state(), SchedulerState::Running);

    assert_eq!(scheduler.run_now().await, Err(SchedulerError::AlreadyRunning));
    assert_err!(scheduler.trigger_now());

    let report = first.await.unwrap();
    assert_eq!(report.outcomes.len(), 2);
    assert_eq!(scheduler.state(), SchedulerState::Idle);

    // Exactly one pass touched the market
    assert_eq!(h.market.fetch_count(), 2);
    assert_eq!(h.sink.alerts().len(), 2);
}

#[tokio::test]
async fn test_tick_during_pass_is_dropped() {
    let h = harness(&["BTC-USDT"], slow_market(), ModelPolicy::RuleBased);
    h.app.watchlist.set_active(true);
    let scheduler = h.app.scheduler.clone();

    let running = scheduler.trigger_now().unwrap();
    sleep(Duration::from_millis(50)).await;

    assert!(scheduler.on_tick().await.is_none());

    running.await.unwrap();
    assert_eq!(h.market.fetch_count(), 1);

    let report = scheduler.on_tick().await.expect("tick runs once idle");
    assert_eq!(report.trigger, PassTrigger::Scheduled);
}

#[tokio::test]
async fn test_paused_ticks_skip_but_on_demand_runs() {
    let h = harness(
        &["BTC-USDT"],
        MockMarketDataService::with_synthetic_data(),
        ModelPolicy::RuleBased,
    );
    assert!(!h.app.watchlist.is_active());

    assert!(h.app.scheduler.on_tick().await.is_none());
    assert_eq!(h.market.fetch_count(), 0);

    let report = assert_ok!(h.app.scheduler.run_now().await);
    assert_eq!(report.delivered_count(), 1);
}

#[tokio::test]
async fn test_concurrent_triggers_admit_one_pass() {
    let h = harness(&["BTC-USDT"], slow_market(), ModelPolicy::RuleBased);
    let scheduler = h.app.scheduler.clone();

    let attempts = (0..10).map(|_| {
        let scheduler = scheduler.clone();
        tokio::spawn(async move { scheduler.run_now().await })
    });
    let results = futures::future::join_all(attempts).await;

    let admitted = results
        .into_iter()
        .map(|r| r.unwrap())
        .filter(|r| r.is_ok())
        .count();
    assert_eq!(admitted, 1);
    assert_eq!(h.market.fetch_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_timer_loop_fires_after_period_and_stops_on_shutdown() {
    let h = harness(
        &["BTC-USDT"],
        MockMarketDataService::with_synthetic_data(),
        ModelPolicy::RuleBased,
    );
    h.app.watchlist.set_active(true);
    let scheduler = h.app.scheduler.clone();
    let period = scheduler.period();

    let (tx, rx) = tokio::sync::watch::channel(false);
    let task = tokio::spawn(scheduler.clone().run(rx));

    // Nothing fires immediately at start
    sleep(period / 2).await;
    assert_eq!(h.market.fetch_count(), 0);

    sleep(period).await;
    assert_eq!(h.market.fetch_count(), 1);

    tx.send(true).unwrap();
    task.await.unwrap();
}
