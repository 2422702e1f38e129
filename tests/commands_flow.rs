mod common;

use common::{harness, sym};
use marketwatch::application::commands::Command;
use marketwatch::application::signal_classifier::ModelPolicy;
use marketwatch::infrastructure::mock::MockMarketDataService;
use std::time::Duration;
use tokio::time::sleep;

#[tokio::test]
async fn test_watchlist_commands() {
    let h = harness(
        &["BTC-USDT"],
        MockMarketDataService::with_synthetic_data(),
        ModelPolicy::RuleBased,
    );
    let commands = &h.app.commands;

    let reply = commands.handle_text("/add eth-usdt").await;
    assert!(reply.text.contains("ETH-USDT added"));

    let reply = commands.handle_text("/add ETH-USDT").await;
    assert!(reply.text.contains("already in the watch-list"));
    assert_eq!(h.app.watchlist.list(), vec![sym("BTC-USDT"), sym("ETH-USDT")]);

    let reply = commands.handle_text("/remove DOGE-USDT").await;
    assert!(reply.text.contains("not in the watch-list"));

    let reply = commands.handle_text("/list").await;
    assert!(reply.text.contains("• BTC-USDT\n• ETH-USDT"));
    assert!(reply.text.contains("paused"));
}

#[tokio::test]
async fn test_interval_command_validates() {
    let h = harness(
        &["BTC-USDT"],
        MockMarketDataService::with_synthetic_data(),
        ModelPolicy::RuleBased,
    );

    let reply = h.app.commands.handle_text("/interval bogus").await;
    assert!(reply.text.contains("Invalid interval 'bogus'"));
    assert_eq!(h.app.watchlist.get_interval().as_str(), "1hour");

    let reply = h.app.commands.handle_text("/intervalo 4hour").await;
    assert!(reply.text.contains("Valid options"));

    let reply = h.app.commands.handle_text("/interval 15min").await;
    assert!(reply.text.contains("15min"));
    assert_eq!(h.app.watchlist.get_interval().as_str(), "15min");
}

#[tokio::test]
async fn test_start_stop_toggle_active() {
    let h = harness(
        &["BTC-USDT"],
        MockMarketDataService::with_synthetic_data(),
        ModelPolicy::RuleBased,
    );

    let reply = h.app.commands.handle(Command::Start).await;
    assert!(reply.text.contains("every 30 minutes"));
    assert!(h.app.watchlist.is_active());

    h.app.commands.handle(Command::Stop).await;
    assert!(!h.app.watchlist.is_active());
}

#[tokio::test]
async fn test_now_while_busy_reports_in_progress() {
    let h = harness(
        &["BTC-USDT"],
        MockMarketDataService::with_synthetic_data().with_delay(Duration::from_millis(300)),
        ModelPolicy::RuleBased,
    );

    let reply = h.app.commands.handle_text("/now").await;
    assert!(reply.text.contains("Generating analysis"));
    sleep(Duration::from_millis(50)).await;

    let reply = h.app.commands.handle_text("/agora").await;
    assert!(reply.text.contains("already in progress"));

    sleep(Duration::from_millis(600)).await;
    assert_eq!(h.sink.alerts().len(), 1);
    assert_eq!(h.market.fetch_count(), 1);
}

#[tokio::test]
async fn test_insights_command() {
    let h = harness(
        &["BTC-USDT"],
        MockMarketDataService::with_synthetic_data(),
        ModelPolicy::RuleBased,
    );

    let reply = h.app.commands.handle_text("/insights DOGE-USDT").await;
    assert!(reply.text.contains("DOGE-USDT is not in the watch-list"));
    assert_eq!(h.market.fetch_count(), 0);

    // Paused mode does not block insights
    let reply = h.app.commands.handle_text("/insights btc-usdt").await;
    assert!(reply.text.contains("BTC-USDT"));
    assert_eq!(h.market.fetch_count(), 1);
    // Insights reply goes to the caller, not the alert sink
    assert!(h.sink.alerts().is_empty());
}

#[tokio::test]
async fn test_menu_and_callbacks() {
    let h = harness(
        &["BTC-USDT"],
        MockMarketDataService::with_synthetic_data(),
        ModelPolicy::RuleBased,
    );

    let reply = h.app.commands.handle_text("/menu").await;
    let keyboard = reply.keyboard.expect("menu keyboard");
    let data: Vec<&str> = keyboard.iter().flatten().map(|b| b.data.as_str()).collect();
    assert_eq!(
        data,
        vec!["now", "list", "add", "remove", "interval", "insights"]
    );

    assert_eq!(Command::from_callback("list"), Ok(Command::List));
    // Buttons that need an argument answer with usage
    let reply = match Command::from_callback("add") {
        Ok(command) => h.app.commands.handle(command).await,
        Err(e) => e.into(),
    };
    assert!(reply.text.contains("/add BTC-USDT"));

    let reply = h.app.commands.handle_text("/frobnicate").await;
    assert!(reply.text.contains("Unknown command"));
}
