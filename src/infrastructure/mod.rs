pub mod chart;
pub mod console;
pub mod core;
pub mod kucoin;
pub mod ml;
pub mod mock;
pub mod telegram;

pub use console::LogSink;
pub use kucoin::KucoinMarketDataService;
pub use telegram::{TelegramClient, TelegramCommandPoller};
