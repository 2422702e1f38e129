pub mod client;
pub mod poller;

pub use client::TelegramClient;
pub use poller::TelegramCommandPoller;
