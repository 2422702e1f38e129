//! Chat command surface. Text is parsed once into a [`Command`], then each
//! command maps onto exactly one watch-list or scheduler operation.

use crate::application::formatter::AlertFormatter;
use crate::application::scheduler::AnalysisScheduler;
use crate::domain::errors::{AnalysisError, InvalidInterval, SymbolError, WatchListError};
use crate::domain::market::{Interval, Symbol};
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start,
    Stop,
    Now,
    List,
    Add(Symbol),
    Remove(Symbol),
    Interval(Interval),
    Insights(Symbol),
    Menu,
    Help,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("❗ Use: {usage}")]
    MissingArgument { usage: &'static str },

    #[error("❗ Unknown command '{0}'. Send /help for the list of commands.")]
    UnknownCommand(String),

    #[error("❗ {0}")]
    InvalidSymbol(#[from] SymbolError),

    #[error("❗ {0}")]
    InvalidInterval(#[from] InvalidInterval),
}

impl Command {
    pub fn parse(text: &str) -> Result<Self, ParseError> {
        let mut parts = text.split_whitespace();
        let head = parts.next().unwrap_or_default();
        // "/add@my_bot BTC-USDT" in group chats
        let name = head
            .split('@')
            .next()
            .unwrap_or_default()
            .trim_start_matches('/')
            .to_ascii_lowercase();
        let argument = parts.next();

        let symbol_arg = |usage: &'static str| -> Result<Symbol, ParseError> {
            let raw = argument.ok_or(ParseError::MissingArgument { usage })?;
            Ok(Symbol::parse(raw)?)
        };

        match name.as_str() {
            "start" => Ok(Command::Start),
            "stop" => Ok(Command::Stop),
            "now" | "agora" => Ok(Command::Now),
            "list" => Ok(Command::List),
            "add" => symbol_arg("/add BTC-USDT").map(Command::Add),
            "remove" => symbol_arg("/remove BTC-USDT").map(Command::Remove),
            "insights" => symbol_arg("/insights BTC-USDT").map(Command::Insights),
            "interval" | "intervalo" => {
                let raw = argument.ok_or(ParseError::MissingArgument {
                    usage: "/interval 1hour",
                })?;
                Ok(Command::Interval(raw.parse::<Interval>()?))
            }
            "menu" => Ok(Command::Menu),
            "help" => Ok(Command::Help),
            _ => Err(ParseError::UnknownCommand(head.to_string())),
        }
    }

    /// Inline keyboard callbacks use the bare command name
    pub fn from_callback(data: &str) -> Result<Self, ParseError> {
        Self::parse(&format!("/{}", data.trim()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Button {
    pub label: String,
    pub data: String,
}

impl Button {
    fn new(label: &str, data: &str) -> Self {
        Self {
            label: label.to_string(),
            data: data.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    pub keyboard: Option<Vec<Vec<Button>>>,
}

impl Reply {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            keyboard: None,
        }
    }
}

impl From<ParseError> for Reply {
    fn from(e: ParseError) -> Self {
        Reply::text(e.to_string())
    }
}

pub struct CommandService {
    scheduler: Arc<AnalysisScheduler>,
}

impl CommandService {
    pub fn new(scheduler: Arc<AnalysisScheduler>) -> Self {
        Self { scheduler }
    }

    /// Parses and handles raw chat text
    pub async fn handle_text(&self, text: &str) -> Reply {
        match Command::parse(text) {
            Ok(command) => self.handle(command).await,
            Err(e) => e.into(),
        }
    }

    pub async fn handle(&self, command: Command) -> Reply {
        info!("CommandService: Handling {:?}", command);
        let orchestrator = self.scheduler.orchestrator();
        let watchlist = orchestrator.watchlist();

        match command {
            Command::Start => {
                watchlist.set_active(true);
                Reply::text(format!(
                    "✅ Automatic analysis enabled every {} minutes.",
                    self.scheduler.period().as_secs() / 60
                ))
            }
            Command::Stop => {
                watchlist.set_active(false);
                Reply::text("🛑 Automatic analysis paused.")
            }
            Command::Now => match self.scheduler.trigger_now() {
                Ok(_) => Reply::text("⏳ Generating analysis now..."),
                Err(e) => Reply::text(format!("⏳ {}.", e)),
            },
            Command::List => {
                let snapshot = watchlist.snapshot();
                if snapshot.symbols.is_empty() {
                    return Reply::text("📋 The watch-list is empty.");
                }
                let lines: Vec<String> = snapshot
                    .symbols
                    .iter()
                    .map(|s| format!("• {}", s))
                    .collect();
                Reply::text(format!(
                    "📋 Watch-list ({}, {}):\n{}",
                    snapshot.interval,
                    if snapshot.active { "active" } else { "paused" },
                    lines.join("\n")
                ))
            }
            Command::Add(symbol) => match watchlist.add(symbol.clone()) {
                Ok(()) => Reply::text(format!("✅ {} added to the watch-list.", symbol)),
                Err(e) => Reply::text(format!("⚠️ {}.", e)),
            },
            Command::Remove(symbol) => match watchlist.remove(&symbol) {
                Ok(()) => Reply::text(format!("✅ {} removed from the watch-list.", symbol)),
                Err(e) => Reply::text(format!("⚠️ {}.", e)),
            },
            Command::Interval(interval) => {
                watchlist.set_interval(interval);
                Reply::text(format!("🔁 Interval changed to {}.", interval))
            }
            Command::Insights(symbol) => match orchestrator.insights(&symbol).await {
                Ok(insights) => Reply::text(AlertFormatter::insights(&insights)),
                Err(AnalysisError::WatchList(e @ WatchListError::NotFound(_))) => {
                    Reply::text(format!("⚠️ {}.", e))
                }
                Err(e) if e.is_insufficient_data() => {
                    Reply::text(format!("⚠️ Insufficient data for {}", symbol))
                }
                Err(e) => {
                    warn!("CommandService: Insights for {} failed: {}", symbol, e);
                    Reply::text(format!("⚠️ Analysis failed for {}: {}", symbol, e))
                }
            },
            Command::Menu => Reply {
                text: "📍 Interactive menu:".to_string(),
                keyboard: Some(vec![
                    vec![Button::new("📊 Send analysis now", "now")],
                    vec![Button::new("📋 Show watch-list", "list")],
                    vec![Button::new("➕ Add symbol", "add")],
                    vec![Button::new("➖ Remove symbol", "remove")],
                    vec![Button::new("🔁 Change interval", "interval")],
                    vec![Button::new("📈 Insights", "insights")],
                ]),
            },
            Command::Help => Reply::text(help_text()),
        }
    }
}

fn help_text() -> String {
    let intervals: Vec<&str> = Interval::all().iter().map(|i| i.as_str()).collect();
    format!(
        "Available commands:\n\
         /start - enable automatic analysis\n\
         /stop - pause automatic analysis\n\
         /now - run an analysis pass now\n\
         /list - show the watch-list\n\
         /add SYMBOL - add a symbol (e.g. BTC-USDT)\n\
         /remove SYMBOL - remove a symbol\n\
         /interval X - change the candle interval ({})\n\
         /insights SYMBOL - detailed view of one symbol\n\
         /menu - interactive menu",
        intervals.join(", ")
    )
}
