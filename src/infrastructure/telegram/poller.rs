use super::client::{TelegramClient, Update};
use crate::application::commands::{Command, CommandService, Reply};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, info, warn};

const ERROR_BACKOFF: Duration = Duration::from_secs(5);

/// What the poller acts on after filtering an update
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Incoming {
    Text(String),
    Callback { id: String, data: String },
}

/// Keeps updates from the configured chat only
pub fn route_update(update: &Update, chat_id: i64) -> Option<Incoming> {
    if let Some(message) = &update.message {
        if message.chat.id != chat_id {
            debug!(
                "TelegramCommandPoller: Ignoring message from chat {}",
                message.chat.id
            );
            return None;
        }
        return message
            .text
            .as_ref()
            .filter(|t| t.trim_start().starts_with('/'))
            .map(|t| Incoming::Text(t.clone()));
    }

    let callback = update.callback_query.as_ref()?;
    let from_chat = callback.message.as_ref().map(|m| m.chat.id);
    if from_chat != Some(chat_id) {
        debug!("TelegramCommandPoller: Ignoring callback from chat {:?}", from_chat);
        return None;
    }
    Some(Incoming::Callback {
        id: callback.id.clone(),
        data: callback.data.clone().unwrap_or_default(),
    })
}

pub struct TelegramCommandPoller {
    client: Arc<TelegramClient>,
    commands: Arc<CommandService>,
    poll_timeout: Duration,
}

impl TelegramCommandPoller {
    pub fn new(
        client: Arc<TelegramClient>,
        commands: Arc<CommandService>,
        poll_timeout: Duration,
    ) -> Self {
        Self {
            client,
            commands,
            poll_timeout,
        }
    }

    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        info!(
            "TelegramCommandPoller: Listening for commands in chat {}",
            self.client.chat_id()
        );
        let mut offset: i64 = 0;

        loop {
            let polled = tokio::select! {
                polled = self.client.get_updates(offset, self.poll_timeout) => polled,
                _ = shutdown.changed() => break,
            };

            match polled {
                Ok(updates) => {
                    for update in updates {
                        offset = offset.max(update.update_id + 1);
                        if let Some(incoming) = route_update(&update, self.client.chat_id()) {
                            self.dispatch(incoming).await;
                        }
                    }
                }
                Err(e) => {
                    warn!("TelegramCommandPoller: Polling failed: {:#}", e);
                    tokio::select! {
                        _ = tokio::time::sleep(ERROR_BACKOFF) => {}
                        _ = shutdown.changed() => break,
                    }
                }
            }
        }

        info!("TelegramCommandPoller: Shutdown signal received, stopping");
    }

    async fn dispatch(&self, incoming: Incoming) {
        let reply = match incoming {
            Incoming::Text(text) => self.commands.handle_text(&text).await,
            Incoming::Callback { id, data } => {
                if let Err(e) = self.client.answer_callback_query(&id).await {
                    debug!("TelegramCommandPoller: Could not answer callback: {:#}", e);
                }
                match Command::from_callback(&data) {
                    Ok(command) => self.commands.handle(command).await,
                    Err(e) => Reply::from(e),
                }
            }
        };

        if let Err(e) = self
            .client
            .send_message(&reply.text, reply.keyboard.as_deref())
            .await
        {
            warn!("TelegramCommandPoller: Failed to send reply: {:#}", e);
        }
    }
}
