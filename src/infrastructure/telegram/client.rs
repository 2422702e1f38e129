//! Thin Telegram Bot API client: text messages, chart documents, inline
//! keyboards and `getUpdates` long polling.

use crate::application::commands::Button;
use crate::domain::errors::DeliveryError;
use crate::domain::ports::{Alert, AlertSink, ChartArtifact};
use crate::infrastructure::core::HttpClientFactory;
use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use reqwest::Client;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::time::Duration;
use tracing::{debug, info};

#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<Message>,
    #[serde(default)]
    pub callback_query: Option<CallbackQuery>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub chat: Chat,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CallbackQuery {
    pub id: String,
    #[serde(default)]
    pub data: Option<String>,
    #[serde(default)]
    pub message: Option<Message>,
}

pub struct TelegramClient {
    client: Client,
    poll_client: Client,
    api_url: String,
    token: String,
    chat_id: i64,
}

impl TelegramClient {
    pub fn new(api_url: String, token: String, chat_id: i64, poll_timeout: Duration) -> Self {
        Self {
            client: HttpClientFactory::create_plain_client(Duration::from_secs(30)),
            // Must outlive the server-side long-poll wait
            poll_client: HttpClientFactory::create_plain_client(
                poll_timeout + Duration::from_secs(10),
            ),
            api_url: api_url.trim_end_matches('/').to_string(),
            token,
            chat_id,
        }
    }

    pub fn chat_id(&self) -> i64 {
        self.chat_id
    }

    fn endpoint(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.api_url, self.token, method)
    }

    async fn read_response<T: DeserializeOwned>(
        method: &str,
        response: reqwest::Response,
    ) -> Result<Option<T>> {
        let status = response.status();
        let body: ApiResponse<T> = response
            .json()
            .await
            .with_context(|| format!("Failed to parse Telegram {} response", method))?;

        if !body.ok {
            bail!(
                "Telegram {} failed (HTTP {}): {}",
                method,
                status,
                body.description.unwrap_or_default()
            );
        }
        Ok(body.result)
    }

    pub async fn send_message(&self, text: &str, keyboard: Option<&[Vec<Button>]>) -> Result<()> {
        let mut payload = json!({
            "chat_id": self.chat_id,
            "text": text,
        });
        if let Some(rows) = keyboard {
            payload["reply_markup"] = inline_keyboard(rows);
        }

        let response = self
            .client
            .post(self.endpoint("sendMessage"))
            .json(&payload)
            .send()
            .await
            .context("Failed to reach Telegram sendMessage")?;
        Self::read_response::<Value>("sendMessage", response).await?;
        Ok(())
    }

    /// Charts go out as documents; `sendPhoto` does not accept SVG
    pub async fn send_document(&self, artifact: &ChartArtifact, caption: &str) -> Result<()> {
        let bytes = tokio::fs::read(&artifact.path)
            .await
            .with_context(|| format!("Failed to read chart {}", artifact.path.display()))?;
        let file_name = artifact
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "chart".to_string());

        let part = Part::bytes(bytes)
            .file_name(file_name)
            .mime_str(artifact.mime)
            .context("Invalid chart MIME type")?;
        let form = Form::new()
            .text("chat_id", self.chat_id.to_string())
            .text("caption", caption.to_string())
            .part("document", part);

        let response = self
            .client
            .post(self.endpoint("sendDocument"))
            .multipart(form)
            .send()
            .await
            .context("Failed to reach Telegram sendDocument")?;
        Self::read_response::<Value>("sendDocument", response).await?;
        Ok(())
    }

    pub async fn answer_callback_query(&self, callback_id: &str) -> Result<()> {
        let response = self
            .client
            .post(self.endpoint("answerCallbackQuery"))
            .json(&json!({ "callback_query_id": callback_id }))
            .send()
            .await
            .context("Failed to reach Telegram answerCallbackQuery")?;
        Self::read_response::<Value>("answerCallbackQuery", response).await?;
        Ok(())
    }

    pub async fn get_updates(&self, offset: i64, timeout: Duration) -> Result<Vec<Update>> {
        let response = self
            .poll_client
            .get(self.endpoint("getUpdates"))
            .query(&[
                ("offset", offset.to_string()),
                ("timeout", timeout.as_secs().to_string()),
                ("allowed_updates", r#"["message","callback_query"]"#.to_string()),
            ])
            .send()
            .await
            .context("Failed to reach Telegram getUpdates")?;

        let updates = Self::read_response::<Vec<Update>>("getUpdates", response)
            .await?
            .unwrap_or_default();
        if !updates.is_empty() {
            debug!("TelegramClient: Received {} update(s)", updates.len());
        }
        Ok(updates)
    }
}

fn inline_keyboard(rows: &[Vec<Button>]) -> Value {
    let rows: Vec<Vec<Value>> = rows
        .iter()
        .map(|row| {
            row.iter()
                .map(|b| json!({ "text": b.label, "callback_data": b.data }))
                .collect()
        })
        .collect();
    json!({ "inline_keyboard": rows })
}

#[async_trait]
impl AlertSink for TelegramClient {
    async fn deliver(&self, alert: &Alert) -> Result<(), DeliveryError> {
        let sent = match &alert.artifact {
            Some(artifact) => self.send_document(artifact, &alert.text).await,
            None => self.send_message(&alert.text, None).await,
        };
        sent.map_err(|e| DeliveryError::Failed(format!("{:#}", e)))?;
        info!("TelegramClient: Alert delivered to chat {}", self.chat_id);
        Ok(())
    }
}
