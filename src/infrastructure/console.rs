use crate::domain::errors::DeliveryError;
use crate::domain::ports::{Alert, AlertSink};
use async_trait::async_trait;
use tracing::info;

/// Log-only sink used when no chat transport is configured
pub struct LogSink;

#[async_trait]
impl AlertSink for LogSink {
    async fn deliver(&self, alert: &Alert) -> Result<(), DeliveryError> {
        match &alert.artifact {
            Some(artifact) => info!(
                "LogSink: {} [chart: {}]",
                alert.text,
                artifact.path.display()
            ),
            None => info!("LogSink: {}", alert.text),
        }
        Ok(())
    }
}
