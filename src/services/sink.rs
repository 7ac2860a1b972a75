//! Outbound notification sinks.

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{OutboundMessage, RecipientId};

/// Destination for notifications.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// Deliver one message to one recipient.
    async fn send(&self, recipient: &RecipientId, message: &OutboundMessage) -> Result<()>;
}

/// Sink that writes messages to the log instead of sending them.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

#[async_trait]
impl NotificationSink for LogSink {
    async fn send(&self, recipient: &RecipientId, message: &OutboundMessage) -> Result<()> {
        log::info!("[{}] {}", recipient, message.text);
        if let Some(body) = &message.body {
            log::info!("[{}] {}", recipient, body);
        }
        if !message.actions.is_empty() {
            let actions: Vec<String> = message.actions.iter().map(|a| a.callback_data()).collect();
            log::info!("[{}] actions: {}", recipient, actions.join(", "));
        }
        Ok(())
    }
}
