use std::sync::Arc;

use async_trait::async_trait;

use crate::error::NotifyError;
use crate::message::ChatMessage;

/// Delivers a message to a chat webhook.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    async fn send(&self, webhook_url: &str, message: &ChatMessage) -> Result<(), NotifyError>;
}

pub type TransportHandle = Arc<dyn ChatTransport>;
