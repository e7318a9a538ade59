//! DingTalk custom-robot webhook delivery.
//!
//! [`DingTalkWebhook`] posts a markdown message to a robot webhook URL.
//! DingTalk answers `200 OK` even for refused messages and reports the
//! outcome in an `errcode` field, so both the status and the body are
//! checked. Transient failures are retried under the configured
//! [`RetryPolicy`].

use std::time::Duration;

use async_trait::async_trait;
use maintdesk_core::retry::RetryPolicy;
use serde::Deserialize;

use crate::error::NotifyError;
use crate::message::ChatMessage;
use crate::transport::ChatTransport;

/// HTTP request timeout for a single delivery attempt.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Deserialize)]
struct RobotReply {
    #[serde(default)]
    errcode: i64,
    #[serde(default)]
    errmsg: String,
}

/// Delivers messages to DingTalk robot webhooks.
pub struct DingTalkWebhook {
    client: reqwest::Client,
    retry: RetryPolicy,
}

impl DingTalkWebhook {
    /// Create a new delivery service with a pre-configured HTTP client.
    pub fn new(retry: RetryPolicy) -> Result<Self, NotifyError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self::with_client(client, retry))
    }

    pub fn with_client(client: reqwest::Client, retry: RetryPolicy) -> Self {
        Self { client, retry }
    }

    /// Execute a single POST request and check status and `errcode`.
    async fn try_send(&self, url: &str, payload: &serde_json::Value) -> Result<(), NotifyError> {
        let response = self.client.post(url).json(payload).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(NotifyError::HttpStatus(status.as_u16()));
        }

        let body = response.text().await?;
        if let Ok(reply) = serde_json::from_str::<RobotReply>(&body) {
            if reply.errcode != 0 {
                return Err(NotifyError::Rejected {
                    errcode: reply.errcode,
                    errmsg: reply.errmsg,
                });
            }
        }
        Ok(())
    }
}

/// DingTalk robot payload for a markdown message.
pub fn markdown_payload(message: &ChatMessage) -> serde_json::Value {
    serde_json::json!({
        "msgtype": "markdown",
        "markdown": {
            "title": message.title,
            "text": message.text,
        },
    })
}

#[async_trait]
impl ChatTransport for DingTalkWebhook {
    async fn send(&self, webhook_url: &str, message: &ChatMessage) -> Result<(), NotifyError> {
        let payload = markdown_payload(message);
        self.retry
            .run("dingtalk.send", |_| self.try_send(webhook_url, &payload))
            .await
    }
}
