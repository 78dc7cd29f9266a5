//! Telegram transport — raw Bot API over HTTPS.
//!
//! Outbound notifications go through `sendMessage`/`sendPhoto`; inbound
//! subscriber messages come from a `getUpdates` long poll whose `update_id`
//! doubles as the relay's inbound cursor.

use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use tracing::debug;

use crate::error::TransportError;
use crate::transport::{InboundMessage, SendOptions, Transport};

/// Server-side wait passed to `getUpdates`.
const POLL_WAIT_SECS: u64 = 5;
/// Client-side bound on any single Bot API round-trip.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Telegram Bot API client.
pub struct TelegramTransport {
    bot_token: SecretString,
    client: reqwest::Client,
}

impl TelegramTransport {
    pub fn new(bot_token: SecretString) -> Self {
        Self {
            bot_token,
            client: reqwest::Client::new(),
        }
    }

    fn api_url(&self, method: &str) -> String {
        format!(
            "https://api.telegram.org/bot{}/{method}",
            self.bot_token.expose_secret()
        )
    }

    /// POST one Bot API method and return the decoded response body.
    async fn call(&self, method: &str, body: Value) -> Result<Value, TransportError> {
        let resp = self
            .client
            .post(self.api_url(method))
            .timeout(REQUEST_TIMEOUT)
            .json(&body)
            .send()
            .await
            .map_err(|e| TransportError::RequestFailed {
                method: method.to_string(),
                reason: e.to_string(),
            })?;

        let status = resp.status();
        if !status.is_success() {
            let detail = resp.text().await.unwrap_or_default();
            return Err(TransportError::Rejected {
                method: method.to_string(),
                reason: format!("HTTP {status}: {detail}"),
            });
        }

        resp.json().await.map_err(|e| TransportError::Rejected {
            method: method.to_string(),
            reason: e.to_string(),
        })
    }
}

#[async_trait]
impl Transport for TelegramTransport {
    async fn send_text(
        &self,
        subscriber_id: i64,
        text: &str,
        opts: SendOptions,
    ) -> Result<(), TransportError> {
        let mut body = serde_json::json!({
            "chat_id": subscriber_id,
            "text": text,
        });
        if opts.rich_text {
            body["parse_mode"] = Value::String("HTML".to_string());
        }
        self.call("sendMessage", body).await.map(|_| ())
    }

    async fn send_photo(
        &self,
        subscriber_id: i64,
        photo_url: &str,
        caption: &str,
        opts: SendOptions,
    ) -> Result<(), TransportError> {
        let mut body = serde_json::json!({
            "chat_id": subscriber_id,
            "photo": photo_url,
            "caption": caption,
        });
        if opts.rich_text {
            body["parse_mode"] = Value::String("HTML".to_string());
        }
        self.call("sendPhoto", body).await.map(|_| ())
    }

    async fn poll_inbound(&self, after: Option<i64>) -> Result<Vec<InboundMessage>, TransportError> {
        let mut body = serde_json::json!({
            "timeout": POLL_WAIT_SECS,
            "allowed_updates": ["message"],
        });
        if let Some(cursor) = after {
            body["offset"] = Value::from(cursor + 1);
        }

        let data = self.call("getUpdates", body).await?;
        let inbound = parse_updates(&data);
        if !inbound.is_empty() {
            debug!(updates = inbound.len(), "received inbound updates");
        }
        Ok(inbound)
    }
}

/// Map a `getUpdates` response onto inbound messages.
///
/// Every update with an `update_id` is emitted, so the caller's cursor
/// advances past non-text updates too; those carry empty text (and
/// subscriber id 0 when no chat is attached).
fn parse_updates(data: &Value) -> Vec<InboundMessage> {
    let Some(updates) = data.get("result").and_then(Value::as_array) else {
        return Vec::new();
    };

    let mut inbound = Vec::new();
    for update in updates {
        let Some(cursor) = update.get("update_id").and_then(Value::as_i64) else {
            continue;
        };
        let message = update.get("message");
        let subscriber_id = message
            .and_then(|m| m.get("chat"))
            .and_then(|c| c.get("id"))
            .and_then(Value::as_i64)
            .unwrap_or(0);
        let text = message
            .and_then(|m| m.get("text"))
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        inbound.push(InboundMessage {
            cursor,
            subscriber_id,
            text,
        });
    }
    inbound
}
