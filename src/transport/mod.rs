//! Push-message transport layer.

pub mod telegram;

pub use telegram::TelegramTransport;

use async_trait::async_trait;

use crate::error::TransportError;

/// Options applied to an outbound send.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SendOptions {
    /// Render the payload with the transport's rich-text markup.
    pub rich_text: bool,
}

impl SendOptions {
    /// Plain text, no formatting.
    pub fn plain() -> Self {
        Self { rich_text: false }
    }

    /// Rich-text markup (HTML for Telegram).
    pub fn rich() -> Self {
        Self { rich_text: true }
    }
}

/// One inbound message pulled from the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    /// Monotonic sequence number assigned by the transport.
    pub cursor: i64,
    /// Transport-level conversation id; 0 when the update carries none.
    pub subscriber_id: i64,
    /// Message text; empty for non-text updates.
    pub text: String,
}

/// Push-message transport adapter.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send a text message to one subscriber.
    async fn send_text(
        &self,
        subscriber_id: i64,
        text: &str,
        opts: SendOptions,
    ) -> Result<(), TransportError>;

    /// Send a photo by URL with a caption.
    async fn send_photo(
        &self,
        subscriber_id: i64,
        photo_url: &str,
        caption: &str,
        opts: SendOptions,
    ) -> Result<(), TransportError>;

    /// Fetch inbound messages with cursors strictly greater than `after`.
    ///
    /// `None` asks for everything the transport still holds. Returned
    /// messages are ordered by cursor.
    async fn poll_inbound(&self, after: Option<i64>) -> Result<Vec<InboundMessage>, TransportError>;
}
