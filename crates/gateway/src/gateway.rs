use async_trait::async_trait;
use thiserror::Error;

use teahouse_core::{ChatId, ImageRef};

use crate::keyboard::Keyboard;

/// Transport-level failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    /// The transport could not be reached.
    #[error("transport error: {0}")]
    Transport(String),
    /// The transport answered with an error.
    #[error("transport rejected the call ({status}): {message}")]
    Api { status: u16, message: String },
}

/// Outbound side of the chat transport.
///
/// Implementations must be shareable across tasks; the dialogue layer sends
/// from wherever an event is being handled.
#[async_trait]
pub trait MessagingGateway: Send + Sync {
    async fn send_message(
        &self,
        chat: ChatId,
        text: &str,
        keyboard: Option<Keyboard>,
    ) -> Result<(), GatewayError>;

    async fn send_photo(
        &self,
        chat: ChatId,
        image: &ImageRef,
        caption: &str,
        keyboard: Option<Keyboard>,
    ) -> Result<(), GatewayError>;

    /// Acknowledge a callback so the client stops showing a spinner.
    async fn answer_callback(&self, callback_id: &str) -> Result<(), GatewayError>;

    /// Replace the text of an already-sent message.
    async fn edit_message(
        &self,
        chat: ChatId,
        message_id: i64,
        text: &str,
    ) -> Result<(), GatewayError>;
}
