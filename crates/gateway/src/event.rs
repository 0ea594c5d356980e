use teahouse_core::{ChatId, ImageRef};

/// One inbound event from the chat transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundEvent {
    /// Free-text message (commands included).
    Message { chat: ChatId, text: String },
    /// Photo upload; the transport hands us an opaque image reference.
    Photo { chat: ChatId, image: ImageRef },
    /// Structured callback from an inline button.
    Callback {
        /// Transport identifier used to acknowledge the callback.
        id: String,
        chat: ChatId,
        /// Message the pressed button was attached to.
        message_id: i64,
        /// Opaque action payload.
        data: String,
    },
}

impl InboundEvent {
    pub fn chat(&self) -> ChatId {
        match self {
            InboundEvent::Message { chat, .. }
            | InboundEvent::Photo { chat, .. }
            | InboundEvent::Callback { chat, .. } => *chat,
        }
    }
}
