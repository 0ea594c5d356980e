//! In-memory gateway for tests.

use std::collections::BTreeSet;
use std::sync::Mutex;

use async_trait::async_trait;

use teahouse_core::{ChatId, ImageRef};

use crate::gateway::{GatewayError, MessagingGateway};
use crate::keyboard::Keyboard;

/// One recorded outbound interaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outbound {
    Message {
        chat: ChatId,
        text: String,
        keyboard: Option<Keyboard>,
    },
    Photo {
        chat: ChatId,
        image: ImageRef,
        caption: String,
        keyboard: Option<Keyboard>,
    },
    CallbackAnswered(String),
    Edited {
        chat: ChatId,
        message_id: i64,
        text: String,
    },
}

/// Gateway that records everything instead of sending it.
///
/// Individual chats can be marked as failing to exercise transport-error
/// paths (broadcast isolation, notification failures).
#[derive(Debug, Default)]
pub struct RecordingGateway {
    sent: Mutex<Vec<Outbound>>,
    failing: Mutex<BTreeSet<ChatId>>,
}

impl RecordingGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything recorded so far, in send order.
    pub fn sent(&self) -> Vec<Outbound> {
        self.sent.lock().expect("gateway poisoned").clone()
    }

    /// Text of every message sent to `chat`, in order.
    pub fn texts_to(&self, chat: ChatId) -> Vec<String> {
        self.sent()
            .into_iter()
            .filter_map(|out| match out {
                Outbound::Message { chat: c, text, .. } if c == chat => Some(text),
                Outbound::Photo { chat: c, caption, .. } if c == chat => Some(caption),
                _ => None,
            })
            .collect()
    }

    /// Make every send to `chat` fail with a transport error.
    pub fn fail_sends_to(&self, chat: ChatId) {
        self.failing.lock().expect("gateway poisoned").insert(chat);
    }

    fn check(&self, chat: ChatId) -> Result<(), GatewayError> {
        if self.failing.lock().expect("gateway poisoned").contains(&chat) {
            return Err(GatewayError::Transport(format!("chat {chat} unreachable")));
        }
        Ok(())
    }

    fn record(&self, outbound: Outbound) {
        self.sent.lock().expect("gateway poisoned").push(outbound);
    }
}

#[async_trait]
impl MessagingGateway for RecordingGateway {
    async fn send_message(
        &self,
        chat: ChatId,
        text: &str,
        keyboard: Option<Keyboard>,
    ) -> Result<(), GatewayError> {
        self.check(chat)?;
        self.record(Outbound::Message {
            chat,
            text: text.to_string(),
            keyboard,
        });
        Ok(())
    }

    async fn send_photo(
        &self,
        chat: ChatId,
        image: &ImageRef,
        caption: &str,
        keyboard: Option<Keyboard>,
    ) -> Result<(), GatewayError> {
        self.check(chat)?;
        self.record(Outbound::Photo {
            chat,
            image: image.clone(),
            caption: caption.to_string(),
            keyboard,
        });
        Ok(())
    }

    async fn answer_callback(&self, callback_id: &str) -> Result<(), GatewayError> {
        self.record(Outbound::CallbackAnswered(callback_id.to_string()));
        Ok(())
    }

    async fn edit_message(
        &self,
        chat: ChatId,
        message_id: i64,
        text: &str,
    ) -> Result<(), GatewayError> {
        self.check(chat)?;
        self.record(Outbound::Edited {
            chat,
            message_id,
            text: text.to_string(),
        });
        Ok(())
    }
}
