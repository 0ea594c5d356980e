//! Telegram Bot API client: the production `MessagingGateway`.
//!
//! Long-polls `getUpdates` and translates updates into [`InboundEvent`]s.
//! Only the handful of methods the controller needs are implemented.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use teahouse_core::{ChatId, ImageRef};
use teahouse_gateway::{
    ButtonAction, GatewayError, InboundEvent, Keyboard, MessagingGateway,
};

use crate::controller::DialogueController;

const POLL_TIMEOUT_SECS: u64 = 30;
const RETRY_BACKOFF_SECS: u64 = 5;

pub struct TelegramGateway {
    http: reqwest::Client,
    base: String,
}

#[derive(Debug, Deserialize)]
struct ApiEnvelope<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Update {
    pub update_id: i64,
    message: Option<WireMessage>,
    callback_query: Option<WireCallback>,
}

#[derive(Debug, Deserialize)]
struct WireMessage {
    message_id: i64,
    chat: WireChat,
    text: Option<String>,
    photo: Option<Vec<WirePhoto>>,
}

#[derive(Debug, Deserialize)]
struct WireChat {
    id: i64,
}

#[derive(Debug, Deserialize)]
struct WirePhoto {
    file_id: String,
}

#[derive(Debug, Deserialize)]
struct WireCallback {
    id: String,
    data: Option<String>,
    message: Option<WireMessage>,
    from: WireUser,
}

#[derive(Debug, Deserialize)]
struct WireUser {
    id: i64,
}

impl Update {
    /// Translate a wire update into a dialogue event, if it is one we
    /// handle.
    pub fn into_event(self) -> Option<InboundEvent> {
        if let Some(callback) = self.callback_query {
            let message = callback.message?;
            return Some(InboundEvent::Callback {
                id: callback.id,
                chat: ChatId(callback.from.id),
                message_id: message.message_id,
                data: callback.data?,
            });
        }

        let message = self.message?;
        let chat = ChatId(message.chat.id);
        if let Some(text) = message.text {
            return Some(InboundEvent::Message { chat, text });
        }
        // Telegram sends photos in several resolutions; the last is the
        // largest.
        if let Some(photo) = message.photo?.pop() {
            return Some(InboundEvent::Photo {
                chat,
                image: ImageRef(photo.file_id),
            });
        }
        None
    }
}

fn reply_markup(keyboard: &Keyboard) -> Value {
    match keyboard {
        Keyboard::Reply(reply) => json!({
            "keyboard": reply
                .rows
                .iter()
                .map(|row| row.iter().map(|text| json!({ "text": text })).collect::<Vec<_>>())
                .collect::<Vec<_>>(),
            "resize_keyboard": true,
        }),
        Keyboard::Inline(inline) => json!({
            "inline_keyboard": inline
                .rows
                .iter()
                .map(|row| {
                    row.iter()
                        .map(|button| match &button.action {
                            ButtonAction::Callback(data) => {
                                json!({ "text": button.text, "callback_data": data })
                            }
                            ButtonAction::Url(url) => json!({ "text": button.text, "url": url }),
                        })
                        .collect::<Vec<_>>()
                })
                .collect::<Vec<_>>(),
        }),
    }
}

impl TelegramGateway {
    pub fn new(token: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base: format!("https://api.telegram.org/bot{token}"),
        }
    }

    async fn call<T: serde::de::DeserializeOwned>(
        &self,
        method: &str,
        payload: Value,
    ) -> Result<T, GatewayError> {
        let url = format!("{}/{method}", self.base);
        let response = self
            .http
            .post(&url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        let envelope: ApiEnvelope<T> = response
            .json()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        if !envelope.ok {
            return Err(GatewayError::Api {
                status,
                message: envelope.description.unwrap_or_default(),
            });
        }
        envelope.result.ok_or_else(|| GatewayError::Api {
            status,
            message: "missing result".to_string(),
        })
    }

    /// One long-poll round of `getUpdates`.
    pub async fn poll_updates(&self, offset: i64) -> Result<Vec<Update>, GatewayError> {
        self.call(
            "getUpdates",
            json!({ "offset": offset, "timeout": POLL_TIMEOUT_SECS }),
        )
        .await
    }
}

#[async_trait]
impl MessagingGateway for TelegramGateway {
    async fn send_message(
        &self,
        chat: ChatId,
        text: &str,
        keyboard: Option<Keyboard>,
    ) -> Result<(), GatewayError> {
        let mut payload = json!({ "chat_id": chat.0, "text": text });
        if let Some(keyboard) = &keyboard {
            payload["reply_markup"] = reply_markup(keyboard);
        }
        self.call::<Value>("sendMessage", payload).await.map(|_| ())
    }

    async fn send_photo(
        &self,
        chat: ChatId,
        image: &ImageRef,
        caption: &str,
        keyboard: Option<Keyboard>,
    ) -> Result<(), GatewayError> {
        let mut payload = json!({
            "chat_id": chat.0,
            "photo": image.as_str(),
            "caption": caption,
        });
        if let Some(keyboard) = &keyboard {
            payload["reply_markup"] = reply_markup(keyboard);
        }
        self.call::<Value>("sendPhoto", payload).await.map(|_| ())
    }

    async fn answer_callback(&self, callback_id: &str) -> Result<(), GatewayError> {
        self.call::<Value>("answerCallbackQuery", json!({ "callback_query_id": callback_id }))
            .await
            .map(|_| ())
    }

    async fn edit_message(
        &self,
        chat: ChatId,
        message_id: i64,
        text: &str,
    ) -> Result<(), GatewayError> {
        self.call::<Value>(
            "editMessageText",
            json!({ "chat_id": chat.0, "message_id": message_id, "text": text }),
        )
        .await
        .map(|_| ())
    }
}

/// Drive the controller from the long-poll loop until the process stops.
pub async fn run_polling(
    gateway: Arc<TelegramGateway>,
    controller: DialogueController<TelegramGateway>,
) -> anyhow::Result<()> {
    let mut offset = 0i64;
    loop {
        match gateway.poll_updates(offset).await {
            Ok(updates) => {
                for update in updates {
                    offset = offset.max(update.update_id + 1);
                    if let Some(event) = update.into_event() {
                        controller.handle_event(event).await;
                    }
                }
            }
            Err(error) => {
                tracing::warn!(error = %error, "polling failed, backing off");
                tokio::time::sleep(std::time::Duration::from_secs(RETRY_BACKOFF_SECS)).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_update_becomes_a_message_event() {
        let update: Update = serde_json::from_value(json!({
            "update_id": 7,
            "message": { "message_id": 1, "chat": { "id": 100 }, "text": "/start" }
        }))
        .unwrap();
        assert_eq!(
            update.into_event(),
            Some(InboundEvent::Message {
                chat: ChatId(100),
                text: "/start".to_string(),
            })
        );
    }

    #[test]
    fn photo_update_picks_the_largest_size() {
        let update: Update = serde_json::from_value(json!({
            "update_id": 8,
            "message": {
                "message_id": 2,
                "chat": { "id": 100 },
                "photo": [
                    { "file_id": "small" },
                    { "file_id": "large" }
                ]
            }
        }))
        .unwrap();
        assert_eq!(
            update.into_event(),
            Some(InboundEvent::Photo {
                chat: ChatId(100),
                image: ImageRef("large".to_string()),
            })
        );
    }

    #[test]
    fn callback_update_carries_payload_and_message_id() {
        let update: Update = serde_json::from_value(json!({
            "update_id": 9,
            "callback_query": {
                "id": "cb1",
                "from": { "id": 200 },
                "data": "cart:checkout",
                "message": { "message_id": 5, "chat": { "id": 200 } }
            }
        }))
        .unwrap();
        assert_eq!(
            update.into_event(),
            Some(InboundEvent::Callback {
                id: "cb1".to_string(),
                chat: ChatId(200),
                message_id: 5,
                data: "cart:checkout".to_string(),
            })
        );
    }

    #[test]
    fn unhandled_updates_are_dropped() {
        let update: Update = serde_json::from_value(json!({
            "update_id": 10,
            "message": { "message_id": 3, "chat": { "id": 100 } }
        }))
        .unwrap();
        assert_eq!(update.into_event(), None);
    }
}
