//! Messaging gateway abstraction (mechanics only).
//!
//! The chat transport is an external collaborator consumed through a narrow
//! interface: send a message or photo, answer a callback, edit a sent
//! message. Inbound traffic arrives as [`InboundEvent`]s. The crate ships an
//! in-memory [`RecordingGateway`] so the dialogue layer can be tested
//! without any transport at all.

pub mod event;
pub mod gateway;
pub mod keyboard;
pub mod recording;

pub use event::InboundEvent;
pub use gateway::{GatewayError, MessagingGateway};
pub use keyboard::{ButtonAction, InlineButton, InlineKeyboard, Keyboard, ReplyKeyboard};
pub use recording::{Outbound, RecordingGateway};
