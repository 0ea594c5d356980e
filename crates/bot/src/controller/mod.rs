//! The dialogue controller: one inbound event in, one reply plan out.
//!
//! Every handler produces a [`Plan`] under the single-writer state handle;
//! the plan is delivered only after the mutation it describes has been
//! durably persisted. Sends never mutate state, so a transport failure can
//! only ever lose a message, not corrupt the document.

mod admin;
mod customer;
mod flows;

use std::sync::Arc;

use teahouse_core::{ChatId, ImageRef};
use teahouse_gateway::{InboundEvent, Keyboard, MessagingGateway};
use teahouse_orders::{CheckoutError, LifecycleError};
use teahouse_session::{Advance, FlowInput, FlowPrompt};
use teahouse_store::AppState;

use crate::actions::CallbackAction;
use crate::config::BotConfig;
use crate::error::HandlerError;
use crate::keyboards;
use crate::render;

pub use admin::Settle;

/// One outbound interaction.
#[derive(Debug, Clone)]
pub enum Outgoing {
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
    Edit {
        chat: ChatId,
        message_id: i64,
        text: String,
    },
}

/// Everything a handler wants delivered once its mutation is committed.
#[derive(Debug, Clone)]
pub enum Plan {
    Outgoing(Vec<Outgoing>),
    /// Sequential send to every recipient; failures are counted, never
    /// aborting, and an aggregate report goes back to the initiator.
    Broadcast {
        text: String,
        recipients: Vec<ChatId>,
        report_to: ChatId,
    },
}

impl Plan {
    pub fn none() -> Self {
        Plan::Outgoing(Vec::new())
    }

    pub fn message(chat: ChatId, text: impl Into<String>) -> Self {
        Plan::Outgoing(vec![Outgoing::Message {
            chat,
            text: text.into(),
            keyboard: None,
        }])
    }

    pub fn with_keyboard(chat: ChatId, text: impl Into<String>, keyboard: Keyboard) -> Self {
        Plan::Outgoing(vec![Outgoing::Message {
            chat,
            text: text.into(),
            keyboard: Some(keyboard),
        }])
    }

    pub fn photo(
        chat: ChatId,
        image: ImageRef,
        caption: impl Into<String>,
        keyboard: Keyboard,
    ) -> Self {
        Plan::Outgoing(vec![Outgoing::Photo {
            chat,
            image,
            caption: caption.into(),
            keyboard: Some(keyboard),
        }])
    }
}

/// Routes inbound events to flows, domain operations and replies.
pub struct DialogueController<G> {
    state: Arc<AppState>,
    gateway: Arc<G>,
    config: BotConfig,
}

impl<G: MessagingGateway> DialogueController<G> {
    pub fn new(state: Arc<AppState>, gateway: Arc<G>, config: BotConfig) -> Self {
        Self {
            state,
            gateway,
            config,
        }
    }

    /// Handle one event to completion: route, mutate, persist, reply.
    ///
    /// Failures are reported to the originating chat; this never panics and
    /// never leaves an error for the caller, so the poll loop just keeps
    /// going.
    pub async fn handle_event(&self, event: InboundEvent) {
        let origin = event.chat();
        match self.process(event).await {
            Ok(plan) => self.execute(plan).await,
            Err(error) => self.report_failure(origin, error).await,
        }
    }

    async fn process(&self, event: InboundEvent) -> Result<Plan, HandlerError> {
        match event {
            InboundEvent::Message { chat, text } => self.handle_message(chat, text.trim()).await,
            InboundEvent::Photo { chat, image } => self.handle_photo(chat, image).await,
            InboundEvent::Callback {
                id,
                chat,
                message_id,
                data,
            } => {
                let plan = self.handle_callback(chat, message_id, &data).await;
                if let Err(error) = self.gateway.answer_callback(&id).await {
                    tracing::debug!(error = %error, "failed to answer callback");
                }
                plan
            }
        }
    }

    async fn handle_message(&self, chat: ChatId, text: &str) -> Result<Plan, HandlerError> {
        match text {
            "/start" => return self.handle_start(chat).await,
            "/admin" => return self.handle_admin_panel(chat).await,
            _ => {}
        }

        // An active flow consumes all free text before the menu sees it.
        if self.state.read(|doc| doc.sessions.is_active(chat)).await {
            return self.advance_flow(chat, FlowInput::Text(text)).await;
        }

        self.handle_menu(chat, text).await
    }

    async fn handle_photo(&self, chat: ChatId, image: ImageRef) -> Result<Plan, HandlerError> {
        // Photos only matter to an active admin flow; anything else is
        // ignored rather than answered.
        if !self.config.is_admin(chat) {
            return Ok(Plan::none());
        }
        if !self.state.read(|doc| doc.sessions.is_active(chat)).await {
            return Ok(Plan::none());
        }
        self.advance_flow(chat, FlowInput::Photo(&image)).await
    }

    async fn handle_callback(
        &self,
        chat: ChatId,
        message_id: i64,
        data: &str,
    ) -> Result<Plan, HandlerError> {
        let action = match data.parse::<CallbackAction>() {
            Ok(action) => action,
            Err(error) => {
                tracing::debug!(error = %error, "ignoring unrecognized callback");
                return Ok(Plan::none());
            }
        };

        match action {
            CallbackAction::ShowProduct(token) => self.show_product(chat, token).await,
            CallbackAction::AddAmount {
                token,
                quantity,
                unit,
            } => self.add_to_cart(chat, token, unit, quantity).await,
            CallbackAction::CustomAmount { token, unit } => {
                self.start_amount_entry(chat, token, unit).await
            }
            CallbackAction::ClearCart => self.clear_cart(chat).await,
            CallbackAction::Checkout => self.start_checkout(chat).await,
            CallbackAction::Delivery(method) => {
                self.advance_flow(chat, FlowInput::Selection(method.tag())).await
            }
            CallbackAction::CompleteOrder(id) => {
                self.settle_order(chat, message_id, id, Settle::Complete).await
            }
            CallbackAction::CancelOrder(id) => {
                self.settle_order(chat, message_id, id, Settle::Cancel).await
            }
            CallbackAction::ManageCategory(category) => {
                self.admin_category(chat, &category).await
            }
            CallbackAction::ManageProduct(token) => self.admin_product(chat, token).await,
            CallbackAction::EditField { token, field } => {
                self.start_field_edit(chat, token, field).await
            }
            CallbackAction::DeleteProduct(token) => self.delete_product(chat, token).await,
            CallbackAction::NewCategory => self.start_new_category(chat).await,
            CallbackAction::NewProductIn(category) => {
                self.start_new_product(chat, category).await
            }
            CallbackAction::SetSaleMode { token, mode } => {
                self.set_sale_mode(chat, token, mode).await
            }
        }
    }

    /// Feed one input into the user's active flow, applying the outcome in
    /// the same critical section when the flow completes.
    async fn advance_flow(&self, chat: ChatId, input: FlowInput<'_>) -> Result<Plan, HandlerError> {
        let config = self.config.clone();
        self.state
            .mutate(move |doc| match doc.sessions.advance(chat, input) {
                Advance::NoFlow => Ok(Plan::none()),
                Advance::Prompt(prompt) => Ok(match prompt {
                    FlowPrompt::ChooseDelivery => Plan::with_keyboard(
                        chat,
                        render::prompt(prompt),
                        keyboards::delivery_methods(),
                    ),
                    _ => Plan::message(chat, render::prompt(prompt)),
                }),
                Advance::Rejected(why) => Ok(Plan::message(chat, render::rejection(why))),
                Advance::Complete(outcome) => flows::apply_outcome(doc, chat, outcome, &config),
            })
            .await
    }

    /// Deliver a plan. Transport failures are logged, never propagated: the
    /// state mutation behind this plan is already durable.
    async fn execute(&self, plan: Plan) {
        match plan {
            Plan::Outgoing(outgoing) => {
                for out in outgoing {
                    let result = match &out {
                        Outgoing::Message {
                            chat,
                            text,
                            keyboard,
                        } => {
                            self.gateway
                                .send_message(*chat, text, keyboard.clone())
                                .await
                        }
                        Outgoing::Photo {
                            chat,
                            image,
                            caption,
                            keyboard,
                        } => {
                            self.gateway
                                .send_photo(*chat, image, caption, keyboard.clone())
                                .await
                        }
                        Outgoing::Edit {
                            chat,
                            message_id,
                            text,
                        } => self.gateway.edit_message(*chat, *message_id, text).await,
                    };
                    if let Err(error) = result {
                        tracing::warn!(error = %error, "failed to deliver reply");
                    }
                }
            }
            Plan::Broadcast {
                text,
                recipients,
                report_to,
            } => {
                let mut delivered = 0usize;
                let mut failed = 0usize;
                for recipient in recipients {
                    match self.gateway.send_message(recipient, &text, None).await {
                        Ok(()) => delivered += 1,
                        Err(error) => {
                            failed += 1;
                            tracing::warn!(
                                chat = %recipient,
                                error = %error,
                                "broadcast delivery failed"
                            );
                        }
                    }
                }
                let report =
                    format!("Broadcast finished:\nDelivered: {delivered}\nFailed: {failed}");
                if let Err(error) = self.gateway.send_message(report_to, &report, None).await {
                    tracing::warn!(error = %error, "failed to deliver broadcast report");
                }
            }
        }
    }

    async fn report_failure(&self, chat: ChatId, error: HandlerError) {
        let text = match &error {
            HandlerError::Domain(domain) => render::domain_error(domain),
            HandlerError::Checkout(CheckoutError::EmptyCart) => "Your cart is empty".to_string(),
            HandlerError::Checkout(CheckoutError::Unavailable(shortfalls)) => {
                render::unavailable_list(shortfalls)
            }
            HandlerError::Lifecycle(LifecycleError::AlreadySettled(status)) => {
                format!("This order is already {}", status.label())
            }
            HandlerError::Lifecycle(LifecycleError::OutOfStock(shortfalls)) => {
                render::completion_shortfall(shortfalls)
            }
            HandlerError::Store(store) => {
                tracing::error!(error = %store, "persistence failure");
                render::GENERIC_FAILURE.to_string()
            }
        };
        if let Err(send_error) = self.gateway.send_message(chat, &text, None).await {
            tracing::warn!(error = %send_error, "failed to deliver failure report");
        }
    }
}
