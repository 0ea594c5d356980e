//! Administrator handlers: statistics, order fulfilment, product management.

use teahouse_catalog::SaleMode;
use teahouse_core::{ChatId, DomainError, OrderId, ProductToken};
use teahouse_gateway::MessagingGateway;
use teahouse_session::{ProductField, SessionState};

use crate::error::HandlerError;
use crate::keyboards;
use crate::render;

use super::{DialogueController, Outgoing, Plan};

/// How an order is being settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Settle {
    Complete,
    Cancel,
}

fn edit_prompt(field: ProductField) -> &'static str {
    match field {
        ProductField::Price => "Enter the new price (per g):",
        ProductField::PiecePrice => "Enter the new piece price:",
        ProductField::BulkStock => "Enter the stock quantity (g):",
        ProductField::PieceStock => "Enter the stock quantity (pcs):",
        ProductField::Description => "Enter the new description:",
        ProductField::Image => "Send the product photo:",
    }
}

impl<G: MessagingGateway> DialogueController<G> {
    fn ensure_admin(&self, chat: ChatId) -> Result<(), HandlerError> {
        if self.config.is_admin(chat) {
            Ok(())
        } else {
            Err(DomainError::Unauthorized.into())
        }
    }

    /// `/admin`: the panel for the administrator, a plain refusal for
    /// everyone else.
    pub(super) async fn handle_admin_panel(&self, chat: ChatId) -> Result<Plan, HandlerError> {
        if self.config.is_admin(chat) {
            Ok(Plan::with_keyboard(
                chat,
                "Welcome to the admin panel",
                keyboards::admin_menu(),
            ))
        } else {
            Ok(Plan::message(
                chat,
                "You do not have access to the admin panel",
            ))
        }
    }

    pub(super) async fn leave_admin(&self, chat: ChatId) -> Result<Plan, HandlerError> {
        self.ensure_admin(chat)?;
        Ok(Plan::with_keyboard(
            chat,
            "You left the admin panel",
            keyboards::main_menu(),
        ))
    }

    pub(super) async fn admin_stats(&self, chat: ChatId) -> Result<Plan, HandlerError> {
        self.ensure_admin(chat)?;
        let text = self
            .state
            .read(|doc| render::stats(doc.users.len(), doc.orders.stats()))
            .await;
        Ok(Plan::message(chat, text))
    }

    /// Every order still in `new`, each with its settle controls.
    pub(super) async fn admin_orders(&self, chat: ChatId) -> Result<Plan, HandlerError> {
        self.ensure_admin(chat)?;
        self.state
            .read(|doc| {
                let outgoing: Vec<Outgoing> = doc
                    .orders
                    .new_orders()
                    .map(|order| Outgoing::Message {
                        chat,
                        text: render::order_summary(order),
                        keyboard: Some(keyboards::order_controls(order.id(), order.customer())),
                    })
                    .collect();
                Ok(if outgoing.is_empty() {
                    Plan::message(chat, "No new orders")
                } else {
                    Plan::Outgoing(outgoing)
                })
            })
            .await
    }

    pub(super) async fn settle_order(
        &self,
        chat: ChatId,
        message_id: i64,
        id: OrderId,
        settle: Settle,
    ) -> Result<Plan, HandlerError> {
        self.ensure_admin(chat)?;
        self.state
            .mutate(|doc| {
                let order = doc.orders.get_mut(id).ok_or(DomainError::NotFound)?;
                match settle {
                    Settle::Complete => order.complete(&mut doc.ledger)?,
                    Settle::Cancel => order.cancel()?,
                }

                let verb = match settle {
                    Settle::Complete => "completed",
                    Settle::Cancel => "cancelled",
                };
                let short = order.id().short();
                Ok(Plan::Outgoing(vec![
                    Outgoing::Edit {
                        chat,
                        message_id,
                        text: format!("Order #{short} {verb}"),
                    },
                    Outgoing::Message {
                        chat: order.customer(),
                        text: format!("Your order #{short} was {verb}"),
                        keyboard: None,
                    },
                ]))
            })
            .await
    }

    pub(super) async fn admin_manage(&self, chat: ChatId) -> Result<Plan, HandlerError> {
        self.ensure_admin(chat)?;
        let keyboard = self
            .state
            .read(|doc| keyboards::admin_categories(&doc.catalog))
            .await;
        Ok(Plan::with_keyboard(
            chat,
            "Pick a category to manage:",
            keyboard,
        ))
    }

    pub(super) async fn admin_category(
        &self,
        chat: ChatId,
        category: &str,
    ) -> Result<Plan, HandlerError> {
        self.ensure_admin(chat)?;
        self.state
            .read(|doc| {
                if !doc.catalog.has_category(category) {
                    return Err(DomainError::NotFound.into());
                }
                Ok(Plan::with_keyboard(
                    chat,
                    format!("Products in \"{category}\":"),
                    keyboards::admin_products(&doc.catalog, category),
                ))
            })
            .await
    }

    pub(super) async fn admin_product(
        &self,
        chat: ChatId,
        token: ProductToken,
    ) -> Result<Plan, HandlerError> {
        self.ensure_admin(chat)?;
        self.state
            .read(|doc| {
                let key = doc
                    .catalog
                    .resolve_token(token)
                    .ok_or(DomainError::NotFound)?;
                let product = doc.catalog.get(&key).ok_or(DomainError::NotFound)?;
                Ok(Plan::with_keyboard(
                    chat,
                    render::product_admin_summary(&key.name, product, doc.ledger.level(&key)),
                    keyboards::product_admin_controls(&key, product),
                ))
            })
            .await
    }

    pub(super) async fn start_field_edit(
        &self,
        chat: ChatId,
        token: ProductToken,
        field: ProductField,
    ) -> Result<Plan, HandlerError> {
        self.ensure_admin(chat)?;
        self.state
            .mutate(|doc| {
                let key = doc
                    .catalog
                    .resolve_token(token)
                    .ok_or(DomainError::NotFound)?;
                if let Some(displaced) = doc
                    .sessions
                    .start(chat, SessionState::AdminEdit { product: key, field })
                {
                    tracing::warn!(chat = %chat, ?displaced, "active flow superseded");
                }
                Ok(Plan::message(chat, edit_prompt(field)))
            })
            .await
    }

    pub(super) async fn delete_product(
        &self,
        chat: ChatId,
        token: ProductToken,
    ) -> Result<Plan, HandlerError> {
        self.ensure_admin(chat)?;
        self.state
            .mutate(|doc| {
                let key = doc
                    .catalog
                    .resolve_token(token)
                    .ok_or(DomainError::NotFound)?;
                doc.catalog.remove_product(&key)?;
                doc.ledger.remove_product(&key);
                Ok(Plan::message(
                    chat,
                    format!("Product \"{}\" deleted", key.name),
                ))
            })
            .await
    }

    pub(super) async fn start_new_category(&self, chat: ChatId) -> Result<Plan, HandlerError> {
        self.ensure_admin(chat)?;
        self.state
            .mutate(|doc| {
                if let Some(displaced) = doc.sessions.start(chat, SessionState::NewCategory) {
                    tracing::warn!(chat = %chat, ?displaced, "active flow superseded");
                }
                Ok(Plan::message(chat, "Enter the new category name:"))
            })
            .await
    }

    pub(super) async fn start_new_product(
        &self,
        chat: ChatId,
        category: String,
    ) -> Result<Plan, HandlerError> {
        self.ensure_admin(chat)?;
        self.state
            .mutate(|doc| {
                if !doc.catalog.has_category(&category) {
                    return Err(DomainError::NotFound.into());
                }
                if let Some(displaced) = doc
                    .sessions
                    .start(chat, SessionState::NewProduct { category })
                {
                    tracing::warn!(chat = %chat, ?displaced, "active flow superseded");
                }
                Ok(Plan::message(chat, "Enter the new product name:"))
            })
            .await
    }

    /// Sale-mode selection for a freshly created product; chains straight
    /// into the matching price flow.
    pub(super) async fn set_sale_mode(
        &self,
        chat: ChatId,
        token: ProductToken,
        mode: SaleMode,
    ) -> Result<Plan, HandlerError> {
        self.ensure_admin(chat)?;
        self.state
            .mutate(|doc| {
                let key = doc
                    .catalog
                    .resolve_token(token)
                    .ok_or(DomainError::NotFound)?;
                let product = doc.catalog.get_mut(&key).ok_or(DomainError::NotFound)?;
                product.set_sale_mode(mode);

                let (field, prompt) = match mode {
                    SaleMode::BulkOnly => (ProductField::Price, "Enter the price per gram:"),
                    SaleMode::BulkAndPieces => {
                        (ProductField::PiecePrice, "Enter the piece price:")
                    }
                };
                if let Some(displaced) = doc
                    .sessions
                    .start(chat, SessionState::AdminEdit { product: key, field })
                {
                    tracing::warn!(chat = %chat, ?displaced, "active flow superseded");
                }
                Ok(Plan::message(chat, prompt))
            })
            .await
    }

    pub(super) async fn start_broadcast(&self, chat: ChatId) -> Result<Plan, HandlerError> {
        self.ensure_admin(chat)?;
        self.state
            .mutate(|doc| {
                if let Some(displaced) = doc.sessions.start(chat, SessionState::Broadcast) {
                    tracing::warn!(chat = %chat, ?displaced, "active flow superseded");
                }
                Ok(Plan::message(
                    chat,
                    "Enter the text to broadcast to all users:",
                ))
            })
            .await
    }
}
