//! Side effects of completed flows.
//!
//! Runs inside the state critical section: the session was already cleared
//! by the completing `advance`, and everything here lands in the same
//! persisted mutation.

use chrono::Utc;

use teahouse_core::{ChatId, DomainError};
use teahouse_orders::{checkout, CheckoutError};
use teahouse_session::FlowOutcome;
use teahouse_store::StateDocument;

use crate::config::BotConfig;
use crate::error::HandlerError;
use crate::keyboards;
use crate::render;

use super::{Outgoing, Plan};

fn ensure_admin(chat: ChatId, config: &BotConfig) -> Result<(), HandlerError> {
    if config.is_admin(chat) {
        Ok(())
    } else {
        Err(DomainError::Unauthorized.into())
    }
}

pub(super) fn apply_outcome(
    doc: &mut StateDocument,
    chat: ChatId,
    outcome: FlowOutcome,
    config: &BotConfig,
) -> Result<Plan, HandlerError> {
    match outcome {
        FlowOutcome::AddToCart {
            product,
            unit,
            quantity,
        } => {
            let entry = doc.catalog.get(&product).ok_or(DomainError::NotFound)?;
            let cart = doc.carts.entry(chat).or_default();
            cart.add_item(product.clone(), entry, unit, quantity, &doc.ledger)?;
            Ok(Plan::message(
                chat,
                format!(
                    "Added to cart: {} ({} {})",
                    product.name,
                    quantity,
                    unit.label()
                ),
            ))
        }

        FlowOutcome::CheckoutDetails(details) => {
            let cart = doc.cart(chat).ok_or(CheckoutError::EmptyCart)?;
            let order = checkout(chat, cart, details, &doc.ledger, Utc::now())?;

            let confirmation = render::customer_confirmation(&order);
            let summary = render::order_summary(&order);
            let controls = keyboards::order_controls(order.id(), chat);

            doc.orders.insert(order)?;
            if let Some(cart) = doc.carts.get_mut(&chat) {
                cart.clear();
            }

            Ok(Plan::Outgoing(vec![
                Outgoing::Message {
                    chat,
                    text: confirmation,
                    keyboard: None,
                },
                Outgoing::Message {
                    chat: config.admin_chat,
                    text: summary,
                    keyboard: Some(controls),
                },
            ]))
        }

        FlowOutcome::SetPrice { product, price } => {
            ensure_admin(chat, config)?;
            let entry = doc.catalog.get_mut(&product).ok_or(DomainError::NotFound)?;
            entry.set_bulk_price(price)?;
            Ok(Plan::message(
                chat,
                format!("Price for \"{}\" updated to {price}", product.name),
            ))
        }

        FlowOutcome::SetPiecePrice { product, price } => {
            ensure_admin(chat, config)?;
            let entry = doc.catalog.get_mut(&product).ok_or(DomainError::NotFound)?;
            entry.set_piece_price(price)?;
            Ok(Plan::message(
                chat,
                format!("Piece price for \"{}\" updated to {price}", product.name),
            ))
        }

        FlowOutcome::SetStock {
            product,
            unit,
            quantity,
        } => {
            ensure_admin(chat, config)?;
            doc.catalog.get(&product).ok_or(DomainError::NotFound)?;
            doc.ledger.set_available(&product, unit, quantity);
            Ok(Plan::message(
                chat,
                format!(
                    "Stock for \"{}\" set to {} {}",
                    product.name,
                    quantity,
                    unit.label()
                ),
            ))
        }

        FlowOutcome::SetDescription {
            product,
            description,
        } => {
            ensure_admin(chat, config)?;
            let entry = doc.catalog.get_mut(&product).ok_or(DomainError::NotFound)?;
            entry.set_description(description)?;
            Ok(Plan::message(
                chat,
                format!("Description for \"{}\" updated", product.name),
            ))
        }

        FlowOutcome::SetImage { product, image } => {
            ensure_admin(chat, config)?;
            let entry = doc.catalog.get_mut(&product).ok_or(DomainError::NotFound)?;
            entry.set_image(image);
            Ok(Plan::message(
                chat,
                format!("Photo for \"{}\" saved", product.name),
            ))
        }

        FlowOutcome::CreateCategory { name } => {
            ensure_admin(chat, config)?;
            doc.catalog.add_category(name.clone())?;
            Ok(Plan::message(chat, format!("Category \"{name}\" added")))
        }

        FlowOutcome::CreateProduct { category, name } => {
            ensure_admin(chat, config)?;
            let key = doc.catalog.add_product(&category, name)?;
            Ok(Plan::with_keyboard(
                chat,
                format!("Product \"{}\" added. Choose how it is sold:", key.name),
                keyboards::sale_modes(&key),
            ))
        }

        FlowOutcome::Broadcast { text } => {
            ensure_admin(chat, config)?;
            Ok(Plan::Broadcast {
                text,
                recipients: doc.users.iter().copied().collect(),
                report_to: chat,
            })
        }
    }
}
