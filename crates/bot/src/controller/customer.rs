//! Customer-facing handlers: menu, catalog browsing, cart, checkout entry.

use teahouse_core::{ChatId, DomainError, ProductKey, ProductToken, UnitKind};
use teahouse_gateway::MessagingGateway;
use teahouse_orders::unavailable_items;
use teahouse_session::{CheckoutFlow, SessionState};

use crate::error::HandlerError;
use crate::keyboards::{self, menu};
use crate::render;

use super::{DialogueController, Plan};

impl<G: MessagingGateway> DialogueController<G> {
    pub(super) async fn handle_start(&self, chat: ChatId) -> Result<Plan, HandlerError> {
        let known = self.state.read(|doc| doc.users.contains(&chat)).await;
        if !known {
            self.state
                .mutate(|doc| {
                    doc.register_user(chat);
                    Ok::<_, HandlerError>(())
                })
                .await?;
        }
        Ok(Plan::with_keyboard(
            chat,
            render::WELCOME,
            keyboards::main_menu(),
        ))
    }

    pub(super) async fn handle_menu(&self, chat: ChatId, text: &str) -> Result<Plan, HandlerError> {
        match text {
            menu::CATALOG => {
                let keyboard = self
                    .state
                    .read(|doc| keyboards::categories_menu(&doc.catalog))
                    .await;
                Ok(Plan::with_keyboard(chat, "Pick a category:", keyboard))
            }
            menu::CART => self.show_cart(chat).await,
            menu::CONTACT => Ok(Plan::message(chat, render::CONTACT)),
            menu::HELP => Ok(Plan::message(chat, render::HELP)),
            menu::REVIEWS => Ok(Plan::message(chat, render::REVIEWS)),
            menu::CHANNEL => Ok(Plan::message(chat, render::CHANNEL)),
            menu::BACK => Ok(Plan::with_keyboard(
                chat,
                "Main menu:",
                keyboards::main_menu(),
            )),
            menu::ADMIN_STATS => self.admin_stats(chat).await,
            menu::ADMIN_ORDERS => self.admin_orders(chat).await,
            menu::ADMIN_PRODUCTS => self.admin_manage(chat).await,
            menu::ADMIN_BROADCAST => self.start_broadcast(chat).await,
            menu::ADMIN_LEAVE => self.leave_admin(chat).await,
            other => self.show_category(chat, other).await,
        }
    }

    /// Category overview, or nothing if the text is not a category name.
    async fn show_category(&self, chat: ChatId, name: &str) -> Result<Plan, HandlerError> {
        self.state
            .read(|doc| {
                let Ok(products) = doc.catalog.products_in(name) else {
                    return Ok(Plan::none());
                };
                let text = render::category_listing(
                    name,
                    products.iter().map(|(product_name, product)| {
                        let key = ProductKey::new(name, product_name.clone());
                        (product_name, product, doc.ledger.level(&key))
                    }),
                );
                Ok(Plan::with_keyboard(
                    chat,
                    text,
                    keyboards::category_products(&doc.catalog, name),
                ))
            })
            .await
    }

    pub(super) async fn show_product(
        &self,
        chat: ChatId,
        token: ProductToken,
    ) -> Result<Plan, HandlerError> {
        self.state
            .read(|doc| {
                let key = doc
                    .catalog
                    .resolve_token(token)
                    .ok_or(DomainError::NotFound)?;
                let product = doc.catalog.get(&key).ok_or(DomainError::NotFound)?;
                let text = render::product_card(&key.name, product, doc.ledger.level(&key));
                let keyboard = keyboards::product_card(&key, product);
                Ok(match product.image() {
                    Some(image) => Plan::photo(chat, image.clone(), text, keyboard),
                    None => Plan::with_keyboard(chat, text, keyboard),
                })
            })
            .await
    }

    /// Preset-amount button: validate against the ledger and append to the
    /// cart in one critical section.
    pub(super) async fn add_to_cart(
        &self,
        chat: ChatId,
        token: ProductToken,
        unit: UnitKind,
        quantity: u32,
    ) -> Result<Plan, HandlerError> {
        self.state
            .mutate(|doc| {
                let key = doc
                    .catalog
                    .resolve_token(token)
                    .ok_or(DomainError::NotFound)?;
                let product = doc.catalog.get(&key).ok_or(DomainError::NotFound)?;
                let cart = doc.carts.entry(chat).or_default();
                cart.add_item(key.clone(), product, unit, quantity, &doc.ledger)?;
                Ok(Plan::message(
                    chat,
                    format!("Added to cart: {} ({} {})", key.name, quantity, unit.label()),
                ))
            })
            .await
    }

    pub(super) async fn start_amount_entry(
        &self,
        chat: ChatId,
        token: ProductToken,
        unit: UnitKind,
    ) -> Result<Plan, HandlerError> {
        self.state
            .mutate(|doc| {
                let key = doc
                    .catalog
                    .resolve_token(token)
                    .ok_or(DomainError::NotFound)?;
                if let Some(displaced) = doc.sessions.start(
                    chat,
                    SessionState::AmountEntry {
                        product: key,
                        unit,
                    },
                ) {
                    tracing::warn!(chat = %chat, ?displaced, "active flow superseded");
                }
                let what = match unit {
                    UnitKind::Bulk => "grams",
                    UnitKind::Piece => "pieces",
                };
                Ok(Plan::message(chat, format!("Enter the quantity in {what}:")))
            })
            .await
    }

    pub(super) async fn show_cart(&self, chat: ChatId) -> Result<Plan, HandlerError> {
        self.state
            .read(|doc| {
                Ok(match doc.cart(chat) {
                    Some(cart) if !cart.is_empty() => Plan::with_keyboard(
                        chat,
                        render::cart_view(cart),
                        keyboards::cart_controls(),
                    ),
                    _ => Plan::message(chat, "Your cart is empty"),
                })
            })
            .await
    }

    pub(super) async fn clear_cart(&self, chat: ChatId) -> Result<Plan, HandlerError> {
        self.state
            .mutate(|doc| {
                if let Some(cart) = doc.carts.get_mut(&chat) {
                    cart.clear();
                }
                Ok(Plan::message(chat, "Cart cleared"))
            })
            .await
    }

    /// Checkout button: re-check the cart against the ledger, then open the
    /// delivery-details flow.
    pub(super) async fn start_checkout(&self, chat: ChatId) -> Result<Plan, HandlerError> {
        self.state
            .mutate(|doc| {
                let Some(cart) = doc.cart(chat).filter(|cart| !cart.is_empty()) else {
                    return Ok(Plan::message(chat, "Your cart is empty"));
                };

                let shortfalls = unavailable_items(cart, &doc.ledger);
                if !shortfalls.is_empty() {
                    return Ok(Plan::message(chat, render::unavailable_list(&shortfalls)));
                }

                if let Some(displaced) = doc
                    .sessions
                    .start(chat, SessionState::Checkout(CheckoutFlow::City))
                {
                    tracing::warn!(chat = %chat, ?displaced, "active flow superseded");
                }
                Ok(Plan::message(chat, "Enter your delivery city:"))
            })
            .await
    }
}
