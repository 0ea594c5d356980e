//! Keyboard layouts and menu labels.

use teahouse_catalog::{Catalog, Product, SaleMode};
use teahouse_core::{ChatId, DeliveryMethod, OrderId, ProductKey, UnitKind};
use teahouse_gateway::{InlineButton, InlineKeyboard, Keyboard, ReplyKeyboard};
use teahouse_session::ProductField;

use crate::actions::CallbackAction;

/// Main-menu button labels. The reply keyboard sends these back verbatim.
pub mod menu {
    pub const CATALOG: &str = "🍵 Catalog";
    pub const CART: &str = "🛒 Cart";
    pub const CONTACT: &str = "📞 Contact us";
    pub const HELP: &str = "❓ Help";
    pub const REVIEWS: &str = "⭐️ Reviews";
    pub const CHANNEL: &str = "📢 Our channel";
    pub const BACK: &str = "⬅️ Back to menu";

    pub const ADMIN_STATS: &str = "📊 Statistics";
    pub const ADMIN_ORDERS: &str = "📦 Orders";
    pub const ADMIN_PRODUCTS: &str = "🏪 Manage products";
    pub const ADMIN_BROADCAST: &str = "📢 Broadcast";
    pub const ADMIN_LEAVE: &str = "⬅️ Leave admin panel";
}

pub fn main_menu() -> Keyboard {
    ReplyKeyboard::new([
        vec![menu::CATALOG, menu::CART],
        vec![menu::CONTACT, menu::HELP],
        vec![menu::REVIEWS, menu::CHANNEL],
    ])
    .into()
}

pub fn admin_menu() -> Keyboard {
    ReplyKeyboard::new([
        vec![menu::ADMIN_STATS, menu::ADMIN_ORDERS],
        vec![menu::ADMIN_PRODUCTS, menu::ADMIN_BROADCAST],
        vec![menu::ADMIN_LEAVE],
    ])
    .into()
}

/// Category picker: two categories per row, back button last.
pub fn categories_menu(catalog: &Catalog) -> Keyboard {
    let mut rows: Vec<Vec<String>> = Vec::new();
    let mut row: Vec<String> = Vec::new();
    for category in catalog.categories() {
        row.push(category.to_string());
        if row.len() == 2 {
            rows.push(std::mem::take(&mut row));
        }
    }
    if !row.is_empty() {
        rows.push(row);
    }
    rows.push(vec![menu::BACK.to_string()]);
    Keyboard::Reply(ReplyKeyboard { rows })
}

/// One button per product of a category.
pub fn category_products(catalog: &Catalog, category: &str) -> Keyboard {
    let mut keyboard = InlineKeyboard::new();
    if let Ok(products) = catalog.products_in(category) {
        for name in products.keys() {
            let key = ProductKey::new(category, name.clone());
            keyboard = keyboard.row(vec![InlineButton::callback(
                name.clone(),
                CallbackAction::ShowProduct(key.token()).to_string(),
            )]);
        }
    }
    keyboard.into()
}

/// Quick amounts for a product card, plus custom entry.
pub fn product_card(key: &ProductKey, product: &Product) -> Keyboard {
    let token = key.token();
    let gram_button = |grams: u32| {
        InlineButton::callback(
            format!("{grams} g"),
            CallbackAction::AddAmount {
                token,
                quantity: grams,
                unit: UnitKind::Bulk,
            }
            .to_string(),
        )
    };

    let mut keyboard =
        InlineKeyboard::new().row(vec![gram_button(20), gram_button(50), gram_button(100)]);

    if product.allows_pieces() {
        let piece_button = |count: u32| {
            InlineButton::callback(
                format!("{count} pcs"),
                CallbackAction::AddAmount {
                    token,
                    quantity: count,
                    unit: UnitKind::Piece,
                }
                .to_string(),
            )
        };
        keyboard = keyboard.row(vec![piece_button(1), piece_button(2), piece_button(5)]);
    }

    let mut custom = vec![InlineButton::callback(
        "Custom amount (g)",
        CallbackAction::CustomAmount {
            token,
            unit: UnitKind::Bulk,
        }
        .to_string(),
    )];
    if product.allows_pieces() {
        custom.push(InlineButton::callback(
            "Custom amount (pcs)",
            CallbackAction::CustomAmount {
                token,
                unit: UnitKind::Piece,
            }
            .to_string(),
        ));
    }
    keyboard.row(custom).into()
}

pub fn cart_controls() -> Keyboard {
    InlineKeyboard::new()
        .row(vec![InlineButton::callback(
            "🗑 Clear cart",
            CallbackAction::ClearCart.to_string(),
        )])
        .row(vec![InlineButton::callback(
            "✅ Checkout",
            CallbackAction::Checkout.to_string(),
        )])
        .into()
}

pub fn delivery_methods() -> Keyboard {
    let mut keyboard = InlineKeyboard::new();
    for method in DeliveryMethod::ALL {
        keyboard = keyboard.row(vec![InlineButton::callback(
            method.label(),
            CallbackAction::Delivery(method).to_string(),
        )]);
    }
    keyboard.into()
}

/// Accept/reject controls under an order notification, plus a direct line to
/// the customer.
pub fn order_controls(id: OrderId, customer: ChatId) -> Keyboard {
    InlineKeyboard::new()
        .row(vec![
            InlineButton::callback("✅ Completed", CallbackAction::CompleteOrder(id).to_string()),
            InlineButton::callback("❌ Cancelled", CallbackAction::CancelOrder(id).to_string()),
        ])
        .row(vec![InlineButton::url(
            "👤 Message the customer",
            format!("tg://user?id={customer}"),
        )])
        .into()
}

pub fn admin_categories(catalog: &Catalog) -> Keyboard {
    let mut keyboard = InlineKeyboard::new();
    for category in catalog.categories() {
        keyboard = keyboard.row(vec![InlineButton::callback(
            category,
            CallbackAction::ManageCategory(category.to_string()).to_string(),
        )]);
    }
    keyboard
        .row(vec![InlineButton::callback(
            "➕ Add a category",
            CallbackAction::NewCategory.to_string(),
        )])
        .into()
}

pub fn admin_products(catalog: &Catalog, category: &str) -> Keyboard {
    let mut keyboard = InlineKeyboard::new();
    if let Ok(products) = catalog.products_in(category) {
        for name in products.keys() {
            let key = ProductKey::new(category, name.clone());
            keyboard = keyboard.row(vec![InlineButton::callback(
                name.clone(),
                CallbackAction::ManageProduct(key.token()).to_string(),
            )]);
        }
    }
    keyboard
        .row(vec![InlineButton::callback(
            "➕ Add a product",
            CallbackAction::NewProductIn(category.to_string()).to_string(),
        )])
        .into()
}

/// Per-product admin controls; piece rows appear only when piece sales are
/// allowed.
pub fn product_admin_controls(key: &ProductKey, product: &Product) -> Keyboard {
    let token = key.token();
    let edit = |label: &str, field: ProductField| {
        vec![InlineButton::callback(
            label,
            CallbackAction::EditField { token, field }.to_string(),
        )]
    };

    let mut keyboard = InlineKeyboard::new()
        .row(edit("📷 Set photo", ProductField::Image))
        .row(edit("✏️ Set price", ProductField::Price))
        .row(edit("📦 Set stock (g)", ProductField::BulkStock));
    if product.allows_pieces() {
        keyboard = keyboard
            .row(edit("✏️ Set piece price", ProductField::PiecePrice))
            .row(edit("📦 Set stock (pcs)", ProductField::PieceStock));
    }
    keyboard
        .row(edit("📝 Set description", ProductField::Description))
        .row(vec![InlineButton::callback(
            "🗑️ Delete product",
            CallbackAction::DeleteProduct(token).to_string(),
        )])
        .into()
}

pub fn sale_modes(key: &ProductKey) -> Keyboard {
    let token = key.token();
    InlineKeyboard::new()
        .row(vec![InlineButton::callback(
            "By weight only",
            CallbackAction::SetSaleMode {
                token,
                mode: SaleMode::BulkOnly,
            }
            .to_string(),
        )])
        .row(vec![InlineButton::callback(
            "By weight and per piece",
            CallbackAction::SetSaleMode {
                token,
                mode: SaleMode::BulkAndPieces,
            }
            .to_string(),
        )])
        .into()
}
