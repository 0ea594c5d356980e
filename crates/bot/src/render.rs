//! Message text rendering.

use std::fmt::Write as _;

use teahouse_cart::Cart;
use teahouse_catalog::Product;
use teahouse_core::DomainError;
use teahouse_inventory::{Shortfall, StockLevel};
use teahouse_orders::{Order, OrderStats};
use teahouse_session::{FlowPrompt, FlowRejection};

pub const WELCOME: &str = "Welcome to the Teahouse shop! 🍵\n\n\
We offer a wide selection of Chinese tea and teaware for the tea ceremony.\n\n\
Pick a section below:";

pub const HELP: &str = "How to place an order:\n\
1. Pick a category in the catalog\n\
2. Pick a product and a quantity (teas start at 20 g)\n\
3. Add it to your cart\n\
4. Open the cart and check out\n\n\
Questions? Message @teahouse_support";

pub const CONTACT: &str = "For any questions: @teahouse_support";
pub const REVIEWS: &str = "What our customers say:\nhttps://t.me/teahouse_reviews";
pub const CHANNEL: &str = "Follow our channel:\nhttps://t.me/teahouse_news";

pub const GENERIC_FAILURE: &str = "Something went wrong. Please try again later.";

/// Stock line for a product, both unit kinds where configured.
fn stock_line(product: &Product, level: StockLevel) -> String {
    match (product.allows_pieces(), level.pieces) {
        (true, Some(pieces)) => format!("In stock: {} g and {} pcs", level.bulk, pieces),
        (true, None) => format!("In stock: {} g", level.bulk),
        (false, _) => format!("In stock: {} g", level.bulk),
    }
}

fn price_line(product: &Product) -> String {
    match product.piece_price() {
        Some(piece) => format!("Price: {} per g or {} per pcs", product.bulk_price(), piece),
        None => format!("Price: {} per g", product.bulk_price()),
    }
}

/// Category overview: every product with price, description and stock.
pub fn category_listing<'a>(
    category: &str,
    products: impl Iterator<Item = (&'a String, &'a Product, StockLevel)>,
) -> String {
    let mut text = format!("{category}:\n\n");
    for (name, product, level) in products {
        let _ = writeln!(text, "{name}");
        let _ = writeln!(text, "{}", price_line(product));
        if !product.description().is_empty() {
            let _ = writeln!(text, "{}", product.description());
        }
        let _ = writeln!(text, "{}\n", stock_line(product, level));
    }
    text.trim_end().to_string()
}

/// One product's card.
pub fn product_card(name: &str, product: &Product, level: StockLevel) -> String {
    let mut text = String::new();
    let _ = writeln!(text, "{name}");
    if !product.description().is_empty() {
        let _ = writeln!(text, "{}", product.description());
    }
    let _ = writeln!(text);
    let _ = writeln!(text, "{}", price_line(product));
    let _ = write!(text, "{}", stock_line(product, level));
    text
}

/// Current parameters of a product, for the management view.
pub fn product_admin_summary(name: &str, product: &Product, level: StockLevel) -> String {
    let mut text = format!("Managing \"{name}\":\n\nCurrent parameters:\n");
    let _ = writeln!(text, "• Price: {} per g", product.bulk_price());
    if let Some(piece) = product.piece_price() {
        let _ = writeln!(text, "• Piece price: {piece} per pcs");
    }
    let _ = writeln!(text, "• Stock: {} g", level.bulk);
    if product.allows_pieces() {
        let _ = writeln!(text, "• Stock (pcs): {}", level.pieces.unwrap_or(0));
    }
    let description = if product.description().is_empty() {
        "No description yet"
    } else {
        product.description()
    };
    let _ = write!(text, "• Description: {description}");
    text
}

pub fn cart_view(cart: &Cart) -> String {
    let mut text = String::from("Your cart:\n\n");
    for (index, item) in cart.items().iter().enumerate() {
        let _ = writeln!(text, "{}. {}", index + 1, item.product.name);
        let _ = writeln!(
            text,
            "{} {} × {} = {}\n",
            item.quantity,
            item.unit.label(),
            item.unit_price,
            item.line_total()
        );
    }
    let _ = write!(text, "Total: {}", cart.total());
    text
}

pub fn unavailable_list(shortfalls: &[Shortfall]) -> String {
    let mut text = String::from("Some items are no longer available in the requested quantity:\n");
    for shortfall in shortfalls {
        let _ = writeln!(
            text,
            "• {} (available: {} {})",
            shortfall.key.name,
            shortfall.available,
            shortfall.unit.label()
        );
    }
    text.push_str("\nPlease adjust the quantities or remove these items from your cart.");
    text
}

/// Why a completion was refused, for the administrator.
pub fn completion_shortfall(shortfalls: &[Shortfall]) -> String {
    let mut text = String::from("Cannot complete the order, stock ran short:\n");
    for shortfall in shortfalls {
        let _ = writeln!(
            text,
            "• {}: {} {} ordered, {} available",
            shortfall.key.name,
            shortfall.requested,
            shortfall.unit.label(),
            shortfall.available
        );
    }
    text.push_str("\nRestock and try again, or cancel the order.");
    text
}

/// The order as the administrator sees it.
pub fn order_summary(order: &Order) -> String {
    let delivery = order.delivery();
    let mut text = format!("📦 Order #{}\n\n", order.id().short());
    let _ = writeln!(text, "👤 Customer:");
    let _ = writeln!(text, "Name: {}", delivery.recipient);
    let _ = writeln!(text, "Phone: {}\n", delivery.phone);
    let _ = writeln!(text, "📍 Delivery:");
    let _ = writeln!(text, "City: {}", delivery.city);
    let _ = writeln!(text, "Method: {}\n", delivery.method.label());
    let _ = writeln!(text, "🛍️ Items:");
    for line in order.lines() {
        let _ = writeln!(
            text,
            "• {} ({} {})",
            line.product.name,
            line.quantity,
            line.unit.label()
        );
    }
    let _ = writeln!(text, "\n💰 Total: {}", order.total());
    let _ = write!(text, "Status: {}", order.status().label());
    text
}

/// The confirmation the customer gets right after checkout.
pub fn customer_confirmation(order: &Order) -> String {
    let delivery = order.delivery();
    format!(
        "Order #{} has been placed!\n\n\
         📍 Delivery:\nCity: {}\nMethod: {}\n\n\
         👤 Recipient:\nName: {}\nPhone: {}\n\n\
         💰 Total: {}\n\n\
         We will contact you to confirm the order.",
        order.id().short(),
        delivery.city,
        delivery.method.label(),
        delivery.recipient,
        delivery.phone,
        order.total()
    )
}

pub fn stats(users: usize, stats: OrderStats) -> String {
    format!(
        "📊 Shop statistics:\n\n\
         👥 Users: {users}\n\n\
         📦 Orders:\n\
         • Total: {}\n\
         • New: {}\n\
         • Completed: {}\n\
         • Cancelled: {}\n\n\
         💰 Revenue (completed): {}",
        stats.total, stats.new, stats.completed, stats.cancelled, stats.revenue
    )
}

/// Mid-flow prompts after a step was accepted.
pub fn prompt(prompt: FlowPrompt) -> &'static str {
    match prompt {
        FlowPrompt::ChooseDelivery => "Choose a delivery method:",
        FlowPrompt::EnterName => "Enter your full name:",
        FlowPrompt::EnterPhone => "Enter your phone number:",
    }
}

/// Re-prompts after a step refused its input.
pub fn rejection(rejection: FlowRejection) -> &'static str {
    match rejection {
        FlowRejection::InvalidQuantity => "Please enter a valid quantity (a whole number above 0)",
        FlowRejection::InvalidPrice => "Please enter a valid price (a whole number above 0)",
        FlowRejection::InvalidCount => "Please enter a valid count (a whole number, 0 or more)",
        FlowRejection::EmptyText => "This cannot be empty, please try again",
        FlowRejection::UnknownDelivery => "Please pick one of the delivery options",
        FlowRejection::ExpectedPhoto => "Please send a photo",
        FlowRejection::UnexpectedInput => "Please send a text message",
    }
}

/// User-facing wording for deterministic domain failures.
pub fn domain_error(error: &DomainError) -> String {
    match error {
        DomainError::InsufficientStock { available } => {
            format!("Unfortunately, only {available} are available right now")
        }
        DomainError::BelowMinimum { minimum } => {
            format!("The minimum bulk order is {minimum} g")
        }
        DomainError::NotFound => "That item no longer exists".to_string(),
        DomainError::Unauthorized => "You do not have access to this action".to_string(),
        DomainError::Validation(msg)
        | DomainError::InvariantViolation(msg)
        | DomainError::Conflict(msg) => msg.clone(),
    }
}
