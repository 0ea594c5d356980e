use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use teahouse_cart::{Cart, CartItem};
use teahouse_core::{ChatId, DeliveryDetails, OrderId, ProductKey, UnitKind};
use teahouse_inventory::{Ledger, Shortfall, StockDemand};

/// Order status lifecycle. Transitions leave `New` exactly once and never
/// come back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    New,
    Completed,
    Cancelled,
}

impl OrderStatus {
    pub fn label(&self) -> &'static str {
        match self {
            OrderStatus::New => "new",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

/// Order line: the cart line it was snapshotted from, verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    pub product: ProductKey,
    pub unit: UnitKind,
    pub quantity: u32,
    /// Unit price in the smallest currency unit, as captured at add time.
    pub unit_price: u64,
}

impl OrderLine {
    pub fn line_total(&self) -> u64 {
        self.unit_price * u64::from(self.quantity)
    }
}

impl From<&CartItem> for OrderLine {
    fn from(item: &CartItem) -> Self {
        Self {
            product: item.product.clone(),
            unit: item.unit,
            quantity: item.quantity,
            unit_price: item.unit_price,
        }
    }
}

/// An order record. Immutable once created, except for `status`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    id: OrderId,
    customer: ChatId,
    lines: Vec<OrderLine>,
    delivery: DeliveryDetails,
    created_at: DateTime<Utc>,
    status: OrderStatus,
}

/// Why checkout refused to mint an order.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheckoutError {
    #[error("cart is empty")]
    EmptyCart,
    /// One or more lines exceed current availability. The cart is left
    /// untouched so the user can adjust it.
    #[error("{} item(s) no longer available in the requested quantity", .0.len())]
    Unavailable(Vec<Shortfall>),
}

/// Why a status transition was refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LifecycleError {
    /// The order already left `New`; terminal states are sticky and repeat
    /// transitions are reported no-ops.
    #[error("order is already {}", .0.label())]
    AlreadySettled(OrderStatus),
    /// Completion would overdraw the ledger. Nothing was decremented and the
    /// order remains `New`.
    #[error("{} item(s) short of stock", .0.len())]
    OutOfStock(Vec<Shortfall>),
}

/// Cart lines whose quantity exceeds current ledger availability.
///
/// Used both for the pre-checkout stock check and inside [`checkout`]
/// itself.
pub fn unavailable_items(cart: &Cart, ledger: &Ledger) -> Vec<Shortfall> {
    cart.items()
        .iter()
        .filter_map(|item| {
            let available = ledger.available(&item.product, item.unit);
            (item.quantity > available).then(|| Shortfall {
                key: item.product.clone(),
                unit: item.unit,
                requested: item.quantity,
                available,
            })
        })
        .collect()
}

/// Re-validate the cart against current availability and mint an order.
///
/// Every line is checked against what the ledger has *now*, closing the
/// window between add-time and checkout-time drift. On any shortfall no
/// order is created and the shortfall list is returned; the cart is the
/// caller's to keep. The ledger is not decremented here; that happens at
/// completion.
pub fn checkout(
    customer: ChatId,
    cart: &Cart,
    delivery: DeliveryDetails,
    ledger: &Ledger,
    now: DateTime<Utc>,
) -> Result<Order, CheckoutError> {
    if cart.is_empty() {
        return Err(CheckoutError::EmptyCart);
    }

    let shortfalls = unavailable_items(cart, ledger);
    if !shortfalls.is_empty() {
        return Err(CheckoutError::Unavailable(shortfalls));
    }

    Ok(Order {
        id: OrderId::new(),
        customer,
        lines: cart.items().iter().map(OrderLine::from).collect(),
        delivery,
        created_at: now,
        status: OrderStatus::New,
    })
}

impl Order {
    pub fn id(&self) -> OrderId {
        self.id
    }

    pub fn customer(&self) -> ChatId {
        self.customer
    }

    pub fn lines(&self) -> &[OrderLine] {
        &self.lines
    }

    pub fn delivery(&self) -> &DeliveryDetails {
        &self.delivery
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn status(&self) -> OrderStatus {
        self.status
    }

    pub fn is_new(&self) -> bool {
        self.status == OrderStatus::New
    }

    /// Σ captured price × quantity over the snapshot. Stable forever, no
    /// matter what happens to catalog prices afterwards.
    pub fn total(&self) -> u64 {
        self.lines.iter().map(OrderLine::line_total).sum()
    }

    fn demands(&self) -> Vec<StockDemand> {
        self.lines
            .iter()
            .map(|line| StockDemand {
                key: line.product.clone(),
                unit: line.unit,
                quantity: line.quantity,
            })
            .collect()
    }

    /// Fulfil the order: decrement the ledger by every line, all or nothing,
    /// then mark it completed.
    pub fn complete(&mut self, ledger: &mut Ledger) -> Result<(), LifecycleError> {
        if self.status != OrderStatus::New {
            return Err(LifecycleError::AlreadySettled(self.status));
        }
        ledger
            .decrement_batch(&self.demands())
            .map_err(LifecycleError::OutOfStock)?;
        self.status = OrderStatus::Completed;
        Ok(())
    }

    /// Reject the order. Stock was never decremented for it, so the ledger
    /// is left untouched.
    pub fn cancel(&mut self) -> Result<(), LifecycleError> {
        if self.status != OrderStatus::New {
            return Err(LifecycleError::AlreadySettled(self.status));
        }
        self.status = OrderStatus::Cancelled;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use teahouse_catalog::{Product, SaleMode};

    const CUSTOMER: ChatId = ChatId(100);

    fn tea() -> ProductKey {
        ProductKey::new("Dark Oolong", "Wild Dan Cong")
    }

    fn pot() -> ProductKey {
        ProductKey::new("Teaware", "Clay Pot")
    }

    fn details() -> DeliveryDetails {
        DeliveryDetails {
            city: "X".into(),
            method: "cdek".parse().unwrap(),
            recipient: "Y".into(),
            phone: "Z".into(),
        }
    }

    /// Cart with 20 g of tea at 13 and 2 clay pots at 500.
    fn filled_cart(ledger: &Ledger) -> Cart {
        let mut tea_product = Product::new();
        tea_product.set_bulk_price(13).unwrap();

        let mut pot_product = Product::new();
        pot_product.set_bulk_price(1).unwrap();
        pot_product.set_sale_mode(SaleMode::BulkAndPieces);
        pot_product.set_piece_price(500).unwrap();

        let mut cart = Cart::new();
        cart.add_item(tea(), &tea_product, UnitKind::Bulk, 20, ledger)
            .unwrap();
        cart.add_item(pot(), &pot_product, UnitKind::Piece, 2, ledger)
            .unwrap();
        cart
    }

    fn stocked_ledger() -> Ledger {
        let mut ledger = Ledger::new();
        ledger.set_available(&tea(), UnitKind::Bulk, 1000);
        ledger.set_available(&pot(), UnitKind::Piece, 5);
        ledger
    }

    #[test]
    fn checkout_snapshots_the_cart() {
        let ledger = stocked_ledger();
        let cart = filled_cart(&ledger);

        let order = checkout(CUSTOMER, &cart, details(), &ledger, Utc::now()).unwrap();
        assert_eq!(order.status(), OrderStatus::New);
        assert_eq!(order.lines().len(), 2);
        assert_eq!(order.total(), 20 * 13 + 2 * 500);
        assert_eq!(order.customer(), CUSTOMER);
    }

    #[test]
    fn checkout_rejects_an_empty_cart() {
        let ledger = stocked_ledger();
        let cart = Cart::new();
        assert_eq!(
            checkout(CUSTOMER, &cart, details(), &ledger, Utc::now()).unwrap_err(),
            CheckoutError::EmptyCart
        );
    }

    #[test]
    fn checkout_aborts_when_stock_drifted_below_the_cart() {
        let mut ledger = stocked_ledger();
        let cart = filled_cart(&ledger);

        // Stock dropped between add-time and checkout-time.
        ledger.set_available(&tea(), UnitKind::Bulk, 19);

        let err = checkout(CUSTOMER, &cart, details(), &ledger, Utc::now()).unwrap_err();
        match err {
            CheckoutError::Unavailable(shortfalls) => {
                assert_eq!(shortfalls.len(), 1);
                assert_eq!(shortfalls[0].key, tea());
                assert_eq!(shortfalls[0].requested, 20);
                assert_eq!(shortfalls[0].available, 19);
            }
            other => panic!("{other:?}"),
        }
        // The cart is the caller's and was never touched.
        assert_eq!(cart.len(), 2);
    }

    #[test]
    fn completion_decrements_exactly_the_ordered_quantities() {
        let mut ledger = stocked_ledger();
        let cart = filled_cart(&ledger);
        let mut order = checkout(CUSTOMER, &cart, details(), &ledger, Utc::now()).unwrap();

        order.complete(&mut ledger).unwrap();
        assert_eq!(order.status(), OrderStatus::Completed);
        assert_eq!(ledger.available(&tea(), UnitKind::Bulk), 980);
        assert_eq!(ledger.available(&pot(), UnitKind::Piece), 3);
    }

    #[test]
    fn completion_is_rejected_when_stock_ran_out_and_order_stays_new() {
        let mut ledger = stocked_ledger();
        let cart = filled_cart(&ledger);
        let mut order = checkout(CUSTOMER, &cart, details(), &ledger, Utc::now()).unwrap();

        ledger.set_available(&pot(), UnitKind::Piece, 1);

        let err = order.complete(&mut ledger).unwrap_err();
        assert!(matches!(err, LifecycleError::OutOfStock(_)));
        assert_eq!(order.status(), OrderStatus::New);
        // All-or-nothing: the satisfiable tea line was not decremented either.
        assert_eq!(ledger.available(&tea(), UnitKind::Bulk), 1000);
    }

    #[test]
    fn cancellation_never_touches_the_ledger() {
        let mut ledger = stocked_ledger();
        let cart = filled_cart(&ledger);
        let mut order = checkout(CUSTOMER, &cart, details(), &ledger, Utc::now()).unwrap();

        order.cancel().unwrap();
        assert_eq!(order.status(), OrderStatus::Cancelled);
        assert_eq!(ledger.available(&tea(), UnitKind::Bulk), 1000);
        assert_eq!(ledger.available(&pot(), UnitKind::Piece), 5);
    }

    #[test]
    fn terminal_states_are_sticky() {
        let mut ledger = stocked_ledger();
        let cart = filled_cart(&ledger);

        let mut completed = checkout(CUSTOMER, &cart, details(), &ledger, Utc::now()).unwrap();
        completed.complete(&mut ledger).unwrap();

        // Repeat completion: reported no-op, ledger untouched.
        assert_eq!(
            completed.complete(&mut ledger).unwrap_err(),
            LifecycleError::AlreadySettled(OrderStatus::Completed)
        );
        assert_eq!(
            completed.cancel().unwrap_err(),
            LifecycleError::AlreadySettled(OrderStatus::Completed)
        );
        assert_eq!(ledger.available(&tea(), UnitKind::Bulk), 980);

        let mut cancelled = checkout(CUSTOMER, &cart, details(), &ledger, Utc::now()).unwrap();
        cancelled.cancel().unwrap();
        assert_eq!(
            cancelled.complete(&mut ledger).unwrap_err(),
            LifecycleError::AlreadySettled(OrderStatus::Cancelled)
        );
        assert_eq!(ledger.available(&tea(), UnitKind::Bulk), 980);
    }

    #[test]
    fn totals_are_stable_after_later_price_edits() {
        let ledger = stocked_ledger();

        let mut tea_product = Product::new();
        tea_product.set_bulk_price(13).unwrap();

        let mut cart = Cart::new();
        cart.add_item(tea(), &tea_product, UnitKind::Bulk, 20, &ledger)
            .unwrap();
        let order = checkout(CUSTOMER, &cart, details(), &ledger, Utc::now()).unwrap();
        assert_eq!(order.total(), 260);

        // A catalog price edit after creation does not reach the snapshot.
        tea_product.set_bulk_price(99).unwrap();
        assert_eq!(order.total(), 260);
        assert_eq!(order.lines()[0].unit_price, 13);
    }
}
