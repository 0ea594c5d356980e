//! Order domain module.
//!
//! Orders are immutable snapshots of a cart at checkout time; only their
//! status moves, one way, out of `New`. Completion is the single commerce
//! path that reduces the inventory ledger.

pub mod book;
pub mod order;

pub use book::{OrderBook, OrderStats};
pub use order::{
    checkout, unavailable_items, CheckoutError, LifecycleError, Order, OrderLine, OrderStatus,
};
