//! Cart domain module.
//!
//! A per-user ordered list of line items with prices captured at add time.
//! Adding an item is the first of the two stock checks a purchase passes
//! through; checkout re-validates against the ledger again.

pub mod cart;

pub use cart::{Cart, CartItem, MIN_BULK_QUANTITY};
