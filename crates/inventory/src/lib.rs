//! Inventory domain module.
//!
//! The ledger is the authoritative record of available quantity per product
//! and unit kind. Commerce reduces it through `decrement`/`decrement_batch`
//! only; administrative restocking is an unconditional overwrite.

pub mod ledger;

pub use ledger::{Ledger, Shortfall, StockDemand, StockLevel};
