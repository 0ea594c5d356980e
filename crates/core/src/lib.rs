//! `teahouse-core` — domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns).

pub mod error;
pub mod id;
pub mod value_object;

pub use error::{DomainError, DomainResult};
pub use id::{ChatId, OrderId, ProductKey, ProductToken};
pub use value_object::{DeliveryDetails, DeliveryMethod, ImageRef, UnitKind};
