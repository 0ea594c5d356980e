use thiserror::Error;

use teahouse_core::DomainError;
use teahouse_orders::{CheckoutError, LifecycleError};
use teahouse_store::StoreError;

/// Anything that can make handling one inbound event fail.
///
/// Domain-shaped variants are rendered into a message for the originating
/// chat; a store failure gets a generic apology plus an error log, and the
/// mutation it interrupted is rolled back by the state layer. Transport
/// failures are not errors here; sends are logged and never abort handling.
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    Checkout(#[from] CheckoutError),
    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),
    #[error(transparent)]
    Store(#[from] StoreError),
}
