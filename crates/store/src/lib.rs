//! Persistence module.
//!
//! The whole application state is one serializable document, read and
//! written atomically as a unit. [`AppState`] is the single writer: every
//! read-check-mutate-persist sequence runs behind one lock, and in-memory
//! state is only updated after the durable write succeeded.

pub mod document;
pub mod state;
pub mod store;

pub use document::StateDocument;
pub use state::AppState;
pub use store::{DocumentStore, JsonFileStore, MemoryStore, StoreError};
