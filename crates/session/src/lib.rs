//! Session domain module: the per-user dialogue state machine.
//!
//! Each user has zero or one active flow. A flow is a short sequence of
//! steps collecting structured input; `advance` validates the current step
//! and either moves on, completes with a typed outcome, or rejects without
//! moving. Flows serialize verbatim into the persisted state document, step
//! position included.

pub mod sessions;
pub mod state;

pub use sessions::{Advance, Sessions};
pub use state::{
    CheckoutFlow, FlowInput, FlowOutcome, FlowPrompt, FlowRejection, ProductField, SessionState,
    StepOutcome,
};
