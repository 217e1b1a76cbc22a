//! Session-wide shared context
//!
//! - [`state`] - the record, its keys and the pure transition function
//! - [`persisted`] - field-by-field durable encoding
//! - [`store`] - the store that serializes transitions, persists and notifies

pub mod persisted;
pub mod state;
pub mod store;

pub use persisted::PersistedContext;
pub use state::{reduce, ContextKey, SharedContext, Transition};
pub use store::SharedContextStore;
