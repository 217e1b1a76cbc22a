//! Cross-module events
//!
//! [`EventBus`] carries [`AppEvent`]s between modules that have no structural
//! relationship. [`bridge_to_context`] turns the id-change events into shared
//! context transitions.

pub mod bridge;
pub mod bus;
pub mod listeners;

pub use bridge::{bridge_to_context, ContextBridge};
pub use bus::{AppEvent, EventBus, ResourceRef};
pub use listeners::{ListenerSet, Subscription};
