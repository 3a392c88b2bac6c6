//! # ripple-core
//!
//! A thread-safe event dispatcher keyed by event type. Producers build an
//! event value and call [`EventDispatcher::dispatch`]; consumers subscribe a
//! handler for one concrete event type with a priority and an optional filter.
//! Any handler can stop propagation by consuming the event.
pub mod config;
pub mod error;
pub mod event;

// Re-export key public types for easier use by the binary
pub use config::DispatcherConfig;
pub use error::{Error, Result};
pub use event::{
    Event, EventDispatcher, EventMeta, EventPriority, EventResult, ScopedSubscription,
    SubscriptionHandle,
};

#[cfg(test)]
mod tests;
