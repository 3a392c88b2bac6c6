//! # Ripple Event System Errors
//!
//! Defines error types specific to the event system.
//!
//! The registry operations themselves (subscribe, unsubscribe, dispatch) never
//! fail; they report through `bool` and count returns. [`EventSystemError`]
//! covers the parts that can: the bounded event queue and the hand-off of an
//! asynchronous dispatch to another execution context.
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EventSystemError {
    #[error("Event queue is full (capacity {capacity})")]
    QueueFull {
        capacity: usize,
    },

    #[error("Asynchronous dispatch of '{event_name}' did not complete: {reason}")]
    AsyncDispatchFailed {
        event_name: &'static str,
        reason: String,
    },
}
