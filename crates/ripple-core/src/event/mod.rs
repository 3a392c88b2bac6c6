pub mod dispatcher;
pub mod error;
pub mod types;

use std::any::Any;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

/// Event priority level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EventPriority {
    /// Lowest priority, processed last
    Low = 0,
    /// Normal priority, processed in the middle
    Normal = 1,
    /// High priority, processed before normal handlers
    High = 2,
    /// Critical priority, processed first
    Critical = 3,
}

impl Default for EventPriority {
    fn default() -> Self {
        EventPriority::Normal
    }
}

/// What a propagation-aware handler wants to happen after it ran
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventResult {
    /// Keep delivering the event to lower-priority handlers
    Continue,
    /// Consume the event; no further handler sees it in this dispatch
    Stop,
}

impl From<bool> for EventResult {
    /// `true` means "keep propagating".
    fn from(keep_going: bool) -> Self {
        if keep_going { EventResult::Continue } else { EventResult::Stop }
    }
}

/// State every event carries regardless of its payload.
///
/// The timestamp is taken from the monotonic clock when the event is built.
/// The consumed flag is one-way: once [`consume`](EventMeta::consume) has been
/// called it stays set for the lifetime of this instance. It is atomic so that
/// handlers, which only ever see `&E`, can still flip it.
pub struct EventMeta {
    created_at: Instant,
    consumed: AtomicBool,
}

impl EventMeta {
    pub fn new() -> Self {
        Self {
            created_at: Instant::now(),
            consumed: AtomicBool::new(false),
        }
    }

    pub fn timestamp(&self) -> Instant {
        self.created_at
    }

    pub fn is_consumed(&self) -> bool {
        self.consumed.load(Ordering::Acquire)
    }

    pub fn consume(&self) {
        self.consumed.store(true, Ordering::Release);
    }
}

impl Default for EventMeta {
    fn default() -> Self {
        Self::new()
    }
}

// A copy keeps the original timestamp and whatever consumption state the
// source had at the time of the copy.
impl Clone for EventMeta {
    fn clone(&self) -> Self {
        Self {
            created_at: self.created_at,
            consumed: AtomicBool::new(self.is_consumed()),
        }
    }
}

impl fmt::Debug for EventMeta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventMeta")
            .field("age", &self.created_at.elapsed())
            .field("consumed", &self.is_consumed())
            .finish()
    }
}

/// Core event trait
///
/// Implementors are plain payload types that embed an [`EventMeta`]. The
/// dispatcher routes on the concrete type, so two different structs never
/// reach each other's subscribers even if they share a [`name`](Event::name).
pub trait Event: Any + fmt::Debug + Send + Sync {
    /// Get the name of this event, used in diagnostics
    fn name(&self) -> &'static str;

    /// Base state (timestamp and consumed flag)
    fn meta(&self) -> &EventMeta;

    /// Cast to Any for downcasting
    fn as_any(&self) -> &dyn Any;

    /// When the event was created
    fn timestamp(&self) -> Instant {
        self.meta().timestamp()
    }

    /// Time since the event was created
    fn elapsed(&self) -> Duration {
        self.meta().timestamp().elapsed()
    }

    fn is_consumed(&self) -> bool {
        self.meta().is_consumed()
    }

    /// Stop propagation to every handler that has not run yet
    fn consume(&self) {
        self.meta().consume()
    }
}

/// Type alias for boxed event
pub type BoxedEvent = Box<dyn Event>;

/// Re-export important types
pub use dispatcher::{
    DispatchHandle, EventDispatcher, FailureSource, HandlerFailure, ScopedSubscription, SubscriptionBuilder,
    SubscriptionHandle,
};
pub use error::EventSystemError;
pub use types::{
    CharacterEvent, DataEvent, InputAction, KeyboardEvent, MessageEvent, Modifiers, MouseButton,
    MouseButtonEvent, MouseMoveEvent, MouseScrollEvent, PropertyChangeEvent, SystemEvent,
    SystemEventKind, WindowEvent, WindowEventKind,
};

// Test module declaration
#[cfg(test)]
pub(crate) mod tests;
