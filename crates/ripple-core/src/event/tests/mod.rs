mod types_tests;

use std::any::Any;

use crate::event::{Event, EventMeta};

/// Minimal event carrying one integer, shared by the event tests.
#[derive(Debug, Clone)]
pub(crate) struct TestEvent {
    pub value: i32,
    meta: EventMeta,
}

impl TestEvent {
    pub fn new(value: i32) -> Self {
        Self { value, meta: EventMeta::new() }
    }
}

impl Event for TestEvent {
    fn name(&self) -> &'static str {
        "test.event"
    }

    fn meta(&self) -> &EventMeta {
        &self.meta
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Second event type, used to check that buckets stay separate.
#[derive(Debug, Clone, Default)]
pub(crate) struct OtherEvent {
    meta: EventMeta,
}

impl Event for OtherEvent {
    fn name(&self) -> &'static str {
        "other.event"
    }

    fn meta(&self) -> &EventMeta {
        &self.meta
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

mod tests {
    use crate::event::{EventPriority, EventResult};

    #[test]
    fn test_event_priority_default() {
        assert_eq!(EventPriority::default(), EventPriority::Normal);
    }

    #[test]
    fn test_event_priority_values() {
        assert_eq!(EventPriority::Low as u32, 0);
        assert_eq!(EventPriority::Normal as u32, 1);
        assert_eq!(EventPriority::High as u32, 2);
        assert_eq!(EventPriority::Critical as u32, 3);
        assert!(EventPriority::Critical > EventPriority::High);
        assert!(EventPriority::Normal > EventPriority::Low);
    }

    #[test]
    fn test_event_result_from_bool() {
        assert_eq!(EventResult::from(true), EventResult::Continue);
        assert_eq!(EventResult::from(false), EventResult::Stop);
    }
}
