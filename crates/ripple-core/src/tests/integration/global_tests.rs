use std::any::Any;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::thread;

use crate::event::{Event, EventDispatcher, EventMeta, EventPriority};

// Private to this file so parallel tests sharing the global dispatcher
// cannot see each other's subscriptions.
#[derive(Debug, Clone, Default)]
struct GlobalProbe {
    meta: EventMeta,
}

impl Event for GlobalProbe {
    fn name(&self) -> &'static str {
        "test.global_probe"
    }

    fn meta(&self) -> &EventMeta {
        &self.meta
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[test]
fn test_global_is_one_instance() {
    let from_threads: Vec<usize> = (0..4)
        .map(|_| thread::spawn(|| EventDispatcher::global() as *const EventDispatcher as usize))
        .map(|t| t.join().unwrap())
        .collect();
    let here = EventDispatcher::global() as *const EventDispatcher as usize;
    assert!(from_threads.iter().all(|addr| *addr == here));
    assert_eq!(EventDispatcher::global().config().name, "global");
}

#[test]
fn test_global_subscriptions_are_shared() {
    let counter = Arc::new(AtomicU32::new(0));
    let c = counter.clone();
    let guard = EventDispatcher::global().subscribe_scoped(EventPriority::Normal, move |_: &GlobalProbe| {
        c.fetch_add(1, Ordering::SeqCst);
    });

    let invoked = thread::spawn(|| EventDispatcher::global().dispatch(&GlobalProbe::default()))
        .join()
        .unwrap();
    assert_eq!(invoked, 1);
    assert_eq!(counter.load(Ordering::SeqCst), 1);

    drop(guard);
    assert_eq!(EventDispatcher::global().subscription_count::<GlobalProbe>(), 0);
}
