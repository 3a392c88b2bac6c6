use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::Instant;

use log::info;
use ripple_core::config::DispatcherConfig;
use ripple_core::event::{EventDispatcher, EventPriority, MessageEvent};

const PRIORITIES: [EventPriority; 4] =
    [EventPriority::Low, EventPriority::Normal, EventPriority::High, EventPriority::Critical];

/// Register `threads * per_thread` handlers concurrently, then dispatch one
/// event and check that every handler ran exactly once.
pub fn run(config: DispatcherConfig, threads: u32, per_thread: u32) -> ripple_core::Result<()> {
    let dispatcher = EventDispatcher::with_config(config);
    let hits = Arc::new(AtomicUsize::new(0));
    let expected = threads as usize * per_thread as usize;

    let started = Instant::now();
    thread::scope(|scope| {
        for t in 0..threads {
            let dispatcher = dispatcher.clone();
            let hits = hits.clone();
            scope.spawn(move || {
                for i in 0..per_thread {
                    let hits = hits.clone();
                    let priority = PRIORITIES[((t + i) % 4) as usize];
                    dispatcher.subscribe(priority, move |_: &MessageEvent| {
                        hits.fetch_add(1, Ordering::Relaxed);
                    });
                }
            });
        }
    });
    info!("Registered {} subscriptions in {:?}", expected, started.elapsed());

    let subscriptions = dispatcher.subscription_count::<MessageEvent>();
    println!("subscriptions: {}", subscriptions);

    let invoked = dispatcher.dispatch(&MessageEvent::new("stress", "ping"));
    println!("invoked: {}", invoked);

    let observed = hits.load(Ordering::Relaxed);
    if subscriptions != expected || invoked != expected || observed != expected {
        return Err(ripple_core::Error::Other(format!(
            "expected {} handlers, found {} subscribed, {} invoked, {} observed",
            expected, subscriptions, invoked, observed
        )));
    }
    Ok(())
}
