use std::panic;

use log::{debug, info};
use ripple_core::config::DispatcherConfig;
use ripple_core::event::{
    CharacterEvent, Event, EventDispatcher, EventPriority, FailureSource, InputAction, KeyboardEvent, MessageEvent,
    Modifiers, MouseButton, MouseButtonEvent, MouseMoveEvent, WindowEvent, WindowEventKind,
};

/// Replays a short window/input session and prints what each consumer saw.
pub async fn run(config: DispatcherConfig) -> ripple_core::Result<()> {
    let dispatcher = EventDispatcher::with_config(config);
    info!("Starting demo on dispatcher '{}'", dispatcher.config().name);

    dispatcher.set_failure_hook(|failure| {
        let part = match failure.source {
            FailureSource::Filter => "filter",
            FailureSource::Handler => "handler",
        };
        println!("failure: {} {} on {}: {}", part, failure.handle, failure.event_name, failure.message);
    });

    dispatcher
        .subscription::<KeyboardEvent>()
        .priority(EventPriority::Critical)
        .filter(|e| e.key == KeyboardEvent::KEY_ESCAPE && e.is_press())
        .subscribe_with_propagation(|_| {
            println!("overlay: escape closes the overlay");
            false
        });

    dispatcher.subscribe(EventPriority::Normal, |e: &KeyboardEvent| {
        println!("keys: key {} {:?} {:?}", e.key, e.action, e.modifiers);
    });

    dispatcher
        .subscription::<MouseButtonEvent>()
        .priority(EventPriority::High)
        .filter(|e| e.button == MouseButton::Left && e.action == InputAction::Press)
        .subscribe(|e| println!("click: left at ({}, {})", e.x, e.y));

    dispatcher.subscribe(EventPriority::Low, |e: &WindowEvent| {
        println!("window: {:?}", e.kind);
    });

    dispatcher.subscribe(EventPriority::Normal, |e: &MouseMoveEvent| {
        println!("pointer: ({}, {})", e.x, e.y);
    });

    dispatcher.subscribe(EventPriority::Normal, |e: &MessageEvent| {
        if e.text.is_empty() {
            panic!("empty message on channel '{}'", e.channel);
        }
        println!("message: [{}] {}", e.channel, e.text);
    });

    let text_field = dispatcher.subscribe_scoped(EventPriority::Normal, |e: &CharacterEvent| {
        println!("text: '{}'", e.codepoint);
    });

    // Synchronous dispatch
    report(&dispatcher, &WindowEvent::new(WindowEventKind::Focus(true)));
    report(&dispatcher, &KeyboardEvent::pressed(KeyboardEvent::KEY_A));
    report(&dispatcher, &CharacterEvent::new('a'));
    report(
        &dispatcher,
        &KeyboardEvent::new(KeyboardEvent::KEY_TAB, 15, InputAction::Press, Modifiers::SHIFT | Modifiers::CONTROL),
    );
    report(&dispatcher, &KeyboardEvent::pressed(KeyboardEvent::KEY_ESCAPE));
    report(
        &dispatcher,
        &MouseButtonEvent::new(MouseButton::Right, InputAction::Press, Modifiers::empty(), 5.0, 5.0),
    );
    report(
        &dispatcher,
        &MouseButtonEvent::new(MouseButton::Left, InputAction::Press, Modifiers::empty(), 120.0, 48.0),
    );
    // Reported through the failure hook; keep the default panic message off stderr
    let default_hook = panic::take_hook();
    panic::set_hook(Box::new(|_| {}));
    report(&dispatcher, &MessageEvent::new("status", ""));
    panic::set_hook(default_hook);
    report(&dispatcher, &MessageEvent::new("status", "ready"));

    // Text field closes; character events now have no listener
    let released = text_field.unsubscribe();
    debug!("text field subscription released: {}", released);
    report(&dispatcher, &CharacterEvent::new('b'));

    // Off-thread dispatch
    let resize = WindowEvent::resize(1280, 720);
    let name = resize.name();
    let invoked = dispatcher.dispatch_async(resize).await?;
    println!("dispatched {} (async) -> {}", name, invoked);

    // Deferred dispatch
    for step in 1..=3 {
        let offset = f64::from(step) * 10.0;
        dispatcher.queue(MouseMoveEvent::new(offset, offset, 10.0, 10.0))?;
    }
    dispatcher.queue(WindowEvent::close())?;
    println!("queued: {}", dispatcher.queue_len());
    let processed = dispatcher.process_queue();
    println!("processed: {}", processed);

    println!("subscriptions: {}", dispatcher.total_subscription_count());
    let cleared = dispatcher.clear_all_subscriptions();
    println!("cleared: {}", cleared);
    Ok(())
}

fn report<E: Event>(dispatcher: &EventDispatcher, event: &E) {
    let invoked = dispatcher.dispatch(event);
    println!("dispatched {} -> {}", event.name(), invoked);
}
