//! Window/input style scenarios: several UI consumers sharing one dispatcher.
use std::sync::{Arc, Mutex};

use crate::event::{
    CharacterEvent, EventDispatcher, EventPriority, InputAction, KeyboardEvent, Modifiers, MouseButton,
    MouseButtonEvent, MouseScrollEvent, WindowEvent, WindowEventKind,
};
use crate::Event;

type Log = Arc<Mutex<Vec<String>>>;

fn log() -> Log {
    Arc::new(Mutex::new(Vec::new()))
}

#[test]
fn test_modal_overlay_swallows_escape() {
    let dispatcher = EventDispatcher::new();
    let trace = log();

    let t = trace.clone();
    let overlay = dispatcher
        .subscription::<KeyboardEvent>()
        .priority(EventPriority::Critical)
        .filter(|e| e.key == KeyboardEvent::KEY_ESCAPE && e.is_press())
        .subscribe_scoped_with_propagation(move |_| {
            t.lock().unwrap().push("overlay closed".to_string());
            false
        });

    let t = trace.clone();
    dispatcher.subscribe(EventPriority::Normal, move |e: &KeyboardEvent| {
        t.lock().unwrap().push(format!("editor key {}", e.key));
    });

    assert_eq!(dispatcher.dispatch(&KeyboardEvent::pressed(KeyboardEvent::KEY_A)), 1);
    assert_eq!(dispatcher.dispatch(&KeyboardEvent::pressed(KeyboardEvent::KEY_ESCAPE)), 1);

    // Overlay gone: escape reaches the editor again
    drop(overlay);
    assert_eq!(dispatcher.dispatch(&KeyboardEvent::pressed(KeyboardEvent::KEY_ESCAPE)), 1);

    assert_eq!(
        *trace.lock().unwrap(),
        vec!["editor key 65", "overlay closed", "editor key 256"]
    );
}

#[test]
fn test_left_click_and_scroll_consumers() {
    let dispatcher = EventDispatcher::new();
    let trace = log();

    let t = trace.clone();
    dispatcher
        .subscription::<MouseButtonEvent>()
        .filter(|e| e.button == MouseButton::Left && e.action == InputAction::Press)
        .subscribe(move |e| t.lock().unwrap().push(format!("click {},{}", e.x, e.y)));

    let t = trace.clone();
    dispatcher
        .subscription::<MouseScrollEvent>()
        .filter(|e| e.y_offset != 0.0)
        .subscribe(move |e| t.lock().unwrap().push(format!("scroll {}", e.y_offset)));

    let clicks = [
        MouseButtonEvent::new(MouseButton::Right, InputAction::Press, Modifiers::empty(), 1.0, 1.0),
        MouseButtonEvent::new(MouseButton::Left, InputAction::Press, Modifiers::SHIFT, 10.0, 20.0),
        MouseButtonEvent::new(MouseButton::Left, InputAction::Release, Modifiers::empty(), 10.0, 20.0),
    ];
    let invoked: usize = clicks.iter().map(|e| dispatcher.dispatch(e)).sum();
    assert_eq!(invoked, 1);

    dispatcher.dispatch(&MouseScrollEvent::new(0.0, 0.0));
    dispatcher.dispatch(&MouseScrollEvent::new(0.0, -2.0));

    assert_eq!(*trace.lock().unwrap(), vec!["click 10,20", "scroll -2"]);
}

#[test]
fn test_text_input_and_resize_are_independent() {
    let dispatcher = EventDispatcher::new();
    let text = Arc::new(Mutex::new(String::new()));
    let size = Arc::new(Mutex::new((0u32, 0u32)));

    let t = text.clone();
    dispatcher.subscribe(EventPriority::Normal, move |e: &CharacterEvent| t.lock().unwrap().push(e.codepoint));
    let s = size.clone();
    dispatcher.subscribe(EventPriority::Normal, move |e: &WindowEvent| {
        if let WindowEventKind::Resize { width, height } = e.kind {
            *s.lock().unwrap() = (width, height);
        }
    });

    for c in "hé!".chars() {
        dispatcher.dispatch(&CharacterEvent::new(c));
    }
    dispatcher.dispatch(&WindowEvent::resize(1024, 768));
    dispatcher.dispatch(&WindowEvent::new(WindowEventKind::Focus(false)));

    assert_eq!(*text.lock().unwrap(), "hé!");
    assert_eq!(*size.lock().unwrap(), (1024, 768));
    assert_eq!(dispatcher.total_subscription_count(), 2);
}

#[test]
fn test_queued_input_keeps_event_state() {
    let dispatcher = EventDispatcher::new();
    let consumed_seen = Arc::new(Mutex::new(Vec::new()));

    dispatcher.subscribe_with_propagation(EventPriority::High, |e: &KeyboardEvent| e.key != KeyboardEvent::KEY_TAB);
    let c = consumed_seen.clone();
    dispatcher.subscribe(EventPriority::Low, move |e: &KeyboardEvent| c.lock().unwrap().push(e.key));

    dispatcher.queue(KeyboardEvent::pressed(KeyboardEvent::KEY_TAB)).unwrap();
    dispatcher.queue(KeyboardEvent::pressed(KeyboardEvent::KEY_SPACE)).unwrap();
    let already_consumed = KeyboardEvent::pressed(KeyboardEvent::KEY_ENTER);
    already_consumed.consume();
    dispatcher.queue(already_consumed).unwrap();

    assert_eq!(dispatcher.process_queue(), 3);
    assert_eq!(*consumed_seen.lock().unwrap(), vec![KeyboardEvent::KEY_SPACE]);
}
