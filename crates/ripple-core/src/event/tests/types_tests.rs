use std::thread;
use std::time::Duration;

use serde_json::json;

use crate::event::types::{
    CharacterEvent, DataEvent, InputAction, KeyboardEvent, MessageEvent, Modifiers, MouseButton,
    MouseButtonEvent, MouseMoveEvent, MouseScrollEvent, PropertyChangeEvent, SystemEvent,
    SystemEventKind, WindowEvent, WindowEventKind,
};
use crate::event::{Event, EventMeta};

#[test]
fn test_event_names() {
    let events: Vec<(Box<dyn Event>, &str)> = vec![
        (Box::new(WindowEvent::resize(800, 600)), "window"),
        (Box::new(KeyboardEvent::pressed(KeyboardEvent::KEY_A)), "input.key"),
        (Box::new(CharacterEvent::new('x')), "input.char"),
        (Box::new(MouseButtonEvent::new(MouseButton::Left, InputAction::Press, Modifiers::empty(), 1.0, 2.0)), "input.mouse_button"),
        (Box::new(MouseMoveEvent::new(10.0, 20.0, 1.0, -1.0)), "input.mouse_move"),
        (Box::new(MouseScrollEvent::new(0.0, -3.0)), "input.mouse_scroll"),
        (Box::new(MessageEvent::new("log", "hello")), "message"),
        (Box::new(DataEvent::new("stats", json!({ "fps": 60 }))), "data"),
        (Box::new(PropertyChangeEvent::new("panel", "visible", "false", "true")), "property.change"),
        (Box::new(SystemEvent::new(SystemEventKind::Startup)), "system.startup"),
        (Box::new(SystemEvent::new(SystemEventKind::Shutdown)), "system.shutdown"),
        (Box::new(SystemEvent::new(SystemEventKind::LowMemory)), "system.low_memory"),
        (Box::new(SystemEvent::new(SystemEventKind::Custom("reload".into()))), "system.custom"),
    ];

    for (event, name) in events {
        assert_eq!(event.name(), name);
        assert!(!event.is_consumed(), "{} should start unconsumed", name);
    }
}

#[test]
fn test_consume_is_one_way() {
    let event = KeyboardEvent::pressed(KeyboardEvent::KEY_ESCAPE);
    assert!(!event.is_consumed());
    event.consume();
    assert!(event.is_consumed());
    event.consume();
    assert!(event.is_consumed(), "Consuming twice keeps it consumed");
}

#[test]
fn test_clone_copies_timestamp_and_consumed_state() {
    let event = MouseMoveEvent::new(1.0, 2.0, 0.0, 0.0);
    let fresh_copy = event.clone();
    event.consume();
    let consumed_copy = event.clone();

    assert_eq!(fresh_copy.timestamp(), event.timestamp());
    assert!(!fresh_copy.is_consumed(), "Copy taken before consume stays unconsumed");
    assert!(consumed_copy.is_consumed());
}

#[test]
fn test_timestamp_is_monotonic() {
    let first = EventMeta::new();
    thread::sleep(Duration::from_millis(2));
    let second = EventMeta::new();
    assert!(second.timestamp() > first.timestamp());
    assert!(first.timestamp().elapsed() >= Duration::from_millis(2));
}

#[test]
fn test_downcasting() {
    let event = WindowEvent::new(WindowEventKind::Focus(true));
    let any = event.as_any();
    assert!(any.downcast_ref::<WindowEvent>().is_some());
    assert!(any.downcast_ref::<KeyboardEvent>().is_none());
}

#[test]
fn test_modifiers() {
    let mods = Modifiers::SHIFT | Modifiers::CONTROL;
    assert!(mods.contains(Modifiers::SHIFT));
    assert!(mods.contains(Modifiers::SHIFT | Modifiers::CONTROL));
    assert!(!mods.contains(Modifiers::ALT));
    assert!(Modifiers::empty().is_empty());
    assert_eq!(format!("{:?}", mods), "Modifiers(SHIFT | CONTROL)");
    assert_eq!(format!("{:?}", Modifiers::default()), "Modifiers(empty)");
}

#[test]
fn test_payload_helpers() {
    let key = KeyboardEvent::new(KeyboardEvent::KEY_ENTER, 28, InputAction::Repeat, Modifiers::ALT);
    assert!(!key.is_press());
    assert_eq!(key.scancode, 28);

    let change = PropertyChangeEvent::new("window", "title", "a", "a");
    assert!(!change.is_change());

    let resize = WindowEvent::resize(1280, 720);
    assert_eq!(resize.kind, WindowEventKind::Resize { width: 1280, height: 720 });
    assert_eq!(WindowEvent::close().kind, WindowEventKind::Close);
}
