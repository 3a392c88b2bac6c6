//! Concrete event payloads produced by the windowing/input layer and by
//! application code.
//!
//! Every type here embeds an [`EventMeta`] and is otherwise a plain value.
//! Payload fields are public for reading; construct through `new` so the
//! timestamp is taken at creation time.
use std::any::Any;
use std::fmt;
use std::ops::BitOr;

use crate::event::{Event, EventMeta};

/// Implements the boilerplate part of [`Event`] for a struct with a `meta` field.
macro_rules! impl_event {
    ($ty:ty, $name:expr) => {
        impl Event for $ty {
            fn name(&self) -> &'static str {
                $name
            }

            fn meta(&self) -> &EventMeta {
                &self.meta
            }

            fn as_any(&self) -> &dyn Any {
                self
            }
        }
    };
}

/// Keyboard modifier bit set
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Modifiers(u8);

impl Modifiers {
    pub const SHIFT: Modifiers = Modifiers(0x01);
    pub const CONTROL: Modifiers = Modifiers(0x02);
    pub const ALT: Modifiers = Modifiers(0x04);
    pub const SUPER: Modifiers = Modifiers(0x08);
    pub const CAPS_LOCK: Modifiers = Modifiers(0x10);
    pub const NUM_LOCK: Modifiers = Modifiers(0x20);

    pub const fn empty() -> Self {
        Modifiers(0)
    }

    pub const fn bits(self) -> u8 {
        self.0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// True if every bit of `other` is set in `self`
    pub const fn contains(self, other: Modifiers) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for Modifiers {
    type Output = Modifiers;

    fn bitor(self, rhs: Modifiers) -> Modifiers {
        Modifiers(self.0 | rhs.0)
    }
}

impl fmt::Debug for Modifiers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const NAMES: [(Modifiers, &str); 6] = [
            (Modifiers::SHIFT, "SHIFT"),
            (Modifiers::CONTROL, "CONTROL"),
            (Modifiers::ALT, "ALT"),
            (Modifiers::SUPER, "SUPER"),
            (Modifiers::CAPS_LOCK, "CAPS_LOCK"),
            (Modifiers::NUM_LOCK, "NUM_LOCK"),
        ];
        let set: Vec<&str> = NAMES
            .iter()
            .filter(|(bit, _)| self.contains(*bit))
            .map(|(_, name)| *name)
            .collect();
        if set.is_empty() {
            write!(f, "Modifiers(empty)")
        } else {
            write!(f, "Modifiers({})", set.join(" | "))
        }
    }
}

/// Press/release state shared by keys and mouse buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputAction {
    Press,
    Release,
    /// Key held long enough to auto-repeat
    Repeat,
}

//--------------------------------------------------
// Window events
//--------------------------------------------------

/// What happened to the window
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WindowEventKind {
    /// Framebuffer size changed
    Resize { width: u32, height: u32 },
    /// Window moved to a new screen position
    Move { x: i32, y: i32 },
    /// Focus gained (`true`) or lost (`false`)
    Focus(bool),
    /// User asked to close the window
    Close,
    Minimize,
    Maximize,
    Restore,
    /// Monitor content scale changed (HiDPI)
    ContentScale { x: f32, y: f32 },
    /// Contents need redrawing
    Refresh,
}

#[derive(Debug, Clone)]
pub struct WindowEvent {
    pub kind: WindowEventKind,
    meta: EventMeta,
}

impl WindowEvent {
    pub fn new(kind: WindowEventKind) -> Self {
        Self { kind, meta: EventMeta::new() }
    }

    pub fn resize(width: u32, height: u32) -> Self {
        Self::new(WindowEventKind::Resize { width, height })
    }

    pub fn close() -> Self {
        Self::new(WindowEventKind::Close)
    }
}

impl_event!(WindowEvent, "window");

//--------------------------------------------------
// Keyboard and text input
//--------------------------------------------------

#[derive(Debug, Clone)]
pub struct KeyboardEvent {
    /// Platform-independent key code
    pub key: i32,
    /// Platform-specific scancode
    pub scancode: i32,
    pub action: InputAction,
    pub modifiers: Modifiers,
    meta: EventMeta,
}

impl KeyboardEvent {
    pub const KEY_SPACE: i32 = 32;
    pub const KEY_A: i32 = 65;
    pub const KEY_ESCAPE: i32 = 256;
    pub const KEY_ENTER: i32 = 257;
    pub const KEY_TAB: i32 = 258;

    pub fn new(key: i32, scancode: i32, action: InputAction, modifiers: Modifiers) -> Self {
        Self { key, scancode, action, modifiers, meta: EventMeta::new() }
    }

    pub fn pressed(key: i32) -> Self {
        Self::new(key, 0, InputAction::Press, Modifiers::empty())
    }

    pub fn is_press(&self) -> bool {
        self.action == InputAction::Press
    }
}

impl_event!(KeyboardEvent, "input.key");

/// A Unicode character produced by text input (after keyboard layout mapping)
#[derive(Debug, Clone)]
pub struct CharacterEvent {
    pub codepoint: char,
    meta: EventMeta,
}

impl CharacterEvent {
    pub fn new(codepoint: char) -> Self {
        Self { codepoint, meta: EventMeta::new() }
    }
}

impl_event!(CharacterEvent, "input.char");

//--------------------------------------------------
// Mouse
//--------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
    /// Extra buttons, numbered from 4
    Other(u8),
}

#[derive(Debug, Clone)]
pub struct MouseButtonEvent {
    pub button: MouseButton,
    pub action: InputAction,
    pub modifiers: Modifiers,
    /// Cursor position in window coordinates at the time of the click
    pub x: f64,
    pub y: f64,
    meta: EventMeta,
}

impl MouseButtonEvent {
    pub fn new(button: MouseButton, action: InputAction, modifiers: Modifiers, x: f64, y: f64) -> Self {
        Self { button, action, modifiers, x, y, meta: EventMeta::new() }
    }
}

impl_event!(MouseButtonEvent, "input.mouse_button");

#[derive(Debug, Clone)]
pub struct MouseMoveEvent {
    pub x: f64,
    pub y: f64,
    /// Movement since the previous move event
    pub dx: f64,
    pub dy: f64,
    meta: EventMeta,
}

impl MouseMoveEvent {
    pub fn new(x: f64, y: f64, dx: f64, dy: f64) -> Self {
        Self { x, y, dx, dy, meta: EventMeta::new() }
    }
}

impl_event!(MouseMoveEvent, "input.mouse_move");

#[derive(Debug, Clone)]
pub struct MouseScrollEvent {
    pub x_offset: f64,
    pub y_offset: f64,
    meta: EventMeta,
}

impl MouseScrollEvent {
    pub fn new(x_offset: f64, y_offset: f64) -> Self {
        Self { x_offset, y_offset, meta: EventMeta::new() }
    }
}

impl_event!(MouseScrollEvent, "input.mouse_scroll");

//--------------------------------------------------
// Generic application events
//--------------------------------------------------

/// Free-form text message on a named channel
#[derive(Debug, Clone)]
pub struct MessageEvent {
    pub channel: String,
    pub text: String,
    meta: EventMeta,
}

impl MessageEvent {
    pub fn new(channel: impl Into<String>, text: impl Into<String>) -> Self {
        Self { channel: channel.into(), text: text.into(), meta: EventMeta::new() }
    }
}

impl_event!(MessageEvent, "message");

/// Structured payload keyed by a string
#[derive(Debug, Clone)]
pub struct DataEvent {
    pub key: String,
    pub payload: serde_json::Value,
    meta: EventMeta,
}

impl DataEvent {
    pub fn new(key: impl Into<String>, payload: serde_json::Value) -> Self {
        Self { key: key.into(), payload, meta: EventMeta::new() }
    }
}

impl_event!(DataEvent, "data");

/// A named property on some object changed value
#[derive(Debug, Clone)]
pub struct PropertyChangeEvent {
    pub object: String,
    pub property: String,
    pub old_value: String,
    pub new_value: String,
    meta: EventMeta,
}

impl PropertyChangeEvent {
    pub fn new(
        object: impl Into<String>,
        property: impl Into<String>,
        old_value: impl Into<String>,
        new_value: impl Into<String>,
    ) -> Self {
        Self {
            object: object.into(),
            property: property.into(),
            old_value: old_value.into(),
            new_value: new_value.into(),
            meta: EventMeta::new(),
        }
    }

    /// Whether the value actually differs
    pub fn is_change(&self) -> bool {
        self.old_value != self.new_value
    }
}

impl_event!(PropertyChangeEvent, "property.change");

/// Process-level notifications
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SystemEventKind {
    Startup,
    Shutdown,
    LowMemory,
    Custom(String),
}

#[derive(Debug, Clone)]
pub struct SystemEvent {
    pub kind: SystemEventKind,
    meta: EventMeta,
}

impl SystemEvent {
    pub fn new(kind: SystemEventKind) -> Self {
        Self { kind, meta: EventMeta::new() }
    }
}

impl Event for SystemEvent {
    fn name(&self) -> &'static str {
        match self.kind {
            SystemEventKind::Startup => "system.startup",
            SystemEventKind::Shutdown => "system.shutdown",
            SystemEventKind::LowMemory => "system.low_memory",
            SystemEventKind::Custom(_) => "system.custom",
        }
    }

    fn meta(&self) -> &EventMeta {
        &self.meta
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
