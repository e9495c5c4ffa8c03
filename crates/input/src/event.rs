use serde::{Deserialize, Serialize};

/// Keys the control scheme reacts to. Anything else never reaches the queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    W,
    A,
    S,
    D,
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Space,
    Shift,
    Q,
    E,
}

impl Key {
    /// Map a DOM-style key name (`"w"`, `"ArrowUp"`, `" "`, `"Shift"`, ...),
    /// ignoring case.
    pub fn from_name(name: &str) -> Option<Self> {
        if name == " " {
            return Some(Key::Space);
        }
        let key = match name.to_ascii_lowercase().as_str() {
            "w" => Key::W,
            "a" => Key::A,
            "s" => Key::S,
            "d" => Key::D,
            "arrowup" | "up" => Key::ArrowUp,
            "arrowdown" | "down" => Key::ArrowDown,
            "arrowleft" | "left" => Key::ArrowLeft,
            "arrowright" | "right" => Key::ArrowRight,
            "space" | "spacebar" => Key::Space,
            "shift" | "shiftleft" | "shiftright" => Key::Shift,
            "q" => Key::Q,
            "e" => Key::E,
            _ => return None,
        };
        Some(key)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DragPhase {
    Start,
    Move,
    End,
}

/// One raw device event. Coordinates are screen pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum InputEvent {
    KeyDown(Key),
    KeyUp(Key),
    /// Mouse look drag.
    PointerDrag { phase: DragPhase, x: f32, y: f32 },
    /// Touch look drag. Touches that begin over on-screen controls are
    /// flagged `over_ui` and never steer the camera.
    TouchDrag {
        id: u64,
        phase: DragPhase,
        x: f32,
        y: f32,
        over_ui: bool,
    },
    /// Virtual joystick knob offset from its base, in pixels.
    JoystickMove { dx: f32, dy: f32 },
    JoystickRelease,
    Click { x: f32, y: f32 },
}

impl InputEvent {
    /// True when every coordinate carried by the event is finite.
    pub fn is_finite(&self) -> bool {
        match *self {
            InputEvent::PointerDrag { x, y, .. }
            | InputEvent::TouchDrag { x, y, .. }
            | InputEvent::Click { x, y } => x.is_finite() && y.is_finite(),
            InputEvent::JoystickMove { dx, dy } => dx.is_finite() && dy.is_finite(),
            InputEvent::KeyDown(_) | InputEvent::KeyUp(_) | InputEvent::JoystickRelease => true,
        }
    }
}
