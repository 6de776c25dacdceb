/// Platform-agnostic input types and the traits tying input to the loop

use glam::Vec2;

/// Keyboard keys known to the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Escape,
    Enter,
    Tab,
    Space,
    Backspace,

    LeftShift,
    RightShift,
    LeftControl,
    RightControl,
    LeftAlt,
    RightAlt,

    Up,
    Down,
    Left,
    Right,

    A, B, C, D, E, F, G, H, I, J, K, L, M,
    N, O, P, Q, R, S, T, U, V, W, X, Y, Z,

    Digit0, Digit1, Digit2, Digit3, Digit4,
    Digit5, Digit6, Digit7, Digit8, Digit9,

    F1, F2, F3, F4, F5, F6, F7, F8, F9, F10, F11, F12,
}

/// One input event delivered by a platform surface
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// Key pressed or released
    Key { key: Key, pressed: bool },

    /// Pointer moved to a surface position, in pixels
    PointerMoved { x: f32, y: f32 },

    /// Relative pointer motion from the device, unaffected by window edges
    /// or a locked cursor (x right, y down)
    PointerMotion { dx: f32, dy: f32 },

    /// Wheel scrolled; positive is away from the user
    Scroll { delta: f32 },

    /// Surface lost keyboard focus
    FocusLost,
}

/// Read side of the input state, as seen by the camera and scenes
pub trait InputSource {
    /// True while `key` is held
    fn is_key_down(&self, key: Key) -> bool;

    /// Pointer movement since the last reset (x right, y down)
    fn pointer_delta(&self) -> Vec2;

    /// Scroll accumulated since the last reset
    fn scroll_delta(&self) -> f32;
}

/// Receiver for input events forwarded by a surface
pub trait InputHandler {
    fn handle_event(&mut self, event: InputEvent);
}
