/// ASCII-compatible key codes.
///
/// Printable keys use their lowercase ASCII value (`b'a' as u32`, `b'7' as u32`).
/// Only codes below [`KEY_COUNT`] are tracked by
/// [`InputState`](super::InputState).
pub mod keys {
    pub const BACKSPACE: u32 = 0x08;
    pub const TAB: u32 = 0x09;
    pub const ENTER: u32 = 0x0D;
    pub const ESCAPE: u32 = 0x1B;
    pub const SPACE: u32 = 0x20;
    pub const DELETE: u32 = 0x7F;

    /// Size of the key table.
    pub const KEY_COUNT: usize = 128;
}

/// Mouse button identifier.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

impl MouseButton {
    /// Bit of this button in a held-buttons mask.
    pub const fn mask(self) -> u32 {
        match self {
            MouseButton::Left => 1 << 0,
            MouseButton::Right => 1 << 1,
            MouseButton::Middle => 1 << 2,
        }
    }
}

/// Platform-agnostic input events.
///
/// Mouse coordinates are window pixels with a top-left origin, as delivered by
/// the platform. [`InputState`](super::InputState) flips them.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum InputEvent {
    /// Close request or event loop shutdown.
    Quit,

    KeyDown(u32),
    KeyUp(u32),

    /// Pointer moved; `buttons` is the mask of held buttons.
    MouseMotion { x: f32, y: f32, buttons: u32 },

    MouseButtonDown(MouseButton),
    MouseButtonUp(MouseButton),

    /// Wheel delta in notches, positive away from the user.
    Scroll(i32),
}
