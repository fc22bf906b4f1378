use winit::event::{ElementState, MouseButton as WinitMouseButton, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

use crate::input::{InputEvent, MouseButton, keys};

/// Translates a winit `WindowEvent` into an engine `InputEvent`.
///
/// `buttons` is the held-buttons mask; it is updated on button events and
/// reported with every motion event. Returns `None` for events the input
/// subsystem does not represent, including wheel events.
pub fn translate_window_event(event: &WindowEvent, buttons: &mut u32) -> Option<InputEvent> {
    match event {
        WindowEvent::CloseRequested => Some(InputEvent::Quit),

        WindowEvent::CursorMoved { position, .. } => Some(InputEvent::MouseMotion {
            x: position.x as f32,
            y: position.y as f32,
            buttons: *buttons,
        }),

        WindowEvent::MouseInput { state, button, .. } => {
            let button = map_mouse_button(*button)?;
            match state {
                ElementState::Pressed => {
                    *buttons |= button.mask();
                    Some(InputEvent::MouseButtonDown(button))
                }
                ElementState::Released => {
                    *buttons &= !button.mask();
                    Some(InputEvent::MouseButtonUp(button))
                }
            }
        }

        WindowEvent::KeyboardInput { event, .. } => {
            let code = map_key(event.physical_key)?;
            Some(match event.state {
                ElementState::Pressed => InputEvent::KeyDown(code),
                ElementState::Released => InputEvent::KeyUp(code),
            })
        }

        _ => None,
    }
}

fn map_mouse_button(b: WinitMouseButton) -> Option<MouseButton> {
    match b {
        WinitMouseButton::Left => Some(MouseButton::Left),
        WinitMouseButton::Right => Some(MouseButton::Right),
        WinitMouseButton::Middle => Some(MouseButton::Middle),
        _ => None,
    }
}

/// Maps a physical key to its ASCII-compatible code (US layout).
pub(crate) fn map_key(pk: PhysicalKey) -> Option<u32> {
    let PhysicalKey::Code(code) = pk else {
        return None;
    };

    let ascii = match code {
        KeyCode::Escape => return Some(keys::ESCAPE),
        KeyCode::Enter | KeyCode::NumpadEnter => return Some(keys::ENTER),
        KeyCode::Tab => return Some(keys::TAB),
        KeyCode::Backspace => return Some(keys::BACKSPACE),
        KeyCode::Delete => return Some(keys::DELETE),
        KeyCode::Space => return Some(keys::SPACE),

        KeyCode::KeyA => b'a',
        KeyCode::KeyB => b'b',
        KeyCode::KeyC => b'c',
        KeyCode::KeyD => b'd',
        KeyCode::KeyE => b'e',
        KeyCode::KeyF => b'f',
        KeyCode::KeyG => b'g',
        KeyCode::KeyH => b'h',
        KeyCode::KeyI => b'i',
        KeyCode::KeyJ => b'j',
        KeyCode::KeyK => b'k',
        KeyCode::KeyL => b'l',
        KeyCode::KeyM => b'm',
        KeyCode::KeyN => b'n',
        KeyCode::KeyO => b'o',
        KeyCode::KeyP => b'p',
        KeyCode::KeyQ => b'q',
        KeyCode::KeyR => b'r',
        KeyCode::KeyS => b's',
        KeyCode::KeyT => b't',
        KeyCode::KeyU => b'u',
        KeyCode::KeyV => b'v',
        KeyCode::KeyW => b'w',
        KeyCode::KeyX => b'x',
        KeyCode::KeyY => b'y',
        KeyCode::KeyZ => b'z',

        KeyCode::Digit0 | KeyCode::Numpad0 => b'0',
        KeyCode::Digit1 | KeyCode::Numpad1 => b'1',
        KeyCode::Digit2 | KeyCode::Numpad2 => b'2',
        KeyCode::Digit3 | KeyCode::Numpad3 => b'3',
        KeyCode::Digit4 | KeyCode::Numpad4 => b'4',
        KeyCode::Digit5 | KeyCode::Numpad5 => b'5',
        KeyCode::Digit6 | KeyCode::Numpad6 => b'6',
        KeyCode::Digit7 | KeyCode::Numpad7 => b'7',
        KeyCode::Digit8 | KeyCode::Numpad8 => b'8',
        KeyCode::Digit9 | KeyCode::Numpad9 => b'9',

        KeyCode::Minus => b'-',
        KeyCode::Equal => b'=',
        KeyCode::BracketLeft => b'[',
        KeyCode::BracketRight => b']',
        KeyCode::Backslash => b'\\',
        KeyCode::Semicolon => b';',
        KeyCode::Quote => b'\'',
        KeyCode::Backquote => b'`',
        KeyCode::Comma => b',',
        KeyCode::Period => b'.',
        KeyCode::Slash => b'/',

        _ => return None,
    };

    Some(u32::from(ascii))
}

#[cfg(test)]
mod tests {
    use winit::keyboard::NativeKeyCode;

    use super::*;

    #[test]
    fn letters_map_to_lowercase_ascii() {
        assert_eq!(map_key(PhysicalKey::Code(KeyCode::KeyA)), Some(u32::from(b'a')));
        assert_eq!(map_key(PhysicalKey::Code(KeyCode::KeyZ)), Some(u32::from(b'z')));
    }

    #[test]
    fn digits_from_row_and_numpad_agree() {
        assert_eq!(map_key(PhysicalKey::Code(KeyCode::Digit5)), Some(u32::from(b'5')));
        assert_eq!(map_key(PhysicalKey::Code(KeyCode::Numpad5)), Some(u32::from(b'5')));
    }

    #[test]
    fn control_keys_use_ascii_controls() {
        let cases = [
            (KeyCode::Escape, keys::ESCAPE),
            (KeyCode::Enter, keys::ENTER),
            (KeyCode::Tab, keys::TAB),
            (KeyCode::Backspace, keys::BACKSPACE),
            (KeyCode::Delete, keys::DELETE),
            (KeyCode::Space, keys::SPACE),
        ];
        for (key, code) in cases {
            assert_eq!(map_key(PhysicalKey::Code(key)), Some(code), "{key:?}");
        }
    }

    #[test]
    fn every_mapped_code_fits_key_table() {
        let sample = [
            KeyCode::KeyQ,
            KeyCode::Digit0,
            KeyCode::Slash,
            KeyCode::Backquote,
            KeyCode::Delete,
        ];
        for key in sample {
            let code = map_key(PhysicalKey::Code(key)).unwrap();
            assert!((code as usize) < keys::KEY_COUNT);
        }
    }

    #[test]
    fn unmapped_keys_are_dropped() {
        assert_eq!(map_key(PhysicalKey::Code(KeyCode::F1)), None);
        assert_eq!(map_key(PhysicalKey::Code(KeyCode::ShiftLeft)), None);
        assert_eq!(
            map_key(PhysicalKey::Unidentified(NativeKeyCode::Unidentified)),
            None
        );
    }

    #[test]
    fn close_request_is_quit() {
        let mut buttons = 0;
        assert_eq!(
            translate_window_event(&WindowEvent::CloseRequested, &mut buttons),
            Some(InputEvent::Quit)
        );
    }
}
