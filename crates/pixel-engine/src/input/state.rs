use super::types::keys::{ESCAPE, KEY_COUNT};
use super::types::{InputEvent, MouseButton};

/// Input snapshot for a single window, refreshed once per frame.
#[derive(Debug, Clone)]
pub struct InputState {
    keys: [bool; KEY_COUNT],

    /// Pointer position in window pixels, origin bottom-left.
    mouse_x: f32,
    mouse_y: f32,

    /// Held-buttons mask (see [`MouseButton::mask`]).
    buttons: u32,

    /// Scroll accumulated since the last [`take_scroll`](Self::take_scroll).
    scroll: i32,

    exit: bool,
}

impl Default for InputState {
    fn default() -> Self {
        Self {
            keys: [false; KEY_COUNT],
            mouse_x: 0.0,
            mouse_y: 0.0,
            buttons: 0,
            scroll: 0,
            exit: false,
        }
    }
}

impl InputState {
    /// Applies one event. `window_height` is used to flip the mouse `y` axis.
    pub fn apply_event(&mut self, ev: &InputEvent, window_height: u32) {
        match *ev {
            InputEvent::Quit => self.exit = true,

            InputEvent::KeyDown(code) => {
                if let Some(slot) = self.keys.get_mut(code as usize) {
                    *slot = true;
                }
                if code == ESCAPE {
                    self.exit = true;
                }
            }

            InputEvent::KeyUp(code) => {
                if let Some(slot) = self.keys.get_mut(code as usize) {
                    *slot = false;
                }
            }

            InputEvent::MouseMotion { x, y, buttons } => {
                self.mouse_x = x;
                self.mouse_y = window_height as f32 - y;
                self.buttons = buttons;
            }

            // Held buttons are reported with motion.
            InputEvent::MouseButtonDown(_) | InputEvent::MouseButtonUp(_) => {}

            InputEvent::Scroll(delta) => self.scroll = self.scroll.saturating_add(delta),
        }
    }

    pub fn should_exit(&self) -> bool {
        self.exit
    }

    pub fn request_exit(&mut self) {
        self.exit = true;
    }

    pub fn mouse_x(&self) -> f32 {
        self.mouse_x
    }

    pub fn mouse_y(&self) -> f32 {
        self.mouse_y
    }

    pub fn button_down(&self, button: MouseButton) -> bool {
        self.buttons & button.mask() != 0
    }

    /// Returns the accumulated scroll delta and resets it to zero.
    pub fn take_scroll(&mut self) -> i32 {
        std::mem::take(&mut self.scroll)
    }

    /// Whether `code` is held. Codes outside the key table are never down.
    pub fn key_down(&self, code: u32) -> bool {
        self.keys.get(code as usize).copied().unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::super::types::keys;
    use super::*;

    #[test]
    fn starts_idle() {
        let s = InputState::default();
        assert!(!s.should_exit());
        assert!((0..KEY_COUNT as u32).all(|k| !s.key_down(k)));
        assert!(!s.button_down(MouseButton::Left));
    }

    // ── mouse ─────────────────────────────────────────────────────────────

    #[test]
    fn mouse_y_is_flipped_against_window_height() {
        let mut s = InputState::default();
        s.apply_event(&InputEvent::MouseMotion { x: 30.0, y: 10.0, buttons: 0 }, 480);

        assert_eq!(s.mouse_x(), 30.0);
        assert_eq!(s.mouse_y(), 470.0);
    }

    #[test]
    fn motion_carries_button_mask() {
        let mut s = InputState::default();
        let buttons = MouseButton::Left.mask() | MouseButton::Middle.mask();
        s.apply_event(&InputEvent::MouseMotion { x: 0.0, y: 0.0, buttons }, 100);

        assert!(s.button_down(MouseButton::Left));
        assert!(!s.button_down(MouseButton::Right));
        assert!(s.button_down(MouseButton::Middle));
    }

    #[test]
    fn button_events_do_not_touch_state() {
        let mut s = InputState::default();
        s.apply_event(&InputEvent::MouseButtonDown(MouseButton::Right), 100);
        assert!(!s.button_down(MouseButton::Right));

        s.apply_event(&InputEvent::MouseMotion { x: 0.0, y: 0.0, buttons: 0b10 }, 100);
        s.apply_event(&InputEvent::MouseButtonUp(MouseButton::Right), 100);
        assert!(s.button_down(MouseButton::Right));
    }

    // ── scroll ────────────────────────────────────────────────────────────

    #[test]
    fn scroll_is_one_shot() {
        let mut s = InputState::default();
        s.apply_event(&InputEvent::Scroll(2), 100);
        s.apply_event(&InputEvent::Scroll(-5), 100);

        assert_eq!(s.take_scroll(), -3);
        assert_eq!(s.take_scroll(), 0);
    }

    // ── keys and exit ─────────────────────────────────────────────────────

    #[test]
    fn key_down_and_up_toggle_table() {
        let mut s = InputState::default();
        let a = u32::from(b'a');

        s.apply_event(&InputEvent::KeyDown(a), 100);
        assert!(s.key_down(a));

        s.apply_event(&InputEvent::KeyUp(a), 100);
        assert!(!s.key_down(a));
    }

    #[test]
    fn codes_outside_table_are_ignored() {
        let mut s = InputState::default();
        s.apply_event(&InputEvent::KeyDown(0x1_0000), 100);
        assert!(!s.key_down(0x1_0000));
        assert!(!s.should_exit());
    }

    #[test]
    fn escape_requests_exit() {
        let mut s = InputState::default();
        s.apply_event(&InputEvent::KeyDown(keys::ESCAPE), 100);
        assert!(s.should_exit());
    }

    #[test]
    fn quit_requests_exit() {
        let mut s = InputState::default();
        s.apply_event(&InputEvent::Quit, 100);
        assert!(s.should_exit());
    }

    #[test]
    fn other_keys_do_not_exit() {
        let mut s = InputState::default();
        for code in (0..KEY_COUNT as u32).filter(|&c| c != keys::ESCAPE) {
            s.apply_event(&InputEvent::KeyDown(code), 100);
            s.apply_event(&InputEvent::KeyUp(code), 100);
        }
        assert!(!s.should_exit());
    }
}
