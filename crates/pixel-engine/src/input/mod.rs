//! Input subsystem.
//!
//! Public API is platform-agnostic and does not expose winit types.
//! The window translates platform events into `InputEvent`s and folds them
//! into an `InputState` once per frame.

mod state;
mod types;

pub(crate) mod platform {
    pub(crate) mod winit;
}

pub use state::InputState;
pub use types::{InputEvent, MouseButton, keys};
