//! Window + event pump.
//!
//! Owns the `winit` EventLoop and Window and wires them to the renderer.
//! The loop is pumped once per presented frame instead of taking over the
//! thread.

mod config;
mod display;
mod pump;

pub use config::WindowConfig;
pub use display::Window;
