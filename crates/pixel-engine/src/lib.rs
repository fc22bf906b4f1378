//! Pixel engine crate.
//!
//! A small sprite compositor: CPU-side BGRA8 canvases are uploaded as GPU
//! textures on demand and drawn as rotated, scaled quads into a window or an
//! offscreen target.

pub mod canvas;
pub mod device;
pub mod input;
pub mod logging;
pub mod paint;
pub mod render;
pub mod window;

pub use canvas::{Canvas, Opacity, Subcanvas};
pub use device::{Error, GpuInit, Result};
pub use input::keys;
pub use paint::Color;
pub use render::{BASE_SCALE, Renderer};
pub use window::{Window, WindowConfig};
