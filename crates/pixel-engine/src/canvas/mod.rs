//! Pixel buffers and views into them.
//!
//! A [`Canvas`] owns BGRA8 pixels and caches their GPU copy behind a dirty
//! flag. A [`Subcanvas`] selects the rectangle that one draw composites.
//! [`TextureBackend`] is the seam through which a canvas creates and uploads
//! its texture.

mod buffer;
mod subcanvas;
mod texture;

pub use buffer::{BYTES_PER_PIXEL, Canvas, Opacity};
pub use subcanvas::Subcanvas;
pub use texture::{TextureBackend, TextureId, TextureSlot};
