//! Color model shared by canvases and the renderer.

pub mod color;

pub use color::Color;
