//! Sprite compositing.
//!
//! Every draw is the same unit quad, transformed in the vertex stage and
//! textured with a sub-rectangle of a canvas. Per-draw state lives in a
//! dynamic-offset uniform block; the only other switches are the bound
//! texture and the blend pipeline.
//!
//! Convention:
//! - Positions are NDC: `(0, 0)` is the target center, `+Y` up.
//! - Canvas row 0 is the bottom row of an unrotated sprite.

mod bind;
mod pipeline;
mod readback;
mod renderer;
mod uniforms;

pub use bind::BindCache;
pub use renderer::{Renderer, TEXTURE_FORMAT};
pub use uniforms::{BASE_SCALE, BlendMode, SpriteUniform};
