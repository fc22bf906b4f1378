//! Per-draw shader inputs and blend policy.

use bytemuck::{Pod, Zeroable};

use crate::canvas::{Opacity, Subcanvas};

/// Scale at which the unit quad spans the whole target.
///
/// `draw` passes `scale / BASE_SCALE` to the vertex stage.
pub const BASE_SCALE: f32 = 1.0;

/// Sprite uniform block, mirrored by `Sprite` in `shaders/sprite.wgsl`.
///
/// Layout (64 bytes):
///
///  offset  0  sc_attr  vec4<f32>   texture offset (xy) and extent (zw)
///  offset 16  sc_pos   vec4<f32>   translation (xy), scale (z), rotation (w)
///  offset 32  key      vec4<f32>   transparency key
///  offset 48  keyed    u32         1 when key discard is active
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct SpriteUniform {
    pub sc_attr: [f32; 4],
    pub sc_pos: [f32; 4],
    pub key: [f32; 4],
    pub keyed: u32,
    pub _pad: [u32; 3],
}

impl SpriteUniform {
    /// Resolves the uniforms for drawing `view` at NDC `(x, y)` with the given
    /// scale and counter-clockwise rotation (radians).
    pub fn for_draw(view: &Subcanvas<'_>, x: f32, y: f32, scale: f32, rotation: f32) -> Self {
        let canvas = view.canvas();
        Self {
            sc_attr: view.texture_attributes(),
            sc_pos: [x, y, scale / BASE_SCALE, rotation],
            key: canvas.key().to_array(),
            keyed: u32::from(canvas.opacity() == Opacity::Keyed),
            _pad: [0; 3],
        }
    }

    /// Uniforms that copy a render target onto another target of any size.
    ///
    /// Render targets store their top row first while sprite textures are
    /// sampled bottom row first, so the copy flips `v`.
    pub const fn blit() -> Self {
        Self {
            sc_attr: [0.0, -1.0, 1.0, -1.0],
            sc_pos: [0.0, 0.0, 1.0, 0.0],
            key: [0.0; 4],
            keyed: 0,
            _pad: [0; 3],
        }
    }
}

/// Blend configuration of a sprite pipeline.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum BlendMode {
    /// Blending disabled; the fragment overwrites the target.
    Replace,
    /// `src * src_alpha + dst * (1 - src_alpha)` on every channel.
    Alpha,
}

impl BlendMode {
    pub const ALL: [BlendMode; 2] = [BlendMode::Replace, BlendMode::Alpha];

    /// Translucent canvases blend; opaque and keyed canvases overwrite.
    pub fn for_opacity(opacity: Opacity) -> Self {
        match opacity {
            Opacity::Translucent => BlendMode::Alpha,
            Opacity::Opaque | Opacity::Keyed => BlendMode::Replace,
        }
    }

    pub fn blend_state(self) -> Option<wgpu::BlendState> {
        match self {
            BlendMode::Replace => None,
            BlendMode::Alpha => {
                let component = wgpu::BlendComponent {
                    src_factor: wgpu::BlendFactor::SrcAlpha,
                    dst_factor: wgpu::BlendFactor::OneMinusSrcAlpha,
                    operation: wgpu::BlendOperation::Add,
                };
                Some(wgpu::BlendState {
                    color: component,
                    alpha: component,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::canvas::Canvas;
    use crate::paint::Color;

    use super::*;

    #[test]
    fn uniform_block_is_64_bytes() {
        assert_eq!(std::mem::size_of::<SpriteUniform>(), 64);
    }

    #[test]
    fn full_view_at_base_scale() {
        let c = Canvas::new(64, 64);
        let u = SpriteUniform::for_draw(&c.full(), 0.0, 0.0, BASE_SCALE, 0.0);

        assert_eq!(u.sc_attr, [0.0, 0.0, 1.0, 1.0]);
        assert_eq!(u.sc_pos, [0.0, 0.0, 1.0, 0.0]);
        assert_eq!(u.keyed, 0);
    }

    #[test]
    fn transform_is_passed_through() {
        let c = Canvas::new(8, 8);
        let u = SpriteUniform::for_draw(&c.full(), -0.25, 0.5, 0.5 * BASE_SCALE, 1.5);
        assert_eq!(u.sc_pos, [-0.25, 0.5, 0.5, 1.5]);
    }

    #[test]
    fn keyed_canvas_sets_key_and_flag() {
        let mut c = Canvas::new(8, 8);
        c.set_opacity(Opacity::Keyed);
        c.set_key(Color::new(0.0, 1.0, 0.0, 1.0));

        let u = SpriteUniform::for_draw(&c.full(), 0.0, 0.0, 1.0, 0.0);
        assert_eq!(u.keyed, 1);
        assert_eq!(u.key, [0.0, 1.0, 0.0, 1.0]);
    }

    #[test]
    fn key_is_passed_bit_exact() {
        let mut c = Canvas::new(1, 1);
        c.set_opacity(Opacity::Keyed);
        c.set_key(Color::new(0.3, 0.0, 1.0, 1.0));

        let u = SpriteUniform::for_draw(&c.full(), 0.0, 0.0, 1.0, 0.0);
        assert_eq!(u.key, [0.3, 0.0, 1.0, 1.0]);
        assert_ne!(u.key[0], 77.0 / 255.0);
    }

    #[test]
    fn only_translucent_blends() {
        assert_eq!(BlendMode::for_opacity(Opacity::Translucent), BlendMode::Alpha);
        assert_eq!(BlendMode::for_opacity(Opacity::Opaque), BlendMode::Replace);
        assert_eq!(BlendMode::for_opacity(Opacity::Keyed), BlendMode::Replace);
    }

    #[test]
    fn alpha_blend_uses_src_alpha_factors() {
        assert!(BlendMode::Replace.blend_state().is_none());

        let state = BlendMode::Alpha.blend_state().unwrap();
        for c in [state.color, state.alpha] {
            assert_eq!(c.src_factor, wgpu::BlendFactor::SrcAlpha);
            assert_eq!(c.dst_factor, wgpu::BlendFactor::OneMinusSrcAlpha);
            assert_eq!(c.operation, wgpu::BlendOperation::Add);
        }
    }
}
