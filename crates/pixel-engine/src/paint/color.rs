/// Straight-alpha RGBA color with `f32` channels.
///
/// Channels are conventionally in `[0, 1]`. The same type serves as the frame
/// clear color and as a canvas transparency key. Key comparison in the shader
/// is bit-exact: only texels whose normalized value equals the key exactly are
/// discarded, so a key off the `n / 255` grid matches nothing.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const BLACK: Color = Color::new(0.0, 0.0, 0.0, 1.0);
    pub const WHITE: Color = Color::new(1.0, 1.0, 1.0, 1.0);
    pub const TRANSPARENT: Color = Color::new(0.0, 0.0, 0.0, 0.0);
    /// Conventional color key for sprite sheets.
    pub const MAGENTA: Color = Color::new(1.0, 0.0, 1.0, 1.0);

    #[inline]
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Creates a color from 8-bit RGBA components.
    #[inline]
    pub fn from_rgba8(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self::new(unorm(r), unorm(g), unorm(b), unorm(a))
    }

    /// Creates a color from one pixel of a canvas buffer (`[b, g, r, a]`).
    #[inline]
    pub fn from_bgra8(px: [u8; 4]) -> Self {
        Self::from_rgba8(px[2], px[1], px[0], px[3])
    }

    /// Encodes the color as one canvas pixel (`[b, g, r, a]`), clamping and
    /// rounding each channel.
    #[inline]
    pub fn to_bgra8(self) -> [u8; 4] {
        [quantize(self.b), quantize(self.g), quantize(self.r), quantize(self.a)]
    }

    #[inline]
    pub fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

impl From<Color> for wgpu::Color {
    fn from(c: Color) -> Self {
        wgpu::Color {
            r: c.r as f64,
            g: c.g as f64,
            b: c.b as f64,
            a: c.a as f64,
        }
    }
}

#[inline]
fn unorm(v: u8) -> f32 {
    v as f32 / 255.0
}

#[inline]
fn quantize(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bgra8_round_trips_through_color() {
        let px = [12, 200, 255, 128];
        assert_eq!(Color::from_bgra8(px).to_bgra8(), px);
    }

    #[test]
    fn from_bgra8_swizzles_channels() {
        let c = Color::from_bgra8([255, 0, 0, 255]);
        assert_eq!(c, Color::new(0.0, 0.0, 1.0, 1.0));
    }

    #[test]
    fn to_bgra8_clamps_out_of_range() {
        assert_eq!(Color::new(2.0, -1.0, 0.5, 1.0).to_bgra8(), [128, 0, 255, 255]);
    }

    #[test]
    fn extreme_channels_are_exact() {
        // Keys rely on 0 and 255 mapping exactly to 0.0 and 1.0.
        assert_eq!(Color::from_rgba8(255, 0, 255, 255), Color::MAGENTA);
    }
}
