use super::buffer::Canvas;

/// Non-owning rectangular view into a [`Canvas`], the unit of compositing.
///
/// Offset and extent are in canvas pixels. Views outside
/// `[0, width] × [0, height]` are accepted; the renderer samples them with
/// clamp-to-edge addressing.
#[derive(Debug, Copy, Clone)]
pub struct Subcanvas<'a> {
    canvas: &'a Canvas,
    x: u32,
    y: u32,
    width: u32,
    height: u32,
}

impl<'a> Subcanvas<'a> {
    #[inline]
    pub fn new(canvas: &'a Canvas, x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            canvas,
            x,
            y,
            width,
            height,
        }
    }

    #[inline]
    pub fn canvas(&self) -> &'a Canvas {
        self.canvas
    }

    #[inline]
    pub fn offset(&self) -> (u32, u32) {
        (self.x, self.y)
    }

    #[inline]
    pub fn extent(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Texture-space attributes consumed by the vertex stage.
    ///
    /// `xy` is the offset in units of the view's own extent and `zw` the extent
    /// as a fraction of the canvas, so that
    /// `uv = (0.5 * quad + 0.5 + xy) * zw` spans exactly this view.
    /// A zero extent contributes a zero offset term.
    pub fn texture_attributes(&self) -> [f32; 4] {
        let (cw, ch) = (self.canvas.width() as f32, self.canvas.height() as f32);
        let (w, h) = (self.width as f32, self.height as f32);
        [ratio(self.x as f32, w), ratio(self.y as f32, h), w / cw, h / ch]
    }
}

#[inline]
fn ratio(num: f32, den: f32) -> f32 {
    if den == 0.0 { 0.0 } else { num / den }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Applies the vertex-stage texture mapping to a quad corner.
    fn uv(attr: [f32; 4], quad: [f32; 2]) -> [f32; 2] {
        [
            (0.5 * quad[0] + 0.5 + attr[0]) * attr[2],
            (0.5 * quad[1] + 0.5 + attr[1]) * attr[3],
        ]
    }

    #[test]
    fn full_extent_maps_to_unit_square() {
        let c = Canvas::new(64, 64);
        assert_eq!(c.full().texture_attributes(), [0.0, 0.0, 1.0, 1.0]);
    }

    #[test]
    fn tile_maps_to_its_texture_rectangle() {
        let c = Canvas::new(64, 32);
        let attr = c.subcanvas(16, 8, 16, 8).texture_attributes();

        assert_eq!(uv(attr, [-1.0, -1.0]), [0.25, 0.25]);
        assert_eq!(uv(attr, [1.0, 1.0]), [0.5, 0.5]);
    }

    #[test]
    fn offset_need_not_be_a_multiple_of_the_extent() {
        let c = Canvas::new(100, 100);
        let attr = c.subcanvas(10, 30, 20, 40).texture_attributes();

        let lo = uv(attr, [-1.0, -1.0]);
        let hi = uv(attr, [1.0, 1.0]);
        assert!((lo[0] - 0.1).abs() < 1e-6 && (lo[1] - 0.3).abs() < 1e-6);
        assert!((hi[0] - 0.3).abs() < 1e-6 && (hi[1] - 0.7).abs() < 1e-6);
    }

    #[test]
    fn zero_extent_stays_finite() {
        let c = Canvas::new(8, 8);
        let attr = c.subcanvas(4, 4, 0, 0).texture_attributes();
        assert!(attr.iter().all(|v| v.is_finite()));
    }
}
