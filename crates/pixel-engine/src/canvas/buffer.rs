use std::cell::{Cell, OnceCell};
use std::fmt;

use crate::paint::Color;

use super::subcanvas::Subcanvas;
use super::texture::{TextureBackend, TextureId, TextureSlot};

/// Bytes per BGRA8 pixel.
pub const BYTES_PER_PIXEL: usize = 4;

/// How a canvas is composited onto the target.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub enum Opacity {
    /// Pixels overwrite the target; alpha is ignored.
    #[default]
    Opaque,
    /// Pixels are alpha-blended over the target.
    Translucent,
    /// Pixels exactly equal to the canvas key are skipped; others overwrite.
    Keyed,
}

/// Owned BGRA8 pixel buffer with a lazily created, cached GPU texture.
///
/// Row 0 of the buffer is the bottom row when the canvas is drawn unrotated.
///
/// The GPU copy is refreshed only when the canvas is dirty. Writes through
/// [`pixels_mut`](Self::pixels_mut) must be followed by
/// [`mark_dirty`](Self::mark_dirty); otherwise draws keep showing the previous
/// upload.
///
/// The dirty flag and texture slot use interior mutability so that shared
/// [`Subcanvas`] views can drive uploads. `Canvas` is therefore `!Sync`.
pub struct Canvas {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
    opacity: Opacity,
    key: Color,
    texture: OnceCell<TextureSlot>,
    dirty: Cell<bool>,
}

impl Canvas {
    /// Creates a zero-filled canvas.
    ///
    /// # Panics
    /// Panics if `width` or `height` is zero.
    pub fn new(width: u32, height: u32) -> Self {
        let len = buffer_len(width, height);
        Self::from_pixels(width, height, vec![0; len])
    }

    /// Creates a canvas over an existing BGRA8 buffer.
    ///
    /// # Panics
    /// Panics if a dimension is zero or `pixels.len() != width * height * 4`.
    pub fn from_pixels(width: u32, height: u32, pixels: Vec<u8>) -> Self {
        let len = buffer_len(width, height);
        assert_eq!(
            pixels.len(),
            len,
            "canvas buffer for {width}x{height} must hold {len} bytes"
        );

        Self {
            width,
            height,
            pixels,
            opacity: Opacity::default(),
            key: Color::MAGENTA,
            texture: OnceCell::new(),
            dirty: Cell::new(true),
        }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Mutable access to the pixel buffer. Does not mark the canvas dirty.
    #[inline]
    pub fn pixels_mut(&mut self) -> &mut [u8] {
        &mut self.pixels
    }

    /// Schedules a full re-upload on the next [`update_texture`](Self::update_texture).
    #[inline]
    pub fn mark_dirty(&self) {
        self.dirty.set(true);
    }

    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.dirty.get()
    }

    /// Returns the BGRA8 pixel at `(x, y)`, or `None` outside the canvas.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * BYTES_PER_PIXEL;
        let px = &self.pixels[i..i + BYTES_PER_PIXEL];
        Some([px[0], px[1], px[2], px[3]])
    }

    /// Sets every pixel to `color` and marks the canvas dirty.
    pub fn fill(&mut self, color: Color) {
        let px = color.to_bgra8();
        for chunk in self.pixels.chunks_exact_mut(BYTES_PER_PIXEL) {
            chunk.copy_from_slice(&px);
        }
        self.mark_dirty();
    }

    #[inline]
    pub fn opacity(&self) -> Opacity {
        self.opacity
    }

    #[inline]
    pub fn set_opacity(&mut self, opacity: Opacity) {
        self.opacity = opacity;
    }

    /// Transparency key used when the opacity is [`Opacity::Keyed`].
    #[inline]
    pub fn key(&self) -> Color {
        self.key
    }

    #[inline]
    pub fn set_key(&mut self, key: Color) {
        self.key = key;
    }

    /// Id of the GPU texture, if one has been created.
    pub fn texture_id(&self) -> Option<TextureId> {
        self.texture.get().map(TextureSlot::id)
    }

    /// Ensures the GPU texture exists and holds the current pixels.
    ///
    /// Creates the texture on first use. Uploads the full buffer only when the
    /// canvas is dirty, then clears the flag. Returns the texture id whether or
    /// not an upload happened.
    pub fn update_texture<B>(&self, backend: &mut B) -> TextureId
    where
        B: TextureBackend + ?Sized,
    {
        let id = self
            .texture
            .get_or_init(|| backend.create_texture(self.width, self.height))
            .id();

        if self.dirty.replace(false) {
            backend.upload_texture(id, self.width, self.height, &self.pixels);
        }

        id
    }

    /// View of the rectangle at `(x, y)` with extent `width` × `height`, in pixels.
    ///
    /// Bounds are not validated.
    #[inline]
    pub fn subcanvas(&self, x: u32, y: u32, width: u32, height: u32) -> Subcanvas<'_> {
        Subcanvas::new(self, x, y, width, height)
    }

    /// View covering the whole canvas.
    #[inline]
    pub fn full(&self) -> Subcanvas<'_> {
        Subcanvas::new(self, 0, 0, self.width, self.height)
    }
}

impl fmt::Debug for Canvas {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Canvas")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("opacity", &self.opacity)
            .field("key", &self.key)
            .field("texture", &self.texture_id())
            .field("dirty", &self.dirty.get())
            .finish_non_exhaustive()
    }
}

fn buffer_len(width: u32, height: u32) -> usize {
    assert!(width > 0 && height > 0, "canvas dimensions must be non-zero");
    width as usize * height as usize * BYTES_PER_PIXEL
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc;

    use super::*;

    /// Backend that records traffic and keeps the last uploaded bytes per texture.
    #[derive(Default)]
    struct CountingBackend {
        created: u32,
        uploads: u32,
        gpu_copy: Vec<u8>,
    }

    impl TextureBackend for CountingBackend {
        fn create_texture(&mut self, _width: u32, _height: u32) -> TextureSlot {
            self.created += 1;
            TextureSlot::untracked(TextureId(self.created as u64))
        }

        fn upload_texture(&mut self, _texture: TextureId, _w: u32, _h: u32, pixels: &[u8]) {
            self.uploads += 1;
            self.gpu_copy = pixels.to_vec();
        }
    }

    #[test]
    fn new_canvas_is_zeroed_and_dirty() {
        let c = Canvas::new(3, 2);
        assert_eq!(c.pixels().len(), 3 * 2 * 4);
        assert!(c.pixels().iter().all(|&b| b == 0));
        assert!(c.is_dirty());
        assert_eq!(c.texture_id(), None);
    }

    #[test]
    #[should_panic(expected = "non-zero")]
    fn zero_width_panics() {
        let _ = Canvas::new(0, 4);
    }

    #[test]
    #[should_panic(expected = "must hold")]
    fn mismatched_buffer_panics() {
        let _ = Canvas::from_pixels(2, 2, vec![0; 15]);
    }

    // ── upload memoization ────────────────────────────────────────────────

    #[test]
    fn repeated_update_uploads_once() {
        let c = Canvas::new(4, 4);
        let mut backend = CountingBackend::default();

        let a = c.update_texture(&mut backend);
        let b = c.update_texture(&mut backend);

        assert_eq!(a, b);
        assert_eq!(backend.created, 1);
        assert_eq!(backend.uploads, 1);
        assert!(!c.is_dirty());
    }

    #[test]
    fn mark_dirty_causes_exactly_one_more_upload() {
        let mut c = Canvas::new(2, 2);
        let mut backend = CountingBackend::default();
        c.update_texture(&mut backend);

        c.pixels_mut()[0] = 7;
        c.mark_dirty();
        c.update_texture(&mut backend);
        c.update_texture(&mut backend);

        assert_eq!(backend.uploads, 2);
        assert_eq!(backend.created, 1);
        assert_eq!(backend.gpu_copy[0], 7);
    }

    #[test]
    fn unmarked_mutation_leaves_gpu_copy_stale() {
        let mut c = Canvas::new(2, 2);
        let mut backend = CountingBackend::default();
        c.update_texture(&mut backend);

        c.pixels_mut()[0] = 99;
        c.update_texture(&mut backend);

        assert_eq!(backend.uploads, 1);
        assert_eq!(backend.gpu_copy[0], 0);
    }

    #[test]
    fn fill_marks_dirty() {
        let mut c = Canvas::new(2, 1);
        let mut backend = CountingBackend::default();
        c.update_texture(&mut backend);

        c.fill(Color::new(1.0, 0.0, 0.0, 1.0));

        assert!(c.is_dirty());
        c.update_texture(&mut backend);
        assert_eq!(backend.gpu_copy, vec![0, 0, 255, 255, 0, 0, 255, 255]);
    }

    #[test]
    fn dropping_canvas_reports_texture_release() {
        struct Tracked(mpsc::Sender<TextureId>);
        impl TextureBackend for Tracked {
            fn create_texture(&mut self, _w: u32, _h: u32) -> TextureSlot {
                TextureSlot::new(TextureId(42), self.0.clone())
            }
            fn upload_texture(&mut self, _t: TextureId, _w: u32, _h: u32, _p: &[u8]) {}
        }

        let (tx, rx) = mpsc::channel();
        let mut backend = Tracked(tx);
        let c = Canvas::new(1, 1);
        c.update_texture(&mut backend);
        assert!(rx.try_recv().is_err());

        drop(c);
        assert_eq!(rx.try_recv(), Ok(TextureId(42)));
    }

    #[test]
    fn pixel_reads_bgra_and_rejects_out_of_bounds() {
        let mut c = Canvas::new(2, 2);
        c.pixels_mut()[12..16].copy_from_slice(&[1, 2, 3, 4]);
        assert_eq!(c.pixel(1, 1), Some([1, 2, 3, 4]));
        assert_eq!(c.pixel(2, 0), None);
    }
}
