use crate::device::GpuInit;
use crate::paint::Color;

/// Window configuration.
#[derive(Debug, Clone)]
pub struct WindowConfig {
    pub title: String,

    /// Drawable size in physical pixels. Also the back buffer size.
    pub width: u32,
    pub height: u32,

    /// Initial top-left position on the desktop; `None` lets the platform decide.
    pub position: Option<(i32, i32)>,

    pub resizable: bool,

    /// Color the frame is cleared to before the first draw.
    pub clear_color: Color,

    pub gpu: GpuInit,
}

impl WindowConfig {
    pub fn new(width: u32, height: u32, title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            width,
            height,
            ..Self::default()
        }
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "pixel".to_string(),
            width: 640,
            height: 480,
            position: Some((50, 50)),
            resizable: true,
            clear_color: Color::BLACK,
            gpu: GpuInit::default(),
        }
    }
}
