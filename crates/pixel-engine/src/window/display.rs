use std::sync::Arc;
use std::time::Duration;

use winit::dpi::{PhysicalPosition, PhysicalSize};
use winit::event_loop::EventLoop;
use winit::platform::pump_events::{EventLoopExtPumpEvents, PumpStatus};
use winit::window::Window as WinitWindow;

use crate::canvas::{Canvas, Subcanvas};
use crate::device::{Error, Gpu, Result, SurfaceErrorAction, SurfaceTarget};
use crate::input::{InputEvent, InputState, MouseButton};
use crate::paint::Color;
use crate::render::Renderer;

use super::config::WindowConfig;
use super::pump::EventPump;

/// Event loop iterations allowed for the platform to deliver `resumed`.
const CREATE_ATTEMPTS: usize = 16;

/// A window that composites sprites and collects input, one frame per
/// [`present`](Self::present).
///
/// The OS event loop is pumped from `present` without blocking, so the host
/// owns the frame loop:
///
/// ```no_run
/// # fn main() -> Result<(), pixel_engine::Error> {
/// use pixel_engine::{Canvas, Window, BASE_SCALE};
///
/// let mut window = Window::new(640, 480, "demo")?;
/// let sprite = Canvas::new(16, 16);
/// while !window.should_exit() {
///     window.draw(&sprite.full(), 0.0, 0.0, BASE_SCALE, 0.0);
///     window.present();
/// }
/// # Ok(())
/// # }
/// ```
///
/// winit allows one event loop per process, so a process can open one
/// `Window`.
pub struct Window {
    // Field order is drop order: GPU objects, then the surface, then the
    // window, then the event loop.
    renderer: Renderer,
    surface: SurfaceTarget,
    window: Arc<WinitWindow>,
    input: InputState,
    pump: EventPump,
    event_loop: EventLoop<()>,
}

impl Window {
    /// Opens a window of `width` × `height` pixels with default settings.
    pub fn new(width: u32, height: u32, title: &str) -> Result<Self> {
        Self::with_config(WindowConfig::new(width, height, title))
    }

    pub fn with_config(config: WindowConfig) -> Result<Self> {
        let mut event_loop =
            EventLoop::new().map_err(|e| Error::context("failed to create event loop", e))?;

        let mut attributes = WinitWindow::default_attributes()
            .with_title(config.title.clone())
            .with_inner_size(PhysicalSize::new(config.width, config.height))
            .with_resizable(config.resizable);
        if let Some((x, y)) = config.position {
            attributes = attributes.with_position(PhysicalPosition::new(x, y));
        }

        let mut pump = EventPump::new(attributes);
        for _ in 0..CREATE_ATTEMPTS {
            if pump.settled() {
                break;
            }
            if let PumpStatus::Exit(code) =
                event_loop.pump_app_events(Some(Duration::ZERO), &mut pump)
            {
                return Err(Error::ContextInit(format!(
                    "event loop exited during startup (code {code})"
                )));
            }
        }

        let window = pump
            .take_window()
            .ok_or_else(|| Error::ContextInit("window was never created".to_string()))??;

        let size = window.inner_size();
        log::info!(
            "window created: {:?} ({}x{})",
            config.title,
            size.width,
            size.height
        );

        let instance = Gpu::create_instance(&config.gpu);
        let surface = instance
            .create_surface(window.clone())
            .map_err(|e| Error::context("failed to create surface", e))?;
        let gpu = pollster::block_on(Gpu::new(instance, Some(&surface), &config.gpu))?;
        let surface = SurfaceTarget::new(surface, &gpu, size, &config.gpu)?;

        let mut renderer =
            Renderer::new(gpu, config.width, config.height, Some(surface.format()))?;
        renderer.set_clear_color(config.clear_color);

        Ok(Self {
            renderer,
            surface,
            window,
            input: InputState::default(),
            pump,
            event_loop,
        })
    }

    /// Composites `view` with its center at NDC `(x, y)`.
    ///
    /// See [`Renderer::draw`].
    pub fn draw(&mut self, view: &Subcanvas<'_>, x: f32, y: f32, scale: f32, rotation: f32) {
        self.renderer.draw(view, x, y, scale, rotation);
    }

    /// Shows the frame and collects the input that arrived since the last call.
    ///
    /// May block on vsync. The next draw starts a new, cleared frame.
    pub fn present(&mut self) {
        self.renderer.flush();
        self.show_frame();
        self.renderer.end_frame();
        self.pump_events();
    }

    /// Returns the current frame as a canvas, bottom row first.
    pub fn read(&mut self) -> Result<Canvas> {
        self.renderer.read()
    }

    pub fn set_clear_color(&mut self, color: Color) {
        self.renderer.set_clear_color(color);
    }

    pub fn should_exit(&self) -> bool {
        self.input.should_exit()
    }

    /// Pointer x in window pixels from the left edge.
    pub fn mouse_x(&self) -> f32 {
        self.input.mouse_x()
    }

    /// Pointer y in window pixels from the bottom edge.
    pub fn mouse_y(&self) -> f32 {
        self.input.mouse_y()
    }

    pub fn mouse_left(&self) -> bool {
        self.input.button_down(MouseButton::Left)
    }

    pub fn mouse_right(&self) -> bool {
        self.input.button_down(MouseButton::Right)
    }

    /// Scroll accumulated since the previous call.
    pub fn scroll(&mut self) -> i32 {
        self.input.take_scroll()
    }

    /// Whether the key with ASCII-compatible `code` is held.
    pub fn key_down(&self, code: u32) -> bool {
        self.input.key_down(code)
    }

    pub fn input(&self) -> &InputState {
        &self.input
    }

    pub fn renderer(&self) -> &Renderer {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut Renderer {
        &mut self.renderer
    }

    /// Current drawable size in physical pixels.
    pub fn size(&self) -> (u32, u32) {
        let size = self.surface.size();
        (size.width, size.height)
    }

    fn show_frame(&mut self) {
        let device = self.renderer.gpu().device();
        let frame = match self.surface.acquire(device) {
            Ok(frame) => frame,
            Err(SurfaceErrorAction::Fatal) => {
                log::error!("surface out of memory; requesting exit");
                self.input.request_exit();
                return;
            }
            Err(_) => return,
        };

        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        self.renderer.blit_to(&view, self.surface.format());

        self.window.pre_present_notify();
        frame.present();
    }

    fn pump_events(&mut self) {
        let status = self
            .event_loop
            .pump_app_events(Some(Duration::ZERO), &mut self.pump);
        if let PumpStatus::Exit(code) = status {
            log::debug!("event loop exited with code {code}");
            self.pump.events.push(InputEvent::Quit);
        }

        if let Some(size) = self.pump.resized.take() {
            self.surface.resize(self.renderer.gpu().device(), size);
        }

        let height = self.surface.size().height;
        for ev in self.pump.events.drain(..) {
            self.input.apply_event(&ev, height);
        }
    }
}
