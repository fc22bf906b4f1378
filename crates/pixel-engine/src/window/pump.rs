use std::sync::Arc;

use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::WindowEvent;
use winit::event_loop::ActiveEventLoop;
use winit::window::{Window as WinitWindow, WindowAttributes, WindowId};

use crate::device::Error;
use crate::input::InputEvent;
use crate::input::platform::winit::translate_window_event;

/// Event sink driven by `pump_app_events`.
///
/// Creates the window on the first `resumed` and buffers translated input
/// until the owning [`Window`](super::Window) drains it.
pub(super) struct EventPump {
    attributes: Option<WindowAttributes>,
    window: Option<Arc<WinitWindow>>,
    error: Option<Error>,

    pub(super) events: Vec<InputEvent>,
    pub(super) resized: Option<PhysicalSize<u32>>,

    /// Held mouse buttons, tracked across frames.
    buttons: u32,
}

impl EventPump {
    pub(super) fn new(attributes: WindowAttributes) -> Self {
        Self {
            attributes: Some(attributes),
            window: None,
            error: None,
            events: Vec::new(),
            resized: None,
            buttons: 0,
        }
    }

    /// Whether window creation has finished, successfully or not.
    pub(super) fn settled(&self) -> bool {
        self.window.is_some() || self.error.is_some()
    }

    /// Hands over the created window, or the error that prevented it.
    pub(super) fn take_window(&mut self) -> Option<Result<Arc<WinitWindow>, Error>> {
        if let Some(err) = self.error.take() {
            return Some(Err(err));
        }
        self.window.take().map(Ok)
    }
}

impl ApplicationHandler for EventPump {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        let Some(attributes) = self.attributes.take() else {
            return;
        };

        match event_loop.create_window(attributes) {
            Ok(window) => self.window = Some(Arc::new(window)),
            Err(e) => self.error = Some(Error::context("failed to create window", e)),
        }
    }

    fn window_event(&mut self, _event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        if let WindowEvent::Resized(size) = event {
            self.resized = Some(size);
        }

        if let Some(ev) = translate_window_event(&event, &mut self.buttons) {
            self.events.push(ev);
        }
    }
}
