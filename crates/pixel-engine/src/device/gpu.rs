use super::{Error, GpuInit, Result};

/// Owns the wgpu instance, adapter, device and queue.
///
/// Surface handling lives in [`SurfaceTarget`](super::SurfaceTarget) so the
/// same context serves windowed and headless rendering.
pub struct Gpu {
    /// wgpu instance used to create the adapter and any surface.
    instance: wgpu::Instance,

    /// Selected adapter.
    adapter: wgpu::Adapter,

    /// Logical device.
    device: wgpu::Device,

    /// Command queue.
    queue: wgpu::Queue,
}

impl Gpu {
    /// Creates the wgpu instance a [`Gpu`] and its surfaces are built from.
    pub fn create_instance(init: &GpuInit) -> wgpu::Instance {
        wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: init.backends,
            ..Default::default()
        })
    }

    /// Requests an adapter (compatible with `surface`, when given) and a device.
    ///
    /// Adapter/device acquisition is asynchronous under wgpu.
    pub async fn new(
        instance: wgpu::Instance,
        surface: Option<&wgpu::Surface<'_>>,
        init: &GpuInit,
    ) -> Result<Self> {
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: init.power_preference,
                compatible_surface: surface,
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| Error::context("failed to find a suitable GPU adapter", e))?;

        let info = adapter.get_info();
        log::info!("using GPU adapter {} ({:?})", info.name, info.backend);

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("pixel device"),
                required_features: init.required_features,
                required_limits: init.required_limits.clone(),
                experimental_features: wgpu::ExperimentalFeatures::disabled(),
                memory_hints: wgpu::MemoryHints::Performance,
                trace: wgpu::Trace::Off,
            })
            .await
            .map_err(|e| Error::context("failed to create wgpu device/queue", e))?;

        Ok(Self {
            instance,
            adapter,
            device,
            queue,
        })
    }

    /// Creates a context with no surface, for offscreen rendering.
    pub fn headless(init: &GpuInit) -> Result<Self> {
        pollster::block_on(Self::new(Self::create_instance(init), None, init))
    }

    pub fn instance(&self) -> &wgpu::Instance {
        &self.instance
    }

    pub fn adapter(&self) -> &wgpu::Adapter {
        &self.adapter
    }

    /// Returns a reference to the logical device.
    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    /// Returns a reference to the command queue.
    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }
}
