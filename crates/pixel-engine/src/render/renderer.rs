use std::collections::HashMap;
use std::sync::mpsc::{self, Receiver, Sender};

use wgpu::util::DeviceExt;

use crate::canvas::{Canvas, Subcanvas, TextureBackend, TextureId, TextureSlot, BYTES_PER_PIXEL};
use crate::device::{Gpu, GpuInit, Result};
use crate::paint::Color;

use super::bind::BindCache;
use super::pipeline::{QUAD_VERTEX_COUNT, QUAD_VERTICES, SpritePipelines};
use super::readback::read_texture;
use super::uniforms::{BlendMode, SpriteUniform};

/// Format of canvas textures and of the back buffer.
pub const TEXTURE_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Bgra8Unorm;

const UNIFORM_SIZE: u64 = std::mem::size_of::<SpriteUniform>() as u64;

/// Composites canvases into a persistent back buffer.
///
/// Draws are recorded by [`draw`](Self::draw) and encoded at the next flush,
/// one draw call per sprite in call order. The first flush of a frame clears
/// the back buffer to the clear color. [`read`](Self::read) returns the back
/// buffer; a [`Window`](crate::Window) additionally blits it to its surface.
///
/// The renderer owns every canvas texture it creates. A canvas dropped by the
/// host releases its texture at the next frame boundary.
pub struct Renderer {
    pipelines: SpritePipelines,
    quad_vbo: wgpu::Buffer,
    sampler: wgpu::Sampler,
    target: BackBuffer,
    uniforms: UniformRing,

    /// Static uniforms for the back buffer → surface copy.
    blit_bind_group: wgpu::BindGroup,

    textures: HashMap<TextureId, GpuTexture>,
    release_tx: Sender<TextureId>,
    release_rx: Receiver<TextureId>,

    pending: Vec<PendingDraw>,
    clear_color: Color,
    clear_pending: bool,
    bound: BindCache,

    gpu: Gpu,
}

struct GpuTexture {
    texture: wgpu::Texture,
    bind_group: wgpu::BindGroup,
}

struct BackBuffer {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    bind_group: wgpu::BindGroup,
    width: u32,
    height: u32,
}

#[derive(Debug, Copy, Clone)]
struct PendingDraw {
    texture: TextureId,
    blend: BlendMode,
    uniform: SpriteUniform,
}

impl Renderer {
    /// Creates an offscreen renderer with a `width` × `height` back buffer.
    pub fn headless(width: u32, height: u32, init: &GpuInit) -> Result<Self> {
        let gpu = Gpu::headless(init)?;
        Self::new(gpu, width, height, None)
    }

    /// Builds the pipelines and GPU resources on top of an existing context.
    ///
    /// `surface_format` adds pipelines able to blit into a window surface.
    pub(crate) fn new(
        gpu: Gpu,
        width: u32,
        height: u32,
        surface_format: Option<wgpu::TextureFormat>,
    ) -> Result<Self> {
        let device = gpu.device();

        let mut formats = vec![TEXTURE_FORMAT];
        formats.extend(surface_format);
        let pipelines = SpritePipelines::new(device, &formats)?;

        let quad_vbo = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("pixel quad vbo"),
            contents: bytemuck::cast_slice(&QUAD_VERTICES),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("pixel sprite sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Nearest,
            mipmap_filter: wgpu::MipmapFilterMode::Nearest,
            ..Default::default()
        });

        let target = BackBuffer::new(device, &pipelines, &sampler, width, height);
        let uniforms = UniformRing::new(device, &pipelines);

        let blit_ubo = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("pixel blit ubo"),
            contents: bytemuck::bytes_of(&SpriteUniform::blit()),
            usage: wgpu::BufferUsages::UNIFORM,
        });
        let blit_bind_group = uniform_bind_group(device, &pipelines, &blit_ubo, "pixel blit bg");

        let (release_tx, release_rx) = mpsc::channel();

        log::debug!("renderer ready: {width}x{height} back buffer");

        Ok(Self {
            pipelines,
            quad_vbo,
            sampler,
            target,
            uniforms,
            blit_bind_group,
            textures: HashMap::new(),
            release_tx,
            release_rx,
            pending: Vec::new(),
            clear_color: Color::BLACK,
            clear_pending: true,
            bound: BindCache::default(),
            gpu,
        })
    }

    pub fn gpu(&self) -> &Gpu {
        &self.gpu
    }

    /// Back buffer size in pixels.
    pub fn size(&self) -> (u32, u32) {
        (self.target.width, self.target.height)
    }

    pub fn clear_color(&self) -> Color {
        self.clear_color
    }

    /// Color the back buffer is cleared to at the start of each frame.
    pub fn set_clear_color(&mut self, color: Color) {
        self.clear_color = color;
    }

    /// Number of live canvas textures.
    pub fn texture_count(&self) -> usize {
        self.textures.len()
    }

    /// Composites `view` with its center at NDC `(x, y)`, scaled by
    /// `scale / BASE_SCALE` and rotated counter-clockwise by `rotation` radians.
    ///
    /// Uploads the canvas first if it is dirty. Blending follows the canvas
    /// opacity. A canvas whose texture belongs to another renderer is skipped
    /// with a warning.
    pub fn draw(&mut self, view: &Subcanvas<'_>, x: f32, y: f32, scale: f32, rotation: f32) {
        let canvas = view.canvas();
        let texture = canvas.update_texture(self);

        self.pending.push(PendingDraw {
            texture,
            blend: BlendMode::for_opacity(canvas.opacity()),
            uniform: SpriteUniform::for_draw(view, x, y, scale, rotation),
        });
    }

    /// Encodes and submits every pending draw into the back buffer.
    pub fn flush(&mut self) {
        if self.pending.is_empty() {
            return;
        }

        let device = self.gpu.device();
        self.uniforms
            .write(device, self.gpu.queue(), &self.pipelines, &self.pending);

        let load = if self.clear_pending {
            wgpu::LoadOp::Clear(self.clear_color.into())
        } else {
            wgpu::LoadOp::Load
        };

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("pixel sprite encoder"),
        });

        {
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("pixel sprite pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &self.target.view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load,
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            self.bound.reset();
            rpass.set_vertex_buffer(0, self.quad_vbo.slice(..));

            for (i, draw) in self.pending.iter().enumerate() {
                let Some(texture) = self.textures.get(&draw.texture) else {
                    log::warn!("draw skipped: {:?} is not owned by this renderer", draw.texture);
                    continue;
                };
                let Some(pipeline) = self.pipelines.get(TEXTURE_FORMAT, draw.blend) else {
                    continue;
                };

                if self.bound.bind_pipeline(draw.blend) {
                    rpass.set_pipeline(pipeline);
                }
                rpass.set_bind_group(0, &self.uniforms.bind_group, &[self.uniforms.offset(i)]);
                if self.bound.bind_texture(draw.texture) {
                    rpass.set_bind_group(1, &texture.bind_group, &[]);
                }
                rpass.draw(0..QUAD_VERTEX_COUNT, 0..1);
            }
        }

        self.gpu.queue().submit(Some(encoder.finish()));
        self.pending.clear();
        self.clear_pending = false;
    }

    /// Ends a frame without a window: flushes and starts the next frame.
    pub fn present(&mut self) {
        self.flush();
        self.end_frame();
    }

    /// Copies the back buffer onto `view` (a surface texture of `format`).
    pub(crate) fn blit_to(&self, view: &wgpu::TextureView, format: wgpu::TextureFormat) {
        let Some(pipeline) = self.pipelines.get(format, BlendMode::Replace) else {
            log::error!("no blit pipeline for surface format {format:?}");
            return;
        };

        let mut encoder = self
            .gpu
            .device()
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("pixel blit encoder"),
            });

        {
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("pixel blit pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            rpass.set_pipeline(pipeline);
            rpass.set_bind_group(0, &self.blit_bind_group, &[0]);
            rpass.set_bind_group(1, &self.target.bind_group, &[]);
            rpass.set_vertex_buffer(0, self.quad_vbo.slice(..));
            rpass.draw(0..QUAD_VERTEX_COUNT, 0..1);
        }

        self.gpu.queue().submit(Some(encoder.finish()));
    }

    /// Frame boundary: releases textures of dropped canvases and arms the
    /// clear for the next frame's first draw.
    pub(crate) fn end_frame(&mut self) {
        for id in self.release_rx.try_iter() {
            if self.textures.remove(&id).is_some() {
                log::trace!("released texture {id:?}");
            }
        }
        self.clear_pending = true;
    }

    /// Flushes pending draws and copies the back buffer into a new canvas.
    ///
    /// Row 0 of the result is the bottom row of the frame.
    pub fn read(&mut self) -> Result<Canvas> {
        self.flush();

        let (width, height) = self.size();
        let top_down = read_texture(
            self.gpu.device(),
            self.gpu.queue(),
            &self.target.texture,
            width,
            height,
        )?;

        let row = width as usize * BYTES_PER_PIXEL;
        let mut pixels = Vec::with_capacity(top_down.len());
        for line in top_down.chunks_exact(row).rev() {
            pixels.extend_from_slice(line);
        }

        Ok(Canvas::from_pixels(width, height, pixels))
    }
}

impl TextureBackend for Renderer {
    fn create_texture(&mut self, width: u32, height: u32) -> TextureSlot {
        let id = TextureId::next();

        let device = self.gpu.device();
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("pixel canvas texture"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: TEXTURE_FORMAT,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let bind_group =
            texture_bind_group(device, &self.pipelines, &view, &self.sampler, "pixel canvas bg");

        log::debug!("created texture {id:?} ({width}x{height})");
        self.textures.insert(id, GpuTexture { texture, bind_group });

        TextureSlot::new(id, self.release_tx.clone())
    }

    fn upload_texture(&mut self, id: TextureId, width: u32, height: u32, pixels: &[u8]) {
        // Queued writes land before the next submit; earlier draws must see
        // the previous contents.
        if self.pending.iter().any(|d| d.texture == id) {
            self.flush();
        }

        let Some(entry) = self.textures.get(&id) else {
            log::warn!("upload to unknown texture {id:?} ignored");
            return;
        };

        self.gpu.queue().write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &entry.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            pixels,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(width * BYTES_PER_PIXEL as u32),
                rows_per_image: Some(height),
            },
            wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
        );
    }
}

// ── back buffer ───────────────────────────────────────────────────────────

impl BackBuffer {
    fn new(
        device: &wgpu::Device,
        pipelines: &SpritePipelines,
        sampler: &wgpu::Sampler,
        width: u32,
        height: u32,
    ) -> Self {
        let (width, height) = (width.max(1), height.max(1));
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("pixel back buffer"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: TEXTURE_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT
                | wgpu::TextureUsages::TEXTURE_BINDING
                | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let bind_group = texture_bind_group(device, pipelines, &view, sampler, "pixel back buffer bg");

        Self {
            texture,
            view,
            bind_group,
            width,
            height,
        }
    }
}

// ── per-draw uniforms ─────────────────────────────────────────────────────

/// One uniform buffer holding a block per pending draw, bound with a dynamic
/// offset.
struct UniformRing {
    buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    capacity: usize,
    stride: u64,
    staging: Vec<u8>,
}

impl UniformRing {
    const MIN_CAPACITY: usize = 64;

    fn new(device: &wgpu::Device, pipelines: &SpritePipelines) -> Self {
        let align = u64::from(device.limits().min_uniform_buffer_offset_alignment);
        let stride = UNIFORM_SIZE.next_multiple_of(align);
        let (buffer, bind_group) = Self::allocate(device, pipelines, Self::MIN_CAPACITY, stride);

        Self {
            buffer,
            bind_group,
            capacity: Self::MIN_CAPACITY,
            stride,
            staging: Vec::new(),
        }
    }

    fn allocate(
        device: &wgpu::Device,
        pipelines: &SpritePipelines,
        capacity: usize,
        stride: u64,
    ) -> (wgpu::Buffer, wgpu::BindGroup) {
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("pixel sprite ubo"),
            size: capacity as u64 * stride,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bind_group = uniform_bind_group(device, pipelines, &buffer, "pixel sprite ubo bg");
        (buffer, bind_group)
    }

    fn ensure_capacity(&mut self, device: &wgpu::Device, pipelines: &SpritePipelines, n: usize) {
        if n <= self.capacity {
            return;
        }

        let new_cap = n.next_power_of_two().max(Self::MIN_CAPACITY);
        let (buffer, bind_group) = Self::allocate(device, pipelines, new_cap, self.stride);
        self.buffer = buffer;
        self.bind_group = bind_group;
        self.capacity = new_cap;
    }

    fn write(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        pipelines: &SpritePipelines,
        draws: &[PendingDraw],
    ) {
        self.ensure_capacity(device, pipelines, draws.len());

        let stride = self.stride as usize;
        self.staging.clear();
        self.staging.resize(draws.len() * stride, 0);
        for (chunk, draw) in self.staging.chunks_exact_mut(stride).zip(draws) {
            chunk[..UNIFORM_SIZE as usize].copy_from_slice(bytemuck::bytes_of(&draw.uniform));
        }
        queue.write_buffer(&self.buffer, 0, &self.staging);
    }

    fn offset(&self, index: usize) -> u32 {
        (index as u64 * self.stride) as u32
    }
}

// ── bind groups ───────────────────────────────────────────────────────────

fn uniform_bind_group(
    device: &wgpu::Device,
    pipelines: &SpritePipelines,
    buffer: &wgpu::Buffer,
    label: &str,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some(label),
        layout: pipelines.uniform_layout(),
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                buffer,
                offset: 0,
                size: wgpu::BufferSize::new(UNIFORM_SIZE),
            }),
        }],
    })
}

fn texture_bind_group(
    device: &wgpu::Device,
    pipelines: &SpritePipelines,
    view: &wgpu::TextureView,
    sampler: &wgpu::Sampler,
    label: &str,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some(label),
        layout: pipelines.texture_layout(),
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(view),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(sampler),
            },
        ],
    })
}
