//! The sprite shader and the pipelines built from it.

use std::collections::HashMap;

use bytemuck::{Pod, Zeroable};

use crate::device::{Error, Result};

use super::uniforms::{BlendMode, SpriteUniform};

// ── quad vertex ───────────────────────────────────────────────────────────

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub(super) struct QuadVertex {
    pub pos: [f32; 4],
}

impl QuadVertex {
    const ATTRS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x4];

    pub(super) fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<QuadVertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}

const fn corner(x: f32, y: f32) -> QuadVertex {
    QuadVertex { pos: [x, y, 0.5, 1.0] }
}

/// Two triangles covering `[-1, 1]²`.
pub(super) const QUAD_VERTICES: [QuadVertex; 6] = [
    corner(-1.0, -1.0),
    corner(-1.0, 1.0),
    corner(1.0, -1.0),
    corner(1.0, -1.0),
    corner(-1.0, 1.0),
    corner(1.0, 1.0),
];

pub(super) const QUAD_VERTEX_COUNT: u32 = QUAD_VERTICES.len() as u32;

// ── pipelines ─────────────────────────────────────────────────────────────

/// One compiled shader module and every pipeline derived from it.
///
/// Bind groups:
/// - group 0: `Sprite` uniform block, dynamic offset
/// - group 1: texture + sampler
pub(super) struct SpritePipelines {
    uniform_layout: wgpu::BindGroupLayout,
    texture_layout: wgpu::BindGroupLayout,
    pipelines: HashMap<(wgpu::TextureFormat, BlendMode), wgpu::RenderPipeline>,
}

impl SpritePipelines {
    /// Compiles the shader and builds a pipeline for every target format and
    /// blend mode.
    pub(super) fn new(device: &wgpu::Device, formats: &[wgpu::TextureFormat]) -> Result<Self> {
        let shader = validated(device, || {
            device.create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some("pixel sprite shader"),
                source: wgpu::ShaderSource::Wgsl(include_str!("shaders/sprite.wgsl").into()),
            })
        })
        .map_err(Error::ShaderCompile)?;

        let uniform_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("pixel sprite uniform bgl"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: true,
                    min_binding_size: wgpu::BufferSize::new(
                        std::mem::size_of::<SpriteUniform>() as u64,
                    ),
                },
                count: None,
            }],
        });

        let texture_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("pixel sprite texture bgl"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("pixel sprite pipeline layout"),
            bind_group_layouts: &[&uniform_layout, &texture_layout],
            immediate_size: 0,
        });

        let mut pipelines = HashMap::new();
        for &format in formats {
            for blend in BlendMode::ALL {
                if pipelines.contains_key(&(format, blend)) {
                    continue;
                }
                let pipeline = validated(device, || {
                    create_pipeline(device, &pipeline_layout, &shader, format, blend)
                })
                .map_err(Error::Link)?;
                pipelines.insert((format, blend), pipeline);
            }
        }

        log::debug!("sprite pipelines built for {formats:?}");

        Ok(Self {
            uniform_layout,
            texture_layout,
            pipelines,
        })
    }

    pub(super) fn uniform_layout(&self) -> &wgpu::BindGroupLayout {
        &self.uniform_layout
    }

    pub(super) fn texture_layout(&self) -> &wgpu::BindGroupLayout {
        &self.texture_layout
    }

    pub(super) fn get(
        &self,
        format: wgpu::TextureFormat,
        blend: BlendMode,
    ) -> Option<&wgpu::RenderPipeline> {
        self.pipelines.get(&(format, blend))
    }
}

fn create_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    shader: &wgpu::ShaderModule,
    format: wgpu::TextureFormat,
    blend: BlendMode,
) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("pixel sprite pipeline"),
        layout: Some(layout),

        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some("vs_main"),
            compilation_options: Default::default(),
            buffers: &[QuadVertex::layout()],
        },

        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some("fs_main"),
            compilation_options: Default::default(),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: blend.blend_state(),
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),

        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            // Negative scales and rotations flip winding.
            cull_mode: None,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },

        // No depth attachment: draw order is paint order.
        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        multiview_mask: None,
        cache: None,
    })
}

/// Runs `f` inside a validation error scope and returns the scope's
/// diagnostic text if wgpu reported an error.
fn validated<T>(device: &wgpu::Device, f: impl FnOnce() -> T) -> std::result::Result<T, String> {
    let scope = device.push_error_scope(wgpu::ErrorFilter::Validation);
    let out = f();
    match pollster::block_on(scope.pop()) {
        Some(err) => Err(err.to_string()),
        None => Ok(out),
    }
}
