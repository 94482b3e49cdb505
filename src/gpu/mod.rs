//! wgpu plumbing: bind group layouts, pipelines, and shared GPU targets.
//!
//! Binding agreement (fixed, mirrored by `shaders/common_uniforms.wgsl`):
//! group 0 binding 0 is the common uniform buffer; group 1 bindings 0..5 are
//! the state texture inputs, two generations of each channel.

pub mod ring;

use wgpu::util::DeviceExt;

use crate::shaders;
use crate::suite::{CompiledPrograms, Stage};

pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Format of every particle state channel.
pub const STATE_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba32Float;

/// State channels per ring slot: position, color, data.
pub const STATE_CHANNELS: usize = 3;

/// Fixed input texture bindings: two generations of every channel.
pub const STATE_INPUT_BINDINGS: u32 = (STATE_CHANNELS * 2) as u32;

/// How shaded particles combine with the framebuffer.
///
/// Fixed per sandbox at construction time, not runtime-configurable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlendMode {
    /// No blending; fragments replace the framebuffer (default).
    #[default]
    None,
    /// Standard alpha blending.
    Alpha,
    /// Additive blending; overlapping particles brighten.
    Additive,
    /// Premultiplied alpha blending.
    Premultiplied,
}

fn blend_state(mode: BlendMode) -> Option<wgpu::BlendState> {
    match mode {
        BlendMode::None => None,
        BlendMode::Alpha => Some(wgpu::BlendState::ALPHA_BLENDING),
        BlendMode::Additive => Some(wgpu::BlendState {
            color: wgpu::BlendComponent {
                src_factor: wgpu::BlendFactor::SrcAlpha,
                dst_factor: wgpu::BlendFactor::One,
                operation: wgpu::BlendOperation::Add,
            },
            alpha: wgpu::BlendComponent {
                src_factor: wgpu::BlendFactor::One,
                dst_factor: wgpu::BlendFactor::One,
                operation: wgpu::BlendOperation::Add,
            },
        }),
        BlendMode::Premultiplied => Some(wgpu::BlendState::PREMULTIPLIED_ALPHA_BLENDING),
    }
}

/// The two bind group layouts shared by both pipelines.
pub struct BindGroupLayouts {
    pub uniforms: wgpu::BindGroupLayout,
    pub state: wgpu::BindGroupLayout,
}

pub fn create_bind_group_layouts(device: &wgpu::Device) -> BindGroupLayouts {
    let uniforms = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("Common Uniforms Bind Group Layout"),
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        }],
    });

    // Rgba32Float is not filterable without extra device features; all reads
    // go through textureLoad, so no sampler is needed either.
    let state_entries: Vec<wgpu::BindGroupLayoutEntry> = (0..STATE_INPUT_BINDINGS)
        .map(|binding| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
            ty: wgpu::BindingType::Texture {
                sample_type: wgpu::TextureSampleType::Float { filterable: false },
                view_dimension: wgpu::TextureViewDimension::D2,
                multisampled: false,
            },
            count: None,
        })
        .collect();
    let state = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("Particle State Bind Group Layout"),
        entries: &state_entries,
    });

    BindGroupLayouts { uniforms, state }
}

pub fn create_depth_texture(device: &wgpu::Device, width: u32, height: u32) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Depth Texture"),
        size: wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    texture.create_view(&wgpu::TextureViewDescriptor::default())
}

/// The simulation and shade pipelines, replaced together on recompilation.
pub struct Pipelines {
    pub simulate: wgpu::RenderPipeline,
    pub shade: wgpu::RenderPipeline,
}

pub fn create_pipelines(
    device: &wgpu::Device,
    layouts: &BindGroupLayouts,
    programs: &CompiledPrograms,
    target_format: wgpu::TextureFormat,
    blend_mode: BlendMode,
) -> Pipelines {
    let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("Sandbox Pipeline Layout"),
        bind_group_layouts: &[&layouts.uniforms, &layouts.state],
        push_constant_ranges: &[],
    });

    // Simulation pass: fixed fullscreen vertex stage, user fragment stage,
    // one float target per state channel. Pure computation, so no blending
    // and no depth.
    let simulate_vs = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("Simulation Vertex Shader"),
        source: wgpu::ShaderSource::Wgsl(shaders::SIMULATION_VS_WGSL.into()),
    });
    let simulate_fs = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("Simulation Fragment Shader"),
        source: wgpu::ShaderSource::Wgsl(programs.stage(Stage::Simulation).source.as_str().into()),
    });

    let state_targets: [Option<wgpu::ColorTargetState>; STATE_CHANNELS] =
        std::array::from_fn(|_| {
            Some(wgpu::ColorTargetState {
                format: STATE_FORMAT,
                blend: None,
                write_mask: wgpu::ColorWrites::ALL,
            })
        });

    let simulate = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("Simulation Pipeline"),
        layout: Some(&pipeline_layout),
        vertex: wgpu::VertexState {
            module: &simulate_vs,
            entry_point: Some("vs_main"),
            buffers: &[],
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: &simulate_fs,
            entry_point: Some("fs_main"),
            targets: &state_targets,
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: None,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
        cache: None,
    });

    // Shade pass: user vertex and fragment stages, one instance per
    // particle addressed by an instance-stepped texcoord attribute.
    let shade_vs = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("Shade Vertex Shader"),
        source: wgpu::ShaderSource::Wgsl(programs.stage(Stage::Vertex).source.as_str().into()),
    });
    let shade_fs = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("Shade Fragment Shader"),
        source: wgpu::ShaderSource::Wgsl(programs.stage(Stage::Fragment).source.as_str().into()),
    });

    let shade = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("Shade Pipeline"),
        layout: Some(&pipeline_layout),
        vertex: wgpu::VertexState {
            module: &shade_vs,
            entry_point: Some("vs_main"),
            buffers: &[wgpu::VertexBufferLayout {
                array_stride: std::mem::size_of::<[u32; 2]>() as wgpu::BufferAddress,
                step_mode: wgpu::VertexStepMode::Instance,
                attributes: &[wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Uint32x2,
                }],
            }],
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: &shade_fs,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format: target_format,
                blend: blend_state(blend_mode),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: None,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
        cache: None,
    });

    Pipelines { simulate, shade }
}

/// Instance-stepped vertex buffer carrying one texcoord per particle.
pub struct ParticleInstances {
    pub buffer: wgpu::Buffer,
    pub count: u32,
}

pub fn create_instance_texcoords(device: &wgpu::Device, grid_size: [u32; 2]) -> ParticleInstances {
    let [width, height] = grid_size;
    let mut texcoords = Vec::with_capacity((width * height * 2) as usize);
    for y in 0..height {
        for x in 0..width {
            texcoords.push(x);
            texcoords.push(y);
        }
    }

    let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("Particle Texcoord Buffer"),
        contents: bytemuck::cast_slice(&texcoords),
        usage: wgpu::BufferUsages::VERTEX,
    });

    ParticleInstances {
        buffer,
        count: width * height,
    }
}
