//! Starfield pipeline: instanced point sprites at constant screen size.
//!
//! Each star is a camera-facing quad whose clip-space offset is scaled by
//! `clip.w`, cancelling the perspective divide so every sprite covers the
//! same number of pixels regardless of depth (non-attenuating). Sprites test
//! against the depth buffer but never write it.

use bytemuck::{Pod, Zeroable};
use std::num::NonZeroU64;

/// Uniform for the starfield pass, 80 bytes.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct StarfieldUniform {
    pub view_proj: [[f32; 4]; 4],
    /// Viewport size in physical pixels.
    pub viewport_size: [f32; 2],
    /// Sprite size in pixels.
    pub size_px: f32,
    pub _pad: f32,
}

/// Quad corner offsets in sprite-local units.
const QUAD_CORNERS: [[f32; 2]; 4] = [[-0.5, -0.5], [0.5, -0.5], [-0.5, 0.5], [0.5, 0.5]];

/// Two triangles over the four corners.
const QUAD_INDICES: [u32; 6] = [0, 1, 2, 2, 1, 3];

/// GPU buffers for the star sprites: a shared corner quad plus one instance
/// per star.
pub struct StarfieldBuffers {
    pub quad_vertex_buffer: wgpu::Buffer,
    pub quad_index_buffer: wgpu::Buffer,
    pub instance_buffer: wgpu::Buffer,
    pub star_count: u32,
}

impl StarfieldBuffers {
    /// Upload star positions as sprite instances.
    pub fn new(device: &wgpu::Device, stars: &[glam::Vec3]) -> Self {
        use wgpu::util::DeviceExt;

        let instances: Vec<[f32; 3]> = stars.iter().map(|s| [s.x, s.y, s.z]).collect();

        Self {
            quad_vertex_buffer: device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("star-quad-vertices"),
                contents: bytemuck::cast_slice(&QUAD_CORNERS),
                usage: wgpu::BufferUsages::VERTEX,
            }),
            quad_index_buffer: device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("star-quad-indices"),
                contents: bytemuck::cast_slice(&QUAD_INDICES),
                usage: wgpu::BufferUsages::INDEX,
            }),
            instance_buffer: device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("star-instances"),
                contents: bytemuck::cast_slice(&instances),
                usage: wgpu::BufferUsages::VERTEX,
            }),
            star_count: stars.len() as u32,
        }
    }
}

/// Starfield pipeline: one uniform bind group at group 0.
pub struct StarfieldPipeline {
    pub pipeline: wgpu::RenderPipeline,
    pub uniform_bind_group_layout: wgpu::BindGroupLayout,
}

impl StarfieldPipeline {
    /// Create the starfield pipeline.
    pub fn new(
        device: &wgpu::Device,
        shader: &wgpu::ShaderModule,
        surface_format: wgpu::TextureFormat,
        depth_format: Option<wgpu::TextureFormat>,
    ) -> Self {
        let uniform_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("starfield-uniform-bgl"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: NonZeroU64::new(
                            std::mem::size_of::<StarfieldUniform>() as u64
                        ),
                    },
                    count: None,
                }],
            });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("starfield-pipeline-layout"),
            bind_group_layouts: &[&uniform_bind_group_layout],
            immediate_size: 0,
        });

        // Sprites are tested against scene depth but do not write it.
        let depth_stencil = depth_format.map(|format| wgpu::DepthStencilState {
            format,
            depth_write_enabled: false,
            depth_compare: wgpu::CompareFunction::GreaterEqual, // reverse-Z
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        });

        let quad_layout = wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<[f32; 2]>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[wgpu::VertexAttribute {
                offset: 0,
                shader_location: 0,
                format: wgpu::VertexFormat::Float32x2,
            }],
        };
        let instance_layout = wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &[wgpu::VertexAttribute {
                offset: 0,
                shader_location: 1,
                format: wgpu::VertexFormat::Float32x3,
            }],
        };

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("starfield-pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: shader,
                entry_point: Some("vs_main"),
                buffers: &[quad_layout, instance_layout],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                unclipped_depth: false,
                polygon_mode: wgpu::PolygonMode::Fill,
                conservative: false,
            },
            depth_stencil,
            multisample: wgpu::MultisampleState {
                count: 1,
                mask: !0,
                alpha_to_coverage_enabled: false,
            },
            fragment: Some(wgpu::FragmentState {
                module: shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            multiview_mask: None,
            cache: None,
        });

        Self {
            pipeline,
            uniform_bind_group_layout,
        }
    }
}

/// Draw every star sprite in one instanced call.
pub fn draw_starfield<'a>(
    render_pass: &mut wgpu::RenderPass<'a>,
    pipeline: &StarfieldPipeline,
    uniform_bind_group: &'a wgpu::BindGroup,
    buffers: &'a StarfieldBuffers,
) {
    render_pass.set_pipeline(&pipeline.pipeline);
    render_pass.set_bind_group(0, uniform_bind_group, &[]);
    render_pass.set_vertex_buffer(0, buffers.quad_vertex_buffer.slice(..));
    render_pass.set_vertex_buffer(1, buffers.instance_buffer.slice(..));
    render_pass.set_index_buffer(buffers.quad_index_buffer.slice(..), wgpu::IndexFormat::Uint32);
    render_pass.draw_indexed(0..QUAD_INDICES.len() as u32, 0, 0..buffers.star_count);
}

/// WGSL source for the starfield sprites.
pub const STARFIELD_SHADER_SOURCE: &str = r#"
struct StarfieldUniform {
    view_proj: mat4x4<f32>,
    viewport_size: vec2<f32>,
    size_px: f32,
    _pad: f32,
};

@group(0) @binding(0)
var<uniform> uniforms: StarfieldUniform;

struct VertexInput {
    @location(0) corner: vec2<f32>,
    @location(1) star_position: vec3<f32>,
};

@vertex
fn vs_main(in: VertexInput) -> @builtin(position) vec4<f32> {
    var clip = uniforms.view_proj * vec4<f32>(in.star_position, 1.0);
    // Scale the corner offset by w so the sprite keeps a constant pixel
    // size after the perspective divide.
    let offset = in.corner * uniforms.size_px / uniforms.viewport_size * 2.0 * clip.w;
    clip.x += offset.x;
    clip.y += offset.y;
    return clip;
}

@fragment
fn fs_main() -> @location(0) vec4<f32> {
    return vec4<f32>(1.0, 1.0, 1.0, 1.0);
}
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_layout() {
        assert_eq!(std::mem::size_of::<StarfieldUniform>(), 80);
        assert_eq!(std::mem::offset_of!(StarfieldUniform, viewport_size), 64);
        assert_eq!(std::mem::offset_of!(StarfieldUniform, size_px), 72);
    }

    #[test]
    fn test_quad_covers_unit_sprite() {
        for corner in QUAD_CORNERS {
            assert_eq!(corner[0].abs(), 0.5);
            assert_eq!(corner[1].abs(), 0.5);
        }
        assert_eq!(QUAD_INDICES.len(), 6);
        assert!(QUAD_INDICES.iter().all(|&i| (i as usize) < QUAD_CORNERS.len()));
    }

    #[test]
    fn test_shader_scales_offset_by_w() {
        // The w-scaling is what makes sprites non-attenuating.
        assert!(STARFIELD_SHADER_SOURCE.contains("* 2.0 * clip.w"));
        assert!(STARFIELD_SHADER_SOURCE.contains("fn vs_main"));
        assert!(STARFIELD_SHADER_SOURCE.contains("fn fs_main"));
    }
}
