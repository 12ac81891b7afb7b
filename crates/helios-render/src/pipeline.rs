//! Unlit rendering pipeline for self-illuminated and overlay geometry.
//!
//! Serves the sun (whose material ignores the light rig entirely — it is the
//! light source) and the semi-transparent orbit rings. Alpha blending is
//! enabled and back-face culling disabled so the flat rings read from both
//! sides.

use bytemuck::{Pod, Zeroable};
use std::num::NonZeroU64;

use crate::camera::CameraUniform;
use crate::mesh::{MeshBuffer, VertexPositionNormal};

/// Per-drawable uniform, 80 bytes: model matrix plus flat RGBA color.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct ModelUniform {
    pub model: [[f32; 4]; 4],
    /// rgb = color, a = opacity.
    pub color: [f32; 4],
}

impl ModelUniform {
    /// Pack a model transform and color.
    pub fn new(model: glam::Mat4, color: [f32; 3], alpha: f32) -> Self {
        Self {
            model: model.to_cols_array_2d(),
            color: [color[0], color[1], color[2], alpha],
        }
    }
}

/// Unlit pipeline: camera at group 0, model at group 1.
pub struct UnlitPipeline {
    pub pipeline: wgpu::RenderPipeline,
    pub camera_bind_group_layout: wgpu::BindGroupLayout,
    pub model_bind_group_layout: wgpu::BindGroupLayout,
}

impl UnlitPipeline {
    /// Create a new unlit pipeline.
    pub fn new(
        device: &wgpu::Device,
        shader: &wgpu::ShaderModule,
        surface_format: wgpu::TextureFormat,
        depth_format: Option<wgpu::TextureFormat>,
    ) -> Self {
        let camera_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("unlit-camera-bgl"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: NonZeroU64::new(
                            std::mem::size_of::<CameraUniform>() as u64
                        ),
                    },
                    count: None,
                }],
            });

        let model_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("unlit-model-bgl"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: NonZeroU64::new(
                            std::mem::size_of::<ModelUniform>() as u64
                        ),
                    },
                    count: None,
                }],
            });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("unlit-pipeline-layout"),
            bind_group_layouts: &[&camera_bind_group_layout, &model_bind_group_layout],
            immediate_size: 0,
        });

        let depth_stencil = depth_format.map(|format| wgpu::DepthStencilState {
            format,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::GreaterEqual, // reverse-Z
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("unlit-pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: shader,
                entry_point: Some("vs_main"),
                buffers: &[VertexPositionNormal::layout()],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None, // double-sided for the flat rings
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
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            multiview_mask: None,
            cache: None,
        });

        Self {
            pipeline,
            camera_bind_group_layout,
            model_bind_group_layout,
        }
    }
}

/// Draw unlit geometry with the given camera and model bind groups.
pub fn draw_unlit<'a>(
    render_pass: &mut wgpu::RenderPass<'a>,
    pipeline: &UnlitPipeline,
    camera_bind_group: &'a wgpu::BindGroup,
    model_bind_group: &'a wgpu::BindGroup,
    mesh: &'a MeshBuffer,
) {
    render_pass.set_pipeline(&pipeline.pipeline);
    render_pass.set_bind_group(0, camera_bind_group, &[]);
    render_pass.set_bind_group(1, model_bind_group, &[]);
    mesh.bind(render_pass);
    mesh.draw(render_pass);
}

/// The WGSL source code for the unlit shader.
pub const UNLIT_SHADER_SOURCE: &str = r#"
struct CameraUniform {
    view_proj: mat4x4<f32>,
    camera_pos: vec4<f32>,
};

struct ModelUniform {
    model: mat4x4<f32>,
    color: vec4<f32>,
};

@group(0) @binding(0)
var<uniform> camera: CameraUniform;

@group(1) @binding(0)
var<uniform> model: ModelUniform;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
};

@vertex
fn vs_main(in: VertexInput) -> @builtin(position) vec4<f32> {
    return camera.view_proj * model.model * vec4<f32>(in.position, 1.0);
}

@fragment
fn fs_main() -> @location(0) vec4<f32> {
    return model.color;
}
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_uniform_size() {
        // mat4x4 (64 bytes) + vec4 (16 bytes)
        assert_eq!(std::mem::size_of::<ModelUniform>(), 80);
        assert_eq!(std::mem::offset_of!(ModelUniform, color), 64);
    }

    #[test]
    fn test_model_uniform_packs_color_and_alpha() {
        let u = ModelUniform::new(glam::Mat4::IDENTITY, [1.0, 0.5, 0.25], 0.3);
        assert_eq!(u.color, [1.0, 0.5, 0.25, 0.3]);
        assert_eq!(u.model[0][0], 1.0);
        assert_eq!(u.model[3][3], 1.0);
    }

    #[test]
    fn test_model_uniform_carries_translation() {
        let u = ModelUniform::new(
            glam::Mat4::from_translation(glam::Vec3::new(15.0, 0.0, 3.0)),
            [1.0; 3],
            1.0,
        );
        // Column-major: translation lives in column 3.
        assert_eq!(u.model[3][0], 15.0);
        assert_eq!(u.model[3][1], 0.0);
        assert_eq!(u.model[3][2], 3.0);
    }

    #[test]
    fn test_shader_entry_points_exist() {
        assert!(UNLIT_SHADER_SOURCE.contains("fn vs_main"));
        assert!(UNLIT_SHADER_SOURCE.contains("fn fs_main"));
    }
}
