//! Point-light shadow mapping: a six-face depth cube rendered as a
//! depth-texture array, one 2048×2048 face per axis direction.
//!
//! The depth-only pipeline renders shadow casters once per face from the
//! light's position; the lit shader picks the face by the dominant axis of
//! the light-to-fragment direction and compares against the stored depth.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};
use std::num::NonZeroU64;

use crate::mesh::{MeshBuffer, VertexPositionNormal};
use crate::pipeline::ModelUniform;

/// Number of faces in the shadow cube.
pub const SHADOW_FACE_COUNT: usize = 6;

/// Near plane for the shadow projections.
pub const SHADOW_NEAR: f32 = 0.5;

/// Face directions in array-layer order: +X, -X, +Y, -Y, +Z, -Z.
///
/// [`face_index`] and the WGSL `shadow_face_index` both follow this order;
/// they must stay in sync.
const FACE_DIRECTIONS: [(Vec3, Vec3); SHADOW_FACE_COUNT] = [
    (Vec3::X, Vec3::Y),
    (Vec3::NEG_X, Vec3::Y),
    (Vec3::Y, Vec3::NEG_Z),
    (Vec3::NEG_Y, Vec3::Z),
    (Vec3::Z, Vec3::Y),
    (Vec3::NEG_Z, Vec3::Y),
];

/// GPU-side shadow uniform: one light view-projection matrix per face.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct ShadowUniform {
    pub face_matrices: [[[f32; 4]; 4]; SHADOW_FACE_COUNT],
}

/// Compute the six light-space view-projection matrices for a point light.
///
/// Each face uses a 90° square perspective projection with reverse-Z, far
/// plane at the light's range.
pub fn point_shadow_face_matrices(light_pos: Vec3, range: f32) -> [Mat4; SHADOW_FACE_COUNT] {
    // Reverse-Z: near/far swapped, matching the main pass depth convention.
    let proj = Mat4::perspective_rh(std::f32::consts::FRAC_PI_2, 1.0, range, SHADOW_NEAR);
    FACE_DIRECTIONS
        .map(|(dir, up)| proj * Mat4::look_to_rh(light_pos, dir, up))
}

/// Pack face matrices into the GPU uniform.
pub fn shadow_uniform(matrices: &[Mat4; SHADOW_FACE_COUNT]) -> ShadowUniform {
    ShadowUniform {
        face_matrices: matrices.map(|m| m.to_cols_array_2d()),
    }
}

/// Select the cube face for a light-to-fragment direction by dominant axis.
///
/// Mirrors the WGSL `shadow_face_index` in [`crate::lit_pipeline`].
pub fn face_index(dir: Vec3) -> usize {
    let a = dir.abs();
    if a.x >= a.y && a.x >= a.z {
        if dir.x > 0.0 { 0 } else { 1 }
    } else if a.y >= a.z {
        if dir.y > 0.0 { 2 } else { 3 }
    } else if dir.z > 0.0 {
        4
    } else {
        5
    }
}

/// The shadow cube resources: a six-layer depth array with per-face render
/// views and a comparison sampler.
pub struct ShadowMap {
    pub texture: wgpu::Texture,
    /// Array view bound to the lit shader.
    pub array_view: wgpu::TextureView,
    /// One render-attachment view per face.
    pub face_views: [wgpu::TextureView; SHADOW_FACE_COUNT],
    /// Comparison sampler with reverse-Z GreaterEqual compare.
    pub sampler: wgpu::Sampler,
    size: u32,
}

impl ShadowMap {
    /// Create the shadow cube with square faces of `size` pixels.
    pub fn new(device: &wgpu::Device, size: u32) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("shadow-cube"),
            size: wgpu::Extent3d {
                width: size,
                height: size,
                depth_or_array_layers: SHADOW_FACE_COUNT as u32,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Depth32Float,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });

        let array_view = texture.create_view(&wgpu::TextureViewDescriptor {
            label: Some("shadow-cube-array"),
            dimension: Some(wgpu::TextureViewDimension::D2Array),
            ..Default::default()
        });

        let face_views: [wgpu::TextureView; SHADOW_FACE_COUNT] = std::array::from_fn(|i| {
            texture.create_view(&wgpu::TextureViewDescriptor {
                label: Some("shadow-cube-face"),
                dimension: Some(wgpu::TextureViewDimension::D2),
                base_array_layer: i as u32,
                array_layer_count: Some(1),
                ..Default::default()
            })
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("shadow-comparison-sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            compare: Some(wgpu::CompareFunction::GreaterEqual), // reverse-Z
            ..Default::default()
        });

        Self {
            texture,
            array_view,
            face_views,
            sampler,
            size,
        }
    }

    /// Face resolution in pixels.
    pub fn size(&self) -> u32 {
        self.size
    }
}

/// Depth-only pipeline for rendering shadow cube faces.
pub struct ShadowPipeline {
    /// The underlying wgpu render pipeline.
    pub pipeline: wgpu::RenderPipeline,
    /// Face matrix uniform bind group layout (group 0).
    pub face_bind_group_layout: wgpu::BindGroupLayout,
    /// Caster model uniform bind group layout (group 1).
    pub model_bind_group_layout: wgpu::BindGroupLayout,
}

impl ShadowPipeline {
    /// Create a new shadow depth-only pipeline.
    pub fn new(device: &wgpu::Device, shader: &wgpu::ShaderModule) -> Self {
        let face_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("shadow-face-bgl"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: NonZeroU64::new(64), // mat4x4<f32>
                    },
                    count: None,
                }],
            });

        let model_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("shadow-model-bgl"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX,
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
            label: Some("shadow-pipeline-layout"),
            bind_group_layouts: &[&face_bind_group_layout, &model_bind_group_layout],
            immediate_size: 0,
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("shadow-depth-pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: shader,
                entry_point: Some("vs_shadow"),
                buffers: &[VertexPositionNormal::layout()],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: Some(wgpu::Face::Front), // front-face culling reduces acne
                unclipped_depth: false,
                polygon_mode: wgpu::PolygonMode::Fill,
                conservative: false,
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: wgpu::TextureFormat::Depth32Float,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::GreaterEqual, // reverse-Z
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState {
                    constant: 2,
                    slope_scale: 1.75,
                    clamp: 0.0,
                },
            }),
            multisample: wgpu::MultisampleState::default(),
            fragment: None, // depth-only — no fragment output
            multiview_mask: None,
            cache: None,
        });

        Self {
            pipeline,
            face_bind_group_layout,
            model_bind_group_layout,
        }
    }
}

/// Render all shadow casters into each face of the shadow cube.
pub fn render_shadow_faces<'a>(
    encoder: &mut wgpu::CommandEncoder,
    shadow_pipeline: &ShadowPipeline,
    shadow_map: &ShadowMap,
    face_bind_groups: &[wgpu::BindGroup; SHADOW_FACE_COUNT],
    casters: &[(&'a wgpu::BindGroup, &'a MeshBuffer)],
) {
    for (face_view, face_bind_group) in shadow_map.face_views.iter().zip(face_bind_groups) {
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("shadow-face"),
            color_attachments: &[],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: face_view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(0.0), // reverse-Z: clear to 0
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });
        pass.set_pipeline(&shadow_pipeline.pipeline);
        pass.set_bind_group(0, face_bind_group, &[]);
        for (model_bind_group, mesh) in casters {
            pass.set_bind_group(1, *model_bind_group, &[]);
            mesh.bind(&mut pass);
            mesh.draw(&mut pass);
        }
    }
}

/// WGSL shader source for shadow depth-only rendering.
pub const SHADOW_SHADER_SOURCE: &str = r#"
struct FaceMatrix {
    view_proj: mat4x4<f32>,
};

struct ModelUniform {
    model: mat4x4<f32>,
    color: vec4<f32>,
};

@group(0) @binding(0)
var<uniform> face: FaceMatrix;

@group(1) @binding(0)
var<uniform> model: ModelUniform;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
};

@vertex
fn vs_shadow(in: VertexInput) -> @builtin(position) vec4<f32> {
    return face.view_proj * model.model * vec4<f32>(in.position, 1.0);
}
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shadow_uniform_size() {
        // 6 × mat4x4<f32> = 384 bytes.
        assert_eq!(std::mem::size_of::<ShadowUniform>(), 384);
    }

    #[test]
    fn test_six_face_matrices() {
        let matrices = point_shadow_face_matrices(Vec3::ZERO, 500.0);
        assert_eq!(matrices.len(), SHADOW_FACE_COUNT);
    }

    #[test]
    fn test_face_index_dominant_axis() {
        assert_eq!(face_index(Vec3::new(10.0, 1.0, -2.0)), 0);
        assert_eq!(face_index(Vec3::new(-10.0, 1.0, -2.0)), 1);
        assert_eq!(face_index(Vec3::new(1.0, 10.0, -2.0)), 2);
        assert_eq!(face_index(Vec3::new(1.0, -10.0, -2.0)), 3);
        assert_eq!(face_index(Vec3::new(1.0, 2.0, 10.0)), 4);
        assert_eq!(face_index(Vec3::new(1.0, 2.0, -10.0)), 5);
    }

    #[test]
    fn test_face_matrix_projects_points_on_its_axis() {
        let matrices = point_shadow_face_matrices(Vec3::ZERO, 500.0);
        // A point straight down +X from the light projects to the center of
        // face 0's clip space.
        let clip = matrices[0] * glam::Vec4::new(100.0, 0.0, 0.0, 1.0);
        let ndc = clip / clip.w;
        assert!(ndc.x.abs() < 1e-4, "ndc.x = {}", ndc.x);
        assert!(ndc.y.abs() < 1e-4, "ndc.y = {}", ndc.y);
        assert!(ndc.z > 0.0 && ndc.z < 1.0, "ndc.z = {}", ndc.z);
    }

    #[test]
    fn test_reverse_z_depth_ordering_in_faces() {
        let matrices = point_shadow_face_matrices(Vec3::ZERO, 500.0);
        let near = matrices[0] * glam::Vec4::new(20.0, 0.0, 0.0, 1.0);
        let far = matrices[0] * glam::Vec4::new(400.0, 0.0, 0.0, 1.0);
        assert!(
            near.z / near.w > far.z / far.w,
            "closer casters must store higher depth"
        );
    }

    #[test]
    fn test_every_direction_lands_in_its_face_frustum() {
        let matrices = point_shadow_face_matrices(Vec3::ZERO, 500.0);
        let dirs = [
            Vec3::new(30.0, 5.0, -8.0),
            Vec3::new(-30.0, 5.0, -8.0),
            Vec3::new(5.0, 30.0, -8.0),
            Vec3::new(5.0, -30.0, -8.0),
            Vec3::new(5.0, -8.0, 30.0),
            Vec3::new(5.0, -8.0, -30.0),
        ];
        for dir in dirs {
            let face = face_index(dir);
            let clip = matrices[face] * dir.extend(1.0);
            let ndc = clip / clip.w;
            assert!(
                ndc.x.abs() <= 1.0 && ndc.y.abs() <= 1.0,
                "{dir} outside face {face} frustum: {ndc}"
            );
        }
    }

    #[test]
    fn test_shadow_shader_entry_point() {
        assert!(SHADOW_SHADER_SOURCE.contains("fn vs_shadow"));
    }
}
