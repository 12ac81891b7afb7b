//! Lit rendering pipeline: Blinn-Phong shading under the four-light rig with
//! point-light cube shadows.
//!
//! Camera at `@group(0)`, light rig at `@group(1)`, shadow cube at
//! `@group(2)` (uniform buffer, depth texture array, comparison sampler),
//! per-drawable model at `@group(3)`.

use std::num::NonZeroU64;

use helios_scene::LightRigUniform;

use crate::camera::CameraUniform;
use crate::mesh::{MeshBuffer, VertexPositionNormal};
use crate::pipeline::ModelUniform;
use crate::shadow::ShadowUniform;

/// Lit pipeline: camera at group 0, lights at group 1, shadows at group 2,
/// model at group 3.
pub struct LitPipeline {
    /// The underlying wgpu render pipeline.
    pub pipeline: wgpu::RenderPipeline,
    /// Camera uniform bind group layout (group 0).
    pub camera_bind_group_layout: wgpu::BindGroupLayout,
    /// Light rig uniform bind group layout (group 1).
    pub light_bind_group_layout: wgpu::BindGroupLayout,
    /// Shadow cube bind group layout (group 2).
    pub shadow_bind_group_layout: wgpu::BindGroupLayout,
    /// Per-drawable model uniform bind group layout (group 3).
    pub model_bind_group_layout: wgpu::BindGroupLayout,
}

impl LitPipeline {
    /// Create a new lit pipeline with shadow support.
    pub fn new(
        device: &wgpu::Device,
        shader: &wgpu::ShaderModule,
        surface_format: wgpu::TextureFormat,
        depth_format: Option<wgpu::TextureFormat>,
    ) -> Self {
        let camera_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("lit-camera-bgl"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
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

        let light_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("lit-light-bgl"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: NonZeroU64::new(
                            std::mem::size_of::<LightRigUniform>() as u64
                        ),
                    },
                    count: None,
                }],
            });

        let shadow_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("lit-shadow-bgl"),
                entries: &[
                    // binding 0: face matrices uniform buffer
                    wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Buffer {
                            ty: wgpu::BufferBindingType::Uniform,
                            has_dynamic_offset: false,
                            min_binding_size: NonZeroU64::new(
                                std::mem::size_of::<ShadowUniform>() as u64
                            ),
                        },
                        count: None,
                    },
                    // binding 1: shadow depth texture array
                    wgpu::BindGroupLayoutEntry {
                        binding: 1,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Texture {
                            sample_type: wgpu::TextureSampleType::Depth,
                            view_dimension: wgpu::TextureViewDimension::D2Array,
                            multisampled: false,
                        },
                        count: None,
                    },
                    // binding 2: comparison sampler
                    wgpu::BindGroupLayoutEntry {
                        binding: 2,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Comparison),
                        count: None,
                    },
                ],
            });

        let model_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("lit-model-bgl"),
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
            label: Some("lit-pipeline-layout"),
            bind_group_layouts: &[
                &camera_bind_group_layout,
                &light_bind_group_layout,
                &shadow_bind_group_layout,
                &model_bind_group_layout,
            ],
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
            label: Some("lit-pipeline"),
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
                cull_mode: Some(wgpu::Face::Back),
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
                    blend: None, // opaque
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
            light_bind_group_layout,
            shadow_bind_group_layout,
            model_bind_group_layout,
        }
    }
}

/// Draw lit geometry with camera, light, shadow, and model bind groups.
pub fn draw_lit<'a>(
    render_pass: &mut wgpu::RenderPass<'a>,
    pipeline: &LitPipeline,
    camera_bind_group: &'a wgpu::BindGroup,
    light_bind_group: &'a wgpu::BindGroup,
    shadow_bind_group: &'a wgpu::BindGroup,
    model_bind_group: &'a wgpu::BindGroup,
    mesh: &'a MeshBuffer,
) {
    render_pass.set_pipeline(&pipeline.pipeline);
    render_pass.set_bind_group(0, camera_bind_group, &[]);
    render_pass.set_bind_group(1, light_bind_group, &[]);
    render_pass.set_bind_group(2, shadow_bind_group, &[]);
    render_pass.set_bind_group(3, model_bind_group, &[]);
    mesh.bind(render_pass);
    mesh.draw(render_pass);
}

/// WGSL shader source for Blinn-Phong shading under the four-light rig.
///
/// The point light attenuates with a windowed inverse-square falloff that
/// reaches zero at its range; the two directional fills and the ambient term
/// are unattenuated and unshadowed.
pub const LIT_SHADER_SOURCE: &str = r#"
const SHININESS: f32 = 30.0;
const SPECULAR_STRENGTH: vec3<f32> = vec3<f32>(0.067, 0.067, 0.067);

struct CameraUniform {
    view_proj: mat4x4<f32>,
    camera_pos: vec4<f32>,
};

struct LightRig {
    point_position_range: vec4<f32>,
    point_color_intensity: vec4<f32>,
    ambient_color_intensity: vec4<f32>,
    dir0_direction_intensity: vec4<f32>,
    dir0_color: vec4<f32>,
    dir1_direction_intensity: vec4<f32>,
    dir1_color: vec4<f32>,
};

struct ShadowUniforms {
    face_matrices: array<mat4x4<f32>, 6>,
};

struct ModelUniform {
    model: mat4x4<f32>,
    color: vec4<f32>,
};

@group(0) @binding(0)
var<uniform> camera: CameraUniform;

@group(1) @binding(0)
var<uniform> lights: LightRig;

@group(2) @binding(0)
var<uniform> shadow_uniforms: ShadowUniforms;

@group(2) @binding(1)
var shadow_map_texture: texture_depth_2d_array;

@group(2) @binding(2)
var shadow_sampler: sampler_comparison;

@group(3) @binding(0)
var<uniform> model: ModelUniform;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) world_position: vec3<f32>,
    @location(1) world_normal: vec3<f32>,
};

// --- Attenuation & Shadow ---

fn point_light_attenuation(dist: f32, range: f32) -> f32 {
    if dist >= range {
        return 0.0;
    }
    let inv_sq = 1.0 / (dist * dist + 1.0);
    let ratio = dist / range;
    let t = max(1.0 - ratio * ratio, 0.0);
    let window = t * t;
    return inv_sq * window;
}

// Cube face by dominant axis. Order: +X, -X, +Y, -Y, +Z, -Z.
fn shadow_face_index(dir: vec3<f32>) -> i32 {
    let a = abs(dir);
    if a.x >= a.y && a.x >= a.z {
        return select(1, 0, dir.x > 0.0);
    }
    if a.y >= a.z {
        return select(3, 2, dir.y > 0.0);
    }
    return select(5, 4, dir.z > 0.0);
}

fn point_shadow_factor(world_pos: vec3<f32>) -> f32 {
    let dir = world_pos - lights.point_position_range.xyz;
    let face = shadow_face_index(dir);

    let light_pos = shadow_uniforms.face_matrices[face] * vec4<f32>(world_pos, 1.0);
    if light_pos.w <= 0.0 {
        return 1.0;
    }
    let shadow_coord = light_pos.xyz / light_pos.w;
    let uv = vec2<f32>(shadow_coord.x * 0.5 + 0.5, -shadow_coord.y * 0.5 + 0.5);

    if uv.x < 0.0 || uv.x > 1.0 || uv.y < 0.0 || uv.y > 1.0 {
        return 1.0;
    }

    return textureSampleCompareLevel(
        shadow_map_texture,
        shadow_sampler,
        uv,
        face,
        shadow_coord.z,
    );
}

// --- Blinn-Phong ---

fn blinn_phong(
    light_dir: vec3<f32>,
    view_dir: vec3<f32>,
    normal: vec3<f32>,
    albedo: vec3<f32>,
) -> vec3<f32> {
    let n_dot_l = max(dot(normal, light_dir), 0.0);
    let half_vec = normalize(view_dir + light_dir);
    let spec = pow(max(dot(normal, half_vec), 0.0), SHININESS);
    return albedo * n_dot_l + SPECULAR_STRENGTH * spec;
}

// --- Vertex & Fragment ---

@vertex
fn vs_main(in: VertexInput) -> VertexOutput {
    var out: VertexOutput;
    let world_position = model.model * vec4<f32>(in.position, 1.0);
    out.clip_position = camera.view_proj * world_position;
    out.world_position = world_position.xyz;
    // Uniform scale only, so the model matrix rotates normals directly.
    out.world_normal = normalize((model.model * vec4<f32>(in.normal, 0.0)).xyz);
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let normal = normalize(in.world_normal);
    let view_dir = normalize(camera.camera_pos.xyz - in.world_position);
    let albedo = model.color.rgb;

    // Point light (the sun) with shadows and range falloff.
    let to_light = lights.point_position_range.xyz - in.world_position;
    let dist = length(to_light);
    let range = lights.point_position_range.w;
    var color = vec3<f32>(0.0);
    if dist < range {
        let atten = point_light_attenuation(dist, range);
        let shadow = point_shadow_factor(in.world_position);
        color += blinn_phong(normalize(to_light), view_dir, normal, albedo)
               * lights.point_color_intensity.xyz
               * lights.point_color_intensity.w
               * atten * shadow;
    }

    // Two directional fills, unshadowed.
    color += blinn_phong(-lights.dir0_direction_intensity.xyz, view_dir, normal, albedo)
           * lights.dir0_color.xyz * lights.dir0_direction_intensity.w;
    color += blinn_phong(-lights.dir1_direction_intensity.xyz, view_dir, normal, albedo)
           * lights.dir1_color.xyz * lights.dir1_direction_intensity.w;

    // Ambient term.
    color += albedo * lights.ambient_color_intensity.xyz * lights.ambient_color_intensity.w;

    return vec4<f32>(color, model.color.a);
}
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shader_entry_points_exist() {
        assert!(LIT_SHADER_SOURCE.contains("fn vs_main"));
        assert!(LIT_SHADER_SOURCE.contains("fn fs_main"));
    }

    #[test]
    fn test_shader_declares_four_light_rig() {
        // The WGSL struct must mirror LightRigUniform field-for-field.
        for field in [
            "point_position_range",
            "point_color_intensity",
            "ambient_color_intensity",
            "dir0_direction_intensity",
            "dir0_color",
            "dir1_direction_intensity",
            "dir1_color",
        ] {
            assert!(
                LIT_SHADER_SOURCE.contains(field),
                "shader missing light rig field {field}"
            );
        }
    }

    #[test]
    fn test_shader_shininess_matches_material() {
        assert!(LIT_SHADER_SOURCE.contains("SHININESS: f32 = 30.0"));
    }

    #[test]
    fn test_shader_uses_six_face_shadow_array() {
        assert!(LIT_SHADER_SOURCE.contains("array<mat4x4<f32>, 6>"));
        assert!(LIT_SHADER_SOURCE.contains("texture_depth_2d_array"));
        assert!(LIT_SHADER_SOURCE.contains("sampler_comparison"));
    }
}
