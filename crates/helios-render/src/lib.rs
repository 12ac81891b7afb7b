//! wgpu rendering for the Helios viewer: GPU context and surface management,
//! the perspective camera, mesh buffers, and the four pipelines (lit
//! Phong + shadows, unlit, starfield point sprites, depth-only shadow).

pub mod camera;
pub mod depth;
pub mod gpu;
pub mod lit_pipeline;
pub mod mesh;
pub mod pipeline;
pub mod shadow;
pub mod starfield_pipeline;
pub mod surface;

pub use camera::{Camera, CameraUniform};
pub use depth::DepthBuffer;
pub use gpu::{RenderContext, RenderContextError, SurfaceError, init_render_context_blocking};
pub use lit_pipeline::{LIT_SHADER_SOURCE, LitPipeline, draw_lit};
pub use mesh::{BufferAllocator, MeshBuffer, VertexPositionNormal};
pub use pipeline::{ModelUniform, UNLIT_SHADER_SOURCE, UnlitPipeline, draw_unlit};
pub use shadow::{
    SHADOW_FACE_COUNT, SHADOW_SHADER_SOURCE, ShadowMap, ShadowPipeline, ShadowUniform,
    point_shadow_face_matrices, render_shadow_faces, shadow_uniform,
};
pub use starfield_pipeline::{
    STARFIELD_SHADER_SOURCE, StarfieldBuffers, StarfieldPipeline, StarfieldUniform, draw_starfield,
};
pub use surface::{PhysicalSize, SurfaceResizeEvent, SurfaceWrapper};
