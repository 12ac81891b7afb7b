//! Window creation, event handling, and frame orchestration via winit.
//!
//! [`AppState`] implements winit's [`ApplicationHandler`]: it owns the scene
//! state, the orbit controller, and all GPU resources, and drives the
//! simulate-then-render cycle from `RedrawRequested`, requesting the next
//! redraw at the end of each frame.

use std::sync::Arc;

use glam::{Mat4, Vec3};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{error, info, warn};
use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::window::{Fullscreen, Window, WindowAttributes, WindowId};

use helios_config::Config;
use helios_input::{MouseState, OrbitController};
use helios_render::{
    Camera, LIT_SHADER_SOURCE, LitPipeline, MeshBuffer, ModelUniform, PhysicalSize, RenderContext,
    SHADOW_FACE_COUNT, SHADOW_SHADER_SOURCE, STARFIELD_SHADER_SOURCE, ShadowMap, ShadowPipeline,
    StarfieldBuffers, StarfieldPipeline, StarfieldUniform, SurfaceWrapper, UNLIT_SHADER_SOURCE,
    UnlitPipeline, draw_lit, draw_starfield, draw_unlit, init_render_context_blocking,
    point_shadow_face_matrices, render_shadow_faces, shadow_uniform,
};
use helios_render::{DepthBuffer, SurfaceError};
use helios_scene::{
    LightRig, PLANETS, SPHERE_SEGMENTS, SUN_COLOR, SUN_RADIUS, SceneError, SolarSystem,
    StarfieldGenerator, orbit_ring, uv_sphere,
};

/// Opacity of the orbit guide rings.
const RING_OPACITY: f32 = 0.3;

/// Errors surfaced by the application entry point.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Scene construction failed (invalid body configuration).
    #[error(transparent)]
    Scene(#[from] SceneError),

    /// The winit event loop could not be created or exited abnormally.
    #[error("event loop error: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),
}

/// Returns [`WindowAttributes`] based on the given configuration.
pub fn window_attributes_from_config(config: &Config) -> WindowAttributes {
    let mut attrs = WindowAttributes::default()
        .with_title(config.window.title.clone())
        .with_inner_size(winit::dpi::LogicalSize::new(
            config.window.width as f64,
            config.window.height as f64,
        ));
    if config.window.fullscreen {
        attrs = attrs.with_fullscreen(Some(Fullscreen::Borderless(None)));
    }
    attrs
}

/// A uniform buffer paired with the bind groups that reference it.
struct ModelSlot {
    buffer: wgpu::Buffer,
    /// Bind group for the main pass (lit or unlit, depending on drawable).
    bind_group: wgpu::BindGroup,
    /// Bind group for the shadow pass (casters only).
    shadow_bind_group: Option<wgpu::BindGroup>,
}

/// All GPU resources for drawing the scene: pipelines, meshes, uniforms.
struct SceneRenderer {
    depth_buffer: DepthBuffer,

    lit_pipeline: LitPipeline,
    unlit_pipeline: UnlitPipeline,
    starfield_pipeline: StarfieldPipeline,
    shadow_pipeline: ShadowPipeline,
    shadow_map: ShadowMap,

    camera_buffer: wgpu::Buffer,
    lit_camera_bind_group: wgpu::BindGroup,
    unlit_camera_bind_group: wgpu::BindGroup,

    light_bind_group: wgpu::BindGroup,
    shadow_bind_group: wgpu::BindGroup,
    face_bind_groups: [wgpu::BindGroup; SHADOW_FACE_COUNT],

    starfield_buffers: StarfieldBuffers,
    starfield_uniform_buffer: wgpu::Buffer,
    starfield_bind_group: wgpu::BindGroup,

    /// Shared unit sphere, scaled per drawable by its model matrix.
    sphere_mesh: MeshBuffer,
    /// One annulus per planet, generated at its orbital distance.
    ring_meshes: Vec<MeshBuffer>,

    sun_slot: ModelSlot,
    planet_slots: Vec<ModelSlot>,
    ring_slots: Vec<ModelSlot>,
}

impl SceneRenderer {
    /// Build every pipeline, mesh, and uniform for the configured scene.
    fn new(
        ctx: &RenderContext,
        config: &Config,
        system: &SolarSystem,
        light_rig: &LightRig,
        stars: &[Vec3],
    ) -> Self {
        let device = &ctx.device;
        let allocator = helios_render::BufferAllocator::new(device);

        let shader = |label: &str, source: &str| {
            device.create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some(label),
                source: wgpu::ShaderSource::Wgsl(source.into()),
            })
        };
        let lit_shader = shader("lit-shader", LIT_SHADER_SOURCE);
        let unlit_shader = shader("unlit-shader", UNLIT_SHADER_SOURCE);
        let starfield_shader = shader("starfield-shader", STARFIELD_SHADER_SOURCE);
        let shadow_shader = shader("shadow-shader", SHADOW_SHADER_SOURCE);

        let depth_format = Some(DepthBuffer::FORMAT);
        let lit_pipeline = LitPipeline::new(device, &lit_shader, ctx.surface_format, depth_format);
        let unlit_pipeline =
            UnlitPipeline::new(device, &unlit_shader, ctx.surface_format, depth_format);
        let starfield_pipeline =
            StarfieldPipeline::new(device, &starfield_shader, ctx.surface_format, depth_format);
        let shadow_pipeline = ShadowPipeline::new(device, &shadow_shader);

        let depth_buffer = DepthBuffer::new(
            device,
            ctx.surface_config.width,
            ctx.surface_config.height,
        );
        let shadow_map = ShadowMap::new(device, config.render.shadow_map_size);

        let uniform_bind_group = |label: &str,
                                  layout: &wgpu::BindGroupLayout,
                                  buffer: &wgpu::Buffer| {
            device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some(label),
                layout,
                entries: &[wgpu::BindGroupEntry {
                    binding: 0,
                    resource: buffer.as_entire_binding(),
                }],
            })
        };

        // Camera: one buffer shared by the lit and unlit pipelines.
        let camera_buffer = allocator.create_uniform_buffer(
            "camera-uniform",
            &helios_render::CameraUniform {
                view_proj: Mat4::IDENTITY.to_cols_array_2d(),
                camera_pos: [0.0; 4],
            },
        );
        let lit_camera_bind_group = uniform_bind_group(
            "lit-camera-bg",
            &lit_pipeline.camera_bind_group_layout,
            &camera_buffer,
        );
        let unlit_camera_bind_group = uniform_bind_group(
            "unlit-camera-bg",
            &unlit_pipeline.camera_bind_group_layout,
            &camera_buffer,
        );

        // Light rig: static for the process lifetime.
        let light_buffer = allocator.create_uniform_buffer("light-uniform", &light_rig.to_uniform());
        let light_bind_group = uniform_bind_group(
            "lit-light-bg",
            &lit_pipeline.light_bind_group_layout,
            &light_buffer,
        );

        // Shadow faces: the light never moves, so the matrices are static too.
        let face_matrices =
            point_shadow_face_matrices(light_rig.point.position, light_rig.point.range);
        let shadow_uniform_buffer =
            allocator.create_uniform_buffer("shadow-uniform", &shadow_uniform(&face_matrices));
        let shadow_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("lit-shadow-bg"),
            layout: &lit_pipeline.shadow_bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: shadow_uniform_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&shadow_map.array_view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&shadow_map.sampler),
                },
            ],
        });
        let face_bind_groups: [wgpu::BindGroup; SHADOW_FACE_COUNT] = std::array::from_fn(|i| {
            let buffer = allocator.create_uniform_buffer(
                &format!("shadow-face-{i}"),
                &face_matrices[i].to_cols_array_2d(),
            );
            uniform_bind_group(
                &format!("shadow-face-bg-{i}"),
                &shadow_pipeline.face_bind_group_layout,
                &buffer,
            )
        });

        // Starfield.
        let starfield_buffers = StarfieldBuffers::new(device, stars);
        let starfield_uniform_buffer = allocator.create_uniform_buffer(
            "starfield-uniform",
            &StarfieldUniform {
                view_proj: Mat4::IDENTITY.to_cols_array_2d(),
                viewport_size: [1.0, 1.0],
                size_px: config.render.star_size_px,
                _pad: 0.0,
            },
        );
        let starfield_bind_group = uniform_bind_group(
            "starfield-bg",
            &starfield_pipeline.uniform_bind_group_layout,
            &starfield_uniform_buffer,
        );

        // Meshes: one shared unit sphere, one ring per planet.
        let sphere_mesh = allocator.create_mesh("sphere", &uv_sphere(1.0, SPHERE_SEGMENTS));
        let ring_meshes = system
            .bodies
            .iter()
            .map(|body| {
                allocator.create_mesh(
                    &format!("orbit-{}", body.config.name),
                    &orbit_ring(body.config.orbital_distance),
                )
            })
            .collect();

        // The sun ignores the light rig: unlit, flat emissive color.
        let sun_buffer = allocator.create_uniform_buffer(
            "sun-model",
            &ModelUniform::new(Mat4::from_scale(Vec3::splat(SUN_RADIUS)), SUN_COLOR, 1.0),
        );
        let sun_slot = ModelSlot {
            bind_group: uniform_bind_group(
                "sun-model-bg",
                &unlit_pipeline.model_bind_group_layout,
                &sun_buffer,
            ),
            shadow_bind_group: None,
            buffer: sun_buffer,
        };

        // Planets are lit and cast shadows: one buffer, two bind groups.
        let planet_slots = system
            .bodies
            .iter()
            .map(|body| {
                let name = body.config.name;
                let buffer = allocator.create_uniform_buffer(
                    &format!("{name}-model"),
                    &ModelUniform::new(
                        Mat4::from_translation(body.position())
                            * Mat4::from_scale(Vec3::splat(body.config.radius)),
                        body.config.color,
                        1.0,
                    ),
                );
                ModelSlot {
                    bind_group: uniform_bind_group(
                        &format!("{name}-model-bg"),
                        &lit_pipeline.model_bind_group_layout,
                        &buffer,
                    ),
                    shadow_bind_group: Some(uniform_bind_group(
                        &format!("{name}-shadow-bg"),
                        &shadow_pipeline.model_bind_group_layout,
                        &buffer,
                    )),
                    buffer,
                }
            })
            .collect();

        // Orbit rings are static: white, semi-transparent, identity transform.
        let ring_slots = system
            .bodies
            .iter()
            .map(|body| {
                let buffer = allocator.create_uniform_buffer(
                    &format!("{}-ring-model", body.config.name),
                    &ModelUniform::new(Mat4::IDENTITY, [1.0, 1.0, 1.0], RING_OPACITY),
                );
                ModelSlot {
                    bind_group: uniform_bind_group(
                        &format!("{}-ring-bg", body.config.name),
                        &unlit_pipeline.model_bind_group_layout,
                        &buffer,
                    ),
                    shadow_bind_group: None,
                    buffer,
                }
            })
            .collect();

        Self {
            depth_buffer,
            lit_pipeline,
            unlit_pipeline,
            starfield_pipeline,
            shadow_pipeline,
            shadow_map,
            camera_buffer,
            lit_camera_bind_group,
            unlit_camera_bind_group,
            light_bind_group,
            shadow_bind_group,
            face_bind_groups,
            starfield_buffers,
            starfield_uniform_buffer,
            starfield_bind_group,
            sphere_mesh,
            ring_meshes,
            sun_slot,
            planet_slots,
            ring_slots,
        }
    }

    /// Resize the depth buffer after a surface resize.
    fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        self.depth_buffer.resize(device, width, height);
    }

    /// Upload the per-frame uniforms: camera, starfield, and every moving
    /// body's model transform.
    fn update_uniforms(
        &self,
        queue: &wgpu::Queue,
        camera: &Camera,
        system: &SolarSystem,
        viewport: PhysicalSize,
        star_size_px: f32,
    ) {
        queue.write_buffer(
            &self.camera_buffer,
            0,
            bytemuck::bytes_of(&camera.to_uniform()),
        );

        queue.write_buffer(
            &self.starfield_uniform_buffer,
            0,
            bytemuck::bytes_of(&StarfieldUniform {
                view_proj: camera.view_projection_matrix().to_cols_array_2d(),
                viewport_size: [viewport.width as f32, viewport.height as f32],
                size_px: star_size_px,
                _pad: 0.0,
            }),
        );

        let sun_model = Mat4::from_rotation_y(system.sun_spin)
            * Mat4::from_scale(Vec3::splat(SUN_RADIUS));
        queue.write_buffer(
            &self.sun_slot.buffer,
            0,
            bytemuck::bytes_of(&ModelUniform::new(sun_model, SUN_COLOR, 1.0)),
        );

        for (body, slot) in system.bodies.iter().zip(&self.planet_slots) {
            let model = Mat4::from_translation(body.position())
                * Mat4::from_rotation_y(body.spin_angle)
                * Mat4::from_scale(Vec3::splat(body.config.radius));
            queue.write_buffer(
                &slot.buffer,
                0,
                bytemuck::bytes_of(&ModelUniform::new(model, body.config.color, 1.0)),
            );
        }
    }

    /// Render one frame: the shadow cube faces, then the main pass.
    fn render(&self, ctx: &RenderContext) -> Result<(), SurfaceError> {
        let frame = ctx.get_current_texture()?;
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("frame-encoder"),
            });

        // Shadow pass: planets are the only casters; the sun is the light
        // source and the rings are overlay geometry.
        let casters: Vec<(&wgpu::BindGroup, &MeshBuffer)> = self
            .planet_slots
            .iter()
            .filter_map(|slot| slot.shadow_bind_group.as_ref())
            .map(|bg| (bg, &self.sphere_mesh))
            .collect();
        render_shadow_faces(
            &mut encoder,
            &self.shadow_pipeline,
            &self.shadow_map,
            &self.face_bind_groups,
            &casters,
        );

        // Main pass over black space.
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("main-pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_buffer.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(DepthBuffer::CLEAR_VALUE),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            draw_starfield(
                &mut pass,
                &self.starfield_pipeline,
                &self.starfield_bind_group,
                &self.starfield_buffers,
            );

            draw_unlit(
                &mut pass,
                &self.unlit_pipeline,
                &self.unlit_camera_bind_group,
                &self.sun_slot.bind_group,
                &self.sphere_mesh,
            );

            for slot in &self.planet_slots {
                draw_lit(
                    &mut pass,
                    &self.lit_pipeline,
                    &self.lit_camera_bind_group,
                    &self.light_bind_group,
                    &self.shadow_bind_group,
                    &slot.bind_group,
                    &self.sphere_mesh,
                );
            }

            // Transparent rings last so they blend over the planets.
            for (slot, mesh) in self.ring_slots.iter().zip(&self.ring_meshes) {
                draw_unlit(
                    &mut pass,
                    &self.unlit_pipeline,
                    &self.unlit_camera_bind_group,
                    &slot.bind_group,
                    mesh,
                );
            }
        }

        ctx.queue.submit(std::iter::once(encoder.finish()));
        frame.present();
        Ok(())
    }
}

/// Application state: scene, camera, input, and GPU resources.
pub struct AppState {
    config: Config,
    window: Option<Arc<Window>>,
    gpu: Option<RenderContext>,
    renderer: Option<SceneRenderer>,
    surface_wrapper: SurfaceWrapper,
    frame_clock: crate::frame_clock::FrameClock,

    system: SolarSystem,
    light_rig: LightRig,
    stars: Vec<Vec3>,
    camera: Camera,
    controller: OrbitController,
    mouse_state: MouseState,
}

impl AppState {
    /// Build the scene state from configuration. GPU resources are created
    /// later, when the event loop delivers the window.
    pub fn new(config: Config) -> Result<Self, SceneError> {
        let mut rng = ChaCha8Rng::seed_from_u64(config.scene.seed);
        let system = SolarSystem::new(&PLANETS, &mut rng)?;
        let stars =
            StarfieldGenerator::new(config.scene.seed, config.scene.star_count).generate();

        let camera = Camera {
            fov_y: config.camera.fov_degrees.to_radians(),
            near: config.camera.near,
            far: config.camera.far,
            ..Camera::default()
        };
        let controller = OrbitController::new(camera.position, camera.target, &config.camera);

        Ok(Self {
            config,
            window: None,
            gpu: None,
            renderer: None,
            surface_wrapper: SurfaceWrapper::new(1, 1, 1.0),
            frame_clock: crate::frame_clock::FrameClock::new(),
            system,
            light_rig: LightRig::default(),
            stars,
            camera,
            controller,
            mouse_state: MouseState::new(),
        })
    }

    /// Apply a surface resize to the GPU surface, depth buffer, and camera.
    fn apply_resize(&mut self, width: u32, height: u32, scale_factor: f64) {
        self.camera.set_aspect_ratio(width as f32, height as f32);

        if let Some(gpu) = &mut self.gpu {
            gpu.resize(width, height);
            if let Some(renderer) = &mut self.renderer {
                renderer.resize(&gpu.device, width, height);
            }
        }

        info!(
            "Window resized to {}x{} (scale: {:.2})",
            width, height, scale_factor
        );
    }
}

impl ApplicationHandler for AppState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() {
            let attrs = window_attributes_from_config(&self.config);
            let window = match event_loop.create_window(attrs) {
                Ok(window) => Arc::new(window),
                Err(e) => {
                    error!("Window creation failed: {e}");
                    event_loop.exit();
                    return;
                }
            };

            // Initialize the surface wrapper with actual window dimensions and scale
            let scale_factor = window.scale_factor();
            let inner_size = window.inner_size();
            self.surface_wrapper =
                SurfaceWrapper::new(inner_size.width, inner_size.height, scale_factor);
            self.camera
                .set_aspect_ratio(inner_size.width.max(1) as f32, inner_size.height.max(1) as f32);
            info!(
                "Surface initialized: {}x{} (scale: {:.2})",
                inner_size.width, inner_size.height, scale_factor
            );

            match init_render_context_blocking(window.clone(), self.config.window.vsync) {
                Ok(ctx) => {
                    self.renderer = Some(SceneRenderer::new(
                        &ctx,
                        &self.config,
                        &self.system,
                        &self.light_rig,
                        &self.stars,
                    ));
                    self.gpu = Some(ctx);
                }
                Err(e) => {
                    error!("GPU initialization failed: {e}");
                    event_loop.exit();
                    return;
                }
            }

            self.window = Some(window);
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                info!("Close requested, shutting down");
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                if let Some(resize) = self
                    .surface_wrapper
                    .handle_resize(new_size.width, new_size.height)
                {
                    self.apply_resize(
                        resize.physical.width,
                        resize.physical.height,
                        resize.scale_factor,
                    );
                }
            }
            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                // Get the new physical size from the window after the scale change
                if let Some(window) = &self.window {
                    let new_inner = window.inner_size();
                    if let Some(resize) = self.surface_wrapper.handle_scale_factor_changed(
                        scale_factor,
                        new_inner.width,
                        new_inner.height,
                    ) {
                        self.apply_resize(
                            resize.physical.width,
                            resize.physical.height,
                            resize.scale_factor,
                        );
                    }
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.mouse_state.on_cursor_moved(position.x, position.y);
            }
            WindowEvent::MouseInput { state, button, .. } => {
                self.mouse_state.on_button(button, state);
            }
            WindowEvent::MouseWheel { delta, .. } => {
                self.mouse_state.on_scroll(delta);
            }
            WindowEvent::CursorEntered { .. } => {
                self.mouse_state.on_cursor_entered();
            }
            WindowEvent::CursorLeft { .. } => {
                self.mouse_state.on_cursor_left();
            }
            WindowEvent::RedrawRequested => {
                // Gather this frame's gestures, then integrate them (and the
                // orbital motion) at the fixed tick rate.
                self.controller.handle_input(&self.mouse_state);

                let system = &mut self.system;
                let controller = &mut self.controller;
                self.frame_clock.advance(|| {
                    system.step();
                    controller.update();
                });

                self.camera.position = self.controller.position();
                self.camera.target = self.controller.target();

                let render_result = if let (Some(gpu), Some(renderer)) =
                    (&self.gpu, &self.renderer)
                {
                    renderer.update_uniforms(
                        &gpu.queue,
                        &self.camera,
                        &self.system,
                        self.surface_wrapper.physical_size(),
                        self.config.render.star_size_px,
                    );
                    Some(renderer.render(gpu))
                } else {
                    None
                };

                match render_result {
                    None | Some(Ok(())) => {}
                    Some(Err(SurfaceError::Lost)) => {
                        let size = self.surface_wrapper.physical_size();
                        if let Some(gpu) = &mut self.gpu {
                            gpu.resize(size.width, size.height);
                        }
                    }
                    Some(Err(SurfaceError::OutOfMemory)) => {
                        error!("GPU out of memory");
                        event_loop.exit();
                    }
                    Some(Err(SurfaceError::Timeout)) => {
                        warn!("Surface timeout, skipping frame");
                    }
                }

                // Clear per-frame transient input state after all systems have run.
                self.mouse_state.clear_transients();

                let max_frames = self.config.debug.max_frames;
                if max_frames > 0 && self.frame_clock.frame_count() >= max_frames {
                    info!("Reached {max_frames} frames, exiting");
                    event_loop.exit();
                    return;
                }

                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            _ => {}
        }
    }
}

/// Creates an event loop and runs the application with the given config.
///
/// This function blocks until the window is closed or `max_frames` is
/// reached.
pub fn run_with_config(config: Config) -> Result<(), AppError> {
    let event_loop = EventLoop::new()?;
    let mut app = AppState::new(config)?;
    event_loop.run_app(&mut app)?;
    Ok(())
}
