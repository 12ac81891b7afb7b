//! Pointer-driven orbit camera controller with inertial damping.
//!
//! Maps drag/scroll gestures onto a spherical orbit around a target point:
//! left-drag rotates, right-drag pans, the wheel zooms. Rotation and pan are
//! integrated with exponential damping each simulation tick, so the camera
//! keeps gliding briefly after the pointer stops.

use glam::{Vec2, Vec3};
use helios_config::CameraConfig;
use winit::event::MouseButton;

use crate::MouseState;

/// Radians of rotation per pixel of drag.
const ROTATE_SPEED: f32 = 0.005;

/// Pan speed in scene units per pixel, scaled by orbit distance.
const PAN_SPEED: f32 = 0.001;

/// Zoom scale applied per scroll line (wheel up moves closer).
const ZOOM_SCALE_PER_LINE: f32 = 0.95;

/// Closest allowed orbit distance.
const MIN_DISTANCE: f32 = 1.0;

/// Farthest allowed orbit distance, kept inside the far clip plane.
const MAX_DISTANCE: f32 = 900.0;

/// Pitch limit just short of the poles to keep the view basis well-defined.
const MAX_PITCH: f32 = std::f32::consts::FRAC_PI_2 - 1e-3;

/// Orbit camera controller.
///
/// The camera position is derived from a target point, a yaw/pitch pair, and
/// an orbit distance. Gestures accumulate into delta terms; [`update`]
/// (Self::update) applies `delta * damping_factor` per tick and decays the
/// remainder, matching the damped behavior of classic orbit controls.
#[derive(Debug, Clone)]
pub struct OrbitController {
    target: Vec3,
    yaw: f32,
    pitch: f32,
    distance: f32,

    yaw_delta: f32,
    pitch_delta: f32,
    pan_offset: Vec3,
    zoom_scale: f32,

    damping_factor: f32,
    enable_rotate: bool,
    enable_pan: bool,
    enable_zoom: bool,
}

impl OrbitController {
    /// Create a controller orbiting `target` from `position`.
    pub fn new(position: Vec3, target: Vec3, config: &CameraConfig) -> Self {
        let offset = position - target;
        let distance = offset.length().max(MIN_DISTANCE);
        let yaw = offset.x.atan2(offset.z);
        let pitch = (offset.y / distance).asin().clamp(-MAX_PITCH, MAX_PITCH);

        Self {
            target,
            yaw,
            pitch,
            distance,
            yaw_delta: 0.0,
            pitch_delta: 0.0,
            pan_offset: Vec3::ZERO,
            zoom_scale: 1.0,
            damping_factor: config.damping_factor,
            enable_rotate: config.enable_rotate,
            enable_pan: config.enable_pan,
            enable_zoom: config.enable_zoom,
        }
    }

    /// Accumulate gesture input from the current mouse state.
    ///
    /// Call once per frame before [`update`](Self::update); transient deltas
    /// are read here and the caller clears them afterwards.
    pub fn handle_input(&mut self, mouse: &MouseState) {
        let delta = mouse.delta();

        if self.enable_rotate && mouse.is_button_pressed(MouseButton::Left) {
            self.rotate(delta);
        }
        if self.enable_pan && mouse.is_button_pressed(MouseButton::Right) {
            self.pan(delta);
        }
        if self.enable_zoom && mouse.scroll() != 0.0 {
            self.zoom(mouse.scroll());
        }
    }

    /// Accumulate a rotate gesture of `delta` pixels.
    pub fn rotate(&mut self, delta: Vec2) {
        self.yaw_delta -= delta.x * ROTATE_SPEED;
        self.pitch_delta += delta.y * ROTATE_SPEED;
    }

    /// Accumulate a pan gesture of `delta` pixels, translating the target in
    /// the camera plane.
    pub fn pan(&mut self, delta: Vec2) {
        let (sin_yaw, cos_yaw) = self.yaw.sin_cos();
        let right = Vec3::new(cos_yaw, 0.0, -sin_yaw);
        let forward = Vec3::new(sin_yaw, 0.0, cos_yaw);
        let up = forward.cross(right); // camera-plane up, horizon-locked

        let scale = PAN_SPEED * self.distance;
        self.pan_offset += (-delta.x * right + delta.y * up) * scale;
    }

    /// Accumulate a zoom gesture of `lines` scroll lines.
    pub fn zoom(&mut self, lines: f32) {
        self.zoom_scale *= ZOOM_SCALE_PER_LINE.powf(lines);
    }

    /// Advance the damping integration by one tick.
    ///
    /// Applies `damping_factor` of the pending rotation/pan deltas and decays
    /// the remainder; zoom is applied in full and reset.
    pub fn update(&mut self) {
        let k = self.damping_factor;

        self.yaw += self.yaw_delta * k;
        self.pitch = (self.pitch + self.pitch_delta * k).clamp(-MAX_PITCH, MAX_PITCH);
        self.target += self.pan_offset * k;

        self.yaw_delta *= 1.0 - k;
        self.pitch_delta *= 1.0 - k;
        self.pan_offset *= 1.0 - k;

        self.distance = (self.distance * self.zoom_scale).clamp(MIN_DISTANCE, MAX_DISTANCE);
        self.zoom_scale = 1.0;
    }

    /// Current camera position derived from target, yaw/pitch, and distance.
    pub fn position(&self) -> Vec3 {
        let (sin_yaw, cos_yaw) = self.yaw.sin_cos();
        let (sin_pitch, cos_pitch) = self.pitch.sin_cos();
        self.target
            + self.distance * Vec3::new(cos_pitch * sin_yaw, sin_pitch, cos_pitch * cos_yaw)
    }

    /// The point the camera orbits and looks at.
    pub fn target(&self) -> Vec3 {
        self.target
    }

    /// Current orbit distance.
    pub fn distance(&self) -> f32 {
        self.distance
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use winit::event::{ElementState, MouseScrollDelta};

    fn controller() -> OrbitController {
        OrbitController::new(
            Vec3::new(0.0, 50.0, 100.0),
            Vec3::ZERO,
            &CameraConfig::default(),
        )
    }

    #[test]
    fn test_initial_position_preserved() {
        let c = controller();
        let pos = c.position();
        assert!((pos - Vec3::new(0.0, 50.0, 100.0)).length() < 1e-3, "{pos}");
        assert_eq!(c.target(), Vec3::ZERO);
    }

    #[test]
    fn test_update_without_input_is_stable() {
        let mut c = controller();
        let before = c.position();
        for _ in 0..100 {
            c.update();
        }
        assert!((c.position() - before).length() < 1e-4);
    }

    #[test]
    fn test_rotate_changes_yaw_over_ticks() {
        let mut c = controller();
        let before = c.position();
        c.rotate(Vec2::new(120.0, 0.0));
        c.update();
        let after = c.position();
        assert!((after - before).length() > 1e-3);
        // Orbit preserves distance from target.
        assert!((after.length() - before.length()).abs() < 1e-3);
    }

    #[test]
    fn test_damping_converges() {
        let mut c = controller();
        c.rotate(Vec2::new(200.0, 50.0));
        // The pending delta decays geometrically; after many ticks the
        // camera must settle.
        for _ in 0..400 {
            c.update();
        }
        let settled = c.position();
        c.update();
        assert!((c.position() - settled).length() < 1e-4);
    }

    #[test]
    fn test_damped_motion_continues_after_input_stops() {
        let mut c = controller();
        c.rotate(Vec2::new(100.0, 0.0));
        c.update();
        let after_one = c.position();
        c.update();
        // Still gliding on the second tick with no further input.
        assert!((c.position() - after_one).length() > 1e-5);
    }

    #[test]
    fn test_zoom_moves_closer_and_clamps() {
        let mut c = controller();
        let start = c.distance();
        c.zoom(2.0);
        c.update();
        assert!(c.distance() < start);

        // Massive zoom-in clamps at the minimum distance.
        c.zoom(1000.0);
        c.update();
        assert_eq!(c.distance(), 1.0);
    }

    #[test]
    fn test_pitch_clamped_at_poles() {
        let mut c = controller();
        for _ in 0..100 {
            c.rotate(Vec2::new(0.0, 500.0));
            c.update();
        }
        let pos = c.position();
        // Never flips past the pole.
        assert!(pos.y <= c.distance() + 1e-3);
        for _ in 0..100 {
            c.update();
        }
        assert!(c.position().is_finite());
    }

    #[test]
    fn test_pan_moves_target() {
        let mut c = controller();
        c.pan(Vec2::new(50.0, 0.0));
        for _ in 0..50 {
            c.update();
        }
        assert!(c.target().length() > 1e-3);
    }

    #[test]
    fn test_handle_input_respects_disabled_rotate() {
        let mut config = CameraConfig::default();
        config.enable_rotate = false;
        let mut c = OrbitController::new(Vec3::new(0.0, 50.0, 100.0), Vec3::ZERO, &config);

        let mut mouse = MouseState::new();
        mouse.on_button(MouseButton::Left, ElementState::Pressed);
        mouse.on_cursor_moved(100.0, 100.0);

        let before = c.position();
        c.handle_input(&mouse);
        c.update();
        assert!((c.position() - before).length() < 1e-5);
    }

    #[test]
    fn test_handle_input_routes_gestures() {
        let mut c = controller();
        let mut mouse = MouseState::new();
        mouse.on_button(MouseButton::Left, ElementState::Pressed);
        mouse.on_cursor_moved(40.0, 10.0);
        mouse.on_scroll(MouseScrollDelta::LineDelta(0.0, 1.0));

        let before = c.position();
        c.handle_input(&mouse);
        c.update();
        assert!((c.position() - before).length() > 1e-4);
        assert!(c.distance() < 111.9);
    }
}
