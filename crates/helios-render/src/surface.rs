//! Cross-platform surface dimension tracking.
//!
//! Normalizes platform resize behavior (Wayland zero-size windows, macOS
//! Retina scaling, Windows DPI changes) into one consistent physical-pixel
//! API for surface configuration and camera aspect updates.

/// Minimum surface dimension (prevents zero-size panics).
pub const MIN_SURFACE_DIMENSION: u32 = 1;

/// Physical pixel dimensions of a surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PhysicalSize {
    /// Width in physical pixels.
    pub width: u32,
    /// Height in physical pixels.
    pub height: u32,
}

impl PhysicalSize {
    /// Width / height, for perspective projection.
    pub fn aspect_ratio(&self) -> f32 {
        self.width as f32 / self.height as f32
    }
}

/// Event produced when the surface dimensions or scale factor change.
#[derive(Clone, Copy, Debug)]
pub struct SurfaceResizeEvent {
    /// New physical pixel dimensions.
    pub physical: PhysicalSize,
    /// Current scale factor.
    pub scale_factor: f64,
}

/// Tracks the surface's physical dimensions and scale factor.
///
/// Always reports physical pixel dimensions for GPU surface configuration.
/// Zero-size surfaces (common on Wayland) are clamped to 1×1 to prevent panics.
pub struct SurfaceWrapper {
    /// Current physical pixel width (clamped to >= 1).
    physical_width: u32,
    /// Current physical pixel height (clamped to >= 1).
    physical_height: u32,
    /// Current scale factor (physical pixels per logical pixel).
    scale_factor: f64,
}

impl SurfaceWrapper {
    /// Creates a new `SurfaceWrapper` from initial physical dimensions and
    /// scale factor. Zero dimensions are clamped to 1.
    pub fn new(physical_width: u32, physical_height: u32, scale_factor: f64) -> Self {
        Self {
            physical_width: physical_width.max(MIN_SURFACE_DIMENSION),
            physical_height: physical_height.max(MIN_SURFACE_DIMENSION),
            scale_factor,
        }
    }

    /// Handle a window resize event. Returns a resize event if the surface
    /// dimensions actually changed.
    ///
    /// Dimensions are clamped to a minimum of 1×1 to prevent wgpu panics.
    pub fn handle_resize(
        &mut self,
        physical_width: u32,
        physical_height: u32,
    ) -> Option<SurfaceResizeEvent> {
        let width = physical_width.max(MIN_SURFACE_DIMENSION);
        let height = physical_height.max(MIN_SURFACE_DIMENSION);

        if width == self.physical_width && height == self.physical_height {
            return None;
        }

        self.physical_width = width;
        self.physical_height = height;

        Some(SurfaceResizeEvent {
            physical: PhysicalSize { width, height },
            scale_factor: self.scale_factor,
        })
    }

    /// Handle a scale factor change event. Returns a resize event because
    /// the physical dimensions change even if the logical size stays the same.
    pub fn handle_scale_factor_changed(
        &mut self,
        new_scale_factor: f64,
        new_physical_width: u32,
        new_physical_height: u32,
    ) -> Option<SurfaceResizeEvent> {
        self.scale_factor = new_scale_factor;
        self.handle_resize(new_physical_width, new_physical_height)
    }

    /// Get the current physical pixel dimensions for surface configuration.
    pub fn physical_size(&self) -> PhysicalSize {
        PhysicalSize {
            width: self.physical_width,
            height: self.physical_height,
        }
    }

    /// Get the current scale factor.
    pub fn scale_factor(&self) -> f64 {
        self.scale_factor
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_size_surface_clamped() {
        let mut wrapper = SurfaceWrapper::new(0, 0, 1.0);
        let size = wrapper.physical_size();
        assert_eq!(size, PhysicalSize { width: 1, height: 1 });

        // First real resize from the compositor produces an event.
        let event = wrapper.handle_resize(1920, 1080).unwrap();
        assert_eq!(event.physical.width, 1920);
        assert_eq!(event.physical.height, 1080);
    }

    #[test]
    fn test_no_event_on_same_dimensions() {
        let mut wrapper = SurfaceWrapper::new(1920, 1080, 1.0);
        assert!(wrapper.handle_resize(1920, 1080).is_none());
    }

    #[test]
    fn test_resize_to_zero_clamped_to_one() {
        let mut wrapper = SurfaceWrapper::new(800, 600, 1.0);
        let event = wrapper.handle_resize(0, 0);
        assert!(event.is_some());
        assert_eq!(wrapper.physical_size(), PhysicalSize { width: 1, height: 1 });
    }

    #[test]
    fn test_scale_factor_change_updates_physical_size() {
        let mut wrapper = SurfaceWrapper::new(1920, 1080, 1.0);
        let event = wrapper
            .handle_scale_factor_changed(2.0, 3840, 2160)
            .unwrap();
        assert_eq!(event.physical.width, 3840);
        assert_eq!(event.scale_factor, 2.0);
        assert_eq!(wrapper.scale_factor(), 2.0);
    }

    #[test]
    fn test_aspect_ratio() {
        let size = PhysicalSize {
            width: 1920,
            height: 1080,
        };
        assert!((size.aspect_ratio() - 16.0 / 9.0).abs() < 1e-6);
    }

    #[test]
    fn test_successive_resizes_produce_correct_state() {
        let mut wrapper = SurfaceWrapper::new(800, 600, 1.0);
        wrapper.handle_resize(1024, 768);
        assert_eq!(
            wrapper.physical_size(),
            PhysicalSize {
                width: 1024,
                height: 768
            }
        );
        wrapper.handle_resize(1920, 1080);
        assert_eq!(
            wrapper.physical_size(),
            PhysicalSize {
                width: 1920,
                height: 1080
            }
        );
    }
}
