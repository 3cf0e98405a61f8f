//! Perspective projection parameters.
//!
//! The [`Projection`] struct is the single source of truth for the eye-to-image
//! projection: field of view, aspect ratio and the hither/yon planes. It
//! generates the projection matrix and supplies the clip-plane depths the
//! clipper works with.

use crate::camera::Camera;
use crate::math::mat4::Mat4;

/// Perspective projection parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    /// Vertical field of view in radians.
    fov_y: f32,
    /// Aspect ratio (width / height).
    aspect_ratio: f32,
    /// Eye-space z of the near plane (negative).
    hither: f32,
    /// Eye-space z of the far plane (negative, beyond `hither`).
    yon: f32,
}

impl Default for Projection {
    fn default() -> Self {
        Self::from_camera(&Camera::default(), 1.0)
    }
}

impl Projection {
    /// Creates a new projection.
    ///
    /// # Arguments
    /// * `fov_y` - Vertical field of view in radians
    /// * `aspect_ratio` - Width divided by height
    /// * `hither` - Near plane as an eye-space z (must be < 0)
    /// * `yon` - Far plane as an eye-space z (must be < `hither`)
    pub fn new(fov_y: f32, aspect_ratio: f32, hither: f32, yon: f32) -> Self {
        Self {
            fov_y,
            aspect_ratio,
            hither,
            yon,
        }
    }

    /// Builds the projection a camera describes for a viewport aspect ratio.
    pub fn from_camera(camera: &Camera, aspect_ratio: f32) -> Self {
        Self::new(camera.fov.to_radians(), aspect_ratio, camera.hither, camera.yon)
    }

    /// Returns the vertical field of view in radians.
    pub fn fov_y(&self) -> f32 {
        self.fov_y
    }

    /// Returns the horizontal field of view in radians.
    pub fn fov_x(&self) -> f32 {
        2.0 * (self.aspect_ratio * (self.fov_y / 2.0).tan()).atan()
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.aspect_ratio
    }

    pub fn hither(&self) -> f32 {
        self.hither
    }

    pub fn yon(&self) -> f32 {
        self.yon
    }

    /// Updates the aspect ratio (typically called on viewport resize).
    pub fn set_aspect_ratio(&mut self, aspect_ratio: f32) {
        self.aspect_ratio = aspect_ratio;
    }

    /// Generates the right-handed perspective projection matrix.
    pub fn matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, self.aspect_ratio, -self.hither, -self.yon)
    }
}
