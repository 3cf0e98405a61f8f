//! Camera description.
//!
//! # Coordinate System
//!
//! World and eye space are **right-handed**. The eye looks from `lookfrom`
//! toward `lookat`; in eye space that direction is -Z, +X is right and +Y is
//! up. The clip planes `hither` and `yon` are given as eye-space z values,
//! so both are negative and `yon < hither < 0`.

use crate::color::Rgba;
use crate::error::RenderError;
use crate::math::mat4::Mat4;
use crate::math::vec3::Vec3;

#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    pub lookfrom: Vec3,
    pub lookat: Vec3,
    pub up: Vec3,
    /// Vertical field of view in degrees.
    pub fov: f32,
    /// Eye-space z of the near clip plane.
    pub hither: f32,
    /// Eye-space z of the far clip plane.
    pub yon: f32,
    pub background: Rgba,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            lookfrom: Vec3::new(0.0, 0.0, 10.0),
            lookat: Vec3::ZERO,
            up: Vec3::Y,
            fov: 45.0,
            hither: -0.1,
            yon: -100.0,
            background: Rgba::BLACK,
        }
    }
}

impl Camera {
    /// Creates a camera at `lookfrom` looking toward `lookat`, with default
    /// field of view, clip planes and background.
    pub fn looking_at(lookfrom: Vec3, lookat: Vec3, up: Vec3) -> Self {
        Self {
            lookfrom,
            lookat,
            up,
            ..Self::default()
        }
    }

    pub fn with_fov(mut self, fov: f32) -> Self {
        self.fov = fov;
        self
    }

    pub fn with_clip(mut self, hither: f32, yon: f32) -> Self {
        self.hither = hither;
        self.yon = yon;
        self
    }

    pub fn with_background(mut self, background: Rgba) -> Self {
        self.background = background;
        self
    }

    /// Checks that the camera can produce a finite projection.
    pub fn validate(&self) -> Result<(), RenderError> {
        if !(self.fov > 0.0 && self.fov < 180.0) {
            return Err(RenderError::InvalidCamera(format!(
                "field of view {} must lie in (0, 180) degrees",
                self.fov
            )));
        }
        if !(self.hither < 0.0) {
            return Err(RenderError::InvalidCamera(format!(
                "hither {} must be negative",
                self.hither
            )));
        }
        if !(self.yon < self.hither) {
            return Err(RenderError::InvalidCamera(format!(
                "yon {} must lie beyond hither {}",
                self.yon, self.hither
            )));
        }
        Ok(())
    }

    /// World-to-eye transform.
    ///
    /// When the orientation is degenerate (`lookfrom == lookat`, or `up`
    /// parallel to the viewing direction) the rotation is replaced by the
    /// identity and only the translation to `lookfrom` is kept.
    pub fn view_matrix(&self) -> Mat4 {
        match Mat4::look_at_rh(self.lookfrom, self.lookat, self.up) {
            Some(view) => view,
            None => {
                log::warn!(
                    "degenerate camera orientation (from {:?}, at {:?}, up {:?}), using identity rotation",
                    self.lookfrom,
                    self.lookat,
                    self.up
                );
                Mat4::translation(-self.lookfrom.x, -self.lookfrom.y, -self.lookfrom.z)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn default_camera_is_valid() {
        assert!(Camera::default().validate().is_ok());
    }

    #[test]
    fn clip_planes_must_be_ordered() {
        let camera = Camera::default().with_clip(-10.0, -1.0);
        assert!(matches!(camera.validate(), Err(RenderError::InvalidCamera(_))));

        let camera = Camera::default().with_clip(1.0, -50.0);
        assert!(camera.validate().is_err());
    }

    #[test]
    fn fov_must_be_open_interval() {
        assert!(Camera::default().with_fov(0.0).validate().is_err());
        assert!(Camera::default().with_fov(180.0).validate().is_err());
    }

    #[test]
    fn parallel_up_falls_back_to_translation() {
        let camera = Camera::looking_at(Vec3::new(0.0, 5.0, 0.0), Vec3::ZERO, Vec3::Y);
        let view = camera.view_matrix();
        let p = view.transform_point(Vec3::ZERO);
        assert_relative_eq!(p.y, -5.0, epsilon = 1e-6);
        assert!(p.x.is_finite() && p.z.is_finite());
    }
}
