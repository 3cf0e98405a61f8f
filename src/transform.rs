//! Eye and projection transforms in effect during traversal.
//!
//! The [`TransformStack`] holds the world-to-eye transform of the current
//! camera and the fixed eye-to-image projection. It does not keep a stack of
//! model matrices itself: the traversal that drives the pipeline owns push
//! and pop, and calls [`TransformStack::enter`] to compose the model
//! transform of each primitive with the eye transform.

use crate::camera::Camera;
use crate::math::mat4::Mat4;
use crate::math::vec3::Vec3;
use crate::math::vec4::Vec4;
use crate::projection::Projection;

#[derive(Debug, Clone)]
pub struct TransformStack {
    eye: Mat4,
    projection: Projection,
    projection_matrix: Mat4,
}

impl Default for TransformStack {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl TransformStack {
    /// Creates a stack for a viewport with the given aspect ratio, using the
    /// default camera.
    pub fn new(aspect_ratio: f32) -> Self {
        let camera = Camera::default();
        let projection = Projection::from_camera(&camera, aspect_ratio);
        Self {
            eye: camera.view_matrix(),
            projection,
            projection_matrix: projection.matrix(),
        }
    }

    /// Composes a model transform with the current eye transform.
    ///
    /// The result maps model coordinates straight to eye space: the model
    /// transform is applied first.
    pub fn enter(&self, model: &Mat4) -> Mat4 {
        self.eye * *model
    }

    /// Rebuilds the eye transform and projection from a camera.
    ///
    /// The camera is expected to have been validated.
    pub fn set_camera(&mut self, camera: &Camera) {
        self.eye = camera.view_matrix();
        self.projection = Projection::from_camera(camera, self.projection.aspect_ratio());
        self.projection_matrix = self.projection.matrix();
    }

    pub fn set_aspect_ratio(&mut self, aspect_ratio: f32) {
        self.projection.set_aspect_ratio(aspect_ratio);
        self.projection_matrix = self.projection.matrix();
    }

    /// Projects one eye-space point to image space (normalized device
    /// coordinates, x and y in [-1, 1] when visible).
    pub fn project_point(&self, eye_point: Vec3) -> Vec3 {
        (self.projection_matrix * Vec4::point(eye_point)).perspective_divide()
    }

    /// Projects eye-space points into `out`, replacing its contents.
    pub fn project(&self, eye_points: &[Vec3], out: &mut Vec<Vec3>) {
        out.clear();
        out.extend(eye_points.iter().map(|p| self.project_point(*p)));
    }

    pub fn eye(&self) -> &Mat4 {
        &self.eye
    }

    pub fn projection(&self) -> &Projection {
        &self.projection
    }

    pub fn projection_matrix(&self) -> &Mat4 {
        &self.projection_matrix
    }

    /// Eye-space z of the near clip plane.
    pub fn hither(&self) -> f32 {
        self.projection.hither()
    }

    /// Eye-space z of the far clip plane.
    pub fn yon(&self) -> f32 {
        self.projection.yon()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn stack_for(camera: &Camera) -> TransformStack {
        let mut stack = TransformStack::new(1.0);
        stack.set_camera(camera);
        stack
    }

    #[test]
    fn enter_applies_model_then_eye() {
        let stack = stack_for(&Camera::looking_at(
            Vec3::new(0.0, 0.0, 10.0),
            Vec3::ZERO,
            Vec3::Y,
        ));
        let composed = stack.enter(&Mat4::translation(0.0, 0.0, 2.0));
        let p = composed.transform_point(Vec3::ZERO);
        assert_relative_eq!(p.z, -8.0, epsilon = 1e-5);
    }

    #[test]
    fn set_camera_fixes_clip_planes() {
        let camera = Camera::default().with_clip(-1.0, -50.0);
        let stack = stack_for(&camera);
        assert_eq!(stack.hither(), -1.0);
        assert_eq!(stack.yon(), -50.0);
    }

    #[test]
    fn point_on_axis_projects_to_center() {
        let stack = stack_for(&Camera::default());
        let p = stack.project_point(Vec3::new(0.0, 0.0, -10.0));
        assert_relative_eq!(p.x, 0.0, epsilon = 1e-6);
        assert_relative_eq!(p.y, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn point_on_fov_edge_projects_to_unit() {
        let camera = Camera::default().with_fov(90.0);
        let stack = stack_for(&camera);
        // tan(45deg) = 1, so y == -z lies on the top edge of the view.
        let p = stack.project_point(Vec3::new(0.0, 5.0, -5.0));
        assert_relative_eq!(p.y, 1.0, epsilon = 1e-5);
    }

    #[test]
    fn eye_plane_point_stays_finite() {
        let stack = stack_for(&Camera::default());
        let mut out = Vec::new();
        stack.project(&[Vec3::new(1.0, 1.0, 0.0)], &mut out);
        assert_eq!(out.len(), 1);
        assert!(out[0].x.is_finite() && out[0].y.is_finite() && out[0].z.is_finite());
    }
}
