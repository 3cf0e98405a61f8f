//! 4D vector for homogeneous coordinates.

use super::vec3::Vec3;

/// Replacement for a zero homogeneous divisor.
///
/// Dividing by this keeps the result finite instead of producing infinities
/// or NaN for points lying exactly in the eye plane.
pub const DEGENERATE_DIVISOR: f32 = 1.0e6;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Vec4 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

impl Vec4 {
    pub const fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self { x, y, z, w }
    }

    /// Create a point (w=1) from a Vec3.
    pub const fn point(v: Vec3) -> Self {
        Self::new(v.x, v.y, v.z, 1.0)
    }

    /// Create a direction vector (w=0) from a Vec3.
    pub const fn direction(v: Vec3) -> Self {
        Self::new(v.x, v.y, v.z, 0.0)
    }

    /// Convert to Vec3, discarding w.
    pub const fn to_vec3(self) -> Vec3 {
        Vec3::new(self.x, self.y, self.z)
    }

    /// Performs the homogeneous divide.
    ///
    /// A zero or non-finite `w` is replaced with [`DEGENERATE_DIVISOR`],
    /// carrying the sign of `w`, so the result stays finite.
    pub fn perspective_divide(self) -> Vec3 {
        let w = if self.w == 0.0 {
            log::debug!("zero homogeneous divisor for {:?}", self);
            DEGENERATE_DIVISOR.copysign(self.w)
        } else if !self.w.is_finite() {
            log::warn!("non-finite homogeneous divisor for {:?}", self);
            DEGENERATE_DIVISOR.copysign(self.w)
        } else {
            self.w
        };
        Vec3::new(self.x / w, self.y / w, self.z / w)
    }
}

impl From<Vec3> for Vec4 {
    /// Convert Vec3 to Vec4 as a point (w=1).
    fn from(v: Vec3) -> Self {
        Self::point(v)
    }
}
