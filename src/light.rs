//! Positional lights, ambient light and flat shading.
//!
//! Lighting runs in two phases per frame:
//!
//! 1. **Gather**: while the scene's light and ambient nodes are visited,
//!    each positional light is transformed into eye space and appended to
//!    the light table in the [`GeometryStore`], and ambient colors are summed.
//! 2. **Shade**: for every polygon, one color is computed from its eye-space
//!    face normal and the gathered lights.

use std::collections::HashSet;

use crate::color::Rgba;
use crate::material::Material;
use crate::math::mat4::Mat4;
use crate::math::vec3::Vec3;
use crate::scene::NodeId;
use crate::store::{GeometryStore, LightId};

/// One positional light, valid for the current frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightEntry {
    /// Position in eye space.
    pub position: Vec3,
    pub color: Rgba,
}

impl Default for LightEntry {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            color: Rgba::TRANSPARENT,
        }
    }
}

/// The surface point being shaded, in eye space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Surface {
    pub position: Vec3,
    /// Unit face normal.
    pub normal: Vec3,
    /// Attribute color the light is modulated by.
    pub color: Rgba,
    pub material: Material,
}

/// Per-frame lighting state: the ambient sum and the set of light-bearing
/// subtrees already gathered.
#[derive(Debug, Clone)]
pub struct Lighting {
    ambient: Rgba,
    visited: HashSet<NodeId>,
}

impl Default for Lighting {
    fn default() -> Self {
        Self::new()
    }
}

impl Lighting {
    pub fn new() -> Self {
        Self {
            ambient: Rgba::TRANSPARENT,
            visited: HashSet::new(),
        }
    }

    /// Forgets the ambient sum and the visited subtrees. The light table
    /// itself is rewound with the rest of the store.
    pub fn reset(&mut self) {
        self.ambient = Rgba::TRANSPARENT;
        self.visited.clear();
    }

    // =========================================================================
    // Gather
    // =========================================================================

    /// Marks a light-bearing subtree as gathered for this frame.
    ///
    /// Returns `false` if it was already gathered, in which case the caller
    /// skips it. Shared subtrees in a DAG are therefore counted once.
    pub fn enter_subtree(&mut self, node: NodeId) -> bool {
        self.visited.insert(node)
    }

    /// Appends a positional light, moving `position` into eye space with the
    /// transform in effect where the light was found.
    pub fn gather_light(
        &mut self,
        store: &mut GeometryStore,
        position: Vec3,
        color: Rgba,
        model_to_eye: &Mat4,
    ) -> LightId {
        let id = store.allocate_light();
        *store.light_mut(id) = LightEntry {
            position: model_to_eye.transform_point(position),
            color,
        };
        id
    }

    pub fn gather_ambient(&mut self, color: Rgba) {
        self.ambient += color;
    }

    pub fn ambient(&self) -> Rgba {
        self.ambient
    }

    // =========================================================================
    // Shade
    // =========================================================================

    /// Computes the flat color of a surface.
    ///
    /// Per light, the diffuse term is `max(0, L . N)` scaled by the light
    /// color, with `L` the unit vector from the surface toward the light.
    /// The diffuse sum is weighted by the material, the ambient sum added,
    /// and the result multiplied by the surface color. Materials with a
    /// specular weight add a highlight toward the eye at the origin. The
    /// result is clamped to [0, 1]; alpha is the surface alpha.
    pub fn shade(&self, lights: &[LightEntry], surface: &Surface) -> Rgba {
        let reflectance = surface.material.reflectance();
        let normal = surface.normal;
        let to_eye = (-surface.position).normalize_or(Vec3::Z);

        let mut diffuse = Rgba::TRANSPARENT;
        let mut specular = Rgba::TRANSPARENT;
        for light in lights {
            let to_light = (light.position - surface.position).normalize_or(Vec3::Z);
            let lambert = to_light.dot(normal).max(0.0);
            diffuse += light.color * lambert;

            if reflectance.specular > 0.0 && lambert > 0.0 {
                let reflected = (-to_light).reflect(normal);
                let highlight = reflected.dot(to_eye).max(0.0).powf(reflectance.shininess);
                specular += light.color * (reflectance.specular * highlight);
            }
        }

        let lit = diffuse * reflectance.diffuse + self.ambient;
        let color = lit.modulate(surface.color) + specular;
        Rgba::new(color.r, color.g, color.b, surface.color.a).clamped()
    }
}

/// Flat face normal from the first two edges of a vertex sequence.
///
/// Returns `None` when fewer than three vertices are given or the first two
/// edges are collinear.
pub fn face_normal(points: &[Vec3]) -> Option<Vec3> {
    if points.len() < 3 {
        return None;
    }
    let first = points[1] - points[0];
    let second = points[2] - points[1];
    first.cross(second).try_normalize()
}
