//! Input geometry: vertex lists, primitives and the flat attributes that
//! travel with them.
//!
//! These types are read-only to the pipeline. The scene driver (or any other
//! traversal) hands them to [`Renderer::draw`](crate::renderer::Renderer::draw)
//! together with the model transform in effect.

use crate::color::Rgba;
use crate::colormap::ColorMap;
use crate::material::Material;
use crate::math::vec3::Vec3;

/// The three drawable primitive kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    PointSet,
    LineStrip,
    Polygon,
}

impl PrimitiveKind {
    /// Fewest vertices a primitive of this kind needs to be drawable.
    pub fn min_vertices(self) -> usize {
        match self {
            PrimitiveKind::PointSet => 1,
            PrimitiveKind::LineStrip => 2,
            PrimitiveKind::Polygon => 3,
        }
    }
}

/// An ordered vertex list. Each variant carries a different per-vertex payload
/// alongside the position.
#[derive(Debug, Clone, PartialEq)]
pub enum VertexList {
    Plain(Vec<Vec3>),
    Colored(Vec<(Vec3, Rgba)>),
    Normals(Vec<(Vec3, Vec3)>),
    Valued(Vec<(Vec3, f32)>),
    DoubleValued(Vec<(Vec3, f32, f32)>),
}

impl VertexList {
    pub fn len(&self) -> usize {
        match self {
            VertexList::Plain(v) => v.len(),
            VertexList::Colored(v) => v.len(),
            VertexList::Normals(v) => v.len(),
            VertexList::Valued(v) => v.len(),
            VertexList::DoubleValued(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn position(&self, index: usize) -> Vec3 {
        match self {
            VertexList::Plain(v) => v[index],
            VertexList::Colored(v) => v[index].0,
            VertexList::Normals(v) => v[index].0,
            VertexList::Valued(v) => v[index].0,
            VertexList::DoubleValued(v) => v[index].0,
        }
    }

    pub fn positions(&self) -> impl Iterator<Item = Vec3> + '_ {
        (0..self.len()).map(move |i| self.position(i))
    }

    pub fn x(&self, index: usize) -> f32 {
        self.position(index).x
    }

    pub fn y(&self, index: usize) -> f32 {
        self.position(index).y
    }

    pub fn z(&self, index: usize) -> f32 {
        self.position(index).z
    }

    pub fn color(&self, index: usize) -> Option<Rgba> {
        match self {
            VertexList::Colored(v) => Some(v[index].1),
            _ => None,
        }
    }

    pub fn r(&self, index: usize) -> Option<f32> {
        self.color(index).map(|c| c.r)
    }

    pub fn g(&self, index: usize) -> Option<f32> {
        self.color(index).map(|c| c.g)
    }

    pub fn b(&self, index: usize) -> Option<f32> {
        self.color(index).map(|c| c.b)
    }

    pub fn a(&self, index: usize) -> Option<f32> {
        self.color(index).map(|c| c.a)
    }

    pub fn normal(&self, index: usize) -> Option<Vec3> {
        match self {
            VertexList::Normals(v) => Some(v[index].1),
            _ => None,
        }
    }

    pub fn nx(&self, index: usize) -> Option<f32> {
        self.normal(index).map(|n| n.x)
    }

    pub fn ny(&self, index: usize) -> Option<f32> {
        self.normal(index).map(|n| n.y)
    }

    pub fn nz(&self, index: usize) -> Option<f32> {
        self.normal(index).map(|n| n.z)
    }

    pub fn value(&self, index: usize) -> Option<f32> {
        match self {
            VertexList::Valued(v) => Some(v[index].1),
            VertexList::DoubleValued(v) => Some(v[index].1),
            _ => None,
        }
    }

    pub fn value2(&self, index: usize) -> Option<f32> {
        match self {
            VertexList::DoubleValued(v) => Some(v[index].2),
            _ => None,
        }
    }

    pub fn has_colors(&self) -> bool {
        matches!(self, VertexList::Colored(_))
    }

    pub fn has_values(&self) -> bool {
        matches!(self, VertexList::Valued(_) | VertexList::DoubleValued(_))
    }
}

/// A typed bag of vertices.
#[derive(Debug, Clone, PartialEq)]
pub struct Primitive {
    pub kind: PrimitiveKind,
    pub vertices: VertexList,
}

impl Primitive {
    pub fn new(kind: PrimitiveKind, vertices: VertexList) -> Self {
        Self { kind, vertices }
    }

    pub fn polygon(points: Vec<Vec3>) -> Self {
        Self::new(PrimitiveKind::Polygon, VertexList::Plain(points))
    }

    pub fn line_strip(points: Vec<Vec3>) -> Self {
        Self::new(PrimitiveKind::LineStrip, VertexList::Plain(points))
    }

    pub fn point_set(points: Vec<Vec3>) -> Self {
        Self::new(PrimitiveKind::PointSet, VertexList::Plain(points))
    }

    /// True when the primitive has enough vertices for its kind.
    pub fn is_well_formed(&self) -> bool {
        self.vertices.len() >= self.kind.min_vertices()
    }
}

/// Flat attributes in effect for one primitive.
#[derive(Debug, Clone, PartialEq)]
pub struct Attributes {
    pub color: Rgba,
    pub backcull: bool,
    pub material: Material,
    pub color_map: ColorMap,
}

impl Default for Attributes {
    fn default() -> Self {
        Self {
            color: Rgba::WHITE,
            backcull: false,
            material: Material::Default,
            color_map: ColorMap::default(),
        }
    }
}

/// Partial attributes set on a scene node; unset fields are inherited.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttributeOverrides {
    pub color: Option<Rgba>,
    pub backcull: Option<bool>,
    pub material: Option<Material>,
    pub color_map: Option<ColorMap>,
}

impl AttributeOverrides {
    pub fn is_empty(&self) -> bool {
        self.color.is_none()
            && self.backcull.is_none()
            && self.material.is_none()
            && self.color_map.is_none()
    }

    /// Produces the attributes a child sees beneath `inherited`.
    pub fn apply(&self, inherited: &Attributes) -> Attributes {
        Attributes {
            color: self.color.unwrap_or(inherited.color),
            backcull: self.backcull.unwrap_or(inherited.backcull),
            material: self.material.unwrap_or(inherited.material),
            color_map: self
                .color_map
                .clone()
                .unwrap_or_else(|| inherited.color_map.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accessors_follow_variant() {
        let list = VertexList::DoubleValued(vec![(Vec3::new(1.0, 2.0, 3.0), 0.5, 0.75)]);
        assert_eq!(list.x(0), 1.0);
        assert_eq!(list.z(0), 3.0);
        assert_eq!(list.value(0), Some(0.5));
        assert_eq!(list.value2(0), Some(0.75));
        assert_eq!(list.color(0), None);
        assert_eq!(list.nx(0), None);
    }

    #[test]
    fn colored_list_exposes_channels() {
        let list = VertexList::Colored(vec![(Vec3::ZERO, Rgba::new(0.1, 0.2, 0.3, 0.4))]);
        assert_eq!(list.r(0), Some(0.1));
        assert_eq!(list.a(0), Some(0.4));
        assert!(list.has_colors());
        assert!(!list.has_values());
    }

    #[test]
    fn polygon_needs_three_vertices() {
        assert!(!Primitive::polygon(vec![Vec3::ZERO, Vec3::X]).is_well_formed());
        assert!(Primitive::line_strip(vec![Vec3::ZERO, Vec3::X]).is_well_formed());
        assert!(!Primitive::point_set(vec![]).is_well_formed());
    }

    #[test]
    fn overrides_only_replace_set_fields() {
        let base = Attributes::default();
        let overrides = AttributeOverrides {
            backcull: Some(true),
            ..Default::default()
        };
        let merged = overrides.apply(&base);
        assert!(merged.backcull);
        assert_eq!(merged.color, base.color);
        assert_eq!(merged.material, base.material);
    }
}
