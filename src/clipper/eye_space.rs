//! Eye-space near/far clipping.
//!
//! Clipping happens after the model-to-eye transform and before projection.
//! Only the hither and yon planes are clipped against; geometry outside the
//! side planes of the view is left for the 2-D backend to discard.
//!
//! Each plane is one pass of a Sutherland-Hodgman walk over the vertex
//! sequence. Polygons are walked as a closed cycle, line strips as an open
//! sequence, point sets as independent points. The two passes ping-pong
//! between a pair of scratch buffers owned by the [`EyeSpaceClipper`]:
//! each pass reads the front buffer, writes the back buffer, then swaps.

use crate::color::Rgba;
use crate::math::vec3::Vec3;
use crate::primitive::PrimitiveKind;

/// A vertex with every attribute that is interpolated along a cut edge.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ClipVertex {
    /// Position in eye space.
    pub position: Vec3,
    pub color: Rgba,
    pub values: [f32; 2],
}

impl ClipVertex {
    pub fn new(position: Vec3, color: Rgba, values: [f32; 2]) -> Self {
        Self {
            position,
            color,
            values,
        }
    }

    pub fn at(position: Vec3) -> Self {
        Self::new(position, Rgba::WHITE, [0.0; 2])
    }

    /// Linearly interpolate all attributes between two vertices.
    pub fn lerp(&self, other: &Self, t: f32) -> Self {
        Self {
            position: self.position.lerp(other.position, t),
            color: self.color.lerp(other.color, t),
            values: [
                self.values[0] + (other.values[0] - self.values[0]) * t,
                self.values[1] + (other.values[1] - self.values[1]) * t,
            ],
        }
    }
}

/// One of the two depth planes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ClipPlane {
    /// Keeps `z <= hither`.
    Near(f32),
    /// Keeps `z >= yon`.
    Far(f32),
}

impl ClipPlane {
    /// Signed distance to the plane. Positive or zero = inside.
    pub fn signed_distance(&self, v: &ClipVertex) -> f32 {
        match *self {
            ClipPlane::Near(hither) => hither - v.position.z,
            ClipPlane::Far(yon) => v.position.z - yon,
        }
    }
}

/// How consecutive vertices are connected.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Topology {
    /// The last vertex connects back to the first.
    Closed,
    /// No wrap-around edge.
    Open,
    /// No edges at all.
    Discrete,
}

impl From<PrimitiveKind> for Topology {
    fn from(kind: PrimitiveKind) -> Self {
        match kind {
            PrimitiveKind::Polygon => Topology::Closed,
            PrimitiveKind::LineStrip => Topology::Open,
            PrimitiveKind::PointSet => Topology::Discrete,
        }
    }
}

/// Result of clipping one primitive.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ClipOutcome {
    /// Number of vertices that survived both planes.
    pub vertex_count: usize,
    /// Mean eye-space z of the surviving vertices.
    pub depth: f32,
}

/// Near/far clipper with its own ping-pong scratch buffers.
#[derive(Debug, Clone)]
pub struct EyeSpaceClipper {
    hither: f32,
    yon: f32,
    front: Vec<ClipVertex>,
    back: Vec<ClipVertex>,
}

impl EyeSpaceClipper {
    pub fn new(hither: f32, yon: f32) -> Self {
        Self {
            hither,
            yon,
            front: Vec::new(),
            back: Vec::new(),
        }
    }

    pub fn set_planes(&mut self, hither: f32, yon: f32) {
        self.hither = hither;
        self.yon = yon;
    }

    pub fn planes(&self) -> (f32, f32) {
        (self.hither, self.yon)
    }

    /// Clips a primitive's eye-space vertices against hither, then yon.
    ///
    /// Returns `None` when too few vertices survive for the primitive kind;
    /// otherwise the surviving vertices are available from [`Self::output`]
    /// until the next call.
    pub fn clip<I>(&mut self, kind: PrimitiveKind, vertices: I) -> Option<ClipOutcome>
    where
        I: IntoIterator<Item = ClipVertex>,
    {
        self.front.clear();
        self.front.extend(vertices);

        let topology = Topology::from(kind);
        self.clip_pass(ClipPlane::Near(self.hither), topology);
        self.clip_pass(ClipPlane::Far(self.yon), topology);

        let vertex_count = self.front.len();
        if vertex_count < kind.min_vertices() {
            self.front.clear();
            return None;
        }

        let depth = self.front.iter().map(|v| v.position.z).sum::<f32>() / vertex_count as f32;
        Some(ClipOutcome {
            vertex_count,
            depth,
        })
    }

    /// Vertices that survived the last [`Self::clip`] call.
    pub fn output(&self) -> &[ClipVertex] {
        &self.front
    }

    /// One Sutherland-Hodgman pass: reads `front`, writes `back`, swaps.
    fn clip_pass(&mut self, plane: ClipPlane, topology: Topology) {
        self.back.clear();
        let input = &self.front;
        let count = input.len();
        if count > 0 {
            let edges = match topology {
                Topology::Closed if count > 1 => count,
                Topology::Closed | Topology::Discrete => 0,
                Topology::Open => count - 1,
            };

            for i in 0..count {
                let current = &input[i];
                let d1 = plane.signed_distance(current);
                if d1 >= 0.0 {
                    self.back.push(*current);
                }

                if i < edges {
                    let next = &input[(i + 1) % count];
                    let d2 = plane.signed_distance(next);
                    // Edge crosses the plane: insert the exact intersection.
                    if (d1 >= 0.0) != (d2 >= 0.0) {
                        let t = d1 / (d1 - d2);
                        self.back.push(current.lerp(next, t));
                    }
                }
            }
        }
        std::mem::swap(&mut self.front, &mut self.back);
    }
}
