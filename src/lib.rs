//! A software 3D pipeline that hides surfaces with the painter's algorithm.
//!
//! Primitives are transformed to eye space, clipped against the hither and
//! yon planes, flat shaded, projected, and then painted back to front into a
//! 2-D [`DrawBackend`]. No depth buffer is used.
//!
//! # Quick Start
//!
//! ```ignore
//! use painter3d::prelude::*;
//!
//! let mut renderer = Renderer::new(RendererConfig::default())?;
//! let mut output = MetafileBackend::new();
//!
//! renderer.begin_frame()?;
//! renderer.add_light(Vec3::new(0.0, 0.0, 10.0), Rgba::WHITE, &Mat4::identity())?;
//! renderer.draw(&Primitive::polygon(points), &Attributes::default(), &Mat4::identity())?;
//! let stats = renderer.composite(&mut output)?;
//! ```

// Public API - exposed to library consumers
pub mod backend;
pub mod camera;
pub mod clipper;
pub mod color;
pub mod colormap;
pub mod compositor;
pub mod config;
pub mod error;
pub mod light;
pub mod material;
pub mod math;
pub mod mesh;
pub mod primitive;
pub mod projection;
pub mod render;
pub mod renderer;
pub mod scene;
pub mod store;
pub mod transform;
pub mod window;

// Re-export commonly needed types at crate root for convenience
pub use backend::{DrawBackend, DrawCommand, MetafileBackend};
pub use compositor::FrameStats;
pub use error::RenderError;
pub use mesh::{LoadError, Mesh};
pub use renderer::{DrawOutcome, Renderer, RendererConfig};

/// Prelude module for convenient imports.
///
/// # Example
/// ```ignore
/// use painter3d::prelude::*;
/// ```
pub mod prelude {
    // Pipeline
    pub use crate::camera::Camera;
    pub use crate::compositor::FrameStats;
    pub use crate::error::RenderError;
    pub use crate::renderer::{DrawOutcome, Inherited, Renderer, RendererConfig};

    // Geometry & attributes
    pub use crate::color::Rgba;
    pub use crate::colormap::ColorMap;
    pub use crate::material::Material;
    pub use crate::mesh::{LoadError, Mesh};
    pub use crate::primitive::{
        AttributeOverrides, Attributes, Primitive, PrimitiveKind, VertexList,
    };
    pub use crate::scene::{NodeId, Scene};

    // Math
    pub use crate::math::mat4::Mat4;
    pub use crate::math::vec2::Vec2;
    pub use crate::math::vec3::Vec3;
    pub use crate::math::vec4::Vec4;

    // Output
    pub use crate::backend::{DrawBackend, DrawCommand, MetafileBackend};
    pub use crate::render::{RasterBackend, RasterOptions};

    // Configuration
    pub use crate::config::PainterConfig;

    // Window
    pub use crate::window::{FrameLimiter, Window, WindowEvent};
}
