//! Renderer configuration
//!
//! Configuration is loaded from multiple sources with the following priority (lowest to highest):
//! 1. `config/default.toml` (version controlled)
//! 2. `config/user.toml` (gitignored, user overrides)
//! 3. Environment variables (`PAINTER_SECTION__KEY`)

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::camera::Camera;
use crate::color::Rgba;
use crate::math::vec3::Vec3;
use crate::render::RasterOptions;
use crate::renderer::RendererConfig;
use crate::store::StoreCapacity;

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PainterConfig {
    #[serde(default)]
    pub viewport: ViewportConfig,
    /// Initial pool capacities
    #[serde(default)]
    pub buffers: BufferConfig,
    #[serde(default)]
    pub camera: CameraConfig,
    #[serde(default)]
    pub render: RenderConfig,
    #[serde(default)]
    pub debug: DebugConfig,
}

impl PainterConfig {
    /// Load configuration from the `config` directory
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from("config")
    }

    /// Load configuration from a specific config directory
    pub fn load_from<P: AsRef<Path>>(config_dir: P) -> Result<Self, ConfigError> {
        let config_dir = config_dir.as_ref();
        let default_path = config_dir.join("default.toml");
        let user_path = config_dir.join("user.toml");

        let mut figment = Figment::new();
        if default_path.exists() {
            figment = figment.merge(Toml::file(&default_path));
        }
        if user_path.exists() {
            figment = figment.merge(Toml::file(&user_path));
        }

        // PAINTER_VIEWPORT__WIDTH=320 -> viewport.width = 320
        figment = figment.merge(Env::prefixed("PAINTER_").split("__"));

        figment.extract().map_err(ConfigError::from)
    }

    pub fn renderer_config(&self) -> RendererConfig {
        RendererConfig {
            width: self.viewport.width,
            height: self.viewport.height,
            capacity: StoreCapacity {
                primitives: self.buffers.primitives,
                vertices: self.buffers.vertices,
                colors: self.buffers.colors,
                lights: self.buffers.lights,
            },
            camera: self.camera.to_camera(),
        }
    }

    pub fn raster_options(&self) -> RasterOptions {
        RasterOptions {
            point_size: self.render.point_size,
            outline_polygons: self.render.outline_polygons,
            outline_color: Rgba::from(self.render.outline_color),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewportConfig {
    pub width: u32,
    pub height: u32,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BufferConfig {
    pub primitives: usize,
    /// Counted in vertices, not scalars
    pub vertices: usize,
    pub colors: usize,
    pub lights: usize,
}

impl Default for BufferConfig {
    fn default() -> Self {
        let capacity = StoreCapacity::default();
        Self {
            primitives: capacity.primitives,
            vertices: capacity.vertices,
            colors: capacity.colors,
            lights: capacity.lights,
        }
    }
}

/// Camera configuration, world space
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CameraConfig {
    pub lookfrom: [f32; 3],
    pub lookat: [f32; 3],
    pub up: [f32; 3],
    /// Vertical field of view in degrees
    pub fov: f32,
    /// Eye-space z of the near plane (negative)
    pub hither: f32,
    /// Eye-space z of the far plane (more negative than hither)
    pub yon: f32,
    /// Background color [r, g, b, a]
    pub background: [f32; 4],
}

impl Default for CameraConfig {
    fn default() -> Self {
        let camera = Camera::default();
        Self {
            lookfrom: [camera.lookfrom.x, camera.lookfrom.y, camera.lookfrom.z],
            lookat: [camera.lookat.x, camera.lookat.y, camera.lookat.z],
            up: [camera.up.x, camera.up.y, camera.up.z],
            fov: camera.fov,
            hither: camera.hither,
            yon: camera.yon,
            background: [0.0, 0.0, 0.0, 1.0],
        }
    }
}

impl CameraConfig {
    pub fn to_camera(&self) -> Camera {
        Camera {
            lookfrom: Vec3::from(self.lookfrom),
            lookat: Vec3::from(self.lookat),
            up: Vec3::from(self.up),
            fov: self.fov,
            hither: self.hither,
            yon: self.yon,
            background: Rgba::from(self.background),
        }
    }
}

/// Raster backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    /// Edge length in pixels of a drawn point
    pub point_size: u32,
    pub outline_polygons: bool,
    pub outline_color: [f32; 4],
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            point_size: 3,
            outline_polygons: false,
            outline_color: [0.0, 0.0, 0.0, 1.0],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebugConfig {
    /// Log level (error, warn, info, debug, trace)
    pub log_level: String,
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// Configuration error
#[derive(Debug)]
pub struct ConfigError {
    message: String,
}

impl From<figment::Error> for ConfigError {
    fn from(e: figment::Error) -> Self {
        ConfigError {
            message: e.to_string(),
        }
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Configuration error: {}", self.message)
    }
}

impl std::error::Error for ConfigError {}
