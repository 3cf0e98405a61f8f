//! Fixed palette of surface materials.
//!
//! A material only weights the diffuse term and adds a Phong-style specular
//! highlight; there is no general reflectance model.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Material {
    /// Pure diffuse with unit weight.
    #[default]
    Default,
    Dull,
    Shiny,
    Metallic,
    Matte,
    Aluminum,
}

/// Shading coefficients for one [`Material`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reflectance {
    pub diffuse: f32,
    pub specular: f32,
    pub shininess: f32,
}

impl Material {
    pub const PALETTE: [Material; 6] = [
        Material::Default,
        Material::Dull,
        Material::Shiny,
        Material::Metallic,
        Material::Matte,
        Material::Aluminum,
    ];

    /// Looks up a material by palette index; out-of-range indices fall back
    /// to [`Material::Default`].
    pub fn from_index(index: usize) -> Self {
        match Self::PALETTE.get(index) {
            Some(material) => *material,
            None => {
                log::warn!("material index {} out of range, using default", index);
                Material::Default
            }
        }
    }

    pub fn reflectance(self) -> Reflectance {
        let (diffuse, specular, shininess) = match self {
            Material::Default => (1.0, 0.0, 1.0),
            Material::Dull => (1.0, 0.1, 2.0),
            Material::Shiny => (0.8, 0.5, 30.0),
            Material::Metallic => (0.6, 0.8, 50.0),
            Material::Matte => (0.9, 0.0, 1.0),
            Material::Aluminum => (0.5, 0.7, 20.0),
        };
        Reflectance {
            diffuse,
            specular,
            shininess,
        }
    }
}
