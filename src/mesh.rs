//! Polygon meshes as input geometry.
//!
//! A [`Mesh`] is a shared vertex list plus faces indexing into it. Faces keep
//! their original arity (OBJ files are loaded without triangulation) and are
//! turned into one [`Primitive`] polygon each.

use std::fmt;
use std::io::BufRead;
use std::path::Path;

use crate::math::vec3::Vec3;
use crate::primitive::Primitive;

#[derive(Debug)]
pub enum LoadError {
    Obj(tobj::LoadError),
    /// The file parsed but held no faces.
    EmptyMesh,
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::Obj(e) => write!(f, "failed to load OBJ: {}", e),
            LoadError::EmptyMesh => write!(f, "OBJ contains no faces"),
        }
    }
}

impl std::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LoadError::Obj(e) => Some(e),
            LoadError::EmptyMesh => None,
        }
    }
}

impl From<tobj::LoadError> for LoadError {
    fn from(e: tobj::LoadError) -> Self {
        LoadError::Obj(e)
    }
}

const CUBE_VERTICES: [Vec3; 8] = [
    Vec3::new(-1.0, -1.0, -1.0),
    Vec3::new(-1.0, 1.0, -1.0),
    Vec3::new(1.0, 1.0, -1.0),
    Vec3::new(1.0, -1.0, -1.0),
    Vec3::new(1.0, 1.0, 1.0),
    Vec3::new(1.0, -1.0, 1.0),
    Vec3::new(-1.0, 1.0, 1.0),
    Vec3::new(-1.0, -1.0, 1.0),
];

// Counter-clockwise seen from outside.
const CUBE_FACES: [[usize; 4]; 6] = [
    [7, 5, 4, 6], // front  +z
    [3, 0, 1, 2], // back   -z
    [5, 3, 2, 4], // right  +x
    [0, 7, 6, 1], // left   -x
    [6, 4, 2, 1], // top    +y
    [0, 3, 5, 7], // bottom -y
];

fn load_options() -> tobj::LoadOptions {
    tobj::LoadOptions {
        triangulate: false,
        ignore_points: true,
        ignore_lines: true,
        ..Default::default()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    vertices: Vec<Vec3>,
    faces: Vec<Vec<usize>>,
}

impl Mesh {
    pub fn new(vertices: Vec<Vec3>, faces: Vec<Vec<usize>>) -> Self {
        Self { vertices, faces }
    }

    /// Unit cube centered on the origin, one quad per side.
    pub fn cube() -> Self {
        Self::new(
            CUBE_VERTICES.to_vec(),
            CUBE_FACES.iter().map(|face| face.to_vec()).collect(),
        )
    }

    /// Loads every object in an OBJ file into one mesh.
    pub fn from_obj<P: AsRef<Path>>(path: P) -> Result<Self, LoadError> {
        let (models, _materials) = tobj::load_obj(path.as_ref(), &load_options())?;
        Self::from_models(models)
    }

    /// Loads OBJ text from a reader. Material libraries are not resolved.
    pub fn from_obj_reader<R: BufRead>(reader: &mut R) -> Result<Self, LoadError> {
        let (models, _materials) = tobj::load_obj_buf(reader, &load_options(), |_| {
            Err(tobj::LoadError::OpenFileFailed)
        })?;
        Self::from_models(models)
    }

    fn from_models(models: Vec<tobj::Model>) -> Result<Self, LoadError> {
        let mut mesh = Mesh::default();
        for model in models {
            let base = mesh.vertices.len();
            let source = model.mesh;
            mesh.vertices.extend(
                source
                    .positions
                    .chunks_exact(3)
                    .map(|p| Vec3::new(p[0], p[1], p[2])),
            );

            let mut cursor = 0;
            let mut push_face = |arity: usize| {
                let face: Vec<usize> = source.indices[cursor..cursor + arity]
                    .iter()
                    .map(|&i| base + i as usize)
                    .collect();
                cursor += arity;
                face
            };
            // Empty arities mean every face is a triangle.
            if source.face_arities.is_empty() {
                for _ in 0..source.indices.len() / 3 {
                    mesh.faces.push(push_face(3));
                }
            } else {
                for &arity in &source.face_arities {
                    mesh.faces.push(push_face(arity as usize));
                }
            }
            log::debug!("loaded OBJ object '{}'", model.name);
        }

        if mesh.faces.is_empty() {
            return Err(LoadError::EmptyMesh);
        }
        Ok(mesh)
    }

    pub fn vertices(&self) -> &[Vec3] {
        &self.vertices
    }

    pub fn faces(&self) -> &[Vec<usize>] {
        &self.faces
    }

    /// One polygon per face. Faces referencing missing vertices are skipped.
    pub fn polygons(&self) -> Vec<Primitive> {
        self.faces
            .iter()
            .filter_map(|face| {
                let points: Option<Vec<Vec3>> =
                    face.iter().map(|&i| self.vertices.get(i).copied()).collect();
                if points.is_none() {
                    log::warn!("face {:?} indexes past {} vertices", face, self.vertices.len());
                }
                points.map(Primitive::polygon)
            })
            .collect()
    }
}
