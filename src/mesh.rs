//! Triangle mesh representation and loading.
//!
//! Meshes are flat triangle lists with per-corner position, UV, and vertex
//! light attributes. OBJ files load through the `tobj` crate.

use std::fmt;
use std::path::Path;

use crate::color::Rgb;
use crate::math::{Vec2, Vec3};

/// One corner of a mesh triangle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Vertex {
    pub position: Vec3,
    pub uv: Vec2,
    /// Per-vertex darkening amount. White vertex color in the source file
    /// means zero darkening, so an uncolored mesh renders at full brightness.
    pub light: Rgb,
}

/// A mesh triangle: three vertices, counter-clockwise when front-facing.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Triangle {
    pub vertices: [Vertex; 3],
}

#[derive(Debug)]
pub enum LoadError {
    Tobj(tobj::LoadError),
    NoModels,
    NoVertices,
    InvalidFaces,
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::Tobj(e) => write!(f, "failed to load OBJ: {}", e),
            LoadError::NoModels => write!(f, "OBJ file contains no models"),
            LoadError::NoVertices => write!(f, "mesh has no vertices"),
            LoadError::InvalidFaces => write!(f, "face indices not divisible by 3"),
        }
    }
}

impl std::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LoadError::Tobj(e) => Some(e),
            _ => None,
        }
    }
}

impl From<tobj::LoadError> for LoadError {
    fn from(e: tobj::LoadError) -> Self {
        LoadError::Tobj(e)
    }
}

/// An immutable triangle list. Loaded once, then only read.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Mesh {
    triangles: Vec<Triangle>,
}

impl Mesh {
    pub fn new(triangles: Vec<Triangle>) -> Self {
        Self { triangles }
    }

    /// Loads every model in an OBJ file as a separate mesh.
    pub fn load_all<P: AsRef<Path> + fmt::Debug>(path: P) -> Result<Vec<Mesh>, LoadError> {
        let (models, _materials) = tobj::load_obj(path, &tobj::GPU_LOAD_OPTIONS)?;

        if models.is_empty() {
            return Err(LoadError::NoModels);
        }

        models
            .into_iter()
            .map(|model| Ok(Mesh::new(triangles_from_obj(&model.mesh)?)))
            .collect()
    }

    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }
}

/// A placed copy of a loaded mesh. The mesh data itself never changes;
/// instances carry the mutable transform.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MeshInstance {
    /// Index into the engine's mesh list.
    pub mesh: usize,
    pub position: Vec3,
    pub rotation: Vec3,
}

impl MeshInstance {
    pub fn new(mesh: usize) -> Self {
        Self {
            mesh,
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
        }
    }
}

/// Converts a single-indexed `tobj` mesh into a triangle list.
///
/// Missing texture coordinates default to (0, 0). Vertex colors arrive in
/// `[0, 1]` and are stored inverted as 8-bit darkening amounts
/// (`255 - c * 255`), so a missing color attribute (treated as white) darkens
/// nothing.
fn triangles_from_obj(mesh: &tobj::Mesh) -> Result<Vec<Triangle>, LoadError> {
    if mesh.positions.is_empty() {
        return Err(LoadError::NoVertices);
    }
    if mesh.indices.len() % 3 != 0 {
        return Err(LoadError::InvalidFaces);
    }

    let vertex = |index: u32| -> Vertex {
        let i = index as usize;
        let position = Vec3::new(
            mesh.positions[3 * i],
            mesh.positions[3 * i + 1],
            mesh.positions[3 * i + 2],
        );

        let uv = if mesh.texcoords.len() >= 2 * (i + 1) {
            Vec2::new(mesh.texcoords[2 * i], mesh.texcoords[2 * i + 1])
        } else {
            Vec2::ZERO
        };

        let light = if mesh.vertex_color.len() >= 3 * (i + 1) {
            Rgb::new(
                255 - (mesh.vertex_color[3 * i] * 255.0) as u8,
                255 - (mesh.vertex_color[3 * i + 1] * 255.0) as u8,
                255 - (mesh.vertex_color[3 * i + 2] * 255.0) as u8,
            )
        } else {
            Rgb::BLACK
        };

        Vertex {
            position,
            uv,
            light,
        }
    };

    Ok(mesh
        .indices
        .chunks_exact(3)
        .map(|face| Triangle {
            vertices: [vertex(face[0]), vertex(face[1]), vertex(face[2])],
        })
        .collect())
}
