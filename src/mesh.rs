//! Text mesh-format loader
//!
//! Reads the subset of the format the models use: `v x y z` vertex lines and
//! `f a b c ...` face lines (1-based indices, optionally `a/t/n` groups of
//! which only the first index is taken). Everything else is ignored. The
//! renderer consumes the geometry opaquely.

use std::path::Path;

use glam::Vec3;

use crate::errors::GameError;

/// Static geometry payload: vertex positions plus face index lists
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    pub positions: Vec<Vec3>,
    pub faces: Vec<Vec<usize>>,
}

impl Mesh {
    /// Fan-triangulate every face for the triangle-list pipeline
    pub fn triangles(&self) -> Vec<[Vec3; 3]> {
        let mut tris = Vec::new();
        for face in &self.faces {
            let anchor = self.positions[face[0]];
            for pair in face[1..].windows(2) {
                tris.push([anchor, self.positions[pair[0]], self.positions[pair[1]]]);
            }
        }
        tris
    }
}

/// Parse mesh text. Malformed vertex/face lines and out-of-range indices are
/// errors; unknown line prefixes are skipped.
pub fn parse_mesh(source: &str) -> Result<Mesh, GameError> {
    let mut positions = Vec::new();
    let mut faces: Vec<Vec<usize>> = Vec::new();

    for (line_no, line) in source.lines().enumerate() {
        let line_no = line_no + 1;
        if let Some(rest) = line.strip_prefix("v ") {
            let mut coords = [0.0f32; 3];
            let mut parts = rest.split_whitespace();
            for coord in &mut coords {
                let token = parts
                    .next()
                    .ok_or_else(|| GameError::Mesh(format!("line {}: short vertex", line_no)))?;
                *coord = token.parse().map_err(|_| {
                    GameError::Mesh(format!("line {}: bad vertex coordinate {:?}", line_no, token))
                })?;
            }
            positions.push(Vec3::from_array(coords));
        } else if let Some(rest) = line.strip_prefix("f ") {
            let mut face = Vec::new();
            for token in rest.split_whitespace() {
                let index_token = token.split('/').next().unwrap_or(token);
                let index: usize = index_token.parse().map_err(|_| {
                    GameError::Mesh(format!("line {}: bad face index {:?}", line_no, token))
                })?;
                if index == 0 {
                    return Err(GameError::Mesh(format!(
                        "line {}: face indices are 1-based",
                        line_no
                    )));
                }
                face.push(index - 1);
            }
            if face.len() < 3 {
                return Err(GameError::Mesh(format!(
                    "line {}: face needs at least 3 vertices",
                    line_no
                )));
            }
            faces.push(face);
        }
    }

    // Faces may appear before all vertices, so validate at the end
    for face in &faces {
        for &index in face {
            if index >= positions.len() {
                return Err(GameError::Mesh(format!(
                    "face index {} out of range ({} vertices)",
                    index + 1,
                    positions.len()
                )));
            }
        }
    }

    Ok(Mesh { positions, faces })
}

/// Load a mesh from disk
pub fn load_mesh(path: &Path) -> Result<Mesh, GameError> {
    let source = std::fs::read_to_string(path)?;
    parse_mesh(&source).map_err(|e| GameError::Mesh(format!("{}: {}", path.display(), e)))
}

/// Asset identifiers for the shipped models
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeshId {
    Mower,
    Rabbit,
    Gnome,
    Stone,
    Ground,
}

impl MeshId {
    pub const ALL: [MeshId; 5] = [
        MeshId::Mower,
        MeshId::Rabbit,
        MeshId::Gnome,
        MeshId::Stone,
        MeshId::Ground,
    ];

    fn file_name(self) -> &'static str {
        match self {
            MeshId::Mower => "mower.obj",
            MeshId::Rabbit => "rabbit.obj",
            MeshId::Gnome => "gnome.obj",
            MeshId::Stone => "stone.obj",
            MeshId::Ground => "ground.obj",
        }
    }
}

/// All loaded models, indexed by `MeshId`
pub struct MeshSet {
    meshes: Vec<Mesh>,
}

impl MeshSet {
    /// Load every model from `dir`. Any missing or malformed file aborts
    /// startup.
    pub fn load(dir: &Path) -> Result<Self, GameError> {
        let mut meshes = Vec::with_capacity(MeshId::ALL.len());
        for id in MeshId::ALL {
            let path = dir.join(id.file_name());
            let mesh = load_mesh(&path)?;
            log::info!(
                "loaded {} ({} vertices, {} faces)",
                path.display(),
                mesh.positions.len(),
                mesh.faces.len()
            );
            meshes.push(mesh);
        }
        Ok(Self { meshes })
    }

    pub fn get(&self, id: MeshId) -> &Mesh {
        &self.meshes[id as usize]
    }
}
