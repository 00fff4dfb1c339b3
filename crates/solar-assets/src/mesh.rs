//! Wavefront OBJ loading into indexed [`SceneVertex`] meshes, plus the
//! procedural ship used when no model file is available.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use glam::Vec3;
use solar_render::SceneVertex;

use crate::error::AssetError;

const DEFAULT_NORMAL: [f32; 3] = [0.0, 1.0, 0.0];

/// CPU-side indexed triangle mesh.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeshData {
    pub vertices: Vec<SceneVertex>,
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

fn load_options() -> tobj::LoadOptions {
    tobj::LoadOptions {
        single_index: true,
        triangulate: true,
        ignore_points: true,
        ignore_lines: true,
        ..Default::default()
    }
}

/// Parse OBJ text. Polygons are fan-triangulated and negative indices count
/// back from the end. Vertices without a `vt` get UV (0, 0); without a `vn`,
/// normal +Y. Every vertex takes `color`.
fn parse_obj(reader: &mut impl BufRead, color: Vec3) -> Result<MeshData, tobj::LoadError> {
    // Material libraries are irrelevant here; the ship is vertex-colored.
    let (models, _materials) = tobj::load_obj_buf(reader, &load_options(), |_| {
        Err(tobj::LoadError::OpenFileFailed)
    })?;

    let mut mesh = MeshData::default();
    for model in models {
        let m = model.mesh;
        let base = mesh.vertices.len() as u32;
        let count = m.positions.len() / 3;
        for i in 0..count {
            let position = [m.positions[3 * i], m.positions[3 * i + 1], m.positions[3 * i + 2]];
            let normal = match m.normals.get(3 * i..3 * i + 3) {
                Some(n) => [n[0], n[1], n[2]],
                None => DEFAULT_NORMAL,
            };
            let uv = match m.texcoords.get(2 * i..2 * i + 2) {
                Some(t) => [t[0], t[1]],
                None => [0.0, 0.0],
            };
            mesh.vertices.push(SceneVertex {
                position,
                color: color.to_array(),
                uv,
                normal,
            });
        }
        mesh.indices.extend(m.indices.iter().map(|i| base + i));
    }
    Ok(mesh)
}

pub fn load_obj(path: &Path, color: Vec3) -> Result<MeshData, AssetError> {
    let file = File::open(path).map_err(|source| AssetError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mesh = parse_obj(&mut BufReader::new(file), color).map_err(|source| AssetError::Obj {
        path: path.to_path_buf(),
        source,
    })?;
    if mesh.indices.is_empty() {
        return Err(AssetError::EmptyMesh {
            path: path.to_path_buf(),
        });
    }
    Ok(mesh)
}

/// Load the ship model, or log why not and return [`fallback_ship`].
pub fn load_ship_or_fallback(path: &Path, color: Vec3) -> MeshData {
    match load_obj(path, color) {
        Ok(mesh) => {
            log::info!(
                "Loaded OBJ {}: {} vertices, {} triangles",
                path.display(),
                mesh.vertices.len(),
                mesh.triangle_count()
            );
            mesh
        }
        Err(e) => {
            log::warn!("{e}; using fallback ship");
            fallback_ship()
        }
    }
}

/// A small arrowhead craft pointing down +Z: 7 vertices, 8 triangles.
pub fn fallback_ship() -> MeshData {
    let v = |position: [f32; 3], color: [f32; 3], normal: [f32; 3]| SceneVertex {
        position,
        color,
        uv: [0.0, 0.0],
        normal: Vec3::from_array(normal).normalize().to_array(),
    };
    let vertices = vec![
        v([0.0, 0.3, 1.2], [0.9, 0.9, 1.0], [0.0, 1.0, 0.0]), // nose
        v([-0.6, 0.0, -1.0], [0.7, 0.7, 0.9], [-0.2, 0.8, -0.5]),
        v([0.6, 0.0, -1.0], [0.7, 0.7, 0.9], [0.2, 0.8, -0.5]),
        v([0.0, 0.7, -0.4], [0.8, 0.8, 1.0], [0.0, 1.0, 0.0]), // canopy
        v([0.0, -0.2, -0.4], [0.6, 0.6, 0.9], [0.0, -1.0, 0.0]), // belly
        v([-1.0, 0.0, -0.2], [0.6, 0.6, 1.0], [-1.0, 0.0, 0.0]), // left wing
        v([1.0, 0.0, -0.2], [0.6, 0.6, 1.0], [1.0, 0.0, 0.0]),  // right wing
    ];
    // Counter-clockwise seen from outside.
    let indices = vec![
        0, 3, 1, 0, 2, 3, 0, 4, 2, 0, 1, 4, 1, 5, 3, 3, 2, 5, 1, 4, 5, 2, 6, 4,
    ];
    MeshData { vertices, indices }
}
