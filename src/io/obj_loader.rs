use crate::core::math::numeric::Real;
use crate::core::math::vector::{point_from_array, vector_from_array};
use crate::error::SceneError;
use crate::scene::mesh::{MeshData, MeshTriangle};
use log::{info, warn};
use std::path::Path;

/// Placement applied to mesh positions before conversion to the scene's
/// number type: `p * scale + position`.
#[derive(Debug, Clone, Copy)]
pub struct MeshPlacement {
    pub position: [f64; 3],
    pub scale: f64,
}

impl Default for MeshPlacement {
    fn default() -> Self {
        Self {
            position: [0.0; 3],
            scale: 1.0,
        }
    }
}

/// Loads a Wavefront OBJ file into the flat triangle form.
///
/// Faces are triangulated by `tobj`. When the file carries vertex normals, a
/// triangle's explicit normal is the average of its three vertex normals;
/// otherwise the winding decides. All models in the file are merged.
pub fn load_obj<T: Real>(path: &Path, placement: MeshPlacement) -> Result<MeshData<T>, SceneError> {
    let mesh_error = |reason: String| SceneError::MeshLoad {
        path: path.display().to_string(),
        reason,
    };
    if !path.exists() {
        return Err(mesh_error("file not found".to_string()));
    }

    info!("Loading OBJ file: {}", path.display());

    let load_options = tobj::LoadOptions {
        triangulate: true,
        single_index: true,
        ..Default::default()
    };
    let (models, _materials) =
        tobj::load_obj(path, &load_options).map_err(|e| mesh_error(e.to_string()))?;

    let place = |i: usize, positions: &[f32]| -> [f64; 3] {
        let s = placement.scale;
        let o = placement.position;
        [
            positions[i * 3] as f64 * s + o[0],
            positions[i * 3 + 1] as f64 * s + o[1],
            positions[i * 3 + 2] as f64 * s + o[2],
        ]
    };

    let mut data = MeshData::new();
    for model in models {
        let mesh = &model.mesh;
        let vertex_count = mesh.positions.len() / 3;
        let has_normals = mesh.normals.len() == mesh.positions.len();
        if !has_normals && !mesh.normals.is_empty() {
            warn!(
                "Mesh '{}' has {} normals for {} vertices; ignoring them",
                model.name,
                mesh.normals.len() / 3,
                vertex_count
            );
        }

        for (face, tri) in mesh.indices.chunks_exact(3).enumerate() {
            let idx = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
            if idx.iter().any(|&i| i >= vertex_count) {
                return Err(mesh_error(format!(
                    "face {face} of '{}' references a missing vertex",
                    model.name
                )));
            }

            let normal = if has_normals {
                let mut sum = [0.0f64; 3];
                for &i in &idx {
                    for (axis, s) in sum.iter_mut().enumerate() {
                        *s += mesh.normals[i * 3 + axis] as f64;
                    }
                }
                (sum != [0.0; 3]).then(|| vector_from_array::<T>(sum))
            } else {
                None
            };

            data.push(MeshTriangle {
                vertices: [
                    point_from_array(place(idx[0], &mesh.positions)),
                    point_from_array(place(idx[1], &mesh.positions)),
                    point_from_array(place(idx[2], &mesh.positions)),
                ],
                normal,
                attribute: None,
            });
        }
    }

    info!("OBJ loaded successfully: {} triangles", data.len());
    Ok(data)
}
