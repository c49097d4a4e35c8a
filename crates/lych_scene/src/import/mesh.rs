//! Floor mesh loading

use std::collections::HashMap;
use std::io::{Read, Seek};
use std::path::Path;

use log::debug;
use ndarray::{ArrayD, Axis};

use super::config::ImportConfig;
use super::source::MeshRecord;
use crate::archive::ArrayArchive;
use crate::error::{SceneError, SceneResult};
use crate::foundation::math::Vec3;
use crate::geometry::{loop_edges, reconstruct_footprint};
use crate::scene::Polygon;

/// Face data of one exported mesh
#[derive(Debug, Clone, PartialEq)]
pub struct FloorMesh {
    /// Vertex positions
    pub vertices: Vec<Vec3>,
    /// Flattened face loops
    pub indices: Vec<usize>,
    /// Number of indices in each face loop
    pub loop_totals: Vec<usize>,
}

fn to_indices(array: ArrayD<i64>, what: &str) -> SceneResult<Vec<usize>> {
    array
        .iter()
        .map(|&v| usize::try_from(v).map_err(|_| SceneError::malformed(format!("{what} holds negative value {v}"))))
        .collect()
}

fn to_vertices(array: ArrayD<f64>, what: &str) -> SceneResult<Vec<Vec3>> {
    if array.ndim() != 2 || array.shape()[1] < 2 {
        return Err(SceneError::malformed(format!(
            "{what} has shape {:?}, expected (N, 2) or (N, 3)",
            array.shape()
        )));
    }
    Ok(array
        .axis_iter(Axis(0))
        .map(|row| Vec3::new(row[0], row[1], if row.len() > 2 { row[2] } else { 0.0 }))
        .collect())
}

impl FloorMesh {
    /// Read the `{mesh_id}_vertices`, `{mesh_id}_indices` and
    /// `{mesh_id}_loop_totals` arrays of an archive
    pub fn from_archive<R: Read + Seek>(archive: &mut ArrayArchive<R>, mesh_id: &str) -> SceneResult<Self> {
        let vertices_name = format!("{mesh_id}_vertices");
        let indices_name = format!("{mesh_id}_indices");
        let totals_name = format!("{mesh_id}_loop_totals");
        Ok(Self {
            vertices: to_vertices(archive.read_f64(&vertices_name)?, &vertices_name)?,
            indices: to_indices(archive.read_i64(&indices_name)?, &indices_name)?,
            loop_totals: to_indices(archive.read_i64(&totals_name)?, &totals_name)?,
        })
    }

    /// Horizontal outline of the mesh
    pub fn footprint(&self) -> SceneResult<Polygon> {
        let edges = loop_edges(&self.indices, &self.loop_totals)?;
        reconstruct_footprint(&self.vertices, &edges)
    }
}

/// Load the footprint of the mesh described by `record`
pub fn load_floor(mesh_dir: impl AsRef<Path>, record: &MeshRecord) -> SceneResult<Polygon> {
    let mut archive = ArrayArchive::open(mesh_dir.as_ref().join(&record.filename))?;
    FloorMesh::from_archive(&mut archive, &record.mesh_id)?.footprint()
}

/// Load every floor mesh listed in the mesh metadata, keyed by object name
pub fn load_room_meshes(
    config: &ImportConfig,
    mesh_dir: impl AsRef<Path>,
    records: &[MeshRecord],
) -> SceneResult<HashMap<String, Polygon>> {
    let mesh_dir = mesh_dir.as_ref();
    let mut floors = HashMap::new();
    for record in records.iter().filter(|r| r.object_name.contains(&config.floor_mesh_marker)) {
        let polygon = load_floor(mesh_dir, record)?;
        debug!("Floor {} has {} outline vertices", record.object_name, polygon.len());
        floors.insert(record.object_name.clone(), polygon);
    }
    Ok(floors)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;
    use ndarray_npy::NpzWriter;
    use std::fs::File;

    /// Write a unit-square floor made of two triangles
    pub(crate) fn write_square_floor(path: &Path, mesh_id: &str, scale: f32) {
        let mut npz = NpzWriter::new(File::create(path).unwrap());
        npz.add_array(
            format!("{mesh_id}_vertices"),
            &(array![[0.0_f32, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 1.0, 0.0], [0.0, 1.0, 0.0]] * scale),
        )
        .unwrap();
        npz.add_array(format!("{mesh_id}_indices"), &array![0_i32, 1, 2, 0, 2, 3]).unwrap();
        npz.add_array(format!("{mesh_id}_loop_totals"), &array![3_i32, 3]).unwrap();
        npz.finish().unwrap();
    }

    fn temp_dir() -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!("lych_mesh_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_load_floor() {
        let dir = temp_dir();
        write_square_floor(&dir.join("floor.npz"), "12", 2.0);
        let record = MeshRecord {
            object_name: "kitchen_0/0.floor".to_string(),
            filename: "floor.npz".to_string(),
            mesh_id: "12".to_string(),
        };

        let polygon = load_floor(&dir, &record).unwrap();
        assert_eq!(polygon.len(), 4);
        assert_relative_eq!(polygon.area(), 4.0, epsilon = 1e-9);
    }

    #[test]
    fn test_only_floor_meshes_are_loaded() {
        let dir = temp_dir();
        write_square_floor(&dir.join("rooms.npz"), "3", 1.0);
        let records = vec![
            MeshRecord { object_name: "hall_0/0.floor".to_string(), filename: "rooms.npz".to_string(), mesh_id: "3".to_string() },
            MeshRecord { object_name: "hall_0/0.wall".to_string(), filename: "missing.npz".to_string(), mesh_id: "4".to_string() },
        ];

        let floors = load_room_meshes(&ImportConfig::default(), &dir, &records).unwrap();
        assert_eq!(floors.len(), 1);
        assert!(floors.contains_key("hall_0/0.floor"));
    }

    #[test]
    fn test_missing_arrays() {
        let dir = temp_dir();
        write_square_floor(&dir.join("other.npz"), "1", 1.0);
        let record = MeshRecord { object_name: "a.floor".to_string(), filename: "other.npz".to_string(), mesh_id: "2".to_string() };
        assert!(matches!(load_floor(&dir, &record), Err(SceneError::NotFound(_))));

        let absent = MeshRecord { filename: "absent.npz".to_string(), ..record };
        assert!(matches!(load_floor(&dir, &absent), Err(SceneError::NotFound(_))));
    }
}
