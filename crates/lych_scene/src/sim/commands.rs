//! Object command set

use serde::{Deserialize, Serialize};

use super::client::{RequestClient, Simulator, STATUS_OK};
use crate::bounds::Aabb;
use crate::error::SceneResult;
use crate::foundation::math::vec3;

fn ok_status() -> String {
    STATUS_OK.to_string()
}

/// World AABB of one simulator object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AabbRecord {
    /// Simulator object id
    pub object_id: String,
    /// World-space center
    #[serde(default)]
    pub center: [f64; 3],
    /// Half-size
    #[serde(default)]
    pub extent: [f64; 3],
    /// Per-object status
    #[serde(default = "ok_status")]
    pub status: String,
}

impl AabbRecord {
    /// The record as an AABB, if the simulator could measure the object
    pub fn aabb(&self) -> Option<Aabb> {
        (self.status == STATUS_OK).then(|| Aabb::from_center_extent(vec3(self.center), vec3(self.extent)))
    }
}

/// Extent of a catalog mesh
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeshExtent {
    /// Catalog id the extent was requested for
    pub mesh_path: String,
    /// Half-size of the mesh bounds
    #[serde(default)]
    pub extent: [f64; 3],
    /// Per-mesh status
    #[serde(default = "ok_status")]
    pub status: String,
}

/// A currently selected simulator object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedObject {
    /// Simulator object id
    pub object_id: String,
}

/// Object inspection and mutation commands
pub trait ObjectCommands {
    /// AABB of one object, or of every object when `object_id` is `None`
    fn get_obj_aabb(&mut self, object_id: Option<&str>) -> SceneResult<Vec<AabbRecord>>;

    /// Instantiate catalog entry `catalog_id` as `name` at a pose
    ///
    /// `rotation` is `[pitch, yaw, roll]` in degrees.
    fn add_obj(&mut self, name: &str, catalog_id: &str, location: [f64; 3], rotation: [f64; 3]) -> SceneResult<()>;

    /// Remove an object
    fn del_obj(&mut self, object_id: &str) -> SceneResult<()>;

    /// Objects currently selected in the editor
    fn list_selected(&mut self) -> SceneResult<Vec<SelectedObject>>;

    /// Mesh extents of catalog entries
    fn get_mesh_extent(&mut self, catalog_ids: &[String]) -> SceneResult<Vec<MeshExtent>>;
}

fn join(values: [f64; 3]) -> String {
    let [a, b, c] = values;
    format!("{a} {b} {c}")
}

impl<C: RequestClient> ObjectCommands for Simulator<C> {
    fn get_obj_aabb(&mut self, object_id: Option<&str>) -> SceneResult<Vec<AabbRecord>> {
        self.call(&format!("lych obj get_aabb {}", object_id.unwrap_or("-all")))
    }

    fn add_obj(&mut self, name: &str, catalog_id: &str, location: [f64; 3], rotation: [f64; 3]) -> SceneResult<()> {
        self.call_status(&format!("lych obj add {name} {catalog_id} {} {}", join(location), join(rotation)))
    }

    fn del_obj(&mut self, object_id: &str) -> SceneResult<()> {
        self.call_status(&format!("lych obj del {object_id}"))
    }

    fn list_selected(&mut self) -> SceneResult<Vec<SelectedObject>> {
        self.call("lych obj list_selected")
    }

    fn get_mesh_extent(&mut self, catalog_ids: &[String]) -> SceneResult<Vec<MeshExtent>> {
        self.call(&format!("lych obj get_mesh_extent {}", catalog_ids.join(" ")))
    }
}
