//! In-memory simulator for planner tests

use std::collections::HashMap;

use super::client::STATUS_OK;
use super::commands::{AabbRecord, MeshExtent, ObjectCommands, SelectedObject};
use crate::error::{SceneError, SceneResult};

/// Simulator state kept in plain collections; every mutation is logged
#[derive(Debug, Default)]
pub(crate) struct FakeSimulator {
    pub objects: Vec<AabbRecord>,
    pub mesh_extents: HashMap<String, [f64; 3]>,
    pub selected: Vec<String>,
    pub log: Vec<String>,
}

impl FakeSimulator {
    pub(crate) fn with_object(mut self, id: &str, center: [f64; 3], extent: [f64; 3]) -> Self {
        self.objects.push(AabbRecord { object_id: id.to_string(), center, extent, status: STATUS_OK.to_string() });
        self
    }

    pub(crate) fn with_mesh(mut self, catalog_id: &str, extent: [f64; 3]) -> Self {
        self.mesh_extents.insert(catalog_id.to_string(), extent);
        self
    }

    pub(crate) fn mutations(&self) -> Vec<&str> {
        self.log.iter().map(String::as_str).collect()
    }

    pub(crate) fn has_object(&self, id: &str) -> bool {
        self.objects.iter().any(|o| o.object_id == id)
    }
}

impl ObjectCommands for FakeSimulator {
    fn get_obj_aabb(&mut self, object_id: Option<&str>) -> SceneResult<Vec<AabbRecord>> {
        Ok(self
            .objects
            .iter()
            .filter(|o| object_id.map_or(true, |id| o.object_id == id))
            .cloned()
            .collect())
    }

    fn add_obj(&mut self, name: &str, catalog_id: &str, location: [f64; 3], _rotation: [f64; 3]) -> SceneResult<()> {
        let extent = *self.mesh_extents.get(catalog_id).ok_or_else(|| SceneError::CollaboratorFault {
            command: format!("add {name}"),
            status: "unknown mesh".to_string(),
        })?;
        self.objects.push(AabbRecord {
            object_id: name.to_string(),
            center: location,
            extent,
            status: STATUS_OK.to_string(),
        });
        self.log.push(format!("add {catalog_id}"));
        Ok(())
    }

    fn del_obj(&mut self, object_id: &str) -> SceneResult<()> {
        let before = self.objects.len();
        self.objects.retain(|o| o.object_id != object_id);
        if self.objects.len() == before {
            return Err(SceneError::CollaboratorFault {
                command: format!("del {object_id}"),
                status: "unknown object".to_string(),
            });
        }
        self.log.push(format!("del {object_id}"));
        Ok(())
    }

    fn list_selected(&mut self) -> SceneResult<Vec<SelectedObject>> {
        Ok(self.selected.iter().map(|id| SelectedObject { object_id: id.clone() }).collect())
    }

    fn get_mesh_extent(&mut self, catalog_ids: &[String]) -> SceneResult<Vec<MeshExtent>> {
        Ok(catalog_ids
            .iter()
            .map(|id| match self.mesh_extents.get(id) {
                Some(extent) => MeshExtent { mesh_path: id.clone(), extent: *extent, status: STATUS_OK.to_string() },
                None => MeshExtent { mesh_path: id.clone(), extent: [0.0; 3], status: "not found".to_string() },
            })
            .collect())
    }
}
