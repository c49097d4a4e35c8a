//! Object and scene-graph assembly

use std::collections::{BTreeMap, HashMap};

use log::{debug, warn};

use super::config::ImportConfig;
use super::source::{RawObject, SolveState};
use crate::bounds::Obb;
use crate::error::{SceneError, SceneResult};
use crate::foundation::math::{mat4_from_rows, vec3};
use crate::scene::{InstanceKey, Object, Polygon, SemanticLevel, SemanticRegion, SemanticScene};

/// Imported objects by exporter name, in first-seen order
///
/// A later object with an already seen name replaces the earlier one in place.
#[derive(Debug, Clone, Default)]
pub struct ObjectTable {
    objects: Vec<Object>,
    index: HashMap<String, usize>,
}

impl ObjectTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an object, replacing one with the same name
    pub fn insert(&mut self, object: Object) {
        match self.index.get(object.name()) {
            Some(&slot) => self.objects[slot] = object,
            None => {
                self.index.insert(object.name().to_string(), self.objects.len());
                self.objects.push(object);
            }
        }
    }

    /// Look up an object by name
    pub fn get(&self, name: &str) -> Option<&Object> {
        self.index.get(name).map(|&slot| &self.objects[slot])
    }

    /// Look up an object by name, failing with `NotFound`
    pub fn require(&self, name: &str) -> SceneResult<&Object> {
        self.get(name)
            .ok_or_else(|| SceneError::not_found(format!("object `{name}`")))
    }

    /// Iterate over all objects
    pub fn iter(&self) -> impl Iterator<Item = &Object> {
        self.objects.iter()
    }

    /// Number of objects
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Whether the table is empty
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

impl FromIterator<Object> for ObjectTable {
    fn from_iter<I: IntoIterator<Item = Object>>(iter: I) -> Self {
        let mut table = Self::new();
        for object in iter {
            table.insert(object);
        }
        table
    }
}

fn build_object(raw: &RawObject) -> SceneResult<Object> {
    let instance_id = raw.instance_ids.first().ok_or_else(|| {
        SceneError::malformed(format!("object `{}` has no instance id", raw.name))
    })?;
    let uid = InstanceKey::new(raw.object_index, *instance_id).to_string();

    let obb = match (raw.min, raw.max) {
        (Some(min), Some(max)) => {
            let model = raw.model_matrices.first().ok_or_else(|| {
                SceneError::malformed(format!("object `{}` has bounds but no model matrix", raw.name))
            })?;
            Some(Obb::from_transform(vec3(min), vec3(max), &mat4_from_rows(model)))
        }
        _ => {
            debug!("Object {} ({}) has no bounding box", raw.name, raw.object_index);
            None
        }
    };

    Ok(Object::new(raw.name.clone(), uid, obb))
}

/// Convert raw exporter objects into scene objects
pub fn build_objects(raw_objects: &[RawObject]) -> SceneResult<ObjectTable> {
    raw_objects.iter().map(build_object).collect()
}

/// Level index encoded in a room name (`living-room_3/0` → 3)
pub fn room_level(name: &str) -> SceneResult<i64> {
    let stem = name.split('/').next().unwrap_or(name);
    stem.split('_')
        .nth(1)
        .and_then(|field| field.parse().ok())
        .ok_or_else(|| SceneError::malformed(format!("room name `{name}` carries no level index")))
}

/// Assemble the scene graph from solver state, objects and floor footprints
///
/// Every semantic object must rest against exactly one entity through the
/// stable relation. Rooms become regions grouped by their level index, levels
/// in ascending index order and regions in solver order.
pub fn create_scene(
    config: &ImportConfig,
    state: &SolveState,
    objects: &ObjectTable,
    floors: &HashMap<String, Polygon>,
) -> SceneResult<SemanticScene> {
    let mut children: HashMap<&str, Vec<&str>> = HashMap::new();
    for (name, entity) in state.objs.iter().filter(|(_, e)| e.has_tag(&config.object_tag)) {
        let mut targets: Vec<&str> = Vec::new();
        for relation in &entity.relations {
            if relation.kind() == Some(config.stable_relation.as_str())
                && !targets.contains(&relation.target_name.as_str())
            {
                targets.push(&relation.target_name);
            }
        }
        let [target] = targets.as_slice() else {
            return Err(SceneError::malformed(format!(
                "object `{name}` rests against {} entities ({}), expected exactly one",
                targets.len(),
                targets.join(", ")
            )));
        };
        let obj = entity
            .obj
            .as_deref()
            .ok_or_else(|| SceneError::malformed(format!("object entity `{name}` names no object")))?;
        children.entry(*target).or_default().push(obj);
    }

    let mut levels: BTreeMap<i64, SemanticLevel> = BTreeMap::new();
    for (room, _) in state.objs.iter().filter(|(_, e)| e.has_tag(&config.room_tag)) {
        let floor_name = format!("{room}{}", config.floor_suffix);
        let polygon = floors
            .get(&floor_name)
            .ok_or_else(|| SceneError::not_found(format!("floor mesh `{floor_name}`")))?;
        let floor = objects.require(&floor_name)?;

        let mut region = SemanticRegion::new(room.clone(), floor.uid(), polygon.clone(), floor.obb().copied());
        for child in children.remove(room.as_str()).unwrap_or_default() {
            region.push_object(objects.require(child)?.clone());
        }

        let index = room_level(room)?;
        levels
            .entry(index)
            .or_insert_with(|| {
                let name = format!("level_{index}");
                SemanticLevel::new(name.clone(), name)
            })
            .push_region(region);
    }

    for (target, orphans) in &children {
        warn!("{} object(s) rest against `{target}`, which is not a room", orphans.len());
    }

    Ok(SemanticScene::new(config.scene_name.clone(), config.scene_name.clone())
        .with_levels(levels.into_values()))
}
