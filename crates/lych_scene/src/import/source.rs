//! Serde records of the exported scene description

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::{SceneError, SceneResult};

/// One entry of a frame's `Objects_*.json` list
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawObject {
    /// Exporter object name
    pub name: String,
    /// Exporter object index
    pub object_index: i64,
    /// Local minimum corner, absent for objects without geometry
    #[serde(default)]
    pub min: Option<[f64; 3]>,
    /// Local maximum corner, absent for objects without geometry
    #[serde(default)]
    pub max: Option<[f64; 3]>,
    /// Row-major model matrices; the first one places the object
    #[serde(default)]
    pub model_matrices: Vec<[[f64; 4]; 4]>,
    /// Instance id triples; the first one identifies the object
    #[serde(default)]
    pub instance_ids: Vec<[i64; 3]>,
}

/// Relation type wrapper as written by the solver
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RelationKind {
    /// Relation type name, e.g. `StableAgainst`
    pub relation_type: String,
}

/// A relation from one scene entity to another
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Relation {
    /// Nested relation descriptor
    #[serde(default)]
    pub relation: Option<RelationKind>,
    /// Flat relation type, accepted when the nested form is absent
    #[serde(default)]
    pub relation_type: Option<String>,
    /// Name of the related entity
    pub target_name: String,
}

impl Relation {
    /// Relation type, from whichever form is present
    pub fn kind(&self) -> Option<&str> {
        self.relation
            .as_ref()
            .map(|r| r.relation_type.as_str())
            .or(self.relation_type.as_deref())
    }
}

/// A solver entity (room, object, ...)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SceneEntity {
    /// Name of the exported object backing this entity
    #[serde(default)]
    pub obj: Option<String>,
    /// Semantic tags
    #[serde(default)]
    pub tags: Vec<String>,
    /// Outgoing relations
    #[serde(default)]
    pub relations: Vec<Relation>,
}

impl SceneEntity {
    /// Whether the entity carries `tag`
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}

/// The solver state document, entities in document order
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SolveState {
    /// `(entity name, entity)` pairs
    pub objs: Vec<(String, SceneEntity)>,
}

impl SolveState {
    /// Parse the `objs` mapping of a solver state document
    pub fn from_value(value: &Value) -> SceneResult<Self> {
        let objs: &Map<String, Value> = value
            .get("objs")
            .and_then(Value::as_object)
            .ok_or_else(|| SceneError::malformed("solve state has no `objs` mapping"))?;
        let objs = objs
            .iter()
            .map(|(name, entity)| {
                SceneEntity::deserialize(entity)
                    .map(|entity| (name.clone(), entity))
                    .map_err(|err| SceneError::malformed(format!("entity `{name}`: {err}")))
            })
            .collect::<SceneResult<_>>()?;
        Ok(Self { objs })
    }

    /// Parse solver state JSON text
    pub fn from_json(text: &str) -> SceneResult<Self> {
        Self::from_value(&serde_json::from_str(text)?)
    }

    /// Look up an entity by name
    pub fn get(&self, name: &str) -> Option<&SceneEntity> {
        self.objs.iter().find(|(n, _)| n == name).map(|(_, e)| e)
    }
}

/// One entry of `saved_mesh.json`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MeshRecord {
    /// Exported object the mesh belongs to
    pub object_name: String,
    /// Archive file name, relative to the mesh folder
    pub filename: String,
    /// Prefix of the arrays inside the archive
    #[serde(deserialize_with = "id_as_string")]
    pub mesh_id: String,
}

fn id_as_string<'de, D: serde::Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!("mesh id must be a string or number, got {other}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_solve_state_keeps_document_order() {
        let state = SolveState::from_json(
            r#"{"objs": {
                "zeta_0/0": {"obj": "zeta_0/0", "tags": ["Semantics(room)"], "relations": []},
                "alpha_0/0": {"obj": "alpha_0/0", "tags": ["Semantics(room)"], "relations": []},
                "chair": {"obj": "chair.001", "tags": ["Semantics(object)"],
                          "relations": [{"relation": {"relation_type": "StableAgainst"}, "target_name": "zeta_0/0"}]}
            }}"#,
        )
        .unwrap();

        let names: Vec<_> = state.objs.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["zeta_0/0", "alpha_0/0", "chair"]);
        assert_eq!(state.get("chair").unwrap().relations[0].kind(), Some("StableAgainst"));
    }

    #[test]
    fn test_flat_relation_type() {
        let relation: Relation =
            serde_json::from_str(r#"{"relation_type": "StableAgainst", "target_name": "room"}"#).unwrap();
        assert_eq!(relation.kind(), Some("StableAgainst"));
    }

    #[test]
    fn test_missing_objs_is_malformed() {
        assert!(matches!(SolveState::from_json("{}"), Err(SceneError::Malformed(_))));
    }

    #[test]
    fn test_mesh_id_accepts_numbers() {
        let record: MeshRecord =
            serde_json::from_str(r#"{"object_name": "a.floor", "filename": "a.npz", "mesh_id": 7}"#).unwrap();
        assert_eq!(record.mesh_id, "7");
    }

    #[test]
    fn test_raw_object_without_bounds() {
        let raw: RawObject = serde_json::from_str(
            r#"{"name": "camera", "object_index": 3, "min": null, "max": null,
                "model_matrices": [], "instance_ids": [[0, 0, 0]]}"#,
        )
        .unwrap();
        assert!(raw.min.is_none());
        assert_eq!(raw.instance_ids[0], [0, 0, 0]);
    }
}
