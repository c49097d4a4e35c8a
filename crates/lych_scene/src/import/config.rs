//! Import configuration

use serde::{Deserialize, Serialize};

use crate::config::{Config, ConfigError};

/// # Import Configuration
///
/// Names and tags the importer looks for in an exported scene description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportConfig {
    /// Name (and uid) given to the imported scene
    pub scene_name: String,
    /// Tag marking room entities
    pub room_tag: String,
    /// Tag marking object entities
    pub object_tag: String,
    /// Suffix appended to a room name to find its floor object and mesh
    pub floor_suffix: String,
    /// Substring identifying floor meshes in the mesh metadata
    pub floor_mesh_marker: String,
    /// Relation type linking an object to the room it rests in
    pub stable_relation: String,
}

impl ImportConfig {
    /// Create the default import configuration
    pub fn new() -> Self {
        Self {
            scene_name: "default_scene".to_string(),
            room_tag: "Semantics(room)".to_string(),
            object_tag: "Semantics(object)".to_string(),
            floor_suffix: ".floor".to_string(),
            floor_mesh_marker: "floor".to_string(),
            stable_relation: "StableAgainst".to_string(),
        }
    }

    /// Set the scene name
    pub fn with_scene_name(mut self, name: impl Into<String>) -> Self {
        self.scene_name = name.into();
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        let fields = [
            ("scene_name", &self.scene_name),
            ("room_tag", &self.room_tag),
            ("object_tag", &self.object_tag),
            ("floor_suffix", &self.floor_suffix),
            ("floor_mesh_marker", &self.floor_mesh_marker),
            ("stable_relation", &self.stable_relation),
        ];
        match fields.iter().find(|(_, value)| value.is_empty()) {
            Some((field, _)) => Err(ConfigError::Invalid(format!("{field} cannot be empty"))),
            None => Ok(()),
        }
    }
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl Config for ImportConfig {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigFormat;

    #[test]
    fn test_defaults_validate() {
        assert!(ImportConfig::default().validate().is_ok());
        let mut config = ImportConfig::default();
        config.room_tag.clear();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_partial_toml_falls_back_to_defaults() {
        let config = ImportConfig::parse("scene_name = \"office\"", ConfigFormat::Toml).unwrap();
        assert_eq!(config.scene_name, "office");
        assert_eq!(config.stable_relation, "StableAgainst");
    }
}
