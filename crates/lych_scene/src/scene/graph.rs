//! Region, level and scene containers

use serde::{Deserialize, Serialize};

use super::{Object, Polygon};
use crate::bounds::Obb;

/// A room on a level: footprint, room volume and the objects resting in it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SemanticRegion {
    name: String,
    uid: String,
    polygon: Polygon,
    obb: Option<Obb>,
    objects: Vec<Object>,
}

impl SemanticRegion {
    /// Create an empty region
    pub fn new(name: impl Into<String>, uid: impl Into<String>, polygon: Polygon, obb: Option<Obb>) -> Self {
        Self {
            name: name.into(),
            uid: uid.into(),
            polygon,
            obb,
            objects: Vec::new(),
        }
    }

    /// Add objects, consuming and returning the region
    pub fn with_objects(mut self, objects: impl IntoIterator<Item = Object>) -> Self {
        self.objects.extend(objects);
        self
    }

    /// Append an object
    pub fn push_object(&mut self, object: Object) {
        self.objects.push(object);
    }

    /// Room name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Region uid
    pub fn uid(&self) -> &str {
        &self.uid
    }

    /// Floor footprint
    pub fn polygon(&self) -> &Polygon {
        &self.polygon
    }

    /// Room volume
    pub fn obb(&self) -> Option<&Obb> {
        self.obb.as_ref()
    }

    /// Objects in insertion order
    pub fn objects(&self) -> &[Object] {
        &self.objects
    }

    /// All objects of the region
    pub fn get_all_objects(&self) -> Vec<&Object> {
        self.objects.iter().collect()
    }
}

/// A level of a building, grouping regions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SemanticLevel {
    name: String,
    uid: String,
    regions: Vec<SemanticRegion>,
}

impl SemanticLevel {
    /// Create an empty level
    pub fn new(name: impl Into<String>, uid: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            uid: uid.into(),
            regions: Vec::new(),
        }
    }

    /// Add regions, consuming and returning the level
    pub fn with_regions(mut self, regions: impl IntoIterator<Item = SemanticRegion>) -> Self {
        self.regions.extend(regions);
        self
    }

    /// Append a region
    pub fn push_region(&mut self, region: SemanticRegion) {
        self.regions.push(region);
    }

    /// Level name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Level uid
    pub fn uid(&self) -> &str {
        &self.uid
    }

    /// Regions in insertion order
    pub fn regions(&self) -> &[SemanticRegion] {
        &self.regions
    }

    /// Objects of every region, depth-first
    pub fn get_all_objects(&self) -> Vec<&Object> {
        self.regions.iter().flat_map(SemanticRegion::get_all_objects).collect()
    }

    /// All regions of the level
    pub fn get_all_regions(&self) -> Vec<&SemanticRegion> {
        self.regions.iter().collect()
    }
}

/// Root of the hierarchy: a scene made of levels
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SemanticScene {
    name: String,
    uid: String,
    levels: Vec<SemanticLevel>,
}

impl SemanticScene {
    /// Create an empty scene
    pub fn new(name: impl Into<String>, uid: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            uid: uid.into(),
            levels: Vec::new(),
        }
    }

    /// Add levels, consuming and returning the scene
    pub fn with_levels(mut self, levels: impl IntoIterator<Item = SemanticLevel>) -> Self {
        self.levels.extend(levels);
        self
    }

    /// Append a level
    pub fn push_level(&mut self, level: SemanticLevel) {
        self.levels.push(level);
    }

    /// Scene name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Scene uid
    pub fn uid(&self) -> &str {
        &self.uid
    }

    /// Levels in insertion order
    pub fn levels(&self) -> &[SemanticLevel] {
        &self.levels
    }

    /// Objects of every level, depth-first
    pub fn get_all_objects(&self) -> Vec<&Object> {
        self.levels.iter().flat_map(SemanticLevel::get_all_objects).collect()
    }

    /// Regions of every level, depth-first
    pub fn get_all_regions(&self) -> Vec<&SemanticRegion> {
        self.levels.iter().flat_map(SemanticLevel::get_all_regions).collect()
    }
}
