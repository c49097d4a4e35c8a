//! Dictionary form and on-disk persistence of the scene model
//!
//! The dictionary form is a nested JSON value whose field names are the
//! compatibility surface:
//! `{name, uid, levels: [{name, uid, regions: [{name, uid, polygon, obb, objects}]}]}`.
//! On disk it is stored either as JSON or as an `.npz` archive holding the
//! JSON text in a single byte array.

use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::Path;

use log::debug;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use super::{Object, Polygon, SemanticLevel, SemanticRegion, SemanticScene};
use crate::archive::{self, ArrayArchive};
use crate::bounds::{Aabb, Obb};
use crate::error::{SceneError, SceneResult};

/// Name of the archive entry holding a persisted scene
pub const SCENE_ARCHIVE_ENTRY: &str = "data";

/// JSON has no NaN or infinity; serde_json would write them as `null`
trait FiniteGeometry {
    fn is_finite(&self) -> bool;
}

fn all_finite<'a>(values: impl IntoIterator<Item = &'a f64>) -> bool {
    values.into_iter().all(|v| v.is_finite())
}

impl FiniteGeometry for Aabb {
    fn is_finite(&self) -> bool {
        all_finite(self.center.iter().chain(&self.extent).chain(&self.translation))
    }
}

impl FiniteGeometry for Obb {
    fn is_finite(&self) -> bool {
        all_finite(self.center.iter().chain(&self.extent).chain(&self.rotation).chain(&self.translation))
    }
}

impl FiniteGeometry for Polygon {
    fn is_finite(&self) -> bool {
        std::iter::once(self.exterior())
            .chain(self.holes().iter().map(Vec::as_slice))
            .all(|ring| all_finite(ring.iter().flat_map(|p| p.iter())))
    }
}

impl FiniteGeometry for Object {
    fn is_finite(&self) -> bool {
        self.obb().map_or(true, FiniteGeometry::is_finite)
    }
}

impl FiniteGeometry for SemanticRegion {
    fn is_finite(&self) -> bool {
        self.polygon().is_finite()
            && self.obb().map_or(true, FiniteGeometry::is_finite)
            && self.objects().iter().all(FiniteGeometry::is_finite)
    }
}

impl FiniteGeometry for SemanticLevel {
    fn is_finite(&self) -> bool {
        self.regions().iter().all(FiniteGeometry::is_finite)
    }
}

impl FiniteGeometry for SemanticScene {
    fn is_finite(&self) -> bool {
        self.levels().iter().all(FiniteGeometry::is_finite)
    }
}

fn to_value<T: Serialize + FiniteGeometry>(item: &T, what: &str) -> SceneResult<Value> {
    if !item.is_finite() {
        return Err(SceneError::malformed(format!("{what} holds non-finite geometry")));
    }
    Ok(serde_json::to_value(item)?)
}

fn from_value<T: DeserializeOwned>(value: &Value, what: &str) -> SceneResult<T> {
    T::deserialize(value).map_err(|err| SceneError::malformed(format!("invalid {what}: {err}")))
}

macro_rules! impl_dict_form {
    ($ty:ty, $what:literal) => {
        impl $ty {
            /// Nested dictionary form holding every field needed to rebuild an equal value
            ///
            /// Non-finite coordinates are rejected as malformed.
            pub fn to_dict(&self) -> SceneResult<Value> {
                to_value(self, $what)
            }

            /// Rebuild from the dictionary form
            pub fn from_dict(value: &Value) -> SceneResult<Self> {
                from_value(value, $what)
            }
        }
    };
}

impl_dict_form!(Aabb, "AABB");
impl_dict_form!(Obb, "OBB");
impl_dict_form!(Object, "object");
impl_dict_form!(SemanticRegion, "region");
impl_dict_form!(SemanticLevel, "level");
impl_dict_form!(SemanticScene, "scene");

enum Format {
    Json,
    Archive,
}

fn format_of(path: &Path) -> SceneResult<Format> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => Ok(Format::Json),
        Some("npz") => Ok(Format::Archive),
        _ => Err(SceneError::malformed(format!(
            "unsupported scene file extension: {}",
            path.display()
        ))),
    }
}

impl SemanticScene {
    /// Pretty JSON text of the dictionary form
    pub fn to_json(&self) -> SceneResult<String> {
        Ok(serde_json::to_string_pretty(&self.to_dict()?)?)
    }

    /// Parse JSON text produced by [`SemanticScene::to_json`]
    pub fn from_json(text: &str) -> SceneResult<Self> {
        let value: Value = serde_json::from_str(text)?;
        Self::from_dict(&value)
    }

    /// Write the scene; `.json` writes text, `.npz` writes an archive
    pub fn save(&self, path: impl AsRef<Path>) -> SceneResult<()> {
        let path = path.as_ref();
        let text = self.to_json()?;
        match format_of(path)? {
            Format::Json => std::fs::write(path, text)?,
            Format::Archive => {
                let file = BufWriter::new(File::create(path)?);
                archive::write_bytes(file, SCENE_ARCHIVE_ENTRY, text.as_bytes())?.flush()?;
            }
        }
        debug!("Saved scene '{}' to {}", self.name(), path.display());
        Ok(())
    }

    /// Read a scene written by [`SemanticScene::save`]
    pub fn load(path: impl AsRef<Path>) -> SceneResult<Self> {
        let path = path.as_ref();
        let text = match format_of(path)? {
            Format::Json => {
                let bytes = archive::open_existing(path).and_then(|mut file| {
                    let mut buf = Vec::new();
                    file.read_to_end(&mut buf)?;
                    Ok(buf)
                })?;
                String::from_utf8(bytes)
                    .map_err(|_| SceneError::malformed(format!("{} is not UTF-8", path.display())))?
            }
            Format::Archive => {
                let bytes = ArrayArchive::open(path)?.read_bytes(SCENE_ARCHIVE_ENTRY)?;
                String::from_utf8(bytes)
                    .map_err(|_| SceneError::malformed(format!("data entry of {} is not UTF-8", path.display())))?
            }
        };
        Self::from_json(&text)
    }
}
