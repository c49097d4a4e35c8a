//! Scene objects and their instance keys

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::bounds::Obb;
use crate::error::SceneError;

/// Stable per-instance key: object index plus a 3-part instance id
///
/// Printed as `"{object_index}_{id0}_{id1}_{id2}"`, which is also the
/// [`Object::uid`] format and the key matched against segmentation rasters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InstanceKey {
    /// Index of the source object in the exporter
    pub object_index: i64,
    /// Instance id triple
    pub instance_id: [i64; 3],
}

impl InstanceKey {
    /// Create a new key
    pub fn new(object_index: i64, instance_id: [i64; 3]) -> Self {
        Self { object_index, instance_id }
    }

    /// The key as a flat 4-tuple
    pub fn as_tuple(&self) -> [i64; 4] {
        let [a, b, c] = self.instance_id;
        [self.object_index, a, b, c]
    }
}

impl From<[i64; 4]> for InstanceKey {
    fn from(t: [i64; 4]) -> Self {
        Self::new(t[0], [t[1], t[2], t[3]])
    }
}

impl fmt::Display for InstanceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c] = self.instance_id;
        write!(f, "{}_{a}_{b}_{c}", self.object_index)
    }
}

impl FromStr for InstanceKey {
    type Err = SceneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts = s
            .split('_')
            .map(str::parse::<i64>)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| SceneError::malformed(format!("instance key `{s}` is not numeric")))?;
        match parts.as_slice() {
            [index, a, b, c] => Ok(Self::new(*index, [*a, *b, *c])),
            _ => Err(SceneError::malformed(format!(
                "instance key `{s}` must have 4 parts, found {}",
                parts.len()
            ))),
        }
    }
}

/// A placed scene object
///
/// Immutable after construction; `obb` is absent for objects the exporter
/// reported without a bounding extent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Object {
    name: String,
    uid: String,
    obb: Option<Obb>,
}

impl Object {
    /// Create a new object
    pub fn new(name: impl Into<String>, uid: impl Into<String>, obb: Option<Obb>) -> Self {
        Self { name: name.into(), uid: uid.into(), obb }
    }

    /// Catalog path identifier
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Stable instance key in string form
    pub fn uid(&self) -> &str {
        &self.uid
    }

    /// Oriented bounding box, if the object has an extent
    pub fn obb(&self) -> Option<&Obb> {
        self.obb.as_ref()
    }

    /// Parsed instance key, if the uid is in instance-key format
    pub fn instance_key(&self) -> Option<InstanceKey> {
        self.uid.parse().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instance_key_format() {
        let key = InstanceKey::new(12, [3, 0, -1]);
        assert_eq!(key.to_string(), "12_3_0_-1");
        assert_eq!("12_3_0_-1".parse::<InstanceKey>().unwrap(), key);
        assert_eq!(key.as_tuple(), [12, 3, 0, -1]);
    }

    #[test]
    fn test_instance_key_rejects_bad_input() {
        assert!("12_3_0".parse::<InstanceKey>().is_err());
        assert!("a_b_c_d".parse::<InstanceKey>().is_err());
    }

    #[test]
    fn test_object_without_obb_serializes_null() {
        let object = Object::new("chair", "1_0_0_0", None);
        let value = serde_json::to_value(&object).unwrap();
        assert_eq!(value, serde_json::json!({"name": "chair", "uid": "1_0_0_0", "obb": null}));
        assert_eq!(object.instance_key(), Some(InstanceKey::new(1, [0, 0, 0])));
    }
}
