//! Object visibility from segmentation rasters
//!
//! Segmentation rasters are stored sparsely as `{vals, indices, shape}`:
//! the dense raster is `vals[indices]` reshaped to `shape`. The object
//! raster holds one channel (object index) and the instance raster three
//! (instance id); stacking them per pixel yields the instance keys that
//! reach the image.

use std::collections::{BTreeMap, HashSet};
use std::io::{Read, Seek};
use std::path::Path;

use ndarray::{ArrayD, Axis};

use crate::archive::ArrayArchive;
use crate::error::{SceneError, SceneResult};
use crate::scene::{InstanceKey, Object};

/// Palette-compressed raster
#[derive(Debug, Clone, PartialEq)]
pub struct SparseRaster {
    /// Distinct values, one row per palette entry
    pub vals: ArrayD<i64>,
    /// Palette entry of every pixel, in row-major order
    pub indices: Vec<usize>,
    /// Dense raster shape (`[h, w]` or `[h, w, c]`)
    pub shape: Vec<usize>,
}

/// Row-major raster with `channels` values per pixel
#[derive(Debug, Clone, PartialEq)]
pub struct DenseRaster {
    /// Rows
    pub height: usize,
    /// Columns
    pub width: usize,
    /// Values per pixel
    pub channels: usize,
    /// Pixel values, `channels` per pixel
    pub data: Vec<i64>,
}

impl DenseRaster {
    /// Values of pixel `i`, `None` past the end of the raster
    pub fn pixel(&self, i: usize) -> Option<&[i64]> {
        let start = i.checked_mul(self.channels)?;
        self.data.get(start..start.checked_add(self.channels)?)
    }

    /// Number of pixels
    pub fn pixels(&self) -> usize {
        self.height.saturating_mul(self.width)
    }
}

impl SparseRaster {
    /// Read the `vals`, `indices` and `shape` arrays of an archive
    pub fn from_archive<R: Read + Seek>(archive: &mut ArrayArchive<R>) -> SceneResult<Self> {
        let vals = archive.read_i64("vals")?;
        let indices = to_usize(archive.read_i64("indices")?, "indices")?;
        let shape = to_usize(archive.read_i64("shape")?, "shape")?;
        Ok(Self { vals, indices, shape })
    }

    /// Open a raster archive on disk
    pub fn load(path: impl AsRef<Path>) -> SceneResult<Self> {
        Self::from_archive(&mut ArrayArchive::open(path)?)
    }

    /// Expand to the dense raster
    pub fn expand(&self) -> SceneResult<DenseRaster> {
        let (height, width) = match self.shape.as_slice() {
            [h, w] | [h, w, _] => (*h, *w),
            other => return Err(SceneError::malformed(format!("raster shape {other:?} is not 2D"))),
        };
        if self.vals.ndim() == 0 {
            return Err(SceneError::malformed("raster palette is a scalar"));
        }
        let channels = self.vals.shape()[1..]
            .iter()
            .try_fold(1_usize, |acc, &n| acc.checked_mul(n))
            .ok_or_else(|| SceneError::malformed(format!("palette shape {:?} overflows", self.vals.shape())))?;
        let pixels = height
            .checked_mul(width)
            .ok_or_else(|| SceneError::malformed(format!("raster shape {:?} overflows", self.shape)))?;
        let capacity = pixels
            .checked_mul(channels)
            .ok_or_else(|| SceneError::malformed(format!("raster shape {:?} overflows", self.shape)))?;
        if self.indices.len() != pixels
            || self.shape.get(2).is_some_and(|&c| c != channels)
        {
            return Err(SceneError::malformed(format!(
                "{} palette indices of width {channels} do not fill shape {:?}",
                self.indices.len(),
                self.shape
            )));
        }

        let palette = self.vals.len_of(Axis(0));
        let rows: Vec<Vec<i64>> = self
            .vals
            .axis_iter(Axis(0))
            .map(|row| row.iter().copied().collect())
            .collect();
        let mut data = Vec::with_capacity(capacity);
        for &entry in &self.indices {
            let row = rows.get(entry).ok_or_else(|| {
                SceneError::malformed(format!("palette index {entry} beyond {palette} entries"))
            })?;
            data.extend_from_slice(row);
        }
        Ok(DenseRaster { height, width, channels, data })
    }
}

fn to_usize(array: ArrayD<i64>, what: &str) -> SceneResult<Vec<usize>> {
    array
        .iter()
        .map(|&v| usize::try_from(v).map_err(|_| SceneError::malformed(format!("raster {what} holds {v}"))))
        .collect()
}

/// Distinct instance keys present in a pair of segmentation rasters
pub fn visible_instances(objects: &SparseRaster, instances: &SparseRaster) -> SceneResult<HashSet<InstanceKey>> {
    let objects = objects.expand()?;
    let instances = instances.expand()?;
    if objects.channels != 1 || instances.channels != 3 {
        return Err(SceneError::malformed(format!(
            "expected 1 object channel and 3 instance channels, got {} and {}",
            objects.channels, instances.channels
        )));
    }
    if (objects.height, objects.width) != (instances.height, instances.width) {
        return Err(SceneError::malformed(format!(
            "object raster is {}x{} but instance raster is {}x{}",
            objects.height, objects.width, instances.height, instances.width
        )));
    }

    Ok((0..objects.pixels())
        .filter_map(|i| match (objects.pixel(i)?, instances.pixel(i)?) {
            (&[index], &[a, b, c]) => Some(InstanceKey::new(index, [a, b, c])),
            _ => None,
        })
        .collect())
}

/// Visibility flag for every object, keyed by uid
pub fn compute_visibility<'a>(
    objects: impl IntoIterator<Item = &'a Object>,
    visible: &HashSet<InstanceKey>,
) -> BTreeMap<String, bool> {
    objects
        .into_iter()
        .map(|object| {
            let seen = object.instance_key().is_some_and(|key| visible.contains(&key));
            (object.uid().to_string(), seen)
        })
        .collect()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use ndarray::{arr0, array, Array1};

    pub(crate) fn object_raster() -> SparseRaster {
        // 2x2 image: objects 5 and 7
        SparseRaster { vals: array![5_i64, 7].into_dyn(), indices: vec![0, 0, 1, 0], shape: vec![2, 2] }
    }

    pub(crate) fn instance_raster() -> SparseRaster {
        SparseRaster {
            vals: array![[1_i64, 0, 0], [2, 0, 0], [9, 9, 9]].into_dyn(),
            indices: vec![0, 1, 0, 0],
            shape: vec![2, 2, 3],
        }
    }

    #[test]
    fn test_expand() {
        let dense = instance_raster().expand().unwrap();
        assert_eq!(dense.channels, 3);
        assert_eq!(dense.pixel(1), Some(&[2, 0, 0][..]));
        assert_eq!(dense.pixel(3), Some(&[1, 0, 0][..]));
        assert_eq!(dense.pixel(4), None);
        assert_eq!(dense.pixel(usize::MAX), None);
    }

    #[test]
    fn test_expand_rejects_bad_layouts() {
        let mut raster = object_raster();
        raster.indices.push(0);
        assert!(matches!(raster.expand(), Err(SceneError::Malformed(_))));

        let mut raster = object_raster();
        raster.indices[0] = 4;
        assert!(matches!(raster.expand(), Err(SceneError::Malformed(_))));

        let raster = SparseRaster { vals: Array1::<i64>::zeros(1).into_dyn(), indices: vec![0], shape: vec![1] };
        assert!(matches!(raster.expand(), Err(SceneError::Malformed(_))));
    }

    #[test]
    fn test_expand_rejects_scalar_palette_and_huge_shapes() {
        let raster = SparseRaster { vals: arr0(5_i64).into_dyn(), indices: vec![0], shape: vec![1, 1] };
        assert!(matches!(raster.expand(), Err(SceneError::Malformed(_))));

        let mut raster = object_raster();
        raster.shape = vec![usize::MAX, 2];
        assert!(matches!(raster.expand(), Err(SceneError::Malformed(_))));

        let mut raster = instance_raster();
        raster.shape = vec![usize::MAX / 2, 1, 3];
        assert!(matches!(raster.expand(), Err(SceneError::Malformed(_))));
    }

    #[test]
    fn test_visible_instances() {
        let visible = visible_instances(&object_raster(), &instance_raster()).unwrap();
        let expected: HashSet<InstanceKey> =
            [[5, 1, 0, 0], [5, 2, 0, 0], [7, 1, 0, 0]].into_iter().map(InstanceKey::from).collect();
        assert_eq!(visible, expected);
    }

    #[test]
    fn test_compute_visibility() {
        let visible = visible_instances(&object_raster(), &instance_raster()).unwrap();
        let objects = [
            Object::new("chair", "5_1_0_0", None),
            Object::new("table", "7_2_0_0", None),
            Object::new("ghost", "not-a-key", None),
        ];

        let visibility = compute_visibility(&objects, &visible);
        assert!(visibility["5_1_0_0"]);
        assert!(!visibility["7_2_0_0"]);
        assert!(!visibility["not-a-key"]);
    }
}
