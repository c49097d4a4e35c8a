//! Numeric array archives (`.npz`)
//!
//! Mesh exports, camera parameters and segmentation rasters all arrive as
//! NumPy archives whose element type depends on the exporter. Readers here
//! accept any integer (or float) width and widen to `i64` (or `f64`).

use std::fs::File;
use std::io::{ErrorKind, Read, Seek, Write};
use std::path::Path;

use ndarray::{Array1, ArrayD, IxDyn, OwnedRepr};
use ndarray_npy::{NpzReader, NpzWriter};

use crate::error::{SceneError, SceneResult};

fn archive_error(err: impl std::fmt::Display) -> SceneError {
    SceneError::Archive(err.to_string())
}

/// Open a file, mapping a missing path to [`SceneError::NotFound`]
pub(crate) fn open_existing(path: &Path) -> SceneResult<File> {
    File::open(path).map_err(|err| match err.kind() {
        ErrorKind::NotFound => SceneError::NotFound(path.display().to_string()),
        _ => SceneError::Io(err),
    })
}

/// Read access to the named arrays of an `.npz` archive
pub struct ArrayArchive<R: Read + Seek> {
    reader: NpzReader<R>,
    names: Vec<String>,
    source: String,
}

impl ArrayArchive<File> {
    /// Open an archive on disk
    pub fn open(path: impl AsRef<Path>) -> SceneResult<Self> {
        let path = path.as_ref();
        Self::from_reader(open_existing(path)?, path.display().to_string())
    }
}

impl<R: Read + Seek> ArrayArchive<R> {
    /// Wrap any seekable reader; `source` is only used in error messages
    pub fn from_reader(reader: R, source: impl Into<String>) -> SceneResult<Self> {
        let mut reader = NpzReader::new(reader).map_err(archive_error)?;
        let names = reader.names().map_err(archive_error)?;
        Ok(Self { reader, names, source: source.into() })
    }

    /// Whether an array called `name` is stored in the archive
    pub fn contains(&self, name: &str) -> bool {
        self.entry_name(name).is_some()
    }

    fn entry_name(&self, name: &str) -> Option<String> {
        let with_suffix = format!("{name}.npy");
        self.names
            .iter()
            .find(|entry| **entry == with_suffix || *entry == name)
            .cloned()
    }

    fn entry(&self, name: &str) -> SceneResult<String> {
        self.entry_name(name)
            .ok_or_else(|| SceneError::NotFound(format!("array `{name}` in {}", self.source)))
    }

    fn wrong_type(&self, name: &str, expected: &str) -> SceneError {
        SceneError::Malformed(format!(
            "array `{name}` in {} is not stored as {expected}",
            self.source
        ))
    }

    /// Read a floating point array of any shape as `f64`
    pub fn read_f64(&mut self, name: &str) -> SceneResult<ArrayD<f64>> {
        let entry = self.entry(name)?;
        if let Ok(array) = self.reader.by_name::<OwnedRepr<f64>, IxDyn>(&entry) {
            return Ok(array);
        }
        if let Ok(array) = self.reader.by_name::<OwnedRepr<f32>, IxDyn>(&entry) {
            return Ok(array.mapv(f64::from));
        }
        Err(self.wrong_type(name, "f32/f64"))
    }

    /// Read an integer array of any shape and width as `i64`
    pub fn read_i64(&mut self, name: &str) -> SceneResult<ArrayD<i64>> {
        let entry = self.entry(name)?;
        if let Ok(array) = self.reader.by_name::<OwnedRepr<i64>, IxDyn>(&entry) {
            return Ok(array);
        }
        if let Ok(array) = self.reader.by_name::<OwnedRepr<i32>, IxDyn>(&entry) {
            return Ok(array.mapv(i64::from));
        }
        if let Ok(array) = self.reader.by_name::<OwnedRepr<u32>, IxDyn>(&entry) {
            return Ok(array.mapv(i64::from));
        }
        if let Ok(array) = self.reader.by_name::<OwnedRepr<i16>, IxDyn>(&entry) {
            return Ok(array.mapv(i64::from));
        }
        if let Ok(array) = self.reader.by_name::<OwnedRepr<u16>, IxDyn>(&entry) {
            return Ok(array.mapv(i64::from));
        }
        if let Ok(array) = self.reader.by_name::<OwnedRepr<u8>, IxDyn>(&entry) {
            return Ok(array.mapv(i64::from));
        }
        if let Ok(array) = self.reader.by_name::<OwnedRepr<i8>, IxDyn>(&entry) {
            return Ok(array.mapv(i64::from));
        }
        if let Ok(array) = self.reader.by_name::<OwnedRepr<u64>, IxDyn>(&entry) {
            if let Some(too_large) = array.iter().find(|v| i64::try_from(**v).is_err()) {
                return Err(SceneError::Malformed(format!(
                    "array `{name}` in {} holds {too_large}, beyond the i64 range",
                    self.source
                )));
            }
            return Ok(array.mapv(|v| i64::try_from(v).unwrap_or(i64::MAX)));
        }
        Err(self.wrong_type(name, "an integer type"))
    }

    /// Read a flat byte array
    pub fn read_bytes(&mut self, name: &str) -> SceneResult<Vec<u8>> {
        let entry = self.entry(name)?;
        let array = self
            .reader
            .by_name::<OwnedRepr<u8>, ndarray::Ix1>(&entry)
            .map_err(|_| self.wrong_type(name, "a flat u8 array"))?;
        Ok(array.to_vec())
    }
}

/// Write a single flat byte array as an `.npz` archive
pub fn write_bytes<W: Write + Seek>(writer: W, name: &str, bytes: &[u8]) -> SceneResult<W> {
    let mut npz = NpzWriter::new(writer);
    npz.add_array(name, &Array1::from(bytes.to_vec()))
        .map_err(archive_error)?;
    npz.finish().map_err(archive_error)
}
