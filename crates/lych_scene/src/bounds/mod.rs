//! Bounding volumes
//!
//! Value types for axis-aligned and oriented boxes plus the overlap
//! measures (IoU, IoA) used to decide collisions during placement.
//!
//! - [`Aabb`] - center + half-extent + translation
//! - [`Obb`] - an [`Aabb`] with a rotation
//! - [`overlap`] - intersection volumes and thresholds

mod aabb;
mod obb;
pub mod overlap;

pub use aabb::{Aabb, box_corners};
pub use obb::Obb;
pub use overlap::{collide, intersection_volume, ioa, iou, EXTENT_EPSILON};
