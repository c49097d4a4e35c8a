//! Axis-aligned bounding box

use serde::{Deserialize, Serialize};

use crate::foundation::math::{serde_vec3, Vec3};

/// Axis-Aligned Bounding Box
///
/// The box spans `translation + center ± extent`. `extent` is a half-size and
/// is stored as given; consumers that divide by volume clamp it themselves
/// (see [`super::overlap`]).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    /// Box center in the local frame
    #[serde(with = "serde_vec3")]
    pub center: Vec3,
    /// Half-size along each axis
    #[serde(with = "serde_vec3")]
    pub extent: Vec3,
    /// Offset applied to every corner
    #[serde(with = "serde_vec3")]
    pub translation: Vec3,
}

impl Aabb {
    /// Create a new AABB
    pub fn new(center: Vec3, extent: Vec3, translation: Vec3) -> Self {
        Self { center, extent, translation }
    }

    /// Create an untranslated AABB from center and half-extent
    pub fn from_center_extent(center: Vec3, extent: Vec3) -> Self {
        Self::new(center, extent, Vec3::zeros())
    }

    /// Create an untranslated AABB spanning two corner points
    pub fn from_min_max(min: Vec3, max: Vec3) -> Self {
        Self::from_center_extent((min + max) * 0.5, (max - min) * 0.5)
    }

    /// World-space center (center + translation)
    pub fn world_center(&self) -> Vec3 {
        self.center + self.translation
    }

    /// World-space minimum corner
    pub fn min(&self) -> Vec3 {
        self.world_center() - self.extent
    }

    /// World-space maximum corner
    pub fn max(&self) -> Vec3 {
        self.world_center() + self.extent
    }

    /// Z coordinate of the top face
    pub fn top(&self) -> f64 {
        self.max().z
    }

    /// The eight world-space corners
    pub fn corners(&self) -> [Vec3; 8] {
        box_corners(self.center - self.extent, self.center + self.extent)
            .map(|corner| corner + self.translation)
    }

    /// Check if this AABB contains a point
    pub fn contains_point(&self, point: Vec3) -> bool {
        let (min, max) = (self.min(), self.max());
        (0..3).all(|axis| point[axis] >= min[axis] && point[axis] <= max[axis])
    }
}

/// Corners of the box spanned by `min` and `max`
///
/// Order: the bottom face counter-clockwise starting at `min`, then the top
/// face in the same order.
pub fn box_corners(min: Vec3, max: Vec3) -> [Vec3; 8] {
    [
        Vec3::new(min.x, min.y, min.z),
        Vec3::new(max.x, min.y, min.z),
        Vec3::new(max.x, max.y, min.z),
        Vec3::new(min.x, max.y, min.z),
        Vec3::new(min.x, min.y, max.z),
        Vec3::new(max.x, min.y, max.z),
        Vec3::new(max.x, max.y, max.z),
        Vec3::new(min.x, max.y, max.z),
    ]
}
