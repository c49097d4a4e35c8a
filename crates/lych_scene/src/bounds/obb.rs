//! Oriented bounding box

use serde::{Deserialize, Serialize};

use super::aabb::box_corners;
use super::Aabb;
use crate::foundation::math::{linear_part, serde_mat3, serde_vec3, translation_part, Mat3, Mat4, Vec3};

/// Oriented Bounding Box
///
/// Local box `center ± extent`, rotated by `rotation` and then moved by
/// `translation`. Field order in the serialized form is
/// `center, extent, rotation, translation`, with `rotation` row-major.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Obb {
    /// Box center in the local frame
    #[serde(with = "serde_vec3")]
    pub center: Vec3,
    /// Half-size along each local axis
    #[serde(with = "serde_vec3")]
    pub extent: Vec3,
    /// Local-to-world rotation
    #[serde(with = "serde_mat3")]
    pub rotation: Mat3,
    /// Local-to-world translation
    #[serde(with = "serde_vec3")]
    pub translation: Vec3,
}

impl Obb {
    /// Create a new OBB
    pub fn new(center: Vec3, extent: Vec3, rotation: Mat3, translation: Vec3) -> Self {
        Self { center, extent, rotation, translation }
    }

    /// OBB for a local `min`/`max` extent placed by a model transform
    ///
    /// The rotation is the transform's upper-left 3x3 block and the
    /// translation its last column.
    pub fn from_transform(min: Vec3, max: Vec3, model: &Mat4) -> Self {
        Self {
            center: (min + max) / 2.0,
            extent: (max - min) / 2.0,
            rotation: linear_part(model),
            translation: translation_part(model),
        }
    }

    /// OBB with identity rotation matching an AABB
    pub fn axis_aligned(aabb: &Aabb) -> Self {
        Self::new(aabb.center, aabb.extent, Mat3::identity(), aabb.translation)
    }

    /// The eight world-space corners
    pub fn corners(&self) -> [Vec3; 8] {
        box_corners(self.center - self.extent, self.center + self.extent)
            .map(|corner| self.rotation * corner + self.translation)
    }

    /// Smallest world-space AABB enclosing this box
    pub fn enclosing_aabb(&self) -> Aabb {
        let corners = self.corners();
        let mut min = corners[0];
        let mut max = corners[0];
        for corner in &corners[1..] {
            min = min.inf(corner);
            max = max.sup(corner);
        }
        Aabb::from_min_max(min, max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use crate::foundation::math::mat4_from_rows;

    fn yaw_90() -> Mat3 {
        Mat3::new(
            0.0, -1.0, 0.0,
            1.0, 0.0, 0.0,
            0.0, 0.0, 1.0,
        )
    }

    #[test]
    fn test_identity_obb_matches_aabb() {
        let aabb = Aabb::new(Vec3::new(1.0, 2.0, 3.0), Vec3::new(0.5, 1.0, 1.5), Vec3::new(4.0, 0.0, 0.0));
        let obb = Obb::axis_aligned(&aabb);
        assert_eq!(obb.corners(), aabb.corners());
    }

    #[test]
    fn test_rotated_corners() {
        let obb = Obb::new(Vec3::zeros(), Vec3::new(2.0, 1.0, 1.0), yaw_90(), Vec3::new(0.0, 0.0, 5.0));
        let corners = obb.corners();

        // (-2, -1, -1) rotated by +90 degrees about z lands on (1, -2, -1)
        assert_relative_eq!(corners[0], Vec3::new(1.0, -2.0, 4.0));
        let enclosing = obb.enclosing_aabb();
        assert_relative_eq!(enclosing.extent, Vec3::new(1.0, 2.0, 1.0));
        assert_relative_eq!(enclosing.center, Vec3::new(0.0, 0.0, 5.0));
    }

    #[test]
    fn test_from_transform() {
        let model = mat4_from_rows(&[
            [0.0, -1.0, 0.0, 10.0],
            [1.0, 0.0, 0.0, 20.0],
            [0.0, 0.0, 1.0, 30.0],
            [0.0, 0.0, 0.0, 1.0],
        ]);
        let obb = Obb::from_transform(Vec3::new(-1.0, -2.0, 0.0), Vec3::new(1.0, 2.0, 4.0), &model);

        assert_eq!(obb.center, Vec3::new(0.0, 0.0, 2.0));
        assert_eq!(obb.extent, Vec3::new(1.0, 2.0, 2.0));
        assert_eq!(obb.rotation, yaw_90());
        assert_eq!(obb.translation, Vec3::new(10.0, 20.0, 30.0));
    }

    #[test]
    fn test_round_trip_is_exact() {
        let obb = Obb::new(
            Vec3::new(0.1, 0.2, 0.3),
            Vec3::new(1.0 / 3.0, 2.0 / 7.0, 1e-9),
            yaw_90(),
            Vec3::new(-12.345_678_901_234, 0.0, 7.5),
        );
        let json = serde_json::to_string(&obb).unwrap();
        let back: Obb = serde_json::from_str(&json).unwrap();
        assert_eq!(back, obb);

        let value = serde_json::to_value(obb).unwrap();
        assert_eq!(value["rotation"][0], serde_json::json!([0.0, -1.0, 0.0]));
    }
}
