//! Math utilities and types
//!
//! Scene coordinates are kept in `f64` so that persisted float arrays survive
//! a save/load cycle bit-for-bit.

pub use nalgebra::{
    Vector2, Vector3,
    Matrix3, Matrix4,
};

/// 2D vector type
pub type Vec2 = Vector2<f64>;

/// 3D vector type
pub type Vec3 = Vector3<f64>;

/// 3x3 matrix type
pub type Mat3 = Matrix3<f64>;

/// 4x4 matrix type
pub type Mat4 = Matrix4<f64>;

/// Build a vector from a `[x, y, z]` array
pub fn vec3(values: [f64; 3]) -> Vec3 {
    Vec3::new(values[0], values[1], values[2])
}

/// Row-major nested array view of a 3x3 matrix
pub fn mat3_to_rows(m: &Mat3) -> [[f64; 3]; 3] {
    [
        [m[(0, 0)], m[(0, 1)], m[(0, 2)]],
        [m[(1, 0)], m[(1, 1)], m[(1, 2)]],
        [m[(2, 0)], m[(2, 1)], m[(2, 2)]],
    ]
}

/// Build a 3x3 matrix from row-major nested arrays
pub fn mat3_from_rows(rows: &[[f64; 3]; 3]) -> Mat3 {
    Mat3::new(
        rows[0][0], rows[0][1], rows[0][2],
        rows[1][0], rows[1][1], rows[1][2],
        rows[2][0], rows[2][1], rows[2][2],
    )
}

/// Build a 4x4 matrix from row-major nested arrays
pub fn mat4_from_rows(rows: &[[f64; 4]; 4]) -> Mat4 {
    Mat4::from_fn(|r, c| rows[r][c])
}

/// Upper-left rotation/scale block of a homogeneous transform
pub fn linear_part(m: &Mat4) -> Mat3 {
    m.fixed_view::<3, 3>(0, 0).into_owned()
}

/// Translation column of a homogeneous transform
pub fn translation_part(m: &Mat4) -> Vec3 {
    Vec3::new(m[(0, 3)], m[(1, 3)], m[(2, 3)])
}

/// Serde adapter storing a `Vec3` as `[x, y, z]`
pub mod serde_vec3 {
    use super::Vec3;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    /// Serialize as a flat array
    pub fn serialize<S: Serializer>(v: &Vec3, serializer: S) -> Result<S::Ok, S::Error> {
        [v.x, v.y, v.z].serialize(serializer)
    }

    /// Deserialize from a flat array
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec3, D::Error> {
        let values = <[f64; 3]>::deserialize(deserializer)?;
        Ok(super::vec3(values))
    }
}

/// Serde adapter storing a `Mat3` as row-major nested arrays
pub mod serde_mat3 {
    use super::Mat3;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    /// Serialize as `[[row0], [row1], [row2]]`
    pub fn serialize<S: Serializer>(m: &Mat3, serializer: S) -> Result<S::Ok, S::Error> {
        super::mat3_to_rows(m).serialize(serializer)
    }

    /// Deserialize from `[[row0], [row1], [row2]]`
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Mat3, D::Error> {
        let rows = <[[f64; 3]; 3]>::deserialize(deserializer)?;
        Ok(super::mat3_from_rows(&rows))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_major_round_trip() {
        let rows = [[1.0, 2.0, 3.0], [4.0, 5.0, 6.0], [7.0, 8.0, 9.0]];
        let m = mat3_from_rows(&rows);
        assert_eq!(m[(0, 1)], 2.0);
        assert_eq!(m[(1, 0)], 4.0);
        assert_eq!(mat3_to_rows(&m), rows);
    }

    #[test]
    fn test_transform_parts() {
        let rows = [
            [0.0, -1.0, 0.0, 10.0],
            [1.0, 0.0, 0.0, 20.0],
            [0.0, 0.0, 1.0, 30.0],
            [0.0, 0.0, 0.0, 1.0],
        ];
        let m = mat4_from_rows(&rows);
        assert_eq!(translation_part(&m), Vec3::new(10.0, 20.0, 30.0));
        assert_eq!(linear_part(&m)[(0, 1)], -1.0);
        assert_eq!(linear_part(&m)[(1, 0)], 1.0);
    }
}
