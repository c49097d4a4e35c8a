//! Overlap measures between axis-aligned boxes
//!
//! Degenerate extents are clamped to [`EXTENT_EPSILON`] here, at the point of
//! use, so a flat or empty box still has a positive volume. The stored boxes
//! are never modified.

use super::Aabb;
use crate::foundation::math::Vec3;

/// Smallest half-extent used in volume computations
pub const EXTENT_EPSILON: f64 = 1e-6;

fn clamped_bounds(aabb: &Aabb) -> (Vec3, Vec3) {
    let extent = aabb.extent.map(|e| e.max(EXTENT_EPSILON));
    let center = aabb.world_center();
    (center - extent, center + extent)
}

fn span_volume(min: &Vec3, max: &Vec3) -> f64 {
    (max - min).map(|d| d.max(0.0)).product()
}

impl Aabb {
    /// Volume with degenerate extents clamped to a small positive value
    pub fn volume(&self) -> f64 {
        let (min, max) = clamped_bounds(self);
        span_volume(&min, &max)
    }
}

/// Volume shared by two boxes (0.0 when disjoint)
pub fn intersection_volume(a: &Aabb, b: &Aabb) -> f64 {
    let (min_a, max_a) = clamped_bounds(a);
    let (min_b, max_b) = clamped_bounds(b);
    span_volume(&min_a.sup(&min_b), &max_a.inf(&max_b))
}

/// Intersection over union
pub fn iou(a: &Aabb, b: &Aabb) -> f64 {
    let inter = intersection_volume(a, b);
    let union = a.volume() + b.volume() - inter;
    if union > 0.0 {
        inter / union
    } else {
        0.0
    }
}

/// Intersection over the volume of `object`
///
/// Measures how much of `object` lies inside `region`; used to decide which
/// items sit on a table.
pub fn ioa(object: &Aabb, region: &Aabb) -> f64 {
    intersection_volume(object, region) / object.volume()
}

/// Whether two boxes overlap with an IoU of at least `threshold`
pub fn collide(a: &Aabb, b: &Aabb, threshold: f64) -> bool {
    iou(a, b) >= threshold
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn cube(x: f64, y: f64, z: f64, half: f64) -> Aabb {
        Aabb::from_center_extent(Vec3::new(x, y, z), Vec3::new(half, half, half))
    }

    #[test]
    fn test_identical_boxes() {
        let a = Aabb::from_center_extent(Vec3::new(0.3, -1.7, 2.9), Vec3::new(0.7, 1.1, 0.2));
        assert_eq!(iou(&a, &a), 1.0);
        assert!(collide(&a, &a, 1.0));
    }

    #[test]
    fn test_disjoint_boxes() {
        let a = cube(0.0, 0.0, 0.0, 1.0);
        let b = cube(5.0, 0.0, 0.0, 1.0);
        assert_eq!(iou(&a, &b), 0.0);
        assert!(!collide(&a, &b, 0.01));
    }

    #[test]
    fn test_half_overlap() {
        // Two 2x2x2 cubes sharing a 1x2x2 slab: 4 / (8 + 8 - 4)
        let a = cube(0.0, 0.0, 0.0, 1.0);
        let b = cube(1.0, 0.0, 0.0, 1.0);
        assert_relative_eq!(iou(&a, &b), 1.0 / 3.0);
    }

    #[test]
    fn test_collide_is_symmetric() {
        let a = Aabb::from_center_extent(Vec3::new(0.0, 0.0, 0.0), Vec3::new(2.0, 1.0, 1.0));
        let b = Aabb::from_center_extent(Vec3::new(1.5, 0.5, 0.0), Vec3::new(1.0, 1.0, 3.0));
        assert_eq!(iou(&a, &b), iou(&b, &a));
        for threshold in [0.0, 0.05, 0.1, 0.2, 0.5] {
            assert_eq!(collide(&a, &b, threshold), collide(&b, &a, threshold));
        }
    }

    #[test]
    fn test_iou_scale_invariant() {
        let a = Aabb::from_center_extent(Vec3::new(0.0, 0.0, 0.0), Vec3::new(2.0, 1.0, 1.0));
        let b = Aabb::from_center_extent(Vec3::new(1.5, 0.5, 0.0), Vec3::new(1.0, 1.0, 3.0));
        let scale = 7.5;
        let scaled = |aabb: &Aabb| Aabb::from_center_extent(aabb.center * scale, aabb.extent * scale);
        assert_relative_eq!(iou(&a, &b), iou(&scaled(&a), &scaled(&b)), epsilon = 1e-12);
    }

    #[test]
    fn test_degenerate_extent_is_clamped() {
        let flat = Aabb::from_center_extent(Vec3::zeros(), Vec3::new(1.0, 1.0, 0.0));
        let cube = cube(0.0, 0.0, 0.0, 1.0);

        assert!(flat.volume() > 0.0);
        assert_relative_eq!(ioa(&flat, &cube), 1.0);
        assert_eq!(flat.extent.z, 0.0);
    }

    #[test]
    fn test_ioa_is_relative_to_object() {
        let object = cube(0.0, 0.0, 0.5, 0.5);
        let slab = Aabb::from_center_extent(Vec3::new(0.0, 0.0, 0.0), Vec3::new(10.0, 10.0, 0.5));
        assert_relative_eq!(ioa(&object, &slab), 0.5);
        assert!(ioa(&slab, &object) < 0.01);
    }
}
