//! 2D footprint polygons

use serde::{Deserialize, Serialize};

use crate::foundation::math::Vec2;

/// A simple polygon with optional holes
///
/// Rings are stored open (the first vertex is not repeated). The persisted
/// form closes every ring, matching what most GIS tooling emits.
///
/// Equality is geometric: two rings are equal when they visit the same
/// corners in the same cyclic order, regardless of the starting vertex,
/// winding direction or vertices lying straight between two others.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(into = "PolygonRecord", from = "PolygonRecord")]
pub struct Polygon {
    exterior: Vec<Vec2>,
    holes: Vec<Vec<Vec2>>,
}

impl Polygon {
    /// Create a polygon from an exterior ring
    pub fn new(exterior: Vec<Vec2>) -> Self {
        Self::with_holes(exterior, Vec::new())
    }

    /// Create a polygon from an exterior ring and hole rings
    pub fn with_holes(exterior: Vec<Vec2>, holes: Vec<Vec<Vec2>>) -> Self {
        Self {
            exterior: open_ring(exterior),
            holes: holes.into_iter().map(open_ring).collect(),
        }
    }

    /// Exterior ring, open
    pub fn exterior(&self) -> &[Vec2] {
        &self.exterior
    }

    /// Hole rings, open
    pub fn holes(&self) -> &[Vec<Vec2>] {
        &self.holes
    }

    /// Number of exterior vertices
    pub fn len(&self) -> usize {
        self.exterior.len()
    }

    /// Whether the exterior ring is empty
    pub fn is_empty(&self) -> bool {
        self.exterior.is_empty()
    }

    /// Enclosed area (exterior minus holes)
    pub fn area(&self) -> f64 {
        let holes: f64 = self.holes.iter().map(|ring| ring_area(ring)).sum();
        ring_area(&self.exterior) - holes
    }
}

impl PartialEq for Polygon {
    fn eq(&self, other: &Self) -> bool {
        if !rings_equal(&self.exterior, &other.exterior) || self.holes.len() != other.holes.len() {
            return false;
        }
        // Holes are unordered; match each one against a distinct partner
        let mut used = vec![false; other.holes.len()];
        self.holes.iter().all(|hole| {
            let partner = other
                .holes
                .iter()
                .enumerate()
                .find(|(i, candidate)| !used[*i] && rings_equal(hole, candidate));
            partner.map_or(false, |(i, _)| {
                used[i] = true;
                true
            })
        })
    }
}

fn open_ring(mut ring: Vec<Vec2>) -> Vec<Vec2> {
    ring.dedup();
    if ring.len() > 1 && ring.first() == ring.last() {
        ring.pop();
    }
    ring
}

fn ring_area(ring: &[Vec2]) -> f64 {
    let n = ring.len();
    if n < 3 {
        return 0.0;
    }
    let twice: f64 = (0..n)
        .map(|i| {
            let (a, b) = (ring[i], ring[(i + 1) % n]);
            a.x * b.y - b.x * a.y
        })
        .sum();
    (twice * 0.5).abs()
}

/// Ring without vertices lying exactly on the segment between their neighbours
fn corners_only(ring: &[Vec2]) -> Vec<Vec2> {
    let mut ring = ring.to_vec();
    loop {
        let n = ring.len();
        if n < 4 {
            return ring;
        }
        let Some(i) = (0..n).find(|&i| {
            let (prev, here, next) = (ring[(i + n - 1) % n], ring[i], ring[(i + 1) % n]);
            (here - prev).perp(&(next - here)) == 0.0
        }) else {
            return ring;
        };
        ring.remove(i);
    }
}

fn rings_equal(a: &[Vec2], b: &[Vec2]) -> bool {
    let (a, b) = (corners_only(a), corners_only(b));
    if a.len() != b.len() {
        return false;
    }
    if a.is_empty() {
        return true;
    }
    let n = a.len();
    (0..n).filter(|&shift| b[shift] == a[0]).any(|shift| {
        let forward = (0..n).all(|i| a[i] == b[(shift + i) % n]);
        let backward = (0..n).all(|i| a[i] == b[(shift + n - i) % n]);
        forward || backward
    })
}

/// Persisted polygon layout: closed rings of `[x, y]` pairs
#[derive(Serialize, Deserialize)]
struct PolygonRecord {
    exterior: Vec<[f64; 2]>,
    holes: Vec<Vec<[f64; 2]>>,
}

fn closed_ring(ring: &[Vec2]) -> Vec<[f64; 2]> {
    ring.iter()
        .chain(ring.first())
        .map(|p| [p.x, p.y])
        .collect()
}

fn ring_points(ring: Vec<[f64; 2]>) -> Vec<Vec2> {
    ring.into_iter().map(|[x, y]| Vec2::new(x, y)).collect()
}

impl From<Polygon> for PolygonRecord {
    fn from(polygon: Polygon) -> Self {
        Self {
            exterior: closed_ring(&polygon.exterior),
            holes: polygon.holes.iter().map(|ring| closed_ring(ring)).collect(),
        }
    }
}

impl From<PolygonRecord> for Polygon {
    fn from(record: PolygonRecord) -> Self {
        Self::with_holes(
            ring_points(record.exterior),
            record.holes.into_iter().map(ring_points).collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn ring(points: &[(f64, f64)]) -> Vec<Vec2> {
        points.iter().map(|&(x, y)| Vec2::new(x, y)).collect()
    }

    #[test]
    fn test_area_with_hole() {
        let polygon = Polygon::with_holes(
            ring(&[(0.0, 0.0), (4.0, 0.0), (4.0, 4.0), (0.0, 4.0)]),
            vec![ring(&[(1.0, 1.0), (2.0, 1.0), (2.0, 2.0), (1.0, 2.0)])],
        );
        assert_relative_eq!(polygon.area(), 15.0);
    }

    #[test]
    fn test_area_of_non_convex_ring() {
        let polygon = Polygon::new(ring(&[(0.0, 0.0), (2.0, 0.0), (2.0, 2.0), (1.0, 1.0), (0.0, 2.0)]));
        assert_relative_eq!(polygon.area(), 3.0);
    }

    #[test]
    fn test_equality_ignores_start_and_winding() {
        let a = Polygon::new(ring(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)]));
        let rotated = Polygon::new(ring(&[(1.0, 1.0), (0.0, 1.0), (0.0, 0.0), (1.0, 0.0)]));
        let reversed = Polygon::new(ring(&[(0.0, 0.0), (0.0, 1.0), (1.0, 1.0), (1.0, 0.0), (0.0, 0.0)]));
        let other = Polygon::new(ring(&[(0.0, 0.0), (1.0, 0.0), (0.0, 1.0), (1.0, 1.0)]));

        assert_eq!(a, rotated);
        assert_eq!(a, reversed);
        assert_ne!(a, other);
    }

    #[test]
    fn test_equality_ignores_collinear_vertices() {
        let square = Polygon::new(ring(&[(0.0, 0.0), (2.0, 0.0), (2.0, 2.0), (0.0, 2.0)]));
        let subdivided = Polygon::new(ring(&[
            (1.0, 0.0),
            (2.0, 0.0),
            (2.0, 1.0),
            (2.0, 2.0),
            (0.0, 2.0),
            (0.0, 0.0),
        ]));
        let notched = Polygon::new(ring(&[(0.0, 0.0), (1.0, 0.5), (2.0, 0.0), (2.0, 2.0), (0.0, 2.0)]));

        assert_eq!(square, subdivided);
        assert_eq!(subdivided, square);
        assert_ne!(square, notched);
    }

    #[test]
    fn test_persisted_rings_are_closed() {
        let polygon = Polygon::new(ring(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0)]));
        let value = serde_json::to_value(&polygon).unwrap();

        assert_eq!(value["exterior"], serde_json::json!([[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 0.0]]));
        assert_eq!(value["holes"], serde_json::json!([]));
        let back: Polygon = serde_json::from_value(value).unwrap();
        assert_eq!(back.exterior(), polygon.exterior());
    }
}
