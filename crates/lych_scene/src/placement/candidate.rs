//! Candidate sampling and scoring

use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt;

use rand::seq::index;
use rand::Rng;

use crate::bounds::{collide, Aabb};
use crate::foundation::math::Vec3;

/// A catalog entry with its mesh half-extent
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogEntry {
    /// Catalog id
    pub id: String,
    /// Mesh half-extent
    pub extent: Vec3,
}

/// A live scene object in the planner's snapshot
#[derive(Debug, Clone, PartialEq)]
pub struct SceneBox {
    /// Simulator object id
    pub id: String,
    /// World AABB
    pub aabb: Aabb,
}

/// One object of a candidate placement
#[derive(Debug, Clone, PartialEq)]
pub struct SampledObject {
    /// Catalog id to instantiate
    pub catalog_id: String,
    /// Box the object would occupy, centred at its location
    pub aabb: Aabb,
    /// Yaw in degrees, `[0, 360)`
    pub yaw: f64,
}

impl SampledObject {
    /// Location passed to the simulator
    pub fn location(&self) -> [f64; 3] {
        let c = self.aabb.world_center();
        [c.x, c.y, c.z]
    }

    /// Rotation passed to the simulator
    pub fn rotation(&self) -> [f64; 3] {
        [0.0, self.yaw, 0.0]
    }
}

/// Candidate score; every rejected candidate ranks below every numeric score
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Score {
    /// A forbidden collision occurred
    Rejected,
    /// Objects added minus distinct objects displaced
    Value(i64),
}

impl Ord for Score {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Rejected, Self::Rejected) => Ordering::Equal,
            (Self::Rejected, Self::Value(_)) => Ordering::Less,
            (Self::Value(_), Self::Rejected) => Ordering::Greater,
            (Self::Value(a), Self::Value(b)) => a.cmp(b),
        }
    }
}

impl PartialOrd for Score {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rejected => write!(f, "-inf"),
            Self::Value(v) => write!(f, "{v}"),
        }
    }
}

/// Draw `count` distinct catalog entries and place them over `region`
///
/// Each object rests on the region's top face at a horizontal offset drawn
/// uniformly from `±0.5 · fraction · extent` around the region centre.
pub fn sample_candidate<R: Rng + ?Sized>(
    rng: &mut R,
    catalog: &[CatalogEntry],
    count: usize,
    region: &Aabb,
    fraction: f64,
) -> Vec<SampledObject> {
    let center = region.world_center();
    let half_x = (region.extent.x * fraction * 0.5).abs();
    let half_y = (region.extent.y * fraction * 0.5).abs();
    let top = region.top();

    index::sample(rng, catalog.len(), count.min(catalog.len()))
        .into_iter()
        .map(|i| {
            let entry = &catalog[i];
            let location = Vec3::new(
                center.x + rng.gen_range(-half_x..=half_x),
                center.y + rng.gen_range(-half_y..=half_y),
                top,
            );
            SampledObject {
                catalog_id: entry.id.clone(),
                aabb: Aabb::from_center_extent(location, entry.extent),
                yaw: rng.gen_range(0.0..360.0),
            }
        })
        .collect()
}

/// Score a candidate against the scene snapshot
///
/// Returns the score and the distinct snapshot ids the candidate displaces,
/// in discovery order. A collision between two sampled objects, or with a
/// protected object, rejects the candidate.
pub fn score_candidate(
    candidate: &[SampledObject],
    snapshot: &[SceneBox],
    protected: &HashSet<String>,
    iou_threshold: f64,
) -> (Score, Vec<String>) {
    for (i, a) in candidate.iter().enumerate() {
        if candidate[i + 1..].iter().any(|b| collide(&a.aabb, &b.aabb, iou_threshold)) {
            return (Score::Rejected, Vec::new());
        }
    }

    let mut displaced: Vec<String> = Vec::new();
    for sampled in candidate {
        for existing in snapshot.iter().filter(|e| collide(&e.aabb, &sampled.aabb, iou_threshold)) {
            if protected.contains(&existing.id) {
                return (Score::Rejected, Vec::new());
            }
            if !displaced.contains(&existing.id) {
                displaced.push(existing.id.clone());
            }
        }
    }

    let added = i64::try_from(candidate.len()).unwrap_or(i64::MAX);
    let removed = i64::try_from(displaced.len()).unwrap_or(i64::MAX);
    (Score::Value(added - removed), displaced)
}
