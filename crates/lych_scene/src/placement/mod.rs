//! Randomized, collision-aware object placement
//!
//! A [`PlacementSession`] populates registered floor and table regions with
//! catalog objects. For each region it draws a fixed number of random
//! candidates, scores each against a snapshot of the live scene and commits
//! the best one through the simulator, deleting displaced objects before
//! creating new ones.

mod config;
mod candidate;
mod session;

pub use config::{PlacementConfig, SamplingConfig};
pub use candidate::{sample_candidate, score_candidate, CatalogEntry, SampledObject, Score, SceneBox};
pub use session::{PlacementReport, PlacementResult, PlacementSession, RegionKind, RegionOutcome, RegionTarget, SkipReason};
