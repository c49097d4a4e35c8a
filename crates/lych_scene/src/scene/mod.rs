//! Semantic scene model
//!
//! A strict ownership tree:
//!
//! ```text
//! SemanticScene
//!      ↓ levels (sorted by level index)
//! SemanticLevel
//!      ↓ regions (discovery order)
//! SemanticRegion  ── footprint Polygon + room OBB
//!      ↓ objects (discovery order)
//! Object
//! ```
//!
//! Containers preserve insertion order and that order is the traversal
//! order. Equality is structural and order-sensitive; footprint polygons
//! compare geometrically.

mod object;
mod polygon;
mod graph;
mod persist;

pub use object::{InstanceKey, Object};
pub use polygon::Polygon;
pub use graph::{SemanticLevel, SemanticRegion, SemanticScene};
pub use persist::SCENE_ARCHIVE_ENTRY;
