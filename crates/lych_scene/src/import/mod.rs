//! Scene import from Infinigen frame exports
//!
//! ```text
//! Objects_*.json ──► raw objects ──► Object (uid + OBB)
//! saved_mesh.json + *.npz ──► floor edges ──► footprint Polygon
//! solve_state.json ──► StableAgainst relations ──► rooms ──► levels
//!                                                   ↓
//!                                            SemanticScene
//! segmentation rasters ──► distinct instance keys ──► visibility
//! ```
//!
//! Structural problems (missing files, unresolvable rooms, ambiguous
//! relations) abort the import; no partial scene is returned.

mod config;
mod source;
mod builder;
mod mesh;
mod visibility;
mod frame;

pub use config::ImportConfig;
pub use source::{MeshRecord, RawObject, Relation, RelationKind, SceneEntity, SolveState};
pub use builder::{build_objects, create_scene, room_level, ObjectTable};
pub use mesh::{load_floor, load_room_meshes, FloorMesh};
pub use visibility::{compute_visibility, visible_instances, DenseRaster, SparseRaster};
pub use frame::{load_infinigen_frame, FrameLoads, InfinigenFrame, InfinigenImporter, InfinigenLayout};
