//! # Lych Scene
//!
//! Spatial scene model and data-collection algorithms for the LychSim
//! simulator client.
//!
//! ## Features
//!
//! - **Bounding Volumes**: axis-aligned and oriented boxes with overlap measures
//! - **Scene Graph**: Scene → Level → Region → Object hierarchy with exact persistence
//! - **Boundary Reconstruction**: room footprints recovered from floor mesh edges
//! - **Scene Import**: Infinigen frame exports turned into scene graphs plus per-frame visibility
//! - **Placement Planning**: randomized, collision-aware population of floors and tables
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use lych_scene::prelude::*;
//!
//! fn main() -> Result<(), SceneError> {
//!     lych_scene::foundation::logging::init();
//!
//!     let frame = load_infinigen_frame("scenes/office_0", None, None, FrameLoads::SCENE)?;
//!     if let Some(scene) = frame.scene {
//!         println!("{} objects", scene.get_all_objects().len());
//!         scene.save("office_0.json")?;
//!     }
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod foundation;
pub mod config;
pub mod error;
pub mod archive;
pub mod bounds;
pub mod scene;
pub mod geometry;
pub mod import;
pub mod sim;
pub mod placement;

pub use error::{SceneError, SceneResult};

/// Common imports for library users
pub mod prelude {
    pub use crate::{
        SceneError, SceneResult,
        bounds::{Aabb, Obb, collide},
        config::{Config, ConfigError, ConfigFormat},
        foundation::math::{Vec2, Vec3, Mat3, Mat4},
        scene::{Object, Polygon, SemanticLevel, SemanticRegion, SemanticScene},
        geometry::reconstruct_footprint,
        import::{load_infinigen_frame, FrameLoads, ImportConfig, InfinigenFrame, InfinigenImporter},
        sim::{ObjectCommands, RequestClient, Simulator},
        placement::{PlacementConfig, PlacementReport, PlacementSession},
    };
}
