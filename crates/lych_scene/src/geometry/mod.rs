//! Pure geometry algorithms on mesh data
//!
//! - [`boundary`] - footprint polygons from face-loop meshes

pub mod boundary;

pub use boundary::{boundary_edges, loop_edges, outer_loop, reconstruct_footprint, BoundaryLoop, Edge};
