//! Simulator collaborator
//!
//! The simulator is reached through a blocking text-command transport
//! ([`RequestClient`]). [`Simulator`] wraps a transport and exposes the
//! object command set as the [`ObjectCommands`] capability, which is the
//! only surface the placement planner depends on.

mod client;
mod commands;
#[cfg(test)]
pub(crate) mod fake;

pub use client::{RequestClient, Response, Simulator, STATUS_OK};
pub use commands::{AabbRecord, MeshExtent, ObjectCommands, SelectedObject};
