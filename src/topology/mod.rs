//! Mesh-facing abstractions used by the well binder.
//!
//! This module provides:
//! - [`CellId`], the opaque stable handle of a mesh cell
//! - the [`MeshAdapter`] trait a mesh implements to be coupled with wells
//! - ownership metadata and a partition-local mesh view

pub mod cell_id;
pub mod mesh_adapter;
pub mod ownership;

pub use cell_id::CellId;
pub use mesh_adapter::{FaceNeighbor, MeshAdapter, cell_extents, point_inside_cell};
pub use ownership::{CellOwnership, LocalMesh, OwnershipEntry};
