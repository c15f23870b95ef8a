#![cfg_attr(docsrs, feature(doc_cfg))]
//! # mesh-wellbore
//!
//! mesh-wellbore couples wells to the cells of a reservoir mesh. Given a
//! well trajectory (a 3D polyline with a wellbore radius and skin factor) and
//! an adaptively refined, possibly distributed mesh, it determines
//!
//! - which cells the well occupies, with the in-cell length and direction,
//! - a Peaceman productivity index per occupied cell,
//! - the per-cell `(J, Q)` source terms that realize a bottomhole-pressure or
//!   total-rate control, to be added to a cell's mass balance as
//!   `J · p_cell − Q`.
//!
//! ## Features
//! - [`MeshAdapter`](topology::MeshAdapter) trait for any mesh with a tolerant
//!   point-in-cell test and same-level / coarser / refined face neighbors
//! - [`BoxForest`](forest::BoxForest), an octree forest with hanging faces
//! - Partition-local views ([`LocalMesh`](topology::LocalMesh)) and
//!   pluggable reductions (serial, in-process threads, MPI) for total-rate
//!   controls spanning partitions
//! - Parallel binding of many wells with the `rayon` feature
//!
//! ## Determinism
//!
//! Bindings are keyed by [`CellId`](topology::CellId) and every tie is broken
//! by handle, so the result never depends on the order in which the mesh
//! yields its cells. Partitions of the same mesh bind disjoint sets of cells
//! whose union is the serial binding.
//!
//! ## Usage
//!
//! ```toml
//! [dependencies]
//! mesh-wellbore = "0.1"
//! # Optional features:
//! # features = ["rayon", "mpi-support"]
//! ```
//!
//! ```
//! use mesh_wellbore::prelude::*;
//!
//! let mesh = BoxForest::uniform([0.0; 3], [10.0, 10.0, 5.0], [3, 3, 2])?;
//! let trajectory = WellTrajectory::new(vec![[15.0, 15.0, 0.5], [15.0, 15.0, 9.5]], 0.1, 0.0)?;
//! let mut well = Wellbore::new(trajectory);
//! well.set_control(WellControl::bottomhole_pressure(150.0));
//! well.locate(&mesh, LocateConfig::default())?;
//! well.update_productivity(&mesh, &UniformPermeability::isotropic(100.0))?;
//! well.allocate_local()?;
//! for (cell, term) in well.source_terms()? {
//!     assert_eq!(term.q, 150.0 * term.j);
//!     println!("{cell}: J = {:.3}", term.j);
//! }
//! # Ok::<(), mesh_wellbore::well_error::WellError>(())
//! ```

pub mod algs;
pub mod data;
pub mod debug_invariants;
pub mod forest;
pub mod geometry;
pub mod topology;
pub mod well;
pub mod well_error;

pub use debug_invariants::DebugInvariants;

/// A convenient prelude to import the most-used traits & types:
pub mod prelude {
    #[cfg(feature = "mpi-support")]
    pub use crate::algs::communicator::MpiComm;
    pub use crate::algs::communicator::{Communicator, NoComm, RayonComm};
    pub use crate::data::permeability::{PermeabilityField, UniformPermeability};
    pub use crate::debug_invariants::DebugInvariants;
    pub use crate::forest::BoxForest;
    pub use crate::geometry::metrics::{Point3, Vector3};
    pub use crate::topology::{CellId, CellOwnership, FaceNeighbor, LocalMesh, MeshAdapter};
    pub use crate::well::{
        CellBinder, CellBinding, ControlAllocator, ControlKind, ControlMode, LocateConfig,
        ProductivityCalculator, SourceTerm, WellControl, WellSet, WellTrajectory, Wellbore,
    };
    pub use crate::well_error::WellError;
}
