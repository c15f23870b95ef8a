//! Parallel plumbing shared by the well pipeline.

pub mod communicator;

pub use communicator::{Communicator, NoComm, RayonComm};
#[cfg(feature = "mpi-support")]
pub use communicator::MpiComm;
