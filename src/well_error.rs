//! WellError: Unified error type for mesh-wellbore public APIs
//!
//! Configuration problems (bad trajectories, non-physical productivity
//! terms, unknown control kinds) and out-of-order queries are reported
//! through this type instead of panicking.

use crate::topology::cell_id::CellId;
use thiserror::Error;

/// Unified error type for well binding, productivity and allocation.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum WellError {
    /// Attempted to construct a CellId with a zero value (invalid).
    #[error("CellId must be non-zero (0 is reserved as invalid/sentinel)")]
    InvalidCellId,
    /// The mesh adapter does not know this cell handle.
    #[error("Mesh error: unknown cell `{0}`")]
    UnknownCell(CellId),
    /// The mesh description itself is invalid (bad dimensions, sizes or refinement).
    #[error("Mesh error: {0}")]
    InvalidMesh(String),
    /// The face index is out of range for the cell.
    #[error("Mesh error: cell `{cell}` has no face {face}")]
    InvalidFace { cell: CellId, face: usize },
    /// A trajectory needs at least one control point.
    #[error("Trajectory error: a well needs at least one control point")]
    EmptyTrajectory,
    /// Two consecutive control points coincide (zero-length segment).
    #[error("Trajectory error: control points {index} and {} coincide", .index + 1)]
    DuplicateTrajectoryPoint { index: usize },
    /// A control point has a NaN or infinite coordinate.
    #[error("Trajectory error: control point {index} has a non-finite coordinate")]
    NonFiniteCoordinate { index: usize },
    /// Wellbore radius must be strictly positive.
    #[error("Trajectory error: wellbore radius must be positive, got {0}")]
    NonPositiveRadius(f64),
    /// Permeability must be positive and finite along every axis.
    #[error("Permeability error: cell `{cell}` axis {axis} has invalid permeability {value}")]
    InvalidPermeability { cell: CellId, axis: usize, value: f64 },
    /// `ln(r_eq / r_w) + skin <= 0`: the cell is too small for the Peaceman correction.
    #[error(
        "Productivity error: cell `{cell}` axis {axis} has ln(r_eq/r_w)+skin = {log_term}; \
         cell size is too small for the Peaceman formula"
    )]
    InvalidPeacemanRadius {
        cell: CellId,
        axis: usize,
        log_term: f64,
    },
    /// A control kind string that does not name a supported control.
    #[error("Control error: unknown well control kind `{0}`")]
    UnknownControl(String),
    /// Queried before `locate` was run.
    #[error("Well error: well has not been located on a mesh")]
    NotLocated,
    /// Productivities are missing or were invalidated by a new binding/skin.
    #[error("Well error: productivities are stale, call update_productivity first")]
    StaleProductivity,
    /// The source terms were invalidated by a new control or productivity update.
    #[error("Well error: source terms are stale, allocate the control first")]
    StaleAllocation,
    /// No well registered under this name.
    #[error("Well set error: unknown well `{0}`")]
    UnknownWell(String),
    /// A well with this name already exists.
    #[error("Well set error: duplicate well `{0}`")]
    DuplicateWell(String),
    /// A tolerance or option in a configuration struct is out of range.
    #[error("Config error: {0}")]
    InvalidConfig(String),
    /// An internal data structure invariant does not hold.
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),
}
