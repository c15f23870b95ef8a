//! Well-to-grid coupling.
//!
//! The pipeline for one well is
//!
//! ```text
//! WellTrajectory + mesh ──CellBinder──▶ CellBinding
//!   + permeability ──ProductivityCalculator──▶ productivities
//!   + WellControl ──ControlAllocator──▶ (J, Q) per bound cell
//! ```
//!
//! [`Wellbore`] keeps the stages of one well together and [`WellSet`] runs
//! them for all wells of a simulation.

pub mod allocation;
pub mod binder;
pub mod binding;
pub mod control;
pub mod productivity;
pub mod registry;
pub mod trajectory;
pub mod wellbore;

pub use allocation::{ControlAllocator, SourceTerm};
pub use binder::{CellBinder, LocateConfig};
pub use binding::{BindingEntry, CellBinding};
pub use control::{ControlKind, ControlMode, WellControl};
pub use productivity::{ProductivityCalculator, peaceman_radius};
pub use registry::WellSet;
pub use trajectory::{Segment, WellTrajectory};
pub use wellbore::Wellbore;
