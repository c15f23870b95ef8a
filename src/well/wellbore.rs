//! A single well: trajectory, control, binding and derived source terms.
//!
//! The derived state is rebuilt in stages and each stage is invalidated by
//! the inputs it depends on:
//!
//! | operation                | invalidates                        |
//! |--------------------------|------------------------------------|
//! | [`Wellbore::locate`]     | productivities, allocation         |
//! | [`Wellbore::set_control`]| allocation (+ productivities on a skin change) |
//! | [`Wellbore::update_productivity`] | allocation                |
//!
//! Reading a stale stage is an error rather than a silent zero.

use crate::algs::communicator::Communicator;
use crate::data::permeability::PermeabilityField;
use crate::topology::cell_id::CellId;
use crate::topology::mesh_adapter::MeshAdapter;
use crate::well::allocation::{ControlAllocator, SourceTerm};
use crate::well::binder::{CellBinder, LocateConfig};
use crate::well::binding::CellBinding;
use crate::well::control::{ControlMode, WellControl};
use crate::well::productivity::ProductivityCalculator;
use crate::well::trajectory::WellTrajectory;
use crate::well_error::WellError;

#[derive(Clone, Debug)]
pub struct Wellbore {
    trajectory: WellTrajectory,
    control: WellControl,
    binding: Option<CellBinding>,
    productivities: Option<Vec<f64>>,
    allocation: Option<Vec<SourceTerm>>,
}

impl Wellbore {
    /// A shut-in well (zero total rate) that is not yet located.
    pub fn new(trajectory: WellTrajectory) -> Self {
        Self {
            trajectory,
            control: WellControl::default(),
            binding: None,
            productivities: None,
            allocation: None,
        }
    }

    pub fn trajectory(&self) -> &WellTrajectory {
        &self.trajectory
    }

    pub fn radius(&self) -> f64 {
        self.trajectory.radius()
    }

    pub fn control(&self) -> &WellControl {
        &self.control
    }

    /// Skin used by the productivity model under the current control.
    pub fn skin(&self) -> f64 {
        self.control.effective_skin(self.trajectory.skin())
    }

    pub fn set_control(&mut self, control: WellControl) {
        if control.effective_skin(self.trajectory.skin()) != self.skin() {
            self.productivities = None;
        }
        self.control = control;
        self.allocation = None;
    }

    /// Recompute the binding against `mesh`.
    ///
    /// Must not run while the mesh is being adapted.
    pub fn locate<M>(&mut self, mesh: &M, config: LocateConfig) -> Result<(), WellError>
    where
        M: MeshAdapter + ?Sized,
    {
        self.productivities = None;
        self.allocation = None;
        self.binding = None;
        let binding = CellBinder::new(mesh, config)?.bind(&self.trajectory)?;
        self.binding = Some(binding);
        Ok(())
    }

    pub fn is_located(&self) -> bool {
        self.binding.is_some()
    }

    pub fn binding(&self) -> Result<&CellBinding, WellError> {
        self.binding.as_ref().ok_or(WellError::NotLocated)
    }

    /// Bound cells in handle order.
    pub fn cells(&self) -> Result<Vec<CellId>, WellError> {
        Ok(self.binding()?.cells().collect())
    }

    pub fn update_productivity<M, P>(&mut self, mesh: &M, permeability: &P) -> Result<(), WellError>
    where
        M: MeshAdapter + ?Sized,
        P: PermeabilityField + ?Sized,
    {
        self.allocation = None;
        self.productivities = None;
        let binding = self.binding()?;
        let productivities = ProductivityCalculator::new(mesh, permeability).compute(
            binding,
            self.trajectory.radius(),
            self.skin(),
        )?;
        self.productivities = Some(productivities);
        Ok(())
    }

    /// Productivities in [`Wellbore::cells`] order.
    pub fn productivities(&self) -> Result<&[f64], WellError> {
        self.binding()?;
        self.productivities
            .as_deref()
            .ok_or(WellError::StaleProductivity)
    }

    /// Sum of productivities over the cells this process sees.
    pub fn local_productivity_sum(&self) -> Result<f64, WellError> {
        Ok(ControlAllocator::local_sum(self.productivities()?))
    }

    /// Allocate the current control given the well's global productivity sum.
    pub fn allocate(&mut self, total_productivity: f64) -> Result<(), WellError> {
        let terms =
            ControlAllocator::allocate(self.control.mode, self.productivities()?, total_productivity);
        self.allocation = Some(terms);
        Ok(())
    }

    /// Allocate assuming this process sees the whole well.
    pub fn allocate_local(&mut self) -> Result<(), WellError> {
        let total = self.local_productivity_sum()?;
        self.allocate(total)
    }

    /// Allocate with the productivity sum reduced over `comm`.
    ///
    /// Collective for total-rate controls: every rank has to call it for
    /// the same well in the same order.
    pub fn allocate_with<C>(&mut self, comm: &C) -> Result<(), WellError>
    where
        C: Communicator + ?Sized,
    {
        let local = self.local_productivity_sum()?;
        let total = match self.control.mode {
            ControlMode::TotalRate(_) => comm.all_reduce_sum(local),
            ControlMode::BottomholePressure(_) => local,
        };
        self.allocate(total)
    }

    /// The well's contribution to `cell`; zero if the cell is not bound.
    pub fn source_term(&self, cell: CellId) -> Result<SourceTerm, WellError> {
        let binding = self.binding()?;
        self.productivities()?;
        let terms = self
            .allocation
            .as_deref()
            .ok_or(WellError::StaleAllocation)?;
        Ok(binding
            .position(cell)
            .and_then(|i| terms.get(i).copied())
            .unwrap_or(SourceTerm::ZERO))
    }

    /// All `(cell, term)` pairs of the current allocation.
    pub fn source_terms(&self) -> Result<Vec<(CellId, SourceTerm)>, WellError> {
        let binding = self.binding()?;
        let terms = self
            .allocation
            .as_deref()
            .ok_or(WellError::StaleAllocation)?;
        Ok(binding.cells().zip(terms.iter().copied()).collect())
    }
}
