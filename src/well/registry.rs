//! Named collection of wells sharing one mesh.
//!
//! Wells are kept in name order, so every pass over the set, and the order
//! of collective reductions in [`WellSet::allocate_all`], is the same on all
//! ranks. With the `rayon` feature, binding and productivity evaluation run
//! one task per well against the shared read-only mesh.

use crate::algs::communicator::Communicator;
use crate::data::permeability::PermeabilityField;
use crate::topology::cell_id::CellId;
use crate::topology::mesh_adapter::MeshAdapter;
use crate::well::allocation::SourceTerm;
use crate::well::binder::LocateConfig;
use crate::well::control::{ControlMode, WellControl};
use crate::well::wellbore::Wellbore;
use crate::well_error::WellError;
use parking_lot::RwLock;
use std::collections::BTreeMap;

#[cfg(feature = "rayon")]
use rayon::prelude::*;

#[derive(Clone, Debug, Default)]
pub struct WellSet {
    wells: BTreeMap<String, Wellbore>,
}

impl WellSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.wells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.wells.is_empty()
    }

    pub fn insert(&mut self, name: impl Into<String>, well: Wellbore) -> Result<(), WellError> {
        let name = name.into();
        if self.wells.contains_key(&name) {
            return Err(WellError::DuplicateWell(name));
        }
        self.wells.insert(name, well);
        Ok(())
    }

    pub fn remove(&mut self, name: &str) -> Option<Wellbore> {
        self.wells.remove(name)
    }

    pub fn get(&self, name: &str) -> Result<&Wellbore, WellError> {
        self.wells
            .get(name)
            .ok_or_else(|| WellError::UnknownWell(name.to_string()))
    }

    pub fn get_mut(&mut self, name: &str) -> Result<&mut Wellbore, WellError> {
        self.wells
            .get_mut(name)
            .ok_or_else(|| WellError::UnknownWell(name.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Wellbore)> + '_ {
        self.wells.iter().map(|(n, w)| (n.as_str(), w))
    }

    pub fn set_control(&mut self, name: &str, control: WellControl) -> Result<(), WellError> {
        self.get_mut(name)?.set_control(control);
        Ok(())
    }

    /// Bind every well. On failure the error of the first failing well in
    /// name order is returned; other wells are still rebound.
    pub fn locate_all<M>(&mut self, mesh: &M, config: LocateConfig) -> Result<(), WellError>
    where
        M: MeshAdapter + Sync + ?Sized,
    {
        config.validate()?;
        let results = self.for_each_well(|w| w.locate(mesh, config));
        log::debug!("located {} wells", self.wells.len());
        results
    }

    /// Bind every well while holding a read lock on the mesh, so binding
    /// cannot overlap a mesh adaptation holding the write lock.
    pub fn locate_all_locked<M>(
        &mut self,
        mesh: &RwLock<M>,
        config: LocateConfig,
    ) -> Result<(), WellError>
    where
        M: MeshAdapter + Sync,
    {
        let guard = mesh.read();
        self.locate_all(&*guard, config)
    }

    pub fn update_productivities<M, P>(&mut self, mesh: &M, permeability: &P) -> Result<(), WellError>
    where
        M: MeshAdapter + Sync + ?Sized,
        P: PermeabilityField + Sync + ?Sized,
    {
        self.for_each_well(|w| w.update_productivity(mesh, permeability))
    }

    /// Allocate every well's control. Total-rate wells reduce their
    /// productivity sum over `comm`, one reduction per well in name order.
    pub fn allocate_all<C>(&mut self, comm: &C) -> Result<(), WellError>
    where
        C: Communicator + ?Sized,
    {
        for (name, well) in self.wells.iter_mut() {
            let local = well.local_productivity_sum()?;
            let total = match well.control().mode {
                ControlMode::TotalRate(rate) => {
                    let total = comm.all_reduce_sum(local);
                    if total == 0.0 && rate != 0.0 {
                        log::warn!(
                            "well {name}: rate {rate} requested but no cell has productivity, nothing injected"
                        );
                    }
                    total
                }
                ControlMode::BottomholePressure(_) => local,
            };
            well.allocate(total)?;
        }
        Ok(())
    }

    /// `(well name, term)` for every well bound to `cell`.
    ///
    /// Wells not located yet are bound to no cell and are skipped. A located
    /// well bound to `cell` whose allocation is stale is an error.
    pub fn sources_for(&self, cell: CellId) -> Result<Vec<(&str, SourceTerm)>, WellError> {
        let mut out = Vec::new();
        for (name, well) in &self.wells {
            let Ok(binding) = well.binding() else {
                continue;
            };
            if binding.contains(cell) {
                out.push((name.as_str(), well.source_term(cell)?));
            }
        }
        Ok(out)
    }

    /// Contribution of all wells to `cell`'s mass balance: `Σ (J·p − Q)`.
    pub fn accumulation(&self, cell: CellId, pressure: f64) -> Result<f64, WellError> {
        Ok(self
            .sources_for(cell)?
            .iter()
            .map(|(_, t)| t.accumulation(pressure))
            .sum())
    }

    #[cfg(feature = "rayon")]
    fn for_each_well<F>(&mut self, op: F) -> Result<(), WellError>
    where
        F: Fn(&mut Wellbore) -> Result<(), WellError> + Sync + Send,
    {
        let results: Vec<Result<(), WellError>> =
            self.wells.par_iter_mut().map(|(_, w)| op(w)).collect();
        results.into_iter().collect()
    }

    #[cfg(not(feature = "rayon"))]
    fn for_each_well<F>(&mut self, op: F) -> Result<(), WellError>
    where
        F: Fn(&mut Wellbore) -> Result<(), WellError>,
    {
        let results: Vec<Result<(), WellError>> = self.wells.values_mut().map(op).collect();
        results.into_iter().collect()
    }
}
