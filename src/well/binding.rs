//! Per-well record of occupied cells.

use crate::debug_invariants::DebugInvariants;
use crate::geometry::metrics::{Vector3, midpoint};
use crate::topology::cell_id::CellId;
use crate::well_error::WellError;
use std::collections::BTreeMap;

/// Length and direction of a well inside one cell.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct BindingEntry {
    pub cell: CellId,
    /// Accumulated well length inside the cell.
    pub length: f64,
    /// Segment direction; the plain mean of the tangents of all segments
    /// crossing the cell, not re-normalized.
    pub direction: Vector3,
}

/// Cells a well occupies, keyed and ordered by cell handle.
///
/// A cell appears at most once. Iteration is in handle order, so results
/// do not depend on the order in which the mesh was visited.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CellBinding {
    entries: BTreeMap<CellId, BindingEntry>,
}

impl CellBinding {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, cell: CellId) -> bool {
        self.entries.contains_key(&cell)
    }

    pub fn get(&self, cell: CellId) -> Option<&BindingEntry> {
        self.entries.get(&cell)
    }

    /// Position of `cell` in handle order, matching [`CellBinding::iter`].
    pub fn position(&self, cell: CellId) -> Option<usize> {
        if !self.entries.contains_key(&cell) {
            return None;
        }
        Some(self.entries.range(..cell).count())
    }

    pub fn iter(&self) -> impl Iterator<Item = &BindingEntry> + '_ {
        self.entries.values()
    }

    pub fn cells(&self) -> impl Iterator<Item = CellId> + '_ {
        self.entries.keys().copied()
    }

    /// Sum of bound lengths over all cells.
    pub fn total_length(&self) -> f64 {
        self.entries.values().map(|e| e.length).sum()
    }

    /// Add a segment's contribution to `cell`.
    ///
    /// A new cell takes `direction` as is; an already bound cell adds the
    /// length and replaces its direction with the mean of old and new.
    pub fn merge(&mut self, cell: CellId, length: f64, direction: Vector3) {
        self.entries
            .entry(cell)
            .and_modify(|e| {
                e.length += length;
                e.direction = midpoint(e.direction, direction);
            })
            .or_insert(BindingEntry {
                cell,
                length,
                direction,
            });
    }
}

impl DebugInvariants for CellBinding {
    fn debug_assert_invariants(&self) {
        crate::debug_invariants!(self.validate_invariants(), "CellBinding");
    }

    fn validate_invariants(&self) -> Result<(), WellError> {
        for (key, entry) in &self.entries {
            if *key != entry.cell {
                return Err(WellError::InvariantViolation(format!(
                    "binding key {key} holds entry for cell {}",
                    entry.cell
                )));
            }
            if !(entry.length >= 0.0 && entry.length.is_finite()) {
                return Err(WellError::InvariantViolation(format!(
                    "cell {key} has invalid bound length {}",
                    entry.length
                )));
            }
            if entry.direction.iter().any(|c| !c.is_finite()) {
                return Err(WellError::InvariantViolation(format!(
                    "cell {key} has non-finite direction {:?}",
                    entry.direction
                )));
            }
        }
        Ok(())
    }
}
