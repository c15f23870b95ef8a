//! `CellId`: a strong, zero-cost handle for mesh cells
//!
//! Wells never hold live references into the mesh. Every cell a well is
//! bound to is recorded by an opaque, stable `CellId` that wraps a nonzero
//! `u64`; 0 is reserved as an invalid or sentinel value.
//!
//! The numeric order of `CellId` is the "stable index" used by every
//! geometric tie-break in the binder, so two face-adjacent cells always
//! agree on which of them owns a shared well segment.

use crate::well_error::WellError;
use std::{fmt, num::NonZeroU64};

/// Opaque, ordered handle of a mesh cell.
///
/// # Memory layout
/// This type is `repr(transparent)`, meaning it has the same ABI and
/// alignment as its single field (`NonZeroU64`).
#[derive(
    Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
#[repr(transparent)]
pub struct CellId(NonZeroU64);

impl CellId {
    /// Creates a new `CellId` from a raw `u64` value.
    ///
    /// Returns [`WellError::InvalidCellId`] when `raw == 0`.
    ///
    /// ```rust
    /// # use mesh_wellbore::topology::cell_id::CellId;
    /// let c = CellId::new(1).unwrap();
    /// assert_eq!(c.get(), 1);
    /// ```
    #[inline]
    pub fn new(raw: u64) -> Result<Self, WellError> {
        NonZeroU64::new(raw)
            .map(CellId)
            .ok_or(WellError::InvalidCellId)
    }

    /// Handle for a zero-based array index (`index + 1`).
    #[inline]
    pub fn from_index(index: usize) -> Self {
        CellId(NonZeroU64::MIN.saturating_add(index as u64))
    }

    /// Returns the inner `u64` value of this `CellId`.
    #[inline]
    pub const fn get(self) -> u64 {
        self.0.get()
    }

    /// Zero-based array index of this handle (`get() - 1`).
    #[inline]
    pub const fn index(self) -> usize {
        (self.0.get() - 1) as usize
    }
}

// -----------------------------------------------------------------------------
// Formatting traits
// -----------------------------------------------------------------------------

impl fmt::Debug for CellId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("CellId").field(&self.get()).finish()
    }
}

/// Prints only the raw integer.
impl fmt::Display for CellId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.get())
    }
}
