//! Distribution of a well control into per-cell source terms.
//!
//! Each bound cell receives a pair `(J, Q)` that the flow assembler adds to
//! the cell's mass balance as `J · p_cell − Q`. For a bottomhole-pressure
//! control `J` is the cell productivity and `Q = p_bh · J`. For a total-rate
//! control `J = 0` and the rate is split in proportion to productivity.
//!
//! The productivity sum used for a total-rate split is passed in rather than
//! computed here, so that a partitioned caller can reduce the local sums
//! first (see [`ControlAllocator::local_sum`]).

use crate::well::control::ControlMode;

/// Contribution of one well to one cell's mass balance.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SourceTerm {
    pub j: f64,
    pub q: f64,
}

impl SourceTerm {
    pub const ZERO: SourceTerm = SourceTerm { j: 0.0, q: 0.0 };

    /// `J · pressure − Q`.
    pub fn accumulation(&self, pressure: f64) -> f64 {
        self.j * pressure - self.q
    }
}

/// Stateless (J, Q) allocation rules.
#[derive(Clone, Copy, Debug, Default)]
pub struct ControlAllocator;

impl ControlAllocator {
    /// Productivity sum over the cells this process sees.
    pub fn local_sum(productivities: &[f64]) -> f64 {
        productivities.iter().sum()
    }

    /// One source term per productivity, in the same order.
    ///
    /// `total_productivity` only matters for [`ControlMode::TotalRate`]; a
    /// zero total yields all-zero terms instead of dividing by zero.
    pub fn allocate(
        mode: ControlMode,
        productivities: &[f64],
        total_productivity: f64,
    ) -> Vec<SourceTerm> {
        match mode {
            ControlMode::BottomholePressure(p) => productivities
                .iter()
                .map(|&j| SourceTerm { j, q: p * j })
                .collect(),
            ControlMode::TotalRate(_) if total_productivity == 0.0 => {
                vec![SourceTerm::ZERO; productivities.len()]
            }
            ControlMode::TotalRate(rate) => productivities
                .iter()
                .map(|&j| SourceTerm {
                    j: 0.0,
                    q: rate * j / total_productivity,
                })
                .collect(),
        }
    }

    /// Allocation when this process holds the whole well.
    pub fn allocate_local(mode: ControlMode, productivities: &[f64]) -> Vec<SourceTerm> {
        Self::allocate(mode, productivities, Self::local_sum(productivities))
    }
}
