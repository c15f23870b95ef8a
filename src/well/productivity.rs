//! Peaceman productivity indices for bound cells.
//!
//! For each bound cell the well is treated as if it were aligned with each
//! coordinate axis in turn. Along axis `m`, with `k1, k2` the permeabilities
//! and `dx1, dx2` the cell extents of the two orthogonal axes,
//!
//! ```text
//! r_eq = 0.28 sqrt( sqrt(k2/k1) dx1² + sqrt(k1/k2) dx2² ) / ( (k2/k1)^¼ + (k1/k2)^¼ )
//! L_m  = length · |direction[m]|
//! J_m  = 2π sqrt(k1 k2) L_m / ( ln(r_eq / r_w) + skin )
//! ```
//!
//! and the cell's index is the Euclidean norm of `(J_x, J_y, J_z)`.
//!
//! Combining the three single-axis estimates through a vector norm has no
//! rigorous derivation for wells crossing a cell obliquely; it is kept as is
//! and should be reviewed by a reservoir engineer before being relied on for
//! deviated wells.

use crate::data::permeability::{PermeabilityField, checked_permeability};
use crate::geometry::metrics::{Vector3, norm};
use crate::topology::cell_id::CellId;
use crate::topology::mesh_adapter::{MeshAdapter, cell_extents};
use crate::well::binding::{BindingEntry, CellBinding};
use crate::well_error::WellError;
use std::f64::consts::PI;

/// Orthogonal axes `(1, 2)` used when the well is aligned with axis `m`.
const ORTHOGONAL: [(usize, usize); 3] = [(1, 2), (0, 2), (0, 1)];

/// Peaceman equivalent radius for an anisotropic cell cross-section.
///
/// With `k1 == k2` this is `0.14 · sqrt(dx1² + dx2²)`.
pub fn peaceman_radius(k1: f64, k2: f64, dx1: f64, dx2: f64) -> f64 {
    let r21 = k2 / k1;
    let r12 = k1 / k2;
    0.28 * (r21.sqrt() * dx1 * dx1 + r12.sqrt() * dx2 * dx2).sqrt()
        / (r21.powf(0.25) + r12.powf(0.25))
}

/// Everything the single-cell model needs.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PeacemanInput {
    /// Cell extents along x, y, z.
    pub extents: Vector3,
    /// Principal permeabilities at the cell center.
    pub permeability: [f64; 3],
    /// Accumulated well length in the cell.
    pub length: f64,
    /// Well direction in the cell (need not be unit length).
    pub direction: Vector3,
    pub radius: f64,
    pub skin: f64,
}

/// Per-axis contributions `(J_x, J_y, J_z)` for one cell.
///
/// Axes with a zero projected length contribute 0 and are not checked.
/// Any other axis whose `ln(r_eq / r_w) + skin` is not positive makes the
/// Peaceman correction invalid for this cell.
pub fn axis_productivities(cell: CellId, input: &PeacemanInput) -> Result<Vector3, WellError> {
    let mut j = [0.0; 3];
    for (axis, &(a1, a2)) in ORTHOGONAL.iter().enumerate() {
        let projected = input.length * input.direction[axis].abs();
        if projected == 0.0 {
            continue;
        }
        let (k1, k2) = (input.permeability[a1], input.permeability[a2]);
        let r_eq = peaceman_radius(k1, k2, input.extents[a1], input.extents[a2]);
        let log_term = (r_eq / input.radius).ln() + input.skin;
        if !(log_term > 0.0) {
            return Err(WellError::InvalidPeacemanRadius {
                cell,
                axis,
                log_term,
            });
        }
        j[axis] = 2.0 * PI * (k1 * k2).sqrt() * projected / log_term;
    }
    Ok(j)
}

/// Scalar productivity index of one cell: `|(J_x, J_y, J_z)|`.
pub fn productivity_index(cell: CellId, input: &PeacemanInput) -> Result<f64, WellError> {
    axis_productivities(cell, input).map(norm)
}

/// Evaluates productivity indices for every cell of a binding.
#[derive(Debug)]
pub struct ProductivityCalculator<'a, M: ?Sized, P: ?Sized> {
    mesh: &'a M,
    permeability: &'a P,
}

impl<'a, M, P> ProductivityCalculator<'a, M, P>
where
    M: MeshAdapter + ?Sized,
    P: PermeabilityField + ?Sized,
{
    pub fn new(mesh: &'a M, permeability: &'a P) -> Self {
        Self { mesh, permeability }
    }

    /// Productivity of one bound cell.
    pub fn cell_productivity(
        &self,
        entry: &BindingEntry,
        radius: f64,
        skin: f64,
    ) -> Result<f64, WellError> {
        let center = self.mesh.center(entry.cell)?;
        let input = PeacemanInput {
            extents: cell_extents(self.mesh, entry.cell)?,
            permeability: checked_permeability(self.permeability, entry.cell, &center)?,
            length: entry.length,
            direction: entry.direction,
            radius,
            skin,
        };
        productivity_index(entry.cell, &input)
    }

    /// Productivities in binding (handle) order.
    pub fn compute(
        &self,
        binding: &CellBinding,
        radius: f64,
        skin: f64,
    ) -> Result<Vec<f64>, WellError> {
        if !(radius > 0.0 && radius.is_finite()) {
            return Err(WellError::NonPositiveRadius(radius));
        }
        let productivities = binding
            .iter()
            .map(|entry| self.cell_productivity(entry, radius, skin))
            .collect::<Result<Vec<_>, _>>()?;
        log::debug!(
            "productivity updated for {} cells, sum {:.6e}",
            productivities.len(),
            productivities.iter().sum::<f64>()
        );
        Ok(productivities)
    }
}
