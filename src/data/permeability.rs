//! Anisotropic, diagonal permeability fields.
//!
//! The productivity model only needs `(kx, ky, kz)` at a cell center. Any
//! closure `Fn(&Point3) -> [f64; 3]` is a field, so heterogeneous models
//! can be plugged in without a wrapper type.

use crate::geometry::metrics::Point3;
use crate::topology::cell_id::CellId;
use crate::well_error::WellError;

/// Diagonal permeability tensor lookup by spatial point.
pub trait PermeabilityField {
    /// Principal permeabilities `(kx, ky, kz)` at `p`.
    fn permeability(&self, p: &Point3) -> [f64; 3];
}

impl<F> PermeabilityField for F
where
    F: Fn(&Point3) -> [f64; 3],
{
    fn permeability(&self, p: &Point3) -> [f64; 3] {
        self(p)
    }
}

/// The same diagonal tensor everywhere.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct UniformPermeability {
    k: [f64; 3],
}

impl UniformPermeability {
    pub fn isotropic(k: f64) -> Self {
        Self { k: [k; 3] }
    }

    pub fn anisotropic(k: [f64; 3]) -> Self {
        Self { k }
    }

    /// Scale each principal value by a per-axis anisotropy multiplier.
    pub fn with_anisotropy(self, factors: [f64; 3]) -> Self {
        Self {
            k: [
                self.k[0] * factors[0],
                self.k[1] * factors[1],
                self.k[2] * factors[2],
            ],
        }
    }

    pub fn values(&self) -> [f64; 3] {
        self.k
    }
}

impl PermeabilityField for UniformPermeability {
    fn permeability(&self, _p: &Point3) -> [f64; 3] {
        self.k
    }
}

/// Sample `field` at `p` and reject non-positive or non-finite components.
pub fn checked_permeability<P: PermeabilityField + ?Sized>(
    field: &P,
    cell: CellId,
    p: &Point3,
) -> Result<[f64; 3], WellError> {
    let k = field.permeability(p);
    for (axis, &value) in k.iter().enumerate() {
        if !(value > 0.0 && value.is_finite()) {
            return Err(WellError::InvalidPermeability { cell, axis, value });
        }
    }
    Ok(k)
}
