//! Binding well trajectories to mesh cells.
//!
//! # Algorithm
//! A point well claims the single cell containing its point, with a
//! vertical direction and the cell's vertical extent as length.
//!
//! For a polyline, every segment `x = x0 + a t`, `t ∈ [0, len]`, is tested
//! against every cell:
//! 1. the cell center `p0` is projected onto the segment's line at `d`;
//!    the cell is rejected unless `d` lies in it (tolerant test);
//! 2. if `d` falls outside `[0, len]` and neither end point is in the
//!    cell, the segment does not reach it;
//! 3. the in-cell marching start is `d`, or the end point inside the cell;
//! 4. if the segment lies in the plane of a face (tangent orthogonal to the
//!    face normal, `d` on the face), only the face-adjacent cell whose
//!    center is closer to that plane keeps it, ties going to the larger
//!    [`CellId`];
//! 5. the in-cell length is integrated by marching from the start point in
//!    both directions with a fixed step.
//!
//! Cells are keyed by handle, so visiting the mesh in a different order
//! produces the same binding.

use crate::geometry::metrics::{Point3, Vector3, axpy, distance, dot, normalize, sub};
use crate::topology::cell_id::CellId;
use crate::topology::mesh_adapter::{FaceNeighbor, MeshAdapter, cell_extents, point_inside_cell};
use crate::well::binding::CellBinding;
use crate::well::trajectory::{Segment, WellTrajectory};
use crate::well_error::WellError;
use hashbrown::HashSet;

/// Tolerances of the binder.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct LocateConfig {
    /// Positional perturbation of the tolerant point-in-cell test, relative
    /// to the cell diameter.
    pub inside_tolerance: f64,
    /// Marching step as a fraction of the segment length.
    pub step_fraction: f64,
    /// Angle (radians) under which a well tangent counts as parallel to a face.
    pub small_angle: f64,
    /// Distance tolerance of the neighbor comparison, relative to the cell diameter.
    pub distance_tolerance: f64,
}

impl Default for LocateConfig {
    fn default() -> Self {
        Self {
            inside_tolerance: 1e-6,
            step_fraction: 1e-4,
            small_angle: 1e-3,
            distance_tolerance: 1e-8,
        }
    }
}

/// Smallest accepted [`LocateConfig::step_fraction`].
pub const MIN_STEP_FRACTION: f64 = 1e-9;

impl LocateConfig {
    pub fn validate(&self) -> Result<(), WellError> {
        let checks = [
            ("inside_tolerance", self.inside_tolerance, 0.0, 1.0),
            ("step_fraction", self.step_fraction, MIN_STEP_FRACTION, 1.0),
            ("small_angle", self.small_angle, 0.0, std::f64::consts::FRAC_PI_2),
            ("distance_tolerance", self.distance_tolerance, 0.0, 1.0),
        ];
        for (name, value, lo, hi) in checks {
            if !(value >= lo && value <= hi) {
                return Err(WellError::InvalidConfig(format!(
                    "{name} must lie in [{lo}, {hi}], got {value}"
                )));
            }
        }
        Ok(())
    }
}

/// Walks a mesh and records which cells a trajectory occupies.
#[derive(Debug)]
pub struct CellBinder<'a, M: ?Sized> {
    mesh: &'a M,
    config: LocateConfig,
}

impl<'a, M: MeshAdapter + ?Sized> CellBinder<'a, M> {
    pub fn new(mesh: &'a M, config: LocateConfig) -> Result<Self, WellError> {
        config.validate()?;
        Ok(Self { mesh, config })
    }

    pub fn config(&self) -> &LocateConfig {
        &self.config
    }

    /// Bind `trajectory` to the mesh cells it occupies.
    ///
    /// A trajectory entirely outside the mesh yields an empty binding.
    pub fn bind(&self, trajectory: &WellTrajectory) -> Result<CellBinding, WellError> {
        let binding = if trajectory.is_point_well() {
            self.bind_point(trajectory.points()[0])?
        } else {
            self.bind_segments(trajectory)?
        };
        crate::debug_invariants!(
            crate::debug_invariants::DebugInvariants::validate_invariants(&binding),
            "CellBinder::bind"
        );
        log::debug!(
            "well bound to {} cells, total in-cell length {:.6e} of {:.6e}",
            binding.len(),
            binding.total_length(),
            trajectory.length()
        );
        Ok(binding)
    }

    fn bind_point(&self, location: Point3) -> Result<CellBinding, WellError> {
        let mut owner: Option<CellId> = None;
        for cell in self.mesh.cells() {
            if self.mesh.contains_point(cell, location)? {
                owner = owner.max(Some(cell));
            }
        }
        let mut binding = CellBinding::new();
        if let Some(cell) = owner {
            let h = cell_extents(self.mesh, cell)?;
            binding.merge(cell, h[2], [0.0, 0.0, 1.0]);
            log::trace!("point well at {location:?} bound to cell {cell}");
        }
        Ok(binding)
    }

    fn bind_segments(&self, trajectory: &WellTrajectory) -> Result<CellBinding, WellError> {
        let segments: Vec<Segment> = trajectory.segments().collect();
        let mut binding = CellBinding::new();
        let mut visited = HashSet::new();
        for cell in self.mesh.cells() {
            if !visited.insert(cell) {
                continue;
            }
            for segment in &segments {
                if let Some(length) = self.length_in_cell(cell, segment)? {
                    binding.merge(cell, length, segment.tangent);
                }
            }
        }
        Ok(binding)
    }

    /// Length of `segment` inside `cell`, or `None` if the cell does not get it.
    fn length_in_cell(&self, cell: CellId, segment: &Segment) -> Result<Option<f64>, WellError> {
        let tol = self.config.inside_tolerance;
        let x0 = segment.start;
        let x1 = segment.end;
        let a = segment.tangent;

        let p0 = self.mesh.center(cell)?;
        let td = dot(sub(p0, x0), a);
        let d = axpy(x0, td, a);
        if !point_inside_cell(self.mesh, cell, d, tol)? {
            return Ok(None);
        }

        let x0_inside = self.mesh.contains_point(cell, x0)?;
        let x1_inside = self.mesh.contains_point(cell, x1)?;
        let outside_segment = td < 0.0 || td > segment.length;
        if outside_segment && !(x0_inside || x1_inside) {
            return Ok(None);
        }

        let start = if td < 0.0 {
            if x0_inside { x0 } else { x1 }
        } else if td > segment.length {
            if x1_inside { x1 } else { x0 }
        } else {
            d
        };

        if self.neighbor_claims_segment(cell, p0, d, a)? {
            log::trace!("cell {cell} yields a face-aligned segment to a neighbor");
            return Ok(None);
        }

        let length = self.march(cell, start, segment)?;
        log::trace!("cell {cell} takes {length:.6e} of a segment");
        Ok(Some(length))
    }

    /// Whether a face-adjacent neighbor should own a well lying on the shared face.
    fn neighbor_claims_segment(
        &self,
        cell: CellId,
        p0: Point3,
        d: Point3,
        tangent: Vector3,
    ) -> Result<bool, WellError> {
        let diameter = self.mesh.diameter(cell)?;
        // a well within the inside tolerance of a face is seen by both cells
        let plane_eps = self
            .config
            .inside_tolerance
            .max(self.config.distance_tolerance)
            * diameter;
        let eps = self.config.distance_tolerance * diameter;
        let sin_small = self.config.small_angle.sin();

        for face in 0..self.mesh.n_faces(cell)? {
            let Some(nf) = normalize(self.mesh.face_normal(cell, face)?) else {
                continue;
            };
            let sample = self.mesh.face_sample(cell, face)?;
            if !lies_in_face(tangent, sub(d, sample), nf, sin_small, plane_eps) {
                continue;
            }
            let candidates: Vec<(CellId, Vector3)> = match self.mesh.face_neighbor(cell, face)? {
                FaceNeighbor::Boundary => continue,
                FaceNeighbor::SameLevel(n) | FaceNeighbor::Coarser(n) => vec![(n, nf)],
                FaceNeighbor::Refined(children) => children
                    .iter()
                    .enumerate()
                    .map(|(sub_idx, &n)| {
                        self.mesh
                            .subface_normal(cell, face, sub_idx)
                            .map(|normal| (n, normalize(normal).unwrap_or(nf)))
                    })
                    .collect::<Result<_, _>>()?,
            };
            let cell_dist = dot(sub(p0, d), nf).abs();
            for (neighbor, normal) in candidates {
                let neighbor_dist = dot(sub(self.mesh.center(neighbor)?, d), normal).abs();
                if !cell_keeps_well(cell_dist, neighbor_dist, cell, neighbor, eps) {
                    return Ok(true);
                }
            }
        }
        Ok(false)
    }

    /// March from `start` along the segment in both directions while the
    /// next point stays inside the cell and within the segment.
    fn march(&self, cell: CellId, start: Point3, segment: &Segment) -> Result<f64, WellError> {
        let tol = self.config.inside_tolerance;
        let step = segment.length * self.config.step_fraction;
        // one direction never needs more steps than the whole segment holds
        let max_steps = (1.0 / self.config.step_fraction).ceil() as usize + 1;
        let mut length = 0.0;
        for sign in [1.0, -1.0] {
            let mut prev = start;
            for _ in 0..max_steps {
                let next = axpy(prev, sign * step, segment.tangent);
                if next == prev {
                    return Err(WellError::InvalidConfig(format!(
                        "marching step {step:e} vanishes at {prev:?} in cell {cell}"
                    )));
                }
                let t = dot(sub(next, segment.start), segment.tangent);
                if t < 0.0 || t > segment.length {
                    break;
                }
                if !point_inside_cell(self.mesh, cell, next, tol)? {
                    break;
                }
                length += distance(next, prev);
                prev = next;
            }
        }
        Ok(length)
    }
}

/// The segment with unit `tangent` runs in the face plane with unit normal
/// `nf`: `|tangent · nf| <= sin(small_angle)` and `offset` (from a point of the
/// face to the projection `d`) has no normal part beyond `eps`.
fn lies_in_face(tangent: Vector3, offset: Vector3, nf: Vector3, sin_small_angle: f64, eps: f64) -> bool {
    dot(tangent, nf).abs() <= sin_small_angle && dot(offset, nf).abs() <= eps
}

/// Whether a cell at `cell_dist` from the well keeps it against a neighbor
/// at `neighbor_dist`. Distances within `eps` tie and go to the larger handle.
fn cell_keeps_well(
    cell_dist: f64,
    neighbor_dist: f64,
    cell: CellId,
    neighbor: CellId,
    eps: f64,
) -> bool {
    if cell_dist + eps < neighbor_dist {
        true
    } else if cell_dist <= neighbor_dist + eps {
        cell > neighbor
    } else {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forest::BoxForest;

    fn cid(raw: u64) -> CellId {
        CellId::new(raw).unwrap()
    }

    #[test]
    fn tie_goes_to_larger_handle() {
        assert!(cell_keeps_well(1.0, 1.0, cid(3), cid(2), 1e-9));
        assert!(!cell_keeps_well(1.0, 1.0, cid(2), cid(3), 1e-9));
        assert!(cell_keeps_well(0.5, 1.0, cid(1), cid(9), 1e-9));
        assert!(!cell_keeps_well(1.0, 0.5, cid(9), cid(1), 1e-9));
    }

    #[test]
    fn in_face_test_needs_parallel_tangent_and_zero_normal_offset() {
        let sin = 1e-3f64.sin();
        let nf = [-1.0, 0.0, 0.0];
        // vertical well on the face, off the cell's center line
        assert!(lies_in_face([0.0, 0.0, 1.0], [0.0, -0.2, 0.0], nf, sin, 1e-8));
        // oblique within the face plane
        assert!(lies_in_face([0.0, 0.97, 0.24], [0.0, 0.1, 0.3], nf, sin, 1e-8));
        // crossing the face
        assert!(!lies_in_face([1.0, 0.0, 0.0], [0.0; 3], nf, sin, 1e-8));
        // parallel but inside the cell
        assert!(!lies_in_face([0.0, 0.0, 1.0], [0.3, 0.0, 0.0], nf, sin, 1e-8));
    }

    #[test]
    fn config_validation() {
        LocateConfig::default().validate().unwrap();
        let bad = LocateConfig {
            step_fraction: 0.0,
            ..Default::default()
        };
        assert!(matches!(bad.validate(), Err(WellError::InvalidConfig(_))));
        let forest = BoxForest::uniform([0.0; 3], [1.0; 3], [1, 1, 1]).unwrap();
        assert!(CellBinder::new(&forest, bad).is_err());
        let tiny = LocateConfig {
            step_fraction: 1e-18,
            ..Default::default()
        };
        assert!(matches!(tiny.validate(), Err(WellError::InvalidConfig(_))));
        let floor = LocateConfig {
            step_fraction: MIN_STEP_FRACTION,
            ..Default::default()
        };
        floor.validate().unwrap();
    }

    #[test]
    fn vanishing_step_is_an_error_not_a_hang() {
        let forest = BoxForest::uniform([0.0; 3], [1.0; 3], [1, 1, 1]).unwrap();
        // bypass validation to reach the marching guard
        let binder = CellBinder {
            mesh: &forest,
            config: LocateConfig {
                step_fraction: 1e-18,
                ..Default::default()
            },
        };
        let well = WellTrajectory::new(vec![[0.2, 0.5, 0.5], [0.8, 0.5, 0.5]], 0.01, 0.0).unwrap();
        assert!(matches!(binder.bind(&well), Err(WellError::InvalidConfig(_))));
    }

    #[test]
    fn coarse_step_stops_at_the_cell_boundary() {
        let forest = BoxForest::uniform([0.0; 3], [1.0; 3], [1, 1, 1]).unwrap();
        let config = LocateConfig {
            step_fraction: 1.0,
            ..Default::default()
        };
        let binder = CellBinder::new(&forest, config).unwrap();
        let well = WellTrajectory::new(vec![[0.2, 0.5, 0.5], [0.8, 0.5, 0.5]], 0.01, 0.0).unwrap();
        let e = binder.bind(&well).unwrap().get(cid(1)).copied().unwrap();
        assert_eq!(e.length, 0.0);
    }

    #[test]
    fn marching_covers_a_centered_segment() {
        let forest = BoxForest::uniform([0.0; 3], [1.0; 3], [1, 1, 1]).unwrap();
        let binder = CellBinder::new(&forest, LocateConfig::default()).unwrap();
        let well = WellTrajectory::new(vec![[0.2, 0.5, 0.5], [0.8, 0.5, 0.5]], 0.01, 0.0).unwrap();
        let binding = binder.bind(&well).unwrap();
        assert_eq!(binding.len(), 1);
        let e = binding.get(cid(1)).unwrap();
        assert!((e.length - 0.6).abs() < 3.0 * 0.6 * 1e-4, "length {}", e.length);
        assert_eq!(e.direction, [1.0, 0.0, 0.0]);
    }

    #[test]
    fn partially_inside_segment_starts_at_end_point() {
        // Cell center projects beyond x1, but x1 lies in the cell.
        let forest = BoxForest::uniform([0.0; 3], [1.0; 3], [1, 1, 1]).unwrap();
        let binder = CellBinder::new(&forest, LocateConfig::default()).unwrap();
        let well = WellTrajectory::new(vec![[-2.0, 0.5, 0.5], [0.25, 0.5, 0.5]], 0.01, 0.0).unwrap();
        let binding = binder.bind(&well).unwrap();
        let e = binding.get(cid(1)).unwrap();
        assert!((e.length - 0.25).abs() < 1e-3, "length {}", e.length);
    }

    #[test]
    fn outside_well_binds_nothing() {
        let forest = BoxForest::uniform([0.0; 3], [1.0; 3], [2, 2, 2]).unwrap();
        let binder = CellBinder::new(&forest, LocateConfig::default()).unwrap();
        let well = WellTrajectory::new(vec![[5.0, 5.0, 5.0], [6.0, 5.0, 5.0]], 0.01, 0.0).unwrap();
        assert!(binder.bind(&well).unwrap().is_empty());
        let point = WellTrajectory::point([-1.0, 0.5, 0.5], 0.01, 0.0).unwrap();
        assert!(binder.bind(&point).unwrap().is_empty());
    }
}
