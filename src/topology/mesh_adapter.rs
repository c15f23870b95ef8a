//! The mesh interface consumed by the well binder.
//!
//! Mesh generation, refinement and distribution live outside this crate.
//! A mesh only has to answer a handful of read-only questions about its
//! cells: where they are, whether they contain a point, and who lies across
//! each face. Adaptive meshes with hanging nodes report a face whose
//! neighbor is finer as [`FaceNeighbor::Refined`], one entry per subface.

use crate::geometry::metrics::{Aabb, Point3, Vector3, add};
use crate::topology::cell_id::CellId;
use crate::well_error::WellError;

/// What lies across one face of a cell.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FaceNeighbor {
    /// The face is on the domain boundary.
    Boundary,
    /// A single neighbor at the same refinement level.
    SameLevel(CellId),
    /// A single, coarser neighbor whose face contains this face.
    Coarser(CellId),
    /// The neighbor was refined; one cell per subface, in subface order.
    Refined(Vec<CellId>),
}

/// Read-only view of an unstructured, possibly adaptive mesh.
///
/// Implementations must be safe to share between threads when wells are
/// bound concurrently; binding never mutates the mesh.
pub trait MeshAdapter {
    /// Iterator over the cells this process should consider for binding.
    type CellIter<'a>: Iterator<Item = CellId>
    where
        Self: 'a;

    /// Cells to visit, in any order.
    fn cells(&self) -> Self::CellIter<'_>;

    /// Exact (closed) point-in-cell test.
    fn contains_point(&self, cell: CellId, p: Point3) -> Result<bool, WellError>;

    fn center(&self, cell: CellId) -> Result<Point3, WellError>;

    fn diameter(&self, cell: CellId) -> Result<f64, WellError>;

    fn n_faces(&self, cell: CellId) -> Result<usize, WellError>;

    /// Topology across face `face` of `cell`.
    fn face_neighbor(&self, cell: CellId, face: usize) -> Result<FaceNeighbor, WellError>;

    /// Outward unit normal of face `face` of `cell`.
    fn face_normal(&self, cell: CellId, face: usize) -> Result<Vector3, WellError>;

    /// Outward unit normal on one subface of a face with refined neighbors.
    ///
    /// Planar faces have the same normal on every subface.
    fn subface_normal(
        &self,
        cell: CellId,
        face: usize,
        _subface: usize,
    ) -> Result<Vector3, WellError> {
        self.face_normal(cell, face)
    }

    /// One sample point on face `face` of `cell` (its one-point quadrature node).
    fn face_sample(&self, cell: CellId, face: usize) -> Result<Point3, WellError>;
}

/// Point-in-cell test that tolerates boundary round-off.
///
/// `p` is accepted when any of its six copies perturbed by
/// `±tolerance · diameter` along a coordinate axis lies inside the cell.
pub fn point_inside_cell<M: MeshAdapter + ?Sized>(
    mesh: &M,
    cell: CellId,
    p: Point3,
    tolerance: f64,
) -> Result<bool, WellError> {
    let eps = tolerance * mesh.diameter(cell)?;
    for axis in 0..3 {
        for sign in [1.0, -1.0] {
            let mut shift = [0.0; 3];
            shift[axis] = sign * eps;
            if mesh.contains_point(cell, add(p, shift))? {
                return Ok(true);
            }
        }
    }
    Ok(false)
}

/// Extents of a cell along x, y and z.
///
/// This is the bounding box of the cell center and one sample point per
/// face, not the exact cell geometry; for skewed cells it underestimates
/// the true box.
pub fn cell_extents<M: MeshAdapter + ?Sized>(
    mesh: &M,
    cell: CellId,
) -> Result<Vector3, WellError> {
    let mut bbox = Aabb::from_point(mesh.center(cell)?);
    for face in 0..mesh.n_faces(cell)? {
        bbox.include(mesh.face_sample(cell, face)?);
    }
    Ok(bbox.extents())
}
