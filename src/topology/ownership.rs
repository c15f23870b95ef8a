//! Ownership metadata for mesh cells and a partition-local mesh view.
//!
//! The [`CellOwnership`] map records the owning rank of every cell a rank
//! can see and whether that cell is a ghost there. [`LocalMesh`] wraps a
//! mesh so that binding visits only locally owned cells, while neighbor and
//! geometry queries still reach ghosts. Each cell is therefore bound on
//! exactly one rank, and partition-local productivity sums add up to the
//! serial sum.

use crate::geometry::metrics::{Point3, Vector3};
use crate::topology::cell_id::CellId;
use crate::topology::mesh_adapter::{FaceNeighbor, MeshAdapter};
use crate::well_error::WellError;

#[derive(Copy, Clone, Debug, Eq, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct OwnershipEntry {
    pub owner: usize,
    pub is_ghost: bool,
}

#[derive(Clone, Debug, Default, serde::Serialize, serde::Deserialize)]
pub struct CellOwnership {
    entries: Vec<Option<OwnershipEntry>>,
}

impl CellOwnership {
    /// Create an empty ownership map sized for `max_id` cells.
    pub fn with_capacity(max_id: usize) -> Self {
        Self {
            entries: vec![None; max_id],
        }
    }

    /// Build the map for `my_rank` from an owner-rank callback.
    pub fn from_owner_fn<I, F>(cells: I, my_rank: usize, owner_of: F) -> Self
    where
        I: IntoIterator<Item = CellId>,
        F: Fn(CellId) -> usize,
    {
        let mut map = Self::default();
        for cell in cells {
            map.set_from_owner(cell, owner_of(cell), my_rank);
        }
        map
    }

    /// Returns true if no entries exist in the map.
    pub fn is_empty(&self) -> bool {
        self.entries.iter().all(|entry| entry.is_none())
    }

    /// Insert or update an ownership entry for `cell`.
    pub fn set(&mut self, cell: CellId, owner: usize, is_ghost: bool) {
        let idx = cell.index();
        if idx >= self.entries.len() {
            self.entries.resize(idx + 1, None);
        }
        self.entries[idx] = Some(OwnershipEntry { owner, is_ghost });
    }

    /// Insert or update an ownership entry using `my_rank` to determine ghostness.
    pub fn set_from_owner(&mut self, cell: CellId, owner: usize, my_rank: usize) {
        self.set(cell, owner, owner != my_rank)
    }

    /// Retrieve the ownership entry for a cell.
    pub fn entry(&self, cell: CellId) -> Option<OwnershipEntry> {
        self.entries.get(cell.index()).copied().flatten()
    }

    /// Retrieve the owning rank for a cell.
    pub fn owner(&self, cell: CellId) -> Option<usize> {
        self.entry(cell).map(|entry| entry.owner)
    }

    /// Returns whether the cell is marked as a ghost on this rank.
    pub fn is_ghost(&self, cell: CellId) -> Option<bool> {
        self.entry(cell).map(|entry| entry.is_ghost)
    }

    /// Returns true if the cell is present and not a ghost.
    pub fn is_local(&self, cell: CellId) -> bool {
        self.entry(cell).is_some_and(|entry| !entry.is_ghost)
    }

    /// Iterate over the locally owned cells in handle order.
    pub fn owned_cells(&self) -> impl Iterator<Item = CellId> + '_ {
        self.entries
            .iter()
            .enumerate()
            .filter(|(_, entry)| matches!(entry, Some(e) if !e.is_ghost))
            .map(|(idx, _)| CellId::from_index(idx))
    }
}

/// A mesh seen from one rank: binds only owned cells, but sees ghosts.
#[derive(Clone, Copy, Debug)]
pub struct LocalMesh<'a, M> {
    mesh: &'a M,
    ownership: &'a CellOwnership,
}

impl<'a, M: MeshAdapter> LocalMesh<'a, M> {
    pub fn new(mesh: &'a M, ownership: &'a CellOwnership) -> Self {
        Self { mesh, ownership }
    }

    pub fn ownership(&self) -> &CellOwnership {
        self.ownership
    }
}

impl<M: MeshAdapter> MeshAdapter for LocalMesh<'_, M> {
    type CellIter<'b>
        = Box<dyn Iterator<Item = CellId> + 'b>
    where
        Self: 'b;

    fn cells(&self) -> Self::CellIter<'_> {
        let ownership = self.ownership;
        Box::new(self.mesh.cells().filter(move |c| ownership.is_local(*c)))
    }

    fn contains_point(&self, cell: CellId, p: Point3) -> Result<bool, WellError> {
        self.mesh.contains_point(cell, p)
    }

    fn center(&self, cell: CellId) -> Result<Point3, WellError> {
        self.mesh.center(cell)
    }

    fn diameter(&self, cell: CellId) -> Result<f64, WellError> {
        self.mesh.diameter(cell)
    }

    fn n_faces(&self, cell: CellId) -> Result<usize, WellError> {
        self.mesh.n_faces(cell)
    }

    fn face_neighbor(&self, cell: CellId, face: usize) -> Result<FaceNeighbor, WellError> {
        self.mesh.face_neighbor(cell, face)
    }

    fn face_normal(&self, cell: CellId, face: usize) -> Result<Vector3, WellError> {
        self.mesh.face_normal(cell, face)
    }

    fn subface_normal(&self, cell: CellId, face: usize, subface: usize) -> Result<Vector3, WellError> {
        self.mesh.subface_normal(cell, face, subface)
    }

    fn face_sample(&self, cell: CellId, face: usize) -> Result<Point3, WellError> {
        self.mesh.face_sample(cell, face)
    }
}
