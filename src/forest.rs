//! Octree AMR forest of axis-aligned boxes, exposed as a [`MeshAdapter`].
//!
//! The forest starts from a structured grid of root boxes and refines
//! leaves into eight children. No 2:1 balance is enforced, so a face may
//! see a neighbor at the same level, a coarser neighbor, or any number of
//! finer leaves (hanging nodes).
//!
//! Cell handles are assigned in sorted leaf order (level, then integer
//! coordinates) and are re-assigned after every refinement. Wells must be
//! re-located whenever the forest changes.

use crate::geometry::metrics::{Aabb, Point3, Vector3};
use crate::topology::cell_id::CellId;
use crate::topology::mesh_adapter::{FaceNeighbor, MeshAdapter};
use crate::well_error::WellError;
use hashbrown::HashMap;
use std::collections::BTreeSet;

/// Deepest refinement level a forest accepts.
pub const MAX_LEVEL: u8 = 20;

/// Largest root grid dimension along one axis. Integer coordinates of a
/// leaf at [`MAX_LEVEL`] must still fit in a `u32`.
pub const MAX_ROOTS_PER_AXIS: u32 = u32::MAX >> MAX_LEVEL;

/// A cell in the octree forest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TreeCell {
    /// Refinement level (0 is a root box).
    pub level: u8,
    /// Integer coordinates at the given level.
    pub coords: [u32; 3],
}

impl TreeCell {
    /// Returns the parent cell, or `None` for a root box.
    pub fn parent(&self) -> Option<Self> {
        if self.level == 0 {
            None
        } else {
            let mut coords = self.coords;
            for coord in &mut coords {
                *coord /= 2;
            }
            Some(Self {
                level: self.level - 1,
                coords,
            })
        }
    }

    /// Returns the 8 children of this cell.
    ///
    /// Coordinates of a forest leaf below [`MAX_LEVEL`] never overflow here.
    pub fn children(&self) -> Vec<Self> {
        let mut children = Vec::with_capacity(8);
        for idx in 0..8usize {
            let mut coords = [0u32; 3];
            for axis in 0..3 {
                let bit = (idx >> axis) & 1;
                coords[axis] = self.coords[axis] * 2 + bit as u32;
            }
            children.push(Self {
                level: self.level + 1,
                coords,
            });
        }
        children
    }
}

/// Adaptive octree mesh over a box-shaped domain.
#[derive(Debug, Clone)]
pub struct BoxForest {
    origin: Point3,
    root_size: Vector3,
    roots: [u32; 3],
    leaves: BTreeSet<TreeCell>,
    cells: Vec<TreeCell>,
    ids: HashMap<TreeCell, CellId>,
}

impl BoxForest {
    /// A uniform grid of `dims` root boxes of size `cell_size` starting at `origin`.
    pub fn uniform(origin: Point3, cell_size: Vector3, dims: [u32; 3]) -> Result<Self, WellError> {
        if dims.iter().any(|&n| n == 0) {
            return Err(WellError::InvalidMesh(format!(
                "root grid dimensions must be positive, got {dims:?}"
            )));
        }
        if dims.iter().any(|&n| n > MAX_ROOTS_PER_AXIS) {
            return Err(WellError::InvalidMesh(format!(
                "root grid dimensions must not exceed {MAX_ROOTS_PER_AXIS} per axis, got {dims:?}"
            )));
        }
        if cell_size.iter().any(|&h| !(h > 0.0 && h.is_finite())) {
            return Err(WellError::InvalidMesh(format!(
                "root cell size must be positive and finite, got {cell_size:?}"
            )));
        }
        let mut leaves = BTreeSet::new();
        for i in 0..dims[0] {
            for j in 0..dims[1] {
                for k in 0..dims[2] {
                    leaves.insert(TreeCell {
                        level: 0,
                        coords: [i, j, k],
                    });
                }
            }
        }
        let mut forest = Self {
            origin,
            root_size: cell_size,
            roots: dims,
            leaves,
            cells: Vec::new(),
            ids: HashMap::new(),
        };
        forest.renumber();
        Ok(forest)
    }

    /// Number of leaf cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// The tree cell behind a handle.
    pub fn tree_cell(&self, cell: CellId) -> Result<TreeCell, WellError> {
        self.cells
            .get(cell.index())
            .copied()
            .ok_or(WellError::UnknownCell(cell))
    }

    /// Handle of a leaf, if `tree_cell` is currently a leaf.
    pub fn cell_id(&self, tree_cell: &TreeCell) -> Option<CellId> {
        self.ids.get(tree_cell).copied()
    }

    pub fn level(&self, cell: CellId) -> Result<u8, WellError> {
        Ok(self.tree_cell(cell)?.level)
    }

    /// Physical box of a leaf.
    pub fn cell_bounds(&self, cell: CellId) -> Result<Aabb, WellError> {
        Ok(self.bounds_of(&self.tree_cell(cell)?))
    }

    /// The leaf with the largest handle whose closed box contains `p`.
    pub fn cell_id_at(&self, p: Point3) -> Option<CellId> {
        self.cells
            .iter()
            .enumerate()
            .rev()
            .find(|(_, tc)| self.bounds_of(tc).contains(p))
            .map(|(i, _)| CellId::from_index(i))
    }

    /// Refine the given leaves into eight children each.
    ///
    /// Returns the number of refined cells. All handles are re-assigned.
    pub fn refine(&mut self, cells: &[CellId]) -> Result<usize, WellError> {
        let targets = cells
            .iter()
            .map(|&c| self.tree_cell(c))
            .collect::<Result<Vec<_>, _>>()?;
        self.refine_cells(&targets)
    }

    /// Refine all leaves whose indicator (evaluated on the leaf box) exceeds the threshold.
    pub fn refine_by_indicator<F>(&mut self, indicator: F, threshold: f64) -> Result<usize, WellError>
    where
        F: Fn(&Aabb) -> f64,
    {
        let targets: Vec<_> = self
            .leaves
            .iter()
            .copied()
            .filter(|tc| indicator(&self.bounds_of(tc)) > threshold)
            .collect();
        self.refine_cells(&targets)
    }

    fn refine_cells(&mut self, targets: &[TreeCell]) -> Result<usize, WellError> {
        if let Some(tc) = targets.iter().find(|tc| tc.level >= MAX_LEVEL) {
            return Err(WellError::InvalidMesh(format!(
                "cannot refine {tc:?} beyond level {MAX_LEVEL}"
            )));
        }
        let mut refined = 0;
        for tc in targets {
            if self.leaves.remove(tc) {
                for child in tc.children() {
                    self.leaves.insert(child);
                }
                refined += 1;
            }
        }
        self.renumber();
        Ok(refined)
    }

    fn renumber(&mut self) {
        self.cells = self.leaves.iter().copied().collect();
        self.ids = self
            .cells
            .iter()
            .enumerate()
            .map(|(i, tc)| (*tc, CellId::from_index(i)))
            .collect();
    }

    fn max_level(&self) -> u8 {
        self.cells.iter().map(|tc| tc.level).max().unwrap_or(0)
    }

    fn size_at(&self, level: u8) -> Vector3 {
        let scale = 1.0 / f64::from(1u32 << level);
        [
            self.root_size[0] * scale,
            self.root_size[1] * scale,
            self.root_size[2] * scale,
        ]
    }

    fn bounds_of(&self, tc: &TreeCell) -> Aabb {
        let h = self.size_at(tc.level);
        let mut min = [0.0; 3];
        let mut max = [0.0; 3];
        for axis in 0..3 {
            // Both ends from integer multiples so shared faces match bit for bit.
            min[axis] = self.origin[axis] + f64::from(tc.coords[axis]) * h[axis];
            max[axis] = self.origin[axis] + f64::from(tc.coords[axis] + 1) * h[axis];
        }
        Aabb { min, max }
    }

    fn check_face(&self, cell: CellId, face: usize) -> Result<TreeCell, WellError> {
        let tc = self.tree_cell(cell)?;
        if face >= 6 {
            return Err(WellError::InvalidFace { cell, face });
        }
        Ok(tc)
    }

    fn neighbor_of(&self, tc: &TreeCell, face: usize) -> FaceNeighbor {
        let axis = face / 2;
        let upper = face % 2 == 1;
        let extent = self.roots[axis] << tc.level;
        let mut coords = tc.coords;
        if upper {
            if coords[axis] + 1 >= extent {
                return FaceNeighbor::Boundary;
            }
            coords[axis] += 1;
        } else {
            if coords[axis] == 0 {
                return FaceNeighbor::Boundary;
            }
            coords[axis] -= 1;
        }
        let candidate = TreeCell {
            level: tc.level,
            coords,
        };
        if let Some(id) = self.cell_id(&candidate) {
            return FaceNeighbor::SameLevel(id);
        }
        let mut ancestor = candidate.parent();
        while let Some(a) = ancestor {
            if let Some(id) = self.cell_id(&a) {
                return FaceNeighbor::Coarser(id);
            }
            ancestor = a.parent();
        }
        // The neighbor was refined: gather every leaf touching our face.
        let mut found = Vec::new();
        self.collect_face_leaves(&candidate, axis, !upper, self.max_level(), &mut found);
        if found.is_empty() {
            return FaceNeighbor::Boundary;
        }
        found.sort_unstable();
        FaceNeighbor::Refined(found)
    }

    /// Leaves below `tc` that touch its `upper`/lower side along `axis`.
    fn collect_face_leaves(
        &self,
        tc: &TreeCell,
        axis: usize,
        upper: bool,
        max_level: u8,
        out: &mut Vec<CellId>,
    ) {
        if tc.level >= max_level {
            return;
        }
        let side = u32::from(upper);
        for child in tc.children() {
            if child.coords[axis] % 2 != side {
                continue;
            }
            match self.cell_id(&child) {
                Some(id) => out.push(id),
                None => self.collect_face_leaves(&child, axis, upper, max_level, out),
            }
        }
    }
}

impl MeshAdapter for BoxForest {
    type CellIter<'a>
        = std::iter::Map<std::ops::Range<usize>, fn(usize) -> CellId>
    where
        Self: 'a;

    fn cells(&self) -> Self::CellIter<'_> {
        (0..self.cells.len()).map(CellId::from_index as fn(usize) -> CellId)
    }

    fn contains_point(&self, cell: CellId, p: Point3) -> Result<bool, WellError> {
        Ok(self.cell_bounds(cell)?.contains(p))
    }

    fn center(&self, cell: CellId) -> Result<Point3, WellError> {
        Ok(self.cell_bounds(cell)?.center())
    }

    fn diameter(&self, cell: CellId) -> Result<f64, WellError> {
        Ok(self.cell_bounds(cell)?.diameter())
    }

    fn n_faces(&self, cell: CellId) -> Result<usize, WellError> {
        self.tree_cell(cell).map(|_| 6)
    }

    fn face_neighbor(&self, cell: CellId, face: usize) -> Result<FaceNeighbor, WellError> {
        let tc = self.check_face(cell, face)?;
        Ok(self.neighbor_of(&tc, face))
    }

    fn face_normal(&self, cell: CellId, face: usize) -> Result<Vector3, WellError> {
        self.check_face(cell, face)?;
        let mut n = [0.0; 3];
        n[face / 2] = if face % 2 == 1 { 1.0 } else { -1.0 };
        Ok(n)
    }

    fn face_sample(&self, cell: CellId, face: usize) -> Result<Point3, WellError> {
        let tc = self.check_face(cell, face)?;
        let bounds = self.bounds_of(&tc);
        let mut p = bounds.center();
        let axis = face / 2;
        p[axis] = if face % 2 == 1 {
            bounds.max[axis]
        } else {
            bounds.min[axis]
        };
        Ok(p)
    }
}
