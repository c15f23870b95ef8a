#![allow(dead_code)]
use mesh_wellbore::{
    algs::communicator::RayonComm,
    forest::BoxForest,
    geometry::metrics::{Point3, Vector3},
    topology::{CellId, FaceNeighbor, MeshAdapter},
    well::WellTrajectory,
    well_error::WellError,
};

pub fn cid(u: u64) -> CellId {
    CellId::new(u).unwrap()
}

/// Uniform forest of unit cubes at the origin.
pub fn unit_grid(nx: u32, ny: u32, nz: u32) -> BoxForest {
    BoxForest::uniform([0.0; 3], [1.0; 3], [nx, ny, nz]).unwrap()
}

pub fn polyline(points: &[Point3], radius: f64) -> WellTrajectory {
    WellTrajectory::new(points.to_vec(), radius, 0.0).unwrap()
}

/// Two-rank Rayon comms (ranks 0 and 1).
pub fn rayons() -> (RayonComm, RayonComm) {
    (RayonComm::new(0, 2), RayonComm::new(1, 2))
}

/// Assert vec is a permutation of another vec (order-agnostic).
pub fn assert_permutation<T: Ord + Copy + std::fmt::Debug>(got: &[T], want: &[T]) {
    let mut a = got.to_vec();
    a.sort_unstable();
    let mut b = want.to_vec();
    b.sort_unstable();
    assert_eq!(a, b, "not a permutation\n got={:?}\nwant={:?}", got, want);
}

/// A mesh that yields the cells of another mesh in a caller-chosen order.
pub struct Shuffled<'a, M> {
    pub inner: &'a M,
    pub order: Vec<CellId>,
}

impl<M: MeshAdapter> MeshAdapter for Shuffled<'_, M> {
    type CellIter<'b>
        = std::iter::Copied<std::slice::Iter<'b, CellId>>
    where
        Self: 'b;

    fn cells(&self) -> Self::CellIter<'_> {
        self.order.iter().copied()
    }

    fn contains_point(&self, cell: CellId, p: Point3) -> Result<bool, WellError> {
        self.inner.contains_point(cell, p)
    }

    fn center(&self, cell: CellId) -> Result<Point3, WellError> {
        self.inner.center(cell)
    }

    fn diameter(&self, cell: CellId) -> Result<f64, WellError> {
        self.inner.diameter(cell)
    }

    fn n_faces(&self, cell: CellId) -> Result<usize, WellError> {
        self.inner.n_faces(cell)
    }

    fn face_neighbor(&self, cell: CellId, face: usize) -> Result<FaceNeighbor, WellError> {
        self.inner.face_neighbor(cell, face)
    }

    fn face_normal(&self, cell: CellId, face: usize) -> Result<Vector3, WellError> {
        self.inner.face_normal(cell, face)
    }

    fn face_sample(&self, cell: CellId, face: usize) -> Result<Point3, WellError> {
        self.inner.face_sample(cell, face)
    }
}
