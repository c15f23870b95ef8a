mod util;

use mesh_wellbore::prelude::*;
use proptest::prelude::*;
use util::*;

fn bind(mesh: &impl MeshAdapter, well: &WellTrajectory) -> CellBinding {
    CellBinder::new(mesh, LocateConfig::default())
        .unwrap()
        .bind(well)
        .unwrap()
}

#[test]
fn point_well_binds_its_cell() {
    let mesh = BoxForest::uniform([0.0; 3], [1.0, 1.0, 2.5], [3, 3, 3]).unwrap();
    let well = WellTrajectory::point([1.5, 1.5, 3.0], 0.05, 0.0).unwrap();
    let binding = bind(&mesh, &well);
    let expected = mesh.cell_id_at([1.5, 1.5, 3.0]).unwrap();
    assert_eq!(binding.cells().collect::<Vec<_>>(), vec![expected]);
    let e = binding.get(expected).unwrap();
    assert_eq!(e.direction, [0.0, 0.0, 1.0]);
    assert_eq!(e.length, 2.5);
}

#[test]
fn point_well_on_a_face_binds_one_cell() {
    let mesh = unit_grid(2, 1, 1);
    let well = WellTrajectory::point([1.0, 0.5, 0.5], 0.05, 0.0).unwrap();
    let binding = bind(&mesh, &well);
    assert_eq!(binding.cells().collect::<Vec<_>>(), vec![cid(2)]);
}

#[test]
fn face_aligned_well_binds_higher_handle() {
    let mesh = unit_grid(2, 1, 1);
    let well = polyline(&[[1.0, 0.5, 0.1], [1.0, 0.5, 0.9]], 0.05);
    let binding = bind(&mesh, &well);
    assert_eq!(binding.cells().collect::<Vec<_>>(), vec![cid(2)]);
    let e = binding.get(cid(2)).unwrap();
    assert!((e.length - 0.8).abs() < 3.0 * 0.8 * 1e-4, "length {}", e.length);
}

/// Every unit of in-face well length is claimed by exactly one cell.
fn assert_single_claim(binding: &CellBinding, well: &WellTrajectory, cells: &[CellId]) {
    assert_eq!(binding.cells().collect::<Vec<_>>(), cells);
    let step = well.length() * LocateConfig::default().step_fraction;
    let err = (binding.total_length() - well.length()).abs();
    assert!(err <= 3.0 * cells.len() as f64 * step, "total {} of {}", binding.total_length(), well.length());
}

#[test]
fn off_center_well_in_a_face_binds_one_cell() {
    let mesh = unit_grid(2, 1, 1);
    let well = polyline(&[[1.0, 0.3, 0.1], [1.0, 0.3, 0.9]], 0.05);
    let binding = bind(&mesh, &well);
    assert_single_claim(&binding, &well, &[cid(2)]);
}

#[test]
fn oblique_well_in_a_face_binds_one_cell() {
    let mesh = unit_grid(2, 1, 1);
    let well = polyline(&[[1.0, 0.1, 0.1], [1.0, 0.9, 0.3]], 0.05);
    let binding = bind(&mesh, &well);
    assert_single_claim(&binding, &well, &[cid(2)]);
    let t = well.segments().next().unwrap().tangent;
    assert_eq!(binding.get(cid(2)).unwrap().direction, t);
}

#[test]
fn well_on_a_shared_edge_binds_one_cell() {
    let mesh = unit_grid(2, 2, 1);
    let well = polyline(&[[1.0, 1.0, 0.1], [1.0, 1.0, 0.9]], 0.05);
    let binding = bind(&mesh, &well);
    let corner = mesh.cell_id_at([1.5, 1.5, 0.5]).unwrap();
    assert_single_claim(&binding, &well, &[corner]);
}

#[test]
fn well_in_a_hanging_face_goes_to_the_fine_side() {
    let mut mesh = unit_grid(2, 1, 1);
    mesh.refine(&[cid(2)]).unwrap();
    let well = polyline(&[[1.0, 0.3, 0.1], [1.0, 0.3, 0.9]], 0.01);
    let binding = bind(&mesh, &well);
    let coarse = mesh.cell_id_at([0.5, 0.5, 0.5]).unwrap();
    let lower = mesh.cell_id_at([1.25, 0.25, 0.25]).unwrap();
    let upper = mesh.cell_id_at([1.25, 0.25, 0.75]).unwrap();
    assert!(!binding.contains(coarse));
    assert_single_claim(&binding, &well, &[lower, upper]);
    let step = well.length() * LocateConfig::default().step_fraction;
    assert!((binding.get(lower).unwrap().length - 0.4).abs() < 3.0 * step);
    assert!((binding.get(upper).unwrap().length - 0.4).abs() < 3.0 * step);
}

#[test]
fn crossing_lengths_add_up() {
    let mesh = unit_grid(4, 1, 1);
    let well = polyline(&[[0.1, 0.4, 0.5], [3.9, 0.6, 0.5]], 0.05);
    let binding = bind(&mesh, &well);
    assert_eq!(binding.len(), 4);
    let step = well.length() * LocateConfig::default().step_fraction;
    let err = (binding.total_length() - well.length()).abs();
    assert!(err <= 2.0 * 4.0 * step, "error {err}");
    let t = well.segments().next().unwrap().tangent;
    assert!(binding.iter().all(|e| e.direction == t));
}

#[test]
fn segments_in_one_cell_merge() {
    let mesh = unit_grid(1, 1, 1);
    let well = polyline(&[[0.2, 0.5, 0.5], [0.5, 0.5, 0.8], [0.8, 0.5, 0.5]], 0.05);
    let binding = bind(&mesh, &well);
    assert_eq!(binding.len(), 1);
    let e = binding.get(cid(1)).unwrap();
    assert!((e.length - well.length()).abs() < 1e-3, "length {}", e.length);
    // mean of the two tangents, not re-normalized
    assert!((e.direction[0] - std::f64::consts::FRAC_1_SQRT_2).abs() < 1e-12);
    assert!(e.direction[2].abs() < 1e-12);
}

#[test]
fn well_crosses_a_hanging_face() {
    let mut mesh = unit_grid(2, 1, 1);
    mesh.refine(&[cid(2)]).unwrap();
    assert_eq!(mesh.len(), 9);
    let well = polyline(&[[0.1, 0.25, 0.25], [1.9, 0.25, 0.25]], 0.01);
    let binding = bind(&mesh, &well);
    let coarse = mesh.cell_id_at([0.5, 0.25, 0.25]).unwrap();
    let near = mesh.cell_id_at([1.25, 0.25, 0.25]).unwrap();
    let far = mesh.cell_id_at([1.75, 0.25, 0.25]).unwrap();
    assert_eq!(
        binding.cells().collect::<Vec<_>>(),
        vec![coarse, near, far]
    );
    let tol = 3.0 * 1.8e-4;
    assert!((binding.get(coarse).unwrap().length - 0.9).abs() < tol);
    assert!((binding.get(near).unwrap().length - 0.5).abs() < tol);
    assert!((binding.get(far).unwrap().length - 0.4).abs() < tol);
}

#[test]
fn face_aligned_well_between_refined_cells() {
    let mut mesh = unit_grid(2, 1, 1);
    mesh.refine(&[cid(2)]).unwrap();
    let well = polyline(&[[1.5, 0.25, 0.05], [1.5, 0.25, 0.95]], 0.01);
    let binding = bind(&mesh, &well);
    let lower = mesh.cell_id_at([1.75, 0.25, 0.25]).unwrap();
    let upper = mesh.cell_id_at([1.75, 0.25, 0.75]).unwrap();
    assert_eq!(binding.cells().collect::<Vec<_>>(), vec![lower, upper]);
    assert!((binding.total_length() - 0.9).abs() < 6.0 * 0.9e-4);
}

#[test]
fn ghost_cells_are_left_to_their_owner() {
    let mesh = unit_grid(4, 1, 1);
    let well = polyline(&[[0.1, 0.5, 0.5], [3.9, 0.5, 0.5]], 0.05);
    let serial = bind(&mesh, &well);

    let mut union = Vec::new();
    for rank in 0..2 {
        let owners = CellOwnership::from_owner_fn(mesh.cells(), rank, |c| {
            usize::from(mesh.center(c).unwrap()[0] > 2.0)
        });
        let local = LocalMesh::new(&mesh, &owners);
        let part = bind(&local, &well);
        assert_eq!(part.len(), 2);
        for e in part.iter() {
            assert_eq!(Some(e), serial.get(e.cell));
            union.push(e.cell);
        }
    }
    assert_permutation(&union, &serial.cells().collect::<Vec<_>>());
}

fn refined_mesh() -> BoxForest {
    let mut mesh = BoxForest::uniform([0.0; 3], [1.0; 3], [3, 3, 2]).unwrap();
    let target = mesh.cell_id_at([1.5, 1.5, 0.5]).unwrap();
    mesh.refine(&[target]).unwrap();
    mesh
}

fn wells() -> Vec<WellTrajectory> {
    vec![
        polyline(&[[0.2, 0.3, 0.4], [2.7, 2.1, 1.6]], 0.01),
        polyline(&[[1.0, 0.5, 0.1], [1.0, 0.5, 1.9]], 0.01),
        polyline(&[[1.5, 1.25, 0.1], [1.5, 1.25, 0.9], [2.5, 2.5, 1.5]], 0.01),
        WellTrajectory::point([1.5, 1.5, 1.0], 0.01, 0.0).unwrap(),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn binding_ignores_visitation_order(
        order in Just(refined_mesh().cells().collect::<Vec<_>>()).prop_shuffle()
    ) {
        let mesh = refined_mesh();
        let shuffled = Shuffled { inner: &mesh, order };
        for well in wells() {
            prop_assert_eq!(bind(&shuffled, &well), bind(&mesh, &well));
        }
    }
}
