use polykern::geometry::classify_point;
use polykern::math::fixed::wide_mul_192_64;
use polykern::math::Pos3;
use polykern::topo::validate;
use polykern::{is_feasible, InputMesh, KernelCutter, KernelError, KernelOptions};

// --- Fixtures ---

fn cube(h: i32) -> InputMesh {
    let positions = vec![
        Pos3::new(-h, -h, -h),
        Pos3::new(h, -h, -h),
        Pos3::new(-h, h, -h),
        Pos3::new(h, h, -h),
        Pos3::new(-h, -h, h),
        Pos3::new(h, -h, h),
        Pos3::new(-h, h, h),
        Pos3::new(h, h, h),
    ];
    let faces = vec![
        vec![0, 2, 3, 1],
        vec![4, 5, 7, 6],
        vec![0, 1, 5, 4],
        vec![2, 6, 7, 3],
        vec![0, 4, 6, 2],
        vec![1, 3, 7, 5],
    ];
    InputMesh::from_faces(positions, &faces)
}

fn tetrahedron() -> InputMesh {
    InputMesh::from_faces(
        vec![
            Pos3::new(0, 0, 0),
            Pos3::new(1000, 0, 0),
            Pos3::new(0, 1000, 0),
            Pos3::new(0, 0, 1000),
        ],
        &[
            vec![0, 2, 1],
            vec![0, 1, 3],
            vec![0, 3, 2],
            vec![1, 2, 3],
        ],
    )
}

/// Extrude a counterclockwise polygon along z into a closed prism.
fn prism(polygon: &[(i32, i32)], height: i32) -> InputMesh {
    let n = polygon.len() as u32;
    let mut positions = Vec::with_capacity(2 * polygon.len());
    for &(x, y) in polygon {
        positions.push(Pos3::new(x, y, 0));
    }
    for &(x, y) in polygon {
        positions.push(Pos3::new(x, y, height));
    }

    let mut faces = Vec::new();
    // Bottom cap wound clockwise seen from above (outward -z).
    faces.push((0..n).rev().collect::<Vec<u32>>());
    // Top cap counterclockwise (outward +z).
    faces.push((n..2 * n).collect::<Vec<u32>>());
    for i in 0..n {
        let j = (i + 1) % n;
        faces.push(vec![i, j, j + n, i + n]);
    }
    InputMesh::from_faces(positions, &faces)
}

/// Concave L: two boxes sharing one face. Its kernel is the inner
/// 100^3 block common to both arms.
fn l_prism() -> InputMesh {
    prism(
        &[(0, 0), (200, 0), (200, 100), (100, 100), (100, 200), (0, 200)],
        100,
    )
}

/// Plus-shaped prism; the kernel is the central block.
fn plus_prism() -> InputMesh {
    prism(
        &[
            (100, 0),
            (200, 0),
            (200, 100),
            (300, 100),
            (300, 200),
            (200, 200),
            (200, 300),
            (100, 300),
            (100, 200),
            (0, 200),
            (0, 100),
            (100, 100),
        ],
        100,
    )
}

/// U-shaped prism: the two inner walls demand x <= 100 and x >= 200 at
/// once, so the kernel is empty.
fn u_prism() -> InputMesh {
    prism(
        &[
            (0, 0),
            (300, 0),
            (300, 300),
            (200, 300),
            (200, 100),
            (100, 100),
            (100, 300),
            (0, 300),
        ],
        100,
    )
}

// --- Helpers ---

fn compute(input: &InputMesh, options: KernelOptions) -> KernelCutter {
    let mut cutter = KernelCutter::new();
    cutter.compute(input, options).expect("valid input");
    cutter
}

/// Exact test: vertex v of the result sits at the integer corner `p`.
fn vertex_at(cutter: &KernelCutter, v: polykern::topo::VertexId, p: Pos3) -> bool {
    let hom = &cutter.positions()[v.index()];
    hom.is_valid()
        && hom.x == wide_mul_192_64(hom.w, p.x as i64)
        && hom.y == wide_mul_192_64(hom.w, p.y as i64)
        && hom.z == wide_mul_192_64(hom.w, p.z as i64)
}

fn assert_kernel_vertices(cutter: &KernelCutter, expected: &[Pos3]) {
    let mesh = cutter.mesh();
    assert_eq!(
        mesh.vertex_count(),
        expected.len(),
        "kernel vertex count mismatch"
    );
    for &corner in expected {
        assert!(
            mesh.vertex_ids().any(|v| vertex_at(cutter, v, corner)),
            "expected kernel vertex at {corner:?}"
        );
    }
}

/// Every vertex of the result lies on or inside every face plane.
fn assert_containment(cutter: &KernelCutter) {
    let mesh = cutter.mesh();
    for f in mesh.face_ids() {
        let plane = &cutter.supporting_planes()[f.index()];
        assert!(plane.is_valid());
        for v in mesh.vertex_ids() {
            let c = classify_point(&cutter.positions()[v.index()], plane);
            assert!(c <= 0, "vertex {v:?} outside face {f:?}");
        }
    }
}

fn assert_closed_and_valid(cutter: &KernelCutter) {
    assert!(validate::is_closed(cutter.mesh()));
    let report = validate::validate(cutter.mesh());
    assert!(report.valid, "result mesh invalid: {:?}", report.errors);
}

fn box_corners(lo: Pos3, hi: Pos3) -> Vec<Pos3> {
    let mut out = Vec::with_capacity(8);
    for &z in &[lo.z, hi.z] {
        for &y in &[lo.y, hi.y] {
            for &x in &[lo.x, hi.x] {
                out.push(Pos3::new(x, y, z));
            }
        }
    }
    out
}

/// Rebuild an input mesh from a cutter result (positions must be
/// integral, which holds for the axis-aligned fixtures here).
fn result_as_input(cutter: &KernelCutter) -> InputMesh {
    let mesh = cutter.mesh();
    let mut dense = vec![u32::MAX; mesh.vertex_slots()];
    let mut positions = Vec::new();
    for v in mesh.vertex_ids() {
        dense[v.index()] = positions.len() as u32;
        let p = cutter.positions()[v.index()].to_dpos();
        positions.push(Pos3::new(
            p.x.round() as i32,
            p.y.round() as i32,
            p.z.round() as i32,
        ));
    }
    let faces: Vec<Vec<u32>> = mesh
        .face_ids()
        .map(|f| mesh.face_vertices(f).map(|v| dense[v.index()]).collect())
        .collect();
    InputMesh::from_faces(positions, &faces)
}

// --- Cases ---

#[test]
fn cube_kernel_is_the_cube() {
    let input = cube(1000);
    let cutter = compute(&input, KernelOptions::default());

    assert!(cutter.has_kernel());
    assert!(cutter.input_is_convex());
    assert!(cutter.stats().is_convex);
    assert_eq!(cutter.mesh().face_count(), 6);
    assert_kernel_vertices(
        &cutter,
        &box_corners(Pos3::new(-1000, -1000, -1000), Pos3::new(1000, 1000, 1000)),
    );
    assert_containment(&cutter);
    assert_closed_and_valid(&cutter);

    // The kernel is centered at the origin.
    let mesh = cutter.mesh();
    let center: nalgebra::Vector3<f64> = mesh
        .vertex_ids()
        .map(|v| cutter.positions_f64()[v.index()].coords)
        .sum::<nalgebra::Vector3<f64>>()
        / mesh.vertex_count() as f64;
    assert!(center.norm() < 1e-9);
}

#[test]
fn cube_kernel_triangulated() {
    let input = cube(1000);
    let options = KernelOptions {
        triangulate: true,
        ..KernelOptions::default()
    };
    let cutter = compute(&input, options);
    assert!(cutter.has_kernel());
    assert_eq!(cutter.mesh().face_count(), 12);
    for f in cutter.mesh().face_ids() {
        assert_eq!(cutter.mesh().face_degree(f), 3);
    }
    assert_closed_and_valid(&cutter);
}

#[test]
fn tetrahedron_kernel_is_the_tetrahedron() {
    let input = tetrahedron();
    let cutter = compute(&input, KernelOptions::default());
    assert!(cutter.has_kernel());
    assert!(cutter.input_is_convex());
    assert_eq!(cutter.mesh().face_count(), 4);
    assert_kernel_vertices(
        &cutter,
        &[
            Pos3::new(0, 0, 0),
            Pos3::new(1000, 0, 0),
            Pos3::new(0, 1000, 0),
            Pos3::new(0, 0, 1000),
        ],
    );
}

#[test]
fn l_prism_kernel_is_the_shared_block() {
    let input = l_prism();
    let cutter = compute(&input, KernelOptions::default());

    assert!(cutter.has_kernel());
    assert!(!cutter.input_is_convex());
    assert_eq!(cutter.stats().total_planes, 8);
    assert_eq!(cutter.stats().concave_planes, 2);

    assert_eq!(cutter.mesh().face_count(), 6);
    assert_kernel_vertices(
        &cutter,
        &box_corners(Pos3::new(0, 0, 0), Pos3::new(100, 100, 100)),
    );
    assert_containment(&cutter);
    assert_closed_and_valid(&cutter);

    // Two faces of the kernel stem from the concave walls; the rest are
    // leftovers of the bounding box.
    assert_eq!(cutter.stats().kernel_faces, 6);
    assert_eq!(cutter.stats().concave_contribution, 2);
    assert_eq!(cutter.stats().convex_contribution, 0);
}

#[test]
fn l_prism_without_culling_or_oracle() {
    let input = l_prism();
    let options = KernelOptions {
        use_bb_culling: false,
        use_seidel: false,
        parallel_exact_lp: false,
        ..KernelOptions::default()
    };
    let cutter = compute(&input, options);
    assert!(cutter.has_kernel());
    assert_kernel_vertices(
        &cutter,
        &box_corners(Pos3::new(0, 0, 0), Pos3::new(100, 100, 100)),
    );
}

#[test]
fn l_prism_all_kdop_variants_agree() {
    let input = l_prism();
    for kdop_k in [
        polykern::KdopK::K3,
        polykern::KdopK::K8,
        polykern::KdopK::K9,
        polykern::KdopK::K12,
    ] {
        let options = KernelOptions {
            kdop_k,
            ..KernelOptions::default()
        };
        let cutter = compute(&input, options);
        assert!(cutter.has_kernel(), "{kdop_k:?} lost the kernel");
        assert_kernel_vertices(
            &cutter,
            &box_corners(Pos3::new(0, 0, 0), Pos3::new(100, 100, 100)),
        );
    }
}

#[test]
fn plus_prism_kernel_is_the_central_block() {
    let input = plus_prism();
    let cutter = compute(&input, KernelOptions::default());

    assert!(cutter.has_kernel());
    assert!(!cutter.input_is_convex());
    assert_kernel_vertices(
        &cutter,
        &box_corners(Pos3::new(100, 100, 0), Pos3::new(200, 200, 100)),
    );
    assert_containment(&cutter);
    assert_closed_and_valid(&cutter);
}

#[test]
fn u_prism_kernel_is_empty() {
    let input = u_prism();
    let cutter = compute(&input, KernelOptions::default());
    assert!(!cutter.has_kernel());
    assert_eq!(cutter.mesh().vertex_count(), 0);

    // The LP oracle agrees that the plane set is infeasible.
    assert!(!is_feasible(&input));
    assert!(is_feasible(&l_prism()));
}

#[test]
fn u_prism_empty_without_oracle() {
    let options = KernelOptions {
        use_seidel: false,
        parallel_exact_lp: false,
        ..KernelOptions::default()
    };
    let cutter = compute(&u_prism(), options);
    assert!(!cutter.has_kernel());
    assert!(!cutter.stats().lp_early_out);
}

#[test]
fn kernel_computation_is_idempotent() {
    let cutter = compute(&l_prism(), KernelOptions::default());
    let again = result_as_input(&cutter);
    let second = compute(&again, KernelOptions::default());

    // The kernel of a convex kernel is itself.
    assert!(second.has_kernel());
    assert!(second.input_is_convex());
    assert_kernel_vertices(
        &second,
        &box_corners(Pos3::new(0, 0, 0), Pos3::new(100, 100, 100)),
    );
}

#[test]
fn plane_dedup_variants_agree() {
    // L-prism with both caps split into coplanar pieces, so planar
    // edges exist and deduplication has work to do.
    let polygon = [
        (0, 0),
        (200, 0),
        (200, 100),
        (100, 100),
        (100, 200),
        (0, 200),
        (0, 100),
    ];
    let input = prism(&polygon, 100);
    // Split both caps along y = 100.
    let mut faces: Vec<Vec<u32>> = Vec::new();
    faces.push(vec![3, 2, 1, 0, 6]); // bottom, low part
    faces.push(vec![6, 5, 4, 3]); // bottom, high part
    faces.push(vec![7, 8, 9, 10, 13]); // top, low part
    faces.push(vec![13, 10, 11, 12]); // top, high part
    for i in 0..7u32 {
        let j = (i + 1) % 7;
        faces.push(vec![i, j, j + 7, i + 7]);
    }
    let split = InputMesh::from_faces(input.positions.clone(), &faces);
    split.validate().expect("split-cap L-prism must be valid");

    let union_find = compute(&split, KernelOptions::default());
    let plane_set = compute(
        &split,
        KernelOptions {
            use_plane_set: true,
            ..KernelOptions::default()
        },
    );

    assert_eq!(union_find.stats().total_planes, 8);
    assert_eq!(plane_set.stats().total_planes, 8);
    for cutter in [&union_find, &plane_set] {
        assert!(cutter.has_kernel());
        assert_kernel_vertices(
            cutter,
            &box_corners(Pos3::new(0, 0, 0), Pos3::new(100, 100, 100)),
        );
    }
}

#[test]
fn degenerate_face_is_ignored() {
    // A cube with one edge split and the sliver between the old and new
    // edges kept as a zero-area triangle: its plane is invalid and its
    // edges classify as degenerate, but the kernel is still the cube.
    let h = 500;
    let mut positions = cube(h).positions.clone();
    positions.push(Pos3::new(0, -h, -h)); // midpoint of the 0-1 edge
    let faces = vec![
        vec![0, 2, 3, 1],          // z = -h
        vec![4, 5, 7, 6],          // z = h
        vec![8, 1, 5, 4, 0],       // y = -h with the split edge
        vec![2, 6, 7, 3],          // y = h
        vec![0, 4, 6, 2],          // x = -h
        vec![1, 3, 7, 5],          // x = h
        vec![1, 8, 0],             // degenerate sliver
    ];
    let input = InputMesh::from_faces(positions, &faces);
    input.validate().expect("degenerate-face cube must be valid");

    let cutter = compute(&input, KernelOptions::default());
    assert!(!cutter.input_is_convex(), "degenerate edges are not convex");
    assert!(cutter.has_kernel());
    assert_kernel_vertices(
        &cutter,
        &box_corners(Pos3::new(-h, -h, -h), Pos3::new(h, h, h)),
    );
    assert_containment(&cutter);
}

#[test]
fn invalid_inputs_are_rejected() {
    let mut cutter = KernelCutter::new();

    let empty = InputMesh::default();
    assert!(matches!(
        cutter.compute(&empty, KernelOptions::default()),
        Err(KernelError::EmptyInput)
    ));

    let open = InputMesh::from_faces(
        vec![
            Pos3::new(0, 0, 0),
            Pos3::new(100, 0, 0),
            Pos3::new(0, 100, 0),
        ],
        &[vec![0, 1, 2]],
    );
    assert!(matches!(
        cutter.compute(&open, KernelOptions::default()),
        Err(KernelError::NotClosed)
    ));

    let mut oversized = cube(1000);
    oversized.positions[0].x = i32::MAX;
    assert!(matches!(
        cutter.compute(&oversized, KernelOptions::default()),
        Err(KernelError::CoordinateOverflow { .. })
    ));
}
