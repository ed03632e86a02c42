use polykern::math::Pos3;
use polykern::topo::validate;
use polykern::{InputMesh, KernelCutter, KernelOptions};

fn diagnose(name: &str, cutter: &KernelCutter) {
    let mesh = cutter.mesh();
    let stats = cutter.stats();

    println!("=== {} ===", name);
    println!(
        "  Input faces: {}, cutting planes: {} ({} concave-region)",
        stats.input_faces, stats.total_planes, stats.concave_planes
    );
    if !cutter.has_kernel() {
        println!(
            "  Kernel: EMPTY{}",
            if stats.lp_early_out {
                " (decided by the LP oracle)"
            } else {
                ""
            }
        );
        println!();
        return;
    }

    println!(
        "  Kernel: {} vertices, {} edges, {} faces",
        mesh.vertex_count(),
        mesh.edge_count(),
        mesh.face_count()
    );
    println!(
        "  Contributions: {} convex-region, {} concave-region",
        stats.convex_contribution, stats.concave_contribution
    );
    for v in mesh.vertex_ids() {
        let p = cutter.positions_f64()[v.index()];
        println!("    vertex ({:.1}, {:.1}, {:.1})", p.x, p.y, p.z);
    }

    let report = validate::validate(mesh);
    println!(
        "  WATERTIGHT: {}",
        if validate::is_closed(mesh) && report.valid {
            "YES"
        } else {
            "NO"
        }
    );
    for error in &report.errors {
        println!("    {error}");
    }
    println!();
}

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
    faces.push((0..n).rev().collect::<Vec<u32>>());
    faces.push((n..2 * n).collect::<Vec<u32>>());
    for i in 0..n {
        let j = (i + 1) % n;
        faces.push(vec![i, j, j + n, i + n]);
    }
    InputMesh::from_faces(positions, &faces)
}

fn main() {
    let mut cutter = KernelCutter::new();

    // Concave L: the kernel is the block shared by both arms.
    let l_prism = prism(
        &[(0, 0), (200, 0), (200, 100), (100, 100), (100, 200), (0, 200)],
        100,
    );
    cutter
        .compute(&l_prism, KernelOptions::default())
        .expect("valid input");
    diagnose("L-prism", &cutter);

    // U-shape: the two inner walls contradict each other.
    let u_prism = prism(
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
    );
    cutter
        .compute(&u_prism, KernelOptions::default())
        .expect("valid input");
    diagnose("U-prism", &cutter);
}
