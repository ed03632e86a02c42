use polykern::math::{Aabb, Pos3};
use polykern::topo::{validate, HalfEdgeMesh, VertexId};

fn cube() -> HalfEdgeMesh {
    let (mesh, _) = HalfEdgeMesh::add_box(&Aabb::new(
        Pos3::new(0, 0, 0),
        Pos3::new(10, 10, 10),
    ));
    mesh
}

#[test]
fn box_mesh_is_closed_and_valid() {
    let mesh = cube();
    assert_eq!(mesh.vertex_count(), 8);
    assert_eq!(mesh.edge_count(), 12);
    assert_eq!(mesh.face_count(), 6);
    assert!(validate::is_closed(&mesh));

    let report = validate::validate(&mesh);
    assert!(report.valid, "cube validation failed: {:?}", report.errors);

    for f in mesh.face_ids() {
        assert_eq!(mesh.face_degree(f), 4);
    }
    for v in mesh.vertex_ids() {
        assert_eq!(mesh.outgoing_halfedges(v).count(), 3);
    }
}

#[test]
fn open_mesh_is_reported() {
    // A single quad: every edge is a boundary edge.
    let quad = HalfEdgeMesh::from_faces(4, &[vec![0, 1, 2, 3]]);
    assert!(!validate::is_closed(&quad));
    assert!(!validate::validate(&quad).valid);
}

#[test]
fn split_halfedge_preserves_cycles() {
    let mut mesh = cube();
    let h = mesh.face_halfedges(mesh.face_ids().next().unwrap()).next().unwrap();
    let (a, b) = (mesh.from(h), mesh.to(h));

    let (m, new_edge) = mesh.split_halfedge(h);
    assert_eq!(mesh.vertex_count(), 9);
    assert_eq!(mesh.edge_count(), 13);
    assert_eq!(mesh.face_count(), 6);

    // h now ends at the new vertex; the new edge carries m -> b.
    assert_eq!(mesh.to(h), m);
    assert_eq!(mesh.from(h), a);
    assert_eq!(mesh.vertex_a(new_edge), m);
    assert_eq!(mesh.vertex_b(new_edge), b);

    // The two incident faces grew to pentagons.
    assert_eq!(mesh.face_degree(mesh.face_of(h)), 5);
    assert_eq!(mesh.face_degree(mesh.face_of(h.opposite())), 5);

    let report = validate::validate(&mesh);
    assert!(report.valid, "split broke the mesh: {:?}", report.errors);
}

#[test]
fn cut_face_splits_one_face_in_two() {
    let mut mesh = cube();
    let f = mesh.face_ids().next().unwrap();
    let verts: Vec<VertexId> = mesh.face_vertices(f).collect();
    // Cut along a diagonal of the quad.
    let (d, f_new) = mesh
        .cut_face(f, verts[0], verts[2])
        .expect("diagonal cut must succeed");

    assert_eq!(mesh.face_count(), 7);
    assert_eq!(mesh.edge_count(), 13);
    assert_eq!(mesh.face_of(d), f);
    assert_eq!(mesh.face_of(d.opposite()), f_new);
    assert_eq!(mesh.face_degree(f), 3);
    assert_eq!(mesh.face_degree(f_new), 3);

    let report = validate::validate(&mesh);
    assert!(report.valid, "cut broke the mesh: {:?}", report.errors);
}

#[test]
fn cut_face_rejects_bad_input() {
    let mut mesh = cube();
    let f = mesh.face_ids().next().unwrap();
    let verts: Vec<VertexId> = mesh.face_vertices(f).collect();
    let far = mesh
        .vertex_ids()
        .find(|v| !verts.contains(v))
        .expect("cube has vertices off this face");

    assert!(mesh.cut_face(f, verts[0], verts[0]).is_none());
    assert!(mesh.cut_face(f, verts[0], far).is_none());
    assert!(mesh
        .cut_face(polykern::topo::FaceId::INVALID, verts[0], verts[2])
        .is_none());
}

#[test]
fn remove_vertex_and_fill_hole_restore_closedness() {
    let mut mesh = cube();
    let v = mesh.vertex_ids().next().unwrap();
    mesh.remove_vertex(v);

    assert_eq!(mesh.vertex_count(), 7);
    assert_eq!(mesh.edge_count(), 9);
    assert_eq!(mesh.face_count(), 3);
    assert!(!validate::is_closed(&mesh));

    // Surviving neighbors still have live circulator entries.
    for u in mesh.vertex_ids() {
        let entry = mesh.vertex(u).halfedge;
        assert!(entry.is_valid() && mesh.halfedge_alive(entry));
    }

    let boundary = mesh
        .edge_ids()
        .flat_map(|e| [e.halfedge_a(), e.halfedge_b()])
        .find(|&h| mesh.is_boundary(h))
        .expect("removal leaves a hole");
    let cap = mesh.fill_hole(boundary).expect("hole must be fillable");

    // The corner of a cube exposes a hexagonal ring.
    assert_eq!(mesh.face_degree(cap), 6);
    assert!(validate::is_closed(&mesh));
    let report = validate::validate(&mesh);
    assert!(report.valid, "fill broke the mesh: {:?}", report.errors);
}

#[test]
fn fan_triangulation_covers_faces() {
    let mut mesh = cube();
    let faces: Vec<_> = mesh.face_ids().collect();
    for f in faces {
        mesh.triangulate_face(f);
    }
    assert_eq!(mesh.face_count(), 12);
    assert_eq!(mesh.edge_count(), 18);
    for f in mesh.face_ids() {
        assert_eq!(mesh.face_degree(f), 3);
    }
    let report = validate::validate(&mesh);
    assert!(report.valid, "triangulation broke the mesh: {:?}", report.errors);
}

#[test]
fn circulators_cover_one_rings() {
    let mesh = cube();
    for v in mesh.vertex_ids() {
        let ring: Vec<VertexId> = mesh.adjacent_vertices(v).collect();
        assert_eq!(ring.len(), 3);
        for n in &ring {
            assert!(mesh.are_adjacent(v, *n));
            assert!(mesh.are_adjacent(*n, v));
            let h = mesh.find_halfedge(v, *n).unwrap();
            assert_eq!(mesh.from(h), v);
            assert_eq!(mesh.to(h), *n);
        }
    }
}
