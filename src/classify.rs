//! Input edge classification and cutting-plane ordering.
//!
//! Every input edge is labeled from the two adjacent face planes; the
//! labels decide whether the input is already convex (kernel = input) and
//! which face planes the cutter must process first. Coplanar face regions
//! contribute one cutting plane each, deduplicated either by union-find
//! over planar edges or by a hashed set of reduced planes.

use std::collections::HashSet;

use rayon::prelude::*;

use crate::geometry::{classify_pos, Plane};
use crate::math::fixed::wide_mul_64;
use crate::topo::FaceId;
use crate::types::InputMesh;

/// Label of an input edge relative to its two adjacent faces.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EdgeState {
    #[default]
    Unclassified,
    Convex,
    Planar,
    Concave,
    Boundary,
    Degenerate,
}

/// Supporting plane of every input face, indexed by face slot.
///
/// Degenerate faces (collinear corners) get an invalid plane. With
/// `reduce` the normals are divided by their gcd so coplanar faces
/// produce identical plane values.
pub fn face_planes(input: &InputMesh, reduce: bool, parallel_threshold: usize) -> Vec<Plane> {
    let n = input.topology.face_slots();
    let compute = |i: usize| -> Plane {
        let f = FaceId(i as u32);
        if !input.topology.face_alive(f) {
            return Plane::default();
        }
        let mut corners = input.topology.face_vertices(f);
        let (Some(v0), Some(v1), Some(v2)) = (corners.next(), corners.next(), corners.next())
        else {
            return Plane::default();
        };
        let p0 = input.positions[v0.index()];
        let p1 = input.positions[v1.index()];
        let p2 = input.positions[v2.index()];
        if reduce {
            Plane::from_points(p0, p1, p2)
        } else {
            Plane::from_points_raw(p0, p1, p2)
        }
    };

    if n > parallel_threshold {
        (0..n).into_par_iter().map(compute).collect()
    } else {
        (0..n).map(compute).collect()
    }
}

/// Classify every input edge, indexed by edge slot.
pub fn edge_states(
    input: &InputMesh,
    planes: &[Plane],
    parallel_threshold: usize,
) -> Vec<EdgeState> {
    let mesh = &input.topology;
    let n = mesh.edge_slots();
    let compute = |i: usize| -> EdgeState {
        let e = crate::topo::EdgeId(i as u32);
        if !mesh.edge_alive(e) {
            return EdgeState::Unclassified;
        }
        let ha = e.halfedge_a();
        let hb = e.halfedge_b();
        if mesh.is_boundary(ha) || mesh.is_boundary(hb) {
            return EdgeState::Boundary;
        }
        let pa = &planes[mesh.face_of(ha).index()];
        let pb = &planes[mesh.face_of(hb).index()];
        if !pa.is_valid() || !pb.is_valid() {
            return EdgeState::Degenerate;
        }

        // Vertex of face B opposite the shared edge.
        let v_opp = mesh.to(mesh.next(hb));
        match classify_pos(input.positions[v_opp.index()], pa) {
            -1 => EdgeState::Convex,
            1 => EdgeState::Concave,
            _ => {
                // Coplanar corner: planar only if the normals agree.
                let dot = wide_mul_64(pa.a, pb.a)
                    + wide_mul_64(pa.b, pb.b)
                    + wide_mul_64(pa.c, pb.c);
                if dot > 0 {
                    EdgeState::Planar
                } else {
                    EdgeState::Concave
                }
            }
        }
    };

    if n > parallel_threshold {
        (0..n).into_par_iter().map(compute).collect()
    } else {
        (0..n).map(compute).collect()
    }
}

/// A mesh is convex iff no edge bends inward.
pub fn is_convex(input: &InputMesh, states: &[EdgeState]) -> bool {
    input.topology.edge_ids().all(|e| {
        matches!(
            states[e.index()],
            EdgeState::Convex | EdgeState::Planar
        )
    })
}

/// The ordered cutting-plane list: one plane per coplanar face region,
/// planes of concave regions first.
#[derive(Clone, Debug, Default)]
pub struct CuttingPlanes {
    pub planes: Vec<Plane>,
    /// Input face generating each plane.
    pub faces: Vec<FaceId>,
    /// The leading `concave_count` planes border non-convex edges.
    pub concave_count: usize,
}

/// True if any edge of `f` borders a concave, boundary or degenerate
/// region.
pub(crate) fn edge_touches_concave_region(
    input: &InputMesh,
    states: &[EdgeState],
    f: FaceId,
) -> bool {
    input.topology.face_halfedges(f).any(|h| {
        matches!(
            states[h.edge().index()],
            EdgeState::Concave | EdgeState::Boundary | EdgeState::Degenerate
        )
    })
}

/// Deduplicate coplanar regions by union-find over planar edges.
pub fn cutting_planes_union_find(
    input: &InputMesh,
    planes: &[Plane],
    states: &[EdgeState],
) -> CuttingPlanes {
    let mesh = &input.topology;
    let mut uf = DisjointSet::new(mesh.face_slots());
    for e in mesh.edge_ids() {
        if states[e.index()] != EdgeState::Planar {
            continue;
        }
        let fa = mesh.face_a(e);
        let fb = mesh.face_b(e);
        if fa.is_valid() && fb.is_valid() {
            uf.union(fa.index(), fb.index());
        }
    }

    let mut out = CuttingPlanes::default();
    let mut visited = vec![false; mesh.face_slots()];

    // Regions bordering a non-convex edge come first.
    for e in mesh.edge_ids() {
        if matches!(states[e.index()], EdgeState::Convex | EdgeState::Planar) {
            continue;
        }
        for f in [mesh.face_a(e), mesh.face_b(e)] {
            if !f.is_valid() {
                continue;
            }
            let rep = uf.find(f.index());
            if visited[rep] {
                continue;
            }
            visited[rep] = true;
            if planes[rep].is_valid() {
                out.planes.push(planes[rep]);
                out.faces.push(FaceId(rep as u32));
            }
        }
    }
    out.concave_count = out.planes.len();

    for f in mesh.face_ids() {
        let rep = uf.find(f.index());
        if visited[rep] {
            continue;
        }
        visited[rep] = true;
        if planes[rep].is_valid() {
            out.planes.push(planes[rep]);
            out.faces.push(FaceId(rep as u32));
        }
    }
    out
}

/// Deduplicate coplanar regions by a hashed set of reduced plane values.
pub fn cutting_planes_plane_set(
    input: &InputMesh,
    planes: &[Plane],
    states: &[EdgeState],
) -> CuttingPlanes {
    let mesh = &input.topology;
    let mut seen: HashSet<Plane> = HashSet::new();
    let mut concave_faces = Vec::new();
    let mut convex_faces = Vec::new();

    for f in mesh.face_ids() {
        let p = planes[f.index()];
        if !p.is_valid() || !seen.insert(p) {
            continue;
        }
        if edge_touches_concave_region(input, states, f) {
            concave_faces.push(f);
        } else {
            convex_faces.push(f);
        }
    }

    let mut out = CuttingPlanes {
        concave_count: concave_faces.len(),
        ..Default::default()
    };
    for f in concave_faces.into_iter().chain(convex_faces) {
        out.planes.push(planes[f.index()]);
        out.faces.push(f);
    }
    out
}

/// Union-find with path halving over dense indices.
struct DisjointSet {
    parent: Vec<u32>,
}

impl DisjointSet {
    fn new(n: usize) -> Self {
        Self {
            parent: (0..n as u32).collect(),
        }
    }

    fn find(&mut self, mut x: usize) -> usize {
        while self.parent[x] as usize != x {
            let grand = self.parent[self.parent[x] as usize];
            self.parent[x] = grand;
            x = grand as usize;
        }
        x
    }

    fn union(&mut self, a: usize, b: usize) {
        let ra = self.find(a);
        let rb = self.find(b);
        if ra != rb {
            self.parent[rb] = ra as u32;
        }
    }
}
