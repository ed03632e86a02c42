//! Destructive half-edge operations.
//!
//! The cutter mutates the running mesh through exactly four operations:
//! splitting a half-edge, cutting a face in two, removing a vertex with
//! its star, and capping the hole left behind. `remove_vertex` leaves the
//! hole ring's `next`/`prev` links stale; `fill_hole` rebuilds them, so a
//! removal phase must always be followed by a fill (or the hole stays
//! open, which only the closedness check observes).

use std::collections::HashMap;

use super::store::HalfEdgeMesh;
use super::types::*;

impl HalfEdgeMesh {
    /// Split the edge of `h` at a new vertex `m`.
    ///
    /// `h: a -> b` becomes `h: a -> m` plus a new edge `m <-> b`; both
    /// incident face cycles grow by one half-edge. Returns the new vertex
    /// and the new edge (the half of the split that carries `m -> b`).
    pub fn split_halfedge(&mut self, h: HalfEdgeId) -> (VertexId, EdgeId) {
        debug_assert!(self.halfedge_alive(h));
        let o = h.opposite();
        let b = self.to(h);
        let hn = self.next(h);
        let op = self.prev(o);

        let m = self.alloc_vertex();
        let n = self.alloc_edge(b, m); // n: m -> b, n_opp: b -> m
        let n_opp = n.opposite();

        let face_h = self.face_of(h);
        let face_o = self.face_of(o);
        self.halfedges[h.index()].vertex = m;

        // Cycle of face(h): h -> n -> hn.
        self.halfedges[n.index()].face = face_h;
        self.halfedges[h.index()].next = n;
        self.halfedges[n.index()].prev = h;
        self.halfedges[n.index()].next = hn;
        self.halfedges[hn.index()].prev = n;

        // Cycle of face(o): op -> n_opp -> o.
        self.halfedges[n_opp.index()].face = face_o;
        self.halfedges[op.index()].next = n_opp;
        self.halfedges[n_opp.index()].prev = op;
        self.halfedges[n_opp.index()].next = o;
        self.halfedges[o.index()].prev = n_opp;

        self.vertices[m.index()].halfedge = n;
        if self.vertices[b.index()].halfedge == o {
            self.vertices[b.index()].halfedge = n_opp;
        }

        (m, n.edge())
    }

    /// Cut `face` along the diagonal `v_from -> v_to`.
    ///
    /// The original face keeps the side entered through `v_from`; the
    /// other side becomes a new face. Returns the diagonal half-edge
    /// (inside the original face) and the new face, or `None` if the
    /// face handle is invalid or either vertex is not on the face. A
    /// degenerate two-dimensional slice must no-op instead of corrupting
    /// the cycle.
    pub fn cut_face(
        &mut self,
        face: FaceId,
        v_from: VertexId,
        v_to: VertexId,
    ) -> Option<(HalfEdgeId, FaceId)> {
        if !face.is_valid() || !self.faces[face.index()].alive || v_from == v_to {
            return None;
        }
        let h_from = self.face_halfedges(face).find(|&h| self.to(h) == v_from)?;
        let h_to = self.face_halfedges(face).find(|&h| self.to(h) == v_to)?;

        let a1 = self.next(h_from); // starts at v_from
        let b1 = self.next(h_to); // starts at v_to

        let d = self.alloc_edge(v_to, v_from); // d: v_from -> v_to
        let d_opp = d.opposite();
        let f_new = self.alloc_face();

        // Original face keeps ... h_from -> d -> b1 ...
        self.halfedges[d.index()].face = face;
        self.halfedges[h_from.index()].next = d;
        self.halfedges[d.index()].prev = h_from;
        self.halfedges[d.index()].next = b1;
        self.halfedges[b1.index()].prev = d;
        self.faces[face.index()].halfedge = d;

        // New face takes ... h_to -> d_opp -> a1 ...
        self.halfedges[h_to.index()].next = d_opp;
        self.halfedges[d_opp.index()].prev = h_to;
        self.halfedges[d_opp.index()].next = a1;
        self.halfedges[a1.index()].prev = d_opp;
        self.faces[f_new.index()].halfedge = d_opp;

        let mut cur = d_opp;
        loop {
            self.halfedges[cur.index()].face = f_new;
            cur = self.next(cur);
            if cur == d_opp {
                break;
            }
        }

        Some((d, f_new))
    }

    /// Tombstone `v` together with every incident edge and face.
    ///
    /// Surviving neighbors get their circulator entry repaired to a live
    /// half-edge. The boundary ring left around the removed region keeps
    /// its stale cycle links until [`HalfEdgeMesh::fill_hole`] runs.
    pub fn remove_vertex(&mut self, v: VertexId) {
        let spokes: Vec<HalfEdgeId> = self
            .outgoing_halfedges(v)
            .filter(|&h| self.halfedge_alive(h))
            .collect();

        for &h in &spokes {
            let f = self.face_of(h);
            if f.is_valid() && self.faces[f.index()].alive {
                self.kill_face(f);
            }
            let e = h.edge();
            if self.edges_alive[e.index()] {
                self.edges_alive[e.index()] = false;
                self.live_edges -= 1;
            }
        }

        if self.vertices[v.index()].alive {
            self.vertices[v.index()].alive = false;
            self.live_vertices -= 1;
        }

        // Neighbors whose entry half-edge died rotate to a live one.
        for &h in &spokes {
            let u = self.to(h);
            if !self.vertices[u.index()].alive {
                continue;
            }
            let entry = self.vertices[u.index()].halfedge;
            if entry.is_valid() && self.halfedge_alive(entry) {
                continue;
            }
            let live = self
                .outgoing_halfedges(u)
                .find(|&g| self.halfedge_alive(g));
            self.vertices[u.index()].halfedge = live.unwrap_or(HalfEdgeId::INVALID);
        }
    }

    fn kill_face(&mut self, f: FaceId) {
        self.faces[f.index()].alive = false;
        self.live_faces -= 1;
        let hes: Vec<HalfEdgeId> = self.face_halfedges(f).collect();
        for h in hes {
            self.halfedges[h.index()].face = FaceId::INVALID;
        }
    }

    /// Cap the open hole ring containing the boundary half-edge `start`.
    ///
    /// Ring membership is recovered from the source vertices of the live
    /// boundary half-edges (the hole is a simple cycle: one boundary
    /// half-edge leaves each ring vertex). Returns the new face, or
    /// `None` when fewer than three boundary half-edges exist.
    pub fn fill_hole(&mut self, start: HalfEdgeId) -> Option<FaceId> {
        if !start.is_valid() || !self.halfedge_alive(start) || !self.is_boundary(start) {
            return None;
        }

        let mut by_source: HashMap<VertexId, HalfEdgeId> = HashMap::new();
        let mut ring_len = 0usize;
        for i in 0..self.halfedges.len() as u32 {
            let h = HalfEdgeId(i);
            if self.halfedge_alive(h) && self.is_boundary(h) {
                let prev = by_source.insert(self.from(h), h);
                debug_assert!(prev.is_none(), "hole ring pinches at a vertex");
                ring_len += 1;
            }
        }
        if ring_len < 3 {
            return None;
        }

        let f = self.alloc_face();
        let mut cur = start;
        for _ in 0..ring_len {
            self.halfedges[cur.index()].face = f;
            let source = self.from(cur);
            self.vertices[source.index()].halfedge = cur;
            let next = by_source[&self.to(cur)];
            self.halfedges[cur.index()].next = next;
            self.halfedges[next.index()].prev = cur;
            cur = next;
            if cur == start {
                break;
            }
        }
        debug_assert!(cur == start, "hole ring did not close");
        self.faces[f.index()].halfedge = start;
        Some(f)
    }

    /// Fan-triangulate `face` in place; returns the faces split off.
    pub fn triangulate_face(&mut self, face: FaceId) -> Vec<FaceId> {
        let mut out = Vec::new();
        let mut f_cur = face;
        while self.face_degree(f_cur) > 3 {
            let h0 = self.faces[f_cur.index()].halfedge;
            let v0 = self.from(h0);
            let v2 = self.to(self.next(h0));
            let Some((_, f_new)) = self.cut_face(f_cur, v2, v0) else {
                break;
            };
            out.push(f_new);
            f_cur = f_new;
        }
        out
    }
}
