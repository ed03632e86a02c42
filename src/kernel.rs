//! The kernel cutter: successive exact half-space intersection.
//!
//! The running mesh starts as the axis-aligned bounding box of the input
//! and is carved against every cutting plane in concave-first order. Per
//! plane: locate a crossing half-edge by descending along approximate
//! signed distances, march the intersection curve through the mesh while
//! splitting straddling edges exactly, flood-delete the positive side,
//! cap the hole, and shrink the culling volume. A parallel LP oracle may
//! end the run early when the plane set is infeasible.

use tracing::{debug, info, trace};

use crate::classify::{
    self, cutting_planes_plane_set, cutting_planes_union_find, EdgeState,
};
use crate::geometry::{classify_point, line_plane, planes2, Line, Plane, Point4};
use crate::kdop::BoundingVolume;
use crate::math::{DPos3, IVec3, Pos3};
use crate::seidel::{LpState, SeidelOracle, DEFAULT_SEED};
use crate::topo::{self, FaceId, HalfEdgeId, HalfEdgeMesh, VertexId};
use crate::types::{InputMesh, KernelError, KernelOptions, KernelStats};

/// Smallest representable step away from `x`.
fn precision_for(x: f64) -> f64 {
    (x.next_up() - x).max(x - x.next_down())
}

enum PlaneOutcome {
    Continue,
    KernelEmpty,
}

/// Computes the kernel of a star-shaped polyhedron.
///
/// One cutter instance can be reused across computations; all state is
/// reset per [`KernelCutter::compute`] call.
pub struct KernelCutter {
    options: KernelOptions,

    // Input-derived data.
    input_planes: Vec<Plane>,
    edge_states: Vec<EdgeState>,
    cutting_planes: Vec<Plane>,
    plane_faces: Vec<FaceId>,
    concave_count: usize,

    // Per-plane runtime state.
    cutting_plane: Plane,
    cutting_plane_face: FaceId,
    volume: Option<BoundingVolume>,
    c0_ring: Vec<VertexId>,
    c0_flagged: Vec<VertexId>,
    c0_vertex: Option<VertexId>,

    // The running mesh and its attributes, keyed by arena slot.
    mesh: HalfEdgeMesh,
    pos4: Vec<Point4>,
    dpos: Vec<DPos3>,
    edge_lines: Vec<Line>,
    supporting_plane: Vec<Plane>,
    source_face: Vec<FaceId>,
    is_c0: Vec<bool>,
    visited: Vec<bool>,

    oracle: Option<SeidelOracle>,

    has_kernel: bool,
    input_convex: bool,
    stats: KernelStats,
}

impl Default for KernelCutter {
    fn default() -> Self {
        Self::new()
    }
}

impl KernelCutter {
    pub fn new() -> Self {
        Self {
            options: KernelOptions::default(),
            input_planes: Vec::new(),
            edge_states: Vec::new(),
            cutting_planes: Vec::new(),
            plane_faces: Vec::new(),
            concave_count: 0,
            cutting_plane: Plane::default(),
            cutting_plane_face: FaceId::INVALID,
            volume: None,
            c0_ring: Vec::new(),
            c0_flagged: Vec::new(),
            c0_vertex: None,
            mesh: HalfEdgeMesh::new(),
            pos4: Vec::new(),
            dpos: Vec::new(),
            edge_lines: Vec::new(),
            supporting_plane: Vec::new(),
            source_face: Vec::new(),
            is_c0: Vec::new(),
            visited: Vec::new(),
            oracle: None,
            has_kernel: false,
            input_convex: false,
            stats: KernelStats::default(),
        }
    }

    /// Compute the kernel of `input`.
    ///
    /// On success the result is queried through [`KernelCutter::has_kernel`],
    /// [`KernelCutter::mesh`] and the position accessors; an empty kernel
    /// is a normal outcome, not an error.
    pub fn compute(&mut self, input: &InputMesh, options: KernelOptions) -> Result<(), KernelError> {
        self.reset();
        self.options = options;
        input.validate()?;

        self.stats.input_faces = input.topology.face_count();

        let threshold = options.min_faces_for_parallel_setup;
        self.input_planes = classify::face_planes(input, options.use_plane_set, threshold);
        self.edge_states = classify::edge_states(input, &self.input_planes, threshold);

        if classify::is_convex(input, &self.edge_states) {
            info!("input mesh is convex, kernel equals input");
            self.adopt_input(input);
            if self.options.triangulate {
                self.triangulate_result();
                self.stats.kernel_faces = self.mesh.face_count();
            }
            return Ok(());
        }

        let cutting = if options.use_plane_set {
            cutting_planes_plane_set(input, &self.input_planes, &self.edge_states)
        } else {
            cutting_planes_union_find(input, &self.input_planes, &self.edge_states)
        };
        debug_assert!(cutting.planes.len() == cutting.faces.len());
        self.cutting_planes = cutting.planes;
        self.plane_faces = cutting.faces;
        self.concave_count = cutting.concave_count;
        self.stats.total_planes = self.cutting_planes.len();
        self.stats.concave_planes = self.concave_count;
        info!(
            total = self.cutting_planes.len(),
            concave = self.concave_count,
            "cutting planes collected"
        );

        if options.use_seidel && options.parallel_exact_lp {
            self.oracle = Some(SeidelOracle::spawn(self.cutting_planes.clone(), DEFAULT_SEED));
        }

        self.init_running_mesh(input);
        self.cut_all_planes();

        if let Some(oracle) = &self.oracle {
            oracle.stop();
        }

        if !self.has_kernel {
            info!("kernel is empty");
            self.clear_result();
            return Ok(());
        }

        if !topo::is_closed(&self.mesh) {
            info!("result mesh not closed");
        }
        if self.options.triangulate {
            self.triangulate_result();
        }

        self.stats.kernel_faces = self.mesh.face_count();
        let faces: Vec<FaceId> = self.mesh.face_ids().collect();
        for f in faces {
            let src = self.source_face[f.index()];
            if !src.is_valid() {
                continue;
            }
            if classify::edge_touches_concave_region(input, &self.edge_states, src) {
                self.stats.concave_contribution += 1;
            } else {
                self.stats.convex_contribution += 1;
            }
        }
        Ok(())
    }

    // --- Result accessors ---

    pub fn has_kernel(&self) -> bool {
        self.has_kernel
    }

    pub fn input_is_convex(&self) -> bool {
        self.input_convex
    }

    pub fn mesh(&self) -> &HalfEdgeMesh {
        &self.mesh
    }

    /// Exact homogeneous position per vertex slot.
    pub fn positions(&self) -> &[Point4] {
        &self.pos4
    }

    /// Rounded f64 mirror per vertex slot.
    pub fn positions_f64(&self) -> &[DPos3] {
        &self.dpos
    }

    /// Supporting plane per face slot.
    pub fn supporting_planes(&self) -> &[Plane] {
        &self.supporting_plane
    }

    /// Exact carrier line per edge slot.
    pub fn edge_lines(&self) -> &[Line] {
        &self.edge_lines
    }

    pub fn stats(&self) -> &KernelStats {
        &self.stats
    }

    // --- Setup ---

    fn reset(&mut self) {
        *self = Self::new();
    }

    fn clear_result(&mut self) {
        self.mesh = HalfEdgeMesh::new();
        self.pos4.clear();
        self.dpos.clear();
        self.edge_lines.clear();
        self.supporting_plane.clear();
        self.source_face.clear();
        self.is_c0.clear();
        self.visited.clear();
    }

    /// Convex shortcut: the kernel is the input itself.
    fn adopt_input(&mut self, input: &InputMesh) {
        self.mesh = input.topology.clone();
        self.pos4 = input.positions.iter().map(|&p| Point4::from(p)).collect();
        self.dpos = input
            .positions
            .iter()
            .map(|p| DPos3::new(p.x as f64, p.y as f64, p.z as f64))
            .collect();
        self.supporting_plane = self.input_planes.clone();
        self.source_face = (0..self.mesh.face_slots() as u32).map(FaceId).collect();
        self.edge_lines = vec![Line::default(); self.mesh.edge_slots()];
        let edges: Vec<_> = self.mesh.edge_ids().collect();
        for e in edges {
            let a = input.positions[self.mesh.vertex_a(e).index()];
            let b = input.positions[self.mesh.vertex_b(e).index()];
            self.edge_lines[e.index()] = edge_line(a, b);
        }

        self.has_kernel = true;
        self.input_convex = true;
        self.stats.is_convex = true;
        self.stats.kernel_faces = self.stats.input_faces;
        self.stats.convex_contribution = self.stats.input_faces;
        self.stats.total_planes = self.stats.input_faces;
    }

    /// Seed the running mesh with the input's bounding box and exact
    /// supporting data for all of its cells.
    fn init_running_mesh(&mut self, input: &InputMesh) {
        let aabb = input.aabb();
        let (mesh, corners) = HalfEdgeMesh::add_box(&aabb);
        self.mesh = mesh;

        self.pos4 = corners.iter().map(|&p| Point4::from(p)).collect();
        self.dpos = corners
            .iter()
            .map(|p| DPos3::new(p.x as f64, p.y as f64, p.z as f64))
            .collect();
        self.is_c0 = vec![false; self.mesh.vertex_slots()];
        self.visited = vec![false; self.mesh.vertex_slots()];

        self.edge_lines = vec![Line::default(); self.mesh.edge_slots()];
        let edges: Vec<_> = self.mesh.edge_ids().collect();
        for e in edges {
            let a = corners[self.mesh.vertex_a(e).index()];
            let b = corners[self.mesh.vertex_b(e).index()];
            self.edge_lines[e.index()] = edge_line(a, b);
        }

        self.supporting_plane = vec![Plane::default(); self.mesh.face_slots()];
        self.source_face = vec![FaceId::INVALID; self.mesh.face_slots()];
        let faces: Vec<_> = self.mesh.face_ids().collect();
        for f in faces {
            let mut corners_it = self.mesh.face_vertices(f);
            let v0 = corners_it.next().unwrap();
            let v1 = corners_it.next().unwrap();
            let v2 = corners_it.next().unwrap();
            let plane = Plane::from_points_raw(
                corners[v0.index()],
                corners[v1.index()],
                corners[v2.index()],
            );
            debug_assert!(plane.is_valid());
            self.supporting_plane[f.index()] = plane;
        }

        if self.options.use_bb_culling {
            self.volume = Some(BoundingVolume::initialize(
                self.options.kdop_k,
                &self.mesh,
                &corners,
                &self.dpos,
            ));
        }
    }

    // --- Main loop ---

    fn cut_all_planes(&mut self) {
        for i in 0..self.cutting_planes.len() {
            if self.oracle_says_infeasible() {
                debug!("seidel oracle finished before all planes were processed");
                self.stats.lp_early_out = true;
                self.has_kernel = false;
                return;
            }

            self.cutting_plane = self.cutting_planes[i];
            self.cutting_plane_face = self.plane_faces[i];
            trace!(plane = i, total = self.cutting_planes.len(), "cutting");

            let outcome = self.cut_one_plane();
            self.reset_plane_state();
            if matches!(outcome, PlaneOutcome::KernelEmpty) {
                self.has_kernel = false;
                return;
            }
        }
        self.has_kernel = self.mesh.vertex_count() != 0;
        debug!("all cutting planes processed");
    }

    fn cut_one_plane(&mut self) -> PlaneOutcome {
        if self.options.use_bb_culling && !self.intersects_bounding_volume() {
            return PlaneOutcome::Continue;
        }

        let Some(start_vertex) = self.mesh.last_vertex() else {
            return PlaneOutcome::KernelEmpty;
        };

        match self.edge_descent(start_vertex) {
            Some(start_halfedge) => self.marching(start_halfedge),
            None => {
                if self.classify_vertex(start_vertex) < 0 {
                    // The whole polyhedron satisfies the plane.
                    return PlaneOutcome::Continue;
                }
                if self.c0_vertex.is_none() {
                    // No crossing and a positive-side vertex: nothing of
                    // the running polyhedron survives this plane.
                    return PlaneOutcome::KernelEmpty;
                }
                // A single on-plane vertex: fall through to the deletion
                // which grazes or peels from there.
            }
        }

        let proper_cut = self.delete_positive_side();
        if proper_cut {
            self.fill_cut_hole();
        }
        if self.options.use_bb_culling && proper_cut {
            self.update_bounding_volume();
        }
        PlaneOutcome::Continue
    }

    fn reset_plane_state(&mut self) {
        for &v in &self.c0_flagged {
            self.is_c0[v.index()] = false;
        }
        self.c0_flagged.clear();
        self.c0_ring.clear();
        self.c0_vertex = None;
    }

    // --- Oracle / culling ---

    fn oracle_says_infeasible(&mut self) -> bool {
        match self.oracle.as_mut().map(|o| o.poll()) {
            Some(Some(LpState::Infeasible)) => true,
            _ => false,
        }
    }

    fn intersects_bounding_volume(&self) -> bool {
        match &self.volume {
            Some(volume) => volume.intersects_plane(&self.cutting_plane),
            None => true,
        }
    }

    fn update_bounding_volume(&mut self) {
        if let Some(volume) = self.volume.as_mut() {
            // All flagged on-plane vertices; the ring list may have
            // dropped its closing duplicate.
            volume.update(&self.c0_flagged, &self.mesh, &self.dpos);
        }
    }

    // --- Per-vertex helpers ---

    #[inline]
    fn classify_vertex(&self, v: VertexId) -> i8 {
        classify_point(&self.pos4[v.index()], &self.cutting_plane)
    }

    fn flag_c0(&mut self, v: VertexId) {
        if !self.is_c0[v.index()] {
            self.is_c0[v.index()] = true;
            self.c0_flagged.push(v);
        }
    }

    fn push_c0(&mut self, v: VertexId) {
        self.flag_c0(v);
        self.c0_ring.push(v);
    }

    // --- Edge descent ---

    /// Walk toward the cutting plane along approximate distances and
    /// return a half-edge whose endpoints classify differently (or end at
    /// an on-plane vertex). Falls back to the exact one-ring check as
    /// soon as a float decision is within its precision estimate.
    fn edge_descent(&mut self, start_vertex: VertexId) -> Option<HalfEdgeId> {
        if self.classify_vertex(start_vertex) == 0 {
            self.c0_vertex = Some(start_vertex);
            self.flag_c0(start_vertex);
        }

        let dplane = self.cutting_plane.to_dplane();
        let mut closest = start_vertex;
        let mut min_distance = dplane.signed_distance(self.dpos[closest.index()]);
        let mut epsilon = precision_for(min_distance);

        loop {
            let mut found_closer = false;
            let spokes: Vec<HalfEdgeId> = self.mesh.outgoing_halfedges(closest).collect();
            for h in spokes {
                let neighbor = self.mesh.to(h);
                let distance = dplane.signed_distance(self.dpos[neighbor.index()]);
                let eps = precision_for(distance);
                if eps > epsilon {
                    epsilon = eps;
                }

                if distance.abs() < epsilon {
                    // Too close to trust the float sign.
                    return self.edge_descent_exact(neighbor);
                }
                if distance.signum() != min_distance.signum() {
                    return Some(h);
                }
                if distance.abs() >= min_distance.abs() {
                    continue;
                }

                closest = neighbor;
                min_distance = distance;
                found_closer = true;
            }
            if !found_closer {
                break;
            }
        }

        // No neighbor improves: confirm with the exact predicate.
        self.edge_descent_exact(closest)
    }

    /// Exact one-ring check around `vertex`.
    fn edge_descent_exact(&mut self, vertex: VertexId) -> Option<HalfEdgeId> {
        let c_here = self.classify_vertex(vertex);
        let spokes: Vec<HalfEdgeId> = self.mesh.outgoing_halfedges(vertex).collect();
        if c_here == 0 {
            self.c0_vertex = Some(vertex);
            return spokes.first().map(|h| h.opposite());
        }
        for h in spokes {
            let target = self.mesh.to(h);
            let c_there = self.classify_vertex(target);
            if c_there == 0 {
                self.c0_vertex = Some(target);
                return Some(h);
            }
            if c_here != c_there {
                return Some(h);
            }
        }
        None
    }

    // --- March ---

    /// Trace the intersection curve of the cutting plane, splitting
    /// straddling half-edges at their exact intersection and connecting
    /// successive on-plane vertices by face cuts, until the walk returns
    /// to its first on-plane vertex.
    fn marching(&mut self, start_halfedge: HalfEdgeId) {
        debug_assert!(
            self.classify_vertex(self.mesh.to(start_halfedge)) == 0
                || self.classify_vertex(self.mesh.from(start_halfedge))
                    != self.classify_vertex(self.mesh.to(start_halfedge))
        );

        let mut current = start_halfedge;
        let mut current_c0: Option<VertexId> = None;

        loop {
            // Advance around the face until an edge straddles, recording
            // vertices that lie exactly on the plane.
            let first = current;
            let mut ca = self.classify_vertex(self.mesh.from(current));
            let mut cb = self.classify_vertex(self.mesh.to(current));
            while ca == cb || ca == 0 {
                current = self.mesh.next(current);
                ca = self.classify_vertex(self.mesh.from(current));
                cb = self.classify_vertex(self.mesh.to(current));
                if ca == 0 {
                    let v = self.mesh.from(current);
                    self.push_c0(v);
                }
                if current == first {
                    // A full face loop without progress ends the march.
                    return;
                }
            }

            if ca * cb == -1 {
                self.split_current_halfedge(current);
            }

            // `current` now ends at a vertex on the cutting plane.
            let prev_c0 = current_c0;
            current_c0 = Some(self.mesh.to(current));
            if prev_c0 == current_c0 {
                break;
            }
            let v = current_c0.unwrap();
            self.push_c0(v);
            self.c0_vertex = Some(v);

            if let Some(prev) = prev_c0 {
                if !self.mesh.are_adjacent(v, prev) {
                    self.cut_current_face(v, prev, self.mesh.face_of(current));
                }
            }

            match self.skip_non_intersecting(current) {
                Some(h) => current = h,
                None => break,
            }

            if self.c0_ring.len() >= 2 && current_c0 == Some(self.c0_ring[0]) {
                break;
            }
        }

        // The ring start is recorded twice when the walk closes.
        self.c0_ring.pop();
    }

    /// Split the half-edge at the exact intersection of its carrier line
    /// with the cutting plane; the new vertex becomes its target.
    fn split_current_halfedge(&mut self, h: HalfEdgeId) {
        let line = self.edge_lines[h.edge().index()];
        let point = line_plane(&line, &self.cutting_plane);
        debug_assert!(point.is_valid());

        let (v, e) = self.mesh.split_halfedge(h);
        self.sync_vertex_attrs();
        self.sync_edge_attrs();
        self.pos4[v.index()] = point;
        self.dpos[v.index()] = point.to_dpos_fast();
        // Both halves stay on the original carrier line.
        self.edge_lines[e.index()] = line;
    }

    /// Connect two on-plane vertices of `face` by a new edge whose
    /// carrier is the intersection of the cutting plane with the face's
    /// supporting plane. No-ops on an invalid face.
    fn cut_current_face(&mut self, v_from: VertexId, v_to: VertexId, face: FaceId) {
        if !face.is_valid() {
            return;
        }
        let Some((diagonal, f_new)) = self.mesh.cut_face(face, v_from, v_to) else {
            return;
        };
        self.sync_edge_attrs();
        self.sync_face_attrs();
        let support = self.supporting_plane[face.index()];
        let source = self.source_face[face.index()];
        self.edge_lines[diagonal.edge().index()] = planes2(&self.cutting_plane, &support);
        self.supporting_plane[f_new.index()] = support;
        self.source_face[f_new.index()] = source;
    }

    /// Rotate around the current on-plane vertex to the next face the
    /// cutting plane passes through; `None` after a full rotation.
    fn skip_non_intersecting(&self, current: HalfEdgeId) -> Option<HalfEdgeId> {
        let pivot = self.mesh.to(current);
        let mut prev_he = current;
        for _ in 0..self.mesh.vertex_face_count(pivot) {
            let cur = prev_he.opposite();
            let new_prev = self.mesh.prev(cur);
            let c_to = self.classify_vertex(self.mesh.to(cur));
            let c_from = self.classify_vertex(self.mesh.from(new_prev));
            if c_to != c_from {
                return Some(cur);
            }
            prev_he = new_prev;
        }
        None
    }

    // --- Deletion and hole filling ---

    /// Flood-delete every vertex on the positive side, reached from a
    /// positive neighbor of an on-plane vertex without crossing the
    /// on-plane ring. False if the plane only grazes.
    fn delete_positive_side(&mut self) -> bool {
        let Some(c0) = self.c0_vertex else {
            return false;
        };

        let neighbors: Vec<VertexId> = self.mesh.adjacent_vertices(c0).collect();
        let Some(seed) = neighbors
            .into_iter()
            .find(|&n| self.classify_vertex(n) == 1)
        else {
            return false;
        };

        let mut stack = vec![seed];
        self.visited[seed.index()] = true;
        while let Some(v) = stack.pop() {
            let neighbors: Vec<VertexId> = self.mesh.adjacent_vertices(v).collect();
            for n in neighbors {
                if self.is_c0[n.index()] || self.visited[n.index()] {
                    continue;
                }
                stack.push(n);
                self.visited[n.index()] = true;
            }
            debug_assert!(self.classify_vertex(v) == 1);
            self.mesh.remove_vertex(v);
        }
        true
    }

    /// Cap the hole left by the deletion with one face supported by the
    /// cutting plane.
    fn fill_cut_hole(&mut self) {
        if self.mesh.vertex_count() < 3 || self.c0_ring.len() < 3 {
            return;
        }
        let anchor = self.c0_ring[0];
        let boundary = self
            .mesh
            .outgoing_halfedges(anchor)
            .find(|&h| self.mesh.halfedge_alive(h) && self.mesh.is_boundary(h));
        let Some(start) = boundary else {
            return;
        };
        let Some(face) = self.mesh.fill_hole(start) else {
            return;
        };
        self.sync_face_attrs();
        self.supporting_plane[face.index()] = self.cutting_plane;
        self.source_face[face.index()] = self.cutting_plane_face;
    }

    // --- Post-processing ---

    /// Naive fan triangulation of every result face, propagating the
    /// face attributes to the fan pieces.
    fn triangulate_result(&mut self) {
        let faces: Vec<FaceId> = self.mesh.face_ids().collect();
        for f in faces {
            let pieces = self.mesh.triangulate_face(f);
            if pieces.is_empty() {
                continue;
            }
            self.sync_edge_attrs();
            self.sync_face_attrs();
            let support = self.supporting_plane[f.index()];
            let source = self.source_face[f.index()];
            for piece in pieces {
                self.supporting_plane[piece.index()] = support;
                self.source_face[piece.index()] = source;
            }
        }
    }

    // --- Attribute bookkeeping ---

    fn sync_vertex_attrs(&mut self) {
        let n = self.mesh.vertex_slots();
        if self.pos4.len() < n {
            self.pos4.resize(n, Point4::default());
            self.dpos.resize(n, DPos3::origin());
            self.is_c0.resize(n, false);
            self.visited.resize(n, false);
        }
    }

    fn sync_edge_attrs(&mut self) {
        let n = self.mesh.edge_slots();
        if self.edge_lines.len() < n {
            self.edge_lines.resize(n, Line::default());
        }
    }

    fn sync_face_attrs(&mut self) {
        let n = self.mesh.face_slots();
        if self.supporting_plane.len() < n {
            self.supporting_plane.resize(n, Plane::default());
            self.source_face.resize(n, FaceId::INVALID);
        }
    }
}

/// Exact carrier line of the segment `p0 -> p1`, built as the
/// intersection of two axis-aligned-ish planes through both endpoints.
fn edge_line(p0: Pos3, p1: Pos3) -> Line {
    let d = IVec3::new(
        (p1.x - p0.x) as i64,
        (p1.y - p0.y) as i64,
        (p1.z - p0.z) as i64,
    );
    let (na, nb) = if d.x != 0 {
        (d.cross(&IVec3::new(0, 1, 0)), d.cross(&IVec3::new(0, 0, 1)))
    } else if d.y != 0 {
        (d.cross(&IVec3::new(0, 0, 1)), d.cross(&IVec3::new(1, 0, 0)))
    } else {
        (d.cross(&IVec3::new(1, 0, 0)), d.cross(&IVec3::new(0, 1, 0)))
    };
    let plane_a = Plane::from_point_normal(p0, na);
    let plane_b = Plane::from_point_normal(p0, nb);
    planes2(&plane_a, &plane_b)
}
