//! Topology validation for the half-edge arena.
//!
//! Checks the invariants a closed manifold genus-0 mesh must satisfy:
//! - every live half-edge sits in a face and in a closed face cycle
//! - `next`/`prev` are mutually inverse
//! - every vertex circulator closes and covers all its half-edges
//! - Euler formula: V - E + F = 2

use super::store::HalfEdgeMesh;
use super::types::*;

/// Result of topology validation.
#[derive(Debug)]
pub struct ValidationResult {
    pub valid: bool,
    pub errors: Vec<String>,
}

/// True iff no live half-edge is a boundary half-edge.
pub fn is_closed(mesh: &HalfEdgeMesh) -> bool {
    mesh.edge_ids().all(|e| {
        !mesh.is_boundary(e.halfedge_a()) && !mesh.is_boundary(e.halfedge_b())
    })
}

/// Validate that the mesh is a closed manifold genus-0 surface.
pub fn validate(mesh: &HalfEdgeMesh) -> ValidationResult {
    let mut errors = Vec::new();
    let max_cycle = mesh.edge_slots() * 2 + 1;

    // 1. Per-half-edge link consistency.
    for e in mesh.edge_ids() {
        for h in [e.halfedge_a(), e.halfedge_b()] {
            let cell = mesh.halfedge(h);
            if !cell.vertex.is_valid() || !mesh.vertex_alive(cell.vertex) {
                errors.push(format!("halfedge {:?} targets a dead vertex", h));
                continue;
            }
            if !cell.face.is_valid() {
                errors.push(format!("halfedge {:?} is a boundary halfedge", h));
                continue;
            }
            if !cell.next.is_valid() || !mesh.halfedge_alive(cell.next) {
                errors.push(format!("halfedge {:?} has a dead next link", h));
                continue;
            }
            if mesh.prev(cell.next) != h {
                errors.push(format!("halfedge {:?}: next/prev are not inverse", h));
            }
            if mesh.from(cell.next) != cell.vertex {
                errors.push(format!("halfedge {:?}: next does not continue at its target", h));
            }
        }
    }

    // 2. Face cycles close, with consistent face pointers.
    for f in mesh.face_ids() {
        let start = mesh.face(f).halfedge;
        if !start.is_valid() || !mesh.halfedge_alive(start) {
            errors.push(format!("face {:?} has a dead entry halfedge", f));
            continue;
        }
        let mut cur = start;
        let mut count = 0usize;
        loop {
            if mesh.face_of(cur) != f {
                errors.push(format!("face {:?}: cycle member {:?} points elsewhere", f, cur));
                break;
            }
            cur = mesh.next(cur);
            count += 1;
            if cur == start {
                break;
            }
            if count > max_cycle {
                errors.push(format!("face {:?}: cycle does not close", f));
                break;
            }
        }
        if count < 3 {
            errors.push(format!("face {f:?} has degree {count}"));
        }
    }

    // 3. Vertex circulators close and are exhaustive (manifold fans).
    let mut out_degree = vec![0usize; mesh.vertex_slots()];
    for e in mesh.edge_ids() {
        for h in [e.halfedge_a(), e.halfedge_b()] {
            let from = mesh.from(h);
            if from.index() < out_degree.len() {
                out_degree[from.index()] += 1;
            }
        }
    }
    for v in mesh.vertex_ids() {
        let entry = mesh.vertex(v).halfedge;
        if !entry.is_valid() || !mesh.halfedge_alive(entry) {
            errors.push(format!("vertex {:?} has a dead entry halfedge", v));
            continue;
        }
        if mesh.from(entry) != v {
            errors.push(format!("vertex {:?}: entry halfedge starts elsewhere", v));
            continue;
        }
        let seen = mesh
            .outgoing_halfedges(v)
            .take(max_cycle)
            .filter(|&h| mesh.halfedge_alive(h))
            .count();
        if seen != out_degree[v.index()] {
            errors.push(format!(
                "vertex {:?}: circulator covers {seen} of {} halfedges (non-manifold fan)",
                v,
                out_degree[v.index()]
            ));
        }
    }

    // 4. Euler formula for a genus-0 closed surface.
    let v = mesh.vertex_count() as i64;
    let e = mesh.edge_count() as i64;
    let f = mesh.face_count() as i64;
    let euler = v - e + f;
    if euler != 2 {
        errors.push(format!(
            "Euler formula V-E+F = {v}-{e}+{f} = {euler} (expected 2 for genus-0)"
        ));
    }

    ValidationResult {
        valid: errors.is_empty(),
        errors,
    }
}
