//! Conservative bounding volumes around the shrinking kernel mesh.
//!
//! The cutter skips a cutting plane whenever the running polyhedron lies
//! strictly inside its half-space; the volumes here answer that query
//! conservatively. K = 3 is an exact integer box; K in {8, 9, 12} adds
//! diagonal slabs with f64 bounds and outward-conservative rounding.
//! Every live vertex must stay inside every slab at all times; a
//! violated bound would silently skip a plane that still cuts.
//!
//! Slab axis sets follow the usual discrete-orientation tables: the three
//! box axes, then edge-cutting diagonals, then corner-cutting diagonals.

use crate::geometry::{classify_aabb, classify_point, planes3, Plane};
use crate::math::{Aabb, DPos3, DVec3, Pos3};
use crate::topo::{HalfEdgeMesh, VertexId};
use crate::types::KdopK;

const AXES_12: [[i64; 3]; 12] = [
    [1, 0, 0],
    [0, 1, 0],
    [0, 0, 1],
    [1, 1, 0],
    [1, 0, 1],
    [0, 1, 1],
    [1, -1, 0],
    [1, 0, -1],
    [0, 1, -1],
    [1, 1, -1],
    [1, -1, 1],
    [-1, 1, 1],
];

/// Axis-aligned box with exact integer bounds and witness vertices.
#[derive(Clone, Debug)]
pub struct AabbDop {
    pub aabb: Aabb,
    witness_min: [VertexId; 3],
    witness_max: [VertexId; 3],
}

impl AabbDop {
    /// Scan all live vertices, then inflate outward.
    pub fn initialize(mesh: &HalfEdgeMesh, positions: &[Pos3]) -> Self {
        let first = mesh.vertex_ids().next().expect("bounding volume of empty mesh");
        let mut dop = Self {
            aabb: Aabb::new(positions[first.index()], positions[first.index()]),
            witness_min: [first; 3],
            witness_max: [first; 3],
        };
        for v in mesh.vertex_ids() {
            let p = positions[v.index()];
            for d in 0..3 {
                if p[d] < dop.aabb.min[d] {
                    dop.aabb.min[d] = p[d];
                    dop.witness_min[d] = v;
                }
                if p[d] > dop.aabb.max[d] {
                    dop.aabb.max[d] = p[d];
                    dop.witness_max[d] = v;
                }
            }
        }
        for d in 0..3 {
            dop.aabb.min[d] -= 3;
            dop.aabb.max[d] += 3;
        }
        dop
    }

    /// Recompute bounds whose witness vertex was deleted by a cut,
    /// scanning only the new boundary vertices; the box never grows.
    pub fn update(&mut self, cut_vertices: &[VertexId], mesh: &HalfEdgeMesh, dpos: &[DPos3]) {
        if cut_vertices.is_empty() {
            return;
        }
        let mut min_stale = [false; 3];
        let mut max_stale = [false; 3];
        let mut dirty = false;
        for d in 0..3 {
            min_stale[d] = !mesh.vertex_alive(self.witness_min[d]);
            max_stale[d] = !mesh.vertex_alive(self.witness_max[d]);
            dirty |= min_stale[d] || max_stale[d];
        }
        if !dirty {
            return;
        }

        let mut new_min = [f64::INFINITY; 3];
        let mut new_max = [f64::NEG_INFINITY; 3];
        for &v in cut_vertices {
            let p = dpos[v.index()];
            for d in 0..3 {
                if min_stale[d] {
                    let lo = (p[d] - 1.0).floor();
                    if lo < new_min[d] {
                        new_min[d] = lo;
                        self.witness_min[d] = v;
                    }
                }
                if max_stale[d] {
                    let hi = (p[d] + 1.0).ceil();
                    if hi > new_max[d] {
                        new_max[d] = hi;
                        self.witness_max[d] = v;
                    }
                }
            }
        }

        for d in 0..3 {
            if min_stale[d] {
                let clamped = self.aabb.min[d].max(new_min[d] as i32);
                self.aabb.min[d] = clamped;
            }
            if max_stale[d] {
                let clamped = self.aabb.max[d].min(new_max[d] as i32);
                self.aabb.max[d] = clamped;
            }
        }
    }

    pub fn intersects_plane(&self, plane: &Plane) -> bool {
        classify_aabb(&self.aabb, plane) >= 0
    }
}

/// K-slab volume with f64 bounds along tabulated diagonal axes.
#[derive(Clone, Debug)]
pub struct SlabDop {
    axes: Vec<DVec3>,
    axes_int: Vec<[i64; 3]>,
    dmin: Vec<f64>,
    dmax: Vec<f64>,
    witness_min: Vec<VertexId>,
    witness_max: Vec<VertexId>,
}

impl SlabDop {
    pub fn initialize(k: usize, mesh: &HalfEdgeMesh, dpos: &[DPos3]) -> Self {
        debug_assert!(matches!(k, 8 | 9 | 12));
        let axes_int: Vec<[i64; 3]> = AXES_12[..k].to_vec();
        let axes: Vec<DVec3> = axes_int
            .iter()
            .map(|a| DVec3::new(a[0] as f64, a[1] as f64, a[2] as f64))
            .collect();

        let first = mesh.vertex_ids().next().expect("bounding volume of empty mesh");
        let mut dop = Self {
            dmin: vec![f64::INFINITY; k],
            dmax: vec![f64::NEG_INFINITY; k],
            witness_min: vec![first; k],
            witness_max: vec![first; k],
            axes,
            axes_int,
        };
        for v in mesh.vertex_ids() {
            let p = dpos[v.index()];
            for i in 0..k {
                let d = dop.axes[i].dot(&p.coords);
                if d < dop.dmin[i] {
                    dop.dmin[i] = d;
                    dop.witness_min[i] = v;
                }
                if d > dop.dmax[i] {
                    dop.dmax[i] = d;
                    dop.witness_max[i] = v;
                }
            }
        }
        for i in 0..k {
            dop.dmin[i] -= 1.0;
            dop.dmax[i] += 1.0;
        }
        dop
    }

    pub fn update(&mut self, cut_vertices: &[VertexId], mesh: &HalfEdgeMesh, dpos: &[DPos3]) {
        if cut_vertices.is_empty() {
            return;
        }
        let k = self.axes.len();
        for i in 0..k {
            if !mesh.vertex_alive(self.witness_min[i]) {
                let mut best = f64::INFINITY;
                for &v in cut_vertices {
                    let d = self.axes[i].dot(&dpos[v.index()].coords) - 1.0;
                    if d < best {
                        best = d;
                        self.witness_min[i] = v;
                    }
                }
                // The volume only ever shrinks.
                let clamped = best.max(self.dmin[i]);
                self.dmin[i] = clamped;
            }
            if !mesh.vertex_alive(self.witness_max[i]) {
                let mut best = f64::NEG_INFINITY;
                for &v in cut_vertices {
                    let d = self.axes[i].dot(&dpos[v.index()].coords) + 1.0;
                    if d > best {
                        best = d;
                        self.witness_max[i] = v;
                    }
                }
                let clamped = best.min(self.dmax[i]);
                self.dmax[i] = clamped;
            }
        }
    }

    /// One outward slab plane. Interior points classify non-positive;
    /// floor/ceil round away from the volume.
    fn slab_plane(&self, i: usize, max_side: bool) -> Plane {
        let a = self.axes_int[i];
        if max_side {
            Plane::new(a[0], a[1], a[2], -(self.dmax[i].ceil() as i128))
        } else {
            Plane::new(-a[0], -a[1], -a[2], self.dmin[i].floor() as i128)
        }
    }

    pub fn intersects_plane(&self, plane: &Plane) -> bool {
        let k = self.axes.len();
        let n = plane.to_dplane().normal;

        // Slab axis most aligned with the plane normal, oriented so the
        // extremal side faces the positive half-space.
        let mut max_idx = 0;
        let mut max_dot = f64::NEG_INFINITY;
        for (i, axis) in self.axes.iter().enumerate() {
            let d = axis.dot(&n).abs();
            if d > max_dot {
                max_dot = d;
                max_idx = i;
            }
        }
        let extremal = self.slab_plane(max_idx, self.axes[max_idx].dot(&n) >= 0.0);

        let mut others = Vec::with_capacity(2 * (k - 1));
        for i in 0..k {
            if i == max_idx {
                continue;
            }
            others.push(self.slab_plane(i, false));
            others.push(self.slab_plane(i, true));
        }

        // Candidate corners of the extremal face, pruned to those inside
        // every other slab.
        let mut any_real = false;
        for a in 0..others.len() {
            for b in (a + 1)..others.len() {
                let corner = planes3(&others[a], &others[b], &extremal);
                if !corner.is_valid() {
                    continue;
                }
                if others.iter().any(|q| classify_point(&corner, q) > 0) {
                    continue;
                }
                any_real = true;
                if classify_point(&corner, plane) >= 0 {
                    return true;
                }
            }
        }

        // No recoverable corner geometry: never skip the plane.
        !any_real
    }
}

/// Closed sum of the two volume variants behind one interface.
#[derive(Clone, Debug)]
pub enum BoundingVolume {
    Aabb(AabbDop),
    Slabs(SlabDop),
}

impl BoundingVolume {
    pub fn initialize(
        k: KdopK,
        mesh: &HalfEdgeMesh,
        positions: &[Pos3],
        dpos: &[DPos3],
    ) -> Self {
        match k {
            KdopK::K3 => BoundingVolume::Aabb(AabbDop::initialize(mesh, positions)),
            KdopK::K8 => BoundingVolume::Slabs(SlabDop::initialize(8, mesh, dpos)),
            KdopK::K9 => BoundingVolume::Slabs(SlabDop::initialize(9, mesh, dpos)),
            KdopK::K12 => BoundingVolume::Slabs(SlabDop::initialize(12, mesh, dpos)),
        }
    }

    pub fn update(&mut self, cut_vertices: &[VertexId], mesh: &HalfEdgeMesh, dpos: &[DPos3]) {
        match self {
            BoundingVolume::Aabb(dop) => dop.update(cut_vertices, mesh, dpos),
            BoundingVolume::Slabs(dop) => dop.update(cut_vertices, mesh, dpos),
        }
    }

    /// False only when the whole volume lies strictly inside the plane's
    /// negative half-space, i.e. the plane cannot cut the mesh.
    pub fn intersects_plane(&self, plane: &Plane) -> bool {
        match self {
            BoundingVolume::Aabb(dop) => dop.intersects_plane(plane),
            BoundingVolume::Slabs(dop) => dop.intersects_plane(plane),
        }
    }
}
