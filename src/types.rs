//! Options, statistics, errors, and the input bundle.

use thiserror::Error;

use crate::math::{Aabb, Pos3, MAX_COORD};
use crate::topo::{validate, HalfEdgeMesh};

/// Slab axis set of the culling volume.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum KdopK {
    /// Axis-aligned box with exact integer bounds.
    #[default]
    K3,
    /// Box plus five edge-cutting diagonal slabs.
    K8,
    /// Box plus six diagonal slabs.
    K9,
    /// Box plus six diagonal and three corner-cutting slabs.
    K12,
}

/// Settings controlling one kernel computation.
#[derive(Clone, Copy, Debug)]
pub struct KernelOptions {
    /// Deduplicate coplanar face planes via a hashed set of reduced
    /// planes; otherwise via union-find over planar edges.
    pub use_plane_set: bool,
    /// Cull cutting planes against a conservative bounding volume.
    pub use_bb_culling: bool,
    /// Axis set of the bounding volume.
    pub kdop_k: KdopK,
    /// Run the exact LP feasibility oracle at all.
    pub use_seidel: bool,
    /// Triangulate the result mesh.
    pub triangulate: bool,
    /// Run the oracle concurrently with the cutter for early-out.
    pub parallel_exact_lp: bool,
    /// Collection size above which setup phases fork-join in parallel.
    pub min_faces_for_parallel_setup: usize,
}

impl Default for KernelOptions {
    fn default() -> Self {
        Self {
            use_plane_set: false,
            use_bb_culling: true,
            kdop_k: KdopK::K3,
            use_seidel: true,
            triangulate: false,
            parallel_exact_lp: true,
            min_faces_for_parallel_setup: 100_000,
        }
    }
}

/// Per-run statistics of a kernel computation.
#[derive(Clone, Copy, Debug, Default)]
pub struct KernelStats {
    pub input_faces: usize,
    pub kernel_faces: usize,
    /// Kernel faces originating in purely convex input regions.
    pub convex_contribution: usize,
    /// Kernel faces originating in concave input regions.
    pub concave_contribution: usize,
    pub is_convex: bool,
    /// The LP oracle decided emptiness before the cutter finished.
    pub lp_early_out: bool,
    pub concave_planes: usize,
    pub total_planes: usize,
}

/// Rejection reasons for inputs the kernel refuses to process.
#[derive(Error, Debug)]
pub enum KernelError {
    #[error("input mesh is empty")]
    EmptyInput,

    #[error("input mesh is not closed")]
    NotClosed,

    #[error("input mesh is not a manifold genus-0 surface: {detail}")]
    NonManifold { detail: String },

    #[error("input coordinate {value} exceeds the position bit budget")]
    CoordinateOverflow { value: i64 },
}

/// A closed input surface: topology plus integer vertex positions.
#[derive(Clone, Debug, Default)]
pub struct InputMesh {
    pub topology: HalfEdgeMesh,
    pub positions: Vec<Pos3>,
}

impl InputMesh {
    /// Assemble from per-face vertex loops.
    pub fn from_faces(positions: Vec<Pos3>, face_loops: &[Vec<u32>]) -> Self {
        let topology = HalfEdgeMesh::from_faces(positions.len(), face_loops);
        Self {
            topology,
            positions,
        }
    }

    /// Bounding box of all positions.
    pub fn aabb(&self) -> Aabb {
        Aabb::of_points(self.positions.iter())
    }

    /// The loader contract: closed, manifold, genus 0, non-empty, and
    /// every coordinate within the position bit budget.
    pub fn validate(&self) -> Result<(), KernelError> {
        if self.topology.vertex_count() == 0 || self.topology.face_count() == 0 {
            return Err(KernelError::EmptyInput);
        }
        for p in &self.positions {
            for d in 0..3 {
                let v = p[d] as i64;
                if v.abs() > MAX_COORD {
                    return Err(KernelError::CoordinateOverflow { value: v });
                }
            }
        }
        if !validate::is_closed(&self.topology) {
            return Err(KernelError::NotClosed);
        }
        let report = validate::validate(&self.topology);
        if !report.valid {
            return Err(KernelError::NonManifold {
                detail: report.errors.join("; "),
            });
        }
        Ok(())
    }
}
