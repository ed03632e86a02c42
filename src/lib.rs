//! # polykern
//!
//! Exact construction of the kernel of a star-shaped polyhedron: the
//! convex set of interior points that see every surface point, computed
//! as the intersection of the outward half-spaces of all face-supporting
//! planes.
//!
//! The engine carves a running convex polyhedron (seeded with the input's
//! bounding box) against each cutting plane using exact fixed-width
//! integer arithmetic, so results are combinatorially exact for inputs
//! within the coordinate budget. A randomized exact LP feasibility solver
//! runs alongside the cutter and ends the run early when the kernel is
//! certainly empty.
//!
//! ```
//! use polykern::{InputMesh, KernelCutter, KernelOptions};
//! use polykern::math::Pos3;
//!
//! // A cube is convex, so its kernel is the cube itself.
//! let positions = vec![
//!     Pos3::new(-1000, -1000, -1000),
//!     Pos3::new(1000, -1000, -1000),
//!     Pos3::new(-1000, 1000, -1000),
//!     Pos3::new(1000, 1000, -1000),
//!     Pos3::new(-1000, -1000, 1000),
//!     Pos3::new(1000, -1000, 1000),
//!     Pos3::new(-1000, 1000, 1000),
//!     Pos3::new(1000, 1000, 1000),
//! ];
//! let faces = vec![
//!     vec![0, 2, 3, 1],
//!     vec![4, 5, 7, 6],
//!     vec![0, 1, 5, 4],
//!     vec![2, 6, 7, 3],
//!     vec![0, 4, 6, 2],
//!     vec![1, 3, 7, 5],
//! ];
//! let input = InputMesh::from_faces(positions, &faces);
//!
//! let mut cutter = KernelCutter::new();
//! cutter.compute(&input, KernelOptions::default()).unwrap();
//! assert!(cutter.has_kernel());
//! assert!(cutter.input_is_convex());
//! ```

pub mod classify;
pub mod convert;
pub mod geometry;
pub mod kdop;
pub mod kernel;
pub mod math;
pub mod seidel;
pub mod topo;
pub mod types;

pub use kernel::KernelCutter;
pub use seidel::{is_feasible, LpState, SeidelOracle, SeidelSolver};
pub use types::{InputMesh, KdopK, KernelError, KernelOptions, KernelStats};
