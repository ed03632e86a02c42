//! Exact randomized LP feasibility over a half-space set.
//!
//! Seidel's randomized incremental algorithm, specialized to the
//! feasibility question "is the intersection of all half-spaces
//! non-empty". The current solution is a locus of dimension 3 - k (all of
//! space, a plane, a line, or a point, for k fixed planes); a plane that
//! the locus violates demotes the problem one dimension and re-solves
//! over the planes seen so far. All arithmetic is exact, so ties break on
//! true signs of `any_point` of the locus.
//!
//! The solver runs either synchronously ([`is_feasible`]) or as a
//! cancellable background oracle ([`SeidelOracle`]) the cutter polls for
//! an early emptiness verdict.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Instant;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::classify::face_planes;
use crate::geometry::{
    any_point_on_line, any_point_on_plane, are_parallel, are_parallel_line, classify_point,
    line_plane, orientation, planes2, Line, Plane, Point4,
};
use crate::types::InputMesh;

/// Default shuffle seed; any fixed value keeps runs reproducible.
pub const DEFAULT_SEED: u64 = 0x9e3779b97f4a7c15;

/// How often the 2-D inner loop polls the cancel flag.
const CANCEL_POLL_INTERVAL: usize = 1000;

/// Outcome of a feasibility solve.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LpState {
    Infeasible,
    HasSolution,
    /// Reserved: without an objective, unbounded and minimal coincide.
    Unbounded,
    /// Reserved.
    Ambiguous,
}

/// The locus satisfying the fixed planes so far: space, plane, line or
/// point, as up to three defining plane indices plus derived geometry.
#[derive(Clone, Debug, Default)]
struct PartialSolution {
    idx: [Option<usize>; 3],
    plane: Plane,
    line: Line,
    point: Point4,
}

impl PartialSolution {
    fn reset(&mut self) {
        self.idx = [None; 3];
    }

    fn append(&mut self, index: usize, new_plane: &Plane) {
        if self.idx[0].is_none() {
            self.idx[0] = Some(index);
            self.plane = *new_plane;
            debug_assert!(self.plane.is_valid());
        } else if self.idx[1].is_none() {
            self.idx[1] = Some(index);
            self.line = planes2(&self.plane, new_plane);
            debug_assert!(self.line.is_valid());
        } else {
            debug_assert!(self.idx[2].is_none(), "cannot append to a point solution");
            self.idx[2] = Some(index);
            self.point = line_plane(&self.line, new_plane);
            debug_assert!(self.point.is_valid());
        }
    }

    fn is_space(&self) -> bool {
        self.idx[0].is_none()
    }

    fn is_plane(&self) -> bool {
        self.idx[0].is_some() && self.idx[1].is_none()
    }

    fn is_line(&self) -> bool {
        self.idx[1].is_some() && self.idx[2].is_none()
    }

    fn is_point(&self) -> bool {
        self.idx[2].is_some()
    }

    /// A representative point of the locus, used for all tie-breaking.
    fn any_point(&self) -> Point4 {
        if self.is_point() {
            self.point
        } else if self.is_line() {
            any_point_on_line(&self.line)
        } else {
            debug_assert!(self.is_plane());
            any_point_on_plane(&self.plane)
        }
    }
}

/// Exact Seidel feasibility solver over one plane set.
pub struct SeidelSolver {
    /// Planes in shuffled processing order.
    planes: Vec<Plane>,
    /// Shuffled index -> index in the caller's ordering.
    mapping: Vec<usize>,
    solution: PartialSolution,
    cancel: Arc<AtomicBool>,
}

impl SeidelSolver {
    /// Copies the planes in a deterministic shuffled order derived from
    /// `seed`; randomness is what makes Seidel expected-linear.
    pub fn new(planes: &[Plane], seed: u64) -> Self {
        let mut mapping: Vec<usize> = (0..planes.len()).collect();
        let mut rng = StdRng::seed_from_u64(seed);
        mapping.shuffle(&mut rng);
        let shuffled = mapping.iter().map(|&i| planes[i]).collect();
        Self {
            planes: shuffled,
            mapping,
            solution: PartialSolution::default(),
            cancel: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Shared cancel flag; setting it makes `solve` return early.
    pub fn cancel_handle(&self) -> Arc<AtomicBool> {
        self.cancel.clone()
    }

    pub fn stop(&self) {
        self.cancel.store(true, Ordering::Relaxed);
    }

    pub fn solve(&mut self) -> LpState {
        self.solve_3d()
    }

    /// Indices of the up-to-three planes defining the final solution, in
    /// the caller's original ordering.
    pub fn solution_planes(&self) -> [Option<usize>; 3] {
        let map = |slot: Option<usize>| slot.map(|i| self.mapping[i]);
        [
            map(self.solution.idx[0]),
            map(self.solution.idx[1]),
            map(self.solution.idx[2]),
        ]
    }

    fn solve_3d(&mut self) -> LpState {
        self.solution.reset();
        for pi in 0..self.planes.len() {
            if self.cancel.load(Ordering::Relaxed) {
                // Not necessarily infeasible; the caller discards the
                // verdict of a cancelled run.
                return LpState::Infeasible;
            }
            let plane = self.planes[pi];

            if self.solution.is_point() {
                if classify_point(&self.solution.point, &plane) <= 0 {
                    continue;
                }
            } else if self.solution.is_line() {
                if are_parallel_line(&plane, &self.solution.line) {
                    if classify_point(&any_point_on_line(&self.solution.line), &plane) <= 0 {
                        continue;
                    }
                } else {
                    self.solution.append(pi, &plane);
                    continue;
                }
            } else if self.solution.is_plane() {
                if are_parallel(&self.solution.plane, &plane) {
                    if classify_point(&any_point_on_plane(&self.solution.plane), &plane) <= 0 {
                        continue;
                    }
                } else {
                    self.solution.append(pi, &plane);
                    continue;
                }
            } else {
                debug_assert!(self.solution.is_space());
                self.solution.append(pi, &plane);
                continue;
            }

            // The locus violates the new plane: fix it and re-solve the
            // 2-D problem over the planes seen so far.
            if self.solve_2d(pi, pi) == LpState::Infeasible {
                return LpState::Infeasible;
            }
        }
        LpState::HasSolution
    }

    fn solve_2d(&mut self, n: usize, fixed_3d: usize) -> LpState {
        self.solution.reset();
        let fixed_plane = self.planes[fixed_3d];
        self.solution.append(fixed_3d, &fixed_plane);

        for pi in 0..n {
            if (pi + 1) % CANCEL_POLL_INTERVAL == 0 && self.cancel.load(Ordering::Relaxed) {
                return LpState::Infeasible;
            }
            let plane = self.planes[pi];

            if self.solution.is_point() {
                if classify_point(&self.solution.point, &plane) <= 0 {
                    continue;
                }
            } else if self.solution.is_line() {
                if are_parallel_line(&plane, &self.solution.line) {
                    if classify_point(&any_point_on_line(&self.solution.line), &plane) <= 0 {
                        continue;
                    }
                } else {
                    self.solution.append(pi, &plane);
                    continue;
                }
            } else {
                debug_assert!(self.solution.is_plane());
                if are_parallel(&self.solution.plane, &plane) {
                    if classify_point(&any_point_on_plane(&self.solution.plane), &plane) <= 0 {
                        continue;
                    }
                } else {
                    self.solution.append(pi, &plane);
                    continue;
                }
            }

            // Two parallel planes facing each other leave nothing.
            if are_parallel(&plane, &fixed_plane)
                && classify_point(&any_point_on_plane(&fixed_plane), &plane) == 1
            {
                return LpState::Infeasible;
            }

            if self.solve_1d(pi, fixed_3d, pi) == LpState::Infeasible {
                return LpState::Infeasible;
            }
        }
        LpState::HasSolution
    }

    fn solve_1d(&mut self, n: usize, fixed_3d: usize, fixed_2d: usize) -> LpState {
        self.solution.reset();
        let plane_a = self.planes[fixed_3d];
        let plane_b = self.planes[fixed_2d];
        self.solution.append(fixed_3d, &plane_a);
        self.solution.append(fixed_2d, &plane_b);
        let line = self.solution.line;

        // Feasible interval on the fixed line, tracked as two optional
        // endpoints with the orientation of their bounding planes.
        let mut left: Option<usize> = None;
        let mut right: Option<usize> = None;
        let mut left_point = Point4::default();
        let mut right_point = Point4::default();
        let mut left_orient: i8 = 0;

        for pi in 0..n {
            let plane = self.planes[pi];

            if left.is_some() && right.is_some() {
                let c_left = classify_point(&left_point, &plane);
                let c_right = classify_point(&right_point, &plane);
                if c_left == 1 {
                    if c_right == 1 {
                        return LpState::Infeasible;
                    }
                    left = Some(pi);
                    left_point = line_plane(&line, &plane);
                    debug_assert!(left_orient == orientation(&line, &plane));
                } else if c_right == 1 {
                    right = Some(pi);
                    right_point = line_plane(&line, &plane);
                }
            } else if left.is_some() {
                let c = classify_point(&left_point, &plane);
                let o = orientation(&line, &plane);
                if o == 0 {
                    if c > 0 {
                        return LpState::Infeasible;
                    }
                } else if c == 1 {
                    if o == left_orient {
                        // Tighter bound on the same side.
                        left = Some(pi);
                        left_point = line_plane(&line, &plane);
                    } else {
                        return LpState::Infeasible;
                    }
                } else if o != left_orient {
                    right = Some(pi);
                    right_point = line_plane(&line, &plane);
                }
            } else {
                let o = orientation(&line, &plane);
                if o == 0 {
                    if classify_point(&any_point_on_line(&line), &plane) == 1 {
                        return LpState::Infeasible;
                    }
                } else {
                    left = Some(pi);
                    left_orient = o;
                    left_point = line_plane(&line, &plane);
                }
            }
        }

        if let Some(l) = left {
            let plane = self.planes[l];
            self.solution.append(l, &plane);
        }
        LpState::HasSolution
    }
}

/// Background oracle: spawn, poll without blocking, cancel.
pub struct SeidelOracle {
    handle: Option<JoinHandle<LpState>>,
    cancel: Arc<AtomicBool>,
    verdict: Option<LpState>,
}

impl SeidelOracle {
    /// Spawn a solver thread over its own copy of the plane list.
    pub fn spawn(planes: Vec<Plane>, seed: u64) -> Self {
        let mut solver = SeidelSolver::new(&planes, seed);
        let cancel = solver.cancel_handle();
        let handle = std::thread::spawn(move || {
            let state = solver.solve();
            tracing::debug!(?state, "seidel oracle finished");
            state
        });
        Self {
            handle: Some(handle),
            cancel,
            verdict: None,
        }
    }

    /// Non-blocking: the verdict once the solver thread has finished.
    /// The join handle is consumed exactly once; later polls return the
    /// cached verdict.
    pub fn poll(&mut self) -> Option<LpState> {
        if self.verdict.is_none() && self.handle.as_ref().is_some_and(|h| h.is_finished()) {
            let handle = self.handle.take().expect("oracle polled twice in one state");
            // A panicked solver must not claim infeasibility.
            self.verdict = Some(handle.join().unwrap_or(LpState::Ambiguous));
        }
        self.verdict
    }

    /// Ask the solver thread to stop at its next cancel poll.
    pub fn stop(&self) {
        self.cancel.store(true, Ordering::Relaxed);
    }
}

/// Synchronous feasibility check over the face planes of a mesh: false
/// iff the mesh kernel is certainly empty.
pub fn is_feasible(input: &InputMesh) -> bool {
    let planes: Vec<Plane> = face_planes(input, false, usize::MAX)
        .into_iter()
        .filter(|p| p.is_valid())
        .collect();

    let mut solver = SeidelSolver::new(&planes, DEFAULT_SEED);
    let start = Instant::now();
    let state = solver.solve();
    tracing::debug!(elapsed = ?start.elapsed(), ?state, "exact seidel feasibility");
    state != LpState::Infeasible
}
