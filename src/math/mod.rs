//! Scalar type aliases and the fixed bit-width policy.
//!
//! All exact geometry runs on signed integers whose widths are chosen
//! statically from the coordinate and normal budgets below. Positions are
//! 26-bit integers stored in `i32`, face-normal components are 55-bit
//! integers stored in `i64`; every derived width is a stated function of
//! these two.

pub mod fixed;

pub use fixed::{Int192, Int256};

/// Integer vertex position (each component within ±2^[`BITS_POSITION`]).
pub type Pos3 = nalgebra::Point3<i32>;
/// Integer displacement in position space, widened for differences.
pub type IVec3 = nalgebra::Vector3<i64>;
/// Double-precision mirror position used by the approximate descent walk.
pub type DPos3 = nalgebra::Point3<f64>;
/// Double-precision direction.
pub type DVec3 = nalgebra::Vector3<f64>;

/// Bit budget of input vertex coordinates.
pub const BITS_POSITION: u32 = 26;
/// Bit budget of plane normal components.
pub const BITS_NORMAL: u32 = 55;
/// Plane `d`: dot of a normal and a position plus two carry bits (83).
pub const BITS_PLANE_D: u32 = BITS_POSITION + BITS_NORMAL + 2;
/// Line direction coefficients: a 2x2 normal determinant (111).
pub const BITS_LINE_DIR: u32 = 2 * BITS_NORMAL + 1;
/// Line moment coefficients: normal times plane `d` plus carry (139).
pub const BITS_LINE_MOMENT: u32 = BITS_NORMAL + BITS_PLANE_D + 1;
/// Homogeneous `w`: the 3x3 normal determinant (168).
pub const BITS_DET_ABC: u32 = 3 * BITS_NORMAL + 3;
/// Homogeneous `x,y,z`: determinants mixing two normals and one `d` (196).
pub const BITS_DET_XXD: u32 = 2 * BITS_NORMAL + BITS_PLANE_D + 3;

/// Largest admissible coordinate magnitude, `2^BITS_POSITION`.
pub const MAX_COORD: i64 = 1 << BITS_POSITION;

/// Axis-aligned integer bounding box.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Aabb {
    pub min: Pos3,
    pub max: Pos3,
}

impl Aabb {
    pub fn new(min: Pos3, max: Pos3) -> Self {
        Self { min, max }
    }

    /// Smallest box containing all `positions`. Panics on an empty slice.
    pub fn of_points<'a>(positions: impl IntoIterator<Item = &'a Pos3>) -> Self {
        let mut it = positions.into_iter();
        let first = *it.next().expect("aabb of empty point set");
        let mut aabb = Aabb::new(first, first);
        for p in it {
            for d in 0..3 {
                let lo = aabb.min[d].min(p[d]);
                let hi = aabb.max[d].max(p[d]);
                aabb.min[d] = lo;
                aabb.max[d] = hi;
            }
        }
        aabb
    }
}

/// Greatest common divisor of two non-negative `i64` values.
pub fn gcd(mut a: i64, mut b: i64) -> i64 {
    debug_assert!(a >= 0 && b >= 0);
    while b != 0 {
        let t = a % b;
        a = b;
        b = t;
    }
    a
}
