//! Exact sign predicates on planes, lines and points.

use crate::math::fixed::{
    wide_mul_128_64, wide_mul_192_128, wide_mul_256_64, wide_mul_64, Int192, Int256,
};
use crate::math::{Aabb, Pos3, BITS_POSITION};

use super::line::Line;
use super::plane::{signed_distance, Plane};
use super::point::Point4;

/// Classify a homogeneous point against a plane.
///
/// Returns `sign(a*x + b*y + c*z + d*w) * sign(w)`: -1 on the negative
/// side, 0 on the plane, +1 on the positive side. The accumulator needs
/// `BITS_DET_XXD + BITS_NORMAL + 2` bits (253).
pub fn classify_point(p: &Point4, s: &Plane) -> i8 {
    let d = (wide_mul_256_64(p.x, s.a) + wide_mul_256_64(p.y, s.b))
        + (wide_mul_256_64(p.z, s.c) + wide_mul_192_128(p.w, s.d));
    d.signum() * p.w.signum()
}

/// Classify an integer position against a plane.
pub fn classify_pos(p: Pos3, s: &Plane) -> i8 {
    signed_distance(s, p).signum() as i8
}

/// Classify a bounding box against a plane.
///
/// +1: entirely on the positive side, -1: entirely on the negative side,
/// 0: may straddle. Uses the doubled center/half-extent formulation so the
/// accumulator stays within `1 + BITS_PLANE_D` bits.
pub fn classify_aabb(bb: &Aabb, pl: &Plane) -> i8 {
    debug_assert!((0..3).all(|d| (bb.min[d] as i64).unsigned_abs() <= 1 << BITS_POSITION));
    debug_assert!((0..3).all(|d| (bb.max[d] as i64).unsigned_abs() <= 1 << BITS_POSITION));

    // All coordinates are doubled so the center stays integral.
    let cx = bb.min.x as i128 + bb.max.x as i128;
    let cy = bb.min.y as i128 + bb.max.y as i128;
    let cz = bb.min.z as i128 + bb.max.z as i128;
    let sx = (bb.max.x - bb.min.x) as i128;
    let sy = (bb.max.y - bb.min.y) as i128;
    let sz = (bb.max.z - bb.min.z) as i128;

    let mut d = pl.d << 1;
    d += cx * pl.a as i128;
    d += cy * pl.b as i128;
    d += cz * pl.c as i128;

    let hn = sx * pl.a.abs() as i128 + sy * pl.b.abs() as i128 + sz * pl.c.abs() as i128;

    if hn + d < 0 {
        return -1;
    }
    if hn - d < 0 {
        return 1;
    }
    0
}

/// True if the two planes have parallel normals (any orientation).
pub fn are_parallel(p0: &Plane, p1: &Plane) -> bool {
    // Cross product, 2 * BITS_NORMAL + 1 bits per component.
    let cx = wide_mul_64(p0.b, p1.c) - wide_mul_64(p0.c, p1.b);
    let cy = wide_mul_64(p0.c, p1.a) - wide_mul_64(p0.a, p1.c);
    let cz = wide_mul_64(p0.a, p1.b) - wide_mul_64(p0.b, p1.a);
    cx == 0 && cy == 0 && cz == 0
}

/// True if the line direction is perpendicular to the plane normal.
pub fn are_parallel_line(plane: &Plane, line: &Line) -> bool {
    // dot(normal, direction), BITS_NORMAL + BITS_LINE_DIR + 2 bits.
    let dot = wide_mul_128_64(line.bc_cb, plane.a)
        + wide_mul_128_64(line.ca_ac, plane.b)
        + wide_mul_128_64(line.ab_ba, plane.c);
    dot.is_zero()
}

/// Sign of `dot(line direction, plane normal)`: +1 aligned, -1 opposed,
/// 0 parallel to the plane.
pub fn orientation(line: &Line, plane: &Plane) -> i8 {
    let dot = wide_mul_128_64(line.bc_cb, plane.a)
        + wide_mul_128_64(line.ca_ac, plane.b)
        + wide_mul_128_64(line.ab_ba, plane.c);
    dot.signum()
}

/// Some valid point on the plane: its intersection with the first
/// coordinate axis whose normal coefficient is non-zero.
pub fn any_point_on_plane(plane: &Plane) -> Point4 {
    debug_assert!(plane.is_valid());
    if plane.a != 0 {
        Point4 {
            x: Int256::from(-plane.d),
            y: Int256::ZERO,
            z: Int256::ZERO,
            w: Int192::from(plane.a),
        }
    } else if plane.b != 0 {
        Point4 {
            x: Int256::ZERO,
            y: Int256::from(-plane.d),
            z: Int256::ZERO,
            w: Int192::from(plane.b),
        }
    } else {
        Point4 {
            x: Int256::ZERO,
            y: Int256::ZERO,
            z: Int256::from(-plane.d),
            w: Int192::from(plane.c),
        }
    }
}

/// Some valid point on the line: its intersection with the first
/// coordinate plane its direction crosses.
pub fn any_point_on_line(line: &Line) -> Point4 {
    debug_assert!(line.is_valid());
    if line.ab_ba != 0 {
        // z = 0
        Point4 {
            x: Int256::from(line.bd_db),
            y: Int256::from(-line.ad_da),
            z: Int256::ZERO,
            w: Int192::from(line.ab_ba),
        }
    } else if line.ca_ac != 0 {
        // y = 0
        Point4 {
            x: Int256::from(-line.cd_dc),
            y: Int256::ZERO,
            z: Int256::from(line.ad_da),
            w: Int192::from(line.ca_ac),
        }
    } else {
        // x = 0
        Point4 {
            x: Int256::ZERO,
            y: Int256::from(line.cd_dc),
            z: Int256::from(-line.bd_db),
            w: Int192::from(line.bc_cb),
        }
    }
}
