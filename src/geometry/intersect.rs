//! Exact intersections between planes and lines.

use crate::math::fixed::{wide_mul_128, wide_mul_128_64, wide_mul_192_64, wide_mul_64};

use super::line::Line;
use super::plane::Plane;
use super::point::Point4;

/// Intersection point of three planes by Cramer's rule.
///
/// The returned point is invalid (`w = 0`) iff the planes share a line or
/// a parallel direction. Numerators use `BITS_DET_XXD`, `w` uses
/// `BITS_DET_ABC` bits.
pub fn planes3(p: &Plane, q: &Plane, r: &Plane) -> Point4 {
    // 2x2 determinants of the first two rows, BITS_LINE_DIR and
    // BITS_LINE_MOMENT bits respectively.
    let det_ab = wide_mul_64(p.a, q.b) - wide_mul_64(p.b, q.a);
    let det_ac = wide_mul_64(p.a, q.c) - wide_mul_64(p.c, q.a);
    let det_bc = wide_mul_64(p.b, q.c) - wide_mul_64(p.c, q.b);
    let det_ad = wide_mul_128_64(q.d, p.a) - wide_mul_128_64(p.d, q.a);
    let det_bd = wide_mul_128_64(q.d, p.b) - wide_mul_128_64(p.d, q.b);
    let det_cd = wide_mul_128_64(q.d, p.c) - wide_mul_128_64(p.d, q.c);

    let det_abc = wide_mul_128_64(det_ab, r.c) - wide_mul_128_64(det_ac, r.b)
        + wide_mul_128_64(det_bc, r.a);

    let det_abd = (wide_mul_192_64(det_ad, r.b) - wide_mul_128(det_ab, r.d))
        - wide_mul_192_64(det_bd, r.a);

    let det_acd = (wide_mul_128(det_ac, r.d) - wide_mul_192_64(det_ad, r.c))
        + wide_mul_192_64(det_cd, r.a);

    let det_bcd = (wide_mul_192_64(det_bd, r.c) - wide_mul_192_64(det_cd, r.b))
        - wide_mul_128(det_bc, r.d);

    Point4 {
        x: det_bcd,
        y: det_acd,
        z: det_abd,
        w: det_abc,
    }
}

/// Intersection line of two planes.
///
/// Invalid (zero direction) iff the planes are parallel.
pub fn planes2(p0: &Plane, p1: &Plane) -> Line {
    Line {
        // Cross product of the normals.
        bc_cb: wide_mul_64(p0.b, p1.c) - wide_mul_64(p0.c, p1.b),
        ca_ac: wide_mul_64(p0.c, p1.a) - wide_mul_64(p0.a, p1.c),
        ab_ba: wide_mul_64(p0.a, p1.b) - wide_mul_64(p0.b, p1.a),

        ad_da: wide_mul_128_64(p1.d, p0.a) - wide_mul_128_64(p0.d, p1.a),
        bd_db: wide_mul_128_64(p1.d, p0.b) - wide_mul_128_64(p0.d, p1.b),
        cd_dc: wide_mul_128_64(p1.d, p0.c) - wide_mul_128_64(p0.d, p1.c),
    }
}

/// Intersection point of a line and a plane.
///
/// Invalid (`w = 0`) iff the line is parallel to the plane.
pub fn line_plane(l: &Line, p: &Plane) -> Point4 {
    let x = (wide_mul_192_64(l.bd_db, p.c) - wide_mul_192_64(l.cd_dc, p.b))
        - wide_mul_128(l.bc_cb, p.d);

    let y = (wide_mul_192_64(l.cd_dc, p.a) - wide_mul_192_64(l.ad_da, p.c))
        - wide_mul_128(l.ca_ac, p.d);

    let z = (wide_mul_192_64(l.ad_da, p.b) - wide_mul_192_64(l.bd_db, p.a))
        - wide_mul_128(l.ab_ba, p.d);

    let w = wide_mul_128_64(l.bc_cb, p.a)
        + wide_mul_128_64(l.ca_ac, p.b)
        + wide_mul_128_64(l.ab_ba, p.c);

    Point4 { x, y, z, w }
}
