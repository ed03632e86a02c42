//! Oriented planes with integer coefficients.

use crate::math::{gcd, DPos3, DVec3, IVec3, Pos3, BITS_NORMAL};

/// A plane given by its equation `a*x + b*y + c*z + d = 0`.
///
/// The normal `(a, b, c)` carries at most [`BITS_NORMAL`] bits per
/// component, `d` at most [`crate::math::BITS_PLANE_D`] bits. The
/// positive side is the side the normal points into.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Plane {
    pub a: i64,
    pub b: i64,
    pub c: i64,
    pub d: i128,
}

impl Plane {
    pub fn new(a: i64, b: i64, c: i64, d: i128) -> Self {
        Self { a, b, c, d }
    }

    pub fn normal(&self) -> IVec3 {
        IVec3::new(self.a, self.b, self.c)
    }

    /// A plane is valid iff its normal is non-zero.
    pub fn is_valid(&self) -> bool {
        self.a != 0 || self.b != 0 || self.c != 0
    }

    /// Same plane with the opposite orientation.
    pub fn inverted(&self) -> Self {
        Self::new(-self.a, -self.b, -self.c, -self.d)
    }

    /// Shift the plane by `v` (output width stays within `d`'s budget).
    pub fn translate(&mut self, v: IVec3) {
        self.d -= self.a as i128 * v.x as i128;
        self.d -= self.b as i128 * v.y as i128;
        self.d -= self.c as i128 * v.z as i128;
    }

    /// Plane through `p` with normal `n`; `d = -dot(n, p)` in `d` width.
    pub fn from_point_normal(p: Pos3, n: IVec3) -> Self {
        debug_assert!(n.x.unsigned_abs() <= 1 << BITS_NORMAL);
        debug_assert!(n.y.unsigned_abs() <= 1 << BITS_NORMAL);
        debug_assert!(n.z.unsigned_abs() <= 1 << BITS_NORMAL);
        let d = -(n.x as i128 * p.x as i128)
            - (n.y as i128 * p.y as i128)
            - (n.z as i128 * p.z as i128);
        Self::new(n.x, n.y, n.z, d)
    }

    /// Supporting plane of the triangle `(p0, p1, p2)` with the normal
    /// reduced by the gcd of its components. Invalid if collinear.
    pub fn from_points(p0: Pos3, p1: Pos3, p2: Pos3) -> Self {
        let mut n = triangle_normal(p0, p1, p2);
        if n == IVec3::zeros() {
            return Self::default();
        }
        let f = gcd(gcd(n.x.abs(), n.y.abs()), n.z.abs());
        if f > 1 {
            n /= f;
        }
        Self::from_point_normal(p0, n)
    }

    /// Supporting plane of the triangle without gcd reduction.
    pub fn from_points_raw(p0: Pos3, p1: Pos3, p2: Pos3) -> Self {
        let n = triangle_normal(p0, p1, p2);
        if n == IVec3::zeros() {
            return Self::default();
        }
        Self::from_point_normal(p0, n)
    }

    /// Lossy unit-normal mirror for the floating-point descent walk.
    pub fn to_dplane(&self) -> DPlane {
        let n = DVec3::new(self.a as f64, self.b as f64, self.c as f64);
        let il = 1.0 / n.norm();
        DPlane {
            normal: n * il,
            dis: -(self.d as f64) * il,
        }
    }
}

/// Cross product of the triangle edges, widened to normal width.
fn triangle_normal(p0: Pos3, p1: Pos3, p2: Pos3) -> IVec3 {
    let u = IVec3::new(
        (p1.x - p0.x) as i64,
        (p1.y - p0.y) as i64,
        (p1.z - p0.z) as i64,
    );
    let v = IVec3::new(
        (p2.x - p0.x) as i64,
        (p2.y - p0.y) as i64,
        (p2.z - p0.z) as i64,
    );
    u.cross(&v)
}

/// `dot(normal, point) + d`, exact in `d` width.
pub fn signed_distance(plane: &Plane, p: Pos3) -> i128 {
    plane.a as i128 * p.x as i128
        + plane.b as i128 * p.y as i128
        + plane.c as i128 * p.z as i128
        + plane.d
}

/// Unit-normal plane in f64, `dot(normal, x) = dis` on the plane.
#[derive(Clone, Copy, Debug)]
pub struct DPlane {
    pub normal: DVec3,
    pub dis: f64,
}

impl DPlane {
    #[inline]
    pub fn signed_distance(&self, p: DPos3) -> f64 {
        self.normal.dot(&p.coords) - self.dis
    }
}
