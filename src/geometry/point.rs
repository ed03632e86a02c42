//! Homogeneous points.

use crate::math::{DPos3, Int192, Int256, Pos3};

/// Homogeneous point `(x, y, z, w)` meaning the Cartesian point
/// `(x/w, y/w, z/w)`.
///
/// The numerators use [`crate::math::BITS_DET_XXD`] bits, `w` uses
/// [`crate::math::BITS_DET_ABC`] bits, which is exactly what triple-plane
/// intersection produces. Equality is componentwise on the raw
/// representation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Point4 {
    pub x: Int256,
    pub y: Int256,
    pub z: Int256,
    pub w: Int192,
}

impl Point4 {
    pub fn is_valid(&self) -> bool {
        !self.w.is_zero()
    }

    /// Cartesian f64 value, one division per component.
    pub fn to_dpos(&self) -> DPos3 {
        debug_assert!(self.is_valid());
        let w = self.w.to_f64();
        DPos3::new(
            self.x.to_f64() / w,
            self.y.to_f64() / w,
            self.z.to_f64() / w,
        )
    }

    /// Cartesian f64 value with a single reciprocal of `w`.
    pub fn to_dpos_fast(&self) -> DPos3 {
        debug_assert!(self.is_valid());
        let iw = 1.0 / self.w.to_f64();
        DPos3::new(
            self.x.to_f64() * iw,
            self.y.to_f64() * iw,
            self.z.to_f64() * iw,
        )
    }
}

impl From<Pos3> for Point4 {
    fn from(p: Pos3) -> Self {
        Self {
            x: Int256::from(p.x as i64),
            y: Int256::from(p.y as i64),
            z: Int256::from(p.z as i64),
            w: Int192::from(1i64),
        }
    }
}
