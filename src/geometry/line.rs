//! Lines as the intersection of two planes.

use nalgebra::Vector3;

use crate::math::Int192;

/// Pluecker-style line built from the pairwise coefficient determinants
/// of two plane equations.
///
/// The direction coefficients (`ab_ba`, `bc_cb`, `ca_ac`) use
/// [`crate::math::BITS_LINE_DIR`] bits, the moment coefficients
/// [`crate::math::BITS_LINE_MOMENT`] bits.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Line {
    pub ab_ba: i128,
    pub bc_cb: i128,
    pub ca_ac: i128,
    pub ad_da: Int192,
    pub bd_db: Int192,
    pub cd_dc: Int192,
}

impl Line {
    /// The direction is the cross product of the two plane normals.
    pub fn direction(&self) -> Vector3<i128> {
        Vector3::new(self.bc_cb, self.ca_ac, self.ab_ba)
    }

    /// A line is valid iff its direction is non-zero.
    pub fn is_valid(&self) -> bool {
        self.ab_ba != 0 || self.bc_cb != 0 || self.ca_ac != 0
    }
}
