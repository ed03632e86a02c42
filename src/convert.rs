//! Conversions between floating-point data and the integer coordinate
//! budget.
//!
//! Callers scale and center their data before entry; the helpers here
//! derive a scale factor that lands the largest coordinate just below the
//! position bit budget and quantize positions under it.

use crate::geometry::Point4;
use crate::math::{DPos3, Pos3, MAX_COORD};

/// Margin kept below the largest representable coordinate.
const SCALE_MARGIN: i64 = 5;

/// Scale factor mapping the largest input coordinate magnitude just
/// below `2^BITS_POSITION`.
pub fn scale_factor(points: &[DPos3]) -> f64 {
    let mut largest = 0.0f64;
    for p in points {
        for d in 0..3 {
            largest = largest.max(p[d].abs());
        }
    }
    if largest == 0.0 {
        return 1.0;
    }
    (MAX_COORD - SCALE_MARGIN) as f64 / largest
}

/// Quantize scaled positions into the integer budget.
pub fn quantize(points: &[DPos3], factor: f64) -> Vec<Pos3> {
    points
        .iter()
        .map(|p| {
            let q = Pos3::new(
                (p.x * factor) as i32,
                (p.y * factor) as i32,
                (p.z * factor) as i32,
            );
            debug_assert!((0..3).all(|d| (q[d] as i64).abs() <= MAX_COORD));
            q
        })
        .collect()
}

/// F64 mirror of exact homogeneous positions, one reciprocal of `w` per
/// vertex. Invalid points map to the origin.
pub fn to_f64_positions(points: &[Point4]) -> Vec<DPos3> {
    points
        .iter()
        .map(|p| {
            if p.is_valid() {
                p.to_dpos_fast()
            } else {
                DPos3::origin()
            }
        })
        .collect()
}
