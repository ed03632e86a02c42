use approx::assert_relative_eq;

use polykern::convert::{quantize, scale_factor, to_f64_positions};
use polykern::geometry::{planes3, Plane, Point4};
use polykern::math::{DPos3, Pos3, MAX_COORD};

#[test]
fn scale_factor_lands_below_the_coordinate_budget() {
    let points = vec![
        DPos3::new(0.25, -1.5, 0.75),
        DPos3::new(-2.0, 0.5, 1.0),
        DPos3::new(0.0, 0.0, 0.0),
    ];
    let factor = scale_factor(&points);
    let quantized = quantize(&points, factor);

    let largest = quantized
        .iter()
        .flat_map(|p| (0..3).map(move |d| (p[d] as i64).abs()))
        .max()
        .unwrap();
    assert!(largest <= MAX_COORD);
    // The data should actually use the budget, not hide in a corner.
    assert!(largest > MAX_COORD / 2, "scale too conservative: {largest}");
}

#[test]
fn scale_factor_of_degenerate_input_is_neutral() {
    let origin_only = vec![DPos3::new(0.0, 0.0, 0.0)];
    assert_relative_eq!(scale_factor(&origin_only), 1.0);
}

#[test]
fn quantize_preserves_ratios() {
    let points = vec![DPos3::new(1.0, 2.0, 4.0), DPos3::new(-1.0, 0.0, 2.0)];
    let q = quantize(&points, 1000.0);
    assert_eq!(q[0], Pos3::new(1000, 2000, 4000));
    assert_eq!(q[1], Pos3::new(-1000, 0, 2000));
}

#[test]
fn f64_mirror_divides_by_w() {
    // The intersection of x = 1, y = 2, z = 3 in homogeneous form.
    let point = planes3(
        &Plane::new(1, 0, 0, -1),
        &Plane::new(0, 1, 0, -2),
        &Plane::new(0, 0, 1, -3),
    );
    let invalid = Point4::default();

    let mirror = to_f64_positions(&[point, invalid]);
    assert_relative_eq!(mirror[0].x, 1.0);
    assert_relative_eq!(mirror[0].y, 2.0);
    assert_relative_eq!(mirror[0].z, 3.0);
    // Invalid points map to the origin instead of dividing by zero.
    assert_relative_eq!(mirror[1].coords.norm(), 0.0);
}
