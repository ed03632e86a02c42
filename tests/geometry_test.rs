use polykern::geometry::{
    any_point_on_line, any_point_on_plane, are_parallel, are_parallel_line, classify_aabb,
    classify_point, classify_pos, line_plane, orientation, planes2, planes3, signed_distance,
    Plane, Point4,
};
use polykern::math::{Aabb, Pos3};

#[test]
fn signed_distance_zero_iff_classify_zero() {
    let plane = Plane::from_points(
        Pos3::new(0, 0, 5),
        Pos3::new(10, 0, 5),
        Pos3::new(0, 10, 5),
    );
    let on = Pos3::new(3, -7, 5);
    let above = Pos3::new(3, -7, 6);
    let below = Pos3::new(3, -7, -4);

    for p in [on, above, below] {
        let sd = signed_distance(&plane, p);
        let c = classify_pos(p, &plane);
        assert_eq!(sd == 0, c == 0, "distance {sd} vs class {c}");
        assert_eq!(sd.signum() as i8, c);

        let hom = Point4::from(p);
        assert_eq!(classify_point(&hom, &plane), c);
    }
}

#[test]
fn classification_respects_homogeneous_scaling() {
    // The same point constructed with positive and negative w (swapping
    // two planes flips the determinant sign) classifies identically.
    let plane = Plane::new(1, 0, 0, -2);
    let p = Point4::from(Pos3::new(1, 2, 3));
    let px = Plane::new(1, 0, 0, -1);
    let py = Plane::new(0, 1, 0, -2);
    let pz = Plane::new(0, 0, 1, -3);

    let q = planes3(&px, &py, &pz);
    let q_flipped = planes3(&py, &px, &pz);
    assert!(q.is_valid() && q_flipped.is_valid());
    assert_eq!(q.w.signum(), -q_flipped.w.signum());

    for hom in [&q, &q_flipped] {
        assert_eq!(classify_point(hom, &plane), classify_point(&p, &plane));
    }
    assert_eq!(classify_point(&p, &plane), -1);
}

#[test]
fn triple_plane_intersection_substitutes_to_zero() {
    let p = Plane::from_points(Pos3::new(0, 0, 0), Pos3::new(7, 1, 0), Pos3::new(0, 3, 11));
    let q = Plane::from_points(Pos3::new(5, 0, 2), Pos3::new(5, 9, 2), Pos3::new(-3, 0, 8));
    let r = Plane::from_points(Pos3::new(1, 1, 1), Pos3::new(4, 1, 9), Pos3::new(1, 8, 2));
    assert!(p.is_valid() && q.is_valid() && r.is_valid());

    let x = planes3(&p, &q, &r);
    assert!(x.is_valid(), "three generic planes must meet in a point");
    for plane in [&p, &q, &r] {
        assert_eq!(classify_point(&x, plane), 0, "intersection point off {plane:?}");
    }
}

#[test]
fn coincident_planes_have_no_unique_intersection() {
    let p = Plane::new(1, 0, 0, -1);
    let q = Plane::new(0, 1, 0, -1);
    let r = Plane::new(2, 0, 0, -2); // parallel to p
    let x = planes3(&p, &q, &r);
    assert!(!x.is_valid());
}

#[test]
fn plane_pair_line_carries_points_of_both() {
    let p = Plane::new(3, -1, 2, -6);
    let q = Plane::new(0, 4, 1, -8);
    let line = planes2(&p, &q);
    assert!(line.is_valid());

    let sample = any_point_on_line(&line);
    assert!(sample.is_valid());
    assert_eq!(classify_point(&sample, &p), 0);
    assert_eq!(classify_point(&sample, &q), 0);

    // A third generic plane meets the line where all three planes meet.
    let r = Plane::new(1, 1, 3, -5);
    let x = line_plane(&line, &r);
    assert!(x.is_valid());
    for plane in [&p, &q, &r] {
        assert_eq!(classify_point(&x, plane), 0);
    }
    assert_eq!(x, planes3(&p, &q, &r));
}

#[test]
fn line_parallel_to_plane_has_invalid_intersection() {
    // Line along z (x = 1, y = 1) against a z-normal plane's sibling.
    let line = planes2(&Plane::new(1, 0, 0, -1), &Plane::new(0, 1, 0, -1));
    let vertical = Plane::new(1, 1, 0, -5);
    assert!(are_parallel_line(&vertical, &line));
    assert!(!line_plane(&line, &vertical).is_valid());
    assert_eq!(orientation(&line, &vertical), 0);

    let tilted = Plane::new(0, 0, 2, -3);
    assert!(!are_parallel_line(&tilted, &line));
    assert_ne!(orientation(&line, &tilted), 0);
}

#[test]
fn parallel_planes() {
    let p = Plane::new(2, -4, 6, 0);
    let q = Plane::new(-1, 2, -3, 55);
    let r = Plane::new(2, -4, 5, 0);
    assert!(are_parallel(&p, &q));
    assert!(!are_parallel(&p, &r));
}

#[test]
fn any_point_lies_on_its_plane() {
    for plane in [
        Plane::new(5, 0, 0, -15),
        Plane::new(0, -2, 0, 7),
        Plane::new(0, 0, 9, 4),
        Plane::new(3, 2, 1, -9),
    ] {
        let p = any_point_on_plane(&plane);
        assert!(p.is_valid());
        assert_eq!(classify_point(&p, &plane), 0);
    }
}

#[test]
fn aabb_classification_sides() {
    let bb = Aabb::new(Pos3::new(-10, -10, -10), Pos3::new(10, 10, 10));
    // x <= 20 contains the whole box.
    assert_eq!(classify_aabb(&bb, &Plane::new(1, 0, 0, -20)), -1);
    // x <= -20 puts the box entirely on the positive side.
    assert_eq!(classify_aabb(&bb, &Plane::new(1, 0, 0, 20)), 1);
    // x <= 0 straddles.
    assert_eq!(classify_aabb(&bb, &Plane::new(1, 0, 0, 0)), 0);
    // Touching the face exactly still reports straddling.
    assert_eq!(classify_aabb(&bb, &Plane::new(1, 0, 0, -10)), 0);
}

#[test]
fn face_planes_reduce_by_gcd() {
    let p = Plane::from_points(
        Pos3::new(0, 0, 0),
        Pos3::new(200, 0, 0),
        Pos3::new(0, 200, 0),
    );
    assert_eq!((p.a, p.b, p.c), (0, 0, 1));
    assert_eq!(p.d, 0);

    let raw = Plane::from_points_raw(
        Pos3::new(0, 0, 0),
        Pos3::new(200, 0, 0),
        Pos3::new(0, 200, 0),
    );
    assert_eq!((raw.a, raw.b, raw.c), (0, 0, 40000));
    assert!(are_parallel(&p, &raw));
}

#[test]
fn collinear_points_give_invalid_plane() {
    let p = Plane::from_points(Pos3::new(0, 0, 0), Pos3::new(5, 5, 5), Pos3::new(10, 10, 10));
    assert!(!p.is_valid());
    let raw =
        Plane::from_points_raw(Pos3::new(1, 2, 3), Pos3::new(1, 2, 3), Pos3::new(4, 5, 6));
    assert!(!raw.is_valid());
}

#[test]
fn plane_orientation_helpers() {
    let plane = Plane::from_points(Pos3::new(0, 0, 2), Pos3::new(4, 0, 2), Pos3::new(0, 4, 2));
    let inv = plane.inverted();
    let p = Pos3::new(1, 1, 7);
    assert_eq!(classify_pos(p, &plane), -classify_pos(p, &inv));

    let mut shifted = plane;
    shifted.translate(polykern::math::IVec3::new(0, 0, 3));
    assert_eq!(classify_pos(Pos3::new(1, 1, 5), &shifted), 0);
}
