mod common;

use common::{EPS, rand_vec};
use fastrand::Rng;
use skinned_mesh_collision::{
    glam::Vec3A,
    skinned::geometry::{
        CheckTriangle, FALLBACK_NORMAL, check_sphere_sphere, check_sphere_triangle,
    },
};

const CENTROID: Vec3A = Vec3A::new(1.0 / 3.0, 1.0 / 3.0, 0.0);

fn unit_triangle(margin: f32, penetration: f32) -> CheckTriangle {
    CheckTriangle::new(Vec3A::ZERO, Vec3A::X, Vec3A::Y, margin, penetration)
}

#[test]
fn sphere_sphere_depth_and_normal() {
    let mut rng = Rng::with_seed(0);
    let mut hits = 0;

    for _ in 0..1000 {
        let pos_a = rand_vec(&mut rng, -2.0, 2.0);
        let pos_b = rand_vec(&mut rng, -2.0, 2.0);
        let radius_a = 0.1 + rng.f32() * 1.9;
        let radius_b = 0.1 + rng.f32() * 1.9;

        let dist = pos_a.distance(pos_b);
        let res = check_sphere_sphere(pos_a, pos_b, radius_a, radius_b);
        if dist >= radius_a + radius_b {
            assert!(res.is_none());
            continue;
        }

        let res = res.unwrap();
        hits += 1;

        assert!((res.depth - (dist - (radius_a + radius_b))).abs() < EPS);
        assert!(res.depth < 0.0);
        assert!((res.normal_on_b.length() - 1.0).abs() < EPS);
        assert!(res.normal_on_b.dot(pos_b - pos_a) > 0.0);
        assert!(
            res.pos_a
                .abs_diff_eq(pos_a + res.normal_on_b * radius_a, EPS)
        );
        assert!(
            res.pos_b
                .abs_diff_eq(pos_b - res.normal_on_b * radius_b, EPS)
        );
    }

    assert!(hits > 100);
}

#[test]
fn sphere_sphere_touching_is_no_contact() {
    assert!(check_sphere_sphere(Vec3A::ZERO, Vec3A::new(0.0, 0.0, 2.0), 1.0, 1.0).is_none());
    assert!(check_sphere_sphere(Vec3A::ZERO, Vec3A::new(0.0, 0.0, 3.0), 1.0, 1.0).is_none());
}

#[test]
fn sphere_sphere_coincident_centers() {
    let center = Vec3A::new(1.0, 2.0, 3.0);
    let res = check_sphere_sphere(center, center, 1.0, 0.5).unwrap();

    assert_eq!(res.normal_on_b, FALLBACK_NORMAL);
    assert!((res.depth + 1.5).abs() < EPS);
    assert!(res.pos_a.is_finite() && res.pos_b.is_finite());
}

#[test]
fn sphere_triangle_face_contact() {
    let tri = unit_triangle(0.0, 1.0);
    assert!(tri.valid);
    assert!(tri.normal.abs_diff_eq(Vec3A::Z, EPS));

    let pos = CENTROID + Vec3A::Z * 0.5;
    let res = check_sphere_triangle(pos, 1.0, &tri).unwrap();

    assert!((res.depth + 0.5).abs() < EPS);
    assert!(res.normal_on_b.abs_diff_eq(-Vec3A::Z, EPS));
    assert!(res.pos_b.abs_diff_eq(CENTROID, EPS));
    assert!(res.pos_a.abs_diff_eq(pos - Vec3A::Z, EPS));
}

#[test]
fn sphere_triangle_margin_adds_thickness() {
    let tri = unit_triangle(0.25, 1.0);
    let pos = CENTROID + Vec3A::Z * 0.5;
    let res = check_sphere_triangle(pos, 1.0, &tri).unwrap();

    assert!((res.depth + 0.75).abs() < EPS);
    assert!(res.pos_b.abs_diff_eq(CENTROID + Vec3A::Z * 0.25, EPS));
}

#[test]
fn sphere_triangle_edge_region() {
    let tri = unit_triangle(0.0, 1.0);

    // Closest feature is the vertex at the origin
    let pos = Vec3A::new(-0.3, -0.4, 0.0);
    let res = check_sphere_triangle(pos, 1.0, &tri).unwrap();
    assert!(res.pos_b.abs_diff_eq(Vec3A::ZERO, EPS));
    assert!((res.depth + 0.5).abs() < EPS);

    let far = Vec3A::new(2.0, 2.0, 0.1);
    assert!(check_sphere_triangle(far, 0.5, &tri).is_none());
}

#[test]
fn degenerate_triangle_never_collides() {
    let tri = CheckTriangle::new(Vec3A::ZERO, Vec3A::X, Vec3A::X * 2.0, 1.0, 0.0);
    assert!(!tri.valid);

    for pos in [Vec3A::ZERO, Vec3A::X, Vec3A::new(1.0, 0.1, 0.0)] {
        assert!(check_sphere_triangle(pos, 10.0, &tri).is_none());
    }

    let point = CheckTriangle::new(Vec3A::ONE, Vec3A::ONE, Vec3A::ONE, 1.0, 1.0);
    assert!(!point.valid);
    assert!(check_sphere_triangle(Vec3A::ONE, 1.0, &point).is_none());
}

#[test]
fn one_sided_triangle_penetration_band() {
    let tri = unit_triangle(0.0, 1.0);

    let behind = CENTROID - Vec3A::Z * 0.5;
    let res = check_sphere_triangle(behind, 1.0, &tri).unwrap();
    assert!((res.depth + 1.5).abs() < EPS);
    assert!(res.normal_on_b.abs_diff_eq(-Vec3A::Z, EPS));

    let too_deep = CENTROID - Vec3A::Z * 1.5;
    assert!(check_sphere_triangle(too_deep, 1.0, &tri).is_none());
}

#[test]
fn double_sided_triangle_flips_toward_sphere() {
    let tri = unit_triangle(0.0, 0.0);
    assert_eq!(tri.penetration, 0.0);

    let behind = CENTROID - Vec3A::Z * 0.5;
    let res = check_sphere_triangle(behind, 1.0, &tri).unwrap();
    assert!((res.depth + 0.5).abs() < EPS);
    assert!(res.normal_on_b.abs_diff_eq(Vec3A::Z, EPS));
}

#[test]
fn negative_penetration_inverts_face() {
    let tri = unit_triangle(0.0, -1.0);
    assert!(tri.normal.abs_diff_eq(-Vec3A::Z, EPS));
    assert_eq!(tri.penetration, 1.0);

    let below = CENTROID - Vec3A::Z * 0.5;
    let res = check_sphere_triangle(below, 1.0, &tri).unwrap();
    assert!((res.depth + 0.5).abs() < EPS);
    assert!(res.normal_on_b.abs_diff_eq(Vec3A::Z, EPS));
}

#[test]
fn swapped_result_mirrors_fields() {
    let tri = unit_triangle(0.1, 1.0);
    let mut rng = Rng::with_seed(7);

    for _ in 0..200 {
        let pos = rand_vec(&mut rng, -0.5, 1.5);
        let Some(res) = check_sphere_triangle(pos, 0.6, &tri) else {
            continue;
        };

        let swapped = res.swapped();
        assert_eq!(swapped.pos_a, res.pos_b);
        assert_eq!(swapped.pos_b, res.pos_a);
        assert_eq!(swapped.normal_on_b, -res.normal_on_b);
        assert_eq!(swapped.depth, res.depth);
        assert_eq!(swapped.swapped(), res);
    }
}
