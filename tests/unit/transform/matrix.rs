use super::*;

fn sample_transforms() -> Vec<Mat3> {
    vec![
        Mat3::IDENTITY,
        Mat3::translation(12.5, -3.0),
        Mat3::scale(2.0, 0.5) * Mat3::translation(-4.0, 9.0),
        Mat3([0.98, -0.17, 31.0, 0.17, 0.98, -2.5, 0.0, 0.0, 1.0]),
        Mat3::rotation_90() * Mat3::translation(100.0, 0.0),
    ]
}

#[test]
fn identity_is_neutral_on_both_sides() {
    for t in sample_transforms() {
        assert!((t * Mat3::IDENTITY).approx_eq(&t, 1e-12));
        assert!((Mat3::IDENTITY * t).approx_eq(&t, 1e-12));
    }
}

#[test]
fn inverse_roundtrips_to_identity() {
    for t in sample_transforms() {
        let inv = t.invert_affine().unwrap();
        assert!((t * inv).approx_eq(&Mat3::IDENTITY, 1e-9), "{t:?}");
        assert!((inv * t).approx_eq(&Mat3::IDENTITY, 1e-9), "{t:?}");
    }
}

#[test]
fn singular_matrix_fails_loudly() {
    let singular = Mat3([1.0, 2.0, 5.0, 2.0, 4.0, 1.0, 0.0, 0.0, 1.0]);
    let err = singular.invert_affine().unwrap_err();
    assert!(err.to_string().contains("not invertible"));
    assert!(Mat3::scale(0.0, 1.0).invert_affine().is_err());
}

#[test]
fn multiplication_is_order_sensitive() {
    let a = Mat3::translation(10.0, 0.0);
    let b = Mat3::scale(2.0, 2.0);
    assert_eq!((a * b).transform_point(1.0, 1.0), (12.0, 2.0));
    assert_eq!((b * a).transform_point(1.0, 1.0), (22.0, 2.0));
}

#[test]
fn gl4x4_places_translation_in_column_three() {
    let m = Mat3([1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 0.0, 0.0, 1.0]);
    let g = m.to_gl4x4().0;
    assert_eq!(&g[0..4], &[1.0, 4.0, 0.0, 0.0]);
    assert_eq!(&g[4..8], &[2.0, 5.0, 0.0, 0.0]);
    assert_eq!(&g[8..12], &[0.0, 0.0, 1.0, 0.0]);
    assert_eq!(&g[12..16], &[3.0, 6.0, 0.0, 1.0]);
    assert_eq!(Mat3::IDENTITY.to_gl4x4(), Gl4x4::IDENTITY);
}

#[test]
fn kurbo_bridge_agrees_with_point_mapping() {
    for t in sample_transforms() {
        let p = t.to_affine() * kurbo::Point::new(3.0, -7.0);
        let (x, y) = t.transform_point(3.0, -7.0);
        assert!((p.x - x).abs() < 1e-9 && (p.y - y).abs() < 1e-9);
        assert!(Mat3::from_affine(t.to_affine()).approx_eq(&t, 1e-12));

        let g = t.to_gl4x4().to_affine() * kurbo::Point::new(3.0, -7.0);
        assert!((g.x - x).abs() < 1e-3 && (g.y - y).abs() < 1e-3);
    }
}
