use super::*;

#[test]
fn radians_converts_half_turn() {
    assert!((radians(180.0) - std::f64::consts::PI).abs() < 1e-12);
    assert_eq!(radians(0.0), 0.0);
    assert!((radians(-90.0) + std::f64::consts::FRAC_PI_2).abs() < 1e-12);
}

#[test]
fn tokens_fold_case_and_dashes() {
    assert_eq!(normalize_token(" Even-Odd "), "even_odd");
    assert_eq!(normalize_token("round"), "round");
}

#[test]
fn quadratic_elevation_matches_closed_form() {
    let (c1, c2) = quad_to_cubic(
        Point::new(0.0, 0.0),
        Point::new(10.0, 0.0),
        Point::new(10.0, 10.0),
    );
    assert!((c1.x - 20.0 / 3.0).abs() < 1e-9);
    assert!(c1.y.abs() < 1e-9);
    assert!((c2.x - 10.0).abs() < 1e-9);
    assert!((c2.y - 10.0 / 3.0).abs() < 1e-9);
}
