use super::*;
use serde_json::json;

#[test]
fn parses_hex_forms() {
    assert_eq!(Color::parse("#ff0000"), Some(Color::rgb(255, 0, 0)));
    assert_eq!(Color::parse("#0f0"), Some(Color::rgb(0, 255, 0)));

    let c = Color::parse("#0000ff80").unwrap();
    assert_eq!((c.r, c.g, c.b), (0, 0, 255));
    assert!((c.a - (128.0 / 255.0)).abs() < 1e-9);

    assert_eq!(Color::parse("#FFF"), Some(Color::rgb(255, 255, 255)));
    assert_eq!(Color::parse("#f008"), Some(Color::rgba(255, 0, 0, 136.0 / 255.0)));
    assert_eq!(Color::parse("#fff0").map(|c| c.a), Some(0.0));

    assert!(Color::parse("#12345").is_none());
    assert!(Color::parse("#ff00zz").is_none());
    assert!(Color::parse("#ff0000z0").is_none());
    assert!(Color::parse("#zzzzzz").is_none());
}

#[test]
fn parses_rgb_functions_and_keywords() {
    assert_eq!(Color::parse("rgb(10, 20, 30)"), Some(Color::rgb(10, 20, 30)));
    let c = Color::parse("RGBA(255, 0, 0, 0.5)").unwrap();
    assert_eq!(c, Color::rgba(255, 0, 0, 0.5));

    assert_eq!(Color::parse("red"), Some(Color::rgb(255, 0, 0)));
    assert_eq!(Color::parse("Yellow"), Some(Color::rgb(255, 255, 0)));
    assert_eq!(Color::parse("transparent").map(|c| c.a), Some(0.0));
    assert!(Color::parse("retrieve").is_none());
    assert!(Color::parse("repeat").is_none());
}

#[test]
fn components_are_unit_scaled() {
    let [r, g, b, a] = Color::rgba(255, 0, 51, 0.25).components();
    assert_eq!(r, 1.0);
    assert_eq!(g, 0.0);
    assert!((b - 0.2).abs() < 1e-12);
    assert_eq!(a, 0.25);
}

#[test]
fn display_round_trips_through_parse() {
    let c = Color::rgba(1, 2, 3, 0.5);
    assert_eq!(Color::parse(&c.to_string()), Some(c));
    assert_eq!(Color::rgb(255, 128, 0).to_string(), "#ff8000");
}

#[test]
fn deserializes_from_string() {
    let c: Color = serde_json::from_value(json!("blue")).unwrap();
    assert_eq!(c, Color::rgb(0, 0, 255));
    assert!(serde_json::from_value::<Color>(json!("not-a-color")).is_err());
}
