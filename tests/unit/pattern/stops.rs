use super::*;

fn pair(offset: f64, color: &str) -> Value {
    Value::list([Value::Number(offset), Value::token(color)])
}

fn offsets(stops: &[GradientStop]) -> Vec<f64> {
    stops.iter().map(|s| s.offset).collect()
}

#[test]
fn implicit_run_is_spaced_up_to_next_explicit_stop() {
    let list = [
        Value::token("red"),
        Value::token("green"),
        pair(50.0, "blue"),
        Value::token("yellow"),
    ];
    let stops = infer_color_stops(&list).unwrap();
    assert_eq!(offsets(&stops), vec![0.0, 0.25, 0.5, 1.0]);

    assert_eq!((stops[0].r, stops[0].g, stops[0].b), (1.0, 0.0, 0.0));
    assert_eq!((stops[2].r, stops[2].g, stops[2].b), (0.0, 0.0, 1.0));
    assert_eq!(stops[3].a, 1.0);
}

#[test]
fn bare_colors_only_are_evenly_spread() {
    let list = ["red", "lime", "blue"].map(Value::token);
    assert_eq!(offsets(&infer_color_stops(&list).unwrap()), vec![0.0, 0.5, 1.0]);

    let list = ["red", "lime", "blue", "white", "black"].map(Value::token);
    let stops = infer_color_stops(&list).unwrap();
    // Second stop: 0 + 100 / 4 (span runs to the end).
    assert!((stops[1].offset - 0.25).abs() < 1e-12);
    assert_eq!(stops[4].offset, 1.0);
}

#[test]
fn explicit_stops_keep_their_offsets() {
    let list = [pair(10.0, "red"), Value::list([Value::token("blue"), Value::Number(90.0)])];
    let stops = infer_color_stops(&list).unwrap();
    assert_eq!(offsets(&stops), vec![0.1, 0.9]);
    assert_eq!(stops[1].b, 1.0);
}

#[test]
fn decreasing_offsets_are_raised_to_predecessor() {
    let list = [pair(60.0, "red"), pair(20.0, "blue"), Value::token("white")];
    assert_eq!(offsets(&infer_color_stops(&list).unwrap()), vec![0.6, 0.6, 1.0]);
}

#[test]
fn alpha_passes_through_unscaled() {
    let list = [Value::Color(Color::rgba(0, 0, 0, 0.5)), Value::token("white")];
    let stops = infer_color_stops(&list).unwrap();
    assert_eq!(stops[0].a, 0.5);
}

#[test]
fn malformed_entries_are_rejected() {
    for bad in [
        Value::Number(3.0),
        Value::token("retrieve"),
        Value::list([Value::Number(1.0), Value::Number(2.0)]),
        Value::list([Value::Number(1.0), Value::token("red"), Value::Number(3.0)]),
        Value::list([Value::Number(f64::NAN), Value::token("red")]),
    ] {
        let err = infer_color_stops(&[Value::token("red"), bad]).unwrap_err();
        assert!(matches!(err, EaselError::UnsupportedColorStop(_)), "{err}");
    }
}
