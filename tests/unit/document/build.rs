use serde_json::json;

use super::*;
use crate::{
    canvas::{Lifecycle, Origin},
    pattern::{Brush, Mask},
    render::recording::{Call, RecordingRenderer},
};

fn doc(v: serde_json::Value) -> Document {
    serde_json::from_value(v).unwrap()
}

fn build(d: &Document) -> EaselResult<BTreeMap<String, Canvas>> {
    d.build(&Settings::default(), &Registry::with_builtins())
}

#[test]
fn references_share_one_canvas() {
    let d = doc(json!({
        "canvases": {
            "a": { "width": 4, "height": 4, "actions": [["brush", "@dot", "repeat"], "paint"] },
            "b": { "width": 4, "height": 4, "actions": [["mask", "@dot", 1, 1]] },
            "dot": { "width": 1, "height": 1, "actions": [["brush", "red"], "paint"] }
        }
    }));
    let canvases = build(&d).unwrap();
    assert_eq!(canvases.len(), 3);

    let dot = &canvases["dot"];
    let Step::Command(Command::Brush(Brush::Canvas { canvas, extend })) = &canvases["a"].steps()[0]
    else {
        panic!("expected canvas brush");
    };
    assert!(canvas.ptr_eq(dot));
    assert_eq!(extend.as_deref(), Some("repeat"));

    let Step::Command(Command::Mask(Mask::Surface { canvas, x, y })) = &canvases["b"].steps()[0]
    else {
        panic!("expected surface mask");
    };
    assert!(canvas.ptr_eq(dot));
    assert_eq!((*x, *y), (1.0, 1.0));

    let mut r = RecordingRenderer::new();
    canvases["a"].execute(&mut r).unwrap();
    canvases["b"].execute(&mut r).unwrap();
    assert_eq!(r.count(|c| matches!(c, Call::CreateSurface { .. })), 3);
    assert!(matches!(dot.lifecycle(), Lifecycle::Executed(_)));
}

#[test]
fn reference_cycles_are_rejected() {
    let d = doc(json!({
        "canvases": {
            "a": { "width": 1, "height": 1, "actions": [["brush", "@b"]] },
            "b": { "width": 1, "height": 1, "actions": [["mask", "@a"]] }
        }
    }));
    let err = build(&d).unwrap_err();
    assert!(matches!(err, EaselError::CanvasCycle(ref chain) if chain == "a -> b -> a"), "{err}");

    let d = doc(json!({
        "canvases": { "me": { "width": 1, "height": 1, "actions": [["brush", "@me"]] } }
    }));
    assert!(matches!(build(&d), Err(EaselError::CanvasCycle(_))));
}

#[test]
fn unknown_reference_names_the_action() {
    let d = doc(json!({
        "canvases": { "a": { "width": 1, "height": 1, "actions": [["mask", "@ghost"]] } }
    }));
    let err = build(&d).unwrap_err();
    assert!(matches!(
        err,
        EaselError::UnsupportedCanvasReference { action: "mask", ref detail } if detail.contains("ghost")
    ));
}

#[test]
fn arrays_are_commands_only_when_headed_by_an_action() {
    let d = doc(json!({
        "canvases": {
            "g": { "width": 10, "height": 1, "actions": [
                ["brush", 0, 0, 10, 0, "red", ["green", 40], [80, "blue"]],
                ["slowBlur", 2, ["line", 1, 1], "stroke"]
            ] }
        }
    }));
    let canvases = build(&d).unwrap();
    let steps = canvases["g"].steps();

    let Step::Command(Command::Brush(Brush::Linear { stops, .. })) = &steps[0] else {
        panic!("expected linear brush");
    };
    let offsets: Vec<f64> = stops.iter().map(|s| s.offset).collect();
    assert_eq!(offsets, vec![0.0, 0.4, 0.8]);

    let Step::Command(Command::SlowBlur { steps: inner, .. }) = &steps[1] else {
        panic!("expected slowBlur");
    };
    assert!(matches!(inner[0], Step::Command(Command::Line { .. })));
    assert!(matches!(&inner[1], Step::Raw(n) if n == "stroke"));
}

#[test]
fn validation_errors_surface_at_build_time() {
    let d = doc(json!({
        "canvases": { "a": { "width": 1, "height": 1, "actions": [["line", 1]] } }
    }));
    assert!(matches!(build(&d), Err(EaselError::ArityMismatch { .. })));

    let d = doc(json!({
        "canvases": { "a": { "width": 1, "height": 1, "actions": [{"move": [1, 2]}] } }
    }));
    assert!(matches!(build(&d), Err(EaselError::Document(_))));

    let d = doc(json!({
        "canvases": { "a": { "width": 1, "height": 1, "actions": [["brush", true]] } }
    }));
    assert!(matches!(build(&d), Err(EaselError::Document(_))));
}

#[test]
fn bare_names_stay_raw_until_execution() {
    let d = doc(json!({
        "canvases": { "a": { "width": 1, "height": 1, "actions": ["paint", "smear"] } }
    }));
    let canvases = build(&d).unwrap();
    assert!(matches!(&canvases["a"].steps()[1], Step::Raw(n) if n == "smear"));
    assert!(canvases["a"].check().is_err());
}

#[test]
fn file_canvases_resolve_through_settings() {
    let d = doc(json!({
        "canvases": { "photo": { "file": "url('shots/p.png?v=3')", "output": "thumb" } }
    }));
    let settings = Settings {
        css_path: "/site/css".into(),
        ..Settings::default()
    };
    let canvases = d.build(&settings, &Registry::new()).unwrap();
    let photo = &canvases["photo"];
    assert_eq!(photo.origin(), &Origin::File("/site/css/shots/p.png".into()));
    assert_eq!(photo.output_name(), Some("thumb"));
    assert_eq!(photo.label(), "photo");
}

#[test]
fn macros_expand_inline() {
    let d = doc(json!({
        "canvases": { "s": { "width": 8, "height": 8, "actions": [
            ["move", 1, 1], ["line", 6, 6],
            ["slowDropShadow", 2, 2, 3, ["brush", "black"], "stroke"]
        ] } }
    }));
    let canvases = build(&d).unwrap();
    let names: Vec<String> = canvases["s"]
        .steps()
        .iter()
        .map(|s| match s {
            Step::Command(c) => c.action().name().to_owned(),
            Step::Raw(n) => n.clone(),
        })
        .collect();
    assert_eq!(
        names,
        [
            "move", "line", "push", "slowBlur", "pop", "store", "brush", "save", "translate",
            "mask", "restore", "stroke"
        ]
    );
}
