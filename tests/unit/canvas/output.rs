use super::*;
use crate::render::{cpu::CpuRenderer, recording::RecordingRenderer};

fn temp_dir(tag: &str) -> std::path::PathBuf {
    let dir = std::env::temp_dir().join(format!("easel-output-{tag}-{}", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    dir
}

#[test]
fn png_extension_is_enforced_once() {
    assert_eq!(png_file_name("logo"), "logo.png");
    assert_eq!(png_file_name("logo.png"), "logo.png");
    assert_eq!(png_file_name("logo.PNG"), "logo.PNG");
    assert_eq!(png_file_name("logo.v2"), "logo.v2.png");
}

#[test]
fn data_uri_is_base64_png() {
    assert_eq!(data_uri(&[0x89, b'P', b'N', b'G']), "data:image/png;base64,iVBORw==");
}

#[test]
fn display_wraps_in_url() {
    assert_eq!(Output::File("a.png".into()).to_string(), "url('a.png')");
    assert_eq!(
        Output::DataUri("data:image/png;base64,AA==".into()).to_string(),
        "url('data:image/png;base64,AA==')"
    );
}

#[test]
fn unnamed_canvas_becomes_a_data_uri() {
    let canvas = Canvas::blank(2, 2).step("paint").build();
    let mut r = CpuRenderer::new();
    let Output::DataUri(uri) = canvas.value(&mut r, &Settings::default()).unwrap() else {
        panic!("expected a data uri");
    };
    assert!(uri.starts_with("data:image/png;base64,iVBORw0KGgo"));
}

#[test]
fn named_canvas_is_written_under_generated_dir() {
    let dir = temp_dir("named");
    let settings = Settings {
        generated_images_path: dir.join("nested"),
        ..Settings::default()
    };
    let canvas = Canvas::blank(3, 3).step("paint").output("swatch").build();
    let mut r = CpuRenderer::new();

    let out = canvas.value(&mut r, &settings).unwrap();
    assert_eq!(out, Output::File("swatch.png".into()));
    let bytes = std::fs::read(dir.join("nested").join("swatch.png")).unwrap();
    assert_eq!(bytes, canvas.to_png(&mut r).unwrap());

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn recording_backend_cannot_encode() {
    let canvas = Canvas::blank(2, 2).build();
    let mut r = RecordingRenderer::new();
    assert!(matches!(
        canvas.value(&mut r, &Settings::default()),
        Err(crate::foundation::error::EaselError::CapabilityMissing {
            operation: "encode_png",
            ..
        })
    ));
}
