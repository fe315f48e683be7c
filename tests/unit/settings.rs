use super::*;
use serde_json::json;

#[test]
fn defaults_fill_missing_fields() {
    let s: Settings = serde_json::from_value(json!({"images_path": "img"})).unwrap();
    assert_eq!(s.images_path, PathBuf::from("img"));
    assert_eq!(s.css_path, PathBuf::from("css"));
    assert_eq!(s.backend, BackendKind::Cpu);

    let s: Settings = serde_json::from_value(json!({"backend": "recording"})).unwrap();
    assert_eq!(s.backend, BackendKind::Recording);

    assert!(serde_json::from_value::<Settings>(json!({"image_path": "x"})).is_err());
}

#[test]
fn overrides_replace_paths() {
    let s = Settings::default().with_overrides(|key| match key {
        ENV_IMAGES_PATH => Some("/srv/img".to_owned()),
        ENV_CSS_PATH => Some(String::new()),
        _ => None,
    });
    assert_eq!(s.images_path, PathBuf::from("/srv/img"));
    assert_eq!(s.css_path, PathBuf::from("css"));
}

#[test]
fn resolves_url_and_plain_sources() {
    let s = Settings {
        images_path: PathBuf::from("img"),
        css_path: PathBuf::from("style"),
        ..Settings::default()
    };
    assert_eq!(
        s.resolve_source("url('icons/a.png?v=3')"),
        PathBuf::from("style").join("icons/a.png")
    );
    assert_eq!(
        s.resolve_source("url(b.png)"),
        PathBuf::from("style").join("b.png")
    );
    assert_eq!(
        s.resolve_source("photos/c.png?1"),
        PathBuf::from("img").join("photos/c.png")
    );
}

#[test]
fn relative_dirs_are_rebased() {
    let s = Settings {
        css_path: PathBuf::from("/abs/css"),
        ..Settings::default()
    }
    .relative_to(Path::new("/project"));
    assert_eq!(s.images_path, PathBuf::from("/project/images"));
    assert_eq!(s.css_path, PathBuf::from("/abs/css"));
}
