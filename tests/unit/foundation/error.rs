use super::*;

#[test]
fn unknown_action_lists_recognized_names() {
    let err = EaselError::UnknownAction {
        family: "path",
        action: "wiggle".to_owned(),
        recognized: vec!["move", "line"],
    };
    let msg = err.to_string();
    assert!(msg.contains("(path)"));
    assert!(msg.contains("'wiggle'"));
    assert!(msg.contains("move, line"));
}

#[test]
fn arity_message_names_family_and_action() {
    let err = EaselError::ArityMismatch {
        family: "context",
        action: "translate",
        got: 1,
        want: 2,
    };
    assert_eq!(
        err.to_string(),
        "(context.translate) wrong number of arguments (1 for 2)"
    );
}

#[test]
fn display_prefixes_are_stable() {
    assert!(EaselError::render("x").to_string().contains("render error:"));
    assert!(
        EaselError::document("x")
            .to_string()
            .contains("document error:")
    );
    assert!(EaselError::cycle("x").to_string().contains("canvas cycle:"));
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = EaselError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
