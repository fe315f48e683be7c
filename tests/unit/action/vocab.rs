use super::*;

#[test]
fn every_action_round_trips_through_its_name() {
    for action in ALL_ACTIONS {
        assert_eq!(Action::from_name(action.name()), Some(action));
    }
}

#[test]
fn names_accept_snake_and_kebab_spellings() {
    assert_eq!(Action::from_name("arc_reverse"), Some(Action::ArcReverse));
    assert_eq!(Action::from_name("dash-pattern"), Some(Action::DashPattern));
    assert_eq!(Action::from_name("SLOW_BLUR"), Some(Action::SlowBlur));
    assert_eq!(Action::from_name("quadratic_curve"), Some(Action::QuadraticCurve));
    assert_eq!(Action::from_name("wiggle"), None);
}

#[test]
fn families_partition_the_vocabulary() {
    let families = [Family::Context, Family::Path, Family::Pattern, Family::Canvas];
    let total: usize = families.iter().map(|f| f.actions().count()).sum();
    assert_eq!(total, ALL_ACTIONS.len());

    assert_eq!(
        Family::Path.action_names(),
        vec!["arc", "arcReverse", "curve", "line", "move", "quadraticCurve"]
    );
    assert_eq!(
        Family::Pattern.action_names(),
        vec!["brush", "dashPattern", "mask"]
    );
}

#[test]
fn arity_table_matches_argument_shapes() {
    assert_eq!(Action::Transform.spec().min_arity, 6);
    assert_eq!(Action::ArcReverse.spec(), ActionSpec {
        action: Action::ArcReverse,
        ..Action::Arc.spec()
    });
    assert!(Action::Brush.spec().variadic);
    assert!(Action::SlowBlur.spec().variadic);
    assert!(!Action::Rotate.spec().variadic);
    assert_eq!(Action::Stroke.spec().min_arity, 0);
}
