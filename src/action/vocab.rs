use std::fmt;

use serde::Serialize;

/// The closed catalog of drawing operations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Action {
    Antialias,
    Arc,
    ArcReverse,
    Brush,
    Clip,
    Close,
    Curve,
    DashPattern,
    Fill,
    FillRule,
    Group,
    Line,
    LineCap,
    LineJoin,
    LineWidth,
    Mask,
    MiterLimit,
    Move,
    Paint,
    Pop,
    Push,
    QuadraticCurve,
    Reset,
    Restore,
    Retrieve,
    Rotate,
    Save,
    Scale,
    SlowBlur,
    Store,
    Stroke,
    Tolerance,
    Transform,
    Translate,
    Unclip,
}

/// Every action, in vocabulary order.
pub const ALL_ACTIONS: [Action; 35] = [
    Action::Antialias,
    Action::Arc,
    Action::ArcReverse,
    Action::Brush,
    Action::Clip,
    Action::Close,
    Action::Curve,
    Action::DashPattern,
    Action::Fill,
    Action::FillRule,
    Action::Group,
    Action::Line,
    Action::LineCap,
    Action::LineJoin,
    Action::LineWidth,
    Action::Mask,
    Action::MiterLimit,
    Action::Move,
    Action::Paint,
    Action::Pop,
    Action::Push,
    Action::QuadraticCurve,
    Action::Reset,
    Action::Restore,
    Action::Retrieve,
    Action::Rotate,
    Action::Save,
    Action::Scale,
    Action::SlowBlur,
    Action::Store,
    Action::Stroke,
    Action::Tolerance,
    Action::Transform,
    Action::Translate,
    Action::Unclip,
];

/// Command families. Each exposes a fixed allow-list of actions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Family {
    /// Drawing-state setters and transforms.
    Context,
    /// Path construction.
    Path,
    /// Brushes, dashes and masks.
    Pattern,
    /// Zero-argument actions that may appear in an action list as a raw name.
    Canvas,
}

/// Arity contract of one action.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ActionSpec {
    pub action: Action,
    pub family: Family,
    pub min_arity: usize,
    pub variadic: bool,
}

const fn fixed(action: Action, family: Family, arity: usize) -> ActionSpec {
    ActionSpec {
        action,
        family,
        min_arity: arity,
        variadic: false,
    }
}

const fn variadic(action: Action, family: Family, min_arity: usize) -> ActionSpec {
    ActionSpec {
        action,
        family,
        min_arity,
        variadic: true,
    }
}

impl Action {
    pub fn name(self) -> &'static str {
        match self {
            Action::Antialias => "antialias",
            Action::Arc => "arc",
            Action::ArcReverse => "arcReverse",
            Action::Brush => "brush",
            Action::Clip => "clip",
            Action::Close => "close",
            Action::Curve => "curve",
            Action::DashPattern => "dashPattern",
            Action::Fill => "fill",
            Action::FillRule => "fillRule",
            Action::Group => "group",
            Action::Line => "line",
            Action::LineCap => "lineCap",
            Action::LineJoin => "lineJoin",
            Action::LineWidth => "lineWidth",
            Action::Mask => "mask",
            Action::MiterLimit => "miterLimit",
            Action::Move => "move",
            Action::Paint => "paint",
            Action::Pop => "pop",
            Action::Push => "push",
            Action::QuadraticCurve => "quadraticCurve",
            Action::Reset => "reset",
            Action::Restore => "restore",
            Action::Retrieve => "retrieve",
            Action::Rotate => "rotate",
            Action::Save => "save",
            Action::Scale => "scale",
            Action::SlowBlur => "slowBlur",
            Action::Store => "store",
            Action::Stroke => "stroke",
            Action::Tolerance => "tolerance",
            Action::Transform => "transform",
            Action::Translate => "translate",
            Action::Unclip => "unclip",
        }
    }

    pub fn spec(self) -> ActionSpec {
        use Family::*;
        match self {
            Action::Move | Action::Line => fixed(self, Path, 2),
            Action::Curve => fixed(self, Path, 6),
            Action::QuadraticCurve => fixed(self, Path, 4),
            Action::Arc | Action::ArcReverse => fixed(self, Path, 5),

            Action::LineWidth
            | Action::LineCap
            | Action::LineJoin
            | Action::MiterLimit
            | Action::Antialias
            | Action::FillRule
            | Action::Tolerance
            | Action::Rotate => fixed(self, Context, 1),
            Action::Translate | Action::Scale => fixed(self, Context, 2),
            Action::Transform => fixed(self, Context, 6),
            Action::SlowBlur => variadic(self, Context, 1),

            Action::Brush | Action::DashPattern | Action::Mask => variadic(self, Pattern, 1),

            Action::Clip
            | Action::Close
            | Action::Fill
            | Action::Group
            | Action::Paint
            | Action::Pop
            | Action::Push
            | Action::Reset
            | Action::Restore
            | Action::Retrieve
            | Action::Save
            | Action::Store
            | Action::Stroke
            | Action::Unclip => fixed(self, Canvas, 0),
        }
    }

    pub fn family(self) -> Family {
        self.spec().family
    }

    /// Looks up an action by name. Matching ignores case and accepts camelCase, snake_case
    /// and kebab-case spellings.
    pub fn from_name(name: &str) -> Option<Action> {
        let folded = fold_name(name);
        ALL_ACTIONS
            .into_iter()
            .find(|a| fold_name(a.name()) == folded)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Family {
    pub fn name(self) -> &'static str {
        match self {
            Family::Context => "context",
            Family::Path => "path",
            Family::Pattern => "pattern",
            Family::Canvas => "canvas",
        }
    }

    /// Actions this family recognizes, in vocabulary order.
    pub fn actions(self) -> impl Iterator<Item = Action> {
        ALL_ACTIONS.into_iter().filter(move |a| a.family() == self)
    }

    pub fn action_names(self) -> Vec<&'static str> {
        self.actions().map(Action::name).collect()
    }

    pub fn recognizes(self, action: Action) -> bool {
        action.family() == self
    }
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

pub(crate) fn fold_name(name: &str) -> String {
    name.trim()
        .chars()
        .filter(|c| *c != '_' && *c != '-')
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

#[cfg(test)]
#[path = "../../tests/unit/action/vocab.rs"]
mod tests;
