use crate::{
    action::{
        value::Value,
        vocab::{ALL_ACTIONS, Action, Family},
    },
    foundation::{
        core::radians,
        error::{EaselError, EaselResult},
    },
    pattern::{Brush, Mask, compile_brush, compile_dash, compile_mask},
};

/// Arguments of `arc` / `arcReverse`, angles already in radians.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ArcArgs {
    pub x: f64,
    pub y: f64,
    pub radius: f64,
    pub angle1: f64,
    pub angle2: f64,
}

/// A validated action with normalized arguments. Built once, never mutated.
#[derive(Clone, Debug)]
pub enum Command {
    Move { x: f64, y: f64 },
    Line { x: f64, y: f64 },
    Curve { x1: f64, y1: f64, x2: f64, y2: f64, x3: f64, y3: f64 },
    /// Elevated to a cubic at execution time, from the renderer's current point.
    QuadraticCurve { x1: f64, y1: f64, x2: f64, y2: f64 },
    Arc(ArcArgs),
    ArcReverse(ArcArgs),

    LineWidth(f64),
    LineCap(String),
    LineJoin(String),
    MiterLimit(f64),
    Antialias(String),
    FillRule(String),
    Tolerance(f64),
    Translate { x: f64, y: f64 },
    Scale { x: f64, y: f64 },
    Rotate(f64),
    Transform([f64; 6]),
    SlowBlur { radius: f64, steps: Vec<Step> },

    Brush(Brush),
    DashPattern(Vec<f64>),
    Mask(Mask),

    Paint,
    Stroke,
    Fill,
    Clip,
    Unclip,
    Close,
    Reset,
    Group,
    Push,
    Pop,
    Save,
    Restore,
    Store,
    Retrieve,
}

/// One entry of a canvas action list: a validated command or a raw zero-argument action name.
#[derive(Clone, Debug)]
pub enum Step {
    Command(Command),
    Raw(String),
}

impl From<Command> for Step {
    fn from(v: Command) -> Self {
        Step::Command(v)
    }
}

impl From<&str> for Step {
    fn from(v: &str) -> Self {
        Step::Raw(v.to_owned())
    }
}

impl Step {
    /// Raw names are resolved against the bare-action allow-list.
    pub fn resolve(&self) -> EaselResult<Command> {
        match self {
            Step::Command(cmd) => Ok(cmd.clone()),
            Step::Raw(name) => validate(Family::Canvas, name, Vec::new()),
        }
    }
}

impl Command {
    pub fn action(&self) -> Action {
        match self {
            Command::Move { .. } => Action::Move,
            Command::Line { .. } => Action::Line,
            Command::Curve { .. } => Action::Curve,
            Command::QuadraticCurve { .. } => Action::QuadraticCurve,
            Command::Arc(_) => Action::Arc,
            Command::ArcReverse(_) => Action::ArcReverse,
            Command::LineWidth(_) => Action::LineWidth,
            Command::LineCap(_) => Action::LineCap,
            Command::LineJoin(_) => Action::LineJoin,
            Command::MiterLimit(_) => Action::MiterLimit,
            Command::Antialias(_) => Action::Antialias,
            Command::FillRule(_) => Action::FillRule,
            Command::Tolerance(_) => Action::Tolerance,
            Command::Translate { .. } => Action::Translate,
            Command::Scale { .. } => Action::Scale,
            Command::Rotate(_) => Action::Rotate,
            Command::Transform(_) => Action::Transform,
            Command::SlowBlur { .. } => Action::SlowBlur,
            Command::Brush(_) => Action::Brush,
            Command::DashPattern(_) => Action::DashPattern,
            Command::Mask(_) => Action::Mask,
            Command::Paint => Action::Paint,
            Command::Stroke => Action::Stroke,
            Command::Fill => Action::Fill,
            Command::Clip => Action::Clip,
            Command::Unclip => Action::Unclip,
            Command::Close => Action::Close,
            Command::Reset => Action::Reset,
            Command::Group => Action::Group,
            Command::Push => Action::Push,
            Command::Pop => Action::Pop,
            Command::Save => Action::Save,
            Command::Restore => Action::Restore,
            Command::Store => Action::Store,
            Command::Retrieve => Action::Retrieve,
        }
    }

    pub fn context(name: &str, args: Vec<Value>) -> EaselResult<Self> {
        validate(Family::Context, name, args)
    }

    pub fn path(name: &str, args: Vec<Value>) -> EaselResult<Self> {
        validate(Family::Path, name, args)
    }

    pub fn pattern(name: &str, args: Vec<Value>) -> EaselResult<Self> {
        validate(Family::Pattern, name, args)
    }

    /// Validates against whichever family owns `name`.
    pub fn parse(name: &str, args: Vec<Value>) -> EaselResult<Self> {
        let action = Action::from_name(name).ok_or_else(|| EaselError::UnknownAction {
            family: "vocabulary",
            action: name.to_owned(),
            recognized: ALL_ACTIONS.iter().map(|a| a.name()).collect(),
        })?;
        validate(action.family(), name, args)
    }
}

/// Converts a raw `(name, args)` pair into a [`Command`] of the given family.
///
/// The name must be on the family's allow-list and the argument count must satisfy the
/// action's arity. Angles are converted from degrees to radians and pattern arguments are
/// compiled here, so a command that validates needs no further checking at execution.
pub fn validate(family: Family, name: &str, args: Vec<Value>) -> EaselResult<Command> {
    let action = Action::from_name(name)
        .filter(|a| family.recognizes(*a))
        .ok_or_else(|| EaselError::UnknownAction {
            family: family.name(),
            action: name.to_owned(),
            recognized: family.action_names(),
        })?;

    let spec = action.spec();
    if args.len() < spec.min_arity || (!spec.variadic && args.len() > spec.min_arity) {
        return Err(EaselError::ArityMismatch {
            family: family.name(),
            action: action.name(),
            got: args.len(),
            want: spec.min_arity,
        });
    }

    let a = Args {
        action: action.name(),
        values: &args,
    };
    let cmd = match action {
        Action::Move => Command::Move {
            x: a.number(0)?,
            y: a.number(1)?,
        },
        Action::Line => Command::Line {
            x: a.number(0)?,
            y: a.number(1)?,
        },
        Action::Curve => Command::Curve {
            x1: a.number(0)?,
            y1: a.number(1)?,
            x2: a.number(2)?,
            y2: a.number(3)?,
            x3: a.number(4)?,
            y3: a.number(5)?,
        },
        Action::QuadraticCurve => Command::QuadraticCurve {
            x1: a.number(0)?,
            y1: a.number(1)?,
            x2: a.number(2)?,
            y2: a.number(3)?,
        },
        Action::Arc => Command::Arc(a.arc()?),
        Action::ArcReverse => Command::ArcReverse(a.arc()?),

        Action::LineWidth => Command::LineWidth(a.number(0)?),
        Action::LineCap => Command::LineCap(a.token(0)?),
        Action::LineJoin => Command::LineJoin(a.token(0)?),
        Action::MiterLimit => Command::MiterLimit(a.number(0)?),
        Action::Antialias => Command::Antialias(a.token(0)?),
        Action::FillRule => Command::FillRule(a.token(0)?),
        Action::Tolerance => Command::Tolerance(a.number(0)?),
        Action::Translate => Command::Translate {
            x: a.number(0)?,
            y: a.number(1)?,
        },
        Action::Scale => Command::Scale {
            x: a.number(0)?,
            y: a.number(1)?,
        },
        Action::Rotate => Command::Rotate(radians(a.number(0)?)),
        Action::Transform => Command::Transform([
            a.number(0)?,
            a.number(1)?,
            a.number(2)?,
            a.number(3)?,
            a.number(4)?,
            a.number(5)?,
        ]),
        Action::SlowBlur => {
            let mut steps = Vec::new();
            collect_steps(&args[1..], &mut steps)?;
            Command::SlowBlur {
                radius: a.number(0)?,
                steps,
            }
        }

        Action::Brush => Command::Brush(compile_brush(&args)?),
        Action::DashPattern => Command::DashPattern(compile_dash(&args)?),
        Action::Mask => Command::Mask(compile_mask(&args)?),

        Action::Paint => Command::Paint,
        Action::Stroke => Command::Stroke,
        Action::Fill => Command::Fill,
        Action::Clip => Command::Clip,
        Action::Unclip => Command::Unclip,
        Action::Close => Command::Close,
        Action::Reset => Command::Reset,
        Action::Group => Command::Group,
        Action::Push => Command::Push,
        Action::Pop => Command::Pop,
        Action::Save => Command::Save,
        Action::Restore => Command::Restore,
        Action::Store => Command::Store,
        Action::Retrieve => Command::Retrieve,
    };
    Ok(cmd)
}

/// Inner actions of `slowBlur`: commands, raw names, or lists of either.
fn collect_steps(values: &[Value], out: &mut Vec<Step>) -> EaselResult<()> {
    for (index, value) in values.iter().enumerate() {
        match value {
            Value::Command(cmd) => out.push(Step::Command((**cmd).clone())),
            Value::Token(name) => out.push(Step::Raw(name.clone())),
            Value::List(items) => collect_steps(items, out)?,
            _ => {
                return Err(EaselError::ArgumentType {
                    action: "slowBlur",
                    index: index + 1,
                    expected: "an action",
                });
            }
        }
    }
    Ok(())
}

struct Args<'a> {
    action: &'static str,
    values: &'a [Value],
}

impl Args<'_> {
    fn number(&self, index: usize) -> EaselResult<f64> {
        self.values[index]
            .as_number()
            .ok_or(EaselError::ArgumentType {
                action: self.action,
                index,
                expected: "a number",
            })
    }

    fn token(&self, index: usize) -> EaselResult<String> {
        self.values[index]
            .as_token()
            .ok_or(EaselError::ArgumentType {
                action: self.action,
                index,
                expected: "a keyword",
            })
    }

    fn arc(&self) -> EaselResult<ArcArgs> {
        Ok(ArcArgs {
            x: self.number(0)?,
            y: self.number(1)?,
            radius: self.number(2)?,
            angle1: radians(self.number(3)?),
            angle2: radians(self.number(4)?),
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/action/command.rs"]
mod tests;
