use std::{collections::BTreeMap, fmt};

use crate::{
    action::{
        command::{Command, Step},
        value::{RETRIEVE, Value},
        vocab::fold_name,
    },
    foundation::error::{EaselError, EaselResult},
};

/// A macro action: expands its arguments into a sequence of steps.
pub type Expansion = Box<dyn Fn(&[Value]) -> EaselResult<Vec<Step>>>;

/// Named macro actions available to documents.
///
/// Nothing is registered globally; a document is built against an explicit registry.
/// Names match the way action names do (case-insensitive, `_`/`-` ignored).
#[derive(Default)]
pub struct Registry {
    functions: BTreeMap<String, (String, Expansion)>,
}

impl Registry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the built-in macros (`slowDropShadow`).
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register("slowDropShadow", slow_drop_shadow);
        registry
    }

    pub fn register(
        &mut self,
        name: &str,
        f: impl Fn(&[Value]) -> EaselResult<Vec<Step>> + 'static,
    ) -> &mut Self {
        self.functions
            .insert(fold_name(name), (name.to_owned(), Box::new(f)));
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(&fold_name(name))
    }

    pub fn names(&self) -> Vec<&str> {
        self.functions.values().map(|(n, _)| n.as_str()).collect()
    }

    /// Expands `name(args...)`, or `None` when `name` is not registered.
    pub fn expand(&self, name: &str, args: &[Value]) -> Option<EaselResult<Vec<Step>>> {
        let (_, f) = self.functions.get(&fold_name(name))?;
        tracing::debug!(name, args = args.len(), "expand macro");
        Some(f(args))
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("functions", &self.names())
            .finish()
    }
}

/// `slowDropShadow(x, y, radius, brush, actions...)`.
///
/// Draws `actions` blurred into a group, keeps it as a source, paints `brush` through it at
/// offset `(x, y)`, then draws `actions` again on top.
pub fn slow_drop_shadow(args: &[Value]) -> EaselResult<Vec<Step>> {
    const NAME: &str = "slowDropShadow";
    if args.len() < 4 {
        return Err(EaselError::ArityMismatch {
            family: "plugin",
            action: NAME,
            got: args.len(),
            want: 4,
        });
    }
    let (x, y, radius, brush) = (&args[0], &args[1], &args[2], &args[3]);
    let actions = &args[4..];

    let mut steps = vec![
        Step::Command(Command::Push),
        Step::Command(Command::parse(
            "slowBlur",
            vec![radius.clone(), Value::list(actions.iter().cloned())],
        )?),
        Step::Command(Command::Pop),
        Step::Command(Command::Store),
    ];
    push_steps(NAME, 3, brush, &mut steps)?;
    steps.extend([
        Step::Command(Command::Save),
        Step::Command(Command::parse("translate", vec![x.clone(), y.clone()])?),
        Step::Command(Command::parse("mask", vec![Value::token(RETRIEVE)])?),
        Step::Command(Command::Restore),
    ]);
    for (offset, action) in actions.iter().enumerate() {
        push_steps(NAME, 4 + offset, action, &mut steps)?;
    }
    Ok(steps)
}

/// Appends an action-valued argument: a command, a bare name, or a list of those.
fn push_steps(
    action: &'static str,
    index: usize,
    value: &Value,
    out: &mut Vec<Step>,
) -> EaselResult<()> {
    match value {
        Value::Command(cmd) => out.push(Step::Command((**cmd).clone())),
        Value::Token(name) => out.push(Step::Raw(name.clone())),
        Value::List(items) => {
            for item in items {
                push_steps(action, index, item, out)?;
            }
        }
        _ => {
            return Err(EaselError::ArgumentType {
                action,
                index,
                expected: "an action",
            });
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/document/plugins.rs"]
mod tests;
