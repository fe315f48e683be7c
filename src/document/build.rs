use std::collections::BTreeMap;

use serde_json::Value as Json;

use crate::{
    action::{
        command::{Command, Step},
        value::Value,
        vocab::Action,
    },
    canvas::Canvas,
    document::{model::Document, plugins::Registry},
    foundation::error::{EaselError, EaselResult},
    settings::Settings,
};

impl Document {
    /// Builds every canvas, resolving `@name` references in dependency order.
    ///
    /// A referenced canvas is built once and shared by every canvas that uses it. Unknown
    /// names fail with [`EaselError::UnsupportedCanvasReference`], reference cycles with
    /// [`EaselError::CanvasCycle`].
    #[tracing::instrument(skip_all, fields(canvases = self.canvases.len()))]
    pub fn build(
        &self,
        settings: &Settings,
        registry: &Registry,
    ) -> EaselResult<BTreeMap<String, Canvas>> {
        let mut b = Builder {
            doc: self,
            settings,
            registry,
            visiting: Vec::new(),
            built: BTreeMap::new(),
        };
        for name in self.canvases.keys() {
            b.canvas(name)?;
        }
        Ok(b.built)
    }
}

struct Builder<'a> {
    doc: &'a Document,
    settings: &'a Settings,
    registry: &'a Registry,
    visiting: Vec<String>,
    built: BTreeMap<String, Canvas>,
}

impl Builder<'_> {
    fn canvas(&mut self, name: &str) -> EaselResult<Canvas> {
        if let Some(canvas) = self.built.get(name) {
            return Ok(canvas.clone());
        }
        if self.visiting.iter().any(|n| n == name) {
            let mut chain = self.visiting.clone();
            chain.push(name.to_owned());
            return Err(EaselError::cycle(chain.join(" -> ")));
        }
        let def = self.doc.canvases.get(name).ok_or_else(|| {
            EaselError::document(format!("canvas '{name}' is not defined"))
        })?;

        self.visiting.push(name.to_owned());
        let steps = self.steps(&def.actions);
        self.visiting.pop();

        let mut builder = Canvas::builder(def.origin(name, self.settings)?)
            .label(name)
            .steps(steps?);
        if let Some(output) = &def.output {
            builder = builder.output(output);
        }
        let canvas = builder.build();
        tracing::debug!(name, steps = canvas.steps().len(), "built canvas");
        self.built.insert(name.to_owned(), canvas.clone());
        Ok(canvas)
    }

    fn steps(&mut self, actions: &[Json]) -> EaselResult<Vec<Step>> {
        let mut steps = Vec::new();
        for (index, action) in actions.iter().enumerate() {
            match action {
                Json::String(name) => match self.registry.expand(name, &[]) {
                    Some(expanded) => steps.extend(expanded?),
                    None => steps.push(Step::Raw(name.clone())),
                },
                Json::Array(items) => match items.split_first() {
                    Some((Json::String(head), rest)) => {
                        let args = self.args(head, rest)?;
                        match self.registry.expand(head, &args) {
                            Some(expanded) => steps.extend(expanded?),
                            None => steps.push(Step::Command(Command::parse(head, args)?)),
                        }
                    }
                    _ => {
                        return Err(EaselError::document(format!(
                            "action {index} must start with an action name"
                        )));
                    }
                },
                other => {
                    return Err(EaselError::document(format!(
                        "action {index} must be a name or [name, args...], got {other}"
                    )));
                }
            }
        }
        Ok(steps)
    }

    fn args(&mut self, head: &str, items: &[Json]) -> EaselResult<Vec<Value>> {
        let action = Action::from_name(head).map_or("document", Action::name);
        items.iter().map(|item| self.value(action, item)).collect()
    }

    fn value(&mut self, action: &'static str, json: &Json) -> EaselResult<Value> {
        match json {
            Json::Number(n) => n
                .as_f64()
                .map(Value::Number)
                .ok_or_else(|| EaselError::document(format!("number {n} is out of range"))),
            Json::String(s) => match s.strip_prefix('@') {
                Some(name) => self.reference(action, name).map(Value::Canvas),
                None => Ok(Value::token(s.as_str())),
            },
            Json::Array(items) => match items.split_first() {
                Some((Json::String(head), rest)) if self.is_callable(head) => {
                    let args = self.args(head, rest)?;
                    match self.registry.expand(head, &args) {
                        Some(expanded) => Ok(Value::list(expanded?.into_iter().map(step_value))),
                        None => Ok(Value::Command(Box::new(Command::parse(head, args)?))),
                    }
                }
                _ => items
                    .iter()
                    .map(|item| self.value(action, item))
                    .collect::<EaselResult<Vec<_>>>()
                    .map(Value::List),
            },
            other => Err(EaselError::document(format!(
                "({action}) unsupported argument {other}"
            ))),
        }
    }

    fn reference(&mut self, action: &'static str, name: &str) -> EaselResult<Canvas> {
        if !self.doc.canvases.contains_key(name) {
            return Err(EaselError::canvas_reference(
                action,
                format!("no canvas named '{name}'"),
            ));
        }
        self.canvas(name)
    }

    /// Whether a string at the head of an argument array names a command or macro.
    /// Other arrays, such as `["red", 40]` color stops, are plain lists.
    fn is_callable(&self, head: &str) -> bool {
        !head.starts_with('@') && (Action::from_name(head).is_some() || self.registry.contains(head))
    }
}

fn step_value(step: Step) -> Value {
    match step {
        Step::Command(cmd) => Value::Command(Box::new(cmd)),
        Step::Raw(name) => Value::Token(name),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/document/build.rs"]
mod tests;
