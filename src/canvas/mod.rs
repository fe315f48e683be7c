//! Canvases: an action list plus the lifecycle of its single execution.

mod engine;
pub mod output;

use std::{cell::Cell, fmt, path::PathBuf, rc::Rc};

use crate::{
    action::command::Step,
    foundation::error::EaselResult,
    render::backend::{Renderer, RendererId, SurfaceId},
};

pub use output::Output;

/// Where a canvas's surface comes from.
#[derive(Clone, Debug, PartialEq)]
pub enum Origin {
    /// A fresh transparent surface.
    Blank { width: u32, height: u32 },
    /// An existing image loaded by the renderer.
    File(PathBuf),
}

/// Result of a completed execution.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Executed {
    pub surface: SurfaceId,
    /// Renderer that owns `surface`.
    pub renderer: RendererId,
    /// Current point (user space) when the action list finished.
    pub current_point: Option<(f64, f64)>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Lifecycle {
    Unexecuted,
    Executing,
    Executed(Executed),
}

struct CanvasNode {
    origin: Origin,
    steps: Vec<Step>,
    output: Option<String>,
    label: Option<String>,
    state: Cell<Lifecycle>,
}

/// A shared handle to one canvas node.
///
/// Clones refer to the same node, so a canvas used as a brush or mask by several parents is
/// executed once and its surface reused. Nodes are immutable after [`CanvasBuilder::build`],
/// which keeps the reference graph acyclic.
#[derive(Clone)]
pub struct Canvas(Rc<CanvasNode>);

/// Builder for [`Canvas`].
#[derive(Debug)]
pub struct CanvasBuilder {
    origin: Origin,
    steps: Vec<Step>,
    output: Option<String>,
    label: Option<String>,
}

impl CanvasBuilder {
    pub fn step(mut self, step: impl Into<Step>) -> Self {
        self.steps.push(step.into());
        self
    }

    pub fn steps<S: Into<Step>>(mut self, steps: impl IntoIterator<Item = S>) -> Self {
        self.steps.extend(steps.into_iter().map(Into::into));
        self
    }

    /// Target file name; the canvas's value becomes a file instead of a data URI.
    pub fn output(mut self, name: impl Into<String>) -> Self {
        self.output = Some(name.into());
        self
    }

    /// Name used in logs and error messages.
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn build(self) -> Canvas {
        Canvas(Rc::new(CanvasNode {
            origin: self.origin,
            steps: self.steps,
            output: self.output,
            label: self.label,
            state: Cell::new(Lifecycle::Unexecuted),
        }))
    }
}

impl Canvas {
    pub fn blank(width: u32, height: u32) -> CanvasBuilder {
        Self::builder(Origin::Blank { width, height })
    }

    pub fn load(path: impl Into<PathBuf>) -> CanvasBuilder {
        Self::builder(Origin::File(path.into()))
    }

    pub fn builder(origin: Origin) -> CanvasBuilder {
        CanvasBuilder {
            origin,
            steps: Vec::new(),
            output: None,
            label: None,
        }
    }

    pub fn origin(&self) -> &Origin {
        &self.0.origin
    }

    pub fn steps(&self) -> &[Step] {
        &self.0.steps
    }

    pub fn output_name(&self) -> Option<&str> {
        self.0.output.as_deref()
    }

    pub fn label(&self) -> String {
        match (&self.0.label, &self.0.origin) {
            (Some(label), _) => label.clone(),
            (None, Origin::Blank { width, height }) => format!("{width}x{height}"),
            (None, Origin::File(path)) => path.display().to_string(),
        }
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.0.state.get()
    }

    pub fn is_executed(&self) -> bool {
        matches!(self.lifecycle(), Lifecycle::Executed(_))
    }

    /// Whether both handles refer to the same node.
    pub fn ptr_eq(&self, other: &Canvas) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    pub fn width(&self, renderer: &mut dyn Renderer) -> EaselResult<u32> {
        let done = self.execute(renderer)?;
        Ok(renderer.surface_size(done.surface)?.0)
    }

    pub fn height(&self, renderer: &mut dyn Renderer) -> EaselResult<u32> {
        let done = self.execute(renderer)?;
        Ok(renderer.surface_size(done.surface)?.1)
    }

    /// X of the final current point; `0` when the path had none.
    pub fn x(&self, renderer: &mut dyn Renderer) -> EaselResult<f64> {
        Ok(self.execute(renderer)?.current_point.map_or(0.0, |p| p.0))
    }

    /// Y of the final current point; `0` when the path had none.
    pub fn y(&self, renderer: &mut dyn Renderer) -> EaselResult<f64> {
        Ok(self.execute(renderer)?.current_point.map_or(0.0, |p| p.1))
    }

    /// PNG bytes of the executed surface.
    pub fn to_png(&self, renderer: &mut dyn Renderer) -> EaselResult<Vec<u8>> {
        let done = self.execute(renderer)?;
        renderer.encode_png(done.surface)
    }
}

impl fmt::Debug for Canvas {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Canvas")
            .field("label", &self.label())
            .field("steps", &self.0.steps.len())
            .field("state", &self.0.state.get())
            .finish()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/canvas/canvas.rs"]
mod tests;
