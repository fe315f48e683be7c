pub type EaselResult<T> = Result<T, EaselError>;

/// Every failure the action validator, pattern compiler, canvas engine and renderers can report.
///
/// Validation and compilation errors are raised before any renderer call is made for the
/// canvas being executed; render errors abort the execution in progress.
#[derive(thiserror::Error, Debug)]
pub enum EaselError {
    #[error("({family}) '{action}' is not a recognised action; expected one of: {}", recognized.join(", "))]
    UnknownAction {
        family: &'static str,
        action: String,
        recognized: Vec<&'static str>,
    },

    #[error("({family}.{action}) wrong number of arguments ({got} for {want})")]
    ArityMismatch {
        family: &'static str,
        action: &'static str,
        got: usize,
        want: usize,
    },

    /// `index` is the 0-based position in the action's argument list.
    #[error("({action}) argument {index} must be {expected}")]
    ArgumentType {
        action: &'static str,
        index: usize,
        expected: &'static str,
    },

    #[error("(pattern.brush) unsupported brush type: {0}")]
    UnsupportedBrushType(String),

    #[error("(pattern.mask) unsupported mask type: {0}")]
    UnsupportedMaskType(String),

    #[error("(pattern.brush) unsupported gradient brush type: {0}")]
    UnsupportedGradientArgCount(String),

    #[error("(pattern.brush) unsupported gradient color-stop: {0}")]
    UnsupportedColorStop(String),

    #[error("({action}) unsupported canvas reference: {detail}")]
    UnsupportedCanvasReference {
        action: &'static str,
        detail: String,
    },

    #[error("({backend}) renderer does not provide '{operation}'")]
    CapabilityMissing {
        backend: &'static str,
        operation: &'static str,
    },

    #[error("foreign renderer: {0}")]
    ForeignRenderer(String),

    #[error("canvas cycle: {0}")]
    CanvasCycle(String),

    #[error("({0}) source stack is empty")]
    EmptySourceStack(&'static str),

    #[error("render error: {0}")]
    Render(String),

    #[error("document error: {0}")]
    Document(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl EaselError {
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    pub fn document(msg: impl Into<String>) -> Self {
        Self::Document(msg.into())
    }

    pub fn cycle(msg: impl Into<String>) -> Self {
        Self::CanvasCycle(msg.into())
    }

    pub fn canvas_reference(action: &'static str, detail: impl Into<String>) -> Self {
        Self::UnsupportedCanvasReference {
            action,
            detail: detail.into(),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
