use crate::{action::command::Command, canvas::Canvas, foundation::color::Color};

/// A loosely typed argument as supplied by the authoring layer.
#[derive(Clone, Debug)]
pub enum Value {
    Number(f64),
    Token(String),
    Color(Color),
    List(Vec<Value>),
    Command(Box<Command>),
    Canvas(Canvas),
}

pub(crate) const RETRIEVE: &str = "retrieve";

impl Value {
    pub fn token(s: impl Into<String>) -> Self {
        Self::Token(s.into())
    }

    pub fn list(items: impl IntoIterator<Item = Value>) -> Self {
        Self::List(items.into_iter().collect())
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn is_number(&self) -> bool {
        matches!(self, Value::Number(_))
    }

    /// A color value, or a token spelling a color. The `retrieve` keyword is never a color.
    pub fn as_color(&self) -> Option<Color> {
        match self {
            Value::Color(c) => Some(*c),
            Value::Token(t) if !t.eq_ignore_ascii_case(RETRIEVE) => Color::parse(t),
            _ => None,
        }
    }

    pub fn is_retrieve(&self) -> bool {
        matches!(self, Value::Token(t) if t.trim().eq_ignore_ascii_case(RETRIEVE))
    }

    /// Raw token text. Colors yield their CSS spelling.
    pub fn as_token(&self) -> Option<String> {
        match self {
            Value::Token(t) => Some(t.clone()),
            Value::Color(c) => Some(c.to_string()),
            _ => None,
        }
    }

    pub fn as_canvas(&self) -> Option<&Canvas> {
        match self {
            Value::Canvas(c) => Some(c),
            _ => None,
        }
    }

    /// Short rendering used in error messages.
    pub fn describe(&self) -> String {
        match self {
            Value::Number(n) => n.to_string(),
            Value::Token(t) => format!("'{t}'"),
            Value::Color(c) => c.to_string(),
            Value::List(items) => {
                let inner: Vec<String> = items.iter().map(Value::describe).collect();
                format!("({})", inner.join(" "))
            }
            Value::Command(cmd) => format!("{}(..)", cmd.action()),
            Value::Canvas(c) => format!("{c:?}"),
        }
    }
}

pub(crate) fn describe_all(values: &[Value]) -> String {
    let parts: Vec<String> = values.iter().map(Value::describe).collect();
    format!("[{}]", parts.join(", "))
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Number(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Number(f64::from(v))
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Token(v.to_owned())
    }
}

impl From<Color> for Value {
    fn from(v: Color) -> Self {
        Value::Color(v)
    }
}

impl From<Canvas> for Value {
    fn from(v: Canvas) -> Self {
        Value::Canvas(v)
    }
}

impl From<Command> for Value {
    fn from(v: Command) -> Self {
        Value::Command(Box::new(v))
    }
}
