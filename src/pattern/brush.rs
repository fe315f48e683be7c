use crate::{
    action::value::{Value, describe_all},
    canvas::Canvas,
    foundation::error::{EaselError, EaselResult},
    pattern::{
        extend_mode,
        stops::{GradientStop, infer_color_stops},
    },
};

/// A resolved paint source.
#[derive(Clone, Debug)]
pub enum Brush {
    Solid {
        r: f64,
        g: f64,
        b: f64,
        a: f64,
    },
    Linear {
        x0: f64,
        y0: f64,
        x1: f64,
        y1: f64,
        stops: Vec<GradientStop>,
    },
    Radial {
        x0: f64,
        y0: f64,
        r0: f64,
        x1: f64,
        y1: f64,
        r1: f64,
        stops: Vec<GradientStop>,
    },
    /// Another canvas's surface used as a pattern. The canvas is shared, not owned.
    Canvas {
        canvas: Canvas,
        extend: Option<String>,
    },
    /// Pop the paint source stack.
    Retrieve,
}

/// Resolves a `brush(...)` argument list by arity and argument kinds.
///
/// | args | result |
/// |---|---|
/// | `(color)` | `Solid` |
/// | `(retrieve)` | `Retrieve` |
/// | `(canvas)` / `(canvas, extend)` | `Canvas` |
/// | `(x0, y0, x1, y1, stops..)` | `Linear` |
/// | `(x0, y0, r0, x1, y1, r1, stops..)` | `Radial` |
pub fn compile_brush(args: &[Value]) -> EaselResult<Brush> {
    match args {
        [single] => {
            if single.is_retrieve() {
                Ok(Brush::Retrieve)
            } else if let Some(color) = single.as_color() {
                let [r, g, b, a] = color.components();
                Ok(Brush::Solid { r, g, b, a })
            } else if let Some(canvas) = single.as_canvas() {
                Ok(Brush::Canvas {
                    canvas: canvas.clone(),
                    extend: None,
                })
            } else {
                Err(EaselError::UnsupportedBrushType(describe_all(args)))
            }
        }
        [Value::Canvas(canvas), extend] => Ok(Brush::Canvas {
            canvas: canvas.clone(),
            extend: Some(extend_mode("brush", 1, extend)?),
        }),
        [other, _] => Err(EaselError::canvas_reference(
            "brush",
            format!("{} is not a canvas", other.describe()),
        )),
        _ if args.len() > 4 => compile_gradient(args),
        _ => Err(EaselError::UnsupportedBrushType(describe_all(args))),
    }
}

fn compile_gradient(args: &[Value]) -> EaselResult<Brush> {
    let prefix = args.iter().take_while(|v| v.is_number()).count();
    let coords: Vec<f64> = args[..prefix].iter().filter_map(Value::as_number).collect();
    let rest = &args[prefix..];
    if rest.is_empty() {
        return Err(EaselError::UnsupportedGradientArgCount(describe_all(args)));
    }

    match *coords.as_slice() {
        [x0, y0, x1, y1] => Ok(Brush::Linear {
            x0,
            y0,
            x1,
            y1,
            stops: infer_color_stops(rest)?,
        }),
        [x0, y0, r0, x1, y1, r1] => Ok(Brush::Radial {
            x0,
            y0,
            r0,
            x1,
            y1,
            r1,
            stops: infer_color_stops(rest)?,
        }),
        _ => Err(EaselError::UnsupportedGradientArgCount(describe_all(args))),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/pattern/brush.rs"]
mod tests;
