use serde::Serialize;

use crate::{
    action::value::Value,
    foundation::{
        color::Color,
        error::{EaselError, EaselResult},
    },
};

/// One gradient color stop. All fields are in `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct GradientStop {
    pub offset: f64,
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

impl GradientStop {
    fn new(offset_pct: f64, color: Color) -> Self {
        let [r, g, b, a] = color.components();
        Self {
            offset: offset_pct / 100.0,
            r,
            g,
            b,
            a,
        }
    }
}

enum StopArg {
    Implicit(Color),
    Explicit(f64, Color),
}

fn classify(value: &Value) -> EaselResult<StopArg> {
    if let Some(color) = value.as_color() {
        return Ok(StopArg::Implicit(color));
    }
    if let Value::List(items) = value
        && let [a, b] = items.as_slice()
    {
        // Both `(50 blue)` and `(blue 50)` spell the same stop.
        match (a.as_number(), b.as_color(), b.as_number(), a.as_color()) {
            (Some(offset), Some(color), _, _) | (_, _, Some(offset), Some(color))
                if offset.is_finite() =>
            {
                return Ok(StopArg::Explicit(offset, color));
            }
            _ => {}
        }
    }
    Err(EaselError::UnsupportedColorStop(value.describe()))
}

/// Resolves a color-stop list, inferring the offsets of bare colors.
///
/// Explicit offsets are percentages. A leading bare color sits at 0%, a trailing one at 100%,
/// and a run of bare colors in between is spread evenly up to the next explicit offset (or
/// 100% when none follows). An offset lower than its predecessor is raised to it, so the
/// returned offsets never decrease.
pub fn infer_color_stops(list: &[Value]) -> EaselResult<Vec<GradientStop>> {
    let args = list.iter().map(classify).collect::<EaselResult<Vec<_>>>()?;

    let mut stops = Vec::with_capacity(args.len());
    let mut last_offset = 0.0f64;
    for (index, arg) in args.iter().enumerate() {
        let (offset, color) = match *arg {
            StopArg::Explicit(offset, color) => (offset, color),
            StopArg::Implicit(color) if index == 0 => (0.0, color),
            StopArg::Implicit(color) if index == args.len() - 1 => (100.0, color),
            StopArg::Implicit(color) => {
                let mut span = 0usize;
                let mut next_offset = None;
                for next in &args[index..] {
                    span += 1;
                    if let StopArg::Explicit(offset, _) = next {
                        next_offset = Some(*offset);
                        break;
                    }
                }
                let next_offset = next_offset.unwrap_or(100.0);
                (
                    last_offset + (next_offset - last_offset) / span as f64,
                    color,
                )
            }
        };

        let offset = offset.clamp(last_offset, 100.0);
        last_offset = offset;
        stops.push(GradientStop::new(offset, color));
    }
    Ok(stops)
}

#[cfg(test)]
#[path = "../../tests/unit/pattern/stops.rs"]
mod tests;
