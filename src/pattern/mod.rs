//! Compiles the variadic `brush`, `dashPattern` and `mask` argument lists into typed values.

pub mod brush;
pub mod mask;
pub mod stops;

use crate::{
    action::value::Value,
    foundation::error::{EaselError, EaselResult},
};

pub use brush::{Brush, compile_brush};
pub use mask::{Mask, compile_mask};
pub use stops::{GradientStop, infer_color_stops};

/// Dash lengths, passed through unchanged. Fewer than two lengths clears the dash when executed.
pub fn compile_dash(args: &[Value]) -> EaselResult<Vec<f64>> {
    args.iter()
        .enumerate()
        .map(|(index, v)| {
            v.as_number().ok_or(EaselError::ArgumentType {
                action: "dashPattern",
                index,
                expected: "a number",
            })
        })
        .collect()
}

/// Extend mode given either as a token (`repeat`) or as its numeric index
/// (`0` none, `1` repeat, `2` reflect, `3` pad).
pub(crate) fn extend_mode(action: &'static str, index: usize, value: &Value) -> EaselResult<String> {
    const MODES: [&str; 4] = ["none", "repeat", "reflect", "pad"];
    if let Some(token) = value.as_token() {
        return Ok(token);
    }
    value
        .as_number()
        .filter(|n| n.fract() == 0.0 && *n >= 0.0)
        .and_then(|n| MODES.get(n as usize))
        .map(|m| (*m).to_owned())
        .ok_or(EaselError::ArgumentType {
            action,
            index,
            expected: "an extend mode",
        })
}
