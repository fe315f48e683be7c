use crate::{
    action::value::{Value, describe_all},
    canvas::Canvas,
    foundation::error::{EaselError, EaselResult},
    pattern::extend_mode,
};

/// A resolved `mask(...)`.
#[derive(Clone, Debug)]
pub enum Mask {
    /// Mask with the paint source popped from the source stack.
    Retrieve,
    /// Mask with a canvas wrapped as a pattern using `extend`.
    Pattern { canvas: Canvas, extend: String },
    /// Mask with a canvas's surface placed at `(x, y)`.
    Surface { canvas: Canvas, x: f64, y: f64 },
}

pub fn compile_mask(args: &[Value]) -> EaselResult<Mask> {
    let Some((first, rest)) = args.split_first() else {
        return Err(EaselError::UnsupportedMaskType(describe_all(args)));
    };

    if first.is_retrieve() && rest.is_empty() {
        return Ok(Mask::Retrieve);
    }
    let Some(canvas) = first.as_canvas() else {
        return Err(EaselError::UnsupportedMaskType(describe_all(args)));
    };
    let canvas = canvas.clone();

    match rest {
        [] => Ok(Mask::Surface {
            canvas,
            x: 0.0,
            y: 0.0,
        }),
        [extend] => Ok(Mask::Pattern {
            canvas,
            extend: extend_mode("mask", 1, extend)?,
        }),
        [x, y] => {
            let number = |index: usize, v: &Value| {
                v.as_number().ok_or(EaselError::ArgumentType {
                    action: "mask",
                    index,
                    expected: "a number",
                })
            };
            Ok(Mask::Surface {
                canvas,
                x: number(1, x)?,
                y: number(2, y)?,
            })
        }
        _ => Err(EaselError::UnsupportedMaskType(describe_all(args))),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/pattern/mask.rs"]
mod tests;
