pub use kurbo::{Affine, BezPath, Point};

/// Degrees (as authored) to radians (as consumed by renderers).
pub fn radians(degrees: f64) -> f64 {
    degrees * (std::f64::consts::PI / 180.0)
}

/// Lowercased renderer token with `-` folded into `_`, e.g. `Even-Odd` -> `even_odd`.
pub fn normalize_token(token: &str) -> String {
    token.trim().to_ascii_lowercase().replace('-', "_")
}

/// The two cubic control points equivalent to a quadratic segment from `from` through `ctrl`
/// to `to` (exact degree elevation).
pub fn quad_to_cubic(from: Point, ctrl: Point, to: Point) -> (Point, Point) {
    const K: f64 = 2.0 / 3.0;
    let c1 = Point::new(from.x + K * (ctrl.x - from.x), from.y + K * (ctrl.y - from.y));
    let c2 = Point::new(to.x + K * (ctrl.x - to.x), to.y + K * (ctrl.y - to.y));
    (c1, c2)
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
