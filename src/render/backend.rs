use std::{
    path::Path,
    sync::atomic::{AtomicU64, Ordering},
};

use serde::{Deserialize, Serialize};

use crate::{foundation::error::EaselResult, pattern::GradientStop};

/// Identifier for a surface owned by a [`Renderer`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct SurfaceId(pub u32);

/// Process-unique identity of a renderer instance. Surface ids are only meaningful to the
/// renderer that issued them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct RendererId(pub u64);

impl RendererId {
    pub fn fresh() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// Opaque snapshot of a paint source, as pushed by `store`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct SourceId(pub u32);

/// A gradient under construction (see [`Renderer::create_gradient`]).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct GradientId(pub u32);

/// Geometry of a gradient paint source, in user space.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum GradientShape {
    Linear {
        x0: f64,
        y0: f64,
        x1: f64,
        y1: f64,
    },
    Radial {
        x0: f64,
        y0: f64,
        r0: f64,
        x1: f64,
        y1: f64,
        r1: f64,
    },
}

/// Callback run inside a compositing helper such as [`Renderer::slow_blur`].
pub type DrawFn<'a> = dyn FnMut(&mut dyn Renderer) -> EaselResult<()> + 'a;

/// The drawing capability the canvas engine drives.
///
/// A renderer owns surfaces and a stack of drawing contexts: [`Renderer::begin_context`]
/// binds a fresh context to a surface and every drawing call targets the innermost context
/// until the matching [`Renderer::end_context`]. Nested canvases (brushes, masks) are executed
/// by pushing another context on top.
///
/// Token arguments (`antialias`, `fill_rule`, `line_cap`, `line_join`, extend modes) are the
/// author's raw keywords; resolving them is up to the backend.
pub trait Renderer {
    /// Short backend name used in error messages.
    fn backend_name(&self) -> &'static str;
    fn renderer_id(&self) -> RendererId;

    /// Surface ids are reused after [`Renderer::release_surface`].
    fn create_surface(&mut self, width: u32, height: u32) -> EaselResult<SurfaceId>;
    fn load_surface(&mut self, path: &Path) -> EaselResult<SurfaceId>;
    fn surface_size(&self, surface: SurfaceId) -> EaselResult<(u32, u32)>;
    fn encode_png(&mut self, surface: SurfaceId) -> EaselResult<Vec<u8>>;
    /// Frees a surface no context is bound to.
    fn release_surface(&mut self, surface: SurfaceId) -> EaselResult<()>;

    fn begin_context(&mut self, surface: SurfaceId) -> EaselResult<()>;
    fn end_context(&mut self) -> EaselResult<()>;

    fn move_to(&mut self, x: f64, y: f64) -> EaselResult<()>;
    fn line_to(&mut self, x: f64, y: f64) -> EaselResult<()>;
    fn curve_to(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, x3: f64, y3: f64)
    -> EaselResult<()>;
    /// Clockwise arc (angles in radians).
    fn arc(&mut self, xc: f64, yc: f64, radius: f64, angle1: f64, angle2: f64)
    -> EaselResult<()>;
    /// Counter-clockwise arc (angles in radians).
    fn arc_negative(
        &mut self,
        xc: f64,
        yc: f64,
        radius: f64,
        angle1: f64,
        angle2: f64,
    ) -> EaselResult<()>;
    fn close_path(&mut self) -> EaselResult<()>;
    fn new_path(&mut self) -> EaselResult<()>;
    fn new_sub_path(&mut self) -> EaselResult<()>;
    /// Current point in user space, if the path has one.
    fn current_point(&self) -> EaselResult<Option<(f64, f64)>>;

    fn paint(&mut self) -> EaselResult<()>;
    fn stroke_preserve(&mut self) -> EaselResult<()>;
    fn fill_preserve(&mut self) -> EaselResult<()>;
    fn push_group(&mut self) -> EaselResult<()>;
    fn pop_group_to_source(&mut self) -> EaselResult<()>;
    fn clip_preserve(&mut self) -> EaselResult<()>;
    fn reset_clip(&mut self) -> EaselResult<()>;
    fn save(&mut self) -> EaselResult<()>;
    fn restore(&mut self) -> EaselResult<()>;

    fn set_antialias(&mut self, mode: &str) -> EaselResult<()>;
    fn set_fill_rule(&mut self, rule: &str) -> EaselResult<()>;
    fn set_line_cap(&mut self, cap: &str) -> EaselResult<()>;
    fn set_line_join(&mut self, join: &str) -> EaselResult<()>;
    fn set_miter_limit(&mut self, limit: f64) -> EaselResult<()>;
    fn set_line_width(&mut self, width: f64) -> EaselResult<()>;
    fn set_tolerance(&mut self, tolerance: f64) -> EaselResult<()>;
    /// An empty slice turns dashing off.
    fn set_dash(&mut self, dashes: &[f64]) -> EaselResult<()>;

    fn translate(&mut self, tx: f64, ty: f64) -> EaselResult<()>;
    fn scale(&mut self, sx: f64, sy: f64) -> EaselResult<()>;
    fn rotate(&mut self, angle: f64) -> EaselResult<()>;
    /// Multiplies the current transform by `[xx, yx, xy, yy, x0, y0]`.
    fn transform(&mut self, matrix: [f64; 6]) -> EaselResult<()>;

    fn set_source_rgba(&mut self, r: f64, g: f64, b: f64, a: f64) -> EaselResult<()>;
    fn create_gradient(&mut self, shape: GradientShape) -> EaselResult<GradientId>;
    fn add_color_stop(&mut self, gradient: GradientId, stop: &GradientStop) -> EaselResult<()>;
    fn set_source_gradient(&mut self, gradient: GradientId) -> EaselResult<()>;
    fn set_source_surface(&mut self, surface: SurfaceId, extend: Option<&str>) -> EaselResult<()>;
    /// Snapshot of the current paint source.
    fn source(&mut self) -> EaselResult<SourceId>;
    fn set_source(&mut self, source: SourceId) -> EaselResult<()>;

    /// Paints the current source through `surface` wrapped as a pattern.
    fn mask_pattern(&mut self, surface: SurfaceId, extend: &str) -> EaselResult<()>;
    /// Paints the current source through `surface` placed at `(x, y)`.
    fn mask_surface(&mut self, surface: SurfaceId, x: f64, y: f64) -> EaselResult<()>;
    /// Paints the current source through a stored paint source.
    fn mask_source(&mut self, source: SourceId) -> EaselResult<()>;

    /// Runs `draw` into an isolated group and composites a blurred copy of it.
    fn slow_blur(&mut self, radius: f64, draw: &mut DrawFn<'_>) -> EaselResult<()>;
}

/// Available renderer backends.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// CPU raster backend on `tiny-skia`.
    #[default]
    Cpu,
    /// Dry-run backend recording every call.
    Recording,
}

/// Create a renderer implementation.
pub fn create_renderer(kind: BackendKind) -> Box<dyn Renderer> {
    match kind {
        BackendKind::Cpu => Box::new(crate::render::cpu::CpuRenderer::new()),
        BackendKind::Recording => Box::new(crate::render::recording::RecordingRenderer::new()),
    }
}
