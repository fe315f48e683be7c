use std::path::Path;

use serde::Serialize;

use crate::{
    foundation::error::{EaselError, EaselResult},
    pattern::GradientStop,
    render::backend::{
        DrawFn, GradientId, GradientShape, Renderer, RendererId, SourceId, SurfaceId,
    },
};

/// One renderer call as seen by [`RecordingRenderer`].
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "call", rename_all = "snake_case")]
pub enum Call {
    CreateSurface { surface: SurfaceId, width: u32, height: u32 },
    BeginContext { surface: SurfaceId },
    EndContext,
    MoveTo { x: f64, y: f64 },
    LineTo { x: f64, y: f64 },
    CurveTo { x1: f64, y1: f64, x2: f64, y2: f64, x3: f64, y3: f64 },
    Arc { xc: f64, yc: f64, radius: f64, angle1: f64, angle2: f64 },
    ArcNegative { xc: f64, yc: f64, radius: f64, angle1: f64, angle2: f64 },
    ClosePath,
    NewPath,
    NewSubPath,
    Paint,
    StrokePreserve,
    FillPreserve,
    PushGroup,
    PopGroupToSource { source: SourceId },
    ClipPreserve,
    ResetClip,
    Save,
    Restore,
    SetAntialias { mode: String },
    SetFillRule { rule: String },
    SetLineCap { cap: String },
    SetLineJoin { join: String },
    SetMiterLimit { limit: f64 },
    SetLineWidth { width: f64 },
    SetTolerance { tolerance: f64 },
    SetDash { dashes: Vec<f64> },
    Translate { tx: f64, ty: f64 },
    Scale { sx: f64, sy: f64 },
    Rotate { angle: f64 },
    Transform { matrix: [f64; 6] },
    SetSourceRgba { r: f64, g: f64, b: f64, a: f64 },
    CreateGradient { gradient: GradientId, shape: GradientShape },
    AddColorStop { gradient: GradientId, stop: GradientStop },
    SetSourceGradient { gradient: GradientId },
    SetSourceSurface { surface: SurfaceId, extend: Option<String> },
    Source { source: SourceId },
    SetSource { source: SourceId },
    MaskPattern { surface: SurfaceId, extend: String },
    MaskSurface { surface: SurfaceId, x: f64, y: f64 },
    MaskSource { source: SourceId },
    ReleaseSurface { surface: SurfaceId },
    SlowBlurBegin { radius: f64 },
    SlowBlurEnd,
}

#[derive(Clone, Copy, Debug, Default)]
struct PathCursor {
    current: Option<(f64, f64)>,
    subpath_start: Option<(f64, f64)>,
}

/// Dry-run renderer that records calls instead of drawing.
///
/// It tracks surface sizes and a user-space current point (transforms are not applied) so
/// that property reads and `quadraticCurve` behave. It cannot load or encode images.
#[derive(Debug)]
pub struct RecordingRenderer {
    id: RendererId,
    calls: Vec<Call>,
    surfaces: Vec<Option<(u32, u32)>>,
    contexts: Vec<(SurfaceId, PathCursor)>,
    next_source: u32,
    next_gradient: u32,
}

impl Default for RecordingRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self {
            id: RendererId::fresh(),
            calls: Vec::new(),
            surfaces: Vec::new(),
            contexts: Vec::new(),
            next_source: 0,
            next_gradient: 0,
        }
    }

    pub fn calls(&self) -> &[Call] {
        &self.calls
    }

    pub fn take_calls(&mut self) -> Vec<Call> {
        std::mem::take(&mut self.calls)
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls.iter().filter(|c| pred(c)).count()
    }

    fn record(&mut self, call: Call) -> EaselResult<()> {
        if self.contexts.is_empty()
            && !matches!(
                call,
                Call::CreateSurface { .. } | Call::BeginContext { .. } | Call::ReleaseSurface { .. }
            )
        {
            return Err(EaselError::render("drawing call outside of a context"));
        }
        self.calls.push(call);
        Ok(())
    }

    fn cursor(&mut self) -> &mut PathCursor {
        // `record` guarantees a context exists for every drawing call.
        let last = self.contexts.len().saturating_sub(1);
        &mut self.contexts[last].1
    }

    fn move_cursor(&mut self, x: f64, y: f64, starts_subpath: bool) {
        let cursor = self.cursor();
        if starts_subpath || cursor.current.is_none() {
            cursor.subpath_start = Some((x, y));
        }
        cursor.current = Some((x, y));
    }

    fn new_source(&mut self) -> SourceId {
        self.next_source += 1;
        SourceId(self.next_source)
    }

    fn check_surface(&self, surface: SurfaceId) -> EaselResult<(u32, u32)> {
        self.surfaces
            .get(surface.0 as usize)
            .copied()
            .flatten()
            .ok_or_else(|| EaselError::render(format!("unknown surface {surface:?}")))
    }
}

impl Renderer for RecordingRenderer {
    fn backend_name(&self) -> &'static str {
        "recording"
    }

    fn renderer_id(&self) -> RendererId {
        self.id
    }

    fn create_surface(&mut self, width: u32, height: u32) -> EaselResult<SurfaceId> {
        let surface = match self.surfaces.iter().position(Option::is_none) {
            Some(free) => {
                self.surfaces[free] = Some((width, height));
                SurfaceId(free as u32)
            }
            None => {
                self.surfaces.push(Some((width, height)));
                SurfaceId(self.surfaces.len() as u32 - 1)
            }
        };
        self.record(Call::CreateSurface {
            surface,
            width,
            height,
        })?;
        Ok(surface)
    }

    fn load_surface(&mut self, _path: &Path) -> EaselResult<SurfaceId> {
        Err(EaselError::CapabilityMissing {
            backend: self.backend_name(),
            operation: "load_surface",
        })
    }

    fn surface_size(&self, surface: SurfaceId) -> EaselResult<(u32, u32)> {
        self.check_surface(surface)
    }

    fn encode_png(&mut self, _surface: SurfaceId) -> EaselResult<Vec<u8>> {
        Err(EaselError::CapabilityMissing {
            backend: self.backend_name(),
            operation: "encode_png",
        })
    }

    fn release_surface(&mut self, surface: SurfaceId) -> EaselResult<()> {
        self.check_surface(surface)?;
        if self.contexts.iter().any(|(bound, _)| *bound == surface) {
            return Err(EaselError::render(format!(
                "surface {surface:?} is still bound to a context"
            )));
        }
        self.record(Call::ReleaseSurface { surface })?;
        self.surfaces[surface.0 as usize] = None;
        Ok(())
    }

    fn begin_context(&mut self, surface: SurfaceId) -> EaselResult<()> {
        self.check_surface(surface)?;
        self.record(Call::BeginContext { surface })?;
        self.contexts.push((surface, PathCursor::default()));
        Ok(())
    }

    fn end_context(&mut self) -> EaselResult<()> {
        self.record(Call::EndContext)?;
        self.contexts.pop();
        Ok(())
    }

    fn move_to(&mut self, x: f64, y: f64) -> EaselResult<()> {
        self.record(Call::MoveTo { x, y })?;
        self.move_cursor(x, y, true);
        Ok(())
    }

    fn line_to(&mut self, x: f64, y: f64) -> EaselResult<()> {
        self.record(Call::LineTo { x, y })?;
        self.move_cursor(x, y, false);
        Ok(())
    }

    fn curve_to(
        &mut self,
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        x3: f64,
        y3: f64,
    ) -> EaselResult<()> {
        self.record(Call::CurveTo {
            x1,
            y1,
            x2,
            y2,
            x3,
            y3,
        })?;
        self.move_cursor(x3, y3, false);
        Ok(())
    }

    fn arc(&mut self, xc: f64, yc: f64, radius: f64, angle1: f64, angle2: f64) -> EaselResult<()> {
        self.record(Call::Arc {
            xc,
            yc,
            radius,
            angle1,
            angle2,
        })?;
        self.move_cursor(
            xc + radius * angle2.cos(),
            yc + radius * angle2.sin(),
            false,
        );
        Ok(())
    }

    fn arc_negative(
        &mut self,
        xc: f64,
        yc: f64,
        radius: f64,
        angle1: f64,
        angle2: f64,
    ) -> EaselResult<()> {
        self.record(Call::ArcNegative {
            xc,
            yc,
            radius,
            angle1,
            angle2,
        })?;
        self.move_cursor(
            xc + radius * angle2.cos(),
            yc + radius * angle2.sin(),
            false,
        );
        Ok(())
    }

    fn close_path(&mut self) -> EaselResult<()> {
        self.record(Call::ClosePath)?;
        let cursor = self.cursor();
        cursor.current = cursor.subpath_start;
        Ok(())
    }

    fn new_path(&mut self) -> EaselResult<()> {
        self.record(Call::NewPath)?;
        *self.cursor() = PathCursor::default();
        Ok(())
    }

    fn new_sub_path(&mut self) -> EaselResult<()> {
        self.record(Call::NewSubPath)?;
        self.cursor().current = None;
        Ok(())
    }

    fn current_point(&self) -> EaselResult<Option<(f64, f64)>> {
        Ok(self.contexts.last().and_then(|(_, c)| c.current))
    }

    fn paint(&mut self) -> EaselResult<()> {
        self.record(Call::Paint)
    }

    fn stroke_preserve(&mut self) -> EaselResult<()> {
        self.record(Call::StrokePreserve)
    }

    fn fill_preserve(&mut self) -> EaselResult<()> {
        self.record(Call::FillPreserve)
    }

    fn push_group(&mut self) -> EaselResult<()> {
        self.record(Call::PushGroup)
    }

    fn pop_group_to_source(&mut self) -> EaselResult<()> {
        let source = self.new_source();
        self.record(Call::PopGroupToSource { source })
    }

    fn clip_preserve(&mut self) -> EaselResult<()> {
        self.record(Call::ClipPreserve)
    }

    fn reset_clip(&mut self) -> EaselResult<()> {
        self.record(Call::ResetClip)
    }

    fn save(&mut self) -> EaselResult<()> {
        self.record(Call::Save)
    }

    fn restore(&mut self) -> EaselResult<()> {
        self.record(Call::Restore)
    }

    fn set_antialias(&mut self, mode: &str) -> EaselResult<()> {
        self.record(Call::SetAntialias {
            mode: mode.to_owned(),
        })
    }

    fn set_fill_rule(&mut self, rule: &str) -> EaselResult<()> {
        self.record(Call::SetFillRule {
            rule: rule.to_owned(),
        })
    }

    fn set_line_cap(&mut self, cap: &str) -> EaselResult<()> {
        self.record(Call::SetLineCap {
            cap: cap.to_owned(),
        })
    }

    fn set_line_join(&mut self, join: &str) -> EaselResult<()> {
        self.record(Call::SetLineJoin {
            join: join.to_owned(),
        })
    }

    fn set_miter_limit(&mut self, limit: f64) -> EaselResult<()> {
        self.record(Call::SetMiterLimit { limit })
    }

    fn set_line_width(&mut self, width: f64) -> EaselResult<()> {
        self.record(Call::SetLineWidth { width })
    }

    fn set_tolerance(&mut self, tolerance: f64) -> EaselResult<()> {
        self.record(Call::SetTolerance { tolerance })
    }

    fn set_dash(&mut self, dashes: &[f64]) -> EaselResult<()> {
        self.record(Call::SetDash {
            dashes: dashes.to_vec(),
        })
    }

    fn translate(&mut self, tx: f64, ty: f64) -> EaselResult<()> {
        self.record(Call::Translate { tx, ty })
    }

    fn scale(&mut self, sx: f64, sy: f64) -> EaselResult<()> {
        self.record(Call::Scale { sx, sy })
    }

    fn rotate(&mut self, angle: f64) -> EaselResult<()> {
        self.record(Call::Rotate { angle })
    }

    fn transform(&mut self, matrix: [f64; 6]) -> EaselResult<()> {
        self.record(Call::Transform { matrix })
    }

    fn set_source_rgba(&mut self, r: f64, g: f64, b: f64, a: f64) -> EaselResult<()> {
        self.record(Call::SetSourceRgba { r, g, b, a })
    }

    fn create_gradient(&mut self, shape: GradientShape) -> EaselResult<GradientId> {
        self.next_gradient += 1;
        let gradient = GradientId(self.next_gradient);
        self.record(Call::CreateGradient { gradient, shape })?;
        Ok(gradient)
    }

    fn add_color_stop(&mut self, gradient: GradientId, stop: &GradientStop) -> EaselResult<()> {
        self.record(Call::AddColorStop {
            gradient,
            stop: *stop,
        })
    }

    fn set_source_gradient(&mut self, gradient: GradientId) -> EaselResult<()> {
        self.record(Call::SetSourceGradient { gradient })
    }

    fn set_source_surface(&mut self, surface: SurfaceId, extend: Option<&str>) -> EaselResult<()> {
        self.check_surface(surface)?;
        self.record(Call::SetSourceSurface {
            surface,
            extend: extend.map(str::to_owned),
        })
    }

    fn source(&mut self) -> EaselResult<SourceId> {
        let source = self.new_source();
        self.record(Call::Source { source })?;
        Ok(source)
    }

    fn set_source(&mut self, source: SourceId) -> EaselResult<()> {
        self.record(Call::SetSource { source })
    }

    fn mask_pattern(&mut self, surface: SurfaceId, extend: &str) -> EaselResult<()> {
        self.check_surface(surface)?;
        self.record(Call::MaskPattern {
            surface,
            extend: extend.to_owned(),
        })
    }

    fn mask_surface(&mut self, surface: SurfaceId, x: f64, y: f64) -> EaselResult<()> {
        self.check_surface(surface)?;
        self.record(Call::MaskSurface { surface, x, y })
    }

    fn mask_source(&mut self, source: SourceId) -> EaselResult<()> {
        self.record(Call::MaskSource { source })
    }

    fn slow_blur(&mut self, radius: f64, draw: &mut DrawFn<'_>) -> EaselResult<()> {
        self.record(Call::SlowBlurBegin { radius })?;
        draw(self)?;
        self.record(Call::SlowBlurEnd)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/recording.rs"]
mod tests;
