use std::{f64::consts::TAU, io::Cursor, path::Path, rc::Rc};

use anyhow::Context as _;
use kurbo::{Affine, BezPath, PathEl, Point, Vec2};
use resvg::tiny_skia::{
    self, FillRule, FilterQuality, IntSize, LineCap, LineJoin, LinearGradient, Mask, MaskType,
    Paint, Pattern, Pixmap, PixmapPaint, RadialGradient, Rect, Shader, SpreadMode, Stroke,
    StrokeDash, Transform,
};
use tracing::{debug, trace};

use crate::{
    foundation::{
        core::normalize_token,
        error::{EaselError, EaselResult},
    },
    pattern::GradientStop,
    render::{
        backend::{
            DrawFn, GradientId, GradientShape, Renderer, RendererId, SourceId, SurfaceId,
        },
        blur::gaussian_blur_premul,
    },
};

const DEFAULT_TOLERANCE: f64 = 0.1;
const DEFAULT_MITER_LIMIT: f64 = 10.0;

/// Surface-pattern extend mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Extend {
    None,
    Repeat,
    Reflect,
    Pad,
}

impl Extend {
    fn parse(token: &str) -> EaselResult<Self> {
        match normalize_token(token).as_str() {
            "none" => Ok(Self::None),
            "repeat" => Ok(Self::Repeat),
            "reflect" => Ok(Self::Reflect),
            "pad" => Ok(Self::Pad),
            other => Err(EaselError::render(format!("unknown extend mode '{other}'"))),
        }
    }
}

/// A paint source. `ctm` maps its geometry to device space.
#[derive(Clone, Debug)]
enum Source {
    Solid(tiny_skia::Color),
    Linear {
        start: Point,
        end: Point,
        stops: Vec<GradientStop>,
        ctm: Affine,
    },
    Radial {
        start: Point,
        end: Point,
        radius: f64,
        stops: Vec<GradientStop>,
        ctm: Affine,
    },
    Surface {
        pixmap: Rc<Pixmap>,
        spread: SpreadMode,
        ctm: Affine,
    },
}

impl Source {
    /// A surface placed at the user-space origin of `ctm`.
    ///
    /// `Extend::None` has no tiny-skia spread mode; it is emulated by padding the image with a
    /// transparent border and clamping to it.
    fn surface(pixmap: &Pixmap, extend: Extend, ctm: Affine) -> EaselResult<Self> {
        let (pixmap, spread, ctm) = match extend {
            Extend::None => (
                padded(pixmap)?,
                SpreadMode::Pad,
                ctm * Affine::translate((-1.0, -1.0)),
            ),
            Extend::Repeat => (pixmap.clone(), SpreadMode::Repeat, ctm),
            Extend::Reflect => (pixmap.clone(), SpreadMode::Reflect, ctm),
            Extend::Pad => (pixmap.clone(), SpreadMode::Pad, ctm),
        };
        Ok(Source::Surface {
            pixmap: Rc::new(pixmap),
            spread,
            ctm,
        })
    }

    /// The same source with `m` applied ahead of its own transform.
    fn transformed(&self, m: Affine) -> Self {
        let mut out = self.clone();
        match &mut out {
            Source::Solid(_) => {}
            Source::Linear { ctm, .. }
            | Source::Radial { ctm, .. }
            | Source::Surface { ctm, .. } => *ctm = m * *ctm,
        }
        out
    }

    fn shader(&self) -> Shader<'_> {
        match self {
            Source::Solid(color) => Shader::SolidColor(*color),
            Source::Linear {
                start,
                end,
                stops,
                ctm,
            } => LinearGradient::new(
                sk_point(*start),
                sk_point(*end),
                sk_stops(stops),
                SpreadMode::Pad,
                sk_transform(*ctm),
            )
            .unwrap_or(Shader::SolidColor(tiny_skia::Color::TRANSPARENT)),
            Source::Radial {
                start,
                end,
                radius,
                stops,
                ctm,
            } => RadialGradient::new(
                sk_point(*start),
                sk_point(*end),
                *radius as f32,
                sk_stops(stops),
                SpreadMode::Pad,
                sk_transform(*ctm),
            )
            .unwrap_or(Shader::SolidColor(tiny_skia::Color::TRANSPARENT)),
            Source::Surface {
                pixmap,
                spread,
                ctm,
            } => Pattern::new(
                Pixmap::as_ref(pixmap),
                *spread,
                FilterQuality::Bilinear,
                1.0,
                sk_transform(*ctm),
            ),
        }
    }
}

/// Graphics state saved by `save`/`push_group` and restored by `restore`/`pop_group_to_source`.
#[derive(Clone, Debug)]
struct GState {
    ctm: Affine,
    source: Source,
    /// The transform that was current when `source` was set.
    source_ctm: Affine,
    clip: Option<Rc<Mask>>,
    line_width: f64,
    line_cap: LineCap,
    line_join: LineJoin,
    miter_limit: f64,
    dash: Vec<f64>,
    fill_rule: FillRule,
    anti_alias: bool,
    tolerance: f64,
}

impl Default for GState {
    fn default() -> Self {
        Self {
            ctm: Affine::IDENTITY,
            source: Source::Solid(tiny_skia::Color::BLACK),
            source_ctm: Affine::IDENTITY,
            clip: None,
            line_width: 2.0,
            line_cap: LineCap::Butt,
            line_join: LineJoin::Miter,
            miter_limit: DEFAULT_MITER_LIMIT,
            dash: Vec::new(),
            fill_rule: FillRule::Winding,
            anti_alias: true,
            tolerance: DEFAULT_TOLERANCE,
        }
    }
}

impl GState {
    /// Sets the source, locking it to the current transform.
    fn lock(&mut self, source: Source) {
        self.source = source;
        self.source_ctm = self.ctm;
    }

    /// The source in its own pattern space, detached from the transform it was locked to.
    fn unlocked_source(&self) -> Source {
        if self.source_ctm.determinant().abs() <= f64::EPSILON {
            return self.source.clone();
        }
        self.source.transformed(self.source_ctm.inverse())
    }
}

struct Group {
    pixmap: Pixmap,
    /// Depth of the save stack right after the group was pushed.
    depth: usize,
}

/// One drawing context bound to a surface. The path lives in device space and is not part of
/// the saved state.
struct Context {
    surface: SurfaceId,
    state: GState,
    saved: Vec<GState>,
    groups: Vec<Group>,
    path: BezPath,
    current: Option<Point>,
    subpath_start: Option<Point>,
}

impl Context {
    fn new(surface: SurfaceId) -> Self {
        Self {
            surface,
            state: GState::default(),
            saved: Vec::new(),
            groups: Vec::new(),
            path: BezPath::new(),
            current: None,
            subpath_start: None,
        }
    }

    fn device(&self, x: f64, y: f64) -> Point {
        self.state.ctm * Point::new(x, y)
    }

    fn move_device(&mut self, p: Point) {
        self.path.move_to(p);
        self.current = Some(p);
        self.subpath_start = Some(p);
    }

    fn group_floor(&self) -> usize {
        self.groups.last().map_or(0, |g| g.depth)
    }
}

/// CPU raster renderer on `tiny-skia`, with cairo-like drawing semantics.
///
/// Surfaces are premultiplied RGBA8 pixmaps. Images are decoded and PNGs encoded with `image`.
/// Released surface slots are reused; stored sources and gradients live as long as the
/// renderer.
pub struct CpuRenderer {
    id: RendererId,
    surfaces: Vec<Option<Pixmap>>,
    contexts: Vec<Context>,
    sources: Vec<Source>,
    gradients: Vec<(GradientShape, Vec<GradientStop>)>,
}

impl Default for CpuRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl CpuRenderer {
    pub fn new() -> Self {
        Self {
            id: RendererId::fresh(),
            surfaces: Vec::new(),
            contexts: Vec::new(),
            sources: Vec::new(),
            gradients: Vec::new(),
        }
    }

    /// Premultiplied RGBA8 pixel at `(x, y)`, for inspection.
    pub fn pixel(&self, surface: SurfaceId, x: u32, y: u32) -> EaselResult<[u8; 4]> {
        let pixmap = self.surface(surface)?;
        let px = pixmap
            .pixel(x, y)
            .ok_or_else(|| EaselError::render(format!("pixel ({x}, {y}) out of bounds")))?;
        Ok([px.red(), px.green(), px.blue(), px.alpha()])
    }

    fn surface(&self, surface: SurfaceId) -> EaselResult<&Pixmap> {
        self.surfaces
            .get(surface.0 as usize)
            .and_then(Option::as_ref)
            .ok_or_else(|| EaselError::render(format!("unknown surface {surface:?}")))
    }

    fn push_surface(&mut self, pixmap: Pixmap) -> SurfaceId {
        match self.surfaces.iter().position(Option::is_none) {
            Some(free) => {
                self.surfaces[free] = Some(pixmap);
                SurfaceId(free as u32)
            }
            None => {
                self.surfaces.push(Some(pixmap));
                SurfaceId(self.surfaces.len() as u32 - 1)
            }
        }
    }

    fn ctx(&self) -> EaselResult<&Context> {
        self.contexts.last().ok_or_else(no_context)
    }

    fn ctx_mut(&mut self) -> EaselResult<&mut Context> {
        self.contexts.last_mut().ok_or_else(no_context)
    }

    fn state_mut(&mut self) -> EaselResult<&mut GState> {
        Ok(&mut self.ctx_mut()?.state)
    }

    /// Runs `f` against the innermost draw target with a snapshot of the state and path.
    fn draw(
        &mut self,
        f: impl FnOnce(&mut Pixmap, &GState, &BezPath) -> EaselResult<()>,
    ) -> EaselResult<()> {
        let ctx = self.contexts.last_mut().ok_or_else(no_context)?;
        let state = ctx.state.clone();
        let path = ctx.path.clone();
        let target = match ctx.groups.last_mut() {
            Some(group) => &mut group.pixmap,
            None => self
                .surfaces
                .get_mut(ctx.surface.0 as usize)
                .and_then(Option::as_mut)
                .ok_or_else(|| EaselError::render("context surface is gone"))?,
        };
        f(target, &state, &path)
    }

    fn stored_source(&self, source: SourceId) -> EaselResult<&Source> {
        self.sources
            .get(source.0 as usize)
            .ok_or_else(|| EaselError::render(format!("unknown source {source:?}")))
    }

    fn target_size(&self) -> EaselResult<(u32, u32)> {
        let ctx = self.ctx()?;
        match ctx.groups.last() {
            Some(group) => Ok((group.pixmap.width(), group.pixmap.height())),
            None => {
                let pixmap = self.surface(ctx.surface)?;
                Ok((pixmap.width(), pixmap.height()))
            }
        }
    }

    fn arc_impl(
        &mut self,
        center: Point,
        radius: f64,
        angle1: f64,
        angle2: f64,
        negative: bool,
    ) -> EaselResult<()> {
        if !(angle1.is_finite() && angle2.is_finite() && radius.is_finite()) {
            return Err(EaselError::render("arc arguments must be finite"));
        }
        let mut end = angle2;
        if negative {
            while end > angle1 {
                end -= TAU;
            }
        } else {
            while end < angle1 {
                end += TAU;
            }
        }

        let ctx = self.ctx_mut()?;
        let start = ctx.device(
            center.x + radius * angle1.cos(),
            center.y + radius * angle1.sin(),
        );
        match ctx.current {
            Some(_) => {
                ctx.path.line_to(start);
                ctx.current = Some(start);
            }
            None => ctx.move_device(start),
        }

        let arc = kurbo::Arc::new(center, Vec2::new(radius, radius), angle1, end - angle1, 0.0);
        let ctm = ctx.state.ctm;
        arc.append_iter(ctx.state.tolerance)
            .for_each(|el| ctx.path.push(ctm * el));
        ctx.current = Some(ctx.device(
            center.x + radius * end.cos(),
            center.y + radius * end.sin(),
        ));
        Ok(())
    }

    /// Paints the current source through the alpha of `mask_source`, respecting the clip.
    fn mask_with(&mut self, mask_source: &Source) -> EaselResult<()> {
        let (width, height) = self.target_size()?;
        let mut alpha = new_pixmap(width, height)?;
        fill_all(&mut alpha, mask_source.shader(), true, None)?;
        let mask = Mask::from_pixmap(alpha.as_ref(), MaskType::Alpha);

        self.draw(|target, state, _| {
            let mut layer = new_pixmap(width, height)?;
            fill_all(
                &mut layer,
                state.source.shader(),
                state.anti_alias,
                state.clip.as_deref(),
            )?;
            layer.apply_mask(&mask);
            target.draw_pixmap(
                0,
                0,
                layer.as_ref(),
                &PixmapPaint::default(),
                Transform::identity(),
                None,
            );
            Ok(())
        })
    }

    fn pop_group(&mut self) -> EaselResult<Pixmap> {
        let ctx = self.ctx_mut()?;
        let group = ctx
            .groups
            .pop()
            .ok_or_else(|| EaselError::render("pop without a matching push"))?;
        if ctx.saved.len() != group.depth {
            return Err(EaselError::render("unbalanced save/restore inside a group"));
        }
        ctx.state = ctx
            .saved
            .pop()
            .ok_or_else(|| EaselError::render("group lost its saved state"))?;
        Ok(group.pixmap)
    }
}

impl Renderer for CpuRenderer {
    fn backend_name(&self) -> &'static str {
        "cpu"
    }

    fn renderer_id(&self) -> RendererId {
        self.id
    }

    fn create_surface(&mut self, width: u32, height: u32) -> EaselResult<SurfaceId> {
        let pixmap = new_pixmap(width, height)?;
        let id = self.push_surface(pixmap);
        debug!(?id, width, height, "create surface");
        Ok(id)
    }

    #[tracing::instrument(skip(self))]
    fn load_surface(&mut self, path: &Path) -> EaselResult<SurfaceId> {
        let bytes =
            std::fs::read(path).with_context(|| format!("read image '{}'", path.display()))?;
        let rgba = image::load_from_memory(&bytes)
            .with_context(|| format!("decode image '{}'", path.display()))?
            .to_rgba8();
        let (width, height) = rgba.dimensions();
        let mut data = rgba.into_raw();
        premultiply_in_place(&mut data);

        let size = IntSize::from_wh(width, height)
            .ok_or_else(|| EaselError::render(format!("'{}' is empty", path.display())))?;
        let pixmap = Pixmap::from_vec(data, size)
            .ok_or_else(|| EaselError::render("decoded image has an invalid layout"))?;
        let id = self.push_surface(pixmap);
        debug!(?id, width, height, "loaded surface");
        Ok(id)
    }

    fn surface_size(&self, surface: SurfaceId) -> EaselResult<(u32, u32)> {
        let pixmap = self.surface(surface)?;
        Ok((pixmap.width(), pixmap.height()))
    }

    #[tracing::instrument(skip(self))]
    fn encode_png(&mut self, surface: SurfaceId) -> EaselResult<Vec<u8>> {
        let pixmap = self.surface(surface)?;
        let mut data = pixmap.data().to_vec();
        demultiply_in_place(&mut data);
        let img = image::RgbaImage::from_raw(pixmap.width(), pixmap.height(), data)
            .ok_or_else(|| EaselError::render("surface buffer does not match its size"))?;

        let mut buf = Vec::new();
        image::DynamicImage::ImageRgba8(img)
            .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
            .context("encode png")?;
        Ok(buf)
    }

    fn release_surface(&mut self, surface: SurfaceId) -> EaselResult<()> {
        if self.contexts.iter().any(|ctx| ctx.surface == surface) {
            return Err(EaselError::render(format!(
                "surface {surface:?} is still bound to a context"
            )));
        }
        let slot = self
            .surfaces
            .get_mut(surface.0 as usize)
            .filter(|slot| slot.is_some())
            .ok_or_else(|| EaselError::render(format!("unknown surface {surface:?}")))?;
        *slot = None;
        debug!(?surface, "released surface");
        Ok(())
    }

    fn begin_context(&mut self, surface: SurfaceId) -> EaselResult<()> {
        self.surface(surface)?;
        self.contexts.push(Context::new(surface));
        trace!(?surface, depth = self.contexts.len(), "begin context");
        Ok(())
    }

    fn end_context(&mut self) -> EaselResult<()> {
        self.contexts.pop().ok_or_else(no_context)?;
        Ok(())
    }

    fn move_to(&mut self, x: f64, y: f64) -> EaselResult<()> {
        let ctx = self.ctx_mut()?;
        let p = ctx.device(x, y);
        ctx.move_device(p);
        Ok(())
    }

    fn line_to(&mut self, x: f64, y: f64) -> EaselResult<()> {
        let ctx = self.ctx_mut()?;
        let p = ctx.device(x, y);
        if ctx.current.is_none() {
            ctx.move_device(p);
        } else {
            ctx.path.line_to(p);
            ctx.current = Some(p);
        }
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
        let ctx = self.ctx_mut()?;
        let (p1, p2, p3) = (ctx.device(x1, y1), ctx.device(x2, y2), ctx.device(x3, y3));
        if ctx.current.is_none() {
            ctx.move_device(p1);
        }
        ctx.path.curve_to(p1, p2, p3);
        ctx.current = Some(p3);
        Ok(())
    }

    fn arc(&mut self, xc: f64, yc: f64, radius: f64, angle1: f64, angle2: f64) -> EaselResult<()> {
        self.arc_impl(Point::new(xc, yc), radius, angle1, angle2, false)
    }

    fn arc_negative(
        &mut self,
        xc: f64,
        yc: f64,
        radius: f64,
        angle1: f64,
        angle2: f64,
    ) -> EaselResult<()> {
        self.arc_impl(Point::new(xc, yc), radius, angle1, angle2, true)
    }

    fn close_path(&mut self) -> EaselResult<()> {
        let ctx = self.ctx_mut()?;
        if ctx.current.is_some() {
            ctx.path.close_path();
            ctx.current = ctx.subpath_start;
        }
        Ok(())
    }

    fn new_path(&mut self) -> EaselResult<()> {
        let ctx = self.ctx_mut()?;
        ctx.path = BezPath::new();
        ctx.current = None;
        ctx.subpath_start = None;
        Ok(())
    }

    fn new_sub_path(&mut self) -> EaselResult<()> {
        self.ctx_mut()?.current = None;
        Ok(())
    }

    fn current_point(&self) -> EaselResult<Option<(f64, f64)>> {
        let ctx = self.ctx()?;
        Ok(ctx.current.map(|p| {
            let user = ctx.state.ctm.inverse() * p;
            (user.x, user.y)
        }))
    }

    fn paint(&mut self) -> EaselResult<()> {
        self.draw(|target, state, _| {
            fill_all(
                target,
                state.source.shader(),
                state.anti_alias,
                state.clip.as_deref(),
            )
        })
    }

    fn stroke_preserve(&mut self) -> EaselResult<()> {
        self.draw(|target, state, path| {
            if state.line_width <= 0.0 || state.ctm.determinant() == 0.0 {
                return Ok(());
            }
            // Strokes are shaped in user space so width and dashes follow the transform.
            let user = state.ctm.inverse() * path.clone();
            let Some(path) = sk_path(&user) else {
                return Ok(());
            };
            let stroke = Stroke {
                width: state.line_width as f32,
                miter_limit: state.miter_limit as f32,
                line_cap: state.line_cap,
                line_join: state.line_join,
                dash: sk_dash(&state.dash)?,
            };
            let paint = sk_paint(state);
            target.stroke_path(
                &path,
                &paint,
                &stroke,
                sk_transform(state.ctm),
                state.clip.as_deref(),
            );
            Ok(())
        })
    }

    fn fill_preserve(&mut self) -> EaselResult<()> {
        self.draw(|target, state, path| {
            if let Some(path) = sk_path(path) {
                let paint = sk_paint(state);
                target.fill_path(
                    &path,
                    &paint,
                    state.fill_rule,
                    Transform::identity(),
                    state.clip.as_deref(),
                );
            }
            Ok(())
        })
    }

    fn push_group(&mut self) -> EaselResult<()> {
        let (width, height) = self.target_size()?;
        let pixmap = new_pixmap(width, height)?;
        let ctx = self.ctx_mut()?;
        ctx.saved.push(ctx.state.clone());
        ctx.groups.push(Group {
            pixmap,
            depth: ctx.saved.len(),
        });
        Ok(())
    }

    fn pop_group_to_source(&mut self) -> EaselResult<()> {
        let pixmap = self.pop_group()?;
        let source = Source::surface(&pixmap, Extend::None, Affine::IDENTITY)?;
        self.state_mut()?.lock(source);
        Ok(())
    }

    fn clip_preserve(&mut self) -> EaselResult<()> {
        let (width, height) = self.target_size()?;
        let ctx = self.ctx_mut()?;
        let state = &mut ctx.state;
        let Some(path) = sk_path(&ctx.path) else {
            // Clipping to an empty path clips everything.
            let empty = Mask::new(width, height)
                .ok_or_else(|| EaselError::render("cannot allocate clip mask"))?;
            state.clip = Some(Rc::new(empty));
            return Ok(());
        };
        match state.clip.as_mut() {
            Some(mask) => Rc::make_mut(mask).intersect_path(
                &path,
                state.fill_rule,
                state.anti_alias,
                Transform::identity(),
            ),
            None => {
                let mut mask = Mask::new(width, height)
                    .ok_or_else(|| EaselError::render("cannot allocate clip mask"))?;
                mask.fill_path(
                    &path,
                    state.fill_rule,
                    state.anti_alias,
                    Transform::identity(),
                );
                state.clip = Some(Rc::new(mask));
            }
        }
        Ok(())
    }

    fn reset_clip(&mut self) -> EaselResult<()> {
        self.state_mut()?.clip = None;
        Ok(())
    }

    fn save(&mut self) -> EaselResult<()> {
        let ctx = self.ctx_mut()?;
        ctx.saved.push(ctx.state.clone());
        Ok(())
    }

    fn restore(&mut self) -> EaselResult<()> {
        let ctx = self.ctx_mut()?;
        if ctx.saved.len() <= ctx.group_floor() {
            return Err(EaselError::render("restore without a matching save"));
        }
        if let Some(state) = ctx.saved.pop() {
            ctx.state = state;
        }
        Ok(())
    }

    fn set_antialias(&mut self, mode: &str) -> EaselResult<()> {
        let anti_alias = match normalize_token(mode).as_str() {
            "none" => false,
            "default" | "gray" | "subpixel" | "fast" | "good" | "best" => true,
            other => return Err(EaselError::render(format!("unknown antialias '{other}'"))),
        };
        self.state_mut()?.anti_alias = anti_alias;
        Ok(())
    }

    fn set_fill_rule(&mut self, rule: &str) -> EaselResult<()> {
        let rule = match normalize_token(rule).as_str() {
            "winding" | "nonzero" => FillRule::Winding,
            "even_odd" | "evenodd" => FillRule::EvenOdd,
            other => return Err(EaselError::render(format!("unknown fill rule '{other}'"))),
        };
        self.state_mut()?.fill_rule = rule;
        Ok(())
    }

    fn set_line_cap(&mut self, cap: &str) -> EaselResult<()> {
        let cap = match normalize_token(cap).as_str() {
            "butt" => LineCap::Butt,
            "round" => LineCap::Round,
            "square" => LineCap::Square,
            other => return Err(EaselError::render(format!("unknown line cap '{other}'"))),
        };
        self.state_mut()?.line_cap = cap;
        Ok(())
    }

    fn set_line_join(&mut self, join: &str) -> EaselResult<()> {
        let join = match normalize_token(join).as_str() {
            "miter" => LineJoin::Miter,
            "round" => LineJoin::Round,
            "bevel" => LineJoin::Bevel,
            other => return Err(EaselError::render(format!("unknown line join '{other}'"))),
        };
        self.state_mut()?.line_join = join;
        Ok(())
    }

    fn set_miter_limit(&mut self, limit: f64) -> EaselResult<()> {
        self.state_mut()?.miter_limit = limit;
        Ok(())
    }

    fn set_line_width(&mut self, width: f64) -> EaselResult<()> {
        self.state_mut()?.line_width = width;
        Ok(())
    }

    fn set_tolerance(&mut self, tolerance: f64) -> EaselResult<()> {
        // kurbo needs a positive flattening tolerance.
        self.state_mut()?.tolerance = if tolerance > 0.0 {
            tolerance
        } else {
            DEFAULT_TOLERANCE
        };
        Ok(())
    }

    fn set_dash(&mut self, dashes: &[f64]) -> EaselResult<()> {
        if dashes.iter().any(|d| !d.is_finite() || *d < 0.0) {
            return Err(EaselError::render(
                "dash lengths must be finite and non-negative",
            ));
        }
        self.state_mut()?.dash = dashes.to_vec();
        Ok(())
    }

    fn translate(&mut self, tx: f64, ty: f64) -> EaselResult<()> {
        let state = self.state_mut()?;
        state.ctm = state.ctm * Affine::translate((tx, ty));
        Ok(())
    }

    fn scale(&mut self, sx: f64, sy: f64) -> EaselResult<()> {
        let state = self.state_mut()?;
        state.ctm = state.ctm * Affine::scale_non_uniform(sx, sy);
        Ok(())
    }

    fn rotate(&mut self, angle: f64) -> EaselResult<()> {
        let state = self.state_mut()?;
        state.ctm = state.ctm * Affine::rotate(angle);
        Ok(())
    }

    fn transform(&mut self, matrix: [f64; 6]) -> EaselResult<()> {
        let state = self.state_mut()?;
        state.ctm = state.ctm * Affine::new(matrix);
        Ok(())
    }

    fn set_source_rgba(&mut self, r: f64, g: f64, b: f64, a: f64) -> EaselResult<()> {
        self.state_mut()?.lock(Source::Solid(sk_color(r, g, b, a)));
        Ok(())
    }

    fn create_gradient(&mut self, shape: GradientShape) -> EaselResult<GradientId> {
        let id = GradientId(self.gradients.len() as u32);
        self.gradients.push((shape, Vec::new()));
        Ok(id)
    }

    fn add_color_stop(&mut self, gradient: GradientId, stop: &GradientStop) -> EaselResult<()> {
        let (_, stops) = self
            .gradients
            .get_mut(gradient.0 as usize)
            .ok_or_else(|| EaselError::render(format!("unknown gradient {gradient:?}")))?;
        stops.push(*stop);
        Ok(())
    }

    fn set_source_gradient(&mut self, gradient: GradientId) -> EaselResult<()> {
        let (shape, stops) = self
            .gradients
            .get(gradient.0 as usize)
            .cloned()
            .ok_or_else(|| EaselError::render(format!("unknown gradient {gradient:?}")))?;
        let state = self.state_mut()?;
        let ctm = state.ctm;
        let source = match shape {
            GradientShape::Linear { x0, y0, x1, y1 } => Source::Linear {
                start: Point::new(x0, y0),
                end: Point::new(x1, y1),
                stops,
                ctm,
            },
            // tiny-skia's two-point gradient has a single radius; r0 is not representable.
            GradientShape::Radial {
                x0, y0, x1, y1, r1, ..
            } => Source::Radial {
                start: Point::new(x0, y0),
                end: Point::new(x1, y1),
                radius: r1,
                stops,
                ctm,
            },
        };
        state.lock(source);
        Ok(())
    }

    fn set_source_surface(&mut self, surface: SurfaceId, extend: Option<&str>) -> EaselResult<()> {
        let extend = extend.map(Extend::parse).transpose()?.unwrap_or(Extend::None);
        let ctm = self.ctx()?.state.ctm;
        let source = Source::surface(self.surface(surface)?, extend, ctm)?;
        self.state_mut()?.lock(source);
        Ok(())
    }

    fn source(&mut self) -> EaselResult<SourceId> {
        let source = self.ctx()?.state.unlocked_source();
        let id = SourceId(self.sources.len() as u32);
        self.sources.push(source);
        Ok(id)
    }

    fn set_source(&mut self, source: SourceId) -> EaselResult<()> {
        let ctm = self.ctx()?.state.ctm;
        let source = self.stored_source(source)?.transformed(ctm);
        self.state_mut()?.lock(source);
        Ok(())
    }

    fn mask_pattern(&mut self, surface: SurfaceId, extend: &str) -> EaselResult<()> {
        let extend = Extend::parse(extend)?;
        let ctm = self.ctx()?.state.ctm;
        let mask = Source::surface(self.surface(surface)?, extend, ctm)?;
        self.mask_with(&mask)
    }

    fn mask_surface(&mut self, surface: SurfaceId, x: f64, y: f64) -> EaselResult<()> {
        let ctm = self.ctx()?.state.ctm * Affine::translate((x, y));
        let mask = Source::surface(self.surface(surface)?, Extend::None, ctm)?;
        self.mask_with(&mask)
    }

    fn mask_source(&mut self, source: SourceId) -> EaselResult<()> {
        // A stored source follows the transform current at the time it is used.
        let mask = self
            .stored_source(source)?
            .transformed(self.ctx()?.state.ctm);
        self.mask_with(&mask)
    }

    fn slow_blur(&mut self, radius: f64, draw: &mut DrawFn<'_>) -> EaselResult<()> {
        self.push_group()?;
        draw(self)?;
        let group = self.pop_group()?;

        let (width, height) = (group.width(), group.height());
        let radius_px = radius.clamp(0.0, f64::from(width.max(height))).round() as u32;
        let blurred = gaussian_blur_premul(group.data(), width, height, radius_px)?;
        let size = IntSize::from_wh(width, height)
            .ok_or_else(|| EaselError::render("blur group is empty"))?;
        let blurred = Pixmap::from_vec(blurred, size)
            .ok_or_else(|| EaselError::render("blurred buffer has an invalid layout"))?;
        trace!(radius_px, width, height, "slow blur");

        self.draw(|target, state, _| {
            target.draw_pixmap(
                0,
                0,
                blurred.as_ref(),
                &PixmapPaint::default(),
                Transform::identity(),
                state.clip.as_deref(),
            );
            Ok(())
        })
    }
}

fn no_context() -> EaselError {
    EaselError::render("no drawing context is active")
}

fn new_pixmap(width: u32, height: u32) -> EaselResult<Pixmap> {
    Pixmap::new(width, height)
        .ok_or_else(|| EaselError::render(format!("cannot allocate a {width}x{height} surface")))
}

fn padded(src: &Pixmap) -> EaselResult<Pixmap> {
    let mut out = new_pixmap(src.width() + 2, src.height() + 2)?;
    out.draw_pixmap(
        1,
        1,
        src.as_ref(),
        &PixmapPaint::default(),
        Transform::identity(),
        None,
    );
    Ok(out)
}

fn fill_all(
    target: &mut Pixmap,
    shader: Shader<'_>,
    anti_alias: bool,
    clip: Option<&Mask>,
) -> EaselResult<()> {
    let rect = Rect::from_xywh(0.0, 0.0, target.width() as f32, target.height() as f32)
        .ok_or_else(|| EaselError::render("draw target is empty"))?;
    let mut paint = Paint::default();
    paint.shader = shader;
    paint.anti_alias = anti_alias;
    target.fill_rect(rect, &paint, Transform::identity(), clip);
    Ok(())
}

fn sk_paint(state: &GState) -> Paint<'_> {
    let mut paint = Paint::default();
    paint.shader = state.source.shader();
    paint.anti_alias = state.anti_alias;
    paint
}

fn sk_color(r: f64, g: f64, b: f64, a: f64) -> tiny_skia::Color {
    let c = |v: f64| v.clamp(0.0, 1.0) as f32;
    tiny_skia::Color::from_rgba(c(r), c(g), c(b), c(a)).unwrap_or(tiny_skia::Color::TRANSPARENT)
}

fn sk_stops(stops: &[GradientStop]) -> Vec<tiny_skia::GradientStop> {
    stops
        .iter()
        .map(|s| {
            tiny_skia::GradientStop::new(s.offset as f32, sk_color(s.r, s.g, s.b, s.a))
        })
        .collect()
}

fn sk_point(p: Point) -> tiny_skia::Point {
    tiny_skia::Point::from_xy(p.x as f32, p.y as f32)
}

fn sk_transform(a: Affine) -> Transform {
    let [sx, ky, kx, sy, tx, ty] = a.as_coeffs().map(|v| v as f32);
    Transform::from_row(sx, ky, kx, sy, tx, ty)
}

/// Odd-length dash lists repeat once so on/off pairs line up.
fn sk_dash(dashes: &[f64]) -> EaselResult<Option<StrokeDash>> {
    if dashes.is_empty() {
        return Ok(None);
    }
    let mut lengths: Vec<f32> = dashes.iter().map(|d| *d as f32).collect();
    if lengths.len() % 2 == 1 {
        lengths.extend_from_within(..);
    }
    StrokeDash::new(lengths, 0.0)
        .map(Some)
        .ok_or_else(|| EaselError::render("dash pattern has no visible length"))
}

fn sk_path(path: &BezPath) -> Option<tiny_skia::Path> {
    let mut pb = tiny_skia::PathBuilder::new();
    let f = |v: f64| v as f32;
    for el in path.elements() {
        match *el {
            PathEl::MoveTo(p) => pb.move_to(f(p.x), f(p.y)),
            PathEl::LineTo(p) => pb.line_to(f(p.x), f(p.y)),
            PathEl::QuadTo(p1, p2) => pb.quad_to(f(p1.x), f(p1.y), f(p2.x), f(p2.y)),
            PathEl::CurveTo(p1, p2, p3) => pb.cubic_to(
                f(p1.x),
                f(p1.y),
                f(p2.x),
                f(p2.y),
                f(p3.x),
                f(p3.y),
            ),
            PathEl::ClosePath => pb.close(),
        }
    }
    pb.finish()
}

fn premultiply_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = u16::from(px[3]);
        for c in &mut px[..3] {
            *c = ((u16::from(*c) * a + 127) / 255) as u8;
        }
    }
}

fn demultiply_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = u16::from(px[3]);
        if a == 0 {
            px[..3].fill(0);
            continue;
        }
        for c in &mut px[..3] {
            *c = ((u16::from(*c) * 255 + a / 2) / a).min(255) as u8;
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
