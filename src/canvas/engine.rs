use tracing::debug;

use crate::{
    action::command::{Command, Step},
    canvas::{Canvas, Executed, Lifecycle, Origin},
    foundation::{
        core::{Point, quad_to_cubic},
        error::{EaselError, EaselResult},
    },
    pattern::{Brush, Mask},
    render::backend::{GradientShape, Renderer, SourceId, SurfaceId},
};

/// Line width every fresh context starts with.
pub(crate) const DEFAULT_LINE_WIDTH: f64 = 1.0;

/// A step list with raw names resolved and blur bodies flattened into nested programs.
enum Op {
    Cmd(Command),
    Blur { radius: f64, ops: Vec<Op> },
}

fn compile(steps: &[Step]) -> EaselResult<Vec<Op>> {
    steps
        .iter()
        .map(|step| match step.resolve()? {
            Command::SlowBlur { radius, steps } => Ok(Op::Blur {
                radius,
                ops: compile(&steps)?,
            }),
            cmd => Ok(Op::Cmd(cmd)),
        })
        .collect()
}

impl Canvas {
    /// Executes the action list against `renderer`, once.
    ///
    /// Later calls on the same renderer return the first result without touching it; asking
    /// another renderer fails with [`EaselError::ForeignRenderer`]. Raw action names are
    /// resolved before the first renderer call, so an unknown name leaves no surface behind.
    /// Re-entering a canvas that is still executing fails with [`EaselError::CanvasCycle`];
    /// a failed execution releases its surface and returns the canvas to `Unexecuted`.
    #[tracing::instrument(skip_all, fields(canvas = %self.label()))]
    pub fn execute(&self, renderer: &mut dyn Renderer) -> EaselResult<Executed> {
        match self.0.state.get() {
            Lifecycle::Executed(done) if done.renderer == renderer.renderer_id() => {
                debug!("already executed");
                return Ok(done);
            }
            Lifecycle::Executed(done) => {
                return Err(EaselError::ForeignRenderer(format!(
                    "canvas '{}' was drawn by renderer {} and cannot be used with renderer {}",
                    self.label(),
                    done.renderer.0,
                    renderer.renderer_id().0
                )));
            }
            Lifecycle::Executing => {
                return Err(EaselError::cycle(format!(
                    "canvas '{}' is referenced while it is being drawn",
                    self.label()
                )));
            }
            Lifecycle::Unexecuted => {}
        }

        let program = compile(&self.0.steps)?;

        self.0.state.set(Lifecycle::Executing);
        match self.run(renderer, &program) {
            Ok(done) => {
                self.0.state.set(Lifecycle::Executed(done));
                Ok(done)
            }
            Err(err) => {
                self.0.state.set(Lifecycle::Unexecuted);
                Err(err)
            }
        }
    }

    /// Resolves the action list without drawing anything.
    pub fn check(&self) -> EaselResult<()> {
        compile(&self.0.steps).map(|_| ())
    }

    fn run(&self, renderer: &mut dyn Renderer, program: &[Op]) -> EaselResult<Executed> {
        let surface = match &self.0.origin {
            Origin::Blank { width, height } => renderer.create_surface(*width, *height)?,
            Origin::File(path) => renderer.load_surface(path)?,
        };

        match draw(renderer, surface, program) {
            Ok(current_point) => {
                debug!(?surface, "executed");
                Ok(Executed {
                    surface,
                    renderer: renderer.renderer_id(),
                    current_point,
                })
            }
            Err(err) => {
                if let Err(release) = renderer.release_surface(surface) {
                    debug!(?surface, %release, "could not release surface");
                }
                Err(err)
            }
        }
    }
}

fn draw(
    renderer: &mut dyn Renderer,
    surface: SurfaceId,
    program: &[Op],
) -> EaselResult<Option<(f64, f64)>> {
    renderer.begin_context(surface)?;
    let mut exec = Execution::default();
    let drawn = renderer
        .set_line_width(DEFAULT_LINE_WIDTH)
        .and_then(|()| exec.run_all(renderer, program))
        .and_then(|()| renderer.current_point());
    let ended = renderer.end_context();
    let current_point = drawn?;
    ended?;
    Ok(current_point)
}

/// Per-execution state: the paint source stack.
#[derive(Default)]
struct Execution {
    sources: Vec<SourceId>,
}

impl Execution {
    fn run_all(&mut self, r: &mut dyn Renderer, ops: &[Op]) -> EaselResult<()> {
        for op in ops {
            match op {
                Op::Cmd(cmd) => self.apply(r, cmd)?,
                Op::Blur { radius, ops } => {
                    debug!(radius, "slowBlur");
                    r.slow_blur(*radius, &mut |inner: &mut dyn Renderer| {
                        self.run_all(inner, ops)
                    })?;
                }
            }
        }
        Ok(())
    }

    fn pop_source(&mut self, action: &'static str) -> EaselResult<SourceId> {
        self.sources
            .pop()
            .ok_or(EaselError::EmptySourceStack(action))
    }

    fn apply(&mut self, r: &mut dyn Renderer, cmd: &Command) -> EaselResult<()> {
        debug!(action = %cmd.action(), "apply");
        match cmd {
            Command::Move { x, y } => r.move_to(*x, *y),
            Command::Line { x, y } => r.line_to(*x, *y),
            Command::Curve {
                x1,
                y1,
                x2,
                y2,
                x3,
                y3,
            } => r.curve_to(*x1, *y1, *x2, *y2, *x3, *y3),
            Command::QuadraticCurve { x1, y1, x2, y2 } => {
                let (x, y) = r.current_point()?.unwrap_or((0.0, 0.0));
                let to = Point::new(*x2, *y2);
                let (c1, c2) = quad_to_cubic(Point::new(x, y), Point::new(*x1, *y1), to);
                r.curve_to(c1.x, c1.y, c2.x, c2.y, to.x, to.y)
            }
            Command::Arc(a) => r.arc(a.x, a.y, a.radius, a.angle1, a.angle2),
            Command::ArcReverse(a) => r.arc_negative(a.x, a.y, a.radius, a.angle1, a.angle2),

            Command::LineWidth(w) => r.set_line_width(*w),
            Command::LineCap(t) => r.set_line_cap(t),
            Command::LineJoin(t) => r.set_line_join(t),
            Command::MiterLimit(l) => r.set_miter_limit(*l),
            Command::Antialias(t) => r.set_antialias(t),
            Command::FillRule(t) => r.set_fill_rule(t),
            Command::Tolerance(t) => r.set_tolerance(*t),
            Command::Translate { x, y } => r.translate(*x, *y),
            Command::Scale { x, y } => r.scale(*x, *y),
            Command::Rotate(angle) => r.rotate(*angle),
            Command::Transform(m) => r.transform(*m),
            Command::SlowBlur { radius, steps } => {
                let ops = compile(steps)?;
                r.slow_blur(*radius, &mut |inner: &mut dyn Renderer| {
                    self.run_all(inner, &ops)
                })
            }

            Command::Brush(brush) => self.apply_brush(r, brush),
            Command::DashPattern(dashes) if dashes.len() < 2 => r.set_dash(&[]),
            Command::DashPattern(dashes) => r.set_dash(dashes),
            Command::Mask(mask) => self.apply_mask(r, mask),

            Command::Paint => r.paint(),
            Command::Stroke => r.stroke_preserve(),
            Command::Fill => r.fill_preserve(),
            Command::Clip => r.clip_preserve(),
            Command::Unclip => r.reset_clip(),
            Command::Close => r.close_path(),
            Command::Reset => r.new_path(),
            Command::Group => r.new_sub_path(),
            Command::Push => r.push_group(),
            Command::Pop => r.pop_group_to_source(),
            Command::Save => r.save(),
            Command::Restore => r.restore(),
            Command::Store => {
                let source = r.source()?;
                self.sources.push(source);
                Ok(())
            }
            Command::Retrieve => {
                let source = self.pop_source("retrieve")?;
                r.set_source(source)
            }
        }
    }

    fn apply_brush(&mut self, r: &mut dyn Renderer, brush: &Brush) -> EaselResult<()> {
        match brush {
            Brush::Solid { r: red, g, b, a } => r.set_source_rgba(*red, *g, *b, *a),
            Brush::Linear {
                x0,
                y0,
                x1,
                y1,
                stops,
            } => {
                let shape = GradientShape::Linear {
                    x0: *x0,
                    y0: *y0,
                    x1: *x1,
                    y1: *y1,
                };
                let gradient = r.create_gradient(shape)?;
                for stop in stops {
                    r.add_color_stop(gradient, stop)?;
                }
                r.set_source_gradient(gradient)
            }
            Brush::Radial {
                x0,
                y0,
                r0,
                x1,
                y1,
                r1,
                stops,
            } => {
                let shape = GradientShape::Radial {
                    x0: *x0,
                    y0: *y0,
                    r0: *r0,
                    x1: *x1,
                    y1: *y1,
                    r1: *r1,
                };
                let gradient = r.create_gradient(shape)?;
                for stop in stops {
                    r.add_color_stop(gradient, stop)?;
                }
                r.set_source_gradient(gradient)
            }
            Brush::Canvas { canvas, extend } => {
                let done = canvas.execute(r)?;
                r.set_source_surface(done.surface, extend.as_deref())
            }
            Brush::Retrieve => {
                let source = self.pop_source("brush")?;
                r.set_source(source)
            }
        }
    }

    fn apply_mask(&mut self, r: &mut dyn Renderer, mask: &Mask) -> EaselResult<()> {
        match mask {
            Mask::Retrieve => {
                let source = self.pop_source("mask")?;
                r.mask_source(source)
            }
            Mask::Pattern { canvas, extend } => {
                let done = canvas.execute(r)?;
                r.mask_pattern(done.surface, extend)
            }
            Mask::Surface { canvas, x, y } => {
                let done = canvas.execute(r)?;
                r.mask_surface(done.surface, *x, *y)
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/canvas/engine.rs"]
mod tests;
