#![forbid(unsafe_code)]
//! `easel` compiles declarative drawing actions into renderer calls.
//!
//! A [`Canvas`] holds a list of validated [`Command`]s (or raw bare-action names). Executing it
//! drives a [`Renderer`] exactly once; brushes and masks may reference other canvases, which
//! are executed on demand and shared. [`Canvas::value`] turns the result into a PNG file or a
//! data URI.
//!
//! ```no_run
//! use easel::{Canvas, Command, CpuRenderer, Settings, Value};
//!
//! # fn main() -> easel::EaselResult<()> {
//! let canvas = Canvas::blank(16, 16)
//!     .step(Command::path("arc", vec![8.into(), 8.into(), 6.into(), 0.into(), 360.into()])?)
//!     .step(Command::pattern("brush", vec![Value::token("#c33")])?)
//!     .step("fill")
//!     .build();
//!
//! let mut renderer = CpuRenderer::new();
//! let png = canvas.to_png(&mut renderer)?;
//! # let _ = (png, Settings::default());
//! # Ok(())
//! # }
//! ```

pub mod action;
pub mod canvas;
pub mod document;
pub mod foundation;
pub mod pattern;
pub mod render;
pub mod settings;

pub use action::{
    command::{ArcArgs, Command, Step, validate},
    value::Value,
    vocab::{ALL_ACTIONS, Action, ActionSpec, Family},
};
pub use canvas::{Canvas, CanvasBuilder, Executed, Lifecycle, Origin, Output};
pub use document::{CanvasDef, Document, Registry};
pub use foundation::{
    color::Color,
    error::{EaselError, EaselResult},
};
pub use pattern::{Brush, GradientStop, Mask, compile_brush, compile_mask, infer_color_stops};
pub use render::{
    backend::{
        BackendKind, DrawFn, GradientId, GradientShape, Renderer, RendererId, SourceId, SurfaceId,
        create_renderer,
    },
    cpu::CpuRenderer,
    recording::{Call, RecordingRenderer},
};
pub use settings::Settings;
