//! JSON documents: named canvases that reference each other, plus macro actions.

mod build;
pub mod model;
pub mod plugins;

pub use model::{CanvasDef, Document};
pub use plugins::{Expansion, Registry, slow_drop_shadow};
