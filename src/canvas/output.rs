use std::{fmt, path::Path};

use anyhow::Context as _;
use base64::Engine as _;

use crate::{
    canvas::Canvas, foundation::error::EaselResult, render::backend::Renderer, settings::Settings,
};

/// The serialized value of a canvas.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Output {
    /// PNG written under the generated-images directory; holds the file name.
    File(String),
    /// `data:image/png;base64,...`
    DataUri(String),
}

impl fmt::Display for Output {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Output::File(name) => write!(f, "url('{name}')"),
            Output::DataUri(uri) => write!(f, "url('{uri}')"),
        }
    }
}

/// `name` with a `.png` extension, appending one when missing.
pub fn png_file_name(name: &str) -> String {
    let has_png = Path::new(name)
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("png"));
    if has_png {
        name.to_owned()
    } else {
        format!("{name}.png")
    }
}

pub fn data_uri(png: &[u8]) -> String {
    format!(
        "data:image/png;base64,{}",
        base64::engine::general_purpose::STANDARD.encode(png)
    )
}

impl Canvas {
    /// Executes the canvas and serializes it.
    ///
    /// With an output name the PNG is written to
    /// `settings.generated_images_path/<name>.png` and the file name is returned; otherwise
    /// the PNG is embedded as a data URI.
    pub fn value(&self, renderer: &mut dyn Renderer, settings: &Settings) -> EaselResult<Output> {
        let png = self.to_png(renderer)?;
        match self.output_name() {
            Some(name) => {
                let file_name = png_file_name(name);
                let path = settings.generated_images_path.join(&file_name);
                if let Some(parent) = path.parent() {
                    std::fs::create_dir_all(parent)
                        .with_context(|| format!("create dir '{}'", parent.display()))?;
                }
                std::fs::write(&path, &png)
                    .with_context(|| format!("write png '{}'", path.display()))?;
                tracing::info!(path = %path.display(), bytes = png.len(), "wrote canvas");
                Ok(Output::File(file_name))
            }
            None => Ok(Output::DataUri(data_uri(&png))),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/canvas/output.rs"]
mod tests;
