use std::{collections::BTreeMap, path::Path};

use anyhow::Context as _;
use serde::{Deserialize, Serialize};

use crate::{
    canvas::Origin,
    foundation::error::{EaselError, EaselResult},
    settings::Settings,
};

/// A JSON description of a set of named canvases.
///
/// ```json
/// {
///   "settings": { "generated_images_path": "out" },
///   "canvases": {
///     "dot":  { "width": 8, "height": 8, "actions": [["arc", 4, 4, 3, 0, 360], ["brush", "red"], "fill"] },
///     "tile": { "width": 32, "height": 32, "output": "tile", "actions": [["brush", "@dot", "repeat"], "paint"] }
///   }
/// }
/// ```
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Document {
    #[serde(default)]
    pub settings: Settings,
    pub canvases: BTreeMap<String, CanvasDef>,
}

/// One canvas: either a blank `width`x`height` surface or an existing image `file`.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CanvasDef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    #[serde(default)]
    pub actions: Vec<serde_json::Value>,
}

impl Document {
    pub fn from_json_str(s: &str) -> EaselResult<Self> {
        let doc: Document =
            serde_json::from_str(s).map_err(|e| EaselError::document(format!("parse: {e}")))?;
        doc.validate()?;
        Ok(doc)
    }

    pub fn from_path(path: &Path) -> EaselResult<Self> {
        let s = std::fs::read_to_string(path)
            .with_context(|| format!("read document '{}'", path.display()))?;
        Self::from_json_str(&s)
    }

    pub fn validate(&self) -> EaselResult<()> {
        if self.canvases.is_empty() {
            return Err(EaselError::document("document defines no canvases"));
        }
        for (name, def) in &self.canvases {
            if name.trim().is_empty() || name.starts_with('@') {
                return Err(EaselError::document(format!(
                    "'{name}' is not a valid canvas name"
                )));
            }
            def.check_origin(name)?;
        }
        Ok(())
    }
}

impl CanvasDef {
    fn check_origin(&self, name: &str) -> EaselResult<()> {
        match (self.width, self.height, &self.file) {
            (Some(w), Some(h), None) if w > 0 && h > 0 => Ok(()),
            (Some(_), Some(_), None) => Err(EaselError::document(format!(
                "canvas '{name}' must have width and height > 0"
            ))),
            (None, None, Some(file)) if !file.trim().is_empty() => Ok(()),
            _ => Err(EaselError::document(format!(
                "canvas '{name}' needs either width and height, or a file"
            ))),
        }
    }

    /// Surface origin, with `file` resolved through `settings`.
    pub fn origin(&self, name: &str, settings: &Settings) -> EaselResult<Origin> {
        self.check_origin(name)?;
        match (self.width, self.height, &self.file) {
            (Some(width), Some(height), _) => Ok(Origin::Blank { width, height }),
            (_, _, Some(file)) => Ok(Origin::File(settings.resolve_source(file))),
            _ => Err(EaselError::document(format!("canvas '{name}' has no origin"))),
        }
    }
}
