use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::render::backend::BackendKind;

pub const ENV_IMAGES_PATH: &str = "EASEL_IMAGES_PATH";
pub const ENV_CSS_PATH: &str = "EASEL_CSS_PATH";
pub const ENV_GENERATED_IMAGES_PATH: &str = "EASEL_GENERATED_IMAGES_PATH";

/// Where source images are read from and generated images are written to.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Base directory for plain source file names.
    pub images_path: PathBuf,
    /// Base directory for `url(...)` source references.
    pub css_path: PathBuf,
    /// Directory canvases with an output name are written to.
    pub generated_images_path: PathBuf,
    pub backend: BackendKind,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            images_path: PathBuf::from("images"),
            css_path: PathBuf::from("css"),
            generated_images_path: PathBuf::from("images").join("generated"),
            backend: BackendKind::Cpu,
        }
    }
}

impl Settings {
    /// Applies `EASEL_*_PATH` environment overrides.
    pub fn with_env(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let path = |key: &str| lookup(key).filter(|v| !v.is_empty()).map(PathBuf::from);
        if let Some(p) = path(ENV_IMAGES_PATH) {
            self.images_path = p;
        }
        if let Some(p) = path(ENV_CSS_PATH) {
            self.css_path = p;
        }
        if let Some(p) = path(ENV_GENERATED_IMAGES_PATH) {
            self.generated_images_path = p;
        }
        self
    }

    /// Rebases relative directories onto `root`.
    pub fn relative_to(mut self, root: &Path) -> Self {
        for dir in [
            &mut self.images_path,
            &mut self.css_path,
            &mut self.generated_images_path,
        ] {
            if dir.is_relative() {
                *dir = root.join(&*dir);
            }
        }
        self
    }

    /// Resolves a source-file reference.
    ///
    /// `url('sprites/a.png?v=2')` resolves against `css_path`; a bare `sprites/a.png?v=2`
    /// against `images_path`. Query strings are dropped.
    pub fn resolve_source(&self, raw: &str) -> PathBuf {
        let raw = raw.trim();
        match strip_url(raw) {
            Some(inner) => self.css_path.join(strip_query(inner)),
            None => self.images_path.join(strip_query(raw)),
        }
    }
}

fn strip_url(raw: &str) -> Option<&str> {
    let inner = raw.strip_prefix("url(")?.strip_suffix(')')?;
    let inner = inner.trim_start_matches(['\'', '"']);
    Some(inner.trim_end_matches(['\'', '"']))
}

fn strip_query(s: &str) -> &str {
    s.split('?').next().unwrap_or(s)
}

#[cfg(test)]
#[path = "../tests/unit/settings.rs"]
mod tests;
