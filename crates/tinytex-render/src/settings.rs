//! Renderer settings
//!
//! Settings are read from an optional `tinytex.toml`:
//!
//! ```toml
//! [engine]
//! command = "xelatex"
//! bundle_root = "vendor/tinytex-release"
//!
//! [render]
//! rerun_marker = "Rerun to get"
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// Conventional settings file name
pub const SETTINGS_FILE: &str = "tinytex.toml";

/// Text pdflatex prints when cross-references need another pass
pub const DEFAULT_RERUN_MARKER: &str = "Rerun to get";

/// Errors while loading settings
#[derive(Error, Debug)]
pub enum SettingsError {
    /// The settings file could not be read
    #[error("Failed to read settings file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The settings file is not valid TOML for this schema
    #[error("Failed to parse settings file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Top-level settings structure
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct RenderSettings {
    /// Engine selection
    pub engine: EngineSettings,
    /// Rendering behaviour
    pub render: PassSettings,
}

impl RenderSettings {
    /// Parse settings from a TOML string
    pub fn from_toml_str(toml_str: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(toml_str)
    }

    /// Load settings from a file
    ///
    /// A relative `bundle_root` is taken relative to the file's directory.
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let contents = fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut settings =
            Self::from_toml_str(&contents).map_err(|source| SettingsError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        if let (Some(root), Some(dir)) = (settings.engine.bundle_root.as_mut(), path.parent()) {
            if root.is_relative() {
                let anchored = dir.join(&*root);
                *root = anchored;
            }
        }
        Ok(settings)
    }

    /// Load `tinytex.toml` from a directory, or defaults when it is absent
    pub fn load_from_dir(dir: &Path) -> Result<Self, SettingsError> {
        let path = dir.join(SETTINGS_FILE);
        if path.is_file() {
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }
}

/// Which engine to run
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct EngineSettings {
    /// Local LaTeX command used instead of the bundled TinyTeX
    pub command: Option<String>,
    /// Root of the bundled TinyTeX release
    pub bundle_root: Option<PathBuf>,
}

/// Pass handling
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct PassSettings {
    /// Substring of first-pass output that triggers a second pass
    pub rerun_marker: String,
}

impl Default for PassSettings {
    fn default() -> Self {
        Self {
            rerun_marker: DEFAULT_RERUN_MARKER.to_string(),
        }
    }
}
