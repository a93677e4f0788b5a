//! Bundled TinyTeX layout
//!
//! Maps the running operating system to the `pdflatex` binary inside a
//! TinyTeX release tree:
//!
//! ```text
//! <bundle_root>/TinyTeX/bin/
//! ├── windows/pdflatex.exe
//! ├── x86_64-linux/pdflatex
//! └── universal-darwin/pdflatex
//! ```

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::{RenderError, Result};

/// Directory name of the bundle, looked up next to the running executable
pub const DEFAULT_BUNDLE_DIR: &str = "tinytex-release";

/// Operating-system families with a bundled `pdflatex`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    Windows,
    Linux,
    MacOs,
}

/// Platform identifier, relative binary path under `TinyTeX/bin`
const BUNDLED_EXECUTABLES: [(Platform, &str, &str); 3] = [
    (Platform::Windows, "windows", "windows/pdflatex.exe"),
    (Platform::Linux, "linux", "x86_64-linux/pdflatex"),
    (Platform::MacOs, "macos", "universal-darwin/pdflatex"),
];

impl Platform {
    /// All platforms with a bundled executable
    pub fn all() -> [Platform; 3] {
        BUNDLED_EXECUTABLES.map(|(platform, _, _)| platform)
    }

    /// Identifier as reported by `std::env::consts::OS`
    pub fn id(&self) -> &'static str {
        self.row().1
    }

    /// Binary path relative to `TinyTeX/bin`
    pub fn relative_executable(&self) -> &'static str {
        self.row().2
    }

    /// Look up a platform by its OS identifier
    pub fn from_id(id: &str) -> Option<Platform> {
        BUNDLED_EXECUTABLES
            .iter()
            .find(|(_, known, _)| *known == id)
            .map(|(platform, _, _)| *platform)
    }

    fn row(&self) -> &'static (Platform, &'static str, &'static str) {
        match self {
            Platform::Windows => &BUNDLED_EXECUTABLES[0],
            Platform::Linux => &BUNDLED_EXECUTABLES[1],
            Platform::MacOs => &BUNDLED_EXECUTABLES[2],
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Platform {
    type Err = RenderError;

    fn from_str(s: &str) -> Result<Self> {
        Platform::from_id(s).ok_or_else(|| RenderError::UnsupportedPlatform {
            platform: s.to_string(),
        })
    }
}

/// Identifier of the operating system this binary was built for
pub fn current_platform_id() -> &'static str {
    std::env::consts::OS
}

/// Read-only view of a bundled TinyTeX tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformTable {
    root: PathBuf,
}

impl PlatformTable {
    /// Table rooted at the given bundle directory
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Table rooted at `tinytex-release` next to the running executable
    ///
    /// Falls back to a relative `tinytex-release` when the executable path
    /// cannot be determined.
    pub fn beside_current_exe() -> Self {
        let root = std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(|dir| dir.join(DEFAULT_BUNDLE_DIR)))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_BUNDLE_DIR));
        Self::new(root)
    }

    /// Bundle root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the `pdflatex` binary for a platform
    pub fn executable_for(&self, platform: Platform) -> PathBuf {
        let mut path = self.root.join("TinyTeX").join("bin");
        for component in platform.relative_executable().split('/') {
            path.push(component);
        }
        path
    }

    /// Resolve the bundled binary for an OS identifier
    ///
    /// The returned path is absolute: a relative root is taken against the
    /// current working directory, not the directory the engine later runs in.
    /// Fails with `UnsupportedPlatform` for unknown identifiers and with
    /// `ExecutableMissing` when the binary is absent from the tree.
    pub fn resolve(&self, platform_id: &str) -> Result<(Platform, PathBuf)> {
        let platform: Platform = platform_id.parse()?;
        let path = std::path::absolute(self.executable_for(platform)).map_err(|err| {
            RenderError::io(
                format!("Failed to resolve the TinyTeX bundle {}", self.root.display()),
                err,
            )
        })?;
        if !path.is_file() {
            return Err(RenderError::ExecutableMissing { path });
        }
        Ok((platform, path))
    }
}

impl Default for PlatformTable {
    fn default() -> Self {
        Self::beside_current_exe()
    }
}
