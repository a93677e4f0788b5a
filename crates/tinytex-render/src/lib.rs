//! tinytex-render - PDF rendering via TinyTeX
//!
//! This crate runs a LaTeX engine over a `.tex` file and hands back the
//! path of the produced PDF. It does not look inside the LaTeX source; it
//! only orchestrates the external process.
//!
//! # Engines
//!
//! 1. **Bundled** - `pdflatex` from a TinyTeX release tree, picked by platform
//!    (see [`PlatformTable`])
//! 2. **Local override** - any LaTeX command on the system, e.g. `xelatex`
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use tinytex_render::{Renderer, ErrorKind};
//!
//! let renderer = Renderer::new();
//! match renderer.render(Path::new("cv.tex"), Some("pdflatex")) {
//!     Ok(pdf) => println!("wrote {}", pdf.display()),
//!     Err(e) if e.kind() == ErrorKind::OutputLocked => eprintln!("close your PDF viewer"),
//!     Err(e) => eprintln!("{e}"),
//! }
//! ```

mod error;
pub mod platform;
pub mod process;
mod renderer;
pub mod settings;

use std::path::{Path, PathBuf};

pub use error::{EngineOrigin, ErrorKind, LogContents, Pass, RenderError, Result};
pub use platform::{Platform, PlatformTable};
pub use renderer::{
    log_path_for, output_path_for, Engine, RenderReport, Renderer, LOG_EXTENSION,
    OUTPUT_EXTENSION,
};
pub use settings::{RenderSettings, SettingsError};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Render a LaTeX file with the bundled TinyTeX
///
/// Shorthand for `Renderer::new().render(path, None)`.
pub fn run_pdftex(latex_file_path: impl AsRef<Path>) -> Result<PathBuf> {
    Renderer::new().render(latex_file_path.as_ref(), None)
}
