//! tinytex CLI - Command-line interface library
//!
//! This library provides the CLI functionality for tinytex:
//! - Render: run a LaTeX engine over a `.tex` file and produce the PDF
//! - Locate: report which engine a render would use
//!
//! # Library Usage
//!
//! ```ignore
//! use tinytex_cli::{render_command, EngineArgs};
//!
//! let report = render_command(Path::new("cv.tex"), &EngineArgs::default())?;
//! ```
//!
//! # Binary Usage
//!
//! ```bash
//! # Render with the bundled TinyTeX
//! tinytex render cv.tex
//!
//! # Render with a LaTeX installation already on the system
//! tinytex render cv.tex --command xelatex
//!
//! # Check which engine would be used
//! tinytex locate --bundle-root vendor/tinytex-release
//! ```

pub mod app;

// Re-export main entry point and types
pub use app::{load_settings, locate_command, render_command, run_cli, EngineArgs};
