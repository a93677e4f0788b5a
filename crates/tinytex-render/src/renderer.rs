//! LaTeX to PDF rendering
//!
//! One [`Renderer::render`] call walks a fixed sequence:
//!
//! ```text
//! source exists? ─► resolve engine ─► remove stale PDF ─► pass 1 ─► rerun marker? ─► pass 2
//!      │                 │                  │               │                        │
//!  SourceNotFound   UnsupportedPlatform  OutputLocked   RenderFailed           RenderFailed
//!                   ExecutableMissing
//!                   OverrideCommandUnavailable
//! ```
//!
//! Every failure is terminal. The only repetition is the single second pass
//! triggered by the rerun marker in the first pass's output.

use std::ffi::OsStr;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::error::{EngineOrigin, LogContents, Pass, RenderError, Result};
use crate::platform::{current_platform_id, Platform, PlatformTable};
use crate::process;
use crate::settings::{RenderSettings, DEFAULT_RERUN_MARKER};

/// Extension of the produced document
pub const OUTPUT_EXTENSION: &str = "pdf";

/// Extension of the engine's log file
pub const LOG_EXTENSION: &str = "log";

/// The executable a render will run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Engine {
    /// `pdflatex` from the bundled TinyTeX tree
    Bundled { platform: Platform, path: PathBuf },
    /// A caller-supplied command name or path
    ///
    /// `program` is what gets spawned: the bare command name, looked up on
    /// `PATH`, or the command made absolute when it names a file path.
    Override { command: String, program: PathBuf },
}

impl Engine {
    /// Program passed to the OS when spawning
    pub fn program(&self) -> &OsStr {
        match self {
            Engine::Bundled { path, .. } => path.as_os_str(),
            Engine::Override { program, .. } => program.as_os_str(),
        }
    }

    /// Whether this is the bundled engine or a local command
    pub fn origin(&self) -> EngineOrigin {
        match self {
            Engine::Bundled { .. } => EngineOrigin::Bundled,
            Engine::Override { command, .. } => EngineOrigin::Local(command.clone()),
        }
    }
}

impl fmt::Display for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Engine::Bundled { platform, path } => {
                write!(f, "bundled TinyTeX ({}): {}", platform, path.display())
            }
            Engine::Override { command, .. } => write!(f, "local command: {}", command),
        }
    }
}

/// What a successful render did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderReport {
    /// Path of the produced PDF
    pub output: PathBuf,
    /// Engine that produced it
    pub engine: Engine,
    /// Number of engine runs (1 or 2)
    pub passes: u8,
}

/// PDF path for a LaTeX source: same directory and stem, `.pdf` extension
pub fn output_path_for(source: &Path) -> PathBuf {
    source.with_extension(OUTPUT_EXTENSION)
}

/// Log path the engine writes for a LaTeX source
pub fn log_path_for(source: &Path) -> PathBuf {
    source.with_extension(LOG_EXTENSION)
}

/// Renders LaTeX files to PDF with an external engine
///
/// A `Renderer` is immutable once built and holds no per-render state, so
/// one instance can serve concurrent renders of distinct files.
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use tinytex_render::Renderer;
///
/// let renderer = Renderer::new().with_bundle_root("vendor/tinytex-release");
/// let pdf = renderer.render(Path::new("cv.tex"), None)?;
/// println!("{}", pdf.display());
/// # Ok::<(), tinytex_render::RenderError>(())
/// ```
#[derive(Debug, Clone)]
pub struct Renderer {
    table: PlatformTable,
    platform_id: String,
    default_command: Option<String>,
    rerun_marker: String,
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer {
    /// Renderer using the bundle next to the running executable
    pub fn new() -> Self {
        Self {
            table: PlatformTable::default(),
            platform_id: current_platform_id().to_string(),
            default_command: None,
            rerun_marker: DEFAULT_RERUN_MARKER.to_string(),
        }
    }

    /// Renderer configured from settings
    pub fn from_settings(settings: &RenderSettings) -> Self {
        let mut renderer = Self::new().with_rerun_marker(settings.render.rerun_marker.clone());
        if let Some(root) = &settings.engine.bundle_root {
            renderer = renderer.with_bundle_root(root);
        }
        if let Some(command) = &settings.engine.command {
            renderer = renderer.with_default_command(command.clone());
        }
        renderer
    }

    /// Use a different bundled TinyTeX root
    pub fn with_bundle_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.table = PlatformTable::new(root);
        self
    }

    /// Resolve the bundled engine as if running on another platform
    pub fn with_platform_id(mut self, platform_id: impl Into<String>) -> Self {
        self.platform_id = platform_id.into();
        self
    }

    /// Local command used when a render supplies no override
    pub fn with_default_command(mut self, command: impl Into<String>) -> Self {
        self.default_command = Some(command.into());
        self
    }

    /// Output substring that triggers a second pass
    pub fn with_rerun_marker(mut self, marker: impl Into<String>) -> Self {
        self.rerun_marker = marker.into();
        self
    }

    /// Bundled TinyTeX layout in use
    pub fn table(&self) -> &PlatformTable {
        &self.table
    }

    /// Platform identifier used to pick the bundled binary
    pub fn platform_id(&self) -> &str {
        &self.platform_id
    }

    /// Pick the engine a render would run, without rendering
    ///
    /// An override command is checked by starting it with `--version`;
    /// otherwise the bundled binary for the platform must exist on disk.
    pub fn locate(&self, override_command: Option<&str>) -> Result<Engine> {
        match override_command.or(self.default_command.as_deref()) {
            Some(command) => {
                let unavailable = |source: io::Error| RenderError::OverrideCommandUnavailable {
                    command: command.to_string(),
                    source,
                };
                let program = override_program(command).map_err(unavailable)?;
                process::probe(program.as_os_str()).map_err(unavailable)?;
                Ok(Engine::Override {
                    command: command.to_string(),
                    program,
                })
            }
            None => {
                let (platform, path) = self.table.resolve(&self.platform_id)?;
                Ok(Engine::Bundled { platform, path })
            }
        }
    }

    /// Render a LaTeX file and return the path of the PDF
    pub fn render(&self, source: &Path, override_command: Option<&str>) -> Result<PathBuf> {
        self.render_with_report(source, override_command)
            .map(|report| report.output)
    }

    /// Render a LaTeX file and report what was run
    pub fn render_with_report(
        &self,
        source: &Path,
        override_command: Option<&str>,
    ) -> Result<RenderReport> {
        let started_at = Instant::now();

        if !source.is_file() {
            return Err(RenderError::SourceNotFound {
                path: source.to_path_buf(),
            });
        }

        let engine = self.locate(override_command)?;
        debug!(engine = %engine, source = %source.display(), "resolved engine");

        let output = output_path_for(source);
        remove_stale_output(&output)?;

        let absolute_source = std::path::absolute(source).map_err(|err| {
            RenderError::io(
                format!("Failed to resolve the absolute path of {}", source.display()),
                err,
            )
        })?;
        let working_dir = absolute_source
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));

        let first = process::run_captured(engine.program(), &absolute_source, &working_dir)
            .map_err(|err| spawn_error(&engine, err))?;
        if !first.success() {
            return Err(engine_failure(&engine, Pass::First, source));
        }

        let mut passes = 1;
        if first.stdout_text().contains(&self.rerun_marker) {
            debug!(
                source = %source.display(),
                "engine asked for another pass to resolve cross-references"
            );
            let status = process::run_silent(engine.program(), &absolute_source, &working_dir)
                .map_err(|err| spawn_error(&engine, err))?;
            if !status.success() {
                return Err(engine_failure(&engine, Pass::Second, source));
            }
            passes = 2;
        }

        info!(
            source = %source.display(),
            output = %output.display(),
            passes,
            elapsed_ms = started_at.elapsed().as_millis() as u64,
            "rendered PDF"
        );

        Ok(RenderReport {
            output,
            engine,
            passes,
        })
    }
}

/// Delete a previous PDF so the engine can write a fresh one
///
/// Any failure to remove an existing entry (typically a viewer holding the
/// file open) is reported as `OutputLocked`.
fn remove_stale_output(output: &Path) -> Result<()> {
    let locked = |source: io::Error| RenderError::OutputLocked {
        path: output.to_path_buf(),
        source,
    };

    match fs::symlink_metadata(output) {
        Ok(_) => {
            fs::remove_file(output).map_err(locked)?;
            debug!(output = %output.display(), "removed stale PDF");
            Ok(())
        }
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(locked(err)),
    }
}

/// Program to spawn for an override command
///
/// A bare name such as `xelatex` is left for the OS to find on `PATH`. A
/// command with a directory component is anchored to the current working
/// directory, because the engine itself runs from the source's directory.
fn override_program(command: &str) -> io::Result<PathBuf> {
    let path = Path::new(command);
    if path.components().count() <= 1 && !path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    std::path::absolute(path)
}

fn spawn_error(engine: &Engine, err: io::Error) -> RenderError {
    warn!(engine = %engine, error = %err, "failed to start engine");
    match engine {
        Engine::Override { command, .. } => RenderError::OverrideCommandUnavailable {
            command: command.clone(),
            source: err,
        },
        Engine::Bundled { path, .. } => {
            RenderError::io(format!("Failed to start {}", path.display()), err)
        }
    }
}

fn engine_failure(engine: &Engine, pass: Pass, source: &Path) -> RenderError {
    let log_path = log_path_for(source);
    let log = match fs::read_to_string(&log_path) {
        Ok(text) => LogContents::Text(text),
        Err(err) => {
            warn!(log = %log_path.display(), error = %err, "could not read engine log");
            LogContents::Unreadable(err.to_string())
        }
    };
    warn!(engine = %engine, %pass, log = %log_path.display(), "engine pass failed");

    RenderError::RenderFailed {
        engine: engine.origin(),
        pass,
        log_path,
        log,
    }
}
