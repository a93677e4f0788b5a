//! CLI Application logic
//!
//! Contains the command-line interface implementation.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use tinytex_render::{Engine, RenderReport, RenderSettings, Renderer};

#[derive(Parser)]
#[command(name = "tinytex")]
#[command(author, version, about = "Render LaTeX documents to PDF with TinyTeX", long_about = None)]
struct Cli {
    /// Log progress to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a LaTeX file to PDF next to it
    Render {
        /// Input LaTeX file
        input: PathBuf,

        #[command(flatten)]
        engine: EngineArgs,
    },

    /// Show which LaTeX engine a render would run
    Locate {
        #[command(flatten)]
        engine: EngineArgs,
    },
}

/// Engine selection shared by all commands
#[derive(Args, Debug, Default, Clone)]
pub struct EngineArgs {
    /// Local LaTeX command to use instead of the bundled TinyTeX
    #[arg(short, long, env = "TINYTEX_COMMAND")]
    pub command: Option<String>,

    /// Root directory of the bundled TinyTeX release
    #[arg(long, env = "TINYTEX_BUNDLE_ROOT")]
    pub bundle_root: Option<PathBuf>,

    /// Settings file (default: tinytex.toml in the current directory)
    #[arg(long)]
    pub config: Option<PathBuf>,
}

/// Run the CLI application
///
/// This is the main entry point for the command-line interface.
/// It parses arguments and dispatches to the appropriate command.
pub fn run_cli() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Render { input, engine } => {
            render_command(&input, &engine)?;
        }
        Commands::Locate { engine } => {
            locate_command(&engine)?;
        }
    }

    Ok(())
}

/// Install the stderr log subscriber
///
/// `RUST_LOG` takes precedence over `--verbose`.
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "info" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Load settings and apply command-line overrides
pub fn load_settings(engine: &EngineArgs) -> Result<RenderSettings> {
    let mut settings = match &engine.config {
        Some(path) => RenderSettings::load(path)?,
        None => {
            let cwd = std::env::current_dir().context("Failed to read current directory")?;
            RenderSettings::load_from_dir(&cwd)?
        }
    };

    if let Some(command) = &engine.command {
        settings.engine.command = Some(command.clone());
    }
    if let Some(root) = &engine.bundle_root {
        settings.engine.bundle_root = Some(root.clone());
    }

    Ok(settings)
}

/// Execute the render command
pub fn render_command(input: &Path, engine: &EngineArgs) -> Result<RenderReport> {
    let settings = load_settings(engine)?;
    let renderer = Renderer::from_settings(&settings);

    println!("Rendering: {}", input.display());
    let report = renderer
        .render_with_report(input, None)
        .with_context(|| format!("Failed to render {}", input.display()))?;

    println!("  Engine: {}", report.engine);
    println!(
        "  Passes: {}{}",
        report.passes,
        if report.passes > 1 {
            " (cross-references resolved)"
        } else {
            ""
        }
    );
    println!("  Created: {}", report.output.display());

    Ok(report)
}

/// Execute the locate command
pub fn locate_command(engine: &EngineArgs) -> Result<Engine> {
    let settings = load_settings(engine)?;
    let renderer = Renderer::from_settings(&settings);

    let located = renderer
        .locate(None)
        .context("Failed to locate a LaTeX engine")?;
    println!("{}", located);

    Ok(located)
}
