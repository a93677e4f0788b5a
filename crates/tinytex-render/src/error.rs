//! Error types for rendering

use std::fmt;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type for rendering operations
pub type Result<T> = std::result::Result<T, RenderError>;

/// Which engine a failed invocation belonged to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineOrigin {
    /// The pdflatex shipped in the bundled TinyTeX tree
    Bundled,
    /// A caller-supplied LaTeX command
    Local(String),
}

impl fmt::Display for EngineOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineOrigin::Bundled => write!(f, "the bundled TinyTeX"),
            EngineOrigin::Local(command) => write!(f, "the local LaTeX command `{}`", command),
        }
    }
}

/// Engine pass that exited unsuccessfully
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pass {
    First,
    Second,
}

impl fmt::Display for Pass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Pass::First => f.write_str("first"),
            Pass::Second => f.write_str("second"),
        }
    }
}

/// The engine's log as recovered after a failed pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogContents {
    /// Full text of the log file
    Text(String),
    /// The log could not be read; holds the reason
    Unreadable(String),
}

impl fmt::Display for LogContents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogContents::Text(text) => f.write_str(text),
            LogContents::Unreadable(reason) => {
                write!(f, "(the log file could not be read: {})", reason)
            }
        }
    }
}

/// Errors that can occur while rendering a LaTeX file
#[derive(Error, Debug)]
pub enum RenderError {
    /// The LaTeX source file does not exist
    #[error("The file {} doesn't exist!", .path.display())]
    SourceNotFound { path: PathBuf },

    /// No bundled executable is known for this platform
    #[error("TinyTeX doesn't support the platform {platform}!")]
    UnsupportedPlatform { platform: String },

    /// The platform is supported but the bundled binary is absent
    #[error(
        "The bundled TinyTeX executable was not found at {}. \
         Download the TinyTeX release for your platform and place it there, \
         or render with a local LaTeX command instead.",
        .path.display()
    )]
    ExecutableMissing { path: PathBuf },

    /// The override command cannot be started by the operating system
    #[error(
        "The local LaTeX command `{command}` could not be started ({source}). \
         Make sure it is installed and available on your PATH."
    )]
    OverrideCommandUnavailable {
        command: String,
        #[source]
        source: io::Error,
    },

    /// The previous output file could not be removed
    #[error(
        "The PDF file {} is open in another program and can't be rewritten. \
         Please close the PDF file.",
        .path.display()
    )]
    OutputLocked {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The engine exited unsuccessfully
    #[error(
        "Failed to render the PDF file with {engine} ({pass} pass). \
         Check out the details in the log file: {}\n\n\
         It is also printed below:\n\n{log}",
        .log_path.display()
    )]
    RenderFailed {
        engine: EngineOrigin,
        pass: Pass,
        log_path: PathBuf,
        log: LogContents,
    },

    /// Any other I/O failure
    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },
}

/// Discriminant of [`RenderError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    SourceNotFound,
    UnsupportedPlatform,
    ExecutableMissing,
    OverrideCommandUnavailable,
    OutputLocked,
    RenderFailed,
    Io,
}

impl RenderError {
    /// Stable kind of this error, for callers that branch on the cause
    pub fn kind(&self) -> ErrorKind {
        match self {
            RenderError::SourceNotFound { .. } => ErrorKind::SourceNotFound,
            RenderError::UnsupportedPlatform { .. } => ErrorKind::UnsupportedPlatform,
            RenderError::ExecutableMissing { .. } => ErrorKind::ExecutableMissing,
            RenderError::OverrideCommandUnavailable { .. } => {
                ErrorKind::OverrideCommandUnavailable
            }
            RenderError::OutputLocked { .. } => ErrorKind::OutputLocked,
            RenderError::RenderFailed { .. } => ErrorKind::RenderFailed,
            RenderError::Io { .. } => ErrorKind::Io,
        }
    }

    pub(crate) fn io(context: impl Into<String>, source: io::Error) -> Self {
        RenderError::Io {
            context: context.into(),
            source,
        }
    }
}
