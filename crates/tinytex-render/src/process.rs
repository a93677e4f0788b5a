//! Engine process invocation
//!
//! Every invocation runs with stdin disabled so the engine can never stop
//! and wait for interactive input, and with stderr discarded: the `.log`
//! file the engine writes is the authoritative diagnostic record.

use std::ffi::OsStr;
use std::io;
use std::path::Path;
use std::process::{Command, ExitStatus, Stdio};
use std::time::Instant;

use tracing::debug;

/// Outcome of one engine run with captured stdout
#[derive(Debug)]
pub struct Invocation {
    /// Exit status of the child
    pub status: ExitStatus,
    /// Everything the child wrote to stdout
    pub stdout: Vec<u8>,
}

impl Invocation {
    /// Whether the child exited with status zero
    pub fn success(&self) -> bool {
        self.status.success()
    }

    /// Captured stdout as text
    pub fn stdout_text(&self) -> String {
        decode_output(&self.stdout)
    }
}

fn engine_command(program: &OsStr, source: &Path, working_dir: &Path) -> Command {
    let mut command = Command::new(program);
    command
        .arg(source)
        .current_dir(working_dir)
        .stdin(Stdio::null())
        .stderr(Stdio::null());
    command
}

/// Run the engine once, capturing stdout
///
/// Blocks until the child exits.
pub fn run_captured(
    program: &OsStr,
    source: &Path,
    working_dir: &Path,
) -> io::Result<Invocation> {
    let started_at = Instant::now();
    let output = engine_command(program, source, working_dir)
        .stdout(Stdio::piped())
        .output()?;

    debug!(
        program = %Path::new(program).display(),
        source = %source.display(),
        exit_code = output.status.code().unwrap_or(-1),
        stdout_bytes = output.stdout.len(),
        elapsed_ms = started_at.elapsed().as_millis() as u64,
        "engine pass finished"
    );

    Ok(Invocation {
        status: output.status,
        stdout: output.stdout,
    })
}

/// Run the engine once, discarding all output
pub fn run_silent(
    program: &OsStr,
    source: &Path,
    working_dir: &Path,
) -> io::Result<ExitStatus> {
    let started_at = Instant::now();
    let status = engine_command(program, source, working_dir)
        .stdout(Stdio::null())
        .status()?;

    debug!(
        program = %Path::new(program).display(),
        source = %source.display(),
        exit_code = status.code().unwrap_or(-1),
        elapsed_ms = started_at.elapsed().as_millis() as u64,
        "silent engine pass finished"
    );

    Ok(status)
}

/// Check that a program can be started at all
///
/// Runs `<program> --version` with every stream discarded. Only a failure to
/// start the process is reported; the exit status is not interpreted.
pub fn probe(program: &OsStr) -> io::Result<()> {
    let status = Command::new(program)
        .arg("--version")
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()?;

    debug!(
        program = %Path::new(program).display(),
        exit_code = status.code().unwrap_or(-1),
        "override command responded to version probe"
    );
    Ok(())
}

/// Decode engine output as UTF-8, falling back to Latin-1
///
/// Latin-1 maps every byte to the code point of the same value, so this
/// never fails.
pub fn decode_output(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(_) => bytes.iter().map(|&b| char::from(b)).collect(),
    }
}
