//! Integration tests for the tinytex CLI
//!
//! These tests run the built `tinytex` binary against a fake LaTeX engine.

#![cfg(unix)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tempfile::TempDir;
use tinytex_cli::{render_command, EngineArgs};
use tinytex_render::{Platform, PlatformTable};

/// Writes a PDF on every run; fails with a log if the source says `\fail`
const FAKE_ENGINE: &str = r#"#!/bin/sh
if [ "$1" = "--version" ]; then
  echo "fake pdfTeX"
  exit 0
fi
name=$(basename "$1" .tex)
if grep -q 'fail' "$1"; then
  printf '%s\n' '! LaTeX Error: Missing \begin{document}.' > "$name.log"
  exit 1
fi
echo "fake log" > "$name.log"
echo "%PDF-1.5" > "$name.pdf"
exit 0
"#;

fn install_engine(path: &Path) {
    fs::create_dir_all(path.parent().expect("engine dir")).expect("create engine dir");
    fs::write(path, FAKE_ENGINE).expect("write engine");
    let mut perms = fs::metadata(path).expect("metadata").permissions();
    perms.set_mode(0o755);
    fs::set_permissions(path, perms).expect("set perms");
}

fn write_engine(dir: &Path) -> PathBuf {
    let path = dir.join("fake-latex");
    install_engine(&path);
    path
}

/// Install the fake engine as the bundled binary for the host under
/// `<dir>/vendor`, or return `None` on hosts without a bundled TinyTeX
fn install_relative_bundle(dir: &Path) -> Option<()> {
    let platform = Platform::from_id(std::env::consts::OS)?;
    let binary = PlatformTable::new(dir.join("vendor")).executable_for(platform);
    install_engine(&binary);
    Some(())
}

fn write_nested_source(dir: &Path, name: &str) {
    fs::create_dir_all(dir.join("docs")).expect("docs dir");
    fs::write(
        dir.join("docs").join(format!("{name}.tex")),
        "\\documentclass{article}\n",
    )
    .unwrap();
}

fn tinytex(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_tinytex"))
        .args(args)
        .current_dir(dir)
        .env_remove("TINYTEX_COMMAND")
        .env_remove("TINYTEX_BUNDLE_ROOT")
        .env_remove("RUST_LOG")
        .output()
        .expect("run tinytex")
}

#[test]
fn test_render_with_local_command() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let engine = write_engine(temp_dir.path());
    fs::write(temp_dir.path().join("cv.tex"), "\\documentclass{article}\n").unwrap();

    let output = tinytex(
        temp_dir.path(),
        &["render", "cv.tex", "--command", engine.to_str().unwrap()],
    );

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Created: cv.pdf"), "stdout: {stdout}");
    assert!(temp_dir.path().join("cv.pdf").is_file());
}

#[test]
fn test_render_failure_prints_log() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let engine = write_engine(temp_dir.path());
    fs::write(temp_dir.path().join("bad.tex"), "\\fail\n").unwrap();

    let output = tinytex(
        temp_dir.path(),
        &["render", "bad.tex", "--command", engine.to_str().unwrap()],
    );

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Failed to render bad.tex"), "stderr: {stderr}");
    assert!(stderr.contains("! LaTeX Error: Missing \\begin{document}."), "stderr: {stderr}");
    assert!(!temp_dir.path().join("bad.pdf").exists());
}

#[test]
fn test_render_missing_input() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");

    let output = tinytex(temp_dir.path(), &["render", "missing.tex"]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("missing.tex doesn't exist"), "stderr: {stderr}");
}

#[test]
fn test_config_file_selects_command() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let engine = write_engine(temp_dir.path());
    fs::write(
        temp_dir.path().join("tinytex.toml"),
        format!("[engine]\ncommand = \"{}\"\n", engine.display()),
    )
    .unwrap();
    fs::write(temp_dir.path().join("letter.tex"), "\\documentclass{letter}\n").unwrap();

    let output = tinytex(temp_dir.path(), &["render", "letter.tex"]);

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    assert!(temp_dir.path().join("letter.pdf").is_file());
}

#[test]
fn test_locate_unknown_command() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");

    let output = tinytex(
        temp_dir.path(),
        &["locate", "--command", "tinytex-no-such-latex"],
    );

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("tinytex-no-such-latex"), "stderr: {stderr}");
}

#[test]
fn test_locate_empty_bundle() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");

    let output = tinytex(
        temp_dir.path(),
        &["locate", "--bundle-root", temp_dir.path().to_str().unwrap()],
    );

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("TinyTeX"), "stderr: {stderr}");
}

#[test]
fn test_render_nested_source_with_relative_bundle_root() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    if install_relative_bundle(temp_dir.path()).is_none() {
        return;
    }
    write_nested_source(temp_dir.path(), "cv");

    let output = tinytex(
        temp_dir.path(),
        &["render", "docs/cv.tex", "--bundle-root", "vendor"],
    );

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Created: docs/cv.pdf"), "stdout: {stdout}");
    assert!(temp_dir.path().join("docs/cv.pdf").is_file());
}

#[test]
fn test_render_nested_source_with_relative_bundle_root_from_config() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    if install_relative_bundle(temp_dir.path()).is_none() {
        return;
    }
    write_nested_source(temp_dir.path(), "letter");
    fs::write(
        temp_dir.path().join("tinytex.toml"),
        "[engine]\nbundle_root = \"vendor\"\n",
    )
    .unwrap();

    let output = tinytex(
        temp_dir.path(),
        &["render", "docs/letter.tex", "--config", "tinytex.toml"],
    );

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    assert!(temp_dir.path().join("docs/letter.pdf").is_file());
}

#[test]
fn test_render_nested_source_with_relative_command() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    install_engine(&temp_dir.path().join("bin").join("fake-latex"));
    write_nested_source(temp_dir.path(), "notes");

    for command in ["bin/fake-latex", "./bin/fake-latex"] {
        let output = tinytex(
            temp_dir.path(),
            &["render", "docs/notes.tex", "--command", command],
        );

        assert!(
            output.status.success(),
            "{command}: {}",
            String::from_utf8_lossy(&output.stderr)
        );
        assert!(temp_dir.path().join("docs/notes.pdf").is_file());
    }
}

#[test]
fn test_render_command_requires_existing_config() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let engine = write_engine(temp_dir.path());
    let source = temp_dir.path().join("report.tex");
    fs::write(&source, "\\documentclass{report}\n").unwrap();

    let result = render_command(
        &source,
        &EngineArgs {
            command: Some(engine.display().to_string()),
            config: Some(temp_dir.path().join("missing.toml")),
            ..EngineArgs::default()
        },
    );

    assert!(result.is_err());
    assert!(!source.with_extension("pdf").exists());
}

#[test]
fn test_render_command_library_api() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let engine = write_engine(temp_dir.path());
    let source = temp_dir.path().join("report.tex");
    fs::write(&source, "\\documentclass{report}\n").unwrap();
    fs::write(temp_dir.path().join("empty.toml"), "").unwrap();

    let report = render_command(
        &source,
        &EngineArgs {
            command: Some(engine.display().to_string()),
            config: Some(temp_dir.path().join("empty.toml")),
            ..EngineArgs::default()
        },
    )
    .expect("render");

    assert_eq!(report.output, source.with_extension("pdf"));
    assert_eq!(report.passes, 1);
    assert!(report.output.is_file());
}
