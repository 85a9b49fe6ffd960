//! Common test utilities shared across integration tests.

#![allow(dead_code)]

use std::path::Path;
use std::process::{Child, Command, Output, Stdio};

fn taskdag_command(dir: &Path, args: &[&str]) -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_taskdag"));
    command
        .args(args)
        .current_dir(dir)
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG");
    command
}

/// Run the taskdag binary in the specified directory.
///
/// Colors are disabled so assertions can match plain text.
pub fn run_taskdag_in_dir(dir: &Path, args: &[&str]) -> Output {
    taskdag_command(dir, args)
        .output()
        .expect("Failed to execute taskdag binary")
}

/// Start the taskdag binary without waiting for it to finish.
pub fn spawn_taskdag_in_dir(dir: &Path, args: &[&str]) -> Child {
    taskdag_command(dir, args)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to spawn taskdag binary")
}

/// Run a command expected to succeed and return its stdout.
pub fn run_ok(dir: &Path, args: &[&str]) -> String {
    let output = run_taskdag_in_dir(dir, args);
    assert!(
        output.status.success(),
        "taskdag {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).into_owned()
}

/// Run a command with `--json` and parse its stdout.
pub fn run_json(dir: &Path, args: &[&str]) -> serde_json::Value {
    let mut full = vec!["--json"];
    full.extend_from_slice(args);
    let stdout = run_ok(dir, &full);
    serde_json::from_str(&stdout).expect("stdout should be valid JSON")
}

/// Create a task via the CLI and return its ID.
pub fn create_task(dir: &Path, title: &str, deps: &[&str]) -> String {
    let joined = deps.join(",");
    let mut args = vec!["create", "--title", title];
    if !deps.is_empty() {
        args.extend_from_slice(&["--deps", &joined]);
    }
    let task = run_json(dir, &args);
    task["id"]
        .as_str()
        .expect("created task should have an id")
        .to_string()
}
