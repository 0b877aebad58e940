//! command.rs - The single narrow seam for invoking system utilities.
//!
//! Every `lsblk` and `udisksctl` invocation in this crate goes through the
//! `CommandRunner` trait so the classifier and the action dispatcher can be
//! tested against a scripted runner without touching real block devices.
//!
//! Execution is synchronous and blocking: the caller waits until the
//! subprocess exits. There is no timeout; a hung utility hangs the flow.

use crate::error::{CryptTuiError, Result};
use std::process::Command;
use tracing::debug;

/// Abstraction over blocking subprocess invocation with captured output.
///
/// A command is considered failed if spawning it errors (executable not
/// found, permission denied) or if it exits non-zero. In both cases the
/// returned error carries the human-readable failure text: the captured
/// stderr, or the invocation error message.
pub trait CommandRunner {
    /// Run `program` with `args`, returning trimmed stdout on success.
    fn run(&self, program: &str, args: &[&str]) -> Result<String>;
}

/// The real runner: spawns the process and waits for it.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, program: &str, args: &[&str]) -> Result<String> {
        debug!(program, ?args, "running command");

        let output = Command::new(program)
            .args(args)
            .output()
            .map_err(|e| CryptTuiError::command(program, e.to_string()))?;

        if output.status.success() {
            Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            let message = if stderr.is_empty() {
                format!("exited with {}", output.status)
            } else {
                stderr
            };
            Err(CryptTuiError::command(program, message))
        }
    }
}
