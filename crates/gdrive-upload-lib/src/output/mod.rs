//! Runner-facing output using GitHub workflow commands.
//!
//! Annotations go to stdout where the runner picks them up; step outputs are
//! appended to the file named by `GITHUB_OUTPUT`.

use std::io::Write;
use std::path::Path;

use crate::errors::{Result, UploadActionError};

/// Print an `::error::` annotation, which marks the step failed in the UI.
pub fn error(msg: &str) {
    println!("::error::{}", escape_data(msg));
}

/// Print a `::debug::` line, only shown when step debugging is enabled.
pub fn debug(msg: &str) {
    println!("::debug::{}", escape_data(msg));
}

/// Escape a workflow command payload.
pub fn escape_data(msg: &str) -> String {
    msg.replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

/// Record a step output. Does nothing outside a runner (`GITHUB_OUTPUT` unset).
pub fn set_output(name: &str, value: &str) -> Result<()> {
    match std::env::var_os("GITHUB_OUTPUT") {
        Some(path) => append_output(Path::new(&path), name, value),
        None => Ok(()),
    }
}

/// Append `name=value` to an output file, switching to the heredoc form for
/// multi-line values.
pub fn append_output(path: &Path, name: &str, value: &str) -> Result<()> {
    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| output_error(path, e))?;

    let entry = if value.contains('\n') {
        let delimiter = format!("ghadelimiter_{}", chrono::Utc::now().timestamp_micros());
        format!("{name}<<{delimiter}\n{value}\n{delimiter}\n")
    } else {
        format!("{name}={value}\n")
    };

    file.write_all(entry.as_bytes())
        .map_err(|e| output_error(path, e))
}

fn output_error(path: &Path, e: std::io::Error) -> UploadActionError {
    UploadActionError::Configuration(format!(
        "Cannot write step output file {}: {e}",
        path.display()
    ))
}
