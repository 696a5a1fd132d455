use std::io::Write;
use std::process::{Command, Stdio};

use crate::error::{PageliftError, Result};

/// Orientation and script detection through the `tesseract` binary (`--psm 0`).
#[derive(Debug, Clone)]
pub struct TesseractOsd {
    command: String,
    data_path: Option<String>,
}

impl TesseractOsd {
    pub fn new(command: &str, data_path: Option<String>) -> Self {
        Self {
            command: command.to_string(),
            data_path,
        }
    }

    /// Pipes PNG bytes to tesseract and returns the `Rotate:` value of the OSD report.
    pub fn detect(&self, png: &[u8]) -> Result<i32> {
        let mut command = Command::new(&self.command);
        command.args(["stdin", "stdout", "--psm", "0"]);
        if let Some(data_path) = &self.data_path {
            command.arg("--tessdata-dir").arg(data_path);
        }

        let mut child = command
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                PageliftError::OrientationDetection(format!(
                    "Failed to start '{}': {e}",
                    self.command
                ))
            })?;

        // stdin is closed at the end of the match, before waiting.
        let piped = match child.stdin.take() {
            Some(mut stdin) => stdin.write_all(png),
            None => Ok(()),
        };

        // Always reap the child, even when it stopped reading early.
        let output = child.wait_with_output().map_err(|e| {
            PageliftError::OrientationDetection(format!("Failed to wait for tesseract: {e}"))
        })?;
        let stderr = String::from_utf8_lossy(&output.stderr);

        if let Err(e) = piped {
            return Err(PageliftError::OrientationDetection(format!(
                "Failed to pipe image to tesseract ({}): {e}: {}",
                output.status,
                stderr.trim()
            )));
        }

        if !output.status.success() {
            return Err(PageliftError::OrientationDetection(format!(
                "tesseract exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        parse_rotation(&String::from_utf8_lossy(&output.stdout))
    }
}

/// Extracts the `Rotate: N` line from a tesseract OSD report.
pub fn parse_rotation(report: &str) -> Result<i32> {
    let value = report
        .lines()
        .find_map(|line| line.trim().strip_prefix("Rotate:"))
        .ok_or_else(|| {
            PageliftError::OrientationDetection("OSD output has no 'Rotate:' line".to_string())
        })?;

    value.trim().parse().map_err(|e| {
        PageliftError::OrientationDetection(format!("Invalid rotation '{}': {e}", value.trim()))
    })
}
