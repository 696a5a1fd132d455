use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::{PageliftError, Result};
use crate::models::{ProcessingReport, REPORT_FILE_NAME};

pub struct ReportBuilder;

impl ReportBuilder {
    /// Writes `{output_dir}/processing_report.txt` and returns its path.
    pub fn write(output_dir: &Path, report: &ProcessingReport) -> Result<PathBuf> {
        let path = output_dir.join(REPORT_FILE_NAME);

        if let Err(e) = fs::write(&path, report.render()) {
            let _ = fs::remove_file(&path);
            return Err(PageliftError::ReportWrite(format!(
                "{}: {e}",
                path.display()
            )));
        }

        info!("Report content written to {}", path.display());
        Ok(path)
    }
}
