use serde::{Deserialize, Serialize};

/// Object name the processing report is uploaded to.
pub const REPORT_OBJECT_NAME: &str = "reports/processing_report.txt";
/// Local file name of the processing report inside the output directory.
pub const REPORT_FILE_NAME: &str = "processing_report.txt";
/// Object prefix for per-page text uploads.
pub const TEXT_OUTPUT_PREFIX: &str = "text_outputs";
/// Scratch subdirectory holding everything the pipeline writes.
pub const OUTPUT_DIR_NAME: &str = "output_files";

/// Prefixes of objects this service writes back into the bucket.
pub const OUTPUT_OBJECT_PREFIXES: &[&str] = &["reports/", "text_outputs/"];

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    Init,
    Downloading,
    Rasterizing,
    ExtractingPages,
    Reporting,
    Uploading,
}

impl std::fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Init => write!(f, "init"),
            Self::Downloading => write!(f, "downloading"),
            Self::Rasterizing => write!(f, "rasterizing"),
            Self::ExtractingPages => write!(f, "extracting_pages"),
            Self::Reporting => write!(f, "reporting"),
            Self::Uploading => write!(f, "uploading"),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeStatus {
    #[default]
    Completed,
    /// A stage failed; whatever was produced before the failure was still handled.
    Failed,
    /// The event was ignored without touching storage.
    Skipped,
}

/// Returns true when the object lives under one of the service's output prefixes.
pub fn is_output_object(name: &str) -> bool {
    OUTPUT_OBJECT_PREFIXES
        .iter()
        .any(|prefix| name.starts_with(prefix))
}
