use serde::{Deserialize, Serialize};

use super::{OutcomeStatus, PipelineStage, SourceDocument};

/// Summary of one invocation. Produced even when the document was dropped.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProcessingOutcome {
    pub bucket: String,
    pub name: String,
    pub status: OutcomeStatus,
    pub pages_extracted: usize,
    pub uploaded: Vec<String>,
    pub failed_uploads: Vec<String>,
    /// Local files and directories removed during cleanup.
    pub artifacts_removed: usize,
    pub cleanup_failures: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failed_stage: Option<PipelineStage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ProcessingOutcome {
    pub fn new(document: &SourceDocument) -> Self {
        Self {
            bucket: document.bucket.clone(),
            name: document.name.clone(),
            status: OutcomeStatus::Completed,
            pages_extracted: 0,
            uploaded: Vec::new(),
            failed_uploads: Vec::new(),
            artifacts_removed: 0,
            cleanup_failures: 0,
            failed_stage: None,
            error: None,
        }
    }

    pub fn skipped(document: &SourceDocument) -> Self {
        Self {
            status: OutcomeStatus::Skipped,
            ..Self::new(document)
        }
    }

    /// Records the first stage failure. Later failures keep the original cause.
    pub fn record_failure(&mut self, stage: PipelineStage, error: impl std::fmt::Display) {
        self.status = OutcomeStatus::Failed;
        if self.failed_stage.is_none() {
            self.failed_stage = Some(stage);
            self.error = Some(error.to_string());
        }
    }
}
