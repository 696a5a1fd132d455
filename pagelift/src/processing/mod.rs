mod artifacts;
mod extractor;
mod pipeline;
mod report;

pub use artifacts::{CleanupSummary, TemporaryArtifacts};
pub use extractor::{DocumentExtraction, PageExtractor, TextExtractor};
pub use pipeline::ProcessingPipeline;
pub use report::ReportBuilder;
