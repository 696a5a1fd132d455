mod common;

use pretty_assertions::assert_eq;

use common::{
    is_empty_dir, pipeline, store_with, FakeOcr, FakeRasterizer, MemoryBlobStore, Osd, PageFailure,
};
use pagelift::models::{OutcomeStatus, PipelineStage, SourceDocument};

fn text(store: &MemoryBlobStore, name: &str) -> String {
    String::from_utf8(store.get("incoming", name).unwrap()).unwrap()
}

#[tokio::test]
async fn test_two_page_invoice_uploads_report_and_pages() {
    let scratch = tempfile::tempdir().unwrap();
    let store = store_with("incoming", "invoice.pdf");
    let pipeline = pipeline(
        store.clone(),
        scratch.path(),
        FakeRasterizer::with_pages(2),
        FakeOcr::new(Osd::Rotate(0)),
    );
    let doc = SourceDocument::new("incoming", "invoice.pdf").unwrap();

    let outcome = pipeline.process_document(&doc).await;

    assert_eq!(outcome.status, OutcomeStatus::Completed);
    assert_eq!(outcome.pages_extracted, 2);
    assert_eq!(
        outcome.uploaded,
        vec![
            "reports/processing_report.txt".to_string(),
            "text_outputs/invoice/page_1.txt".to_string(),
            "text_outputs/invoice/page_2.txt".to_string(),
        ]
    );
    assert_eq!(
        store.object_names("incoming"),
        vec![
            "invoice.pdf".to_string(),
            "reports/processing_report.txt".to_string(),
            "text_outputs/invoice/page_1.txt".to_string(),
            "text_outputs/invoice/page_2.txt".to_string(),
        ]
    );
    assert_eq!(text(&store, "text_outputs/invoice/page_2.txt"), "20x20\n");

    let report = text(&store, "reports/processing_report.txt");
    assert!(report.contains("File Name: invoice.pdf\n"));
    assert!(report.contains("Bucket: incoming\n"));

    // Scratch root, output dir, document dir, source, report and two pages.
    assert_eq!(outcome.artifacts_removed, 7);
    assert_eq!(outcome.cleanup_failures, 0);
    assert!(is_empty_dir(scratch.path()));
}

#[tokio::test]
async fn test_missing_object_uploads_nothing() {
    let scratch = tempfile::tempdir().unwrap();
    let store = store_with("incoming", "other.pdf");
    let pipeline = pipeline(
        store.clone(),
        scratch.path(),
        FakeRasterizer::with_pages(2),
        FakeOcr::new(Osd::Rotate(0)),
    );
    let doc = SourceDocument::new("incoming", "invoice.pdf").unwrap();

    let outcome = pipeline.process_document(&doc).await;

    assert_eq!(outcome.status, OutcomeStatus::Failed);
    assert_eq!(outcome.failed_stage, Some(PipelineStage::Downloading));
    assert_eq!(outcome.pages_extracted, 0);
    assert!(outcome.uploaded.is_empty());
    assert_eq!(store.object_names("incoming"), vec!["other.pdf".to_string()]);
    assert!(is_empty_dir(scratch.path()));
}

#[tokio::test]
async fn test_unreadable_document_goes_straight_to_cleanup() {
    let scratch = tempfile::tempdir().unwrap();
    let store = store_with("incoming", "broken.pdf");
    let pipeline = pipeline(
        store.clone(),
        scratch.path(),
        FakeRasterizer::unreadable(),
        FakeOcr::new(Osd::Rotate(0)),
    );
    let doc = SourceDocument::new("incoming", "broken.pdf").unwrap();

    let outcome = pipeline.process_document(&doc).await;

    assert_eq!(outcome.failed_stage, Some(PipelineStage::Rasterizing));
    assert!(outcome.uploaded.is_empty());
    assert_eq!(store.object_names("incoming"), vec!["broken.pdf".to_string()]);
    assert!(is_empty_dir(scratch.path()));
}

#[tokio::test]
async fn test_engine_crash_keeps_completed_pages() {
    let scratch = tempfile::tempdir().unwrap();
    let store = store_with("incoming", "contract.pdf");
    let pipeline = pipeline(
        store.clone(),
        scratch.path(),
        FakeRasterizer::with_pages(3),
        FakeOcr::crashing_on(2),
    );
    let doc = SourceDocument::new("incoming", "contract.pdf").unwrap();

    let outcome = pipeline.process_document(&doc).await;

    assert_eq!(outcome.status, OutcomeStatus::Failed);
    assert_eq!(outcome.failed_stage, Some(PipelineStage::ExtractingPages));
    assert_eq!(outcome.pages_extracted, 1);
    assert_eq!(
        outcome.uploaded,
        vec![
            "reports/processing_report.txt".to_string(),
            "text_outputs/contract/page_1.txt".to_string(),
        ]
    );
    assert!(store.get("incoming", "text_outputs/contract/page_2.txt").is_none());
    assert!(store.get("incoming", "text_outputs/contract/page_3.txt").is_none());
    assert!(is_empty_dir(scratch.path()));
}

#[tokio::test]
async fn test_pages_without_orientation_signal_are_still_extracted() {
    let scratch = tempfile::tempdir().unwrap();
    let store = store_with("incoming", "faded.pdf");
    let pipeline = pipeline(
        store.clone(),
        scratch.path(),
        FakeRasterizer::with_pages(3),
        FakeOcr::new(Osd::Fails),
    );
    let doc = SourceDocument::new("incoming", "faded.pdf").unwrap();

    let outcome = pipeline.process_document(&doc).await;

    assert_eq!(outcome.status, OutcomeStatus::Completed);
    assert_eq!(outcome.pages_extracted, 3);
    // Unrotated: page 1 keeps its 10x20 shape.
    assert_eq!(text(&store, "text_outputs/faded/page_1.txt"), "10x20\n");
}

#[tokio::test]
async fn test_detected_rotation_is_applied_before_recognition() {
    let scratch = tempfile::tempdir().unwrap();
    let store = store_with("incoming", "sideways.pdf");
    let pipeline = pipeline(
        store.clone(),
        scratch.path(),
        FakeRasterizer::with_pages(1),
        FakeOcr::new(Osd::Rotate(90)),
    );
    let doc = SourceDocument::new("incoming", "sideways.pdf").unwrap();

    pipeline.process_document(&doc).await;

    assert_eq!(text(&store, "text_outputs/sideways/page_1.txt"), "20x10\n");
}

#[tokio::test]
async fn test_nested_object_uses_file_stem_for_outputs() {
    let scratch = tempfile::tempdir().unwrap();
    let store = store_with("incoming", "scans/2024/march.invoice.pdf");
    let pipeline = pipeline(
        store.clone(),
        scratch.path(),
        FakeRasterizer::with_pages(1),
        FakeOcr::new(Osd::Rotate(0)),
    );
    let doc = SourceDocument::new("incoming", "scans/2024/march.invoice.pdf").unwrap();

    let outcome = pipeline.process_document(&doc).await;

    assert!(outcome
        .uploaded
        .contains(&"text_outputs/march.invoice/page_1.txt".to_string()));
    let report = text(&store, "reports/processing_report.txt");
    assert!(report.contains("File Name: scans/2024/march.invoice.pdf\n"));
    assert!(is_empty_dir(scratch.path()));
}

#[tokio::test]
async fn test_reprocessing_yields_identical_text() {
    let scratch = tempfile::tempdir().unwrap();
    let store = store_with("incoming", "invoice.pdf");
    let doc = SourceDocument::new("incoming", "invoice.pdf").unwrap();

    let first = pipeline(
        store.clone(),
        scratch.path(),
        FakeRasterizer::with_pages(2),
        FakeOcr::new(Osd::Rotate(0)),
    );
    first.process_document(&doc).await;
    let page_1 = text(&store, "text_outputs/invoice/page_1.txt");
    let page_2 = text(&store, "text_outputs/invoice/page_2.txt");
    let report = text(&store, "reports/processing_report.txt");

    let second = pipeline(
        store.clone(),
        scratch.path(),
        FakeRasterizer::with_pages(2),
        FakeOcr::new(Osd::Rotate(0)),
    );
    second.process_document(&doc).await;

    assert_eq!(text(&store, "text_outputs/invoice/page_1.txt"), page_1);
    assert_eq!(text(&store, "text_outputs/invoice/page_2.txt"), page_2);

    let strip_time = |r: &str| -> Vec<String> {
        r.lines()
            .filter(|l| !l.starts_with("Processing Time:"))
            .map(str::to_string)
            .collect()
    };
    assert_eq!(
        strip_time(&text(&store, "reports/processing_report.txt")),
        strip_time(&report)
    );
    assert!(is_empty_dir(scratch.path()));
}

#[tokio::test]
async fn test_render_failure_after_open_keeps_completed_pages() {
    let scratch = tempfile::tempdir().unwrap();
    let store = store_with("incoming", "ledger.pdf");
    let pipeline = pipeline(
        store.clone(),
        scratch.path(),
        FakeRasterizer::failing_on(3, 2, PageFailure::Render),
        FakeOcr::new(Osd::Rotate(0)),
    );
    let doc = SourceDocument::new("incoming", "ledger.pdf").unwrap();

    let outcome = pipeline.process_document(&doc).await;

    assert_eq!(outcome.status, OutcomeStatus::Failed);
    assert_eq!(outcome.failed_stage, Some(PipelineStage::ExtractingPages));
    assert!(outcome.error.as_deref().unwrap().contains("bitmap failed"));
    assert_eq!(outcome.pages_extracted, 1);
    assert_eq!(
        outcome.uploaded,
        vec![
            "reports/processing_report.txt".to_string(),
            "text_outputs/ledger/page_1.txt".to_string(),
        ]
    );
    assert!(store.get("incoming", "text_outputs/ledger/page_2.txt").is_none());
    assert_eq!(outcome.artifacts_removed, 6);
    assert!(is_empty_dir(scratch.path()));
}

#[tokio::test]
async fn test_crashed_extraction_worker_still_cleans_up() {
    let scratch = tempfile::tempdir().unwrap();
    let store = store_with("incoming", "ledger.pdf");
    let pipeline = pipeline(
        store.clone(),
        scratch.path(),
        FakeRasterizer::failing_on(3, 2, PageFailure::Panic),
        FakeOcr::new(Osd::Rotate(0)),
    );
    let doc = SourceDocument::new("incoming", "ledger.pdf").unwrap();

    let outcome = pipeline.process_document(&doc).await;

    assert_eq!(outcome.status, OutcomeStatus::Failed);
    assert_eq!(outcome.failed_stage, Some(PipelineStage::ExtractingPages));
    assert!(outcome
        .error
        .as_deref()
        .unwrap()
        .contains("Extraction task failed"));
    assert!(outcome.uploaded.is_empty());
    assert_eq!(store.object_names("incoming"), vec!["ledger.pdf".to_string()]);
    // page_1.txt was written before the worker died and is found on disk.
    assert_eq!(outcome.artifacts_removed, 5);
    assert_eq!(outcome.cleanup_failures, 0);
    assert!(is_empty_dir(scratch.path()));
}

#[tokio::test]
async fn test_output_objects_are_skipped() {
    let scratch = tempfile::tempdir().unwrap();
    let store = store_with("incoming", "text_outputs/invoice/page_1.txt");
    let pipeline = pipeline(
        store.clone(),
        scratch.path(),
        FakeRasterizer::with_pages(1),
        FakeOcr::new(Osd::Rotate(0)),
    );
    let doc = SourceDocument::new("incoming", "text_outputs/invoice/page_1.txt").unwrap();

    let outcome = pipeline.process_document(&doc).await;

    assert_eq!(outcome.status, OutcomeStatus::Skipped);
    assert_eq!(
        store.object_names("incoming"),
        vec!["text_outputs/invoice/page_1.txt".to_string()]
    );
    assert_eq!(outcome.artifacts_removed, 0);
    assert!(is_empty_dir(scratch.path()));
}

#[tokio::test]
async fn test_upload_failure_does_not_stop_other_uploads() {
    let scratch = tempfile::tempdir().unwrap();
    let store = store_with("incoming", "invoice.pdf");
    store.fail_uploads_to("reports/processing_report.txt");
    let pipeline = pipeline(
        store.clone(),
        scratch.path(),
        FakeRasterizer::with_pages(2),
        FakeOcr::new(Osd::Rotate(0)),
    );
    let doc = SourceDocument::new("incoming", "invoice.pdf").unwrap();

    let outcome = pipeline.process_document(&doc).await;

    assert_eq!(outcome.status, OutcomeStatus::Failed);
    assert_eq!(outcome.failed_stage, Some(PipelineStage::Uploading));
    assert_eq!(
        outcome.failed_uploads,
        vec!["reports/processing_report.txt".to_string()]
    );
    assert_eq!(
        outcome.uploaded,
        vec![
            "text_outputs/invoice/page_1.txt".to_string(),
            "text_outputs/invoice/page_2.txt".to_string(),
        ]
    );
    assert_eq!(outcome.cleanup_failures, 0);
    assert!(is_empty_dir(scratch.path()));
}
