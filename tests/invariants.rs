//! Contract Invariant Tests
//!
//! These tests verify the guarantees of a build: a real PDF on disk,
//! validation before rendering, and reports that match the file.

use std::fs;

use moltblox_flowcharts::{
    content::{PageBody, RevenueFlow},
    hashing::{compute_content_hash, sha256_hex},
    BuildOptions, FlowchartDocument, FlowchartPipeline, PipelineError,
};

fn revenue_mut(doc: &mut FlowchartDocument) -> &mut RevenueFlow {
    doc.pages
        .iter_mut()
        .find_map(|page| match &mut page.body {
            PageBody::Revenue(flow) => Some(flow),
            _ => None,
        })
        .expect("deck has a revenue page")
}

fn options_in(dir: &tempfile::TempDir, name: &str) -> BuildOptions {
    BuildOptions {
        output: dir.path().join(name),
        ..BuildOptions::default()
    }
}

#[test]
fn invariant_build_writes_pdf() {
    let dir = tempfile::tempdir().unwrap();
    let options = options_in(&dir, "moltblox-flowcharts.pdf");

    let report = FlowchartPipeline::default().build(&options).unwrap();

    let bytes = fs::read(&options.output).unwrap();
    assert!(!bytes.is_empty());
    assert!(bytes.starts_with(b"%PDF-"));
    assert_eq!(report.bytes, bytes.len() as u64);
    assert_eq!(report.output_hash, sha256_hex(&bytes));
    assert_eq!(report.title, "Moltblox Flowcharts");
    assert!(report.validation.valid);
}

#[test]
fn invariant_every_content_page_is_rendered() {
    let dir = tempfile::tempdir().unwrap();
    let report = FlowchartPipeline::default()
        .build(&options_in(&dir, "deck.pdf"))
        .unwrap();

    // The roadmap is taller than one landscape frame and flows onto a second page.
    assert!(report.pages >= 4);
}

#[test]
fn invariant_build_calls_validate() {
    // An unbalanced revenue split must be rejected before anything is written.
    let mut doc = FlowchartDocument::moltblox();
    revenue_mut(&mut doc).splits[0].percent = 90;

    let dir = tempfile::tempdir().unwrap();
    let options = options_in(&dir, "invalid.pdf");
    let result = FlowchartPipeline::new(doc).build(&options);

    let err = result.unwrap_err();
    assert!(matches!(err, PipelineError::ValidationFailed(_)));
    assert!(err.to_string().contains("Validation failed"));
    assert!(!options.output.exists());
}

#[test]
fn invariant_journey_wider_than_page_is_rejected() {
    let mut doc = FlowchartDocument::moltblox();
    if let PageBody::Journey { columns, .. } = &mut doc.pages[0].body {
        *columns = 4;
    }

    let dir = tempfile::tempdir().unwrap();
    let options = options_in(&dir, "wide.pdf");
    let err = FlowchartPipeline::new(doc).build(&options).unwrap_err();
    assert!(matches!(err, PipelineError::ValidationFailed(_)));
    assert!(err.to_string().contains("journey columns"));
    assert!(!options.output.exists());
}

#[cfg(feature = "test-hooks")]
#[test]
fn invariant_validation_counter_increments_on_build() {
    use moltblox_flowcharts::pipeline::{get_validation_call_count, reset_validation_call_count};

    reset_validation_call_count();
    let dir = tempfile::tempdir().unwrap();
    FlowchartPipeline::default()
        .build(&options_in(&dir, "counted.pdf"))
        .unwrap();
    assert!(get_validation_call_count() >= 1);
}

#[test]
fn invariant_creates_missing_directories() {
    let dir = tempfile::tempdir().unwrap();
    let options = options_in(&dir, "nested/docs/moltblox-flowcharts.pdf");

    FlowchartPipeline::default().build(&options).unwrap();
    assert!(options.output.is_file());
}

#[test]
fn invariant_write_failure_propagates() {
    let dir = tempfile::tempdir().unwrap();
    // The output path is an existing directory.
    let options = BuildOptions {
        output: dir.path().to_path_buf(),
        ..BuildOptions::default()
    };

    let err = FlowchartPipeline::default().build(&options).unwrap_err();
    assert!(matches!(err, PipelineError::Io { .. }));
}

#[test]
fn invariant_content_json_round_trip() {
    let doc = FlowchartDocument::moltblox();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("deck.json");
    fs::write(&path, doc.to_json_pretty().unwrap()).unwrap();

    let pipeline = FlowchartPipeline::from_file(&path).unwrap();
    assert_eq!(pipeline.document(), &doc);
    assert_eq!(
        compute_content_hash(pipeline.document()).unwrap(),
        compute_content_hash(&doc).unwrap()
    );
}

#[test]
fn invariant_content_hash_stable_across_builds() {
    let dir = tempfile::tempdir().unwrap();
    let pipeline = FlowchartPipeline::default();

    let first = pipeline.build(&options_in(&dir, "a.pdf")).unwrap();
    let second = pipeline.build(&options_in(&dir, "b.pdf")).unwrap();

    assert_eq!(first.content_hash, second.content_hash);
    assert_ne!(first.id, second.id);
}

#[test]
fn invariant_bad_content_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.json");
    fs::write(&path, r#"{"title": "Deck", "pages": [{"title": "x"}]}"#).unwrap();

    assert!(matches!(
        FlowchartPipeline::from_file(&path),
        Err(PipelineError::Content(_))
    ));
    assert!(matches!(
        FlowchartPipeline::from_file(&dir.path().join("missing.json")),
        Err(PipelineError::Content(_))
    ));
}

#[test]
fn invariant_custom_deck_renders() {
    let json = r##"{
        "title": "Tiny Deck",
        "pages": [{
            "title": "Flow",
            "subtitle": "Two steps",
            "body": {
                "kind": "journey",
                "columns": 2,
                "steps": [
                    {"title": "Start", "body": "first"},
                    {"title": "Finish", "body": "second"}
                ]
            }
        }]
    }"##;
    let doc: FlowchartDocument = serde_json::from_str(json).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let report = FlowchartPipeline::new(doc)
        .build(&options_in(&dir, "tiny.pdf"))
        .unwrap();
    assert_eq!(report.pages, 1);
}
