//! Build Pipeline - Single Entry Point
//!
//! build() ALWAYS validates first. Invalid content never reaches the renderer.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use crate::content::{ContentError, FlowchartDocument};
use crate::hashing::{compute_content_hash, sha256_hex};
use crate::layout;
use crate::render::{self, RenderError};
use crate::story;
use crate::styles::PageSetup;
use crate::validation::{ValidationResult, Validator};
use crate::{DEFAULT_OUTPUT, ENGINE_VERSION};

#[cfg(feature = "test-hooks")]
use std::sync::atomic::{AtomicU32, Ordering};

#[cfg(feature = "test-hooks")]
static VALIDATION_CALL_COUNT: AtomicU32 = AtomicU32::new(0);

#[cfg(feature = "test-hooks")]
pub fn get_validation_call_count() -> u32 {
    VALIDATION_CALL_COUNT.load(Ordering::SeqCst)
}

#[cfg(feature = "test-hooks")]
pub fn reset_validation_call_count() {
    VALIDATION_CALL_COUNT.store(0, Ordering::SeqCst);
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    #[error(transparent)]
    Content(#[from] ContentError),

    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    #[error("Failed to write {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[derive(Debug, Clone)]
pub struct BuildOptions {
    pub output: PathBuf,
    pub page: PageSetup,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            output: PathBuf::from(DEFAULT_OUTPUT),
            page: PageSetup::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildReport {
    pub id: String,
    pub title: String,
    pub output: PathBuf,
    pub bytes: u64,
    pub pages: usize,
    pub content_hash: String,
    pub output_hash: String,
    pub engine_version: String,
    pub created_at: DateTime<Utc>,
    pub validation: ValidationResult,
}

/// Rendered PDF held in memory
#[derive(Debug, Clone)]
pub struct RenderedPdf {
    pub bytes: Vec<u8>,
    pub pages: usize,
}

/// The build pipeline - one document in, one PDF out
pub struct FlowchartPipeline {
    document: FlowchartDocument,
}

impl FlowchartPipeline {
    pub fn new(document: FlowchartDocument) -> Self {
        Self { document }
    }

    pub fn from_file(path: &Path) -> Result<Self, PipelineError> {
        Ok(Self::new(FlowchartDocument::load_from_file(path)?))
    }

    pub fn document(&self) -> &FlowchartDocument {
        &self.document
    }

    /// Validate the document against the default page setup
    pub fn validate(&self) -> ValidationResult {
        self.validate_for(&PageSetup::default())
    }

    /// Validate the document against the page it will be rendered on
    ///
    /// This is the ONLY validation entry point.
    pub fn validate_for(&self, page: &PageSetup) -> ValidationResult {
        #[cfg(feature = "test-hooks")]
        VALIDATION_CALL_COUNT.fetch_add(1, Ordering::SeqCst);

        let result = Validator::for_page(page).validate(&self.document);
        for warning in result.warnings() {
            warn!(rule = %warning.rule, "{}", warning.message);
        }
        result
    }

    /// Compose, lay out and render without touching the filesystem
    pub fn render(&self, page: &PageSetup) -> Result<RenderedPdf, PipelineError> {
        let flowables = story::compose(&self.document, page);
        let pages = layout::layout(&flowables, page);
        let bytes = render::render_pdf(&self.document.title, &pages, page)?;
        Ok(RenderedPdf { bytes, pages: pages.len() })
    }

    /// Build the PDF file
    ///
    /// CRITICAL: This ALWAYS calls validate internally. No bypass possible.
    pub fn build(&self, options: &BuildOptions) -> Result<BuildReport, PipelineError> {
        info!(title = %self.document.title, output = %options.output.display(), "building flowcharts");

        let validation = self.validate_for(&options.page);
        if !validation.valid {
            return Err(PipelineError::ValidationFailed(validation.error_summary()));
        }

        let rendered = self.render(&options.page)?;
        write_output(&options.output, &rendered.bytes)?;

        let report = BuildReport {
            id: Uuid::new_v4().to_string(),
            title: self.document.title.clone(),
            output: options.output.clone(),
            bytes: rendered.bytes.len() as u64,
            pages: rendered.pages,
            content_hash: compute_content_hash(&self.document)?,
            output_hash: sha256_hex(&rendered.bytes),
            engine_version: ENGINE_VERSION.to_string(),
            created_at: Utc::now(),
            validation,
        };

        info!(bytes = report.bytes, pages = report.pages, "generated {}", report.output.display());
        Ok(report)
    }
}

impl Default for FlowchartPipeline {
    fn default() -> Self {
        Self::new(FlowchartDocument::moltblox())
    }
}

fn write_output(path: &Path, bytes: &[u8]) -> Result<(), PipelineError> {
    let io_error = |source| PipelineError::Io { path: path.display().to_string(), source };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(io_error)?;
    }
    fs::write(path, bytes).map_err(io_error)
}

/// `1234567` -> `1,234,567`
pub fn format_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
