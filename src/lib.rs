//! Moltblox Flowcharts - renders the platform flowchart deck to PDF
//!
//! # Pipeline
//! 1. Content: the literal deck (journey, roadmap, architecture, revenue)
//! 2. Validation: rules run before anything is drawn
//! 3. Story: content becomes paragraphs, tables, spacers and page breaks
//! 4. Layout: the story flows down the page frame into draw operations
//! 5. Render: printpdf serializes the pages

pub mod content;
pub mod hashing;
pub mod layout;
pub mod metrics;
pub mod palette;
pub mod pipeline;
pub mod render;
pub mod story;
pub mod styles;
pub mod validation;

pub use content::{FlowchartDocument, Page, PageBody};
pub use hashing::{canonical_json, compute_content_hash};
pub use palette::Color;
pub use pipeline::{BuildOptions, BuildReport, FlowchartPipeline, PipelineError};
pub use styles::PageSetup;
pub use validation::{ValidationResult, ValidationRule, ValidationViolation, ViolationSeverity};

pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");
pub const DEFAULT_OUTPUT: &str = "moltblox-flowcharts.pdf";
