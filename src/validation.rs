//! Validation System - Rule/Policy Separation
//!
//! Rules produce structured violations.
//! Policy: errors block a build, warnings are only reported.

use serde::{Deserialize, Serialize};

use crate::content::{FlowchartDocument, PageBody, RevenueFlow};
use crate::metrics;
use crate::story;
use crate::styles::PageSetup;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ViolationSeverity {
    Error,
    Warning,
    Info,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationViolation {
    pub rule: String,
    pub severity: ViolationSeverity,
    pub message: String,
    pub expected: Option<String>,
    pub actual: Option<String>,
    pub remediation: Vec<String>,
}

impl ValidationViolation {
    fn error(rule: &str, message: impl Into<String>) -> Self {
        Self {
            rule: rule.to_string(),
            severity: ViolationSeverity::Error,
            message: message.into(),
            expected: None,
            actual: None,
            remediation: vec![],
        }
    }

    fn warning(rule: &str, message: impl Into<String>) -> Self {
        Self {
            severity: ViolationSeverity::Warning,
            ..Self::error(rule, message)
        }
    }

    fn info(rule: &str, message: impl Into<String>) -> Self {
        Self {
            severity: ViolationSeverity::Info,
            ..Self::error(rule, message)
        }
    }

    fn expected(mut self, expected: impl Into<String>, actual: impl Into<String>) -> Self {
        self.expected = Some(expected.into());
        self.actual = Some(actual.into());
        self
    }

    fn remediation(mut self, hint: &str) -> Self {
        self.remediation.push(hint.to_string());
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub violations: Vec<ValidationViolation>,
    pub document_title: String,
}

impl ValidationResult {
    pub fn has_errors(&self) -> bool {
        self.violations.iter().any(|v| v.severity == ViolationSeverity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &ValidationViolation> {
        self.violations.iter().filter(|v| v.severity == ViolationSeverity::Warning)
    }

    /// One line per blocking violation, `rule: message`
    pub fn error_summary(&self) -> String {
        self.violations
            .iter()
            .filter(|v| v.severity == ViolationSeverity::Error)
            .map(|v| format!("{}: {}", v.rule, v.message))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// Validation rule trait - produces violations
pub trait ValidationRule {
    fn name(&self) -> &'static str;
    fn validate(&self, document: &FlowchartDocument) -> Vec<ValidationViolation>;
}

// --- Concrete Rules ---

/// Checks every page has content and every journey row fits the frame
pub struct PageStructureRule {
    pub frame_width: f32,
}

impl PageStructureRule {
    pub fn for_page(setup: &PageSetup) -> Self {
        Self { frame_width: setup.frame().width }
    }
}

impl ValidationRule for PageStructureRule {
    fn name(&self) -> &'static str { "page_structure" }

    fn validate(&self, document: &FlowchartDocument) -> Vec<ValidationViolation> {
        if document.pages.is_empty() {
            return vec![ValidationViolation::error(self.name(), "Document has no pages")
                .expected("at least 1 page", "0 pages")];
        }

        let mut violations = vec![];
        for (index, page) in document.pages.iter().enumerate() {
            let number = index + 1;
            let (label, count) = match &page.body {
                PageBody::Journey { columns, steps } => {
                    if *columns == 0 {
                        violations.push(
                            ValidationViolation::error(
                                self.name(),
                                format!("Page {}: journey needs at least one column", number),
                            )
                            .expected(">= 1 column", "0 columns"),
                        );
                    }
                    let row_width = story::journey_row_width((*columns).min(steps.len()));
                    if row_width > self.frame_width + 1e-3 {
                        violations.push(
                            ValidationViolation::error(
                                self.name(),
                                format!("Page {}: {} journey columns do not fit the page", number, columns),
                            )
                            .expected(
                                format!("row width <= {:.1}pt", self.frame_width),
                                format!("{:.1}pt", row_width),
                            )
                            .remediation("Use fewer columns per journey row"),
                        );
                    }
                    ("journey steps", steps.len())
                }
                PageBody::Roadmap { phases } => ("roadmap phases", phases.len()),
                PageBody::Architecture { layers } => ("architecture layers", layers.len()),
                PageBody::Revenue(flow) => {
                    if flow.streams.is_empty() {
                        violations.push(ValidationViolation::error(
                            self.name(),
                            format!("Page {}: no revenue streams", number),
                        ));
                    }
                    ("revenue splits", flow.splits.len())
                }
            };
            if count == 0 {
                violations.push(
                    ValidationViolation::error(self.name(), format!("Page {}: no {}", number, label))
                        .remediation("Remove the page or add content to it"),
                );
            }
        }
        violations
    }
}

pub struct BlankTextRule;

impl BlankTextRule {
    fn check(&self, out: &mut Vec<ValidationViolation>, location: String, text: &str) {
        if text.trim().is_empty() {
            out.push(
                ValidationViolation::error(self.name(), format!("{} has an empty title", location))
                    .remediation("Give every box a title"),
            );
        }
    }
}

impl ValidationRule for BlankTextRule {
    fn name(&self) -> &'static str { "blank_text" }

    fn validate(&self, document: &FlowchartDocument) -> Vec<ValidationViolation> {
        let mut violations = vec![];
        self.check(&mut violations, "Document".into(), &document.title);

        for (index, page) in document.pages.iter().enumerate() {
            let page_no = index + 1;
            self.check(&mut violations, format!("Page {}", page_no), &page.title);

            match &page.body {
                PageBody::Journey { steps, .. } => {
                    for (i, step) in steps.iter().enumerate() {
                        self.check(&mut violations, format!("Page {} step {}", page_no, i + 1), &step.title);
                    }
                }
                PageBody::Roadmap { phases } => {
                    for (i, phase) in phases.iter().enumerate() {
                        self.check(&mut violations, format!("Page {} phase {}", page_no, i + 1), &phase.title);
                    }
                }
                PageBody::Architecture { layers } => {
                    for (i, layer) in layers.iter().enumerate() {
                        self.check(&mut violations, format!("Page {} layer {}", page_no, i + 1), &layer.title);
                    }
                }
                PageBody::Revenue(flow) => {
                    self.check(&mut violations, format!("Page {} source", page_no), &flow.source.title);
                    self.check(&mut violations, format!("Page {} escrow", page_no), &flow.escrow.title);
                    for (i, split) in flow.splits.iter().enumerate() {
                        let location = format!("Page {} split {}", page_no, i + 1);
                        self.check(&mut violations, location.clone(), &split.label);
                        self.check(&mut violations, location, &split.destination.title);
                    }
                    for (i, stream) in flow.streams.iter().enumerate() {
                        self.check(&mut violations, format!("Page {} stream {}", page_no, i + 1), &stream.title);
                    }
                }
            }
        }
        violations
    }
}

pub struct SplitTotalRule;

impl SplitTotalRule {
    fn check_flow(&self, page_no: usize, flow: &RevenueFlow) -> Vec<ValidationViolation> {
        let mut violations = vec![];
        if flow.splits.is_empty() {
            return violations;
        }

        let total: u64 = flow.splits.iter().map(|s| u64::from(s.percent)).sum();
        if total != 100 {
            violations.push(
                ValidationViolation::error(
                    self.name(),
                    format!("Page {}: revenue splits do not add up", page_no),
                )
                .expected("100%", format!("{}%", total))
                .remediation("Adjust split percentages so every payment is fully distributed"),
            );
        }

        for split in flow.splits.iter().filter(|s| s.percent == 0) {
            violations.push(ValidationViolation::warning(
                self.name(),
                format!("Page {}: split '{}' receives nothing", page_no, split.label),
            ));
        }
        violations
    }
}

impl ValidationRule for SplitTotalRule {
    fn name(&self) -> &'static str { "split_total" }

    fn validate(&self, document: &FlowchartDocument) -> Vec<ValidationViolation> {
        document
            .pages
            .iter()
            .enumerate()
            .filter_map(|(i, page)| match &page.body {
                PageBody::Revenue(flow) => Some(self.check_flow(i + 1, flow)),
                _ => None,
            })
            .flatten()
            .collect()
    }
}

pub struct EncodingRule;

impl ValidationRule for EncodingRule {
    fn name(&self) -> &'static str { "encoding" }

    fn validate(&self, document: &FlowchartDocument) -> Vec<ValidationViolation> {
        // Walk every string in the document through its JSON form.
        self.check_value(serde_json::to_value(document))
    }
}

impl EncodingRule {
    fn check_value(&self, value: serde_json::Result<serde_json::Value>) -> Vec<ValidationViolation> {
        let value = match value {
            Ok(value) => value,
            Err(e) => {
                return vec![ValidationViolation::info(
                    self.name(),
                    format!("Text encoding was not checked: {}", e),
                )]
            }
        };

        let mut unsupported: Vec<char> = vec![];
        collect_strings(&value, &mut |s: &str| {
            for c in s.chars().filter(|c| !metrics::is_renderable(*c)) {
                if !unsupported.contains(&c) {
                    unsupported.push(c);
                }
            }
        });

        if unsupported.is_empty() {
            return vec![];
        }
        vec![ValidationViolation::warning(self.name(), "Text contains characters the built-in fonts cannot draw")
            .expected("Latin text", unsupported.iter().collect::<String>())
            .remediation("These characters render as '?'")]
    }
}

fn collect_strings(value: &serde_json::Value, visit: &mut impl FnMut(&str)) {
    match value {
        serde_json::Value::String(s) => visit(s),
        serde_json::Value::Array(items) => items.iter().for_each(|v| collect_strings(v, visit)),
        serde_json::Value::Object(map) => map.values().for_each(|v| collect_strings(v, visit)),
        _ => {}
    }
}

/// Validator orchestrates rules and applies policy
pub struct Validator {
    rules: Vec<Box<dyn ValidationRule>>,
}

impl Validator {
    pub fn new() -> Self {
        Self::for_page(&PageSetup::default())
    }

    /// Rules measured against a specific page setup
    pub fn for_page(setup: &PageSetup) -> Self {
        Self {
            rules: vec![
                Box::new(PageStructureRule::for_page(setup)),
                Box::new(BlankTextRule),
                Box::new(SplitTotalRule),
                Box::new(EncodingRule),
            ],
        }
    }

    pub fn validate(&self, document: &FlowchartDocument) -> ValidationResult {
        let violations: Vec<_> = self
            .rules
            .iter()
            .flat_map(|rule| rule.validate(document))
            .collect();

        let valid = !violations.iter().any(|v| v.severity == ViolationSeverity::Error);
        ValidationResult {
            valid,
            violations,
            document_title: document.title.clone(),
        }
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}
