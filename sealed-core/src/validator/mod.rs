//! Content Validator - checks hand-authored content files before compiling
//!
//! Reports authoring problems per product without touching the catalog.
//! Construction failures surface here as errors, so a clean validation run
//! means every non-empty record will build.

use serde::Serialize;
use serde_json::Value;
use std::fmt;
use tracing::{debug, info};

pub mod rules;


use crate::content::{expand_copies, ContentError, ContentFile};
use rules::*;

/// Severity levels for validation issues
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,   // Product will be rejected at compile time
    Warning, // Likely an authoring mistake
    Info,    // Nice to know
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Info => write!(f, "info"),
        }
    }
}

/// A validation issue found in a product record
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationIssue {
    pub severity: Severity,
    /// Set code of the content file
    pub container: String,
    /// Product name
    pub product: String,
    /// Unique identifier for the rule that raised it
    pub rule_id: &'static str,
    pub message: String,
}

/// One product record as the rules see it
#[derive(Debug)]
pub struct ProductRecord<'a> {
    pub container: &'a str,
    pub name: &'a str,
    /// Record as written
    pub raw: &'a Value,
    /// Record after copy substitution
    pub expanded: Result<Value, ContentError>,
}

impl ProductRecord<'_> {
    /// Build an issue attributed to this product
    pub fn issue(
        &self,
        severity: Severity,
        rule_id: &'static str,
        message: impl Into<String>,
    ) -> ValidationIssue {
        ValidationIssue {
            severity,
            container: self.container.to_string(),
            product: self.name.to_string(),
            rule_id,
            message: message.into(),
        }
    }
}

/// Trait for validation rules
pub trait ContentRule: Send + Sync {
    /// Check a product record for issues
    fn check(&self, record: &ProductRecord<'_>) -> Vec<ValidationIssue>;

    fn rule_id(&self) -> &'static str;

    fn description(&self) -> &'static str;
}

/// Main content validator
pub struct ContentValidator {
    rules: Vec<Box<dyn ContentRule>>,
}

/// Validation results for a single content file
#[derive(Debug, Clone, Serialize)]
pub struct ContainerValidationResult {
    pub code: String,
    pub issues: Vec<ValidationIssue>,
    pub error_count: usize,
    pub warning_count: usize,
}

/// Validation results for a set of content files
#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    pub containers: Vec<ContainerValidationResult>,
    pub total_errors: usize,
    pub total_warnings: usize,
}

impl ValidationReport {
    pub fn has_errors(&self) -> bool {
        self.total_errors > 0
    }

    pub fn issues(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.containers.iter().flat_map(|c| c.issues.iter())
    }
}

impl ContentValidator {
    /// Create validator with the default rule set
    pub fn new() -> Self {
        let rules: Vec<Box<dyn ContentRule>> = vec![
            Box::new(RecordShapeRule),
            Box::new(UnknownKeyRule),
            Box::new(CardCountRule),
            Box::new(EmptyRecordRule),
            Box::new(ConstructionRule),
        ];

        Self { rules }
    }

    pub fn rules(&self) -> impl Iterator<Item = &dyn ContentRule> {
        self.rules.iter().map(|rule| rule.as_ref())
    }

    /// Validate every product of one content file
    pub fn validate_container(&self, file: &ContentFile) -> ContainerValidationResult {
        debug!("Validating content file: {}", file.code);

        let mut issues = Vec::new();
        for (name, expanded) in expand_copies(&file.products) {
            let Some(raw) = file.products.get(&name) else {
                continue;
            };
            let record = ProductRecord {
                container: &file.code,
                name: &name,
                raw,
                expanded,
            };
            for rule in &self.rules {
                issues.extend(rule.check(&record));
            }
        }

        let error_count = issues
            .iter()
            .filter(|i| i.severity == Severity::Error)
            .count();
        let warning_count = issues
            .iter()
            .filter(|i| i.severity == Severity::Warning)
            .count();

        ContainerValidationResult {
            code: file.code.clone(),
            issues,
            error_count,
            warning_count,
        }
    }

    /// Validate multiple content files
    pub fn validate_all(&self, files: &[ContentFile]) -> ValidationReport {
        info!("Validating {} content files", files.len());

        let mut containers = Vec::with_capacity(files.len());
        let mut total_errors = 0;
        let mut total_warnings = 0;

        for file in files {
            let result = self.validate_container(file);
            total_errors += result.error_count;
            total_warnings += result.warning_count;
            containers.push(result);
        }

        ValidationReport {
            containers,
            total_errors,
            total_warnings,
        }
    }
}

impl Default for ContentValidator {
    fn default() -> Self {
        Self::new()
    }
}
