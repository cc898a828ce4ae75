//! Diagnostics channel
//!
//! Every non-fatal problem found while indexing the catalog or compiling
//! contents lands here instead of aborting the run. The accumulator is passed
//! by `&mut` through each stage and flushed once by the orchestrator.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::Write;
use std::path::Path;

/// What kind of problem a diagnostic describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// A card, pack, deck or product was not found in the catalog index
    ResolutionMiss,
    /// A catalog record was missing its name/number or id and was skipped
    CatalogAnomaly,
    /// A product was rejected during construction
    StructuralError,
    /// A product record had no contents at all
    MissingContents,
}

/// A single recorded problem
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    /// Container (set) code the problem belongs to
    pub container: String,
    /// Product being processed, if any
    pub product: Option<String>,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.product {
            Some(product) => write!(f, "{} - {}: {}", self.container, product, self.message),
            None => write!(f, "{}: {}", self.container, self.message),
        }
    }
}

/// Append-only diagnostics accumulator
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a diagnostic and mirror it to the log
    pub fn push(
        &mut self,
        kind: DiagnosticKind,
        container: impl Into<String>,
        product: Option<&str>,
        message: impl Into<String>,
    ) {
        self.record(Diagnostic {
            kind,
            container: container.into(),
            product: product.map(str::to_string),
            message: message.into(),
        });
    }

    /// Record an already built diagnostic, e.g. one replayed from a cache
    pub fn record(&mut self, diagnostic: Diagnostic) {
        match diagnostic.kind {
            DiagnosticKind::StructuralError => tracing::error!("{}", diagnostic),
            DiagnosticKind::MissingContents => tracing::info!("{}", diagnostic),
            _ => tracing::warn!("{}", diagnostic),
        }

        self.entries.push(diagnostic);
    }

    pub fn resolution_miss(
        &mut self,
        container: &str,
        product: Option<&str>,
        message: impl Into<String>,
    ) {
        self.push(DiagnosticKind::ResolutionMiss, container, product, message);
    }

    pub fn catalog_anomaly(&mut self, container: &str, message: impl Into<String>) {
        self.push(DiagnosticKind::CatalogAnomaly, container, None, message);
    }

    pub fn structural(&mut self, container: &str, product: &str, message: impl Into<String>) {
        self.push(
            DiagnosticKind::StructuralError,
            container,
            Some(product),
            message,
        );
    }

    /// Move every entry of `other` onto the end of this accumulator
    pub fn extend(&mut self, other: Diagnostics) {
        self.entries.extend(other.entries);
    }

    pub fn entries(&self) -> &[Diagnostic] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn count(&self, kind: DiagnosticKind) -> usize {
        self.entries.iter().filter(|d| d.kind == kind).count()
    }

    /// Write the status log, one line per diagnostic
    pub fn write_status_file(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let file = std::fs::File::create(path)
            .with_context(|| format!("Failed to create status file: {}", path.display()))?;
        let mut writer = std::io::BufWriter::new(file);

        writeln!(writer, "Starting output")?;
        for diagnostic in &self.entries {
            writeln!(writer, "{diagnostic}")?;
        }
        writer.flush()?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_and_count() {
        let mut diagnostics = Diagnostics::new();
        diagnostics.resolution_miss("abc", Some("Booster Box"), "Card number 5 not found in set ABC");
        diagnostics.catalog_anomaly("abc", "Sealed product missing uuid");
        diagnostics.structural("abc", "Bundle", "Self-referential product Bundle");

        assert_eq!(diagnostics.len(), 3);
        assert_eq!(diagnostics.count(DiagnosticKind::ResolutionMiss), 1);
        assert_eq!(diagnostics.count(DiagnosticKind::StructuralError), 1);
        assert_eq!(
            diagnostics.entries()[0].to_string(),
            "abc - Booster Box: Card number 5 not found in set ABC"
        );
        assert_eq!(
            diagnostics.entries()[1].to_string(),
            "abc: Sealed product missing uuid"
        );
    }

    #[test]
    fn test_extend_keeps_order() {
        let mut first = Diagnostics::new();
        first.catalog_anomaly("aaa", "one");
        let mut second = Diagnostics::new();
        second.catalog_anomaly("bbb", "two");

        first.extend(second);
        let containers: Vec<_> = first.entries().iter().map(|d| d.container.as_str()).collect();
        assert_eq!(containers, vec!["aaa", "bbb"]);
    }

    #[test]
    fn test_write_status_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs").join("status.txt");

        let mut diagnostics = Diagnostics::new();
        diagnostics.resolution_miss("abc", None, "Deck named Foo not found in set ABC");
        diagnostics.write_status_file(&path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            content,
            "Starting output\nabc: Deck named Foo not found in set ABC\n"
        );
    }
}
