//! Data-quality diagnostics collected while loading reference tables.
//!
//! Loading never aborts on a bad cell: unparsable load ranges degrade to `[0, 0]`,
//! unparsable ceilings become "no limit", duplicate keys keep the first occurrence.
//! Each of those fallbacks is recorded here so operators can see what was papered over.
//!
//! # Example
//!
//! ```
//! use derfit_core::diagnostics::{Diagnostics, Severity};
//!
//! let mut diag = Diagnostics::new();
//! diag.add_warning_at_line("categories", "load_range", "unparsable range 'n/a'", 4);
//! diag.add_error_at_line("municipalities", "row", "empty municipality name", 9);
//!
//! assert_eq!(diag.warning_count(), 1);
//! assert_eq!(diag.error_count(), 1);
//! ```

use serde::Serialize;

/// Severity level for diagnostic issues
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Value degraded to a fallback, row kept
    Warning,
    /// Row dropped
    Error,
}

/// A single diagnostic issue encountered while loading
#[derive(Debug, Clone, Serialize)]
pub struct DiagnosticIssue {
    pub severity: Severity,
    /// Table the issue was found in ("municipalities", "categories", "ceilings")
    pub table: String,
    /// Category for grouping (e.g. "load_range", "ceiling", "duplicate", "overlap")
    pub category: String,
    pub message: String,
    /// 1-based data line, header excluded
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
}

impl DiagnosticIssue {
    pub fn new(
        severity: Severity,
        table: impl Into<String>,
        category: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            severity,
            table: table.into(),
            category: category.into(),
            message: message.into(),
            line: None,
        }
    }

    pub fn with_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }
}

impl std::fmt::Display for DiagnosticIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let severity = match self.severity {
            Severity::Warning => "warning",
            Severity::Error => "error",
        };

        write!(
            f,
            "[{}:{}] {}: {}",
            severity, self.category, self.table, self.message
        )?;

        if let Some(line) = self.line {
            write!(f, " at line {}", line)?;
        }

        Ok(())
    }
}

/// Collection of diagnostic issues for one load
#[derive(Debug, Clone, Default, Serialize)]
pub struct Diagnostics {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub issues: Vec<DiagnosticIssue>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, issue: DiagnosticIssue) {
        self.issues.push(issue);
    }

    /// Add a warning for a degraded value
    pub fn add_warning(&mut self, table: &str, category: &str, message: &str) {
        self.add(DiagnosticIssue::new(
            Severity::Warning,
            table,
            category,
            message,
        ));
    }

    pub fn add_warning_at_line(&mut self, table: &str, category: &str, message: &str, line: usize) {
        self.add(DiagnosticIssue::new(Severity::Warning, table, category, message).with_line(line));
    }

    /// Add an error for a dropped row
    pub fn add_error_at_line(&mut self, table: &str, category: &str, message: &str, line: usize) {
        self.add(DiagnosticIssue::new(Severity::Error, table, category, message).with_line(line));
    }

    pub fn warning_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| i.severity == Severity::Warning)
            .count()
    }

    pub fn error_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| i.severity == Severity::Error)
            .count()
    }

    pub fn has_issues(&self) -> bool {
        !self.issues.is_empty()
    }

    /// Get issues filtered by category
    pub fn issues_by_category<'a>(
        &'a self,
        category: &'a str,
    ) -> impl Iterator<Item = &'a DiagnosticIssue> {
        self.issues.iter().filter(move |i| i.category == category)
    }
}

impl std::fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for issue in &self.issues {
            writeln!(f, "{}", issue)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_and_categories() {
        let mut diag = Diagnostics::new();
        assert!(!diag.has_issues());

        diag.add_warning("ceilings", "ceiling", "unparsable ceiling 'livre'");
        diag.add_warning_at_line("categories", "load_range", "unparsable range 'x'", 3);
        diag.add_error_at_line("categories", "row", "missing category code", 5);

        assert!(diag.has_issues());
        assert_eq!(diag.warning_count(), 2);
        assert_eq!(diag.error_count(), 1);
        assert_eq!(diag.issues_by_category("load_range").count(), 1);
    }

    #[test]
    fn test_issue_display() {
        let issue = DiagnosticIssue::new(
            Severity::Warning,
            "categories",
            "load_range",
            "unparsable range 'n/a', using [0, 0]",
        )
        .with_line(7);
        assert_eq!(
            issue.to_string(),
            "[warning:load_range] categories: unparsable range 'n/a', using [0, 0] at line 7"
        );
    }

    #[test]
    fn test_serialization_skips_missing_line() {
        let mut diag = Diagnostics::new();
        diag.add_warning("ceilings", "ceiling", "no ceiling");
        let json = serde_json::to_value(&diag).unwrap();
        assert!(json["issues"][0].get("line").is_none());
        assert_eq!(json["issues"][0]["severity"], "warning");
    }
}
