//! Validation result

use crate::diagnostic::{Severity, ValidationCode, ValidationIssue};
use serde::{Deserialize, Serialize};

/// Outcome of validating a schema
///
/// `valid` is true exactly when `errors` is empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    /// Whether the schema has no errors
    pub valid: bool,

    /// Blocking issues
    pub errors: Vec<ValidationIssue>,

    /// Advisory issues
    pub warnings: Vec<ValidationIssue>,
}

impl ValidationResult {
    /// Create an empty (valid) result
    pub fn new() -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Create a result from issues, routing each by severity
    pub fn from_issues(issues: impl IntoIterator<Item = ValidationIssue>) -> Self {
        let mut result = Self::new();
        for issue in issues {
            result.push(issue);
        }
        result
    }

    /// Add an issue to the result
    pub fn push(&mut self, issue: ValidationIssue) {
        match issue.severity {
            Severity::Error => self.errors.push(issue),
            Severity::Warn => self.warnings.push(issue),
        }
        self.valid = self.errors.is_empty();
    }

    /// Check whether any error or warning carries the code
    pub fn has_code(&self, code: ValidationCode) -> bool {
        self.issues().any(|i| i.code == code)
    }

    /// Count issues with the code
    pub fn count_code(&self, code: ValidationCode) -> usize {
        self.issues().filter(|i| i.code == code).count()
    }

    /// Iterate errors then warnings
    pub fn issues(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.errors.iter().chain(self.warnings.iter())
    }

    /// Serialize to JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

impl Default for ValidationResult {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_result_is_valid() {
        let result = ValidationResult::new();
        assert!(result.valid);
        assert!(result.errors.is_empty());
    }

    #[test]
    fn issues_route_by_severity() {
        let result = ValidationResult::from_issues(vec![
            ValidationIssue::new(ValidationCode::MissingPrimaryKey, "no key").with_table("logs"),
            ValidationIssue::new(ValidationCode::MissingIndex, "no index"),
        ]);

        assert!(!result.valid);
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.warnings.len(), 1);
        assert!(result.has_code(ValidationCode::MissingIndex));
        assert_eq!(result.count_code(ValidationCode::NamingConvention), 0);
    }

    #[test]
    fn warnings_keep_result_valid() {
        let result = ValidationResult::from_issues(vec![
            ValidationIssue::new(ValidationCode::NamingConvention, "CamelCase table"),
        ]);
        assert!(result.valid);
    }

    #[test]
    fn result_serialization() {
        let json = ValidationResult::new().to_json().unwrap();
        assert!(json.contains("\"valid\": true"));
        assert!(json.contains("\"warnings\""));
    }
}
