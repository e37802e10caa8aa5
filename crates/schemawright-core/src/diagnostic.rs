//! Validation codes and issue reporting
//!
//! IMPORTANT: Validation codes are versioned and stable.
//! NEVER rename or remove codes - they are part of the public API.
//! Add new codes with new names only.

use serde::{Deserialize, Serialize};

/// Validation code registry (v1)
///
/// These codes are STABLE and VERSIONED.
/// Do NOT rename or remove codes - only add new ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValidationCode {
    // Structural errors
    /// A table or collection has no primary key
    MissingPrimaryKey,

    /// A foreign key or reference points at a missing table/column
    InvalidForeignKey,

    /// Two tables or collections share a name
    DuplicateTable,

    /// Two columns or fields in one table share a name
    DuplicateColumn,

    // Design warnings
    /// A column that is normally required allows NULL
    MissingNotNull,

    /// A name does not follow the dialect's naming convention
    NamingConvention,

    /// A foreign key column is not the leading column of any index
    MissingIndex,

    /// An index duplicates another index or the primary key
    RedundantIndex,

    /// A name collides with a reserved SQL keyword
    ReservedKeyword,

    /// A foreign key column type differs from the referenced column type
    ForeignKeyTypeMismatch,

    /// Foreign keys form a cycle
    CircularDependency,

    /// The schema has no tables or collections
    EmptySchema,
}

impl ValidationCode {
    /// Get the validation code as a stable string identifier
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MissingPrimaryKey => "MISSING_PRIMARY_KEY",
            Self::InvalidForeignKey => "INVALID_FOREIGN_KEY",
            Self::DuplicateTable => "DUPLICATE_TABLE",
            Self::DuplicateColumn => "DUPLICATE_COLUMN",
            Self::MissingNotNull => "MISSING_NOT_NULL",
            Self::NamingConvention => "NAMING_CONVENTION",
            Self::MissingIndex => "MISSING_INDEX",
            Self::RedundantIndex => "REDUNDANT_INDEX",
            Self::ReservedKeyword => "RESERVED_KEYWORD",
            Self::ForeignKeyTypeMismatch => "FOREIGN_KEY_TYPE_MISMATCH",
            Self::CircularDependency => "CIRCULAR_DEPENDENCY",
            Self::EmptySchema => "EMPTY_SCHEMA",
        }
    }

    /// Severity used when no override is configured
    pub fn default_severity(&self) -> Severity {
        match self {
            Self::MissingPrimaryKey
            | Self::InvalidForeignKey
            | Self::DuplicateTable
            | Self::DuplicateColumn => Severity::Error,
            _ => Severity::Warn,
        }
    }
}

impl std::fmt::Display for ValidationCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Issue severity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Warning - should be reviewed but does not invalidate the schema
    Warn,

    /// Error - the schema is structurally invalid
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Warn => write!(f, "warn"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// A validation finding with structured metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationIssue {
    /// Stable validation code
    pub code: ValidationCode,

    /// Severity level
    pub severity: Severity,

    /// Human-readable message
    pub message: String,

    /// Table or collection the issue belongs to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table: Option<String>,

    /// Column or field the issue belongs to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<String>,
}

impl ValidationIssue {
    /// Create an issue with the code's default severity
    pub fn new(code: ValidationCode, message: impl Into<String>) -> Self {
        Self {
            code,
            severity: code.default_severity(),
            message: message.into(),
            table: None,
            column: None,
        }
    }

    /// Set the table
    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.table = Some(table.into());
        self
    }

    /// Set the column
    pub fn with_column(mut self, column: impl Into<String>) -> Self {
        self.column = Some(column.into());
        self
    }

    /// Override the severity
    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_code_stability() {
        assert_eq!(ValidationCode::MissingPrimaryKey.as_str(), "MISSING_PRIMARY_KEY");
        assert_eq!(ValidationCode::InvalidForeignKey.as_str(), "INVALID_FOREIGN_KEY");
        assert_eq!(ValidationCode::RedundantIndex.as_str(), "REDUNDANT_INDEX");
    }

    #[test]
    fn default_severities() {
        assert_eq!(ValidationCode::MissingPrimaryKey.default_severity(), Severity::Error);
        assert_eq!(ValidationCode::MissingIndex.default_severity(), Severity::Warn);
    }

    #[test]
    fn issue_serialization() {
        let issue = ValidationIssue::new(ValidationCode::MissingIndex, "Foreign key column is not indexed")
            .with_table("orders")
            .with_column("user_id");

        let json = serde_json::to_string(&issue).unwrap();
        assert!(json.contains("MISSING_INDEX"));
        assert!(json.contains("\"warn\""));
        assert!(json.contains("user_id"));
    }
}
