//! Configuration schema (schemawright.toml)
//!
//! Each pipeline operation has one closed options struct. Every field has a
//! default so a partial TOML file is always valid.

use crate::diagnostic::{Severity, ValidationCode};
use crate::naming::defaults;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Target database
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseKind {
    /// PostgreSQL
    Postgres,

    /// MySQL / MariaDB
    Mysql,

    /// MongoDB (document store)
    Mongodb,

    /// SQLite
    Sqlite,
}

impl DatabaseKind {
    /// Whether this database stores documents rather than tables
    pub fn is_document(&self) -> bool {
        matches!(self, Self::Mongodb)
    }

    /// Stable lowercase name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Postgres => "postgres",
            Self::Mysql => "mysql",
            Self::Mongodb => "mongodb",
            Self::Sqlite => "sqlite",
        }
    }
}

impl Default for DatabaseKind {
    fn default() -> Self {
        Self::Postgres
    }
}

impl std::fmt::Display for DatabaseKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for DatabaseKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" | "pg" => Ok(Self::Postgres),
            "mysql" | "mariadb" => Ok(Self::Mysql),
            "mongodb" | "mongo" => Ok(Self::Mongodb),
            "sqlite" | "sqlite3" => Ok(Self::Sqlite),
            other => Err(ConfigError::UnknownDatabase(other.to_string())),
        }
    }
}

/// Options for turning requirements into a schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DesignOptions {
    /// Target database; selects the SQL or document builder
    pub database: DatabaseKind,

    /// Append created_at / updated_at / deleted_at to every table
    pub include_timestamps: bool,

    /// Length used for VARCHAR columns without a more specific rule
    pub default_string_length: u32,
}

impl Default for DesignOptions {
    fn default() -> Self {
        Self {
            database: DatabaseKind::default(),
            include_timestamps: false,
            default_string_length: defaults::STRING_LENGTH,
        }
    }
}

impl DesignOptions {
    /// Options for a given database with everything else defaulted
    pub fn for_database(database: DatabaseKind) -> Self {
        Self {
            database,
            ..Self::default()
        }
    }

    /// Toggle timestamp columns
    pub fn with_timestamps(mut self, include_timestamps: bool) -> Self {
        self.include_timestamps = include_timestamps;
        self
    }
}

/// Options for migration generation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MigrationOptions {
    /// Description stored on the generated migration
    pub description: String,
}

impl Default for MigrationOptions {
    fn default() -> Self {
        Self {
            description: "Initial schema".to_string(),
        }
    }
}

/// Options for synthetic seed data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SeedOptions {
    /// Number of records generated for every table or collection
    pub records_per_table: usize,

    /// RNG seed; identical seeds give identical data
    pub seed: u64,

    /// Whether consumers should clear each table before inserting
    pub truncate_first: bool,
}

impl Default for SeedOptions {
    fn default() -> Self {
        Self {
            records_per_table: 10,
            seed: 42,
            truncate_first: true,
        }
    }
}

/// Severity overrides for specific validation codes
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SeverityThreshold {
    /// Map of validation code to severity override
    pub overrides: HashMap<String, Severity>,
}

impl SeverityThreshold {
    /// Get severity for a validation code, or default
    pub fn get_severity(&self, code: ValidationCode, default: Severity) -> Severity {
        self.overrides
            .get(code.as_str())
            .copied()
            .unwrap_or(default)
    }

    /// Set severity override for a code
    pub fn set_override(&mut self, code: ValidationCode, severity: Severity) {
        self.overrides.insert(code.as_str().to_string(), severity);
    }
}

/// Options for schema validation
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ValidationOptions {
    /// Severity overrides
    pub severity: SeverityThreshold,

    /// Codes that are dropped entirely
    pub ignore: Vec<String>,
}

impl ValidationOptions {
    /// Check if a code is ignored
    pub fn is_ignored(&self, code: ValidationCode) -> bool {
        self.ignore.iter().any(|c| c.eq_ignore_ascii_case(code.as_str()))
    }
}

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Config {
    /// Schema design options
    #[serde(default)]
    pub design: DesignOptions,

    /// Migration options
    #[serde(default)]
    pub migration: MigrationOptions,

    /// Seed data options
    #[serde(default)]
    pub seed: SeedOptions,

    /// Validation options
    #[serde(default)]
    pub validation: ValidationOptions,
}

impl Config {
    /// Load config from TOML file
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::IoError(e.to_string()))?;

        Self::from_toml(&contents)
    }

    /// Load config from TOML string
    pub fn from_toml(toml: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml)
            .map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Save config to TOML file
    pub fn save_to_file(&self, path: &std::path::Path) -> Result<(), ConfigError> {
        let toml = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::SerializeError(e.to_string()))?;

        std::fs::write(path, toml)
            .map_err(|e| ConfigError::IoError(e.to_string()))?;

        Ok(())
    }
}

/// Config error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Serialize error: {0}")]
    SerializeError(String),

    #[error("Unknown database '{0}' (expected postgres, mysql, mongodb or sqlite)")]
    UnknownDatabase(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = Config::default();
        assert_eq!(config.design.database, DatabaseKind::Postgres);
        assert!(!config.design.include_timestamps);
        assert_eq!(config.design.default_string_length, 255);
        assert_eq!(config.seed.records_per_table, 10);
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = Config::from_toml(
            r#"
            [design]
            database = "mongodb"
            includeTimestamps = true

            [seed]
            recordsPerTable = 3
            "#,
        )
        .unwrap();

        assert_eq!(config.design.database, DatabaseKind::Mongodb);
        assert!(config.design.include_timestamps);
        assert_eq!(config.design.default_string_length, 255);
        assert_eq!(config.seed.records_per_table, 3);
        assert_eq!(config.seed.seed, 42);
    }

    #[test]
    fn severity_override() {
        let mut threshold = SeverityThreshold::default();
        threshold.set_override(ValidationCode::NamingConvention, Severity::Error);

        assert_eq!(
            threshold.get_severity(ValidationCode::NamingConvention, Severity::Warn),
            Severity::Error
        );
        assert_eq!(
            threshold.get_severity(ValidationCode::MissingIndex, Severity::Warn),
            Severity::Warn
        );
    }

    #[test]
    fn database_from_str() {
        assert_eq!("PostgreSQL".parse::<DatabaseKind>().unwrap(), DatabaseKind::Postgres);
        assert_eq!("mongo".parse::<DatabaseKind>().unwrap(), DatabaseKind::Mongodb);
        assert!("oracle".parse::<DatabaseKind>().is_err());
    }

    #[test]
    fn config_toml_roundtrip() {
        let mut config = Config::default();
        config.validation.ignore.push("NAMING_CONVENTION".to_string());

        let toml = toml::to_string(&config).unwrap();
        let parsed: Config = toml::from_str(&toml).unwrap();
        assert_eq!(config, parsed);
        assert!(parsed.validation.is_ignored(ValidationCode::NamingConvention));
    }
}
