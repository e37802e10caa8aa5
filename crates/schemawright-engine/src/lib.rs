//! SchemaWright engine - schema consumers
//!
//! Everything that reads a designed schema:
//! - Migration generation (SQL DDL and MongoDB shell scripts)
//! - Index suggestions
//! - Normalization analysis
//! - Structural validation
//! - Deterministic seed data
//! - Schema metrics

pub mod analyzer;
pub mod index_optimizer;
pub mod migration;
pub mod normalization;
pub mod seed;
pub mod validator;

pub use analyzer::{analyze_schema, Complexity, NormalForm, SchemaAnalysis};
pub use index_optimizer::{optimize_indexes, suggestion_to_index, IndexSuggestion};
pub use migration::{generate_migration, generate_migration_at, quote_identifier, Migration};
pub use normalization::{normalize_schema, NormalizationKind, NormalizationSuggestion};
pub use seed::{generate_seed_data, generate_seed_data_with, seed_to_sql, SeedData, SeedGenerator};
pub use validator::{validate_schema, validate_schema_with};

pub use schemawright_design::design_schema;
