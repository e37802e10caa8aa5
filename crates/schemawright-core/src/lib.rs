//! SchemaWright Core
//!
//! Shared domain model for the schema-design pipeline.
//! Never rename validation codes - they are part of the public API.

pub mod config;
pub mod diagnostic;
pub mod entity;
pub mod naming;
pub mod report;
pub mod schema;
pub mod types;

pub use config::{
    Config, ConfigError, DatabaseKind, DesignOptions, MigrationOptions, SeedOptions,
    SeverityThreshold, ValidationOptions,
};
pub use diagnostic::{Severity, ValidationCode, ValidationIssue};
pub use entity::{Attribute, Entity};
pub use report::ValidationResult;
pub use schema::{
    Collection, Column, DocumentSchema, Field, FieldReference, ForeignKey, Index, IndexType,
    ReferentialAction, Relationship, RelationshipType, Schema, SqlSchema, Table,
};
pub use types::{LogicalType, TypeClass};
