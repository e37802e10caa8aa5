//! Logical type system and dialect rendering
//!
//! The builder picks a `LogicalType` for every column and renders it for the
//! target database. Analyzers go the other way: they classify the rendered
//! type string back into a coarse `TypeClass`, so hand-written schemas are
//! analyzed the same way as designed ones.

use crate::config::DatabaseKind;
use serde::{Deserialize, Serialize};

/// Portable logical type
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum LogicalType {
    /// Identifier (UUID in SQL, ObjectId in documents)
    Uuid,

    /// Boolean type
    Bool,

    /// 32-bit integer
    Int,

    /// 64-bit integer
    BigInt,

    /// Floating point
    Float,

    /// Decimal with precision and scale
    Decimal { precision: u16, scale: u16 },

    /// Bounded string
    String { length: u32 },

    /// Unbounded text
    Text,

    /// Date (no time component)
    Date,

    /// Timestamp (with time component)
    Timestamp,

    /// JSON document
    Json,

    /// Array type
    Array { element_type: Box<LogicalType> },
}

impl LogicalType {
    /// Render the type for a SQL dialect
    pub fn sql_type(&self, dialect: DatabaseKind) -> String {
        match dialect {
            DatabaseKind::Postgres => self.postgres_type(),
            DatabaseKind::Mysql => self.mysql_type(),
            DatabaseKind::Sqlite => self.sqlite_type(),
            DatabaseKind::Mongodb => self.mongo_type(),
        }
    }

    fn postgres_type(&self) -> String {
        match self {
            Self::Uuid => "UUID".to_string(),
            Self::Bool => "BOOLEAN".to_string(),
            Self::Int => "INTEGER".to_string(),
            Self::BigInt => "BIGINT".to_string(),
            Self::Float => "DOUBLE PRECISION".to_string(),
            Self::Decimal { precision, scale } => format!("DECIMAL({}, {})", precision, scale),
            Self::String { length } => format!("VARCHAR({})", length),
            Self::Text => "TEXT".to_string(),
            Self::Date => "DATE".to_string(),
            Self::Timestamp => "TIMESTAMP".to_string(),
            Self::Json => "JSONB".to_string(),
            Self::Array { element_type } => format!("{}[]", element_type.postgres_type()),
        }
    }

    fn mysql_type(&self) -> String {
        match self {
            Self::Uuid => "CHAR(36)".to_string(),
            Self::Bool => "BOOLEAN".to_string(),
            Self::Int => "INT".to_string(),
            Self::BigInt => "BIGINT".to_string(),
            Self::Float => "DOUBLE".to_string(),
            Self::Decimal { precision, scale } => format!("DECIMAL({}, {})", precision, scale),
            Self::String { length } => format!("VARCHAR({})", length),
            Self::Text => "TEXT".to_string(),
            Self::Date => "DATE".to_string(),
            Self::Timestamp => "TIMESTAMP".to_string(),
            // MySQL has no array type
            Self::Json | Self::Array { .. } => "JSON".to_string(),
        }
    }

    fn sqlite_type(&self) -> String {
        match self {
            Self::Uuid => "TEXT".to_string(),
            Self::Bool => "BOOLEAN".to_string(),
            Self::Int | Self::BigInt => "INTEGER".to_string(),
            Self::Float => "REAL".to_string(),
            Self::Decimal { .. } => "NUMERIC".to_string(),
            Self::String { length } => format!("VARCHAR({})", length),
            Self::Text | Self::Json | Self::Array { .. } => "TEXT".to_string(),
            Self::Date => "DATE".to_string(),
            Self::Timestamp => "DATETIME".to_string(),
        }
    }

    /// Render the type as a document-store field type
    pub fn mongo_type(&self) -> String {
        match self {
            Self::Uuid => "ObjectId".to_string(),
            Self::Bool => "Boolean".to_string(),
            Self::Int => "Int32".to_string(),
            Self::BigInt => "Int64".to_string(),
            Self::Float => "Double".to_string(),
            Self::Decimal { .. } => "Decimal128".to_string(),
            Self::String { .. } | Self::Text => "String".to_string(),
            Self::Date | Self::Timestamp => "Date".to_string(),
            Self::Json => "Object".to_string(),
            Self::Array { element_type } => format!("Array<{}>", element_type.mongo_type()),
        }
    }

    /// Server-side default used for generated identifiers
    pub fn generated_default(&self, dialect: DatabaseKind) -> Option<&'static str> {
        match (self, dialect) {
            (Self::Uuid, DatabaseKind::Postgres) => Some("gen_random_uuid()"),
            (Self::Uuid, DatabaseKind::Mysql) => Some("(UUID())"),
            _ => None,
        }
    }
}

impl std::fmt::Display for LogicalType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.postgres_type())
    }
}

/// Coarse classification of a rendered column or field type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeClass {
    Identifier,
    Integer,
    Decimal,
    Boolean,
    Temporal,
    Json,
    /// Unbounded text
    Text,
    /// Bounded string
    String,
    Array,
    Other,
}

impl TypeClass {
    /// Classify a rendered SQL or document type string
    pub fn of(data_type: &str) -> Self {
        let upper = data_type.trim().to_ascii_uppercase();
        let base = upper.split('(').next().unwrap_or(&upper).trim();

        if base.ends_with("[]") || base.starts_with("ARRAY") {
            return Self::Array;
        }
        if upper == "CHAR(36)" || upper == "BINARY(16)" {
            return Self::Identifier;
        }

        match base {
            "UUID" | "OBJECTID" => Self::Identifier,
            "INT" | "INTEGER" | "BIGINT" | "SMALLINT" | "MEDIUMINT" | "SERIAL" | "BIGSERIAL"
            | "INT32" | "INT64" | "LONG" => Self::Integer,
            "DECIMAL" | "NUMERIC" | "REAL" | "FLOAT" | "DOUBLE" | "DOUBLE PRECISION"
            | "DECIMAL128" => Self::Decimal,
            "BOOL" | "BOOLEAN" => Self::Boolean,
            "TINYINT" if upper == "TINYINT(1)" => Self::Boolean,
            "TINYINT" => Self::Integer,
            "DATE" | "DATETIME" | "TIMESTAMP" | "TIMESTAMPTZ" | "TIMESTAMP WITH TIME ZONE"
            | "TIME" => Self::Temporal,
            "JSON" | "JSONB" | "OBJECT" => Self::Json,
            "TEXT" | "MEDIUMTEXT" | "LONGTEXT" | "CLOB" => Self::Text,
            "VARCHAR" | "CHAR" | "CHARACTER VARYING" | "STRING" | "NVARCHAR" => Self::String,
            _ => Self::Other,
        }
    }

    /// Declared length of a bounded string type, e.g. 255 for `VARCHAR(255)`
    pub fn string_length(data_type: &str) -> Option<usize> {
        let open = data_type.find('(')?;
        let close = data_type[open..].find(')')? + open;
        data_type[open + 1..close].trim().parse().ok()
    }

    /// Whether values of this class are text-like
    pub fn is_textual(&self) -> bool {
        matches!(self, Self::Text | Self::String)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dialect_rendering() {
        let uuid = LogicalType::Uuid;
        assert_eq!(uuid.sql_type(DatabaseKind::Postgres), "UUID");
        assert_eq!(uuid.sql_type(DatabaseKind::Mysql), "CHAR(36)");
        assert_eq!(uuid.sql_type(DatabaseKind::Sqlite), "TEXT");
        assert_eq!(uuid.mongo_type(), "ObjectId");

        let json = LogicalType::Json;
        assert_eq!(json.sql_type(DatabaseKind::Postgres), "JSONB");
        assert_eq!(json.sql_type(DatabaseKind::Mysql), "JSON");
        assert_eq!(json.mongo_type(), "Object");
    }

    #[test]
    fn decimal_display() {
        let money = LogicalType::Decimal { precision: 10, scale: 2 };
        assert_eq!(money.to_string(), "DECIMAL(10, 2)");
    }

    #[test]
    fn classification_roundtrips_rendered_types() {
        for dialect in [DatabaseKind::Postgres, DatabaseKind::Mysql] {
            assert_eq!(TypeClass::of(&LogicalType::Uuid.sql_type(dialect)), TypeClass::Identifier);
            assert_eq!(TypeClass::of(&LogicalType::Timestamp.sql_type(dialect)), TypeClass::Temporal);
            assert_eq!(TypeClass::of(&LogicalType::Json.sql_type(dialect)), TypeClass::Json);
            assert_eq!(
                TypeClass::of(&LogicalType::String { length: 255 }.sql_type(dialect)),
                TypeClass::String
            );
        }
        assert_eq!(TypeClass::of("Decimal128"), TypeClass::Decimal);
        assert_eq!(TypeClass::of("Array<ObjectId>"), TypeClass::Array);
        assert_eq!(TypeClass::of("tinyint(1)"), TypeClass::Boolean);
        assert_eq!(TypeClass::of("GEOMETRY"), TypeClass::Other);
    }

    #[test]
    fn string_length_parsing() {
        assert_eq!(TypeClass::string_length("VARCHAR(120)"), Some(120));
        assert_eq!(TypeClass::string_length("TEXT"), None);
    }
}
