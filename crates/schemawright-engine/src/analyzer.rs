//! Schema metrics: counts, normal form and complexity

use crate::normalization::{normalize_schema, NormalizationKind};
use schemawright_core::Schema;
use serde::{Deserialize, Serialize};

/// Highest normal form the schema is believed to satisfy
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum NormalForm {
    #[serde(rename = "DENORMALIZED")]
    Denormalized,
    #[serde(rename = "1NF")]
    First,
    #[serde(rename = "2NF")]
    Second,
    #[serde(rename = "3NF")]
    Third,
    #[serde(rename = "BCNF")]
    Bcnf,
    /// Document schemas are not classified
    #[serde(rename = "NOT_APPLICABLE")]
    NotApplicable,
}

impl NormalForm {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Denormalized => "DENORMALIZED",
            Self::First => "1NF",
            Self::Second => "2NF",
            Self::Third => "3NF",
            Self::Bcnf => "BCNF",
            Self::NotApplicable => "NOT_APPLICABLE",
        }
    }

    /// Normal form a schema cannot exceed given one finding
    fn capped_by(kind: NormalizationKind) -> Self {
        match kind {
            NormalizationKind::RepeatingGroup => Self::Denormalized,
            NormalizationKind::PartialDependency => Self::First,
            NormalizationKind::TransitiveDependency => Self::Second,
            NormalizationKind::RedundantData | NormalizationKind::MissingJunctionTable => Self::Third,
        }
    }
}

impl std::fmt::Display for NormalForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Complexity {
    Low,
    Medium,
    High,
}

impl Complexity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
        }
    }

    pub fn classify(tables: usize, relationships: usize) -> Self {
        if tables <= 5 && relationships <= 5 {
            Self::Low
        } else if tables <= 15 && relationships <= 20 {
            Self::Medium
        } else {
            Self::High
        }
    }
}

impl std::fmt::Display for Complexity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Summary metrics for a schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaAnalysis {
    pub table_count: usize,
    pub column_count: usize,
    pub index_count: usize,

    /// Larger of declared relationships and foreign keys
    pub relationship_count: usize,
    pub foreign_key_count: usize,
    pub average_columns_per_table: f64,
    pub normal_form: NormalForm,
    pub complexity: Complexity,
}

impl SchemaAnalysis {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

fn normal_form_of(schema: &Schema) -> NormalForm {
    if matches!(schema, Schema::Document(_)) {
        return NormalForm::NotApplicable;
    }

    normalize_schema(schema)
        .iter()
        .map(|s| NormalForm::capped_by(s.kind))
        .min()
        .unwrap_or(NormalForm::Bcnf)
}

/// Compute counts, normal form and complexity
pub fn analyze_schema(schema: &Schema) -> SchemaAnalysis {
    let (table_count, column_count, index_count, foreign_key_count) = match schema {
        Schema::Sql(sql) => (
            sql.tables.len(),
            sql.tables.iter().map(|t| t.columns.len()).sum(),
            sql.tables.iter().map(|t| t.indexes.len()).sum(),
            sql.tables.iter().map(|t| t.foreign_keys.len()).sum(),
        ),
        Schema::Document(doc) => (
            doc.collections.len(),
            doc.collections.iter().map(|c| c.fields.len()).sum(),
            doc.collections.iter().map(|c| c.indexes.len()).sum(),
            doc.collections.iter().map(|c| c.reference_fields().count()).sum(),
        ),
    };

    let relationship_count = schema.relationships().len().max(foreign_key_count);
    let average_columns_per_table = if table_count == 0 {
        0.0
    } else {
        column_count as f64 / table_count as f64
    };

    let analysis = SchemaAnalysis {
        table_count,
        column_count,
        index_count,
        relationship_count,
        foreign_key_count,
        average_columns_per_table,
        normal_form: normal_form_of(schema),
        complexity: Complexity::classify(table_count, relationship_count),
    };

    tracing::debug!(
        tables = analysis.table_count,
        normal_form = %analysis.normal_form,
        complexity = %analysis.complexity,
        "analyzed schema"
    );
    analysis
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use schemawright_core::{
        Collection, Column, DatabaseKind, DocumentSchema, Field, ForeignKey, Index, Relationship,
        RelationshipType, SqlSchema, Table,
    };

    fn sql(tables: Vec<Table>, relationships: Vec<Relationship>) -> Schema {
        let mut schema = SqlSchema::new(DatabaseKind::Postgres);
        schema.tables = tables;
        schema.relationships = relationships;
        Schema::Sql(schema)
    }

    fn users_orders() -> Vec<Table> {
        vec![
            Table::new("users")
                .with_column(Column::new("id", "UUID").primary_key())
                .with_column(Column::new("email", "VARCHAR(255)").not_null().unique()),
            Table::new("orders")
                .with_column(Column::new("id", "UUID").primary_key())
                .with_column(Column::new("user_id", "UUID").not_null())
                .with_column(Column::new("total", "DECIMAL(10, 2)"))
                .with_foreign_key(ForeignKey::new("user_id", "users", "id"))
                .with_index(Index::new("idx_orders_user_id", vec!["user_id".to_string()])),
        ]
    }

    #[test]
    fn counts_and_bcnf() {
        let analysis = analyze_schema(&sql(users_orders(), vec![]));

        assert_eq!(analysis.table_count, 2);
        assert_eq!(analysis.column_count, 5);
        assert_eq!(analysis.index_count, 1);
        assert_eq!(analysis.foreign_key_count, 1);
        assert_eq!(analysis.relationship_count, 1);
        assert_eq!(analysis.average_columns_per_table, 2.5);
        assert_eq!(analysis.normal_form, NormalForm::Bcnf);
        assert_eq!(analysis.complexity, Complexity::Low);
    }

    #[test]
    fn worst_finding_sets_normal_form() {
        let mut tables = users_orders();
        tables.push(
            Table::new("contacts")
                .with_column(Column::new("id", "UUID").primary_key())
                .with_column(Column::new("phone1", "VARCHAR(32)"))
                .with_column(Column::new("phone2", "VARCHAR(32)")),
        );
        let relationships = vec![Relationship::new(
            "User",
            "Order",
            RelationshipType::ManyToMany,
            "user_has_many_order",
        )];

        let analysis = analyze_schema(&sql(tables, relationships));
        assert_eq!(analysis.normal_form, NormalForm::Denormalized);

        let missing_junction = vec![Relationship::new(
            "User",
            "Order",
            RelationshipType::ManyToMany,
            "user_has_many_order",
        )];
        let analysis = analyze_schema(&sql(users_orders(), missing_junction));
        assert_eq!(analysis.normal_form, NormalForm::Third);
    }

    #[test]
    fn complexity_thresholds() {
        assert_eq!(Complexity::classify(5, 5), Complexity::Low);
        assert_eq!(Complexity::classify(6, 0), Complexity::Medium);
        assert_eq!(Complexity::classify(3, 6), Complexity::Medium);
        assert_eq!(Complexity::classify(15, 20), Complexity::Medium);
        assert_eq!(Complexity::classify(16, 0), Complexity::High);
        assert_eq!(Complexity::classify(2, 21), Complexity::High);
    }

    #[test]
    fn documents_are_not_classified() {
        let schema = Schema::Document(DocumentSchema {
            collections: vec![
                Collection::new("users").with_field(Field::new("_id", "ObjectId").primary_key()),
                Collection::new("posts")
                    .with_field(Field::new("_id", "ObjectId").primary_key())
                    .with_field(Field::new("userId", "ObjectId").references("users")),
            ],
            relationships: Vec::new(),
        });

        let analysis = analyze_schema(&schema);
        assert_eq!(analysis.table_count, 2);
        assert_eq!(analysis.column_count, 3);
        assert_eq!(analysis.foreign_key_count, 1);
        assert_eq!(analysis.normal_form, NormalForm::NotApplicable);
    }

    #[test]
    fn empty_schema() {
        let analysis = analyze_schema(&sql(vec![], vec![]));
        assert_eq!(analysis.average_columns_per_table, 0.0);
        assert_eq!(analysis.normal_form, NormalForm::Bcnf);

        let json = analysis.to_json().unwrap();
        assert!(json.contains("\"normalForm\": \"BCNF\""));
        assert!(json.contains("\"complexity\": \"LOW\""));
    }
}
