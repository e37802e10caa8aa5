//! Index suggestions
//!
//! Five independent passes run over a uniform view of each table or
//! collection:
//! - Foreign keys and references without a leading index
//! - Filter columns recognized by name (status/type-like, date-like)
//! - JSON documents (GIN, PostgreSQL only)
//! - Free text (full-text search)
//! - Compound equality + range pairs

use schemawright_core::naming::{is_date_like, is_free_text_like, is_status_like};
use schemawright_core::{Collection, DatabaseKind, Index, IndexType, Schema, Table, TypeClass};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Unindexed foreign keys: joins and cascades scan without them
pub const PRIORITY_FOREIGN_KEY: u8 = 1;

/// Equality filters on low-cardinality columns
pub const PRIORITY_EQUALITY_FILTER: u8 = 2;

/// Range filters, JSON containment and compound lookups
pub const PRIORITY_RANGE_FILTER: u8 = 3;

/// Full-text search
pub const PRIORITY_TEXT_SEARCH: u8 = 4;

/// A suggested index; lower priority is more urgent
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexSuggestion {
    pub table: String,
    pub columns: Vec<String>,
    #[serde(rename = "type")]
    pub index_type: IndexType,
    pub priority: u8,
    pub reason: String,
}

impl IndexSuggestion {
    fn new(table: &str, columns: Vec<String>, index_type: IndexType, priority: u8, reason: String) -> Self {
        Self {
            table: table.to_string(),
            columns,
            index_type,
            priority,
            reason,
        }
    }

    fn single(table: &str, column: &str, index_type: IndexType, priority: u8, reason: String) -> Self {
        Self::new(table, vec![column.to_string()], index_type, priority, reason)
    }
}

struct AttributeView<'a> {
    name: &'a str,
    class: TypeClass,
    reference: bool,
    key: bool,
    covered: bool,
}

/// Table or collection as the passes see it
struct ObjectView<'a> {
    name: &'a str,
    attributes: Vec<AttributeView<'a>>,
    /// Column lists that already have an index, including the primary key
    existing: Vec<Vec<String>>,
}

impl<'a> ObjectView<'a> {
    fn from_table(table: &'a Table) -> Self {
        let primary_key = table.primary_key_names();
        let attributes = table
            .columns
            .iter()
            .map(|c| AttributeView {
                name: &c.name,
                class: TypeClass::of(&c.data_type),
                reference: table.foreign_key_for(&c.name).is_some(),
                key: c.primary_key,
                covered: table.is_leading_indexed(&c.name),
            })
            .collect();

        let mut existing: Vec<Vec<String>> = table.indexes.iter().map(|i| i.columns.clone()).collect();
        if !primary_key.is_empty() {
            existing.push(primary_key);
        }

        Self {
            name: &table.name,
            attributes,
            existing,
        }
    }

    fn from_collection(collection: &'a Collection) -> Self {
        let attributes = collection
            .fields
            .iter()
            .map(|f| AttributeView {
                name: &f.name,
                class: TypeClass::of(&f.field_type),
                reference: f.references.is_some(),
                key: f.primary_key,
                covered: collection.is_leading_indexed(&f.name),
            })
            .collect();

        let mut existing: Vec<Vec<String>> =
            collection.indexes.iter().map(|i| i.columns.clone()).collect();
        if let Some(pk) = collection.primary_key_field() {
            existing.push(vec![pk.name.clone()]);
        }

        Self {
            name: &collection.name,
            attributes,
            existing,
        }
    }

    fn is_equality_column(attribute: &AttributeView<'_>) -> bool {
        attribute.reference || is_status_like(attribute.name)
    }
}

fn foreign_key_pass(view: &ObjectView<'_>) -> Vec<IndexSuggestion> {
    view.attributes
        .iter()
        .filter(|a| a.reference && !a.covered)
        .map(|a| {
            IndexSuggestion::single(
                view.name,
                a.name,
                IndexType::Btree,
                PRIORITY_FOREIGN_KEY,
                format!("Foreign key '{}' is not indexed; joins and cascading deletes scan the table", a.name),
            )
        })
        .collect()
}

fn filter_pass(view: &ObjectView<'_>) -> Vec<IndexSuggestion> {
    let mut suggestions = Vec::new();

    for attribute in view.attributes.iter().filter(|a| !a.reference && !a.key && !a.covered) {
        if is_status_like(attribute.name) {
            suggestions.push(IndexSuggestion::single(
                view.name,
                attribute.name,
                IndexType::Btree,
                PRIORITY_EQUALITY_FILTER,
                format!("'{}' is a common equality filter", attribute.name),
            ));
        } else if is_date_like(attribute.name) {
            suggestions.push(IndexSuggestion::single(
                view.name,
                attribute.name,
                IndexType::Btree,
                PRIORITY_RANGE_FILTER,
                format!("'{}' is a common range filter and sort key", attribute.name),
            ));
        }
    }

    suggestions
}

fn json_pass(view: &ObjectView<'_>, dialect: DatabaseKind) -> Vec<IndexSuggestion> {
    if dialect != DatabaseKind::Postgres {
        return Vec::new();
    }

    view.attributes
        .iter()
        .filter(|a| a.class == TypeClass::Json)
        .map(|a| {
            IndexSuggestion::single(
                view.name,
                a.name,
                IndexType::Gin,
                PRIORITY_RANGE_FILTER,
                format!("GIN index supports containment queries on '{}'", a.name),
            )
        })
        .collect()
}

fn text_pass(view: &ObjectView<'_>, dialect: DatabaseKind) -> Vec<IndexSuggestion> {
    let index_type = match dialect {
        DatabaseKind::Postgres => IndexType::Gin,
        DatabaseKind::Mysql | DatabaseKind::Mongodb => IndexType::Fulltext,
        DatabaseKind::Sqlite => return Vec::new(),
    };

    view.attributes
        .iter()
        .filter(|a| a.class == TypeClass::Text || (a.class.is_textual() && is_free_text_like(a.name)))
        .map(|a| {
            IndexSuggestion::single(
                view.name,
                a.name,
                index_type,
                PRIORITY_TEXT_SEARCH,
                format!("Full-text search on '{}'", a.name),
            )
        })
        .collect()
}

fn compound_pass(view: &ObjectView<'_>) -> Vec<IndexSuggestion> {
    let Some(range) = view
        .attributes
        .iter()
        .find(|a| !a.reference && is_date_like(a.name))
    else {
        return Vec::new();
    };

    view.attributes
        .iter()
        .filter(|a| !a.key && a.class != TypeClass::Array && ObjectView::is_equality_column(a))
        .filter(|a| a.name != range.name)
        .map(|equality| {
            IndexSuggestion::new(
                view.name,
                vec![equality.name.to_string(), range.name.to_string()],
                IndexType::Btree,
                PRIORITY_RANGE_FILTER,
                format!(
                    "Queries filtering on '{}' and ordering by '{}' can use one compound index",
                    equality.name, range.name
                ),
            )
        })
        .collect()
}

fn suggest_for(view: &ObjectView<'_>, dialect: DatabaseKind) -> Vec<IndexSuggestion> {
    let mut suggestions = foreign_key_pass(view);
    suggestions.extend(filter_pass(view));
    suggestions.extend(json_pass(view, dialect));
    suggestions.extend(text_pass(view, dialect));
    suggestions.extend(compound_pass(view));

    suggestions.retain(|s| !view.existing.contains(&s.columns));
    suggestions
}

/// Suggest indexes for every table or collection, most urgent first
pub fn optimize_indexes(schema: &Schema) -> Vec<IndexSuggestion> {
    let dialect = schema.database();
    let views: Vec<ObjectView<'_>> = match schema {
        Schema::Sql(sql) => sql.tables.iter().map(ObjectView::from_table).collect(),
        Schema::Document(doc) => doc.collections.iter().map(ObjectView::from_collection).collect(),
    };

    let mut suggestions: Vec<IndexSuggestion> =
        views.iter().flat_map(|v| suggest_for(v, dialect)).collect();
    suggestions.sort_by_key(|s| s.priority);

    let mut seen = HashSet::new();
    suggestions.retain(|s| seen.insert((s.table.clone(), s.columns.clone())));

    tracing::debug!(count = suggestions.len(), "index suggestions");
    suggestions
}

/// Turn a suggestion into an index definition named by convention
pub fn suggestion_to_index(suggestion: &IndexSuggestion) -> Index {
    let name = schemawright_core::naming::index_name(&suggestion.table, &suggestion.columns);
    Index::new(name, suggestion.columns.clone()).with_type(suggestion.index_type)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use schemawright_core::{Column, DocumentSchema, Field, ForeignKey, SqlSchema};

    fn orders_table() -> Table {
        Table::new("orders")
            .with_column(Column::new("id", "UUID").primary_key())
            .with_column(Column::new("user_id", "UUID").not_null())
            .with_column(Column::new("status", "VARCHAR(50)").not_null())
            .with_column(Column::new("created_at", "TIMESTAMP").not_null())
            .with_column(Column::new("metadata", "JSONB"))
            .with_column(Column::new("notes", "TEXT"))
            .with_foreign_key(ForeignKey::new("user_id", "users", "id"))
    }

    fn sql(dialect: DatabaseKind, tables: Vec<Table>) -> Schema {
        let mut schema = SqlSchema::new(dialect);
        schema.tables = tables;
        Schema::Sql(schema)
    }

    fn columns(suggestions: &[IndexSuggestion]) -> Vec<Vec<&str>> {
        suggestions
            .iter()
            .map(|s| s.columns.iter().map(String::as_str).collect())
            .collect()
    }

    #[test]
    fn all_passes_sorted_by_priority() {
        let suggestions = optimize_indexes(&sql(DatabaseKind::Postgres, vec![orders_table()]));

        assert_eq!(
            columns(&suggestions),
            vec![
                vec!["user_id"],
                vec!["status"],
                vec!["created_at"],
                vec!["metadata"],
                vec!["user_id", "created_at"],
                vec!["status", "created_at"],
                vec!["notes"],
            ]
        );
        assert_eq!(suggestions[0].priority, PRIORITY_FOREIGN_KEY);
        assert_eq!(suggestions[3].index_type, IndexType::Gin);
        assert_eq!(suggestions[6].index_type, IndexType::Gin);
        assert!(suggestions.windows(2).all(|w| w[0].priority <= w[1].priority));
    }

    #[test]
    fn existing_indexes_are_respected() {
        let table = orders_table()
            .with_index(Index::new("idx_orders_user_id", vec!["user_id".to_string()]))
            .with_index(Index::new(
                "idx_orders_status_created_at",
                vec!["status".to_string(), "created_at".to_string()],
            ));
        let suggestions = optimize_indexes(&sql(DatabaseKind::Postgres, vec![table]));
        let cols = columns(&suggestions);

        assert!(!cols.contains(&vec!["user_id"]));
        assert!(!cols.contains(&vec!["status"]));
        assert!(!cols.contains(&vec!["status", "created_at"]));
        assert!(cols.contains(&vec!["user_id", "created_at"]));
    }

    #[test]
    fn dialects_change_text_and_json_passes() {
        let mysql = optimize_indexes(&sql(DatabaseKind::Mysql, vec![orders_table()]));
        let notes = mysql.iter().find(|s| s.columns == vec!["notes"]).unwrap();
        assert_eq!(notes.index_type, IndexType::Fulltext);
        assert!(mysql.iter().all(|s| s.index_type != IndexType::Gin));

        let sqlite = optimize_indexes(&sql(DatabaseKind::Sqlite, vec![orders_table()]));
        assert!(sqlite.iter().all(|s| s.columns != vec!["notes"]));
    }

    #[test]
    fn compound_pairs_use_two_distinct_columns() {
        let table = Table::new("events")
            .with_column(Column::new("id", "UUID").primary_key())
            .with_column(Column::new("date_type", "VARCHAR(50)"))
            .with_column(Column::new("status", "VARCHAR(50)"))
            .with_column(Column::new("name", "VARCHAR(255)"));

        let suggestions = optimize_indexes(&sql(DatabaseKind::Mysql, vec![table]));
        let cols = columns(&suggestions);

        assert!(!cols.contains(&vec!["date_type", "date_type"]));
        assert!(cols.contains(&vec!["status", "date_type"]));
        for suggestion in &suggestions {
            let distinct: HashSet<&String> = suggestion.columns.iter().collect();
            assert_eq!(distinct.len(), suggestion.columns.len());
        }
    }

    #[test]
    fn suggestions_are_unique() {
        let suggestions = optimize_indexes(&sql(
            DatabaseKind::Postgres,
            vec![orders_table(), orders_table()],
        ));
        let mut seen = HashSet::new();
        assert!(suggestions.iter().all(|s| seen.insert((&s.table, &s.columns))));
    }

    #[test]
    fn collections_get_reference_and_text_suggestions() {
        let schema = Schema::Document(DocumentSchema {
            collections: vec![Collection::new("posts")
                .with_field(Field::new("_id", "ObjectId").primary_key())
                .with_field(Field::new("userId", "ObjectId").required().references("users"))
                .with_field(Field::new("body", "String"))],
            relationships: Vec::new(),
        });

        let suggestions = optimize_indexes(&schema);
        assert_eq!(columns(&suggestions), vec![vec!["userId"], vec!["body"]]);
        assert_eq!(suggestions[1].index_type, IndexType::Fulltext);
    }

    #[test]
    fn suggestion_becomes_named_index() {
        let suggestion = IndexSuggestion::single(
            "orders",
            "status",
            IndexType::Btree,
            PRIORITY_EQUALITY_FILTER,
            String::new(),
        );
        let index = suggestion_to_index(&suggestion);
        assert_eq!(index.name, "idx_orders_status");
        assert_eq!(index.columns, vec!["status"]);
    }
}
