//! Normalization analysis
//!
//! Read-only detectors that infer normal-form violations from column names
//! and key structure.

use schemawright_core::naming::{self, reference_stem};
use schemawright_core::{Collection, RelationshipType, Schema, SqlSchema, Table, TypeClass};
use serde::{Deserialize, Serialize};

/// Kind of normalization problem
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NormalizationKind {
    /// Numbered or list-valued columns (violates 1NF)
    RepeatingGroup,

    /// Column depends on part of a composite key (violates 2NF)
    PartialDependency,

    /// Column depends on another non-key column (violates 3NF)
    TransitiveDependency,

    /// Same data kept in a referencing and a referenced table
    RedundantData,

    /// Many-to-many relationship with no junction table
    MissingJunctionTable,
}

impl NormalizationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RepeatingGroup => "REPEATING_GROUP",
            Self::PartialDependency => "PARTIAL_DEPENDENCY",
            Self::TransitiveDependency => "TRANSITIVE_DEPENDENCY",
            Self::RedundantData => "REDUNDANT_DATA",
            Self::MissingJunctionTable => "MISSING_JUNCTION_TABLE",
        }
    }
}

/// A normalization finding
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizationSuggestion {
    #[serde(rename = "type")]
    pub kind: NormalizationKind,

    /// Table the finding is about; `None` for schema-level findings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table: Option<String>,

    /// Columns involved
    #[serde(default)]
    pub columns: Vec<String>,

    pub description: String,
}

impl NormalizationSuggestion {
    fn for_table(kind: NormalizationKind, table: &str, columns: Vec<String>, description: String) -> Self {
        Self {
            kind,
            table: Some(table.to_string()),
            columns,
            description,
        }
    }
}

/// Suffixes and names of columns that hold delimited lists
const LIST_SUFFIXES: &[&str] = &["_list", "_csv", "_ids"];
const LIST_NAMES: &[&str] = &["tags", "categories", "keywords"];

/// Columns that legitimately repeat across related tables
const GENERIC_COLUMNS: &[&str] = &[
    "id", "_id", "created_at", "updated_at", "deleted_at", "status", "type", "description",
    "notes", "version",
];

/// `phone1` / `address_2` -> stem without the number
fn numbered_stem(name: &str) -> Option<&str> {
    let stem = name.trim_end_matches(|c: char| c.is_ascii_digit());
    if stem.len() == name.len() {
        return None;
    }
    let stem = stem.trim_end_matches('_');
    (!stem.is_empty()).then_some(stem)
}

/// Numbered column groups and list-valued columns
fn repeating_groups<'a>(
    object: &str,
    columns: impl Iterator<Item = (&'a str, TypeClass)> + Clone,
) -> Vec<NormalizationSuggestion> {
    let mut suggestions = Vec::new();
    let mut stems: Vec<&str> = Vec::new();

    for (name, _) in columns.clone() {
        if let Some(stem) = numbered_stem(name) {
            if !stems.contains(&stem) {
                stems.push(stem);
            }
        }
    }

    for stem in stems {
        let group: Vec<String> = columns
            .clone()
            .filter(|(name, _)| numbered_stem(name) == Some(stem))
            .map(|(name, _)| name.to_string())
            .collect();
        if group.len() >= 2 {
            suggestions.push(NormalizationSuggestion::for_table(
                NormalizationKind::RepeatingGroup,
                object,
                group.clone(),
                format!(
                    "Columns {} repeat the same attribute; move '{}' to a child table",
                    group.join(", "),
                    stem
                ),
            ));
        }
    }

    for (name, class) in columns {
        let snake = naming::to_snake_case(name);
        let list_valued = LIST_NAMES.contains(&snake.as_str())
            || LIST_SUFFIXES.iter().any(|s| snake.ends_with(s));
        if list_valued && class.is_textual() {
            suggestions.push(NormalizationSuggestion::for_table(
                NormalizationKind::RepeatingGroup,
                object,
                vec![name.to_string()],
                format!("'{}' stores a delimited list; use a child or junction table", name),
            ));
        }
    }

    suggestions
}

fn non_key_columns(table: &Table) -> impl Iterator<Item = &str> {
    table
        .columns
        .iter()
        .filter(|c| !c.primary_key)
        .map(|c| c.name.as_str())
}

fn partial_dependencies(table: &Table) -> Vec<NormalizationSuggestion> {
    let keys = table.primary_key_names();
    if keys.len() < 2 {
        return Vec::new();
    }

    let mut suggestions = Vec::new();
    for column in non_key_columns(table) {
        for key in &keys {
            let Some(stem) = reference_stem(key) else {
                continue;
            };
            if column.starts_with(&format!("{}_", stem)) {
                suggestions.push(NormalizationSuggestion::for_table(
                    NormalizationKind::PartialDependency,
                    &table.name,
                    vec![column.to_string(), key.clone()],
                    format!(
                        "'{}' depends only on '{}', part of the composite key; move it to the {} table",
                        column, key, stem
                    ),
                ));
                break;
            }
        }
    }

    suggestions
}

fn transitive_dependencies(table: &Table) -> Vec<NormalizationSuggestion> {
    let mut suggestions = Vec::new();
    let columns: Vec<&str> = non_key_columns(table).collect();

    for reference in &columns {
        let Some(stem) = reference_stem(reference) else {
            continue;
        };
        let prefix = format!("{}_", stem);
        for column in &columns {
            if column != reference && column.starts_with(&prefix) && reference_stem(column).is_none() {
                suggestions.push(NormalizationSuggestion::for_table(
                    NormalizationKind::TransitiveDependency,
                    &table.name,
                    vec![reference.to_string(), column.to_string()],
                    format!(
                        "'{}' is determined by '{}' rather than the key; read it from the {} table",
                        column, reference, stem
                    ),
                ));
            }
        }
    }

    let postal = columns
        .iter()
        .find(|c| matches!(**c, "zip" | "zip_code" | "postal_code" | "postcode"));
    if let Some(postal) = postal {
        for column in columns.iter().filter(|c| matches!(**c, "city" | "state")) {
            suggestions.push(NormalizationSuggestion::for_table(
                NormalizationKind::TransitiveDependency,
                &table.name,
                vec![postal.to_string(), column.to_string()],
                format!("'{}' is determined by '{}'; consider a postal code lookup table", column, postal),
            ));
        }
    }

    suggestions
}

fn redundant_columns(table: &Table, schema: &SqlSchema) -> Vec<NormalizationSuggestion> {
    let mut suggestions = Vec::new();

    for fk in &table.foreign_keys {
        let Some(referenced) = schema.find_table(&fk.referenced_table) else {
            continue;
        };
        if referenced.name == table.name {
            continue;
        }
        for column in non_key_columns(table) {
            if GENERIC_COLUMNS.contains(&column) || table.foreign_key_for(column).is_some() {
                continue;
            }
            let duplicated = referenced
                .find_column(column)
                .map(|c| !c.primary_key)
                .unwrap_or(false);
            if duplicated {
                suggestions.push(NormalizationSuggestion::for_table(
                    NormalizationKind::RedundantData,
                    &table.name,
                    vec![column.to_string()],
                    format!(
                        "'{}' is also stored in {}; read it through '{}' instead",
                        column, referenced.name, fk.column
                    ),
                ));
            }
        }
    }

    suggestions
}

fn missing_junctions(schema: &SqlSchema) -> Vec<NormalizationSuggestion> {
    let mut suggestions = Vec::new();

    for relationship in schema
        .relationships
        .iter()
        .filter(|r| r.relationship_type == RelationshipType::ManyToMany)
    {
        let from = naming::table_name(&relationship.from);
        let to = naming::table_name(&relationship.to);

        let linked = schema.tables.iter().any(|t| {
            let to_from = t.foreign_keys.iter().filter(|fk| fk.referenced_table == from).count();
            let to_to = t.foreign_keys.iter().filter(|fk| fk.referenced_table == to).count();
            if from == to {
                to_from >= 2
            } else {
                to_from >= 1 && to_to >= 1
            }
        });

        if !linked {
            suggestions.push(NormalizationSuggestion {
                kind: NormalizationKind::MissingJunctionTable,
                table: None,
                columns: vec![
                    naming::foreign_key_column(&relationship.from),
                    naming::foreign_key_column(&relationship.to),
                ],
                description: format!(
                    "Many-to-many relationship between {} and {} needs a junction table {}_{}",
                    from, to, from, to
                ),
            });
        }
    }

    suggestions
}

fn analyze_collection(collection: &Collection) -> Vec<NormalizationSuggestion> {
    repeating_groups(
        &collection.name,
        collection
            .fields
            .iter()
            .map(|f| (f.name.as_str(), TypeClass::of(&f.field_type))),
    )
}

/// Report normalization problems without modifying the schema
pub fn normalize_schema(schema: &Schema) -> Vec<NormalizationSuggestion> {
    let suggestions: Vec<NormalizationSuggestion> = match schema {
        Schema::Sql(sql) => {
            let mut suggestions = Vec::new();
            for table in &sql.tables {
                suggestions.extend(repeating_groups(
                    &table.name,
                    table
                        .columns
                        .iter()
                        .map(|c| (c.name.as_str(), TypeClass::of(&c.data_type))),
                ));
                suggestions.extend(partial_dependencies(table));
                suggestions.extend(transitive_dependencies(table));
                suggestions.extend(redundant_columns(table, sql));
            }
            suggestions.extend(missing_junctions(sql));
            suggestions
        }
        Schema::Document(doc) => doc.collections.iter().flat_map(analyze_collection).collect(),
    };

    tracing::debug!(count = suggestions.len(), "normalization findings");
    suggestions
}
