//! Structural validation
//!
//! Every check reports through a stable `ValidationCode`. Configuration may
//! change a code's severity or drop it; `valid` is always recomputed from
//! the resulting errors.

use schemawright_core::naming::{self, defaults};
use schemawright_core::{
    Collection, DocumentSchema, Index, Schema, SqlSchema, Table, TypeClass, ValidationCode,
    ValidationIssue, ValidationOptions, ValidationResult,
};
use schemawright_design::find_cycles;
use std::collections::HashSet;

/// Collects issues for one schema
#[derive(Debug, Default)]
struct SchemaValidator {
    issues: Vec<ValidationIssue>,
}

impl SchemaValidator {
    fn report(&mut self, code: ValidationCode, table: &str, column: Option<&str>, message: String) {
        let mut issue = ValidationIssue::new(code, message).with_table(table);
        if let Some(column) = column {
            issue = issue.with_column(column);
        }
        self.issues.push(issue);
    }

    fn check_duplicate_names<'a>(&mut self, names: impl Iterator<Item = &'a str>, kind: &str) {
        let mut seen = HashSet::new();
        let mut reported = HashSet::new();
        for name in names {
            if !seen.insert(name) && reported.insert(name) {
                self.report(
                    ValidationCode::DuplicateTable,
                    name,
                    None,
                    format!("{} '{}' is defined more than once", kind, name),
                );
            }
        }
    }

    fn check_duplicate_columns<'a>(&mut self, table: &str, names: impl Iterator<Item = &'a str>) {
        let mut seen = HashSet::new();
        let mut reported = HashSet::new();
        for name in names {
            if !seen.insert(name) && reported.insert(name) {
                self.report(
                    ValidationCode::DuplicateColumn,
                    table,
                    Some(name),
                    format!("'{}' appears more than once in {}", name, table),
                );
            }
        }
    }

    fn check_reserved(&mut self, table: &str, column: Option<&str>) {
        let name = column.unwrap_or(table);
        if naming::is_reserved_keyword(name) {
            self.report(
                ValidationCode::ReservedKeyword,
                table,
                column,
                format!("'{}' is a reserved SQL keyword and must be quoted", name),
            );
        }
    }

    fn check_cycles(&mut self, cycles: Vec<Vec<String>>) {
        for cycle in cycles {
            let first = cycle.first().cloned().unwrap_or_default();
            self.report(
                ValidationCode::CircularDependency,
                &first,
                None,
                format!(
                    "References form a cycle ({}); creation order cannot satisfy every constraint",
                    cycle.join(" -> ")
                ),
            );
        }
    }

    fn check_redundant_indexes(&mut self, object: &str, key: &[String], indexes: &[Index]) {
        for (position, index) in indexes.iter().enumerate() {
            let duplicate = indexes[..position].iter().any(|earlier| earlier.columns == index.columns);
            let covers_key = !key.is_empty() && index.columns == key;
            if duplicate || covers_key {
                let reason = if duplicate {
                    "duplicates an earlier index"
                } else {
                    "duplicates the primary key"
                };
                self.report(
                    ValidationCode::RedundantIndex,
                    object,
                    None,
                    format!("Index '{}' {}", index.name, reason),
                );
            }
        }
    }

    fn validate_sql(&mut self, schema: &SqlSchema) {
        if schema.tables.is_empty() {
            self.issues.push(ValidationIssue::new(
                ValidationCode::EmptySchema,
                "Schema defines no tables",
            ));
            return;
        }

        self.check_duplicate_names(schema.tables.iter().map(|t| t.name.as_str()), "Table");
        for table in &schema.tables {
            self.validate_table(table, schema);
        }
        self.check_cycles(find_cycles(&schema.tables));
    }

    fn validate_table(&mut self, table: &Table, schema: &SqlSchema) {
        let name = table.name.as_str();

        if !naming::is_snake_case(name) {
            self.report(
                ValidationCode::NamingConvention,
                name,
                None,
                format!("Table '{}' should be snake_case", name),
            );
        }
        self.check_reserved(name, None);

        if table.primary_key_columns().is_empty() {
            self.report(
                ValidationCode::MissingPrimaryKey,
                name,
                None,
                format!("Table '{}' has no primary key", name),
            );
        }

        self.check_duplicate_columns(name, table.columns.iter().map(|c| c.name.as_str()));

        for column in &table.columns {
            if !naming::is_snake_case(&column.name) {
                self.report(
                    ValidationCode::NamingConvention,
                    name,
                    Some(&column.name),
                    format!("Column '{}.{}' should be snake_case", name, column.name),
                );
            }
            self.check_reserved(name, Some(&column.name));

            if column.nullable && naming::expects_not_null(&column.name) {
                self.report(
                    ValidationCode::MissingNotNull,
                    name,
                    Some(&column.name),
                    format!("Column '{}.{}' is usually required but allows NULL", name, column.name),
                );
            }
        }

        for fk in &table.foreign_keys {
            let Some(local) = table.find_column(&fk.column) else {
                self.report(
                    ValidationCode::InvalidForeignKey,
                    name,
                    Some(&fk.column),
                    format!("Foreign key column '{}.{}' does not exist", name, fk.column),
                );
                continue;
            };

            let Some(referenced) = schema.find_table(&fk.referenced_table) else {
                self.report(
                    ValidationCode::InvalidForeignKey,
                    name,
                    Some(&fk.column),
                    format!(
                        "Foreign key '{}.{}' references missing table '{}'",
                        name, fk.column, fk.referenced_table
                    ),
                );
                continue;
            };

            let Some(target) = referenced.find_column(&fk.referenced_column) else {
                self.report(
                    ValidationCode::InvalidForeignKey,
                    name,
                    Some(&fk.column),
                    format!(
                        "Foreign key '{}.{}' references missing column '{}.{}'",
                        name, fk.column, fk.referenced_table, fk.referenced_column
                    ),
                );
                continue;
            };

            let same_type = local.data_type.eq_ignore_ascii_case(&target.data_type)
                || (TypeClass::of(&local.data_type) == TypeClass::of(&target.data_type)
                    && TypeClass::of(&local.data_type) != TypeClass::Other);
            if !same_type {
                self.report(
                    ValidationCode::ForeignKeyTypeMismatch,
                    name,
                    Some(&fk.column),
                    format!(
                        "Foreign key '{}.{}' is {} but '{}.{}' is {}",
                        name,
                        fk.column,
                        local.data_type,
                        referenced.name,
                        target.name,
                        target.data_type
                    ),
                );
            }

            if !table.is_leading_indexed(&fk.column) {
                self.report(
                    ValidationCode::MissingIndex,
                    name,
                    Some(&fk.column),
                    format!("Foreign key column '{}.{}' has no index", name, fk.column),
                );
            }
        }

        self.check_redundant_indexes(name, &table.primary_key_names(), &table.indexes);
    }

    fn validate_document(&mut self, schema: &DocumentSchema) {
        if schema.collections.is_empty() {
            self.issues.push(ValidationIssue::new(
                ValidationCode::EmptySchema,
                "Schema defines no collections",
            ));
            return;
        }

        self.check_duplicate_names(
            schema.collections.iter().map(|c| c.name.as_str()),
            "Collection",
        );
        for collection in &schema.collections {
            self.validate_collection(collection, schema);
        }
        self.check_cycles(find_cycles(&schema.collections));
    }

    fn validate_collection(&mut self, collection: &Collection, schema: &DocumentSchema) {
        let name = collection.name.as_str();

        if !naming::is_snake_case(name) {
            self.report(
                ValidationCode::NamingConvention,
                name,
                None,
                format!("Collection '{}' should be snake_case", name),
            );
        }

        if collection.find_field(defaults::DOCUMENT_PRIMARY_KEY).is_none() {
            self.report(
                ValidationCode::MissingPrimaryKey,
                name,
                None,
                format!("Collection '{}' has no _id field", name),
            );
        }

        self.check_duplicate_columns(name, collection.fields.iter().map(|f| f.name.as_str()));

        for field in &collection.fields {
            if field.name != defaults::DOCUMENT_PRIMARY_KEY && !naming::is_camel_case(&field.name) {
                self.report(
                    ValidationCode::NamingConvention,
                    name,
                    Some(&field.name),
                    format!("Field '{}.{}' should be camelCase", name, field.name),
                );
            }

            if !field.required && naming::expects_not_null(&field.name) {
                self.report(
                    ValidationCode::MissingNotNull,
                    name,
                    Some(&field.name),
                    format!("Field '{}.{}' is usually required but is optional", name, field.name),
                );
            }

            let Some(reference) = &field.references else {
                continue;
            };
            if schema.find_collection(&reference.collection).is_none() {
                self.report(
                    ValidationCode::InvalidForeignKey,
                    name,
                    Some(&field.name),
                    format!(
                        "Field '{}.{}' references missing collection '{}'",
                        name, field.name, reference.collection
                    ),
                );
            } else if !collection.is_leading_indexed(&field.name) {
                self.report(
                    ValidationCode::MissingIndex,
                    name,
                    Some(&field.name),
                    format!("Reference field '{}.{}' has no index", name, field.name),
                );
            }
        }

        let key = vec![defaults::DOCUMENT_PRIMARY_KEY.to_string()];
        self.check_redundant_indexes(name, &key, &collection.indexes);
    }
}

/// Validate a schema with default severities
pub fn validate_schema(schema: &Schema) -> ValidationResult {
    validate_schema_with(schema, &ValidationOptions::default())
}

/// Validate a schema applying severity overrides and ignored codes
pub fn validate_schema_with(schema: &Schema, options: &ValidationOptions) -> ValidationResult {
    let mut validator = SchemaValidator::default();
    match schema {
        Schema::Sql(sql) => validator.validate_sql(sql),
        Schema::Document(doc) => validator.validate_document(doc),
    }

    let issues = validator
        .issues
        .into_iter()
        .filter(|issue| !options.is_ignored(issue.code))
        .map(|issue| {
            let severity = options.severity.get_severity(issue.code, issue.severity);
            issue.with_severity(severity)
        });
    let result = ValidationResult::from_issues(issues);

    tracing::debug!(
        valid = result.valid,
        errors = result.errors.len(),
        warnings = result.warnings.len(),
        "validated schema"
    );
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use schemawright_core::{Column, DatabaseKind, Field, ForeignKey, Severity};

    fn sql(tables: Vec<Table>) -> Schema {
        let mut schema = SqlSchema::new(DatabaseKind::Postgres);
        schema.tables = tables;
        Schema::Sql(schema)
    }

    fn users() -> Table {
        Table::new("users")
            .with_column(Column::new("id", "UUID").primary_key())
            .with_column(Column::new("email", "VARCHAR(255)").not_null().unique())
    }

    fn orders() -> Table {
        Table::new("orders")
            .with_column(Column::new("id", "UUID").primary_key())
            .with_column(Column::new("user_id", "UUID").not_null())
            .with_foreign_key(ForeignKey::new("user_id", "users", "id"))
            .with_index(Index::new("idx_orders_user_id", vec!["user_id".to_string()]))
    }

    fn codes(result: &ValidationResult) -> Vec<ValidationCode> {
        result.issues().map(|i| i.code).collect()
    }

    #[test]
    fn clean_schema_is_valid() {
        let result = validate_schema(&sql(vec![users(), orders()]));
        assert!(result.valid);
        assert!(codes(&result).is_empty());
    }

    #[test]
    fn missing_primary_key_is_an_error() {
        let table = Table::new("logs").with_column(Column::new("message", "TEXT"));
        let result = validate_schema(&sql(vec![table]));
        assert!(!result.valid);
        assert_eq!(result.errors[0].code, ValidationCode::MissingPrimaryKey);
        assert_eq!(result.errors[0].table.as_deref(), Some("logs"));
    }

    #[test]
    fn foreign_key_problems() {
        let broken = Table::new("orders")
            .with_column(Column::new("id", "UUID").primary_key())
            .with_column(Column::new("user_id", "INTEGER"))
            .with_foreign_key(ForeignKey::new("user_id", "users", "id"))
            .with_foreign_key(ForeignKey::new("shop_id", "shops", "id"))
            .with_foreign_key(ForeignKey::new("id", "ghosts", "id"));

        let result = validate_schema(&sql(vec![users(), broken]));
        assert_eq!(result.count_code(ValidationCode::InvalidForeignKey), 2);
        assert!(result.has_code(ValidationCode::ForeignKeyTypeMismatch));
        assert!(result.has_code(ValidationCode::MissingIndex));
        assert!(!result.valid);
    }

    #[test]
    fn naming_and_keywords() {
        let table = Table::new("UserAccounts")
            .with_column(Column::new("id", "UUID").primary_key())
            .with_column(Column::new("firstName", "VARCHAR(255)"))
            .with_column(Column::new("order", "INTEGER"))
            .with_column(Column::new("email", "VARCHAR(255)"));

        let result = validate_schema(&sql(vec![table]));
        assert!(result.valid);
        assert_eq!(result.count_code(ValidationCode::NamingConvention), 2);
        assert_eq!(result.count_code(ValidationCode::ReservedKeyword), 1);
        assert_eq!(result.count_code(ValidationCode::MissingNotNull), 1);
    }

    #[test]
    fn duplicates_are_errors() {
        let dup = users().with_column(Column::new("email", "VARCHAR(255)"));
        let result = validate_schema(&sql(vec![dup, users()]));
        assert_eq!(result.count_code(ValidationCode::DuplicateTable), 1);
        assert_eq!(result.count_code(ValidationCode::DuplicateColumn), 1);
    }

    #[test]
    fn redundant_indexes() {
        let table = orders()
            .with_index(Index::new("idx_orders_user_id_again", vec!["user_id".to_string()]))
            .with_index(Index::new("idx_orders_id", vec!["id".to_string()]));
        let result = validate_schema(&sql(vec![users(), table]));
        assert_eq!(result.count_code(ValidationCode::RedundantIndex), 2);
    }

    #[test]
    fn cycles_are_warnings() {
        let a = Table::new("a")
            .with_column(Column::new("id", "UUID").primary_key())
            .with_column(Column::new("b_id", "UUID").unique())
            .with_foreign_key(ForeignKey::new("b_id", "b", "id"));
        let b = Table::new("b")
            .with_column(Column::new("id", "UUID").primary_key())
            .with_column(Column::new("a_id", "UUID").unique())
            .with_foreign_key(ForeignKey::new("a_id", "a", "id"));

        let result = validate_schema(&sql(vec![a, b]));
        assert!(result.valid);
        assert_eq!(codes(&result), vec![ValidationCode::CircularDependency]);
    }

    #[test]
    fn empty_schema_warns() {
        let result = validate_schema(&sql(vec![]));
        assert!(result.valid);
        assert_eq!(codes(&result), vec![ValidationCode::EmptySchema]);
    }

    #[test]
    fn overrides_and_ignores() {
        let table = Table::new("logs").with_column(Column::new("message", "TEXT"));
        let mut options = ValidationOptions::default();
        options
            .severity
            .set_override(ValidationCode::MissingPrimaryKey, Severity::Warn);

        let result = validate_schema_with(&sql(vec![table.clone()]), &options);
        assert!(result.valid);
        assert_eq!(result.warnings[0].severity, Severity::Warn);

        options.ignore.push("missing_primary_key".to_string());
        let result = validate_schema_with(&sql(vec![table]), &options);
        assert!(result.issues().next().is_none());
    }

    #[test]
    fn document_checks() {
        let schema = Schema::Document(DocumentSchema {
            collections: vec![
                Collection::new("posts")
                    .with_field(Field::new("_id", "ObjectId").primary_key())
                    .with_field(Field::new("author_id", "ObjectId").references("users"))
                    .with_field(Field::new("title", "String")),
                Collection::new("comments").with_field(Field::new("body", "String")),
            ],
            relationships: Vec::new(),
        });

        let result = validate_schema(&schema);
        assert_eq!(
            codes(&result),
            vec![
                ValidationCode::InvalidForeignKey,
                ValidationCode::MissingPrimaryKey,
                ValidationCode::NamingConvention,
                ValidationCode::MissingNotNull,
            ]
        );
    }
}
