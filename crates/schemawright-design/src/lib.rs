//! SchemaWright Design
//!
//! Turns parsed requirements into a concrete schema:
//! - Column type inference from attribute names
//! - Relationship lowering into foreign keys, junction tables and references
//! - Dependency ordering over tables and collections

pub mod builder;
pub mod dag;
pub mod type_rules;

pub use builder::{build_mongo_schema, build_schema, build_sql_schema};
pub use dag::{
    find_cycles, topological_sort, try_topological_sort, CycleError, CyclePolicy,
    DependencyGraph, DependencyNode,
};
pub use type_rules::{infer_column, InferredColumn, NameMatcher, TypeRule, TYPE_RULES};

use schemawright_core::{DesignOptions, Schema};
use schemawright_nlp::RequirementParser;

/// Design a schema straight from requirement text
///
/// Never fails: text with no recognizable entities yields an empty schema.
pub fn design_schema(requirements: &str, options: &DesignOptions) -> Schema {
    let parsed = RequirementParser::parse(requirements);
    let schema = build_schema(&parsed.entities, &parsed.relationships, options);

    tracing::info!(
        database = %options.database,
        entities = parsed.entities.len(),
        relationships = parsed.relationships.len(),
        "designed schema"
    );
    schema
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use schemawright_core::DatabaseKind;

    #[test]
    fn designs_from_text() {
        let schema = design_schema("Users have many Orders.", &DesignOptions::default());
        assert_eq!(schema.object_names(), vec!["users", "orders"]);
        let orders = &schema.tables()[1];
        assert!(orders.foreign_key_for("user_id").is_some());
    }

    #[test]
    fn converse_phrases_keep_a_plain_foreign_key() {
        for text in [
            "Orders belong to Customers. Customers have many Orders.",
            "Customers have many Orders. Orders belong to Customers.",
        ] {
            let schema = design_schema(text, &DesignOptions::default());
            let orders = schema.tables().iter().find(|t| t.name == "orders").unwrap();
            let column = orders.find_column("customer_id").unwrap();
            assert!(!column.unique, "{}", text);
            assert!(orders.foreign_key_for("customer_id").is_some());
        }
    }

    #[test]
    fn many_to_many_phrase_builds_a_junction() {
        let schema = design_schema(
            "Students have a many to many relationship with Courses.",
            &DesignOptions::default(),
        );
        assert_eq!(schema.object_names(), vec!["students", "courses", "students_courses"]);
    }

    #[test]
    fn empty_text_gives_empty_schema() {
        let schema = design_schema("", &DesignOptions::for_database(DatabaseKind::Mongodb));
        assert!(schema.is_empty());
        assert_eq!(schema.database(), DatabaseKind::Mongodb);
    }
}
