//! End-to-end tests: requirement text through every schema consumer

use pretty_assertions::assert_eq;
use regex::Regex;
use schemawright_core::{
    Column, DatabaseKind, DesignOptions, Relationship, RelationshipType, Schema, SqlSchema, Table,
    ValidationCode,
};
use schemawright_design::topological_sort;
use schemawright_engine::{
    analyze_schema, design_schema, generate_migration, generate_seed_data, normalize_schema,
    optimize_indexes, validate_schema, NormalizationKind,
};
use serde_json::Value;
use std::collections::{BTreeSet, HashSet};

const BLOG: &str = "Users have many Posts. Each Post belongs to a Category. \
                    Posts have many Comments. Users have many Comments. \
                    Posts are associated with Tags. Each User has one Profile. \
                    Users with email, name and age. Posts with title, body and published_at.";

const DATABASES: [DatabaseKind; 4] = [
    DatabaseKind::Postgres,
    DatabaseKind::Mysql,
    DatabaseKind::Sqlite,
    DatabaseKind::Mongodb,
];

fn design(text: &str, database: DatabaseKind) -> Schema {
    design_schema(text, &DesignOptions::for_database(database))
}

fn captures(pattern: &str, script: &str) -> BTreeSet<String> {
    let re = Regex::new(pattern).unwrap();
    re.captures_iter(script).map(|c| c[1].to_string()).collect()
}

#[test]
fn designed_schemas_always_have_primary_keys() {
    for database in DATABASES {
        let schema = design(BLOG, database);
        assert!(!schema.is_empty());

        let result = validate_schema(&schema);
        assert!(
            !result.has_code(ValidationCode::MissingPrimaryKey),
            "{}: {:?}",
            database,
            result.errors
        );
    }
}

#[test]
fn designed_schemas_sort_dependencies_first() {
    let schema = design(BLOG, DatabaseKind::Postgres);
    let tables = schema.tables();
    let order: Vec<&str> = topological_sort(tables).iter().map(|t| t.name.as_str()).collect();
    assert_eq!(order.len(), tables.len());

    for table in tables {
        let position = order.iter().position(|n| *n == table.name).unwrap();
        for fk in &table.foreign_keys {
            if fk.referenced_table == table.name {
                continue;
            }
            let parent = order.iter().position(|n| *n == fk.referenced_table).unwrap();
            assert!(parent < position, "{} must precede {}", fk.referenced_table, table.name);
        }
    }
}

#[test]
fn down_drops_exactly_what_up_creates() {
    for database in [DatabaseKind::Postgres, DatabaseKind::Mysql, DatabaseKind::Sqlite] {
        let migration = generate_migration(&design(BLOG, database), "blog");
        let created = captures(r"CREATE TABLE IF NOT EXISTS ([^\s;]+)", &migration.up);
        let dropped = captures(r"DROP TABLE IF EXISTS ([^\s;]+)", &migration.down);
        assert!(!created.is_empty());
        assert_eq!(created, dropped);
        assert!(migration.verify_checksum());
    }

    let migration = generate_migration(&design(BLOG, DatabaseKind::Mongodb), "blog");
    let created = captures(r#"createCollection\("(\w+)""#, &migration.up);
    let dropped = captures(r#"getCollection\("(\w+)"\)\.drop"#, &migration.down);
    assert!(!created.is_empty());
    assert_eq!(created, dropped);
}

#[test]
fn seed_rows_respect_foreign_keys() {
    let schema = design(BLOG, DatabaseKind::Postgres);
    let seeds = generate_seed_data(&schema, 6);
    assert_eq!(seeds.len(), schema.tables().len());

    for seed in &seeds {
        assert_eq!(seed.records.len(), 6, "{}", seed.table);

        let table = schema.tables().iter().find(|t| t.name == seed.table).unwrap();
        for fk in &table.foreign_keys {
            let parent = seeds.iter().find(|s| s.table == fk.referenced_table).unwrap();
            let keys: HashSet<&Value> = parent
                .records
                .iter()
                .map(|r| &r[&fk.referenced_column])
                .collect();

            for record in &seed.records {
                let value = &record[&fk.column];
                assert!(keys.contains(value), "{}.{}", seed.table, fk.column);
            }
        }
    }
}

#[test]
fn index_suggestions_are_never_duplicated() {
    for database in DATABASES {
        let suggestions = optimize_indexes(&design(BLOG, database));
        let mut seen = HashSet::new();
        for suggestion in &suggestions {
            assert!(
                seen.insert((suggestion.table.clone(), suggestion.columns.clone())),
                "duplicate suggestion on {} {:?}",
                suggestion.table,
                suggestion.columns
            );
        }

        let priorities: Vec<u8> = suggestions.iter().map(|s| s.priority).collect();
        let mut sorted = priorities.clone();
        sorted.sort();
        assert_eq!(priorities, sorted);
    }
}

#[test]
fn pipeline_is_deterministic() {
    for database in DATABASES {
        let a = design(BLOG, database);
        let b = design(BLOG, database);
        assert_eq!(a, b);
        assert_eq!(optimize_indexes(&a), optimize_indexes(&b));
        assert_eq!(normalize_schema(&a), normalize_schema(&b));
        assert_eq!(generate_seed_data(&a, 4), generate_seed_data(&b, 4));
        assert_eq!(analyze_schema(&a), analyze_schema(&b));
    }
}

#[test]
fn users_have_many_orders() {
    let schema = design("Users have many Orders", DatabaseKind::Postgres);

    let names: Vec<&str> = schema.object_names();
    assert_eq!(names, vec!["users", "orders"]);

    let orders = schema.tables().iter().find(|t| t.name == "orders").unwrap();
    let fk = orders.foreign_key_for("user_id").unwrap();
    assert_eq!(fk.referenced_table, "users");
    assert_eq!(fk.referenced_column, "id");
    assert!(orders.is_leading_indexed("user_id"));

    let result = validate_schema(&schema);
    assert!(result.valid, "{:?}", result.errors);

    let migration = generate_migration(&schema, "users and orders");
    let users = migration.up.find("CREATE TABLE IF NOT EXISTS users").unwrap();
    let orders = migration.up.find("CREATE TABLE IF NOT EXISTS orders").unwrap();
    assert!(users < orders);
}

#[test]
fn many_to_many_without_junction_is_reported() {
    let mut schema = SqlSchema::new(DatabaseKind::Postgres);
    schema.tables = vec![
        Table::new("students").with_column(Column::new("id", "UUID").primary_key()),
        Table::new("courses").with_column(Column::new("id", "UUID").primary_key()),
    ];
    schema.relationships = vec![Relationship::new(
        "Student",
        "Course",
        RelationshipType::ManyToMany,
        "student_associated_with_course",
    )];

    let suggestions = normalize_schema(&Schema::Sql(schema));
    assert!(suggestions
        .iter()
        .any(|s| s.kind == NormalizationKind::MissingJunctionTable));

    let designed = design("Students are associated with Courses.", DatabaseKind::Postgres);
    assert!(designed.tables().iter().any(|t| t.name == "students_courses"));
    assert!(!normalize_schema(&designed)
        .iter()
        .any(|s| s.kind == NormalizationKind::MissingJunctionTable));
}

#[test]
fn mongodb_designs_only_collections() {
    let schema = design(BLOG, DatabaseKind::Mongodb);
    assert!(matches!(schema, Schema::Document(_)));
    assert!(schema.tables().is_empty());
    assert!(!schema.collections().is_empty());
    assert!(schema
        .collections()
        .iter()
        .all(|c| c.find_field("_id").is_some()));
}
