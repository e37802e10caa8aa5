//! Migration script generation
//!
//! Up scripts create objects in dependency order followed by their indexes.
//! Down scripts drop the same objects in reverse order.

use chrono::{DateTime, Utc};
use schemawright_core::naming;
use schemawright_core::{
    Collection, Column, DatabaseKind, DocumentSchema, Field, Index, IndexType, Schema, SqlSchema,
    Table,
};
use schemawright_design::topological_sort;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use sha2::{Digest, Sha256};

/// A generated migration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Migration {
    /// `YYYYMMDDHHMMSS` in UTC
    pub version: String,

    pub description: String,

    /// Forward script
    pub up: String,

    /// Backward script
    pub down: String,

    /// When the migration was generated
    pub timestamp: DateTime<Utc>,

    /// SHA-256 of `up`, hex encoded
    pub checksum: String,
}

impl Migration {
    /// Whether `up` still matches the recorded checksum
    pub fn verify_checksum(&self) -> bool {
        checksum(&self.up) == self.checksum
    }
}

fn checksum(script: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(script.as_bytes());
    hex::encode(hasher.finalize())
}

/// Generate a migration stamped with the current time
pub fn generate_migration(schema: &Schema, description: &str) -> Migration {
    generate_migration_at(schema, description, Utc::now())
}

/// Generate a migration stamped with a fixed time
pub fn generate_migration_at(
    schema: &Schema,
    description: &str,
    timestamp: DateTime<Utc>,
) -> Migration {
    let (up, down) = match schema {
        Schema::Sql(sql) => (generate_sql_up_migration(sql), generate_sql_down_migration(sql)),
        Schema::Document(doc) => (
            generate_mongo_up_migration(doc),
            generate_mongo_down_migration(doc),
        ),
    };

    let migration = Migration {
        version: timestamp.format("%Y%m%d%H%M%S").to_string(),
        description: description.to_string(),
        checksum: checksum(&up),
        up,
        down,
        timestamp,
    };

    tracing::info!(
        version = %migration.version,
        objects = schema.object_names().len(),
        "generated migration"
    );
    migration
}

/// Quote an identifier when it collides with a reserved word
pub fn quote_identifier(name: &str, dialect: DatabaseKind) -> String {
    if !naming::is_reserved_keyword(name) {
        return name.to_string();
    }
    match dialect {
        DatabaseKind::Mysql => format!("`{}`", name),
        _ => format!("\"{}\"", name),
    }
}

fn quote_list(columns: &[String], dialect: DatabaseKind) -> String {
    columns
        .iter()
        .map(|c| quote_identifier(c, dialect))
        .collect::<Vec<_>>()
        .join(", ")
}

fn column_definition(column: &Column, inline_primary_key: bool, dialect: DatabaseKind) -> String {
    let mut parts = vec![quote_identifier(&column.name, dialect), column.data_type.clone()];

    let inline_pk = inline_primary_key && column.primary_key;
    if inline_pk {
        parts.push("PRIMARY KEY".to_string());
    }
    if column.unique && !column.primary_key {
        parts.push("UNIQUE".to_string());
    }
    if !column.nullable && !inline_pk {
        parts.push("NOT NULL".to_string());
    }
    if let Some(default) = &column.default {
        parts.push(format!("DEFAULT {}", default));
    }

    parts.join(" ")
}

fn create_table(table: &Table, dialect: DatabaseKind) -> String {
    let primary_keys = table.primary_key_names();
    let composite = primary_keys.len() > 1;

    let mut lines: Vec<String> = table
        .columns
        .iter()
        .map(|c| column_definition(c, !composite, dialect))
        .collect();

    if composite {
        lines.push(format!("PRIMARY KEY ({})", quote_list(&primary_keys, dialect)));
    }

    for fk in &table.foreign_keys {
        let mut constraint = format!(
            "CONSTRAINT {} FOREIGN KEY ({}) REFERENCES {}({})",
            naming::foreign_key_name(&table.name, &fk.column),
            quote_identifier(&fk.column, dialect),
            quote_identifier(&fk.referenced_table, dialect),
            quote_identifier(&fk.referenced_column, dialect),
        );
        if let Some(action) = fk.on_delete {
            constraint.push_str(" ON DELETE ");
            constraint.push_str(action.as_sql());
        }
        lines.push(constraint);
    }

    format!(
        "CREATE TABLE IF NOT EXISTS {} (\n  {}\n);",
        quote_identifier(&table.name, dialect),
        lines.join(",\n  ")
    )
}

fn create_index(table: &str, index: &Index, dialect: DatabaseKind) -> String {
    let table = quote_identifier(table, dialect);
    let columns = quote_list(&index.columns, dialect);
    let unique = if index.unique { "UNIQUE " } else { "" };

    match dialect {
        DatabaseKind::Mysql => {
            let kind = match index.index_type {
                IndexType::Fulltext => "FULLTEXT ",
                _ => unique,
            };
            format!("CREATE {}INDEX {} ON {} ({});", kind, index.name, table, columns)
        }
        DatabaseKind::Postgres => {
            let method = match index.index_type {
                IndexType::Btree => String::new(),
                IndexType::Fulltext => {
                    let document = index
                        .columns
                        .iter()
                        .map(|c| format!("coalesce({}, '')", quote_identifier(c, dialect)))
                        .collect::<Vec<_>>()
                        .join(" || ' ' || ");
                    return format!(
                        "CREATE {}INDEX IF NOT EXISTS {} ON {} USING gin (to_tsvector('english', {}));",
                        unique, index.name, table, document
                    );
                }
                other => format!(" USING {}", other.as_str()),
            };
            format!(
                "CREATE {}INDEX IF NOT EXISTS {} ON {}{} ({});",
                unique, index.name, table, method, columns
            )
        }
        DatabaseKind::Sqlite | DatabaseKind::Mongodb => format!(
            "CREATE {}INDEX IF NOT EXISTS {} ON {} ({});",
            unique, index.name, table, columns
        ),
    }
}

/// Forward DDL for a relational schema
pub fn generate_sql_up_migration(schema: &SqlSchema) -> String {
    let dialect = schema.dialect;
    let ordered = topological_sort(&schema.tables);

    let mut statements: Vec<String> = ordered.iter().map(|t| create_table(t, dialect)).collect();
    for table in &ordered {
        for index in &table.indexes {
            statements.push(create_index(&table.name, index, dialect));
        }
    }

    statements.join("\n\n")
}

/// Backward DDL for a relational schema
pub fn generate_sql_down_migration(schema: &SqlSchema) -> String {
    let cascade = if schema.dialect == DatabaseKind::Postgres {
        " CASCADE"
    } else {
        ""
    };

    topological_sort(&schema.tables)
        .into_iter()
        .rev()
        .map(|t| {
            format!(
                "DROP TABLE IF EXISTS {}{};",
                quote_identifier(&t.name, schema.dialect),
                cascade
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn bson_type(field_type: &str) -> Option<Value> {
    if let Some(inner) = field_type
        .strip_prefix("Array<")
        .and_then(|rest| rest.strip_suffix('>'))
    {
        let mut array = Map::new();
        array.insert("bsonType".to_string(), json!("array"));
        if let Some(items) = bson_type(inner) {
            array.insert("items".to_string(), json!({ "bsonType": items }));
        }
        return Some(Value::Object(array));
    }

    let name = match field_type {
        "ObjectId" => "objectId",
        "String" => "string",
        "Int32" => "int",
        "Int64" => "long",
        "Double" => "double",
        "Decimal128" => "decimal",
        "Boolean" => "bool",
        "Date" => "date",
        "Object" => "object",
        _ => return None,
    };
    Some(json!(name))
}

fn field_schema(field: &Field) -> Value {
    let mut property = Map::new();
    match bson_type(&field.field_type) {
        Some(Value::Object(array)) => property.extend(array),
        Some(name) => {
            property.insert("bsonType".to_string(), name);
        }
        None => {}
    }
    if let Some(reference) = &field.references {
        property.insert(
            "description".to_string(),
            json!(format!("references {}.{}", reference.collection, reference.field)),
        );
    }
    Value::Object(property)
}

fn json_schema(collection: &Collection) -> Value {
    let properties: Map<String, Value> = collection
        .fields
        .iter()
        .map(|f| (f.name.clone(), field_schema(f)))
        .collect();
    let required: Vec<&str> = collection
        .fields
        .iter()
        .filter(|f| f.required)
        .map(|f| f.name.as_str())
        .collect();

    json!({
        "bsonType": "object",
        "required": required,
        "properties": properties,
    })
}

fn create_collection(collection: &Collection) -> String {
    let options = json!({ "validator": { "$jsonSchema": json_schema(collection) } });
    let rendered = serde_json::to_string_pretty(&options).unwrap_or_else(|_| "{}".to_string());
    format!("db.createCollection(\"{}\", {});", collection.name, rendered)
}

fn create_mongo_index(collection: &str, index: &Index) -> String {
    let direction = match index.index_type {
        IndexType::Fulltext => "\"text\"",
        IndexType::Hash => "\"hashed\"",
        _ => "1",
    };
    let keys = index
        .columns
        .iter()
        .map(|c| format!("\"{}\": {}", c, direction))
        .collect::<Vec<_>>()
        .join(", ");
    let unique = if index.unique { ", unique: true" } else { "" };

    format!(
        "db.getCollection(\"{}\").createIndex({{ {} }}, {{ name: \"{}\"{} }});",
        collection, keys, index.name, unique
    )
}

/// Forward script for a document schema
pub fn generate_mongo_up_migration(schema: &DocumentSchema) -> String {
    let ordered = topological_sort(&schema.collections);

    let mut statements: Vec<String> = ordered.iter().map(|c| create_collection(c)).collect();
    for collection in &ordered {
        for index in &collection.indexes {
            statements.push(create_mongo_index(&collection.name, index));
        }
    }

    statements.join("\n\n")
}

/// Backward script for a document schema
pub fn generate_mongo_down_migration(schema: &DocumentSchema) -> String {
    topological_sort(&schema.collections)
        .into_iter()
        .rev()
        .map(|c| format!("db.getCollection(\"{}\").drop();", c.name))
        .collect::<Vec<_>>()
        .join("\n")
}
