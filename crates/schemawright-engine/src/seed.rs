//! Seed data generation
//!
//! Tables are filled in dependency order so every foreign key can be sampled
//! from values that already exist. Output is a pure function of the schema
//! and `SeedOptions`: the RNG is a `ChaCha8Rng` seeded from `options.seed`.

use crate::migration::quote_identifier;
use chrono::{TimeZone, Utc};
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use schemawright_core::naming::{self, defaults};
use schemawright_core::{Collection, DatabaseKind, Schema, SeedOptions, Table, TypeClass};
use schemawright_design::topological_sort;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::collections::{HashMap, HashSet};

/// One generated row
pub type Record = Map<String, Value>;

/// Generated rows for one table or collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedData {
    pub table: String,
    pub records: Vec<Record>,
    /// Clear existing rows before inserting
    pub truncate_first: bool,
}

impl SeedData {
    /// `DELETE` statement clearing the table, when requested
    pub fn delete_statement(&self, dialect: DatabaseKind) -> Option<String> {
        self.truncate_first
            .then(|| format!("DELETE FROM {};", quote_identifier(&self.table, dialect)))
    }

    /// One `INSERT` per record
    pub fn insert_statements(&self, dialect: DatabaseKind) -> Vec<String> {
        let table = quote_identifier(&self.table, dialect);
        self.records
            .iter()
            .map(|record| {
                let columns = record
                    .keys()
                    .map(|k| quote_identifier(k, dialect))
                    .collect::<Vec<_>>()
                    .join(", ");
                let values = record
                    .values()
                    .map(|v| sql_literal(v, dialect))
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("INSERT INTO {} ({}) VALUES ({});", table, columns, values)
            })
            .collect()
    }

    /// Render as SQL statements
    pub fn to_sql(&self, dialect: DatabaseKind) -> String {
        self.delete_statement(dialect)
            .into_iter()
            .chain(self.insert_statements(dialect))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Render seed data for several tables: deletes in reverse order, then inserts
pub fn seed_to_sql(seeds: &[SeedData], dialect: DatabaseKind) -> String {
    let deletes = seeds.iter().rev().filter_map(|s| s.delete_statement(dialect));
    let inserts = seeds.iter().flat_map(|s| s.insert_statements(dialect));
    deletes.chain(inserts).collect::<Vec<_>>().join("\n")
}

fn sql_literal(value: &Value, dialect: DatabaseKind) -> String {
    match value {
        Value::Null => "NULL".to_string(),
        Value::Bool(b) if dialect == DatabaseKind::Sqlite => if *b { "1" } else { "0" }.to_string(),
        Value::Bool(b) => if *b { "TRUE" } else { "FALSE" }.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => quote_string(s),
        Value::Array(_) | Value::Object(_) => quote_string(&value.to_string()),
    }
}

fn quote_string(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

const FIRST_NAMES: &[&str] = &[
    "Ada", "Alan", "Grace", "Linus", "Margaret", "Dennis", "Barbara", "Ken", "Frances", "Edsger",
];
const LAST_NAMES: &[&str] = &[
    "Lovelace", "Turing", "Hopper", "Torvalds", "Hamilton", "Ritchie", "Liskov", "Thompson",
    "Allen", "Dijkstra",
];
const WORDS: &[&str] = &[
    "lorem", "ipsum", "dolor", "sit", "amet", "consectetur", "adipiscing", "elit", "sed", "do",
    "eiusmod", "tempor", "incididunt", "labore", "magna", "aliqua",
];
const STATUS_VALUES: &[&str] = &["active", "inactive", "pending", "archived"];

/// Inclusive integer ranges by column name
const INTEGER_RANGES: &[(&str, i64, i64)] = &[
    ("age", 18, 90),
    ("quantity", 1, 100),
    ("qty", 1, 100),
    ("stock", 0, 500),
    ("rating", 1, 5),
    ("year", 2000, 2025),
    ("position", 1, 100),
    ("rank", 1, 100),
    ("score", 0, 100),
    ("views", 0, 100_000),
    ("likes", 0, 10_000),
    ("duration", 1, 600),
    ("capacity", 1, 500),
    ("pages", 1, 1_000),
    ("count", 0, 1_000),
];
const DEFAULT_INTEGER_RANGE: (i64, i64) = (1, 1_000);

/// Decimal ranges by column name
const DECIMAL_RANGES: &[(&str, f64, f64)] = &[
    ("price", 1.0, 1_000.0),
    ("cost", 1.0, 1_000.0),
    ("amount", 1.0, 5_000.0),
    ("total", 1.0, 5_000.0),
    ("subtotal", 1.0, 5_000.0),
    ("balance", 0.0, 10_000.0),
    ("salary", 30_000.0, 200_000.0),
    ("fee", 0.0, 100.0),
    ("tax", 0.0, 500.0),
    ("discount", 0.0, 100.0),
    ("weight", 0.1, 100.0),
];
const DEFAULT_DECIMAL_RANGE: (f64, f64) = (0.0, 1_000.0);

/// Timestamp window: 2023-01-01T00:00:00Z plus two years
const TIMESTAMP_WINDOW_START: i64 = 1_672_531_200;
const TIMESTAMP_WINDOW_SECONDS: i64 = 2 * 365 * 24 * 60 * 60;

/// Random attempts before a composite key falls back to an exhaustive search
const COMPOSITE_KEY_ATTEMPTS: usize = 16;

/// Most references sampled into one array field
const MAX_ARRAY_REFERENCES: usize = 3;

fn matches_name(snake: &str, key: &str) -> bool {
    snake == key || snake.ends_with(&format!("_{}", key))
}

/// String formats recognized by name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Email,
    Url,
    Uuid,
    Phone,
    Ip,
}

fn format_for(snake: &str) -> Option<Format> {
    if snake.contains("email") {
        Some(Format::Email)
    } else if snake.ends_with("url")
        || snake.ends_with("_link")
        || matches!(snake, "website" | "link" | "avatar" | "image" | "photo" | "thumbnail")
    {
        Some(Format::Url)
    } else if matches!(snake, "uuid" | "guid") || snake.ends_with("_uuid") {
        Some(Format::Uuid)
    } else if snake.contains("phone") || snake == "mobile" {
        Some(Format::Phone)
    } else if matches!(snake, "ip" | "ip_address") || snake.ends_with("_ip") {
        Some(Format::Ip)
    } else {
        None
    }
}

/// A column or field as the generator sees it
#[derive(Debug, Clone)]
struct SeedColumn {
    name: String,
    snake: String,
    data_type: String,
    class: TypeClass,
    nullable: bool,
    unique: bool,
    primary_key: bool,
    /// Referenced table and column
    reference: Option<(String, String)>,
}

#[derive(Debug, Clone)]
struct SeedTarget {
    name: String,
    columns: Vec<SeedColumn>,
    document: bool,
}

impl SeedTarget {
    fn from_table(table: &Table) -> Self {
        let columns = table
            .columns
            .iter()
            .map(|c| SeedColumn {
                name: c.name.clone(),
                snake: naming::to_snake_case(&c.name),
                data_type: c.data_type.clone(),
                class: TypeClass::of(&c.data_type),
                nullable: c.nullable,
                unique: c.unique,
                primary_key: c.primary_key,
                reference: table
                    .foreign_key_for(&c.name)
                    .map(|fk| (fk.referenced_table.clone(), fk.referenced_column.clone())),
            })
            .collect();

        Self {
            name: table.name.clone(),
            columns,
            document: false,
        }
    }

    fn from_collection(collection: &Collection) -> Self {
        let columns = collection
            .fields
            .iter()
            .map(|f| SeedColumn {
                name: f.name.clone(),
                snake: naming::to_snake_case(&f.name),
                data_type: f.field_type.clone(),
                class: TypeClass::of(&f.field_type),
                nullable: !f.required,
                unique: f.unique,
                primary_key: f.primary_key || f.name == defaults::DOCUMENT_PRIMARY_KEY,
                reference: f
                    .references
                    .as_ref()
                    .map(|r| (r.collection.clone(), r.field.clone())),
            })
            .collect();

        Self {
            name: collection.name.clone(),
            columns,
            document: true,
        }
    }

    fn key_columns(&self) -> Vec<&SeedColumn> {
        self.columns.iter().filter(|c| c.primary_key).collect()
    }
}

fn key_of(record: &Record, columns: &[&SeedColumn]) -> String {
    columns
        .iter()
        .map(|c| record.get(&c.name).map(Value::to_string).unwrap_or_default())
        .collect::<Vec<_>>()
        .join("\u{1f}")
}

fn column_values(rows: &[Record], column: &str) -> Vec<Value> {
    rows.iter()
        .filter_map(|r| r.get(column))
        .filter(|v| !v.is_null())
        .cloned()
        .collect()
}

/// Deterministic synthetic data generator
pub struct SeedGenerator {
    options: SeedOptions,
    rng: ChaCha8Rng,
}

impl SeedGenerator {
    pub fn new(options: SeedOptions) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(options.seed),
            options,
        }
    }

    /// Generate rows for every table or collection, in dependency order
    pub fn generate(&mut self, schema: &Schema) -> Vec<SeedData> {
        let targets: Vec<SeedTarget> = match schema {
            Schema::Sql(sql) => topological_sort(&sql.tables)
                .into_iter()
                .map(SeedTarget::from_table)
                .collect(),
            Schema::Document(doc) => topological_sort(&doc.collections)
                .into_iter()
                .map(SeedTarget::from_collection)
                .collect(),
        };

        let mut generated: HashMap<String, Vec<Record>> = HashMap::new();
        let mut seeds = Vec::with_capacity(targets.len());

        for target in &targets {
            let records = self.generate_target(target, &generated);
            generated.insert(target.name.clone(), records.clone());
            seeds.push(SeedData {
                table: target.name.clone(),
                records,
                truncate_first: self.options.truncate_first,
            });
        }

        tracing::info!(
            tables = seeds.len(),
            records_per_table = self.options.records_per_table,
            seed = self.options.seed,
            "generated seed data"
        );
        seeds
    }

    fn generate_target(&mut self, target: &SeedTarget, generated: &HashMap<String, Vec<Record>>) -> Vec<Record> {
        let count = self.options.records_per_table;
        let key_columns = target.key_columns();
        let composite = key_columns.len() > 1;

        let mut rows: Vec<Record> = Vec::with_capacity(count);
        let mut used_keys: HashSet<String> = HashSet::new();
        let mut used_unique: HashMap<String, HashSet<String>> = HashMap::new();

        for row in 0..count {
            let mut record = Record::new();

            for column in target.columns.iter().filter(|c| c.reference.is_none()) {
                let value = self.scalar_value(target, column, row);
                record.insert(column.name.clone(), value);
            }

            for column in target.columns.iter().filter(|c| c.reference.is_some()) {
                let value =
                    self.reference_value(target, column, &rows, &record, generated, &mut used_unique);
                record.insert(column.name.clone(), value);
            }

            if composite {
                self.ensure_unique_key(target, &key_columns, &mut record, &used_keys, generated);
                used_keys.insert(key_of(&record, &key_columns));
            }

            rows.push(record);
        }

        tracing::debug!(table = %target.name, rows = rows.len(), "seeded");
        rows
    }

    /// Candidate values for a reference column
    fn reference_pool(
        target: &SeedTarget,
        column: &SeedColumn,
        rows: &[Record],
        generated: &HashMap<String, Vec<Record>>,
    ) -> Vec<Value> {
        let Some((table, referenced)) = &column.reference else {
            return Vec::new();
        };
        if *table == target.name {
            return column_values(rows, referenced);
        }
        generated
            .get(table)
            .map(|parent| column_values(parent, referenced))
            .unwrap_or_default()
    }

    fn reference_value(
        &mut self,
        target: &SeedTarget,
        column: &SeedColumn,
        rows: &[Record],
        record: &Record,
        generated: &HashMap<String, Vec<Record>>,
        used_unique: &mut HashMap<String, HashSet<String>>,
    ) -> Value {
        let pool = Self::reference_pool(target, column, rows, generated);
        let self_reference = column
            .reference
            .as_ref()
            .map(|(table, _)| *table == target.name)
            .unwrap_or(false);

        if pool.is_empty() {
            if self_reference && !column.nullable {
                // First row of a required self reference points at itself
                let referenced = column.reference.as_ref().map(|(_, c)| c.as_str()).unwrap_or("");
                return record.get(referenced).cloned().unwrap_or(Value::Null);
            }
            return Value::Null;
        }

        if column.class == TypeClass::Array {
            let take = MAX_ARRAY_REFERENCES.min(pool.len());
            let picked: Vec<Value> = pool.choose_multiple(&mut self.rng, take).cloned().collect();
            return Value::Array(picked);
        }

        if column.unique {
            let used = used_unique.entry(column.name.clone()).or_default();
            let unused: Vec<&Value> = pool.iter().filter(|v| !used.contains(&v.to_string())).collect();
            return match unused.choose(&mut self.rng) {
                Some(value) => {
                    used.insert(value.to_string());
                    (*value).clone()
                }
                None if column.nullable => Value::Null,
                None => pool.choose(&mut self.rng).cloned().unwrap_or(Value::Null),
            };
        }

        pool.choose(&mut self.rng).cloned().unwrap_or(Value::Null)
    }

    /// Resample reference key parts until the composite key is unused
    fn ensure_unique_key(
        &mut self,
        target: &SeedTarget,
        key_columns: &[&SeedColumn],
        record: &mut Record,
        used_keys: &HashSet<String>,
        generated: &HashMap<String, Vec<Record>>,
    ) {
        if !used_keys.contains(&key_of(record, key_columns)) {
            return;
        }

        let pools: Vec<(String, Vec<Value>)> = key_columns
            .iter()
            .filter(|c| c.reference.is_some())
            .map(|c| (c.name.clone(), Self::reference_pool(target, c, &[], generated)))
            .filter(|(_, pool)| !pool.is_empty())
            .collect();
        if pools.is_empty() {
            return;
        }

        for _ in 0..COMPOSITE_KEY_ATTEMPTS {
            for (name, pool) in &pools {
                if let Some(value) = pool.choose(&mut self.rng) {
                    record.insert(name.clone(), value.clone());
                }
            }
            if !used_keys.contains(&key_of(record, key_columns)) {
                return;
            }
        }

        // Odometer over every combination, first unused wins
        let mut positions = vec![0usize; pools.len()];
        loop {
            for ((name, pool), &position) in pools.iter().zip(&positions) {
                record.insert(name.clone(), pool[position].clone());
            }
            if !used_keys.contains(&key_of(record, key_columns)) {
                return;
            }

            let mut digit = 0;
            loop {
                if digit == positions.len() {
                    tracing::debug!(table = %target.name, "composite key space exhausted");
                    return;
                }
                positions[digit] += 1;
                if positions[digit] < pools[digit].1.len() {
                    break;
                }
                positions[digit] = 0;
                digit += 1;
            }
        }
    }

    fn scalar_value(&mut self, target: &SeedTarget, column: &SeedColumn, row: usize) -> Value {
        if column.primary_key {
            return self.key_value(target, column, row);
        }

        if column.class.is_textual() || column.class == TypeClass::Identifier {
            if let Some(format) = format_for(&column.snake) {
                return Value::String(self.formatted(format, target, row));
            }
        }

        match column.class {
            TypeClass::Identifier => Value::String(self.identifier(target.document)),
            TypeClass::Boolean => Value::Bool(self.rng.gen_bool(0.5)),
            TypeClass::Integer => json!(self.integer_for(&column.snake)),
            TypeClass::Decimal => json!(self.decimal_for(&column.snake)),
            TypeClass::Temporal => self.timestamp(column, target.document),
            TypeClass::Json => json!({ "key": self.word(), "value": self.rng.gen_range(1..=100) }),
            TypeClass::Array => json!([self.word(), self.word()]),
            TypeClass::Text => Value::String(self.sentence()),
            TypeClass::String => Value::String(self.string_for(column, row)),
            TypeClass::Other if column.nullable => Value::Null,
            TypeClass::Other => Value::String(self.word().to_string()),
        }
    }

    fn key_value(&mut self, target: &SeedTarget, column: &SeedColumn, row: usize) -> Value {
        match column.class {
            TypeClass::Integer => json!(row + 1),
            _ => Value::String(self.identifier(target.document)),
        }
    }

    fn identifier(&mut self, document: bool) -> String {
        if document {
            let bytes: [u8; 12] = self.rng.gen();
            hex::encode(bytes)
        } else {
            uuid::Builder::from_random_bytes(self.rng.gen())
                .into_uuid()
                .to_string()
        }
    }

    fn formatted(&mut self, format: Format, target: &SeedTarget, row: usize) -> String {
        match format {
            Format::Email => {
                let first = self.pick(FIRST_NAMES).to_ascii_lowercase();
                let last = self.pick(LAST_NAMES).to_ascii_lowercase();
                format!("{}.{}{}@example.com", first, last, row + 1)
            }
            Format::Url => format!("https://example.com/{}/{}", target.name, row + 1),
            Format::Uuid => self.identifier(false),
            Format::Phone => format!(
                "+1-555-{:03}-{:04}",
                self.rng.gen_range(100..1000),
                self.rng.gen_range(0..10000)
            ),
            Format::Ip => format!(
                "192.168.{}.{}",
                self.rng.gen_range(0..256),
                self.rng.gen_range(1..255)
            ),
        }
    }

    fn integer_for(&mut self, snake: &str) -> i64 {
        let (low, high) = INTEGER_RANGES
            .iter()
            .find(|(key, _, _)| matches_name(snake, key))
            .map(|&(_, low, high)| (low, high))
            .unwrap_or(DEFAULT_INTEGER_RANGE);
        self.rng.gen_range(low..=high)
    }

    fn decimal_for(&mut self, snake: &str) -> f64 {
        let (low, high) = DECIMAL_RANGES
            .iter()
            .find(|(key, _, _)| matches_name(snake, key))
            .map(|&(_, low, high)| (low, high))
            .unwrap_or(DEFAULT_DECIMAL_RANGE);
        let value: f64 = self.rng.gen_range(low..high);
        (value * 100.0).round() / 100.0
    }

    fn timestamp(&mut self, column: &SeedColumn, document: bool) -> Value {
        let offset = self.rng.gen_range(0..TIMESTAMP_WINDOW_SECONDS);
        let Some(moment) = Utc.timestamp_opt(TIMESTAMP_WINDOW_START + offset, 0).single() else {
            return Value::Null;
        };

        let rendered = if document {
            moment.to_rfc3339()
        } else if column.data_type.eq_ignore_ascii_case("DATE") {
            moment.format("%Y-%m-%d").to_string()
        } else {
            moment.format("%Y-%m-%d %H:%M:%S").to_string()
        };
        Value::String(rendered)
    }

    fn pick(&mut self, values: &[&'static str]) -> &'static str {
        values.choose(&mut self.rng).copied().unwrap_or("")
    }

    fn word(&mut self) -> &'static str {
        self.pick(WORDS)
    }

    fn sentence(&mut self) -> String {
        let length = self.rng.gen_range(6..=12);
        let words: Vec<&str> = (0..length).map(|_| self.word()).collect();
        let mut sentence = words.join(" ");
        if let Some(first) = sentence.get(..1) {
            sentence = first.to_ascii_uppercase() + &sentence[1..];
        }
        sentence.push('.');
        sentence
    }

    fn string_for(&mut self, column: &SeedColumn, row: usize) -> String {
        let snake = column.snake.as_str();
        let base = if matches_name(snake, "first_name") {
            self.pick(FIRST_NAMES).to_string()
        } else if matches_name(snake, "last_name") {
            self.pick(LAST_NAMES).to_string()
        } else if snake == "username" || snake == "handle" {
            format!("{}{}", self.pick(FIRST_NAMES).to_ascii_lowercase(), self.rng.gen_range(10..100))
        } else if matches_name(snake, "name") {
            format!("{} {}", self.pick(FIRST_NAMES), self.pick(LAST_NAMES))
        } else if naming::is_status_like(snake) {
            self.pick(STATUS_VALUES).to_string()
        } else if snake == "slug" {
            format!("{}-{}", self.word(), self.word())
        } else if snake == "title" {
            let mut title = format!("{} {} {}", self.word(), self.word(), self.word());
            if let Some(first) = title.get(..1) {
                title = first.to_ascii_uppercase() + &title[1..];
            }
            title
        } else {
            format!("{} {}", self.word(), self.word())
        };

        let suffix = if column.unique {
            format!("_{}", row + 1)
        } else {
            String::new()
        };
        let limit = TypeClass::string_length(&column.data_type).unwrap_or(usize::MAX);
        let room = limit.saturating_sub(suffix.len());
        let truncated: String = base.chars().take(room).collect();
        truncated + &suffix
    }
}

/// Generate `records_per_table` rows for every table with the default seed
pub fn generate_seed_data(schema: &Schema, records_per_table: usize) -> Vec<SeedData> {
    let options = SeedOptions {
        records_per_table,
        ..SeedOptions::default()
    };
    generate_seed_data_with(schema, &options)
}

/// Generate rows using explicit options
pub fn generate_seed_data_with(schema: &Schema, options: &SeedOptions) -> Vec<SeedData> {
    SeedGenerator::new(options.clone()).generate(schema)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use schemawright_core::{Column, DocumentSchema, Field, ForeignKey, SqlSchema};

    fn shop() -> Schema {
        let mut schema = SqlSchema::new(DatabaseKind::Postgres);
        schema.tables = vec![
            Table::new("orders")
                .with_column(Column::new("id", "UUID").primary_key())
                .with_column(Column::new("user_id", "UUID").not_null())
                .with_column(Column::new("total", "DECIMAL(10, 2)"))
                .with_column(Column::new("status", "VARCHAR(50)").not_null())
                .with_column(Column::new("created_at", "TIMESTAMP").not_null())
                .with_foreign_key(ForeignKey::new("user_id", "users", "id")),
            Table::new("users")
                .with_column(Column::new("id", "UUID").primary_key())
                .with_column(Column::new("email", "VARCHAR(255)").not_null().unique())
                .with_column(Column::new("username", "VARCHAR(8)").unique())
                .with_column(Column::new("age", "INTEGER"))
                .with_column(Column::new("phone", "VARCHAR(32)"))
                .with_column(Column::new("is_active", "BOOLEAN")),
        ];
        Schema::Sql(schema)
    }

    fn seed_for<'a>(seeds: &'a [SeedData], table: &str) -> &'a SeedData {
        seeds.iter().find(|s| s.table == table).unwrap()
    }

    fn values<'a>(seed: &'a SeedData, column: &str) -> Vec<&'a Value> {
        seed.records.iter().map(|r| &r[column]).collect()
    }

    #[test]
    fn exact_counts_in_dependency_order() {
        let seeds = generate_seed_data(&shop(), 7);
        assert_eq!(seeds.iter().map(|s| s.table.as_str()).collect::<Vec<_>>(), vec!["users", "orders"]);
        assert!(seeds.iter().all(|s| s.records.len() == 7));
        assert!(seeds.iter().all(|s| s.truncate_first));
    }

    #[test]
    fn foreign_keys_point_at_generated_keys() {
        let seeds = generate_seed_data(&shop(), 10);
        let user_ids: HashSet<&Value> = values(seed_for(&seeds, "users"), "id").into_iter().collect();
        let orders = seed_for(&seeds, "orders");
        assert!(values(orders, "user_id").iter().all(|v| user_ids.contains(v)));
    }

    #[test]
    fn formats_and_ranges() {
        let seeds = generate_seed_data(&shop(), 20);
        let users = seed_for(&seeds, "users");

        for record in &users.records {
            let email = record["email"].as_str().unwrap();
            assert!(email.ends_with("@example.com"));
            assert!(record["phone"].as_str().unwrap().starts_with("+1-555-"));
            let age = record["age"].as_i64().unwrap();
            assert!((18..=90).contains(&age));
            assert!(record["username"].as_str().unwrap().chars().count() <= 8);
            assert!(uuid::Uuid::parse_str(record["id"].as_str().unwrap()).is_ok());
        }

        let emails: HashSet<&Value> = values(users, "email").into_iter().collect();
        assert_eq!(emails.len(), 20);
        let usernames: HashSet<&Value> = values(users, "username").into_iter().collect();
        assert_eq!(usernames.len(), 20);

        let orders = seed_for(&seeds, "orders");
        for record in &orders.records {
            let created = record["created_at"].as_str().unwrap();
            assert!(created.starts_with("2023") || created.starts_with("2024"));
            assert!(STATUS_VALUES.contains(&record["status"].as_str().unwrap()));
        }
    }

    #[test]
    fn same_seed_same_data() {
        let a = generate_seed_data(&shop(), 5);
        let b = generate_seed_data(&shop(), 5);
        assert_eq!(a, b);

        let options = SeedOptions {
            records_per_table: 5,
            seed: 7,
            truncate_first: false,
        };
        let c = generate_seed_data_with(&shop(), &options);
        assert_ne!(a, c);
        assert!(!c[0].truncate_first);
    }

    #[test]
    fn self_references_sample_earlier_rows() {
        let mut schema = SqlSchema::new(DatabaseKind::Postgres);
        schema.tables = vec![Table::new("categories")
            .with_column(Column::new("id", "UUID").primary_key())
            .with_column(Column::new("parent_id", "UUID"))
            .with_foreign_key(ForeignKey::new("parent_id", "categories", "id"))];

        let seeds = generate_seed_data(&Schema::Sql(schema), 6);
        let records = &seeds[0].records;
        assert!(records[0]["parent_id"].is_null());
        for (i, record) in records.iter().enumerate().skip(1) {
            let earlier: Vec<&Value> = records[..i].iter().map(|r| &r["id"]).collect();
            assert!(earlier.contains(&&record["parent_id"]));
        }
    }

    #[test]
    fn unique_references_and_composite_keys() {
        let mut schema = SqlSchema::new(DatabaseKind::Postgres);
        schema.tables = vec![
            Table::new("posts").with_column(Column::new("id", "UUID").primary_key()),
            Table::new("tags").with_column(Column::new("id", "UUID").primary_key()),
            Table::new("profiles")
                .with_column(Column::new("id", "UUID").primary_key())
                .with_column(Column::new("post_id", "UUID").not_null().unique())
                .with_foreign_key(ForeignKey::new("post_id", "posts", "id")),
            Table::new("posts_tags")
                .with_column(Column::new("post_id", "UUID").primary_key())
                .with_column(Column::new("tag_id", "UUID").primary_key())
                .with_foreign_key(ForeignKey::new("post_id", "posts", "id"))
                .with_foreign_key(ForeignKey::new("tag_id", "tags", "id")),
        ];

        let seeds = generate_seed_data(&Schema::Sql(schema), 8);

        let profiles = seed_for(&seeds, "profiles");
        let distinct: HashSet<&Value> = values(profiles, "post_id").into_iter().collect();
        assert_eq!(distinct.len(), 8);

        let junction = seed_for(&seeds, "posts_tags");
        let pairs: HashSet<(String, String)> = junction
            .records
            .iter()
            .map(|r| (r["post_id"].to_string(), r["tag_id"].to_string()))
            .collect();
        assert_eq!(pairs.len(), 8);
    }

    #[test]
    fn cyclic_references_become_null() {
        let mut schema = SqlSchema::new(DatabaseKind::Postgres);
        schema.tables = vec![
            Table::new("a")
                .with_column(Column::new("id", "UUID").primary_key())
                .with_column(Column::new("b_id", "UUID"))
                .with_foreign_key(ForeignKey::new("b_id", "b", "id")),
            Table::new("b")
                .with_column(Column::new("id", "UUID").primary_key())
                .with_column(Column::new("a_id", "UUID"))
                .with_foreign_key(ForeignKey::new("a_id", "a", "id")),
        ];

        let seeds = generate_seed_data(&Schema::Sql(schema), 3);
        let b = seed_for(&seeds, "b");
        assert!(values(b, "a_id").iter().all(|v| v.is_null()));
        let a = seed_for(&seeds, "a");
        assert!(values(a, "b_id").iter().all(|v| v.is_string()));
    }

    #[test]
    fn documents_get_object_ids_and_reference_arrays() {
        let schema = Schema::Document(DocumentSchema {
            collections: vec![
                Collection::new("posts")
                    .with_field(Field::new("_id", "ObjectId").primary_key())
                    .with_field(Field::new("userId", "ObjectId").required().references("users"))
                    .with_field(Field::new("tagIds", "Array<ObjectId>").references("tags"))
                    .with_field(Field::new("publishedAt", "Date")),
                Collection::new("users").with_field(Field::new("_id", "ObjectId").primary_key()),
                Collection::new("tags").with_field(Field::new("_id", "ObjectId").primary_key()),
            ],
            relationships: Vec::new(),
        });

        let seeds = generate_seed_data(&schema, 4);
        assert_eq!(seeds.last().unwrap().table, "posts");

        let users = seed_for(&seeds, "users");
        let user_ids: HashSet<&Value> = values(users, "_id").into_iter().collect();
        assert!(user_ids.iter().all(|v| v.as_str().unwrap().len() == 24));

        let posts = seed_for(&seeds, "posts");
        for record in &posts.records {
            assert!(user_ids.contains(&record["userId"]));
            let tags = record["tagIds"].as_array().unwrap();
            assert_eq!(tags.len(), 3);
            assert!(record["publishedAt"].as_str().unwrap().contains('T'));
        }
    }

    #[test]
    fn zero_records() {
        let seeds = generate_seed_data(&shop(), 0);
        assert_eq!(seeds.len(), 2);
        assert!(seeds.iter().all(|s| s.records.is_empty()));
    }

    #[test]
    fn sql_rendering() {
        let mut record = Record::new();
        record.insert("id".to_string(), json!(1));
        record.insert("name".to_string(), json!("O'Brien"));
        record.insert("active".to_string(), json!(true));
        record.insert("note".to_string(), Value::Null);

        let seed = SeedData {
            table: "user".to_string(),
            records: vec![record],
            truncate_first: true,
        };

        assert_eq!(
            seed.to_sql(DatabaseKind::Postgres),
            "DELETE FROM \"user\";\nINSERT INTO \"user\" (active, id, name, note) VALUES (TRUE, 1, 'O''Brien', NULL);"
        );
        assert!(seed.to_sql(DatabaseKind::Sqlite).contains("VALUES (1, 1,"));

        let other = SeedData {
            table: "posts".to_string(),
            records: Vec::new(),
            truncate_first: true,
        };
        assert_eq!(
            seed_to_sql(&[seed, other], DatabaseKind::Mysql),
            "DELETE FROM posts;\nDELETE FROM `user`;\nINSERT INTO `user` (active, id, name, note) VALUES (TRUE, 1, 'O''Brien', NULL);"
        );
    }
}
