//! Naming conventions, defaults and name-pattern rules
//!
//! The builder, index optimizer, normalization analyzer and validator all
//! sniff column names; the rules live here so they agree with each other.

use regex::Regex;
use std::sync::OnceLock;

/// Fixed defaults used when naming generated objects
pub mod defaults {
    /// Length for VARCHAR columns without a more specific rule
    pub const STRING_LENGTH: u32 = 255;

    /// Primary key constraint prefix
    pub const PRIMARY_KEY_PREFIX: &str = "pk_";

    /// Foreign key constraint prefix
    pub const FOREIGN_KEY_PREFIX: &str = "fk_";

    /// Index prefix
    pub const INDEX_PREFIX: &str = "idx_";

    /// Unique index prefix
    pub const UNIQUE_PREFIX: &str = "uq_";

    /// Primary key column for relational tables
    pub const SQL_PRIMARY_KEY: &str = "id";

    /// Primary key field for document collections
    pub const DOCUMENT_PRIMARY_KEY: &str = "_id";
}

/// Irregular singular/plural pairs checked before the suffix rules
const IRREGULAR_PLURALS: &[(&str, &str)] = &[
    ("person", "people"),
    ("child", "children"),
    ("man", "men"),
    ("woman", "women"),
    ("status", "statuses"),
    ("analysis", "analyses"),
    ("movie", "movies"),
    ("series", "series"),
    ("data", "data"),
    ("news", "news"),
];

/// SQL keywords that need quoting when used as identifiers
const RESERVED_KEYWORDS: &[&str] = &[
    "all", "and", "as", "asc", "between", "by", "case", "check", "column", "constraint",
    "create", "default", "delete", "desc", "distinct", "drop", "else", "end", "exists",
    "foreign", "from", "grant", "group", "having", "in", "index", "insert", "into", "is",
    "join", "key", "like", "limit", "not", "null", "offset", "on", "or", "order",
    "primary", "references", "select", "set", "table", "then", "to", "union", "unique",
    "update", "user", "using", "values", "when", "where", "with",
];

/// Convert `OrderItem`, `order item` or `orderItem` to `order_item`
pub fn to_snake_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    let mut prev_lower_or_digit = false;

    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() {
            if ch.is_ascii_uppercase() {
                if prev_lower_or_digit && !out.ends_with('_') {
                    out.push('_');
                }
                out.push(ch.to_ascii_lowercase());
                prev_lower_or_digit = false;
            } else {
                out.push(ch);
                prev_lower_or_digit = true;
            }
        } else if !out.is_empty() && !out.ends_with('_') {
            out.push('_');
            prev_lower_or_digit = false;
        }
    }

    out.trim_matches('_').to_string()
}

/// Convert a name to `PascalCase`
pub fn to_pascal_case(name: &str) -> String {
    to_snake_case(name)
        .split('_')
        .filter(|part| !part.is_empty())
        .map(capitalize)
        .collect()
}

/// Convert a name to `camelCase`; `_id` is kept as is
pub fn to_camel_case(name: &str) -> String {
    if name == defaults::DOCUMENT_PRIMARY_KEY {
        return name.to_string();
    }
    let pascal = to_pascal_case(name);
    let mut chars = pascal.chars();
    match chars.next() {
        Some(first) => first.to_ascii_lowercase().to_string() + chars.as_str(),
        None => String::new(),
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
        None => String::new(),
    }
}

/// Plural form of a single lowercase word
pub fn pluralize(word: &str) -> String {
    let lower = word.to_ascii_lowercase();
    if let Some((_, plural)) = IRREGULAR_PLURALS.iter().find(|(s, p)| *s == lower || *p == lower) {
        return plural.to_string();
    }

    if let Some(stem) = lower.strip_suffix('y') {
        if !stem.ends_with(['a', 'e', 'i', 'o', 'u']) && !stem.is_empty() {
            return format!("{}ies", stem);
        }
    }
    if ["s", "x", "z", "ch", "sh"].iter().any(|s| lower.ends_with(s)) {
        return format!("{}es", lower);
    }
    format!("{}s", lower)
}

/// Singular form of a single lowercase word
pub fn singularize(word: &str) -> String {
    let lower = word.to_ascii_lowercase();
    if let Some((singular, _)) = IRREGULAR_PLURALS.iter().find(|(s, p)| *p == lower || *s == lower) {
        return singular.to_string();
    }

    if let Some(stem) = lower.strip_suffix("ies") {
        if !stem.is_empty() {
            return format!("{}y", stem);
        }
    }
    for suffix in ["sses", "xes", "zes", "ches", "shes"] {
        if lower.ends_with(suffix) {
            return lower[..lower.len() - 2].to_string();
        }
    }
    if lower.ends_with("ss") || lower.ends_with("us") || lower.ends_with("is") || lower.len() <= 2 {
        return lower;
    }
    match lower.strip_suffix('s') {
        Some(stem) => stem.to_string(),
        None => lower,
    }
}

/// Apply a word transform to the last segment of a snake_case name
fn map_last_segment(snake: &str, f: impl Fn(&str) -> String) -> String {
    match snake.rsplit_once('_') {
        Some((head, last)) => format!("{}_{}", head, f(last)),
        None => f(snake),
    }
}

/// Canonical entity name: singular PascalCase (`order items` -> `OrderItem`)
pub fn entity_name(raw: &str) -> String {
    to_pascal_case(&map_last_segment(&to_snake_case(raw), singularize))
}

/// Table or collection name for an entity: plural snake_case (`OrderItem` -> `order_items`)
pub fn table_name(entity: &str) -> String {
    map_last_segment(&to_snake_case(entity), pluralize)
}

/// Foreign key column for an entity (`OrderItem` -> `order_item_id`)
pub fn foreign_key_column(entity: &str) -> String {
    format!("{}_id", map_last_segment(&to_snake_case(entity), singularize))
}

/// Name for a regular index
pub fn index_name(table: &str, columns: &[String]) -> String {
    format!("{}{}_{}", defaults::INDEX_PREFIX, table, columns.join("_"))
}

/// Name for a unique index
pub fn unique_index_name(table: &str, columns: &[String]) -> String {
    format!("{}{}_{}", defaults::UNIQUE_PREFIX, table, columns.join("_"))
}

/// Name for a foreign key constraint
pub fn foreign_key_name(table: &str, column: &str) -> String {
    format!("{}{}_{}", defaults::FOREIGN_KEY_PREFIX, table, column)
}

/// Name for a primary key constraint
pub fn primary_key_name(table: &str) -> String {
    format!("{}{}", defaults::PRIMARY_KEY_PREFIX, table)
}

fn snake_case_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[a-z][a-z0-9]*(_[a-z0-9]+)*$").expect("valid regex"))
}

fn camel_case_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[a-z][a-zA-Z0-9]*$").expect("valid regex"))
}

/// Whether a name is lowercase snake_case
pub fn is_snake_case(name: &str) -> bool {
    snake_case_regex().is_match(name)
}

/// Whether a name is camelCase (single lowercase words qualify)
pub fn is_camel_case(name: &str) -> bool {
    camel_case_regex().is_match(name)
}

/// Whether a name is a reserved SQL keyword
pub fn is_reserved_keyword(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    RESERVED_KEYWORDS.contains(&lower.as_str())
}

/// Entity stem of a reference column (`customer_id` / `customerId` -> `customer`)
pub fn reference_stem(name: &str) -> Option<String> {
    let snake = to_snake_case(name);
    snake
        .strip_suffix("_id")
        .filter(|stem| !stem.is_empty())
        .map(|stem| stem.to_string())
}

/// Column names that hold timestamps
pub fn is_date_like(name: &str) -> bool {
    let snake = to_snake_case(name);
    snake == "date"
        || snake == "timestamp"
        || snake.ends_with("_at")
        || snake.ends_with("_on")
        || snake.ends_with("_date")
        || snake.starts_with("date_")
        || snake.ends_with("_time")
        || matches!(snake.as_str(), "birthday" | "dob" | "expires" | "deadline")
}

/// Low-cardinality columns that are commonly filtered on
pub fn is_status_like(name: &str) -> bool {
    let snake = to_snake_case(name);
    matches!(
        snake.as_str(),
        "status" | "state" | "type" | "kind" | "category" | "role" | "priority" | "level" | "stage"
    ) || ["_status", "_type", "_state", "_category", "_kind"]
        .iter()
        .any(|s| snake.ends_with(s))
}

/// Columns that hold prose worth full-text searching
pub fn is_free_text_like(name: &str) -> bool {
    let snake = to_snake_case(name);
    matches!(
        snake.as_str(),
        "description" | "content" | "body" | "bio" | "notes" | "summary" | "comment"
            | "comments" | "text" | "about" | "message" | "details" | "review"
    ) || ["_description", "_notes", "_text", "_content", "_body"]
        .iter()
        .any(|s| snake.ends_with(s))
}

/// Columns that a well-formed table should declare NOT NULL
pub fn expects_not_null(name: &str) -> bool {
    let snake = to_snake_case(name);
    matches!(
        snake.as_str(),
        "email" | "name" | "title" | "username" | "status" | "password_hash" | "created_at"
            | "updated_at" | "slug"
    )
}

/// Timestamp bookkeeping columns added by the builder
pub fn is_timestamp_bookkeeping(name: &str) -> bool {
    matches!(
        to_snake_case(name).as_str(),
        "created_at" | "updated_at" | "deleted_at"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn case_conversion() {
        assert_eq!(to_snake_case("OrderItem"), "order_item");
        assert_eq!(to_snake_case("order item"), "order_item");
        assert_eq!(to_snake_case("createdAt"), "created_at");
        assert_eq!(to_snake_case("user_id"), "user_id");
        assert_eq!(to_pascal_case("order_item"), "OrderItem");
        assert_eq!(to_camel_case("user_id"), "userId");
        assert_eq!(to_camel_case("_id"), "_id");
    }

    #[test]
    fn plural_rules() {
        assert_eq!(pluralize("order"), "orders");
        assert_eq!(pluralize("category"), "categories");
        assert_eq!(pluralize("day"), "days");
        assert_eq!(pluralize("address"), "addresses");
        assert_eq!(pluralize("person"), "people");
        assert_eq!(singularize("orders"), "order");
        assert_eq!(singularize("categories"), "category");
        assert_eq!(singularize("addresses"), "address");
        assert_eq!(singularize("courses"), "course");
        assert_eq!(singularize("status"), "status");
        assert_eq!(singularize("people"), "person");
    }

    #[test]
    fn entity_and_table_names() {
        assert_eq!(entity_name("Users"), "User");
        assert_eq!(entity_name("order items"), "OrderItem");
        assert_eq!(entity_name("Categories"), "Category");
        assert_eq!(table_name("User"), "users");
        assert_eq!(table_name("OrderItem"), "order_items");
        assert_eq!(foreign_key_column("OrderItem"), "order_item_id");
    }

    #[test]
    fn conventions() {
        assert!(is_snake_case("order_items"));
        assert!(!is_snake_case("OrderItems"));
        assert!(!is_snake_case("order__items"));
        assert!(is_camel_case("createdAt"));
        assert!(!is_camel_case("created_at"));
        assert!(is_reserved_keyword("User"));
        assert!(!is_reserved_keyword("users"));
    }

    #[test]
    fn name_patterns() {
        assert!(is_date_like("created_at"));
        assert!(is_date_like("createdAt"));
        assert!(is_date_like("birth_date"));
        assert!(!is_date_like("name"));
        assert!(is_status_like("status"));
        assert!(is_status_like("payment_type"));
        assert!(is_free_text_like("description"));
        assert_eq!(reference_stem("customer_id").as_deref(), Some("customer"));
        assert_eq!(reference_stem("customerId").as_deref(), Some("customer"));
        assert_eq!(reference_stem("id"), None);
    }
}
