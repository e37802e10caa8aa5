//! Column type inference from attribute names
//!
//! An ordered rule table: the first rule whose matcher accepts the
//! snake_case name decides the logical type and constraints.

use schemawright_core::naming::{is_date_like, is_free_text_like, to_snake_case};
use schemawright_core::LogicalType;

/// How a rule recognizes a name
#[derive(Debug, Clone, Copy)]
pub enum NameMatcher {
    /// Whole name equals one of the words
    Exact(&'static [&'static str]),

    /// Name ends with one of the suffixes
    Suffix(&'static [&'static str]),

    /// Name starts with one of the prefixes
    Prefix(&'static [&'static str]),

    /// Arbitrary predicate shared with the analyzers
    Predicate(fn(&str) -> bool),
}

impl NameMatcher {
    pub fn matches(&self, snake: &str) -> bool {
        match self {
            Self::Exact(words) => words.contains(&snake),
            Self::Suffix(suffixes) => suffixes.iter().any(|s| snake.ends_with(s) && snake != *s),
            Self::Prefix(prefixes) => prefixes.iter().any(|p| snake.starts_with(p) && snake != *p),
            Self::Predicate(predicate) => predicate(snake),
        }
    }
}

/// Logical type produced by a rule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InferredKind {
    Identifier,
    Timestamp,
    Date,
    Boolean,
    Money,
    Integer,
    Json,
    Text,
    /// String with a fixed length
    SizedString(u32),
    /// String with the configured default length
    DefaultString,
}

impl InferredKind {
    pub fn to_logical(self, default_string_length: u32) -> LogicalType {
        match self {
            Self::Identifier => LogicalType::Uuid,
            Self::Timestamp => LogicalType::Timestamp,
            Self::Date => LogicalType::Date,
            Self::Boolean => LogicalType::Bool,
            Self::Money => LogicalType::Decimal { precision: 10, scale: 2 },
            Self::Integer => LogicalType::Int,
            Self::Json => LogicalType::Json,
            Self::Text => LogicalType::Text,
            Self::SizedString(length) => LogicalType::String { length },
            Self::DefaultString => LogicalType::String {
                length: default_string_length,
            },
        }
    }
}

/// One row of the type table
#[derive(Debug, Clone, Copy)]
pub struct TypeRule {
    pub matcher: NameMatcher,
    pub kind: InferredKind,
    pub nullable: bool,
    pub unique: bool,
    pub default: Option<&'static str>,
}

const fn rule(matcher: NameMatcher, kind: InferredKind, nullable: bool, unique: bool) -> TypeRule {
    TypeRule {
        matcher,
        kind,
        nullable,
        unique,
        default: None,
    }
}

const fn rule_with_default(
    matcher: NameMatcher,
    kind: InferredKind,
    nullable: bool,
    default: &'static str,
) -> TypeRule {
    TypeRule {
        matcher,
        kind,
        nullable,
        unique: false,
        default: Some(default),
    }
}

use InferredKind::*;
use NameMatcher::*;

/// Ordered type rules; the fallback is a nullable default-length string
pub const TYPE_RULES: &[TypeRule] = &[
    rule(Exact(&["id", "uuid", "guid"]), Identifier, false, true),
    rule(Suffix(&["_id", "_uuid"]), Identifier, true, false),
    rule(Exact(&["email", "email_address"]), SizedString(255), false, true),
    rule(Suffix(&["_email"]), SizedString(255), true, false),
    rule_with_default(Prefix(&["is_", "has_", "can_"]), Boolean, false, "false"),
    rule_with_default(
        Exact(&["active", "enabled", "verified", "published", "archived", "visible", "available", "completed"]),
        Boolean,
        false,
        "false",
    ),
    rule(Exact(&["date", "birth_date", "birthday", "dob"]), Date, true, false),
    rule(Suffix(&["_date", "_on"]), Date, true, false),
    rule(Predicate(is_date_like), Timestamp, true, false),
    rule(
        Exact(&["price", "amount", "cost", "total", "balance", "salary", "fee", "subtotal", "tax", "discount"]),
        Money,
        true,
        false,
    ),
    rule(Suffix(&["_price", "_amount", "_cost", "_total", "_fee", "_balance"]), Money, true, false),
    rule(
        Exact(&["count", "quantity", "age", "stock", "rating", "position", "year", "rank", "score", "views", "likes", "duration", "capacity", "pages"]),
        Integer,
        true,
        false,
    ),
    rule(Suffix(&["_count", "_quantity", "_qty"]), Integer, true, false),
    rule(
        Exact(&["metadata", "settings", "preferences", "config", "configuration", "payload", "options", "extra"]),
        Json,
        true,
        false,
    ),
    rule(Suffix(&["_json", "_metadata", "_settings"]), Json, true, false),
    rule(Predicate(is_free_text_like), Text, true, false),
    rule(
        Exact(&["url", "website", "link", "avatar", "image", "photo", "thumbnail"]),
        SizedString(2048),
        true,
        false,
    ),
    rule(Suffix(&["_url", "_link"]), SizedString(2048), true, false),
    rule(Exact(&["phone", "phone_number", "mobile"]), SizedString(32), true, false),
    rule(Suffix(&["_phone"]), SizedString(32), true, false),
    rule(Exact(&["ip", "ip_address"]), SizedString(45), true, false),
    rule(Exact(&["username", "slug", "handle", "sku", "isbn"]), DefaultString, false, true),
    rule(
        Exact(&["name", "title", "first_name", "last_name", "full_name", "display_name"]),
        DefaultString,
        false,
        false,
    ),
    rule_with_default(Exact(&["status", "state"]), SizedString(50), false, "'active'"),
    rule(Exact(&["password", "password_hash"]), DefaultString, false, false),
];

/// Type and constraints inferred for one attribute
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InferredColumn {
    pub logical_type: LogicalType,
    pub nullable: bool,
    pub unique: bool,
    pub default: Option<String>,
}

/// Infer the type of an attribute from its name
pub fn infer_column(name: &str, default_string_length: u32) -> InferredColumn {
    let snake = to_snake_case(name);

    match TYPE_RULES.iter().find(|rule| rule.matcher.matches(&snake)) {
        Some(rule) => InferredColumn {
            logical_type: rule.kind.to_logical(default_string_length),
            nullable: rule.nullable,
            unique: rule.unique,
            default: rule.default.map(str::to_string),
        },
        None => InferredColumn {
            logical_type: DefaultString.to_logical(default_string_length),
            nullable: true,
            unique: false,
            default: None,
        },
    }
}
