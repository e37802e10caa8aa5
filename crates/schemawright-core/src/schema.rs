//! Schema model shared by every stage of the pipeline
//!
//! A `Schema` is either relational (`Sql`) or document-oriented (`Document`).
//! Consumers match on the variant instead of probing optional fields.

use crate::config::DatabaseKind;
use crate::naming::defaults;
use serde::{Deserialize, Serialize};

/// Cardinality of a relationship
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RelationshipType {
    OneToOne,
    OneToMany,
    ManyToOne,
    ManyToMany,
}

impl RelationshipType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OneToOne => "one-to-one",
            Self::OneToMany => "one-to-many",
            Self::ManyToOne => "many-to-one",
            Self::ManyToMany => "many-to-many",
        }
    }
}

impl std::fmt::Display for RelationshipType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Directed link between two entities
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Relationship {
    /// Source entity (subject of the sentence)
    pub from: String,

    /// Target entity (object of the sentence)
    pub to: String,

    /// Cardinality
    #[serde(rename = "type")]
    pub relationship_type: RelationshipType,

    /// Descriptive name, e.g. `user_has_many_order`
    pub name: String,
}

impl Relationship {
    pub fn new(
        from: impl Into<String>,
        to: impl Into<String>,
        relationship_type: RelationshipType,
        name: impl Into<String>,
    ) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            relationship_type,
            name: name.into(),
        }
    }
}

/// A column in a relational table
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    /// Column name
    pub name: String,

    /// Rendered SQL type
    #[serde(rename = "type")]
    pub data_type: String,

    /// Whether NULL is allowed
    pub nullable: bool,

    /// Part of the primary key
    pub primary_key: bool,

    /// Unique constraint
    pub unique: bool,

    /// Default expression
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
}

impl Column {
    /// Create a nullable column
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
            nullable: true,
            primary_key: false,
            unique: false,
            default: None,
        }
    }

    /// Mark as primary key (implies NOT NULL)
    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self.nullable = false;
        self
    }

    /// Mark as NOT NULL
    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    /// Set nullability
    pub fn with_nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    /// Mark as unique
    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    /// Set the default expression
    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into());
        self
    }
}

/// Referential action for ON DELETE
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReferentialAction {
    Cascade,
    SetNull,
    Restrict,
    NoAction,
}

impl ReferentialAction {
    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::Cascade => "CASCADE",
            Self::SetNull => "SET NULL",
            Self::Restrict => "RESTRICT",
            Self::NoAction => "NO ACTION",
        }
    }
}

/// Foreign key constraint
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForeignKey {
    /// Referencing column in the owning table
    pub column: String,

    /// Referenced table
    pub referenced_table: String,

    /// Referenced column
    pub referenced_column: String,

    /// Action when the referenced row is deleted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_delete: Option<ReferentialAction>,
}

impl ForeignKey {
    pub fn new(
        column: impl Into<String>,
        referenced_table: impl Into<String>,
        referenced_column: impl Into<String>,
    ) -> Self {
        Self {
            column: column.into(),
            referenced_table: referenced_table.into(),
            referenced_column: referenced_column.into(),
            on_delete: None,
        }
    }

    pub fn on_delete(mut self, action: ReferentialAction) -> Self {
        self.on_delete = Some(action);
        self
    }
}

/// Index access method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexType {
    Btree,
    Hash,
    Gin,
    Gist,
    Fulltext,
}

impl IndexType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Btree => "btree",
            Self::Hash => "hash",
            Self::Gin => "gin",
            Self::Gist => "gist",
            Self::Fulltext => "fulltext",
        }
    }
}

impl Default for IndexType {
    fn default() -> Self {
        Self::Btree
    }
}

/// Index definition
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Index {
    /// Index name
    pub name: String,

    /// Indexed columns, in order
    pub columns: Vec<String>,

    /// Unique index
    pub unique: bool,

    /// Access method
    #[serde(rename = "type", default)]
    pub index_type: IndexType,
}

impl Index {
    /// Create a non-unique btree index
    pub fn new(name: impl Into<String>, columns: Vec<String>) -> Self {
        Self {
            name: name.into(),
            columns,
            unique: false,
            index_type: IndexType::Btree,
        }
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    pub fn with_type(mut self, index_type: IndexType) -> Self {
        self.index_type = index_type;
        self
    }

    /// Whether the column is the leading column of this index
    pub fn leads_with(&self, column: &str) -> bool {
        self.columns.first().map(|c| c == column).unwrap_or(false)
    }
}

/// Relational table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Table {
    /// Table name
    pub name: String,

    /// Columns, in declaration order
    pub columns: Vec<Column>,

    /// Secondary indexes
    #[serde(default)]
    pub indexes: Vec<Index>,

    /// Foreign key constraints
    #[serde(default)]
    pub foreign_keys: Vec<ForeignKey>,
}

impl Table {
    /// Create an empty table
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
            indexes: Vec::new(),
            foreign_keys: Vec::new(),
        }
    }

    pub fn with_column(mut self, column: Column) -> Self {
        self.columns.push(column);
        self
    }

    pub fn with_index(mut self, index: Index) -> Self {
        self.indexes.push(index);
        self
    }

    pub fn with_foreign_key(mut self, foreign_key: ForeignKey) -> Self {
        self.foreign_keys.push(foreign_key);
        self
    }

    /// Find a column by name
    pub fn find_column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Check if a column exists
    pub fn has_column(&self, name: &str) -> bool {
        self.find_column(name).is_some()
    }

    /// Primary key columns in declaration order
    pub fn primary_key_columns(&self) -> Vec<&Column> {
        self.columns.iter().filter(|c| c.primary_key).collect()
    }

    /// Primary key column names in declaration order
    pub fn primary_key_names(&self) -> Vec<String> {
        self.primary_key_columns().iter().map(|c| c.name.clone()).collect()
    }

    /// Foreign key declared on a column
    pub fn foreign_key_for(&self, column: &str) -> Option<&ForeignKey> {
        self.foreign_keys.iter().find(|fk| fk.column == column)
    }

    /// Whether a column is the leading column of an index, of the primary key,
    /// or carries its own unique constraint
    pub fn is_leading_indexed(&self, column: &str) -> bool {
        let pk_leads = self
            .columns
            .iter()
            .find(|c| c.primary_key)
            .map(|c| c.name == column)
            .unwrap_or(false);
        let unique = self.find_column(column).map(|c| c.unique).unwrap_or(false);

        pk_leads || unique || self.indexes.iter().any(|idx| idx.leads_with(column))
    }

    /// Whether an index with exactly these columns (in order) exists, counting the primary key
    pub fn has_index_on(&self, columns: &[String]) -> bool {
        self.indexes.iter().any(|idx| idx.columns == columns)
            || (!columns.is_empty() && self.primary_key_names() == columns)
    }
}

/// Reference from a document field to another collection
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FieldReference {
    /// Referenced collection
    pub collection: String,

    /// Referenced field
    pub field: String,
}

/// A field in a document collection
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    /// Field name
    pub name: String,

    /// Document type, e.g. `String`, `ObjectId`, `Array<ObjectId>`
    #[serde(rename = "type")]
    pub field_type: String,

    /// Whether the field must be present
    pub required: bool,

    /// Document identifier
    #[serde(default)]
    pub primary_key: bool,

    /// Unique constraint
    #[serde(default)]
    pub unique: bool,

    /// Default value
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,

    /// Reference to another collection
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub references: Option<FieldReference>,
}

impl Field {
    /// Create an optional field
    pub fn new(name: impl Into<String>, field_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            field_type: field_type.into(),
            required: false,
            primary_key: false,
            unique: false,
            default: None,
            references: None,
        }
    }

    /// Mark as the document identifier
    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self.required = true;
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into());
        self
    }

    /// Reference the `_id` of another collection
    pub fn references(mut self, collection: impl Into<String>) -> Self {
        self.references = Some(FieldReference {
            collection: collection.into(),
            field: defaults::DOCUMENT_PRIMARY_KEY.to_string(),
        });
        self
    }
}

/// Document collection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collection {
    /// Collection name
    pub name: String,

    /// Fields, in declaration order
    pub fields: Vec<Field>,

    /// Indexes
    #[serde(default)]
    pub indexes: Vec<Index>,
}

impl Collection {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
            indexes: Vec::new(),
        }
    }

    pub fn with_field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    pub fn with_index(mut self, index: Index) -> Self {
        self.indexes.push(index);
        self
    }

    /// Find a field by name
    pub fn find_field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// The identifier field, if any
    pub fn primary_key_field(&self) -> Option<&Field> {
        self.fields
            .iter()
            .find(|f| f.primary_key || f.name == defaults::DOCUMENT_PRIMARY_KEY)
    }

    /// Fields that reference other collections
    pub fn reference_fields(&self) -> impl Iterator<Item = &Field> {
        self.fields.iter().filter(|f| f.references.is_some())
    }

    /// Whether a field is the leading field of an index or the identifier
    pub fn is_leading_indexed(&self, field: &str) -> bool {
        field == defaults::DOCUMENT_PRIMARY_KEY || self.indexes.iter().any(|idx| idx.leads_with(field))
    }
}

/// Relational schema
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SqlSchema {
    /// SQL dialect the types were rendered for
    pub dialect: DatabaseKind,

    /// Tables
    pub tables: Vec<Table>,

    /// Relationships the tables were derived from
    #[serde(default)]
    pub relationships: Vec<Relationship>,
}

impl SqlSchema {
    pub fn new(dialect: DatabaseKind) -> Self {
        Self {
            dialect,
            tables: Vec::new(),
            relationships: Vec::new(),
        }
    }

    /// Find a table by name
    pub fn find_table(&self, name: &str) -> Option<&Table> {
        self.tables.iter().find(|t| t.name == name)
    }
}

/// Document schema
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DocumentSchema {
    /// Collections
    pub collections: Vec<Collection>,

    /// Relationships the collections were derived from
    #[serde(default)]
    pub relationships: Vec<Relationship>,
}

impl DocumentSchema {
    /// Find a collection by name
    pub fn find_collection(&self, name: &str) -> Option<&Collection> {
        self.collections.iter().find(|c| c.name == name)
    }
}

/// A designed schema: relational tables or document collections, never both
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Schema {
    Sql(SqlSchema),
    Document(DocumentSchema),
}

impl Schema {
    /// Database the schema targets
    pub fn database(&self) -> DatabaseKind {
        match self {
            Self::Sql(sql) => sql.dialect,
            Self::Document(_) => DatabaseKind::Mongodb,
        }
    }

    /// Declared relationships
    pub fn relationships(&self) -> &[Relationship] {
        match self {
            Self::Sql(sql) => &sql.relationships,
            Self::Document(doc) => &doc.relationships,
        }
    }

    /// Table or collection names, in declaration order
    pub fn object_names(&self) -> Vec<&str> {
        match self {
            Self::Sql(sql) => sql.tables.iter().map(|t| t.name.as_str()).collect(),
            Self::Document(doc) => doc.collections.iter().map(|c| c.name.as_str()).collect(),
        }
    }

    /// Relational tables, empty for document schemas
    pub fn tables(&self) -> &[Table] {
        match self {
            Self::Sql(sql) => &sql.tables,
            Self::Document(_) => &[],
        }
    }

    /// Document collections, empty for relational schemas
    pub fn collections(&self) -> &[Collection] {
        match self {
            Self::Sql(_) => &[],
            Self::Document(doc) => &doc.collections,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.object_names().is_empty()
    }

    /// Serialize to JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Parse from JSON string
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
