//! Schema construction from entities and relationships
//!
//! Entities become tables (or collections) with a generated identifier and
//! inferred attribute columns. Relationships are lowered into foreign keys,
//! junction tables, or reference fields.

use crate::type_rules::{infer_column, InferredColumn};
use schemawright_core::naming::{self, defaults};
use schemawright_core::{
    Collection, Column, DatabaseKind, DesignOptions, DocumentSchema, Entity, Field,
    FieldReference, ForeignKey, Index, LogicalType, ReferentialAction, Relationship,
    RelationshipType, Schema, SqlSchema, Table,
};
use std::collections::HashMap;

/// Column used for self references
const SELF_REFERENCE_COLUMN: &str = "parent_id";

/// Bookkeeping timestamps: name and whether the value is required
const TIMESTAMPS: &[(&str, bool)] = &[("created_at", true), ("updated_at", true), ("deleted_at", false)];

/// Build a schema for whichever database the options target
pub fn build_schema(
    entities: &[Entity],
    relationships: &[Relationship],
    options: &DesignOptions,
) -> Schema {
    if options.database.is_document() {
        build_mongo_schema(entities, relationships, options)
    } else {
        build_sql_schema(entities, relationships, options)
    }
}

fn inferred_for(name: &str, options: &DesignOptions) -> InferredColumn {
    let mut inferred = infer_column(name, options.default_string_length);
    if naming::expects_not_null(name) {
        inferred.nullable = false;
    }
    inferred
}

/// Build a relational schema
///
/// A document database in the options falls back to PostgreSQL rendering.
pub fn build_sql_schema(
    entities: &[Entity],
    relationships: &[Relationship],
    options: &DesignOptions,
) -> Schema {
    let dialect = if options.database.is_document() {
        tracing::debug!(database = %options.database, "relational build requested, rendering for postgres");
        DatabaseKind::Postgres
    } else {
        options.database
    };

    let mut builder = SqlBuilder {
        dialect,
        options,
        schema: SqlSchema::new(dialect),
        table_of: HashMap::new(),
    };

    for entity in entities {
        builder.add_entity(entity);
    }
    for relationship in relationships {
        if builder.add_relationship(relationship) {
            builder.schema.relationships.push(relationship.clone());
        }
    }
    if options.include_timestamps {
        builder.add_timestamps();
    }

    tracing::debug!(tables = builder.schema.tables.len(), dialect = %dialect, "built relational schema");
    Schema::Sql(builder.schema)
}

struct SqlBuilder<'a> {
    dialect: DatabaseKind,
    options: &'a DesignOptions,
    schema: SqlSchema,
    /// Entity name -> table name
    table_of: HashMap<String, String>,
}

impl SqlBuilder<'_> {
    fn identifier_type(&self) -> String {
        LogicalType::Uuid.sql_type(self.dialect)
    }

    fn table_mut(&mut self, name: &str) -> Option<&mut Table> {
        self.schema.tables.iter_mut().find(|t| t.name == name)
    }

    fn column_for(&self, name: &str) -> Column {
        let inferred = inferred_for(name, self.options);
        let mut column = Column::new(name, inferred.logical_type.sql_type(self.dialect))
            .with_nullable(inferred.nullable);
        if inferred.unique {
            column = column.unique();
        }
        if let Some(default) = inferred.default {
            column = column.with_default(default);
        }
        column
    }

    fn add_entity(&mut self, entity: &Entity) {
        let table_name = naming::table_name(&entity.name);
        if self.schema.find_table(&table_name).is_some() {
            tracing::debug!(entity = %entity.name, "duplicate entity skipped");
            return;
        }

        let mut id = Column::new(defaults::SQL_PRIMARY_KEY, self.identifier_type()).primary_key();
        if let Some(default) = LogicalType::Uuid.generated_default(self.dialect) {
            id = id.with_default(default);
        }

        let mut table = Table::new(&table_name).with_column(id);
        for attribute in &entity.attributes {
            let name = naming::to_snake_case(&attribute.name);
            let deferred = self.options.include_timestamps && naming::is_timestamp_bookkeeping(&name);
            if name.is_empty() || table.has_column(&name) || deferred {
                continue;
            }
            table = table.with_column(self.column_for(&name));
        }

        self.table_of.insert(entity.name.clone(), table_name);
        self.schema.tables.push(table);
    }

    fn add_relationship(&mut self, relationship: &Relationship) -> bool {
        let from = self.table_of.get(&relationship.from).cloned();
        let to = self.table_of.get(&relationship.to).cloned();
        let (Some(from), Some(to)) = (from, to) else {
            tracing::debug!(relationship = %relationship.name, "relationship references unknown entity");
            return false;
        };

        match relationship.relationship_type {
            RelationshipType::OneToMany => self.link(&to, &from, &relationship.from, false),
            RelationshipType::ManyToOne => self.link(&from, &to, &relationship.to, true),
            RelationshipType::OneToOne => self.link(&to, &from, &relationship.from, true),
            RelationshipType::ManyToMany => {
                self.junction(&from, &to, &relationship.from, &relationship.to)
            }
        }
        true
    }

    /// Add a foreign key on `owner` pointing at `target`
    fn link(&mut self, owner: &str, target: &str, target_entity: &str, unique: bool) {
        let self_reference = owner == target;
        let column_name = if self_reference {
            SELF_REFERENCE_COLUMN.to_string()
        } else {
            naming::foreign_key_column(target_entity)
        };
        let fk_type = self.identifier_type();

        let Some(table) = self.table_mut(owner) else {
            return;
        };
        if table.foreign_key_for(&column_name).is_some() {
            return;
        }

        match table.columns.iter_mut().find(|c| c.name == column_name) {
            Some(existing) => {
                existing.data_type = fk_type;
                existing.nullable = self_reference;
                existing.unique |= unique;
                existing.default = None;
            }
            None => {
                let mut column = Column::new(&column_name, fk_type).with_nullable(self_reference);
                if unique {
                    column = column.unique();
                }
                table.columns.push(column);
            }
        }

        let action = if self_reference {
            ReferentialAction::SetNull
        } else {
            ReferentialAction::Cascade
        };
        table
            .foreign_keys
            .push(ForeignKey::new(&column_name, target, defaults::SQL_PRIMARY_KEY).on_delete(action));

        if !table.is_leading_indexed(&column_name) {
            let columns = vec![column_name];
            let name = naming::index_name(&table.name, &columns);
            table.indexes.push(Index::new(name, columns));
        }
    }

    /// Add a junction table with a composite primary key
    fn junction(&mut self, from: &str, to: &str, from_entity: &str, to_entity: &str) {
        let name = format!("{}_{}", from, to);
        let reverse = format!("{}_{}", to, from);
        if self.schema.find_table(&name).is_some() || self.schema.find_table(&reverse).is_some() {
            return;
        }

        let left = naming::foreign_key_column(from_entity);
        let right = if from == to {
            format!("related_{}", left)
        } else {
            naming::foreign_key_column(to_entity)
        };
        let fk_type = self.identifier_type();

        let index_columns = vec![right.clone()];
        let index = Index::new(naming::index_name(&name, &index_columns), index_columns);

        let table = Table::new(&name)
            .with_column(Column::new(&left, &fk_type).primary_key())
            .with_column(Column::new(&right, &fk_type).primary_key())
            .with_foreign_key(
                ForeignKey::new(&left, from, defaults::SQL_PRIMARY_KEY)
                    .on_delete(ReferentialAction::Cascade),
            )
            .with_foreign_key(
                ForeignKey::new(&right, to, defaults::SQL_PRIMARY_KEY)
                    .on_delete(ReferentialAction::Cascade),
            )
            .with_index(index);

        self.schema.tables.push(table);
    }

    fn add_timestamps(&mut self) {
        let timestamp = LogicalType::Timestamp.sql_type(self.dialect);
        for table in &mut self.schema.tables {
            for &(name, required) in TIMESTAMPS {
                if table.has_column(name) {
                    continue;
                }
                let mut column = Column::new(name, &timestamp).with_nullable(!required);
                if required {
                    column = column.with_default("CURRENT_TIMESTAMP");
                }
                table.columns.push(column);
            }
        }
    }
}

/// Build a document schema
pub fn build_mongo_schema(
    entities: &[Entity],
    relationships: &[Relationship],
    options: &DesignOptions,
) -> Schema {
    let mut builder = DocumentBuilder {
        options,
        schema: DocumentSchema::default(),
        collection_of: HashMap::new(),
    };

    for entity in entities {
        builder.add_entity(entity);
    }
    for relationship in relationships {
        if builder.add_relationship(relationship) {
            builder.schema.relationships.push(relationship.clone());
        }
    }
    if options.include_timestamps {
        builder.add_timestamps();
    }

    tracing::debug!(collections = builder.schema.collections.len(), "built document schema");
    Schema::Document(builder.schema)
}

struct DocumentBuilder<'a> {
    options: &'a DesignOptions,
    schema: DocumentSchema,
    /// Entity name -> collection name
    collection_of: HashMap<String, String>,
}

fn push_field_index(collection: &mut Collection, field: &str, unique: bool) {
    if collection.is_leading_indexed(field) {
        return;
    }
    let columns = vec![field.to_string()];
    let index = if unique {
        Index::new(naming::unique_index_name(&collection.name, &columns), columns).unique()
    } else {
        Index::new(naming::index_name(&collection.name, &columns), columns)
    };
    collection.indexes.push(index);
}

impl DocumentBuilder<'_> {
    fn collection_mut(&mut self, name: &str) -> Option<&mut Collection> {
        self.schema.collections.iter_mut().find(|c| c.name == name)
    }

    fn add_entity(&mut self, entity: &Entity) {
        let collection_name = naming::table_name(&entity.name);
        if self.schema.find_collection(&collection_name).is_some() {
            tracing::debug!(entity = %entity.name, "duplicate entity skipped");
            return;
        }

        let mut collection = Collection::new(&collection_name)
            .with_field(Field::new(defaults::DOCUMENT_PRIMARY_KEY, LogicalType::Uuid.mongo_type()).primary_key());

        for attribute in &entity.attributes {
            let snake = naming::to_snake_case(&attribute.name);
            let deferred = self.options.include_timestamps && naming::is_timestamp_bookkeeping(&snake);
            if snake.is_empty() || snake == defaults::SQL_PRIMARY_KEY || deferred {
                continue;
            }
            let name = naming::to_camel_case(&snake);
            if collection.find_field(&name).is_some() {
                continue;
            }

            let inferred = inferred_for(&snake, self.options);
            let mut field = Field::new(&name, inferred.logical_type.mongo_type())
                .with_required(!inferred.nullable);
            if inferred.unique {
                field = field.unique();
            }
            if let Some(default) = inferred.default {
                field = field.with_default(default);
            }
            collection.fields.push(field);
            if inferred.unique {
                push_field_index(&mut collection, &name, true);
            }
        }

        self.collection_of.insert(entity.name.clone(), collection_name);
        self.schema.collections.push(collection);
    }

    fn add_relationship(&mut self, relationship: &Relationship) -> bool {
        let from = self.collection_of.get(&relationship.from).cloned();
        let to = self.collection_of.get(&relationship.to).cloned();
        let (Some(from), Some(to)) = (from, to) else {
            tracing::debug!(relationship = %relationship.name, "relationship references unknown entity");
            return false;
        };

        match relationship.relationship_type {
            RelationshipType::OneToMany => self.reference(&to, &from, &relationship.from, false),
            RelationshipType::ManyToOne => self.reference(&from, &to, &relationship.to, true),
            RelationshipType::OneToOne => self.reference(&to, &from, &relationship.from, true),
            RelationshipType::ManyToMany => self.reference_array(&from, &to, &relationship.to),
        }
        true
    }

    /// Add an identifier reference on `owner` pointing at `target`
    fn reference(&mut self, owner: &str, target: &str, target_entity: &str, unique: bool) {
        let self_reference = owner == target;
        let field_name = if self_reference {
            naming::to_camel_case(SELF_REFERENCE_COLUMN)
        } else {
            naming::to_camel_case(&naming::foreign_key_column(target_entity))
        };

        let Some(collection) = self.collection_mut(owner) else {
            return;
        };

        match collection.fields.iter_mut().find(|f| f.name == field_name) {
            Some(existing) if existing.references.is_some() => return,
            Some(existing) => {
                existing.field_type = LogicalType::Uuid.mongo_type();
                existing.required = !self_reference;
                existing.unique |= unique;
                existing.default = None;
                existing.references = Some(FieldReference {
                    collection: target.to_string(),
                    field: defaults::DOCUMENT_PRIMARY_KEY.to_string(),
                });
            }
            None => {
                let mut field = Field::new(&field_name, LogicalType::Uuid.mongo_type())
                    .with_required(!self_reference)
                    .references(target);
                if unique {
                    field = field.unique();
                }
                collection.fields.push(field);
            }
        }

        push_field_index(collection, &field_name, unique);
    }

    /// Many-to-many: an array of identifiers on the `from` side
    fn reference_array(&mut self, owner: &str, target: &str, target_entity: &str) {
        let stem = naming::foreign_key_column(target_entity);
        let field_name = if owner == target {
            naming::to_camel_case(&format!("related_{}s", stem))
        } else {
            naming::to_camel_case(&format!("{}s", stem))
        };
        let array_type = LogicalType::Array {
            element_type: Box::new(LogicalType::Uuid),
        };

        let Some(collection) = self.collection_mut(owner) else {
            return;
        };
        if collection.find_field(&field_name).is_some() {
            return;
        }

        collection
            .fields
            .push(Field::new(&field_name, array_type.mongo_type()).references(target));
        push_field_index(collection, &field_name, false);
    }

    fn add_timestamps(&mut self) {
        let date = LogicalType::Timestamp.mongo_type();
        for collection in &mut self.schema.collections {
            for &(name, required) in TIMESTAMPS {
                let name = naming::to_camel_case(name);
                if collection.find_field(&name).is_some() {
                    continue;
                }
                collection
                    .fields
                    .push(Field::new(name, &date).with_required(required));
            }
        }
    }
}
