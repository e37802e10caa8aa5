//! Entities extracted from requirement text

use serde::{Deserialize, Serialize};

/// An attribute mentioned for an entity
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Attribute {
    /// Attribute name in snake_case
    pub name: String,
}

impl Attribute {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// An inferred data-model noun that becomes a table or collection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    /// Singular PascalCase name, e.g. `OrderItem`
    pub name: String,

    /// Attributes in first-mention order
    pub attributes: Vec<Attribute>,
}

impl Entity {
    /// Create an entity without attributes
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
        }
    }

    /// Add attributes by name
    pub fn with_attributes<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for name in names {
            self.add_attribute(name);
        }
        self
    }

    /// Add an attribute unless one with the same name exists
    pub fn add_attribute(&mut self, name: impl Into<String>) {
        let name = name.into();
        if !self.attributes.iter().any(|a| a.name == name) {
            self.attributes.push(Attribute::new(name));
        }
    }

    /// Check if the entity declares an attribute
    pub fn has_attribute(&self, name: &str) -> bool {
        self.attributes.iter().any(|a| a.name == name)
    }
}
