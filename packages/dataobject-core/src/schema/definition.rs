//! Serializable table definitions loaded from JSON schema files.

use serde::{Deserialize, Serialize};

use crate::column::{ColumnBuilder, ColumnDescriptor, ColumnLength};
use crate::error::{DataError, Result};
use crate::value::Value;

/// Schema file describing one table, or one localized entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaFile {
    /// Table (or entity) name
    pub name: String,
    /// Primary table columns
    pub columns: Vec<ColumnDefinition>,
    /// Content columns; non-empty makes the schema a localized entity
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub content_columns: Vec<ColumnDefinition>,
}

impl SchemaFile {
    /// Parses a schema file from JSON text.
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text)
            .map_err(|e| DataError::Config(format!("invalid schema file: {e}")))
    }

    /// Whether the schema declares content columns.
    pub fn is_localized(&self) -> bool {
        !self.content_columns.is_empty()
    }

    /// Primary column descriptors in declaration order.
    pub fn column_descriptors(&self) -> Vec<ColumnDescriptor> {
        self.columns.iter().map(ColumnDefinition::to_descriptor).collect()
    }

    /// Content column descriptors in declaration order.
    pub fn content_descriptors(&self) -> Vec<ColumnDescriptor> {
        self.content_columns
            .iter()
            .map(ColumnDefinition::to_descriptor)
            .collect()
    }
}

/// Column definition as written in a schema file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDefinition {
    /// Column name
    pub name: String,
    /// Neutral type tag
    pub r#type: String,
    /// Length (`255`) or precision (`[10, 2]`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<ColumnLength>,
    /// Default value
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    /// NULL allowed (default true)
    #[serde(default = "default_nullable")]
    pub nullable: bool,
    /// Explicit AUTO_INCREMENT flag
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto: Option<bool>,
    /// UNIQUE constraint
    #[serde(default)]
    pub unique: bool,
    /// PRIMARY KEY
    #[serde(default)]
    pub primary: bool,
}

fn default_nullable() -> bool {
    true
}

impl ColumnDefinition {
    /// Builds the immutable descriptor.
    pub fn to_descriptor(&self) -> ColumnDescriptor {
        let mut builder = ColumnBuilder::new(self.name.clone(), self.r#type.as_str());
        if let Some(length) = self.length {
            builder = builder.length(length);
        }
        if let Some(default) = &self.default {
            builder = builder.default(default.clone());
        }
        if !self.nullable {
            builder = builder.not_null();
        }
        if let Some(auto) = self.auto {
            builder = builder.auto(auto);
        }
        if self.unique {
            builder = builder.unique();
        }
        if self.primary {
            builder = builder.primary();
        }
        builder.build()
    }
}
