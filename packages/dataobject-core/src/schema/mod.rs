//! Table schema, DDL synthesis, and schema definition files.

mod definition;
mod table_schema;
pub(crate) mod validation;

pub use definition::{ColumnDefinition, SchemaFile};
pub use table_schema::{sanitize_table_name, EnsureOutcome, TableSchema};
