//! Schema-driven relational data-access layer.
//!
//! Provides column metadata, dialect-aware DDL synthesis, parameterized
//! CRUD over a single table, and a localized engine that splits one logical
//! entity across a primary table and a per-language content table.

pub mod column;
pub mod config;
pub mod dialect;
pub mod error;
pub mod gateway;
pub mod localized;
pub mod query;
pub mod schema;
pub mod table;
pub mod transaction;
pub mod value;

pub use column::{ColumnBuilder, ColumnDescriptor, ColumnLength, ColumnType, TypeClass};
pub use config::{DataObjectConfig, OperationContext};
pub use dialect::Dialect;
pub use error::{DataError, Result};
pub use gateway::{QueryResult, RecordingGateway, SqlGateway, Statement};
pub use localized::{LocalizedContent, LocalizedEntity, LocalizedRecord};
pub use query::Condition;
pub use schema::{ColumnDefinition, EnsureOutcome, SchemaFile, TableSchema};
pub use table::RecordTable;
pub use transaction::UnitOfWork;
pub use value::{Bind, BindKind, Record, Value};
