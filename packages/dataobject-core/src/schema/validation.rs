//! Validation of column sets and records against a table definition.

use std::collections::HashSet;

use crate::column::ColumnDescriptor;
use crate::column::TypeClass;
use crate::error::{DataError, Result};
use crate::value::Record;

/// Validates a column set for one table.
///
/// # Arguments
/// * `table` - Table name, for error messages
/// * `columns` - Column definitions in declaration order
///
/// # Returns
/// `Result<(), DataError>`; duplicates are rejected, never overwritten.
pub(crate) fn validate_columns(table: &str, columns: &[ColumnDescriptor]) -> Result<()> {
    if columns.is_empty() {
        return Err(DataError::MissingColumns {
            table: table.to_string(),
        });
    }

    let mut seen = HashSet::new();
    let mut primary: Option<&str> = None;
    for column in columns {
        if !crate::column::is_identifier(column.name()) {
            return Err(DataError::InvalidColumn {
                column: column.name().to_string(),
                reason: "name must only contain [A-Za-z0-9_]".to_string(),
            });
        }
        if !seen.insert(column.name()) {
            return Err(DataError::DuplicateColumn {
                table: table.to_string(),
                column: column.name().to_string(),
            });
        }
        if column.is_primary() {
            if let Some(first) = primary {
                return Err(DataError::MultiplePrimaryKeys {
                    table: table.to_string(),
                    first: first.to_string(),
                    second: column.name().to_string(),
                });
            }
            primary = Some(column.name());
        }
    }

    Ok(())
}

/// Rejects record keys the table doesn't define.
pub(crate) fn validate_record(
    table: &str,
    columns: &[ColumnDescriptor],
    record: &Record,
) -> Result<()> {
    for name in record.names() {
        if !columns.iter().any(|c| c.name() == name) {
            return Err(DataError::UnknownColumn {
                table: table.to_string(),
                column: name.to_string(),
            });
        }
    }
    Ok(())
}

/// Checks the conventional primary integer `id` column.
pub(crate) fn require_id<'a>(
    table: &str,
    columns: &'a [ColumnDescriptor],
    operation: &'static str,
) -> Result<&'a ColumnDescriptor> {
    columns
        .iter()
        .find(|c| c.name() == "id" && c.is_integer() && c.is_primary())
        .ok_or_else(|| DataError::MissingIdColumn {
            table: table.to_string(),
            operation,
        })
}

/// Checks the integer `is_active` flag column.
pub(crate) fn require_active<'a>(
    table: &str,
    columns: &'a [ColumnDescriptor],
    operation: &'static str,
) -> Result<&'a ColumnDescriptor> {
    columns
        .iter()
        .find(|c| c.name() == "is_active" && c.class() == TypeClass::Integer)
        .ok_or_else(|| DataError::MissingActiveColumn {
            table: table.to_string(),
            operation,
        })
}
