//! Soft deactivation: `is_active=0` plus unique-value perturbation.

use tracing::debug;
use uuid::Uuid;

use crate::column::ColumnDescriptor;
use crate::config::OperationContext;
use crate::error::{DataError, Result};
use crate::query::update_sql;
use crate::value::{Record, Value};

use super::record_table::{id_bind, RecordTable};

impl RecordTable {
    /// Marks the row inactive and frees its unique values for reuse.
    ///
    /// Numeric unique columns move one below the column's current minimum
    /// (never above -1); string unique columns get a `[<random tag>] `
    /// prefix. `extra` columns are written in the same statement. Returns
    /// false when the row is missing or already inactive (a NULL flag
    /// counts as inactive).
    ///
    /// # Errors
    /// * `UniqueValueExhausted` - a numeric unique column already holds
    ///   the smallest representable value
    pub fn soft_deactivate_by_id(
        &self,
        ctx: &OperationContext,
        id: i64,
        extra: Record,
    ) -> Result<bool> {
        self.schema().require_id("soft_deactivate_by_id")?;
        self.schema().require_active("soft_deactivate_by_id")?;
        self.schema().validate_record(&extra)?;

        let uniques: Vec<&ColumnDescriptor> = self.schema().unique_columns().collect();
        let selection = std::iter::once("is_active")
            .chain(uniques.iter().map(|c| c.name()))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!("SELECT {selection} FROM {} WHERE id=:id LIMIT 1", self.name());
        let Some(current) = self.gateway().query(&sql, &[id_bind(id)])?.into_first() else {
            return Ok(false);
        };

        let current = self.schema().materialize(&current, "");
        if current.get_i64("is_active").unwrap_or(0) == 0 {
            debug!(table = %self.name(), id, "row already inactive");
            return Ok(false);
        }

        let mut record = extra;
        record.insert("is_active", 0);
        let tag = uniqueness_tag();
        for column in uniques {
            if record.contains(column.name()) {
                continue;
            }
            let perturbed = match current.get(column.name()) {
                None | Some(Value::Null) => continue,
                Some(Value::Integer(_)) | Some(Value::Decimal(_)) if column.is_numeric() => {
                    self.below_minimum(column)?
                }
                Some(other) => Value::Text(format!("[{tag}] {other}")),
            };
            record.insert(column.name(), perturbed);
        }
        self.stamp_updated(ctx, &mut record);

        let names = self.schema().ordered_names(&record);
        let sql = update_sql(self.name(), &names, &format!("id={id}"));
        let result = self.gateway().query(&sql, &self.schema().binds(&record))?;
        Ok(result.affected > 0)
    }

    /// A value no row of `column` holds: one below `min(MIN(column), 0)`.
    fn below_minimum(&self, column: &ColumnDescriptor) -> Result<Value> {
        let sql = format!("SELECT MIN({0}) AS floor FROM {1}", column.name(), self.name());
        let floor = self
            .gateway()
            .query(&sql, &[])?
            .into_first()
            .and_then(|row| row.get("floor").cloned())
            .map(|raw| column.coerce(raw))
            .unwrap_or(Value::Null);

        let exhausted = || DataError::UniqueValueExhausted {
            table: self.name().to_string(),
            column: column.name().to_string(),
        };
        match floor {
            Value::Decimal(min) => {
                let next = min.min(0.0) - 1.0;
                if next.is_finite() && next < min.min(0.0) {
                    Ok(Value::Decimal(next))
                } else {
                    Err(exhausted())
                }
            }
            other => {
                let min = other.as_i64().unwrap_or(0).min(0);
                min.checked_sub(1).map(Value::Integer).ok_or_else(exhausted)
            }
        }
    }
}

/// 13 hex characters, the width of a microsecond-resolution unique id.
fn uniqueness_tag() -> String {
    let mut tag = Uuid::new_v4().simple().to_string();
    tag.truncate(13);
    tag
}
