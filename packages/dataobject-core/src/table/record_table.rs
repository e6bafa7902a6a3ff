//! CRUD engine over one physical table.
//!
//! Every write:
//! - Validates record keys against the schema before rendering SQL
//! - Stamps audit columns from the operation context
//! - Returns the stored row, re-read through the dialect's preferred path

use std::sync::Arc;

use tracing::info;

use crate::config::{DataObjectConfig, OperationContext};
use crate::dialect::Dialect;
use crate::error::{DataError, Result};
use crate::gateway::SqlGateway;
use crate::query::{equality_clause, insert_sql, update_sql, Condition};
use crate::schema::{EnsureOutcome, TableSchema};
use crate::value::{Bind, BindKind, Record, Value};

/// Single-table engine built on a [`TableSchema`] and a shared gateway.
pub struct RecordTable {
    gateway: Arc<dyn SqlGateway>,
    schema: TableSchema,
    dialect: Dialect,
    config: DataObjectConfig,
}

impl RecordTable {
    /// Creates an engine with the default configuration.
    ///
    /// The dialect is selected once from the gateway's driver name.
    pub fn new(gateway: Arc<dyn SqlGateway>, schema: TableSchema) -> Result<Self> {
        Self::with_config(gateway, schema, DataObjectConfig::default())
    }

    /// Creates an engine with an explicit configuration.
    pub fn with_config(
        gateway: Arc<dyn SqlGateway>,
        schema: TableSchema,
        config: DataObjectConfig,
    ) -> Result<Self> {
        let dialect = gateway.dialect()?;
        Ok(Self {
            gateway,
            schema,
            dialect,
            config,
        })
    }

    /// Physical table name.
    pub fn name(&self) -> &str {
        self.schema.name()
    }

    pub fn schema(&self) -> &TableSchema {
        &self.schema
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    pub fn config(&self) -> &DataObjectConfig {
        &self.config
    }

    /// Shared engine gateway.
    pub fn gateway(&self) -> &dyn SqlGateway {
        self.gateway.as_ref()
    }

    /// Creates the table if missing.
    pub fn ensure_table(&self) -> Result<EnsureOutcome> {
        self.ensure_table_with(|_| Ok(()))
    }

    /// Creates the table if missing and runs `on_created` exactly once,
    /// right after creation.
    pub fn ensure_table_with<F>(&self, on_created: F) -> Result<EnsureOutcome>
    where
        F: FnOnce(&RecordTable) -> Result<()>,
    {
        self.schema
            .ensure_table(self.gateway(), &self.config, || {
                info!(table = %self.name(), "running table initialization");
                on_created(self)
            })
    }

    /// Inserts a record and returns the stored row.
    ///
    /// `created_at`/`created_by` are stamped when the table has them and
    /// the caller omitted them. Postgres returns the row through
    /// `RETURNING *`; MySQL re-reads it by the supplied or generated id.
    pub fn insert(&self, ctx: &OperationContext, record: Record) -> Result<Option<Record>> {
        self.schema.require_id("insert")?;

        let mut record = record;
        self.stamp_created(ctx, &mut record);
        self.schema.validate_record(&record)?;

        let mut sql = self.insert_statement(&record);
        if let Some(returning) = self.dialect.returning_clause("*") {
            sql.push_str(&returning);
            let result = self.gateway.query(&sql, &self.schema.binds(&record))?;
            return Ok(result.into_first().map(|raw| self.materialize(raw)));
        }

        self.gateway.query(&sql, &self.schema.binds(&record))?;
        let id = match record.get_i64("id") {
            Some(id) => id,
            None => self.gateway.last_insert_id()?,
        };
        self.get_by_id(id)
    }

    /// Updates the row with `id` and returns it after the update.
    ///
    /// The record may change `id` itself; the MySQL re-read then uses the
    /// new value.
    pub fn update_by_id(
        &self,
        ctx: &OperationContext,
        id: i64,
        record: Record,
    ) -> Result<Option<Record>> {
        self.schema.require_id("update_by_id")?;
        if record.is_empty() {
            return Err(DataError::InvalidArgument(format!(
                "update of {} needs at least one column",
                self.name()
            )));
        }

        let mut record = record;
        self.stamp_updated(ctx, &mut record);
        self.schema.validate_record(&record)?;

        let names = self.schema.ordered_names(&record);
        let mut sql = update_sql(self.name(), &names, &format!("id={id}"));
        let binds = self.schema.binds(&record);
        if let Some(returning) = self.dialect.returning_clause("*") {
            sql.push_str(&returning);
            let result = self.gateway.query(&sql, &binds)?;
            return Ok(result.into_first().map(|raw| self.materialize(raw)));
        }

        self.gateway.query(&sql, &binds)?;
        self.get_by_id(record.get_i64("id").unwrap_or(id))
    }

    /// Updates every row matching the condition's WHERE clause.
    ///
    /// Only `WHERE` and `PARAM` of the condition are used. Returns the
    /// number of affected rows.
    ///
    /// # Errors
    /// * `InvalidArgument` - empty record, no WHERE clause, or a condition
    ///   parameter named like a record column
    pub fn update_where(
        &self,
        ctx: &OperationContext,
        record: Record,
        condition: &Condition,
    ) -> Result<u64> {
        if record.is_empty() {
            return Err(DataError::InvalidArgument(format!(
                "update of {} needs at least one column",
                self.name()
            )));
        }
        let where_sql = self.required_where(condition, "update")?;

        let mut record = record;
        self.stamp_updated(ctx, &mut record);
        self.schema.validate_record(&record)?;
        if let Some(name) = condition.params.keys().find(|name| record.contains(name)) {
            return Err(DataError::InvalidArgument(format!(
                "condition parameter '{name}' collides with an updated column"
            )));
        }

        let names = self.schema.ordered_names(&record);
        let sql = update_sql(self.name(), &names, where_sql);
        let mut binds = self.schema.binds(&record);
        binds.extend(condition.binds());
        let result = self.gateway.query(&sql, &binds)?;
        info!(table = %self.name(), affected = result.affected, "rows updated by condition");
        Ok(result.affected)
    }

    /// Hard-deletes every row matching the condition's WHERE clause.
    ///
    /// Only `WHERE` and `PARAM` of the condition are used. Returns the
    /// number of removed rows.
    pub fn delete_where(&self, condition: &Condition) -> Result<u64> {
        let where_sql = self.required_where(condition, "delete")?;
        let sql = format!("DELETE FROM {} WHERE {where_sql}", self.name());
        let result = self.gateway.query(&sql, &condition.binds())?;
        info!(table = %self.name(), affected = result.affected, "rows deleted by condition");
        Ok(result.affected)
    }

    fn required_where<'c>(&self, condition: &'c Condition, operation: &str) -> Result<&'c str> {
        condition.where_sql().ok_or_else(|| {
            DataError::InvalidArgument(format!(
                "{operation} on {} needs a WHERE condition",
                self.name()
            ))
        })
    }

    /// Rows matching a structured condition.
    pub fn select_rows(&self, condition: &Condition) -> Result<Vec<Record>> {
        let sql = condition.render(self.name(), "*");
        let result = self.gateway.query(&sql, &condition.binds())?;
        Ok(result
            .rows
            .into_iter()
            .map(|raw| self.materialize(raw))
            .collect())
    }

    /// The single row matching a condition; none on zero or several matches.
    pub fn select_one(&self, condition: &Condition) -> Result<Option<Record>> {
        let mut rows = self.select_rows(condition)?;
        if rows.len() == 1 {
            Ok(rows.pop())
        } else {
            Ok(None)
        }
    }

    /// First row whose columns equal every given value.
    pub fn get_row_where(&self, values: &Record) -> Result<Option<Record>> {
        if values.is_empty() {
            return Err(DataError::InvalidArgument(format!(
                "lookup on {} needs at least one column",
                self.name()
            )));
        }
        self.schema.validate_record(values)?;

        let names = self.schema.ordered_names(values);
        let condition = Condition::new()
            .where_clause(equality_clause(names.iter().map(|n| (*n, *n))))
            .limit(1);
        let sql = condition.render(self.name(), "*");
        let result = self.gateway.query(&sql, &self.schema.binds(values))?;
        Ok(result.into_first().map(|raw| self.materialize(raw)))
    }

    /// Row with the given primary id.
    pub fn get_by_id(&self, id: i64) -> Result<Option<Record>> {
        self.schema.require_id("get_by_id")?;
        self.get_row_where(&Record::from([("id", id)]))
    }

    /// Hard-deletes the row with `id`. Returns whether a row was removed.
    pub fn delete_by_id(&self, id: i64) -> Result<bool> {
        self.schema.require_id("delete_by_id")?;
        let sql = format!("DELETE FROM {} WHERE id=:id", self.name());
        let result = self.gateway.query(&sql, &[id_bind(id)])?;
        Ok(result.affected > 0)
    }

    /// Deletes according to the context's policy.
    ///
    /// With `keep_inactive` set and an `is_active` column present the row
    /// is soft-deactivated, otherwise it is hard-deleted.
    pub fn delete(&self, ctx: &OperationContext, id: i64) -> Result<bool> {
        if ctx.keep_inactive && self.schema.require_active("delete").is_ok() {
            self.soft_deactivate_by_id(ctx, id, Record::new())
        } else {
            self.delete_by_id(id)
        }
    }

    pub(crate) fn insert_statement(&self, record: &Record) -> String {
        let names = self.schema.ordered_names(record);
        if names.is_empty() {
            self.dialect.default_values_insert(self.name())
        } else {
            insert_sql(self.name(), &names)
        }
    }

    /// Materializes a raw row, keeping result columns from outside the
    /// schema (joins, expressions) as returned.
    pub(crate) fn materialize(&self, raw: Record) -> Record {
        let mut row = self.schema.materialize(&raw, "");
        for (name, value) in raw {
            if !self.schema.has_column(&name) {
                row.insert(name, value);
            }
        }
        row
    }

    pub(crate) fn stamp_created(&self, ctx: &OperationContext, record: &mut Record) {
        self.stamp(ctx, record, "created_at", "created_by");
    }

    pub(crate) fn stamp_updated(&self, ctx: &OperationContext, record: &mut Record) {
        self.stamp(ctx, record, "updated_at", "updated_by");
    }

    fn stamp(&self, ctx: &OperationContext, record: &mut Record, at: &str, by: &str) {
        if self.schema.has_column(at) {
            record.insert_missing(at, ctx.timestamp());
        }
        if self.schema.has_column(by) {
            if let Some(actor) = ctx.actor.or(self.config.default_actor) {
                record.insert_missing(by, actor);
            }
        }
    }
}

impl std::fmt::Debug for RecordTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordTable")
            .field("name", &self.name())
            .field("dialect", &self.dialect)
            .field("columns", &self.schema.columns().len())
            .finish()
    }
}

/// Integer bind for the `id` placeholder.
pub(crate) fn id_bind(id: i64) -> Bind {
    Bind::new("id", Value::Integer(id), BindKind::Integer)
}
