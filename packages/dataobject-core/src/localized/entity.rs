//! Paired primary/content tables for one localized entity.

use std::sync::Arc;

use tracing::{debug, info};

use crate::column::{ColumnBuilder, ColumnDescriptor};
use crate::config::{DataObjectConfig, OperationContext};
use crate::error::{DataError, Result};
use crate::gateway::SqlGateway;
use crate::query::Condition;
use crate::schema::{EnsureOutcome, TableSchema};
use crate::table::RecordTable;
use crate::value::{Bind, BindKind, Record, Value};

use super::fold::{fold_rows, STRUCTURAL_COLUMNS};
use super::record::{LocalizedContent, LocalizedRecord};

/// Entity split across a primary table and a per-language content table.
///
/// The content table is `<name><content_suffix>` with columns `id`,
/// `parent_id` (referencing the primary `id`, cascading), `code`, then the
/// caller's localized columns.
#[derive(Debug)]
pub struct LocalizedEntity {
    pub(super) primary: RecordTable,
    pub(super) content: TableSchema,
}

impl LocalizedEntity {
    /// Defines the entity with the default configuration.
    pub fn new<P, C>(
        gateway: Arc<dyn SqlGateway>,
        name: &str,
        columns: impl IntoIterator<Item = P>,
        content_columns: impl IntoIterator<Item = C>,
    ) -> Result<Self>
    where
        P: Into<ColumnDescriptor>,
        C: Into<ColumnDescriptor>,
    {
        Self::with_config(
            gateway,
            name,
            columns,
            content_columns,
            DataObjectConfig::default(),
        )
    }

    /// Defines the entity with an explicit configuration.
    ///
    /// # Errors
    /// * `MissingIdColumn` - the primary columns lack an integer primary `id`
    /// * `ReservedContentColumn` - a content column is named id, parent_id or code
    /// * `UniqueContentColumn` - a content column is marked unique
    pub fn with_config<P, C>(
        gateway: Arc<dyn SqlGateway>,
        name: &str,
        columns: impl IntoIterator<Item = P>,
        content_columns: impl IntoIterator<Item = C>,
        config: DataObjectConfig,
    ) -> Result<Self>
    where
        P: Into<ColumnDescriptor>,
        C: Into<ColumnDescriptor>,
    {
        let primary_schema = TableSchema::new(name, columns)?;
        let id = primary_schema.require_id("localized entity")?.clone();
        let content_name = format!("{}{}", primary_schema.name(), config.content_suffix);

        let mut content = content_structure(&id, config.code_length);
        let mut caller_columns = 0;
        for column in content_columns {
            let column: ColumnDescriptor = column.into();
            if STRUCTURAL_COLUMNS.contains(&column.name()) {
                return Err(DataError::ReservedContentColumn {
                    table: content_name,
                    column: column.name().to_string(),
                });
            }
            if column.is_unique() {
                return Err(DataError::UniqueContentColumn {
                    table: content_name,
                    column: column.name().to_string(),
                });
            }
            content.push(column);
            caller_columns += 1;
        }
        if caller_columns == 0 {
            return Err(DataError::MissingColumns {
                table: content_name,
            });
        }

        let content = TableSchema::new(&content_name, content)?;
        let primary = RecordTable::with_config(gateway, primary_schema, config)?;
        Ok(Self { primary, content })
    }

    /// Primary table name.
    pub fn name(&self) -> &str {
        self.primary.name()
    }

    /// Content table name.
    pub fn content_name(&self) -> &str {
        self.content.name()
    }

    /// Engine over the primary table.
    pub fn primary(&self) -> &RecordTable {
        &self.primary
    }

    pub fn content_schema(&self) -> &TableSchema {
        &self.content
    }

    pub(super) fn gateway(&self) -> &dyn SqlGateway {
        self.primary.gateway()
    }

    pub(super) fn config(&self) -> &DataObjectConfig {
        self.primary.config()
    }

    /// Creates whichever of the two tables is missing.
    pub fn ensure_table(&self) -> Result<EnsureOutcome> {
        self.ensure_table_with(|_| Ok(()))
    }

    /// Creates missing tables; runs `on_created` once, when the primary
    /// table is created.
    ///
    /// The content table gets its foreign key to the primary table only
    /// when it is created here.
    pub fn ensure_table_with<F>(&self, on_created: F) -> Result<EnsureOutcome>
    where
        F: FnOnce(&LocalizedEntity) -> Result<()>,
    {
        let gateway = self.gateway();
        let primary_created = if gateway.table_exists(self.name())? {
            false
        } else {
            self.primary.schema().create_table(gateway, self.config())?;
            true
        };

        let content_created = if gateway.table_exists(self.content_name())? {
            false
        } else {
            self.content.create_table(gateway, self.config())?;
            let sql = format!(
                "ALTER TABLE {} ADD FOREIGN KEY (parent_id) REFERENCES {}(id) \
                 ON DELETE CASCADE ON UPDATE CASCADE",
                self.content_name(),
                self.name()
            );
            gateway
                .exec(&sql)
                .map_err(|e| self.content.creation_failed(e))?;
            true
        };

        if primary_created {
            info!(table = %self.name(), "running table initialization");
            on_created(self)?;
        }
        if primary_created || content_created {
            Ok(EnsureOutcome::Created)
        } else {
            debug!(table = %self.name(), "localized tables already exist");
            Ok(EnsureOutcome::AlreadyExisted)
        }
    }

    /// Column list aliasing every column as `p_<name>` / `c_<name>`.
    pub fn selection(&self) -> String {
        let primary = self
            .primary
            .schema()
            .columns()
            .iter()
            .map(|c| format!("p.{0} as p_{0}", c.name()));
        let content = self
            .content
            .columns()
            .iter()
            .map(|c| format!("c.{0} as c_{0}", c.name()));
        primary.chain(content).collect::<Vec<_>>().join(", ")
    }

    pub(super) fn joined_from(&self) -> String {
        format!(
            "{} p INNER JOIN {} c ON p.id=c.parent_id",
            self.name(),
            self.content_name()
        )
    }

    /// Raw joined rows matching a condition, aliased as in [`selection`].
    ///
    /// [`selection`]: LocalizedEntity::selection
    pub fn select(&self, condition: &Condition) -> Result<Vec<Record>> {
        self.select_with_binds(condition, &condition.binds())
    }

    fn select_with_binds(&self, condition: &Condition, binds: &[Bind]) -> Result<Vec<Record>> {
        let sql = condition.render(&self.joined_from(), &self.selection());
        Ok(self.gateway().query(&sql, binds)?.rows)
    }

    /// Localized records matching a condition.
    ///
    /// An empty condition lists active entities ordered by primary id.
    pub fn get_rows(&self, condition: &Condition) -> Result<Vec<LocalizedRecord>> {
        let condition = if condition.is_empty() {
            self.default_condition()
        } else {
            condition.clone()
        };
        let rows = self.select(&condition)?;
        Ok(fold_rows(self.primary.schema(), &self.content, rows))
    }

    /// The single entity matching a condition; none on zero or several.
    pub fn get_row(&self, condition: &Condition) -> Result<Option<LocalizedRecord>> {
        let rows = self.select(condition)?;
        Ok(single(fold_rows(self.primary.schema(), &self.content, rows)))
    }

    /// The single entity whose columns equal every given value.
    ///
    /// Keys name `p.<column>` or `c.<column>`; a bare name means the
    /// primary table.
    pub fn get_row_where(&self, values: &Record) -> Result<Option<LocalizedRecord>> {
        if values.is_empty() {
            return Err(DataError::InvalidArgument(format!(
                "lookup on {} needs at least one column",
                self.name()
            )));
        }

        let mut clauses = Vec::with_capacity(values.len());
        let mut binds = Vec::with_capacity(values.len());
        for (index, (key, value)) in values.iter().enumerate() {
            let (qualified, kind) = self.qualify(key)?;
            let placeholder = format!("w{}", index + 1);
            clauses.push(format!("{qualified}=:{placeholder}"));
            binds.push(Bind::new(placeholder, value.clone(), kind));
        }

        let condition = Condition::new().where_clause(clauses.join(" AND "));
        let rows = self.select_with_binds(&condition, &binds)?;
        Ok(single(fold_rows(self.primary.schema(), &self.content, rows)))
    }

    /// Active entity by id, optionally narrowed to one language.
    pub fn get_by_id(&self, id: i64, code: Option<&str>) -> Result<Option<LocalizedRecord>> {
        let mut clauses = vec!["p.id=:id"];
        let mut condition = Condition::new().param("id", id);
        if self.primary.schema().require_active("get_by_id").is_ok() {
            clauses.push("p.is_active=1");
        }
        if let Some(code) = code {
            clauses.push("c.code=:code");
            condition = condition.param("code", code);
        }
        self.get_row(&condition.where_clause(clauses.join(" AND ")))
    }

    /// Hard-deletes the entity; content rows follow through the cascade.
    pub fn delete_by_id(&self, id: i64) -> Result<bool> {
        self.primary.delete_by_id(id)
    }

    /// Soft-deactivates the primary row.
    pub fn soft_deactivate_by_id(
        &self,
        ctx: &OperationContext,
        id: i64,
        extra: Record,
    ) -> Result<bool> {
        self.primary.soft_deactivate_by_id(ctx, id, extra)
    }

    /// Deletes according to the context's keep-inactive policy.
    pub fn delete(&self, ctx: &OperationContext, id: i64) -> Result<bool> {
        self.primary.delete(ctx, id)
    }

    fn default_condition(&self) -> Condition {
        let condition = Condition::new().order_by("p.id");
        if self.primary.schema().require_active("get_rows").is_ok() {
            condition.where_clause("p.is_active=1")
        } else {
            condition
        }
    }

    fn qualify(&self, key: &str) -> Result<(String, BindKind)> {
        let (schema, alias, column) = match key.split_once('.') {
            Some(("p", column)) => (self.primary.schema(), "p", column),
            Some(("c", column)) => (&self.content, "c", column),
            Some(_) => {
                return Err(DataError::InvalidArgument(format!(
                    "lookup key '{key}' must use the p. or c. alias"
                )))
            }
            None => (self.primary.schema(), "p", key),
        };
        let kind = schema.column(column)?.bind_kind();
        Ok((format!("{alias}.{column}"), kind))
    }

    /// Rejects content keyed by an empty language code or carrying
    /// structural or unknown columns.
    pub(super) fn validate_content(&self, content: &LocalizedContent) -> Result<()> {
        for (code, fields) in content {
            if code.is_empty() || code.chars().count() > self.config().code_length as usize {
                return Err(DataError::InvalidArgument(format!(
                    "language code '{code}' must be 1 to {} characters",
                    self.config().code_length
                )));
            }
            if let Some(column) = fields.names().find(|n| STRUCTURAL_COLUMNS.contains(n)) {
                return Err(DataError::ReservedContentColumn {
                    table: self.content_name().to_string(),
                    column: column.to_string(),
                });
            }
            self.content.validate_record(fields)?;
        }
        Ok(())
    }

    /// Wraps a failed content write.
    pub(super) fn content_failed(&self, language: &str, error: DataError) -> DataError {
        let (code, message) = error.into_code_and_message();
        DataError::ContentWriteFailed {
            table: self.content_name().to_string(),
            language: language.to_string(),
            code,
            message,
        }
    }
}

/// Structural content columns keyed to the primary `id`.
fn content_structure(id: &ColumnDescriptor, code_length: u32) -> Vec<ColumnDescriptor> {
    let mut own_id = ColumnBuilder::new("id", id.column_type().clone()).primary();
    let mut parent_id = ColumnBuilder::new("parent_id", id.column_type().clone())
        .not_null()
        .auto(false);
    if let Some(length) = id.length() {
        own_id = own_id.length(length);
        parent_id = parent_id.length(length);
    }
    let code = ColumnBuilder::new("code", "varchar")
        .length(code_length)
        .not_null();
    vec![own_id.build(), parent_id.build(), code.build()]
}

fn single(mut records: Vec<LocalizedRecord>) -> Option<LocalizedRecord> {
    if records.len() == 1 {
        records.pop()
    } else {
        None
    }
}

/// Bind for a `:name` placeholder holding a row id.
pub(super) fn integer_bind(name: &str, id: i64) -> Bind {
    Bind::new(name, Value::Integer(id), BindKind::Integer)
}
