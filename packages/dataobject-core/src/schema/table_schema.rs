//! Named, ordered column set with DDL synthesis and idempotent creation.

use tracing::{debug, info};

use crate::column::ColumnDescriptor;
use crate::config::DataObjectConfig;
use crate::dialect::Dialect;
use crate::error::{DataError, Result};
use crate::gateway::SqlGateway;
use crate::value::{Bind, Record, Value};

use super::validation;

/// Result of [`TableSchema::ensure_table`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnsureOutcome {
    /// The table was created and the creation hook ran.
    Created,
    /// The table was already there; nothing was executed.
    AlreadyExisted,
}

/// Strips every character outside `[A-Za-z0-9_-]`.
pub fn sanitize_table_name(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-')
        .collect()
}

/// Table definition: sanitized name plus columns in declaration order.
#[derive(Debug, Clone, PartialEq)]
pub struct TableSchema {
    name: String,
    columns: Vec<ColumnDescriptor>,
}

impl TableSchema {
    /// Creates a schema, sanitizing the name and validating the column set.
    ///
    /// # Errors
    /// * `InvalidTableName` - nothing is left after sanitizing
    /// * `MissingColumns` - no columns given
    /// * `DuplicateColumn` - two columns share a name
    /// * `MultiplePrimaryKeys` - more than one primary column
    pub fn new<C>(name: &str, columns: impl IntoIterator<Item = C>) -> Result<Self>
    where
        C: Into<ColumnDescriptor>,
    {
        let sanitized = sanitize_table_name(name);
        if sanitized.is_empty() {
            return Err(DataError::InvalidTableName(name.to_string()));
        }
        let columns: Vec<ColumnDescriptor> = columns.into_iter().map(Into::into).collect();
        validation::validate_columns(&sanitized, &columns)?;
        Ok(Self {
            name: sanitized,
            columns,
        })
    }

    /// Sanitized table name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Columns in declaration order.
    pub fn columns(&self) -> &[ColumnDescriptor] {
        &self.columns
    }

    /// Column by name.
    pub fn column(&self, name: &str) -> Result<&ColumnDescriptor> {
        self.find(name).ok_or_else(|| DataError::UnknownColumn {
            table: self.name.clone(),
            column: name.to_string(),
        })
    }

    /// Column by name, if defined.
    pub fn find(&self, name: &str) -> Option<&ColumnDescriptor> {
        self.columns.iter().find(|c| c.name() == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.find(name).is_some()
    }

    /// The primary key column, if any.
    pub fn primary_column(&self) -> Option<&ColumnDescriptor> {
        self.columns.iter().find(|c| c.is_primary())
    }

    /// Columns carrying a UNIQUE constraint (primary excluded).
    pub fn unique_columns(&self) -> impl Iterator<Item = &ColumnDescriptor> {
        self.columns.iter().filter(|c| c.is_unique() && !c.is_primary())
    }

    /// Requires the primary integer `id` column for `operation`.
    pub fn require_id(&self, operation: &'static str) -> Result<&ColumnDescriptor> {
        validation::require_id(&self.name, &self.columns, operation)
    }

    /// Requires the integer `is_active` column for `operation`.
    pub fn require_active(&self, operation: &'static str) -> Result<&ColumnDescriptor> {
        validation::require_active(&self.name, &self.columns, operation)
    }

    /// Rejects record keys this table doesn't define.
    pub fn validate_record(&self, record: &Record) -> Result<()> {
        validation::validate_record(&self.name, &self.columns, record)
    }

    /// Record column names in declaration order.
    pub fn ordered_names<'a>(&'a self, record: &Record) -> Vec<&'a str> {
        self.columns
            .iter()
            .map(ColumnDescriptor::name)
            .filter(|name| record.contains(name))
            .collect()
    }

    /// Binds for every record value, typed by the owning column.
    ///
    /// Records must be validated first; unknown keys are skipped.
    pub fn binds(&self, record: &Record) -> Vec<Bind> {
        self.columns
            .iter()
            .filter_map(|column| {
                record
                    .get(column.name())
                    .map(|value| Bind::new(column.name(), value.clone(), column.bind_kind()))
            })
            .collect()
    }

    /// Renders `CREATE TABLE` for the dialect.
    ///
    /// Non-primary unique columns get table-level `UNIQUE (col)`
    /// constraints. On MySQL, `collation` and `auto_increment_start`
    /// become table options; the start is only emitted when some column
    /// is auto-increment.
    pub fn create_table_sql(
        &self,
        dialect: Dialect,
        quote: &dyn Fn(&str) -> String,
        collation: Option<&str>,
        auto_increment_start: u64,
    ) -> Result<String> {
        let mut definitions = Vec::with_capacity(self.columns.len());
        for column in &self.columns {
            definitions.push(column.ddl_fragment(dialect, quote)?);
        }
        for column in self.unique_columns() {
            definitions.push(format!("UNIQUE ({})", column.name()));
        }

        let auto_start = self
            .columns
            .iter()
            .any(ColumnDescriptor::is_auto_increment)
            .then_some(auto_increment_start);

        Ok(format!(
            "CREATE TABLE {} ({}){}",
            self.name,
            definitions.join(", "),
            dialect.table_options(collation, auto_start)
        ))
    }

    /// Executes `CREATE TABLE` without checking existence.
    ///
    /// Engine failures surface as `TableCreationFailed`.
    pub fn create_table(
        &self,
        gateway: &dyn SqlGateway,
        config: &DataObjectConfig,
    ) -> Result<()> {
        let dialect = gateway.dialect()?;
        let collation = match &config.collation {
            Some(collation) => Some(collation.clone()),
            None => gateway.collation()?,
        };
        let quote = |value: &str| gateway.quote(value);
        let sql = self.create_table_sql(
            dialect,
            &quote,
            collation.as_deref(),
            config.auto_increment_start,
        )?;

        debug!(table = %self.name, sql = %sql, "creating table");
        gateway.exec(&sql).map_err(|e| self.creation_failed(e))?;
        info!(table = %self.name, driver = dialect.driver_name(), "table created");
        Ok(())
    }

    /// Creates the table if it is missing, then runs `on_created`.
    ///
    /// An existing table is left untouched and the hook doesn't run.
    pub fn ensure_table<F>(
        &self,
        gateway: &dyn SqlGateway,
        config: &DataObjectConfig,
        on_created: F,
    ) -> Result<EnsureOutcome>
    where
        F: FnOnce() -> Result<()>,
    {
        if gateway.table_exists(&self.name)? {
            debug!(table = %self.name, "table already exists");
            return Ok(EnsureOutcome::AlreadyExisted);
        }
        self.create_table(gateway, config)?;
        on_created()?;
        Ok(EnsureOutcome::Created)
    }

    /// Wraps an engine error raised while defining this table.
    pub(crate) fn creation_failed(&self, error: DataError) -> DataError {
        let (code, message) = error.into_code_and_message();
        DataError::TableCreationFailed {
            table: self.name.clone(),
            code,
            message,
        }
    }

    /// Materializes a raw row.
    ///
    /// Every column is read from `<prefix><name>`; missing ones take the
    /// column default (or NULL) and values are coerced by type class.
    /// Keys outside the schema are dropped.
    pub fn materialize(&self, raw: &Record, prefix: &str) -> Record {
        self.columns
            .iter()
            .map(|column| {
                let value = match raw.get(&format!("{prefix}{}", column.name())) {
                    Some(value) => column.coerce(value.clone()),
                    None => column.default_value().cloned().unwrap_or(Value::Null),
                };
                (column.name().to_string(), value)
            })
            .collect()
    }
}
