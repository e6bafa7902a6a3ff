//! SQL engine capability consumed by the table engines.
//!
//! The engine connection is owned by the caller and injected once; the
//! engines never open or close it.

mod recording;

pub use recording::{ExecutedStatement, RecordingGateway};

use crate::dialect::Dialect;
use crate::error::Result;
use crate::value::{Bind, Record, Value};

/// Prepared statement handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    sql: String,
}

impl Statement {
    /// Wraps rendered SQL.
    pub fn new(sql: impl Into<String>) -> Self {
        Self { sql: sql.into() }
    }

    /// Rendered SQL text.
    pub fn sql(&self) -> &str {
        &self.sql
    }
}

/// Rows returned by a statement, plus the affected-row count.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryResult {
    /// Raw rows, keyed by result column name
    pub rows: Vec<Record>,
    /// Rows affected by a write
    pub affected: u64,
}

impl QueryResult {
    /// Result carrying rows.
    pub fn with_rows(rows: Vec<Record>) -> Self {
        let affected = rows.len() as u64;
        Self { rows, affected }
    }

    /// Result of a write touching `affected` rows.
    pub fn with_affected(affected: u64) -> Self {
        Self {
            rows: Vec::new(),
            affected,
        }
    }

    /// Number of rows returned.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// First row, if any.
    pub fn first(&self) -> Option<&Record> {
        self.rows.first()
    }

    /// Consumes the result, returning the first row.
    pub fn into_first(self) -> Option<Record> {
        self.rows.into_iter().next()
    }
}

/// Capability over the underlying SQL engine.
///
/// Implementations report engine failures as `DataError::Statement`
/// carrying the engine's code and message.
pub trait SqlGateway {
    /// Driver name, `mysql` or `pgsql`.
    fn driver_name(&self) -> &str;

    /// Prepares SQL with `:name` placeholders.
    fn prepare(&self, sql: &str) -> Result<Statement>;

    /// Executes a prepared statement with named binds.
    fn execute(&self, statement: &Statement, binds: &[Bind]) -> Result<QueryResult>;

    /// Executes a statement without binds (DDL, session settings).
    fn exec(&self, sql: &str) -> Result<u64>;

    /// Escapes a string into a SQL literal, quotes included.
    fn quote(&self, value: &str) -> String;

    /// Identifier generated by the last INSERT on this session.
    fn last_insert_id(&self) -> Result<i64>;

    /// Opens a transaction. Returns `Ok(false)` when the engine has none.
    fn begin(&self) -> Result<bool>;

    /// Commits the open transaction.
    fn commit(&self) -> Result<()>;

    /// Rolls back the open transaction.
    fn rollback(&self) -> Result<()>;

    /// Dialect selected from the driver name.
    fn dialect(&self) -> Result<Dialect> {
        Dialect::from_driver_name(self.driver_name())
    }

    /// Prepares and executes in one step.
    fn query(&self, sql: &str, binds: &[Bind]) -> Result<QueryResult> {
        tracing::debug!(sql, binds = binds.len(), "executing statement");
        let statement = self.prepare(sql)?;
        self.execute(&statement, binds)
    }

    /// Whether a physical table exists.
    fn table_exists(&self, name: &str) -> Result<bool> {
        let sql = self.dialect()?.table_exists_sql(&self.quote(name));
        Ok(self.query(&sql, &[])?.row_count() > 0)
    }

    /// Enables or disables foreign key enforcement for the session.
    fn set_foreign_key_checks(&self, enable: bool) -> Result<()> {
        let sql = self.dialect()?.foreign_key_toggle(enable);
        self.exec(&sql).map(|_| ())
    }

    /// Connection collation, where the dialect has one.
    fn collation(&self) -> Result<Option<String>> {
        let Some(sql) = self.dialect()?.collation_sql() else {
            return Ok(None);
        };
        let result = self.query(sql, &[])?;
        Ok(result
            .into_first()
            .and_then(|row| row.into_iter().next())
            .and_then(|(_, value)| match value {
                Value::Null => None,
                other => Some(other.to_string()),
            }))
    }
}
