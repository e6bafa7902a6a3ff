//! Engine-free gateway that records statements and replays scripted results.
//!
//! Used for DDL dry runs and as the test double for the table engines.

use std::collections::{BTreeSet, VecDeque};
use std::sync::{Mutex, MutexGuard};

use crate::error::{DataError, Result};
use crate::value::{Bind, Value};

use super::{QueryResult, SqlGateway, Statement};

/// Statement recorded by [`RecordingGateway`].
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutedStatement {
    /// SQL text as executed
    pub sql: String,
    /// Binds supplied with it
    pub binds: Vec<Bind>,
}

impl ExecutedStatement {
    /// Value bound for a placeholder name (without colon).
    pub fn bind(&self, name: &str) -> Option<&Value> {
        self.binds.iter().find(|b| b.name == name).map(|b| &b.value)
    }
}

#[derive(Debug, Clone)]
enum Scripted {
    Result(QueryResult),
    Failure { code: Option<i64>, message: String },
}

#[derive(Debug, Default)]
struct RecordingState {
    tables: BTreeSet<String>,
    executed: Vec<ExecutedStatement>,
    scripted: VecDeque<Scripted>,
    insert_ids: VecDeque<i64>,
    last_insert_id: i64,
    auto_counter: i64,
    collation: Option<String>,
}

/// Gateway that records every statement instead of talking to an engine.
///
/// Scripted results are consumed in order by `execute`/`exec`; when none is
/// queued, reads return no rows and writes report one affected row.
/// `CREATE TABLE` statements register the table so `table_exists` answers
/// like an engine would.
#[derive(Debug)]
pub struct RecordingGateway {
    driver: String,
    transactions: bool,
    state: Mutex<RecordingState>,
}

impl RecordingGateway {
    /// Creates a recorder reporting the given driver name.
    pub fn new(driver: impl Into<String>) -> Self {
        Self {
            driver: driver.into(),
            transactions: true,
            state: Mutex::new(RecordingState::default()),
        }
    }

    /// Recorder for the MySQL dialect.
    pub fn mysql() -> Self {
        Self::new("mysql")
    }

    /// Recorder for the Postgres dialect.
    pub fn postgres() -> Self {
        Self::new("pgsql")
    }

    /// Reports no transaction support from `begin`.
    pub fn without_transactions(mut self) -> Self {
        self.transactions = false;
        self
    }

    /// Marks a table as already existing.
    pub fn with_table(self, name: &str) -> Self {
        if let Ok(mut state) = self.state.lock() {
            state.tables.insert(name.to_string());
        }
        self
    }

    /// Sets the collation reported for MySQL connections.
    pub fn with_collation(self, collation: &str) -> Self {
        if let Ok(mut state) = self.state.lock() {
            state.collation = Some(collation.to_string());
        }
        self
    }

    fn state(&self) -> Result<MutexGuard<'_, RecordingState>> {
        self.state.lock().map_err(|_| DataError::LockPoisoned)
    }

    /// Queues a result for the next statement.
    pub fn push_result(&self, result: QueryResult) -> Result<()> {
        self.state()?.scripted.push_back(Scripted::Result(result));
        Ok(())
    }

    /// Queues rows for the next statement.
    pub fn push_rows(&self, rows: Vec<crate::value::Record>) -> Result<()> {
        self.push_result(QueryResult::with_rows(rows))
    }

    /// Queues an engine failure for the next statement.
    pub fn push_failure(&self, code: Option<i64>, message: &str) -> Result<()> {
        self.state()?.scripted.push_back(Scripted::Failure {
            code,
            message: message.to_string(),
        });
        Ok(())
    }

    /// Queues the id handed out by the next INSERT.
    pub fn push_insert_id(&self, id: i64) -> Result<()> {
        self.state()?.insert_ids.push_back(id);
        Ok(())
    }

    /// Every statement recorded so far.
    pub fn executed(&self) -> Result<Vec<ExecutedStatement>> {
        Ok(self.state()?.executed.clone())
    }

    /// SQL text of every statement recorded so far.
    pub fn statements(&self) -> Result<Vec<String>> {
        Ok(self.state()?.executed.iter().map(|s| s.sql.clone()).collect())
    }

    /// Forgets recorded statements, keeping tables and scripts.
    pub fn clear_log(&self) -> Result<()> {
        self.state()?.executed.clear();
        Ok(())
    }

    /// Whether a table was created or registered.
    pub fn has_table(&self, name: &str) -> Result<bool> {
        Ok(self.state()?.tables.contains(name))
    }

    /// Number of scripted results not consumed yet.
    pub fn pending_scripts(&self) -> Result<usize> {
        Ok(self.state()?.scripted.len())
    }

    fn record(&self, sql: &str, binds: &[Bind]) -> Result<QueryResult> {
        let mut state = self.state()?;
        tracing::debug!(sql, binds = binds.len(), "recorded statement");
        state.executed.push(ExecutedStatement {
            sql: sql.to_string(),
            binds: binds.to_vec(),
        });

        let result = match state.scripted.pop_front() {
            Some(Scripted::Failure { code, message }) => {
                return Err(DataError::statement(code, message));
            }
            Some(Scripted::Result(result)) => result,
            None if is_read(sql) => QueryResult::default(),
            None => QueryResult::with_affected(1),
        };

        if starts_with_keyword(sql, "INSERT") {
            state.last_insert_id = match state.insert_ids.pop_front() {
                Some(id) => id,
                None => {
                    state.auto_counter += 1;
                    state.auto_counter
                }
            };
        }
        if let Some(table) = created_table_name(sql) {
            state.tables.insert(table);
        }

        Ok(result)
    }
}

impl SqlGateway for RecordingGateway {
    fn driver_name(&self) -> &str {
        &self.driver
    }

    fn prepare(&self, sql: &str) -> Result<Statement> {
        Ok(Statement::new(sql))
    }

    fn execute(&self, statement: &Statement, binds: &[Bind]) -> Result<QueryResult> {
        self.record(statement.sql(), binds)
    }

    fn exec(&self, sql: &str) -> Result<u64> {
        self.record(sql, &[]).map(|r| r.affected)
    }

    fn quote(&self, value: &str) -> String {
        format!("'{}'", value.replace('\'', "''"))
    }

    fn last_insert_id(&self) -> Result<i64> {
        Ok(self.state()?.last_insert_id)
    }

    fn begin(&self) -> Result<bool> {
        if !self.transactions {
            return Ok(false);
        }
        self.record("BEGIN", &[])?;
        Ok(true)
    }

    fn commit(&self) -> Result<()> {
        self.record("COMMIT", &[]).map(|_| ())
    }

    fn rollback(&self) -> Result<()> {
        self.record("ROLLBACK", &[]).map(|_| ())
    }

    fn table_exists(&self, name: &str) -> Result<bool> {
        self.has_table(name)
    }

    fn collation(&self) -> Result<Option<String>> {
        if self.dialect()?.collation_sql().is_none() {
            return Ok(None);
        }
        Ok(self.state()?.collation.clone())
    }
}

fn starts_with_keyword(sql: &str, keyword: &str) -> bool {
    sql.trim_start()
        .get(..keyword.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(keyword))
}

fn is_read(sql: &str) -> bool {
    starts_with_keyword(sql, "SELECT") || starts_with_keyword(sql, "SHOW")
}

fn created_table_name(sql: &str) -> Option<String> {
    if !starts_with_keyword(sql, "CREATE TABLE") {
        return None;
    }
    let rest = sql.trim_start()["CREATE TABLE".len()..].trim_start();
    let name: String = rest
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-')
        .collect();
    (!name.is_empty()).then_some(name)
}
