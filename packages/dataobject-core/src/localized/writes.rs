//! Primary + per-language content writes.
//!
//! Both phases run inside one [`UnitOfWork`]. Engines without transactions
//! fall back to compensating writes: a failed insert deletes the new
//! primary row, a failed update restores the primary values it replaced.

use std::collections::HashSet;

use tracing::{debug, warn};

use crate::config::OperationContext;
use crate::error::{DataError, Result};
use crate::query::{insert_sql, update_sql, Condition};
use crate::transaction::UnitOfWork;
use crate::value::{Record, Value};

use super::entity::{integer_bind, LocalizedEntity};
use super::record::{LocalizedContent, LocalizedRecord};

impl LocalizedEntity {
    /// Inserts the primary row and one content row per language.
    ///
    /// # Errors
    /// * `InvalidArgument` - `content` is empty
    /// * `ContentWriteFailed` - a content insert failed; the primary row
    ///   was rolled back or deleted
    pub fn insert(
        &self,
        ctx: &OperationContext,
        record: Record,
        content: LocalizedContent,
    ) -> Result<Option<LocalizedRecord>> {
        self.primary.schema().require_id("insert")?;
        if content.is_empty() {
            return Err(DataError::InvalidArgument(format!(
                "insert into {} needs localized content",
                self.name()
            )));
        }
        self.validate_content(&content)?;

        let mut record = record;
        self.primary.stamp_created(ctx, &mut record);
        self.primary.schema().validate_record(&record)?;

        let work = UnitOfWork::begin(self.gateway())?;
        let id = self.insert_primary(&record)?;
        for (code, fields) in &content {
            if let Err(e) = self.insert_content(id, code, fields) {
                self.abandon_insert(work, id);
                return Err(self.content_failed(code, e));
            }
        }
        work.commit()?;

        self.get_row_where(&Record::from([("p.id", id)]))
    }

    /// Updates the primary row and upserts one content row per language.
    ///
    /// Languages absent from `content` are left untouched. The record may
    /// change the primary `id`; content rows are keyed by the new value.
    /// Returns none when no row has `id`.
    ///
    /// # Errors
    /// * `InvalidArgument` - both `record` and `content` are empty
    /// * `ContentWriteFailed` - a content write failed; the primary change
    ///   was rolled back or restored
    pub fn update_by_id(
        &self,
        ctx: &OperationContext,
        id: i64,
        record: Record,
        content: LocalizedContent,
    ) -> Result<Option<LocalizedRecord>> {
        self.primary.schema().require_id("update_by_id")?;
        let record = self.prepare_update(ctx, record, &content)?;

        let Some(current) = self.primary.get_by_id(id)? else {
            return Ok(None);
        };

        let ids = self.apply_update(&record, &content, vec![(id, current)])?;
        match ids.first() {
            Some(&new_id) => self.get_row_where(&Record::from([("p.id", new_id)])),
            None => Ok(None),
        }
    }

    /// Applies the same update to every entity matching the condition.
    ///
    /// Targets are selected over the primary/content join, so the WHERE
    /// clause may reference `p.` and `c.` columns. All targets are written
    /// in one unit of work. Returns the updated entities in match order.
    ///
    /// # Errors
    /// * `InvalidArgument` - both `record` and `content` are empty, or the
    ///   condition has no WHERE clause
    /// * `ContentWriteFailed` - a content write failed; every primary
    ///   change was rolled back or restored
    pub fn update_where(
        &self,
        ctx: &OperationContext,
        record: Record,
        content: LocalizedContent,
        condition: &Condition,
    ) -> Result<Vec<LocalizedRecord>> {
        self.primary.schema().require_id("update_where")?;
        if condition.where_sql().is_none() {
            return Err(DataError::InvalidArgument(format!(
                "update on {} needs a WHERE condition",
                self.name()
            )));
        }
        let record = self.prepare_update(ctx, record, &content)?;

        let targets = self.update_targets(&record, condition)?;
        if targets.is_empty() {
            debug!(table = %self.name(), "no entity matched the update condition");
            return Ok(Vec::new());
        }

        let ids = self.apply_update(&record, &content, targets)?;
        let mut updated = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(entity) = self.get_row_where(&Record::from([("p.id", id)]))? {
                updated.push(entity);
            }
        }
        Ok(updated)
    }

    fn prepare_update(
        &self,
        ctx: &OperationContext,
        record: Record,
        content: &LocalizedContent,
    ) -> Result<Record> {
        if record.is_empty() && content.is_empty() {
            return Err(DataError::InvalidArgument(format!(
                "update of {} needs columns or localized content",
                self.name()
            )));
        }
        self.validate_content(content)?;

        let mut record = record;
        self.primary.stamp_updated(ctx, &mut record);
        self.primary.schema().validate_record(&record)?;
        Ok(record)
    }

    /// Distinct primary ids matching `condition`, each with the current
    /// values of the columns `record` is about to overwrite.
    fn update_targets(&self, record: &Record, condition: &Condition) -> Result<Vec<(i64, Record)>> {
        let selection = std::iter::once("id")
            .chain(record.names().filter(|name| *name != "id"))
            .map(|name| format!("p.{name} as p_{name}"))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = condition.render(&self.joined_from(), &selection);
        let rows = self.gateway().query(&sql, &condition.binds())?.rows;

        let mut seen = HashSet::new();
        let mut targets = Vec::new();
        for raw in rows {
            let current = self.primary.schema().materialize(&raw, "p_");
            if let Some(id) = current.get_i64("id") {
                if seen.insert(id) {
                    targets.push((id, current));
                }
            }
        }
        Ok(targets)
    }

    /// Writes `record` and `content` to every target inside one unit of
    /// work and returns the primary ids as they are after the update.
    fn apply_update(
        &self,
        record: &Record,
        content: &LocalizedContent,
        targets: Vec<(i64, Record)>,
    ) -> Result<Vec<i64>> {
        let work = UnitOfWork::begin(self.gateway())?;
        let mut written: Vec<(i64, Record)> = Vec::with_capacity(targets.len());
        for (id, current) in targets {
            let mut new_id = id;
            if !record.is_empty() {
                if let Err(e) = self.update_primary(id, record) {
                    self.abandon_update(work, record, &written);
                    return Err(e);
                }
                new_id = record.get_i64("id").unwrap_or(id);
            }
            written.push((new_id, current));
            for (code, fields) in content {
                if let Err(e) = self.upsert_content(new_id, code, fields) {
                    self.abandon_update(work, record, &written);
                    return Err(self.content_failed(code, e));
                }
            }
        }
        work.commit()?;
        Ok(written.into_iter().map(|(id, _)| id).collect())
    }

    fn insert_primary(&self, record: &Record) -> Result<i64> {
        let mut sql = self.primary.insert_statement(record);
        let binds = self.primary.schema().binds(record);
        if let Some(returning) = self.primary.dialect().returning_clause("id") {
            sql.push_str(&returning);
            let result = self.gateway().query(&sql, &binds)?;
            return result
                .first()
                .and_then(|row| row.get_i64("id"))
                .ok_or_else(|| DataError::statement(None, "insert returned no id"));
        }

        self.gateway().query(&sql, &binds)?;
        match record.get_i64("id") {
            Some(id) => Ok(id),
            None => self.gateway().last_insert_id(),
        }
    }

    fn update_primary(&self, id: i64, record: &Record) -> Result<()> {
        let names = self.primary.schema().ordered_names(record);
        let sql = update_sql(self.name(), &names, "id=:old_id");
        let mut binds = self.primary.schema().binds(record);
        binds.push(integer_bind("old_id", id));
        self.gateway().query(&sql, &binds)?;
        Ok(())
    }

    fn insert_content(&self, parent_id: i64, code: &str, fields: &Record) -> Result<()> {
        let mut row = fields.clone();
        row.insert("parent_id", parent_id);
        row.insert("code", code);
        let names = self.content.ordered_names(&row);
        let sql = insert_sql(self.content_name(), &names);
        self.gateway().query(&sql, &self.content.binds(&row))?;
        Ok(())
    }

    fn upsert_content(&self, parent_id: i64, code: &str, fields: &Record) -> Result<()> {
        if fields.is_empty() {
            return Ok(());
        }
        let sql = format!(
            "SELECT id FROM {} WHERE parent_id=:parent_id AND code=:code LIMIT 1",
            self.content_name()
        );
        let lookup = Record::from([("parent_id", Value::Integer(parent_id)), ("code", Value::from(code))]);
        let existing = self
            .gateway()
            .query(&sql, &self.content.binds(&lookup))?
            .into_first()
            .and_then(|row| row.get_i64("id"));

        let Some(content_id) = existing else {
            return self.insert_content(parent_id, code, fields);
        };

        let names = self.content.ordered_names(fields);
        let sql = update_sql(self.content_name(), &names, "id=:id");
        let mut binds = self.content.binds(fields);
        binds.push(integer_bind("id", content_id));
        self.gateway().query(&sql, &binds)?;
        Ok(())
    }

    fn abandon_insert(&self, work: UnitOfWork<'_>, id: i64) {
        if work.is_transactional() {
            if let Err(e) = work.rollback() {
                warn!(table = %self.name(), id, error = %e, "rollback of localized insert failed");
            }
            return;
        }
        drop(work);

        let sql = format!("DELETE FROM {} WHERE id=:id", self.name());
        if let Err(e) = self.gateway().query(&sql, &[integer_bind("id", id)]) {
            warn!(table = %self.name(), id, error = %e, "compensating delete failed");
        }
    }

    /// Rolls back, or without transactions restores the primary values of
    /// every target already written, newest first.
    fn abandon_update(&self, work: UnitOfWork<'_>, record: &Record, written: &[(i64, Record)]) {
        if work.is_transactional() {
            if let Err(e) = work.rollback() {
                warn!(table = %self.name(), error = %e, "rollback of localized update failed");
            }
            return;
        }
        drop(work);
        if record.is_empty() {
            return;
        }

        for (new_id, current) in written.iter().rev() {
            let previous: Record = record
                .names()
                .map(|name| (name, current.get(name).cloned().unwrap_or(Value::Null)))
                .collect();
            if let Err(e) = self.update_primary(*new_id, &previous) {
                warn!(table = %self.name(), id = *new_id, error = %e, "restoring primary row failed");
            }
        }
    }
}
