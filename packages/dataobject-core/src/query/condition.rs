//! Structured SELECT condition.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::value::{Bind, Value};

/// Clause set rendered into one parameterized SELECT.
///
/// Serialized keys are the SQL clause names (`WHERE`, `ORDER BY`, `PARAM`, ...).
/// Rendering order is fixed: JOIN family, WHERE, GROUP BY, HAVING,
/// ORDER BY, LIMIT, OFFSET.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    #[serde(rename = "JOIN", default, skip_serializing_if = "Option::is_none")]
    pub join: Option<String>,
    #[serde(rename = "CROSS JOIN", default, skip_serializing_if = "Option::is_none")]
    pub cross_join: Option<String>,
    #[serde(rename = "INNER JOIN", default, skip_serializing_if = "Option::is_none")]
    pub inner_join: Option<String>,
    #[serde(rename = "LEFT JOIN", default, skip_serializing_if = "Option::is_none")]
    pub left_join: Option<String>,
    #[serde(rename = "RIGHT JOIN", default, skip_serializing_if = "Option::is_none")]
    pub right_join: Option<String>,
    #[serde(rename = "WHERE", default, skip_serializing_if = "Option::is_none")]
    pub where_clause: Option<String>,
    #[serde(rename = "GROUP BY", default, skip_serializing_if = "Option::is_none")]
    pub group_by: Option<String>,
    #[serde(rename = "HAVING", default, skip_serializing_if = "Option::is_none")]
    pub having: Option<String>,
    #[serde(rename = "ORDER BY", default, skip_serializing_if = "Option::is_none")]
    pub order_by: Option<String>,
    #[serde(rename = "LIMIT", default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u64>,
    #[serde(rename = "OFFSET", default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<u64>,
    /// Named parameters, keyed without the leading colon
    #[serde(rename = "PARAM", default, skip_serializing_if = "BTreeMap::is_empty")]
    pub params: BTreeMap<String, Value>,
}

impl Condition {
    /// Empty condition (selects everything).
    pub fn new() -> Self {
        Self::default()
    }

    pub fn join(mut self, clause: impl Into<String>) -> Self {
        self.join = Some(clause.into());
        self
    }

    pub fn cross_join(mut self, clause: impl Into<String>) -> Self {
        self.cross_join = Some(clause.into());
        self
    }

    pub fn inner_join(mut self, clause: impl Into<String>) -> Self {
        self.inner_join = Some(clause.into());
        self
    }

    pub fn left_join(mut self, clause: impl Into<String>) -> Self {
        self.left_join = Some(clause.into());
        self
    }

    pub fn right_join(mut self, clause: impl Into<String>) -> Self {
        self.right_join = Some(clause.into());
        self
    }

    /// Replaces the WHERE clause.
    pub fn where_clause(mut self, clause: impl Into<String>) -> Self {
        self.where_clause = Some(clause.into());
        self
    }

    /// Appends to the WHERE clause with AND.
    pub fn and_where(mut self, clause: impl Into<String>) -> Self {
        let clause = clause.into();
        self.where_clause = Some(match self.where_clause.take() {
            Some(existing) if !existing.trim().is_empty() => format!("({existing}) AND {clause}"),
            _ => clause,
        });
        self
    }

    pub fn group_by(mut self, clause: impl Into<String>) -> Self {
        self.group_by = Some(clause.into());
        self
    }

    pub fn having(mut self, clause: impl Into<String>) -> Self {
        self.having = Some(clause.into());
        self
    }

    pub fn order_by(mut self, clause: impl Into<String>) -> Self {
        self.order_by = Some(clause.into());
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Binds a named parameter. A leading `:` is accepted and stripped.
    pub fn param(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.params
            .insert(name.trim_start_matches(':').to_string(), value.into());
        self
    }

    /// True when no clause and no parameter is set.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// The WHERE clause, when it holds anything besides whitespace.
    pub fn where_sql(&self) -> Option<&str> {
        self.where_clause
            .as_deref()
            .map(str::trim)
            .filter(|clause| !clause.is_empty())
    }

    /// Parameters as statement binds, kinds inferred from values.
    pub fn binds(&self) -> Vec<Bind> {
        self.params
            .iter()
            .map(|(name, value)| Bind::inferred(name.clone(), value.clone()))
            .collect()
    }

    /// Renders `SELECT <selection> FROM <from>` followed by the clauses.
    pub fn render(&self, from: &str, selection: &str) -> String {
        let mut sql = format!("SELECT {selection} FROM {from}");
        let clauses: [(&str, Option<String>); 11] = [
            ("JOIN", self.join.clone()),
            ("CROSS JOIN", self.cross_join.clone()),
            ("INNER JOIN", self.inner_join.clone()),
            ("LEFT JOIN", self.left_join.clone()),
            ("RIGHT JOIN", self.right_join.clone()),
            ("WHERE", self.where_clause.clone()),
            ("GROUP BY", self.group_by.clone()),
            ("HAVING", self.having.clone()),
            ("ORDER BY", self.order_by.clone()),
            ("LIMIT", self.limit.map(|n| n.to_string())),
            ("OFFSET", self.offset.map(|n| n.to_string())),
        ];
        for (keyword, clause) in clauses {
            if let Some(clause) = clause.filter(|c| !c.trim().is_empty()) {
                sql.push(' ');
                sql.push_str(keyword);
                sql.push(' ');
                sql.push_str(&clause);
            }
        }
        sql
    }
}
