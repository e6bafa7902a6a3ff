//! Shared fixtures for the integration suite.

use std::sync::Arc;

use chrono::NaiveDate;

use dataobject_core::{
    ColumnBuilder, LocalizedContent, LocalizedEntity, OperationContext, QueryResult, Record,
    RecordTable, RecordingGateway, TableSchema, Value,
};

/// Context acting as account 1 at a fixed instant.
pub fn fixed_ctx() -> OperationContext {
    let now = NaiveDate::from_ymd_opt(2024, 5, 1)
        .unwrap()
        .and_hms_opt(12, 30, 0)
        .unwrap();
    OperationContext::with_actor(1).at(now)
}

/// Queues `count` successful writes.
pub fn push_ok(gateway: &RecordingGateway, count: usize) {
    for _ in 0..count {
        gateway.push_result(QueryResult::with_affected(1)).unwrap();
    }
}

/// Accounts table with a unique username and audit columns.
pub fn accounts(gateway: &Arc<RecordingGateway>) -> RecordTable {
    let schema = TableSchema::new(
        "accounts",
        [
            ColumnBuilder::new("id", "bigint").length(8).primary(),
            ColumnBuilder::new("username", "varchar").length(65).unique().not_null(),
            ColumnBuilder::new("email", "varchar").length(128),
            ColumnBuilder::new("balance", "decimal").precision(10, 2).default(0),
            ColumnBuilder::new("is_active", "tinyint").length(1).default(1),
            ColumnBuilder::new("created_at", "datetime"),
            ColumnBuilder::new("created_by", "bigint"),
            ColumnBuilder::new("updated_at", "datetime"),
            ColumnBuilder::new("updated_by", "bigint"),
        ],
    )
    .unwrap();
    RecordTable::new(gateway.clone(), schema).unwrap()
}

/// Keyword entity with localized titles.
pub fn keywords(gateway: &Arc<RecordingGateway>) -> LocalizedEntity {
    LocalizedEntity::new(
        gateway.clone(),
        "keywords",
        [
            ColumnBuilder::new("id", "bigint").length(8).primary(),
            ColumnBuilder::new("keyword", "varchar").length(128).unique(),
            ColumnBuilder::new("is_active", "tinyint").length(1).default(1),
        ],
        [ColumnBuilder::new("title", "varchar").length(255)],
    )
    .unwrap()
}

/// `language -> {title}` content.
pub fn titles(pairs: &[(&str, &str)]) -> LocalizedContent {
    pairs
        .iter()
        .map(|(code, title)| (code.to_string(), Record::from([("title", *title)])))
        .collect()
}

/// Joined keyword row as the engine returns it.
pub fn joined_keyword(id: i64, keyword: &str, code: &str, title: &str) -> Record {
    Record::from([
        ("p_id", Value::Integer(id)),
        ("p_keyword", Value::from(keyword)),
        ("p_is_active", Value::Integer(1)),
        ("c_id", Value::Integer(id * 10)),
        ("c_parent_id", Value::Integer(id)),
        ("c_code", Value::from(code)),
        ("c_title", Value::from(title)),
    ])
}
