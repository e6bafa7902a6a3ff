//! Single-table CRUD round trips.

use std::sync::Arc;

use anyhow::Result;
use ntest::timeout;

use dataobject_core::{
    Condition, DataError, EnsureOutcome, OperationContext, QueryResult, Record, RecordingGateway,
    SqlGateway, Value,
};

use super::helpers::{accounts, fixed_ctx, push_ok};

#[timeout(1000)]
#[test]
fn test_ensure_table_then_table_exists() -> Result<()> {
    let gateway = Arc::new(RecordingGateway::mysql().with_collation("utf8mb4_unicode_ci"));
    let table = accounts(&gateway);

    assert_eq!(table.ensure_table()?, EnsureOutcome::Created);
    assert!(gateway.table_exists("accounts")?);
    assert_eq!(table.ensure_table()?, EnsureOutcome::AlreadyExisted);

    let statements = gateway.statements()?;
    assert_eq!(statements.len(), 1);
    assert_eq!(
        statements[0],
        "CREATE TABLE accounts (id bigint(8) NOT NULL PRIMARY KEY AUTO_INCREMENT, \
         username varchar(65) NOT NULL, email varchar(128) NULL, \
         balance decimal(10,2) NULL DEFAULT 0, is_active tinyint(1) NULL DEFAULT 1, \
         created_at datetime NULL, created_by bigint NULL, updated_at datetime NULL, \
         updated_by bigint NULL, UNIQUE (username)) \
         ENGINE=InnoDB COLLATE=utf8mb4_unicode_ci AUTO_INCREMENT=1"
    );
    Ok(())
}

#[timeout(1000)]
#[test]
fn test_insert_then_get_by_id_round_trip() -> Result<()> {
    let gateway = Arc::new(RecordingGateway::mysql());
    let table = accounts(&gateway);
    let input = Record::from([
        ("username", Value::from("saraa")),
        ("email", Value::from("saraa@example.com")),
    ]);

    push_ok(&gateway, 1);
    gateway.push_rows(vec![Record::from([
        ("id", Value::from("1")),
        ("username", Value::from("saraa")),
        ("email", Value::from("saraa@example.com")),
        ("balance", Value::from("0.00")),
        ("is_active", Value::from("1")),
        ("created_at", Value::from("2024-05-01 12:30:00")),
        ("created_by", Value::from("1")),
    ])])?;

    let stored = table
        .insert(&fixed_ctx(), input.clone())?
        .expect("inserted row is re-read");

    for (name, value) in input.iter() {
        assert_eq!(stored.get(name), Some(value), "column {name}");
    }
    assert_eq!(stored.get("id"), Some(&Value::Integer(1)));
    assert_eq!(stored.get("balance"), Some(&Value::Decimal(0.0)));
    assert_eq!(
        stored.get("created_at"),
        Some(&Value::from("2024-05-01 12:30:00"))
    );
    assert_eq!(stored.get("updated_at"), Some(&Value::Null));
    Ok(())
}

#[timeout(1000)]
#[test]
fn test_soft_deactivate_frees_unique_username() -> Result<()> {
    let gateway = Arc::new(RecordingGateway::mysql());
    let table = accounts(&gateway);

    gateway.push_rows(vec![Record::from([
        ("is_active", Value::Integer(1)),
        ("username", Value::from("saraa")),
    ])])?;
    assert!(table.soft_deactivate_by_id(&fixed_ctx(), 1, Record::from([("email", Value::Null)]))?);

    let executed = gateway.executed()?;
    let update = &executed[1];
    let username = update.bind("username").and_then(Value::as_str).unwrap_or_default();
    assert_ne!(username, "saraa");
    assert!(username.ends_with("] saraa"));
    assert!(update.sql.ends_with("WHERE id=1"));
    assert_eq!(update.bind("is_active"), Some(&Value::Integer(0)));
    assert_eq!(update.bind("email"), Some(&Value::Null));
    assert_eq!(update.bind("updated_by"), Some(&Value::Integer(1)));

    // The freed username can be inserted again.
    push_ok(&gateway, 1);
    table.insert(&fixed_ctx(), Record::from([("username", "saraa")]))?;
    let insert = &gateway.executed()?[2];
    assert_eq!(insert.bind("username"), Some(&Value::from("saraa")));
    Ok(())
}

#[timeout(1000)]
#[test]
fn test_condition_writes_deactivate_then_purge() -> Result<()> {
    let gateway = Arc::new(RecordingGateway::mysql());
    let table = accounts(&gateway);
    gateway.push_result(QueryResult::with_affected(4))?;
    gateway.push_result(QueryResult::with_affected(4))?;

    let dormant = Condition::new()
        .where_clause("balance=:balance AND is_active=1")
        .param("balance", 0.0);
    assert_eq!(
        table.update_where(&fixed_ctx(), Record::from([("is_active", 0)]), &dormant)?,
        4
    );
    let inactive = Condition::new().where_clause("is_active=0");
    assert_eq!(table.delete_where(&inactive)?, 4);

    let statements = gateway.statements()?;
    assert_eq!(
        statements[0],
        "UPDATE accounts SET is_active=:is_active, updated_at=:updated_at, \
         updated_by=:updated_by WHERE balance=:balance AND is_active=1"
    );
    assert_eq!(statements[1], "DELETE FROM accounts WHERE is_active=0");
    Ok(())
}

#[timeout(1000)]
#[test]
fn test_statement_errors_carry_engine_code() {
    let gateway = Arc::new(RecordingGateway::postgres());
    let table = accounts(&gateway);
    gateway
        .push_failure(Some(23505), "duplicate key value violates unique constraint")
        .unwrap();

    let err = table
        .insert(&OperationContext::default(), Record::from([("username", "saraa")]))
        .unwrap_err();
    assert_eq!(err.engine_code(), Some(23505));
    assert!(!err.is_definition_error());
    assert!(err.to_string().contains("[23505]"));
}

#[timeout(1000)]
#[test]
fn test_update_and_delete_flow() -> Result<()> {
    let gateway = Arc::new(RecordingGateway::postgres());
    let table = accounts(&gateway);

    gateway.push_rows(vec![Record::from([
        ("id", Value::Integer(2)),
        ("email", Value::from("new@example.com")),
    ])])?;
    let updated = table
        .update_by_id(&fixed_ctx(), 2, Record::from([("email", "new@example.com")]))?
        .expect("row returned");
    assert_eq!(updated.get("email"), Some(&Value::from("new@example.com")));

    gateway.push_result(QueryResult::with_affected(0))?;
    assert!(!table.delete(&fixed_ctx(), 2)?);

    let statements = gateway.statements()?;
    assert_eq!(
        statements[0],
        "UPDATE accounts SET email=:email, updated_at=:updated_at, updated_by=:updated_by \
         WHERE id=2 RETURNING *"
    );
    assert_eq!(statements[1], "DELETE FROM accounts WHERE id=:id");
    Ok(())
}

#[timeout(1000)]
#[test]
fn test_unknown_driver_is_rejected() {
    let gateway = Arc::new(RecordingGateway::new("sqlite"));
    let schema =
        dataobject_core::TableSchema::new("t", [dataobject_core::ColumnBuilder::new("id", "int")])
            .unwrap();
    let err = dataobject_core::RecordTable::new(gateway, schema).unwrap_err();
    assert_eq!(err, DataError::UnsupportedDriver("sqlite".to_string()));
}
