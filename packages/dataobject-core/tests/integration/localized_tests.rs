//! Localized entity scenarios: paired DDL, joined folds, upserts, and
//! failure cleanup.

use std::sync::Arc;

use anyhow::Result;
use ntest::timeout;

use dataobject_core::{
    Condition, DataError, EnsureOutcome, OperationContext, Record, RecordingGateway, SqlGateway,
    Value,
};

use super::helpers::{joined_keyword, keywords, push_ok, titles};

#[timeout(1000)]
#[test]
fn test_paired_tables_are_created_once() -> Result<()> {
    let gateway = Arc::new(RecordingGateway::postgres());
    let entity = keywords(&gateway);

    let mut seeded = 0;
    entity.ensure_table_with(|e| {
        seeded += 1;
        assert_eq!(e.content_name(), "keywords_content");
        Ok(())
    })?;
    assert!(gateway.table_exists("keywords")?);
    assert!(gateway.table_exists("keywords_content")?);

    assert_eq!(entity.ensure_table()?, EnsureOutcome::AlreadyExisted);
    assert_eq!(seeded, 1);
    assert_eq!(
        gateway.statements()?[0],
        "CREATE TABLE keywords (id bigserial NOT NULL PRIMARY KEY, \
         keyword varchar(128) NULL, is_active smallint NULL DEFAULT 1, UNIQUE (keyword))"
    );
    Ok(())
}

#[timeout(1000)]
#[test]
fn test_insert_then_lookup_by_keyword() -> Result<()> {
    let gateway = Arc::new(RecordingGateway::mysql());
    let entity = keywords(&gateway);
    let ctx = OperationContext::default();

    // BEGIN, primary insert, two content inserts, COMMIT, re-read
    push_ok(&gateway, 5);
    gateway.push_rows(vec![
        joined_keyword(1, "chat", "mn", "Харилцан яриа"),
        joined_keyword(1, "chat", "en", "Chat"),
    ])?;
    let inserted = entity
        .insert(
            &ctx,
            Record::from([("keyword", "chat")]),
            titles(&[("mn", "Харилцан яриа"), ("en", "Chat")]),
        )?
        .expect("inserted entity is re-read");
    assert_eq!(inserted.id(), Some(1));

    gateway.push_rows(vec![
        joined_keyword(1, "chat", "mn", "Харилцан яриа"),
        joined_keyword(1, "chat", "en", "Chat"),
    ])?;
    let found = entity
        .get_row_where(&Record::from([("p.keyword", "chat")]))?
        .expect("entity found by keyword");

    let json = serde_json::to_value(&found)?;
    assert_eq!(
        json,
        serde_json::json!({
            "id": 1,
            "keyword": "chat",
            "is_active": 1,
            "localized": {"title": {"mn": "Харилцан яриа", "en": "Chat"}}
        })
    );
    Ok(())
}

#[timeout(1000)]
#[test]
fn test_update_touches_only_given_language() -> Result<()> {
    let gateway = Arc::new(RecordingGateway::mysql());
    let entity = keywords(&gateway);

    gateway.push_rows(vec![Record::from([
        ("id", Value::Integer(1)),
        ("keyword", Value::from("chat")),
    ])])?;
    push_ok(&gateway, 1);
    gateway.push_rows(vec![Record::from([("id", Value::Integer(11))])])?;
    push_ok(&gateway, 2);
    gateway.push_rows(vec![
        joined_keyword(1, "chat", "mn", "Харилцан яриа"),
        joined_keyword(1, "chat", "en", "Hyperactive"),
    ])?;

    let updated = entity
        .update_by_id(
            &OperationContext::default(),
            1,
            Record::new(),
            titles(&[("en", "Hyperactive")]),
        )?
        .expect("entity re-read");

    assert_eq!(updated.get("keyword"), Some(&Value::from("chat")));
    assert_eq!(
        updated.localized_value("title", "en"),
        Some(&Value::from("Hyperactive"))
    );
    assert_eq!(
        updated.localized_value("title", "mn"),
        Some(&Value::from("Харилцан яриа"))
    );

    let statements = gateway.statements()?;
    let content_writes: Vec<&String> = statements
        .iter()
        .filter(|s| s.starts_with("UPDATE keywords_content") || s.starts_with("INSERT"))
        .collect();
    assert_eq!(content_writes.len(), 1);
    assert!(!statements.iter().any(|s| s.starts_with("UPDATE keywords SET")));
    Ok(())
}

#[timeout(1000)]
#[test]
fn test_partial_content_failure_leaves_no_primary_row() {
    let gateway = Arc::new(RecordingGateway::mysql().without_transactions());
    let entity = keywords(&gateway);

    // primary insert, first language, then the second language fails
    push_ok(&gateway, 2);
    gateway
        .push_failure(Some(1366), "Incorrect string value")
        .unwrap();

    let err = entity
        .insert(
            &OperationContext::default(),
            Record::from([("keyword", "chat")]),
            titles(&[("en", "Chat"), ("mn", "Харилцан яриа")]),
        )
        .unwrap_err();

    match err {
        DataError::ContentWriteFailed {
            table,
            language,
            code,
            ..
        } => {
            assert_eq!(table, "keywords_content");
            assert_eq!(language, "mn");
            assert_eq!(code, Some(1366));
        }
        other => panic!("unexpected error: {other}"),
    }

    let executed = gateway.executed().unwrap();
    let cleanup = executed.last().unwrap();
    assert_eq!(cleanup.sql, "DELETE FROM keywords WHERE id=:id");
    assert_eq!(cleanup.bind("id"), Some(&Value::Integer(1)));

    // Nothing is committed and nothing runs after the cleanup.
    assert_eq!(executed.len(), 4);
    assert!(!executed.iter().any(|s| s.sql == "COMMIT"));
    assert!(executed[..3].iter().all(|s| s.sql.starts_with("INSERT INTO")));
}

#[timeout(1000)]
#[test]
fn test_listing_folds_one_record_per_entity() -> Result<()> {
    let gateway = Arc::new(RecordingGateway::mysql());
    let entity = keywords(&gateway);
    gateway.push_rows(vec![
        joined_keyword(1, "chat", "mn", "Харилцан яриа"),
        joined_keyword(1, "chat", "en", "Chat"),
        joined_keyword(2, "mail", "en", "Mail"),
    ])?;

    let rows = entity.get_rows(&Condition::new().order_by("p.keyword").limit(20))?;
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].localized_value("title", "mn"), Some(&Value::from("Харилцан яриа")));
    assert_eq!(rows[0].localized_value("title", "en"), Some(&Value::from("Chat")));
    assert_eq!(rows[1].languages(), vec!["en"]);

    let sql = &gateway.statements()?[0];
    assert!(sql.ends_with("ON p.id=c.parent_id ORDER BY p.keyword LIMIT 20"));
    Ok(())
}
