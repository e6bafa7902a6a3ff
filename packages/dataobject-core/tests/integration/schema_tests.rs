//! Schema files and table-level DDL.

use std::fs;
use std::sync::Arc;

use anyhow::Result;
use ntest::timeout;
use tempfile::tempdir;

use dataobject_core::{
    DataError, DataObjectConfig, Dialect, LocalizedEntity, RecordingGateway, SchemaFile,
    TableSchema,
};

const PAGES: &str = r#"{
    "name": "pages",
    "columns": [
        {"name": "id", "type": "int", "primary": true},
        {"name": "slug", "type": "varchar", "length": 64, "unique": true, "nullable": false},
        {"name": "is_active", "type": "tinyint", "length": 1, "default": 1}
    ],
    "content_columns": [
        {"name": "title", "type": "varchar", "length": 255},
        {"name": "body", "type": "mediumtext"}
    ]
}"#;

fn quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

#[timeout(1000)]
#[test]
fn test_schema_file_loads_from_disk() -> Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("pages.json");
    fs::write(&path, PAGES)?;

    let file = SchemaFile::from_json(&fs::read_to_string(&path)?)?;
    assert!(file.is_localized());

    let schema = TableSchema::new(&file.name, file.column_descriptors())?;
    let sql = schema.create_table_sql(Dialect::Postgres, &quote, None, 1)?;
    assert_eq!(
        sql,
        "CREATE TABLE pages (id serial NOT NULL PRIMARY KEY, slug varchar(64) NOT NULL, \
         is_active smallint NULL DEFAULT 1, UNIQUE (slug))"
    );
    Ok(())
}

#[timeout(1000)]
#[test]
fn test_schema_file_builds_localized_entity() -> Result<()> {
    let file = SchemaFile::from_json(PAGES)?;
    let gateway = Arc::new(RecordingGateway::mysql());
    let config = DataObjectConfig {
        content_suffix: "_i18n".to_string(),
        collation: Some("utf8mb4_bin".to_string()),
        ..DataObjectConfig::default()
    };
    let entity = LocalizedEntity::with_config(
        gateway.clone(),
        &file.name,
        file.column_descriptors(),
        file.content_descriptors(),
        config,
    )?;
    entity.ensure_table()?;

    let statements = gateway.statements()?;
    assert_eq!(
        statements[1],
        "CREATE TABLE pages_i18n (id int NOT NULL PRIMARY KEY AUTO_INCREMENT, \
         parent_id int NOT NULL, code varchar(6) NOT NULL, title varchar(255) NULL, \
         body mediumtext NULL) ENGINE=InnoDB COLLATE=utf8mb4_bin AUTO_INCREMENT=1"
    );
    Ok(())
}

#[timeout(1000)]
#[test]
fn test_invalid_column_surfaces_at_ddl_time() {
    let file = SchemaFile::from_json(
        r#"{"name": "t", "columns": [{"name": "id", "type": "int"}, {"name": "v", "type": "varchar(10)"}]}"#,
    )
    .unwrap();
    let schema = TableSchema::new(&file.name, file.column_descriptors()).unwrap();
    let err = schema
        .create_table_sql(Dialect::MySql, &quote, None, 1)
        .unwrap_err();
    assert!(matches!(err, DataError::InvalidColumn { ref column, .. } if column == "v"));
    assert!(err.is_definition_error());
}
