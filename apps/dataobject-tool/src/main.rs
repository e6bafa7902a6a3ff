//! CLI tool for previewing table DDL from schema definition files.
//!
//! Commands:
//! - `ddl`: dry-run table creation and print the statements
//! - `check`: validate a schema file on both dialects

mod cli;

use std::fs;
use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use dataobject_core::{
    DataObjectConfig, Dialect, LocalizedEntity, RecordTable, RecordingGateway, SchemaFile,
    TableSchema,
};

use cli::{Cli, Commands};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Ddl {
            schema,
            driver,
            collation,
            content_suffix,
            auto_increment_start,
        } => {
            let file = load_schema(&schema)?;
            let config = DataObjectConfig {
                collation,
                content_suffix,
                auto_increment_start,
                ..DataObjectConfig::default()
            };
            for statement in render_ddl(&file, &driver, config)? {
                println!("{statement};");
            }
        }
        Commands::Check { schema } => {
            let file = load_schema(&schema)?;
            check(&file)?;
            println!("{}", serde_json::to_string_pretty(&file)?);
        }
    }

    Ok(())
}

/// Reads and parses a schema definition file.
fn load_schema(path: &Path) -> anyhow::Result<SchemaFile> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("reading schema file {}", path.display()))?;
    let file = SchemaFile::from_json(&text)?;
    tracing::debug!(name = %file.name, localized = file.is_localized(), "schema loaded");
    Ok(file)
}

/// Statements a fresh database would receive when the schema's tables
/// are ensured on `driver`.
fn render_ddl(
    file: &SchemaFile,
    driver: &str,
    config: DataObjectConfig,
) -> anyhow::Result<Vec<String>> {
    let gateway = Arc::new(RecordingGateway::new(driver));
    if file.is_localized() {
        let entity = LocalizedEntity::with_config(
            gateway.clone(),
            &file.name,
            file.column_descriptors(),
            file.content_descriptors(),
            config,
        )?;
        entity.ensure_table()?;
    } else {
        let schema = TableSchema::new(&file.name, file.column_descriptors())?;
        RecordTable::with_config(gateway.clone(), schema, config)?.ensure_table()?;
    }
    Ok(gateway.statements()?)
}

/// Builds every table definition and renders it for both dialects.
fn check(file: &SchemaFile) -> anyhow::Result<()> {
    for dialect in [Dialect::MySql, Dialect::Postgres] {
        let statements = render_ddl(file, dialect.driver_name(), DataObjectConfig::default())
            .with_context(|| format!("schema '{}' on {}", file.name, dialect.driver_name()))?;
        tracing::info!(
            driver = dialect.driver_name(),
            statements = statements.len(),
            "schema renders"
        );
    }
    Ok(())
}
