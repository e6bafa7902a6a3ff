//! SQL dialect rendering rules for the supported engine families.
//!
//! A dialect is selected once from the gateway's driver name and then
//! consulted for every type mapping and dialect-specific clause.

use crate::column::{ColumnDescriptor, TypeClass};
use crate::error::{DataError, Result};

/// Target SQL engine family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dialect {
    /// MySQL / MariaDB
    MySql,
    /// PostgreSQL
    Postgres,
}

impl Dialect {
    /// Selects the dialect for a driver name (`mysql`, `pgsql`).
    pub fn from_driver_name(name: &str) -> Result<Self> {
        match name.trim().to_lowercase().as_str() {
            "mysql" | "mariadb" => Ok(Self::MySql),
            "pgsql" | "postgres" | "postgresql" => Ok(Self::Postgres),
            other => Err(DataError::UnsupportedDriver(other.to_string())),
        }
    }

    /// Canonical driver name.
    pub fn driver_name(&self) -> &'static str {
        match self {
            Self::MySql => "mysql",
            Self::Postgres => "pgsql",
        }
    }

    /// Native type name for a column's neutral tag.
    pub fn type_name(&self, column: &ColumnDescriptor) -> String {
        let tag = column.column_type().as_str();
        match self {
            Self::Postgres => {
                let mapped = match tag {
                    "int8" => "bigint",
                    "integer" | "mediumint" => "int",
                    "tinyint" => "smallint",
                    "datetime" => "timestamp",
                    "tinytext" | "mediumtext" | "longtext" => "text",
                    other => other,
                };
                if column.is_auto_increment() {
                    match mapped {
                        "bigint" => return "bigserial".to_string(),
                        "int" => return "serial".to_string(),
                        "smallint" => return "smallserial".to_string(),
                        _ => {}
                    }
                }
                mapped.to_string()
            }
            Self::MySql => match tag {
                "bigserial" => "bigint",
                "serial" => "int",
                "smallserial" => "smallint",
                "timestamptz" => "timestamp",
                other => other,
            }
            .to_string(),
        }
    }

    /// Whether a declared length is rendered after the type.
    ///
    /// Postgres rejects display widths on integer types.
    pub fn renders_length(&self, column: &ColumnDescriptor) -> bool {
        match self {
            Self::MySql => true,
            Self::Postgres => column.class() != TypeClass::Integer,
        }
    }

    /// Column suffix marking engine-generated values, if the dialect uses one.
    pub fn auto_increment_clause(&self) -> Option<&'static str> {
        match self {
            Self::MySql => Some("AUTO_INCREMENT"),
            Self::Postgres => None,
        }
    }

    /// Whether INSERT/UPDATE can return rows directly.
    pub fn supports_returning(&self) -> bool {
        matches!(self, Self::Postgres)
    }

    /// ` RETURNING <columns>` suffix, when supported.
    pub fn returning_clause(&self, columns: &str) -> Option<String> {
        self.supports_returning()
            .then(|| format!(" RETURNING {columns}"))
    }

    /// INSERT storing a row made only of column defaults.
    pub fn default_values_insert(&self, table: &str) -> String {
        match self {
            Self::MySql => format!("INSERT INTO {table}() VALUES()"),
            Self::Postgres => format!("INSERT INTO {table} DEFAULT VALUES"),
        }
    }

    /// Statement toggling foreign key enforcement for the session.
    pub fn foreign_key_toggle(&self, enable: bool) -> String {
        match self {
            Self::MySql => format!("SET foreign_key_checks={}", u8::from(enable)),
            Self::Postgres => format!(
                "SET session_replication_role = '{}'",
                if enable { "origin" } else { "replica" }
            ),
        }
    }

    /// Query returning at least one row when the table exists.
    ///
    /// The name is compared exactly; `_` and `%` are not wildcards.
    ///
    /// `quoted_name` must already be escaped by the gateway.
    pub fn table_exists_sql(&self, quoted_name: &str) -> String {
        match self {
            Self::MySql => format!(
                "SELECT table_name FROM information_schema.tables \
                 WHERE table_schema=DATABASE() AND table_name={quoted_name}"
            ),
            Self::Postgres => format!(
                "SELECT tablename FROM pg_tables WHERE schemaname='public' AND tablename={quoted_name}"
            ),
        }
    }

    /// Query reading the connection collation, where the dialect has one.
    pub fn collation_sql(&self) -> Option<&'static str> {
        match self {
            Self::MySql => Some("SELECT @@collation_connection"),
            Self::Postgres => None,
        }
    }

    /// Trailing CREATE TABLE options.
    pub fn table_options(&self, collation: Option<&str>, auto_increment_start: Option<u64>) -> String {
        match self {
            Self::MySql => {
                let mut options = String::from(" ENGINE=InnoDB");
                if let Some(collation) = collation.filter(|c| !c.is_empty()) {
                    options.push_str(&format!(" COLLATE={collation}"));
                }
                if let Some(start) = auto_increment_start {
                    options.push_str(&format!(" AUTO_INCREMENT={start}"));
                }
                options
            }
            Self::Postgres => String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_driver_selection() {
        assert_eq!(Dialect::from_driver_name("MySQL").unwrap(), Dialect::MySql);
        assert_eq!(Dialect::from_driver_name("pgsql").unwrap(), Dialect::Postgres);
        assert!(matches!(
            Dialect::from_driver_name("sqlite"),
            Err(DataError::UnsupportedDriver(name)) if name == "sqlite"
        ));
    }

    #[test]
    fn test_mysql_maps_postgres_only_tags() {
        let serial = ColumnDescriptor::builder("id", "bigserial").build();
        let tz = ColumnDescriptor::builder("seen_at", "timestamptz").build();
        assert_eq!(Dialect::MySql.type_name(&serial), "bigint");
        assert_eq!(Dialect::MySql.type_name(&tz), "timestamp");
    }

    #[test]
    fn test_postgres_serial_mapping() {
        let big = ColumnDescriptor::builder("id", "bigint").primary().build();
        let int = ColumnDescriptor::builder("id", "integer").auto(true).build();
        let small = ColumnDescriptor::builder("id", "tinyint").auto(true).build();
        let plain = ColumnDescriptor::builder("n", "bigint").build();
        assert_eq!(Dialect::Postgres.type_name(&big), "bigserial");
        assert_eq!(Dialect::Postgres.type_name(&int), "serial");
        assert_eq!(Dialect::Postgres.type_name(&small), "smallserial");
        assert_eq!(Dialect::Postgres.type_name(&plain), "bigint");
    }

    #[test]
    fn test_session_statements() {
        assert_eq!(Dialect::MySql.foreign_key_toggle(false), "SET foreign_key_checks=0");
        assert_eq!(
            Dialect::Postgres.foreign_key_toggle(true),
            "SET session_replication_role = 'origin'"
        );
        assert_eq!(Dialect::MySql.returning_clause("*"), None);
        assert_eq!(
            Dialect::Postgres.returning_clause("id").as_deref(),
            Some(" RETURNING id")
        );
    }

    #[test]
    fn test_table_exists_matches_name_exactly() {
        let sql = Dialect::MySql.table_exists_sql("'user_roles'");
        assert_eq!(
            sql,
            "SELECT table_name FROM information_schema.tables \
             WHERE table_schema=DATABASE() AND table_name='user_roles'"
        );
        assert!(!sql.contains("LIKE"));
        assert!(Dialect::Postgres
            .table_exists_sql("'user_roles'")
            .ends_with("tablename='user_roles'"));
    }

    #[test]
    fn test_default_values_insert() {
        assert_eq!(
            Dialect::MySql.default_values_insert("tags"),
            "INSERT INTO tags() VALUES()"
        );
        assert_eq!(
            Dialect::Postgres.default_values_insert("tags"),
            "INSERT INTO tags DEFAULT VALUES"
        );
    }

    #[test]
    fn test_table_options() {
        assert_eq!(
            Dialect::MySql.table_options(Some("utf8mb4_unicode_ci"), Some(1)),
            " ENGINE=InnoDB COLLATE=utf8mb4_unicode_ci AUTO_INCREMENT=1"
        );
        assert_eq!(Dialect::MySql.table_options(None, None), " ENGINE=InnoDB");
        assert_eq!(Dialect::Postgres.table_options(Some("C"), Some(1)), "");
    }
}
