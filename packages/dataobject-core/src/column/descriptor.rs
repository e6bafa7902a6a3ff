//! Column descriptor and its builder.

use crate::dialect::Dialect;
use crate::error::{DataError, Result};
use crate::value::{BindKind, Value};

use super::types::{ColumnLength, ColumnType, TypeClass};

/// Immutable metadata for one column.
///
/// Built through [`ColumnBuilder`]; flags cannot change after `build()`.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDescriptor {
    name: String,
    column_type: ColumnType,
    length: Option<ColumnLength>,
    default: Option<Value>,
    nullable: bool,
    auto: Option<bool>,
    unique: bool,
    primary: bool,
}

impl ColumnDescriptor {
    /// Starts building a column with the given name and neutral type tag.
    pub fn builder(name: impl Into<String>, column_type: impl Into<ColumnType>) -> ColumnBuilder {
        ColumnBuilder::new(name, column_type)
    }

    /// Column name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Neutral type tag.
    pub fn column_type(&self) -> &ColumnType {
        &self.column_type
    }

    /// Declared length or precision.
    pub fn length(&self) -> Option<ColumnLength> {
        self.length
    }

    /// Declared default value.
    pub fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    /// Whether NULL is allowed.
    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    /// Whether values are generated by the engine.
    ///
    /// Without an explicit `auto(..)`, a primary integer column is
    /// auto-increment.
    pub fn is_auto_increment(&self) -> bool {
        self.auto
            .unwrap_or(self.primary && self.column_type.is_integer())
    }

    /// Whether the column carries a UNIQUE constraint.
    pub fn is_unique(&self) -> bool {
        self.unique
    }

    /// Whether the column is the primary key.
    pub fn is_primary(&self) -> bool {
        self.primary
    }

    /// Semantic classification of the type tag.
    pub fn class(&self) -> TypeClass {
        self.column_type.class()
    }

    /// Integer family.
    pub fn is_integer(&self) -> bool {
        self.column_type.is_integer()
    }

    /// Decimal family.
    pub fn is_decimal(&self) -> bool {
        self.column_type.is_decimal()
    }

    /// Integer, decimal, or bit.
    pub fn is_numeric(&self) -> bool {
        self.column_type.is_numeric()
    }

    /// Parameter type used when binding values for this column.
    pub fn bind_kind(&self) -> BindKind {
        if self.is_integer() {
            BindKind::Integer
        } else {
            BindKind::Text
        }
    }

    /// Coerces a raw engine value by this column's classification.
    pub fn coerce(&self, raw: Value) -> Value {
        raw.coerce(self.class())
    }

    /// Checks the name and type tag are safe to splice into DDL.
    pub fn validate(&self) -> Result<()> {
        if !is_identifier(&self.name) {
            return Err(DataError::InvalidColumn {
                column: self.name.clone(),
                reason: "name must only contain [A-Za-z0-9_]".to_string(),
            });
        }
        if !self.column_type.is_well_formed() {
            return Err(DataError::InvalidColumn {
                column: self.name.clone(),
                reason: format!("malformed type tag '{}'", self.column_type),
            });
        }
        Ok(())
    }

    /// Renders the column definition used inside CREATE TABLE.
    ///
    /// `<name> <type>[(<length>)] NULL|NOT NULL [DEFAULT <v>] [PRIMARY KEY] [AUTO_INCREMENT]`
    ///
    /// Non-numeric defaults are quoted through `quote`.
    pub fn ddl_fragment(&self, dialect: Dialect, quote: &dyn Fn(&str) -> String) -> Result<String> {
        self.validate()?;

        let mut sql = format!("{} {}", self.name, dialect.type_name(self));
        if let Some(length) = self.length {
            if dialect.renders_length(self) {
                sql.push_str(&format!("({length})"));
            }
        }

        sql.push_str(if self.nullable { " NULL" } else { " NOT NULL" });

        if let Some(default) = self.default.as_ref().filter(|d| !d.is_null()) {
            sql.push_str(" DEFAULT ");
            if self.is_numeric() {
                sql.push_str(&default.to_string());
            } else {
                sql.push_str(&quote(&default.to_string()));
            }
        }

        if self.primary {
            sql.push_str(" PRIMARY KEY");
        }

        if self.is_auto_increment() {
            if let Some(clause) = dialect.auto_increment_clause() {
                sql.push(' ');
                sql.push_str(clause);
            }
        }

        Ok(sql)
    }
}

/// Builder producing an immutable [`ColumnDescriptor`].
#[derive(Debug, Clone)]
pub struct ColumnBuilder {
    column: ColumnDescriptor,
}

impl ColumnBuilder {
    /// Creates a nullable, non-unique, non-primary column.
    pub fn new(name: impl Into<String>, column_type: impl Into<ColumnType>) -> Self {
        Self {
            column: ColumnDescriptor {
                name: name.into(),
                column_type: column_type.into(),
                length: None,
                default: None,
                nullable: true,
                auto: None,
                unique: false,
                primary: false,
            },
        }
    }

    /// Sets the type length, e.g. `255` or `(10, 2)`.
    pub fn length(mut self, length: impl Into<ColumnLength>) -> Self {
        self.column.length = Some(length.into());
        self
    }

    /// Sets a decimal precision and scale, e.g. `DECIMAL(10,2)`.
    pub fn precision(mut self, precision: u32, scale: u32) -> Self {
        self.column.length = Some(ColumnLength::Precision(precision, scale));
        self
    }

    /// Sets the default value.
    pub fn default(mut self, value: impl Into<Value>) -> Self {
        self.column.default = Some(value.into());
        self
    }

    /// Sets AUTO_INCREMENT explicitly.
    pub fn auto(mut self, auto: bool) -> Self {
        self.column.auto = Some(auto);
        self
    }

    /// Marks the column UNIQUE.
    pub fn unique(mut self) -> Self {
        self.column.unique = true;
        self
    }

    /// Marks the column PRIMARY KEY (implies NOT NULL).
    pub fn primary(mut self) -> Self {
        self.column.primary = true;
        self.column.nullable = false;
        self
    }

    /// Marks the column NOT NULL.
    pub fn not_null(mut self) -> Self {
        self.column.nullable = false;
        self
    }

    /// Finishes the descriptor.
    pub fn build(self) -> ColumnDescriptor {
        self.column
    }
}

impl From<ColumnBuilder> for ColumnDescriptor {
    fn from(builder: ColumnBuilder) -> Self {
        builder.build()
    }
}

/// Returns true for non-empty `[A-Za-z0-9_]` identifiers.
pub(crate) fn is_identifier(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quote(s: &str) -> String {
        format!("'{}'", s.replace('\'', "''"))
    }

    #[test]
    fn test_primary_implies_not_null_and_auto() {
        let id = ColumnDescriptor::builder("id", "bigint").primary().build();
        assert!(!id.is_nullable());
        assert!(id.is_auto_increment());

        let code = ColumnDescriptor::builder("code", "varchar").primary().build();
        assert!(!code.is_auto_increment());

        let manual = ColumnDescriptor::builder("id", "int").primary().auto(false).build();
        assert!(!manual.is_auto_increment());
    }

    #[test]
    fn test_mysql_fragment() {
        let id = ColumnDescriptor::builder("id", "bigint").length(8).primary().build();
        assert_eq!(
            id.ddl_fragment(Dialect::MySql, &quote).unwrap(),
            "id bigint(8) NOT NULL PRIMARY KEY AUTO_INCREMENT"
        );

        let keyword = ColumnDescriptor::builder("keyword", "varchar")
            .length(128)
            .default("none")
            .build();
        assert_eq!(
            keyword.ddl_fragment(Dialect::MySql, &quote).unwrap(),
            "keyword varchar(128) NULL DEFAULT 'none'"
        );
    }

    #[test]
    fn test_postgres_fragment_uses_serial_types() {
        let id = ColumnDescriptor::builder("id", "bigint").length(8).primary().build();
        assert_eq!(
            id.ddl_fragment(Dialect::Postgres, &quote).unwrap(),
            "id bigserial NOT NULL PRIMARY KEY"
        );

        let active = ColumnDescriptor::builder("is_active", "tinyint")
            .length(1)
            .default(1)
            .build();
        assert_eq!(
            active.ddl_fragment(Dialect::Postgres, &quote).unwrap(),
            "is_active smallint NULL DEFAULT 1"
        );

        let created = ColumnDescriptor::builder("created_at", "datetime").build();
        assert_eq!(
            created.ddl_fragment(Dialect::Postgres, &quote).unwrap(),
            "created_at timestamp NULL"
        );
    }

    #[test]
    fn test_decimal_precision_and_numeric_default() {
        let price = ColumnDescriptor::builder("price", "decimal")
            .length((10, 2))
            .default(0.5)
            .not_null()
            .build();
        assert_eq!(
            price.ddl_fragment(Dialect::MySql, &quote).unwrap(),
            "price decimal(10,2) NOT NULL DEFAULT 0.5"
        );
    }

    #[test]
    fn test_unrecognized_type_is_accepted_until_ddl() {
        let geo = ColumnDescriptor::builder("area", "geometry").build();
        assert_eq!(geo.class(), TypeClass::Other);
        assert_eq!(
            geo.ddl_fragment(Dialect::MySql, &quote).unwrap(),
            "area geometry NULL"
        );

        let broken = ColumnDescriptor::builder("bad name", "int").build();
        assert!(matches!(
            broken.ddl_fragment(Dialect::MySql, &quote),
            Err(DataError::InvalidColumn { .. })
        ));
    }

    #[test]
    fn test_bind_kind_follows_class() {
        let id = ColumnDescriptor::builder("id", "int").build();
        let title = ColumnDescriptor::builder("title", "varchar").build();
        assert_eq!(id.bind_kind(), BindKind::Integer);
        assert_eq!(title.bind_kind(), BindKind::Text);
    }
}
