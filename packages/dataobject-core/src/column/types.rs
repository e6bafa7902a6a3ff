//! Dialect-neutral column type tags and their semantic classification.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Semantic classification of a column type.
///
/// Drives bind types, row coercion, and default-value quoting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeClass {
    /// Integer family, including boolean and serial tags
    Integer,
    /// Character and binary string family
    String,
    /// Fixed and floating point numbers
    Decimal,
    /// Dates, times, and timestamps
    DateTime,
    /// BIT
    Bit,
    /// Any unrecognized tag
    Other,
}

/// Dialect-neutral type tag, stored lower-cased (e.g. "bigint", "varchar").
///
/// Unrecognized tags are accepted and classify as [`TypeClass::Other`];
/// they are passed through to the engine verbatim at DDL time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct ColumnType(String);

impl ColumnType {
    /// Creates a type tag, normalizing to lower case.
    pub fn new(tag: impl AsRef<str>) -> Self {
        Self(tag.as_ref().trim().to_lowercase())
    }

    /// Returns the normalized tag.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Classifies the tag.
    pub fn class(&self) -> TypeClass {
        match self.0.as_str() {
            "int" | "bigint" | "integer" | "smallint" | "int8" | "bigserial" | "serial"
            | "smallserial" | "tinyint" | "mediumint" | "bool" | "boolean" => TypeClass::Integer,
            "varchar" | "text" | "blob" | "binary" | "varbinary" | "char" | "tinytext"
            | "mediumtext" | "longtext" | "tinyblob" | "mediumblob" | "longblob" | "enum"
            | "set" => TypeClass::String,
            "decimal" | "numeric" | "float" | "double" | "real" => TypeClass::Decimal,
            "datetime" | "date" | "timestamp" | "time" | "timestamptz" | "year" => {
                TypeClass::DateTime
            }
            "bit" => TypeClass::Bit,
            _ => TypeClass::Other,
        }
    }

    /// Integer family.
    pub fn is_integer(&self) -> bool {
        self.class() == TypeClass::Integer
    }

    /// Decimal family.
    pub fn is_decimal(&self) -> bool {
        self.class() == TypeClass::Decimal
    }

    /// Integer, decimal, or bit.
    pub fn is_numeric(&self) -> bool {
        matches!(
            self.class(),
            TypeClass::Integer | TypeClass::Decimal | TypeClass::Bit
        )
    }

    /// Returns true when the tag is a well-formed SQL type word sequence.
    pub(crate) fn is_well_formed(&self) -> bool {
        !self.0.is_empty()
            && self
                .0
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == ' ' || c == '_')
    }
}

impl From<String> for ColumnType {
    fn from(tag: String) -> Self {
        Self::new(tag)
    }
}

impl From<&str> for ColumnType {
    fn from(tag: &str) -> Self {
        Self::new(tag)
    }
}

impl From<ColumnType> for String {
    fn from(ty: ColumnType) -> Self {
        ty.0
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Type length or precision, rendered inside parentheses after the type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColumnLength {
    /// `(n)`, e.g. VARCHAR(255)
    Size(u32),
    /// `(p,s)`, e.g. DECIMAL(10,2)
    Precision(u32, u32),
}

impl fmt::Display for ColumnLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Size(n) => write!(f, "{n}"),
            Self::Precision(p, s) => write!(f, "{p},{s}"),
        }
    }
}

impl From<u32> for ColumnLength {
    fn from(n: u32) -> Self {
        Self::Size(n)
    }
}

impl From<(u32, u32)> for ColumnLength {
    fn from((p, s): (u32, u32)) -> Self {
        Self::Precision(p, s)
    }
}
