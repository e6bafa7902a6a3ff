use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::value::{Record, Value};

/// Localized field values to write, keyed by language code.
pub type LocalizedContent = BTreeMap<String, Record>;

/// One logical entity read back from the primary and content tables.
///
/// Primary columns sit at the top level; content columns are grouped as
/// `localized[field][language]`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LocalizedRecord {
    /// Primary table columns
    #[serde(flatten)]
    pub fields: Record,
    /// Content values per field, then per language code
    #[serde(default)]
    pub localized: BTreeMap<String, BTreeMap<String, Value>>,
}

impl LocalizedRecord {
    /// Primary id, when present.
    pub fn id(&self) -> Option<i64> {
        self.fields.get_i64("id")
    }

    /// Primary column value.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Content value of `field` in `language`.
    pub fn localized_value(&self, field: &str, language: &str) -> Option<&Value> {
        self.localized.get(field)?.get(language)
    }

    /// Language codes carrying at least one content value.
    pub fn languages(&self) -> Vec<&str> {
        let mut codes: Vec<&str> = self
            .localized
            .values()
            .flat_map(|by_code| by_code.keys().map(String::as_str))
            .collect();
        codes.sort_unstable();
        codes.dedup();
        codes
    }
}
