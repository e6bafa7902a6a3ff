//! Folding of joined primary/content rows into localized records.

use std::collections::HashMap;

use crate::schema::TableSchema;
use crate::value::{Record, Value};

use super::record::LocalizedRecord;

/// Prefix of primary columns in joined rows.
pub(crate) const PRIMARY_PREFIX: &str = "p_";

/// Prefix of content columns in joined rows.
pub(crate) const CONTENT_PREFIX: &str = "c_";

/// Content columns that link rows rather than carry localized values.
pub(crate) const STRUCTURAL_COLUMNS: [&str; 3] = ["id", "parent_id", "code"];

/// Groups joined rows by primary id, in first-seen order.
///
/// Primary fields are taken from the first row of each entity; every
/// non-structural content field lands in `localized[field][code]`.
pub(crate) fn fold_rows(
    primary: &TableSchema,
    content: &TableSchema,
    rows: Vec<Record>,
) -> Vec<LocalizedRecord> {
    let mut records: Vec<LocalizedRecord> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();

    for raw in rows {
        let fields = primary.materialize(&raw, PRIMARY_PREFIX);
        let key = fields.get("id").map(Value::to_string).unwrap_or_default();
        let position = *positions.entry(key).or_insert_with(|| {
            records.push(LocalizedRecord {
                fields,
                ..LocalizedRecord::default()
            });
            records.len() - 1
        });

        let localized = content.materialize(&raw, CONTENT_PREFIX);
        let code = match localized.get("code") {
            Some(Value::Null) | None => continue,
            Some(code) => code.to_string(),
        };
        let entry = &mut records[position];
        for (field, value) in localized {
            if STRUCTURAL_COLUMNS.contains(&field.as_str()) {
                continue;
            }
            entry
                .localized
                .entry(field)
                .or_default()
                .insert(code.clone(), value);
        }
    }

    records
}
