//! Rendering helpers for INSERT/UPDATE statements with named placeholders.

/// `INSERT INTO <table>(a, b) VALUES(:a, :b)`.
pub fn insert_sql(table: &str, columns: &[&str]) -> String {
    let names = columns.join(", ");
    let placeholders = columns
        .iter()
        .map(|c| format!(":{c}"))
        .collect::<Vec<_>>()
        .join(", ");
    format!("INSERT INTO {table}({names}) VALUES({placeholders})")
}

/// `a=:a, b=:b`.
pub fn set_clause(columns: &[&str]) -> String {
    columns
        .iter()
        .map(|c| format!("{c}=:{c}"))
        .collect::<Vec<_>>()
        .join(", ")
}

/// `UPDATE <table> SET a=:a, b=:b WHERE <where_sql>`.
pub fn update_sql(table: &str, columns: &[&str], where_sql: &str) -> String {
    format!("UPDATE {table} SET {} WHERE {where_sql}", set_clause(columns))
}

/// `<col>=:<placeholder> AND ...` for `(column, placeholder)` pairs.
pub fn equality_clause<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> String {
    pairs
        .into_iter()
        .map(|(column, placeholder)| format!("{column}=:{placeholder}"))
        .collect::<Vec<_>>()
        .join(" AND ")
}
