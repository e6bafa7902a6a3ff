//! Statement rendering: structured SELECT conditions and write builders.

mod builder;
mod condition;

pub use builder::{equality_clause, insert_sql, set_clause, update_sql};
pub use condition::Condition;
