//! Single-table CRUD engine with auditing and soft deletion.

mod record_table;
mod soft_delete;

pub use record_table::RecordTable;
