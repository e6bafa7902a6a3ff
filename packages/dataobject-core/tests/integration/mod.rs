//! Integration tests driving the engines through the recording gateway.
//!
//! Sections:
//! 1. Table DDL and schema files
//! 2. Single-table CRUD round trips
//! 3. Localized entity scenarios

pub mod helpers;
pub mod localized_tests;
pub mod record_table_tests;
pub mod schema_tests;
