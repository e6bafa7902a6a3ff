//! Engine configuration and per-operation context.

use std::env;

use chrono::{Local, NaiveDateTime};

use crate::error::{DataError, Result};

/// Environment variable holding the acting account id.
pub const ACTOR_ID_ENV: &str = "DATAOBJECT_ACTOR_ID";

/// Environment variable selecting soft delete over hard delete.
pub const KEEP_DATA_ENV: &str = "DATAOBJECT_KEEP_DATA";

/// Timestamp layout written into audit columns.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Data-access configuration.
#[derive(Debug, Clone)]
pub struct DataObjectConfig {
    /// Suffix appended to a localized entity's name for its content table
    pub content_suffix: String,
    /// Length of the content table's language `code` column
    pub code_length: u32,
    /// Collation for MySQL tables (None = connection collation)
    pub collation: Option<String>,
    /// AUTO_INCREMENT start for MySQL tables with an auto column
    pub auto_increment_start: u64,
    /// Actor stamped into created_by/updated_by when callers omit it
    pub default_actor: Option<i64>,
    /// Soft-deactivate instead of hard delete
    pub keep_inactive: bool,
}

impl Default for DataObjectConfig {
    fn default() -> Self {
        Self {
            content_suffix: "_content".to_string(),
            code_length: 6,
            collation: None,
            auto_increment_start: 1,
            default_actor: None,
            keep_inactive: false,
        }
    }
}

impl DataObjectConfig {
    /// Defaults overlaid with `DATAOBJECT_ACTOR_ID` and `DATAOBJECT_KEEP_DATA`.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(raw) = env::var(ACTOR_ID_ENV) {
            if !raw.trim().is_empty() {
                let actor = raw.trim().parse::<i64>().map_err(|_| {
                    DataError::Config(format!("{ACTOR_ID_ENV} must be an integer, got '{raw}'"))
                })?;
                config.default_actor = Some(actor);
            }
        }

        if let Ok(raw) = env::var(KEEP_DATA_ENV) {
            config.keep_inactive = parse_flag(&raw).ok_or_else(|| {
                DataError::Config(format!("{KEEP_DATA_ENV} must be true/false, got '{raw}'"))
            })?;
        }

        Ok(config)
    }

    /// Operation context carrying this configuration's actor and delete policy.
    pub fn context(&self) -> OperationContext {
        OperationContext {
            actor: self.default_actor,
            keep_inactive: self.keep_inactive,
            now: None,
        }
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}

/// Inputs a write operation needs from the surrounding application.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OperationContext {
    /// Who is performing the write
    pub actor: Option<i64>,
    /// Soft-deactivate instead of hard delete
    pub keep_inactive: bool,
    /// Fixed clock for audit stamps (None = local time)
    pub now: Option<NaiveDateTime>,
}

impl OperationContext {
    /// Context acting as `actor`.
    pub fn with_actor(actor: i64) -> Self {
        Self {
            actor: Some(actor),
            ..Self::default()
        }
    }

    /// Sets the delete policy.
    pub fn keep_inactive(mut self, keep: bool) -> Self {
        self.keep_inactive = keep;
        self
    }

    /// Pins the audit clock.
    pub fn at(mut self, now: NaiveDateTime) -> Self {
        self.now = Some(now);
        self
    }

    /// Audit timestamp text.
    pub fn timestamp(&self) -> String {
        self.now
            .unwrap_or_else(|| Local::now().naive_local())
            .format(TIMESTAMP_FORMAT)
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_defaults() {
        let config = DataObjectConfig::default();
        assert_eq!(config.content_suffix, "_content");
        assert_eq!(config.code_length, 6);
        assert!(!config.keep_inactive);
        assert_eq!(config.context(), OperationContext::default());
    }

    #[test]
    fn test_fixed_clock_formatting() {
        let now = NaiveDate::from_ymd_opt(2024, 3, 9)
            .unwrap()
            .and_hms_opt(8, 5, 1)
            .unwrap();
        let ctx = OperationContext::with_actor(4).at(now);
        assert_eq!(ctx.timestamp(), "2024-03-09 08:05:01");
        assert_eq!(ctx.actor, Some(4));
    }

    #[test]
    fn test_flag_parsing() {
        assert_eq!(parse_flag("true"), Some(true));
        assert_eq!(parse_flag(" 1 "), Some(true));
        assert_eq!(parse_flag("false"), Some(false));
        assert_eq!(parse_flag("maybe"), None);
    }
}
