//! Configuration access port trait.

use crate::domain::error::VoltimerError;
use chrono::NaiveDate;
use std::str::FromStr;

/// Raw values come from `get_string`; the typed getters treat unset or blank
/// keys as `default` and reject values that do not parse.
pub trait ConfigPort {
    fn get_string(&self, section: &str, key: &str) -> Option<String>;

    fn get_int(&self, section: &str, key: &str, default: i64) -> Result<i64, VoltimerError> {
        parse_value(self.get_string(section, key), section, key, "an integer")
            .map(|v| v.unwrap_or(default))
    }

    fn get_double(&self, section: &str, key: &str, default: f64) -> Result<f64, VoltimerError> {
        parse_value(self.get_string(section, key), section, key, "a number")
            .map(|v| v.unwrap_or(default))
    }

    /// Optional `YYYY-MM-DD` date. Blank values count as unset.
    fn get_date(&self, section: &str, key: &str) -> Result<Option<NaiveDate>, VoltimerError> {
        match self.get_string(section, key) {
            Some(s) if !s.trim().is_empty() => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
                .map(Some)
                .map_err(|_| VoltimerError::ConfigInvalid {
                    section: section.to_string(),
                    key: key.to_string(),
                    reason: "invalid date format (expected YYYY-MM-DD)".into(),
                }),
            _ => Ok(None),
        }
    }
}

fn parse_value<T: FromStr>(
    raw: Option<String>,
    section: &str,
    key: &str,
    expected: &str,
) -> Result<Option<T>, VoltimerError> {
    match raw {
        Some(s) if !s.trim().is_empty() => {
            s.trim()
                .parse::<T>()
                .map(Some)
                .map_err(|_| VoltimerError::ConfigInvalid {
                    section: section.to_string(),
                    key: key.to_string(),
                    reason: format!("expected {expected}, got '{}'", s.trim()),
                })
        }
        _ => Ok(None),
    }
}
