// crates/ret-catalog-core/src/core/time.rs
// ============================================================================
// Module: Retriever Catalog Time Model
// Description: Dependency date parsing and formatting for datastreams.
// Purpose: Convert the catalog's nullable date text cells to typed values.
// Dependencies: serde, thiserror, time
// ============================================================================

//! ## Overview
//! Datastream begin/end dependency dates arrive from the tabular source as
//! nullable text in the catalog's `YYYY-MM-DD HH:MM:SS` form (the time part
//! may be absent). They are stored as unix seconds and rendered back in the
//! same form. The core never reads wall-clock time.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;
use time::Date;
use time::PrimitiveDateTime;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;

// ============================================================================
// SECTION: Formats
// ============================================================================

/// Catalog date-time format.
const DATE_TIME_FORMAT: &[BorrowedFormatItem<'_>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");

/// Catalog date-only format.
const DATE_FORMAT: &[BorrowedFormatItem<'_>] = format_description!("[year]-[month]-[day]");

// ============================================================================
// SECTION: Dependency Date
// ============================================================================

/// Date constraint on a datastream dependency, stored as unix seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DependencyDate(i64);

impl DependencyDate {
    /// Creates a dependency date from unix seconds.
    #[must_use]
    pub const fn from_unix_seconds(seconds: i64) -> Self {
        Self(seconds)
    }

    /// Returns the date as unix seconds.
    #[must_use]
    pub const fn unix_seconds(self) -> i64 {
        self.0
    }

    /// Parses a dependency date from catalog text.
    ///
    /// Accepts `YYYY-MM-DD HH:MM:SS` or `YYYY-MM-DD` (midnight assumed).
    ///
    /// # Errors
    ///
    /// Returns [`DateParseError`] when the text matches neither form.
    pub fn parse(text: &str) -> Result<Self, DateParseError> {
        let trimmed = text.trim();
        if let Ok(datetime) = PrimitiveDateTime::parse(trimmed, DATE_TIME_FORMAT) {
            return Ok(Self(datetime.assume_utc().unix_timestamp()));
        }
        if let Ok(date) = Date::parse(trimmed, DATE_FORMAT) {
            let datetime = date.midnight();
            return Ok(Self(datetime.assume_utc().unix_timestamp()));
        }
        Err(DateParseError::Unrecognized(trimmed.to_string()))
    }
}

impl fmt::Display for DependencyDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match time::OffsetDateTime::from_unix_timestamp(self.0) {
            Ok(datetime) => {
                let primitive = PrimitiveDateTime::new(datetime.date(), datetime.time());
                match primitive.format(DATE_TIME_FORMAT) {
                    Ok(text) => f.write_str(&text),
                    Err(_) => write!(f, "{}", self.0),
                }
            }
            Err(_) => write!(f, "{}", self.0),
        }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Dependency date parsing errors.
#[derive(Debug, Error)]
pub enum DateParseError {
    /// The text matched neither catalog date form.
    #[error("unrecognized dependency date: {0}")]
    Unrecognized(String),
}

// ============================================================================
// SECTION: Tests
// ============================================================================

/// Dependency date parsing and formatting tests.
#[cfg(test)]
mod tests {
    use super::DateParseError;
    use super::DependencyDate;

    /// Test result alias.
    type TestResult = Result<(), DateParseError>;

    #[test]
    fn parses_date_time_form() -> TestResult {
        let date = DependencyDate::parse("2016-10-01 12:30:00")?;
        assert_eq!(date.to_string(), "2016-10-01 12:30:00");
        Ok(())
    }

    #[test]
    fn parses_date_only_form_as_midnight() -> TestResult {
        let date = DependencyDate::parse("2016-10-01")?;
        assert_eq!(date, DependencyDate::parse("2016-10-01 00:00:00")?);
        Ok(())
    }

    #[test]
    fn trims_surrounding_whitespace() -> TestResult {
        let date = DependencyDate::parse("  2016-10-01 00:00:00 ")?;
        assert_eq!(date.to_string(), "2016-10-01 00:00:00");
        Ok(())
    }

    #[test]
    fn rejects_unrecognized_text() {
        assert!(DependencyDate::parse("October 1st").is_err());
        assert!(DependencyDate::parse("").is_err());
    }

    #[test]
    fn round_trips_unix_seconds() {
        let date = DependencyDate::from_unix_seconds(1_475_280_000);
        assert_eq!(date.unix_seconds(), 1_475_280_000);
    }
}
