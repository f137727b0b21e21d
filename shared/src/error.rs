use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Error as JsonError;
use thiserror::Error;
use validator::ValidationErrors;

#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum SharedError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Conversion error: {0}")]
    Conversion(String),

    #[error("Invalid settlement period: {year}-{month} week {week}")]
    InvalidPeriod { year: i32, month: u32, week: u32 },

    #[error("No settlement week {week} in {year}-{month:02}")]
    WeekNotFound { year: i32, month: u32, week: u32 },

    #[error("Invalid season rule: {0}")]
    InvalidRule(String),

    #[error("Date range error: start date {start} must not be after end date {end}")]
    InvalidDateRange { start: NaiveDate, end: NaiveDate },
}

impl SharedError {
    /// True when the error describes a period that simply has no data,
    /// as opposed to malformed input or broken configuration.
    pub fn is_not_found(&self) -> bool {
        matches!(self, SharedError::WeekNotFound { .. })
    }
}

impl From<ValidationErrors> for SharedError {
    fn from(errors: ValidationErrors) -> Self {
        Self::Validation(errors.to_string())
    }
}

impl From<JsonError> for SharedError {
    fn from(error: JsonError) -> Self {
        Self::Conversion(error.to_string())
    }
}

pub type Result<T> = std::result::Result<T, SharedError>;
