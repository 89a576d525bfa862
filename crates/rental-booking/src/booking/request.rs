use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::domain::DateRange;
use super::validation::ValidationError;

/// Date format accepted and emitted at every boundary.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Raw booking form as submitted by a tenant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingRequest {
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
}

impl BookingRequest {
    pub fn new(start_date: impl Into<String>, end_date: impl Into<String>) -> Self {
        Self {
            start_date: Some(start_date.into()),
            end_date: Some(end_date.into()),
        }
    }

    /// Turn the form into typed dates. Stops at the first problem.
    pub fn parse(&self) -> Result<DateRange, ValidationError> {
        let start = present(self.start_date.as_deref()).ok_or(ValidationError::MissingStartDate)?;
        let end = present(self.end_date.as_deref()).ok_or(ValidationError::MissingEndDate)?;

        let start_date = parse_date(start).map_err(|_| ValidationError::InvalidDateFormat)?;
        let end_date = parse_date(end).map_err(|_| ValidationError::InvalidDateFormat)?;

        Ok(DateRange::new(start_date, end_date))
    }
}

fn present(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

pub fn parse_date(raw: &str) -> Result<NaiveDate, chrono::ParseError> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT)
}
