use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use std::str::FromStr;

use crate::error::ValidationError;
use crate::models::parse_number;

/// A report request as typed by a user, before range checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ReportRequest {
    pub owner_id: i64,
    pub year: i64,
    pub month: i64,
}

impl ReportRequest {
    pub(crate) fn parse(owner: &str, year: &str, month: &str) -> Result<Self, ValidationError> {
        Ok(Self {
            owner_id: parse_number("userid", owner)?,
            year: parse_number("year", year)?,
            month: parse_number("month", month)?,
        })
    }
}

/// Parse `YYYY-MM-DD` as the start of that day in UTC.
pub(crate) fn parse_date(raw: &str) -> Result<DateTime<Utc>, ValidationError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map(|date| date.and_time(NaiveTime::MIN).and_utc())
        .map_err(|_| ValidationError::InvalidDate(raw.to_string()))
}

pub(crate) fn parse_amount(raw: &str) -> Result<Decimal, ValidationError> {
    let trimmed = raw.trim().trim_start_matches('$');
    if trimmed.is_empty() {
        return Err(ValidationError::MissingParameter("sum"));
    }
    Decimal::from_str(trimmed).map_err(|_| ValidationError::NotANumber {
        field: "sum",
        value: raw.to_string(),
    })
}
