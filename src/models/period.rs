use chrono::{DateTime, Datelike, Days, Months, NaiveDate, NaiveTime, TimeDelta, Utc};

use crate::error::ValidationError;

/// A calendar month. All boundaries are computed in UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    first_day: NaiveDate,
}

impl YearMonth {
    pub fn new(year: i64, month: i64) -> Result<Self, ValidationError> {
        if !(1..=12).contains(&month) {
            return Err(ValidationError::MonthOutOfRange(month));
        }
        if !(1..=9999).contains(&year) {
            return Err(ValidationError::YearOutOfRange(year));
        }
        // Both components were range-checked above.
        let first_day = NaiveDate::from_ymd_opt(year as i32, month as u32, 1)
            .ok_or(ValidationError::YearOutOfRange(year))?;
        Ok(Self { first_day })
    }

    /// The month an instant falls in.
    pub fn containing(instant: DateTime<Utc>) -> Self {
        let date = instant.date_naive();
        Self {
            first_day: date - Days::new(u64::from(date.day0())),
        }
    }

    /// Parse `YYYY-MM`.
    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        let (year, month) = s
            .trim()
            .split_once('-')
            .ok_or_else(|| ValidationError::NotANumber {
                field: "month",
                value: s.to_string(),
            })?;
        let year = parse_number("year", year)?;
        let month = parse_number("month", month)?;
        Self::new(year, month)
    }

    pub fn year(&self) -> i32 {
        self.first_day.year()
    }

    pub fn month(&self) -> u32 {
        self.first_day.month()
    }

    /// First instant of the month.
    pub fn start(&self) -> DateTime<Utc> {
        self.first_day.and_time(NaiveTime::MIN).and_utc()
    }

    /// First instant of the following month (exclusive end of this one).
    pub fn next_start(&self) -> DateTime<Utc> {
        self.next().start()
    }

    /// Last representable instant of the month.
    pub fn last_instant(&self) -> DateTime<Utc> {
        self.next_start() - TimeDelta::nanoseconds(1)
    }

    /// True once the whole month lies in the past relative to `now`.
    pub fn has_elapsed(&self, now: DateTime<Utc>) -> bool {
        now > self.last_instant()
    }

    pub fn next(&self) -> Self {
        Self {
            first_day: self
                .first_day
                .checked_add_months(Months::new(1))
                .unwrap_or(NaiveDate::MAX),
        }
    }

    pub fn prev(&self) -> Self {
        Self {
            first_day: self
                .first_day
                .checked_sub_months(Months::new(1))
                .unwrap_or(self.first_day),
        }
    }
}

impl std::fmt::Display for YearMonth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year(), self.month())
    }
}

/// Parse a whole number from user input, naming the field on failure.
pub fn parse_number(field: &'static str, raw: &str) -> Result<i64, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::MissingParameter(field));
    }
    trimmed.parse::<i64>().map_err(|_| ValidationError::NotANumber {
        field,
        value: raw.to_string(),
    })
}
