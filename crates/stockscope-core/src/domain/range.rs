use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::{Date, Time};

use crate::{Period, ValidationError};

const DATE_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");
const TIME_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[hour]:[minute][optional [:[second][optional [.[subsecond]]]]]");

/// Parse a `YYYY-MM-DD` calendar date. A trailing wall-clock time
/// (`2024-05-01T00:00:00`, `2024-05-01 09:30`, optionally ending in `Z`) is
/// checked and ignored; any other suffix is rejected.
pub fn parse_date(field: &'static str, input: &str) -> Result<Date, ValidationError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::MissingDate { field });
    }
    let invalid = || ValidationError::InvalidDate {
        field,
        value: trimmed.to_owned(),
    };

    let (day_part, time_part) = match trimmed.split_once(['T', ' ']) {
        Some((day, time)) => (day, Some(time)),
        None => (trimmed, None),
    };
    if let Some(time_part) = time_part {
        let clock = time_part.strip_suffix('Z').unwrap_or(time_part);
        Time::parse(clock, TIME_FORMAT).map_err(|_| invalid())?;
    }
    Date::parse(day_part, DATE_FORMAT).map_err(|_| invalid())
}

pub fn format_date(date: Date) -> String {
    date.format(DATE_FORMAT)
        .unwrap_or_else(|_| String::from("<unformattable>"))
}

/// Which pair of range fields is active on the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum FilterMode {
    #[default]
    #[serde(rename = "period")]
    ByPeriod,
    #[serde(rename = "dates")]
    ByDateRange,
}

impl FilterMode {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ByPeriod => "period",
            Self::ByDateRange => "dates",
        }
    }
}

impl Display for FilterMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FilterMode {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "period" => Ok(Self::ByPeriod),
            "dates" | "range" => Ok(Self::ByDateRange),
            other => Err(ValidationError::InvalidFilterMode {
                value: other.to_owned(),
            }),
        }
    }
}

/// Validated time range sent to both endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RangeSpec {
    Period(Period),
    Dates { start: Date, end: Date },
}

impl RangeSpec {
    /// Build a date range, enforcing `start <= end <= today`.
    pub fn dates(start: Date, end: Date, today: Date) -> Result<Self, ValidationError> {
        if start > end || end > today {
            return Err(ValidationError::InvalidRange);
        }
        Ok(Self::Dates { start, end })
    }

    pub const fn mode(&self) -> FilterMode {
        match self {
            Self::Period(_) => FilterMode::ByPeriod,
            Self::Dates { .. } => FilterMode::ByDateRange,
        }
    }

    /// Query-string pairs in wire order.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        match self {
            Self::Period(period) => vec![("period", period.as_str().to_owned())],
            Self::Dates { start, end } => {
                vec![("start", format_date(*start)), ("end", format_date(*end))]
            }
        }
    }
}

impl Display for RangeSpec {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Period(period) => write!(f, "{period}"),
            Self::Dates { start, end } => {
                write!(f, "{}..{}", format_date(*start), format_date(*end))
            }
        }
    }
}
