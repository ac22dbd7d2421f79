//! Financial year and fee period handling
//!
//! Fees follow the Indian financial year, which runs from 1 April of year Y
//! to 31 March of year Y+1 and is labelled "Y-(Y+1)" (e.g. "2024-25").
//! A [`FeePeriod`] is one calendar month inside that year; its due date is
//! always the first day of the month.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Month in which a financial year starts
pub const FINANCIAL_YEAR_START_MONTH: u32 = 4;

/// Number of monthly periods in one financial year
pub const MONTHS_PER_FINANCIAL_YEAR: usize = 12;

/// Errors related to calendar values
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CalendarError {
    #[error("Invalid month {0}: expected 1-12")]
    InvalidMonth(u32),

    #[error("Invalid year {0}")]
    InvalidYear(i32),

    #[error("Invalid financial year label '{0}': expected YYYY or YYYY-YY")]
    InvalidLabel(String),

    #[error("Unknown timezone: {0}")]
    UnknownTimezone(String),
}

/// One monthly fee period, identified by calendar month and year
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FeePeriod {
    // Field order makes the derived ordering chronological
    year: i32,
    month: u32,
}

impl FeePeriod {
    /// Creates a fee period, validating the month and year
    pub fn new(month: u32, year: i32) -> Result<Self, CalendarError> {
        if !(1..=12).contains(&month) {
            return Err(CalendarError::InvalidMonth(month));
        }
        if NaiveDate::from_ymd_opt(year, month, 1).is_none() {
            return Err(CalendarError::InvalidYear(year));
        }
        Ok(Self { year, month })
    }

    /// Returns the period containing the given date
    pub fn containing(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// Calendar month, 1-12
    pub fn month(&self) -> u32 {
        self.month
    }

    /// Calendar year the due date falls in
    pub fn year(&self) -> i32 {
        self.year
    }

    /// First calendar day of the period
    pub fn due_date(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
            .unwrap_or(NaiveDate::MIN)
    }

    /// The financial year this period belongs to
    pub fn financial_year(&self) -> FinancialYear {
        FinancialYear::containing(self.due_date())
    }

    /// Returns true if the date falls inside this calendar month
    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }
}

impl fmt::Display for FeePeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// An Indian financial year, identified by the calendar year it starts in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FinancialYear(i32);

impl FinancialYear {
    /// Creates the financial year starting on 1 April of `start_year`
    pub fn new(start_year: i32) -> Result<Self, CalendarError> {
        let end_year = start_year
            .checked_add(1)
            .ok_or(CalendarError::InvalidYear(start_year))?;
        if NaiveDate::from_ymd_opt(end_year, 3, 31).is_none()
            || NaiveDate::from_ymd_opt(start_year, FINANCIAL_YEAR_START_MONTH, 1).is_none()
        {
            return Err(CalendarError::InvalidYear(start_year));
        }
        Ok(Self(start_year))
    }

    /// Returns the financial year containing `date`
    ///
    /// April onwards belongs to the year that starts in the same calendar
    /// year; January to March belong to the year that started the previous
    /// April.
    pub fn containing(date: NaiveDate) -> Self {
        if date.month() >= FINANCIAL_YEAR_START_MONTH {
            Self(date.year())
        } else {
            Self(date.year() - 1)
        }
    }

    /// Calendar year in which this financial year starts
    pub fn start_year(&self) -> i32 {
        self.0
    }

    /// 1 April of the start year
    pub fn start_date(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.0, FINANCIAL_YEAR_START_MONTH, 1)
            .unwrap_or(NaiveDate::MIN)
    }

    /// 31 March of the following year
    pub fn end_date(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.0 + 1, 3, 31).unwrap_or(NaiveDate::MAX)
    }

    /// Returns true if the date lies within this financial year
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start_date() && date <= self.end_date()
    }

    /// The first period of the year (April of the start year)
    pub fn first_period(&self) -> FeePeriod {
        FeePeriod {
            year: self.0,
            month: FINANCIAL_YEAR_START_MONTH,
        }
    }

    /// The twelve monthly periods in order: April-December of the start
    /// year, then January-March of the following year
    pub fn periods(&self) -> Vec<FeePeriod> {
        let current = (FINANCIAL_YEAR_START_MONTH..=12).map(|month| FeePeriod {
            year: self.0,
            month,
        });
        let next = (1..FINANCIAL_YEAR_START_MONTH).map(|month| FeePeriod {
            year: self.0 + 1,
            month,
        });
        current.chain(next).collect()
    }

    /// Label in the "2024-25" form
    pub fn label(&self) -> String {
        format!("{}-{:02}", self.0, (self.0 + 1).rem_euclid(100))
    }
}

impl fmt::Display for FinancialYear {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FY {}", self.label())
    }
}

impl FromStr for FinancialYear {
    type Err = CalendarError;

    /// Accepts "2024", "2024-25" or "2024-2025"
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let invalid = || CalendarError::InvalidLabel(s.to_string());

        let (start, end) = match trimmed.split_once('-') {
            Some((start, end)) => (start, Some(end)),
            None => (trimmed, None),
        };

        if start.len() != 4 {
            return Err(invalid());
        }
        let start_year: i32 = start.parse().map_err(|_| invalid())?;

        if let Some(end) = end {
            let expected_full = start_year + 1;
            let matches = match end.len() {
                2 => end.parse::<i32>().ok() == Some(expected_full.rem_euclid(100)),
                4 => end.parse::<i32>().ok() == Some(expected_full),
                _ => false,
            };
            if !matches {
                return Err(invalid());
            }
        }

        FinancialYear::new(start_year)
    }
}

impl Serialize for FinancialYear {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.label())
    }
}

impl<'de> Deserialize<'de> for FinancialYear {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Timezone wrapper for the school's local calendar
///
/// Wraps chrono_tz::Tz with custom serialization support.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timezone(pub Tz);

impl Serialize for Timezone {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.0.name())
    }
}

impl<'de> Deserialize<'de> for Timezone {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

impl FromStr for Timezone {
    type Err = CalendarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Tz::from_str(s.trim())
            .map(Timezone)
            .map_err(|_| CalendarError::UnknownTimezone(s.to_string()))
    }
}

impl Timezone {
    pub fn new(tz: Tz) -> Self {
        Self(tz)
    }

    /// The local calendar date at the given instant
    pub fn date_at(&self, instant: DateTime<Utc>) -> NaiveDate {
        instant.with_timezone(&self.0).date_naive()
    }

    /// Today's local calendar date
    pub fn today(&self) -> NaiveDate {
        self.date_at(Utc::now())
    }
}

impl Default for Timezone {
    fn default() -> Self {
        Self(chrono_tz::Asia::Kolkata)
    }
}
