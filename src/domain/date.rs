//! Calendar date used as the range filter for observations.
//!
//! Only the range checks `1..=31` for day and `1..=12` for month are applied;
//! `31/02/2021` is a valid date here.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::domain::error::DomainError;

/// A day on the calendar, ordered by (year, month, day).
///
/// Field order matters: the derived `Ord` compares lexicographically in
/// declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Date {
    year: i32,
    month: u8,
    day: u8,
}

impl Date {
    /// Build a date from its parts, applying the same checks as parsing.
    pub fn new(day: u32, month: u32, year: i32) -> Result<Self, DomainError> {
        let text = format!("{}/{}/{}", day, month, year);
        Self::validated(&text, day, month, year)
    }

    fn validated(input: &str, day: u32, month: u32, year: i32) -> Result<Self, DomainError> {
        if !(1..=31).contains(&day) {
            return Err(DomainError::invalid_date(input, "day must be in 1..=31"));
        }
        if !(1..=12).contains(&month) {
            return Err(DomainError::invalid_date(input, "month must be in 1..=12"));
        }
        if year <= 0 {
            return Err(DomainError::invalid_date(input, "year must be positive"));
        }
        Ok(Self {
            year,
            month: month as u8,
            day: day as u8,
        })
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        u32::from(self.month)
    }

    pub fn day(&self) -> u32 {
        u32::from(self.day)
    }

    /// Three-way comparison where an absent date sorts before any present one.
    pub fn compare_optional(a: Option<&Date>, b: Option<&Date>) -> Ordering {
        match (a, b) {
            (Some(a), Some(b)) => a.cmp(b),
            (Some(_), None) => Ordering::Greater,
            (None, Some(_)) => Ordering::Less,
            (None, None) => Ordering::Equal,
        }
    }
}

impl FromStr for Date {
    type Err = DomainError;

    /// Parse `day/month/year`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim();
        let mut fields = text.split('/');
        let mut next_field = |name: &str| -> Result<i64, DomainError> {
            let raw = fields
                .next()
                .ok_or_else(|| DomainError::invalid_date(text, format!("missing {}", name)))?;
            raw.trim()
                .parse::<i64>()
                .map_err(|_| DomainError::invalid_date(text, format!("{} is not a number", name)))
        };

        let day = next_field("day")?;
        let month = next_field("month")?;
        let year = next_field("year")?;
        if fields.next().is_some() {
            return Err(DomainError::invalid_date(text, "expected day/month/year"));
        }

        let day = u32::try_from(day)
            .map_err(|_| DomainError::invalid_date(text, "day must be in 1..=31"))?;
        let month = u32::try_from(month)
            .map_err(|_| DomainError::invalid_date(text, "month must be in 1..=12"))?;
        let year = i32::try_from(year)
            .map_err(|_| DomainError::invalid_date(text, "year out of range"))?;
        Self::validated(text, day, month, year)
    }
}

impl fmt::Display for Date {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}/{:02}/{:04}", self.day, self.month, self.year)
    }
}
