//! A single log record: `<day/month/year> <hostname>`

use crate::domain::date::Date;
use crate::domain::error::{DomainError, DomainResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Observation {
    pub date: Date,
    pub hostname: String,
}

impl Observation {
    /// Parse one log line. Tokens beyond the hostname are ignored.
    ///
    /// Returns `Ok(None)` for blank lines.
    pub fn parse(line: &str) -> DomainResult<Option<Self>> {
        let mut tokens = line.split_whitespace();
        let Some(date) = tokens.next() else {
            return Ok(None);
        };
        let hostname = tokens
            .next()
            .ok_or_else(|| DomainError::MalformedLine(line.trim().to_string()))?;
        Ok(Some(Self {
            date: date.parse()?,
            hostname: hostname.to_string(),
        }))
    }
}
