//! Hostname to top-level domain extraction

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::error::{DomainError, DomainResult};

pub const DEFAULT_SEPARATOR: char = '.';

/// What to do with a hostname that contains no separator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NoSeparatorPolicy {
    /// Refuse the observation, leaving the tree untouched.
    #[default]
    Reject,
    /// Use the whole hostname as the key.
    WholeHostname,
}

impl FromStr for NoSeparatorPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "reject" => Ok(Self::Reject),
            "whole-hostname" | "whole_hostname" => Ok(Self::WholeHostname),
            other => Err(format!(
                "unknown no-separator policy '{}', expected reject or whole-hostname",
                other
            )),
        }
    }
}

/// Extraction rules applied to every hostname before it becomes a tree key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TldExtractor {
    pub separator: char,
    pub no_separator: NoSeparatorPolicy,
}

impl Default for TldExtractor {
    fn default() -> Self {
        Self {
            separator: DEFAULT_SEPARATOR,
            no_separator: NoSeparatorPolicy::default(),
        }
    }
}

impl TldExtractor {
    pub fn new(separator: char, no_separator: NoSeparatorPolicy) -> Self {
        Self {
            separator,
            no_separator,
        }
    }

    /// Copy out everything after the last separator.
    ///
    /// Case is preserved: `COM` and `com` are different keys.
    pub fn extract(&self, hostname: &str) -> DomainResult<String> {
        let tld = match hostname.rfind(self.separator) {
            Some(pos) => &hostname[pos + self.separator.len_utf8()..],
            None => match self.no_separator {
                NoSeparatorPolicy::Reject => {
                    return Err(DomainError::MissingSeparator {
                        hostname: hostname.to_string(),
                        separator: self.separator,
                    })
                }
                NoSeparatorPolicy::WholeHostname => hostname,
            },
        };
        if tld.is_empty() {
            return Err(DomainError::EmptyTld(hostname.to_string()));
        }
        Ok(tld.to_string())
    }
}

/// Extract with the default `.` separator and reject policy.
pub fn extract_tld(hostname: &str) -> DomainResult<String> {
    TldExtractor::default().extract(hostname)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("a.com", "com")]
    #[case("b.co.uk", "uk")]
    #[case("www.Example.ORG", "ORG")]
    #[case(".io", "io")]
    fn given_hostname_when_extracting_then_returns_suffix(#[case] host: &str, #[case] tld: &str) {
        assert_eq!(extract_tld(host).unwrap(), tld);
    }

    #[test]
    fn given_no_separator_and_reject_policy_when_extracting_then_fails() {
        let err = extract_tld("localhost").unwrap_err();
        assert_eq!(
            err,
            DomainError::MissingSeparator {
                hostname: "localhost".into(),
                separator: '.'
            }
        );
    }

    #[test]
    fn given_no_separator_and_whole_policy_when_extracting_then_uses_hostname() {
        let extractor = TldExtractor::new('.', NoSeparatorPolicy::WholeHostname);
        assert_eq!(extractor.extract("localhost").unwrap(), "localhost");
    }

    #[test]
    fn given_trailing_separator_when_extracting_then_fails_with_empty_tld() {
        assert!(matches!(
            extract_tld("example."),
            Err(DomainError::EmptyTld(_))
        ));
    }

    #[test]
    fn given_empty_hostname_with_whole_policy_when_extracting_then_fails_with_empty_tld() {
        let extractor = TldExtractor::new('.', NoSeparatorPolicy::WholeHostname);
        assert!(matches!(extractor.extract(""), Err(DomainError::EmptyTld(_))));
    }

    #[rstest]
    #[case("reject", NoSeparatorPolicy::Reject)]
    #[case("Whole-Hostname", NoSeparatorPolicy::WholeHostname)]
    #[case("whole_hostname", NoSeparatorPolicy::WholeHostname)]
    fn given_policy_name_when_parsing_then_matches(
        #[case] name: &str,
        #[case] expected: NoSeparatorPolicy,
    ) {
        assert_eq!(name.parse::<NoSeparatorPolicy>().unwrap(), expected);
    }

    #[test]
    fn given_custom_separator_when_extracting_then_splits_on_it() {
        let extractor = TldExtractor::new(':', NoSeparatorPolicy::Reject);
        assert_eq!(extractor.extract("a.b:c").unwrap(), "c");
    }
}
