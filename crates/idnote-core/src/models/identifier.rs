//! Note identifier model

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// A digit-only note key (a numeric account handle).
///
/// Kept as the original digit string rather than a parsed integer so values
/// beyond any native integer range round-trip unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Identifier(String);

impl Identifier {
    /// Validate a submitted identifier.
    ///
    /// The value is trimmed first; it must then be non-empty and consist only
    /// of ASCII decimal digits.
    pub fn parse(raw: &str) -> Result<Self, Error> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(Error::EmptyIdentifier);
        }
        if !trimmed.chars().all(|c| c.is_ascii_digit()) {
            return Err(Error::InvalidIdentifier(trimmed.to_string()));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Get the string representation of this identifier
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Digits with leading zeros removed, used for numeric ordering.
    fn significant_digits(&self) -> &str {
        let stripped = self.0.trim_start_matches('0');
        if stripped.is_empty() {
            "0"
        } else {
            stripped
        }
    }
}

/// Strip every non-digit character from raw keyboard input.
///
/// # Examples
///
/// ```
/// use idnote_core::models::filter_identifier_input;
///
/// assert_eq!(filter_identifier_input("12a3 4-5"), "12345");
/// ```
#[must_use]
pub fn filter_identifier_input(raw: &str) -> String {
    raw.chars().filter(char::is_ascii_digit).collect()
}

impl Ord for Identifier {
    fn cmp(&self, other: &Self) -> Ordering {
        let (left, right) = (self.significant_digits(), other.significant_digits());
        left.len()
            .cmp(&right.len())
            .then_with(|| left.cmp(right))
            .then_with(|| self.0.cmp(&other.0))
    }
}

impl PartialOrd for Identifier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

impl FromStr for Identifier {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Identifier {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Identifier> for String {
    fn from(value: Identifier) -> Self {
        value.0
    }
}
