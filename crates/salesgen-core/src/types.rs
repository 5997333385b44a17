use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Customer identifier; the variant depends on the identity policy in use.
///
/// Hashed identities are non-negative integers that fit a signed 64-bit
/// column. Random identities are hyphenated UUID strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum CustomerId {
    Numeric(i64),
    Token(String),
}

impl CustomerId {
    /// Parse an identifier read back from a persisted dataset.
    pub fn parse(raw: &str) -> Result<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(Error::InvalidRecord("empty customer id".to_string()));
        }
        if raw.bytes().all(|byte| byte.is_ascii_digit()) {
            if let Ok(value) = raw.parse::<i64>() {
                return Ok(Self::Numeric(value));
            }
        }
        Ok(Self::Token(raw.to_string()))
    }
}

impl fmt::Display for CustomerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Numeric(value) => write!(f, "{value}"),
            Self::Token(value) => f.write_str(value),
        }
    }
}

/// Lower-cased, trimmed email address used as the customer pool key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema)]
#[serde(try_from = "String", into = "String")]
pub struct NormalizedEmail(String);

impl NormalizedEmail {
    /// Trim and lower-case `raw`.
    ///
    /// Empty input and input with interior whitespace or control characters
    /// are rejected. The `@` is not required: identities may be derived from
    /// bare local parts.
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(Error::InvalidEmail("email is empty".to_string()));
        }
        if trimmed
            .chars()
            .any(|ch| ch.is_whitespace() || ch.is_control())
        {
            return Err(Error::InvalidEmail(format!(
                "email '{}' contains whitespace or control characters",
                trimmed.escape_debug()
            )));
        }
        if trimmed.matches('@').count() > 1 {
            return Err(Error::InvalidEmail(format!(
                "email '{trimmed}' contains more than one '@'"
            )));
        }
        Ok(Self(trimmed.to_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Domain part after `@`, when present.
    pub fn domain(&self) -> Option<&str> {
        self.0.split_once('@').map(|(_, domain)| domain)
    }
}

impl fmt::Display for NormalizedEmail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for NormalizedEmail {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<NormalizedEmail> for String {
    fn from(value: NormalizedEmail) -> Self {
        value.0
    }
}
