use std::{fmt, str::FromStr};

use crate::error::Error;

/// Opaque name of a single display panel.
///
/// Two identifiers are equal only if their text is byte-for-byte equal.
/// Identifiers are concatenated into panel addresses, so they may not be
/// empty and may not contain whitespace or control characters.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct StateId(String);

impl StateId {
    pub fn new(raw: impl Into<String>) -> Result<Self, Error> {
        let raw = raw.into();
        if raw.is_empty() {
            return Err(Error::EmptyStateId);
        }

        if raw.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err(Error::InvalidStateId(raw));
        }

        Ok(Self(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for StateId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for StateId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl PartialEq<str> for StateId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for StateId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}
