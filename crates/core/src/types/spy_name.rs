//! Spy display name.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`SpyName`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SpyNameError {
    /// The name is shorter than the minimum.
    #[error("name must be at least {min} characters")]
    TooShort {
        /// Minimum allowed length.
        min: usize,
    },
    /// The name is longer than the maximum.
    #[error("name must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
}

/// A spy name between 3 and 50 characters (counted as Unicode scalars).
///
/// Names are not unique; two spies of the same owner may share one.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "String", into = "String")]
pub struct SpyName(String);

impl SpyName {
    /// Minimum name length.
    pub const MIN_LENGTH: usize = 3;
    /// Maximum name length.
    pub const MAX_LENGTH: usize = 50;

    /// Parse a `SpyName`.
    ///
    /// # Errors
    ///
    /// Returns an error if the name has fewer than 3 or more than 50 characters.
    pub fn parse(s: &str) -> Result<Self, SpyNameError> {
        let len = s.chars().count();
        if len < Self::MIN_LENGTH {
            return Err(SpyNameError::TooShort {
                min: Self::MIN_LENGTH,
            });
        }
        if len > Self::MAX_LENGTH {
            return Err(SpyNameError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }
        Ok(Self(s.to_owned()))
    }

    /// Returns the name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SpyName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for SpyName {
    type Error = SpyNameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<SpyName> for String {
    fn from(name: SpyName) -> Self {
        name.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds() {
        assert!(SpyName::parse("fox").is_ok());
        assert!(SpyName::parse(&"x".repeat(50)).is_ok());
        assert_eq!(SpyName::parse("ab"), Err(SpyNameError::TooShort { min: 3 }));
        assert_eq!(
            SpyName::parse(&"x".repeat(51)),
            Err(SpyNameError::TooLong { max: 50 })
        );
    }

    #[test]
    fn test_counts_characters_not_bytes() {
        // three characters, six bytes
        assert!(SpyName::parse("éèà").is_ok());
    }
}
