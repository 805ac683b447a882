//! Hex color display attribute for spies.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`HexColor`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum HexColorError {
    /// The input string is empty.
    #[error("color is required")]
    Empty,
    /// The input does not start with `#`.
    #[error("color must start with '#'")]
    MissingHash,
    /// The input has the wrong number of digits.
    #[error("color must have 3 or 6 hex digits (got {0})")]
    Length(usize),
    /// The input contains a non-hex character.
    #[error("color contains invalid hex digit '{0}'")]
    InvalidDigit(char),
}

/// A CSS-style hex color: `#RGB` or `#RRGGBB`, digits in either case.
///
/// The text is kept exactly as submitted, so a client reading a spy back gets
/// the same token it sent.
///
/// ```
/// use pixel_spy_core::HexColor;
///
/// assert!(HexColor::parse("#abc123").is_ok());
/// assert!(HexColor::parse("#FFF").is_ok());
/// assert!(HexColor::parse("#ZZZZZZ").is_err());
/// assert!(HexColor::parse("112233").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "String", into = "String")]
pub struct HexColor(String);

impl HexColor {
    /// Parse a `HexColor`.
    ///
    /// # Errors
    ///
    /// Returns an error unless the trimmed input is `#` followed by exactly
    /// 3 or 6 ASCII hex digits.
    pub fn parse(s: &str) -> Result<Self, HexColorError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(HexColorError::Empty);
        }

        let digits = s.strip_prefix('#').ok_or(HexColorError::MissingHash)?;

        if let Some(bad) = digits.chars().find(|c| !c.is_ascii_hexdigit()) {
            return Err(HexColorError::InvalidDigit(bad));
        }

        match digits.len() {
            3 | 6 => Ok(Self(s.to_owned())),
            n => Err(HexColorError::Length(n)),
        }
    }

    /// Returns the color as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Expands the color to lowercase `#rrggbb` form.
    ///
    /// Used to compare colors that differ only in case or shorthand.
    #[must_use]
    pub fn canonical(&self) -> String {
        let digits = self.0.trim_start_matches('#').to_ascii_lowercase();
        if digits.len() == 3 {
            let mut out = String::with_capacity(7);
            out.push('#');
            for c in digits.chars() {
                out.push(c);
                out.push(c);
            }
            out
        } else {
            format!("#{digits}")
        }
    }
}

impl fmt::Display for HexColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for HexColor {
    type Err = HexColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for HexColor {
    type Error = HexColorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<HexColor> for String {
    fn from(color: HexColor) -> Self {
        color.0
    }
}
