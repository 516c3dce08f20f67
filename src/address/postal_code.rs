//! Postal codes (CEP)

use std::fmt;

use thiserror::Error;

/// Number of digits in a complete postal code.
pub const POSTAL_CODE_DIGITS: usize = 8;

/// Digits before the display separator.
const PREFIX_DIGITS: usize = 5;

/// Errors raised while parsing a postal code.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PostalCodeError {
    /// Fewer than [`POSTAL_CODE_DIGITS`] digits were entered.
    #[error("postal code has {digits} digits; expected {POSTAL_CODE_DIGITS}")]
    Incomplete {
        /// Digits present after normalisation
        digits: usize,
    },
}

/// Strip everything but digits from `raw`, keeping at most [`POSTAL_CODE_DIGITS`].
pub fn normalize(raw: &str) -> String {
    raw.chars()
        .filter(char::is_ascii_digit)
        .take(POSTAL_CODE_DIGITS)
        .collect()
}

/// Display form of normalised digits: a `-` after the fifth digit once there is a sixth.
pub fn format_digits(digits: &str) -> String {
    let mut formatted = String::with_capacity(digits.len() + 1);

    for (idx, ch) in digits.chars().enumerate() {
        if idx == PREFIX_DIGITS {
            formatted.push('-');
        }

        formatted.push(ch);
    }

    formatted
}

/// A complete, normalised postal code.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PostalCode(String);

impl PostalCode {
    /// Parse a postal code from user input, ignoring any non-digit characters.
    ///
    /// # Errors
    ///
    /// Returns [`PostalCodeError::Incomplete`] if fewer than eight digits remain.
    pub fn parse(raw: &str) -> Result<Self, PostalCodeError> {
        let digits = normalize(raw);

        if digits.len() == POSTAL_CODE_DIGITS {
            Ok(Self(digits))
        } else {
            Err(PostalCodeError::Incomplete {
                digits: digits.len(),
            })
        }
    }

    /// The eight digits, without separator.
    pub fn digits(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PostalCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_digits(&self.0))
    }
}
