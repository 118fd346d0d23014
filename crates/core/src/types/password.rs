//! Plaintext password type.
//!
//! A [`Password`] only exists between the request body and the hasher. It is
//! never serialized, and its `Debug` output is redacted.

use core::fmt;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer};

/// Errors that can occur when accepting a [`Password`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PasswordError {
    /// The password is shorter than [`Password::MIN_LENGTH`] characters.
    #[error("password must be at least {min} characters")]
    TooShort {
        /// Minimum allowed length.
        min: usize,
    },
}

/// A plaintext password that satisfies the minimum length policy.
///
/// Whitespace is significant and is not trimmed.
#[derive(Clone)]
pub struct Password(SecretString);

impl Password {
    /// Minimum number of characters.
    pub const MIN_LENGTH: usize = 6;

    /// Validate a candidate password.
    ///
    /// # Errors
    ///
    /// Returns [`PasswordError::TooShort`] if the input has fewer than
    /// [`Self::MIN_LENGTH`] characters.
    pub fn parse(s: &str) -> Result<Self, PasswordError> {
        if s.chars().count() < Self::MIN_LENGTH {
            return Err(PasswordError::TooShort {
                min: Self::MIN_LENGTH,
            });
        }
        Ok(Self(SecretString::from(s.to_owned())))
    }

    /// Expose the plaintext for hashing.
    #[must_use]
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password([REDACTED])")
    }
}

impl<'de> Deserialize<'de> for Password {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}
