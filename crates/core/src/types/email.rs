//! Account email addresses.
//!
//! Addresses are trimmed and otherwise stored as given: matching is exact,
//! so `Kai@example.com` and `kai@example.com` are different accounts.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Why a string is not an account email.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum EmailError {
    #[error("email cannot be empty")]
    Empty,
    #[error("email must be at most {max} characters")]
    TooLong { max: usize },
    /// Anything other than `local@label.label…` without whitespace.
    #[error("invalid email form")]
    Malformed,
}

/// A trimmed address of the form `local@domain.tld`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Email(String);

impl Email {
    /// RFC 5321 path limit.
    pub const MAX_LENGTH: usize = 254;

    /// Parse an account email.
    ///
    /// # Errors
    ///
    /// [`EmailError::Empty`] for blank input, [`EmailError::TooLong`] past
    /// [`Self::MAX_LENGTH`], otherwise [`EmailError::Malformed`].
    pub fn parse(raw: &str) -> Result<Self, EmailError> {
        let s = raw.trim();
        if s.is_empty() {
            return Err(EmailError::Empty);
        }
        if s.len() > Self::MAX_LENGTH {
            return Err(EmailError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }

        let (local, domain) = s.split_once('@').ok_or(EmailError::Malformed)?;
        let well_formed = !local.is_empty()
            && !s.chars().any(char::is_whitespace)
            && !domain.contains('@')
            && domain.contains('.')
            && domain.split('.').all(|label| !label.is_empty());
        if !well_formed {
            return Err(EmailError::Malformed);
        }

        Ok(Self(s.to_owned()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_common_addresses() {
        for input in [
            "kai@example.com",
            "kai.lee+faq@example.com",
            "merchant@shop.example.co.uk",
            "a@b.c",
        ] {
            assert_eq!(Email::parse(input).unwrap().as_str(), input);
        }
    }

    #[test]
    fn test_trims_but_keeps_case() {
        let email = Email::parse("  Kai@Example.com\n").unwrap();
        assert_eq!(email.as_str(), "Kai@Example.com");
        assert_ne!(email, Email::parse("kai@example.com").unwrap());
    }

    #[test]
    fn test_blank_is_empty() {
        assert_eq!(Email::parse(""), Err(EmailError::Empty));
        assert_eq!(Email::parse("   "), Err(EmailError::Empty));
    }

    #[test]
    fn test_length_limit() {
        let at_limit = format!("{}@example.com", "a".repeat(Email::MAX_LENGTH - 12));
        assert!(Email::parse(&at_limit).is_ok());

        let over = format!("a{at_limit}");
        assert_eq!(
            Email::parse(&over),
            Err(EmailError::TooLong {
                max: Email::MAX_LENGTH
            })
        );
    }

    #[test]
    fn test_malformed() {
        for input in [
            "no-at-symbol",
            "@example.com",
            "kai@",
            "kai@localhost",
            "kai lee@example.com",
            "kai@shop@example.com",
            "kai@example..com",
            "kai@.example.com",
        ] {
            assert_eq!(Email::parse(input), Err(EmailError::Malformed), "{input}");
        }
    }

    #[test]
    fn test_serializes_as_plain_string() {
        let email = Email::parse("kai@example.com").unwrap();
        assert_eq!(serde_json::to_string(&email).unwrap(), "\"kai@example.com\"");
        assert_eq!(email.to_string(), "kai@example.com");
    }
}
