//! Accounts.

use serde::{Deserialize, Serialize};

use crate::types::{Email, EmailError, Role, UserId};
use crate::validation::FieldErrors;

/// An account as seen by policy code. Never carries the password hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub email: Email,
    pub role: Role,
}

impl User {
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    #[must_use]
    pub const fn is_merchant(&self) -> bool {
        self.role.is_merchant()
    }

    #[must_use]
    pub const fn is_customer(&self) -> bool {
        self.role.is_customer()
    }
}

/// A user row together with its stored password hash, used only by login.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub user: User,
    pub password_hash: String,
}

/// Insert payload for a new account. The hash is produced before this is built.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: Email,
    pub role: Role,
    pub password_hash: String,
}

/// Parse `raw` as an email, recording a failure under `email`.
pub fn check_email(raw: &str, errors: &mut FieldErrors) -> Option<Email> {
    match Email::parse(raw) {
        Ok(email) => Some(email),
        Err(EmailError::Empty) => {
            errors.add("email", "required");
            None
        }
        Err(_) => {
            errors.add("email", "invalid email form");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_email_messages() {
        let mut errors = FieldErrors::new();
        assert!(check_email("", &mut errors).is_none());
        assert_eq!(errors.get("email"), Some("required"));

        let mut errors = FieldErrors::new();
        assert!(check_email("not-an-email", &mut errors).is_none());
        assert_eq!(errors.get("email"), Some("invalid email form"));

        let mut errors = FieldErrors::new();
        assert!(check_email("a@b.co", &mut errors).is_some());
        assert!(errors.is_empty());
    }
}
