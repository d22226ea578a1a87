//! Plain-text password policy, checked before hashing.

use crate::validation::FieldErrors;

pub const MIN_PASSWORD_LENGTH: usize = 8;
pub const MAX_PASSWORD_LENGTH: usize = 50;

/// Characters that satisfy the special-character rule.
pub const PASSWORD_SPECIALS: &str = "!@#$%&*";

/// Record every password-policy violation under the `password` key.
///
/// Only the first failing rule is kept, matching [`FieldErrors`] semantics.
pub fn check_password(password: &str, errors: &mut FieldErrors) {
    const KEY: &str = "password";

    errors.check(!password.trim().is_empty(), KEY, "required");
    errors.check(
        password.len() >= MIN_PASSWORD_LENGTH,
        KEY,
        "must be at least 8 characters",
    );
    errors.check(
        password.len() <= MAX_PASSWORD_LENGTH,
        KEY,
        "must be at most 50 characters",
    );
    errors.check(
        password.chars().any(|c| c.is_ascii_lowercase()),
        KEY,
        "must contain at least 1 lowercase character",
    );
    errors.check(
        password.chars().any(|c| c.is_ascii_uppercase()),
        KEY,
        "must contain at least 1 uppercase character",
    );
    errors.check(
        password.chars().any(|c| c.is_ascii_digit()),
        KEY,
        "must contain at least a number",
    );
    errors.check(
        password.chars().any(|c| PASSWORD_SPECIALS.contains(c)),
        KEY,
        "must contain at least 1 special character ( !@#$%&* )",
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(password: &str) -> Option<String> {
        let mut errors = FieldErrors::new();
        check_password(password, &mut errors);
        errors.get("password").map(str::to_owned)
    }

    #[test]
    fn test_strong_password_passes() {
        assert_eq!(message("Str0ng!pass"), None);
    }

    #[test]
    fn test_first_failing_rule_wins() {
        assert_eq!(message("").as_deref(), Some("required"));
        assert_eq!(message("Ab1!").as_deref(), Some("must be at least 8 characters"));
        assert_eq!(
            message(&format!("Ab1!{}", "x".repeat(50))).as_deref(),
            Some("must be at most 50 characters")
        );
    }

    #[test]
    fn test_character_classes() {
        assert_eq!(
            message("ALLUPPER1!").as_deref(),
            Some("must contain at least 1 lowercase character")
        );
        assert_eq!(
            message("alllower1!").as_deref(),
            Some("must contain at least 1 uppercase character")
        );
        assert_eq!(
            message("NoDigits!!").as_deref(),
            Some("must contain at least a number")
        );
        assert_eq!(
            message("NoSpecial12").as_deref(),
            Some("must contain at least 1 special character ( !@#$%&* )")
        );
    }
}
