//! Account creation and password login.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use faqdesk_core::models::{NewUser, Store, User, check_email, check_store_name};
use faqdesk_core::policy::{Action, Resource, authorize};
use faqdesk_core::repository::UserRepository;
use faqdesk_core::{FaqError, FaqResult, FieldErrors, Role, check_password};

/// Authentication service.
///
/// Handles signup, admin-driven account creation, and login.
pub struct AuthService<'a> {
    users: &'a dyn UserRepository,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(users: &'a dyn UserRepository) -> Self {
        Self { users }
    }

    /// Register a customer account.
    ///
    /// # Errors
    ///
    /// `ValidationFailed` for bad email/password, `Duplicate` if the email is taken.
    pub async fn register_customer(&self, email: &str, password: &str) -> FaqResult<User> {
        let new_user = prepare(email, password, Role::Customer, &mut FieldErrors::new())?;
        let user = self.users.create(new_user).await?;
        tracing::info!(user_id = %user.id, "customer registered");
        Ok(user)
    }

    /// Register a merchant and their store in one atomic unit.
    ///
    /// # Errors
    ///
    /// `ValidationFailed` listing every bad field, `Duplicate` if the email is taken.
    pub async fn register_merchant(
        &self,
        email: &str,
        password: &str,
        store_name: &str,
    ) -> FaqResult<(User, Store)> {
        let mut errors = FieldErrors::new();
        let store_name = check_store_name(store_name, "store_name", &mut errors);
        let new_user = prepare(email, password, Role::Merchant, &mut errors)?;
        let (user, store) = self.users.create_merchant(new_user, &store_name).await?;
        tracing::info!(user_id = %user.id, store_id = %store.id, "merchant registered");
        Ok((user, store))
    }

    /// Create an account of any role on behalf of an admin. Merchants need a
    /// store name.
    ///
    /// # Errors
    ///
    /// `Unauthorized` unless `actor` is an admin; otherwise as the signup paths.
    pub async fn create_account(
        &self,
        actor: Option<&User>,
        email: &str,
        password: &str,
        role: &str,
        store_name: Option<&str>,
    ) -> FaqResult<User> {
        authorize(actor, Action::Create, Resource::Account)?;

        let mut errors = FieldErrors::new();
        let role = role.trim().parse::<Role>().ok();
        if role.is_none() {
            errors.add("role", "invalid role");
        }
        let store_name = match (role, store_name) {
            (Some(Role::Merchant), Some(name)) => Some(check_store_name(name, "store_name", &mut errors)),
            (Some(Role::Merchant), None) => {
                errors.add("store_name", "required");
                None
            }
            _ => None,
        };

        let new_user = prepare(email, password, role.unwrap_or(Role::Customer), &mut errors)?;
        let user = match store_name {
            Some(name) => self.users.create_merchant(new_user, &name).await?.0,
            None => self.users.create(new_user).await?,
        };
        tracing::info!(user_id = %user.id, role = %user.role, "account created by admin");
        Ok(user)
    }

    /// Check an email and password pair.
    ///
    /// # Errors
    ///
    /// `Unauthorized` for an unknown email or a wrong password alike.
    pub async fn login(&self, email: &str, password: &str) -> FaqResult<User> {
        let invalid = || FaqError::unauthorized("invalid credentials");

        let mut errors = FieldErrors::new();
        let Some(email) = check_email(email, &mut errors) else {
            return Err(invalid());
        };

        let credentials = self
            .users
            .find_credentials(&email)
            .await?
            .ok_or_else(invalid)?;

        if !verify_password(password, &credentials.password_hash) {
            tracing::debug!(user_id = %credentials.user.id, "password mismatch");
            return Err(invalid());
        }
        Ok(credentials.user)
    }
}

/// Validate email and password into `errors` and hash the password.
fn prepare(
    email: &str,
    password: &str,
    role: Role,
    errors: &mut FieldErrors,
) -> FaqResult<NewUser> {
    let email = check_email(email, errors);
    check_password(password, errors);

    match email {
        Some(email) if errors.is_empty() => Ok(NewUser {
            email,
            role,
            password_hash: hash_password(password)?,
        }),
        _ => Err(FaqError::ValidationFailed(std::mem::take(errors))),
    }
}

/// Hash a password using Argon2id.
///
/// # Errors
///
/// Returns `FaqError::Internal` if hashing fails.
pub fn hash_password(password: &str) -> FaqResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| FaqError::internal(format!("password hashing failed: {e}")))
}

/// Verify a password against a hash.
#[must_use]
pub fn verify_password(password: &str, hash: &str) -> bool {
    PasswordHash::new(hash).is_ok_and(|parsed| {
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    })
}
