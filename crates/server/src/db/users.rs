//! User repository for database operations.

use async_trait::async_trait;
use faqdesk_core::models::{Credentials, NewUser, Store, User};
use faqdesk_core::repository::UserRepository;
use faqdesk_core::{Email, FaqResult, Role, StoreId, UserId};
use sqlx::PgPool;

use super::{RepositoryError, duplicate_or_internal};

/// Repository for user database operations.
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: UserId,
    email: String,
    role: Role,
    password_hash: String,
}

impl UserRow {
    fn into_credentials(self) -> Result<Credentials, RepositoryError> {
        let email = Email::parse(&self.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;
        Ok(Credentials {
            user: User {
                id: self.id,
                email,
                role: self.role,
            },
            password_hash: self.password_hash,
        })
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn find_by_id(&self, id: UserId) -> FaqResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            r"
            SELECT id, email, role, password_hash
            FROM users
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(RepositoryError::from)?;

        Ok(row
            .map(UserRow::into_credentials)
            .transpose()?
            .map(|c| c.user))
    }

    async fn find_credentials(&self, email: &Email) -> FaqResult<Option<Credentials>> {
        let row = sqlx::query_as::<_, UserRow>(
            r"
            SELECT id, email, role, password_hash
            FROM users
            WHERE email = $1
            ",
        )
        .bind(email.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(RepositoryError::from)?;

        Ok(row.map(UserRow::into_credentials).transpose()?)
    }

    async fn create(&self, user: NewUser) -> FaqResult<User> {
        let row = sqlx::query_as::<_, UserRow>(
            r"
            INSERT INTO users (email, role, password_hash)
            VALUES ($1, $2, $3)
            RETURNING id, email, role, password_hash
            ",
        )
        .bind(user.email.as_str())
        .bind(user.role)
        .bind(&user.password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| duplicate_or_internal(e, || format!("email {}", user.email)))?;

        Ok(row.into_credentials()?.user)
    }

    async fn create_merchant(&self, user: NewUser, store_name: &str) -> FaqResult<(User, Store)> {
        let mut tx = self.pool.begin().await.map_err(RepositoryError::from)?;

        let row = sqlx::query_as::<_, UserRow>(
            r"
            INSERT INTO users (email, role, password_hash)
            VALUES ($1, $2, $3)
            RETURNING id, email, role, password_hash
            ",
        )
        .bind(user.email.as_str())
        .bind(user.role)
        .bind(&user.password_hash)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| duplicate_or_internal(e, || format!("email {}", user.email)))?;
        let created = row.into_credentials()?.user;

        let store_id: StoreId = sqlx::query_scalar(
            r"
            INSERT INTO stores (merchant_id, name)
            VALUES ($1, $2)
            RETURNING id
            ",
        )
        .bind(created.id)
        .bind(store_name)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| duplicate_or_internal(e, || format!("store for {}", user.email)))?;

        tx.commit().await.map_err(RepositoryError::from)?;

        let store = Store {
            id: store_id,
            merchant_id: created.id,
            name: store_name.to_owned(),
        };
        Ok((created, store))
    }
}
