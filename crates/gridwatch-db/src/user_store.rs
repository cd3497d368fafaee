//! [`UserDirectory`] over the `users` table.

use chrono::{DateTime, Utc};
use gridwatch_core::store::{StoreError, UserDirectory};
use gridwatch_types::{NewUser, User, UserId};
use uuid::Uuid;

use crate::error::DbError;
use crate::store::PgStore;

/// A row from the `users` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserRow {
    /// User UUID.
    pub id: Uuid,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Unique login email.
    pub email: String,
    /// Encoded password hash.
    pub password_hash: String,
    /// Registration time.
    pub created_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: UserId::from(row.id),
            first_name: row.first_name,
            last_name: row.last_name,
            email: row.email,
            password_hash: row.password_hash,
            created_at: row.created_at,
        }
    }
}

impl PgStore {
    async fn user_by_email(&self, email: &str) -> Result<Option<User>, DbError> {
        let row = sqlx::query_as::<_, UserRow>(
            r"SELECT id, first_name, last_name, email, password_hash, created_at
              FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(self.pool())
        .await?;
        Ok(row.map(User::from))
    }

    async fn insert_user(&self, new_user: NewUser) -> Result<User, DbError> {
        let user = new_user.into_user();
        sqlx::query(
            r"INSERT INTO users (id, first_name, last_name, email, password_hash, created_at)
              VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(user.id.into_inner())
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.created_at)
        .execute(self.pool())
        .await?;
        Ok(user)
    }
}

impl UserDirectory for PgStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(self.user_by_email(email).await?)
    }

    /// A unique-violation on `email` surfaces as [`StoreError::Conflict`].
    async fn insert(&self, user: NewUser) -> Result<User, StoreError> {
        Ok(self.insert_user(user).await?)
    }
}
