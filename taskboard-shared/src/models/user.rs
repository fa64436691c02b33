/// User model and database operations
///
/// # Schema
///
/// ```sql
/// CREATE TABLE users (
///     id INTEGER PRIMARY KEY AUTOINCREMENT,
///     name VARCHAR(80) NOT NULL,
///     email VARCHAR(120) NOT NULL UNIQUE,
///     password_hash VARCHAR(255) NOT NULL,
///     is_admin BOOLEAN NOT NULL DEFAULT 0
/// );
/// ```
///
/// Users are never deleted through the API, so cards and comments always
/// point at a live row.

use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

/// User model representing an account
///
/// `password_hash` is an Argon2id PHC string and is never serialized.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    /// Unique, stable user ID
    pub id: i64,

    /// Display name
    pub name: String,

    /// Email address, unique across all users
    pub email: String,

    /// Argon2id password hash
    #[serde(skip_serializing)]
    pub password_hash: String,

    /// Administrator flag
    pub is_admin: bool,
}

/// Input for creating a new user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUser {
    pub name: String,
    pub email: String,

    /// Argon2id password hash (NOT plaintext password!)
    pub password_hash: String,

    pub is_admin: bool,
}

/// Input for updating an existing user
///
/// Only `Some` fields are written.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateUser {
    pub name: Option<String>,
    pub email: Option<String>,

    /// New password hash
    pub password_hash: Option<String>,
}

impl User {
    /// Creates a new user
    ///
    /// # Errors
    ///
    /// Fails with a unique violation on `users.email` if the email is taken.
    pub async fn create(pool: &SqlitePool, data: CreateUser) -> Result<Self, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (name, email, password_hash, is_admin)
            VALUES (?, ?, ?, ?)
            RETURNING id, name, email, password_hash, is_admin
            "#,
        )
        .bind(data.name)
        .bind(data.email)
        .bind(data.password_hash)
        .bind(data.is_admin)
        .fetch_one(pool)
        .await?;

        tracing::debug!(user_id = user.id, "Created user");
        Ok(user)
    }

    /// Finds a user by ID
    pub async fn find_by_id(pool: &SqlitePool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            "SELECT id, name, email, password_hash, is_admin FROM users WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Finds a user by exact email match
    pub async fn find_by_email(
        pool: &SqlitePool,
        email: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            "SELECT id, name, email, password_hash, is_admin FROM users WHERE email = ?",
        )
        .bind(email)
        .fetch_optional(pool)
        .await
    }

    /// Checks whether any user holds `email`
    pub async fn email_exists(pool: &SqlitePool, email: &str) -> Result<bool, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users WHERE email = ?")
            .bind(email)
            .fetch_one(pool)
            .await?;

        Ok(count > 0)
    }

    /// Lists every user, ordered by id
    pub async fn list_all(pool: &SqlitePool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            "SELECT id, name, email, password_hash, is_admin FROM users ORDER BY id",
        )
        .fetch_all(pool)
        .await
    }

    /// Updates an existing user
    ///
    /// Returns the updated user, or `None` if the id doesn't exist.
    ///
    /// # Errors
    ///
    /// Fails with a unique violation if the new email belongs to another user.
    pub async fn update(
        pool: &SqlitePool,
        id: i64,
        data: UpdateUser,
    ) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET name = COALESCE(?, name),
                email = COALESCE(?, email),
                password_hash = COALESCE(?, password_hash)
            WHERE id = ?
            RETURNING id, name, email, password_hash, is_admin
            "#,
        )
        .bind(data.name)
        .bind(data.email)
        .bind(data.password_hash)
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Counts total number of users
    pub async fn count(pool: &SqlitePool) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(pool)
            .await?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_hash_not_serialized() {
        let user = User {
            id: 1,
            name: "Alice".to_string(),
            email: "a@b.com".to_string(),
            password_hash: "$argon2id$secret".to_string(),
            is_admin: false,
        };

        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["email"], "a@b.com");
    }

    #[test]
    fn test_update_user_default() {
        let update = UpdateUser::default();
        assert!(update.name.is_none());
        assert!(update.email.is_none());
        assert!(update.password_hash.is_none());
    }

    // Database round trips are in tests/models_tests.rs
}
