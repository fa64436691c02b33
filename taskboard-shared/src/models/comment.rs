/// Comment model and database operations
///
/// # Schema
///
/// ```sql
/// CREATE TABLE comments (
///     id INTEGER PRIMARY KEY AUTOINCREMENT,
///     message TEXT NOT NULL,
///     date DATE NOT NULL,
///     card_id INTEGER NOT NULL REFERENCES cards(id) ON DELETE CASCADE,
///     user_id INTEGER NOT NULL REFERENCES users(id)
/// );
/// ```

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

/// Comment model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Comment {
    pub id: i64,
    pub message: String,
    pub date: NaiveDate,
    pub card_id: i64,

    /// Author
    pub user_id: i64,
}

/// Comment joined with its card title and author identity
///
/// Source row for the public comment views.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CommentDetail {
    pub id: i64,
    pub message: String,
    pub date: NaiveDate,
    pub card_id: i64,
    pub card_title: String,
    pub user_id: i64,
    pub user_name: String,
    pub user_email: String,
}

/// Input for creating a comment
#[derive(Debug, Clone)]
pub struct CreateComment {
    pub message: String,
    pub date: NaiveDate,
    pub card_id: i64,
    pub user_id: i64,
}

const DETAIL_SELECT: &str = r#"
    SELECT c.id, c.message, c.date, c.card_id, k.title AS card_title,
           c.user_id, u.name AS user_name, u.email AS user_email
    FROM comments c
    JOIN cards k ON k.id = c.card_id
    JOIN users u ON u.id = c.user_id
"#;

impl Comment {
    pub async fn create(pool: &SqlitePool, data: CreateComment) -> Result<Self, sqlx::Error> {
        let comment = sqlx::query_as::<_, Comment>(
            r#"
            INSERT INTO comments (message, date, card_id, user_id)
            VALUES (?, ?, ?, ?)
            RETURNING id, message, date, card_id, user_id
            "#,
        )
        .bind(data.message)
        .bind(data.date)
        .bind(data.card_id)
        .bind(data.user_id)
        .fetch_one(pool)
        .await?;

        tracing::debug!(
            comment_id = comment.id,
            card_id = comment.card_id,
            user_id = comment.user_id,
            "Created comment"
        );
        Ok(comment)
    }

    pub async fn find_by_id(pool: &SqlitePool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Comment>(
            "SELECT id, message, date, card_id, user_id FROM comments WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Replaces the message; returns `None` if the comment doesn't exist
    pub async fn update_message(
        pool: &SqlitePool,
        id: i64,
        message: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Comment>(
            r#"
            UPDATE comments SET message = ?
            WHERE id = ?
            RETURNING id, message, date, card_id, user_id
            "#,
        )
        .bind(message)
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Deletes a comment; returns false if it didn't exist
    pub async fn delete(pool: &SqlitePool, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM comments WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn count_by_card(pool: &SqlitePool, card_id: i64) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM comments WHERE card_id = ?")
            .bind(card_id)
            .fetch_one(pool)
            .await?;

        Ok(count)
    }
}

impl CommentDetail {
    pub async fn find(pool: &SqlitePool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, CommentDetail>(&format!("{DETAIL_SELECT} WHERE c.id = ?"))
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list_by_card(pool: &SqlitePool, card_id: i64) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, CommentDetail>(&format!(
            "{DETAIL_SELECT} WHERE c.card_id = ? ORDER BY c.id"
        ))
        .bind(card_id)
        .fetch_all(pool)
        .await
    }

    pub async fn list_by_user(pool: &SqlitePool, user_id: i64) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, CommentDetail>(&format!(
            "{DETAIL_SELECT} WHERE c.user_id = ? ORDER BY c.id"
        ))
        .bind(user_id)
        .fetch_all(pool)
        .await
    }

    pub async fn list_all(pool: &SqlitePool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, CommentDetail>(&format!("{DETAIL_SELECT} ORDER BY c.id"))
            .fetch_all(pool)
            .await
    }
}
