/// Card model and database operations
///
/// A card is a task owned by exactly one user. Deleting a card deletes its
/// comments.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE cards (
///     id INTEGER PRIMARY KEY AUTOINCREMENT,
///     title TEXT NOT NULL,
///     description TEXT,
///     status TEXT NOT NULL DEFAULT 'To Do',
///     priority TEXT NOT NULL DEFAULT 'Low',
///     date DATE NOT NULL,
///     user_id INTEGER NOT NULL REFERENCES users(id)
/// );
///
/// CREATE UNIQUE INDEX idx_cards_single_in_progress
///     ON cards(status) WHERE status = 'In Progress';
/// ```

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use validator::ValidationError;

/// Title must start with an uppercase letter, then alphanumerics or spaces
static TITLE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z][a-zA-Z0-9 ]+$").expect("title pattern is valid"));

pub const TITLE_LENGTH_MESSAGE: &str = "Title must be between 4 and 100 characters";
pub const TITLE_PATTERN_MESSAGE: &str =
    "Title must contain only alphanumeric characters and start with an uppercase letter";

/// Card workflow status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CardStatus {
    #[serde(rename = "To Do")]
    ToDo,

    /// At most one card may hold this status at a time
    #[serde(rename = "In Progress")]
    InProgress,

    Completed,
    Testing,
    Deployed,
}

impl CardStatus {
    pub const ALL: [CardStatus; 5] = [
        CardStatus::ToDo,
        CardStatus::InProgress,
        CardStatus::Completed,
        CardStatus::Testing,
        CardStatus::Deployed,
    ];

    /// Converts status to string for database storage
    pub fn as_str(&self) -> &'static str {
        match self {
            CardStatus::ToDo => "To Do",
            CardStatus::InProgress => "In Progress",
            CardStatus::Completed => "Completed",
            CardStatus::Testing => "Testing",
            CardStatus::Deployed => "Deployed",
        }
    }
}

impl Default for CardStatus {
    fn default() -> Self {
        CardStatus::ToDo
    }
}

impl fmt::Display for CardStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CardStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CardStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("Must be one of: {}.", join(&CardStatus::ALL)))
    }
}

/// Card priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CardPriority {
    Low,
    Medium,
    High,
    Immediate,
}

impl CardPriority {
    pub const ALL: [CardPriority; 4] = [
        CardPriority::Low,
        CardPriority::Medium,
        CardPriority::High,
        CardPriority::Immediate,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CardPriority::Low => "Low",
            CardPriority::Medium => "Medium",
            CardPriority::High => "High",
            CardPriority::Immediate => "Immediate",
        }
    }
}

impl Default for CardPriority {
    fn default() -> Self {
        CardPriority::Low
    }
}

impl fmt::Display for CardPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CardPriority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CardPriority::ALL
            .into_iter()
            .find(|priority| priority.as_str() == s)
            .ok_or_else(|| format!("Must be one of: {}.", join(&CardPriority::ALL)))
    }
}

fn join<T: fmt::Display>(items: &[T]) -> String {
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

fn validation_error(code: &'static str, message: impl Into<Cow<'static, str>>) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(message.into());
    err
}

/// `validator` custom rule for card titles (pattern only; length is a
/// separate `length(min = 4, max = 100)` rule on the request)
pub fn validate_title(title: &str) -> Result<(), ValidationError> {
    if TITLE_PATTERN.is_match(title) {
        Ok(())
    } else {
        Err(validation_error("title_pattern", TITLE_PATTERN_MESSAGE))
    }
}

/// `validator` custom rule for status enum membership
pub fn validate_status(status: &str) -> Result<(), ValidationError> {
    status
        .parse::<CardStatus>()
        .map(|_| ())
        .map_err(|msg| validation_error("status_choice", msg))
}

/// `validator` custom rule for priority enum membership
pub fn validate_priority(priority: &str) -> Result<(), ValidationError> {
    priority
        .parse::<CardPriority>()
        .map(|_| ())
        .map_err(|msg| validation_error("priority_choice", msg))
}

/// Card model
///
/// Status and priority are stored as their display strings.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Card {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub status: String,
    pub priority: String,
    pub date: NaiveDate,

    /// Owning user, fixed at creation
    pub user_id: i64,
}

/// Input for creating a card
#[derive(Debug, Clone)]
pub struct CreateCard {
    pub title: String,
    pub description: Option<String>,
    pub status: CardStatus,
    pub priority: CardPriority,
    pub date: NaiveDate,
    pub user_id: i64,
}

/// Input for updating a card; the owner is not updatable
#[derive(Debug, Clone, Default)]
pub struct UpdateCard {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<CardStatus>,
    pub priority: Option<CardPriority>,
    pub date: Option<NaiveDate>,
}

const CARD_COLUMNS: &str = "id, title, description, status, priority, date, user_id";

impl Card {
    /// Inserts a card
    ///
    /// Callers run the status constraint first. The partial unique index
    /// still rejects a second "In Progress" card written concurrently.
    pub async fn create(pool: &SqlitePool, data: CreateCard) -> Result<Self, sqlx::Error> {
        let card = sqlx::query_as::<_, Card>(&format!(
            r#"
            INSERT INTO cards (title, description, status, priority, date, user_id)
            VALUES (?, ?, ?, ?, ?, ?)
            RETURNING {CARD_COLUMNS}
            "#
        ))
        .bind(data.title)
        .bind(data.description)
        .bind(data.status.as_str())
        .bind(data.priority.as_str())
        .bind(data.date)
        .bind(data.user_id)
        .fetch_one(pool)
        .await?;

        tracing::debug!(card_id = card.id, user_id = card.user_id, "Created card");
        Ok(card)
    }

    pub async fn find_by_id(pool: &SqlitePool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Card>(&format!("SELECT {CARD_COLUMNS} FROM cards WHERE id = ?"))
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Lists every card, ordered by id
    pub async fn list_all(pool: &SqlitePool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Card>(&format!("SELECT {CARD_COLUMNS} FROM cards ORDER BY id"))
            .fetch_all(pool)
            .await
    }

    /// Lists the cards owned by a user
    pub async fn list_by_user(pool: &SqlitePool, user_id: i64) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Card>(&format!(
            "SELECT {CARD_COLUMNS} FROM cards WHERE user_id = ? ORDER BY id"
        ))
        .bind(user_id)
        .fetch_all(pool)
        .await
    }

    /// Applies a partial update
    ///
    /// Returns `None` if the card doesn't exist.
    pub async fn update(
        pool: &SqlitePool,
        id: i64,
        data: UpdateCard,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Card>(&format!(
            r#"
            UPDATE cards
            SET title = COALESCE(?, title),
                description = COALESCE(?, description),
                status = COALESCE(?, status),
                priority = COALESCE(?, priority),
                date = COALESCE(?, date)
            WHERE id = ?
            RETURNING {CARD_COLUMNS}
            "#
        ))
        .bind(data.title)
        .bind(data.description)
        .bind(data.status.map(|s| s.as_str()))
        .bind(data.priority.map(|p| p.as_str()))
        .bind(data.date)
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Deletes a card together with its comments
    ///
    /// Returns false if the card didn't exist.
    pub async fn delete(pool: &SqlitePool, id: i64) -> Result<bool, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let comments = sqlx::query("DELETE FROM comments WHERE card_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM cards WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::debug!(
            card_id = id,
            comments_removed = comments.rows_affected(),
            "Deleted card"
        );
        Ok(result.rows_affected() > 0)
    }

    /// Counts cards holding `status`, optionally ignoring one card
    pub async fn count_with_status(
        pool: &SqlitePool,
        status: CardStatus,
        excluding: Option<i64>,
    ) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM cards WHERE status = ? AND (? IS NULL OR id != ?)",
        )
        .bind(status.as_str())
        .bind(excluding)
        .bind(excluding)
        .fetch_one(pool)
        .await?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip_through_strings() {
        for status in CardStatus::ALL {
            assert_eq!(status.as_str().parse::<CardStatus>().unwrap(), status);
        }
        assert!("Ongoing".parse::<CardStatus>().is_err());
        assert!("in progress".parse::<CardStatus>().is_err());
    }

    #[test]
    fn test_status_serde_uses_display_names() {
        assert_eq!(
            serde_json::to_value(CardStatus::InProgress).unwrap(),
            "In Progress"
        );
        let parsed: CardStatus = serde_json::from_str("\"To Do\"").unwrap();
        assert_eq!(parsed, CardStatus::ToDo);
    }

    #[test]
    fn test_priority_parsing() {
        assert_eq!("Immediate".parse::<CardPriority>().unwrap(), CardPriority::Immediate);
        let err = "Urgent".parse::<CardPriority>().unwrap_err();
        assert_eq!(err, "Must be one of: Low, Medium, High, Immediate.");
    }

    #[test]
    fn test_validate_title() {
        assert!(validate_title("Github Operations").is_ok());
        assert!(validate_title("Card 42").is_ok());

        let err = validate_title("hello").unwrap_err();
        assert_eq!(err.code, "title_pattern");
        assert_eq!(err.message.as_deref(), Some(TITLE_PATTERN_MESSAGE));

        assert!(validate_title("Bad-title").is_err());
        assert!(validate_title("A").is_err());
    }

    #[test]
    fn test_validate_status_and_priority() {
        assert!(validate_status("Testing").is_ok());
        assert!(validate_status("Done").is_err());
        assert!(validate_priority("High").is_ok());
        assert!(validate_priority("high").is_err());
    }
}
