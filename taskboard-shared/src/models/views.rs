/// Public projections of users, cards and comments
///
/// User ↔ Card ↔ Comment form a reference cycle. Each view nests its
/// relations through a fixed allow-list of fields per direction, so
/// serialization always terminates and payloads stay bounded:
///
/// ```text
/// UserView    { id, name, email, is_admin,
///               cards:    [{ id, title, description, status, priority, date }],
///               comments: [{ id, message, card: { id, title } }] }
/// CardView    { id, title, description, status, priority, date,
///               user:     { id, name, email },
///               comments: [{ id, message, user: { id, name, email } }] }
/// CommentView { id, message, card: { id, title }, user: { id, name, email } }
/// ```
///
/// Passwords never appear in any view.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use super::{
    card::Card,
    comment::CommentDetail,
    user::User,
};

/// Nested user reference
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRef {
    pub id: i64,
    pub name: String,
    pub email: String,
}

/// Nested card reference
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardRef {
    pub id: i64,
    pub title: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserView {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub is_admin: bool,
    pub cards: Vec<UserCardView>,
    pub comments: Vec<UserCommentView>,
}

/// A card as listed under its owner (no back-reference to the user)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserCardView {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub status: String,
    pub priority: String,
    pub date: NaiveDate,
}

/// A comment as listed under its author
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserCommentView {
    pub id: i64,
    pub message: String,
    pub card: CardRef,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CardView {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub status: String,
    pub priority: String,
    pub date: NaiveDate,
    pub user: UserRef,
    pub comments: Vec<CardCommentView>,
}

/// A comment as listed under its card
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CardCommentView {
    pub id: i64,
    pub message: String,
    pub user: UserRef,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentView {
    pub id: i64,
    pub message: String,
    pub card: CardRef,
    pub user: UserRef,
}

impl From<&User> for UserRef {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
        }
    }
}

impl From<&Card> for UserCardView {
    fn from(card: &Card) -> Self {
        Self {
            id: card.id,
            title: card.title.clone(),
            description: card.description.clone(),
            status: card.status.clone(),
            priority: card.priority.clone(),
            date: card.date,
        }
    }
}

impl From<CommentDetail> for UserCommentView {
    fn from(detail: CommentDetail) -> Self {
        Self {
            id: detail.id,
            message: detail.message,
            card: CardRef {
                id: detail.card_id,
                title: detail.card_title,
            },
        }
    }
}

impl From<CommentDetail> for CardCommentView {
    fn from(detail: CommentDetail) -> Self {
        Self {
            id: detail.id,
            message: detail.message,
            user: UserRef {
                id: detail.user_id,
                name: detail.user_name,
                email: detail.user_email,
            },
        }
    }
}

impl From<CommentDetail> for CommentView {
    fn from(detail: CommentDetail) -> Self {
        Self {
            id: detail.id,
            message: detail.message,
            card: CardRef {
                id: detail.card_id,
                title: detail.card_title,
            },
            user: UserRef {
                id: detail.user_id,
                name: detail.user_name,
                email: detail.user_email,
            },
        }
    }
}

impl UserView {
    /// Assembles a view from already-loaded relations
    pub fn assemble(user: &User, cards: &[Card], comments: Vec<CommentDetail>) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            is_admin: user.is_admin,
            cards: cards.iter().map(UserCardView::from).collect(),
            comments: comments.into_iter().map(UserCommentView::from).collect(),
        }
    }

    /// Loads one user's cards and comments
    pub async fn load(pool: &SqlitePool, user: &User) -> Result<Self, sqlx::Error> {
        let cards = Card::list_by_user(pool, user.id).await?;
        let comments = CommentDetail::list_by_user(pool, user.id).await?;

        Ok(Self::assemble(user, &cards, comments))
    }

    /// Loads every user with three queries total
    pub async fn load_all(pool: &SqlitePool) -> Result<Vec<Self>, sqlx::Error> {
        let users = User::list_all(pool).await?;

        let mut cards_by_user: HashMap<i64, Vec<Card>> = HashMap::new();
        for card in Card::list_all(pool).await? {
            cards_by_user.entry(card.user_id).or_default().push(card);
        }

        let mut comments_by_user: HashMap<i64, Vec<CommentDetail>> = HashMap::new();
        for detail in CommentDetail::list_all(pool).await? {
            comments_by_user.entry(detail.user_id).or_default().push(detail);
        }

        Ok(users
            .iter()
            .map(|user| {
                let cards = cards_by_user.remove(&user.id).unwrap_or_default();
                let comments = comments_by_user.remove(&user.id).unwrap_or_default();
                Self::assemble(user, &cards, comments)
            })
            .collect())
    }
}

impl CardView {
    pub fn assemble(card: Card, owner: UserRef, comments: Vec<CommentDetail>) -> Self {
        Self {
            id: card.id,
            title: card.title,
            description: card.description,
            status: card.status,
            priority: card.priority,
            date: card.date,
            user: owner,
            comments: comments.into_iter().map(CardCommentView::from).collect(),
        }
    }

    /// Loads the owner and comments of one card
    ///
    /// # Errors
    ///
    /// `sqlx::Error::RowNotFound` if the owning user row is missing.
    pub async fn load(pool: &SqlitePool, card: Card) -> Result<Self, sqlx::Error> {
        let owner = User::find_by_id(pool, card.user_id)
            .await?
            .ok_or(sqlx::Error::RowNotFound)?;
        let comments = CommentDetail::list_by_card(pool, card.id).await?;

        Ok(Self::assemble(card, UserRef::from(&owner), comments))
    }

    pub async fn load_all(pool: &SqlitePool) -> Result<Vec<Self>, sqlx::Error> {
        let owners: HashMap<i64, UserRef> = User::list_all(pool)
            .await?
            .iter()
            .map(|user| (user.id, UserRef::from(user)))
            .collect();

        let mut comments_by_card: HashMap<i64, Vec<CommentDetail>> = HashMap::new();
        for detail in CommentDetail::list_all(pool).await? {
            comments_by_card.entry(detail.card_id).or_default().push(detail);
        }

        Card::list_all(pool)
            .await?
            .into_iter()
            .map(|card| -> Result<Self, sqlx::Error> {
                let owner = owners
                    .get(&card.user_id)
                    .cloned()
                    .ok_or(sqlx::Error::RowNotFound)?;
                let comments = comments_by_card.remove(&card.id).unwrap_or_default();
                Ok(Self::assemble(card, owner, comments))
            })
            .collect()
    }
}

impl CommentView {
    pub async fn load(pool: &SqlitePool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        Ok(CommentDetail::find(pool, id).await?.map(Self::from))
    }

    pub async fn list_by_card(pool: &SqlitePool, card_id: i64) -> Result<Vec<Self>, sqlx::Error> {
        Ok(CommentDetail::list_by_card(pool, card_id)
            .await?
            .into_iter()
            .map(Self::from)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detail() -> CommentDetail {
        CommentDetail {
            id: 3,
            message: "Looks good".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            card_id: 9,
            card_title: "Review PR".to_string(),
            user_id: 2,
            user_name: "Bob".to_string(),
            user_email: "bob@example.com".to_string(),
        }
    }

    #[test]
    fn test_comment_view_fields() {
        let json = serde_json::to_value(CommentView::from(detail())).unwrap();
        let mut keys: Vec<_> = json.as_object().unwrap().keys().cloned().collect();
        keys.sort();

        assert_eq!(keys, ["card", "id", "message", "user"]);
        assert_eq!(json["card"], serde_json::json!({"id": 9, "title": "Review PR"}));
        assert_eq!(json["user"]["email"], "bob@example.com");
    }

    #[test]
    fn test_user_view_excludes_password_and_back_references() {
        let user = User {
            id: 2,
            name: "Bob".to_string(),
            email: "bob@example.com".to_string(),
            password_hash: "$argon2id$x".to_string(),
            is_admin: false,
        };
        let card = Card {
            id: 9,
            title: "Review PR".to_string(),
            description: Some("Check tests".to_string()),
            status: "Testing".to_string(),
            priority: "High".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            user_id: 2,
        };

        let view = UserView::assemble(&user, &[card], vec![detail()]);
        let json = serde_json::to_value(&view).unwrap();

        assert!(json.get("password").is_none());
        assert!(json.get("password_hash").is_none());
        assert!(json["cards"][0].get("user").is_none());
        assert!(json["comments"][0].get("user").is_none());
        assert_eq!(json["comments"][0]["card"]["title"], "Review PR");
    }

    #[test]
    fn test_card_view_comments_omit_card() {
        let card = Card {
            id: 9,
            title: "Review PR".to_string(),
            description: None,
            status: "To Do".to_string(),
            priority: "Low".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            user_id: 2,
        };
        let owner = UserRef {
            id: 2,
            name: "Bob".to_string(),
            email: "bob@example.com".to_string(),
        };

        let json = serde_json::to_value(CardView::assemble(card, owner, vec![detail()])).unwrap();

        assert_eq!(json["date"], "2024-05-01");
        assert_eq!(json["user"]["id"], 2);
        assert!(json["comments"][0].get("card").is_none());
        assert_eq!(json["comments"][0]["user"]["name"], "Bob");
    }
}
