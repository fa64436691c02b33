/// Sample data for local development
///
/// Two accounts (`admin@email.com` / `admin` with the admin flag, and
/// `user@email.com` / `user`), three cards and three comments.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::info;

use crate::auth::password::{hash_password, PasswordError};
use crate::models::{
    card::{Card, CardPriority, CardStatus, CreateCard},
    comment::{Comment, CreateComment},
    user::{CreateUser, User},
};

/// Errors that can occur while seeding
#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error("Failed to hash seed password: {0}")]
    Password(#[from] PasswordError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Row counts inserted by [`seed`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedSummary {
    pub users: usize,
    pub cards: usize,
    pub comments: usize,
}

/// Inserts the sample rows into an empty, migrated database
///
/// # Errors
///
/// Fails with a unique violation if the seed accounts already exist.
pub async fn seed(pool: &SqlitePool) -> Result<SeedSummary, SeedError> {
    let today = Utc::now().date_naive();

    let admin = User::create(
        pool,
        CreateUser {
            name: "admin".to_string(),
            email: "admin@email.com".to_string(),
            password_hash: hash_password("admin")?,
            is_admin: true,
        },
    )
    .await?;

    let user = User::create(
        pool,
        CreateUser {
            name: "user".to_string(),
            email: "user@email.com".to_string(),
            password_hash: hash_password("user")?,
            is_admin: false,
        },
    )
    .await?;

    let cards = [
        (
            "Github Operations",
            "Perform mandatory github ops on the project",
            CardStatus::ToDo,
            admin.id,
        ),
        (
            "Initialise the modules",
            "Perform init operations on the necessary modules",
            CardStatus::InProgress,
            admin.id,
        ),
        (
            "Add comments to code",
            "Add meaningful comments when necessary",
            CardStatus::ToDo,
            user.id,
        ),
    ];

    let mut card_ids = Vec::with_capacity(cards.len());
    for (title, description, status, owner) in cards {
        let card = Card::create(
            pool,
            CreateCard {
                title: title.to_string(),
                description: Some(description.to_string()),
                status,
                priority: CardPriority::High,
                date: today,
                user_id: owner,
            },
        )
        .await?;
        card_ids.push(card.id);
    }

    let comments = [
        (card_ids[0], admin.id, "Admin is making a comment on Card 0"),
        (card_ids[1], admin.id, "Admin is making a comment on Card 1"),
        (card_ids[0], user.id, "The user is making a comment on Card 0"),
    ];

    for (card_id, user_id, message) in comments {
        Comment::create(
            pool,
            CreateComment {
                message: message.to_string(),
                date: today,
                card_id,
                user_id,
            },
        )
        .await?;
    }

    let summary = SeedSummary {
        users: 2,
        cards: card_ids.len(),
        comments: comments.len(),
    };

    info!(
        users = summary.users,
        cards = summary.cards,
        comments = summary.comments,
        "Database seeded"
    );
    Ok(summary)
}
