/// Database models for Taskboard
///
/// This module contains the models and their store operations.
///
/// # Models
///
/// - `user`: Identity records (credential store)
/// - `card`: Tasks with status/priority, owned by one user
/// - `comment`: Messages on a card, authored by a user
/// - `views`: Public projections with bounded nesting
///
/// # Example
///
/// ```no_run
/// use taskboard_shared::models::user::{User, CreateUser};
/// use taskboard_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// let user = User::create(&pool, CreateUser {
///     name: "Alice".to_string(),
///     email: "a@b.com".to_string(),
///     password_hash: "$argon2id$...".to_string(),
///     is_admin: false,
/// }).await?;
/// # Ok(())
/// # }
/// ```

pub mod card;
pub mod comment;
pub mod user;
pub mod views;
