/// Write-time rules that span more than one card
///
/// The only rule today: at most one card system-wide may be "In Progress".
/// Handlers hold the rule as `Arc<dyn CardStatusConstraint>` and call it
/// after structural validation, before writing. The partial unique index on
/// `cards(status)` backs it up against concurrent writers.
///
/// # Example
///
/// ```no_run
/// use taskboard_shared::constraints::{CardStatusConstraint, SingleInProgress};
/// use taskboard_shared::models::card::CardStatus;
///
/// # async fn example(pool: sqlx::SqlitePool) -> Result<(), Box<dyn std::error::Error>> {
/// let rule = SingleInProgress;
/// rule.check(&pool, None, CardStatus::InProgress).await?;
/// # Ok(())
/// # }
/// ```

use async_trait::async_trait;
use sqlx::SqlitePool;

use crate::models::card::{Card, CardStatus};

pub const IN_PROGRESS_TAKEN_MESSAGE: &str = "Status cannot be 'In Progress'";

/// Error type for constraint checks
#[derive(Debug, thiserror::Error)]
pub enum ConstraintError {
    /// The write would break the rule; reported against `field`
    #[error("{field}: {message}")]
    Violation {
        field: &'static str,
        message: String,
    },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Checks a prospective card status before it is written
#[async_trait]
pub trait CardStatusConstraint: Send + Sync {
    /// `card_id` is the card being updated, or `None` for a new card
    async fn check(
        &self,
        pool: &SqlitePool,
        card_id: Option<i64>,
        status: CardStatus,
    ) -> Result<(), ConstraintError>;
}

/// At most one "In Progress" card at a time
///
/// The card being updated is excluded from the count, so re-saving the
/// current holder is allowed.
#[derive(Debug, Clone, Copy, Default)]
pub struct SingleInProgress;

#[async_trait]
impl CardStatusConstraint for SingleInProgress {
    async fn check(
        &self,
        pool: &SqlitePool,
        card_id: Option<i64>,
        status: CardStatus,
    ) -> Result<(), ConstraintError> {
        if status != CardStatus::InProgress {
            return Ok(());
        }

        let holders = Card::count_with_status(pool, CardStatus::InProgress, card_id).await?;
        if holders > 0 {
            tracing::debug!(card_id = ?card_id, "Rejected second in-progress card");
            return Err(ConstraintError::Violation {
                field: "status",
                message: IN_PROGRESS_TAKEN_MESSAGE.to_string(),
            });
        }

        Ok(())
    }
}
