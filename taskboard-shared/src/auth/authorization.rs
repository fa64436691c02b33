/// Ownership-based authorization
///
/// Every mutating endpoint resolves the caller, then the target entity, then
/// asks this module whether the caller may act on it. The rule per operation:
///
/// | Operation                 | Caller must equal        |
/// |---------------------------|--------------------------|
/// | update user               | the user                 |
/// | update / delete card      | the card's owner         |
/// | create comment on a card  | the card's owner         |
/// | update / delete comment   | the comment's author     |
///
/// Comment creation is gated on the card owner while comment edits are gated
/// on the comment author. Each check is kept per operation.
///
/// # Example
///
/// ```
/// use taskboard_shared::auth::authorization::{require_ownership, AuthzError};
/// use taskboard_shared::auth::middleware::AuthContext;
///
/// let auth = AuthContext::new(1);
/// assert!(require_ownership(&auth, 1).is_ok());
/// assert!(matches!(require_ownership(&auth, 2), Err(AuthzError::NotAuthorized)));
/// ```

use super::middleware::AuthContext;
use crate::models::{card::Card, comment::Comment, user::User};

/// Error type for authorization checks
#[derive(Debug, thiserror::Error)]
pub enum AuthzError {
    /// Caller is authenticated but is not the entity's owner/author
    #[error("Not authorized to access this resource")]
    NotAuthorized,
}

/// An entity with a single recorded owner
pub trait Owned {
    /// User id compared against the caller
    fn owner_id(&self) -> i64;
}

impl Owned for User {
    fn owner_id(&self) -> i64 {
        self.id
    }
}

impl Owned for Card {
    fn owner_id(&self) -> i64 {
        self.user_id
    }
}

/// Comments are owned by their author
impl Owned for Comment {
    fn owner_id(&self) -> i64 {
        self.user_id
    }
}

/// Checks that the caller is the given owner id
pub fn require_ownership(auth: &AuthContext, resource_owner_id: i64) -> Result<(), AuthzError> {
    if auth.user_id != resource_owner_id {
        return Err(AuthzError::NotAuthorized);
    }

    Ok(())
}

/// Checks that the caller owns `resource`
pub fn require_owner<T: Owned>(auth: &AuthContext, resource: &T) -> Result<(), AuthzError> {
    require_ownership(auth, resource.owner_id())
}

/// Checks that the caller may comment on `card`
///
/// Only the card's owner may add comments to it.
pub fn require_can_comment(auth: &AuthContext, card: &Card) -> Result<(), AuthzError> {
    require_owner(auth, card)
}
