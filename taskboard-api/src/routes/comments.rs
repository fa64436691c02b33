/// Comment endpoints, nested under a card
///
/// - `GET /:card_id/comments/` - List a card's comments
/// - `POST /:card_id/comments/` - Comment on a card (card owner only)
/// - `PUT|PATCH /:card_id/comments/:comment_id` - Edit (author only)
/// - `DELETE /:card_id/comments/:comment_id` - Delete (author only)
///
/// A comment id that exists but belongs to another card is reported as not
/// found.

use axum::{
    extract::State,
    http::StatusCode,
};
use chrono::Utc;
use serde::Deserialize;
use taskboard_shared::{
    auth::{
        authorization::{require_can_comment, require_owner},
        middleware::AuthContext,
    },
    models::{
        card::Card,
        comment::{Comment, CreateComment},
        views::CommentView,
    },
};
use validator::Validate;

use super::cards::MessageResponse;
use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::{Json, Path},
};

/// Body for creating or editing a comment
#[derive(Debug, Deserialize, Validate)]
pub struct CommentRequest {
    #[validate(
        required(message = "Missing data for required field."),
        length(min = 1, message = "Message must not be empty")
    )]
    pub message: Option<String>,
}

impl CommentRequest {
    fn into_message(self) -> ApiResult<String> {
        self.validate()?;
        self.message
            .ok_or_else(|| ApiError::field("message", "Missing data for required field."))
    }
}

async fn find_card(state: &AppState, card_id: i64) -> ApiResult<Card> {
    Card::find_by_id(&state.db, card_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Card not found".to_string()))
}

/// Loads a comment, requiring it to sit on `card_id`
async fn find_comment(state: &AppState, card_id: i64, comment_id: i64) -> ApiResult<Comment> {
    Comment::find_by_id(&state.db, comment_id)
        .await?
        .filter(|comment| comment.card_id == card_id)
        .ok_or_else(|| ApiError::NotFound("Comment not found".to_string()))
}

async fn load_view(state: &AppState, comment_id: i64) -> ApiResult<CommentView> {
    CommentView::load(&state.db, comment_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Comment not found".to_string()))
}

/// Lists every comment on a card, whoever wrote it
pub async fn list_comments(
    State(state): State<AppState>,
    _auth: AuthContext,
    Path(card_id): Path<i64>,
) -> ApiResult<Json<Vec<CommentView>>> {
    let card = find_card(&state, card_id).await?;

    Ok(Json(CommentView::list_by_card(&state.db, card.id).await?))
}

/// Adds a comment, dated today, to a card the caller owns
///
/// # Errors
///
/// - `404 Not Found`: no such card
/// - `401 Unauthorized`: caller doesn't own the card
/// - `400 Bad Request`: missing or empty message
pub async fn create_comment(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(card_id): Path<i64>,
    body: Result<Json<CommentRequest>, ApiError>,
) -> ApiResult<(StatusCode, Json<CommentView>)> {
    let card = find_card(&state, card_id).await?;
    require_can_comment(&auth, &card)?;

    let Json(req) = body?;
    let message = req.into_message()?;

    let comment = Comment::create(
        &state.db,
        CreateComment {
            message,
            date: Utc::now().date_naive(),
            card_id: card.id,
            user_id: auth.user_id,
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(load_view(&state, comment.id).await?)))
}

/// Replaces the message of a comment the caller wrote
pub async fn update_comment(
    State(state): State<AppState>,
    auth: AuthContext,
    Path((card_id, comment_id)): Path<(i64, i64)>,
    body: Result<Json<CommentRequest>, ApiError>,
) -> ApiResult<Json<CommentView>> {
    let comment = find_comment(&state, card_id, comment_id).await?;
    require_owner(&auth, &comment)?;

    let Json(req) = body?;
    let message = req.into_message()?;

    Comment::update_message(&state.db, comment.id, &message)
        .await?
        .ok_or_else(|| ApiError::NotFound("Comment not found".to_string()))?;

    tracing::info!(comment_id, card_id, "Comment updated");

    Ok(Json(load_view(&state, comment.id).await?))
}

/// Deletes a comment the caller wrote
pub async fn delete_comment(
    State(state): State<AppState>,
    auth: AuthContext,
    Path((card_id, comment_id)): Path<(i64, i64)>,
) -> ApiResult<Json<MessageResponse>> {
    let comment = find_comment(&state, card_id, comment_id).await?;
    require_owner(&auth, &comment)?;

    if !Comment::delete(&state.db, comment.id).await? {
        return Err(ApiError::NotFound("Comment not found".to_string()));
    }

    tracing::info!(comment_id, card_id, "Comment deleted");

    Ok(Json(MessageResponse {
        message: "Comment deleted successfully".to_string(),
    }))
}
