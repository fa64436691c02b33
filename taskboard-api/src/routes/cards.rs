/// Card endpoints
///
/// - `GET /cards/` - List all cards
/// - `GET /cards/:id` - Fetch one card
/// - `POST /cards/` - Create a card owned by the caller
/// - `PUT|PATCH /cards/:id` - Partial update (owner only)
/// - `DELETE /cards/:id` - Delete a card and its comments (owner only)
///
/// Writes run structural validation first, then the status constraint held
/// in `AppState`.

use axum::{
    extract::State,
    http::StatusCode,
};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use taskboard_shared::{
    auth::{authorization::require_owner, middleware::AuthContext},
    models::{
        card::{
            validate_priority, validate_status, validate_title, Card, CardPriority, CardStatus,
            CreateCard, UpdateCard,
        },
        views::CardView,
    },
};
use validator::Validate;

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::{Json, Path},
};

/// Create request; only `title` is required
#[derive(Debug, Deserialize, Validate)]
pub struct CreateCardRequest {
    #[validate(
        required(message = "Missing data for required field."),
        length(min = 4, max = 100, message = "Title must be between 4 and 100 characters"),
        custom(function = "validate_title")
    )]
    pub title: Option<String>,

    pub description: Option<String>,

    #[validate(custom(function = "validate_status"))]
    pub status: Option<String>,

    #[validate(custom(function = "validate_priority"))]
    pub priority: Option<String>,

    /// Defaults to today (UTC)
    pub date: Option<NaiveDate>,
}

/// Partial update request; there is no way to change the owner
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateCardRequest {
    #[validate(
        length(min = 4, max = 100, message = "Title must be between 4 and 100 characters"),
        custom(function = "validate_title")
    )]
    pub title: Option<String>,

    pub description: Option<String>,

    #[validate(custom(function = "validate_status"))]
    pub status: Option<String>,

    #[validate(custom(function = "validate_priority"))]
    pub priority: Option<String>,

    pub date: Option<NaiveDate>,
}

/// Response body for deletions
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

fn card_not_found() -> ApiError {
    ApiError::NotFound("Card not found".to_string())
}

/// Parses an already-validated enum field
fn parse_field<T>(field: &str, value: Option<&str>) -> ApiResult<Option<T>>
where
    T: std::str::FromStr<Err = String>,
{
    value
        .map(|v| v.parse::<T>().map_err(|msg| ApiError::field(field, msg)))
        .transpose()
}

pub async fn list_cards(
    State(state): State<AppState>,
    _auth: AuthContext,
) -> ApiResult<Json<Vec<CardView>>> {
    Ok(Json(CardView::load_all(&state.db).await?))
}

pub async fn get_card(
    State(state): State<AppState>,
    _auth: AuthContext,
    Path(id): Path<i64>,
) -> ApiResult<Json<CardView>> {
    let card = Card::find_by_id(&state.db, id)
        .await?
        .ok_or_else(card_not_found)?;

    Ok(Json(CardView::load(&state.db, card).await?))
}

/// Creates a card owned by the caller
///
/// # Errors
///
/// - `400 Bad Request`: validation failed, including a second "In Progress" card
pub async fn create_card(
    State(state): State<AppState>,
    auth: AuthContext,
    Json(req): Json<CreateCardRequest>,
) -> ApiResult<(StatusCode, Json<CardView>)> {
    req.validate()?;

    let status: CardStatus = parse_field("status", req.status.as_deref())?.unwrap_or_default();
    let priority: CardPriority =
        parse_field("priority", req.priority.as_deref())?.unwrap_or_default();

    state
        .status_constraint
        .check(&state.db, None, status)
        .await?;

    let card = Card::create(
        &state.db,
        CreateCard {
            title: req.title.unwrap_or_default(),
            description: req.description,
            status,
            priority,
            date: req.date.unwrap_or_else(|| Utc::now().date_naive()),
            user_id: auth.user_id,
        },
    )
    .await?;

    tracing::info!(card_id = card.id, user_id = auth.user_id, "Card created");

    Ok((StatusCode::CREATED, Json(CardView::load(&state.db, card).await?)))
}

/// Applies a partial update to a card the caller owns
///
/// # Errors
///
/// - `404 Not Found`: no such card
/// - `401 Unauthorized`: caller is not the owner
/// - `400 Bad Request`: validation failed
pub async fn update_card(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<i64>,
    body: Result<Json<UpdateCardRequest>, ApiError>,
) -> ApiResult<Json<CardView>> {
    let card = Card::find_by_id(&state.db, id)
        .await?
        .ok_or_else(card_not_found)?;

    require_owner(&auth, &card)?;

    let Json(req) = body?;
    req.validate()?;

    let status: Option<CardStatus> = parse_field("status", req.status.as_deref())?;
    let priority: Option<CardPriority> = parse_field("priority", req.priority.as_deref())?;

    if let Some(status) = status {
        state
            .status_constraint
            .check(&state.db, Some(id), status)
            .await?;
    }

    let updated = Card::update(
        &state.db,
        id,
        UpdateCard {
            title: req.title,
            description: req.description,
            status,
            priority,
            date: req.date,
        },
    )
    .await?
    .ok_or_else(card_not_found)?;

    tracing::info!(card_id = id, "Card updated");

    Ok(Json(CardView::load(&state.db, updated).await?))
}

/// Deletes a card the caller owns, with its comments
pub async fn delete_card(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<i64>,
) -> ApiResult<Json<MessageResponse>> {
    let card = Card::find_by_id(&state.db, id)
        .await?
        .ok_or_else(card_not_found)?;

    require_owner(&auth, &card)?;

    if !Card::delete(&state.db, id).await? {
        return Err(card_not_found());
    }

    tracing::info!(card_id = id, "Card deleted");

    Ok(Json(MessageResponse {
        message: "Card deleted successfully".to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create(json: &str) -> CreateCardRequest {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_lowercase_title_fails_pattern() {
        let errors = create(r#"{"title": "hello"}"#).validate().unwrap_err();
        let fields = errors.field_errors();
        let title = fields["title"];

        assert_eq!(title.len(), 1);
        assert_eq!(title[0].code, "title_pattern");
    }

    #[test]
    fn test_short_title_fails_length() {
        let errors = create(r#"{"title": "Abc"}"#).validate().unwrap_err();
        assert_eq!(errors.field_errors()["title"][0].code, "length");
    }

    #[test]
    fn test_missing_title_required() {
        let errors = create(r#"{"status": "To Do"}"#).validate().unwrap_err();
        assert_eq!(errors.field_errors()["title"][0].code, "required");
    }

    #[test]
    fn test_unknown_status_and_priority() {
        let errors = create(r#"{"title": "Valid title", "status": "Ongoing", "priority": "Urgent"}"#)
            .validate()
            .unwrap_err();
        let fields = errors.field_errors();

        assert!(fields.contains_key("status"));
        assert!(fields.contains_key("priority"));
    }

    #[test]
    fn test_update_request_all_optional() {
        let req: UpdateCardRequest = serde_json::from_str("{}").unwrap();
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_parse_field() {
        let status: Option<CardStatus> = parse_field("status", Some("In Progress")).unwrap();
        assert_eq!(status, Some(CardStatus::InProgress));

        let none: Option<CardPriority> = parse_field("priority", None).unwrap();
        assert!(none.is_none());

        assert!(parse_field::<CardStatus>("status", Some("Ongoing")).is_err());
    }
}
