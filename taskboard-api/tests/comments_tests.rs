/// Integration tests for comments nested under cards

mod common;

use axum::http::StatusCode;
use common::TestContext;
use serde_json::json;
use taskboard_shared::models::card::CardStatus;
use taskboard_shared::models::comment::{Comment, CreateComment};

#[tokio::test]
async fn test_create_and_list_comments() {
    let ctx = TestContext::new().await;
    let (alice_id, alice) = ctx.user("Alice", "a@b.com").await;
    let (_, bob) = ctx.user("Bob", "bob@b.com").await;
    let card = ctx.insert_card(alice_id, "Alice task", CardStatus::ToDo).await;
    let uri = format!("/{}/comments/", card.id);

    let (status, body) = ctx
        .post(&uri, Some(&alice), json!({ "message": "Started on this" }))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "Started on this");
    assert_eq!(body["card"], json!({ "id": card.id, "title": "Alice task" }));
    assert_eq!(
        body["user"],
        json!({ "id": alice_id, "name": "Alice", "email": "a@b.com" })
    );

    // Listing is open to any authenticated caller
    let (status, body) = ctx.get(&uri, &bob).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);

    let (status, body) = ctx.get(&format!("/{}/comments", card.id), &bob).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["message"], "Started on this");
}

#[tokio::test]
async fn test_only_card_owner_may_comment() {
    let ctx = TestContext::new().await;
    let (alice_id, _) = ctx.user("Alice", "a@b.com").await;
    let (_, bob) = ctx.user("Bob", "bob@b.com").await;
    let card = ctx.insert_card(alice_id, "Alice task", CardStatus::ToDo).await;

    let (status, body) = ctx
        .post(
            &format!("/{}/comments/", card.id),
            Some(&bob),
            json!({ "message": "Drive-by" }),
        )
        .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, json!({ "message": "Unauthorized" }));
    assert_eq!(Comment::count_by_card(&ctx.db, card.id).await.unwrap(), 0);
}

#[tokio::test]
async fn test_comment_on_missing_card() {
    let ctx = TestContext::new().await;
    let (_, token) = ctx.user("Alice", "a@b.com").await;

    let (status, body) = ctx
        .post("/77/comments/", Some(&token), json!({ "message": "Hello" }))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "message": "Card not found" }));

    let (status, _) = ctx.get("/77/comments/", &token).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_comment_message_required() {
    let ctx = TestContext::new().await;
    let (alice_id, alice) = ctx.user("Alice", "a@b.com").await;
    let card = ctx.insert_card(alice_id, "Alice task", CardStatus::ToDo).await;

    let (status, body) = ctx
        .post(&format!("/{}/comments/", card.id), Some(&alice), json!({}))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["validation_error"]["message"],
        json!(["Missing data for required field."])
    );
}

#[tokio::test]
async fn test_only_author_may_edit_or_delete() {
    let ctx = TestContext::new().await;
    let (alice_id, alice) = ctx.user("Alice", "a@b.com").await;
    let (bob_id, bob) = ctx.user("Bob", "bob@b.com").await;
    let card = ctx.insert_card(alice_id, "Alice task", CardStatus::ToDo).await;

    // Bob's comment on Alice's card, written directly to the store
    let comment = Comment::create(
        &ctx.db,
        CreateComment {
            message: "Bob was here".to_string(),
            date: chrono::Utc::now().date_naive(),
            card_id: card.id,
            user_id: bob_id,
        },
    )
    .await
    .unwrap();
    let uri = format!("/{}/comments/{}", card.id, comment.id);

    // The card owner is not the author
    let (status, body) = ctx.put(&uri, &alice, json!({ "message": "Edited" })).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, json!({ "message": "Unauthorized" }));

    let (status, _) = ctx.delete(&uri, &alice).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = ctx.patch(&uri, &bob, json!({ "message": "Edited" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Edited");
    assert_eq!(body["user"]["id"], bob_id);

    let (status, body) = ctx.delete(&uri, &bob).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "message": "Comment deleted successfully" }));
    assert!(Comment::find_by_id(&ctx.db, comment.id).await.unwrap().is_none());

    let (status, body) = ctx.delete(&uri, &bob).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "message": "Comment not found" }));
}

#[tokio::test]
async fn test_comment_scoped_to_card_in_path() {
    let ctx = TestContext::new().await;
    let (alice_id, alice) = ctx.user("Alice", "a@b.com").await;
    let first = ctx.insert_card(alice_id, "First card", CardStatus::ToDo).await;
    let second = ctx.insert_card(alice_id, "Second card", CardStatus::ToDo).await;

    let (_, body) = ctx
        .post(
            &format!("/{}/comments/", first.id),
            Some(&alice),
            json!({ "message": "On the first card" }),
        )
        .await;
    let comment_id = body["id"].as_i64().unwrap();

    let (status, _) = ctx
        .patch(
            &format!("/{}/comments/{}", second.id, comment_id),
            &alice,
            json!({ "message": "Moved?" }),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let stored = Comment::find_by_id(&ctx.db, comment_id).await.unwrap().unwrap();
    assert_eq!(stored.message, "On the first card");
}

#[tokio::test]
async fn test_non_numeric_card_id_is_not_found() {
    let ctx = TestContext::new().await;
    let (_, token) = ctx.user("Alice", "a@b.com").await;

    let (status, body) = ctx.get("/abc/comments/", &token).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Resource not found");
}

#[tokio::test]
async fn test_ownership_checked_before_body() {
    let ctx = TestContext::new().await;
    let (alice_id, alice) = ctx.user("Alice", "a@b.com").await;
    let (_, bob) = ctx.user("Bob", "bob@b.com").await;
    let card = ctx.insert_card(alice_id, "Alice task", CardStatus::ToDo).await;

    let (status, _) = ctx
        .post(&format!("/{}/comments/", card.id), Some(&bob), json!("x"))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (_, created) = ctx
        .post(
            &format!("/{}/comments/", card.id),
            Some(&alice),
            json!({ "message": "Mine" }),
        )
        .await;
    let (status, _) = ctx
        .put(
            &format!("/{}/comments/{}", card.id, created["id"]),
            &bob,
            json!(42),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
