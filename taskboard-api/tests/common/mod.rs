//! Common test utilities for integration tests
//!
//! Every `TestContext` owns a fresh in-memory database with migrations
//! applied and a router built on top of it. Requests go through
//! `tower::ServiceExt::oneshot`, so no socket is opened.

#![allow(dead_code)]

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use serde_json::Value;
use sqlx::SqlitePool;
use taskboard_api::app::{build_router, AppState};
use taskboard_api::config::Config;
use taskboard_shared::auth::jwt::{create_token, Claims};
use taskboard_shared::db::migrations::run_migrations;
use taskboard_shared::db::pool::{create_pool, DatabaseConfig};
use taskboard_shared::models::card::{Card, CardPriority, CardStatus, CreateCard};
use tower::ServiceExt;

pub const TEST_SECRET: &str = "integration-test-secret-at-least-32-bytes";

/// Test context containing all necessary resources
pub struct TestContext {
    pub db: SqlitePool,
    pub app: axum::Router,
    pub config: Config,
}

impl TestContext {
    /// Creates a new test context with a fresh database
    pub async fn new() -> Self {
        let config = Config::from_lookup(|key| match key {
            "JWT_SECRET" => Some(TEST_SECRET.to_string()),
            "DATABASE_URL" => Some("sqlite::memory:".to_string()),
            _ => None,
        })
        .expect("Failed to build test config");

        let db = create_pool(DatabaseConfig::in_memory())
            .await
            .expect("Failed to create pool");
        run_migrations(&db).await.expect("Migrations failed");

        let app = build_router(AppState::new(db.clone(), config.clone()));

        Self { db, app, config }
    }

    /// Sends a request and returns the status and parsed JSON body
    ///
    /// An empty body parses as `Value::Null`.
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);

        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }

        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .unwrap();

        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();

        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };

        (status, json)
    }

    pub async fn get(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.send(Method::GET, uri, Some(token), None).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.send(Method::POST, uri, token, Some(body)).await
    }

    pub async fn put(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.send(Method::PUT, uri, Some(token), Some(body)).await
    }

    pub async fn patch(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.send(Method::PATCH, uri, Some(token), Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.send(Method::DELETE, uri, Some(token), None).await
    }

    /// Registers through the API and returns the new user's id
    pub async fn register(&self, name: &str, email: &str, password: &str) -> i64 {
        let (status, body) = self
            .post(
                "/auth/register",
                None,
                serde_json::json!({ "name": name, "email": email, "password": password }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "register failed: {body}");
        body["id"].as_i64().unwrap()
    }

    /// Logs in through the API and returns the access token
    pub async fn login(&self, email: &str, password: &str) -> String {
        let (status, body) = self
            .post(
                "/auth/login",
                None,
                serde_json::json!({ "email": email, "password": password }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "login failed: {body}");
        body["access_token"].as_str().unwrap().to_string()
    }

    /// Registers a user and returns `(id, token)`
    pub async fn user(&self, name: &str, email: &str) -> (i64, String) {
        let id = self.register(name, email, "pw123456").await;
        let token = self.login(email, "pw123456").await;
        (id, token)
    }

    /// Signs a token directly, bypassing login
    pub fn token_for(&self, user_id: i64) -> String {
        create_token(&Claims::new(user_id), &self.config.jwt.secret).unwrap()
    }

    /// Inserts a card straight into the store
    pub async fn insert_card(&self, user_id: i64, title: &str, status: CardStatus) -> Card {
        Card::create(
            &self.db,
            CreateCard {
                title: title.to_string(),
                description: None,
                status,
                priority: CardPriority::Low,
                date: chrono::Utc::now().date_naive(),
                user_id,
            },
        )
        .await
        .unwrap()
    }
}
