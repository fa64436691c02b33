/// API route handlers
///
/// This module contains all route handlers organized by resource:
///
/// - `health`: Health check endpoint
/// - `auth`: Login and registration
/// - `users`: User listing and self-update
/// - `cards`: Card CRUD
/// - `comments`: Comments nested under a card

pub mod auth;
pub mod cards;
pub mod comments;
pub mod health;
pub mod users;
