//! # Taskboard API Server Library
//!
//! HTTP surface for the task board: registration and login, user
//! management, cards and card comments.
//!
//! ## Modules
//!
//! - `app`: Application state and router builder
//! - `config`: Configuration management
//! - `error`: Error handling and HTTP response mapping
//! - `extract`: JSON extractor with envelope-shaped rejections
//! - `routes`: API route handlers

pub mod app;
pub mod config;
pub mod error;
pub mod extract;
pub mod routes;
