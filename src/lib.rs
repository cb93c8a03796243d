//! Biblioteca Library Management System
//!
//! A REST JSON API for managing a library: users with role-based
//! access, JWT authentication, books, authors and loans.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub pool: sqlx::Pool<sqlx::Postgres>,
    pub services: Arc<services::Services>,
}
