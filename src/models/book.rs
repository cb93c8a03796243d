//! Book model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// Full book model (availability is computed against active loans)
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Book {
    pub id: i32,
    pub title: String,
    pub isbn: Option<String>,
    pub author_id: Option<i32>,
    /// Author name (joined, not stored on the books table)
    pub author_name: Option<String>,
    pub publication_year: Option<i16>,
    pub summary: Option<String>,
    pub total_copies: i32,
    /// Copies not currently out on loan
    pub available_copies: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Book {
    pub fn is_available(&self) -> bool {
        self.available_copies > 0
    }
}

/// Book query parameters
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct BookQuery {
    /// Search in title
    pub title: Option<String>,
    /// Search by author name
    pub author: Option<String>,
    /// Exact ISBN match
    pub isbn: Option<String>,
    /// Only books with at least one available copy
    pub available: Option<bool>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

/// Create book request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateBook {
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,
    pub isbn: Option<String>,
    pub author_id: Option<i32>,
    pub publication_year: Option<i16>,
    pub summary: Option<String>,
    #[validate(range(min = 1, message = "A book needs at least one copy"))]
    pub total_copies: Option<i32>,
}

/// Update book request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateBook {
    #[validate(length(min = 1, message = "Title cannot be empty"))]
    pub title: Option<String>,
    pub isbn: Option<String>,
    pub author_id: Option<i32>,
    pub publication_year: Option<i16>,
    pub summary: Option<String>,
    #[validate(range(min = 1, message = "A book needs at least one copy"))]
    pub total_copies: Option<i32>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[test]
    fn create_requires_title() {
        let book = CreateBook {
            title: String::new(),
            isbn: None,
            author_id: None,
            publication_year: None,
            summary: None,
            total_copies: None,
        };
        assert!(book.validate().is_err());
    }

    #[test]
    fn create_rejects_zero_copies() {
        let book = CreateBook {
            title: "Dom Casmurro".to_string(),
            isbn: Some("9788535910663".to_string()),
            author_id: Some(1),
            publication_year: Some(1899),
            summary: None,
            total_copies: Some(0),
        };
        assert!(book.validate().is_err());
    }

    #[test]
    fn availability_follows_copies() {
        let book = Book {
            id: 1,
            title: "Dom Casmurro".to_string(),
            isbn: None,
            author_id: None,
            author_name: None,
            publication_year: None,
            summary: None,
            total_copies: 3,
            available_copies: 0,
            created_at: chrono::Utc::now(),
            updated_at: None,
        };
        assert!(!book.is_available());
    }
}
