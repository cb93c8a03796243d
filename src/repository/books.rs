//! Books repository for database operations

use chrono::Utc;
use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::book::{Book, BookQuery, CreateBook, UpdateBook},
};

/// Shared SELECT: book columns, joined author name and computed availability
const BOOK_SELECT: &str = r#"
    SELECT b.id, b.title, b.isbn, b.author_id, a.name AS author_name,
           b.publication_year, b.summary, b.total_copies,
           b.total_copies::bigint - (
               SELECT COUNT(*) FROM loans l
               WHERE l.book_id = b.id AND l.returned_at IS NULL
           ) AS available_copies,
           b.created_at, b.updated_at
    FROM books b
    LEFT JOIN authors a ON b.author_id = a.id
"#;

#[derive(Clone)]
pub struct BooksRepository {
    pool: Pool<Postgres>,
}

impl BooksRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get book by ID (with availability)
    pub async fn get_by_id(&self, id: i32) -> AppResult<Book> {
        let query = format!("{} WHERE b.id = $1", BOOK_SELECT);
        sqlx::query_as::<_, Book>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))
    }

    /// Check if ISBN already exists
    pub async fn isbn_exists(&self, isbn: &str, exclude_id: Option<i32>) -> AppResult<bool> {
        let exists: bool = if let Some(id) = exclude_id {
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM books WHERE isbn = $1 AND id != $2)")
                .bind(isbn)
                .bind(id)
                .fetch_one(&self.pool)
                .await?
        } else {
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM books WHERE isbn = $1)")
                .bind(isbn)
                .fetch_one(&self.pool)
                .await?
        };
        Ok(exists)
    }

    /// Search books by title, author name or ISBN, with pagination
    pub async fn search(&self, query: &BookQuery) -> AppResult<(Vec<Book>, i64)> {
        let page = query.page.unwrap_or(1).max(1);
        let per_page = query.per_page.unwrap_or(20).clamp(1, 100);
        let offset = (page - 1) * per_page;

        let mut conditions = Vec::new();
        let mut params: Vec<String> = Vec::new();

        if let Some(ref title) = query.title {
            params.push(format!("%{}%", title.to_lowercase()));
            conditions.push(format!("LOWER(b.title) LIKE ${}", params.len()));
        }

        if let Some(ref author) = query.author {
            params.push(format!("%{}%", author.to_lowercase()));
            conditions.push(format!("LOWER(a.name) LIKE ${}", params.len()));
        }

        if let Some(ref isbn) = query.isbn {
            params.push(isbn.clone());
            conditions.push(format!("b.isbn = ${}", params.len()));
        }

        if query.available == Some(true) {
            conditions.push(
                "b.total_copies > (SELECT COUNT(*) FROM loans l WHERE l.book_id = b.id AND l.returned_at IS NULL)"
                    .to_string(),
            );
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let count_query = format!(
            "SELECT COUNT(*) FROM books b LEFT JOIN authors a ON b.author_id = a.id {}",
            where_clause
        );
        let mut count_builder = sqlx::query_scalar::<_, i64>(&count_query);
        for param in &params {
            count_builder = count_builder.bind(param);
        }
        let total = count_builder.fetch_one(&self.pool).await?;

        let select_query = format!(
            "{} {} ORDER BY b.title LIMIT {} OFFSET {}",
            BOOK_SELECT, where_clause, per_page, offset
        );
        let mut select_builder = sqlx::query_as::<_, Book>(&select_query);
        for param in &params {
            select_builder = select_builder.bind(param);
        }
        let books = select_builder.fetch_all(&self.pool).await?;

        Ok((books, total))
    }

    /// Create a new book
    pub async fn create(&self, book: &CreateBook) -> AppResult<Book> {
        let now = Utc::now();

        let id = sqlx::query_scalar::<_, i32>(
            r#"
            INSERT INTO books (title, isbn, author_id, publication_year, summary, total_copies, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id
            "#,
        )
        .bind(&book.title)
        .bind(&book.isbn)
        .bind(&book.author_id)
        .bind(&book.publication_year)
        .bind(&book.summary)
        .bind(book.total_copies.unwrap_or(1))
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        self.get_by_id(id).await
    }

    /// Update an existing book
    pub async fn update(&self, id: i32, book: &UpdateBook) -> AppResult<Book> {
        let now = Utc::now();

        let mut sets = vec!["updated_at = $1".to_string()];
        let mut param_idx = 2;

        macro_rules! add_field {
            ($field:expr, $name:expr) => {
                if $field.is_some() {
                    sets.push(format!("{} = ${}", $name, param_idx));
                    param_idx += 1;
                }
            };
        }

        add_field!(book.title, "title");
        add_field!(book.isbn, "isbn");
        add_field!(book.author_id, "author_id");
        add_field!(book.publication_year, "publication_year");
        add_field!(book.summary, "summary");
        add_field!(book.total_copies, "total_copies");
        let _ = param_idx;

        let query = format!("UPDATE books SET {} WHERE id = {}", sets.join(", "), id);

        let mut builder = sqlx::query(&query).bind(now);

        macro_rules! bind_field {
            ($field:expr) => {
                if let Some(ref val) = $field {
                    builder = builder.bind(val);
                }
            };
        }

        bind_field!(book.title);
        bind_field!(book.isbn);
        bind_field!(book.author_id);
        bind_field!(book.publication_year);
        bind_field!(book.summary);
        bind_field!(book.total_copies);

        builder.execute(&self.pool).await?;

        self.get_by_id(id).await
    }

    /// Delete a book. Refused while active loans exist for it.
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let active_loans: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM loans WHERE book_id = $1 AND returned_at IS NULL",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        if active_loans > 0 {
            return Err(AppError::Conflict(
                "Book has active loans and cannot be deleted".to_string(),
            ));
        }

        let result = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Book with id {} not found", id)));
        }

        Ok(())
    }

    /// Books written by a given author
    pub async fn list_by_author(&self, author_id: i32) -> AppResult<Vec<Book>> {
        let query = format!("{} WHERE b.author_id = $1 ORDER BY b.title", BOOK_SELECT);
        let books = sqlx::query_as::<_, Book>(&query)
            .bind(author_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(books)
    }
}
