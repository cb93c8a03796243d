//! Authors repository for database operations

use chrono::Utc;
use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::author::{Author, AuthorQuery, CreateAuthor, UpdateAuthor},
};

#[derive(Clone)]
pub struct AuthorsRepository {
    pool: Pool<Postgres>,
}

impl AuthorsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get author by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Author> {
        sqlx::query_as::<_, Author>("SELECT * FROM authors WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Author with id {} not found", id)))
    }

    /// Search authors with pagination
    pub async fn search(&self, query: &AuthorQuery) -> AppResult<(Vec<Author>, i64)> {
        let page = query.page.unwrap_or(1).max(1);
        let per_page = query.per_page.unwrap_or(20).clamp(1, 100);
        let offset = (page - 1) * per_page;

        let (where_clause, pattern) = match &query.name {
            Some(name) => (
                "WHERE LOWER(name) LIKE $1",
                Some(format!("%{}%", name.to_lowercase())),
            ),
            None => ("", None),
        };

        let count_query = format!("SELECT COUNT(*) FROM authors {}", where_clause);
        let mut count_builder = sqlx::query_scalar::<_, i64>(&count_query);
        if let Some(ref p) = pattern {
            count_builder = count_builder.bind(p);
        }
        let total = count_builder.fetch_one(&self.pool).await?;

        let select_query = format!(
            "SELECT * FROM authors {} ORDER BY name LIMIT {} OFFSET {}",
            where_clause, per_page, offset
        );
        let mut select_builder = sqlx::query_as::<_, Author>(&select_query);
        if let Some(ref p) = pattern {
            select_builder = select_builder.bind(p);
        }
        let authors = select_builder.fetch_all(&self.pool).await?;

        Ok((authors, total))
    }

    /// Create a new author
    pub async fn create(&self, author: &CreateAuthor) -> AppResult<Author> {
        let now = Utc::now();

        let id = sqlx::query_scalar::<_, i32>(
            r#"
            INSERT INTO authors (name, bio, birth_date, nationality, created_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(&author.name)
        .bind(&author.bio)
        .bind(&author.birth_date)
        .bind(&author.nationality)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        self.get_by_id(id).await
    }

    /// Update an existing author
    pub async fn update(&self, id: i32, author: &UpdateAuthor) -> AppResult<Author> {
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

        add_field!(author.name, "name");
        add_field!(author.bio, "bio");
        add_field!(author.birth_date, "birth_date");
        add_field!(author.nationality, "nationality");
        let _ = param_idx;

        let query = format!("UPDATE authors SET {} WHERE id = {}", sets.join(", "), id);

        let mut builder = sqlx::query(&query).bind(now);

        macro_rules! bind_field {
            ($field:expr) => {
                if let Some(ref val) = $field {
                    builder = builder.bind(val);
                }
            };
        }

        bind_field!(author.name);
        bind_field!(author.bio);
        bind_field!(author.birth_date);
        bind_field!(author.nationality);

        builder.execute(&self.pool).await?;

        self.get_by_id(id).await
    }

    /// Delete an author. Refused while books reference the author.
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let referencing_books: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM books WHERE author_id = $1")
                .bind(id)
                .fetch_one(&self.pool)
                .await?;

        if referencing_books > 0 {
            return Err(AppError::Conflict(
                "Author is referenced by existing books".to_string(),
            ));
        }

        let result = sqlx::query("DELETE FROM authors WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "Author with id {} not found",
                id
            )));
        }

        Ok(())
    }
}
