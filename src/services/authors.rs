//! Author management service

use validator::Validate;

use crate::{
    error::AppResult,
    models::{
        author::{Author, AuthorQuery, CreateAuthor, UpdateAuthor},
        book::Book,
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct AuthorsService {
    repository: Repository,
}

impl AuthorsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn get_by_id(&self, id: i32) -> AppResult<Author> {
        self.repository.authors.get_by_id(id).await
    }

    pub async fn search(&self, query: &AuthorQuery) -> AppResult<(Vec<Author>, i64)> {
        self.repository.authors.search(query).await
    }

    pub async fn create(&self, author: CreateAuthor) -> AppResult<Author> {
        author.validate()?;
        self.repository.authors.create(&author).await
    }

    pub async fn update(&self, id: i32, author: UpdateAuthor) -> AppResult<Author> {
        author.validate()?;
        self.repository.authors.get_by_id(id).await?;
        self.repository.authors.update(id, &author).await
    }

    pub async fn delete(&self, id: i32) -> AppResult<()> {
        self.repository.authors.delete(id).await
    }

    /// Books written by this author
    pub async fn get_books(&self, id: i32) -> AppResult<Vec<Book>> {
        self.repository.authors.get_by_id(id).await?;
        self.repository.books.list_by_author(id).await
    }
}
