//! Book catalog service

use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::book::{Book, BookQuery, CreateBook, UpdateBook},
    repository::Repository,
};

#[derive(Clone)]
pub struct BooksService {
    repository: Repository,
}

impl BooksService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn get_by_id(&self, id: i32) -> AppResult<Book> {
        self.repository.books.get_by_id(id).await
    }

    pub async fn search(&self, query: &BookQuery) -> AppResult<(Vec<Book>, i64)> {
        self.repository.books.search(query).await
    }

    pub async fn create(&self, book: CreateBook) -> AppResult<Book> {
        book.validate()?;

        if let Some(ref isbn) = book.isbn {
            if self.repository.books.isbn_exists(isbn, None).await? {
                return Err(AppError::Conflict("ISBN already registered".to_string()));
            }
        }

        // Referenced author must exist
        if let Some(author_id) = book.author_id {
            self.repository.authors.get_by_id(author_id).await?;
        }

        self.repository.books.create(&book).await
    }

    pub async fn update(&self, id: i32, book: UpdateBook) -> AppResult<Book> {
        book.validate()?;

        let current = self.repository.books.get_by_id(id).await?;

        if let Some(ref isbn) = book.isbn {
            if self.repository.books.isbn_exists(isbn, Some(id)).await? {
                return Err(AppError::Conflict("ISBN already registered".to_string()));
            }
        }

        if let Some(author_id) = book.author_id {
            self.repository.authors.get_by_id(author_id).await?;
        }

        // Shrinking the collection below what is currently out on loan would
        // make availability negative
        if let Some(total) = book.total_copies {
            let borrowed = current.total_copies as i64 - current.available_copies;
            if (total as i64) < borrowed {
                return Err(AppError::BusinessRule(format!(
                    "{} copies are currently on loan; total_copies cannot be lower",
                    borrowed
                )));
            }
        }

        self.repository.books.update(id, &book).await
    }

    pub async fn delete(&self, id: i32) -> AppResult<()> {
        self.repository.books.delete(id).await
    }
}
