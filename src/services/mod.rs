//! Business logic services

pub mod authors;
pub mod books;
pub mod loans;
pub mod users;

use crate::{
    config::{AuthConfig, LoansConfig},
    repository::Repository,
};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub users: users::UsersService,
    pub authors: authors::AuthorsService,
    pub books: books::BooksService,
    pub loans: loans::LoansService,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository, auth_config: AuthConfig, loans_config: LoansConfig) -> Self {
        Self {
            users: users::UsersService::new(repository.clone(), auth_config),
            authors: authors::AuthorsService::new(repository.clone()),
            books: books::BooksService::new(repository.clone()),
            loans: loans::LoansService::new(repository, loans_config),
        }
    }
}
