//! Data models for Biblioteca

pub mod author;
pub mod book;
pub mod loan;
pub mod user;

// Re-export commonly used types
pub use author::Author;
pub use book::Book;
pub use loan::{Loan, LoanDetails};
pub use user::{Role, User, UserResponse};
