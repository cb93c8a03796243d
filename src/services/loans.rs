//! Loan management service

use crate::{
    config::LoansConfig,
    error::{AppError, AppResult},
    models::loan::{LoanDetails, LoanQuery},
    repository::Repository,
};

#[derive(Clone)]
pub struct LoansService {
    repository: Repository,
    config: LoansConfig,
}

impl LoansService {
    pub fn new(repository: Repository, config: LoansConfig) -> Self {
        Self { repository, config }
    }

    /// Get loans for a user
    pub async fn get_user_loans(&self, user_id: i32, active_only: bool) -> AppResult<Vec<LoanDetails>> {
        // Verify user exists
        self.repository.users.get_by_id(user_id).await?;
        self.repository.loans.get_user_loans(user_id, active_only).await
    }

    /// List all loans
    pub async fn list(&self, query: &LoanQuery) -> AppResult<(Vec<LoanDetails>, i64)> {
        self.repository.loans.list(query).await
    }

    /// Get loan details
    pub async fn get_details(&self, loan_id: i32) -> AppResult<LoanDetails> {
        self.repository.loans.get_details(loan_id).await
    }

    /// Create a new loan (borrow a book)
    pub async fn create_loan(&self, user_id: i32, book_id: i32) -> AppResult<LoanDetails> {
        let borrower = self.repository.users.get_by_id(user_id).await?;

        if !borrower.active {
            return Err(AppError::BusinessRule(
                "Inactive users cannot borrow books".to_string(),
            ));
        }

        self.repository
            .loans
            .create(
                user_id,
                book_id,
                self.config.period_days,
                self.config.max_per_user,
            )
            .await
    }

    /// Return a borrowed book
    pub async fn return_loan(&self, loan_id: i32) -> AppResult<LoanDetails> {
        self.repository.loans.return_loan(loan_id).await
    }

    /// Renew a loan
    pub async fn renew_loan(&self, loan_id: i32) -> AppResult<LoanDetails> {
        self.repository
            .loans
            .renew_loan(loan_id, self.config.period_days, self.config.max_renewals)
            .await
    }

    /// Owner of a loan (for self-or-admin checks)
    pub async fn loan_owner(&self, loan_id: i32) -> AppResult<i32> {
        Ok(self.repository.loans.get_by_id(loan_id).await?.user_id)
    }
}
