//! Loan model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};

/// Loan model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Loan {
    pub id: i32,
    pub user_id: i32,
    pub book_id: i32,
    pub loan_date: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
    pub renewals: i16,
    pub returned_at: Option<DateTime<Utc>>,
}

impl Loan {
    pub fn is_returned(&self) -> bool {
        self.returned_at.is_some()
    }

    pub fn is_overdue_at(&self, now: DateTime<Utc>) -> bool {
        self.returned_at.is_none() && self.due_date < now
    }
}

/// Loan with book and borrower details for display
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoanDetails {
    pub id: i32,
    pub user_id: i32,
    pub username: Option<String>,
    pub book_id: i32,
    pub book_title: Option<String>,
    pub loan_date: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
    pub renewals: i16,
    pub returned_at: Option<DateTime<Utc>>,
    pub is_overdue: bool,
}

/// Loan status filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum LoanStatus {
    Active,
    Returned,
    Overdue,
}

/// Loan listing query parameters
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct LoanQuery {
    pub status: Option<LoanStatus>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

/// Create loan request
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateLoan {
    pub user_id: i32,
    pub book_id: i32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn overdue_only_when_unreturned_and_past_due() {
        let now = Utc::now();
        let loan = Loan {
            id: 1,
            user_id: 1,
            book_id: 1,
            loan_date: now - Duration::days(20),
            due_date: now - Duration::days(6),
            renewals: 0,
            returned_at: None,
        };
        assert!(loan.is_overdue_at(now));

        let returned = Loan {
            returned_at: Some(now - Duration::days(1)),
            ..loan
        };
        assert!(!returned.is_overdue_at(now));
    }

    #[test]
    fn future_due_date_is_not_overdue() {
        let now = Utc::now();
        let loan = Loan {
            id: 1,
            user_id: 1,
            book_id: 1,
            loan_date: now,
            due_date: now + Duration::days(14),
            renewals: 0,
            returned_at: None,
        };
        assert!(!loan.is_overdue_at(now));
    }
}
