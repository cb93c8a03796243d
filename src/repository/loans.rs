//! Loans repository for database operations

use chrono::{DateTime, Duration, Utc};
use sqlx::{Pool, Postgres, Row};

use crate::{
    error::{AppError, AppResult},
    models::loan::{Loan, LoanDetails, LoanQuery, LoanStatus},
};

/// Shared SELECT: loan columns with borrower and book titles joined in
const LOAN_DETAILS_SELECT: &str = r#"
    SELECT l.id, l.user_id, u.username, l.book_id, b.title AS book_title,
           l.loan_date, l.due_date, l.renewals, l.returned_at
    FROM loans l
    JOIN users u ON l.user_id = u.id
    JOIN books b ON l.book_id = b.id
"#;

#[derive(Clone)]
pub struct LoansRepository {
    pool: Pool<Postgres>,
}

impl LoansRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    fn details_from_row(row: &sqlx::postgres::PgRow, now: DateTime<Utc>) -> LoanDetails {
        let due_date: DateTime<Utc> = row.get("due_date");
        let returned_at: Option<DateTime<Utc>> = row.get("returned_at");
        LoanDetails {
            id: row.get("id"),
            user_id: row.get("user_id"),
            username: row.get("username"),
            book_id: row.get("book_id"),
            book_title: row.get("book_title"),
            loan_date: row.get("loan_date"),
            due_date,
            renewals: row.get("renewals"),
            returned_at,
            is_overdue: returned_at.is_none() && due_date < now,
        }
    }

    /// Get loan by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Loan> {
        sqlx::query_as::<_, Loan>("SELECT * FROM loans WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Loan with id {} not found", id)))
    }

    /// Get loan details by ID
    pub async fn get_details(&self, id: i32) -> AppResult<LoanDetails> {
        let query = format!("{} WHERE l.id = $1", LOAN_DETAILS_SELECT);
        let row = sqlx::query(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Loan with id {} not found", id)))?;

        Ok(Self::details_from_row(&row, Utc::now()))
    }

    /// Loans for a user, newest first. When `active_only`, returned loans are excluded.
    pub async fn get_user_loans(&self, user_id: i32, active_only: bool) -> AppResult<Vec<LoanDetails>> {
        let filter = if active_only {
            "WHERE l.user_id = $1 AND l.returned_at IS NULL"
        } else {
            "WHERE l.user_id = $1"
        };
        let query = format!("{} {} ORDER BY l.loan_date DESC", LOAN_DETAILS_SELECT, filter);

        let rows = sqlx::query(&query)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;

        let now = Utc::now();
        Ok(rows.iter().map(|r| Self::details_from_row(r, now)).collect())
    }

    /// List all loans with status filter and pagination
    pub async fn list(&self, query: &LoanQuery) -> AppResult<(Vec<LoanDetails>, i64)> {
        let page = query.page.unwrap_or(1).max(1);
        let per_page = query.per_page.unwrap_or(20).clamp(1, 100);
        let offset = (page - 1) * per_page;

        let where_clause = match query.status {
            Some(LoanStatus::Active) => "WHERE l.returned_at IS NULL",
            Some(LoanStatus::Returned) => "WHERE l.returned_at IS NOT NULL",
            Some(LoanStatus::Overdue) => "WHERE l.returned_at IS NULL AND l.due_date < NOW()",
            None => "",
        };

        let count_query = format!("SELECT COUNT(*) FROM loans l {}", where_clause);
        let total: i64 = sqlx::query_scalar(&count_query).fetch_one(&self.pool).await?;

        let select_query = format!(
            "{} {} ORDER BY l.loan_date DESC LIMIT {} OFFSET {}",
            LOAN_DETAILS_SELECT, where_clause, per_page, offset
        );
        let rows = sqlx::query(&select_query).fetch_all(&self.pool).await?;

        let now = Utc::now();
        let loans = rows.iter().map(|r| Self::details_from_row(r, now)).collect();

        Ok((loans, total))
    }

    /// Create a new loan. Checks availability and the borrower's loan quota.
    pub async fn create(
        &self,
        user_id: i32,
        book_id: i32,
        period_days: i64,
        max_per_user: i64,
    ) -> AppResult<LoanDetails> {
        let now = Utc::now();

        // Check availability
        let row = sqlx::query(
            r#"
            SELECT b.total_copies,
                   (SELECT COUNT(*) FROM loans l WHERE l.book_id = b.id AND l.returned_at IS NULL) AS borrowed
            FROM books b
            WHERE b.id = $1
            "#,
        )
        .bind(book_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", book_id)))?;

        let total_copies: i32 = row.get("total_copies");
        let borrowed: i64 = row.get("borrowed");

        if borrowed >= total_copies as i64 {
            return Err(AppError::BusinessRule(
                "No copies of this book are available".to_string(),
            ));
        }

        // Check borrower quota
        let current_loans: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM loans WHERE user_id = $1 AND returned_at IS NULL",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        if current_loans >= max_per_user {
            return Err(AppError::BusinessRule(format!(
                "Maximum active loans reached ({}/{})",
                current_loans, max_per_user
            )));
        }

        let due_date = now + Duration::days(period_days);

        let loan_id = sqlx::query_scalar::<_, i32>(
            r#"
            INSERT INTO loans (user_id, book_id, loan_date, due_date, renewals)
            VALUES ($1, $2, $3, $4, 0)
            RETURNING id
            "#,
        )
        .bind(user_id)
        .bind(book_id)
        .bind(now)
        .bind(due_date)
        .fetch_one(&self.pool)
        .await?;

        self.get_details(loan_id).await
    }

    /// Return a loan. A loan can be returned exactly once.
    pub async fn return_loan(&self, loan_id: i32) -> AppResult<LoanDetails> {
        let now = Utc::now();

        let loan = self.get_by_id(loan_id).await?;

        if loan.is_returned() {
            return Err(AppError::BusinessRule("Loan already returned".to_string()));
        }

        sqlx::query("UPDATE loans SET returned_at = $1 WHERE id = $2")
            .bind(now)
            .bind(loan_id)
            .execute(&self.pool)
            .await?;

        self.get_details(loan_id).await
    }

    /// Renew a loan, extending the due date by the loan period.
    pub async fn renew_loan(
        &self,
        loan_id: i32,
        period_days: i64,
        max_renewals: i16,
    ) -> AppResult<LoanDetails> {
        let now = Utc::now();

        let loan = self.get_by_id(loan_id).await?;

        if loan.is_returned() {
            return Err(AppError::BusinessRule(
                "Cannot renew a returned loan".to_string(),
            ));
        }

        if loan.is_overdue_at(now) {
            return Err(AppError::BusinessRule(
                "Overdue loans cannot be renewed".to_string(),
            ));
        }

        if loan.renewals >= max_renewals {
            return Err(AppError::BusinessRule(format!(
                "Maximum renewals reached ({}/{})",
                loan.renewals, max_renewals
            )));
        }

        let new_due_date = loan.due_date + Duration::days(period_days);

        sqlx::query("UPDATE loans SET due_date = $1, renewals = $2 WHERE id = $3")
            .bind(new_due_date)
            .bind(loan.renewals + 1)
            .bind(loan_id)
            .execute(&self.pool)
            .await?;

        self.get_details(loan_id).await
    }
}
