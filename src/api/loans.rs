//! Loan management endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use crate::{
    error::AppResult,
    models::loan::{CreateLoan, LoanDetails, LoanQuery},
};

use super::{books::PaginatedResponse, AuthenticatedUser};

/// List all loans (admin)
#[utoipa::path(
    get,
    path = "/loans",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(
        ("status" = Option<String>, Query, description = "Filter: active, returned or overdue"),
        ("page" = Option<i64>, Query, description = "Page number"),
        ("per_page" = Option<i64>, Query, description = "Items per page")
    ),
    responses(
        (status = 200, description = "List of loans", body = PaginatedResponse<LoanDetails>),
        (status = 403, description = "Admin privileges required")
    )
)]
pub async fn list_loans(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<LoanQuery>,
) -> AppResult<Json<PaginatedResponse<LoanDetails>>> {
    claims.require_admin()?;

    let (loans, total) = state.services.loans.list(&query).await?;

    Ok(Json(PaginatedResponse {
        items: loans,
        total,
        page: query.page.unwrap_or(1),
        per_page: query.per_page.unwrap_or(20),
    }))
}

/// Get loans for a specific user (self or admin)
#[utoipa::path(
    get,
    path = "/users/{id}/loans",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "User ID"),
        ("active_only" = Option<bool>, Query, description = "Exclude returned loans")
    ),
    responses(
        (status = 200, description = "User's loans", body = Vec<LoanDetails>),
        (status = 403, description = "Not the account owner"),
        (status = 404, description = "User not found")
    )
)]
pub async fn get_user_loans(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(user_id): Path<i32>,
    Query(params): Query<UserLoansParams>,
) -> AppResult<Json<Vec<LoanDetails>>> {
    claims.require_self_or_admin(user_id)?;

    let loans = state
        .services
        .loans
        .get_user_loans(user_id, params.active_only.unwrap_or(false))
        .await?;
    Ok(Json(loans))
}

#[derive(Deserialize)]
pub struct UserLoansParams {
    pub active_only: Option<bool>,
}

/// Create a new loan (borrow a book)
#[utoipa::path(
    post,
    path = "/loans",
    tag = "loans",
    security(("bearer_auth" = [])),
    request_body = CreateLoan,
    responses(
        (status = 201, description = "Loan created", body = LoanDetails),
        (status = 403, description = "Cannot borrow for another user"),
        (status = 404, description = "User or book not found"),
        (status = 422, description = "No copies available or max loans reached")
    )
)]
pub async fn create_loan(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(request): Json<CreateLoan>,
) -> AppResult<(StatusCode, Json<LoanDetails>)> {
    // Regular users may only borrow for themselves
    claims.require_self_or_admin(request.user_id)?;

    let loan = state
        .services
        .loans
        .create_loan(request.user_id, request.book_id)
        .await?;

    Ok((StatusCode::CREATED, Json(loan)))
}

/// Return a borrowed book
#[utoipa::path(
    post,
    path = "/loans/{id}/return",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Loan ID")
    ),
    responses(
        (status = 200, description = "Book returned", body = LoanDetails),
        (status = 403, description = "Not the loan owner"),
        (status = 404, description = "Loan not found"),
        (status = 422, description = "Already returned")
    )
)]
pub async fn return_loan(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(loan_id): Path<i32>,
) -> AppResult<Json<LoanDetails>> {
    let owner = state.services.loans.loan_owner(loan_id).await?;
    claims.require_self_or_admin(owner)?;

    let loan = state.services.loans.return_loan(loan_id).await?;
    Ok(Json(loan))
}

/// Renew a loan
#[utoipa::path(
    post,
    path = "/loans/{id}/renew",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Loan ID")
    ),
    responses(
        (status = 200, description = "Loan renewed", body = LoanDetails),
        (status = 403, description = "Not the loan owner"),
        (status = 404, description = "Loan not found"),
        (status = 422, description = "Max renewals reached, overdue or already returned")
    )
)]
pub async fn renew_loan(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(loan_id): Path<i32>,
) -> AppResult<Json<LoanDetails>> {
    let owner = state.services.loans.loan_owner(loan_id).await?;
    claims.require_self_or_admin(owner)?;

    let loan = state.services.loans.renew_loan(loan_id).await?;
    Ok(Json(loan))
}
