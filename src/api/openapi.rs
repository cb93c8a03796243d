//! OpenAPI documentation

use axum::Router;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{auth, authors, books, health, loans, users};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Biblioteca API",
        version = "1.0.0",
        description = "Library Management System REST API",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT"),
        contact(name = "Biblioteca Team", email = "contato@biblioteca.dev")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Auth
        auth::register,
        auth::login,
        auth::me,
        // Users
        users::list_users,
        users::get_user,
        users::create_user,
        users::update_user,
        users::update_active,
        users::delete_user,
        // Authors
        authors::list_authors,
        authors::get_author,
        authors::get_author_books,
        authors::create_author,
        authors::update_author,
        authors::delete_author,
        // Books
        books::list_books,
        books::get_book,
        books::create_book,
        books::update_book,
        books::delete_book,
        // Loans
        loans::list_loans,
        loans::get_user_loans,
        loans::create_loan,
        loans::return_loan,
        loans::renew_loan,
    ),
    components(
        schemas(
            // Auth
            auth::LoginRequest,
            auth::LoginResponse,
            // Users
            crate::models::user::Role,
            crate::models::user::UserResponse,
            crate::models::user::RegisterRequest,
            crate::models::user::CreateUser,
            crate::models::user::UpdateUser,
            crate::models::user::UpdateActive,
            // Authors
            crate::models::author::Author,
            crate::models::author::CreateAuthor,
            crate::models::author::UpdateAuthor,
            // Books
            crate::models::book::Book,
            crate::models::book::CreateBook,
            crate::models::book::UpdateBook,
            // Loans
            crate::models::loan::LoanDetails,
            crate::models::loan::LoanStatus,
            crate::models::loan::CreateLoan,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Authentication endpoints"),
        (name = "users", description = "User management"),
        (name = "authors", description = "Author management"),
        (name = "books", description = "Book catalog management"),
        (name = "loans", description = "Loan management")
    )
)]
pub struct ApiDoc;

/// Registers the JWT bearer scheme used by all protected endpoints.
pub struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some(
                            "JWT obtained from POST /api/v1/auth/login".to_string(),
                        ))
                        .build(),
                ),
            );
        }
    }
}

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_bearer_security_scheme() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components present");
        assert_eq!(components.security_schemes.len(), 1);
        assert!(components.security_schemes.contains_key("bearer_auth"));
    }

    #[test]
    fn document_serializes_to_json() {
        let doc = ApiDoc::openapi();
        let json = doc.to_json().expect("serializable");
        assert!(json.contains("\"/auth/login\""));
        assert!(json.contains("bearer_auth"));
    }
}
