//! API integration tests
//!
//! These run against a live server with a migrated database.

use reqwest::Client;
use serde_json::{json, Value};

const BASE_URL: &str = "http://localhost:8080/api/v1";

/// Helper to get an admin token (seeded account)
async fn get_admin_token(client: &Client) -> String {
    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({
            "username": "admin",
            "password": "admin123"
        }))
        .send()
        .await
        .expect("Failed to send login request");

    let body: Value = response.json().await.expect("Failed to parse login response");
    body["token"].as_str().expect("No token in response").to_string()
}

#[tokio::test]
#[ignore] // Run with: cargo test -- --ignored
async fn test_health_check() {
    let client = Client::new();

    let response = client
        .get(format!("{}/health", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
#[ignore]
async fn test_login() {
    let client = Client::new();

    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({
            "username": "admin",
            "password": "admin123"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["token"].is_string());
    assert_eq!(body["token_type"], "Bearer");
    assert_eq!(body["user"]["role"], "ADMIN");
}

#[tokio::test]
#[ignore]
async fn test_login_invalid_credentials() {
    let client = Client::new();

    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({
            "username": "admin",
            "password": "wrong"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
}

#[tokio::test]
#[ignore]
async fn test_get_current_user() {
    let client = Client::new();
    let token = get_admin_token(&client).await;

    let response = client
        .get(format!("{}/auth/me", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["username"], "admin");
    assert!(body["password"].is_null());
}

#[tokio::test]
#[ignore]
async fn test_register_rejects_short_username() {
    let client = Client::new();

    let response = client
        .post(format!("{}/auth/register", BASE_URL))
        .json(&json!({
            "username": "ab",
            "email": "ab@example.com",
            "password": "secret1"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 400);
}

#[tokio::test]
#[ignore]
async fn test_register_rejects_invalid_email() {
    let client = Client::new();

    let response = client
        .post(format!("{}/auth/register", BASE_URL))
        .json(&json!({
            "username": "validname",
            "email": "not-an-email",
            "password": "secret1"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 400);
}

#[tokio::test]
#[ignore]
async fn test_register_rejects_short_password() {
    let client = Client::new();

    let response = client
        .post(format!("{}/auth/register", BASE_URL))
        .json(&json!({
            "username": "validname",
            "email": "valid@example.com",
            "password": "12345"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 400);
}

#[tokio::test]
#[ignore]
async fn test_register_and_login() {
    let client = Client::new();
    let admin_token = get_admin_token(&client).await;

    let response = client
        .post(format!("{}/auth/register", BASE_URL))
        .json(&json!({
            "username": "joao_teste",
            "name": "João Teste",
            "email": "joao@example.com",
            "password": "segredo1"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 201);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["role"], "USER");
    assert_eq!(body["status"], "active");
    let user_id = body["id"].as_i64().expect("No user ID");

    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({
            "username": "joao_teste",
            "password": "segredo1"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    // Cleanup
    let _ = client
        .delete(format!("{}/users/{}", BASE_URL, user_id))
        .header("Authorization", format!("Bearer {}", admin_token))
        .send()
        .await;
}

#[tokio::test]
#[ignore]
async fn test_list_users_requires_admin() {
    let client = Client::new();
    let admin_token = get_admin_token(&client).await;

    // Register a regular user and log in with it
    let response = client
        .post(format!("{}/auth/register", BASE_URL))
        .json(&json!({
            "username": "maria_teste",
            "email": "maria@example.com",
            "password": "segredo1"
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.expect("Failed to parse response");
    let user_id = body["id"].as_i64().expect("No user ID");

    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({
            "username": "maria_teste",
            "password": "segredo1"
        }))
        .send()
        .await
        .expect("Failed to send request");
    let body: Value = response.json().await.expect("Failed to parse response");
    let user_token = body["token"].as_str().expect("No token").to_string();

    let response = client
        .get(format!("{}/users", BASE_URL))
        .header("Authorization", format!("Bearer {}", user_token))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 403);

    let response = client
        .get(format!("{}/users", BASE_URL))
        .header("Authorization", format!("Bearer {}", admin_token))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["items"].is_array());

    // Cleanup
    let _ = client
        .delete(format!("{}/users/{}", BASE_URL, user_id))
        .header("Authorization", format!("Bearer {}", admin_token))
        .send()
        .await;
}

#[tokio::test]
#[ignore]
async fn test_create_and_delete_book() {
    let client = Client::new();
    let token = get_admin_token(&client).await;

    let response = client
        .post(format!("{}/authors", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({
            "name": "Machado de Assis",
            "nationality": "Brazilian"
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.expect("Failed to parse response");
    let author_id = body["id"].as_i64().expect("No author ID");

    let response = client
        .post(format!("{}/books", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({
            "title": "Dom Casmurro",
            "isbn": "9788535910663",
            "author_id": author_id,
            "publication_year": 1899,
            "total_copies": 3
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 201);

    let body: Value = response.json().await.expect("Failed to parse response");
    let book_id = body["id"].as_i64().expect("No book ID");
    assert_eq!(body["available_copies"], 3);

    // Delete book then author
    let response = client
        .delete(format!("{}/books/{}", BASE_URL, book_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 204);

    let response = client
        .delete(format!("{}/authors/{}", BASE_URL, author_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 204);
}

#[tokio::test]
#[ignore]
async fn test_loan_lifecycle() {
    let client = Client::new();
    let token = get_admin_token(&client).await;

    // Setup: a book with one copy
    let response = client
        .post(format!("{}/books", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({
            "title": "Memórias Póstumas de Brás Cubas",
            "total_copies": 1
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.expect("Failed to parse response");
    let book_id = body["id"].as_i64().expect("No book ID");

    // Admin user id
    let response = client
        .get(format!("{}/auth/me", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");
    let body: Value = response.json().await.expect("Failed to parse response");
    let user_id = body["id"].as_i64().expect("No user ID");

    // Borrow
    let response = client
        .post(format!("{}/loans", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({ "user_id": user_id, "book_id": book_id }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.expect("Failed to parse response");
    let loan_id = body["id"].as_i64().expect("No loan ID");
    assert!(body["returned_at"].is_null());

    // Second borrow of the only copy must fail
    let response = client
        .post(format!("{}/loans", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({ "user_id": user_id, "book_id": book_id }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 422);

    // Renew
    let response = client
        .post(format!("{}/loans/{}/renew", BASE_URL, loan_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["renewals"], 1);

    // Return
    let response = client
        .post(format!("{}/loans/{}/return", BASE_URL, loan_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["returned_at"].is_string());

    // Returning twice must fail
    let response = client
        .post(format!("{}/loans/{}/return", BASE_URL, loan_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 422);

    // Cleanup: book now has no active loans
    let _ = client
        .delete(format!("{}/books/{}", BASE_URL, book_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await;
}

#[tokio::test]
#[ignore]
async fn test_unauthorized_access() {
    let client = Client::new();

    let response = client
        .get(format!("{}/books", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
}

#[tokio::test]
#[ignore]
async fn test_openapi_document() {
    let client = Client::new();

    let response = client
        .get("http://localhost:8080/api-docs/openapi.json")
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    let schemes = body["components"]["securitySchemes"]
        .as_object()
        .expect("No security schemes");
    assert_eq!(schemes.len(), 1);
    assert_eq!(schemes["bearer_auth"]["scheme"], "bearer");
}
