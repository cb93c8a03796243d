//! User model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Decode, Encode, FromRow, Postgres};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::error::AppError;

/// Access role governing permitted operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    User,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "USER",
            Role::Admin => "ADMIN",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "USER" => Ok(Role::User),
            "ADMIN" => Ok(Role::Admin),
            _ => Err(format!("Invalid role: {}", s)),
        }
    }
}

// SQLx conversion for Role (stored as text)
impl sqlx::Type<Postgres> for Role {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<Postgres>>::type_info()
    }
}

impl<'r> Decode<'r, Postgres> for Role {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s: String = Decode::<Postgres>::decode(value)?;
        s.parse().map_err(|e: String| e.into())
    }
}

impl Encode<'_, Postgres> for Role {
    fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
        let s: String = self.as_str().to_string();
        <String as Encode<Postgres>>::encode(s, buf)
    }
}

/// Full user model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct User {
    pub id: i32,
    pub username: String,
    pub name: Option<String>,
    pub email: String,
    /// Hashed password (argon2)
    #[serde(skip_serializing)]
    pub password: String,
    pub role: Role,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl User {
    /// Human readable account status derived from the active flag
    pub fn status_label(&self) -> &'static str {
        if self.active {
            "active"
        } else {
            "inactive"
        }
    }
}

/// User view returned by the API
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    pub id: i32,
    pub username: String,
    pub name: Option<String>,
    pub email: String,
    pub role: Role,
    /// Account status ("active" or "inactive")
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        let status = user.status_label().to_string();
        UserResponse {
            id: user.id,
            username: user.username,
            name: user.name,
            email: user.email,
            role: user.role,
            status,
            created_at: user.created_at,
        }
    }
}

/// User query parameters
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct UserQuery {
    /// Search in username and full name
    pub name: Option<String>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

/// Self-service registration request (always creates an active USER account)
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    #[validate(length(min = 3, max = 50, message = "Username must be between 3 and 50 characters"))]
    pub username: String,
    pub name: Option<String>,
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
}

/// Create user request (admin)
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateUser {
    #[validate(length(min = 3, max = 50, message = "Username must be between 3 and 50 characters"))]
    pub username: String,
    pub name: Option<String>,
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
    pub role: Option<Role>,
    pub active: Option<bool>,
}

/// Update user request. All fields optional; only present fields are changed.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateUser {
    #[validate(length(min = 3, max = 50, message = "Username must be between 3 and 50 characters"))]
    pub username: Option<String>,
    pub name: Option<String>,
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
    pub role: Option<Role>,
    pub active: Option<bool>,
    /// New password (optional)
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: Option<String>,
}

/// Activate/deactivate request
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateActive {
    pub active: bool,
}

/// JWT Claims for authenticated users
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserClaims {
    pub sub: String,
    pub user_id: i32,
    pub role: Role,
    pub exp: i64,
    pub iat: i64,
}

impl UserClaims {
    /// Create a new JWT token
    pub fn create_token(&self, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{encode, EncodingKey, Header};
        encode(
            &Header::default(),
            self,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
    }

    /// Parse JWT token
    pub fn from_token(token: &str, secret: &str) -> Result<Self, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{decode, DecodingKey, Validation};
        let token_data = decode::<Self>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::default(),
        )?;
        Ok(token_data.claims)
    }

    /// Check if user is an administrator
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Require administrator privileges
    pub fn require_admin(&self) -> Result<(), AppError> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(AppError::Authorization(
                "Administrator privileges required".to_string(),
            ))
        }
    }

    /// Require that the claims belong to `user_id`, or administrator privileges
    pub fn require_self_or_admin(&self, user_id: i32) -> Result<(), AppError> {
        if self.user_id == user_id || self.is_admin() {
            Ok(())
        } else {
            Err(AppError::Authorization(
                "Operation restricted to the account owner".to_string(),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[test]
    fn role_serializes_uppercase() {
        assert_eq!(serde_json::to_string(&Role::User).unwrap(), "\"USER\"");
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "\"ADMIN\"");
    }

    #[test]
    fn role_parses_case_insensitive() {
        assert_eq!("admin".parse::<Role>().unwrap(), Role::Admin);
        assert_eq!("USER".parse::<Role>().unwrap(), Role::User);
        assert!("librarian".parse::<Role>().is_err());
    }

    #[test]
    fn update_rejects_short_username() {
        let update = UpdateUser {
            username: Some("ab".to_string()),
            name: None,
            email: None,
            role: None,
            active: None,
            password: None,
        };
        assert!(update.validate().is_err());
    }

    #[test]
    fn update_rejects_long_username() {
        let update = UpdateUser {
            username: Some("x".repeat(51)),
            name: None,
            email: None,
            role: None,
            active: None,
            password: None,
        };
        assert!(update.validate().is_err());
    }

    #[test]
    fn update_rejects_malformed_email() {
        let update = UpdateUser {
            username: None,
            name: None,
            email: Some("not-an-email".to_string()),
            role: None,
            active: None,
            password: None,
        };
        assert!(update.validate().is_err());
    }

    #[test]
    fn update_rejects_short_password() {
        let update = UpdateUser {
            username: None,
            name: None,
            email: None,
            role: None,
            active: None,
            password: Some("12345".to_string()),
        };
        assert!(update.validate().is_err());
    }

    #[test]
    fn update_accepts_valid_partial_payload() {
        let update = UpdateUser {
            username: Some("joao123".to_string()),
            name: Some("Joao Silva".to_string()),
            email: Some("joao@example.com".to_string()),
            role: Some(Role::User),
            active: Some(true),
            password: None,
        };
        assert!(update.validate().is_ok());
    }

    #[test]
    fn register_validates_all_constraints() {
        let ok = RegisterRequest {
            username: "reader".to_string(),
            name: None,
            email: "reader@example.com".to_string(),
            password: "secret1".to_string(),
        };
        assert!(ok.validate().is_ok());

        let bad = RegisterRequest {
            username: "rd".to_string(),
            name: None,
            email: "reader@example.com".to_string(),
            password: "12345".to_string(),
        };
        let errors = bad.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("username"));
        assert!(errors.field_errors().contains_key("password"));
    }

    #[test]
    fn claims_token_round_trip() {
        let now = chrono::Utc::now().timestamp();
        let claims = UserClaims {
            sub: "admin".to_string(),
            user_id: 1,
            role: Role::Admin,
            exp: now + 3600,
            iat: now,
        };
        let token = claims.create_token("test-secret").unwrap();
        let parsed = UserClaims::from_token(&token, "test-secret").unwrap();
        assert_eq!(parsed.user_id, 1);
        assert_eq!(parsed.role, Role::Admin);
        assert_eq!(parsed.sub, "admin");
    }

    #[test]
    fn claims_rejects_wrong_secret() {
        let now = chrono::Utc::now().timestamp();
        let claims = UserClaims {
            sub: "admin".to_string(),
            user_id: 1,
            role: Role::Admin,
            exp: now + 3600,
            iat: now,
        };
        let token = claims.create_token("test-secret").unwrap();
        assert!(UserClaims::from_token(&token, "other-secret").is_err());
    }

    #[test]
    fn response_status_follows_active_flag() {
        let user = User {
            id: 1,
            username: "joao123".to_string(),
            name: Some("Joao Silva".to_string()),
            email: "joao@example.com".to_string(),
            password: "hash".to_string(),
            role: Role::User,
            active: true,
            created_at: chrono::Utc::now(),
            updated_at: None,
        };
        let response = UserResponse::from(user.clone());
        assert_eq!(response.status, "active");

        let inactive = User {
            active: false,
            ..user
        };
        assert_eq!(UserResponse::from(inactive).status, "inactive");
    }

    #[test]
    fn password_hash_is_never_serialized() {
        let user = User {
            id: 1,
            username: "joao123".to_string(),
            name: None,
            email: "joao@example.com".to_string(),
            password: "super-secret-hash".to_string(),
            role: Role::User,
            active: true,
            created_at: chrono::Utc::now(),
            updated_at: None,
        };
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("super-secret-hash"));
    }
}
