//! Authentication and user management service

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::Utc;
use validator::Validate;

use crate::{
    config::AuthConfig,
    error::{AppError, AppResult},
    models::user::{CreateUser, RegisterRequest, Role, UpdateUser, User, UserClaims, UserQuery},
    repository::Repository,
};

#[derive(Clone)]
pub struct UsersService {
    repository: Repository,
    config: AuthConfig,
}

impl UsersService {
    pub fn new(repository: Repository, config: AuthConfig) -> Self {
        Self { repository, config }
    }

    /// Authenticate by username and password, returning a JWT token and the user
    pub async fn authenticate(&self, username: &str, password: &str) -> AppResult<(String, User)> {
        let user = self
            .repository
            .users
            .get_by_username(username)
            .await?
            .ok_or_else(|| AppError::Authentication("Invalid username or password".to_string()))?;

        if !self.verify_password(&user, password)? {
            return Err(AppError::Authentication(
                "Invalid username or password".to_string(),
            ));
        }

        if !user.active {
            return Err(AppError::Authentication("Account is inactive".to_string()));
        }

        let token = self.create_token(&user)?;
        Ok((token, user))
    }

    /// Create JWT token for a user
    fn create_token(&self, user: &User) -> AppResult<String> {
        let now = Utc::now().timestamp();
        let exp = now + (self.config.jwt_expiration_hours as i64 * 3600);

        let claims = UserClaims {
            sub: user.username.clone(),
            user_id: user.id,
            role: user.role,
            exp,
            iat: now,
        };

        claims
            .create_token(&self.config.jwt_secret)
            .map_err(|e| AppError::Internal(format!("Failed to create token: {}", e)))
    }

    /// Verify user password against the stored argon2 hash
    fn verify_password(&self, user: &User, password: &str) -> AppResult<bool> {
        let parsed_hash = PasswordHash::new(&user.password)
            .map_err(|_| AppError::Internal("Invalid password hash".to_string()))?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }

    /// Hash a password using Argon2
    pub fn hash_password(&self, password: &str) -> AppResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();
        let hash = argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?;
        Ok(hash.to_string())
    }

    /// Self-service registration. Always creates an active USER account.
    pub async fn register(&self, request: RegisterRequest) -> AppResult<User> {
        request.validate()?;

        if self
            .repository
            .users
            .username_exists(&request.username, None)
            .await?
        {
            return Err(AppError::Conflict("Username already exists".to_string()));
        }
        if self.repository.users.email_exists(&request.email, None).await? {
            return Err(AppError::Conflict("Email already exists".to_string()));
        }

        let password_hash = self.hash_password(&request.password)?;
        let create = CreateUser {
            username: request.username,
            name: request.name,
            email: request.email,
            password: request.password,
            role: None,
            active: None,
        };

        self.repository
            .users
            .create(&create, password_hash, Role::User, true)
            .await
    }

    /// Get user by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<User> {
        self.repository.users.get_by_id(id).await
    }

    /// Search users
    pub async fn search_users(&self, query: &UserQuery) -> AppResult<(Vec<User>, i64)> {
        self.repository.users.search(query).await
    }

    /// Create a new user (admin)
    pub async fn create_user(&self, user: CreateUser) -> AppResult<User> {
        user.validate()?;

        if self
            .repository
            .users
            .username_exists(&user.username, None)
            .await?
        {
            return Err(AppError::Conflict("Username already exists".to_string()));
        }
        if self.repository.users.email_exists(&user.email, None).await? {
            return Err(AppError::Conflict("Email already exists".to_string()));
        }

        let password_hash = self.hash_password(&user.password)?;
        let role = user.role.unwrap_or(Role::User);
        let active = user.active.unwrap_or(true);

        self.repository
            .users
            .create(&user, password_hash, role, active)
            .await
    }

    /// Update an existing user (admin)
    pub async fn update_user(&self, id: i32, user: UpdateUser) -> AppResult<User> {
        user.validate()?;

        // Check if user exists
        self.repository.users.get_by_id(id).await?;

        if let Some(ref username) = user.username {
            if self.repository.users.username_exists(username, Some(id)).await? {
                return Err(AppError::Conflict("Username already exists".to_string()));
            }
        }
        if let Some(ref email) = user.email {
            if self.repository.users.email_exists(email, Some(id)).await? {
                return Err(AppError::Conflict("Email already exists".to_string()));
            }
        }

        let password_hash = match user.password {
            Some(ref password) => Some(self.hash_password(password)?),
            None => None,
        };

        self.repository.users.update(id, &user, password_hash).await
    }

    /// Activate or deactivate an account (admin)
    pub async fn set_active(&self, id: i32, active: bool) -> AppResult<User> {
        self.repository.users.get_by_id(id).await?;
        self.repository.users.set_active(id, active).await
    }

    /// Delete a user (admin)
    pub async fn delete_user(&self, id: i32) -> AppResult<()> {
        self.repository.users.delete(id).await
    }
}
