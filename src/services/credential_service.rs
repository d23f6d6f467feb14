use std::sync::Arc;

use crate::api::request::{LoginRequest, RegisterRequest};
use crate::auth::password::{hash_password, verify_password};
use crate::database::models::{NewUser, User};
use crate::database::repository::{UserRepository, EMAIL_TAKEN};
use crate::error::ApiError;

/// Same message for unknown email and wrong password.
pub const INVALID_CREDENTIALS: &str = "Invalid email or password";

/// Registration and credential checks over the user table
#[derive(Clone)]
pub struct CredentialService {
    users: Arc<dyn UserRepository>,
    hash_cost: u32,
}

impl CredentialService {
    pub fn new(users: Arc<dyn UserRepository>, hash_cost: u32) -> Self {
        Self { users, hash_cost }
    }

    pub async fn register(&self, request: RegisterRequest) -> Result<User, ApiError> {
        let credentials = request.validate()?;

        if self.users.find_by_email(&credentials.email).await?.is_some() {
            return Err(ApiError::conflict(EMAIL_TAKEN));
        }

        let password_hash = hash_password(credentials.password, self.hash_cost).await?;

        // The unique index still decides if two registrations race past the check above
        let user = self
            .users
            .insert(NewUser {
                email: credentials.email,
                password_hash,
            })
            .await?;

        tracing::info!("Registered user {}", user.id);
        Ok(user)
    }

    pub async fn authenticate(&self, request: LoginRequest) -> Result<User, ApiError> {
        let credentials = request.validate()?;

        let Some(user) = self.users.find_by_email(&credentials.email).await? else {
            tracing::warn!("Login failed: unknown email");
            return Err(ApiError::unauthorized(INVALID_CREDENTIALS));
        };

        if !verify_password(credentials.password, user.password_hash.clone()).await? {
            tracing::warn!("Login failed: wrong password for user {}", user.id);
            return Err(ApiError::unauthorized(INVALID_CREDENTIALS));
        }

        tracing::info!("User {} logged in", user.id);
        Ok(user)
    }
}
