//! User Service
//!
//! Registration and credential checks, with user-by-email lookups served
//! through a read-through cache.

use std::sync::Arc;

use tracing::info;

use crate::auth::{hash_password_blocking, verify_password_blocking};
use crate::cache::ReadThroughCache;
use crate::error::{AppError, Result};
use crate::models::{NewUser, RegisterRequest, User};
use crate::repositories::UserRepository;

/// Name of the user cache in stats and metrics.
pub const USER_CACHE_NAME: &str = "user-by-email";

pub struct UserService {
    repo: Arc<dyn UserRepository>,
    cache: ReadThroughCache<String, User>,
}

impl UserService {
    pub fn new(repo: Arc<dyn UserRepository>, cache: ReadThroughCache<String, User>) -> Self {
        Self { repo, cache }
    }

    /// Looks a user up by email, consulting the cache first.
    pub async fn get_by_email(&self, email: &str) -> Result<User> {
        let repo = &self.repo;
        let user = self
            .cache
            .get_or_load(&email.to_string(), || repo.get_by_email(email))
            .await?;
        Ok(user)
    }

    /// Creates an account. Fails with `Conflict` if the email is taken.
    pub async fn register(&self, request: RegisterRequest) -> Result<User> {
        if self.repo.exists_by_email(&request.email).await? {
            return Err(AppError::Conflict(format!(
                "user with {} email already exists",
                request.email
            )));
        }

        let password_hash = hash_password_blocking(request.password).await?;
        let user = self
            .repo
            .create(NewUser {
                first_name: request.first_name,
                last_name: request.last_name,
                email: request.email,
                password_hash,
            })
            .await?;

        info!(user_id = user.id, "User registered");
        Ok(user)
    }

    /// Returns the user owning `email` if `password` matches.
    ///
    /// Unknown emails and wrong passwords are indistinguishable to the caller.
    pub async fn verify_credentials(&self, email: &str, password: &str) -> Result<User> {
        let user = match self.get_by_email(email).await {
            Ok(user) => user,
            Err(AppError::NotFound(_)) => return Err(AppError::InvalidCredentials),
            Err(err) => return Err(err),
        };

        if !verify_password_blocking(password.to_string(), user.password_hash.clone()).await? {
            return Err(AppError::InvalidCredentials);
        }
        Ok(user)
    }

    pub fn cache(&self) -> &ReadThroughCache<String, User> {
        &self.cache
    }
}

impl std::fmt::Debug for UserService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserService")
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}
