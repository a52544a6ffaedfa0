//! Repositories Module
//!
//! Sources of truth for users and articles. The caches sit in front of these
//! and fall back to them on a miss.

mod memory;

use async_trait::async_trait;
use thiserror::Error;

use crate::error::AppError;
use crate::models::{Article, NewArticle, NewUser, User};

pub use memory::{InMemoryArticleRepository, InMemoryUserRepository};

/// Failures reported by a repository.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("{0} not found")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    /// The caller does not own the record it tried to change
    #[error("only the author can modify this article")]
    NotOwner,

    #[error("storage failure: {0}")]
    Storage(String),
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound(_) => AppError::NotFound(err.to_string()),
            RepositoryError::Conflict(message) => AppError::Conflict(message),
            RepositoryError::NotOwner => AppError::Forbidden(err.to_string()),
            RepositoryError::Storage(message) => AppError::Internal(message),
        }
    }
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn get_by_email(&self, email: &str) -> Result<User, RepositoryError>;

    async fn get_by_id(&self, id: i64) -> Result<User, RepositoryError>;

    /// Stores a new user. Fails with `Conflict` if the email is taken.
    async fn create(&self, user: NewUser) -> Result<User, RepositoryError>;

    async fn exists_by_email(&self, email: &str) -> Result<bool, RepositoryError>;
}

#[async_trait]
pub trait ArticleRepository: Send + Sync {
    /// Articles with `id >= cursor` in id order, at most `limit` of them.
    async fn list(&self, cursor: i64, limit: usize) -> Result<Vec<Article>, RepositoryError>;

    async fn get_by_slug(&self, slug: &str) -> Result<Article, RepositoryError>;

    async fn create(&self, article: NewArticle) -> Result<Article, RepositoryError>;

    /// Replaces title and body of the article at `slug` owned by `author_id`.
    async fn update(
        &self,
        slug: &str,
        author_id: i64,
        title: String,
        body: String,
    ) -> Result<Article, RepositoryError>;

    async fn delete_by_slug_and_author(
        &self,
        slug: &str,
        author_id: i64,
    ) -> Result<(), RepositoryError>;
}
