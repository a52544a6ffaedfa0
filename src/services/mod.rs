//! Services Module
//!
//! Domain logic between the HTTP handlers and the repositories.

mod article_service;
mod user_service;

pub use article_service::{ArticlePage, ArticleService, ARTICLE_CACHE_NAME};
pub use user_service::{UserService, USER_CACHE_NAME};
