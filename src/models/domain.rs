//! Domain entities stored by the repositories.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// A registered account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    /// Argon2 PHC string
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields needed to create a [`User`]; the repository assigns id and timestamps.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password_hash: String,
}

/// A published article.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Article {
    pub id: i64,
    pub title: String,
    pub body: String,
    pub slug: String,
    #[serde(skip)]
    pub author_id: i64,
    pub author_email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewArticle {
    pub title: String,
    pub body: String,
    pub slug: String,
    pub author_id: i64,
    pub author_email: String,
}

/// Builds the public slug of an article: lowercased title with spaces
/// replaced by dashes, suffixed with the creation time in unix seconds.
pub fn slugify(title: &str, now: DateTime<Utc>) -> String {
    let base = title.trim().to_lowercase().replace(' ', "-");
    format!("{}-{}", base, now.timestamp())
}
