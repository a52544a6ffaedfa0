//! Request DTOs for the blog API
//!
//! Defines the structure of incoming HTTP request bodies and query strings.

use serde::Deserialize;

/// Smallest and largest accepted `pageSize`.
pub const MIN_PAGE_SIZE: i64 = 5;
pub const MAX_PAGE_SIZE: i64 = 100;

fn check_required(errors: &mut Vec<String>, field: &str, value: &str) {
    if value.trim().is_empty() {
        errors.push(format!("{} is required", field));
    }
}

fn check_max_len(errors: &mut Vec<String>, field: &str, value: &str, max: usize) {
    if value.chars().count() > max {
        errors.push(format!("{} must be at most {} characters", field, max));
    }
}

fn looks_like_email(value: &str) -> bool {
    match value.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        None => false,
    }
}

fn into_option(errors: Vec<String>) -> Option<Vec<String>> {
    if errors.is_empty() {
        None
    } else {
        Some(errors)
    }
}

/// Request body for `POST /auth/register`
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
}

impl RegisterRequest {
    /// Validates the request data
    ///
    /// Returns every failed rule, None if valid.
    pub fn validate(&self) -> Option<Vec<String>> {
        let mut errors = Vec::new();

        check_required(&mut errors, "first_name", &self.first_name);
        check_max_len(&mut errors, "first_name", &self.first_name, 50);
        check_required(&mut errors, "last_name", &self.last_name);
        check_max_len(&mut errors, "last_name", &self.last_name, 50);

        check_required(&mut errors, "email", &self.email);
        check_max_len(&mut errors, "email", &self.email, 255);
        if !self.email.is_empty() && !looks_like_email(&self.email) {
            errors.push("email must be a valid email address".to_string());
        }

        let password_len = self.password.chars().count();
        if !(3..=100).contains(&password_len) {
            errors.push("password must be between 3 and 100 characters".to_string());
        }

        into_option(errors)
    }
}

/// Request body for `POST /auth/login`
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl LoginRequest {
    pub fn validate(&self) -> Option<Vec<String>> {
        let mut errors = Vec::new();
        check_required(&mut errors, "email", &self.email);
        if !self.email.is_empty() && !looks_like_email(&self.email) {
            errors.push("email must be a valid email address".to_string());
        }
        check_required(&mut errors, "password", &self.password);
        into_option(errors)
    }
}

/// Request body for creating or updating an article
#[derive(Debug, Clone, Deserialize)]
pub struct ArticleRequest {
    pub title: String,
    pub body: String,
}

impl ArticleRequest {
    pub fn validate(&self) -> Option<Vec<String>> {
        let mut errors = Vec::new();
        check_required(&mut errors, "title", &self.title);
        check_max_len(&mut errors, "title", &self.title, 128);
        check_required(&mut errors, "body", &self.body);
        into_option(errors)
    }
}

/// Query string of `GET /articles`
///
/// Values that fail to parse fall back to the defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PaginationQuery {
    pub cursor: Option<String>,
    #[serde(rename = "pageSize")]
    pub page_size: Option<String>,
}

/// Validated pagination options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    /// Smallest article id included in the page
    pub cursor: i64,
    pub page_size: i64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            cursor: 0,
            page_size: MIN_PAGE_SIZE,
        }
    }
}

impl PaginationQuery {
    /// Resolves the query into pagination options, or the failed rules.
    pub fn resolve(&self) -> Result<Pagination, Vec<String>> {
        let mut pagination = Pagination::default();

        if let Some(cursor) = self.cursor.as_deref().and_then(|raw| raw.parse().ok()) {
            pagination.cursor = cursor;
        }
        if let Some(size) = self.page_size.as_deref().and_then(|raw| raw.parse().ok()) {
            pagination.page_size = size;
        }

        let mut errors = Vec::new();
        if pagination.cursor < 0 {
            errors.push("cursor must be at least 0".to_string());
        }
        if !(MIN_PAGE_SIZE..=MAX_PAGE_SIZE).contains(&pagination.page_size) {
            errors.push(format!(
                "pageSize must be between {} and {}",
                MIN_PAGE_SIZE, MAX_PAGE_SIZE
            ));
        }

        if errors.is_empty() {
            Ok(pagination)
        } else {
            Err(errors)
        }
    }
}
