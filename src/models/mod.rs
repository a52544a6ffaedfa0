//! Domain entities plus the request and response DTOs of the blog API.

pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{slugify, Article, NewArticle, NewUser, User};
pub use requests::{ArticleRequest, LoginRequest, Pagination, PaginationQuery, RegisterRequest};
pub use responses::{
    ArticlesResponse, CacheStatsView, CreateArticleResponse, Envelope, HealthResponse,
    LoginResponse, RefreshResponse, RegisterResponse, StatsResponse,
};
