//! Article Service
//!
//! CRUD over articles with cursor pagination. Single-article reads go through
//! the `article-by-slug` read-through cache; writes do not invalidate it.

use std::sync::Arc;

use tracing::info;

use crate::cache::ReadThroughCache;
use crate::clock::SharedClock;
use crate::error::Result;
use crate::models::{slugify, Article, ArticleRequest, NewArticle, Pagination};
use crate::repositories::{ArticleRepository, UserRepository};

/// Name of the article cache in stats and metrics.
pub const ARTICLE_CACHE_NAME: &str = "article-by-slug";

/// One page of articles and the cursor of the next page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticlePage {
    pub articles: Vec<Article>,
    pub next_cursor: Option<i64>,
}

pub struct ArticleService {
    repo: Arc<dyn ArticleRepository>,
    users: Arc<dyn UserRepository>,
    cache: ReadThroughCache<String, Article>,
    clock: SharedClock,
}

impl ArticleService {
    pub fn new(
        repo: Arc<dyn ArticleRepository>,
        users: Arc<dyn UserRepository>,
        cache: ReadThroughCache<String, Article>,
        clock: SharedClock,
    ) -> Self {
        Self {
            repo,
            users,
            cache,
            clock,
        }
    }

    /// Returns the page starting at `pagination.cursor`.
    pub async fn list(&self, pagination: Pagination) -> Result<ArticlePage> {
        let page_size = usize::try_from(pagination.page_size).unwrap_or(0);
        // One extra row tells whether another page follows
        let mut articles = self.repo.list(pagination.cursor, page_size + 1).await?;

        let next_cursor = if articles.len() > page_size {
            articles.pop().map(|article| article.id)
        } else {
            None
        };

        Ok(ArticlePage {
            articles,
            next_cursor,
        })
    }

    pub async fn get_by_slug(&self, slug: &str) -> Result<Article> {
        let repo = &self.repo;
        let article = self
            .cache
            .get_or_load(&slug.to_string(), || repo.get_by_slug(slug))
            .await?;
        Ok(article)
    }

    pub async fn create(&self, author_id: i64, request: ArticleRequest) -> Result<Article> {
        let author = self.users.get_by_id(author_id).await?;
        let slug = slugify(&request.title, self.clock.now());

        let article = self
            .repo
            .create(NewArticle {
                title: request.title,
                body: request.body,
                slug,
                author_id,
                author_email: author.email,
            })
            .await?;

        info!(article_id = article.id, slug = %article.slug, "Article created");
        Ok(article)
    }

    /// Replaces title and body. Only the author may do this.
    pub async fn update(&self, slug: &str, author_id: i64, request: ArticleRequest) -> Result<Article> {
        let article = self
            .repo
            .update(slug, author_id, request.title, request.body)
            .await?;
        info!(article_id = article.id, "Article updated");
        Ok(article)
    }

    /// Deletes the article. Only the author may do this.
    pub async fn delete(&self, slug: &str, author_id: i64) -> Result<()> {
        self.repo.delete_by_slug_and_author(slug, author_id).await?;
        info!(slug = %slug, "Article deleted");
        Ok(())
    }

    pub fn cache(&self) -> &ReadThroughCache<String, Article> {
        &self.cache
    }
}

impl std::fmt::Debug for ArticleService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArticleService")
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}
