//! In-memory repositories backed by `tokio::sync::RwLock`.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::clock::SharedClock;
use crate::models::{Article, NewArticle, NewUser, User};
use crate::repositories::{ArticleRepository, RepositoryError, UserRepository};

// == Users ==
#[derive(Debug, Default)]
struct UserTable {
    by_id: BTreeMap<i64, User>,
    id_by_email: HashMap<String, i64>,
    next_id: i64,
}

#[derive(Debug)]
pub struct InMemoryUserRepository {
    table: RwLock<UserTable>,
    clock: SharedClock,
}

impl InMemoryUserRepository {
    pub fn new(clock: SharedClock) -> Self {
        Self {
            table: RwLock::new(UserTable::default()),
            clock,
        }
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn get_by_email(&self, email: &str) -> Result<User, RepositoryError> {
        let table = self.table.read().await;
        table
            .id_by_email
            .get(email)
            .and_then(|id| table.by_id.get(id))
            .cloned()
            .ok_or_else(|| RepositoryError::NotFound("user".to_string()))
    }

    async fn get_by_id(&self, id: i64) -> Result<User, RepositoryError> {
        let table = self.table.read().await;
        table
            .by_id
            .get(&id)
            .cloned()
            .ok_or_else(|| RepositoryError::NotFound("user".to_string()))
    }

    async fn create(&self, user: NewUser) -> Result<User, RepositoryError> {
        let mut table = self.table.write().await;
        if table.id_by_email.contains_key(&user.email) {
            return Err(RepositoryError::Conflict(format!(
                "user with {} email already exists",
                user.email
            )));
        }

        table.next_id += 1;
        let now = self.clock.now();
        let stored = User {
            id: table.next_id,
            first_name: user.first_name,
            last_name: user.last_name,
            email: user.email,
            password_hash: user.password_hash,
            created_at: now,
            updated_at: now,
        };

        table.id_by_email.insert(stored.email.clone(), stored.id);
        table.by_id.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn exists_by_email(&self, email: &str) -> Result<bool, RepositoryError> {
        Ok(self.table.read().await.id_by_email.contains_key(email))
    }
}

// == Articles ==
#[derive(Debug, Default)]
struct ArticleTable {
    by_id: BTreeMap<i64, Article>,
    id_by_slug: HashMap<String, i64>,
    next_id: i64,
}

impl ArticleTable {
    fn find_mut(&mut self, slug: &str) -> Result<&mut Article, RepositoryError> {
        let id = *self
            .id_by_slug
            .get(slug)
            .ok_or_else(|| RepositoryError::NotFound("article".to_string()))?;
        self.by_id
            .get_mut(&id)
            .ok_or_else(|| RepositoryError::NotFound("article".to_string()))
    }
}

#[derive(Debug)]
pub struct InMemoryArticleRepository {
    table: RwLock<ArticleTable>,
    clock: SharedClock,
}

impl InMemoryArticleRepository {
    pub fn new(clock: SharedClock) -> Self {
        Self {
            table: RwLock::new(ArticleTable::default()),
            clock,
        }
    }
}

#[async_trait]
impl ArticleRepository for InMemoryArticleRepository {
    async fn list(&self, cursor: i64, limit: usize) -> Result<Vec<Article>, RepositoryError> {
        let table = self.table.read().await;
        Ok(table
            .by_id
            .range(cursor..)
            .take(limit)
            .map(|(_, article)| article.clone())
            .collect())
    }

    async fn get_by_slug(&self, slug: &str) -> Result<Article, RepositoryError> {
        let table = self.table.read().await;
        table
            .id_by_slug
            .get(slug)
            .and_then(|id| table.by_id.get(id))
            .cloned()
            .ok_or_else(|| RepositoryError::NotFound("article".to_string()))
    }

    async fn create(&self, article: NewArticle) -> Result<Article, RepositoryError> {
        let mut table = self.table.write().await;
        if table.id_by_slug.contains_key(&article.slug) {
            return Err(RepositoryError::Conflict(format!(
                "article with slug {} already exists",
                article.slug
            )));
        }

        table.next_id += 1;
        let now = self.clock.now();
        let stored = Article {
            id: table.next_id,
            title: article.title,
            body: article.body,
            slug: article.slug,
            author_id: article.author_id,
            author_email: article.author_email,
            created_at: now,
            updated_at: now,
        };

        table.id_by_slug.insert(stored.slug.clone(), stored.id);
        table.by_id.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn update(
        &self,
        slug: &str,
        author_id: i64,
        title: String,
        body: String,
    ) -> Result<Article, RepositoryError> {
        let now = self.clock.now();
        let mut table = self.table.write().await;
        let article = table.find_mut(slug)?;
        if article.author_id != author_id {
            return Err(RepositoryError::NotOwner);
        }

        article.title = title;
        article.body = body;
        article.updated_at = now;
        Ok(article.clone())
    }

    async fn delete_by_slug_and_author(
        &self,
        slug: &str,
        author_id: i64,
    ) -> Result<(), RepositoryError> {
        let mut table = self.table.write().await;
        let article = table.find_mut(slug)?;
        if article.author_id != author_id {
            return Err(RepositoryError::NotOwner);
        }

        let id = article.id;
        table.by_id.remove(&id);
        table.id_by_slug.remove(slug);
        Ok(())
    }
}
