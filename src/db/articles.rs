//! Articles and their per-locale translations

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::SqlitePool;
use uuid::Uuid;

use super::conflict_on_unique;
use crate::error::{AppError, Result};
use crate::locale::Locale;

/// Article record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Article {
    pub id: String,
    pub slug: String,
    pub published: bool,
    pub created_at: String,
    pub updated_at: String,
}

/// Localized article content
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArticleTranslation {
    pub id: String,
    pub article_id: String,
    pub locale: Locale,
    pub title: String,
    pub excerpt: Option<String>,
    /// Serialized rich-text document
    pub content: String,
    pub updated_at: String,
}

/// Create/update payload for the article itself
#[derive(Debug, Clone, Deserialize)]
pub struct ArticleInput {
    pub slug: String,
    #[serde(default)]
    pub published: bool,
}

/// Upsert payload for one translation
#[derive(Debug, Clone, Deserialize)]
pub struct TranslationInput {
    pub title: String,
    #[serde(default)]
    pub excerpt: Option<String>,
    /// The rich-text document, either as JSON or already serialized
    #[serde(default)]
    pub content: Value,
}

impl TranslationInput {
    /// The content as it is stored
    pub fn serialized_content(&self) -> String {
        match &self.content {
            Value::Null => String::new(),
            Value::String(raw) => raw.clone(),
            other => other.to_string(),
        }
    }
}

#[derive(sqlx::FromRow)]
struct TranslationRow {
    id: String,
    article_id: String,
    locale: String,
    title: String,
    excerpt: Option<String>,
    content: String,
    updated_at: String,
}

impl TranslationRow {
    fn into_translation(self) -> Option<ArticleTranslation> {
        let locale = match self.locale.parse::<Locale>() {
            Ok(locale) => locale,
            Err(e) => {
                tracing::warn!(
                    "Skipping translation {} of article {}: {}",
                    self.id,
                    self.article_id,
                    e
                );
                return None;
            }
        };

        Some(ArticleTranslation {
            id: self.id,
            article_id: self.article_id,
            locale,
            title: self.title,
            excerpt: self.excerpt,
            content: self.content,
            updated_at: self.updated_at,
        })
    }
}

fn slug_taken(slug: &str) -> String {
    format!("Article slug already exists: {}", slug)
}

/// Article repository
pub struct ArticleRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> ArticleRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Articles newest first
    pub async fn list(&self, published_only: bool) -> Result<Vec<Article>> {
        let articles = sqlx::query_as::<_, Article>(
            r#"
            SELECT id, slug, published, created_at, updated_at
            FROM articles
            WHERE published = 1 OR ? = 0
            ORDER BY created_at DESC, slug
            "#,
        )
        .bind(published_only)
        .fetch_all(self.pool)
        .await?;

        Ok(articles)
    }

    pub async fn get_by_slug(&self, slug: &str) -> Result<Option<Article>> {
        let article = sqlx::query_as::<_, Article>(
            "SELECT id, slug, published, created_at, updated_at FROM articles WHERE slug = ?",
        )
        .bind(slug)
        .fetch_optional(self.pool)
        .await?;

        Ok(article)
    }

    pub async fn create(&self, input: &ArticleInput) -> Result<Article> {
        if input.slug.trim().is_empty() {
            return Err(AppError::BadRequest("slug must not be empty".to_string()));
        }

        let now = Utc::now().to_rfc3339();
        let id = Uuid::new_v4().to_string();

        sqlx::query(
            r#"
            INSERT INTO articles (id, slug, published, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(&input.slug)
        .bind(input.published)
        .bind(&now)
        .bind(&now)
        .execute(self.pool)
        .await
        .map_err(|e| conflict_on_unique(e, || slug_taken(&input.slug)))?;

        tracing::debug!("Created article {} ({})", input.slug, id);

        self.get_by_slug(&input.slug)
            .await?
            .ok_or_else(|| AppError::Internal("Failed to fetch created article".to_string()))
    }

    /// Rename or (un)publish the article at `slug`
    pub async fn update(&self, slug: &str, input: &ArticleInput) -> Result<Option<Article>> {
        if input.slug.trim().is_empty() {
            return Err(AppError::BadRequest("slug must not be empty".to_string()));
        }

        let result = sqlx::query(
            "UPDATE articles SET slug = ?, published = ?, updated_at = ? WHERE slug = ?",
        )
        .bind(&input.slug)
        .bind(input.published)
        .bind(Utc::now().to_rfc3339())
        .bind(slug)
        .execute(self.pool)
        .await
        .map_err(|e| conflict_on_unique(e, || slug_taken(&input.slug)))?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        self.get_by_slug(&input.slug).await
    }

    /// Delete an article; translations go with it
    pub async fn delete(&self, slug: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM articles WHERE slug = ?")
            .bind(slug)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Insert or replace the translation of `article_id` for `locale`
    pub async fn upsert_translation(
        &self,
        article_id: &str,
        locale: Locale,
        input: &TranslationInput,
    ) -> Result<ArticleTranslation> {
        if input.title.trim().is_empty() {
            return Err(AppError::BadRequest("title must not be empty".to_string()));
        }

        let now = Utc::now().to_rfc3339();
        let id = Uuid::new_v4().to_string();

        sqlx::query(
            r#"
            INSERT INTO article_translations
                (id, article_id, locale, title, excerpt, content, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(article_id, locale) DO UPDATE SET
                title = excluded.title,
                excerpt = excluded.excerpt,
                content = excluded.content,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(&id)
        .bind(article_id)
        .bind(locale.as_str())
        .bind(&input.title)
        .bind(&input.excerpt)
        .bind(input.serialized_content())
        .bind(&now)
        .execute(self.pool)
        .await?;

        sqlx::query("UPDATE articles SET updated_at = ? WHERE id = ?")
            .bind(&now)
            .bind(article_id)
            .execute(self.pool)
            .await?;

        self.translations(article_id)
            .await?
            .into_iter()
            .find(|t| t.locale == locale)
            .ok_or_else(|| AppError::Internal("Failed to fetch upserted translation".to_string()))
    }

    /// All translations of one article
    pub async fn translations(&self, article_id: &str) -> Result<Vec<ArticleTranslation>> {
        let rows = sqlx::query_as::<_, TranslationRow>(
            r#"
            SELECT id, article_id, locale, title, excerpt, content, updated_at
            FROM article_translations
            WHERE article_id = ?
            ORDER BY locale
            "#,
        )
        .bind(article_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .filter_map(TranslationRow::into_translation)
            .collect())
    }
}
