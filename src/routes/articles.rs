//! Article API routes
//!
//! Public reads pick a translation through the locale fallback chain and
//! return the rich-text content rendered to HTML.

use axum::{
    extract::{Path, Query},
    http::StatusCode,
    routing::{get, put},
    Extension, Json, Router,
};
use serde::Serialize;

use crate::db::{Article, ArticleInput, ArticleRepository, ArticleTranslation, TranslationInput};
use crate::error::{AppError, Result};
use crate::html::rewrite_image_sources;
use crate::locale::{Locale, ResolveError};
use crate::richtext::{self, Node};
use crate::state::ContentState;

use super::documents::LocaleQuery;

/// Generated excerpts are cut to this many characters
const EXCERPT_CHARS: usize = 200;

/// Listing entry for one article in one locale
#[derive(Debug, Serialize)]
pub struct ArticleSummary {
    pub slug: String,
    pub title: String,
    pub excerpt: String,
    pub locale: Locale,
    #[serde(rename = "isFallback")]
    pub is_fallback: bool,
    pub updated_at: String,
}

/// A published article ready for display
#[derive(Debug, Serialize)]
pub struct LocalizedArticle {
    pub slug: String,
    pub title: String,
    pub excerpt: String,
    pub html: String,
    pub locale: Locale,
    #[serde(rename = "isFallback")]
    pub is_fallback: bool,
    pub updated_at: String,
}

/// Create the articles router
pub fn router<S>(state: ContentState) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new()
        .route("/", get(list_articles).post(create_article))
        .route(
            "/:slug",
            get(get_article).put(update_article).delete(delete_article),
        )
        .route("/:slug/translations", get(list_translations))
        .route("/:slug/translations/:locale", put(upsert_translation))
        .layer(Extension(state))
}

async fn list_articles(
    Extension(state): Extension<ContentState>,
    Query(query): Query<LocaleQuery>,
) -> Result<Json<Vec<ArticleSummary>>> {
    let locale = state.requested_locale(query.locale.as_deref())?;
    let chain = chain_for(&state, locale)?;
    let repo = ArticleRepository::new(&state.pool);

    let mut summaries = Vec::new();
    for article in repo.list(true).await? {
        let translations = repo.translations(&article.id).await?;
        if let Some(translation) = pick_translation(translations, &chain) {
            summaries.push(ArticleSummary {
                excerpt: excerpt_for(&translation),
                is_fallback: translation.locale != locale,
                locale: translation.locale,
                title: translation.title,
                slug: article.slug,
                updated_at: translation.updated_at,
            });
        }
    }

    Ok(Json(summaries))
}

async fn get_article(
    Extension(state): Extension<ContentState>,
    Path(slug): Path<String>,
    Query(query): Query<LocaleQuery>,
) -> Result<Json<LocalizedArticle>> {
    let locale = state.requested_locale(query.locale.as_deref())?;
    let chain = chain_for(&state, locale)?;
    let repo = ArticleRepository::new(&state.pool);

    let article = repo
        .get_by_slug(&slug)
        .await?
        .filter(|a| a.published)
        .ok_or_else(|| AppError::NotFound(format!("Article not found: {}", slug)))?;

    let translation = pick_translation(repo.translations(&article.id).await?, &chain)
        .ok_or_else(|| {
            AppError::NotFound(format!("Article {} is unavailable in locale {}", slug, locale))
        })?;

    let html = render_content(&state, &translation.content);

    Ok(Json(LocalizedArticle {
        excerpt: excerpt_for(&translation),
        is_fallback: translation.locale != locale,
        locale: translation.locale,
        title: translation.title,
        slug: article.slug,
        html,
        updated_at: translation.updated_at,
    }))
}

async fn create_article(
    Extension(state): Extension<ContentState>,
    Json(input): Json<ArticleInput>,
) -> Result<(StatusCode, Json<Article>)> {
    let repo = ArticleRepository::new(&state.pool);
    let article = repo.create(&input).await?;
    tracing::info!("Article {} created", article.slug);
    Ok((StatusCode::CREATED, Json(article)))
}

async fn update_article(
    Extension(state): Extension<ContentState>,
    Path(slug): Path<String>,
    Json(input): Json<ArticleInput>,
) -> Result<Json<Article>> {
    let repo = ArticleRepository::new(&state.pool);
    let article = repo
        .update(&slug, &input)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Article not found: {}", slug)))?;
    Ok(Json(article))
}

async fn delete_article(
    Extension(state): Extension<ContentState>,
    Path(slug): Path<String>,
) -> Result<StatusCode> {
    let repo = ArticleRepository::new(&state.pool);
    if repo.delete(&slug).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("Article not found: {}", slug)))
    }
}

async fn list_translations(
    Extension(state): Extension<ContentState>,
    Path(slug): Path<String>,
) -> Result<Json<Vec<ArticleTranslation>>> {
    let repo = ArticleRepository::new(&state.pool);
    let article = repo
        .get_by_slug(&slug)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Article not found: {}", slug)))?;
    Ok(Json(repo.translations(&article.id).await?))
}

async fn upsert_translation(
    Extension(state): Extension<ContentState>,
    Path((slug, locale)): Path<(String, String)>,
    Json(input): Json<TranslationInput>,
) -> Result<Json<ArticleTranslation>> {
    let locale: Locale = locale
        .parse()
        .map_err(|e: crate::locale::UnknownLocale| AppError::BadRequest(e.to_string()))?;
    let repo = ArticleRepository::new(&state.pool);
    let article = repo
        .get_by_slug(&slug)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Article not found: {}", slug)))?;

    if let Err(e) = Node::from_json(&input.serialized_content()) {
        tracing::warn!("Article {} ({}) saved with unparseable content: {}", slug, locale, e);
    }

    let translation = repo.upsert_translation(&article.id, locale, &input).await?;
    Ok(Json(translation))
}

fn chain_for(state: &ContentState, locale: Locale) -> Result<Vec<Locale>> {
    let chain = state
        .resolver
        .fallbacks()
        .chain(locale)
        .ok_or(ResolveError::MissingChain(locale))?;
    Ok(chain.to_vec())
}

/// First translation in chain order
fn pick_translation(
    mut translations: Vec<ArticleTranslation>,
    chain: &[Locale],
) -> Option<ArticleTranslation> {
    let index = chain
        .iter()
        .find_map(|locale| translations.iter().position(|t| t.locale == *locale))?;
    Some(translations.swap_remove(index))
}

fn render_content(state: &ContentState, content: &str) -> String {
    let html = richtext::render_or_empty(content);
    match rewrite_image_sources(&html, state.resolver.urls()) {
        Ok(rewritten) => rewritten,
        Err(e) => {
            tracing::warn!("Keeping image sources unchanged: {}", e);
            html
        }
    }
}

fn excerpt_for(translation: &ArticleTranslation) -> String {
    if let Some(excerpt) = translation.excerpt.as_deref().map(str::trim) {
        if !excerpt.is_empty() {
            return excerpt.to_string();
        }
    }

    match Node::from_json(&translation.content) {
        Ok(node) => truncate_chars(&richtext::plain_text(&node), EXCERPT_CHARS),
        Err(_) => String::new(),
    }
}

fn truncate_chars(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let cut: String = text.chars().take(max).collect();
    format!("{}…", cut.trim_end())
}
