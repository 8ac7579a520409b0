//! Downloadable document API routes

use axum::{
    extract::{Path, Query},
    http::StatusCode,
    response::Redirect,
    routing::get,
    Extension, Json, Router,
};
use serde::Deserialize;

use crate::db::{Document, DocumentInput, DocumentRepository};
use crate::error::{AppError, Result};
use crate::locale::ResolvedFile;
use crate::state::ContentState;

#[derive(Debug, Deserialize)]
pub struct LocaleQuery {
    pub locale: Option<String>,
}

/// Create the documents router
pub fn router<S>(state: ContentState) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new()
        .route("/", get(list_documents).post(create_document))
        .route(
            "/:slug",
            get(get_document).put(update_document).delete(delete_document),
        )
        .route("/:slug/file", get(resolve_file))
        .route("/:slug/download", get(download_file))
        .layer(Extension(state))
}

async fn list_documents(Extension(state): Extension<ContentState>) -> Result<Json<Vec<Document>>> {
    let repo = DocumentRepository::new(&state.pool);
    Ok(Json(repo.list().await?))
}

async fn create_document(
    Extension(state): Extension<ContentState>,
    Json(input): Json<DocumentInput>,
) -> Result<(StatusCode, Json<Document>)> {
    let repo = DocumentRepository::new(&state.pool);
    let document = repo.create(&input).await?;
    tracing::info!("Document {} created", document.slug);
    Ok((StatusCode::CREATED, Json(document)))
}

async fn get_document(
    Extension(state): Extension<ContentState>,
    Path(slug): Path<String>,
) -> Result<Json<Document>> {
    Ok(Json(find_document(&state, &slug).await?))
}

async fn update_document(
    Extension(state): Extension<ContentState>,
    Path(slug): Path<String>,
    Json(input): Json<DocumentInput>,
) -> Result<Json<Document>> {
    let repo = DocumentRepository::new(&state.pool);
    let document = repo
        .update(&slug, &input)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Document not found: {}", slug)))?;
    Ok(Json(document))
}

async fn delete_document(
    Extension(state): Extension<ContentState>,
    Path(slug): Path<String>,
) -> Result<StatusCode> {
    let repo = DocumentRepository::new(&state.pool);
    if repo.delete(&slug).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("Document not found: {}", slug)))
    }
}

/// Which file would be served for the requested locale
async fn resolve_file(
    Extension(state): Extension<ContentState>,
    Path(slug): Path<String>,
    Query(query): Query<LocaleQuery>,
) -> Result<Json<ResolvedFile>> {
    Ok(Json(resolve(&state, &slug, query.locale.as_deref()).await?))
}

/// Redirect to the resolved file in public storage
async fn download_file(
    Extension(state): Extension<ContentState>,
    Path(slug): Path<String>,
    Query(query): Query<LocaleQuery>,
) -> Result<Redirect> {
    let file = resolve(&state, &slug, query.locale.as_deref()).await?;
    Ok(Redirect::temporary(&file.url))
}

async fn find_document(state: &ContentState, slug: &str) -> Result<Document> {
    DocumentRepository::new(&state.pool)
        .get_by_slug(slug)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Document not found: {}", slug)))
}

async fn resolve(state: &ContentState, slug: &str, locale: Option<&str>) -> Result<ResolvedFile> {
    let locale = state.requested_locale(locale)?;
    let document = find_document(state, slug).await?;

    let file = state.resolver.resolve(&document, locale)?.ok_or_else(|| {
        AppError::NotFound(format!(
            "Document {} is unavailable in locale {}",
            slug, locale
        ))
    })?;

    if file.is_fallback {
        tracing::debug!(
            "Serving {} variant of {} for locale {}",
            file.locale,
            slug,
            locale
        );
    }

    Ok(file)
}
