//! Application state management

use std::sync::Arc;

use sqlx::SqlitePool;

use crate::config::Config;
use crate::error::{AppError, Result};
use crate::locale::{DocumentResolver, Locale};
use crate::storage::{S3Client, StorageUrls};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    s3_client: S3Client,
    content: ContentState,
}

impl AppState {
    pub fn new(s3_client: S3Client, content: ContentState) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                s3_client,
                content,
            }),
        }
    }

    /// Get the S3 client
    pub fn s3_client(&self) -> &S3Client {
        &self.inner.s3_client
    }

    /// Get the document/article state
    pub fn content(&self) -> &ContentState {
        &self.inner.content
    }
}

/// What the document and article routes need: no storage connection
#[derive(Clone)]
pub struct ContentState {
    pub pool: SqlitePool,
    pub resolver: Arc<DocumentResolver>,
    pub default_locale: Locale,
}

impl ContentState {
    pub fn new(pool: SqlitePool, resolver: DocumentResolver, default_locale: Locale) -> Self {
        Self {
            pool,
            resolver: Arc::new(resolver),
            default_locale,
        }
    }

    pub fn from_config(pool: SqlitePool, config: &Config) -> Self {
        let resolver = DocumentResolver::new(
            config.locales.fallbacks.clone(),
            StorageUrls::from_config(&config.storage),
        );
        Self::new(pool, resolver, config.locales.default_locale)
    }

    /// The locale named by a `?locale=` query, or the site default
    pub fn requested_locale(&self, raw: Option<&str>) -> Result<Locale> {
        match raw {
            None | Some("") => Ok(self.default_locale),
            Some(raw) => raw
                .parse()
                .map_err(|e: crate::locale::UnknownLocale| AppError::BadRequest(e.to_string())),
        }
    }
}
