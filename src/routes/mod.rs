//! HTTP route handlers

pub mod articles;
pub mod documents;
pub mod files;
pub mod health;

use axum::Router;

use crate::state::ContentState;

/// Document and article APIs under `/api/v1`
pub fn content_router<S>(state: ContentState) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new()
        .nest("/api/v1/documents", documents::router(state.clone()))
        .nest("/api/v1/articles", articles::router(state))
}

#[cfg(test)]
pub(crate) mod test_support {
    use axum_test::TestServer;

    use super::content_router;
    use crate::db::test_pool;
    use crate::locale::{DocumentResolver, Locale, LocaleFallbacks};
    use crate::state::ContentState;
    use crate::storage::StorageUrls;

    pub async fn content_state() -> ContentState {
        let resolver = DocumentResolver::new(
            LocaleFallbacks::default(),
            StorageUrls::new("https://cdn.example.com", "public"),
        );
        ContentState::new(test_pool().await, resolver, Locale::Cs)
    }

    pub fn server(state: ContentState) -> TestServer {
        TestServer::new(content_router::<()>(state)).unwrap()
    }
}
