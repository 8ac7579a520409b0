//! File serving routes
//!
//! Streams stored documents and images straight from S3 storage, for
//! deployments where the bucket is not publicly readable.

use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, StatusCode},
    response::Response,
    routing::get,
    Router,
};
use chrono::{DateTime, Utc};

use crate::error::{AppError, Result};
use crate::state::AppState;

/// Create the files router
pub fn router() -> Router<AppState> {
    Router::new().route("/*path", get(serve_file))
}

async fn serve_file(State(state): State<AppState>, Path(path): Path<String>) -> Result<Response> {
    if path.split('/').any(|segment| segment == "..") {
        return Err(AppError::BadRequest(format!("Invalid path: {}", path)));
    }

    let s3_client = state.s3_client();
    let metadata = s3_client.head_object(&path).await?;
    let stream = s3_client.get_object_stream(&path).await?;

    let content_type = metadata
        .content_type
        .unwrap_or_else(|| guess_content_type(&path).to_string());
    let filename = path.rsplit('/').next().unwrap_or(&path);

    let bytes = stream
        .collect()
        .await
        .map_err(|e| AppError::Internal(format!("Failed to read file stream: {}", e)))?
        .into_bytes();

    let mut builder = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type)
        .header(header::CONTENT_LENGTH, metadata.size)
        .header(
            header::CONTENT_DISPOSITION,
            content_disposition(&path, filename),
        )
        .header(header::CACHE_CONTROL, "public, max-age=86400");

    if let Some(etag) = metadata.etag.as_deref() {
        builder = builder.header(header::ETAG, etag);
    }
    if let Some(modified) = metadata.last_modified {
        builder = builder.header(header::LAST_MODIFIED, http_date(&modified));
    }

    builder
        .body(Body::from(bytes))
        .map_err(|e| AppError::Internal(e.to_string()))
}

/// IMF-fixdate, as used by `Last-Modified`
fn http_date(time: &DateTime<Utc>) -> String {
    time.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

/// Downloads are attachments; images display inline
fn content_disposition(path: &str, filename: &str) -> String {
    let disposition = if guess_content_type(path).starts_with("image/") {
        "inline"
    } else {
        "attachment"
    };
    format!(
        "{}; filename*=UTF-8''{}",
        disposition,
        urlencoding::encode(filename)
    )
}

/// Guess content type from file extension
fn guess_content_type(path: &str) -> &'static str {
    let ext = path.rsplit('.').next().unwrap_or("");
    match ext.to_lowercase().as_str() {
        "pdf" => "application/pdf",
        "zip" => "application/zip",
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "txt" => "text/plain; charset=utf-8",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guess_content_type() {
        assert_eq!(guess_content_type("documents/manual.PDF"), "application/pdf");
        assert_eq!(guess_content_type("firmware/v2.zip"), "application/zip");
        assert_eq!(guess_content_type("articles/hub.webp"), "image/webp");
        assert_eq!(guess_content_type("noext"), "application/octet-stream");
    }

    #[test]
    fn test_http_date() {
        let time = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        assert_eq!(http_date(&time), "Tue, 14 Nov 2023 22:13:20 GMT");
    }

    #[test]
    fn test_content_disposition() {
        assert_eq!(
            content_disposition("documents/návod.pdf", "návod.pdf"),
            "attachment; filename*=UTF-8''n%C3%A1vod.pdf"
        );
        assert_eq!(
            content_disposition("articles/a.png", "a.png"),
            "inline; filename*=UTF-8''a.png"
        );
    }
}
