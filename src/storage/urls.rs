//! Public URL construction for stored objects

use crate::config::StorageConfig;

/// Builds browser-facing URLs for object keys in the public bucket
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageUrls {
    base_url: String,
    bucket: String,
}

impl StorageUrls {
    pub fn new(base_url: impl Into<String>, bucket: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            bucket: bucket.into().trim_matches('/').to_string(),
        }
    }

    pub fn from_config(config: &StorageConfig) -> Self {
        let base = config
            .public_url
            .clone()
            .unwrap_or_else(|| config.endpoint.clone());
        Self::new(base, config.bucket.clone())
    }

    /// `{base}/{bucket}/{path}` with every path segment percent-encoded.
    ///
    /// Paths that are already absolute URLs are returned unchanged.
    pub fn public_url(&self, path: &str) -> String {
        if is_absolute_url(path) {
            return path.to_string();
        }

        let encoded = path
            .trim_start_matches('/')
            .split('/')
            .map(|segment| urlencoding::encode(segment).into_owned())
            .collect::<Vec<_>>()
            .join("/");

        format!("{}/{}/{}", self.base_url, self.bucket, encoded)
    }
}

/// Whether `value` points somewhere on its own (scheme, protocol-relative or data URI)
pub fn is_absolute_url(value: &str) -> bool {
    let lower = value.trim().to_ascii_lowercase();
    lower.starts_with("http://")
        || lower.starts_with("https://")
        || lower.starts_with("//")
        || lower.starts_with("data:")
}
