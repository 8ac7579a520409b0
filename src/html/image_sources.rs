//! Point relative image sources in rendered content at public storage
//!
//! Editors store images as bucket keys (`articles/2024/charger.jpg`);
//! browsers need the public URL.

use lol_html::{element, rewrite_str, RewriteStrSettings};

use crate::storage::{is_absolute_url, StorageUrls};

/// Errors during HTML rewriting
#[derive(Debug, thiserror::Error)]
pub enum RewriteError {
    #[error("HTML rewrite failed: {0}")]
    RewriteFailed(String),
}

/// Rewrite every relative `img[src]` through [`StorageUrls::public_url`]
pub fn rewrite_image_sources(html: &str, urls: &StorageUrls) -> Result<String, RewriteError> {
    rewrite_str(
        html,
        RewriteStrSettings {
            element_content_handlers: vec![element!("img[src]", |el| {
                if let Some(raw) = el.get_attribute("src") {
                    // attribute text is still entity-encoded
                    let src = html_escape::decode_html_entities(&raw);
                    if !src.is_empty() && !is_absolute_url(&src) {
                        el.set_attribute("src", &urls.public_url(&src))?;
                    }
                }
                Ok(())
            })],
            ..RewriteStrSettings::default()
        },
    )
    .map_err(|e| RewriteError::RewriteFailed(e.to_string()))
}
