//! Per-locale file selection for downloadable documents

use serde::Serialize;

use crate::db::Document;
use crate::storage::StorageUrls;

use super::types::{Locale, LocaleFallbacks};

/// The concrete file chosen for a request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedFile {
    pub url: String,
    pub path: String,
    pub size: i64,
    /// Locale of the variant actually served
    pub locale: Locale,
    #[serde(rename = "isFallback")]
    pub is_fallback: bool,
}

/// Deployment problems surfaced by resolution
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    #[error("No fallback chain configured for locale {0}")]
    MissingChain(Locale),
}

/// Picks the best file variant of a document for a requested locale
#[derive(Debug, Clone)]
pub struct DocumentResolver {
    fallbacks: LocaleFallbacks,
    urls: StorageUrls,
}

impl DocumentResolver {
    pub fn new(fallbacks: LocaleFallbacks, urls: StorageUrls) -> Self {
        Self { fallbacks, urls }
    }

    pub fn fallbacks(&self) -> &LocaleFallbacks {
        &self.fallbacks
    }

    pub fn urls(&self) -> &StorageUrls {
        &self.urls
    }

    /// Walk the chain for `requested`, then the document's own
    /// `fallback_locale`. `Ok(None)` means no variant is available.
    pub fn resolve(
        &self,
        document: &Document,
        requested: Locale,
    ) -> Result<Option<ResolvedFile>, ResolveError> {
        let chain = self
            .fallbacks
            .chain(requested)
            .ok_or(ResolveError::MissingChain(requested))?;

        if let Some(found) = chain
            .iter()
            .find_map(|candidate| self.build(document, *candidate, requested))
        {
            return Ok(Some(found));
        }

        let last_resort = document
            .fallback_locale
            .and_then(|locale| self.build(document, locale, requested))
            .map(|mut file| {
                file.is_fallback = true;
                file
            });

        if last_resort.is_none() {
            tracing::debug!(
                "No file variant of document {} for locale {}",
                document.slug,
                requested
            );
        }

        Ok(last_resort)
    }

    fn build(
        &self,
        document: &Document,
        candidate: Locale,
        requested: Locale,
    ) -> Option<ResolvedFile> {
        document.variant(candidate).map(|variant| ResolvedFile {
            url: self.urls.public_url(variant.path),
            path: variant.path.to_string(),
            size: variant.size,
            locale: candidate,
            is_fallback: candidate != requested,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn resolver() -> DocumentResolver {
        DocumentResolver::new(
            LocaleFallbacks::default(),
            StorageUrls::new("https://cdn.example.com", "public"),
        )
    }

    fn empty_document() -> Document {
        Document {
            id: "doc-1".to_string(),
            slug: "datasheet".to_string(),
            title: "Datasheet".to_string(),
            file_cs: None,
            file_size_cs: None,
            file_en: None,
            file_size_en: None,
            file_de: None,
            file_size_de: None,
            fallback_locale: None,
            created_at: String::new(),
            updated_at: String::new(),
        }
    }

    #[test]
    fn test_own_locale_wins() {
        let mut doc = empty_document();
        doc.file_cs = Some("docs/cs.pdf".into());
        doc.file_size_cs = Some(100);
        doc.file_en = Some("docs/en.pdf".into());
        doc.file_size_en = Some(200);

        let file = resolver().resolve(&doc, Locale::Cs).unwrap().unwrap();
        assert_eq!(
            file,
            ResolvedFile {
                url: "https://cdn.example.com/public/docs/cs.pdf".into(),
                path: "docs/cs.pdf".into(),
                size: 100,
                locale: Locale::Cs,
                is_fallback: false,
            }
        );
    }

    #[test]
    fn test_bridge_locale_is_fallback() {
        let mut doc = empty_document();
        doc.file_en = Some("docs/en.pdf".into());
        doc.file_size_en = Some(200);

        let file = resolver().resolve(&doc, Locale::De).unwrap().unwrap();
        assert_eq!(file.locale, Locale::En);
        assert!(file.is_fallback);
        assert_eq!(file.size, 200);
    }

    #[test]
    fn test_chain_order_beats_other_variants() {
        let mut doc = empty_document();
        doc.file_de = Some("docs/de.pdf".into());
        doc.file_size_de = Some(1);
        doc.file_en = Some("docs/en.pdf".into());
        doc.file_size_en = Some(999_999);

        let file = resolver().resolve(&doc, Locale::De).unwrap().unwrap();
        assert_eq!(file.locale, Locale::De);
        assert!(!file.is_fallback);
    }

    #[test]
    fn test_path_without_size_is_unavailable() {
        let mut doc = empty_document();
        doc.file_en = Some("docs/en.pdf".into());

        assert_eq!(resolver().resolve(&doc, Locale::En).unwrap(), None);
    }

    #[test]
    fn test_no_variants_is_not_found_for_every_locale() {
        let doc = empty_document();
        for locale in Locale::ALL {
            assert_eq!(resolver().resolve(&doc, locale).unwrap(), None);
        }
    }

    #[test]
    fn test_fallback_locale_is_last_resort() {
        let mut doc = empty_document();
        doc.file_cs = Some("docs/cs.pdf".into());
        doc.file_size_cs = Some(100);
        doc.fallback_locale = Some(Locale::Cs);

        let file = resolver().resolve(&doc, Locale::De).unwrap().unwrap();
        assert_eq!(file.locale, Locale::Cs);
        assert!(file.is_fallback);

        let file = resolver().resolve(&doc, Locale::En).unwrap().unwrap();
        assert_eq!(file.locale, Locale::Cs);
        assert!(file.is_fallback);
    }

    #[test]
    fn test_fallback_locale_not_used_when_chain_matches() {
        let mut doc = empty_document();
        doc.file_cs = Some("docs/cs.pdf".into());
        doc.file_size_cs = Some(100);
        doc.file_en = Some("docs/en.pdf".into());
        doc.file_size_en = Some(200);
        doc.fallback_locale = Some(Locale::Cs);

        let file = resolver().resolve(&doc, Locale::De).unwrap().unwrap();
        assert_eq!(file.locale, Locale::En);
    }

    #[test]
    fn test_fallback_locale_without_variant_is_not_found() {
        let mut doc = empty_document();
        doc.fallback_locale = Some(Locale::En);

        assert_eq!(resolver().resolve(&doc, Locale::Cs).unwrap(), None);
    }

    #[test]
    fn test_missing_chain_is_configuration_error() {
        let mut chains = HashMap::new();
        chains.insert(Locale::Cs, vec![Locale::Cs]);
        let resolver = DocumentResolver::new(
            LocaleFallbacks::from_map(chains),
            StorageUrls::new("https://cdn.example.com", "public"),
        );

        let mut doc = empty_document();
        doc.file_cs = Some("docs/cs.pdf".into());
        doc.file_size_cs = Some(100);
        doc.fallback_locale = Some(Locale::Cs);

        assert_eq!(
            resolver.resolve(&doc, Locale::De),
            Err(ResolveError::MissingChain(Locale::De))
        );
    }

    #[test]
    fn test_custom_policy_is_respected() {
        let fallbacks = LocaleFallbacks::parse("cs:cs,de;en:en;de:de").unwrap();
        let resolver = DocumentResolver::new(fallbacks, StorageUrls::new("https://cdn", "b"));

        let mut doc = empty_document();
        doc.file_de = Some("de.pdf".into());
        doc.file_size_de = Some(7);

        let file = resolver.resolve(&doc, Locale::Cs).unwrap().unwrap();
        assert_eq!(file.locale, Locale::De);
        assert!(file.is_fallback);
        assert_eq!(resolver.resolve(&doc, Locale::En).unwrap(), None);
    }

    #[test]
    fn test_resolution_is_deterministic() {
        let mut doc = empty_document();
        doc.file_en = Some("docs/en.pdf".into());
        doc.file_size_en = Some(200);

        let resolver = resolver();
        for locale in Locale::ALL {
            assert_eq!(resolver.resolve(&doc, locale), resolver.resolve(&doc, locale));
        }
    }
}
