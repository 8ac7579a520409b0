//! Downloadable document records

use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use uuid::Uuid;

use super::conflict_on_unique;
use crate::error::{AppError, Result};
use crate::locale::Locale;

/// A downloadable file (datasheet, manual, firmware bundle) with up to one
/// variant per locale
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub slug: String,
    pub title: String,
    pub file_cs: Option<String>,
    pub file_size_cs: Option<i64>,
    pub file_en: Option<String>,
    pub file_size_en: Option<i64>,
    pub file_de: Option<String>,
    pub file_size_de: Option<i64>,
    pub fallback_locale: Option<Locale>,
    pub created_at: String,
    pub updated_at: String,
}

/// A locale variant that has both a path and a size
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileVariant<'a> {
    pub path: &'a str,
    pub size: i64,
}

impl Document {
    /// The variant for `locale`, if both its path and size are set
    pub fn variant(&self, locale: Locale) -> Option<FileVariant<'_>> {
        let (path, size) = match locale {
            Locale::Cs => (&self.file_cs, self.file_size_cs),
            Locale::En => (&self.file_en, self.file_size_en),
            Locale::De => (&self.file_de, self.file_size_de),
        };

        match (path.as_deref(), size) {
            (Some(path), Some(size)) => Some(FileVariant { path, size }),
            _ => None,
        }
    }
}

/// Create/replace payload
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct DocumentInput {
    pub slug: String,
    pub title: String,
    #[serde(default)]
    pub file_cs: Option<String>,
    #[serde(default)]
    pub file_size_cs: Option<i64>,
    #[serde(default)]
    pub file_en: Option<String>,
    #[serde(default)]
    pub file_size_en: Option<i64>,
    #[serde(default)]
    pub file_de: Option<String>,
    #[serde(default)]
    pub file_size_de: Option<i64>,
    #[serde(default)]
    pub fallback_locale: Option<Locale>,
}

impl DocumentInput {
    pub fn validate(&self) -> Result<()> {
        if self.slug.trim().is_empty() {
            return Err(AppError::BadRequest("slug must not be empty".to_string()));
        }
        let sizes = [self.file_size_cs, self.file_size_en, self.file_size_de];
        if sizes.iter().flatten().any(|size| *size <= 0) {
            return Err(AppError::BadRequest("file sizes must be positive".to_string()));
        }
        Ok(())
    }
}

#[derive(sqlx::FromRow)]
struct DocumentRow {
    id: String,
    slug: String,
    title: String,
    file_cs: Option<String>,
    file_size_cs: Option<i64>,
    file_en: Option<String>,
    file_size_en: Option<i64>,
    file_de: Option<String>,
    file_size_de: Option<i64>,
    fallback_locale: Option<String>,
    created_at: String,
    updated_at: String,
}

impl DocumentRow {
    fn into_document(self) -> Document {
        let fallback_locale = self
            .fallback_locale
            .and_then(|raw| match raw.parse::<Locale>() {
                Ok(locale) => Some(locale),
                Err(e) => {
                    tracing::warn!("Ignoring fallback locale of document {}: {}", self.slug, e);
                    None
                }
            });

        Document {
            id: self.id,
            slug: self.slug,
            title: self.title,
            file_cs: self.file_cs,
            file_size_cs: self.file_size_cs,
            file_en: self.file_en,
            file_size_en: self.file_size_en,
            file_de: self.file_de,
            file_size_de: self.file_size_de,
            fallback_locale,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

fn slug_taken(slug: &str) -> String {
    format!("Document slug already exists: {}", slug)
}

const SELECT_COLUMNS: &str = r#"
    SELECT id, slug, title,
           file_cs, file_size_cs, file_en, file_size_en, file_de, file_size_de,
           fallback_locale, created_at, updated_at
    FROM documents
"#;

/// Document repository
pub struct DocumentRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> DocumentRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// All documents ordered by title
    pub async fn list(&self) -> Result<Vec<Document>> {
        let query = format!("{} ORDER BY title, slug", SELECT_COLUMNS);
        let rows = sqlx::query_as::<_, DocumentRow>(&query)
            .fetch_all(self.pool)
            .await?;

        Ok(rows.into_iter().map(DocumentRow::into_document).collect())
    }

    pub async fn get_by_slug(&self, slug: &str) -> Result<Option<Document>> {
        let query = format!("{} WHERE slug = ?", SELECT_COLUMNS);
        let row = sqlx::query_as::<_, DocumentRow>(&query)
            .bind(slug)
            .fetch_optional(self.pool)
            .await?;

        Ok(row.map(DocumentRow::into_document))
    }

    /// Insert a new document; a taken slug is a conflict
    pub async fn create(&self, input: &DocumentInput) -> Result<Document> {
        input.validate()?;

        let now = Utc::now().to_rfc3339();
        let id = Uuid::new_v4().to_string();

        sqlx::query(
            r#"
            INSERT INTO documents (id, slug, title, file_cs, file_size_cs, file_en, file_size_en,
                                   file_de, file_size_de, fallback_locale, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(&input.slug)
        .bind(&input.title)
        .bind(&input.file_cs)
        .bind(input.file_size_cs)
        .bind(&input.file_en)
        .bind(input.file_size_en)
        .bind(&input.file_de)
        .bind(input.file_size_de)
        .bind(input.fallback_locale.map(|l| l.as_str()))
        .bind(&now)
        .bind(&now)
        .execute(self.pool)
        .await
        .map_err(|e| conflict_on_unique(e, || slug_taken(&input.slug)))?;

        tracing::debug!("Created document {} ({})", input.slug, id);

        self.get_by_slug(&input.slug)
            .await?
            .ok_or_else(|| AppError::Internal("Failed to fetch created document".to_string()))
    }

    /// Replace the editable fields of the document at `slug`
    pub async fn update(&self, slug: &str, input: &DocumentInput) -> Result<Option<Document>> {
        input.validate()?;

        let now = Utc::now().to_rfc3339();

        let result = sqlx::query(
            r#"
            UPDATE documents SET
                slug = ?, title = ?,
                file_cs = ?, file_size_cs = ?,
                file_en = ?, file_size_en = ?,
                file_de = ?, file_size_de = ?,
                fallback_locale = ?, updated_at = ?
            WHERE slug = ?
            "#,
        )
        .bind(&input.slug)
        .bind(&input.title)
        .bind(&input.file_cs)
        .bind(input.file_size_cs)
        .bind(&input.file_en)
        .bind(input.file_size_en)
        .bind(&input.file_de)
        .bind(input.file_size_de)
        .bind(input.fallback_locale.map(|l| l.as_str()))
        .bind(&now)
        .bind(slug)
        .execute(self.pool)
        .await
        .map_err(|e| conflict_on_unique(e, || slug_taken(&input.slug)))?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        self.get_by_slug(&input.slug).await
    }

    pub async fn delete(&self, slug: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM documents WHERE slug = ?")
            .bind(slug)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;

    fn manual() -> DocumentInput {
        DocumentInput {
            slug: "wallbox-manual".to_string(),
            title: "Wallbox manual".to_string(),
            file_cs: Some("documents/manual-cs.pdf".to_string()),
            file_size_cs: Some(1024),
            fallback_locale: Some(Locale::Cs),
            ..Default::default()
        }
    }

    #[test]
    fn test_variant_requires_path_and_size() {
        let doc = Document {
            id: "1".into(),
            slug: "s".into(),
            title: "t".into(),
            file_cs: Some("a.pdf".into()),
            file_size_cs: Some(10),
            file_en: Some("b.pdf".into()),
            file_size_en: None,
            file_de: None,
            file_size_de: Some(5),
            fallback_locale: None,
            created_at: String::new(),
            updated_at: String::new(),
        };

        assert_eq!(doc.variant(Locale::Cs), Some(FileVariant { path: "a.pdf", size: 10 }));
        assert_eq!(doc.variant(Locale::En), None);
        assert_eq!(doc.variant(Locale::De), None);
    }

    #[test]
    fn test_input_validation() {
        assert!(manual().validate().is_ok());

        let mut blank = manual();
        blank.slug = "  ".into();
        assert!(matches!(blank.validate(), Err(AppError::BadRequest(_))));

        let mut negative = manual();
        negative.file_size_en = Some(0);
        assert!(matches!(negative.validate(), Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let pool = test_pool().await;
        let repo = DocumentRepository::new(&pool);

        let created = repo.create(&manual()).await.unwrap();
        assert_eq!(created.slug, "wallbox-manual");
        assert_eq!(created.fallback_locale, Some(Locale::Cs));

        let fetched = repo.get_by_slug("wallbox-manual").await.unwrap().unwrap();
        assert_eq!(fetched, created);
        assert!(repo.get_by_slug("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_slug_conflicts() {
        let pool = test_pool().await;
        let repo = DocumentRepository::new(&pool);

        repo.create(&manual()).await.unwrap();
        let err = repo.create(&manual()).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_renaming_onto_taken_slug_conflicts() {
        let pool = test_pool().await;
        let repo = DocumentRepository::new(&pool);
        repo.create(&manual()).await.unwrap();

        let mut other = manual();
        other.slug = "wallbox-datasheet".into();
        repo.create(&other).await.unwrap();

        let err = repo.update("wallbox-datasheet", &manual()).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
        assert!(repo.get_by_slug("wallbox-datasheet").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let pool = test_pool().await;
        let repo = DocumentRepository::new(&pool);
        repo.create(&manual()).await.unwrap();

        let mut input = manual();
        input.file_en = Some("documents/manual-en.pdf".into());
        input.file_size_en = Some(2048);
        let updated = repo.update("wallbox-manual", &input).await.unwrap().unwrap();
        assert_eq!(
            updated.variant(Locale::En),
            Some(FileVariant { path: "documents/manual-en.pdf", size: 2048 })
        );
        assert!(updated.variant(Locale::Cs).is_some());

        assert!(repo.update("missing", &manual()).await.unwrap().is_none());

        assert!(repo.delete("wallbox-manual").await.unwrap());
        assert!(!repo.delete("wallbox-manual").await.unwrap());
        assert!(repo.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_fallback_locale_column_is_ignored() {
        let pool = test_pool().await;
        let repo = DocumentRepository::new(&pool);
        repo.create(&manual()).await.unwrap();

        sqlx::query("UPDATE documents SET fallback_locale = 'fr' WHERE slug = ?")
            .bind("wallbox-manual")
            .execute(&pool)
            .await
            .unwrap();

        let doc = repo.get_by_slug("wallbox-manual").await.unwrap().unwrap();
        assert_eq!(doc.fallback_locale, None);
    }
}
