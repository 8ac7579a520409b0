//! Configuration management for the content server

use serde::Deserialize;
use std::env;

use crate::locale::{FallbackPolicyError, Locale, LocaleFallbacks, UnknownLocale};

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub database: DatabaseConfig,
    pub locales: LocaleConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    pub endpoint: String,
    pub bucket: String,
    pub access_key: String,
    pub secret_key: String,
    pub region: Option<String>,
    /// Base for browser-facing URLs; falls back to `endpoint`
    pub public_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
}

#[derive(Debug, Clone)]
pub struct LocaleConfig {
    /// Used when a request names no locale
    pub default_locale: Locale,
    pub fallbacks: LocaleFallbacks,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid DEFAULT_LOCALE: {0}")]
    DefaultLocale(#[from] UnknownLocale),

    #[error("Invalid LOCALE_FALLBACKS: {0}")]
    Fallbacks(#[from] FallbackPolicyError),
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig {
            endpoint: "http://localhost:9000".to_string(),
            bucket: "public".to_string(),
            access_key: "admin".to_string(),
            secret_key: "password123".to_string(),
            region: Some("us-east-1".to_string()),
            public_url: None,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 3000,
            },
            storage: StorageConfig::default(),
            database: DatabaseConfig {
                url: "sqlite:./content.db".to_string(),
            },
            locales: LocaleConfig {
                default_locale: Locale::Cs,
                fallbacks: LocaleFallbacks::default(),
            },
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from any variable source
    ///
    /// Missing S3 credentials fall back to the local MinIO defaults for the
    /// storage section only. Locale settings are never replaced: an invalid
    /// value is an error.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let fallbacks = match lookup("LOCALE_FALLBACKS") {
            Some(raw) => LocaleFallbacks::parse(&raw)?,
            None => LocaleFallbacks::default(),
        };
        fallbacks.validate()?;

        let default_locale = lookup("DEFAULT_LOCALE")
            .map(|v| v.parse::<Locale>())
            .transpose()?
            .unwrap_or(Locale::Cs);

        Ok(Config {
            server: ServerConfig {
                host: lookup("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
                port: lookup("SERVER_PORT")
                    .and_then(|p| p.parse().ok())
                    .unwrap_or(3000),
            },
            storage: StorageConfig::from_lookup(&lookup),
            database: DatabaseConfig {
                url: lookup("DATABASE_URL")
                    .unwrap_or_else(|| "sqlite:./content.db".to_string()),
            },
            locales: LocaleConfig {
                default_locale,
                fallbacks,
            },
        })
    }
}

impl StorageConfig {
    fn from_lookup<F>(lookup: &F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let credentials = (
            lookup("S3_ENDPOINT"),
            lookup("S3_BUCKET"),
            lookup("S3_ACCESS_KEY"),
            lookup("S3_SECRET_KEY"),
        );

        let mut storage = match credentials {
            (Some(endpoint), Some(bucket), Some(access_key), Some(secret_key)) => StorageConfig {
                endpoint,
                bucket,
                access_key,
                secret_key,
                region: lookup("S3_REGION"),
                public_url: None,
            },
            _ => {
                tracing::warn!("S3 settings incomplete, using local storage defaults");
                StorageConfig::default()
            }
        };
        storage.public_url = lookup("STORAGE_PUBLIC_URL");
        storage
    }
}
