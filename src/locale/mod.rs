//! Locale handling
//!
//! - `Locale` and the static fallback policy (`LocaleFallbacks`)
//! - `DocumentResolver`, which picks the file variant to serve for a locale

mod resolver;
mod types;

pub use resolver::{DocumentResolver, ResolveError, ResolvedFile};
pub use types::{FallbackPolicyError, Locale, LocaleFallbacks, UnknownLocale};
