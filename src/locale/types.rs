//! Locale and fallback chain types

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// A supported site language
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    Cs,
    En,
    De,
}

impl Locale {
    /// Every locale the site is published in
    pub const ALL: [Locale; 3] = [Locale::Cs, Locale::En, Locale::De];

    pub fn as_str(&self) -> &'static str {
        match self {
            Locale::Cs => "cs",
            Locale::En => "en",
            Locale::De => "de",
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unsupported locale: {0}")]
pub struct UnknownLocale(pub String);

impl FromStr for Locale {
    type Err = UnknownLocale;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "cs" => Ok(Locale::Cs),
            "en" => Ok(Locale::En),
            "de" => Ok(Locale::De),
            _ => Err(UnknownLocale(s.to_string())),
        }
    }
}

/// Problems with a fallback policy
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FallbackPolicyError {
    #[error("No fallback chain configured for locale {0}")]
    MissingChain(Locale),

    #[error("Fallback chain for locale {0} must start with the locale itself")]
    ChainMustStartWithSelf(Locale),

    #[error("Invalid fallback policy syntax: {0}")]
    Syntax(String),
}

/// Ordered candidate locales per requested locale, most preferred first
///
/// Built once at startup and handed to whoever needs it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocaleFallbacks {
    chains: HashMap<Locale, Vec<Locale>>,
}

impl Default for LocaleFallbacks {
    /// Every locale falls back only to itself, except German which
    /// bridges to English.
    fn default() -> Self {
        let mut chains = HashMap::new();
        chains.insert(Locale::Cs, vec![Locale::Cs]);
        chains.insert(Locale::En, vec![Locale::En]);
        chains.insert(Locale::De, vec![Locale::De, Locale::En]);
        Self { chains }
    }
}

impl LocaleFallbacks {
    /// Build a policy from an explicit map. No validation happens here;
    /// call [`LocaleFallbacks::validate`] before serving traffic.
    pub fn from_map(chains: HashMap<Locale, Vec<Locale>>) -> Self {
        Self { chains }
    }

    /// Parse `cs:cs;en:en;de:de,en`
    pub fn parse(raw: &str) -> Result<Self, FallbackPolicyError> {
        let mut chains = HashMap::new();

        for entry in raw.split(';').map(str::trim).filter(|e| !e.is_empty()) {
            let (key, values) = entry
                .split_once(':')
                .ok_or_else(|| FallbackPolicyError::Syntax(entry.to_string()))?;

            let locale: Locale = key
                .parse()
                .map_err(|e: UnknownLocale| FallbackPolicyError::Syntax(e.to_string()))?;

            let chain = values
                .split(',')
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(|v| {
                    v.parse::<Locale>()
                        .map_err(|e| FallbackPolicyError::Syntax(e.to_string()))
                })
                .collect::<Result<Vec<_>, _>>()?;

            chains.insert(locale, chain);
        }

        Ok(Self { chains })
    }

    /// Candidate locales for `locale`, if a chain is configured
    pub fn chain(&self, locale: Locale) -> Option<&[Locale]> {
        self.chains
            .get(&locale)
            .map(Vec::as_slice)
            .filter(|chain| !chain.is_empty())
    }

    /// Every supported locale must have a non-empty chain headed by itself
    pub fn validate(&self) -> Result<(), FallbackPolicyError> {
        for locale in Locale::ALL {
            let chain = self
                .chain(locale)
                .ok_or(FallbackPolicyError::MissingChain(locale))?;
            if chain[0] != locale {
                return Err(FallbackPolicyError::ChainMustStartWithSelf(locale));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locale_parse() {
        assert_eq!("cs".parse::<Locale>().unwrap(), Locale::Cs);
        assert_eq!(" DE ".parse::<Locale>().unwrap(), Locale::De);
        assert!("fr".parse::<Locale>().is_err());
    }

    #[test]
    fn test_locale_serde_lowercase() {
        assert_eq!(serde_json::to_string(&Locale::En).unwrap(), "\"en\"");
        let parsed: Locale = serde_json::from_str("\"de\"").unwrap();
        assert_eq!(parsed, Locale::De);
    }

    #[test]
    fn test_default_chains_start_with_self() {
        let fallbacks = LocaleFallbacks::default();
        for locale in Locale::ALL {
            let chain = fallbacks.chain(locale).unwrap();
            assert!(!chain.is_empty());
            assert_eq!(chain[0], locale);
        }
        assert!(fallbacks.validate().is_ok());
    }

    #[test]
    fn test_default_german_bridges_to_english() {
        let fallbacks = LocaleFallbacks::default();
        assert_eq!(fallbacks.chain(Locale::De).unwrap(), &[Locale::De, Locale::En]);
        assert_eq!(fallbacks.chain(Locale::Cs).unwrap(), &[Locale::Cs]);
        assert_eq!(fallbacks.chain(Locale::En).unwrap(), &[Locale::En]);
    }

    #[test]
    fn test_parse_policy() {
        let fallbacks = LocaleFallbacks::parse("cs:cs,en; en:en; de:de,en").unwrap();
        assert_eq!(fallbacks.chain(Locale::Cs).unwrap(), &[Locale::Cs, Locale::En]);
        assert!(fallbacks.validate().is_ok());
    }

    #[test]
    fn test_parse_policy_rejects_garbage() {
        assert!(matches!(
            LocaleFallbacks::parse("cs=cs"),
            Err(FallbackPolicyError::Syntax(_))
        ));
        assert!(matches!(
            LocaleFallbacks::parse("cs:xx"),
            Err(FallbackPolicyError::Syntax(_))
        ));
    }

    #[test]
    fn test_validate_reports_missing_chain() {
        let fallbacks = LocaleFallbacks::parse("cs:cs;en:en").unwrap();
        assert_eq!(
            fallbacks.validate(),
            Err(FallbackPolicyError::MissingChain(Locale::De))
        );
    }

    #[test]
    fn test_validate_reports_foreign_head() {
        let fallbacks = LocaleFallbacks::parse("cs:cs;en:en;de:en,de").unwrap();
        assert_eq!(
            fallbacks.validate(),
            Err(FallbackPolicyError::ChainMustStartWithSelf(Locale::De))
        );
    }

    #[test]
    fn test_empty_chain_counts_as_missing() {
        let mut chains = HashMap::new();
        chains.insert(Locale::Cs, vec![]);
        let fallbacks = LocaleFallbacks::from_map(chains);
        assert!(fallbacks.chain(Locale::Cs).is_none());
    }
}
