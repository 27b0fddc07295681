//! Display-text resolution policy
//!
//! Strategies are tried in priority order and the first one that produces a
//! value wins. When none matches, the caller has to fetch a translation.

use enum_dispatch::enum_dispatch;

use super::cache::TranslationCache;
use super::types::{usable, DisplayLanguage, ResolutionOrigin, TranslatableText};

/// Outcome of the pure part of resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextDecision {
    Display(String),
    Pending,
}

/// Chooses between the source text and a precomputed translation without
/// touching the cache or the network.
pub fn resolve_text(
    source_text: &str,
    precomputed_target: Option<&str>,
    language: DisplayLanguage,
) -> TextDecision {
    if language == DisplayLanguage::Source {
        return TextDecision::Display(source_text.to_string());
    }
    match usable(precomputed_target) {
        Some(target) => TextDecision::Display(target.to_string()),
        None => TextDecision::Pending,
    }
}

/// Everything a strategy may look at.
#[derive(Debug, Clone, Copy)]
pub struct ResolveRequest<'a> {
    pub text: &'a TranslatableText,
    pub language: DisplayLanguage,
    pub cache_key: &'a str,
    pub enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    pub text: String,
    pub origin: ResolutionOrigin,
}

#[enum_dispatch]
pub trait ResolveStrategy {
    fn name(&self) -> &'static str;

    fn resolve(&self, request: &ResolveRequest<'_>, cache: &dyn TranslationCache) -> Option<Resolved>;
}

/// Source language selected, or translation switched off.
#[derive(Debug, Clone, Copy, Default)]
pub struct SourceLanguageStrategy;

impl ResolveStrategy for SourceLanguageStrategy {
    fn name(&self) -> &'static str {
        "source_language"
    }

    fn resolve(&self, request: &ResolveRequest<'_>, _cache: &dyn TranslationCache) -> Option<Resolved> {
        if request.language == DisplayLanguage::Source || !request.enabled {
            return Some(Resolved {
                text: request.text.source_text.clone(),
                origin: ResolutionOrigin::Source,
            });
        }
        None
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PrecomputedStrategy;

impl ResolveStrategy for PrecomputedStrategy {
    fn name(&self) -> &'static str {
        "precomputed"
    }

    fn resolve(&self, request: &ResolveRequest<'_>, _cache: &dyn TranslationCache) -> Option<Resolved> {
        match resolve_text(&request.text.source_text, request.text.usable_target(), request.language) {
            TextDecision::Display(text) if request.language == DisplayLanguage::Target => Some(Resolved {
                text,
                origin: ResolutionOrigin::Precomputed,
            }),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CachedStrategy;

impl ResolveStrategy for CachedStrategy {
    fn name(&self) -> &'static str {
        "cached"
    }

    fn resolve(&self, request: &ResolveRequest<'_>, cache: &dyn TranslationCache) -> Option<Resolved> {
        cache
            .get(request.cache_key)
            .filter(|v| !v.is_empty())
            .map(|text| Resolved {
                text,
                origin: ResolutionOrigin::Cached,
            })
    }
}

/// Nothing to translate: blank source text is shown as-is.
#[derive(Debug, Clone, Copy, Default)]
pub struct BlankSourceStrategy;

impl ResolveStrategy for BlankSourceStrategy {
    fn name(&self) -> &'static str {
        "blank_source"
    }

    fn resolve(&self, request: &ResolveRequest<'_>, _cache: &dyn TranslationCache) -> Option<Resolved> {
        if request.text.source_text.trim().is_empty() {
            return Some(Resolved {
                text: request.text.source_text.clone(),
                origin: ResolutionOrigin::Source,
            });
        }
        None
    }
}

#[enum_dispatch(ResolveStrategy)]
#[derive(Debug, Clone, Copy)]
pub enum Strategy {
    SourceLanguage(SourceLanguageStrategy),
    Precomputed(PrecomputedStrategy),
    Cached(CachedStrategy),
    BlankSource(BlankSourceStrategy),
}

/// Ordered list of strategies; first match wins.
#[derive(Debug, Clone)]
pub struct ResolutionPolicy {
    strategies: Vec<Strategy>,
}

impl Default for ResolutionPolicy {
    /// precomputed → cache → blank source; anything left needs a fetch
    fn default() -> Self {
        Self {
            strategies: vec![
                SourceLanguageStrategy.into(),
                PrecomputedStrategy.into(),
                CachedStrategy.into(),
                BlankSourceStrategy.into(),
            ],
        }
    }
}

impl ResolutionPolicy {
    pub fn new(strategies: Vec<Strategy>) -> Self {
        Self { strategies }
    }

    pub fn strategies(&self) -> &[Strategy] {
        &self.strategies
    }

    /// `None` means the text must be fetched.
    pub fn resolve(&self, request: &ResolveRequest<'_>, cache: &dyn TranslationCache) -> Option<Resolved> {
        for strategy in &self.strategies {
            if let Some(resolved) = strategy.resolve(request, cache) {
                tracing::debug!(
                    strategy = strategy.name(),
                    key = request.cache_key,
                    "resolved without fetch"
                );
                return Some(resolved);
            }
        }
        None
    }
}
