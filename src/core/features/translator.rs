//! Translator feature
//!
//! Bilingual display of menu text: precomputed translation, then the session
//! cache, then the remote translation service, falling back to source text.

pub mod binding;
pub mod cache;
pub mod fetcher;
pub mod resolver;
pub mod types;

use std::sync::Arc;

use binding::{BindingInputs, DisplayBinding};
use cache::{RedbSessionCache, SessionCache, TranslationCache};
use fetcher::{GoogleFreeFetcher, TranslationFetcher};
use resolver::ResolutionPolicy;
use types::{LanguagePair, ResolutionResult};

use crate::shared::error::{AppError, AppResult};
use crate::shared::settings::{CacheBackend, TranslatorSettings};

/// One session's worth of translation state: a cache and a fetcher shared by
/// every binding handed out.
#[derive(Clone)]
pub struct AutoTranslator {
    cache: Arc<dyn TranslationCache>,
    fetcher: Arc<dyn TranslationFetcher>,
    policy: Arc<ResolutionPolicy>,
    languages: LanguagePair,
}

impl AutoTranslator {
    pub fn new(
        cache: Arc<dyn TranslationCache>,
        fetcher: Arc<dyn TranslationFetcher>,
        languages: LanguagePair,
    ) -> Self {
        Self {
            cache,
            fetcher,
            policy: Arc::new(ResolutionPolicy::default()),
            languages,
        }
    }

    pub fn from_settings(settings: &TranslatorSettings) -> AppResult<Self> {
        let languages = LanguagePair::from_codes(&settings.source_lang, &settings.target_lang)?;
        let fetcher = GoogleFreeFetcher::from_settings(settings)
            .map_err(|e| AppError::Network(e.to_string()))?;
        let cache: Arc<dyn TranslationCache> = match settings.cache_backend {
            CacheBackend::Memory => SessionCache::shared(),
            CacheBackend::Redb => Arc::new(RedbSessionCache::new()?),
        };
        tracing::debug!(
            source = %languages.source_code(),
            target = %languages.target_code(),
            backend = ?settings.cache_backend,
            "translator ready"
        );
        Ok(Self::new(cache, Arc::new(fetcher), languages))
    }

    pub fn with_policy(mut self, policy: ResolutionPolicy) -> Self {
        self.policy = Arc::new(policy);
        self
    }

    pub fn languages(&self) -> LanguagePair {
        self.languages
    }

    pub fn cache(&self) -> &Arc<dyn TranslationCache> {
        &self.cache
    }

    /// New binding sharing this session's cache and fetcher.
    pub fn bind(&self) -> DisplayBinding {
        DisplayBinding::new(
            Arc::clone(&self.cache),
            Arc::clone(&self.fetcher),
            Arc::clone(&self.policy),
            self.languages,
        )
    }

    /// Resolves once and waits for any fetch to finish.
    pub async fn resolve(&self, inputs: BindingInputs) -> ResolutionResult {
        let mut binding = self.bind();
        binding.update(inputs);
        binding.settled().await
    }
}
