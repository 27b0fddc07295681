//! Display binding
//!
//! Ties the resolution policy, the session cache and the fetcher to one piece
//! of on-screen text. Every change of the input tuple restarts resolution; a
//! fetch started for an older tuple still fills the cache under its own key
//! but its result is never published.

use std::sync::{Arc, Mutex, MutexGuard};

use tokio::runtime::Handle;
use tokio::sync::watch;

use super::cache::{derive_cache_key, TranslationCache};
use super::fetcher::TranslationFetcher;
use super::resolver::{ResolutionPolicy, ResolveRequest};
use super::types::{DisplayLanguage, LanguagePair, ResolutionOrigin, ResolutionResult, TranslatableText};

/// Input tuple the binding reacts to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindingInputs {
    pub text: TranslatableText,
    pub language: DisplayLanguage,
    pub cache_key: Option<String>,
    pub enabled: bool,
}

impl BindingInputs {
    pub fn new(text: TranslatableText, language: DisplayLanguage) -> Self {
        Self {
            text,
            language,
            cache_key: None,
            enabled: true,
        }
    }

    pub fn with_cache_key(mut self, key: impl Into<String>) -> Self {
        self.cache_key = Some(key.into());
        self
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn effective_cache_key(&self) -> String {
        derive_cache_key(self.cache_key.as_deref(), &self.text.source_text)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindingState {
    /// Showing source text; no translation involved.
    Idle(String),
    Pending,
    Resolved(String),
    /// Fetch failed; source text is shown.
    Failed(String),
}

struct Progress {
    generation: u64,
    state: BindingState,
}

struct Shared {
    progress: Mutex<Progress>,
    tx: watch::Sender<ResolutionResult>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Progress> {
        match self.progress.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Starts a new generation and publishes its first result.
    fn restart(&self, state: BindingState, result: ResolutionResult) -> u64 {
        let mut progress = self.lock();
        progress.generation += 1;
        progress.state = state;
        self.tx.send_replace(result);
        progress.generation
    }

    /// Publishes only if no newer input tuple has taken over.
    fn publish_if_current(&self, generation: u64, state: BindingState, result: ResolutionResult) -> bool {
        let mut progress = self.lock();
        if progress.generation != generation {
            return false;
        }
        progress.state = state;
        self.tx.send_replace(result);
        true
    }
}

pub struct DisplayBinding {
    cache: Arc<dyn TranslationCache>,
    fetcher: Arc<dyn TranslationFetcher>,
    policy: Arc<ResolutionPolicy>,
    languages: LanguagePair,
    inputs: Option<BindingInputs>,
    shared: Arc<Shared>,
}

impl DisplayBinding {
    pub fn new(
        cache: Arc<dyn TranslationCache>,
        fetcher: Arc<dyn TranslationFetcher>,
        policy: Arc<ResolutionPolicy>,
        languages: LanguagePair,
    ) -> Self {
        let (tx, _rx) = watch::channel(ResolutionResult::ready(String::new(), ResolutionOrigin::Source));
        Self {
            cache,
            fetcher,
            policy,
            languages,
            inputs: None,
            shared: Arc::new(Shared {
                progress: Mutex::new(Progress {
                    generation: 0,
                    state: BindingState::Idle(String::new()),
                }),
                tx,
            }),
        }
    }

    pub fn state(&self) -> BindingState {
        self.shared.lock().state.clone()
    }

    pub fn snapshot(&self) -> ResolutionResult {
        self.shared.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ResolutionResult> {
        self.shared.tx.subscribe()
    }

    /// Feeds a new input tuple. An unchanged tuple keeps the current result.
    pub fn update(&mut self, inputs: BindingInputs) -> ResolutionResult {
        if self.inputs.as_ref() == Some(&inputs) {
            return self.snapshot();
        }

        let key = inputs.effective_cache_key();
        let request = ResolveRequest {
            text: &inputs.text,
            language: inputs.language,
            cache_key: &key,
            enabled: inputs.enabled,
        };

        if let Some(resolved) = self.policy.resolve(&request, self.cache.as_ref()) {
            let state = match resolved.origin {
                ResolutionOrigin::Source => BindingState::Idle(resolved.text.clone()),
                _ => BindingState::Resolved(resolved.text.clone()),
            };
            let result = ResolutionResult::ready(resolved.text, resolved.origin);
            self.shared.restart(state, result.clone());
            self.inputs = Some(inputs);
            return result;
        }

        let source_text = inputs.text.source_text.clone();
        let pending = ResolutionResult::pending(source_text.clone());
        let generation = self.shared.restart(BindingState::Pending, pending.clone());
        self.inputs = Some(inputs);

        match Handle::try_current() {
            Ok(handle) => {
                handle.spawn(run_fetch(
                    Arc::clone(&self.shared),
                    Arc::clone(&self.cache),
                    Arc::clone(&self.fetcher),
                    self.languages,
                    generation,
                    key,
                    source_text,
                ));
                pending
            }
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "no async runtime, showing source text");
                let failed = ResolutionResult::failed(source_text, "no async runtime available");
                self.shared
                    .publish_if_current(generation, BindingState::Failed(e.to_string()), failed.clone());
                failed
            }
        }
    }

    /// Switches the display language, keeping the rest of the inputs.
    pub fn set_language(&mut self, language: DisplayLanguage) -> ResolutionResult {
        match self.inputs.clone() {
            Some(mut inputs) => {
                inputs.language = language;
                self.update(inputs)
            }
            None => self.snapshot(),
        }
    }

    /// Waits until no fetch is in flight for the current inputs.
    pub async fn settled(&self) -> ResolutionResult {
        let mut rx = self.subscribe();
        let settled = match rx.wait_for(|r| !r.is_translating).await {
            Ok(result) => Some(result.clone()),
            Err(_) => None,
        };
        settled.unwrap_or_else(|| self.snapshot())
    }
}

async fn run_fetch(
    shared: Arc<Shared>,
    cache: Arc<dyn TranslationCache>,
    fetcher: Arc<dyn TranslationFetcher>,
    languages: LanguagePair,
    generation: u64,
    key: String,
    source_text: String,
) {
    match fetcher.translate(&source_text, languages.source, languages.target).await {
        Ok(translated) => {
            let display = if translated.is_empty() {
                source_text
            } else {
                cache.set(&key, &translated);
                translated
            };
            let published = shared.publish_if_current(
                generation,
                BindingState::Resolved(display.clone()),
                ResolutionResult::ready(display, ResolutionOrigin::Fetched),
            );
            if !published {
                tracing::debug!(key = %key, "inputs changed during fetch, result only cached");
            }
        }
        Err(e) => {
            tracing::warn!(key = %key, error = %e, "translation failed, showing source text");
            shared.publish_if_current(
                generation,
                BindingState::Failed(e.to_string()),
                ResolutionResult::failed(source_text, e.to_string()),
            );
        }
    }
}
