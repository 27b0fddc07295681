pub mod cli;
pub mod core;
pub mod shared;

pub use crate::core::features::translator::binding::{BindingInputs, BindingState, DisplayBinding};
pub use crate::core::features::translator::cache::{derive_cache_key, RedbSessionCache, SessionCache, TranslationCache};
pub use crate::core::features::translator::fetcher::{GoogleFreeFetcher, TranslationFetcher};
pub use crate::core::features::translator::resolver::{resolve_text, ResolutionPolicy, TextDecision};
pub use crate::core::features::translator::types::{
    DisplayLanguage, LanguagePair, ResolutionOrigin, ResolutionResult, TranslatableText, TranslationError,
};
pub use crate::core::features::translator::AutoTranslator;
pub use crate::shared::error::{AppError, AppResult};

use tracing_subscriber::{fmt, EnvFilter};

/// Entry point for the `menu-translator` binary.
pub fn run() -> AppResult<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| AppError::System(format!("Failed to start runtime: {}", e)))?;

    runtime.block_on(cli::run())
}
