//! Command-line front end

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::core::features::menu::{load_menu, MenuLocalizer};
use crate::core::features::translator::binding::BindingInputs;
use crate::core::features::translator::types::{DisplayLanguage, LanguagePair, TranslatableText};
use crate::core::features::translator::AutoTranslator;
use crate::shared::error::{AppError, AppResult};
use crate::shared::settings::AppSettings;

#[derive(Parser, Debug)]
#[command(name = "menu-translator", version, about = "Bilingual restaurant menu text")]
pub struct Cli {
    /// Settings file (defaults to the user config dir)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Resolve a single piece of menu text
    Translate {
        text: String,

        /// `source`, `target`, or a language code of the configured pair
        #[arg(long, default_value = "target")]
        lang: String,

        /// Translation already supplied by the data source
        #[arg(long)]
        precomputed: Option<String>,

        /// Cache key (defaults to one derived from the text)
        #[arg(long)]
        key: Option<String>,
    },

    /// Localise every item of a JSON menu file
    Menu {
        file: PathBuf,

        #[arg(long, default_value = "target")]
        lang: String,
    },
}

pub fn parse_language(pair: &LanguagePair, input: &str) -> AppResult<DisplayLanguage> {
    pair.selector_for(input).ok_or_else(|| {
        AppError::Validation(format!(
            "Unknown language '{}', expected source, target, {} or {}",
            input,
            pair.source_code(),
            pair.target_code()
        ))
    })
}

async fn load_settings(path: Option<&PathBuf>) -> AppSettings {
    let loaded = match path {
        Some(p) => AppSettings::load_from(p).await,
        None => AppSettings::load().await,
    };
    loaded.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "failed to load settings, using defaults");
        AppSettings::default()
    })
}

pub async fn run() -> AppResult<()> {
    let cli = Cli::parse();
    execute(cli).await
}

pub async fn execute(cli: Cli) -> AppResult<()> {
    let settings = load_settings(cli.config.as_ref()).await;
    let translator = AutoTranslator::from_settings(&settings.translator)?;

    match cli.command {
        Command::Translate { text, lang, precomputed, key } => {
            let language = parse_language(&translator.languages(), &lang)?;
            let mut inputs = BindingInputs::new(TranslatableText::with_target(text, precomputed), language);
            if let Some(key) = key {
                inputs = inputs.with_cache_key(key);
            }
            let result = translator.resolve(inputs).await;
            tracing::info!(origin = %result.origin, "text resolved");
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        Command::Menu { file, lang } => {
            let language = parse_language(&translator.languages(), &lang)?;
            let items = load_menu(&file).await?;
            let localizer = MenuLocalizer::new(translator, settings.menu);

            let header = localizer.restaurant_name(language);
            let localized = localizer.localize_all(&items, language).await;
            tracing::info!(items = localized.len(), "menu localised");

            let output = serde_json::json!({
                "restaurantName": header,
                "items": localized,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }
    Ok(())
}
