use std::fmt;
use std::str::FromStr;

use isolang::Language;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use ts_rs::TS;

use crate::shared::error::{AppError, AppResult};

/// Failure of a single remote translation attempt.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TranslationError {
    #[error("Translation request failed: {0}")]
    Network(String),

    #[error("Translation service returned HTTP {0}")]
    Status(u16),

    #[error("Malformed translation response: {0}")]
    MalformedResponse(String),
}

pub type TranslationResult<T> = Result<T, TranslationError>;

/// Which side of the language pair a piece of text is displayed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum DisplayLanguage {
    Source,
    Target,
}

/// Authoring language and display language of the menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LanguagePair {
    pub source: Language,
    pub target: Language,
}

impl Default for LanguagePair {
    fn default() -> Self {
        Self {
            source: Language::Ind,
            target: Language::Eng,
        }
    }
}

pub(crate) fn lang_code(lang: &Language) -> String {
    lang.to_639_1()
        .map(|c| c.to_string())
        .unwrap_or_else(|| lang.to_639_3().to_string())
}

/// Blank translations count as absent.
pub(crate) fn usable(target: Option<&str>) -> Option<&str> {
    target.filter(|t| !t.trim().is_empty())
}

pub(crate) fn parse_language(code: &str) -> Option<Language> {
    let code = code.trim().to_ascii_lowercase();
    Language::from_639_1(code.as_str()).or_else(|| Language::from_639_3(code.as_str()))
}

impl LanguagePair {
    pub fn from_codes(source: &str, target: &str) -> AppResult<Self> {
        let source = parse_language(source)
            .ok_or_else(|| AppError::Validation(format!("Invalid language: {}", source)))?;
        let target = parse_language(target)
            .ok_or_else(|| AppError::Validation(format!("Invalid language: {}", target)))?;
        Ok(Self { source, target })
    }

    pub fn source_code(&self) -> String {
        lang_code(&self.source)
    }

    pub fn target_code(&self) -> String {
        lang_code(&self.target)
    }

    /// Maps `source`/`target` or one of the pair's language codes to a selector.
    pub fn selector_for(&self, input: &str) -> Option<DisplayLanguage> {
        if let Ok(selector) = input.parse::<DisplayLanguage>() {
            return Some(selector);
        }
        let lang = parse_language(input)?;
        if lang == self.source {
            Some(DisplayLanguage::Source)
        } else if lang == self.target {
            Some(DisplayLanguage::Target)
        } else {
            None
        }
    }
}

impl FromStr for DisplayLanguage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "source" => Ok(DisplayLanguage::Source),
            "target" => Ok(DisplayLanguage::Target),
            other => Err(format!("unknown display language: {}", other)),
        }
    }
}

/// Source text plus the translation the data source may already carry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslatableText {
    pub source_text: String,
    pub precomputed_target: Option<String>,
}

impl TranslatableText {
    pub fn new(source_text: impl Into<String>) -> Self {
        Self {
            source_text: source_text.into(),
            precomputed_target: None,
        }
    }

    pub fn with_target(source_text: impl Into<String>, target: Option<String>) -> Self {
        Self {
            source_text: source_text.into(),
            precomputed_target: target,
        }
    }

    /// Precomputed translation, if present and not blank.
    pub fn usable_target(&self) -> Option<&str> {
        usable(self.precomputed_target.as_deref())
    }
}

/// Where a displayed value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum ResolutionOrigin {
    Source,
    Precomputed,
    Cached,
    Fetched,
    Fallback,
    Pending,
}

impl fmt::Display for ResolutionOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ResolutionOrigin::Source => "source",
            ResolutionOrigin::Precomputed => "precomputed",
            ResolutionOrigin::Cached => "cached",
            ResolutionOrigin::Fetched => "fetched",
            ResolutionOrigin::Fallback => "fallback",
            ResolutionOrigin::Pending => "pending",
        };
        f.write_str(label)
    }
}

/// What the UI renders for one piece of text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ResolutionResult {
    pub display_text: String,
    pub is_translating: bool,
    pub error: Option<String>,
    pub origin: ResolutionOrigin,
}

impl ResolutionResult {
    pub fn ready(display_text: impl Into<String>, origin: ResolutionOrigin) -> Self {
        Self {
            display_text: display_text.into(),
            is_translating: false,
            error: None,
            origin,
        }
    }

    /// Source text shown while a fetch is in flight.
    pub fn pending(source_text: impl Into<String>) -> Self {
        Self {
            display_text: source_text.into(),
            is_translating: true,
            error: None,
            origin: ResolutionOrigin::Pending,
        }
    }

    pub fn failed(source_text: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            display_text: source_text.into(),
            is_translating: false,
            error: Some(error.into()),
            origin: ResolutionOrigin::Fallback,
        }
    }
}
