use serde::{Deserialize, Serialize};
use tokio::fs;
use std::path::{Path, PathBuf};
use directories::ProjectDirs;

use crate::core::features::translator::fetcher::{DEFAULT_ENDPOINT, DEFAULT_USER_AGENT};
use crate::shared::error::{AppError, AppResult};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    pub translator: TranslatorSettings,
    pub menu: MenuSettings,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackend {
    Memory,
    Redb,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslatorSettings {
    pub endpoint: String,
    pub source_lang: String,
    pub target_lang: String,
    pub user_agent: String,
    /// No timeout unless set; a hung request stays pending.
    pub request_timeout_secs: Option<u64>,
    pub cache_backend: CacheBackend,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MenuSettings {
    pub restaurant_name: String,
    pub restaurant_name_en: Option<String>,
    pub currency_prefix: String,
}

impl Default for TranslatorSettings {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            source_lang: "id".to_string(),
            target_lang: "en".to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            request_timeout_secs: None,
            cache_backend: CacheBackend::Memory,
        }
    }
}

impl Default for MenuSettings {
    fn default() -> Self {
        Self {
            restaurant_name: "Warung Makan".to_string(),
            restaurant_name_en: None,
            currency_prefix: "Rp".to_string(),
        }
    }
}

impl AppSettings {
    pub fn get_settings_path() -> AppResult<PathBuf> {
        ProjectDirs::from("com", "menutranslator", "menu-translator")
            .map(|dirs| dirs.config_dir().join("settings.json"))
            .ok_or_else(|| AppError::Config("Failed to determine config directory".to_string()))
    }

    pub async fn load() -> AppResult<Self> {
        let path = Self::get_settings_path()?;
        Self::load_from(&path).await
    }

    /// Reads settings from `path`, writing defaults there if it does not exist.
    pub async fn load_from(path: &Path) -> AppResult<Self> {
        if !path.exists() {
            let settings = Self::default();
            settings.save_to(path).await?;
            return Ok(settings);
        }

        let content = fs::read_to_string(path).await
            .map_err(|e| AppError::Io(format!("Failed to read settings file: {}", e)))?;

        serde_json::from_str(&content)
            .map_err(|e| AppError::Config(format!("Failed to parse settings: {}", e)))
    }

    pub async fn save_to(&self, path: &Path) -> AppResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await
                .map_err(|e| AppError::Io(format!("Failed to create config directory: {}", e)))?;
        }

        let content = serde_json::to_string_pretty(self)?;

        fs::write(path, content).await
            .map_err(|e| AppError::Io(format!("Failed to write settings file: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_file_writes_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");

        let settings = AppSettings::load_from(&path).await.unwrap();
        assert!(path.exists());
        assert_eq!(settings.translator.source_lang, "id");
        assert_eq!(settings.translator.target_lang, "en");
        assert_eq!(settings.translator.request_timeout_secs, None);
        assert_eq!(settings.translator.cache_backend, CacheBackend::Memory);
    }

    #[tokio::test]
    async fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(
            &path,
            r#"{"translator": {"cache_backend": "redb", "request_timeout_secs": 10}}"#,
        )
        .unwrap();

        let settings = AppSettings::load_from(&path).await.unwrap();
        assert_eq!(settings.translator.cache_backend, CacheBackend::Redb);
        assert_eq!(settings.translator.request_timeout_secs, Some(10));
        assert_eq!(settings.translator.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(settings.menu.currency_prefix, "Rp");
    }

    #[tokio::test]
    async fn test_invalid_json_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = AppSettings::load_from(&path).await.unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }

    #[tokio::test]
    async fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");

        let mut settings = AppSettings::default();
        settings.menu.restaurant_name_en = Some("Corner Eatery".to_string());
        settings.save_to(&path).await.unwrap();

        let loaded = AppSettings::load_from(&path).await.unwrap();
        assert_eq!(loaded.menu.restaurant_name_en.as_deref(), Some("Corner Eatery"));
    }
}
