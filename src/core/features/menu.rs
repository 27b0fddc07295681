//! Menu feature
//!
//! Menu items as delivered by the backend and their customer-facing,
//! language-resolved form.

use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};
use tokio::fs;
use ts_rs::TS;

use super::translator::binding::{BindingInputs, DisplayBinding};
use super::translator::resolver::{resolve_text, TextDecision};
use super::translator::types::{DisplayLanguage, ResolutionResult, TranslatableText};
use super::translator::AutoTranslator;
use crate::shared::error::{AppError, AppResult};
use crate::shared::settings::MenuSettings;

/// Menu row; accepts both `name_en` and `nameEn` field spellings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuItem {
    pub id: String,
    pub name: String,
    #[serde(default, alias = "nameEn")]
    pub name_en: Option<String>,
    pub price: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default, alias = "descriptionEn")]
    pub description_en: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub category: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub order: i32,
}

/// Backend rows carry `null` for unset columns.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

impl MenuItem {
    pub fn name_key(&self) -> String {
        format!("menu_{}_name", self.id)
    }

    pub fn description_key(&self) -> String {
        format!("menu_{}_description", self.id)
    }

    pub fn name_inputs(&self, language: DisplayLanguage) -> BindingInputs {
        BindingInputs::new(
            TranslatableText::with_target(self.name.clone(), self.name_en.clone()),
            language,
        )
        .with_cache_key(self.name_key())
    }

    pub fn description_inputs(&self, language: DisplayLanguage) -> BindingInputs {
        BindingInputs::new(
            TranslatableText::with_target(self.description.clone(), self.description_en.clone()),
            language,
        )
        .with_cache_key(self.description_key())
    }
}

/// Menu item as shown on a menu card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct LocalizedMenuItem {
    pub id: String,
    pub name: String,
    pub description: String,
    pub category: String,
    pub price: u64,
    pub price_label: String,
    pub image: Option<String>,
    pub is_translating: bool,
    pub translation_error: Option<String>,
}

/// `Rp 25.000` style price with dot thousands separators.
pub fn format_price(price: u64, prefix: &str) -> String {
    let digits = price.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }
    format!("{} {}", prefix, grouped)
}

pub async fn load_menu(path: &Path) -> AppResult<Vec<MenuItem>> {
    let content = fs::read_to_string(path).await
        .map_err(|e| AppError::Io(format!("Failed to read menu file {}: {}", path.display(), e)))?;
    let mut items: Vec<MenuItem> = serde_json::from_str(&content)
        .map_err(|e| AppError::Validation(format!("Failed to parse menu: {}", e)))?;
    items.sort_by_key(|item| item.order);
    Ok(items)
}

pub struct MenuLocalizer {
    translator: AutoTranslator,
    settings: MenuSettings,
}

impl MenuLocalizer {
    pub fn new(translator: AutoTranslator, settings: MenuSettings) -> Self {
        Self { translator, settings }
    }

    pub fn translator(&self) -> &AutoTranslator {
        &self.translator
    }

    pub async fn localize(&self, item: &MenuItem, language: DisplayLanguage) -> LocalizedMenuItem {
        let (name, description) = tokio::join!(
            self.translator.resolve(item.name_inputs(language)),
            self.translator.resolve(item.description_inputs(language)),
        );
        self.assemble(item, &name, &description)
    }

    pub async fn localize_all(&self, items: &[MenuItem], language: DisplayLanguage) -> Vec<LocalizedMenuItem> {
        let mut localized = Vec::with_capacity(items.len());
        for item in items {
            localized.push(self.localize(item, language).await);
        }
        localized
    }

    /// Header text. Only the configured English name is used; the header is
    /// never sent to the translation service.
    pub fn restaurant_name(&self, language: DisplayLanguage) -> String {
        match resolve_text(
            &self.settings.restaurant_name,
            self.settings.restaurant_name_en.as_deref(),
            language,
        ) {
            TextDecision::Display(name) => name,
            TextDecision::Pending => self.settings.restaurant_name.clone(),
        }
    }

    fn assemble(
        &self,
        item: &MenuItem,
        name: &ResolutionResult,
        description: &ResolutionResult,
    ) -> LocalizedMenuItem {
        LocalizedMenuItem {
            id: item.id.clone(),
            name: name.display_text.clone(),
            description: description.display_text.clone(),
            category: item.category.clone(),
            price: item.price,
            price_label: format_price(item.price, &self.settings.currency_prefix),
            image: item.image.clone(),
            is_translating: name.is_translating || description.is_translating,
            translation_error: name.error.clone().or_else(|| description.error.clone()),
        }
    }
}

/// Live name and description bindings for one rendered menu card.
pub struct MenuCardBindings {
    name: DisplayBinding,
    description: DisplayBinding,
}

impl MenuCardBindings {
    pub fn new(translator: &AutoTranslator) -> Self {
        Self {
            name: translator.bind(),
            description: translator.bind(),
        }
    }

    pub fn update(&mut self, item: &MenuItem, language: DisplayLanguage) -> (ResolutionResult, ResolutionResult) {
        (
            self.name.update(item.name_inputs(language)),
            self.description.update(item.description_inputs(language)),
        )
    }

    pub fn is_translating(&self) -> bool {
        self.name.snapshot().is_translating || self.description.snapshot().is_translating
    }

    pub async fn settled(&self) -> (ResolutionResult, ResolutionResult) {
        tokio::join!(self.name.settled(), self.description.settled())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::features::translator::cache::SessionCache;
    use crate::core::features::translator::fetcher::TranslationFetcher;
    use crate::core::features::translator::types::{LanguagePair, TranslationError, TranslationResult};
    use async_trait::async_trait;
    use isolang::Language;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    struct DictionaryFetcher {
        words: HashMap<&'static str, &'static str>,
        requested: Mutex<Vec<String>>,
    }

    impl DictionaryFetcher {
        fn new() -> Arc<Self> {
            let words = HashMap::from([
                ("Nasi Goreng", "Fried Rice"),
                ("Nasi goreng spesial dengan telur", "Special fried rice with egg"),
                ("Warung Makan", "Eatery"),
            ]);
            Arc::new(Self {
                words,
                requested: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl TranslationFetcher for DictionaryFetcher {
        async fn translate(&self, text: &str, _source: Language, _target: Language) -> TranslationResult<String> {
            self.requested.lock().unwrap().push(text.to_string());
            self.words
                .get(text)
                .map(|t| t.to_string())
                .ok_or_else(|| TranslationError::Network("offline".to_string()))
        }
    }

    fn localizer(fetcher: Arc<DictionaryFetcher>) -> MenuLocalizer {
        let translator = AutoTranslator::new(SessionCache::shared(), fetcher, LanguagePair::default());
        MenuLocalizer::new(translator, MenuSettings::default())
    }

    fn nasi_goreng() -> MenuItem {
        MenuItem {
            id: "1".to_string(),
            name: "Nasi Goreng".to_string(),
            name_en: None,
            price: 25000,
            description: "Nasi goreng spesial dengan telur".to_string(),
            description_en: None,
            category: "Makanan".to_string(),
            image: None,
            order: 0,
        }
    }

    #[test]
    fn test_format_price() {
        assert_eq!(format_price(25000, "Rp"), "Rp 25.000");
        assert_eq!(format_price(1250000, "Rp"), "Rp 1.250.000");
        assert_eq!(format_price(500, "Rp"), "Rp 500");
        assert_eq!(format_price(0, "Rp"), "Rp 0");
    }

    #[test]
    fn test_menu_item_accepts_both_field_spellings() {
        let snake: MenuItem = serde_json::from_str(
            r#"{"id": "1", "name": "Es Teh", "name_en": "Iced Tea", "price": 5000}"#,
        )
        .unwrap();
        let camel: MenuItem = serde_json::from_str(
            r#"{"id": "1", "name": "Es Teh", "nameEn": "Iced Tea", "price": 5000}"#,
        )
        .unwrap();
        assert_eq!(snake.name_en.as_deref(), Some("Iced Tea"));
        assert_eq!(snake, camel);
        assert_eq!(snake.description, "");
    }

    #[test]
    fn test_cache_keys_per_item() {
        let item = nasi_goreng();
        assert_eq!(item.name_key(), "menu_1_name");
        assert_eq!(item.description_key(), "menu_1_description");
    }

    #[tokio::test]
    async fn test_localize_fetches_name_and_description() {
        let fetcher = DictionaryFetcher::new();
        let localizer = localizer(fetcher.clone());

        let localized = localizer.localize(&nasi_goreng(), DisplayLanguage::Target).await;
        assert_eq!(localized.name, "Fried Rice");
        assert_eq!(localized.description, "Special fried rice with egg");
        assert_eq!(localized.price_label, "Rp 25.000");
        assert!(!localized.is_translating);
        assert!(localized.translation_error.is_none());

        let cache = localizer.translator().cache();
        assert_eq!(cache.get("menu_1_name"), Some("Fried Rice".to_string()));
    }

    #[tokio::test]
    async fn test_localize_prefers_english_fields() {
        let fetcher = DictionaryFetcher::new();
        let localizer = localizer(fetcher.clone());
        let mut item = nasi_goreng();
        item.name_en = Some("House Fried Rice".to_string());
        item.description_en = Some("With a fried egg".to_string());

        let localized = localizer.localize(&item, DisplayLanguage::Target).await;
        assert_eq!(localized.name, "House Fried Rice");
        assert_eq!(localized.description, "With a fried egg");
        assert!(fetcher.requested.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_localize_source_language() {
        let fetcher = DictionaryFetcher::new();
        let localizer = localizer(fetcher.clone());

        let localized = localizer.localize(&nasi_goreng(), DisplayLanguage::Source).await;
        assert_eq!(localized.name, "Nasi Goreng");
        assert!(fetcher.requested.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_localize_failure_keeps_source() {
        let fetcher = DictionaryFetcher::new();
        let localizer = localizer(fetcher);
        let mut item = nasi_goreng();
        item.name = "Rendang".to_string();

        let localized = localizer.localize(&item, DisplayLanguage::Target).await;
        assert_eq!(localized.name, "Rendang");
        assert!(localized.translation_error.is_some());
    }

    #[tokio::test]
    async fn test_empty_description_not_sent() {
        let fetcher = DictionaryFetcher::new();
        let localizer = localizer(fetcher.clone());
        let mut item = nasi_goreng();
        item.description = String::new();

        let localized = localizer.localize(&item, DisplayLanguage::Target).await;
        assert_eq!(localized.description, "");
        assert_eq!(*fetcher.requested.lock().unwrap(), vec!["Nasi Goreng".to_string()]);
    }

    #[test]
    fn test_restaurant_name_is_not_fetched() {
        let fetcher = DictionaryFetcher::new();
        let localizer = localizer(fetcher.clone());
        assert_eq!(localizer.restaurant_name(DisplayLanguage::Source), "Warung Makan");
        assert_eq!(localizer.restaurant_name(DisplayLanguage::Target), "Warung Makan");
        assert!(fetcher.requested.lock().unwrap().is_empty());
    }

    #[test]
    fn test_restaurant_name_uses_configured_english() {
        let fetcher = DictionaryFetcher::new();
        let translator = AutoTranslator::new(SessionCache::shared(), fetcher.clone(), LanguagePair::default());
        let settings = MenuSettings {
            restaurant_name_en: Some("Corner Eatery".to_string()),
            ..MenuSettings::default()
        };
        let localizer = MenuLocalizer::new(translator, settings);

        assert_eq!(localizer.restaurant_name(DisplayLanguage::Target), "Corner Eatery");
        assert_eq!(localizer.restaurant_name(DisplayLanguage::Source), "Warung Makan");
        assert!(fetcher.requested.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_card_bindings_follow_language() {
        let fetcher = DictionaryFetcher::new();
        let translator = AutoTranslator::new(SessionCache::shared(), fetcher, LanguagePair::default());
        let mut card = MenuCardBindings::new(&translator);
        let item = nasi_goreng();

        let (name, _) = card.update(&item, DisplayLanguage::Target);
        assert!(name.is_translating);
        assert!(card.is_translating());

        let (name, description) = card.settled().await;
        assert_eq!(name.display_text, "Fried Rice");
        assert_eq!(description.display_text, "Special fried rice with egg");
        assert!(!card.is_translating());

        let (name, _) = card.update(&item, DisplayLanguage::Source);
        assert_eq!(name.display_text, "Nasi Goreng");
    }

    #[tokio::test]
    async fn test_load_menu_sorts_by_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("menu.json");
        std::fs::write(
            &path,
            r#"[
                {"id": "2", "name": "Es Teh", "price": 5000, "order": 2},
                {"id": "1", "name": "Nasi Goreng", "price": 25000, "order": 1}
            ]"#,
        )
        .unwrap();

        let items = load_menu(&path).await.unwrap();
        assert_eq!(items[0].id, "1");
        assert_eq!(items[1].id, "2");
    }

    #[tokio::test]
    async fn test_load_menu_reads_null_columns_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("menu.json");
        std::fs::write(
            &path,
            r#"[
                {"id": "2", "name": "Es Teh", "price": 5000, "category": "Minuman", "order": 1},
                {"id": "1", "name": "Nasi Goreng", "price": 25000,
                 "description": null, "category": null, "order": null, "nameEn": null}
            ]"#,
        )
        .unwrap();

        let items = load_menu(&path).await.unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].id, "1");
        assert_eq!(items[0].description, "");
        assert_eq!(items[0].category, "");
        assert_eq!(items[0].order, 0);
        assert_eq!(items[0].name_en, None);
        assert_eq!(items[1].category, "Minuman");
    }
}
