use serde::{Deserialize, Serialize};

use super::{Language, Service, TranslationText, Translations};

/// Top-level grouping of services
///
/// The API identifies categories by `id` on some endpoints and `categoryId`
/// on others; `key()` resolves whichever is present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<i64>,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub is_mobile_category: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translations: Option<Translations>,
    #[serde(default)]
    pub services: Vec<Service>,
}

impl Category {
    /// Identity of the category, whichever key the API used
    pub fn key(&self) -> Option<i64> {
        self.id.or(self.category_id)
    }

    pub fn matches(&self, id: i64) -> bool {
        self.id == Some(id) || self.category_id == Some(id)
    }

    pub fn translation(&self, lang: Language) -> Option<&TranslationText> {
        self.translations.as_ref()?.get(lang.as_str())
    }
}
