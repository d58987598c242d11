use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{Language, TranslationText, Translations};

/// Bookable offering; may contain sub-services to any depth
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_id: Option<i64>,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document: Option<String>,
    #[serde(default)]
    pub service_fee: Option<Decimal>,
    #[serde(default)]
    pub estimated_duration: Option<String>,
    /// Owning category; sub-services inherit their root's category
    #[serde(default)]
    pub category_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub technician_count: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub booking_count: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translations: Option<Translations>,
    #[serde(default)]
    pub services: Vec<Service>,
}

impl Service {
    /// Identity of the service, whichever key the API used
    pub fn key(&self) -> Option<i64> {
        self.id.or(self.service_id)
    }

    pub fn matches(&self, id: i64) -> bool {
        self.id == Some(id) || self.service_id == Some(id)
    }

    pub fn has_children(&self) -> bool {
        !self.services.is_empty()
    }

    pub fn translation(&self, lang: Language) -> Option<&TranslationText> {
        self.translations.as_ref()?.get(lang.as_str())
    }
}
