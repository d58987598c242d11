use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;
use validator::{Validate, ValidationError};

use crate::core::error::{AppError, Result};
use crate::features::catalog::models::{Category, Language, Service};
use crate::modules::http::{FileUpload, MultipartForm};

/// Text fields of a submitted HTML form
#[derive(Debug, Clone, Default)]
pub struct FormFields(HashMap<String, String>);

impl From<HashMap<String, String>> for FormFields {
    fn from(fields: HashMap<String, String>) -> Self {
        Self(fields)
    }
}

impl FormFields {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.insert(name.into(), value.into());
    }

    /// Trimmed value, empty string when absent
    pub fn text(&self, name: &str) -> String {
        self.0
            .get(name)
            .map(|v| v.trim().to_string())
            .unwrap_or_default()
    }

    /// Trimmed value, `None` when absent or blank
    pub fn optional(&self, name: &str) -> Option<String> {
        Some(self.text(name)).filter(|v| !v.is_empty())
    }

    /// HTML checkboxes submit "on" (or nothing)
    pub fn flag(&self, name: &str) -> bool {
        matches!(
            self.text(name).to_lowercase().as_str(),
            "on" | "true" | "1" | "yes"
        )
    }

    pub fn parse_optional<T: FromStr>(&self, name: &str, label: &str) -> Result<Option<T>> {
        self.optional(name)
            .map(|raw| {
                raw.parse::<T>()
                    .map_err(|_| AppError::Validation(format!("{} must be a valid number", label)))
            })
            .transpose()
    }

    /// Parsed value, `None` when absent or unparseable
    pub fn parse_lossy<T: FromStr>(&self, name: &str) -> Option<T> {
        self.optional(name).and_then(|raw| raw.parse::<T>().ok())
    }

    pub fn language(&self, name: &str) -> Result<Language> {
        match self.optional(name) {
            Some(raw) => raw.parse::<Language>().map_err(AppError::Validation),
            None => Err(AppError::Validation("Language is required".to_string())),
        }
    }
}

fn validate_fee(fee: &Decimal) -> std::result::Result<(), ValidationError> {
    if fee.is_sign_negative() && !fee.is_zero() {
        return Err(ValidationError::new("negative_fee")
            .with_message("Service fee must not be negative".into()));
    }
    Ok(())
}

/// Category create/edit form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CategoryFormDto {
    #[validate(length(min = 1, max = 255, message = "Name is required (max 255 characters)"))]
    pub name: String,

    #[validate(length(max = 2000, message = "Description must not exceed 2000 characters"))]
    pub description: String,

    pub lang: Language,

    pub is_mobile_category: bool,
}

impl CategoryFormDto {
    pub fn empty(lang: Language) -> Self {
        Self {
            name: String::new(),
            description: String::new(),
            lang,
            is_mobile_category: false,
        }
    }

    /// Prefill from an existing category
    pub fn from_category(category: &Category, lang: Language) -> Self {
        Self {
            name: category.name.clone(),
            description: category.description.clone(),
            lang,
            is_mobile_category: category.is_mobile_category,
        }
    }

    pub fn from_fields(fields: &FormFields) -> Result<Self> {
        Ok(Self {
            lang: fields.language("lang")?,
            ..Self::from_fields_lossy(fields, Language::English)
        })
    }

    /// Whatever the admin typed, for redisplay; never fails
    pub fn from_fields_lossy(fields: &FormFields, fallback_lang: Language) -> Self {
        Self {
            name: fields.text("name"),
            description: fields.text("description"),
            lang: fields.language("lang").unwrap_or(fallback_lang),
            is_mobile_category: fields.flag("isMobileCategory"),
        }
    }

    pub fn to_multipart(&self, icon: Option<FileUpload>) -> MultipartForm {
        let mut form = MultipartForm::new()
            .text("name", &self.name)
            .text("description", &self.description)
            .text("lang", self.lang.as_str())
            .text("isMobileCategory", self.is_mobile_category.to_string());
        if let Some(icon) = icon {
            form = form.file("icon", icon);
        }
        form
    }
}

/// Service create/edit form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ServiceFormDto {
    #[validate(length(min = 1, max = 255, message = "Name is required (max 255 characters)"))]
    pub name: String,

    #[validate(length(max = 2000, message = "Description must not exceed 2000 characters"))]
    pub description: String,

    pub lang: Language,

    #[validate(custom(function = "validate_fee"))]
    pub service_fee: Option<Decimal>,

    #[validate(regex(
        path = "*crate::shared::validation::DURATION_REGEX",
        message = "Estimated duration must use the HH:MM format"
    ))]
    pub estimated_duration: Option<String>,

    pub category_id: Option<i64>,

    /// Parent picked in the form; sent by the coordinator, not by `to_multipart`
    pub parent_service_id: Option<i64>,
}

impl ServiceFormDto {
    pub fn empty(lang: Language, category_id: Option<i64>) -> Self {
        Self {
            name: String::new(),
            description: String::new(),
            lang,
            service_fee: None,
            estimated_duration: None,
            category_id,
            parent_service_id: None,
        }
    }

    /// Prefill from an existing service and its current parent
    pub fn from_service(service: &Service, parent_service_id: Option<i64>, lang: Language) -> Self {
        Self {
            name: service.name.clone(),
            description: service.description.clone(),
            lang,
            service_fee: service.service_fee,
            estimated_duration: service.estimated_duration.clone(),
            category_id: service.category_id,
            parent_service_id,
        }
    }

    pub fn from_fields(fields: &FormFields) -> Result<Self> {
        Ok(Self {
            name: fields.text("name"),
            description: fields.text("description"),
            lang: fields.language("lang")?,
            service_fee: fields.parse_optional::<Decimal>("serviceFee", "Service fee")?,
            estimated_duration: fields.optional("estimatedDuration"),
            category_id: fields.parse_optional::<i64>("categoryId", "Category")?,
            parent_service_id: fields.parse_optional::<i64>("parentServiceId", "Parent service")?,
        })
    }

    /// Whatever the admin typed, for redisplay. Values that do not parse are
    /// dropped; a missing category falls back to the one the dialog opened with.
    pub fn from_fields_lossy(fields: &FormFields, previous: &Self) -> Self {
        Self {
            name: fields.text("name"),
            description: fields.text("description"),
            lang: fields.language("lang").unwrap_or(previous.lang),
            service_fee: fields.parse_lossy("serviceFee"),
            estimated_duration: fields.optional("estimatedDuration"),
            category_id: fields.parse_lossy("categoryId").or(previous.category_id),
            parent_service_id: fields.parse_lossy("parentServiceId"),
        }
    }

    pub fn to_multipart(&self, icon: Option<FileUpload>) -> MultipartForm {
        let mut form = MultipartForm::new()
            .text("name", &self.name)
            .text("description", &self.description)
            .text("lang", self.lang.as_str());
        if let Some(fee) = self.service_fee {
            form = form.text("serviceFee", fee.to_string());
        }
        if let Some(duration) = &self.estimated_duration {
            form = form.text("estimatedDuration", duration);
        }
        if let Some(category_id) = self.category_id {
            form = form.text("categoryId", category_id.to_string());
        }
        if let Some(icon) = icon {
            form = form.file("icon", icon);
        }
        form
    }
}

/// Translation submitted for a category or service (JSON body)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct TranslationFormDto {
    #[validate(length(min = 1, max = 255, message = "Name is required (max 255 characters)"))]
    pub name: String,

    #[validate(length(max = 2000, message = "Description must not exceed 2000 characters"))]
    #[serde(default)]
    pub description: String,

    pub lang: Language,
}

impl TranslationFormDto {
    pub fn from_fields(fields: &FormFields) -> Result<Self> {
        Ok(Self {
            lang: fields.language("lang")?,
            ..Self::from_fields_lossy(fields, Language::English)
        })
    }

    /// Whatever the admin typed, for redisplay; never fails
    pub fn from_fields_lossy(fields: &FormFields, fallback_lang: Language) -> Self {
        Self {
            name: fields.text("name"),
            description: fields.text("description"),
            lang: fields.language("lang").unwrap_or(fallback_lang),
        }
    }
}
