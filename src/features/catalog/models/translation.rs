use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Languages the marketplace publishes catalog text in
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Language {
    #[default]
    English,
    Amharic,
    Oromo,
}

impl Language {
    pub const ALL: [Language; 3] = [Language::English, Language::Amharic, Language::Oromo];

    /// Wire value used in query strings and payloads
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::English => "ENGLISH",
            Language::Amharic => "AMHARIC",
            Language::Oromo => "OROMO",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Language::English => "English",
            Language::Amharic => "Amharic",
            Language::Oromo => "Oromo",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "ENGLISH" => Ok(Language::English),
            "AMHARIC" => Ok(Language::Amharic),
            "OROMO" => Ok(Language::Oromo),
            other => Err(format!(
                "unsupported language '{}', expected ENGLISH, AMHARIC or OROMO",
                other
            )),
        }
    }
}

/// Translated name/description of a category or service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranslationText {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// Language code -> translated text. One entry per language.
pub type Translations = BTreeMap<String, TranslationText>;

/// Which kind of entity a translation belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OwnerKind {
    Category,
    Service,
}

impl OwnerKind {
    pub fn label(&self) -> &'static str {
        match self {
            OwnerKind::Category => "Category",
            OwnerKind::Service => "Service",
        }
    }
}
