mod category;
mod service;
mod translation;

pub use category::Category;
pub use service::Service;
pub use translation::{Language, OwnerKind, TranslationText, Translations};
