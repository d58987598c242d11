mod catalog_dto;

pub use catalog_dto::{CategoryFormDto, FormFields, ServiceFormDto, TranslationFormDto};
