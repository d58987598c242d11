use serde::Serialize;

use crate::features::catalog::dtos::{
    CategoryFormDto, FormFields, ServiceFormDto, TranslationFormDto,
};
use crate::features::catalog::models::{Category, Language, OwnerKind, Service};

/// The dialog currently open on the catalog page.
///
/// Each variant keeps the draft the admin is editing, so a failed
/// submission re-renders the form with their input and the error.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Modal {
    Category {
        title: String,
        editing: Option<i64>,
        draft: CategoryFormDto,
        error: Option<String>,
    },
    Service {
        title: String,
        editing: Option<i64>,
        parent_service_id: Option<i64>,
        draft: ServiceFormDto,
        error: Option<String>,
    },
    Translation {
        title: String,
        owner: OwnerKind,
        owner_id: i64,
        draft: TranslationFormDto,
        error: Option<String>,
    },
    ConfirmDelete {
        service_id: i64,
        service_name: Option<String>,
        error: Option<String>,
    },
    Import {
        error: Option<String>,
    },
}

impl Modal {
    fn error_slot(&mut self) -> &mut Option<String> {
        match self {
            Modal::Category { error, .. }
            | Modal::Service { error, .. }
            | Modal::Translation { error, .. }
            | Modal::ConfirmDelete { error, .. }
            | Modal::Import { error } => error,
        }
    }
}

/// Transient selection state of the catalog page
#[derive(Debug, Default)]
pub struct PageState {
    modal: Option<Modal>,
}

impl PageState {
    pub fn modal(&self) -> Option<&Modal> {
        self.modal.as_ref()
    }

    pub fn open_add_category(&mut self, lang: Language) {
        self.modal = Some(Modal::Category {
            title: "Add New Category".to_string(),
            editing: None,
            draft: CategoryFormDto::empty(lang),
            error: None,
        });
    }

    pub fn open_edit_category(&mut self, category: &Category, lang: Language) {
        self.modal = Some(Modal::Category {
            title: "Edit Category".to_string(),
            editing: category.key(),
            draft: CategoryFormDto::from_category(category, lang),
            error: None,
        });
    }

    /// New top-level service with its category pre-selected
    pub fn open_add_service(&mut self, category_id: i64, lang: Language) {
        self.modal = Some(Modal::Service {
            title: "Add New Service".to_string(),
            editing: None,
            parent_service_id: None,
            draft: ServiceFormDto::empty(lang, Some(category_id)),
            error: None,
        });
    }

    /// `current_parent` preselects the parent picker
    pub fn open_edit_service(
        &mut self,
        service: &Service,
        current_parent: Option<i64>,
        lang: Language,
    ) {
        self.modal = Some(Modal::Service {
            title: "Edit Service".to_string(),
            editing: service.key(),
            parent_service_id: None,
            draft: ServiceFormDto::from_service(service, current_parent, lang),
            error: None,
        });
    }

    pub fn open_add_sub_service(
        &mut self,
        parent_service_id: i64,
        category_id: Option<i64>,
        lang: Language,
    ) {
        self.modal = Some(Modal::Service {
            title: "Add Sub-Service".to_string(),
            editing: None,
            parent_service_id: Some(parent_service_id),
            draft: ServiceFormDto::empty(lang, category_id),
            error: None,
        });
    }

    pub fn open_category_translation(&mut self, category: &Category, owner_id: i64, lang: Language) {
        self.modal = Some(Modal::Translation {
            title: "Add Category Translation".to_string(),
            owner: OwnerKind::Category,
            owner_id,
            draft: TranslationFormDto {
                name: category.name.clone(),
                description: category.description.clone(),
                lang,
            },
            error: None,
        });
    }

    pub fn open_service_translation(&mut self, service: &Service, owner_id: i64, lang: Language) {
        self.modal = Some(Modal::Translation {
            title: "Add Service Translation".to_string(),
            owner: OwnerKind::Service,
            owner_id,
            draft: TranslationFormDto {
                name: service.name.clone(),
                description: service.description.clone(),
                lang,
            },
            error: None,
        });
    }

    /// Ask for confirmation; the service need not be in the local tree.
    pub fn open_delete(&mut self, service_id: i64, service_name: Option<String>) {
        self.modal = Some(Modal::ConfirmDelete {
            service_id,
            service_name,
            error: None,
        });
    }

    pub fn open_import(&mut self) {
        self.modal = Some(Modal::Import { error: None });
    }

    pub fn close(&mut self) {
        self.modal = None;
    }

    /// Keep the submitted category input if the category form is open.
    /// Runs before any parsing so a rejected submission redisplays it.
    pub fn record_category_input(&mut self, fields: &FormFields) {
        if let Some(Modal::Category { draft, .. }) = self.modal.as_mut() {
            *draft = CategoryFormDto::from_fields_lossy(fields, draft.lang);
        }
    }

    /// Keep the submitted service input if the service form is open
    pub fn record_service_input(&mut self, fields: &FormFields) {
        if let Some(Modal::Service { draft, .. }) = self.modal.as_mut() {
            *draft = ServiceFormDto::from_fields_lossy(fields, draft);
        }
    }

    /// Keep the submitted translation input if the translation form is open
    pub fn record_translation_input(&mut self, fields: &FormFields) {
        if let Some(Modal::Translation { draft, .. }) = self.modal.as_mut() {
            *draft = TranslationFormDto::from_fields_lossy(fields, draft.lang);
        }
    }

    /// Show a submission error inside the open dialog, leaving it open
    pub fn fail(&mut self, message: String) {
        match self.modal.as_mut() {
            Some(modal) => *modal.error_slot() = Some(message),
            None => tracing::debug!("Dropping error for closed dialog: {}", message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::{category, service};

    fn fields(pairs: &[(&str, &str)]) -> FormFields {
        let mut fields = FormFields::new();
        for (k, v) in pairs {
            fields.insert(*k, *v);
        }
        fields
    }

    #[test]
    fn test_failed_submit_keeps_modal_and_draft() {
        let mut page = PageState::default();
        page.open_add_category(Language::English);

        page.record_category_input(&fields(&[
            ("name", "Plumbing"),
            ("description", "Pipe work"),
            ("lang", "ENGLISH"),
            ("isMobileCategory", "on"),
        ]));
        page.fail("Category name already exists".to_string());

        let submitted = CategoryFormDto {
            name: "Plumbing".to_string(),
            description: "Pipe work".to_string(),
            lang: Language::English,
            is_mobile_category: true,
        };
        match page.modal() {
            Some(Modal::Category { draft, error, editing, .. }) => {
                assert_eq!(draft, &submitted);
                assert_eq!(error.as_deref(), Some("Category name already exists"));
                assert_eq!(*editing, None);
            }
            other => panic!("unexpected modal: {:?}", other),
        }
    }

    #[test]
    fn test_draft_of_other_kind_is_ignored() {
        let mut page = PageState::default();
        page.open_import();
        page.record_service_input(&fields(&[("name", "Leak Repair")]));
        assert_eq!(page.modal(), Some(&Modal::Import { error: None }));
    }

    #[test]
    fn test_edit_service_prefills_and_clears_parent() {
        let mut page = PageState::default();
        page.open_add_sub_service(10, Some(1), Language::English);
        page.open_edit_service(&service(11, "Pipe Replacement", 1), Some(10), Language::Amharic);

        match page.modal() {
            Some(Modal::Service {
                title,
                editing,
                parent_service_id,
                draft,
                ..
            }) => {
                assert_eq!(title, "Edit Service");
                assert_eq!(*editing, Some(11));
                assert_eq!(*parent_service_id, None);
                assert_eq!(draft.name, "Pipe Replacement");
                assert_eq!(draft.lang, Language::Amharic);
                assert_eq!(draft.category_id, Some(1));
                assert_eq!(draft.parent_service_id, Some(10));
            }
            other => panic!("unexpected modal: {:?}", other),
        }
    }

    #[test]
    fn test_unparseable_service_input_keeps_typed_text() {
        let mut page = PageState::default();
        page.open_add_service(1, Language::Oromo);
        page.record_service_input(&fields(&[
            ("name", "Leak Repair"),
            ("description", "Fix leaks"),
            ("serviceFee", "12,50"),
            ("lang", "klingon"),
        ]));
        page.fail("Service fee must be a valid number".to_string());

        match page.modal() {
            Some(Modal::Service { draft, error, .. }) => {
                assert_eq!(draft.name, "Leak Repair");
                assert_eq!(draft.description, "Fix leaks");
                assert_eq!(draft.lang, Language::Oromo);
                assert_eq!(draft.category_id, Some(1));
                assert!(error.is_some());
            }
            other => panic!("unexpected modal: {:?}", other),
        }
    }

    #[test]
    fn test_sub_service_remembers_parent() {
        let mut page = PageState::default();
        page.open_add_sub_service(10, Some(1), Language::English);

        match page.modal() {
            Some(Modal::Service {
                title,
                editing,
                parent_service_id,
                ..
            }) => {
                assert_eq!(title, "Add Sub-Service");
                assert_eq!(*editing, None);
                assert_eq!(*parent_service_id, Some(10));
            }
            other => panic!("unexpected modal: {:?}", other),
        }
    }

    #[test]
    fn test_translation_prefills_entity_text() {
        let mut page = PageState::default();
        let mut plumbing = category(1, "Plumbing");
        plumbing.description = "Pipe work".to_string();
        page.open_category_translation(&plumbing, 1, Language::Oromo);

        match page.modal() {
            Some(Modal::Translation { owner, owner_id, draft, .. }) => {
                assert_eq!(*owner, OwnerKind::Category);
                assert_eq!(*owner_id, 1);
                assert_eq!(draft.name, "Plumbing");
                assert_eq!(draft.description, "Pipe work");
                assert_eq!(draft.lang, Language::Oromo);
            }
            other => panic!("unexpected modal: {:?}", other),
        }
    }

    #[test]
    fn test_fail_without_modal_is_noop() {
        let mut page = PageState::default();
        page.fail("boom".to_string());
        assert!(page.modal().is_none());
    }
}
