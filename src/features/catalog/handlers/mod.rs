pub mod mutation_handler;
pub mod page_handler;

pub use mutation_handler::{
    confirm_delete, import_services, submit_category, submit_service, submit_translation,
};
pub use page_handler::{
    catalog_page, change_language, close_modal, open_add_category, open_add_service,
    open_add_sub_service, open_category_translation, open_delete, open_edit_category,
    open_edit_service, open_import, open_service_translation, refresh, toggle_category,
    toggle_service,
};
