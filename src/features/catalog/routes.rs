use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::features::catalog::dashboard::CatalogDashboard;
use crate::features::catalog::handlers::{
    catalog_page, change_language, close_modal, confirm_delete, import_services,
    open_add_category, open_add_service, open_add_sub_service, open_category_translation,
    open_delete, open_edit_category, open_edit_service, open_import, open_service_translation,
    refresh, submit_category, submit_service, submit_translation, toggle_category,
    toggle_service,
};
use crate::shared::constants::{MAX_ICON_SIZE, MAX_IMPORT_FILE_SIZE};

/// Room for the text fields and boundaries around an uploaded file
const MULTIPART_OVERHEAD: usize = 1024 * 1024;

/// Create routes for the catalog dashboard
pub fn routes(dashboard: Arc<CatalogDashboard>) -> Router {
    Router::new()
        .route("/catalog", get(catalog_page))
        .route("/catalog/refresh", post(refresh))
        .route("/catalog/language", post(change_language))
        .route("/catalog/modal/close", post(close_modal))
        .route(
            "/catalog/import",
            get(open_import)
                .post(import_services)
                .layer(DefaultBodyLimit::max(MAX_IMPORT_FILE_SIZE + MULTIPART_OVERHEAD)),
        )
        .route(
            "/catalog/categories",
            post(submit_category).layer(DefaultBodyLimit::max(MAX_ICON_SIZE + MULTIPART_OVERHEAD)),
        )
        .route("/catalog/categories/new", get(open_add_category))
        .route("/catalog/categories/{id}/edit", get(open_edit_category))
        .route("/catalog/categories/{id}/toggle", post(toggle_category))
        .route("/catalog/categories/{id}/services/new", get(open_add_service))
        .route(
            "/catalog/categories/{id}/translations/new",
            get(open_category_translation),
        )
        .route(
            "/catalog/services",
            post(submit_service).layer(DefaultBodyLimit::max(MAX_ICON_SIZE + MULTIPART_OVERHEAD)),
        )
        .route("/catalog/services/delete", post(confirm_delete))
        .route("/catalog/services/{id}/edit", get(open_edit_service))
        .route("/catalog/services/{id}/toggle", post(toggle_service))
        .route("/catalog/services/{id}/children/new", get(open_add_sub_service))
        .route(
            "/catalog/services/{id}/translations/new",
            get(open_service_translation),
        )
        .route("/catalog/services/{id}/delete", get(open_delete))
        .route("/catalog/translations", post(submit_translation))
        .with_state(dashboard)
}
