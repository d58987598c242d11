use axum::{
    extract::{Form, Path, Query, State},
    response::{Html, Redirect, Response},
};
use serde::Deserialize;
use std::sync::Arc;

use crate::core::error::AppError;
use crate::features::catalog::dashboard::{redirect_to_page, redirect_with_notice, CatalogDashboard};
use crate::features::catalog::models::Language;
use crate::features::catalog::services::NodeKey;
use crate::shared::constants::CATALOG_PAGE_PATH;

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub notice: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LanguageForm {
    pub lang: String,
}

/// Catalog page; the first visit triggers the initial fetch.
pub async fn catalog_page(
    State(dashboard): State<Arc<CatalogDashboard>>,
    Query(query): Query<PageQuery>,
) -> Result<Html<String>, AppError> {
    dashboard.query().ensure_loaded().await;
    dashboard.render(query.notice).await
}

/// Manual refresh and "Try Again"
pub async fn refresh(State(dashboard): State<Arc<CatalogDashboard>>) -> Response {
    if let Err(e) = dashboard.query().fetch().await {
        tracing::debug!("Refresh failed, error state rendered: {}", e);
    }
    redirect_to_page()
}

pub async fn change_language(
    State(dashboard): State<Arc<CatalogDashboard>>,
    Form(form): Form<LanguageForm>,
) -> Response {
    let language = match form.lang.parse::<Language>() {
        Ok(language) => language,
        Err(e) => return redirect_with_notice(&e),
    };
    if let Err(e) = dashboard.query().set_language(language).await {
        tracing::debug!("Catalog fetch for {} failed: {}", language, e);
    }
    redirect_to_page()
}

pub async fn toggle_category(
    State(dashboard): State<Arc<CatalogDashboard>>,
    Path(id): Path<i64>,
) -> Redirect {
    dashboard.query().toggle_expansion(NodeKey::Category(id)).await;
    Redirect::to(&format!("{}#category-{}", CATALOG_PAGE_PATH, id))
}

pub async fn toggle_service(
    State(dashboard): State<Arc<CatalogDashboard>>,
    Path(id): Path<i64>,
) -> Redirect {
    dashboard.query().toggle_expansion(NodeKey::Service(id)).await;
    Redirect::to(&format!("{}#service-{}", CATALOG_PAGE_PATH, id))
}

pub async fn open_add_category(State(dashboard): State<Arc<CatalogDashboard>>) -> Response {
    let language = dashboard.query().language().await;
    dashboard.page().lock().await.open_add_category(language);
    redirect_to_page()
}

pub async fn open_edit_category(
    State(dashboard): State<Arc<CatalogDashboard>>,
    Path(id): Path<i64>,
) -> Response {
    let language = dashboard.query().language().await;
    let Some(category) = dashboard
        .query()
        .read(|tree| tree.find_category(id).cloned())
        .await
    else {
        return redirect_with_notice(&format!("Category {} not found", id));
    };
    dashboard
        .page()
        .lock()
        .await
        .open_edit_category(&category, language);
    redirect_to_page()
}

pub async fn open_add_service(
    State(dashboard): State<Arc<CatalogDashboard>>,
    Path(category_id): Path<i64>,
) -> Response {
    let language = dashboard.query().language().await;
    dashboard
        .page()
        .lock()
        .await
        .open_add_service(category_id, language);
    redirect_to_page()
}

pub async fn open_category_translation(
    State(dashboard): State<Arc<CatalogDashboard>>,
    Path(id): Path<i64>,
) -> Response {
    let language = dashboard.query().language().await;
    let Some(category) = dashboard
        .query()
        .read(|tree| tree.find_category(id).cloned())
        .await
    else {
        return redirect_with_notice(&format!("Category {} not found", id));
    };
    dashboard
        .page()
        .lock()
        .await
        .open_category_translation(&category, id, language);
    redirect_to_page()
}

pub async fn open_edit_service(
    State(dashboard): State<Arc<CatalogDashboard>>,
    Path(id): Path<i64>,
) -> Response {
    let language = dashboard.query().language().await;
    let Some((service, parent)) = dashboard
        .query()
        .read(|tree| tree.find_service(id).map(|s| (s.clone(), tree.parent_of(id))))
        .await
    else {
        return redirect_with_notice(&format!("Service {} not found", id));
    };
    dashboard
        .page()
        .lock()
        .await
        .open_edit_service(&service, parent, language);
    redirect_to_page()
}

pub async fn open_add_sub_service(
    State(dashboard): State<Arc<CatalogDashboard>>,
    Path(parent_id): Path<i64>,
) -> Response {
    let language = dashboard.query().language().await;
    let Some(category_id) = dashboard
        .query()
        .read(|tree| tree.find_service(parent_id).map(|s| s.category_id))
        .await
    else {
        return redirect_with_notice(&format!("Service {} not found", parent_id));
    };
    dashboard
        .page()
        .lock()
        .await
        .open_add_sub_service(parent_id, category_id, language);
    redirect_to_page()
}

pub async fn open_service_translation(
    State(dashboard): State<Arc<CatalogDashboard>>,
    Path(id): Path<i64>,
) -> Response {
    let language = dashboard.query().language().await;
    let Some(service) = dashboard
        .query()
        .read(|tree| tree.find_service(id).cloned())
        .await
    else {
        return redirect_with_notice(&format!("Service {} not found", id));
    };
    dashboard
        .page()
        .lock()
        .await
        .open_service_translation(&service, id, language);
    redirect_to_page()
}

/// Deletion is confirmed even for services missing from the local tree.
pub async fn open_delete(
    State(dashboard): State<Arc<CatalogDashboard>>,
    Path(id): Path<i64>,
) -> Response {
    let name = dashboard
        .query()
        .read(|tree| tree.find_service(id).map(|s| s.name.clone()))
        .await;
    dashboard.page().lock().await.open_delete(id, name);
    redirect_to_page()
}

pub async fn open_import(State(dashboard): State<Arc<CatalogDashboard>>) -> Response {
    dashboard.page().lock().await.open_import();
    redirect_to_page()
}

pub async fn close_modal(State(dashboard): State<Arc<CatalogDashboard>>) -> Response {
    dashboard.page().lock().await.close();
    redirect_to_page()
}
