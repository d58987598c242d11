use axum::response::{Html, IntoResponse, Redirect, Response};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::core::error::{AppError, Result};
use crate::features::catalog::services::{CatalogQuery, MutationCoordinator};
use crate::features::catalog::views::{
    build_tree_view, parent_options, CatalogPageContext, CatalogRenderer, CategoryOption,
    LanguageOption, Modal, PageState,
};
use crate::modules::http::Session;
use crate::shared::constants::CATALOG_PAGE_PATH;

/// State shared by every catalog route: the query, the coordinator and the
/// transient page state (open dialog) of the single admin console.
pub struct CatalogDashboard {
    query: Arc<CatalogQuery>,
    coordinator: Arc<MutationCoordinator>,
    session: Arc<Session>,
    renderer: CatalogRenderer,
    page: Mutex<PageState>,
    file_base_url: String,
}

impl CatalogDashboard {
    pub fn new(
        query: Arc<CatalogQuery>,
        coordinator: Arc<MutationCoordinator>,
        session: Arc<Session>,
        renderer: CatalogRenderer,
        file_base_url: String,
    ) -> Self {
        Self {
            query,
            coordinator,
            session,
            renderer,
            page: Mutex::new(PageState::default()),
            file_base_url,
        }
    }

    pub fn query(&self) -> &CatalogQuery {
        &self.query
    }

    pub fn coordinator(&self) -> &MutationCoordinator {
        &self.coordinator
    }

    pub fn page(&self) -> &Mutex<PageState> {
        &self.page
    }

    /// Render the whole page from the current tree, dialog and pending flags.
    pub async fn render(&self, notice: Option<String>) -> Result<Html<String>> {
        let language = self.query.language().await;
        let modal = self.page.lock().await.modal().cloned();
        let service_form = match &modal {
            Some(Modal::Service { editing, .. }) => Some(*editing),
            _ => None,
        };

        let (loaded, error, categories, category_options, parents, fetched_at) = self
            .query
            .read(|tree| {
                let options = tree
                    .categories()
                    .iter()
                    .filter_map(|c| {
                        c.key().map(|id| CategoryOption {
                            id,
                            name: c.name.clone(),
                        })
                    })
                    .collect::<Vec<_>>();
                (
                    tree.is_loaded(),
                    tree.error().map(str::to_string),
                    build_tree_view(tree, &self.file_base_url),
                    options,
                    service_form
                        .map(|editing| parent_options(tree, editing))
                        .unwrap_or_default(),
                    tree.snapshot()
                        .map(|s| s.fetched_at.format("%Y-%m-%d %H:%M:%S UTC").to_string()),
                )
            })
            .await;

        let ctx = CatalogPageContext {
            language: language.as_str(),
            languages: LanguageOption::all(language),
            loaded,
            error,
            categories,
            category_options,
            parent_options: parents,
            modal,
            pending: self.coordinator.pending_status(),
            notice: notice.filter(|n| !n.trim().is_empty()),
            session_active: self.session.is_authenticated(),
            fetched_at,
        };

        self.renderer.render_catalog(&ctx).map(Html)
    }

    /// Close the dialog and send the browser back to the page.
    pub async fn finish(&self, notice: &str) -> Response {
        self.page.lock().await.close();
        redirect_with_notice(notice)
    }

    /// Keep the dialog open with the error and re-render in place.
    pub async fn fail(&self, error: AppError) -> Response {
        let status = error.status_code();
        let message = error.user_message();
        tracing::warn!("Catalog action failed: {}", error);
        self.page.lock().await.fail(message);

        match self.render(None).await {
            Ok(html) => (status, html).into_response(),
            Err(e) => e.into_response(),
        }
    }
}

pub fn redirect_to_page() -> Response {
    Redirect::to(CATALOG_PAGE_PATH).into_response()
}

pub fn redirect_with_notice(notice: &str) -> Response {
    Redirect::to(&format!(
        "{}?notice={}",
        CATALOG_PAGE_PATH,
        urlencoding::encode(notice)
    ))
    .into_response()
}
