//! HTML rendering of the catalog page using Jinja2 templates.
//!
//! Templates are compiled into the binary and loaded once at startup.

use minijinja::{AutoEscape, Environment};
use serde::Serialize;

use crate::core::error::{AppError, Result};
use crate::features::catalog::models::Language;
use crate::features::catalog::services::PendingStatus;
use crate::features::catalog::views::page_state::Modal;
use crate::features::catalog::views::tree_view::{CategoryNode, ParentOption};

const TEMPLATES: &[(&str, &str)] = &[
    (
        "layout.html",
        include_str!("../../../../templates/catalog/layout.html"),
    ),
    (
        "page.html",
        include_str!("../../../../templates/catalog/page.html"),
    ),
    (
        "modal.html",
        include_str!("../../../../templates/catalog/modal.html"),
    ),
];

/// Language selector entry
#[derive(Debug, Clone, Serialize)]
pub struct LanguageOption {
    pub value: &'static str,
    pub label: &'static str,
    pub selected: bool,
}

impl LanguageOption {
    pub fn all(current: Language) -> Vec<Self> {
        Language::ALL
            .iter()
            .map(|lang| Self {
                value: lang.as_str(),
                label: lang.label(),
                selected: *lang == current,
            })
            .collect()
    }
}

/// Category choice offered by the service form
#[derive(Debug, Clone, Serialize)]
pub struct CategoryOption {
    pub id: i64,
    pub name: String,
}

/// Everything the catalog page template reads
#[derive(Debug, Clone, Serialize)]
pub struct CatalogPageContext {
    pub language: &'static str,
    pub languages: Vec<LanguageOption>,
    pub loaded: bool,
    pub error: Option<String>,
    pub categories: Vec<CategoryNode>,
    pub category_options: Vec<CategoryOption>,
    /// Parent picker of the open service form
    pub parent_options: Vec<ParentOption>,
    pub modal: Option<Modal>,
    pub pending: PendingStatus,
    pub notice: Option<String>,
    pub session_active: bool,
    pub fetched_at: Option<String>,
}

pub struct CatalogRenderer {
    env: Environment<'static>,
}

impl CatalogRenderer {
    pub fn new() -> Result<Self> {
        let mut env = Environment::new();
        env.set_auto_escape_callback(|_| AutoEscape::Html);

        for (name, source) in TEMPLATES {
            env.add_template(name, source).map_err(|e| {
                AppError::Internal(format!("Failed to load template {}: {}", name, e))
            })?;
            tracing::debug!("Loaded template: {}", name);
        }

        Ok(Self { env })
    }

    pub fn render_catalog(&self, ctx: &CatalogPageContext) -> Result<String> {
        let template = self
            .env
            .get_template("page.html")
            .map_err(|_| AppError::Internal("Template 'page.html' not found".to_string()))?;

        template
            .render(ctx)
            .map_err(|e| AppError::Internal(format!("Failed to render template: {}", e)))
    }
}
