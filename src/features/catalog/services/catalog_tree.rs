use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;

use crate::features::catalog::models::{Category, Language, Service};

/// Identity of an expandable node.
///
/// Categories and services are numbered independently by the API, so the
/// kind is part of the key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum NodeKey {
    Category(i64),
    Service(i64),
}

/// One successful fetch of the nested catalog
#[derive(Debug, Clone)]
pub struct CatalogSnapshot {
    pub categories: Vec<Category>,
    pub language: Language,
    pub fetched_at: DateTime<Utc>,
}

impl CatalogSnapshot {
    pub fn new(categories: Vec<Category>, language: Language) -> Self {
        Self {
            categories,
            language,
            fetched_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone)]
pub enum TreeState {
    /// No snapshot yet; `error` is set when the last fetch failed
    Empty { error: Option<String> },
    Loaded(Arc<CatalogSnapshot>),
}

/// In-memory catalog tree plus the expansion state of its nodes.
///
/// Snapshots are only ever replaced wholesale. Fetches are numbered when
/// issued and a result older than the one already applied is dropped.
/// The language the next fetch asks for lives here too, so switching
/// language and numbering a fetch happen under the same lock.
#[derive(Debug)]
pub struct CatalogTree {
    state: TreeState,
    language: Language,
    expanded: HashSet<NodeKey>,
    issued_generation: u64,
    applied_generation: u64,
}

impl Default for CatalogTree {
    fn default() -> Self {
        Self::new()
    }
}

impl CatalogTree {
    pub fn new() -> Self {
        Self::with_language(Language::English)
    }

    pub fn with_language(language: Language) -> Self {
        Self {
            state: TreeState::Empty { error: None },
            language,
            expanded: HashSet::new(),
            issued_generation: 0,
            applied_generation: 0,
        }
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self.state, TreeState::Loaded(_))
    }

    /// True until the first fetch result (success or failure) is applied
    pub fn never_fetched(&self) -> bool {
        self.applied_generation == 0
    }

    pub fn snapshot(&self) -> Option<&Arc<CatalogSnapshot>> {
        match &self.state {
            TreeState::Loaded(snapshot) => Some(snapshot),
            TreeState::Empty { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.state {
            TreeState::Empty { error } => error.as_deref(),
            TreeState::Loaded(_) => None,
        }
    }

    pub fn categories(&self) -> &[Category] {
        self.snapshot()
            .map(|s| s.categories.as_slice())
            .unwrap_or(&[])
    }

    /// Language the next fetch is issued for
    pub fn language(&self) -> Language {
        self.language
    }

    pub fn set_language(&mut self, language: Language) {
        self.language = language;
    }

    /// Reserve a number for a fetch about to be issued
    pub fn begin_fetch(&mut self) -> u64 {
        self.issued_generation += 1;
        self.issued_generation
    }

    /// Apply a fetch result. Returns false when a newer result was already applied.
    pub fn apply_fetch(&mut self, generation: u64, result: Result<CatalogSnapshot, String>) -> bool {
        if generation <= self.applied_generation {
            tracing::debug!(
                "Discarding stale catalog fetch #{} (applied #{})",
                generation,
                self.applied_generation
            );
            return false;
        }
        self.applied_generation = generation;
        self.state = match result {
            Ok(snapshot) => TreeState::Loaded(Arc::new(snapshot)),
            Err(error) => TreeState::Empty { error: Some(error) },
        };
        true
    }

    /// Pre-order search across every category's service tree.
    ///
    /// Categories in list order, then each service before its children. If
    /// the API ever returned duplicate ids the first match wins.
    pub fn find_service(&self, id: i64) -> Option<&Service> {
        self.categories()
            .iter()
            .find_map(|category| find_in_services(&category.services, id))
    }

    /// Every service with its nesting depth, in the same pre-order as
    /// `find_service`.
    pub fn services_preorder(&self) -> Vec<(usize, &Service)> {
        let mut out = Vec::new();
        for category in self.categories() {
            collect_preorder(&category.services, 0, &mut out);
        }
        out
    }

    /// Id of the service directly above `id`. `None` for top-level and unknown services.
    pub fn parent_of(&self, id: i64) -> Option<i64> {
        self.categories()
            .iter()
            .find_map(|category| parent_in(&category.services, None, id))
            .flatten()
    }

    /// True when `id` is the service `root` or sits anywhere below it
    pub fn is_within(&self, root: i64, id: i64) -> bool {
        self.find_service(root)
            .is_some_and(|r| r.matches(id) || find_in_services(&r.services, id).is_some())
    }

    /// Categories do not nest, so only the top level is scanned.
    pub fn find_category(&self, id: i64) -> Option<&Category> {
        self.categories().iter().find(|c| c.matches(id))
    }

    /// Flip a node's expansion. Returns the new state.
    pub fn toggle_expansion(&mut self, key: NodeKey) -> bool {
        if self.expanded.remove(&key) {
            false
        } else {
            self.expanded.insert(key);
            true
        }
    }

    pub fn is_expanded(&self, key: NodeKey) -> bool {
        self.expanded.contains(&key)
    }
}

fn collect_preorder<'a>(services: &'a [Service], depth: usize, out: &mut Vec<(usize, &'a Service)>) {
    for service in services {
        out.push((depth, service));
        collect_preorder(&service.services, depth + 1, out);
    }
}

/// `Some(parent)` once `id` is found, where `parent` is `None` at the top level
fn parent_in(services: &[Service], parent: Option<i64>, id: i64) -> Option<Option<i64>> {
    for service in services {
        if service.matches(id) {
            return Some(parent);
        }
        if let Some(found) = parent_in(&service.services, service.key(), id) {
            return Some(found);
        }
    }
    None
}

fn find_in_services(services: &[Service], id: i64) -> Option<&Service> {
    for service in services {
        if service.matches(id) {
            return Some(service);
        }
        if let Some(found) = find_in_services(&service.services, id) {
            return Some(found);
        }
    }
    None
}
