use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::core::error::Result;
use crate::features::catalog::clients::CatalogRepository;
use crate::features::catalog::models::Language;
use crate::features::catalog::services::{CatalogSnapshot, CatalogTree, NodeKey};

/// Data-fetching layer owning the catalog tree.
///
/// The tree is keyed by language: switching language or invalidating the
/// key refetches the nested catalog and replaces the snapshot. The lock is
/// never held across a network call.
pub struct CatalogQuery {
    repository: Arc<dyn CatalogRepository>,
    tree: RwLock<CatalogTree>,
    fetch_count: AtomicU64,
}

impl CatalogQuery {
    pub fn new(repository: Arc<dyn CatalogRepository>, language: Language) -> Self {
        Self {
            repository,
            tree: RwLock::new(CatalogTree::with_language(language)),
            fetch_count: AtomicU64::new(0),
        }
    }

    pub async fn language(&self) -> Language {
        self.tree.read().await.language()
    }

    /// Number of nested-catalog fetches issued so far
    #[cfg(test)]
    pub fn fetch_count(&self) -> u64 {
        self.fetch_count.load(Ordering::SeqCst)
    }

    /// Fetch the nested catalog for the current language and replace the tree.
    ///
    /// A failure is recorded in the tree (Empty + error) and also returned.
    pub async fn fetch(&self) -> Result<()> {
        let (generation, language) = {
            let mut tree = self.tree.write().await;
            (tree.begin_fetch(), tree.language())
        };
        self.fetch_count.fetch_add(1, Ordering::SeqCst);

        tracing::debug!("Fetching nested catalog #{} ({})", generation, language);
        let result = self.repository.list_nested_catalog(Some(language)).await;

        let mut tree = self.tree.write().await;
        match result {
            Ok(categories) => {
                tracing::info!(
                    "Catalog loaded: {} categories ({})",
                    categories.len(),
                    language
                );
                tree.apply_fetch(generation, Ok(CatalogSnapshot::new(categories, language)));
                Ok(())
            }
            Err(e) => {
                tracing::warn!("Failed to load catalog: {}", e);
                tree.apply_fetch(generation, Err(e.user_message()));
                Err(e)
            }
        }
    }

    /// Fetch once if nothing has been fetched yet
    pub async fn ensure_loaded(&self) {
        let needs_fetch = self.tree.read().await.never_fetched();
        if needs_fetch {
            // Failure is kept in the tree and rendered from there.
            let _ = self.fetch().await;
        }
    }

    /// Mark the cached catalog stale and refetch it
    pub async fn invalidate(&self) -> Result<()> {
        tracing::debug!("Catalog cache invalidated");
        self.fetch().await
    }

    /// Re-key the query on another language and refetch
    pub async fn set_language(&self, language: Language) -> Result<()> {
        self.tree.write().await.set_language(language);
        self.fetch().await
    }

    pub async fn toggle_expansion(&self, key: NodeKey) -> bool {
        self.tree.write().await.toggle_expansion(key)
    }

    /// Run `f` against the current tree
    pub async fn read<R>(&self, f: impl FnOnce(&CatalogTree) -> R) -> R {
        let tree = self.tree.read().await;
        f(&tree)
    }
}
