mod catalog_query;
mod catalog_tree;
mod mutation_coordinator;

pub use catalog_query::CatalogQuery;
pub use catalog_tree::{CatalogSnapshot, CatalogTree, NodeKey};
pub use mutation_coordinator::{MutationCoordinator, PendingStatus};
