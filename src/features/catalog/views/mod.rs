pub mod page_state;
pub mod renderer;
pub mod tree_view;

pub use page_state::{Modal, PageState};
pub use renderer::{CatalogPageContext, CatalogRenderer, CategoryOption, LanguageOption};
pub use tree_view::{build_tree_view, parent_options};
