use serde::Serialize;

use crate::features::catalog::models::{Category, Language, Service, Translations};
use crate::features::catalog::services::{CatalogTree, NodeKey};
use crate::shared::constants::INDENT_REM_PER_LEVEL;

/// Render-ready category row
#[derive(Debug, Clone, Serialize)]
pub struct CategoryNode {
    pub id: Option<i64>,
    pub name: String,
    pub description: String,
    pub icon_url: Option<String>,
    pub is_mobile_category: bool,
    pub expanded: bool,
    pub languages: Vec<&'static str>,
    /// Only populated while the category is expanded
    pub services: Vec<ServiceNode>,
}

/// Render-ready service row at a given nesting depth
#[derive(Debug, Clone, Serialize)]
pub struct ServiceNode {
    pub id: Option<i64>,
    pub category_id: Option<i64>,
    pub name: String,
    pub description: String,
    pub icon_url: Option<String>,
    pub fee: Option<String>,
    pub estimated_duration: Option<String>,
    pub depth: usize,
    pub indent: String,
    pub expanded: bool,
    pub has_children: bool,
    pub languages: Vec<&'static str>,
    /// Only populated while the service is expanded
    pub children: Vec<ServiceNode>,
}

/// Entry of the service form's parent picker
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParentOption {
    pub id: i64,
    /// Name indented by depth with non-breaking spaces
    pub label: String,
}

/// Every service that may become the parent of `editing` (or of a new
/// service when `None`), in pre-order. The edited service and its own
/// sub-services are left out.
pub fn parent_options(tree: &CatalogTree, editing: Option<i64>) -> Vec<ParentOption> {
    tree.services_preorder()
        .into_iter()
        .filter_map(|(depth, service)| {
            let id = service.key()?;
            if editing.is_some_and(|edited| tree.is_within(edited, id)) {
                return None;
            }
            Some(ParentOption {
                id,
                label: format!("{}{}", "\u{a0}\u{a0}\u{a0}".repeat(depth), service.name),
            })
        })
        .collect()
}

/// Resolve an icon path against the file host; absolute URLs pass through.
pub fn icon_url(icon: &str, file_base_url: &str) -> Option<String> {
    let icon = icon.trim();
    if icon.is_empty() {
        return None;
    }
    if icon.starts_with("http") {
        return Some(icon.to_string());
    }
    Some(format!(
        "{}/{}",
        file_base_url.trim_end_matches('/'),
        icon.trim_start_matches('/')
    ))
}

fn indent(depth: usize) -> String {
    format!("{}rem", depth as f32 * INDENT_REM_PER_LEVEL)
}

fn languages_of(translations: Option<&Translations>) -> Vec<&'static str> {
    Language::ALL
        .iter()
        .filter(|lang| translations.is_some_and(|t| t.contains_key(lang.as_str())))
        .map(|lang| lang.label())
        .collect()
}

fn service_node(
    tree: &CatalogTree,
    service: &Service,
    depth: usize,
    lang: Language,
    file_base_url: &str,
) -> ServiceNode {
    let expanded = service
        .key()
        .is_some_and(|id| tree.is_expanded(NodeKey::Service(id)));

    let children = if expanded {
        service
            .services
            .iter()
            .map(|child| service_node(tree, child, depth + 1, lang, file_base_url))
            .collect()
    } else {
        vec![]
    };

    ServiceNode {
        id: service.key(),
        category_id: service.category_id,
        name: service
            .translation(lang)
            .map(|t| t.name.clone())
            .unwrap_or_else(|| service.name.clone()),
        description: service
            .translation(lang)
            .map(|t| t.description.clone())
            .unwrap_or_else(|| service.description.clone()),
        icon_url: icon_url(&service.icon, file_base_url),
        fee: service.service_fee.map(|fee| format!("${}", fee)),
        estimated_duration: service.estimated_duration.clone().filter(|d| !d.is_empty()),
        depth,
        indent: indent(depth),
        expanded,
        has_children: service.has_children(),
        languages: languages_of(service.translations.as_ref()),
        children,
    }
}

fn category_node(
    tree: &CatalogTree,
    category: &Category,
    lang: Language,
    file_base_url: &str,
) -> CategoryNode {
    let expanded = category
        .key()
        .is_some_and(|id| tree.is_expanded(NodeKey::Category(id)));

    let services = if expanded {
        category
            .services
            .iter()
            .map(|service| service_node(tree, service, 0, lang, file_base_url))
            .collect()
    } else {
        vec![]
    };

    CategoryNode {
        id: category.key(),
        name: category
            .translation(lang)
            .map(|t| t.name.clone())
            .unwrap_or_else(|| category.name.clone()),
        description: category
            .translation(lang)
            .map(|t| t.description.clone())
            .unwrap_or_else(|| category.description.clone()),
        icon_url: icon_url(&category.icon, file_base_url),
        is_mobile_category: category.is_mobile_category,
        expanded,
        languages: languages_of(category.translations.as_ref()),
        services,
    }
}

/// Walk the loaded catalog, descending only into expanded nodes.
///
/// Names come from the translation for the snapshot's language when one
/// exists, otherwise from the entity itself.
pub fn build_tree_view(tree: &CatalogTree, file_base_url: &str) -> Vec<CategoryNode> {
    let Some(snapshot) = tree.snapshot() else {
        return vec![];
    };
    snapshot
        .categories
        .iter()
        .map(|category| category_node(tree, category, snapshot.language, file_base_url))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::catalog::services::CatalogSnapshot;
    use crate::shared::test_helpers::sample_catalog;

    const FILES: &str = "https://files.example.com";

    fn loaded() -> CatalogTree {
        let mut tree = CatalogTree::new();
        let generation = tree.begin_fetch();
        tree.apply_fetch(
            generation,
            Ok(CatalogSnapshot::new(sample_catalog(), Language::English)),
        );
        tree
    }

    #[test]
    fn test_collapsed_tree_shows_only_categories() {
        let view = build_tree_view(&loaded(), FILES);

        assert_eq!(view.len(), 2);
        assert_eq!(view[0].name, "Plumbing");
        assert!(!view[0].expanded);
        assert!(view[0].services.is_empty());
        assert_eq!(view[0].languages, vec!["English"]);
    }

    #[test]
    fn test_expanded_nodes_render_with_increasing_indent() {
        let mut tree = loaded();
        tree.toggle_expansion(NodeKey::Category(1));
        tree.toggle_expansion(NodeKey::Service(10));
        tree.toggle_expansion(NodeKey::Service(11));

        let view = build_tree_view(&tree, FILES);
        let leak = &view[0].services[0];
        assert_eq!(leak.depth, 0);
        assert_eq!(leak.indent, "0rem");
        assert_eq!(leak.fee.as_deref(), Some("$250.00"));
        assert_eq!(leak.estimated_duration.as_deref(), Some("01:30"));
        assert!(leak.has_children);

        let pipe = &leak.children[0];
        assert_eq!(pipe.depth, 1);
        assert_eq!(pipe.indent, "1.5rem");

        let copper = &pipe.children[0];
        assert_eq!(copper.depth, 2);
        assert_eq!(copper.indent, "3rem");
        assert!(!copper.has_children);
        assert!(copper.children.is_empty());
    }

    #[test]
    fn test_collapsed_service_hides_children_but_reports_them() {
        let mut tree = loaded();
        tree.toggle_expansion(NodeKey::Category(1));
        // Grandchild expanded, but its parent is collapsed
        tree.toggle_expansion(NodeKey::Service(11));

        let view = build_tree_view(&tree, FILES);
        let leak = &view[0].services[0];
        assert!(!leak.expanded);
        assert!(leak.has_children);
        assert!(leak.children.is_empty());
    }

    #[test]
    fn test_names_follow_snapshot_language() {
        let mut categories = sample_catalog();
        categories[0].translations.get_or_insert_with(Default::default).insert(
            Language::Amharic.as_str().to_string(),
            crate::features::catalog::models::TranslationText {
                name: "ቧንቧ".to_string(),
                description: String::new(),
            },
        );
        let mut tree = CatalogTree::new();
        let generation = tree.begin_fetch();
        tree.apply_fetch(
            generation,
            Ok(CatalogSnapshot::new(categories, Language::Amharic)),
        );

        let view = build_tree_view(&tree, FILES);
        assert_eq!(view[0].name, "ቧንቧ");
        assert_eq!(view[0].languages, vec!["English", "Amharic"]);
        // No Amharic text for Electrical
        assert_eq!(view[1].name, "Electrical");
    }

    #[test]
    fn test_parent_options_skip_edited_subtree() {
        let tree = loaded();

        let all: Vec<i64> = parent_options(&tree, None).iter().map(|o| o.id).collect();
        assert_eq!(all, vec![10, 11, 12, 20]);

        let editing_pipe: Vec<i64> = parent_options(&tree, Some(11))
            .iter()
            .map(|o| o.id)
            .collect();
        assert_eq!(editing_pipe, vec![10, 20]);

        let options = parent_options(&tree, None);
        assert_eq!(options[0].label, "Leak Repair");
        assert_eq!(options[2].label, "\u{a0}\u{a0}\u{a0}\u{a0}\u{a0}\u{a0}Copper Pipe");
    }

    #[test]
    fn test_icon_url_prefixes_relative_paths() {
        assert_eq!(
            icon_url("uploads/leak.png", FILES).as_deref(),
            Some("https://files.example.com/uploads/leak.png")
        );
        assert_eq!(
            icon_url("/uploads/leak.png", "https://files.example.com/").as_deref(),
            Some("https://files.example.com/uploads/leak.png")
        );
        assert_eq!(
            icon_url("https://cdn.example.com/copper.png", FILES).as_deref(),
            Some("https://cdn.example.com/copper.png")
        );
        assert_eq!(icon_url("  ", FILES), None);
    }

    #[test]
    fn test_empty_tree_builds_nothing() {
        assert!(build_tree_view(&CatalogTree::new(), FILES).is_empty());
    }
}
