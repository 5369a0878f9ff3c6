// src/core/graph_display.rs

use crate::core::active_context::SelectionContext;
use crate::models::{HierarchyIndex, Level, ScopeRef};
use std::fmt::Write as _;

const ACTIVE_MARKER: &str = " (**)";

/// Renders an ASCII tree of the hierarchy.
///
/// With `start`, only that entity and its descendants are drawn, the start
/// entity printed as a root. Entities on the active selection chain are
/// marked with `(**)`.
///
/// # Returns
/// `None` if `start` does not exist. An empty string for an empty hierarchy.
pub fn render_tree(
    index: &HierarchyIndex,
    start: Option<ScopeRef>,
    context: &SelectionContext,
) -> Option<String> {
    let mut out = String::new();
    match start {
        Some(scope) => {
            let label = label_of(index, scope)?;
            let _ = writeln!(out, "{}{}", label, marker(context, scope));
            render_children(index, scope, context, "", &mut out);
        }
        None => {
            let roots = children_of(index, None);
            for (i, root) in roots.iter().enumerate() {
                render_node(index, *root, context, "", i + 1 == roots.len(), &mut out);
            }
        }
    }
    Some(out)
}

fn render_node(
    index: &HierarchyIndex,
    scope: ScopeRef,
    context: &SelectionContext,
    prefix: &str,
    is_last: bool,
    out: &mut String,
) {
    let connector = if is_last { "└─" } else { "├─" };
    let label = label_of(index, scope).unwrap_or_default();
    let _ = writeln!(
        out,
        "{}{}{}{}",
        prefix,
        connector,
        label,
        marker(context, scope)
    );

    let child_prefix = format!("{}{}", prefix, if is_last { "   " } else { "│  " });
    render_children(index, scope, context, &child_prefix, out);
}

fn render_children(
    index: &HierarchyIndex,
    scope: ScopeRef,
    context: &SelectionContext,
    prefix: &str,
    out: &mut String,
) {
    let children = children_of(index, Some(scope));
    for (i, child) in children.iter().enumerate() {
        render_node(index, *child, context, prefix, i + 1 == children.len(), out);
    }
}

fn marker(context: &SelectionContext, scope: ScopeRef) -> &'static str {
    if context.contains(scope) {
        ACTIVE_MARKER
    } else {
        ""
    }
}

/// Direct children of `parent` (ecosystems when `None`), sorted by name.
fn children_of(index: &HierarchyIndex, parent: Option<ScopeRef>) -> Vec<ScopeRef> {
    let mut children: Vec<(&str, ScopeRef)> = match parent {
        None => index
            .ecosystems
            .values()
            .map(|e| (e.name.as_str(), ScopeRef::new(Level::Ecosystem, e.id)))
            .collect(),
        Some(ScopeRef {
            level: Level::Ecosystem,
            id,
        }) => index
            .domains
            .values()
            .filter(|d| d.ecosystem_id == id)
            .map(|d| (d.name.as_str(), ScopeRef::new(Level::Domain, d.id)))
            .collect(),
        Some(ScopeRef {
            level: Level::Domain,
            id,
        }) => index
            .apps
            .values()
            .filter(|a| a.domain_id == id)
            .map(|a| (a.name.as_str(), ScopeRef::new(Level::App, a.id)))
            .collect(),
        Some(ScopeRef {
            level: Level::App,
            id,
        }) => index
            .workspaces
            .values()
            .filter(|w| w.app_id == id)
            .map(|w| (w.name.as_str(), ScopeRef::new(Level::Workspace, w.id)))
            .collect(),
        Some(ScopeRef {
            level: Level::Workspace,
            ..
        }) => Vec::new(),
    };
    children.sort_by_key(|(name, _)| *name);
    children.into_iter().map(|(_, scope)| scope).collect()
}

fn label_of(index: &HierarchyIndex, scope: ScopeRef) -> Option<String> {
    match scope.level {
        Level::Ecosystem => index.ecosystems.get(&scope.id).map(|e| e.name.clone()),
        Level::Domain => index.domains.get(&scope.id).map(|d| d.name.clone()),
        Level::App => index
            .apps
            .get(&scope.id)
            .map(|a| format!("{} [{}]", a.name, a.path.display())),
        Level::Workspace => index.workspaces.get(&scope.id).map(|w| match &w.image {
            Some(image) => format!("{} <{}> ({})", w.name, image, w.status),
            None => format!("{} ({})", w.name, w.status),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fixtures::{sample_store, scope_of};
    use crate::models::ActiveSelection;

    #[test]
    fn test_full_tree_is_sorted_and_marks_active_chain() {
        let store = sample_store();
        let ws = scope_of(&store, "retail/backend/shop/main");
        let app = scope_of(&store, "retail/backend/shop");
        let context = SelectionContext::new(ActiveSelection {
            app_id: Some(app.id),
            workspace_id: Some(ws.id),
            ..Default::default()
        });

        let tree = render_tree(store.index(), None, &context).unwrap();
        let expected = "\
├─healthcare
│  ├─backend
│  │  └─portal [/src/portal-api]
│  │     ├─main (created)
│  │     └─staging (created)
│  └─frontend
│     └─portal [/src/portal-web]
│        └─main (created)
└─retail
   └─backend
      └─shop [/src/shop] (**)
         └─main (created) (**)
";
        assert_eq!(tree, expected);
    }

    #[test]
    fn test_subtree_starts_at_the_given_entity() {
        let store = sample_store();
        let domain = scope_of(&store, "healthcare/frontend");
        let tree = render_tree(store.index(), Some(domain), &SelectionContext::default()).unwrap();
        assert_eq!(tree, "frontend\n└─portal [/src/portal-web]\n   └─main (created)\n");
    }

    #[test]
    fn test_missing_start_renders_nothing() {
        let store = sample_store();
        let missing = ScopeRef::new(Level::App, 999);
        assert!(render_tree(store.index(), Some(missing), &SelectionContext::default()).is_none());
    }
}
