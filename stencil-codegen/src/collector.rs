//! Flattening of template dependency forests.

use std::cmp::Reverse;

use indexmap::IndexMap;

use crate::TemplateRef;

/// Default bound on dependency recursion.
pub const DEFAULT_MAX_TEMPLATE_DEPTH: usize = 25;

/// Collect `roots` and all their transitive dependencies.
///
/// The result holds one template per [`id`](crate::Template::id), sorted by
/// descending precedence. Templates with equal precedence keep discovery
/// order. When an id is seen again, the newer instance replaces the stored one
/// but keeps the original position.
///
/// Recursion deeper than `max_depth` is cut off silently. There is no cycle
/// detection: self-referential graphs terminate because of the depth bound.
pub fn collect_templates<C>(roots: &[TemplateRef<C>], max_depth: usize) -> Vec<TemplateRef<C>> {
    collect_level(roots, max_depth, 0)
}

fn collect_level<C>(
    templates: &[TemplateRef<C>],
    max_depth: usize,
    level: usize,
) -> Vec<TemplateRef<C>> {
    if level > max_depth {
        if !templates.is_empty() {
            tracing::trace!(level, max_depth, "template depth limit reached");
        }
        return Vec::new();
    }

    let mut all: IndexMap<String, TemplateRef<C>> = IndexMap::new();
    for template in templates {
        all.insert(template.id().to_string(), template.clone());

        let dependencies = template.dependencies();
        for dependency in collect_level(&dependencies, max_depth, level + 1) {
            all.insert(dependency.id().to_string(), dependency);
        }
    }

    let mut collected: Vec<_> = all.into_values().collect();
    collected.sort_by_key(|t| Reverse(t.precedence()));
    collected
}
