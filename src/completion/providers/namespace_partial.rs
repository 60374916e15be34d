use std::sync::Arc;

use super::{LookupProvider, LookupRequest, namespace_item};
use crate::completion::candidate::CandidateSet;
use crate::completion::outcome::LookupOutcome;
use crate::index::type_item;

/// `System.Collections.|`: child namespaces plus the types declared directly
/// in that namespace. Relative names are qualified with the enclosing
/// namespaces and imports, first match wins.
pub struct NamespacePartialProvider;

impl LookupProvider for NamespacePartialProvider {
    fn name(&self) -> &'static str {
        "namespace_partial"
    }

    fn lookup(&self, req: &LookupRequest<'_>) -> LookupOutcome {
        if !req.target.has_dot() {
            return LookupOutcome::NotApplicable;
        }
        let chain = req.ctx.expand_alias(&req.target.chain);
        if !chain.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'.') {
            return LookupOutcome::NotApplicable;
        }
        let catalog = req.resolver.catalog();
        let Some(namespace) = req.ctx.namespace_prefixes.iter().find_map(|prefix| {
            let full = if prefix.is_empty() {
                chain.clone()
            } else {
                format!("{}.{}", prefix, chain)
            };
            catalog.is_namespace(&full).then_some(full)
        }) else {
            return LookupOutcome::NotApplicable;
        };
        tracing::debug!(namespace = %namespace, "namespace member access");

        let mut set = CandidateSet::new();
        for child in catalog.child_namespaces(&namespace) {
            set.insert(namespace_item(&child, self.name()));
        }
        for ty in catalog.find_types_in_namespace(&[Arc::from(namespace.as_str())]) {
            set.insert(type_item(&ty));
        }
        LookupOutcome::from_items(set.into_items())
    }
}

#[cfg(test)]
mod tests {
    use crate::completion::candidate::ItemCategory;
    use crate::completion::engine::tests::{corlib_catalog, run};

    #[test]
    fn test_namespace_children_and_types_merge() {
        let catalog = corlib_catalog();
        let resp = run(&catalog, "class A { void M() { System.|");
        let items = resp.outcome.items();
        let find = |n: &str| items.iter().find(|i| i.display_text.as_ref() == n);
        assert_eq!(find("Collections").map(|i| i.category), Some(ItemCategory::Namespace));
        assert_eq!(find("Console").map(|i| i.category), Some(ItemCategory::Class));
        assert_eq!(find("Int32").map(|i| i.category), Some(ItemCategory::ValueType));
        assert!(find("SpecialFolder").is_none(), "nested types are not namespace members");
    }

    #[test]
    fn test_relative_namespace_through_import() {
        let catalog = corlib_catalog();
        let resp = run(&catalog, "using System;\nclass A { void M() { Collections.Generic.|");
        assert!(
            resp.outcome.items().iter().any(|i| i.display_text.as_ref() == "List"),
            "got {:?}",
            resp.outcome.items()
        );
    }

    #[test]
    fn test_type_chain_is_not_a_namespace() {
        let catalog = corlib_catalog();
        let resp = run(&catalog, "class A { void M() { System.Environment.|");
        let names: Vec<_> = resp.outcome.items().iter().map(|i| i.display_text.to_string()).collect();
        assert!(names.contains(&"NewLine".to_string()), "falls through to static lookup: {:?}", names);
    }
}
