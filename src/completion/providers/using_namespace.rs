use super::{LookupProvider, LookupRequest, namespace_item};
use crate::completion::{outcome::LookupOutcome, slicer::using_directive_partial};

/// `using Sys|` and `using System.Co|`: root or child namespaces.
/// Terminal once the caret is in a directive, even when nothing matches.
pub struct UsingNamespaceProvider;

impl LookupProvider for UsingNamespaceProvider {
    fn name(&self) -> &'static str {
        "using_namespace"
    }

    fn lookup(&self, req: &LookupRequest<'_>) -> LookupOutcome {
        let Some(partial) = using_directive_partial(req.ctx.pre_caret_stripped()) else {
            return LookupOutcome::NotApplicable;
        };
        let catalog = req.resolver.catalog();
        let (namespaces, typed) = match partial.rsplit_once('.') {
            Some((parent, typed)) => (catalog.child_namespaces(parent), typed),
            None => (catalog.root_namespaces(), partial.as_str()),
        };
        tracing::debug!(partial = %partial, candidates = namespaces.len(), "using directive");

        let items = namespaces
            .iter()
            .filter(|ns| starts_with_ignore_case(ns, typed))
            .map(|ns| namespace_item(ns, self.name()))
            .collect();
        LookupOutcome::from_items(items)
    }
}

fn starts_with_ignore_case(name: &str, prefix: &str) -> bool {
    name.len() >= prefix.len()
        && name.is_char_boundary(prefix.len())
        && name[..prefix.len()].eq_ignore_ascii_case(prefix)
}

#[cfg(test)]
mod tests {
    use crate::completion::candidate::ItemCategory;
    use crate::completion::engine::tests::{corlib_catalog, run};

    #[test]
    fn test_root_namespaces_after_using() {
        let catalog = corlib_catalog();
        let resp = run(&catalog, "using Sy|");
        let items = resp.outcome.items();
        assert_eq!(items.len(), 1, "only System starts with Sy: {:?}", items);
        assert_eq!(items[0].display_text.as_ref(), "System");
        assert_eq!(items[0].category, ItemCategory::Namespace);
        assert_eq!(resp.look_ahead, "Sy");
    }

    #[test]
    fn test_child_namespaces_after_dot() {
        let catalog = corlib_catalog();
        let resp = run(&catalog, "using System.Co|");
        let names: Vec<_> = resp.outcome.items().iter().map(|i| i.display_text.to_string()).collect();
        assert_eq!(names, vec!["Collections"]);
        assert_eq!(resp.look_ahead, "Co");
    }

    #[test]
    fn test_no_match_is_still_terminal() {
        let catalog = corlib_catalog();
        let resp = run(&catalog, "using Zz|\nclass Zz { }");
        assert!(resp.outcome.is_applicable(), "a using directive never falls through");
        assert!(resp.outcome.items().is_empty());
    }
}
