use super::static_member::static_chain;
use super::{LookupProvider, LookupRequest};
use crate::completion::outcome::LookupOutcome;
use crate::completion::parser::parse_chain_from_expr;
use crate::completion::type_resolver::{ChainSegment, Walk};
use crate::index::BindingMode;

/// Chain whose head is a declared variable, property or method.
pub struct VariableChainProvider;

impl LookupProvider for VariableChainProvider {
    fn name(&self) -> &'static str {
        "variable_chain"
    }

    fn lookup(&self, req: &LookupRequest<'_>) -> LookupOutcome {
        if !req.target.has_dot() {
            return LookupOutcome::NotApplicable;
        }
        let segments = parse_chain_from_expr(&req.target.chain);
        local_chain(req, &segments)
    }
}

pub(crate) fn local_chain(req: &LookupRequest<'_>, segments: &[ChainSegment]) -> LookupOutcome {
    let Some((head, rest)) = segments.split_first() else {
        return LookupOutcome::NotApplicable;
    };
    let Some(walk) = req.resolver.local_head(head) else {
        return LookupOutcome::NotApplicable;
    };
    tracing::debug!(head = %head.name, rest = rest.len(), "declared chain head");
    match walk {
        Walk::Type(ty) => req.resolver.resolve(
            ty,
            rest,
            BindingMode::Instance,
            req.resolver.allow_non_public(),
        ),
        Walk::Void if rest.is_empty() => LookupOutcome::Empty,
        Walk::Void | Walk::Failed => LookupOutcome::NotApplicable,
    }
}

/// A chain with no receiver keyword: declared head first, then a type name.
pub(crate) fn resolve_segments(req: &LookupRequest<'_>, segments: &[ChainSegment]) -> LookupOutcome {
    local_chain(req, segments).or_else(|| static_chain(req, segments))
}

#[cfg(test)]
mod tests {
    use crate::completion::candidate::ItemCategory;
    use crate::completion::engine::tests::{corlib_catalog, run};

    fn names(resp: &crate::completion::outcome::LookupResponse) -> Vec<String> {
        resp.outcome.items().iter().map(|i| i.display_text.to_string()).collect()
    }

    #[test]
    fn test_field_of_keyword_type() {
        let catalog = corlib_catalog();
        let resp = run(&catalog, "class Foo { string s; void M() { s.|");
        let items = resp.outcome.items();
        let length = items.iter().find(|i| i.display_text.as_ref() == "Length").unwrap();
        assert_eq!(length.category, ItemCategory::Property);
        let substring = items.iter().find(|i| i.display_text.as_ref() == "Substring").unwrap();
        assert_eq!(substring.category, ItemCategory::MethodOverload);
        assert!(items.iter().all(|i| i.display_text.as_ref() != "IsNullOrEmpty"), "no statics on an instance");
    }

    #[test]
    fn test_index_unwraps_element_type() {
        let catalog = corlib_catalog();
        let src = "using System.Collections.Generic;
                   class Foo { List<string> items; void M() { items[0].| } }";
        let indexed = names(&run(&catalog, src));
        assert!(indexed.contains(&"Length".to_string()), "got {:?}", indexed);

        let src = "using System.Collections.Generic;
                   class Foo { List<string> items; void M() { items.| } }";
        let plain = names(&run(&catalog, src));
        assert!(plain.contains(&"Capacity".to_string()));
        assert!(!plain.contains(&"Length".to_string()));
    }

    #[test]
    fn test_variable_wins_over_type_of_same_name() {
        let catalog = corlib_catalog();
        let resp = run(&catalog, "using System;\nclass Foo { void M() { string Math = \"\"; Math.| } }");
        let names = names(&resp);
        assert!(names.contains(&"Length".to_string()), "variable path first: {:?}", names);
        assert!(!names.contains(&"Sqrt".to_string()));
    }

    #[test]
    fn test_local_method_return_type() {
        let catalog = corlib_catalog();
        let resp = run(&catalog, "using System.Text;\nclass Foo { StringBuilder Make() { return null; } void M() { Make().| } }");
        assert!(names(&resp).contains(&"AppendLine".to_string()));
    }

    #[test]
    fn test_void_call_ends_chain_with_empty_list() {
        let catalog = corlib_catalog();
        let resp = run(&catalog, "class Foo { void Run() { } void M() { Run().| } }");
        assert!(resp.outcome.is_applicable());
        assert!(resp.outcome.items().is_empty());
    }

    #[test]
    fn test_foreach_var_takes_element_type() {
        let catalog = corlib_catalog();
        let src = "using System.Collections.Generic;
                   class Foo { void M(List<string> names) { foreach (var n in names) { n.| } } }";
        assert!(names(&run(&catalog, src)).contains(&"Substring".to_string()));
    }
}
