use super::{LookupProvider, LookupRequest, method_item, property_item, variable_item};
use crate::completion::candidate::CandidateSet;
use crate::completion::context::{DeclContext, ScopeFilter};
use crate::completion::declarations::VariableKind;
use crate::completion::outcome::LookupOutcome;
use crate::completion::parser::parse_chain_from_expr;
use crate::completion::type_resolver::ChainSegment;
use crate::index::BindingMode;

/// Last resort: the chain head names a type and the first hop is static.
pub struct StaticMemberProvider;

impl LookupProvider for StaticMemberProvider {
    fn name(&self) -> &'static str {
        "static_member"
    }

    fn lookup(&self, req: &LookupRequest<'_>) -> LookupOutcome {
        if !req.target.has_dot() {
            return LookupOutcome::NotApplicable;
        }
        let segments = parse_chain_from_expr(&req.target.chain);
        static_chain(req, &segments)
    }
}

pub(crate) fn static_chain(req: &LookupRequest<'_>, segments: &[ChainSegment]) -> LookupOutcome {
    let resolver = req.resolver;
    if let Some((ty, used)) = resolver.static_head(segments) {
        tracing::debug!(head = %ty.full_name, used, "static chain head");
        return resolver.resolve(ty, &segments[used..], BindingMode::Static, resolver.allow_non_public());
    }
    let Some(head) = segments.first() else {
        return LookupOutcome::NotApplicable;
    };
    if segments.len() == 1 && req.ctx.class_name() == Some(head.name.as_str()) {
        return own_statics(req);
    }
    // `using static System.Math;` then `PI.`
    for target in req.ctx.static_imports() {
        let Some(ty) = resolver.resolve_type_text(target) else {
            continue;
        };
        if resolver
            .catalog()
            .find_member(&ty, &head.name, BindingMode::Static, false)
            .is_some()
        {
            return resolver.resolve(ty, segments, BindingMode::Static, false);
        }
    }
    LookupOutcome::NotApplicable
}

/// `Foo.` inside `class Foo`: the static declarations of the class itself.
fn own_statics(req: &LookupRequest<'_>) -> LookupOutcome {
    const SOURCE: &str = "static_member";
    let decls = &req.ctx.declarations;
    let mut set = CandidateSet::new();
    for var in decls
        .variables(ScopeFilter::All, DeclContext::Static, req.ctx.caret)
        .into_iter()
        .filter(|v| v.kind == VariableKind::Field)
    {
        set.insert(variable_item(var, SOURCE));
    }
    for prop in decls.properties(DeclContext::Static) {
        set.insert(property_item(prop, SOURCE));
    }
    for method in decls.methods(DeclContext::Static) {
        set.insert(method_item(method, SOURCE));
    }
    LookupOutcome::from_items(set.into_items())
}

#[cfg(test)]
mod tests {
    use crate::completion::candidate::ItemCategory;
    use crate::completion::engine::tests::{corlib_catalog, run};

    fn names(resp: &crate::completion::outcome::LookupResponse) -> Vec<String> {
        resp.outcome.items().iter().map(|i| i.display_text.to_string()).collect()
    }

    #[test]
    fn test_static_members_of_imported_type() {
        let catalog = corlib_catalog();
        let resp = run(&catalog, "using System;\nclass Foo { void M() { Math.| } }");
        let names = names(&resp);
        assert!(names.contains(&"PI".to_string()));
        assert!(names.contains(&"Sqrt".to_string()));
    }

    #[test]
    fn test_instance_binding_after_first_hop() {
        let catalog = corlib_catalog();
        let resp = run(&catalog, "using System;\nclass Foo { void M() { DateTime.Now.| } }");
        let names = names(&resp);
        assert!(names.contains(&"Year".to_string()));
        assert!(!names.contains(&"Today".to_string()), "statics are not reachable through an instance");
    }

    #[test]
    fn test_alias_and_nested_enum() {
        let catalog = corlib_catalog();
        let resp = run(&catalog, "using IO = System.IO;\nclass Foo { void M() { IO.File.| } }");
        assert!(names(&resp).contains(&"ReadAllText".to_string()));

        let resp = run(&catalog, "using System;\nclass Foo { void M() { Environment.SpecialFolder.| } }");
        let items = resp.outcome.items();
        assert_eq!(items.len(), 2);
        assert!(items.iter().all(|i| i.category == ItemCategory::Constant));
    }

    #[test]
    fn test_own_class_statics() {
        let catalog = corlib_catalog();
        let resp = run(&catalog, "class Foo { static int total; int count; static void Reset() { } void M() { Foo.| } }");
        let names = names(&resp);
        assert!(names.contains(&"total".to_string()));
        assert!(names.contains(&"Reset".to_string()));
        assert!(!names.contains(&"count".to_string()));
    }

    #[test]
    fn test_using_static_member_head() {
        let catalog = corlib_catalog();
        let resp = run(&catalog, "using static System.Console;\nclass Foo { void M() { Out.| } }");
        assert!(names(&resp).contains(&"Flush".to_string()));
    }

    #[test]
    fn test_unknown_head_is_not_applicable() {
        let catalog = corlib_catalog();
        let resp = run(&catalog, "class Foo { void M() { nothing.| } }");
        assert!(!resp.outcome.is_applicable());
    }
}
