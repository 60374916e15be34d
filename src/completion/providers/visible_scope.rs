use super::{LookupProvider, LookupRequest, method_item, namespace_item, property_item, variable_item};
use crate::completion::candidate::{CandidateSet, LookupItem};
use crate::completion::context::{DeclContext, ScopeFilter};
use crate::completion::outcome::LookupOutcome;
use crate::index::{BindingMode, type_item};

/// Nothing dotted typed yet: everything visible at the caret.
///
/// The groups are concatenated without deduplication across them, so a name
/// that is both a type and a local shows up twice with different categories.
/// Inside each group overloads still merge.
pub struct VisibleScopeProvider;

impl LookupProvider for VisibleScopeProvider {
    fn name(&self) -> &'static str {
        "visible_scope"
    }

    fn lookup(&self, req: &LookupRequest<'_>) -> LookupOutcome {
        if !req.target.is_blank() {
            return LookupOutcome::NotApplicable;
        }
        let mut items: Vec<LookupItem> = Vec::new();
        items.extend(self.base_type_members(req));
        items.extend(self.imported_types(req));
        items.extend(self.static_import_members(req));
        items.extend(self.declared(req));
        items.extend(
            req.resolver
                .catalog()
                .root_namespaces()
                .iter()
                .map(|ns| namespace_item(ns, self.name())),
        );
        tracing::debug!(count = items.len(), "visible scope");
        LookupOutcome::from_items(items)
    }
}

impl VisibleScopeProvider {
    /// Members of the textual base types, statics included. Only the bases
    /// written on the current declaration are followed here, and only what a
    /// subclass may see of them.
    fn base_type_members(&self, req: &LookupRequest<'_>) -> Vec<LookupItem> {
        let binding = match req.ctx.decl_context {
            DeclContext::Static => BindingMode::Static,
            _ => BindingMode::InstanceWithInheritedStatics,
        };
        let mut set = CandidateSet::new();
        for base in req.ctx.base_types() {
            if let Some(ty) = req.resolver.resolve_type_text(base) {
                req.resolver.catalog().collect_inherited_members(
                    &mut set,
                    &ty,
                    binding,
                    req.resolver.allow_non_public(),
                );
            }
        }
        set.into_items()
    }

    fn imported_types(&self, req: &LookupRequest<'_>) -> Vec<LookupItem> {
        req.resolver
            .extension_candidates()
            .iter()
            .map(|ty| type_item(ty))
            .collect()
    }

    /// `using static System.Math;` brings the statics of `Math` into scope.
    fn static_import_members(&self, req: &LookupRequest<'_>) -> Vec<LookupItem> {
        let mut set = CandidateSet::new();
        for target in req.ctx.static_imports() {
            if let Some(ty) = req.resolver.resolve_type_text(target) {
                req.resolver
                    .catalog()
                    .collect_members(&mut set, &ty, BindingMode::Static, false);
            }
        }
        set.into_items()
    }

    /// Locals, parameters and fields visible at the caret, then methods and
    /// properties, own declarations before inherited ones.
    fn declared(&self, req: &LookupRequest<'_>) -> Vec<LookupItem> {
        let ctx = req.ctx;
        let dc = ctx.decl_context;
        let mut set = CandidateSet::new();
        for decls in [&ctx.declarations, &ctx.inherited] {
            for var in decls.variables(ScopeFilter::VisibleOnly, dc, ctx.caret) {
                set.insert(variable_item(var, self.name()));
            }
        }
        for decls in [&ctx.declarations, &ctx.inherited] {
            for method in decls.methods(dc) {
                set.insert(method_item(method, self.name()));
            }
            for prop in decls.properties(dc) {
                set.insert(property_item(prop, self.name()));
            }
        }
        set.into_items()
    }
}
