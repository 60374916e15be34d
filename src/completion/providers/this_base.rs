use super::variable_chain::resolve_segments;
use super::{LookupProvider, LookupRequest, method_item, property_item, variable_item};
use crate::completion::candidate::CandidateSet;
use crate::completion::context::{DeclContext, ScopeFilter};
use crate::completion::declarations::{Declarations, VariableKind};
use crate::completion::outcome::LookupOutcome;
use crate::completion::parser::parse_chain_from_expr;
use crate::index::BindingMode;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Receiver {
    This,
    Base,
}

/// `this.` lists the class's own and inherited members together with the
/// locals and parameters visible at the caret; `base.` lists the inherited
/// members only. Longer chains drop the keyword and resolve the rest as a
/// plain chain.
pub struct ThisBaseProvider;

impl LookupProvider for ThisBaseProvider {
    fn name(&self) -> &'static str {
        "this_base"
    }

    fn lookup(&self, req: &LookupRequest<'_>) -> LookupOutcome {
        if !req.target.has_dot() {
            return LookupOutcome::NotApplicable;
        }
        let segments = parse_chain_from_expr(&req.target.chain);
        let receiver = match segments.first() {
            Some(head) if head.is_plain() && head.name == "this" => Receiver::This,
            Some(head) if head.is_plain() && head.name == "base" => Receiver::Base,
            _ => return LookupOutcome::NotApplicable,
        };
        if segments.len() > 1 {
            return resolve_segments(req, &segments[1..]);
        }
        if req.ctx.decl_context == DeclContext::Static {
            tracing::debug!(?receiver, "receiver keyword in static context");
            return LookupOutcome::Empty;
        }

        let mut set = CandidateSet::new();
        if receiver == Receiver::This {
            self.collect_declared(&mut set, req, &req.ctx.declarations, true);
        }
        self.collect_declared(&mut set, req, &req.ctx.inherited, false);
        for base in req.ctx.base_types() {
            if let Some(ty) = req.resolver.resolve_type_text(base) {
                req.resolver.catalog().collect_inherited_members(
                    &mut set,
                    &ty,
                    BindingMode::Instance,
                    req.resolver.allow_non_public(),
                );
            }
        }
        LookupOutcome::from_items(set.into_items())
    }
}

impl ThisBaseProvider {
    fn collect_declared(
        &self,
        set: &mut CandidateSet,
        req: &LookupRequest<'_>,
        decls: &Declarations,
        with_locals: bool,
    ) {
        let ctx = req.ctx;
        let filter = if with_locals { ScopeFilter::VisibleOnly } else { ScopeFilter::All };
        for var in decls
            .variables(filter, DeclContext::Instance, ctx.caret)
            .into_iter()
            .filter(|v| (with_locals || v.kind == VariableKind::Field) && !v.is_static)
        {
            set.insert(variable_item(var, self.name()));
        }
        for prop in decls.properties(DeclContext::Instance).into_iter().filter(|p| !p.is_static) {
            set.insert(property_item(prop, self.name()));
        }
        for method in decls.methods(DeclContext::Instance).into_iter().filter(|m| !m.is_static) {
            set.insert(method_item(method, self.name()));
        }
    }
}
