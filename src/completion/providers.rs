use std::sync::Arc;

use super::candidate::{ItemCategory, LookupItem};
use super::context::LookupContext;
use super::declarations::{DeclaredMethod, DeclaredProperty, DeclaredVariable, VariableKind};
use super::outcome::LookupOutcome;
use super::parser::LookupTarget;
use super::type_resolver::MemberChainResolver;

pub mod namespace_partial;
pub mod static_member;
pub mod this_base;
pub mod using_namespace;
pub mod variable_chain;
pub mod visible_scope;

/// Inputs shared by every lookup state for one request.
pub struct LookupRequest<'a> {
    pub ctx: &'a LookupContext,
    pub target: &'a LookupTarget,
    pub resolver: &'a MemberChainResolver<'a>,
}

/// One state of the lookup decision chain. Returning
/// [`LookupOutcome::NotApplicable`] hands the request to the next state.
pub trait LookupProvider: Send + Sync {
    fn lookup(&self, req: &LookupRequest<'_>) -> LookupOutcome;

    fn name(&self) -> &'static str;
}

pub(crate) fn variable_item(var: &DeclaredVariable, source: &'static str) -> LookupItem {
    let category = match var.kind {
        VariableKind::Field => ItemCategory::Field,
        VariableKind::Parameter | VariableKind::Local => ItemCategory::LocalVariable,
    };
    LookupItem::new(Arc::clone(&var.name), var.name.to_string(), category, source)
        .with_tooltip(format!("{} {}", var.type_name, var.name))
}

pub(crate) fn method_item(method: &DeclaredMethod, source: &'static str) -> LookupItem {
    LookupItem::new(
        Arc::clone(&method.name),
        method.name.to_string(),
        ItemCategory::Method,
        source,
    )
    .with_signature(method.signature())
}

pub(crate) fn property_item(prop: &DeclaredProperty, source: &'static str) -> LookupItem {
    LookupItem::new(
        Arc::clone(&prop.name),
        prop.name.to_string(),
        ItemCategory::Property,
        source,
    )
    .with_tooltip(format!("{} {} {{ get; }}", prop.return_type, prop.name))
}

pub(crate) fn namespace_item(name: &str, source: &'static str) -> LookupItem {
    LookupItem::new(name, name, ItemCategory::Namespace, source)
        .with_tooltip(format!("namespace {}", name))
}
