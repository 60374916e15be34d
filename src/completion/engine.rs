use std::path::PathBuf;
use std::sync::Arc;

use walkdir::WalkDir;

use super::candidate::{ItemCategory, LookupItem};
use super::context::LookupContext;
use super::outcome::{LookupOutcome, LookupResponse};
use super::parser::extract_target;
use super::providers::{
    LookupProvider, LookupRequest, namespace_partial::NamespacePartialProvider,
    static_member::StaticMemberProvider, this_base::ThisBaseProvider,
    using_namespace::UsingNamespaceProvider, variable_chain::VariableChainProvider,
    visible_scope::VisibleScopeProvider,
};
use super::slicer::{embedded_option, is_in_comment_or_string};
use super::type_resolver::MemberChainResolver;
use crate::index::TypeCatalog;

/// Handles `//$...`, `//?...` and `//&...` lines instead of the normal lookup.
pub trait EmbeddedOptionHelper: Send + Sync {
    fn lookup(&self, marker: char, typed: &str) -> LookupResponse;
}

/// `//$dir/fi`: entries of a directory relative to `root`.
pub struct FilePathHelper {
    root: PathBuf,
}

impl FilePathHelper {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl EmbeddedOptionHelper for FilePathHelper {
    fn lookup(&self, marker: char, typed: &str) -> LookupResponse {
        if marker != '$' {
            return LookupResponse::not_applicable();
        }
        let typed = typed.trim_start();
        let (dir, partial) = match typed.rfind(['/', '\\']) {
            Some(pos) => (&typed[..pos], &typed[pos + 1..]),
            None => ("", typed),
        };
        let base = self.root.join(dir);
        let items: Vec<LookupItem> = WalkDir::new(&base)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .filter_map(|entry| {
                let name = entry.file_name().to_str()?.to_string();
                let tooltip = if entry.file_type().is_dir() { "directory" } else { "file" };
                Some(
                    LookupItem::new(name.as_str(), name.clone(), ItemCategory::Path, "embedded_option")
                        .with_tooltip(tooltip),
                )
            })
            .collect();
        tracing::debug!(dir = %base.display(), count = items.len(), "embedded path lookup");
        LookupResponse::new(LookupOutcome::from_items(items), partial)
    }
}

/// Runs the lookup states in priority order over one source snapshot; the
/// first state that applies answers.
pub struct LookupDriver {
    using_state: UsingNamespaceProvider,
    providers: Vec<Box<dyn LookupProvider>>,
    embedded: Option<Arc<dyn EmbeddedOptionHelper>>,
}

impl Default for LookupDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl LookupDriver {
    pub fn new() -> Self {
        Self {
            using_state: UsingNamespaceProvider,
            providers: vec![
                Box::new(NamespacePartialProvider),
                Box::new(VisibleScopeProvider),
                Box::new(ThisBaseProvider),
                Box::new(VariableChainProvider),
                Box::new(StaticMemberProvider), // last resort
            ],
            embedded: None,
        }
    }

    pub fn with_embedded_helper(mut self, helper: Arc<dyn EmbeddedOptionHelper>) -> Self {
        self.embedded = Some(helper);
        self
    }

    pub fn lookup(
        &self,
        catalog: &TypeCatalog,
        source: &str,
        caret: usize,
        allow_non_public: bool,
    ) -> LookupResponse {
        let ctx = LookupContext::new(source, caret);

        if let Some((marker, typed)) = embedded_option(ctx.pre_caret()) {
            tracing::debug!(%marker, "embedded option line");
            return match &self.embedded {
                Some(helper) => helper.lookup(marker, typed),
                None => LookupResponse::not_applicable(),
            };
        }
        if is_in_comment_or_string(&ctx.source, ctx.caret) {
            tracing::debug!(caret = ctx.caret, "caret inside comment or string");
            return LookupResponse::not_applicable();
        }

        let target = extract_target(ctx.pre_caret_stripped());
        let resolver = MemberChainResolver::new(catalog, &ctx, allow_non_public);
        let req = LookupRequest {
            ctx: &ctx,
            target: &target,
            resolver: &resolver,
        };

        let outcome = self.using_state.lookup(&req);
        if outcome.is_applicable() {
            return self.respond(self.using_state.name(), outcome, &target.look_ahead);
        }
        if ctx.before_first_class || ctx.class.is_none() {
            tracing::debug!(
                before_first_class = ctx.before_first_class,
                "no enclosing type, lookup abandoned"
            );
            return LookupResponse::not_applicable();
        }

        for provider in &self.providers {
            let outcome = provider.lookup(&req);
            if outcome.is_applicable() {
                return self.respond(provider.name(), outcome, &target.look_ahead);
            }
        }
        tracing::debug!(entity = %target.entity, "no state applied");
        LookupResponse::not_applicable()
    }

    fn respond(&self, state: &'static str, outcome: LookupOutcome, look_ahead: &str) -> LookupResponse {
        tracing::debug!(state, items = outcome.items().len(), look_ahead, "lookup answered");
        LookupResponse::new(outcome, look_ahead)
    }
}
