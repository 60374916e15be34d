use std::cell::{Cell, OnceCell};
use std::sync::Arc;

use super::candidate::{CandidateSet, LookupItem};
use super::context::{DeclContext, LookupContext};
use super::declarations::{DeclaredVariable, VarInit};
use super::outcome::LookupOutcome;
use super::parser::parse_chain_from_expr;
use crate::index::{BindingMode, MemberKind, MemberMetadata, ResolvedType, TypeCatalog, TypeMetadata};
use type_name::TypeName;

pub mod type_name;

/// Nesting limit for `var` initializers that refer to other `var` locals.
const MAX_INFERENCE_DEPTH: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainSegment {
    /// Member, variable or type name.
    pub name: String,
    /// Argument count when the segment is a call.
    pub arg_count: Option<usize>,
    /// Number of `[...]` applied after the segment.
    pub index_depth: usize,
}

impl ChainSegment {
    pub fn member(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            arg_count: None,
            index_depth: 0,
        }
    }

    pub fn call(name: impl Into<String>, arg_count: usize) -> Self {
        Self {
            arg_count: Some(arg_count),
            ..Self::member(name)
        }
    }

    pub fn is_plain(&self) -> bool {
        self.arg_count.is_none() && self.index_depth == 0
    }
}

/// Result of walking a chain to its terminal type.
#[derive(Debug, Clone)]
pub enum Walk {
    Type(ResolvedType),
    /// The chain ends in a member without a value.
    Void,
    Failed,
}

impl Walk {
    fn from_type(ty: Option<ResolvedType>) -> Self {
        match ty {
            Some(ty) if ty.is_void() => Walk::Void,
            Some(ty) => Walk::Type(ty),
            None => Walk::Failed,
        }
    }
}

/// Resolves member-access chains against the catalog and the declarations of
/// one lookup context.
pub struct MemberChainResolver<'a> {
    catalog: &'a TypeCatalog,
    ctx: &'a LookupContext,
    allow_non_public: bool,
    extension_candidates: OnceCell<Vec<Arc<TypeMetadata>>>,
    inference_depth: Cell<usize>,
}

impl<'a> MemberChainResolver<'a> {
    pub fn new(catalog: &'a TypeCatalog, ctx: &'a LookupContext, allow_non_public: bool) -> Self {
        Self {
            catalog,
            ctx,
            allow_non_public,
            extension_candidates: OnceCell::new(),
            inference_depth: Cell::new(0),
        }
    }

    pub fn catalog(&self) -> &TypeCatalog {
        self.catalog
    }

    pub fn allow_non_public(&self) -> bool {
        self.allow_non_public
    }

    /// Types of every namespace in scope; extension containers are picked from these.
    pub fn extension_candidates(&self) -> &[Arc<TypeMetadata>] {
        self.extension_candidates.get_or_init(|| {
            self.catalog
                .find_types_in_namespace(&self.ctx.imported_namespaces())
        })
    }

    /// Qualify a written type reference with the context's namespace prefixes.
    pub fn resolve_type_text(&self, text: &str) -> Option<ResolvedType> {
        let expanded = self.ctx.expand_alias(text.trim());
        self.catalog
            .resolve_qualified_type(&expanded, &self.ctx.namespace_prefixes)
    }

    /// Element type of `ty` for `[...]` access: array element, indexer
    /// property type, or last generic argument.
    pub fn index_into(&self, ty: &ResolvedType) -> Option<ResolvedType> {
        if let Some(element) = &ty.element_type {
            return self.resolve_type_text(element.as_str());
        }
        for indexer in ["Item", "Chars"] {
            if let Some(hit) =
                self.catalog
                    .find_member(ty, indexer, BindingMode::Instance, self.allow_non_public)
                && hit.member.kind == MemberKind::Property
            {
                let written = hit.declaring.substitute(&hit.member.member_type);
                return self
                    .catalog
                    .resolve_member_type(&written, &hit.declaring, &self.ctx.namespace_prefixes);
            }
        }
        let last = ty.type_args.last()?;
        self.resolve_type_text(last.as_str())
    }

    fn apply_index(&self, ty: ResolvedType, depth: usize) -> Option<ResolvedType> {
        let mut current = ty;
        for _ in 0..depth {
            current = self.index_into(&current)?;
        }
        Some(current)
    }

    /// Walk `segments` starting from `head`. The first hop uses `binding`
    /// (and `head_non_public`); every later hop is an instance access.
    pub fn walk(
        &self,
        head: ResolvedType,
        segments: &[ChainSegment],
        binding: BindingMode,
        head_non_public: bool,
    ) -> Walk {
        if head.is_void() {
            return Walk::Void;
        }
        let mut current = head;
        let mut binding = binding;
        let mut non_public = head_non_public;

        for (i, seg) in segments.iter().enumerate() {
            let is_last = i + 1 == segments.len();
            let hit = self
                .catalog
                .find_member(&current, &seg.name, binding, non_public);

            let next = match hit {
                Some(hit) => {
                    let member = self.select_overload(&hit.declaring, &hit.member, seg);
                    let written = hit.declaring.substitute(&member.member_type);
                    if member.is_void() {
                        if is_last && seg.index_depth == 0 {
                            return Walk::Void;
                        }
                        tracing::debug!(segment = %seg.name, "void member mid-chain");
                        return Walk::Failed;
                    }
                    binding = BindingMode::Instance;
                    self.catalog
                        .resolve_member_type(&written, &hit.declaring, &self.ctx.namespace_prefixes)
                }
                // `Outer.Inner` keeps static access
                None if binding == BindingMode::Static => seg
                    .is_plain()
                    .then(|| format!("{}+{}", current.full_name, seg.name))
                    .and_then(|nested| self.catalog.find_type(&nested))
                    .map(ResolvedType::new),
                None => {
                    let Some(ext) = self
                        .catalog
                        .find_extension_method_named(self.extension_candidates(), &seg.name)
                    else {
                        tracing::debug!(
                            segment = %seg.name,
                            on = %current.full_name,
                            "chain segment not found"
                        );
                        return Walk::Failed;
                    };
                    if ext.member.is_void() {
                        return if is_last { Walk::Void } else { Walk::Failed };
                    }
                    binding = BindingMode::Instance;
                    let written = self.bind_extension_generics(&current, &ext.member);
                    self.resolve_type_text(written.as_str())
                }
            };

            let Some(next) = next else {
                tracing::debug!(segment = %seg.name, "member type not resolved");
                return Walk::Failed;
            };
            let Some(next) = self.apply_index(next, seg.index_depth) else {
                return Walk::Failed;
            };
            current = next;
            non_public = self.allow_non_public;
        }
        Walk::from_type(Some(current))
    }

    /// Return type of an extension method called on `receiver`. A generic
    /// `this` parameter binds to the receiver itself; a generic argument of
    /// the `this` parameter (`IEnumerable<TSource>`) binds to its element type.
    fn bind_extension_generics(&self, receiver: &ResolvedType, method: &MemberMetadata) -> TypeName {
        let ret = TypeName::from(method.member_type.as_ref());
        let Some(first) = method.parameters.first() else {
            return ret;
        };
        let this_param = TypeName::from(first.type_name.as_ref());
        let is_param = |name: &str| method.generic_parameters.iter().any(|g| g.as_ref() == name);

        let mut params: Vec<Arc<str>> = Vec::new();
        let mut args: Vec<TypeName> = Vec::new();
        if is_param(this_param.as_str()) {
            params.push(Arc::from(this_param.as_str()));
            args.push(written_name(receiver));
        } else if let Some(element) = self.index_into(receiver) {
            for arg in this_param.generic_args() {
                if is_param(arg.as_str()) {
                    params.push(arg.to_arc());
                    args.push(written_name(&element));
                }
            }
        }
        ret.substitute(&params, &args)
    }

    /// Pick the overload whose parameter count matches the call, if any.
    fn select_overload(
        &self,
        declaring: &ResolvedType,
        found: &MemberMetadata,
        seg: &ChainSegment,
    ) -> MemberMetadata {
        let (Some(count), MemberKind::Method) = (seg.arg_count, found.kind) else {
            return found.clone();
        };
        declaring
            .meta
            .members
            .iter()
            .find(|m| {
                m.kind == MemberKind::Method
                    && m.name == found.name
                    && m.is_static == found.is_static
                    && m.parameters.len() == count
            })
            .unwrap_or(found)
            .clone()
    }

    /// Members of `ty` under `binding`, plus extension methods for instance access.
    pub fn enumerate(&self, ty: &ResolvedType, binding: BindingMode, non_public: bool) -> Vec<LookupItem> {
        let mut set = CandidateSet::new();
        self.catalog.collect_members(&mut set, ty, binding, non_public);
        if binding != BindingMode::Static {
            self.catalog
                .collect_extension_methods(&mut set, self.extension_candidates(), ty);
        }
        set.into_items()
    }

    /// Walk then enumerate: the full chain resolution.
    pub fn resolve(
        &self,
        head: ResolvedType,
        segments: &[ChainSegment],
        binding: BindingMode,
        head_non_public: bool,
    ) -> LookupOutcome {
        let first_hop_binding = binding;
        match self.walk(head, segments, binding, head_non_public) {
            Walk::Failed => LookupOutcome::NotApplicable,
            Walk::Void => LookupOutcome::Empty,
            Walk::Type(terminal) => {
                let binding = if segments.is_empty() {
                    first_hop_binding
                } else if terminal_is_nested_type(segments, &terminal) {
                    BindingMode::Static
                } else {
                    BindingMode::Instance
                };
                let non_public = if segments.is_empty() {
                    head_non_public
                } else {
                    self.allow_non_public
                };
                LookupOutcome::from_items(self.enumerate(&terminal, binding, non_public))
            }
        }
    }

    /// Static access: the shortest run of leading segments that names a type.
    /// Returns the type and how many segments it used.
    pub fn static_head(&self, segments: &[ChainSegment]) -> Option<(ResolvedType, usize)> {
        let mut name = String::new();
        for (i, seg) in segments.iter().enumerate() {
            if seg.arg_count.is_some() {
                return None;
            }
            if i > 0 {
                name.push('.');
            }
            name.push_str(&seg.name);
            if let Some(ty) = self.resolve_type_text(&name) {
                return Some((ty, i + 1));
            }
            if seg.index_depth > 0 {
                return None;
            }
        }
        None
    }

    /// Type of a declared variable, inferring `var` from its initializer.
    pub fn variable_type(&self, var: &DeclaredVariable) -> Walk {
        if var.type_name != "var" {
            return Walk::from_type(self.resolve_type_text(&var.type_name));
        }
        let depth = self.inference_depth.get();
        if depth >= MAX_INFERENCE_DEPTH {
            return Walk::Failed;
        }
        self.inference_depth.set(depth + 1);
        let result = match &var.init_expr {
            Some(VarInit::Expr(expr)) => self.expression_type(expr),
            Some(VarInit::ElementOf(expr)) => match self.expression_type(expr) {
                Walk::Type(ty) => Walk::from_type(self.index_into(&ty)),
                other => other,
            },
            None => Walk::Failed,
        };
        self.inference_depth.set(depth);
        result
    }

    /// Head of a chain as a declared entity: variables, then properties, then
    /// inherited variables and members, or a local method when the head is a call.
    pub fn local_head(&self, head: &ChainSegment) -> Option<Walk> {
        let ctx = self.ctx;
        let dc = ctx.decl_context;
        let walk = if head.arg_count.is_some() {
            let method = ctx
                .declarations
                .find_method(&head.name, dc)
                .or_else(|| ctx.inherited.find_method(&head.name, dc))?;
            Walk::from_type(self.resolve_type_text(&method.return_type))
        } else if let Some(var) = ctx.declarations.find_variable(&head.name, ctx.caret, dc) {
            self.variable_type(var)
        } else if let Some(prop) = ctx.declarations.find_property(&head.name, dc) {
            Walk::from_type(self.resolve_type_text(&prop.return_type))
        } else if let Some(var) = ctx.inherited.find_variable(&head.name, ctx.caret, dc) {
            self.variable_type(var)
        } else if let Some(prop) = ctx.inherited.find_property(&head.name, dc) {
            Walk::from_type(self.resolve_type_text(&prop.return_type))
        } else {
            self.inherited_catalog_member(&head.name)?
        };

        Some(match walk {
            Walk::Type(ty) => match self.apply_index(ty, head.index_depth) {
                Some(ty) => Walk::Type(ty),
                None => Walk::Failed,
            },
            other => other,
        })
    }

    /// A member of one of the current class's metadata base types, used unqualified.
    fn inherited_catalog_member(&self, name: &str) -> Option<Walk> {
        let binding = match self.ctx.decl_context {
            DeclContext::Static => BindingMode::Static,
            _ => BindingMode::InstanceWithInheritedStatics,
        };
        for base in self.ctx.base_types() {
            let Some(base_ty) = self.resolve_type_text(base) else {
                continue;
            };
            let Some(hit) = self.catalog.find_member(&base_ty, name, binding, true) else {
                continue;
            };
            if hit.member.is_void() {
                return Some(Walk::Void);
            }
            let written = hit.declaring.substitute(&hit.member.member_type);
            return Some(Walk::from_type(self.catalog.resolve_member_type(
                &written,
                &hit.declaring,
                &self.ctx.namespace_prefixes,
            )));
        }
        None
    }

    /// Type of an expression such as `items.First()` or `Foo.Bar.Baz`.
    pub fn expression_type(&self, expr: &str) -> Walk {
        let segments = parse_chain_from_expr(expr);
        let Some(head) = segments.first() else {
            return Walk::Failed;
        };
        if let Some(walk) = self.local_head(head) {
            return match walk {
                Walk::Type(ty) => self.walk(ty, &segments[1..], BindingMode::Instance, true),
                other if segments.len() == 1 => other,
                _ => Walk::Failed,
            };
        }
        match self.static_head(&segments) {
            Some((ty, used)) => self.walk(ty, &segments[used..], BindingMode::Static, self.allow_non_public),
            None => Walk::Failed,
        }
    }
}

/// `List<System.String>`, `System.Int32[]`
fn written_name(ty: &ResolvedType) -> TypeName {
    if let Some(element) = &ty.element_type {
        return TypeName::from(format!("{}[]", element));
    }
    if ty.type_args.is_empty() {
        return TypeName::from(Arc::clone(&ty.full_name));
    }
    let args: Vec<&str> = ty.type_args.iter().map(|a| a.as_str()).collect();
    TypeName::from(format!("{}<{}>", ty.full_name, args.join(", ")))
}

/// After `Outer.Inner` the list shows the nested type's statics.
fn terminal_is_nested_type(segments: &[ChainSegment], terminal: &ResolvedType) -> bool {
    segments
        .last()
        .is_some_and(|seg| seg.is_plain() && terminal.meta.is_nested() && terminal.meta.simple_name() == seg.name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::completion::candidate::ItemCategory;
    use crate::index::corlib::{CorlibLoader, bind_corlib};
    use crate::index::tests::{make_catalog, make_member, make_method, make_type};
    use crate::index::{AssemblyMetadata, StaticReferences, TypeKind};

    fn corlib_catalog() -> TypeCatalog {
        let mut refs = StaticReferences::new();
        bind_corlib(&mut refs).unwrap();
        TypeCatalog::new(Arc::new(refs), Arc::new(CorlibLoader))
    }

    fn ctx(src: &str) -> LookupContext {
        let caret = src.find('|').expect("caret marker");
        LookupContext::new(src.replace('|', ""), caret)
    }

    fn names(outcome: &LookupOutcome) -> Vec<String> {
        outcome.items().iter().map(|i| i.display_text.to_string()).collect()
    }

    #[test]
    fn test_void_terminal_is_empty_but_mid_chain_fails() {
        let mut ty = make_type("A", "Svc", TypeKind::Class);
        ty.members = vec![
            make_method("Run", "System.Void", &[]),
            make_member("Name", MemberKind::Property, "System.String"),
        ];
        let mut string = make_type("System", "String", TypeKind::Class);
        string.members = vec![make_member("Length", MemberKind::Property, "System.Int32")];
        let catalog = make_catalog(vec![AssemblyMetadata {
            name: Arc::from("Lib"),
            types: vec![ty, string],
        }]);
        let c = ctx("using A; class X { void M() { | } }");
        let r = MemberChainResolver::new(&catalog, &c, false);
        let svc = r.resolve_type_text("Svc").unwrap();

        let void_end = r.resolve(svc.clone(), &[ChainSegment::call("Run", 0)], BindingMode::Instance, false);
        assert!(matches!(void_end, LookupOutcome::Empty), "void terminal is an empty answer");

        let mid = r.resolve(
            svc.clone(),
            &[ChainSegment::call("Run", 0), ChainSegment::member("Length")],
            BindingMode::Instance,
            false,
        );
        assert!(!mid.is_applicable(), "void mid-chain is no answer");

        let ok = r.resolve(svc, &[ChainSegment::member("Name")], BindingMode::Instance, false);
        assert_eq!(names(&ok), vec!["Length"]);
    }

    #[test]
    fn test_binding_switches_to_instance_after_first_hop() {
        let mut ty = make_type("A", "Config", TypeKind::Class);
        let mut current = make_member("Current", MemberKind::Property, "A.Config");
        current.is_static = true;
        let mut create = make_method("Create", "A.Config", &[]);
        create.is_static = true;
        ty.members = vec![current, create, make_member("Path", MemberKind::Property, "System.String")];
        let catalog = make_catalog(vec![AssemblyMetadata {
            name: Arc::from("Lib"),
            types: vec![ty],
        }]);
        let c = ctx("class X { void M() { | } }");
        let r = MemberChainResolver::new(&catalog, &c, false);
        let config = r.resolve_type_text("A.Config").unwrap();

        let statics = r.resolve(config.clone(), &[], BindingMode::Static, false);
        assert_eq!(names(&statics), vec!["Current", "Create"]);

        let after_hop = r.resolve(config.clone(), &[ChainSegment::member("Current")], BindingMode::Static, false);
        assert_eq!(names(&after_hop), vec!["Path"], "second hop lists instance members");

        let static_again = r.resolve(
            config,
            &[ChainSegment::member("Current"), ChainSegment::member("Current")],
            BindingMode::Static,
            false,
        );
        assert!(!static_again.is_applicable(), "a static member is not reachable through an instance");
    }

    #[test]
    fn test_generic_substitution_and_indexing() {
        let catalog = corlib_catalog();
        let c = ctx("using System.Collections.Generic; class X { void M() { | } }");
        let r = MemberChainResolver::new(&catalog, &c, false);
        let list = r.resolve_type_text("List<string>").unwrap();

        let first = r.walk(list.clone(), &[ChainSegment::member("Item")], BindingMode::Instance, false);
        let Walk::Type(item) = first else {
            panic!("Item should resolve");
        };
        assert_eq!(item.full_name.as_ref(), "System.String");

        let indexed = r.index_into(&list).unwrap();
        assert_eq!(indexed.full_name.as_ref(), "System.String");

        let dict = r.resolve_type_text("Dictionary<string, List<int>>").unwrap();
        let values = r.index_into(&dict).unwrap();
        assert_eq!(values.full_name.as_ref(), "System.Collections.Generic.List");
        assert_eq!(values.type_args[0].as_str(), "int");
    }

    #[test]
    fn test_extension_methods_augment_and_chain() {
        let catalog = corlib_catalog();
        let c = ctx("using System.Linq; using System.Collections.Generic; class X { void M() { | } }");
        let r = MemberChainResolver::new(&catalog, &c, false);
        let list = r.resolve_type_text("List<int>").unwrap();

        let members = r.resolve(list.clone(), &[], BindingMode::Instance, false);
        let items = members.items();
        let where_item = items.iter().find(|i| i.display_text.as_ref() == "Where").unwrap();
        assert_eq!(where_item.category, ItemCategory::ExtensionMethod);
        let count = items.iter().find(|i| i.display_text.as_ref() == "Count").unwrap();
        assert_eq!(count.category, ItemCategory::Property, "instance property wins over extension");

        let chained = r.walk(list, &[ChainSegment::call("ToList", 0)], BindingMode::Instance, false);
        let Walk::Type(ty) = chained else {
            panic!("extension fallback should resolve ToList");
        };
        assert_eq!(ty.full_name.as_ref(), "System.Collections.Generic.List");
    }

    #[test]
    fn test_static_head_and_nested_type() {
        let catalog = corlib_catalog();
        let c = ctx("using System; class X { void M() { | } }");
        let r = MemberChainResolver::new(&catalog, &c, false);
        let segs = parse_chain_from_expr("System.Text.StringBuilder");
        let (ty, used) = r.static_head(&segs).unwrap();
        assert_eq!(ty.full_name.as_ref(), "System.Text.StringBuilder");
        assert_eq!(used, 3);

        let segs = parse_chain_from_expr("Environment.SpecialFolder");
        let (env, used) = r.static_head(&segs).unwrap();
        let outcome = r.resolve(env, &segs[used..], BindingMode::Static, false);
        assert_eq!(names(&outcome), vec!["Desktop", "MyDocuments"]);
    }

    #[test]
    fn test_var_inference_through_initializer() {
        let catalog = corlib_catalog();
        let c = ctx(
            "using System.Collections.Generic; using System.Linq;
             class X { List<string> names; void M() { var first = names.First(); var again = first; | } }",
        );
        let r = MemberChainResolver::new(&catalog, &c, false);
        let Some(Walk::Type(ty)) = r.local_head(&ChainSegment::member("again")) else {
            panic!("var chain should resolve");
        };
        assert_eq!(ty.full_name.as_ref(), "System.String", "TSource binds to the list element");
    }
}
