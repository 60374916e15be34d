use rayon::prelude::*;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::Arc;

use crate::completion::candidate::{CandidateSet, ItemCategory, LookupItem};
use crate::completion::type_resolver::type_name::TypeName;

pub mod cache;
pub mod corlib;
pub mod reference;

use cache::AssemblyCache;
pub use reference::{
    AssemblyLoader, InMemoryLoader, LayeredLoader, MetadataDirLoader, ReferenceManager,
    StaticReferences,
};

/// Full name of the sentinel type returned by methods without a value.
pub const VOID_TYPE: &str = "System.Void";
pub const OBJECT_TYPE: &str = "System.Object";
pub const ARRAY_TYPE: &str = "System.Array";

fn void_type() -> Arc<str> {
    Arc::from(VOID_TYPE)
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AssemblyMetadata {
    pub name: Arc<str>,
    #[serde(default)]
    pub types: Vec<TypeMetadata>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeKind {
    Class,
    Interface,
    Enum,
    Delegate,
    Struct,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Access {
    #[default]
    Public,
    Protected,
    Internal,
    Private,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeMetadata {
    #[serde(default)]
    pub namespace: Option<Arc<str>>,
    /// Simple name. Nested types are written `Outer+Inner`.
    pub name: Arc<str>,
    pub kind: TypeKind,
    #[serde(default)]
    pub access: Access,
    #[serde(default)]
    pub base_type: Option<Arc<str>>,
    #[serde(default)]
    pub interfaces: Vec<Arc<str>>,
    #[serde(default)]
    pub generic_parameters: Vec<Arc<str>>,
    /// Static class carrying extension methods.
    #[serde(default)]
    pub extension_container: bool,
    #[serde(default)]
    pub members: Vec<MemberMetadata>,
}

impl TypeMetadata {
    pub fn full_name(&self) -> String {
        match self.namespace.as_deref() {
            Some(ns) if !ns.is_empty() => format!("{}.{}", ns, self.name),
            _ => self.name.to_string(),
        }
    }

    /// `Outer+Inner` → `Inner`
    pub fn simple_name(&self) -> &str {
        self.name.rsplit('+').next().unwrap_or(&self.name)
    }

    pub fn is_nested(&self) -> bool {
        self.name.contains('+')
    }

    pub fn is_public(&self) -> bool {
        self.access == Access::Public
    }

    pub fn category(&self) -> ItemCategory {
        match self.kind {
            TypeKind::Class => ItemCategory::Class,
            TypeKind::Interface => ItemCategory::Interface,
            TypeKind::Enum => ItemCategory::Enum,
            TypeKind::Delegate => ItemCategory::Delegate,
            TypeKind::Struct => ItemCategory::ValueType,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberKind {
    Field,
    Property,
    Method,
    Event,
    Constructor,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterMetadata {
    pub name: Arc<str>,
    #[serde(rename = "type")]
    pub type_name: Arc<str>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberMetadata {
    pub name: Arc<str>,
    pub kind: MemberKind,
    /// Field/property/event type, or the return type of a method.
    #[serde(rename = "type", default = "void_type")]
    pub member_type: Arc<str>,
    #[serde(default)]
    pub parameters: Vec<ParameterMetadata>,
    #[serde(default)]
    pub generic_parameters: Vec<Arc<str>>,
    #[serde(rename = "static", default)]
    pub is_static: bool,
    #[serde(default)]
    pub access: Access,
    #[serde(default)]
    pub special_name: bool,
    #[serde(default)]
    pub compiler_generated: bool,
    /// `const` field
    #[serde(default)]
    pub literal: bool,
    #[serde(default)]
    pub extension: bool,
}

impl MemberMetadata {
    pub fn is_void(&self) -> bool {
        TypeName::from(self.member_type.as_ref()).canonical_base() == VOID_TYPE
    }

    /// Special-name, compiler-generated and finalizer members never show up in a list.
    pub fn is_hidden(&self) -> bool {
        self.special_name
            || self.compiler_generated
            || self.kind == MemberKind::Constructor
            || self.name.starts_with('<')
            || self.name.starts_with('.')
            || (self.kind == MemberKind::Method
                && self.name.as_ref() == "Finalize"
                && self.parameters.is_empty())
    }

    pub fn signature(&self) -> String {
        let ty = TypeName::from(self.member_type.as_ref()).display();
        match self.kind {
            MemberKind::Method | MemberKind::Constructor => {
                let params = self
                    .parameters
                    .iter()
                    .enumerate()
                    .map(|(i, p)| {
                        let this = if i == 0 && self.extension { "this " } else { "" };
                        format!(
                            "{}{} {}",
                            this,
                            TypeName::from(p.type_name.as_ref()).display(),
                            p.name
                        )
                    })
                    .collect::<Vec<_>>()
                    .join(", ");
                let generics = if self.generic_parameters.is_empty() {
                    String::new()
                } else {
                    format!("<{}>", self.generic_parameters.join(", "))
                };
                format!("{} {}{}({})", ty, self.name, generics, params)
            }
            MemberKind::Property => format!("{} {} {{ get; }}", ty, self.name),
            MemberKind::Event => format!("event {} {}", ty, self.name),
            MemberKind::Field if self.literal => format!("const {} {}", ty, self.name),
            MemberKind::Field => format!("{} {}", ty, self.name),
        }
    }

    fn is_visible(&self, include_non_public: bool, reach: Reach) -> bool {
        match (self.access, reach) {
            (Access::Public, _) => true,
            (Access::Protected, Reach::Subclass) => true,
            (Access::Protected | Access::Internal, _) => include_non_public,
            (Access::Private, Reach::Declared) => include_non_public,
            (Access::Private, _) => false,
        }
    }
}

/// How the code asking for a member reaches it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Reach {
    /// Declared on the receiver's own type.
    Declared,
    /// Declared on a base of the receiver's type.
    Base,
    /// Inherited by the class being edited.
    Subclass,
}

impl Reach {
    fn at(depth: usize, inherited: bool) -> Self {
        match (inherited, depth) {
            (true, _) => Reach::Subclass,
            (false, 0) => Reach::Declared,
            (false, _) => Reach::Base,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BindingMode {
    /// Statics declared on the type itself (plus nested types).
    Static,
    /// Instance members, inherited ones included.
    Instance,
    InstanceWithInheritedStatics,
}

/// One assembly after load, with its by-name lookup table.
#[derive(Debug)]
pub struct LoadedAssembly {
    pub name: Arc<str>,
    types: Vec<Arc<TypeMetadata>>,
    by_full_name: FxHashMap<Arc<str>, Arc<TypeMetadata>>,
}

impl LoadedAssembly {
    pub fn new(meta: AssemblyMetadata) -> Self {
        let types: Vec<Arc<TypeMetadata>> = meta.types.into_iter().map(Arc::new).collect();
        let by_full_name = types
            .iter()
            .map(|t| (Arc::from(t.full_name().as_str()), Arc::clone(t)))
            .collect();
        Self {
            name: meta.name,
            types,
            by_full_name,
        }
    }

    pub fn get(&self, full_name: &str) -> Option<Arc<TypeMetadata>> {
        self.by_full_name.get(full_name).cloned()
    }

    pub fn types(&self) -> &[Arc<TypeMetadata>] {
        &self.types
    }
}

/// A type reference resolved against the catalog. `type_args` are the generic
/// arguments as written at the use site; `element_type` is set for arrays.
#[derive(Clone, Debug)]
pub struct ResolvedType {
    pub meta: Arc<TypeMetadata>,
    pub full_name: Arc<str>,
    pub type_args: Vec<TypeName>,
    pub element_type: Option<TypeName>,
}

impl ResolvedType {
    pub fn new(meta: Arc<TypeMetadata>) -> Self {
        let full_name = Arc::from(meta.full_name().as_str());
        Self {
            meta,
            full_name,
            type_args: vec![],
            element_type: None,
        }
    }

    pub fn is_void(&self) -> bool {
        self.full_name.as_ref() == VOID_TYPE
    }

    /// Replace the type's generic parameter names in `text` with the use-site arguments.
    pub fn substitute(&self, text: &str) -> TypeName {
        TypeName::from(text).substitute(&self.meta.generic_parameters, &self.type_args)
    }
}

/// Result of a by-name member lookup on a type or its bases.
#[derive(Clone, Debug)]
pub struct MemberHit {
    pub member: MemberMetadata,
    pub declaring: ResolvedType,
}

pub struct TypeCatalog {
    references: Arc<dyn ReferenceManager>,
    assemblies: AssemblyCache,
}

impl TypeCatalog {
    pub fn new(references: Arc<dyn ReferenceManager>, loader: Arc<dyn AssemblyLoader>) -> Self {
        Self {
            references,
            assemblies: AssemblyCache::new(loader),
        }
    }

    /// Load every workspace assembly up front so the first keystroke does not pay for it.
    pub fn warm(&self) {
        let names = self.references.workspace_assemblies();
        let loaded = names
            .par_iter()
            .filter(|name| self.assemblies.get_or_load(name).is_some())
            .count();
        tracing::info!(requested = names.len(), loaded, "catalog warmed");
    }

    pub fn loaded_assembly_count(&self) -> usize {
        self.assemblies.loaded_count()
    }

    /// Assemblies bound to any of `namespaces`, plus the workspace assemblies.
    fn assemblies_for<'a>(
        &self,
        namespaces: impl IntoIterator<Item = &'a str>,
    ) -> Vec<Arc<LoadedAssembly>> {
        let mut seen: FxHashSet<Arc<str>> = FxHashSet::default();
        let mut names: Vec<Arc<str>> = Vec::new();
        for ns in namespaces {
            for name in self.references.assemblies_for_namespace(ns) {
                if seen.insert(Arc::clone(&name)) {
                    names.push(name);
                }
            }
        }
        for name in self.references.workspace_assemblies() {
            if seen.insert(Arc::clone(&name)) {
                names.push(name);
            }
        }
        names
            .iter()
            .filter_map(|n| self.assemblies.get_or_load(n))
            .collect()
    }

    pub fn find_types_in_namespace(&self, namespaces: &[Arc<str>]) -> Vec<Arc<TypeMetadata>> {
        let wanted: FxHashSet<&str> = namespaces.iter().map(|n| n.as_ref()).collect();
        let mut seen: FxHashSet<String> = FxHashSet::default();
        let mut result = Vec::new();
        for asm in self.assemblies_for(namespaces.iter().map(|n| n.as_ref())) {
            for ty in asm.types() {
                let ns = ty.namespace.as_deref().unwrap_or("");
                if !wanted.contains(ns) || !ty.is_public() || ty.is_nested() {
                    continue;
                }
                if seen.insert(ty.full_name()) {
                    result.push(Arc::clone(ty));
                }
            }
        }
        tracing::debug!(
            namespaces = ?namespaces,
            count = result.len(),
            "find_types_in_namespace"
        );
        result
    }

    /// Exact lookup by full name (`Ns.Outer+Inner`).
    pub fn find_type(&self, full_name: &str) -> Option<Arc<TypeMetadata>> {
        let outer = full_name.split('+').next().unwrap_or(full_name);
        let namespace = outer.rsplit_once('.').map(|(ns, _)| ns).unwrap_or("");
        self.assemblies_for([namespace])
            .iter()
            .find_map(|asm| asm.get(full_name))
    }

    /// Try `prefix + "." + candidate` for each prefix in order; the first hit wins.
    /// A dotted candidate that misses is retried with `+` nested-type separators.
    pub fn resolve_qualified_type(
        &self,
        candidate: &str,
        namespace_prefixes: &[Arc<str>],
    ) -> Option<ResolvedType> {
        let written = TypeName::from(candidate.trim());
        if written.as_str().is_empty() {
            return None;
        }

        if let Some(element) = written.array_element() {
            let array = self.find_type(ARRAY_TYPE)?;
            let mut resolved = ResolvedType::new(array);
            resolved.element_type = Some(element);
            return Some(resolved);
        }

        let base = written.canonical_base();
        let type_args = written.generic_args();

        for prefix in namespace_prefixes {
            let full = if prefix.is_empty() {
                base.to_string()
            } else {
                format!("{}.{}", prefix, base)
            };
            if let Some(meta) = self.find_type(&full).or_else(|| self.find_nested(&full)) {
                let mut resolved = ResolvedType::new(meta);
                resolved.type_args = type_args;
                tracing::debug!(candidate, resolved = %resolved.full_name, "type resolved");
                return Some(resolved);
            }
        }
        tracing::debug!(candidate, "type not resolved");
        None
    }

    /// `A.B.C` → `A.B+C`, then `A+B+C`.
    fn find_nested(&self, dotted: &str) -> Option<Arc<TypeMetadata>> {
        let mut current = dotted.to_string();
        while let Some(pos) = current.rfind('.') {
            current.replace_range(pos..pos + 1, "+");
            if let Some(meta) = self.find_type(&current) {
                return Some(meta);
            }
        }
        None
    }

    /// Resolve a member type written on `declaring`: directly first, then as a
    /// type nested under the declaring type.
    pub fn resolve_member_type(
        &self,
        type_text: &TypeName,
        declaring: &ResolvedType,
        namespace_prefixes: &[Arc<str>],
    ) -> Option<ResolvedType> {
        if let Some(resolved) = self.resolve_qualified_type(type_text.as_str(), namespace_prefixes)
        {
            return Some(resolved);
        }
        let nested = format!("{}+{}", declaring.full_name, type_text.canonical_base());
        let meta = self.find_type(&nested)?;
        let mut resolved = ResolvedType::new(meta);
        resolved.type_args = type_text.generic_args();
        Some(resolved)
    }

    /// The type followed by its base classes (and inherited interfaces for
    /// interface types). Types not present in the catalog end the walk silently.
    pub fn base_chain(&self, ty: &ResolvedType) -> Vec<ResolvedType> {
        let mut result = vec![ty.clone()];
        let mut seen: FxHashSet<Arc<str>> = FxHashSet::default();
        seen.insert(Arc::clone(&ty.full_name));
        let mut queue: VecDeque<ResolvedType> = VecDeque::new();
        queue.push_back(ty.clone());

        while let Some(current) = queue.pop_front() {
            let mut parents: Vec<TypeName> = Vec::new();
            match (&current.meta.base_type, current.meta.kind) {
                (Some(base), _) => parents.push(current.substitute(base)),
                (None, TypeKind::Interface) => {}
                (None, _) if current.full_name.as_ref() != OBJECT_TYPE => {
                    parents.push(TypeName::from(OBJECT_TYPE))
                }
                _ => {}
            }
            if current.meta.kind == TypeKind::Interface {
                parents.extend(current.meta.interfaces.iter().map(|i| current.substitute(i)));
            }
            for parent in parents {
                let Some(meta) = self.find_type(parent.canonical_base()) else {
                    continue;
                };
                let mut resolved = ResolvedType::new(meta);
                if !seen.insert(Arc::clone(&resolved.full_name)) {
                    continue;
                }
                resolved.type_args = parent.generic_args();
                result.push(resolved.clone());
                queue.push_back(resolved);
            }
        }
        result
    }

    /// Every base class and interface full name reachable from `ty`, `ty` included.
    fn supertypes(&self, ty: &ResolvedType) -> FxHashSet<String> {
        let mut names: FxHashSet<String> = FxHashSet::default();
        let mut queue: VecDeque<Arc<TypeMetadata>> = VecDeque::new();
        queue.push_back(Arc::clone(&ty.meta));
        names.insert(ty.full_name.to_string());
        names.insert(OBJECT_TYPE.to_string());
        while let Some(meta) = queue.pop_front() {
            for parent in meta.base_type.iter().chain(meta.interfaces.iter()) {
                let base = TypeName::from(parent.as_ref()).canonical_base().to_string();
                if names.insert(base.clone())
                    && let Some(parent_meta) = self.find_type(&base)
                {
                    queue.push_back(parent_meta);
                }
            }
        }
        names
    }

    pub fn get_members(
        &self,
        ty: &ResolvedType,
        binding: BindingMode,
        include_non_public: bool,
    ) -> Vec<LookupItem> {
        let mut set = CandidateSet::new();
        self.collect_members(&mut set, ty, binding, include_non_public);
        set.into_items()
    }

    pub(crate) fn collect_members(
        &self,
        set: &mut CandidateSet,
        ty: &ResolvedType,
        binding: BindingMode,
        include_non_public: bool,
    ) {
        self.collect_reachable(set, ty, binding, include_non_public, false);
    }

    /// Members a derived class sees through its base `base`: private ones
    /// never, protected ones always, internal ones only with
    /// `include_non_public`.
    pub(crate) fn collect_inherited_members(
        &self,
        set: &mut CandidateSet,
        base: &ResolvedType,
        binding: BindingMode,
        include_non_public: bool,
    ) {
        self.collect_reachable(set, base, binding, include_non_public, true);
    }

    fn collect_reachable(
        &self,
        set: &mut CandidateSet,
        ty: &ResolvedType,
        binding: BindingMode,
        include_non_public: bool,
        inherited: bool,
    ) {
        let is_enum = ty.meta.kind == TypeKind::Enum;
        for (depth, current) in self.base_chain(ty).iter().enumerate() {
            // enums expose their values only
            if is_enum && depth > 0 {
                break;
            }
            for member in &current.meta.members {
                if member.is_hidden() {
                    continue;
                }
                if is_enum && member.kind == MemberKind::Method {
                    continue;
                }
                let wanted = match binding {
                    BindingMode::Static => member.is_static && depth == 0,
                    BindingMode::Instance => !member.is_static,
                    BindingMode::InstanceWithInheritedStatics => true,
                };
                if !wanted || !member.is_visible(include_non_public, Reach::at(depth, inherited)) {
                    continue;
                }
                set.insert(member_item(member, false));
            }
        }

        if binding == BindingMode::Static {
            for nested in self.nested_types(ty) {
                if !nested.is_public() && !include_non_public {
                    continue;
                }
                set.insert(type_item(&nested));
            }
        }
    }

    fn nested_types(&self, ty: &ResolvedType) -> Vec<Arc<TypeMetadata>> {
        let prefix = format!("{}+", ty.meta.name);
        let namespace = ty.meta.namespace.as_deref().unwrap_or("");
        self.assemblies_for([namespace])
            .iter()
            .flat_map(|asm| asm.types().iter())
            .filter(|t| {
                t.namespace.as_deref().unwrap_or("") == namespace
                    && t.name
                        .strip_prefix(prefix.as_str())
                        .is_some_and(|rest| !rest.contains('+'))
            })
            .cloned()
            .collect()
    }

    /// Member named `name` on `ty` or its bases under `binding`.
    pub fn find_member(
        &self,
        ty: &ResolvedType,
        name: &str,
        binding: BindingMode,
        include_non_public: bool,
    ) -> Option<MemberHit> {
        for (depth, current) in self.base_chain(ty).iter().enumerate() {
            let hit = current.meta.members.iter().find(|m| {
                m.name.as_ref() == name
                    && !m.is_hidden()
                    && match binding {
                        BindingMode::Static => m.is_static,
                        BindingMode::Instance => !m.is_static,
                        BindingMode::InstanceWithInheritedStatics => true,
                    }
                    && m.is_visible(include_non_public, Reach::at(depth, false))
            });
            if let Some(member) = hit {
                return Some(MemberHit {
                    member: member.clone(),
                    declaring: current.clone(),
                });
            }
        }
        None
    }

    fn is_assignable(&self, target: &ResolvedType, supertypes: &FxHashSet<String>, method: &MemberMetadata) -> bool {
        let Some(first) = method.parameters.first() else {
            return false;
        };
        let param = TypeName::from(first.type_name.as_ref());
        let base = param.canonical_base();
        // unconstrained generic parameter accepts anything
        if method.generic_parameters.iter().any(|g| g.as_ref() == base) {
            return true;
        }
        if param.is_array() {
            return target.element_type.is_some();
        }
        supertypes.contains(base)
    }

    pub fn find_extension_methods(
        &self,
        candidate_types: &[Arc<TypeMetadata>],
        target: &ResolvedType,
    ) -> Vec<LookupItem> {
        let mut set = CandidateSet::new();
        self.collect_extension_methods(&mut set, candidate_types, target);
        set.into_items()
    }

    pub(crate) fn collect_extension_methods(
        &self,
        set: &mut CandidateSet,
        candidate_types: &[Arc<TypeMetadata>],
        target: &ResolvedType,
    ) {
        let supertypes = self.supertypes(target);
        for container in candidate_types.iter().filter(|t| t.extension_container) {
            for method in &container.members {
                if method.kind != MemberKind::Method
                    || !method.is_static
                    || !method.extension
                    || method.access != Access::Public
                {
                    continue;
                }
                if self.is_assignable(target, &supertypes, method) {
                    set.insert(member_item(method, true));
                }
            }
        }
    }

    /// Fallback for a chain segment that is not a member: any extension method with that name.
    pub fn find_extension_method_named(
        &self,
        candidate_types: &[Arc<TypeMetadata>],
        name: &str,
    ) -> Option<MemberHit> {
        candidate_types
            .iter()
            .filter(|t| t.extension_container)
            .find_map(|t| {
                let member = t
                    .members
                    .iter()
                    .find(|m| m.extension && m.is_static && m.name.as_ref() == name)?;
                Some(MemberHit {
                    member: member.clone(),
                    declaring: ResolvedType::new(Arc::clone(t)),
                })
            })
    }

    /// Every known namespace, in discovery order.
    pub fn namespaces(&self) -> Vec<Arc<str>> {
        let mut seen: FxHashSet<Arc<str>> = FxHashSet::default();
        let mut result = Vec::new();
        let mut push = |ns: Arc<str>, result: &mut Vec<Arc<str>>| {
            // every ancestor of a namespace is itself a namespace
            let mut end = 0;
            for (i, part) in ns.split('.').enumerate() {
                end += part.len() + usize::from(i > 0);
                let prefix: Arc<str> = Arc::from(&ns[..end]);
                if !prefix.is_empty() && seen.insert(Arc::clone(&prefix)) {
                    result.push(prefix);
                }
            }
        };
        for ns in self.references.namespaces() {
            push(ns, &mut result);
        }
        for name in self.references.workspace_assemblies() {
            let Some(asm) = self.assemblies.get_or_load(&name) else {
                continue;
            };
            for ty in asm.types() {
                if let Some(ns) = &ty.namespace {
                    push(Arc::clone(ns), &mut result);
                }
            }
        }
        result
    }

    pub fn is_namespace(&self, name: &str) -> bool {
        self.namespaces().iter().any(|ns| ns.as_ref() == name)
    }

    pub fn root_namespaces(&self) -> Vec<Arc<str>> {
        self.namespaces()
            .into_iter()
            .filter(|ns| !ns.contains('.'))
            .collect()
    }

    /// Direct children of `parent`, returned as their last segment.
    pub fn child_namespaces(&self, parent: &str) -> Vec<Arc<str>> {
        let prefix = format!("{}.", parent);
        self.namespaces()
            .into_iter()
            .filter_map(|ns| {
                let rest = ns.strip_prefix(prefix.as_str())?;
                (!rest.contains('.')).then(|| Arc::from(rest))
            })
            .collect()
    }
}

pub(crate) fn type_item(ty: &TypeMetadata) -> LookupItem {
    let name = ty.simple_name();
    let display = if ty.generic_parameters.is_empty() {
        name.to_string()
    } else {
        format!("{}<{}>", name, ty.generic_parameters.join(", "))
    };
    LookupItem::new(name, name, ty.category(), "catalog").with_tooltip(display_full(ty, &display))
}

fn display_full(ty: &TypeMetadata, display: &str) -> String {
    let kind = match ty.kind {
        TypeKind::Class => "class",
        TypeKind::Interface => "interface",
        TypeKind::Enum => "enum",
        TypeKind::Delegate => "delegate",
        TypeKind::Struct => "struct",
    };
    match ty.namespace.as_deref() {
        Some(ns) if !ns.is_empty() => format!("{} {}.{}", kind, ns, display),
        _ => format!("{} {}", kind, display),
    }
}

pub(crate) fn member_item(member: &MemberMetadata, as_extension: bool) -> LookupItem {
    let category = match member.kind {
        MemberKind::Field if member.literal => ItemCategory::Constant,
        MemberKind::Field => ItemCategory::Field,
        MemberKind::Property => ItemCategory::Property,
        MemberKind::Event => ItemCategory::Event,
        MemberKind::Method if as_extension => ItemCategory::ExtensionMethod,
        MemberKind::Method | MemberKind::Constructor => ItemCategory::Method,
    };
    LookupItem::new(
        Arc::clone(&member.name),
        member.name.to_string(),
        category,
        "catalog",
    )
    .with_signature(member.signature())
}
