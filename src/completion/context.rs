use rustc_hash::FxHashSet;
use std::sync::Arc;

use super::declarations::{Declarations, scan_declarations};
use super::slicer::{
    self, ClassRegion, find_type_named, find_word, is_ident_byte, strip_comments_and_strings,
};
use super::type_resolver::type_name::TypeName;

/// Half-open `[start, end)` byte range into one source snapshot. A caret at
/// `end` still counts as inside, so an unclosed block covers a caret at EOF.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SourceSpan {
    pub start: usize,
    pub end: usize,
}

impl SourceSpan {
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(start <= end, "span start {} after end {}", start, end);
        Self {
            start,
            end: end.max(start),
        }
    }

    pub fn contains(&self, offset: usize) -> bool {
        self.start <= offset && offset <= self.end
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclContext {
    Static,
    Instance,
    All,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeFilter {
    VisibleOnly,
    All,
}

/// A `using` directive at file level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UsingDirective {
    Namespace(Arc<str>),
    Static(Arc<str>),
    Alias { alias: Arc<str>, target: Arc<str> },
}

/// Everything one lookup needs, computed from a single source snapshot.
#[derive(Debug, Clone)]
pub struct LookupContext {
    pub source: Arc<str>,
    /// `source` with comments and string contents blanked.
    pub stripped: String,
    pub caret: usize,
    pub before_first_class: bool,
    pub decl_context: DeclContext,
    pub usings: Vec<UsingDirective>,
    pub current_namespace: Option<String>,
    /// Prefixes tried in order when qualifying a type name; always starts with "".
    pub namespace_prefixes: Vec<Arc<str>>,
    pub class: Option<ClassRegion>,
    /// Declarations of the enclosing class.
    pub declarations: Declarations,
    /// Non-private declarations of base classes declared in the same source.
    pub inherited: Declarations,
}

impl LookupContext {
    pub fn new(source: impl Into<Arc<str>>, caret: usize) -> Self {
        let source: Arc<str> = source.into();
        let caret = clamp_to_char_boundary(&source, caret);
        let stripped = strip_comments_and_strings(&source);
        let before_first_class = slicer::is_before_first_type(&stripped, caret);
        let usings = parse_usings(&stripped);
        let current_namespace = namespace_at(&stripped, caret);
        let namespace_prefixes = build_prefixes(current_namespace.as_deref(), &usings);

        let class = slicer::enclosing_class(&stripped, caret);
        let (declarations, inherited, decl_context) = match &class {
            Some(region) => {
                let declarations = scan_declarations(&stripped, region);
                let inherited = scan_inherited(&stripped, region);
                let decl_context = declarations.decl_context_at(caret);
                (declarations, inherited, decl_context)
            }
            None => (Declarations::default(), Declarations::default(), DeclContext::All),
        };

        tracing::debug!(
            caret,
            class = class.as_ref().map(|c| c.name.as_str()),
            namespace = current_namespace.as_deref(),
            ?decl_context,
            "lookup context built"
        );

        Self {
            source,
            stripped,
            caret,
            before_first_class,
            decl_context,
            usings,
            current_namespace,
            namespace_prefixes,
            class,
            declarations,
            inherited,
        }
    }

    pub fn pre_caret(&self) -> &str {
        &self.source[..self.caret]
    }

    pub fn pre_caret_stripped(&self) -> &str {
        &self.stripped[..self.caret]
    }

    pub fn class_name(&self) -> Option<&str> {
        self.class.as_ref().map(|c| c.name.as_str())
    }

    pub fn base_types(&self) -> &[String] {
        self.class.as_ref().map(|c| c.bases.as_slice()).unwrap_or(&[])
    }

    /// Namespaces imported with `using X;` plus the enclosing namespaces.
    pub fn imported_namespaces(&self) -> Vec<Arc<str>> {
        self.namespace_prefixes
            .iter()
            .filter(|p| !p.is_empty())
            .cloned()
            .collect()
    }

    pub fn static_imports(&self) -> impl Iterator<Item = &str> {
        self.usings.iter().filter_map(|u| match u {
            UsingDirective::Static(target) => Some(target.as_ref()),
            _ => None,
        })
    }

    /// `IO.File` with `using IO = System.IO;` → `System.IO.File`
    pub fn expand_alias(&self, chain: &str) -> String {
        let head_len = chain
            .bytes()
            .take_while(|&b| is_ident_byte(b))
            .count();
        let head = &chain[..head_len];
        for using in &self.usings {
            if let UsingDirective::Alias { alias, target } = using
                && alias.as_ref() == head
            {
                return format!("{}{}", target, &chain[head_len..]);
            }
        }
        chain.to_string()
    }
}

fn clamp_to_char_boundary(text: &str, mut offset: usize) -> usize {
    offset = offset.min(text.len());
    while !text.is_char_boundary(offset) {
        offset -= 1;
    }
    offset
}

/// File-level `using` directives, in source order.
pub fn parse_usings(stripped: &str) -> Vec<UsingDirective> {
    let mut result = Vec::new();
    let mut from = 0;
    while let Some(pos) = find_word(&stripped[from..], "using") {
        let start = from + pos + "using".len();
        let Some(semi) = stripped[start..].find(';').map(|p| start + p) else {
            break;
        };
        from = start;
        let body = stripped[start..semi].trim();
        if body.contains(['(', '{', '}']) || body.starts_with("var ") {
            continue;
        }
        let dotted = |s: &str| !s.is_empty() && s.bytes().all(|b| is_ident_byte(b) || b == b'.');
        if let Some(rest) = body.strip_prefix("static")
            && rest.starts_with(char::is_whitespace)
        {
            let target = rest.trim();
            if dotted(target) {
                result.push(UsingDirective::Static(Arc::from(target)));
            }
        } else if let Some((alias, target)) = body.split_once('=') {
            let (alias, target) = (alias.trim(), target.trim());
            if alias.bytes().all(is_ident_byte) && !alias.is_empty() && !target.is_empty() {
                result.push(UsingDirective::Alias {
                    alias: Arc::from(alias),
                    target: Arc::from(target),
                });
            }
        } else if dotted(body) {
            result.push(UsingDirective::Namespace(Arc::from(body)));
        }
        from = semi + 1;
    }
    result
}

/// Enclosing namespace at `caret`: nested block namespaces are joined, a
/// file-scoped `namespace X;` applies to the rest of the file.
pub fn namespace_at(stripped: &str, caret: usize) -> Option<String> {
    let mut parts: Vec<&str> = Vec::new();
    let mut from = 0;
    while let Some(pos) = find_word(&stripped[from..], "namespace") {
        let kw = from + pos;
        if kw >= caret {
            break;
        }
        let name_start = kw + "namespace".len();
        let rest = &stripped[name_start..];
        let name_len = rest
            .trim_start()
            .bytes()
            .take_while(|&b| is_ident_byte(b) || b == b'.')
            .count();
        let lead = rest.len() - rest.trim_start().len();
        let name = &rest[lead..lead + name_len];
        let after = name_start + lead + name_len;
        from = after;
        if name.is_empty() {
            continue;
        }
        match stripped[after..].trim_start().chars().next() {
            Some(';') => parts.push(name),
            Some('{') => {
                let open = after + stripped[after..].find('{').unwrap_or(0);
                let encloses = slicer::matching_brace(stripped, open + 1)
                    .is_none_or(|close| close >= caret);
                if encloses {
                    parts.push(name);
                }
            }
            _ => {}
        }
    }
    (!parts.is_empty()).then(|| parts.join("."))
}

/// "" first, then the enclosing namespace and its parents (innermost first),
/// then the imported namespaces in directive order.
fn build_prefixes(current: Option<&str>, usings: &[UsingDirective]) -> Vec<Arc<str>> {
    let mut prefixes: Vec<Arc<str>> = vec![Arc::from("")];
    let mut seen: FxHashSet<Arc<str>> = FxHashSet::default();
    seen.insert(Arc::from(""));
    let mut push = |ns: &str, prefixes: &mut Vec<Arc<str>>| {
        let ns: Arc<str> = Arc::from(ns);
        if seen.insert(Arc::clone(&ns)) {
            prefixes.push(ns);
        }
    };
    if let Some(current) = current {
        let mut ns = current;
        loop {
            push(ns, &mut prefixes);
            match ns.rsplit_once('.') {
                Some((parent, _)) => ns = parent,
                None => break,
            }
        }
    }
    for using in usings {
        if let UsingDirective::Namespace(ns) = using {
            push(ns, &mut prefixes);
        }
    }
    prefixes
}

/// Declarations inherited from base classes found in the same source text.
fn scan_inherited(stripped: &str, region: &ClassRegion) -> Declarations {
    const MAX_DEPTH: usize = 8;
    let mut inherited = Declarations::default();
    let mut seen: FxHashSet<String> = FxHashSet::default();
    seen.insert(region.name.clone());
    let mut pending: Vec<String> = region.bases.clone();
    let mut depth = 0;
    while let Some(base) = pending.pop() {
        let simple = TypeName::from(base.as_str());
        let simple = simple.canonical_base().rsplit('.').next().unwrap_or_default().to_string();
        if !seen.insert(simple.clone()) {
            continue;
        }
        let Some(base_region) = find_type_named(stripped, &simple) else {
            continue;
        };
        let decls = scan_declarations(stripped, &base_region).inheritable();
        inherited.absorb_inherited(decls, region.body());
        pending.extend(base_region.bases.iter().cloned());
        depth += 1;
        if depth >= MAX_DEPTH {
            break;
        }
    }
    inherited
}
