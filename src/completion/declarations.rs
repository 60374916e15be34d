//! Pattern-based scanner for declarations inside one type body.
//!
//! Recognises fields, properties, methods (with parameters) and local
//! variables from token shapes such as `Type name =`, `Type Name(...) {`.
//! Anything that does not fit a known shape is skipped.

use std::ops::Range;
use std::sync::Arc;

use super::context::{DeclContext, ScopeFilter, SourceSpan};
use super::slicer::{ClassRegion, is_ident_byte};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariableKind {
    Field,
    Parameter,
    Local,
}

/// How the type of an implicitly typed (`var`) variable is obtained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VarInit {
    /// `var x = expr;` where `expr` is a member chain.
    Expr(String),
    /// `foreach (var x in expr)`: element type of `expr`.
    ElementOf(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclaredVariable {
    pub name: Arc<str>,
    /// Type as written; `var` when it has to be inferred from `init_expr`.
    pub type_name: String,
    pub span: SourceSpan,
    pub is_static: bool,
    pub kind: VariableKind,
    pub init_expr: Option<VarInit>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclaredMethod {
    pub name: Arc<str>,
    pub return_type: String,
    pub is_static: bool,
    pub span: SourceSpan,
    pub parameters: Vec<(String, String)>,
}

impl DeclaredMethod {
    pub fn signature(&self) -> String {
        let params = self
            .parameters
            .iter()
            .map(|(ty, name)| format!("{} {}", ty, name))
            .collect::<Vec<_>>()
            .join(", ");
        format!("{} {}({})", self.return_type, self.name, params)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclaredProperty {
    pub name: Arc<str>,
    pub return_type: String,
    pub is_static: bool,
    pub span: SourceSpan,
}

/// Every declaration found in one type body, unfiltered.
#[derive(Debug, Clone, Default)]
pub struct Declarations {
    pub variables: Vec<DeclaredVariable>,
    pub methods: Vec<DeclaredMethod>,
    pub properties: Vec<DeclaredProperty>,
    /// Member bodies with their static flag, for declaration-context queries.
    bodies: Vec<(SourceSpan, bool)>,
    private_members: Vec<Arc<str>>,
    class_is_static: bool,
}

fn context_allows(ctx: DeclContext, is_static: bool) -> bool {
    match ctx {
        DeclContext::Static => is_static,
        DeclContext::Instance | DeclContext::All => true,
    }
}

impl Declarations {
    /// Static if the caret is in a static member body (or a static class),
    /// Instance inside any other member body, All elsewhere.
    pub fn decl_context_at(&self, caret: usize) -> DeclContext {
        if self.class_is_static {
            return DeclContext::Static;
        }
        self.bodies
            .iter()
            .filter(|(span, _)| span.contains(caret))
            .min_by_key(|(span, _)| span.len())
            .map(|(_, is_static)| {
                if *is_static {
                    DeclContext::Static
                } else {
                    DeclContext::Instance
                }
            })
            .unwrap_or(DeclContext::All)
    }

    /// Variables under `filter` and `ctx`. Locals and parameters come first so
    /// they win over a field of the same name.
    pub fn variables(
        &self,
        filter: ScopeFilter,
        ctx: DeclContext,
        caret: usize,
    ) -> Vec<&DeclaredVariable> {
        let visible = |v: &&DeclaredVariable| match filter {
            ScopeFilter::All => true,
            ScopeFilter::VisibleOnly => v.span.contains(caret),
        };
        let allowed = |v: &&DeclaredVariable| v.kind != VariableKind::Field || context_allows(ctx, v.is_static);
        let locals = self
            .variables
            .iter()
            .filter(|v| v.kind != VariableKind::Field);
        let fields = self
            .variables
            .iter()
            .filter(|v| v.kind == VariableKind::Field);
        locals.chain(fields).filter(visible).filter(allowed).collect()
    }

    pub fn methods(&self, ctx: DeclContext) -> Vec<&DeclaredMethod> {
        self.methods
            .iter()
            .filter(|m| context_allows(ctx, m.is_static))
            .collect()
    }

    pub fn properties(&self, ctx: DeclContext) -> Vec<&DeclaredProperty> {
        self.properties
            .iter()
            .filter(|p| context_allows(ctx, p.is_static))
            .collect()
    }

    pub fn find_variable(
        &self,
        name: &str,
        caret: usize,
        ctx: DeclContext,
    ) -> Option<&DeclaredVariable> {
        self.variables(ScopeFilter::VisibleOnly, ctx, caret)
            .into_iter()
            .find(|v| v.name.as_ref() == name)
    }

    pub fn find_property(&self, name: &str, ctx: DeclContext) -> Option<&DeclaredProperty> {
        self.properties(ctx)
            .into_iter()
            .find(|p| p.name.as_ref() == name)
    }

    pub fn find_method(&self, name: &str, ctx: DeclContext) -> Option<&DeclaredMethod> {
        self.methods(ctx).into_iter().find(|m| m.name.as_ref() == name)
    }

    /// Members a derived type can see: fields, properties and methods that
    /// are not private. Locals and parameters are never inherited.
    pub fn inheritable(&self) -> Declarations {
        let keep = |name: &Arc<str>| !self.private_members.contains(name);
        Declarations {
            variables: self
                .variables
                .iter()
                .filter(|v| v.kind == VariableKind::Field && keep(&v.name))
                .cloned()
                .collect(),
            methods: self
                .methods
                .iter()
                .filter(|m| keep(&m.name))
                .cloned()
                .collect(),
            properties: self
                .properties
                .iter()
                .filter(|p| keep(&p.name))
                .cloned()
                .collect(),
            ..Declarations::default()
        }
    }

    /// Append `other`, giving every inherited field a span covering `region`.
    pub fn absorb_inherited(&mut self, other: Declarations, region: Range<usize>) {
        for mut v in other.variables {
            v.span = SourceSpan::new(region.start, region.end);
            self.variables.push(v);
        }
        self.methods.extend(other.methods);
        self.properties.extend(other.properties);
    }
}

/// Scan the body of `region` in comment-stripped `text`.
pub fn scan_declarations(text: &str, region: &ClassRegion) -> Declarations {
    let body = region.body();
    let tokens = tokenize(text, body.clone());
    let mut scanner = Scanner::new(tokens, body.end.min(text.len()), text);
    scanner.out.class_is_static = region.is_static;
    scanner.scan_members(SourceSpan::new(body.start, body.end), region.is_static);
    scanner.out
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TokenKind {
    Ident,
    Number,
    Punct,
}

#[derive(Debug, Clone, Copy)]
struct Token<'a> {
    kind: TokenKind,
    text: &'a str,
    start: usize,
}

impl<'a> Token<'a> {
    fn is(&self, c: char) -> bool {
        self.kind == TokenKind::Punct && self.text.starts_with(c)
    }

    fn ident(&self) -> Option<&'a str> {
        (self.kind == TokenKind::Ident).then_some(self.text)
    }
}

fn tokenize(text: &str, range: Range<usize>) -> Vec<Token<'_>> {
    let bytes = text.as_bytes();
    let end = range.end.min(bytes.len());
    let mut tokens = Vec::new();
    let mut i = range.start;
    while i < end {
        let b = bytes[i];
        if b.is_ascii_whitespace() {
            i += 1;
            continue;
        }
        // verbatim identifier `@class`
        if b == b'@' && i + 1 < end && is_ident_byte(bytes[i + 1]) {
            i += 1;
            continue;
        }
        let start = i;
        if is_ident_byte(b) {
            while i < end && is_ident_byte(bytes[i]) {
                i += 1;
            }
            let kind = if b.is_ascii_digit() {
                TokenKind::Number
            } else {
                TokenKind::Ident
            };
            tokens.push(Token {
                kind,
                text: &text[start..i],
                start,
            });
            continue;
        }
        i += 1;
        tokens.push(Token {
            kind: TokenKind::Punct,
            text: &text[start..i],
            start,
        });
    }
    tokens
}

const MODIFIERS: &[&str] = &[
    "public", "private", "protected", "internal", "static", "const", "readonly", "volatile",
    "virtual", "override", "abstract", "sealed", "new", "extern", "unsafe", "async", "partial",
    "event", "required", "fixed",
];

const NON_TYPE_WORDS: &[&str] = &[
    "return", "new", "throw", "if", "else", "while", "do", "for", "foreach", "switch", "case",
    "default", "break", "continue", "goto", "try", "catch", "finally", "lock", "using", "yield",
    "await", "this", "base", "null", "true", "false", "typeof", "sizeof", "nameof", "is", "as",
    "in", "out", "ref", "params", "checked", "unchecked", "get", "set", "init", "add", "remove",
    "where", "operator", "implicit", "explicit", "static", "const", "public", "private",
    "protected", "internal", "readonly", "namespace", "class", "struct", "interface", "enum",
    "delegate", "event", "when", "select", "from", "let", "stackalloc",
];

const TYPE_DECL_WORDS: &[&str] = &["class", "struct", "interface", "enum", "record"];

struct Scanner<'a> {
    text: &'a str,
    tokens: Vec<Token<'a>>,
    /// For each opening `{ ( [`, the index of its closing token.
    matching: Vec<Option<usize>>,
    end_offset: usize,
    out: Declarations,
}

impl<'a> Scanner<'a> {
    fn new(tokens: Vec<Token<'a>>, end_offset: usize, text: &'a str) -> Self {
        let mut matching = vec![None; tokens.len()];
        let mut stacks: [Vec<usize>; 3] = [Vec::new(), Vec::new(), Vec::new()];
        for (i, t) in tokens.iter().enumerate() {
            if t.kind != TokenKind::Punct {
                continue;
            }
            let (slot, open) = match t.text {
                "{" => (0, true),
                "}" => (0, false),
                "(" => (1, true),
                ")" => (1, false),
                "[" => (2, true),
                "]" => (2, false),
                _ => continue,
            };
            if open {
                stacks[slot].push(i);
            } else if let Some(o) = stacks[slot].pop() {
                matching[o] = Some(i);
            }
        }
        Self {
            text,
            tokens,
            matching,
            end_offset,
            out: Declarations::default(),
        }
    }

    fn punct_at(&self, i: usize, c: char) -> bool {
        self.tokens.get(i).is_some_and(|t| t.is(c))
    }

    fn ident_at(&self, i: usize) -> Option<&'a str> {
        self.tokens.get(i).and_then(|t| t.ident())
    }

    fn name_at(&self, i: usize) -> Option<&'a str> {
        self.ident_at(i).filter(|w| !NON_TYPE_WORDS.contains(w))
    }

    fn offset_of(&self, i: usize) -> usize {
        self.tokens.get(i).map(|t| t.start).unwrap_or(self.end_offset)
    }

    /// Offset of the closing token for the opener at `i`, or the scan end.
    fn close_offset(&self, i: usize) -> usize {
        self.matching
            .get(i)
            .copied()
            .flatten()
            .map(|j| self.tokens[j].start)
            .unwrap_or(self.end_offset)
    }

    /// Index just past the closer of the opener at `i`.
    fn after_close(&self, i: usize) -> usize {
        self.matching
            .get(i)
            .copied()
            .flatten()
            .map(|j| j + 1)
            .unwrap_or(self.tokens.len())
    }

    fn text_between(&self, from: usize, to: usize) -> String {
        let start = self.offset_of(from);
        let end = self.offset_of(to).max(start);
        self.text[start..end].trim().to_string()
    }

    /// `Ns.Type<Arg, Other<X>>?[]` starting at `i`.
    fn parse_type(&self, mut i: usize) -> Option<(String, usize)> {
        let mut out = String::new();
        if self.ident_at(i) == Some("global") && self.punct_at(i + 1, ':') && self.punct_at(i + 2, ':')
        {
            i += 3;
        }
        out.push_str(self.name_at(i)?);
        i += 1;
        while self.punct_at(i, '.')
            && let Some(next) = self.ident_at(i + 1)
        {
            out.push('.');
            out.push_str(next);
            i += 2;
        }
        if self.punct_at(i, '<') {
            out.push('<');
            i += 1;
            loop {
                let (arg, next) = self.parse_type(i)?;
                out.push_str(&arg);
                i = next;
                if self.punct_at(i, ',') {
                    out.push_str(", ");
                    i += 1;
                } else if self.punct_at(i, '>') {
                    out.push('>');
                    i += 1;
                    break;
                } else {
                    return None;
                }
            }
        }
        if self.punct_at(i, '?') {
            out.push('?');
            i += 1;
        }
        while self.punct_at(i, '[') {
            let mut j = i + 1;
            let mut rank = String::from("[");
            while self.punct_at(j, ',') {
                rank.push(',');
                j += 1;
            }
            if !self.punct_at(j, ']') {
                break;
            }
            rank.push(']');
            out.push_str(&rank);
            i = j + 1;
        }
        Some((out, i))
    }

    /// Index of the next `;` at nesting depth zero, or past a `{...}` block,
    /// whichever comes first.
    fn skip_member(&self, mut i: usize) -> usize {
        while i < self.tokens.len() {
            let t = &self.tokens[i];
            if t.is('{') {
                return self.after_close(i);
            }
            if t.is(';') {
                return i + 1;
            }
            if t.is('(') || t.is('[') {
                i = self.after_close(i);
                continue;
            }
            i += 1;
        }
        i
    }

    /// End of an initializer expression starting at `i`: the first `;` or `,`
    /// at depth zero, or an unmatched closer.
    fn expression_end(&self, mut i: usize) -> usize {
        while i < self.tokens.len() {
            let t = &self.tokens[i];
            if t.is('(') || t.is('[') || t.is('{') {
                if self.matching[i].is_none() {
                    return self.tokens.len();
                }
                i = self.after_close(i);
                continue;
            }
            if t.is(';') || t.is(',') || t.is(')') || t.is(']') || t.is('}') {
                return i;
            }
            i += 1;
        }
        i
    }

    fn scan_members(&mut self, class_span: SourceSpan, class_is_static: bool) {
        let mut i = 0;
        while i < self.tokens.len() {
            let t = self.tokens[i];
            if t.is('[') {
                i = self.after_close(i);
                continue;
            }
            if t.kind == TokenKind::Punct {
                i += 1;
                continue;
            }

            let mut is_static = class_is_static;
            let mut is_private = true;
            while let Some(word) = self.ident_at(i)
                && MODIFIERS.contains(&word)
            {
                match word {
                    "static" | "const" => is_static = true,
                    "public" | "protected" | "internal" => is_private = false,
                    _ => {}
                }
                i += 1;
            }

            if let Some(word) = self.ident_at(i)
                && (TYPE_DECL_WORDS.contains(&word) || word == "delegate")
            {
                // nested types are scanned on their own, not as members
                i = self.skip_member(i);
                continue;
            }

            let Some((ty, after_ty)) = self.parse_type(i) else {
                i = self.skip_member(i);
                continue;
            };

            // constructor: `Name(...)`
            if self.punct_at(after_ty, '(') {
                i = self.scan_method(after_ty, is_static, None);
                continue;
            }
            let Some(name) = self.name_at(after_ty) else {
                i = self.skip_member(i);
                continue;
            };
            let name_offset = self.offset_of(after_ty);
            let mut j = after_ty + 1;
            if is_private {
                self.out.private_members.push(Arc::from(name));
            }

            if self.punct_at(j, '<') {
                while j < self.tokens.len() && !self.punct_at(j, '>') {
                    j += 1;
                }
                j += 1;
            }

            if self.punct_at(j, '(') {
                let start = self.offset_of(i);
                let method = DeclaredMethod {
                    name: Arc::from(name),
                    return_type: ty,
                    is_static,
                    span: SourceSpan::new(start, start),
                    parameters: Vec::new(),
                };
                i = self.scan_method(j, is_static, Some(method));
            } else if self.punct_at(j, '{') {
                let close = self.close_offset(j);
                self.out.properties.push(DeclaredProperty {
                    name: Arc::from(name),
                    return_type: ty,
                    is_static,
                    span: SourceSpan::new(name_offset, close),
                });
                self.out
                    .bodies
                    .push((SourceSpan::new(self.offset_of(j), close), is_static));
                self.scan_body(j, is_static);
                i = self.after_close(j);
            } else if self.punct_at(j, '=') && self.punct_at(j + 1, '>') {
                let end = self.skip_member(j);
                let close = self.offset_of(end.saturating_sub(1));
                self.out.properties.push(DeclaredProperty {
                    name: Arc::from(name),
                    return_type: ty,
                    is_static,
                    span: SourceSpan::new(name_offset, close),
                });
                self.out
                    .bodies
                    .push((SourceSpan::new(self.offset_of(j), close), is_static));
                i = end;
            } else if self.punct_at(j, '=') || self.punct_at(j, ';') || self.punct_at(j, ',') {
                i = self.scan_fields(after_ty, &ty, is_static, class_span, is_private);
            } else {
                i = self.skip_member(i);
            }
        }
    }

    /// `name [= init] (, name [= init])* ;` at `i`.
    fn scan_fields(
        &mut self,
        mut i: usize,
        ty: &str,
        is_static: bool,
        class_span: SourceSpan,
        is_private: bool,
    ) -> usize {
        while let Some(name) = self.name_at(i) {
            if is_private {
                self.out.private_members.push(Arc::from(name));
            }
            self.out.variables.push(DeclaredVariable {
                name: Arc::from(name),
                type_name: ty.to_string(),
                span: class_span,
                is_static,
                kind: VariableKind::Field,
                init_expr: None,
            });
            i += 1;
            if self.punct_at(i, '=') {
                i = self.expression_end(i + 1);
            }
            if self.punct_at(i, ',') {
                i += 1;
                continue;
            }
            break;
        }
        self.skip_member(i)
    }

    /// Parameter list at `open` followed by a body. Returns the index after the member.
    fn scan_method(&mut self, open: usize, is_static: bool, method: Option<DeclaredMethod>) -> usize {
        let parameters = self.parse_parameters(open);
        let mut i = self.after_close(open);

        // skip `: base(...)`, `where T : ...` up to the body
        while i < self.tokens.len()
            && !self.punct_at(i, '{')
            && !self.punct_at(i, ';')
            && !(self.punct_at(i, '=') && self.punct_at(i + 1, '>'))
        {
            if self.punct_at(i, '(') {
                i = self.after_close(i);
            } else {
                i += 1;
            }
        }

        let (body, next) = if self.punct_at(i, '{') {
            (
                Some(SourceSpan::new(self.offset_of(i), self.close_offset(i))),
                self.after_close(i),
            )
        } else if self.punct_at(i, '=') {
            let end = self.skip_member(i);
            let close = self.offset_of(end.saturating_sub(1));
            (Some(SourceSpan::new(self.offset_of(i), close)), end)
        } else {
            (None, (i + 1).min(self.tokens.len()))
        };

        if let Some(body) = body {
            for (ty, name, offset) in &parameters {
                self.out.variables.push(DeclaredVariable {
                    name: Arc::from(name.as_str()),
                    type_name: ty.clone(),
                    span: SourceSpan::new((*offset).min(body.start), body.end),
                    is_static,
                    kind: VariableKind::Parameter,
                    init_expr: None,
                });
            }
            self.out.bodies.push((body, is_static));
            if self.punct_at(i, '{') {
                self.scan_body(i, is_static);
            }
        }

        if let Some(mut method) = method {
            let end = body.map(|b| b.end).unwrap_or_else(|| self.offset_of(i));
            method.span = SourceSpan::new(method.span.start, end);
            method.parameters = parameters
                .into_iter()
                .map(|(ty, name, _)| (ty, name))
                .collect();
            self.out.methods.push(method);
        }
        next
    }

    /// `(Type a, ref Type b = x, params T[] c)` → (type, name, name offset)
    fn parse_parameters(&self, open: usize) -> Vec<(String, String, usize)> {
        let close = self.matching[open].unwrap_or(self.tokens.len());
        let mut params = Vec::new();
        let mut i = open + 1;
        while i < close {
            if self.punct_at(i, '[') {
                i = self.after_close(i);
                continue;
            }
            while matches!(
                self.ident_at(i),
                Some("this" | "ref" | "out" | "in" | "params" | "scoped" | "readonly")
            ) {
                i += 1;
            }
            if let Some((ty, after)) = self.parse_type(i)
                && let Some(name) = self.name_at(after)
            {
                params.push((ty, name.to_string(), self.offset_of(after)));
                i = after + 1;
            }
            // advance to the next top-level comma
            while i < close && !self.punct_at(i, ',') {
                if self.punct_at(i, '(') || self.punct_at(i, '[') || self.punct_at(i, '{') {
                    i = self.after_close(i);
                } else {
                    i += 1;
                }
            }
            i += 1;
        }
        params
    }

    /// Local declarations inside the block opened at `open`.
    fn scan_body(&mut self, open: usize, is_static: bool) {
        let close = self.matching[open].unwrap_or(self.tokens.len());
        let mut blocks: Vec<usize> = vec![open];
        let mut i = open + 1;
        while i < close {
            let t = self.tokens[i];
            if t.is('{') {
                blocks.push(i);
                i += 1;
                continue;
            }
            if t.is('}') {
                blocks.pop();
                i += 1;
                continue;
            }
            let prev = self.tokens[i - 1];
            let block = blocks.last().copied().unwrap_or(open);
            if prev.is('{') || prev.is(';') || prev.is('}') {
                self.local_statement(i, self.close_offset(block), is_static);
            } else if prev.is('(') {
                self.header_declaration(i, is_static);
            } else if prev.ident() == Some("out") {
                self.out_declaration(i, self.close_offset(block), is_static);
            }
            i += 1;
        }
    }

    fn push_local(
        &mut self,
        name_idx: usize,
        type_name: &str,
        scope_end: usize,
        is_static: bool,
        init_expr: Option<VarInit>,
    ) {
        let Some(name) = self.name_at(name_idx) else {
            return;
        };
        self.out.variables.push(DeclaredVariable {
            name: Arc::from(name),
            type_name: type_name.to_string(),
            span: SourceSpan::new(self.offset_of(name_idx), scope_end),
            is_static,
            kind: VariableKind::Local,
            init_expr,
        });
    }

    /// `[const|using] Type a = x, b;` or `var a = expr;`
    fn local_statement(&mut self, mut i: usize, scope_end: usize, is_static: bool) {
        while matches!(self.ident_at(i), Some("const" | "using" | "await" | "scoped" | "ref" | "readonly")) {
            i += 1;
        }
        let Some((ty, mut j)) = self.declared_type(i) else {
            return;
        };
        while self.name_at(j).is_some() {
            let follows = self.tokens.get(j + 1);
            if !follows.is_some_and(|t| t.is('=') || t.is(';') || t.is(',')) {
                return;
            }
            if follows.is_some_and(|t| t.is('=')) && self.punct_at(j + 2, '>') {
                return;
            }
            let name_idx = j;
            let mut next = j + 1;
            let mut init = None;
            let mut written = ty.clone();
            if self.punct_at(next, '=') {
                let end = self.expression_end(next + 1);
                if ty == "var" {
                    written = self.infer_initializer(next + 1, end, &mut init);
                }
                next = end;
            }
            self.push_local(name_idx, &written, scope_end, is_static, init);
            if !self.punct_at(next, ',') {
                return;
            }
            j = next + 1;
        }
    }

    /// Declarations inside `foreach (...)`, `using (...)`, `for (...)`, `catch (...)`, `fixed (...)`.
    fn header_declaration(&mut self, i: usize, is_static: bool) {
        let open = i - 1;
        let keyword = if open > 0 { self.ident_at(open - 1) } else { None };
        if !matches!(keyword, Some("foreach" | "using" | "for" | "catch" | "fixed")) {
            return;
        }
        let Some((ty, j)) = self.declared_type(i) else {
            return;
        };
        if self.name_at(j).is_none() {
            return;
        }
        // scope: the statement controlled by the header
        let after_header = self.after_close(open);
        let scope_end = if self.punct_at(after_header, '{') {
            self.close_offset(after_header)
        } else {
            let mut k = after_header;
            while k < self.tokens.len() && !self.punct_at(k, ';') {
                k += 1;
            }
            self.offset_of(k)
        };
        let header_close = self.matching[open].unwrap_or(self.tokens.len());

        match keyword {
            Some("foreach") if self.ident_at(j + 1) == Some("in") => {
                let init = (ty == "var").then(|| VarInit::ElementOf(self.text_between(j + 2, header_close)));
                self.push_local(j, &ty, scope_end, is_static, init);
            }
            Some("catch") if self.punct_at(j + 1, ')') => {
                self.push_local(j, &ty, scope_end, is_static, None);
            }
            Some("using" | "for" | "fixed") if self.punct_at(j + 1, '=') => {
                let end = self.expression_end(j + 2);
                let mut init = None;
                let written = if ty == "var" {
                    self.infer_initializer(j + 2, end, &mut init)
                } else {
                    ty
                };
                self.push_local(j, &written, scope_end, is_static, init);
            }
            _ => {}
        }
    }

    /// `Foo(out var x)` / `Foo(out int x)`
    fn out_declaration(&mut self, i: usize, scope_end: usize, is_static: bool) {
        if self.ident_at(i) == Some("var") {
            return;
        }
        if let Some((ty, j)) = self.parse_type(i)
            && self.name_at(j).is_some()
            && (self.punct_at(j + 1, ')') || self.punct_at(j + 1, ','))
        {
            self.push_local(j, &ty, scope_end, is_static, None);
        }
    }

    fn declared_type(&self, i: usize) -> Option<(String, usize)> {
        if self.ident_at(i) == Some("var") {
            return Some(("var".to_string(), i + 1));
        }
        self.parse_type(i)
    }

    /// Best-effort type for `var x = <init>`; falls back to keeping the
    /// initializer text for chain resolution.
    fn infer_initializer(&self, from: usize, to: usize, init: &mut Option<VarInit>) -> String {
        let Some(first) = self.tokens.get(from) else {
            return "var".to_string();
        };
        if first.ident() == Some("new")
            && let Some((ty, after)) = self.parse_type(from + 1)
        {
            if self.punct_at(after, '[') {
                return format!("{}[]", ty);
            }
            return ty;
        }
        if first.is('"') || first.is('$') || first.is('@') {
            return "string".to_string();
        }
        if first.is('\'') {
            return "char".to_string();
        }
        if first.kind == TokenKind::Number {
            let literal = self.text_between(from, to);
            let is_real = literal.contains('.')
                || literal.ends_with(['f', 'F', 'd', 'D', 'm', 'M']) && !literal.starts_with("0x");
            return if is_real { "double" } else { "int" }.to_string();
        }
        if matches!(first.ident(), Some("true" | "false")) {
            return "bool".to_string();
        }
        // `(Foo)expr`
        if first.is('(')
            && let Some((ty, after)) = self.parse_type(from + 1)
            && self.punct_at(after, ')')
            && after + 1 < to
        {
            return ty;
        }
        // `expr as Foo`
        if let Some(as_idx) = (from..to).rev().find(|&k| self.ident_at(k) == Some("as"))
            && let Some((ty, after)) = self.parse_type(as_idx + 1)
            && after == to
        {
            return ty;
        }
        *init = Some(VarInit::Expr(self.text_between(from, to)));
        "var".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::completion::slicer::{enclosing_class, strip_comments_and_strings};

    fn scan(src: &str) -> (Declarations, usize) {
        let caret = src.find('|').expect("caret marker");
        let text = src.replace('|', "");
        let stripped = strip_comments_and_strings(&text);
        let region = enclosing_class(&stripped, caret).expect("class region");
        (scan_declarations(&stripped, &region), caret)
    }

    fn names(vars: &[&DeclaredVariable]) -> Vec<String> {
        vars.iter().map(|v| v.name.to_string()).collect()
    }

    #[test]
    fn test_fields_methods_properties() {
        let (decls, _) = scan(
            "class Foo {
                private string s, t = \"x\";
                public static int Count;
                const double Pi = 3.14;
                public List<int> Items { get; set; }
                public static Foo Instance => null;
                int Sum(int a, string b) { return a; }
                static void Main(string[] args) { | }
            }",
        );
        let fields: Vec<_> = decls
            .variables
            .iter()
            .filter(|v| v.kind == VariableKind::Field)
            .map(|v| (v.name.to_string(), v.type_name.clone(), v.is_static))
            .collect();
        assert_eq!(
            fields,
            vec![
                ("s".to_string(), "string".to_string(), false),
                ("t".to_string(), "string".to_string(), false),
                ("Count".to_string(), "int".to_string(), true),
                ("Pi".to_string(), "double".to_string(), true),
            ]
        );
        let props: Vec<_> = decls.properties.iter().map(|p| p.name.to_string()).collect();
        assert_eq!(props, vec!["Items", "Instance"]);
        assert_eq!(decls.properties[0].return_type, "List<int>");
        let methods: Vec<_> = decls
            .methods
            .iter()
            .map(|m| (m.name.to_string(), m.is_static))
            .collect();
        assert_eq!(
            methods,
            vec![("Sum".to_string(), false), ("Main".to_string(), true)]
        );
        assert_eq!(decls.methods[0].signature(), "int Sum(int a, string b)");
    }

    #[test]
    fn test_static_context_filters_instance_members() {
        let (decls, caret) = scan(
            "class Foo {
                string s;
                static int n;
                static void Main(string[] args) { int local = 1; | }
            }",
        );
        let ctx = decls.decl_context_at(caret);
        assert_eq!(ctx, DeclContext::Static);
        let visible = decls.variables(ScopeFilter::VisibleOnly, ctx, caret);
        assert_eq!(names(&visible), vec!["args", "local", "n"]);
        assert!(decls.methods(ctx).iter().all(|m| m.is_static));
    }

    #[test]
    fn test_local_visibility_follows_blocks() {
        let (decls, caret) = scan(
            "class Foo {
                void M(int p) {
                    int before = 1;
                    if (p > 0) { string inner = null; }
                    |
                    int after = 2;
                }
                void Other() { int elsewhere; }
            }",
        );
        let ctx = decls.decl_context_at(caret);
        assert_eq!(ctx, DeclContext::Instance);
        let visible = decls.variables(ScopeFilter::VisibleOnly, ctx, caret);
        assert_eq!(names(&visible), vec!["p", "before"]);
        let all = decls.variables(ScopeFilter::All, ctx, caret);
        assert_eq!(all.len(), 5);
    }

    #[test]
    fn test_var_foreach_using_and_out() {
        let (decls, caret) = scan(
            "class Foo {
                void M(List<string> items) {
                    var sb = new StringBuilder();
                    var arr = new int[3];
                    var text = items.First();
                    var n = 42;
                    using (var reader = new StreamReader(path)) { }
                    foreach (var item in items) { | }
                    int.TryParse(\"1\", out int parsed);
                    try { } catch (IOException ex) { }
                }
            }",
        );
        let find = |n: &str| decls.variables.iter().find(|v| v.name.as_ref() == n).unwrap();
        assert_eq!(find("sb").type_name, "StringBuilder");
        assert_eq!(find("arr").type_name, "int[]");
        assert_eq!(find("n").type_name, "int");
        assert_eq!(find("text").type_name, "var");
        assert_eq!(
            find("text").init_expr,
            Some(VarInit::Expr("items.First()".to_string()))
        );
        assert_eq!(find("reader").type_name, "StreamReader");
        assert_eq!(find("item").init_expr, Some(VarInit::ElementOf("items".to_string())));
        assert_eq!(find("parsed").type_name, "int");
        assert_eq!(find("ex").type_name, "IOException");
        assert!(find("item").span.contains(caret));
        assert!(!find("reader").span.contains(caret), "using scope ends with its block");
    }

    #[test]
    fn test_nested_type_members_are_not_collected() {
        let (decls, _) = scan(
            "class Outer {
                class Inner { public int hidden; void Nope() {} }
                int shown;
                void M() { | }
            }",
        );
        let fields: Vec<_> = decls.variables.iter().map(|v| v.name.to_string()).collect();
        assert_eq!(fields, vec!["shown"]);
        assert!(decls.methods.iter().all(|m| m.name.as_ref() != "Nope"));
    }

    #[test]
    fn test_inheritable_drops_private_and_locals() {
        let (decls, _) = scan(
            "class Bar {
                protected int count;
                int secret;
                public string Name { get; set; }
                private void Hidden() {}
                public void Shown() { int local; | }
            }",
        );
        let inherited = decls.inheritable();
        let vars: Vec<_> = inherited.variables.iter().map(|v| v.name.to_string()).collect();
        assert_eq!(vars, vec!["count"]);
        let methods: Vec<_> = inherited.methods.iter().map(|m| m.name.to_string()).collect();
        assert_eq!(methods, vec!["Shown"]);
        assert_eq!(inherited.properties.len(), 1);
    }

    #[test]
    fn test_unparseable_constructs_are_skipped() {
        let (decls, _) = scan(
            "class Foo {
                public static Foo operator +(Foo a, Foo b) { return a; }
                public int this[int i] { get { return i; } }
                ~Foo() { }
                int ok;
                void M() { a < b; x ? y : z; | }
            }",
        );
        let fields: Vec<_> = decls
            .variables
            .iter()
            .filter(|v| v.kind == VariableKind::Field)
            .map(|v| v.name.to_string())
            .collect();
        assert_eq!(fields, vec!["ok"]);
    }
}
