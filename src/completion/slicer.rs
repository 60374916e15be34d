//! Text-level helpers that approximate a parser: comment/string blanking,
//! enclosing type-declaration detection and brace matching.
//!
//! Every transformation preserves byte offsets, so an offset into the
//! stripped text is an offset into the original buffer.

use std::ops::Range;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionKind {
    LineComment,
    BlockComment,
    StringBody,
}

/// A comment or string-literal body found in source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NeutralRegion {
    pub kind: RegionKind,
    /// Comments include their delimiters; string bodies exclude the quotes.
    pub range: Range<usize>,
}

impl NeutralRegion {
    /// Whether a caret at `offset` sits inside this region.
    pub fn contains_caret(&self, offset: usize) -> bool {
        match self.kind {
            RegionKind::LineComment => self.range.start < offset && offset <= self.range.end,
            RegionKind::BlockComment => self.range.start < offset && offset < self.range.end,
            RegionKind::StringBody => self.range.start <= offset && offset <= self.range.end,
        }
    }
}

/// Find every comment and string body. Unterminated strings end at the line
/// break, unterminated block comments at the end of input.
pub fn neutral_regions(source: &str) -> Vec<NeutralRegion> {
    let bytes = source.as_bytes();
    let mut regions = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'/' if bytes.get(i + 1) == Some(&b'/') => {
                let end = find_byte(bytes, i, b'\n').unwrap_or(bytes.len());
                regions.push(NeutralRegion {
                    kind: RegionKind::LineComment,
                    range: i..end,
                });
                i = end;
            }
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                let end = source[i + 2..]
                    .find("*/")
                    .map(|p| i + 2 + p + 2)
                    .unwrap_or(bytes.len());
                regions.push(NeutralRegion {
                    kind: RegionKind::BlockComment,
                    range: i..end,
                });
                i = end;
            }
            b'"' => {
                let verbatim = (i > 0 && bytes[i - 1] == b'@')
                    || (i > 1 && bytes[i - 1] == b'$' && bytes[i - 2] == b'@');
                let (end, next) = string_end(bytes, i + 1, b'"', verbatim);
                regions.push(NeutralRegion {
                    kind: RegionKind::StringBody,
                    range: i + 1..end,
                });
                i = next;
            }
            b'\'' => {
                let (end, next) = string_end(bytes, i + 1, b'\'', false);
                regions.push(NeutralRegion {
                    kind: RegionKind::StringBody,
                    range: i + 1..end,
                });
                i = next;
            }
            _ => i += 1,
        }
    }
    regions
}

fn find_byte(bytes: &[u8], from: usize, needle: u8) -> Option<usize> {
    bytes[from..].iter().position(|&b| b == needle).map(|p| from + p)
}

/// Returns (end of body, index after the closing quote).
fn string_end(bytes: &[u8], mut i: usize, quote: u8, verbatim: bool) -> (usize, usize) {
    while i < bytes.len() {
        let b = bytes[i];
        if verbatim {
            if b == quote {
                if bytes.get(i + 1) == Some(&quote) {
                    i += 2;
                    continue;
                }
                return (i, i + 1);
            }
        } else {
            if b == b'\\' {
                i += 2;
                continue;
            }
            if b == quote {
                return (i, i + 1);
            }
            if b == b'\n' {
                return (i, i);
            }
        }
        i += 1;
    }
    (bytes.len(), bytes.len())
}

/// Replace comment text and string contents with spaces. Line breaks and
/// quote characters survive, so offsets and line numbers stay valid.
pub fn strip_comments_and_strings(source: &str) -> String {
    let mut out = source.as_bytes().to_vec();
    for region in neutral_regions(source) {
        let end = region.range.end.min(out.len());
        for b in &mut out[region.range.start..end] {
            if *b != b'\n' && *b != b'\r' {
                *b = b' ';
            }
        }
    }
    // every replaced byte is ASCII space, so multibyte sequences are either
    // kept whole or blanked whole
    String::from_utf8(out).unwrap_or_else(|e| String::from_utf8_lossy(e.as_bytes()).into_owned())
}

pub fn is_in_comment_or_string(source: &str, caret: usize) -> bool {
    neutral_regions(source)
        .iter()
        .any(|r| r.contains_caret(caret))
}

/// Given an offset just past an opening brace, find the offset of its
/// matching closing brace.
pub fn matching_brace(stripped: &str, after_open: usize) -> Option<usize> {
    let mut depth = 1i32;
    for (i, b) in stripped.as_bytes().iter().enumerate().skip(after_open) {
        match b {
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

pub(crate) fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b >= 0x80
}

const TYPE_KEYWORDS: [&str; 4] = ["class", "struct", "interface", "record"];

/// Offsets of type-declaration keywords (`class Foo`, `struct Bar`, ...).
/// Generic constraints such as `where T : class` are not declarations.
pub fn type_declaration_offsets(stripped: &str) -> Vec<usize> {
    let bytes = stripped.as_bytes();
    let mut result = Vec::new();
    for kw in TYPE_KEYWORDS {
        let mut from = 0;
        while let Some(pos) = stripped[from..].find(kw) {
            let start = from + pos;
            let end = start + kw.len();
            from = end;
            if start > 0 && (is_ident_byte(bytes[start - 1]) || bytes[start - 1] == b'.') {
                continue;
            }
            if end >= bytes.len() || !bytes[end].is_ascii_whitespace() {
                continue;
            }
            let rest = stripped[end..].trim_start();
            if rest.bytes().next().is_some_and(|b| is_ident_byte(b) && !b.is_ascii_digit()) {
                result.push(start);
            }
        }
    }
    result.sort_unstable();
    result
}

pub fn is_before_first_type(stripped: &str, caret: usize) -> bool {
    type_declaration_offsets(stripped)
        .first()
        .is_none_or(|&first| first >= caret)
}

/// The type declaration enclosing the caret, as found by brace matching.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassRegion {
    /// Offset of the declaration keyword.
    pub start: usize,
    /// Offset just past the opening brace.
    pub body_start: usize,
    /// Offset of the closing brace, or the end of the slice when unclosed.
    pub end: usize,
    pub name: String,
    pub bases: Vec<String>,
    pub is_static: bool,
}

impl ClassRegion {
    pub fn body(&self) -> Range<usize> {
        self.body_start..self.end
    }
}

/// Locate the class enclosing `caret` in comment-stripped text.
///
/// The nearest declaration before the caret is tried first; the region ends
/// at its matching brace or, when the brace is unbalanced, at the next
/// declaration after the caret. A declaration whose body closes before the
/// caret is skipped in favour of an earlier one. Returns `None` when no
/// declaration with an opening brace encloses the caret.
pub fn enclosing_class(stripped: &str, caret: usize) -> Option<ClassRegion> {
    let offsets = type_declaration_offsets(stripped);
    let limit = offsets
        .iter()
        .copied()
        .find(|&o| o >= caret)
        .unwrap_or(stripped.len());

    for &start in offsets.iter().rev().filter(|&&o| o < caret) {
        let Some(region) = region_at(stripped, start, limit.max(caret)) else {
            continue;
        };
        if region.body_start > caret || region.end < caret {
            continue;
        }
        return Some(region);
    }
    None
}

/// The declaration of type `name` anywhere in `stripped`.
pub fn find_type_named(stripped: &str, name: &str) -> Option<ClassRegion> {
    type_declaration_offsets(stripped)
        .into_iter()
        .filter_map(|start| region_at(stripped, start, stripped.len()))
        .find(|region| region.name == name)
}

fn region_at(stripped: &str, start: usize, unclosed_end: usize) -> Option<ClassRegion> {
    let open = stripped[start..].find('{').map(|p| start + p)?;
    let header = &stripped[start..open];
    if header.contains(';') {
        return None;
    }
    let end = matching_brace(stripped, open + 1).unwrap_or(unclosed_end.max(open + 1));
    let (name, bases) = parse_header(header);
    Some(ClassRegion {
        start,
        body_start: open + 1,
        end,
        name,
        bases,
        is_static: has_static_modifier(stripped, start),
    })
}

/// `class Foo<T> : Bar, IBaz where T : new()` → ("Foo", ["Bar", "IBaz"])
fn parse_header(header: &str) -> (String, Vec<String>) {
    let after_kw = header
        .split_once(char::is_whitespace)
        .map(|(_, rest)| rest.trim_start())
        .unwrap_or("");
    let name: String = after_kw
        .bytes()
        .take_while(|&b| is_ident_byte(b))
        .map(char::from)
        .collect();

    let mut bases = Vec::new();
    let mut depth = 0i32;
    let mut colon = None;
    for (i, c) in after_kw.char_indices() {
        match c {
            '<' | '(' => depth += 1,
            '>' | ')' => depth -= 1,
            ':' if depth == 0 => {
                colon = Some(i);
                break;
            }
            _ => {}
        }
    }
    if let Some(colon) = colon {
        let list = &after_kw[colon + 1..];
        let list = match find_word(list, "where") {
            Some(w) => &list[..w],
            None => list,
        };
        let mut depth = 0i32;
        let mut current = String::new();
        for c in list.chars() {
            match c {
                '<' => depth += 1,
                '>' => depth -= 1,
                ',' if depth == 0 => {
                    push_base(&mut bases, &current);
                    current.clear();
                    continue;
                }
                _ => {}
            }
            current.push(c);
        }
        push_base(&mut bases, &current);
    }
    (name, bases)
}

fn push_base(bases: &mut Vec<String>, text: &str) {
    let compact: String = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if !compact.is_empty() {
        bases.push(compact);
    }
}

pub(crate) fn find_word(text: &str, word: &str) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut from = 0;
    while let Some(p) = text[from..].find(word) {
        let start = from + p;
        let end = start + word.len();
        let before_ok = start == 0 || !is_ident_byte(bytes[start - 1]);
        let after_ok = end >= bytes.len() || !is_ident_byte(bytes[end]);
        if before_ok && after_ok {
            return Some(start);
        }
        from = end;
    }
    None
}

/// Modifiers between the previous statement boundary and `offset`.
pub(crate) fn modifiers_before(stripped: &str, offset: usize) -> &str {
    let head = &stripped[..offset];
    let boundary = head
        .rfind(|c| matches!(c, ';' | '{' | '}' | ']' | ')'))
        .map(|p| p + 1)
        .unwrap_or(0);
    &head[boundary..]
}

fn has_static_modifier(stripped: &str, offset: usize) -> bool {
    find_word(modifiers_before(stripped, offset), "static").is_some()
}

/// Start of the line containing `offset`.
pub fn line_start(text: &str, offset: usize) -> usize {
    text[..offset].rfind('\n').map(|p| p + 1).unwrap_or(0)
}

/// If the caret line is a namespace import (`using System.Te|`), the partial
/// namespace typed so far. `using (...)` statements and `using var` are not.
pub fn using_directive_partial(pre_caret: &str) -> Option<String> {
    let line = pre_caret[line_start(pre_caret, pre_caret.len())..].trim_start();
    let rest = line.strip_prefix("using")?;
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }
    let mut rest = rest.trim_start();
    if let Some(after) = rest.strip_prefix("static")
        && after.starts_with(char::is_whitespace)
    {
        rest = after.trim_start();
    }
    if let Some((alias, target)) = rest.split_once('=') {
        if !alias.trim().bytes().all(is_ident_byte) {
            return None;
        }
        rest = target.trim_start();
    }
    if rest.starts_with("var ") {
        return None;
    }
    rest.bytes()
        .all(|b| is_ident_byte(b) || b == b'.')
        .then(|| rest.to_string())
}

/// `//$path`, `//?opt`, `//&x` on the caret line: the embedded-option marker
/// and the text after it.
pub fn embedded_option(pre_caret: &str) -> Option<(char, &str)> {
    let line = &pre_caret[line_start(pre_caret, pre_caret.len())..];
    let trimmed = line.trim_start();
    let rest = trimmed.strip_prefix("//")?;
    let marker = rest.chars().next()?;
    matches!(marker, '$' | '?' | '&').then(|| (marker, &rest[marker.len_utf8()..]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_preserves_offsets() {
        let src = "int a; // note\nstring s = \"x{y}\"; /* {{ */ char c = '}';";
        let stripped = strip_comments_and_strings(src);
        assert_eq!(stripped.len(), src.len());
        assert!(!stripped.contains("note"));
        assert!(!stripped.contains('{'));
        assert!(!stripped.contains('}'));
        assert_eq!(&stripped[..6], "int a;");
        assert_eq!(stripped.find('\n'), src.find('\n'));
    }

    #[test]
    fn test_verbatim_string_with_doubled_quote() {
        let src = r#"var p = @"C:\dir\""quoted"""; int x;"#;
        let stripped = strip_comments_and_strings(src);
        assert!(stripped.ends_with("; int x;"), "got {:?}", stripped);
    }

    #[test]
    fn test_caret_in_comment_or_string() {
        let src = "a.b; // x.\nvar s = \"abc.";
        assert!(is_in_comment_or_string(src, src.find("x.").unwrap() + 2));
        assert!(is_in_comment_or_string(src, src.len()));
        assert!(!is_in_comment_or_string(src, 4));
    }

    #[test]
    fn test_enclosing_class_with_bases() {
        let src = "namespace N { public class Foo<T> : Bar, IList<T> where T : class { void M() { x.";
        let stripped = strip_comments_and_strings(src);
        let region = enclosing_class(&stripped, src.len()).expect("region");
        assert_eq!(region.name, "Foo");
        assert_eq!(region.bases, vec!["Bar", "IList<T>"]);
        assert_eq!(region.end, src.len(), "unclosed class runs to the caret");
        assert!(!region.is_static);
    }

    #[test]
    fn test_enclosing_class_skips_closed_nested_type() {
        let src = "class Outer { class Inner { int a; } void M() { } }";
        let caret = src.find("void").unwrap();
        let region = enclosing_class(src, caret).unwrap();
        assert_eq!(region.name, "Outer");
        assert_eq!(region.end, src.len() - 1);
    }

    #[test]
    fn test_no_brace_means_no_region() {
        assert!(enclosing_class("class Foo", 9).is_none());
        assert!(enclosing_class("int x = 1;", 5).is_none());
    }

    #[test]
    fn test_find_type_named() {
        let src = "class Bar { int x; } class Foo : Bar { void M() { } }";
        let bar = find_type_named(src, "Bar").unwrap();
        assert_eq!(&src[bar.body()], " int x; ");
        assert!(find_type_named(src, "Baz").is_none());
    }

    #[test]
    fn test_constraint_is_not_a_declaration() {
        let offsets = type_declaration_offsets("void M<T>() where T : class, new() {}");
        assert!(offsets.is_empty());
    }

    #[test]
    fn test_static_class_modifier() {
        let src = "public static class Util { ";
        let region = enclosing_class(src, src.len()).unwrap();
        assert!(region.is_static);
    }

    #[test]
    fn test_using_directive_partial() {
        assert_eq!(using_directive_partial("using Sy").as_deref(), Some("Sy"));
        assert_eq!(using_directive_partial("x;\nusing System.").as_deref(), Some("System."));
        assert_eq!(using_directive_partial("using static System.Ma").as_deref(), Some("System.Ma"));
        assert_eq!(using_directive_partial("using IO = System.I").as_deref(), Some("System.I"));
        assert!(using_directive_partial("using (var f = File.").is_none());
        assert!(using_directive_partial("usingx").is_none());
    }

    #[test]
    fn test_embedded_option_marker() {
        assert_eq!(embedded_option("  //$C:\\te"), Some(('$', "C:\\te")));
        assert_eq!(embedded_option("//?"), Some(('?', "")));
        assert!(embedded_option("// $x").is_none());
        assert!(embedded_option("a.b").is_none());
    }
}
