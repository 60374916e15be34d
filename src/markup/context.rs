use super::dictionary::MarkupDictionary;

/// Where the caret sits inside markup, decided from the text before it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkupTarget {
    /// Text content, a comment or a declaration: no lookup.
    Content,
    /// `<di|`
    TagName { partial: String },
    /// `</|`
    ClosingTag { partial: String },
    /// `<a hr|`
    AttributeName {
        tag: String,
        partial: String,
        present: Vec<String>,
    },
    /// `<a target="_b|`
    AttributeValue {
        tag: String,
        attribute: String,
        partial: String,
    },
}

/// Odd number of `"` means the text ends inside an attribute value.
pub fn in_quoted_value(fragment: &str) -> bool {
    fragment.bytes().filter(|&b| b == b'"').count() % 2 == 1
}

/// Classify the caret from the fragment after the last `<`.
pub fn classify(pre_caret: &str) -> MarkupTarget {
    if in_markup_comment(pre_caret) {
        return MarkupTarget::Content;
    }
    let Some(lt) = pre_caret.rfind('<') else {
        return MarkupTarget::Content;
    };
    let fragment = &pre_caret[lt + 1..];
    let quoted = in_quoted_value(fragment);
    if !quoted && fragment.contains('>') {
        return MarkupTarget::Content;
    }
    if fragment.starts_with(['!', '?', '%']) {
        return MarkupTarget::Content;
    }
    if let Some(rest) = fragment.strip_prefix('/') {
        return MarkupTarget::ClosingTag {
            partial: rest.trim().to_string(),
        };
    }
    let Some(space) = fragment.find(char::is_whitespace) else {
        return MarkupTarget::TagName {
            partial: fragment.to_string(),
        };
    };
    let tag = fragment[..space].to_string();
    let attrs = &fragment[space..];

    if quoted {
        let open = attrs.rfind('"').unwrap_or(0);
        let before = attrs[..open].trim_end();
        let Some(before) = before.strip_suffix('=') else {
            return MarkupTarget::Content;
        };
        let attribute = last_word(before.trim_end()).to_string();
        return MarkupTarget::AttributeValue {
            tag,
            attribute,
            partial: attrs[open + 1..].to_string(),
        };
    }

    let partial = last_word(attrs);
    if partial.contains(['=', '"', '\'']) || attrs.trim_end().ends_with('=') {
        return MarkupTarget::Content;
    }
    MarkupTarget::AttributeName {
        tag,
        partial: partial.to_string(),
        present: present_attributes(attrs),
    }
}

fn last_word(text: &str) -> &str {
    let start = text
        .rfind(|c: char| c.is_whitespace())
        .map_or(0, |p| p + 1);
    &text[start..]
}

/// Attribute names already written in the open tag; quoted values are skipped.
fn present_attributes(attrs: &str) -> Vec<String> {
    let mut names = Vec::new();
    let mut in_quote = false;
    // the next word is an unquoted value, not a name
    let mut value_next = false;
    let mut current = String::new();
    for ch in attrs.chars() {
        if ch == '"' {
            in_quote = !in_quote;
            value_next = false;
            continue;
        }
        if in_quote {
            continue;
        }
        if ch.is_alphanumeric() || matches!(ch, '-' | ':' | '_') {
            current.push(ch);
            continue;
        }
        if !current.is_empty() {
            let word = std::mem::take(&mut current);
            if value_next {
                value_next = false;
            } else {
                names.push(word.to_ascii_lowercase());
            }
        }
        if ch == '=' {
            value_next = true;
        }
    }
    names
}

fn in_markup_comment(pre_caret: &str) -> bool {
    match (pre_caret.rfind("<!--"), pre_caret.rfind("-->")) {
        (Some(open), Some(close)) => open > close,
        (Some(_), None) => true,
        _ => false,
    }
}

/// Server-side code embedded in markup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptDialect {
    /// `<?php ... ?>` and `<?= ... ?>`
    Php,
    /// `<% ... %>`, as in ERB/RHTML templates
    Erb,
}

impl ScriptDialect {
    fn markers(self) -> (&'static str, &'static str) {
        match self {
            ScriptDialect::Php => ("<?", "?>"),
            ScriptDialect::Erb => ("<%", "%>"),
        }
    }
}

/// True when the nearest preceding open marker comes after the nearest
/// preceding close marker.
pub fn in_embedded_code(pre_caret: &str, dialect: ScriptDialect) -> bool {
    let (open, close) = dialect.markers();
    match (pre_caret.rfind(open), pre_caret.rfind(close)) {
        (Some(o), Some(c)) => o > c,
        (Some(_), None) => true,
        _ => false,
    }
}

/// Elements opened before the caret and not yet closed, innermost first.
/// Void elements and self-closed tags are skipped; a closing tag pops back
/// to its matching opener.
pub fn unclosed_tags(pre_caret: &str, dict: &MarkupDictionary) -> Vec<String> {
    let mut stack: Vec<String> = Vec::new();
    let mut rest = pre_caret;
    while let Some(lt) = rest.find('<') {
        let after = &rest[lt + 1..];
        let Some(gt) = after.find('>') else {
            break;
        };
        let inner = &after[..gt];
        rest = &after[gt + 1..];
        if inner.starts_with(['!', '?', '%']) {
            continue;
        }
        if let Some(name) = inner.strip_prefix('/') {
            let name = name.trim().to_ascii_lowercase();
            if let Some(pos) = stack.iter().rposition(|t| *t == name) {
                stack.truncate(pos);
            }
            continue;
        }
        let name: String = inner
            .chars()
            .take_while(|c| c.is_alphanumeric() || matches!(c, '-' | ':' | '_'))
            .collect::<String>()
            .to_ascii_lowercase();
        if name.is_empty() || inner.trim_end().ends_with('/') || dict.is_void(&name) {
            continue;
        }
        stack.push(name);
    }
    stack.reverse();
    stack
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markup::dictionary::Dialect;

    #[test]
    fn test_quote_parity() {
        assert!(!in_quoted_value(""));
        assert!(in_quoted_value("a href=\"x"));
        assert!(!in_quoted_value("a href=\"x\" "));
        assert!(in_quoted_value("a title=\"\" href=\"x"));
    }

    #[test]
    fn test_classify_states() {
        assert_eq!(
            classify("<body><di"),
            MarkupTarget::TagName { partial: "di".into() }
        );
        assert_eq!(classify("<body>text"), MarkupTarget::Content);
        assert_eq!(
            classify("<div></"),
            MarkupTarget::ClosingTag { partial: String::new() }
        );
        assert_eq!(
            classify("<a class=\"x\" hr"),
            MarkupTarget::AttributeName {
                tag: "a".into(),
                partial: "hr".into(),
                present: vec!["class".into()],
            }
        );
        assert_eq!(
            classify("<a target=\"_b"),
            MarkupTarget::AttributeValue {
                tag: "a".into(),
                attribute: "target".into(),
                partial: "_b".into(),
            }
        );
    }

    #[test]
    fn test_gt_inside_value_is_not_content() {
        assert!(matches!(
            classify("<a title=\"a > b"),
            MarkupTarget::AttributeValue { .. }
        ));
    }

    #[test]
    fn test_comment_and_doctype_are_content() {
        assert_eq!(classify("<!-- <di"), MarkupTarget::Content);
        assert_eq!(classify("<!DOC"), MarkupTarget::Content);
    }

    #[test]
    fn test_embedded_code_detection() {
        assert!(in_embedded_code("<p><?php echo $x", ScriptDialect::Php));
        assert!(!in_embedded_code("<p><?php echo $x ?><di", ScriptDialect::Php));
        assert!(in_embedded_code("<% items.each do |i| ", ScriptDialect::Erb));
        assert!(!in_embedded_code("<p><%= x %> <di", ScriptDialect::Erb));
        assert!(!in_embedded_code("<p><di", ScriptDialect::Erb));
    }

    #[test]
    fn test_unclosed_tags_innermost_first() {
        let dict = MarkupDictionary::for_dialect(Dialect::Html5);
        let open = unclosed_tags("<html><body><div class=\"a\"><br><img src=\"x\" /><p>hi</p><span>", dict);
        assert_eq!(open, vec!["span", "div", "body", "html"]);
    }
}
