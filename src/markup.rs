//! Lookup for HTML-family documents: tag names, closing tags, attributes,
//! attribute values and CSS inside `<style>` blocks or `style="..."`.

use tracing::debug;

use crate::completion::candidate::{ItemCategory, LookupItem};
use crate::completion::outcome::{InsertionTemplate, LookupOutcome, LookupResponse};

pub mod context;
pub mod css;
pub mod dictionary;

use context::{MarkupTarget, ScriptDialect, classify, in_embedded_code, unclosed_tags};
use dictionary::{Dialect, MarkupDictionary};

const SOURCE: &str = "markup";

#[derive(Debug, Clone, Copy, Default)]
pub struct MarkupLookupProvider {
    embedded: Option<ScriptDialect>,
}

impl MarkupLookupProvider {
    /// Plain HTML or XHTML, dialect picked from the document's DOCTYPE.
    pub fn new() -> Self {
        Self { embedded: None }
    }

    /// Markup with server-side code blocks (PHP, ERB); lookup is off inside them.
    pub fn with_script(dialect: ScriptDialect) -> Self {
        Self {
            embedded: Some(dialect),
        }
    }

    pub fn lookup(&self, source: &str, caret: usize) -> LookupResponse {
        let pre_caret = &source[..floor_char_boundary(source, caret)];

        if let Some(dialect) = self.embedded
            && in_embedded_code(pre_caret, dialect)
        {
            debug!(?dialect, "caret inside embedded code block");
            return LookupResponse::not_applicable();
        }
        if let Some(sheet) = style_block_body(pre_caret) {
            return css::lookup(&css::classify(sheet));
        }

        let dict = MarkupDictionary::for_dialect(Dialect::sniff(source));
        let target = classify(pre_caret);
        debug!(dialect = ?dict.dialect, ?target, "markup target");

        match target {
            MarkupTarget::Content => LookupResponse::not_applicable(),
            MarkupTarget::TagName { partial } => tag_names(dict, &partial),
            MarkupTarget::ClosingTag { partial } => closing_tags(dict, pre_caret, &partial),
            MarkupTarget::AttributeName {
                tag,
                partial,
                present,
            } => attribute_names(dict, &tag, &partial, &present),
            MarkupTarget::AttributeValue {
                attribute, partial, ..
            } if attribute.eq_ignore_ascii_case("style") => {
                css::lookup(&css::classify_declarations(&partial))
            }
            MarkupTarget::AttributeValue {
                tag,
                attribute,
                partial,
            } => attribute_values(dict, &tag, &attribute, &partial),
        }
    }
}

fn starts_with_ignore_case(text: &str, prefix: &str) -> bool {
    text.len() >= prefix.len()
        && text.is_char_boundary(prefix.len())
        && text[..prefix.len()].eq_ignore_ascii_case(prefix)
}

fn tag_names(dict: &MarkupDictionary, partial: &str) -> LookupResponse {
    let mut items = Vec::new();
    let mut templates = Vec::new();
    for spec in dict
        .tags()
        .iter()
        .filter(|t| starts_with_ignore_case(t.name, partial))
    {
        items.push(LookupItem::new(spec.name, spec.name, ItemCategory::Tag, SOURCE));
        templates.push(tag_template(dict.dialect, spec.name, spec.void));
    }
    LookupResponse::new(LookupOutcome::from_items(items), partial).with_templates(templates)
}

/// `div></div>` with the cursor between, a bare `br>` / `br />` for void
/// elements, and a typed block for `script`.
fn tag_template(dialect: Dialect, name: &str, void: bool) -> InsertionTemplate {
    if void {
        let text = match dialect {
            Dialect::Html5 => format!("{}>", name),
            Dialect::Xhtml => format!("{} />", name),
        };
        let cursor = text.len();
        return InsertionTemplate::new(name, text, cursor);
    }
    let open = match (name, dialect) {
        ("script", Dialect::Xhtml) => "script type=\"text/javascript\">".to_string(),
        _ => format!("{}>", name),
    };
    let cursor = open.len();
    InsertionTemplate::new(name, format!("{}</{}>", open, name), cursor)
}

fn closing_tags(dict: &MarkupDictionary, pre_caret: &str, partial: &str) -> LookupResponse {
    // the `</` fragment itself is not part of an element
    let before = &pre_caret[..pre_caret.rfind("</").unwrap_or(pre_caret.len())];
    let items = unclosed_tags(before, dict)
        .into_iter()
        .filter(|name| starts_with_ignore_case(name, partial))
        .map(|name| {
            let insert = format!("{}>", name);
            LookupItem::new(name.as_str(), insert, ItemCategory::Tag, SOURCE)
        })
        .collect();
    LookupResponse::new(LookupOutcome::from_items(items), partial)
}

fn attribute_names(
    dict: &MarkupDictionary,
    tag: &str,
    partial: &str,
    present: &[String],
) -> LookupResponse {
    let mut items = Vec::new();
    let mut templates = Vec::new();
    for attr in dict.attributes_for(tag) {
        if present.iter().any(|p| p.eq_ignore_ascii_case(attr)) || !starts_with_ignore_case(attr, partial) {
            continue;
        }
        items.push(LookupItem::new(attr, attr, ItemCategory::Attribute, SOURCE).with_tooltip(format!("<{}> attribute", tag)));
        let text = format!("{}=\"\"", attr);
        let cursor = text.len() - 1;
        templates.push(InsertionTemplate::new(attr, text, cursor));
    }
    LookupResponse::new(LookupOutcome::from_items(items), partial).with_templates(templates)
}

fn attribute_values(dict: &MarkupDictionary, tag: &str, attribute: &str, partial: &str) -> LookupResponse {
    let values = dict.values_for(tag, attribute);
    if values.is_empty() {
        return LookupResponse::not_applicable();
    }
    let items = values
        .iter()
        .filter(|v| starts_with_ignore_case(v, partial))
        .map(|v| LookupItem::new(*v, *v, ItemCategory::AttributeValue, SOURCE))
        .collect();
    LookupResponse::new(LookupOutcome::from_items(items), partial)
}

/// Stylesheet text from the open `<style ...>` tag to the caret, if the caret
/// sits inside such a block.
fn style_block_body(pre_caret: &str) -> Option<&str> {
    let lower = pre_caret.to_ascii_lowercase();
    let open = lower.rfind("<style")?;
    if lower.rfind("</style").is_some_and(|close| close > open) {
        return None;
    }
    let gt = lower[open..].find('>')? + open;
    Some(&pre_caret[gt + 1..])
}

fn floor_char_boundary(text: &str, index: usize) -> usize {
    let mut index = index.min(text.len());
    while !text.is_char_boundary(index) {
        index -= 1;
    }
    index
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(provider: MarkupLookupProvider, src: &str) -> LookupResponse {
        let caret = src.find('|').expect("caret marker");
        provider.lookup(&src.replace('|', ""), caret)
    }

    fn names(resp: &LookupResponse) -> Vec<String> {
        resp.outcome.items().iter().map(|i| i.display_text.to_string()).collect()
    }

    #[test]
    fn test_tag_name_lookup_with_template() {
        let resp = run(MarkupLookupProvider::new(), "<!DOCTYPE html>\n<body>\n<di|");
        let names = names(&resp);
        assert!(names.contains(&"div".to_string()), "got {:?}", names);
        assert!(names.iter().all(|n| n.starts_with("di")));
        assert_eq!(resp.look_ahead, "di");

        let div = resp.templates.iter().find(|t| t.label == "div").expect("div template");
        assert_eq!(div.text, "div></div>");
        assert_eq!(div.cursor_offset, 4);
    }

    #[test]
    fn test_void_template_depends_on_dialect() {
        let html = run(MarkupLookupProvider::new(), "<!DOCTYPE html><body><b|");
        let br = html.templates.iter().find(|t| t.label == "br").expect("br");
        assert_eq!(br.text, "br>");

        let xhtml_doc = "<!DOCTYPE html PUBLIC \"-//W3C//DTD XHTML 1.0 Strict//EN\">\n<body><b|";
        let xhtml = run(MarkupLookupProvider::new(), xhtml_doc);
        let br = xhtml.templates.iter().find(|t| t.label == "br").expect("br");
        assert_eq!(br.text, "br />");
        assert_eq!(br.cursor_offset, br.text.len());
    }

    #[test]
    fn test_closing_tag_offers_innermost_first() {
        let resp = run(MarkupLookupProvider::new(), "<html><body><ul><li>one</li></|");
        assert_eq!(names(&resp), vec!["ul", "body", "html"]);
        assert_eq!(resp.outcome.items()[0].insert_text, "ul>");
    }

    #[test]
    fn test_attribute_names_skip_present() {
        let resp = run(MarkupLookupProvider::new(), "<a href=\"x\" |");
        let names = names(&resp);
        assert!(!names.contains(&"href".to_string()));
        assert!(names.contains(&"target".to_string()), "got {:?}", names);
        assert!(names.contains(&"class".to_string()), "global attributes merged");
        let target = resp.templates.iter().find(|t| t.label == "target").expect("template");
        assert_eq!(target.snippet(), "target=\"$0\"");
    }

    #[test]
    fn test_quote_parity_selects_value_lookup() {
        let inside = run(MarkupLookupProvider::new(), "<a target=\"_b|");
        assert_eq!(names(&inside), vec!["_blank"]);
        assert_eq!(inside.look_ahead, "_b");

        let after = run(MarkupLookupProvider::new(), "<a target=\"_blank\" |");
        assert!(names(&after).contains(&"href".to_string()));
    }

    #[test]
    fn test_content_has_no_lookup() {
        let resp = run(MarkupLookupProvider::new(), "<p>some text|");
        assert!(!resp.outcome.is_applicable());
    }

    #[test]
    fn test_embedded_code_suppresses_markup() {
        let php = MarkupLookupProvider::with_script(ScriptDialect::Php);
        assert!(!run(php, "<p><?php $x = \"<di|").outcome.is_applicable());
        assert!(run(php, "<p><?php echo 1; ?><di|").outcome.is_applicable());

        let erb = MarkupLookupProvider::with_script(ScriptDialect::Erb);
        assert!(!run(erb, "<ul><% for i in items %><li><%= i.na|").outcome.is_applicable());
    }

    #[test]
    fn test_style_block_and_attribute_use_css() {
        let block = run(MarkupLookupProvider::new(), "<style type=\"text/css\">\nbody { colo|");
        assert_eq!(names(&block), vec!["color"]);

        let closed = run(MarkupLookupProvider::new(), "<style>p { }</style>\n<di|");
        assert!(names(&closed).contains(&"div".to_string()));

        let attr = run(MarkupLookupProvider::new(), "<div style=\"display: fl|");
        assert_eq!(names(&attr), vec!["flex"]);
    }
}
