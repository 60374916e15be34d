//! Tag and attribute tables for the two markup dialects.
//!
//! Built once per dialect on first use and shared read-only afterwards.

use rustc_hash::FxHashMap;
use std::sync::OnceLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dialect {
    Html5,
    Xhtml,
}

impl Dialect {
    /// `<!DOCTYPE html PUBLIC "-//W3C//DTD XHTML 1.0 ...">` or an XML
    /// declaration selects XHTML; anything else is HTML5.
    pub fn sniff(source: &str) -> Dialect {
        let head = source.trim_start();
        let end = head.char_indices().nth(512).map_or(head.len(), |(i, _)| i);
        let head = &head[..end];
        let lower = head.to_ascii_lowercase();
        if lower.starts_with("<?xml") {
            return Dialect::Xhtml;
        }
        match lower.find("<!doctype") {
            Some(pos) => {
                let decl = &lower[pos..];
                let decl = &decl[..decl.find('>').unwrap_or(decl.len())];
                if decl.contains("xhtml") {
                    Dialect::Xhtml
                } else {
                    Dialect::Html5
                }
            }
            None => Dialect::Html5,
        }
    }
}

#[derive(Debug)]
pub struct TagSpec {
    pub name: &'static str,
    pub attributes: &'static [&'static str],
    /// Element without content or closing tag (`br`, `img`).
    pub void: bool,
}

#[derive(Debug)]
pub struct MarkupDictionary {
    pub dialect: Dialect,
    tags: Vec<TagSpec>,
    by_name: FxHashMap<&'static str, usize>,
    global_attributes: &'static [&'static str],
    /// Keyed by `tag.attribute` or bare `attribute`.
    attribute_values: FxHashMap<&'static str, &'static [&'static str]>,
}

impl MarkupDictionary {
    pub fn for_dialect(dialect: Dialect) -> &'static MarkupDictionary {
        static HTML5: OnceLock<MarkupDictionary> = OnceLock::new();
        static XHTML: OnceLock<MarkupDictionary> = OnceLock::new();
        match dialect {
            Dialect::Html5 => HTML5.get_or_init(|| build(Dialect::Html5)),
            Dialect::Xhtml => XHTML.get_or_init(|| build(Dialect::Xhtml)),
        }
    }

    pub fn tags(&self) -> &[TagSpec] {
        &self.tags
    }

    pub fn tag(&self, name: &str) -> Option<&TagSpec> {
        let lower = name.to_ascii_lowercase();
        self.by_name.get(lower.as_str()).map(|&i| &self.tags[i])
    }

    pub fn is_void(&self, name: &str) -> bool {
        self.tag(name).is_some_and(|t| t.void)
    }

    /// Attributes of `tag` followed by the global ones, without repeats.
    pub fn attributes_for(&self, tag: &str) -> Vec<&'static str> {
        let own = self.tag(tag).map(|t| t.attributes).unwrap_or(&[]);
        let mut result: Vec<&'static str> = Vec::with_capacity(own.len() + self.global_attributes.len());
        for attr in own.iter().chain(self.global_attributes) {
            if !result.contains(attr) {
                result.push(*attr);
            }
        }
        result
    }

    pub fn values_for(&self, tag: &str, attribute: &str) -> &'static [&'static str] {
        let tag = tag.to_ascii_lowercase();
        let attribute = attribute.to_ascii_lowercase();
        let qualified = format!("{}.{}", tag, attribute);
        self.attribute_values
            .get(qualified.as_str())
            .or_else(|| self.attribute_values.get(attribute.as_str()))
            .copied()
            .unwrap_or(&[])
    }
}

const fn tag(name: &'static str, attributes: &'static [&'static str]) -> TagSpec {
    TagSpec {
        name,
        attributes,
        void: false,
    }
}

const fn void(name: &'static str, attributes: &'static [&'static str]) -> TagSpec {
    TagSpec {
        name,
        attributes,
        void: true,
    }
}

const HTML5_GLOBALS: &[&str] = &[
    "id", "class", "style", "title", "lang", "dir", "hidden", "tabindex", "accesskey",
    "contenteditable", "draggable", "spellcheck", "translate", "onclick", "onkeydown",
    "onkeyup", "onmouseover", "onmouseout", "onfocus", "onblur",
];

const XHTML_GLOBALS: &[&str] = &[
    "id", "class", "style", "title", "lang", "xml:lang", "dir", "onclick", "ondblclick",
    "onkeydown", "onkeyup", "onmouseover", "onmouseout",
];

/// Tags shared by both dialects.
fn common_tags() -> Vec<TagSpec> {
    vec![
        tag("a", &["href", "target", "rel", "type", "hreflang", "name"]),
        tag("abbr", &[]),
        tag("b", &[]),
        tag("blockquote", &["cite"]),
        tag("body", &["onload", "onunload"]),
        void("br", &[]),
        tag("button", &["type", "name", "value", "disabled"]),
        tag("caption", &[]),
        tag("code", &[]),
        void("col", &["span"]),
        tag("dd", &[]),
        tag("div", &[]),
        tag("dl", &[]),
        tag("dt", &[]),
        tag("em", &[]),
        tag("fieldset", &["disabled", "name"]),
        tag("form", &["action", "method", "enctype", "target", "name", "accept-charset"]),
        tag("h1", &[]),
        tag("h2", &[]),
        tag("h3", &[]),
        tag("h4", &[]),
        tag("h5", &[]),
        tag("h6", &[]),
        tag("head", &[]),
        void("hr", &[]),
        tag("html", &["xmlns", "lang"]),
        tag("i", &[]),
        tag("iframe", &["src", "name", "width", "height"]),
        void("img", &["src", "alt", "width", "height", "usemap"]),
        void("input", &["type", "name", "value", "checked", "disabled", "readonly", "maxlength", "size", "src", "alt"]),
        tag("label", &["for"]),
        tag("legend", &[]),
        tag("li", &["value"]),
        void("link", &["href", "rel", "type", "media", "hreflang"]),
        tag("map", &["name"]),
        void("meta", &["name", "content", "http-equiv", "charset"]),
        tag("noscript", &[]),
        tag("object", &["data", "type", "name", "width", "height"]),
        tag("ol", &["start", "type", "reversed"]),
        tag("optgroup", &["label", "disabled"]),
        tag("option", &["value", "selected", "disabled", "label"]),
        tag("p", &[]),
        void("param", &["name", "value"]),
        tag("pre", &[]),
        tag("q", &["cite"]),
        tag("script", &["src", "type", "charset", "defer", "async"]),
        tag("select", &["name", "multiple", "size", "disabled"]),
        tag("small", &[]),
        tag("span", &[]),
        tag("strong", &[]),
        tag("style", &["type", "media"]),
        tag("sub", &[]),
        tag("sup", &[]),
        tag("table", &["border", "cellpadding", "cellspacing", "summary", "width"]),
        tag("tbody", &[]),
        tag("td", &["colspan", "rowspan", "headers"]),
        tag("textarea", &["name", "rows", "cols", "disabled", "readonly"]),
        tag("tfoot", &[]),
        tag("th", &["colspan", "rowspan", "scope", "headers"]),
        tag("thead", &[]),
        tag("title", &[]),
        tag("tr", &[]),
        tag("ul", &[]),
    ]
}

fn html5_only_tags() -> Vec<TagSpec> {
    vec![
        tag("article", &[]),
        tag("aside", &[]),
        tag("audio", &["src", "controls", "autoplay", "loop", "muted", "preload"]),
        tag("canvas", &["width", "height"]),
        tag("datalist", &[]),
        tag("details", &["open"]),
        tag("dialog", &["open"]),
        void("embed", &["src", "type", "width", "height"]),
        tag("figcaption", &[]),
        tag("figure", &[]),
        tag("footer", &[]),
        tag("header", &[]),
        tag("main", &[]),
        tag("mark", &[]),
        tag("nav", &[]),
        tag("output", &["for", "name"]),
        tag("progress", &["value", "max"]),
        tag("section", &[]),
        void("source", &["src", "type", "media"]),
        tag("summary", &[]),
        tag("template", &[]),
        tag("time", &["datetime"]),
        void("track", &["src", "kind", "srclang", "label", "default"]),
        tag("video", &["src", "controls", "autoplay", "loop", "muted", "poster", "width", "height"]),
        void("wbr", &[]),
    ]
}

fn xhtml_only_tags() -> Vec<TagSpec> {
    vec![
        tag("acronym", &[]),
        void("area", &["href", "shape", "coords", "alt", "nohref"]),
        void("base", &["href"]),
        tag("big", &[]),
        tag("cite", &[]),
        tag("colgroup", &["span"]),
        tag("del", &["cite", "datetime"]),
        tag("dfn", &[]),
        tag("ins", &["cite", "datetime"]),
        tag("kbd", &[]),
        tag("samp", &[]),
        tag("tt", &[]),
        tag("var", &[]),
    ]
}

const INPUT_TYPES_HTML5: &[&str] = &[
    "text", "password", "checkbox", "radio", "submit", "reset", "button", "hidden", "file",
    "image", "email", "url", "tel", "number", "range", "date", "time", "datetime-local",
    "month", "week", "color", "search",
];

const INPUT_TYPES_XHTML: &[&str] = &[
    "text", "password", "checkbox", "radio", "submit", "reset", "button", "hidden", "file",
    "image",
];

const COMMON_VALUES: &[(&str, &[&str])] = &[
    ("target", &["_blank", "_self", "_parent", "_top"]),
    ("form.method", &["get", "post"]),
    ("form.enctype", &["application/x-www-form-urlencoded", "multipart/form-data", "text/plain"]),
    ("button.type", &["submit", "reset", "button"]),
    ("dir", &["ltr", "rtl"]),
    ("rel", &["stylesheet", "alternate", "icon", "nofollow", "next", "prev", "help"]),
    ("script.type", &["text/javascript"]),
    ("style.type", &["text/css"]),
    ("link.type", &["text/css"]),
    ("th.scope", &["row", "col", "rowgroup", "colgroup"]),
    ("ol.type", &["1", "a", "A", "i", "I"]),
    ("checked", &["checked"]),
    ("selected", &["selected"]),
    ("disabled", &["disabled"]),
    ("readonly", &["readonly"]),
    ("multiple", &["multiple"]),
];

fn build(dialect: Dialect) -> MarkupDictionary {
    let mut tags = common_tags();
    let (globals, input_types) = match dialect {
        Dialect::Html5 => {
            tags.extend(html5_only_tags());
            (HTML5_GLOBALS, INPUT_TYPES_HTML5)
        }
        Dialect::Xhtml => {
            tags.extend(xhtml_only_tags());
            (XHTML_GLOBALS, INPUT_TYPES_XHTML)
        }
    };
    tags.sort_by_key(|t| t.name);
    let by_name = tags.iter().enumerate().map(|(i, t)| (t.name, i)).collect();

    let mut attribute_values: FxHashMap<&'static str, &'static [&'static str]> =
        COMMON_VALUES.iter().copied().collect();
    attribute_values.insert("input.type", input_types);
    if dialect == Dialect::Html5 {
        attribute_values.insert("preload", &["none", "metadata", "auto"]);
        attribute_values.insert("track.kind", &["subtitles", "captions", "descriptions", "chapters", "metadata"]);
        attribute_values.insert("contenteditable", &["true", "false"]);
        attribute_values.insert("draggable", &["true", "false"]);
        attribute_values.insert("spellcheck", &["true", "false"]);
    } else {
        attribute_values.insert("area.shape", &["rect", "circle", "poly", "default"]);
    }

    tracing::debug!(?dialect, tags = tags.len(), "markup dictionary built");
    MarkupDictionary {
        dialect,
        tags,
        by_name,
        global_attributes: globals,
        attribute_values,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_doctype_sniff() {
        assert_eq!(Dialect::sniff("<!DOCTYPE html>\n<html>"), Dialect::Html5);
        assert_eq!(
            Dialect::sniff(
                "<!DOCTYPE html PUBLIC \"-//W3C//DTD XHTML 1.0 Strict//EN\" \"http://www.w3.org/TR/xhtml1/DTD/xhtml1-strict.dtd\">"
            ),
            Dialect::Xhtml
        );
        assert_eq!(Dialect::sniff("<?xml version=\"1.0\"?><html>"), Dialect::Xhtml);
        assert_eq!(Dialect::sniff("<p>no doctype</p>"), Dialect::Html5);
    }

    #[test]
    fn test_dialects_differ() {
        let html5 = MarkupDictionary::for_dialect(Dialect::Html5);
        let xhtml = MarkupDictionary::for_dialect(Dialect::Xhtml);
        assert!(html5.tag("section").is_some());
        assert!(xhtml.tag("section").is_none());
        assert!(xhtml.tag("acronym").is_some());
        assert!(html5.values_for("input", "type").contains(&"email"));
        assert!(!xhtml.values_for("input", "type").contains(&"email"));
    }

    #[test]
    fn test_attributes_include_globals_once() {
        let dict = MarkupDictionary::for_dialect(Dialect::Html5);
        let attrs = dict.attributes_for("a");
        assert_eq!(attrs[0], "href");
        assert!(attrs.contains(&"class"));
        assert_eq!(attrs.iter().filter(|a| **a == "title").count(), 1);
        assert!(dict.attributes_for("nosuchtag").contains(&"id"));
    }

    #[test]
    fn test_values_prefer_tag_qualified_key() {
        let dict = MarkupDictionary::for_dialect(Dialect::Html5);
        assert_eq!(dict.values_for("BUTTON", "type"), &["submit", "reset", "button"]);
        assert!(dict.values_for("a", "target").contains(&"_blank"));
        assert!(dict.values_for("div", "unknown").is_empty());
        assert!(dict.is_void("BR"));
    }
}
