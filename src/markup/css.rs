use rustc_hash::FxHashMap;
use std::sync::OnceLock;

use super::context::in_quoted_value;
use crate::completion::candidate::{ItemCategory, LookupItem};
use crate::completion::outcome::{InsertionTemplate, LookupOutcome, LookupResponse};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CssTarget {
    /// Selector position or inside a string.
    None,
    Property { partial: String },
    Value { property: String, partial: String },
}

const COLORS: &[&str] = &[
    "transparent", "black", "white", "red", "green", "blue", "yellow", "gray", "silver",
    "maroon", "navy", "olive", "purple", "teal", "orange", "inherit",
];
const LENGTH_KEYWORDS: &[&str] = &["auto", "inherit", "0"];
const BORDER_STYLES: &[&str] = &[
    "none", "hidden", "dotted", "dashed", "solid", "double", "groove", "ridge", "inset",
    "outset", "inherit",
];

const PROPERTIES: &[(&str, &[&str])] = &[
    ("background", &["none", "transparent", "inherit"]),
    ("background-color", COLORS),
    ("background-image", &["none", "url()", "inherit"]),
    ("background-repeat", &["repeat", "repeat-x", "repeat-y", "no-repeat", "inherit"]),
    ("background-position", &["top", "bottom", "left", "right", "center", "inherit"]),
    ("border", BORDER_STYLES),
    ("border-color", COLORS),
    ("border-style", BORDER_STYLES),
    ("border-width", &["thin", "medium", "thick", "inherit"]),
    ("border-collapse", &["collapse", "separate", "inherit"]),
    ("bottom", LENGTH_KEYWORDS),
    ("clear", &["none", "left", "right", "both", "inherit"]),
    ("color", COLORS),
    ("cursor", &["auto", "default", "pointer", "text", "move", "wait", "help", "crosshair", "inherit"]),
    ("display", &["none", "block", "inline", "inline-block", "flex", "grid", "table", "list-item", "inherit"]),
    ("float", &["none", "left", "right", "inherit"]),
    ("font-family", &["serif", "sans-serif", "monospace", "cursive", "fantasy", "inherit"]),
    ("font-size", &["xx-small", "x-small", "small", "medium", "large", "x-large", "xx-large", "smaller", "larger", "inherit"]),
    ("font-style", &["normal", "italic", "oblique", "inherit"]),
    ("font-weight", &["normal", "bold", "bolder", "lighter", "100", "400", "700", "inherit"]),
    ("height", LENGTH_KEYWORDS),
    ("left", LENGTH_KEYWORDS),
    ("line-height", &["normal", "inherit"]),
    ("list-style-type", &["none", "disc", "circle", "square", "decimal", "lower-alpha", "upper-alpha", "inherit"]),
    ("margin", LENGTH_KEYWORDS),
    ("max-width", &["none", "inherit"]),
    ("min-width", &["0", "inherit"]),
    ("opacity", &["0", "1", "inherit"]),
    ("overflow", &["visible", "hidden", "scroll", "auto", "inherit"]),
    ("padding", &["0", "inherit"]),
    ("position", &["static", "relative", "absolute", "fixed", "sticky", "inherit"]),
    ("right", LENGTH_KEYWORDS),
    ("text-align", &["left", "right", "center", "justify", "inherit"]),
    ("text-decoration", &["none", "underline", "overline", "line-through", "inherit"]),
    ("text-transform", &["none", "capitalize", "uppercase", "lowercase", "inherit"]),
    ("top", LENGTH_KEYWORDS),
    ("vertical-align", &["baseline", "top", "middle", "bottom", "sub", "super", "text-top", "text-bottom", "inherit"]),
    ("visibility", &["visible", "hidden", "collapse", "inherit"]),
    ("white-space", &["normal", "nowrap", "pre", "pre-wrap", "pre-line", "inherit"]),
    ("width", LENGTH_KEYWORDS),
    ("z-index", &["auto", "inherit"]),
];

fn value_table() -> &'static FxHashMap<&'static str, &'static [&'static str]> {
    static TABLE: OnceLock<FxHashMap<&'static str, &'static [&'static str]>> = OnceLock::new();
    TABLE.get_or_init(|| PROPERTIES.iter().copied().collect())
}

/// Classify the caret inside a stylesheet.
pub fn classify(pre_caret: &str) -> CssTarget {
    let open = pre_caret.rfind('{');
    let close = pre_caret.rfind('}');
    let body_start = match (open, close) {
        (Some(o), Some(c)) if o > c => o + 1,
        (Some(o), None) => o + 1,
        _ => return CssTarget::None,
    };
    classify_declarations(&pre_caret[body_start..])
}

/// Classify inside a declaration list, such as a rule body or a `style` attribute.
pub fn classify_declarations(body: &str) -> CssTarget {
    if in_quoted_value(body) || in_css_comment(body) {
        return CssTarget::None;
    }
    let decl = &body[body.rfind(';').map_or(0, |p| p + 1)..];
    match decl.split_once(':') {
        Some((property, value)) => {
            let partial_start = value.rfind(|c: char| c.is_whitespace() || c == ',').map_or(0, |p| p + 1);
            CssTarget::Value {
                property: property.trim().to_ascii_lowercase(),
                partial: value[partial_start..].to_string(),
            }
        }
        None => CssTarget::Property {
            partial: decl.trim_start().to_string(),
        },
    }
}

fn in_css_comment(text: &str) -> bool {
    match (text.rfind("/*"), text.rfind("*/")) {
        (Some(o), Some(c)) => o > c,
        (Some(_), None) => true,
        _ => false,
    }
}

/// Lookup over a CSS target; property names insert `name: ;` with the
/// cursor before the semicolon.
pub fn lookup(target: &CssTarget) -> LookupResponse {
    const SOURCE: &str = "css";
    match target {
        CssTarget::None => LookupResponse::not_applicable(),
        CssTarget::Property { partial } => {
            let matching: Vec<&str> = PROPERTIES
                .iter()
                .map(|(name, _)| *name)
                .filter(|name| name.starts_with(partial.to_ascii_lowercase().as_str()))
                .collect();
            let items = matching
                .iter()
                .map(|name| LookupItem::new(*name, *name, ItemCategory::CssProperty, SOURCE))
                .collect();
            let templates = matching
                .iter()
                .map(|name| {
                    let text = format!("{}: ;", name);
                    let cursor = text.len() - 1;
                    InsertionTemplate::new(*name, text, cursor)
                })
                .collect();
            LookupResponse::new(LookupOutcome::from_items(items), partial.as_str()).with_templates(templates)
        }
        CssTarget::Value { property, partial } => {
            let Some(values) = value_table().get(property.as_str()) else {
                return LookupResponse::not_applicable();
            };
            let lower = partial.to_ascii_lowercase();
            let items = values
                .iter()
                .filter(|v| v.starts_with(lower.as_str()))
                .map(|v| {
                    LookupItem::new(*v, *v, ItemCategory::CssValue, SOURCE)
                        .with_tooltip(format!("{}: {}", property, v))
                })
                .collect();
            LookupResponse::new(LookupOutcome::from_items(items), partial.as_str())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(resp: &LookupResponse) -> Vec<String> {
        resp.outcome.items().iter().map(|i| i.display_text.to_string()).collect()
    }

    #[test]
    fn test_selector_position_is_none() {
        assert_eq!(classify("body "), CssTarget::None);
        assert_eq!(classify("a { color: red; }\np"), CssTarget::None);
    }

    #[test]
    fn test_property_and_value_positions() {
        assert_eq!(
            classify("p {\n  col"),
            CssTarget::Property { partial: "col".into() }
        );
        assert_eq!(
            classify("p { color: red; text-al"),
            CssTarget::Property { partial: "text-al".into() }
        );
        assert_eq!(
            classify("p { font-family: serif, mo"),
            CssTarget::Value {
                property: "font-family".into(),
                partial: "mo".into(),
            }
        );
    }

    #[test]
    fn test_odd_quote_suppresses_lookup() {
        assert_eq!(classify("p { font-family: \"Times"), CssTarget::None);
        assert!(matches!(
            classify("p { font-family: \"Times\", se"),
            CssTarget::Value { .. }
        ));
    }

    #[test]
    fn test_property_lookup_with_template() {
        let resp = lookup(&classify("p { disp"));
        assert_eq!(names(&resp), vec!["display"]);
        assert_eq!(resp.templates[0].snippet(), "display: $0;");
    }

    #[test]
    fn test_value_lookup() {
        let resp = lookup(&classify("div { position: ab"));
        assert_eq!(names(&resp), vec!["absolute"]);
        assert_eq!(resp.look_ahead, "ab");
        assert!(!lookup(&classify("div { nosuch: ")).outcome.is_applicable());
    }
}
