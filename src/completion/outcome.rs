use serde::Serialize;

use super::candidate::LookupItem;

/// Result of one lookup strategy.
#[derive(Debug, Clone, Default, Serialize)]
pub enum LookupOutcome {
    /// The strategy does not apply here; the caller tries the next one.
    #[default]
    NotApplicable,
    /// The strategy applies and resolved to nothing (e.g. a chain ending in a void call).
    Empty,
    Resolved(Vec<LookupItem>),
}

impl LookupOutcome {
    pub fn from_items(items: Vec<LookupItem>) -> Self {
        if items.is_empty() {
            LookupOutcome::Empty
        } else {
            LookupOutcome::Resolved(items)
        }
    }

    pub fn is_applicable(&self) -> bool {
        !matches!(self, LookupOutcome::NotApplicable)
    }

    pub fn items(&self) -> &[LookupItem] {
        match self {
            LookupOutcome::Resolved(items) => items,
            _ => &[],
        }
    }

    pub fn into_items(self) -> Vec<LookupItem> {
        match self {
            LookupOutcome::Resolved(items) => items,
            _ => Vec::new(),
        }
    }

    /// Keep `self` if it applies, otherwise evaluate `next`.
    pub fn or_else(self, next: impl FnOnce() -> LookupOutcome) -> LookupOutcome {
        if self.is_applicable() { self } else { next() }
    }
}

/// A multi-variant insertion, e.g. full tag vs self-closing tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InsertionTemplate {
    pub label: String,
    pub text: String,
    /// Byte offset inside `text` where the cursor lands after insertion.
    pub cursor_offset: usize,
}

impl InsertionTemplate {
    pub fn new(label: impl Into<String>, text: impl Into<String>, cursor_offset: usize) -> Self {
        Self {
            label: label.into(),
            text: text.into(),
            cursor_offset,
        }
    }

    /// Text with a snippet `$0` marker at the cursor.
    pub fn snippet(&self) -> String {
        let at = self.cursor_offset.min(self.text.len());
        let (head, tail) = self.text.split_at(at);
        format!("{}$0{}", head.replace('$', "\\$"), tail.replace('$', "\\$"))
    }
}

/// Everything a caller needs to show a completion list.
#[derive(Debug, Clone, Default, Serialize)]
pub struct LookupResponse {
    pub outcome: LookupOutcome,
    /// Partial text already typed that the selected item replaces.
    pub look_ahead: String,
    pub templates: Vec<InsertionTemplate>,
}

impl LookupResponse {
    pub fn not_applicable() -> Self {
        Self::default()
    }

    pub fn new(outcome: LookupOutcome, look_ahead: impl Into<String>) -> Self {
        Self {
            outcome,
            look_ahead: look_ahead.into(),
            templates: Vec::new(),
        }
    }

    pub fn with_templates(mut self, templates: Vec<InsertionTemplate>) -> Self {
        self.templates = templates;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_resolution_still_applies() {
        let outcome = LookupOutcome::from_items(vec![]);
        assert!(matches!(outcome, LookupOutcome::Empty));
        assert!(outcome.is_applicable(), "an empty list stops the chain");
        assert!(!LookupOutcome::NotApplicable.is_applicable());
    }

    #[test]
    fn test_template_snippet_marks_cursor() {
        let t = InsertionTemplate::new("div", "div></div>", 4);
        assert_eq!(t.snippet(), "div>$0</div>");
    }
}
