use tower_lsp::lsp_types::*;

use crate::completion::candidate::{ItemCategory, LookupItem};
use crate::completion::outcome::InsertionTemplate;

/// Convert a lookup item to an LSP item replacing `range` (the look-ahead).
/// `rank` is the discovery position; `sortText` preserves it.
pub fn item_to_lsp(
    item: &LookupItem,
    rank: usize,
    range: Range,
    template: Option<&InsertionTemplate>,
) -> CompletionItem {
    let (new_text, format) = match template {
        Some(t) => (t.snippet(), InsertTextFormat::SNIPPET),
        None => (item.insert_text.clone(), InsertTextFormat::PLAIN_TEXT),
    };
    let documentation = (item.overloads.len() > 1).then(|| {
        Documentation::MarkupContent(MarkupContent {
            kind: MarkupKind::PlainText,
            value: item.overloads.join("\n"),
        })
    });

    CompletionItem {
        label: item.display_text.to_string(),
        kind: Some(map_kind(item.category)),
        detail: item.tooltip.clone(),
        documentation,
        sort_text: Some(format!("{:05}", rank)),
        filter_text: Some(item.display_text.to_string()),
        insert_text_format: Some(format),
        text_edit: Some(CompletionTextEdit::Edit(TextEdit { range, new_text })),
        ..Default::default()
    }
}

/// A template no item claimed becomes its own snippet item.
pub fn template_to_lsp(template: &InsertionTemplate, rank: usize, range: Range) -> CompletionItem {
    CompletionItem {
        label: template.label.clone(),
        kind: Some(CompletionItemKind::SNIPPET),
        detail: Some(template.text.clone()),
        sort_text: Some(format!("{:05}", rank)),
        insert_text_format: Some(InsertTextFormat::SNIPPET),
        text_edit: Some(CompletionTextEdit::Edit(TextEdit {
            range,
            new_text: template.snippet(),
        })),
        ..Default::default()
    }
}

fn map_kind(category: ItemCategory) -> CompletionItemKind {
    match category {
        ItemCategory::Class => CompletionItemKind::CLASS,
        ItemCategory::Interface => CompletionItemKind::INTERFACE,
        ItemCategory::Enum => CompletionItemKind::ENUM,
        ItemCategory::Delegate => CompletionItemKind::REFERENCE,
        ItemCategory::ValueType => CompletionItemKind::STRUCT,
        ItemCategory::Property => CompletionItemKind::PROPERTY,
        ItemCategory::Method | ItemCategory::MethodOverload => CompletionItemKind::METHOD,
        ItemCategory::ExtensionMethod => CompletionItemKind::FUNCTION,
        ItemCategory::Field => CompletionItemKind::FIELD,
        ItemCategory::Constant => CompletionItemKind::CONSTANT,
        ItemCategory::Event => CompletionItemKind::EVENT,
        ItemCategory::Namespace => CompletionItemKind::MODULE,
        ItemCategory::LocalVariable => CompletionItemKind::VARIABLE,
        ItemCategory::Tag => CompletionItemKind::KEYWORD,
        ItemCategory::Attribute | ItemCategory::CssProperty => CompletionItemKind::PROPERTY,
        ItemCategory::AttributeValue | ItemCategory::CssValue => CompletionItemKind::VALUE,
        ItemCategory::Path => CompletionItemKind::FILE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range() -> Range {
        Range::new(Position::new(0, 3), Position::new(0, 5))
    }

    fn edit_text(item: &CompletionItem) -> String {
        match item.text_edit.as_ref() {
            Some(CompletionTextEdit::Edit(edit)) => edit.new_text.clone(),
            other => panic!("unexpected edit {:?}", other),
        }
    }

    #[test]
    fn test_sort_text_keeps_discovery_order() {
        let b = LookupItem::new("B", "B", ItemCategory::Field, "test");
        let a = LookupItem::new("A", "A", ItemCategory::Field, "test");
        let first = item_to_lsp(&b, 0, range(), None);
        let second = item_to_lsp(&a, 1, range(), None);
        assert!(first.sort_text < second.sort_text);
    }

    #[test]
    fn test_template_becomes_snippet_edit() {
        let item = LookupItem::new("div", "div", ItemCategory::Tag, "test");
        let template = InsertionTemplate::new("div", "div></div>", 4);
        let lsp = item_to_lsp(&item, 0, range(), Some(&template));
        assert_eq!(lsp.insert_text_format, Some(InsertTextFormat::SNIPPET));
        assert_eq!(edit_text(&lsp), "div>$0</div>");
    }

    #[test]
    fn test_overloads_listed_in_documentation() {
        let mut item = LookupItem::new("Foo", "Foo", ItemCategory::MethodOverload, "test");
        item.overloads = vec!["void Foo(int)".into(), "void Foo(string)".into()];
        let lsp = item_to_lsp(&item, 0, range(), None);
        match lsp.documentation {
            Some(Documentation::MarkupContent(c)) => assert!(c.value.contains("Foo(string)")),
            other => panic!("expected documentation, got {:?}", other),
        }
        assert_eq!(lsp.kind, Some(CompletionItemKind::METHOD));
    }

    #[test]
    fn test_unclaimed_template_item() {
        let template = InsertionTemplate::new("script", "script></script>", 7);
        let lsp = template_to_lsp(&template, 3, range());
        assert_eq!(lsp.kind, Some(CompletionItemKind::SNIPPET));
        assert_eq!(edit_text(&lsp), "script>$0</script>");
    }
}
