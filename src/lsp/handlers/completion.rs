use std::sync::Arc;
use tower_lsp::lsp_types::*;
use tracing::{debug, warn};

use super::super::converters::{item_to_lsp, template_to_lsp};
use crate::completion::fuzzy::filter_by_look_ahead;
use crate::completion::outcome::LookupResponse;
use crate::language::{LanguageRegistry, LookupInput};
use crate::workspace::Workspace;
use crate::workspace::document::Document;

const MAX_ITEMS: usize = 200;

pub async fn handle_completion(
    workspace: Arc<Workspace>,
    registry: Arc<LanguageRegistry>,
    allow_non_public: bool,
    params: CompletionParams,
) -> Option<CompletionResponse> {
    let uri = &params.text_document_position.text_document.uri;
    let position = params.text_document_position.position;

    let doc = workspace.documents.begin_request(uri)?;
    let caret = doc.offset_at(position)?;
    let generation = doc.generation;
    let catalog = workspace.catalog().await;

    debug!(
        uri = %uri,
        lang = %doc.language_id,
        line = position.line,
        character = position.character,
        generation,
        "completion request"
    );

    let source = doc.text();
    let language_id = doc.language_id.clone();
    let task = tokio::task::spawn_blocking(move || {
        let lang = registry.find(&language_id)?;
        let input = LookupInput {
            source: &source,
            caret,
            catalog: &catalog,
            allow_non_public,
        };
        Some(lang.lookup(&input))
    });
    let response = match task.await {
        Ok(response) => response?,
        Err(e) => {
            warn!(error = %e, "lookup task failed");
            return None;
        }
    };

    if !workspace.documents.is_current(uri, generation) {
        debug!(generation, "superseded, discarding lookup result");
        return None;
    }
    if !response.outcome.is_applicable() {
        debug!("no lookup applies");
        return None;
    }
    Some(CompletionResponse::List(to_completion_list(&doc, caret, response)))
}

/// Fuzzy-filter against the look-ahead, pair items with their insertion
/// templates by label and convert. Unclaimed templates follow the items.
fn to_completion_list(doc: &Document, caret: usize, response: LookupResponse) -> CompletionList {
    let LookupResponse {
        outcome,
        look_ahead,
        mut templates,
    } = response;
    let start = caret.saturating_sub(look_ahead.len());
    let range = Range::new(doc.position_at(start), doc.position_at(caret));

    let candidates = filter_by_look_ahead(&look_ahead, outcome.into_items());
    let is_incomplete = candidates.len() > MAX_ITEMS;

    let mut items: Vec<CompletionItem> = Vec::with_capacity(candidates.len().min(MAX_ITEMS));
    for (rank, candidate) in candidates.iter().take(MAX_ITEMS).enumerate() {
        let template = templates
            .iter()
            .position(|t| *t.label == *candidate.display_text)
            .map(|i| templates.remove(i));
        items.push(item_to_lsp(candidate, rank, range, template.as_ref()));
    }
    let offset = items.len();
    items.extend(
        templates
            .iter()
            .enumerate()
            .map(|(i, t)| template_to_lsp(t, offset + i, range)),
    );

    debug!(
        count = items.len(),
        incomplete = is_incomplete,
        look_ahead = %look_ahead,
        "returning completions"
    );
    CompletionList {
        is_incomplete,
        items,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::completion::candidate::{ItemCategory, LookupItem};
    use crate::completion::outcome::{InsertionTemplate, LookupOutcome};

    fn doc(text: &str) -> Document {
        Document::new(Url::parse("file:///tmp/a.html").unwrap(), "html".into(), 1, text)
    }

    #[test]
    fn test_edit_range_covers_look_ahead() {
        let d = doc("<body>\n<di");
        let items = vec![LookupItem::new("div", "div", ItemCategory::Tag, "test")];
        let response = LookupResponse::new(LookupOutcome::Resolved(items), "di")
            .with_templates(vec![InsertionTemplate::new("div", "div></div>", 4)]);
        let list = to_completion_list(&d, d.text().len(), response);
        assert_eq!(list.items.len(), 1, "template attached to its item");
        match &list.items[0].text_edit {
            Some(CompletionTextEdit::Edit(edit)) => {
                assert_eq!(edit.range, Range::new(Position::new(1, 1), Position::new(1, 3)));
                assert_eq!(edit.new_text, "div>$0</div>");
            }
            other => panic!("unexpected edit {:?}", other),
        }
    }

    #[test]
    fn test_fuzzy_filter_keeps_order() {
        let d = doc("s.sub");
        let items = vec![
            LookupItem::new("Length", "Length", ItemCategory::Property, "test"),
            LookupItem::new("Substring", "Substring", ItemCategory::Method, "test"),
            LookupItem::new("SubArray", "SubArray", ItemCategory::Method, "test"),
        ];
        let response = LookupResponse::new(LookupOutcome::Resolved(items), "sub");
        let list = to_completion_list(&d, 5, response);
        let labels: Vec<_> = list.items.iter().map(|i| i.label.as_str()).collect();
        assert_eq!(labels, vec!["Substring", "SubArray"]);
    }

    #[tokio::test]
    async fn test_handle_completion_end_to_end() {
        let workspace = Arc::new(Workspace::default());
        let uri = Url::parse("file:///tmp/Foo.cs").unwrap();
        let text = "class Foo { string s; void M() { s.Len";
        workspace
            .documents
            .open(Document::new(uri.clone(), "csharp".into(), 1, text));

        let params = CompletionParams {
            text_document_position: TextDocumentPositionParams {
                text_document: TextDocumentIdentifier { uri },
                position: Position::new(0, text.len() as u32),
            },
            work_done_progress_params: Default::default(),
            partial_result_params: Default::default(),
            context: None,
        };
        let response = handle_completion(workspace, Arc::new(LanguageRegistry::new()), false, params)
            .await
            .expect("completion list");
        let CompletionResponse::List(list) = response else {
            panic!("expected a list");
        };
        assert!(list.items.iter().any(|i| i.label == "Length"));
        assert!(list.items.iter().all(|i| i.label != "Substring"), "filtered by look-ahead");
    }
}
