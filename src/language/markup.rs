use super::{Language, LookupInput};
use crate::completion::outcome::LookupResponse;
use crate::markup::MarkupLookupProvider;
use crate::markup::context::ScriptDialect;
use crate::markup::css;

/// HTML, XHTML and the server-side template dialects built on them.
pub struct MarkupLanguage {
    id: &'static str,
    aliases: &'static [&'static str],
    provider: MarkupLookupProvider,
}

impl MarkupLanguage {
    pub fn html() -> Self {
        Self {
            id: "html",
            aliases: &["html", "xhtml"],
            provider: MarkupLookupProvider::new(),
        }
    }

    pub fn php() -> Self {
        Self {
            id: "php",
            aliases: &["php"],
            provider: MarkupLookupProvider::with_script(ScriptDialect::Php),
        }
    }

    pub fn erb() -> Self {
        Self {
            id: "erb",
            aliases: &["erb", "rhtml", "html.erb"],
            provider: MarkupLookupProvider::with_script(ScriptDialect::Erb),
        }
    }
}

impl Language for MarkupLanguage {
    fn id(&self) -> &'static str {
        self.id
    }

    fn supports(&self, language_id: &str) -> bool {
        self.aliases.iter().any(|a| *a == language_id)
    }

    fn lookup(&self, input: &LookupInput<'_>) -> LookupResponse {
        self.provider.lookup(input.source, input.caret)
    }

    fn trigger_characters(&self) -> &'static [&'static str] {
        &["<", "/", " ", "\"", ":"]
    }
}

/// Standalone stylesheets.
pub struct CssLanguage;

impl Language for CssLanguage {
    fn id(&self) -> &'static str {
        "css"
    }

    fn supports(&self, language_id: &str) -> bool {
        language_id == "css"
    }

    fn lookup(&self, input: &LookupInput<'_>) -> LookupResponse {
        let end = input.caret.min(input.source.len());
        match input.source.get(..end) {
            Some(pre_caret) => css::lookup(&css::classify(pre_caret)),
            None => LookupResponse::not_applicable(),
        }
    }

    fn trigger_characters(&self) -> &'static [&'static str] {
        &[":", " "]
    }
}
