use std::sync::Arc;

use crate::completion::engine::EmbeddedOptionHelper;
use crate::completion::outcome::LookupResponse;
use crate::index::TypeCatalog;

pub mod csharp;
pub mod markup;
pub use csharp::CSharpLanguage;
pub use markup::{CssLanguage, MarkupLanguage};

/// One lookup request against a document snapshot.
pub struct LookupInput<'a> {
    pub source: &'a str,
    /// Byte offset of the caret in `source`.
    pub caret: usize,
    pub catalog: &'a TypeCatalog,
    pub allow_non_public: bool,
}

pub trait Language: Send + Sync {
    fn id(&self) -> &'static str;
    fn supports(&self, language_id: &str) -> bool;

    fn lookup(&self, input: &LookupInput<'_>) -> LookupResponse;

    fn trigger_characters(&self) -> &'static [&'static str] {
        &[]
    }
}

pub struct LanguageRegistry {
    languages: Vec<Box<dyn Language>>,
}

impl LanguageRegistry {
    pub fn new() -> Self {
        Self::with_languages(CSharpLanguage::new())
    }

    /// C# lookups hand `//$`, `//?` and `//&` lines to `helper`.
    pub fn with_embedded_helper(helper: Arc<dyn EmbeddedOptionHelper>) -> Self {
        Self::with_languages(CSharpLanguage::with_embedded_helper(helper))
    }

    fn with_languages(csharp: CSharpLanguage) -> Self {
        Self {
            languages: vec![
                Box::new(csharp),
                Box::new(MarkupLanguage::html()),
                Box::new(MarkupLanguage::php()),
                Box::new(MarkupLanguage::erb()),
                Box::new(CssLanguage),
            ],
        }
    }

    pub fn find(&self, language_id: &str) -> Option<&dyn Language> {
        self.languages
            .iter()
            .find(|l| l.supports(language_id))
            .map(|l| l.as_ref())
    }

    /// Union of every language's trigger characters, first occurrence kept.
    pub fn trigger_characters(&self) -> Vec<String> {
        let mut chars: Vec<String> = Vec::new();
        for c in self.languages.iter().flat_map(|l| l.trigger_characters()) {
            if !chars.iter().any(|x| x == c) {
                chars.push(c.to_string());
            }
        }
        chars
    }
}

impl Default for LanguageRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Language id for a document the client opened without one we recognise.
pub fn language_id_from_path(path: &str) -> Option<&'static str> {
    let ext = path.rsplit_once('.')?.1.to_ascii_lowercase();
    Some(match ext.as_str() {
        "cs" => "csharp",
        "html" | "htm" => "html",
        "xhtml" => "xhtml",
        "php" => "php",
        "erb" | "rhtml" => "erb",
        "css" => "css",
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_dispatch() {
        let registry = LanguageRegistry::new();
        assert_eq!(registry.find("csharp").map(|l| l.id()), Some("csharp"));
        assert_eq!(registry.find("xhtml").map(|l| l.id()), Some("html"));
        assert_eq!(registry.find("rhtml").map(|l| l.id()), Some("erb"));
        assert_eq!(registry.find("css").map(|l| l.id()), Some("css"));
        assert!(registry.find("java").is_none());
    }

    #[test]
    fn test_language_from_path() {
        assert_eq!(language_id_from_path("/src/Foo.cs"), Some("csharp"));
        assert_eq!(language_id_from_path("/views/index.html.erb"), Some("erb"));
        assert_eq!(language_id_from_path("page.XHTML"), Some("xhtml"));
        assert_eq!(language_id_from_path("Makefile"), None);
    }

    #[test]
    fn test_trigger_characters_deduplicated() {
        let chars = LanguageRegistry::new().trigger_characters();
        assert_eq!(chars.iter().filter(|c| *c == ".").count(), 1);
        assert!(chars.contains(&"<".to_string()));
    }
}
