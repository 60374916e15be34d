use std::sync::Arc;

use super::{Language, LookupInput};
use crate::completion::engine::{EmbeddedOptionHelper, LookupDriver};
use crate::completion::outcome::LookupResponse;

pub struct CSharpLanguage {
    driver: LookupDriver,
}

impl CSharpLanguage {
    pub fn new() -> Self {
        Self {
            driver: LookupDriver::new(),
        }
    }

    pub fn with_embedded_helper(helper: Arc<dyn EmbeddedOptionHelper>) -> Self {
        Self {
            driver: LookupDriver::new().with_embedded_helper(helper),
        }
    }
}

impl Default for CSharpLanguage {
    fn default() -> Self {
        Self::new()
    }
}

impl Language for CSharpLanguage {
    fn id(&self) -> &'static str {
        "csharp"
    }

    fn supports(&self, language_id: &str) -> bool {
        matches!(language_id, "csharp" | "cs")
    }

    fn lookup(&self, input: &LookupInput<'_>) -> LookupResponse {
        self.driver.lookup(
            input.catalog,
            input.source,
            input.caret,
            input.allow_non_public,
        )
    }

    fn trigger_characters(&self) -> &'static [&'static str] {
        &[".", " "]
    }
}
