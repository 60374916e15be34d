use rustc_hash::FxHashMap;
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ItemCategory {
    Class,
    Interface,
    Enum,
    Delegate,
    ValueType,
    Property,
    Method,
    MethodOverload,
    Field,
    Constant,
    Event,
    Namespace,
    ExtensionMethod,
    LocalVariable,
    Tag,
    Attribute,
    AttributeValue,
    CssProperty,
    CssValue,
    /// File or directory offered by the embedded-option helper.
    Path,
}

impl ItemCategory {
    pub fn is_method(self) -> bool {
        matches!(
            self,
            ItemCategory::Method | ItemCategory::MethodOverload | ItemCategory::ExtensionMethod
        )
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LookupItem {
    /// The text shown in the list (member, type, namespace or tag name).
    pub display_text: Arc<str>,
    /// The text inserted on selection.
    pub insert_text: String,
    pub category: ItemCategory,
    pub tooltip: Option<String>,
    /// One signature per overload; empty for non-methods.
    pub overloads: Vec<String>,
    /// Which lookup stage produced the item (debugging only).
    pub source: &'static str,
}

impl LookupItem {
    pub fn new(
        display_text: impl Into<Arc<str>>,
        insert_text: impl Into<String>,
        category: ItemCategory,
        source: &'static str,
    ) -> Self {
        Self {
            display_text: display_text.into(),
            insert_text: insert_text.into(),
            category,
            tooltip: None,
            overloads: Vec::new(),
            source,
        }
    }

    pub fn with_tooltip(mut self, tooltip: impl Into<String>) -> Self {
        self.tooltip = Some(tooltip.into());
        self
    }

    /// Record a signature. For methods it becomes the first overload too.
    pub fn with_signature(mut self, signature: impl Into<String>) -> Self {
        let signature = signature.into();
        if self.category.is_method() {
            self.overloads.push(signature.clone());
        }
        self.tooltip = Some(signature);
        self
    }
}

/// Candidate list for one resolution pass. Keeps discovery order; a method
/// name seen twice is merged into a single overload item, any other repeated
/// name keeps its first occurrence.
#[derive(Debug, Default)]
pub struct CandidateSet {
    items: Vec<LookupItem>,
    by_name: FxHashMap<Arc<str>, usize>,
}

impl CandidateSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn insert(&mut self, item: LookupItem) {
        let Some(&idx) = self.by_name.get(&item.display_text) else {
            self.by_name
                .insert(Arc::clone(&item.display_text), self.items.len());
            self.items.push(item);
            return;
        };

        let existing = &mut self.items[idx];
        if !existing.category.is_method() || !item.category.is_method() {
            return;
        }
        for sig in item.overloads {
            if !existing.overloads.contains(&sig) {
                existing.overloads.push(sig);
            }
        }
        let extra = existing.overloads.len().saturating_sub(1);
        if extra == 0 {
            return;
        }
        if existing.category == ItemCategory::Method {
            existing.category = ItemCategory::MethodOverload;
        }
        let first = existing.overloads[0].clone();
        let suffix = if extra == 1 { "overload" } else { "overloads" };
        existing.tooltip = Some(format!("{} (+{} {})", first, extra, suffix));
    }

    pub fn extend(&mut self, items: impl IntoIterator<Item = LookupItem>) {
        for item in items {
            self.insert(item);
        }
    }

    pub fn into_items(self) -> Vec<LookupItem> {
        self.items
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn method(name: &str, sig: &str) -> LookupItem {
        LookupItem::new(name, name, ItemCategory::Method, "test").with_signature(sig)
    }

    #[test]
    fn test_three_overloads_pluralise() {
        let mut set = CandidateSet::new();
        set.insert(method("Write", "void Write(int v)"));
        set.insert(method("Write", "void Write(string v)"));
        set.insert(method("Write", "void Write(object v)"));
        let items = set.into_items();
        assert_eq!(items.len(), 1);
        assert_eq!(
            items[0].tooltip.as_deref(),
            Some("void Write(int v) (+2 overloads)")
        );
    }

    #[test]
    fn test_identical_signature_is_not_an_overload() {
        let mut set = CandidateSet::new();
        set.insert(method("Run", "void Run()"));
        set.insert(method("Run", "void Run()"));
        let items = set.into_items();
        assert_eq!(items[0].category, ItemCategory::Method);
        assert_eq!(items[0].overloads.len(), 1);
    }

    #[test]
    fn test_non_method_duplicate_keeps_first() {
        let mut set = CandidateSet::new();
        set.insert(LookupItem::new("Count", "Count", ItemCategory::Property, "a"));
        set.insert(method("Count", "int Count()"));
        let items = set.into_items();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].category, ItemCategory::Property);
        assert_eq!(items[0].source, "a");
    }

    #[test]
    fn test_discovery_order_is_kept() {
        let mut set = CandidateSet::new();
        for name in ["b", "a", "c"] {
            set.insert(LookupItem::new(name, name, ItemCategory::Field, "t"));
        }
        let names: Vec<_> = set.into_items().iter().map(|i| i.display_text.to_string()).collect();
        assert_eq!(names, vec!["b", "a", "c"]);
    }
}
