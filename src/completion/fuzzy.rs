use nucleo_matcher::{
    Config, Matcher, Utf32Str,
    pattern::{CaseMatching, Normalization, Pattern},
};

use super::candidate::LookupItem;

/// Drop items that do not match the typed look-ahead. Discovery order is kept.
pub fn filter_by_look_ahead(look_ahead: &str, items: Vec<LookupItem>) -> Vec<LookupItem> {
    if look_ahead.is_empty() {
        return items;
    }
    let mut matcher = Matcher::new(Config::DEFAULT);
    let pat = Pattern::parse(look_ahead, CaseMatching::Ignore, Normalization::Smart);
    let mut buf = Vec::new();
    items
        .into_iter()
        .filter(|item| {
            pat.score(Utf32Str::new(&item.display_text, &mut buf), &mut matcher)
                .is_some()
        })
        .collect()
}
