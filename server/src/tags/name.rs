//! Tag name normalization.

use std::sync::LazyLock;

use regex::Regex;

/// Everything outside ASCII letters, digits, `_` and `-`.
///
/// Must stay in step with the `tags.name` check constraint.
static DISALLOWED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9_-]").expect("valid regex"));

/// Strip disallowed characters. `None` when nothing is left.
#[must_use]
pub fn normalize(raw: &str) -> Option<String> {
    let cleaned = DISALLOWED.replace_all(raw, "");
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned.into_owned())
    }
}

/// Normalize a batch of names, dropping empties and duplicates.
///
/// First occurrence wins, so the caller's order is preserved.
#[must_use]
pub fn normalize_all<S: AsRef<str>>(raw: &[S]) -> Vec<String> {
    let mut names: Vec<String> = Vec::with_capacity(raw.len());
    for name in raw.iter().filter_map(|n| normalize(n.as_ref())) {
        if !names.contains(&name) {
            names.push(name);
        }
    }
    names
}
