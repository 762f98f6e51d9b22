//! Tolerant header matching. Toll operators rename columns across exports
//! ("Amount", "Toll Amount", "Exit Date/Time"), so a lookup is driven by an
//! alias list per logical field and a single matching rule instead of exact
//! string comparison.

/// Normalize a header for comparison: trim, lowercase, read `#` as the word
/// "number", collapse whitespace runs.
pub(crate) fn normalize_header(header: &str) -> String {
    header
        .trim()
        .to_lowercase()
        .replace('#', " number")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// A header satisfies a candidate name when either normalized form contains
/// the other. The containment fallback is what keeps qualifier-heavy exports
/// ("Toll Amount (USD)") mapping to the right field.
fn header_matches(header: &str, candidate: &str) -> bool {
    let h = normalize_header(header);
    let c = normalize_header(candidate);
    if h.is_empty() || c.is_empty() {
        return false;
    }
    h == c || h.contains(&c) || c.contains(&h)
}

/// Index of the first header satisfying any candidate, tried in candidate
/// order so preferred aliases win.
pub(crate) fn find_column(headers: &[String], candidates: &[&str]) -> Option<usize> {
    for candidate in candidates {
        if let Some(i) = headers.iter().position(|h| header_matches(h, candidate)) {
            return Some(i);
        }
    }
    None
}
