//! Builds FTS5 match expressions from raw user queries.

/// Converts a raw search-as-you-type query into a safe FTS5 match
/// expression.
///
/// Each whitespace-separated term is reduced to its alphanumeric characters,
/// quoted, and suffixed with `*` so it matches as a prefix. Terms are joined
/// with spaces (implicit AND). Returns `None` when no usable term survives,
/// which callers treat as an empty result.
///
/// Quoting matters even after sanitizing: bare uppercase words like `NOT`
/// are operators to the FTS5 parser, quoted ones are terms.
pub fn build_match_expr(query: &str) -> Option<String> {
    let terms: Vec<String> = query.split_whitespace().filter_map(sanitize_term).collect();

    if terms.is_empty() {
        None
    } else {
        Some(terms.join(" "))
    }
}

fn sanitize_term(word: &str) -> Option<String> {
    let cleaned: String = word.chars().filter(|c| c.is_alphanumeric()).collect();

    if cleaned.is_empty() {
        None
    } else {
        Some(format!("\"{cleaned}\"*"))
    }
}
