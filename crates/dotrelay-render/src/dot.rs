//! DOT document detection.

/// Literal prefixes that identify a Graphviz DOT document.
const DOT_PREFIXES: [&str; 4] = ["strict digraph", "strict graph", "digraph", "graph"];

/// Check whether content looks like a Graphviz DOT document.
///
/// A cheap syntactic sniff, not a parser: the trimmed text must start
/// with one of the DOT keywords (case-sensitive). Documents preceded by
/// comments are rejected even when otherwise valid, and any text with the
/// right keyword prefix is accepted even when otherwise malformed.
#[must_use]
pub fn is_dot_document(content: &str) -> bool {
    let content = content.trim();
    DOT_PREFIXES.iter().any(|prefix| content.starts_with(prefix))
}
