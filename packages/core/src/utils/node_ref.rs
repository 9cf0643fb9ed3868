//! Node reference parsing
//!
//! Tool arguments that name a node accept either a raw id or a link copied
//! from the note-taking app. Links are reduced to the node id they point at.

use regex::Regex;
use std::sync::LazyLock;

/// A bare id: letters, digits, `-` and `_`
static RAW_ID_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").unwrap());

/// Any UUID inside a longer string
static UUID_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}")
        .unwrap()
});

/// `node=`, `nodeId=` or `id=` query parameters
static QUERY_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[?&](?:node|nodeId|id)=([A-Za-z0-9_-]+)").unwrap());

/// Resolve a raw id or app URL to a node id
///
/// # Examples
///
/// ```
/// # use notegraph_core::utils::node_ref::parse_node_ref;
/// assert_eq!(parse_node_ref("abc-123").as_deref(), Some("abc-123"));
/// assert_eq!(
///     parse_node_ref("https://app.example.com/n/abc-123?view=tree").as_deref(),
///     Some("abc-123")
/// );
/// assert_eq!(parse_node_ref("   "), None);
/// ```
pub fn parse_node_ref(input: &str) -> Option<String> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }
    if RAW_ID_RE.is_match(input) {
        return Some(input.to_string());
    }

    // The last UUID wins: links to nested views end with the focused node
    if let Some(found) = UUID_RE.find_iter(input).last() {
        return Some(found.as_str().to_lowercase());
    }

    if let Some(caps) = QUERY_ID_RE.captures(input) {
        return caps.get(1).map(|m| m.as_str().to_string());
    }

    let without_scheme = input.split_once("://").map_or(input, |(_, rest)| rest);
    let path = without_scheme
        .split(['?', '#'])
        .next()
        .unwrap_or(without_scheme);

    // Skip the host when the input was a URL
    let mut segments = path.split('/').filter(|s| !s.is_empty());
    if input.contains("://") {
        segments.next();
    }

    segments
        .filter(|segment| RAW_ID_RE.is_match(segment))
        .last()
        .map(str::to_string)
}
