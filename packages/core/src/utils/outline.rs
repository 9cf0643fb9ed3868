//! Indented outline parser
//!
//! Turns text like
//!
//! ```text
//! - Trip
//!   - [ ] Book flights
//!   - Packing
//!     - Passport
//! - Budget
//! ```
//!
//! into a forest of [`OutlineNode`]s. Nesting follows indentation: a line is
//! a child of the nearest previous line with a smaller indent. Tabs count as
//! four columns. Bullet markers (`-`, `*`, `+`, `•`, `1.`, `1)`) are stripped
//! and `[ ]` / `[x]` prefixes become checkbox state.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

const TAB_WIDTH: usize = 4;

/// Leading list marker: bullets or ordered numbers
static MARKER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:[-*+•]|\d+[.)])\s+").unwrap());

/// Leading checkbox after the marker
static CHECKBOX_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\[([ xX])\]\s*").unwrap());

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutlineNode {
    pub text: String,
    /// `Some` when the line carried a checkbox
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checked: Option<bool>,
    #[serde(default)]
    pub children: Vec<OutlineNode>,
}

impl OutlineNode {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            checked: None,
            children: Vec::new(),
        }
    }

    /// Nodes in this subtree, self included
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(OutlineNode::count).sum::<usize>()
    }
}

/// Flat entry used while the stack is being resolved
struct Entry {
    text: String,
    checked: Option<bool>,
    children: Vec<usize>,
}

fn indent_width(line: &str) -> usize {
    line.chars()
        .take_while(|c| c.is_whitespace())
        .map(|c| if c == '\t' { TAB_WIDTH } else { 1 })
        .sum()
}

fn strip_markers(line: &str) -> (String, Option<bool>) {
    let trimmed = line.trim();
    let without_marker = MARKER_RE.replace(trimmed, "");

    match CHECKBOX_RE.captures(&without_marker) {
        Some(caps) => {
            let checked = caps.get(1).map(|m| m.as_str() != " ").unwrap_or(false);
            let start = caps.get(0).map(|m| m.end()).unwrap_or(0);
            (without_marker[start..].trim().to_string(), Some(checked))
        }
        None => (without_marker.trim().to_string(), None),
    }
}

/// Parse an indented outline; blank lines are ignored
pub fn parse_outline(input: &str) -> Vec<OutlineNode> {
    let mut entries: Vec<Entry> = Vec::new();
    let mut roots: Vec<usize> = Vec::new();
    // (indent, entry index) of the open ancestors
    let mut stack: Vec<(usize, usize)> = Vec::new();

    for line in input.lines() {
        if line.trim().is_empty() {
            continue;
        }

        let indent = indent_width(line);
        let (text, checked) = strip_markers(line);
        if text.is_empty() && checked.is_none() {
            continue;
        }

        while stack.last().is_some_and(|(open, _)| *open >= indent) {
            stack.pop();
        }

        let index = entries.len();
        entries.push(Entry {
            text,
            checked,
            children: Vec::new(),
        });

        match stack.last() {
            Some(&(_, parent)) => entries[parent].children.push(index),
            None => roots.push(index),
        }
        stack.push((indent, index));
    }

    roots.iter().map(|&index| assemble(&entries, index)).collect()
}

fn assemble(entries: &[Entry], index: usize) -> OutlineNode {
    let entry = &entries[index];
    OutlineNode {
        text: entry.text.clone(),
        checked: entry.checked,
        children: entry
            .children
            .iter()
            .map(|&child| assemble(entries, child))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nesting_follows_indentation() {
        let outline = parse_outline(
            "- Trip\n  - Book flights\n  - Packing\n    - Passport\n- Budget\n",
        );

        assert_eq!(outline.len(), 2);
        assert_eq!(outline[0].text, "Trip");
        assert_eq!(outline[0].children.len(), 2);
        assert_eq!(outline[0].children[1].children[0].text, "Passport");
        assert_eq!(outline[1].text, "Budget");
        assert_eq!(outline.iter().map(OutlineNode::count).sum::<usize>(), 5);
    }

    #[test]
    fn test_dedent_returns_to_matching_ancestor() {
        let outline = parse_outline("A\n    B\n        C\n    D\nE");
        assert_eq!(outline.len(), 2);
        assert_eq!(outline[0].children.len(), 2);
        assert_eq!(outline[0].children[0].children[0].text, "C");
        assert_eq!(outline[0].children[1].text, "D");
    }

    #[test]
    fn test_uneven_dedent_attaches_to_nearest_shallower_line() {
        let outline = parse_outline("A\n    B\n  C");
        // C is deeper than A but shallower than B
        assert_eq!(outline[0].children.len(), 2);
        assert_eq!(outline[0].children[1].text, "C");
    }

    #[test]
    fn test_tabs_and_markers() {
        let outline = parse_outline("1. First\n\t* Nested\n2) Second");
        assert_eq!(outline.len(), 2);
        assert_eq!(outline[0].text, "First");
        assert_eq!(outline[0].children[0].text, "Nested");
        assert_eq!(outline[1].text, "Second");
    }

    #[test]
    fn test_checkboxes() {
        let outline = parse_outline("- [ ] open\n- [x] done\n- plain");
        assert_eq!(outline[0].checked, Some(false));
        assert_eq!(outline[0].text, "open");
        assert_eq!(outline[1].checked, Some(true));
        assert_eq!(outline[2].checked, None);
    }

    #[test]
    fn test_blank_lines_are_ignored() {
        let outline = parse_outline("\n\nA\n\n  B\n\n");
        assert_eq!(outline.len(), 1);
        assert_eq!(outline[0].children[0].text, "B");
    }

    #[test]
    fn test_empty_input() {
        assert!(parse_outline("").is_empty());
        assert!(parse_outline("   \n\t\n").is_empty());
    }
}
