//! Text Renderers for Materialized Trees
//!
//! Both renderers draw the same box-drawing layout and differ only in the
//! label printed per node:
//!
//! ```text
//! Projects/
//! ├── Website relaunch/
//! │   ├── Copy review
//! │   └── Launch checklist [+3 more]/
//! └── Hiring
//! ```
//!
//! Children are printed in the order they were materialized; no map
//! iteration is involved, so output is stable for a given tree.

use crate::models::{LoadedTree, TreeNode};
use crate::utils::text::{preview, title, PREVIEW_MAX};

const BRANCH: &str = "├── ";
const LAST_BRANCH: &str = "└── ";
const PIPE: &str = "│   ";
const SPACE: &str = "    ";

/// Titles only
pub fn render_structure(tree: &LoadedTree) -> String {
    render_with(tree, |node| title(&node.text))
}

/// Up to 150 characters of content per node
pub fn render_content(tree: &LoadedTree) -> String {
    render_with(tree, |node| preview(&node.text, PREVIEW_MAX))
}

fn render_with(tree: &LoadedTree, label: impl Fn(&TreeNode) -> String) -> String {
    let mut out = String::new();
    out.push_str(&line_for(&tree.root, &label));
    out.push('\n');
    render_children(&tree.root, "", &label, &mut out);
    out
}

fn render_children(
    node: &TreeNode,
    prefix: &str,
    label: &impl Fn(&TreeNode) -> String,
    out: &mut String,
) {
    let count = node.children.len();
    for (index, child) in node.children.iter().enumerate() {
        let last = index + 1 == count;
        out.push_str(prefix);
        out.push_str(if last { LAST_BRANCH } else { BRANCH });
        out.push_str(&line_for(child, label));
        out.push('\n');

        let child_prefix = format!("{}{}", prefix, if last { SPACE } else { PIPE });
        render_children(child, &child_prefix, label, out);
    }
}

fn line_for(node: &TreeNode, label: &impl Fn(&TreeNode) -> String) -> String {
    if node.is_sentinel() {
        return node.text.clone();
    }

    let mut line = label(node);
    if line.is_empty() {
        line.push_str("(empty)");
    }
    if node.has_more_children {
        let hidden = node.total_children.saturating_sub(node.shown_children);
        line.push_str(&format!(" [+{} more]", hidden));
    }
    if has_children(node) {
        line.push('/');
    }
    line
}

fn has_children(node: &TreeNode) -> bool {
    !node.children.is_empty() || node.total_children > 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TreeNodeKind;

    fn node(id: &str, text: &str, depth: usize, children: Vec<TreeNode>) -> TreeNode {
        TreeNode {
            id: id.to_string(),
            text: text.to_string(),
            created_at: None,
            updated_at: None,
            depth,
            total_children: children.len(),
            shown_children: children.len(),
            has_more_children: false,
            kind: TreeNodeKind::Node,
            children,
        }
    }

    #[test]
    fn test_structure_rendering_layout() {
        let tree = LoadedTree::new(node(
            "root",
            "Projects",
            0,
            vec![
                node(
                    "a",
                    "Website relaunch",
                    1,
                    vec![node("a1", "Copy review", 2, vec![])],
                ),
                node("b", "Hiring", 1, vec![]),
            ],
        ));

        let rendered = render_structure(&tree);
        let expected = "Projects/\n\
                        ├── Website relaunch/\n\
                        │   └── Copy review\n\
                        └── Hiring\n";
        assert_eq!(rendered, expected);
    }

    #[test]
    fn test_unexplored_children_are_marked() {
        let mut leaf = node("a", "Deep", 1, vec![]);
        leaf.total_children = 4;
        leaf.has_more_children = true;
        let tree = LoadedTree::new(node("root", "Root", 0, vec![leaf]));

        let rendered = render_structure(&tree);
        assert!(rendered.contains("└── Deep [+4 more]/"));
    }

    #[test]
    fn test_sentinels_render_verbatim() {
        let tree = LoadedTree::new(node(
            "a",
            "A",
            0,
            vec![node("b", "B", 1, vec![TreeNode::cycle("a", 2)])],
        ));
        let rendered = render_structure(&tree);
        assert!(rendered.contains("    └── [CYCLE DETECTED]"));
    }

    #[test]
    fn test_content_rendering_uses_previews() {
        let long = "word ".repeat(60);
        let tree = LoadedTree::new(node("root", &long, 0, vec![]));
        let rendered = render_content(&tree);
        let first_line = rendered.lines().next().unwrap();
        assert_eq!(first_line.chars().count(), PREVIEW_MAX + 3);
    }

    #[test]
    fn test_rendering_is_deterministic() {
        let tree = LoadedTree::new(node(
            "root",
            "Root",
            0,
            (0..10)
                .map(|i| node(&format!("c{i}"), &format!("Child {i}"), 1, vec![]))
                .collect(),
        ));
        assert_eq!(render_structure(&tree), render_structure(&tree));
        assert_eq!(render_content(&tree), render_content(&tree));
    }
}
