//! Content Blocks
//!
//! A node's content is an ordered list of blocks. Each block is one of three
//! kinds: plain text, a mention of another node, or a replacement marker that
//! points the owning placement at a different node.
//!
//! External callers (AI agents, HTTP clients) send content in loose shapes:
//! a bare string, a single object, or an array mixing both. [`parse_content`]
//! is the single, total conversion from that loose input into typed blocks.
//! Input it cannot interpret still yields a (empty) text block, but is also
//! reported as a [`ContentDiagnostic`] so callers can log or surface it.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single typed content block
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ContentBlock {
    /// Plain text
    Text { value: String },

    /// Inline reference to another node
    #[serde(rename_all = "camelCase")]
    Mention { node_id: String },

    /// Marks the owning placement as a stand-in for another node
    #[serde(rename_all = "camelCase")]
    Replacement { node_id: String },
}

impl ContentBlock {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text {
            value: value.into(),
        }
    }

    pub fn mention(node_id: impl Into<String>) -> Self {
        Self::Mention {
            node_id: node_id.into(),
        }
    }

    pub fn replacement(node_id: impl Into<String>) -> Self {
        Self::Replacement {
            node_id: node_id.into(),
        }
    }

    /// Plain-text rendering of this block
    pub fn as_plain_text(&self) -> String {
        match self {
            Self::Text { value } => value.clone(),
            Self::Mention { node_id } => format!("@{}", node_id),
            Self::Replacement { node_id } => format!("=> {}", node_id),
        }
    }
}

/// Problems found while parsing loose content input
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ContentDiagnostic {
    /// The value had no recognizable shape and was replaced by empty text
    Unrecognized { index: usize, found: String },

    /// An object declared a known block type but lacked its required field
    MissingField {
        index: usize,
        block_type: String,
        field: String,
    },

    /// An object declared a block type this bridge does not know
    UnknownBlockType { index: usize, block_type: String },
}

/// Result of [`parse_content`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedContent {
    pub blocks: Vec<ContentBlock>,
    pub diagnostics: Vec<ContentDiagnostic>,
}

impl ParsedContent {
    /// First replacement target, if the content signals a replacement
    pub fn replacement_target(&self) -> Option<&str> {
        self.blocks.iter().find_map(|block| match block {
            ContentBlock::Replacement { node_id } => Some(node_id.as_str()),
            _ => None,
        })
    }

    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

/// Convert loose external content into typed blocks.
///
/// Accepted shapes:
///
/// - `"plain text"` → one text block
/// - `{"type": "text", "value": "..."}` (also `"text": "..."`)
/// - `{"type": "mention", "nodeId": "..."}` (also `"node_id"`, `"id"`)
/// - `{"type": "replacement", "nodeId": "..."}`
/// - an array of any of the above
///
/// `null` and an empty array produce no blocks. Everything else produces an
/// empty text block plus a diagnostic; this function never fails.
pub fn parse_content(value: &Value) -> ParsedContent {
    let mut parsed = ParsedContent::default();
    match value {
        Value::Null => {}
        Value::Array(items) => {
            for (index, item) in items.iter().enumerate() {
                parse_block(index, item, &mut parsed);
            }
        }
        other => parse_block(0, other, &mut parsed),
    }
    parsed
}

/// Convenience for callers that only have a plain string
pub fn text_content(text: &str) -> Vec<ContentBlock> {
    vec![ContentBlock::text(text)]
}

fn parse_block(index: usize, value: &Value, parsed: &mut ParsedContent) {
    match value {
        Value::String(text) => parsed.blocks.push(ContentBlock::text(text.clone())),
        Value::Object(map) => {
            let block_type = map
                .get("type")
                .and_then(Value::as_str)
                .map(str::to_ascii_lowercase);

            match block_type.as_deref() {
                Some("text") | None if map.contains_key("value") || map.contains_key("text") => {
                    let text = map
                        .get("value")
                        .or_else(|| map.get("text"))
                        .and_then(Value::as_str)
                        .unwrap_or_default();
                    parsed.blocks.push(ContentBlock::text(text));
                }
                Some("text") => {
                    parsed.diagnostics.push(ContentDiagnostic::MissingField {
                        index,
                        block_type: "text".to_string(),
                        field: "value".to_string(),
                    });
                    parsed.blocks.push(ContentBlock::text(""));
                }
                Some(kind @ ("mention" | "replacement")) => match node_reference(map) {
                    Some(node_id) if kind == "mention" => {
                        parsed.blocks.push(ContentBlock::mention(node_id))
                    }
                    Some(node_id) => parsed.blocks.push(ContentBlock::replacement(node_id)),
                    None => {
                        parsed.diagnostics.push(ContentDiagnostic::MissingField {
                            index,
                            block_type: kind.to_string(),
                            field: "nodeId".to_string(),
                        });
                        parsed.blocks.push(ContentBlock::text(""));
                    }
                },
                Some(other) => {
                    parsed.diagnostics.push(ContentDiagnostic::UnknownBlockType {
                        index,
                        block_type: other.to_string(),
                    });
                    parsed.blocks.push(ContentBlock::text(""));
                }
                None => unrecognized(index, value, parsed),
            }
        }
        other => unrecognized(index, other, parsed),
    }
}

fn node_reference(map: &serde_json::Map<String, Value>) -> Option<String> {
    ["nodeId", "node_id", "id"]
        .iter()
        .find_map(|key| map.get(*key).and_then(Value::as_str))
        .filter(|id| !id.is_empty())
        .map(str::to_string)
}

fn unrecognized(index: usize, value: &Value, parsed: &mut ParsedContent) {
    let found = match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    };
    parsed.diagnostics.push(ContentDiagnostic::Unrecognized {
        index,
        found: found.to_string(),
    });
    parsed.blocks.push(ContentBlock::text(""));
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_plain_string_becomes_text_block() {
        let parsed = parse_content(&json!("Buy milk"));
        assert_eq!(parsed.blocks, vec![ContentBlock::text("Buy milk")]);
        assert!(parsed.is_clean());
    }

    #[test]
    fn test_mixed_array() {
        let parsed = parse_content(&json!([
            "See ",
            {"type": "mention", "nodeId": "n-42"},
            {"type": "text", "value": " for details"}
        ]));
        assert_eq!(
            parsed.blocks,
            vec![
                ContentBlock::text("See "),
                ContentBlock::mention("n-42"),
                ContentBlock::text(" for details"),
            ]
        );
        assert!(parsed.is_clean());
    }

    #[test]
    fn test_replacement_is_detected() {
        let parsed = parse_content(&json!({"type": "replacement", "node_id": "target-1"}));
        assert_eq!(parsed.replacement_target(), Some("target-1"));
    }

    #[test]
    fn test_unrecognized_value_is_reported() {
        let parsed = parse_content(&json!(42));
        assert_eq!(parsed.blocks, vec![ContentBlock::text("")]);
        assert_eq!(
            parsed.diagnostics,
            vec![ContentDiagnostic::Unrecognized {
                index: 0,
                found: "number".to_string()
            }]
        );
    }

    #[test]
    fn test_mention_without_target_is_reported() {
        let parsed = parse_content(&json!([{"type": "mention"}]));
        assert_eq!(parsed.blocks, vec![ContentBlock::text("")]);
        assert!(matches!(
            parsed.diagnostics[0],
            ContentDiagnostic::MissingField { ref field, .. } if field == "nodeId"
        ));
    }

    #[test]
    fn test_unknown_block_type_is_reported() {
        let parsed = parse_content(&json!({"type": "image", "url": "x"}));
        assert!(matches!(
            parsed.diagnostics[0],
            ContentDiagnostic::UnknownBlockType { ref block_type, .. } if block_type == "image"
        ));
    }

    #[test]
    fn test_null_and_empty_array_have_no_blocks() {
        assert!(parse_content(&Value::Null).blocks.is_empty());
        assert!(parse_content(&json!([])).blocks.is_empty());
    }

    #[test]
    fn test_block_wire_format() {
        let value = serde_json::to_value(ContentBlock::mention("abc")).unwrap();
        assert_eq!(value, json!({"type": "mention", "nodeId": "abc"}));
    }
}
