//! Mutation Engine
//!
//! Every logical write becomes exactly one `apply_transaction` call holding
//! an ordered list of [`TransactionOp`]s. The store applies the list
//! atomically, so a failed call leaves nothing half-written.
//!
//! | Operation        | Ops |
//! |------------------|-----|
//! | create (root)    | `addNode` |
//! | create (parent)  | + `addRelation(child)`, `updateRelationList(parent, add)` |
//! | create (label)   | + `addNode(label)`, `addRelation(__type__)`, `updateRelationList(relation, add)`, `updateRelation(canonical)` |
//! | update           | `updateNode` |
//! | delete           | `deleteNode` (nothing when the node is already gone) |
//! | move             | `updateRelation(fromId)`, `updateRelationList` remove + add |
//! | create relation  | `addRelation`, `updateRelationList` on both endpoints |
//!
//! Outlines are the exception: one transaction per outline line, parents
//! before children, since each child needs its parent to exist.

use crate::models::{
    parse_content, ContentBlock, ContentDiagnostic, ListAction, NewNode, NodeProps, Relation,
    RelationProps, TransactionOp, CHILD_RELATION, TYPE_RELATION,
};
use crate::remote::GraphStore;
use crate::services::error::{GraphError, GraphResult};
use crate::services::graph_reader::GraphReadService;
use crate::utils::outline::{parse_outline, OutlineNode};
use chrono::Utc;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use uuid::Uuid;

/// Reserved author ids for named AI identities
pub const AI_AUTHOR_IDS: [(&str, &str); 4] = [
    ("claude", "a1a1a1a1-0000-4000-8000-000000000001"),
    ("gpt", "a1a1a1a1-0000-4000-8000-000000000002"),
    ("gemini", "a1a1a1a1-0000-4000-8000-000000000003"),
    ("llama", "a1a1a1a1-0000-4000-8000-000000000004"),
];

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// The user this process acts for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionIdentity {
    user_id: String,
}

impl SessionIdentity {
    /// Validate and normalize the session user id
    pub fn new(user_id: &str) -> GraphResult<Self> {
        let parsed =
            Uuid::parse_str(user_id.trim()).map_err(|_| GraphError::invalid_user_id(user_id))?;
        Ok(Self {
            user_id: parsed.hyphenated().to_string(),
        })
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// Author id for a write
    ///
    /// No override means the session user. An override may be a UUID or an
    /// AI identity name (`claude`, `gpt`, `gemini`, `llama`, also with a
    /// version suffix such as `claude-sonnet`).
    pub fn resolve_author(&self, requested: Option<&str>) -> GraphResult<String> {
        let Some(requested) = requested.map(str::trim).filter(|r| !r.is_empty()) else {
            return Ok(self.user_id.clone());
        };

        let name = requested.to_ascii_lowercase();
        if let Some((_, id)) = AI_AUTHOR_IDS
            .iter()
            .find(|(ai, _)| name == *ai || name.starts_with(&format!("{}-", ai)))
        {
            return Ok(id.to_string());
        }

        Uuid::parse_str(requested)
            .map(|uuid| uuid.hyphenated().to_string())
            .map_err(|_| GraphError::invalid_input(format!("unknown author '{}'", requested)))
    }
}

#[derive(Debug, Clone, Default)]
pub struct CreateNodeRequest {
    /// Loose content: string, block object or array of both
    pub content: Value,
    pub parent_id: Option<String>,
    /// Text of a label node attached to the new child relation
    pub relation_label: Option<String>,
    pub author: Option<String>,
    pub is_public: Option<bool>,
    pub is_checked: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedNode {
    pub node_id: String,
    pub relation_id: Option<String>,
    pub label_node_id: Option<String>,
    pub type_relation_id: Option<String>,
    /// Node the placement was pointed at by a replacement block
    pub replaced_by: Option<String>,
    pub author_id: String,
    pub op_count: usize,
    pub diagnostics: Vec<ContentDiagnostic>,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateNodeRequest {
    pub node_id: String,
    pub content: Option<Value>,
    pub is_public: Option<bool>,
    /// `Some(None)` turns the checkbox off entirely
    pub is_checked: Option<Option<bool>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatedNode {
    pub node_id: String,
    pub diagnostics: Vec<ContentDiagnostic>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletedNode {
    pub node_id: String,
    /// False when the node was already gone and nothing was submitted
    pub existed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MovedNode {
    pub node_id: String,
    pub relation_id: String,
    pub old_parent_id: String,
    pub new_parent_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedRelation {
    pub relation_id: String,
    pub from_id: String,
    pub to_id: String,
    pub relation_type_id: String,
}

/// One node created from an outline line
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutlineEntry {
    pub node_id: String,
    pub parent_id: Option<String>,
    pub text: String,
    pub depth: usize,
}

/// Write-side access to the remote graph
#[derive(Clone)]
pub struct MutationService {
    store: Arc<dyn GraphStore>,
    reader: Arc<GraphReadService>,
    identity: SessionIdentity,
}

impl MutationService {
    pub fn new(
        store: Arc<dyn GraphStore>,
        reader: Arc<GraphReadService>,
        identity: SessionIdentity,
    ) -> Self {
        Self {
            store,
            reader,
            identity,
        }
    }

    pub fn identity(&self) -> &SessionIdentity {
        &self.identity
    }

    pub async fn create_node(&self, request: CreateNodeRequest) -> GraphResult<CreatedNode> {
        let parsed = parse_content(&request.content);
        for diagnostic in &parsed.diagnostics {
            tracing::warn!("Content diagnostic on create: {:?}", diagnostic);
        }

        let author_id = self.identity.resolve_author(request.author.as_deref())?;
        let is_public = request.is_public.unwrap_or(false);
        let node_id = new_id();

        let mut ops = vec![TransactionOp::AddNode {
            node: NewNode {
                id: node_id.clone(),
                content: parsed.blocks.clone(),
                author_id: author_id.clone(),
                created_at: Utc::now(),
                is_public,
                is_checked: request.is_checked,
                canonical_relation_id: None,
            },
        }];

        let mut created = CreatedNode {
            node_id: node_id.clone(),
            relation_id: None,
            label_node_id: None,
            type_relation_id: None,
            replaced_by: None,
            author_id: author_id.clone(),
            op_count: 0,
            diagnostics: parsed.diagnostics.clone(),
        };

        match request.parent_id.as_deref() {
            Some(parent_id) => {
                let relation_id = new_id();
                let mut relation =
                    Relation::new(relation_id.clone(), parent_id, node_id.clone(), CHILD_RELATION);
                relation.is_public = is_public;
                ops.push(TransactionOp::AddRelation { relation });
                ops.push(TransactionOp::UpdateRelationList {
                    object_id: parent_id.to_string(),
                    relation_id: relation_id.clone(),
                    action: ListAction::Add,
                });

                if let Some(label) = request.relation_label.as_deref() {
                    let (label_id, type_relation_id) =
                        push_label_ops(&mut ops, &relation_id, label, &author_id);
                    created.label_node_id = Some(label_id);
                    created.type_relation_id = Some(type_relation_id);
                }

                if let Some(target) = parsed.replacement_target() {
                    ops.push(TransactionOp::UpdateRelation {
                        id: relation_id.clone(),
                        old_props: RelationProps {
                            to_id: Some(node_id.clone()),
                            ..Default::default()
                        },
                        new_props: RelationProps {
                            to_id: Some(target.to_string()),
                            ..Default::default()
                        },
                    });
                    created.replaced_by = Some(target.to_string());
                }

                created.relation_id = Some(relation_id);
            }
            None => {
                if request.relation_label.is_some() {
                    return Err(GraphError::invalid_input(
                        "relation label requires a parent",
                    ));
                }
                if parsed.replacement_target().is_some() {
                    return Err(GraphError::invalid_input(
                        "replacement content requires a parent",
                    ));
                }
            }
        }

        created.op_count = ops.len();
        self.store
            .apply_transaction(&ops)
            .await
            .map_err(|e| GraphError::node_operation(&node_id, "create", e))?;

        tracing::info!(
            "Created node {} ({} op(s), parent {:?})",
            node_id,
            created.op_count,
            request.parent_id
        );
        Ok(created)
    }

    /// Read-modify-write of a node's props
    pub async fn update_node(&self, request: UpdateNodeRequest) -> GraphResult<UpdatedNode> {
        let node = self
            .reader
            .get_node(&request.node_id)
            .await?
            .ok_or_else(|| GraphError::node_not_found(&request.node_id))?;

        let mut old_props = NodeProps::default();
        let mut new_props = NodeProps::default();
        let mut diagnostics = Vec::new();

        if let Some(content) = &request.content {
            let parsed = parse_content(content);
            for diagnostic in &parsed.diagnostics {
                tracing::warn!("Content diagnostic on update: {:?}", diagnostic);
            }
            old_props.content = Some(node.content.clone());
            new_props.content = Some(parsed.blocks);
            diagnostics = parsed.diagnostics;
        }
        if let Some(is_public) = request.is_public {
            old_props.is_public = Some(node.is_public);
            new_props.is_public = Some(is_public);
        }
        if let Some(is_checked) = request.is_checked {
            old_props.is_checked = Some(node.is_checked);
            new_props.is_checked = Some(is_checked);
        }

        if new_props == NodeProps::default() {
            return Err(GraphError::invalid_input("nothing to update"));
        }
        old_props.updated_at = node.updated_at;
        new_props.updated_at = Some(Utc::now());

        let ops = [TransactionOp::UpdateNode {
            id: node.id.clone(),
            old_props,
            new_props,
        }];
        self.store
            .apply_transaction(&ops)
            .await
            .map_err(|e| GraphError::node_operation(&node.id, "update", e))?;

        Ok(UpdatedNode {
            node_id: node.id,
            diagnostics,
        })
    }

    /// Idempotent delete
    pub async fn delete_node(&self, node_id: &str) -> GraphResult<DeletedNode> {
        if self.reader.get_node(node_id).await?.is_none() {
            tracing::debug!("Delete of {} skipped, node does not exist", node_id);
            return Ok(DeletedNode {
                node_id: node_id.to_string(),
                existed: false,
            });
        }

        let ops = [TransactionOp::DeleteNode {
            id: node_id.to_string(),
        }];
        self.store
            .apply_transaction(&ops)
            .await
            .map_err(|e| GraphError::node_operation(node_id, "delete", e))?;

        Ok(DeletedNode {
            node_id: node_id.to_string(),
            existed: true,
        })
    }

    /// Re-point the node's child relation from `old_parent_id` to `new_parent_id`
    pub async fn move_node(
        &self,
        node_id: &str,
        old_parent_id: &str,
        new_parent_id: &str,
    ) -> GraphResult<MovedNode> {
        if old_parent_id == new_parent_id {
            return Err(GraphError::invalid_input(
                "old and new parent are the same node",
            ));
        }

        let layer = self.reader.get_node_layer(node_id).await?;
        let relation = layer
            .relations
            .iter()
            .find(|relation| relation.is_child_of(old_parent_id) && relation.to_id == node_id)
            .ok_or_else(|| GraphError::no_parent_relation(node_id, old_parent_id))?;

        let ops = [
            TransactionOp::UpdateRelation {
                id: relation.id.clone(),
                old_props: RelationProps {
                    from_id: Some(old_parent_id.to_string()),
                    ..Default::default()
                },
                new_props: RelationProps {
                    from_id: Some(new_parent_id.to_string()),
                    ..Default::default()
                },
            },
            TransactionOp::UpdateRelationList {
                object_id: old_parent_id.to_string(),
                relation_id: relation.id.clone(),
                action: ListAction::Remove,
            },
            TransactionOp::UpdateRelationList {
                object_id: new_parent_id.to_string(),
                relation_id: relation.id.clone(),
                action: ListAction::Add,
            },
        ];
        self.store
            .apply_transaction(&ops)
            .await
            .map_err(|e| GraphError::relation_operation(&relation.id, "move", e))?;

        Ok(MovedNode {
            node_id: node_id.to_string(),
            relation_id: relation.id.clone(),
            old_parent_id: old_parent_id.to_string(),
            new_parent_id: new_parent_id.to_string(),
        })
    }

    pub async fn create_relation(
        &self,
        from_id: &str,
        to_id: &str,
        relation_type_id: &str,
    ) -> GraphResult<CreatedRelation> {
        let relation_type_id = relation_type_id.trim();
        if relation_type_id.is_empty() {
            return Err(GraphError::invalid_input("relation type must not be empty"));
        }

        let relation_id = new_id();
        let ops = [
            TransactionOp::AddRelation {
                relation: Relation::new(relation_id.clone(), from_id, to_id, relation_type_id),
            },
            TransactionOp::UpdateRelationList {
                object_id: from_id.to_string(),
                relation_id: relation_id.clone(),
                action: ListAction::Add,
            },
            TransactionOp::UpdateRelationList {
                object_id: to_id.to_string(),
                relation_id: relation_id.clone(),
                action: ListAction::Add,
            },
        ];
        self.store
            .apply_transaction(&ops)
            .await
            .map_err(|e| GraphError::relation_operation(&relation_id, "create", e))?;

        Ok(CreatedRelation {
            relation_id,
            from_id: from_id.to_string(),
            to_id: to_id.to_string(),
            relation_type_id: relation_type_id.to_string(),
        })
    }

    /// Create one node per outline line under `parent_id`
    ///
    /// Stops at the first failure; nodes created before it remain.
    pub async fn create_from_outline(
        &self,
        parent_id: Option<&str>,
        outline: &str,
        author: Option<&str>,
    ) -> GraphResult<Vec<OutlineEntry>> {
        let roots = parse_outline(outline);
        if roots.is_empty() {
            return Err(GraphError::invalid_input("outline contains no lines"));
        }

        // Explicit stack keeps the walk depth-first and parents-first
        let mut stack: Vec<(OutlineNode, Option<String>, usize)> = roots
            .into_iter()
            .rev()
            .map(|node| (node, parent_id.map(str::to_string), 0))
            .collect();
        let mut created = Vec::new();

        while let Some((node, parent, depth)) = stack.pop() {
            let result = self
                .create_node(CreateNodeRequest {
                    content: Value::String(node.text.clone()),
                    parent_id: parent.clone(),
                    author: author.map(str::to_string),
                    is_checked: node.checked,
                    ..Default::default()
                })
                .await?;

            for child in node.children.into_iter().rev() {
                stack.push((child, Some(result.node_id.clone()), depth + 1));
            }

            created.push(OutlineEntry {
                node_id: result.node_id,
                parent_id: parent,
                text: node.text,
                depth,
            });
        }

        tracing::info!("Created {} node(s) from outline", created.len());
        Ok(created)
    }
}

/// Label node, `__type__` relation and the canonical-relation rewrite
fn push_label_ops(
    ops: &mut Vec<TransactionOp>,
    relation_id: &str,
    label: &str,
    author_id: &str,
) -> (String, String) {
    let label_id = new_id();
    let type_relation_id = new_id();

    ops.push(TransactionOp::AddNode {
        node: NewNode {
            id: label_id.clone(),
            content: vec![ContentBlock::text(label)],
            author_id: author_id.to_string(),
            created_at: Utc::now(),
            is_public: false,
            is_checked: None,
            canonical_relation_id: None,
        },
    });
    ops.push(TransactionOp::AddRelation {
        relation: Relation::new(
            type_relation_id.clone(),
            relation_id,
            label_id.clone(),
            TYPE_RELATION,
        ),
    });
    ops.push(TransactionOp::UpdateRelationList {
        object_id: relation_id.to_string(),
        relation_id: type_relation_id.clone(),
        action: ListAction::Add,
    });
    ops.push(TransactionOp::UpdateRelation {
        id: relation_id.to_string(),
        old_props: RelationProps {
            canonical_relation_id: Some(None),
            ..Default::default()
        },
        new_props: RelationProps {
            canonical_relation_id: Some(Some(type_relation_id.clone())),
            ..Default::default()
        },
    });

    (label_id, type_relation_id)
}

#[cfg(test)]
#[path = "mutation_service_test.rs"]
mod mutation_service_test;
