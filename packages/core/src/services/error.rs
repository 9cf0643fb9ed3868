//! Service Layer Error Types
//!
//! Errors raised by the read primitives, the traversal engine and the
//! mutation engine. Remote failures are wrapped with the object and operation
//! they concern; nothing in the service layer retries.

use crate::remote::{AuthError, RemoteError};
use serde::Serialize;
use serde_json::{json, Value};
use thiserror::Error;

/// Service operation errors
#[derive(Error, Debug)]
pub enum GraphError {
    /// Could not obtain or use a bearer token
    #[error("Authentication failed: {0}")]
    Authentication(#[from] AuthError),

    /// A remote call about a single node failed
    #[error("Failed to {operation} node {node_id}: {message}")]
    NodeOperation {
        node_id: String,
        operation: String,
        status: Option<u16>,
        body: Option<String>,
        message: String,
    },

    /// A remote call about a single relation failed
    #[error("Failed to {operation} relation {relation_id}: {message}")]
    RelationOperation {
        relation_id: String,
        operation: String,
        status: Option<u16>,
        body: Option<String>,
        message: String,
    },

    /// A remote call covering many objects at once failed
    #[error("Batch {batch_id} failed during {operation}: {message}")]
    BatchOperation {
        batch_id: String,
        operation: String,
        status: Option<u16>,
        body: Option<String>,
        message: String,
    },

    /// Session user id is not a UUID
    #[error("Invalid user id format: {user_id}")]
    InvalidUserIdFormat { user_id: String },

    /// Node not found by ID
    #[error("Node not found: {id}")]
    NodeNotFound { id: String },

    /// Move requested from a parent the node is not attached to
    #[error("Node {node_id} has no child relation from {parent_id}")]
    NoParentRelation { node_id: String, parent_id: String },

    /// Caller supplied unusable arguments
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Structure mapping and its one-level fallback both failed
    #[error("Structure map of {root_id} failed: {original}; fallback also failed: {fallback}")]
    StructureMapFailed {
        root_id: String,
        original: String,
        fallback: String,
    },

    /// Request pipeline unavailable
    #[error("Transport error: {0}")]
    Transport(String),
}

/// Structured error body shared by the MCP and legacy HTTP surfaces
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorPayload {
    pub kind: &'static str,
    pub message: String,
    pub status: u16,
    pub details: Value,
}

/// Parts of a remote failure the wrappers carry along
struct RemoteContext {
    status: Option<u16>,
    body: Option<String>,
    message: String,
}

fn split_remote(err: RemoteError) -> Result<RemoteContext, GraphError> {
    match err {
        RemoteError::Authentication(auth) => Err(GraphError::Authentication(auth)),
        RemoteError::QueueClosed => Err(GraphError::Transport(err.to_string())),
        other => Ok(RemoteContext {
            status: other.http_status(),
            body: other.body().map(str::to_string),
            message: other.to_string(),
        }),
    }
}

impl GraphError {
    /// Wrap a remote failure about one node
    pub fn node_operation(
        node_id: impl Into<String>,
        operation: impl Into<String>,
        err: RemoteError,
    ) -> Self {
        match split_remote(err) {
            Ok(ctx) => Self::NodeOperation {
                node_id: node_id.into(),
                operation: operation.into(),
                status: ctx.status,
                body: ctx.body,
                message: ctx.message,
            },
            Err(e) => e,
        }
    }

    /// Wrap a remote failure about one relation
    pub fn relation_operation(
        relation_id: impl Into<String>,
        operation: impl Into<String>,
        err: RemoteError,
    ) -> Self {
        match split_remote(err) {
            Ok(ctx) => Self::RelationOperation {
                relation_id: relation_id.into(),
                operation: operation.into(),
                status: ctx.status,
                body: ctx.body,
                message: ctx.message,
            },
            Err(e) => e,
        }
    }

    /// Wrap a remote failure covering several objects
    pub fn batch_operation(
        batch_id: impl Into<String>,
        operation: impl Into<String>,
        err: RemoteError,
    ) -> Self {
        match split_remote(err) {
            Ok(ctx) => Self::BatchOperation {
                batch_id: batch_id.into(),
                operation: operation.into(),
                status: ctx.status,
                body: ctx.body,
                message: ctx.message,
            },
            Err(e) => e,
        }
    }

    /// Create a node not found error
    pub fn node_not_found(id: impl Into<String>) -> Self {
        Self::NodeNotFound { id: id.into() }
    }

    /// Create a missing parent relation error
    pub fn no_parent_relation(node_id: impl Into<String>, parent_id: impl Into<String>) -> Self {
        Self::NoParentRelation {
            node_id: node_id.into(),
            parent_id: parent_id.into(),
        }
    }

    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create an invalid user id error
    pub fn invalid_user_id(user_id: impl Into<String>) -> Self {
        Self::InvalidUserIdFormat {
            user_id: user_id.into(),
        }
    }

    /// Stable snake_case discriminator
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Authentication(_) => "authentication",
            Self::NodeOperation { .. } => "node_operation",
            Self::RelationOperation { .. } => "relation_operation",
            Self::BatchOperation { .. } => "batch_operation",
            Self::InvalidUserIdFormat { .. } => "invalid_user_id_format",
            Self::NodeNotFound { .. } => "node_not_found",
            Self::NoParentRelation { .. } => "no_parent_relation",
            Self::InvalidInput(_) => "invalid_input",
            Self::StructureMapFailed { .. } => "structure_map_failed",
            Self::Transport(_) => "transport",
        }
    }

    /// HTTP status the surfaces report for this error
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Authentication(_) => 401,
            Self::NodeNotFound { .. } => 404,
            Self::NoParentRelation { .. } => 409,
            Self::InvalidInput(_) | Self::InvalidUserIdFormat { .. } => 400,
            Self::NodeOperation { status, .. }
            | Self::RelationOperation { status, .. }
            | Self::BatchOperation { status, .. } => status.unwrap_or(502),
            Self::StructureMapFailed { .. } => 502,
            Self::Transport(_) => 503,
        }
    }

    pub fn to_payload(&self) -> ErrorPayload {
        let details = match self {
            Self::NodeOperation {
                node_id,
                operation,
                status,
                body,
                ..
            } => json!({
                "nodeId": node_id,
                "operation": operation,
                "remoteStatus": status,
                "body": body,
            }),
            Self::RelationOperation {
                relation_id,
                operation,
                status,
                body,
                ..
            } => json!({
                "relationId": relation_id,
                "operation": operation,
                "remoteStatus": status,
                "body": body,
            }),
            Self::BatchOperation {
                batch_id,
                operation,
                status,
                body,
                ..
            } => json!({
                "batchId": batch_id,
                "operation": operation,
                "remoteStatus": status,
                "body": body,
            }),
            Self::InvalidUserIdFormat { user_id } => json!({ "userId": user_id }),
            Self::NodeNotFound { id } => json!({ "nodeId": id }),
            Self::NoParentRelation { node_id, parent_id } => json!({
                "nodeId": node_id,
                "parentId": parent_id,
            }),
            Self::StructureMapFailed {
                root_id,
                original,
                fallback,
            } => json!({
                "rootId": root_id,
                "originalError": original,
                "fallbackError": fallback,
            }),
            Self::Authentication(_) | Self::InvalidInput(_) | Self::Transport(_) => Value::Null,
        };

        ErrorPayload {
            kind: self.kind(),
            message: self.to_string(),
            status: self.status_code(),
            details,
        }
    }
}

/// Convenience alias for service results
pub type GraphResult<T> = Result<T, GraphError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_status_is_carried_into_node_operation() {
        let err = GraphError::node_operation(
            "n1",
            "fetch",
            RemoteError::status("fetchLayer", 503, "busy"),
        );

        let payload = err.to_payload();
        assert_eq!(payload.kind, "node_operation");
        assert_eq!(payload.status, 503);
        assert_eq!(payload.details["nodeId"], "n1");
        assert_eq!(payload.details["body"], "busy");
    }

    #[test]
    fn test_auth_failure_stays_authentication() {
        let err = GraphError::batch_operation(
            "level-1",
            "fetch_layer",
            RemoteError::Authentication(AuthError::MissingCredentials("none".into())),
        );
        assert!(matches!(err, GraphError::Authentication(_)));
        assert_eq!(err.status_code(), 401);
    }

    #[test]
    fn test_queue_closed_maps_to_transport() {
        let err = GraphError::relation_operation("r1", "create", RemoteError::QueueClosed);
        assert_eq!(err.kind(), "transport");
        assert_eq!(err.status_code(), 503);
    }

    #[test]
    fn test_structure_map_failure_keeps_both_messages() {
        let err = GraphError::StructureMapFailed {
            root_id: "root".into(),
            original: "first".into(),
            fallback: "second".into(),
        };
        let message = err.to_string();
        assert!(message.contains("first"));
        assert!(message.contains("second"));
        assert_eq!(err.to_payload().details["fallbackError"], "second");
    }
}
