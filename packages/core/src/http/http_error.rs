//! HTTP error handling for the legacy endpoints
//!
//! Every failure is returned as `{message, code, details}` with a status
//! code derived from the underlying error.

use crate::mcp::types::{MCPError, INVALID_PARAMS, METHOD_NOT_FOUND, NODE_NOT_FOUND};
use crate::services::GraphError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpError {
    /// User-facing error message
    pub message: String,
    /// Machine-readable error code, e.g. `NODE_NOT_FOUND`
    pub code: String,
    /// Structured details for debugging
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
    #[serde(skip)]
    pub status: StatusCode,
}

impl HttpError {
    pub fn new(message: impl Into<String>, code: impl Into<String>, status: StatusCode) -> Self {
        Self {
            message: message.into(),
            code: code.into(),
            details: None,
            status,
        }
    }

    pub fn with_details(mut self, details: Value) -> Self {
        if !details.is_null() {
            self.details = Some(details);
        }
        self
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(message, "INVALID_INPUT", StatusCode::BAD_REQUEST)
    }

    pub fn unknown_tool(name: &str) -> Self {
        Self::new(
            format!("Unknown tool: {}", name),
            "UNKNOWN_TOOL",
            StatusCode::NOT_FOUND,
        )
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}

impl From<GraphError> for HttpError {
    fn from(err: GraphError) -> Self {
        let payload = err.to_payload();
        let status =
            StatusCode::from_u16(payload.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        Self::new(payload.message, payload.kind.to_uppercase(), status).with_details(payload.details)
    }
}

impl From<MCPError> for HttpError {
    fn from(err: MCPError) -> Self {
        // Service errors carry their payload; protocol errors only a code
        if let Some(data) = err.data.as_ref() {
            if let (Some(kind), Some(status)) = (data["kind"].as_str(), data["status"].as_u64()) {
                let status = u16::try_from(status)
                    .ok()
                    .and_then(|s| StatusCode::from_u16(s).ok())
                    .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
                return Self::new(err.message.clone(), kind.to_uppercase(), status)
                    .with_details(data["details"].clone());
            }
        }

        let (code, status) = match err.code {
            INVALID_PARAMS => ("INVALID_INPUT", StatusCode::BAD_REQUEST),
            METHOD_NOT_FOUND => ("UNKNOWN_TOOL", StatusCode::NOT_FOUND),
            NODE_NOT_FOUND => ("NODE_NOT_FOUND", StatusCode::NOT_FOUND),
            _ => ("INTERNAL_ERROR", StatusCode::INTERNAL_SERVER_ERROR),
        };
        Self::new(err.message, code, status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_graph_error_status_mapping() {
        let cases = [
            (GraphError::node_not_found("n"), StatusCode::NOT_FOUND, "NODE_NOT_FOUND"),
            (GraphError::invalid_input("x"), StatusCode::BAD_REQUEST, "INVALID_INPUT"),
            (
                GraphError::no_parent_relation("n", "p"),
                StatusCode::CONFLICT,
                "NO_PARENT_RELATION",
            ),
            (
                GraphError::Transport("down".into()),
                StatusCode::SERVICE_UNAVAILABLE,
                "TRANSPORT",
            ),
        ];

        for (err, status, code) in cases {
            let http: HttpError = err.into();
            assert_eq!(http.status, status);
            assert_eq!(http.code, code);
        }
    }

    #[test]
    fn test_mcp_error_with_payload_keeps_service_status() {
        let mcp: MCPError = GraphError::node_not_found("n1").into();
        let http: HttpError = mcp.into();

        assert_eq!(http.status, StatusCode::NOT_FOUND);
        assert_eq!(http.code, "NODE_NOT_FOUND");
        assert_eq!(http.details.unwrap()["nodeId"], "n1");
    }

    #[test]
    fn test_protocol_errors() {
        let http: HttpError = MCPError::invalid_params("bad".into()).into();
        assert_eq!(http.status, StatusCode::BAD_REQUEST);
        assert_eq!(http.code, "INVALID_INPUT");

        let http: HttpError = MCPError::internal_error("boom".into()).into();
        assert_eq!(http.status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_body_shape() {
        let body = serde_json::to_value(HttpError::unknown_tool("nope")).unwrap();
        assert_eq!(body["code"], "UNKNOWN_TOOL");
        assert!(body.get("status").is_none());
        assert!(body.get("details").is_none());
    }
}
