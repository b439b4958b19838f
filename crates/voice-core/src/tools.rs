//! Tool request and result types exchanged with the voice runtime.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Connection-level metadata attached to a tool call.
///
/// The transport layer authenticates the caller and routes the session; the
/// tool layer only ever sees the outcome of that work.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolRequestMeta {
    /// Session identifier assigned by the transport.
    pub session_id: Option<String>,
    /// Customer identifier from the connection's identity claim.
    pub customer_id: Option<String>,
}

impl ToolRequestMeta {
    /// Metadata for a session with a known customer.
    pub fn for_session(session_id: impl Into<String>, customer_id: Option<String>) -> Self {
        Self {
            session_id: Some(session_id.into()),
            customer_id,
        }
    }
}

/// Result of a tool execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolResult {
    /// The tool call ID this result corresponds to.
    pub tool_call_id: String,
    /// The result content (JSON text for the intake tools).
    pub content: String,
    /// Whether the tool execution succeeded.
    pub success: bool,
}

impl ToolResult {
    /// Create a successful tool result.
    pub fn success(tool_call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            tool_call_id: tool_call_id.into(),
            content: content.into(),
            success: true,
        }
    }

    /// Create a failed tool result from an executor-level error.
    pub fn error(tool_call_id: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            tool_call_id: tool_call_id.into(),
            content: format!("Error: {}", error.into()),
            success: false,
        }
    }

    /// Create a failed result whose content is already a structured value.
    ///
    /// Unlike [`ToolResult::error`], the content is passed through untouched
    /// so JSON failure objects stay parseable.
    pub fn failure(tool_call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            tool_call_id: tool_call_id.into(),
            content: content.into(),
            success: false,
        }
    }

    /// Parse the content as JSON, if it is JSON.
    pub fn json(&self) -> Option<Value> {
        serde_json::from_str(&self.content).ok()
    }
}

/// A decoded tool call from the voice runtime.
#[derive(Debug, Clone)]
pub struct ToolRequest {
    /// Unique ID for this tool call.
    pub id: String,
    /// Name of the tool to execute.
    pub name: String,
    /// Arguments as a JSON object.
    pub arguments: HashMap<String, Value>,
    /// Optional metadata about the connection.
    pub metadata: Option<ToolRequestMeta>,
}

impl ToolRequest {
    /// Build a request from already-decoded arguments.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        arguments: HashMap<String, Value>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            arguments,
            metadata: None,
        }
    }

    /// Parse arguments from a JSON string.
    pub fn from_call(
        id: String,
        name: String,
        arguments_json: &str,
    ) -> Result<Self, serde_json::Error> {
        let arguments: HashMap<String, Value> = serde_json::from_str(arguments_json)?;
        Ok(Self {
            id,
            name,
            arguments,
            metadata: None,
        })
    }

    /// Attach metadata to an existing tool request.
    pub fn with_metadata(mut self, metadata: ToolRequestMeta) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Session id from the metadata, if any.
    pub fn session_id(&self) -> Option<&str> {
        self.metadata.as_ref()?.session_id.as_deref()
    }

    /// Get a string argument by name.
    pub fn get_string(&self, key: &str) -> Option<&str> {
        self.arguments.get(key).and_then(|v| v.as_str())
    }

    /// Get a required string argument, or return an error message.
    pub fn require_string(&self, key: &str) -> Result<&str, String> {
        self.get_string(key)
            .ok_or_else(|| format!("Missing required argument: {}", key))
    }
}

/// Trait for anything that can run the runtime's tool calls.
///
/// Implementations must not panic on collaborator failures: every outcome,
/// including timeouts and rejected calls, comes back as a [`ToolResult`].
#[async_trait]
pub trait ToolExecutor: Send + Sync {
    /// Execute a tool and return the result.
    async fn execute(&self, request: ToolRequest) -> ToolResult;

    /// List the tools this executor supports.
    fn supported_tools(&self) -> Vec<&str>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_result_success() {
        let result = ToolResult::success("call-123", "Some data");
        assert!(result.success);
        assert_eq!(result.tool_call_id, "call-123");
        assert_eq!(result.content, "Some data");
    }

    #[test]
    fn test_tool_result_error() {
        let result = ToolResult::error("call-456", "Something went wrong");
        assert!(!result.success);
        assert_eq!(result.content, "Error: Something went wrong");
    }

    #[test]
    fn test_failure_keeps_json_parseable() {
        let result = ToolResult::failure("call-789", r#"{"success":false}"#);
        assert!(!result.success);
        assert_eq!(result.json().unwrap()["success"], Value::Bool(false));
    }

    #[test]
    fn test_tool_request_parsing() {
        let request = ToolRequest::from_call(
            "id-1".to_string(),
            "extract_claim_info".to_string(),
            r#"{"policy_id": "POL-1", "number_of_passengers": 2}"#,
        )
        .unwrap();

        assert_eq!(request.name, "extract_claim_info");
        assert_eq!(request.get_string("policy_id"), Some("POL-1"));
        assert_eq!(request.get_string("number_of_passengers"), None);
        assert!(request.metadata.is_none());
        assert!(request.session_id().is_none());
    }

    #[test]
    fn test_metadata_session_id() {
        let request = ToolRequest::new("id-2", "assess_safety", HashMap::new())
            .with_metadata(ToolRequestMeta::for_session("sess-9", None));
        assert_eq!(request.session_id(), Some("sess-9"));
    }

    #[test]
    fn test_require_string_missing() {
        let request = ToolRequest::new("id-3", "get_customer_info", HashMap::new());
        let err = request.require_string("customer_id").unwrap_err();
        assert_eq!(err, "Missing required argument: customer_id");
    }
}
