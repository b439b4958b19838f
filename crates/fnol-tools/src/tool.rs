//! Tool trait definition and types.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use voice_core::ToolRequestMeta;

use crate::error::ToolError;

/// Session used when a call carries no session id at all.
pub const DEFAULT_SESSION_ID: &str = "default";

/// Arguments passed to a tool for execution.
#[derive(Debug, Clone, Default)]
pub struct ToolArgs {
    /// Parameters as key-value pairs.
    pub params: HashMap<String, Value>,
    /// Routing metadata from the voice runtime, if any.
    pub meta: Option<ToolRequestMeta>,
}

impl ToolArgs {
    /// Create new tool arguments with the given parameters.
    pub fn new(params: HashMap<String, Value>) -> Self {
        Self { params, meta: None }
    }

    /// Create tool arguments carrying request metadata.
    pub fn with_meta(params: HashMap<String, Value>, meta: Option<ToolRequestMeta>) -> Self {
        Self { params, meta }
    }

    /// The session this call names, if it names one.
    ///
    /// An explicit `session_id` argument wins over the request metadata.
    pub fn session_id_opt(&self) -> Option<String> {
        self.get_string_opt("session_id")
            .or_else(|| self.meta.as_ref().and_then(|m| m.session_id.clone()))
    }

    /// The session this call belongs to, falling back to [`DEFAULT_SESSION_ID`].
    pub fn session_id(&self) -> String {
        self.session_id_opt()
            .unwrap_or_else(|| DEFAULT_SESSION_ID.to_string())
    }

    /// The caller's identity claim from the authenticated connection.
    pub fn customer_id_claim(&self) -> Option<String> {
        self.meta.as_ref().and_then(|m| m.customer_id.clone())
    }

    /// Get a string parameter, returning an error if missing or not a string.
    pub fn get_string(&self, key: &str) -> Result<String, ToolError> {
        self.params
            .get(key)
            .ok_or_else(|| ToolError::MissingParameter(key.to_string()))?
            .as_str()
            .map(|s| s.to_string())
            .ok_or_else(|| invalid(key, "expected string"))
    }

    /// Get an optional string parameter. Empty strings count as absent.
    pub fn get_string_opt(&self, key: &str) -> Option<String> {
        self.params
            .get(key)?
            .as_str()
            .filter(|s| !s.is_empty())
            .map(|s| s.to_string())
    }

    /// Get a boolean parameter, returning an error if missing or not a boolean.
    pub fn get_bool(&self, key: &str) -> Result<bool, ToolError> {
        self.params
            .get(key)
            .ok_or_else(|| ToolError::MissingParameter(key.to_string()))?
            .as_bool()
            .ok_or_else(|| invalid(key, "expected boolean"))
    }

    /// Get an optional JSON object parameter.
    pub fn get_object_opt(&self, key: &str) -> Result<Option<Map<String, Value>>, ToolError> {
        match self.params.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Object(map)) => Ok(Some(map.clone())),
            Some(_) => Err(invalid(key, "expected object")),
        }
    }

    /// Deserialize all parameters into `T`. Unknown keys are ignored by
    /// types that do not deny them.
    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<T, ToolError> {
        let object: Map<String, Value> = self
            .params
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        serde_json::from_value(Value::Object(object)).map_err(|e| invalid("arguments", &e.to_string()))
    }
}

fn invalid(name: &str, reason: &str) -> ToolError {
    ToolError::InvalidParameter {
        name: name.to_string(),
        reason: reason.to_string(),
    }
}

/// Output from a tool execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolOutput {
    /// The result content, a JSON object for every FNOL tool.
    pub content: String,
    /// Whether the execution was successful.
    pub success: bool,
}

impl ToolOutput {
    /// Create a successful output.
    pub fn success(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            success: true,
        }
    }

    /// Create a failed output.
    pub fn failure(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            success: false,
        }
    }

    /// Serialize `value` as the output content.
    pub fn json<T: Serialize>(success: bool, value: &T) -> Result<Self, ToolError> {
        let content = serde_json::to_string(value)?;
        Ok(Self { content, success })
    }

    /// Parse the content back into JSON.
    pub fn value(&self) -> Option<Value> {
        serde_json::from_str(&self.content).ok()
    }
}

/// A named capability the voice runtime can invoke.
#[async_trait]
pub trait Tool: Send + Sync {
    /// The tool's unique name (used for dispatch).
    fn name(&self) -> &str;

    /// Human-readable description of what the tool does.
    fn description(&self) -> &str;

    /// Execute the tool with the given arguments.
    async fn execute(&self, args: ToolArgs) -> Result<ToolOutput, ToolError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn args(value: Value) -> ToolArgs {
        let params = serde_json::from_value(value).unwrap();
        ToolArgs::new(params)
    }

    #[test]
    fn test_session_id_precedence() {
        let meta = ToolRequestMeta::for_session("from-meta", None);

        let explicit = ToolArgs::with_meta(
            serde_json::from_value(json!({"session_id": "explicit"})).unwrap(),
            Some(meta.clone()),
        );
        assert_eq!(explicit.session_id(), "explicit");

        let injected = ToolArgs::with_meta(HashMap::new(), Some(meta));
        assert_eq!(injected.session_id(), "from-meta");

        assert_eq!(ToolArgs::default().session_id_opt(), None);
        assert_eq!(ToolArgs::default().session_id(), DEFAULT_SESSION_ID);
    }

    #[test]
    fn test_typed_getters() {
        let a = args(json!({"flag": true, "name": "x", "obj": {"k": 1}, "num": 3}));

        assert!(a.get_bool("flag").unwrap());
        assert!(matches!(
            a.get_bool("missing"),
            Err(ToolError::MissingParameter(_))
        ));
        assert!(matches!(
            a.get_bool("name"),
            Err(ToolError::InvalidParameter { .. })
        ));
        assert_eq!(a.get_object_opt("obj").unwrap().unwrap()["k"], 1);
        assert!(a.get_object_opt("absent").unwrap().is_none());
        assert!(a.get_object_opt("num").is_err());
    }

    #[test]
    fn test_deserialize_rejects_wrong_types() {
        #[derive(Deserialize)]
        struct Shape {
            #[allow(dead_code)]
            count: Option<i64>,
        }

        assert!(args(json!({"count": 2, "extra": "ignored"}))
            .deserialize::<Shape>()
            .is_ok());
        assert!(matches!(
            args(json!({"count": "two"})).deserialize::<Shape>(),
            Err(ToolError::InvalidParameter { .. })
        ));
    }
}
