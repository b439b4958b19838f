//! Tool registry for managing and executing tools.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info};
use voice_core::ToolRequestMeta;

use crate::error::ToolError;
use crate::tool::{Tool, ToolArgs, ToolOutput};

/// Registry of tools, dispatched by name.
#[derive(Default)]
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool.
    ///
    /// If a tool with the same name already exists, it will be replaced.
    pub fn register<T: Tool + 'static>(&mut self, tool: T) {
        self.register_shared(Arc::new(tool));
    }

    /// Register an already shared tool.
    pub fn register_shared(&mut self, tool: Arc<dyn Tool>) {
        let name = tool.name().to_string();
        info!("Registering tool: {}", name);
        self.tools.insert(name, tool);
    }

    /// Registered tool names, sorted.
    pub fn list_tools(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tools.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.tools.get(name)
    }

    pub fn has_tool(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// `(name, description)` pairs, sorted by name.
    pub fn get_descriptions(&self) -> Vec<(&str, &str)> {
        let mut descriptions: Vec<(&str, &str)> = self
            .tools
            .values()
            .map(|t| (t.name(), t.description()))
            .collect();
        descriptions.sort_unstable();
        descriptions
    }

    /// Execute a tool by name with the given parameters.
    pub async fn execute(
        &self,
        name: &str,
        params: HashMap<String, Value>,
        meta: Option<ToolRequestMeta>,
    ) -> Result<ToolOutput, ToolError> {
        let tool = self
            .tools
            .get(name)
            .ok_or_else(|| ToolError::NotFound(name.to_string()))?;

        debug!("Executing tool '{}' with {} params", name, params.len());

        let result = tool.execute(ToolArgs::with_meta(params, meta)).await?;

        debug!(
            "Tool '{}' completed: success={}, content_len={}",
            name,
            result.success,
            result.content.len()
        );

        Ok(result)
    }

    /// Execute a tool with a JSON arguments string.
    pub async fn execute_json(&self, name: &str, args_json: &str) -> Result<ToolOutput, ToolError> {
        let params: HashMap<String, Value> = serde_json::from_str(args_json)?;
        self.execute(name, params, None).await
    }
}
