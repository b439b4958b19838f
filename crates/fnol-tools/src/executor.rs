//! ToolExecutor implementation backed by ToolRegistry.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::timeout;
use tracing::warn;
use voice_core::{ToolExecutor, ToolRequest, ToolResult};

use crate::ToolRegistry;

/// Which tools may run, and for how long.
#[derive(Debug, Clone, Default)]
pub struct ToolPolicy {
    pub allowlist: Option<HashSet<String>>,
    pub timeout: Option<Duration>,
}

impl ToolPolicy {
    pub fn allow_tools<I, S>(mut self, tools: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let allowlist = self.allowlist.get_or_insert_with(HashSet::new);
        for tool in tools {
            allowlist.insert(tool.into());
        }
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Exposes a [`ToolRegistry`] to the voice runtime as a [`ToolExecutor`].
///
/// Tool outputs pass through as-is. Executor-level problems (a disallowed
/// tool, a timeout, bad arguments) become `Error: ...` results.
pub struct RegistryToolExecutor {
    registry: Arc<ToolRegistry>,
    policy: ToolPolicy,
}

impl RegistryToolExecutor {
    pub fn new(registry: ToolRegistry) -> Self {
        Self::with_policy(registry, ToolPolicy::default())
    }

    pub fn with_policy(registry: ToolRegistry, policy: ToolPolicy) -> Self {
        Self::from_shared(Arc::new(registry), policy)
    }

    pub fn from_shared(registry: Arc<ToolRegistry>, policy: ToolPolicy) -> Self {
        Self { registry, policy }
    }

    pub fn registry(&self) -> &ToolRegistry {
        self.registry.as_ref()
    }

    pub fn policy(&self) -> &ToolPolicy {
        &self.policy
    }

    fn is_allowed(&self, tool: &str) -> bool {
        match self.policy.allowlist {
            Some(ref allowlist) => allowlist.contains(tool),
            None => true,
        }
    }
}

#[async_trait::async_trait]
impl ToolExecutor for RegistryToolExecutor {
    async fn execute(&self, request: ToolRequest) -> ToolResult {
        if !self.is_allowed(&request.name) {
            warn!("Rejected call to disallowed tool '{}'", request.name);
            return ToolResult::error(&request.id, "Tool not allowed");
        }

        let execute_future =
            self.registry
                .execute(&request.name, request.arguments, request.metadata);

        let result = match self.policy.timeout {
            Some(timeout_duration) => match timeout(timeout_duration, execute_future).await {
                Ok(result) => result,
                Err(_) => {
                    warn!("Tool '{}' timed out after {:?}", request.name, timeout_duration);
                    return ToolResult::error(&request.id, "Tool execution timed out");
                }
            },
            None => execute_future.await,
        };

        match result {
            Ok(output) if output.success => ToolResult::success(&request.id, output.content),
            Ok(output) => ToolResult::failure(&request.id, output.content),
            Err(error) => {
                warn!("Tool '{}' failed: {}", request.name, error);
                ToolResult::error(&request.id, error.to_string())
            }
        }
    }

    fn supported_tools(&self) -> Vec<&str> {
        self.registry.list_tools()
    }
}
