//! Tool-call contract between the voice runtime and the intake tools.
//!
//! The bidirectional voice runtime decodes each user turn into a named tool
//! call. This crate defines the shapes that cross that boundary:
//!
//! - [`ToolRequest`] - A decoded tool call with JSON arguments
//! - [`ToolRequestMeta`] - Connection-level facts (session id, identity claim)
//! - [`ToolResult`] - The value handed back to the runtime to be spoken
//! - [`ToolExecutor`] - The trait anything that can run tool calls implements
//!
//! # Example
//!
//! ```rust
//! use voice_core::{async_trait, ToolExecutor, ToolRequest, ToolResult};
//!
//! struct Echo;
//!
//! #[async_trait]
//! impl ToolExecutor for Echo {
//!     async fn execute(&self, request: ToolRequest) -> ToolResult {
//!         match request.require_string("text") {
//!             Ok(text) => ToolResult::success(&request.id, text),
//!             Err(e) => ToolResult::error(&request.id, e),
//!         }
//!     }
//!
//!     fn supported_tools(&self) -> Vec<&str> {
//!         vec!["echo"]
//!     }
//! }
//! ```

mod tools;

pub use tools::{ToolExecutor, ToolRequest, ToolRequestMeta, ToolResult};

// Re-export async_trait for convenience
pub use async_trait::async_trait;
