//! Per-session orchestration of the voice FNOL intake tools.
//!
//! This crate provides the [`IntakeOrchestrator`] type, which sits between
//! the voice runtime and the tool registry for every call.
//!
//! # Features
//!
//! - Pins every tool call to the call's session and identity claim
//! - Holds claim collection back until the caller's safety is confirmed
//! - Drives the explicit [`ConversationPhase`] machine from tool outcomes
//! - Records turns, interruptions and tool calls in the session history
//! - Sweeps idle sessions in the background
//!
//! # Flow
//!
//! ```text
//! Tool call (from the voice runtime)
//!          ↓
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  INTAKE ORCHESTRATOR                        │
//! │                                                             │
//! │  1. Inject session id + identity claim                      │
//! │         ↓                                                   │
//! │  2. Gate: safety confirmed? phase allows this tool?         │
//! │         ↓                                                   │
//! │  3. Execute via the tool registry                           │
//! │         ↓                                                   │
//! │  4. Advance the phase, append a tool-call history entry     │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use intake_orchestrator::{IntakeOrchestrator, ToolRequest};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let orchestrator = IntakeOrchestrator::from_env()?;
//!     let _sweeper = orchestrator.spawn_sweeper(Duration::from_secs(60));
//!
//!     let session = orchestrator.start_session(Some("CUST-1".to_string())).await;
//!     let request = ToolRequest::from_call(
//!         "call-1".to_string(),
//!         "assess_safety".to_string(),
//!         r#"{"is_safe": true, "needs_medical": false,
//!             "police_contacted": true, "in_safe_location": true}"#,
//!     )?;
//!     let result = orchestrator.handle_tool_call(&session, request).await;
//!
//!     println!("{}", result.content);
//!     Ok(())
//! }
//! ```

mod error;
mod orchestrator;
mod session;
mod sweeper;

pub use error::OrchestratorError;
pub use orchestrator::IntakeOrchestrator;
pub use session::CallSession;
pub use sweeper::spawn_session_sweeper;

// Re-export commonly used types
pub use claim_core::{ConversationContext, ConversationPhase, HistoryEntry};
pub use fnol_tools::FnolConfig;
pub use voice_core::{ToolExecutor, ToolRequest, ToolRequestMeta, ToolResult};
