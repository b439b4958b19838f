//! Per-session coordination of the intake tools.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use claim_core::{ClaimError, ContextStore, ConversationContext, ConversationPhase};
use fnol_tools::tools::{
    ASSESS_SAFETY, EXTRACT_CLAIM_INFO, SUBMIT_TO_FNOL_API, VALIDATE_REQUIRED_FIELDS,
};
use fnol_tools::{
    fnol_registry, FnolConfig, RegistryToolExecutor, ToolPolicy, ToolRegistry, DEFAULT_SESSION_ID,
};
use serde_json::{json, Value};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use voice_core::{ToolExecutor, ToolRequest, ToolResult};

use crate::error::OrchestratorError;
use crate::session::CallSession;
use crate::sweeper::spawn_session_sweeper;

/// Headroom on top of the slowest collaborator timeout.
const TOOL_TIMEOUT_MARGIN: Duration = Duration::from_secs(5);

/// Coordinates tool calls for every active call.
///
/// The orchestrator:
/// - Pins each call to its session id and the caller's identity claim
/// - Refuses claim tools until the caller's safety is confirmed
/// - Moves the session through its [`ConversationPhase`]s
/// - Feeds the session's own fields to validation when none are sent
/// - Keeps an audit trail of turns, interruptions and tool calls
pub struct IntakeOrchestrator {
    executor: Arc<dyn ToolExecutor>,
    store: Arc<ContextStore>,
}

impl IntakeOrchestrator {
    /// Create an orchestrator over any executor sharing `store` with its tools.
    pub fn new(executor: Arc<dyn ToolExecutor>, store: Arc<ContextStore>) -> Self {
        Self { executor, store }
    }

    /// Create an orchestrator over `registry`, restricted to its own tools.
    pub fn with_registry(registry: ToolRegistry, store: Arc<ContextStore>, timeout: Duration) -> Self {
        for (name, description) in registry.get_descriptions() {
            info!("Orchestrating tool {}: {}", name, description);
        }
        let tools: Vec<String> = registry.list_tools().into_iter().map(String::from).collect();

        let policy = ToolPolicy::default()
            .allow_tools(tools)
            .with_timeout(timeout);
        let executor = RegistryToolExecutor::with_policy(registry, policy);
        Self::new(Arc::new(executor), store)
    }

    /// Create an orchestrator with the five FNOL tools from `config`.
    pub fn from_config(config: &FnolConfig) -> Result<Self, OrchestratorError> {
        let store = Arc::new(ContextStore::with_ttl(config.session_ttl));
        let registry = fnol_registry(config, store.clone())?;
        let timeout = config.submit_timeout.max(config.customer_timeout) + TOOL_TIMEOUT_MARGIN;
        Ok(Self::with_registry(registry, store, timeout))
    }

    /// Create an orchestrator from environment variables.
    pub fn from_env() -> Result<Self, OrchestratorError> {
        Self::from_config(&FnolConfig::from_env())
    }

    /// The shared session store.
    pub fn store(&self) -> &Arc<ContextStore> {
        &self.store
    }

    /// Start sweeping idle sessions every `period`.
    pub fn spawn_sweeper(&self, period: Duration) -> JoinHandle<()> {
        spawn_session_sweeper(self.store.clone(), period)
    }

    /// Begin a new call.
    pub async fn start_session(&self, customer_id: Option<String>) -> CallSession {
        let session = CallSession::new(customer_id);
        let customer_id = session.customer_id.clone();
        self.store
            .update(&session.session_id, |context| {
                if context.customer_id.is_none() {
                    context.customer_id = customer_id;
                }
            })
            .await;
        info!("Started session {}", session.session_id);
        session
    }

    /// Snapshot of the call's context.
    pub async fn context(&self, session: &CallSession) -> ConversationContext {
        self.store.get(&session.session_id).await
    }

    /// The call's current phase.
    pub async fn phase(&self, session: &CallSession) -> ConversationPhase {
        self.context(session).await.current_phase
    }

    /// Record a spoken turn.
    pub async fn record_message(&self, session: &CallSession, role: &str, message: &str) {
        self.store
            .append_to_conversation_history(&session.session_id, role, message)
            .await;
    }

    /// Record that the caller talked over the agent; returns the running count.
    pub async fn record_interruption(&self, session: &CallSession, reason: &str) -> u32 {
        self.store
            .record_interruption(&session.session_id, reason)
            .await
    }

    /// Run a tool call on behalf of `session`.
    pub async fn handle_tool_call(&self, session: &CallSession, request: ToolRequest) -> ToolResult {
        self.execute(request.with_metadata(session.meta())).await
    }

    /// Gate a claim tool on safety and phase.
    async fn admit(&self, session_id: &str, tool: &str) -> Result<(), OrchestratorError> {
        let target = match tool {
            EXTRACT_CLAIM_INFO => ConversationPhase::Collecting,
            VALIDATE_REQUIRED_FIELDS => ConversationPhase::Validating,
            SUBMIT_TO_FNOL_API => ConversationPhase::Submitted,
            _ => return Ok(()),
        };

        let context = self.store.get(session_id).await;
        if !context.safety_confirmed {
            return Err(OrchestratorError::SafetyNotConfirmed);
        }

        let phase = context.current_phase;
        if tool == SUBMIT_TO_FNOL_API
            && phase != ConversationPhase::Confirming
            && !phase.is_terminal()
        {
            return Err(OrchestratorError::NotConfirmed(phase));
        }
        phase.transition(target)?;
        Ok(())
    }

    /// Apply the phase change a finished tool call implies.
    async fn advance(&self, session_id: &str, tool: &str, result: &ToolResult) {
        let value = result.json();
        let flag = |key: &str| value.as_ref().and_then(|v| v.get(key)).and_then(Value::as_bool);

        match tool {
            ASSESS_SAFETY => {
                let Some(confirmed) = flag("safety_confirmed") else {
                    return;
                };
                self.store
                    .update(session_id, |context| {
                        context.safety_confirmed = confirmed;
                        if confirmed && context.current_phase == ConversationPhase::SafetyCheck {
                            context.current_phase = ConversationPhase::Collecting;
                        }
                    })
                    .await;
                info!("Session {} safety confirmed: {}", session_id, confirmed);
            }
            EXTRACT_CLAIM_INFO if result.success => {
                self.move_through(session_id, &[ConversationPhase::Collecting])
                    .await
            }
            VALIDATE_REQUIRED_FIELDS if result.success => {
                let next = if flag("is_valid").unwrap_or(false) {
                    ConversationPhase::Confirming
                } else {
                    ConversationPhase::Collecting
                };
                self.move_through(session_id, &[ConversationPhase::Validating, next])
                    .await
            }
            SUBMIT_TO_FNOL_API if result.success => {
                self.move_through(session_id, &[ConversationPhase::Submitted])
                    .await
            }
            _ => {}
        }
    }

    async fn move_through(&self, session_id: &str, path: &[ConversationPhase]) {
        let outcome = self
            .store
            .update(session_id, |context| {
                let mut phase = context.current_phase;
                for &to in path {
                    phase = phase.transition(to)?;
                }
                context.current_phase = phase;
                Ok::<_, ClaimError>(phase)
            })
            .await;

        match outcome {
            Ok(phase) => debug!("Session {} now in phase {}", session_id, phase),
            Err(e) => warn!("Session {} kept its phase: {}", session_id, e),
        }
    }
}

fn resolve_session(request: &ToolRequest) -> String {
    request
        .session_id()
        .or_else(|| request.get_string("session_id"))
        .filter(|id| !id.is_empty())
        .unwrap_or(DEFAULT_SESSION_ID)
        .to_string()
}

fn rejection(tool_call_id: &str, error: &OrchestratorError) -> ToolResult {
    let content = json!({
        "success": false,
        "error": error.to_string(),
        "message": error.spoken_message(),
    });
    ToolResult::failure(tool_call_id, content.to_string())
}

#[async_trait]
impl ToolExecutor for IntakeOrchestrator {
    async fn execute(&self, mut request: ToolRequest) -> ToolResult {
        let session_id = resolve_session(&request);
        if let Some(sent) = request.get_string("session_id") {
            if sent != session_id {
                debug!("Replacing session_id {} with {}", sent, session_id);
            }
        }
        request
            .arguments
            .insert("session_id".to_string(), Value::String(session_id.clone()));
        request
            .metadata
            .get_or_insert_with(Default::default)
            .session_id = Some(session_id.clone());

        info!("Tool call {} in session {}", request.name, session_id);
        let name = request.name.clone();

        if let Err(e) = self.admit(&session_id, &name).await {
            warn!("Rejected {} in session {}: {}", name, session_id, e);
            self.store.record_tool_call(&session_id, &name, false).await;
            return rejection(&request.id, &e);
        }

        if name == VALIDATE_REQUIRED_FIELDS && !request.arguments.contains_key("claim_data") {
            let claim_map = self.store.get(&session_id).await.to_claim_map();
            request
                .arguments
                .insert("claim_data".to_string(), Value::Object(claim_map));
        }

        let result = self.executor.execute(request).await;
        self.advance(&session_id, &name, &result).await;
        self.store
            .record_tool_call(&session_id, &name, result.success)
            .await;
        result
    }

    fn supported_tools(&self) -> Vec<&str> {
        self.executor.supported_tools()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use claim_core::HistoryEntry;
    use fnol_tools::{fnol_registry_with_signer, UnsignedSigner};
    use std::collections::HashMap;

    fn orchestrator() -> IntakeOrchestrator {
        let store = Arc::new(ContextStore::new());
        let registry = fnol_registry_with_signer(
            &FnolConfig::builder().build(),
            store.clone(),
            Arc::new(UnsignedSigner),
        )
        .unwrap();
        IntakeOrchestrator::with_registry(registry, store, Duration::from_secs(5))
    }

    fn call(name: &str, arguments: Value) -> ToolRequest {
        let arguments: HashMap<String, Value> = serde_json::from_value(arguments).unwrap();
        ToolRequest::new("call-1", name, arguments)
    }

    fn safe() -> ToolRequest {
        call(
            ASSESS_SAFETY,
            json!({
                "is_safe": true,
                "needs_medical": false,
                "police_contacted": true,
                "in_safe_location": true
            }),
        )
    }

    #[tokio::test]
    async fn test_claim_tools_wait_for_safety() {
        let orchestrator = orchestrator();
        let session = orchestrator.start_session(None).await;

        let result = orchestrator
            .handle_tool_call(&session, call(EXTRACT_CLAIM_INFO, json!({"policy_id": "POL-1"})))
            .await;

        assert!(!result.success);
        let value = result.json().unwrap();
        assert_eq!(value["error"], "safety has not been confirmed for this call");
        assert!(orchestrator.context(&session).await.policy_id.is_none());
    }

    #[tokio::test]
    async fn test_safety_confirmation_starts_collecting() {
        let orchestrator = orchestrator();
        let session = orchestrator.start_session(None).await;

        let result = orchestrator.handle_tool_call(&session, safe()).await;
        assert!(result.success);

        let context = orchestrator.context(&session).await;
        assert!(context.safety_confirmed);
        assert_eq!(context.current_phase, ConversationPhase::Collecting);
    }

    #[tokio::test]
    async fn test_unsafe_caller_stays_in_safety_check() {
        let orchestrator = orchestrator();
        let session = orchestrator.start_session(None).await;

        let request = call(
            ASSESS_SAFETY,
            json!({
                "is_safe": false,
                "needs_medical": true,
                "police_contacted": false,
                "in_safe_location": true
            }),
        );
        let result = orchestrator.handle_tool_call(&session, request).await;

        assert!(result.success);
        assert_eq!(result.json().unwrap()["safety_confirmed"], false);
        assert_eq!(orchestrator.phase(&session).await, ConversationPhase::SafetyCheck);
    }

    #[tokio::test]
    async fn test_session_id_is_pinned_to_the_call() {
        let orchestrator = orchestrator();
        let session = orchestrator.start_session(None).await;
        orchestrator.handle_tool_call(&session, safe()).await;

        let request = call(
            EXTRACT_CLAIM_INFO,
            json!({"session_id": "someone-else", "policy_id": "POL-1"}),
        );
        let result = orchestrator.handle_tool_call(&session, request).await;

        assert!(result.success);
        assert_eq!(
            orchestrator.context(&session).await.policy_id.as_deref(),
            Some("POL-1")
        );
        assert!(orchestrator.store().get("someone-else").await.policy_id.is_none());
    }

    #[tokio::test]
    async fn test_validation_uses_session_fields() {
        let orchestrator = orchestrator();
        let session = orchestrator.start_session(None).await;
        orchestrator.handle_tool_call(&session, safe()).await;
        orchestrator
            .handle_tool_call(
                &session,
                call(EXTRACT_CLAIM_INFO, json!({"damage_description": "Dented door"})),
            )
            .await;

        let result = orchestrator
            .handle_tool_call(&session, call(VALIDATE_REQUIRED_FIELDS, json!({})))
            .await;

        assert!(result.success);
        let report = result.json().unwrap();
        assert_eq!(report["is_valid"], false);
        let missing = report["missing_fields"].as_array().unwrap();
        assert!(!missing.contains(&json!("damageDescription")));
        assert!(missing.contains(&json!("policyNumber")));
        assert_eq!(orchestrator.phase(&session).await, ConversationPhase::Collecting);
    }

    #[tokio::test]
    async fn test_submission_requires_confirmation() {
        let orchestrator = orchestrator();
        let session = orchestrator.start_session(Some("CUST-1".to_string())).await;
        orchestrator.handle_tool_call(&session, safe()).await;

        let result = orchestrator
            .handle_tool_call(&session, call(SUBMIT_TO_FNOL_API, json!({})))
            .await;

        assert!(!result.success);
        let value = result.json().unwrap();
        assert_eq!(
            value["error"],
            "claim must be confirmed before submission (current phase: collecting)"
        );
    }

    #[tokio::test]
    async fn test_revalidation_while_confirming() {
        let orchestrator = orchestrator();
        let session = orchestrator.start_session(None).await;
        orchestrator.handle_tool_call(&session, safe()).await;
        let complete = || {
            call(
                VALIDATE_REQUIRED_FIELDS,
                json!({"claim_data": {
                    "location": "Main St", "dateTime": "2025-01-01T12:00:00Z",
                    "damageDescription": "Dent", "policyNumber": "POL-1",
                    "driversLicense": "D1", "numberOfPassengers": 0,
                    "wasDriving": true, "policeFiled": false, "otherPartyName": "Bob"
                }}),
            )
        };

        orchestrator.handle_tool_call(&session, complete()).await;
        assert_eq!(orchestrator.phase(&session).await, ConversationPhase::Confirming);

        let again = orchestrator.handle_tool_call(&session, complete()).await;
        assert!(again.success);
        assert_eq!(again.json().unwrap()["is_valid"], true);
        assert_eq!(orchestrator.phase(&session).await, ConversationPhase::Confirming);
    }

    #[tokio::test]
    async fn test_history_records_turns_and_tool_calls() {
        let orchestrator = orchestrator();
        let session = orchestrator.start_session(None).await;

        orchestrator
            .record_message(&session, "user", "Someone hit my car")
            .await;
        assert_eq!(orchestrator.record_interruption(&session, "barge-in").await, 1);
        orchestrator
            .handle_tool_call(&session, call(VALIDATE_REQUIRED_FIELDS, json!({})))
            .await;

        let history = orchestrator.context(&session).await.conversation_history;
        assert_eq!(history.len(), 3);
        assert!(matches!(history[0], HistoryEntry::Message { .. }));
        assert!(matches!(history[1], HistoryEntry::Interruption { count: 1, .. }));
        assert!(matches!(
            &history[2],
            HistoryEntry::ToolCall { name, success: false, .. } if name == VALIDATE_REQUIRED_FIELDS
        ));
    }

    #[tokio::test]
    async fn test_start_session_records_customer() {
        let orchestrator = orchestrator();
        let session = orchestrator.start_session(Some("CUST-7".to_string())).await;

        assert_eq!(
            orchestrator.context(&session).await.customer_id.as_deref(),
            Some("CUST-7")
        );
        assert_eq!(orchestrator.supported_tools().len(), 5);
    }
}
