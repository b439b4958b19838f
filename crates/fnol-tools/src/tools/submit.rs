//! `submit_to_fnol_api` tool.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use claim_core::{assemble_payload, ClaimError, ContextStore, FnolPayload};
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{info, warn};

use crate::error::ToolError;
use crate::submitter::ClaimSubmitter;
use crate::tool::{Tool, ToolArgs, ToolOutput};

use super::SUBMIT_TO_FNOL_API;

/// Payload sections, in wire order.
const SECTIONS: &[&str] = &[
    "incident",
    "policy",
    "personalInformation",
    "policeReport",
    "otherParty",
];

const REVIEW_MESSAGE: &str =
    "Some of the claim details need another look before I can submit. Let's go over them together.";

#[derive(Serialize)]
struct NotSubmitted {
    success: bool,
    error: String,
    message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    missing_fields: Vec<String>,
}

/// Submits the claim, from explicit payload sections or from the session.
///
/// # Parameters
///
/// - `incident`, `policy`, `personalInformation`, `policeReport`,
///   `otherParty` (objects): the payload in the intake API's schema.
/// - Without them: `session_id` and an optional `customer_id` (defaults to
///   the session's, then to the connection's identity claim).
pub struct SubmitToFnolApi {
    submitter: ClaimSubmitter,
    store: Arc<ContextStore>,
}

impl SubmitToFnolApi {
    pub fn new(submitter: ClaimSubmitter, store: Arc<ContextStore>) -> Self {
        Self { submitter, store }
    }

    /// Strictly decode explicit sections, if any were given.
    fn explicit_payload(args: &ToolArgs) -> Result<Option<FnolPayload>, NotSubmitted> {
        if !SECTIONS.iter().any(|key| args.params.contains_key(*key)) {
            return Ok(None);
        }

        let sections: Map<String, Value> = SECTIONS
            .iter()
            .filter_map(|key| args.params.get(*key).map(|v| (key.to_string(), v.clone())))
            .collect();

        serde_json::from_value(Value::Object(sections))
            .map(Some)
            .map_err(|e| NotSubmitted {
                success: false,
                error: format!("Invalid FNOL payload: {}", e),
                message: REVIEW_MESSAGE.to_string(),
                missing_fields: Vec::new(),
            })
    }

    async fn session_payload(&self, args: &ToolArgs) -> Result<FnolPayload, NotSubmitted> {
        let context = self.store.get(&args.session_id()).await;

        let customer_id = args
            .get_string_opt("customer_id")
            .or_else(|| context.customer_id.clone())
            .or_else(|| args.customer_id_claim())
            .ok_or_else(|| NotSubmitted {
                success: false,
                error: "Missing customer id".to_string(),
                message: REVIEW_MESSAGE.to_string(),
                missing_fields: Vec::new(),
            })?;

        assemble_payload(&context, &customer_id, Utc::now()).map_err(|e| {
            let missing_fields = match &e {
                ClaimError::MissingData(fields) => fields.clone(),
                ClaimError::InvalidTransition { .. } => Vec::new(),
            };
            let message = if missing_fields.is_empty() {
                REVIEW_MESSAGE.to_string()
            } else {
                format!(
                    "I still need a few details before I can submit your claim: {}.",
                    missing_fields.join(", ")
                )
            };
            NotSubmitted {
                success: false,
                error: e.to_string(),
                message,
                missing_fields,
            }
        })
    }
}

#[async_trait]
impl Tool for SubmitToFnolApi {
    fn name(&self) -> &str {
        SUBMIT_TO_FNOL_API
    }

    fn description(&self) -> &str {
        "Submits the completed claim to the claims-intake API and returns a reference number."
    }

    async fn execute(&self, args: ToolArgs) -> Result<ToolOutput, ToolError> {
        info!("Submitting FNOL claim");

        let payload = match Self::explicit_payload(&args) {
            Ok(Some(payload)) => Ok(payload),
            Ok(None) => self.session_payload(&args).await,
            Err(rejected) => Err(rejected),
        };

        let payload = match payload {
            Ok(payload) => payload,
            Err(rejected) => {
                warn!("Claim not submitted: {}", rejected.error);
                return ToolOutput::json(false, &rejected);
            }
        };

        let result = self.submitter.submit(&payload).await;
        ToolOutput::json(result.success, &result)
    }
}
