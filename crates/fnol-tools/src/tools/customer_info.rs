//! `get_customer_info` tool.

use std::sync::Arc;

use async_trait::async_trait;
use claim_core::{missing_context_fields, ContextStore};
use serde::Serialize;
use tracing::{error, info};

use crate::customer::{CustomerClient, CustomerProfile, LOOKUP_FAILED_MESSAGE};
use crate::error::ToolError;
use crate::tool::{Tool, ToolArgs, ToolOutput};

use super::GET_CUSTOMER_INFO;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LookupSuccess<'a> {
    success: bool,
    #[serde(flatten)]
    profile: &'a CustomerProfile,
    message: String,
}

#[derive(Serialize)]
struct LookupFailure {
    success: bool,
    error: String,
    message: &'static str,
}

/// Fetches what is already on file for the caller.
///
/// # Parameters
///
/// - `customer_id` (optional): falls back to the connection's identity claim.
///
/// When the call belongs to a session, the customer id, policy number and
/// driver's license are pre-filled into it where they are still empty.
pub struct GetCustomerInfo {
    client: CustomerClient,
    store: Arc<ContextStore>,
}

impl GetCustomerInfo {
    pub fn new(client: CustomerClient, store: Arc<ContextStore>) -> Self {
        Self { client, store }
    }

    async fn prefill(&self, session_id: &str, profile: &CustomerProfile) {
        let customer_id = non_empty(&profile.customer.id);
        let policy_id = profile.policy.as_ref().and_then(|p| non_empty(&p.id));
        let license = profile
            .drivers_license
            .as_ref()
            .and_then(|dl| non_empty(&dl.number));

        let filled = self
            .store
            .update(session_id, |context| {
                let mut filled = Vec::new();
                if context.customer_id.is_none() && customer_id.is_some() {
                    context.customer_id = customer_id;
                    filled.push("customer_id");
                }
                if context.policy_id.is_none() && policy_id.is_some() {
                    context.policy_id = policy_id;
                    filled.push("policy_id");
                }
                if context.drivers_license.is_none() && license.is_some() {
                    context.drivers_license = license;
                    filled.push("drivers_license");
                }
                context.missing_fields = missing_context_fields(context);
                filled
            })
            .await;

        if !filled.is_empty() {
            info!("Pre-filled {:?} for session {}", filled, session_id);
        }
    }
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

fn failure(error: String) -> Result<ToolOutput, ToolError> {
    ToolOutput::json(
        false,
        &LookupFailure {
            success: false,
            error,
            message: LOOKUP_FAILED_MESSAGE,
        },
    )
}

#[async_trait]
impl Tool for GetCustomerInfo {
    fn name(&self) -> &str {
        GET_CUSTOMER_INFO
    }

    fn description(&self) -> &str {
        "Retrieves the caller's profile, policy and driver's license on file."
    }

    async fn execute(&self, args: ToolArgs) -> Result<ToolOutput, ToolError> {
        let Some(customer_id) = args
            .get_string_opt("customer_id")
            .or_else(|| args.customer_id_claim())
        else {
            return failure(ToolError::MissingParameter("customer_id".to_string()).to_string());
        };

        info!("Retrieving customer info for customer_id: {}", customer_id);

        let profile = match self.client.lookup(&customer_id).await {
            Ok(profile) => profile,
            Err(e) => {
                error!("Customer lookup failed: {}", e);
                return failure(e.to_string());
            }
        };

        if let Some(session_id) = args.session_id_opt() {
            self.prefill(&session_id, &profile).await;
        }

        info!(
            "Successfully retrieved customer info for: {}",
            profile.customer.name
        );
        ToolOutput::json(
            true,
            &LookupSuccess {
                success: true,
                profile: &profile,
                message: profile.greeting(),
            },
        )
    }
}
