//! Tool registry, signed HTTP clients and tool entry points for voice FNOL
//! intake.
//!
//! This crate exposes the five tools the voice runtime calls during a claim
//! call, plus the pieces they are built from:
//!
//! - [`ToolRegistry`] / [`RegistryToolExecutor`] - Name-based dispatch with an
//!   optional allowlist and per-call timeout
//! - [`SigV4Signer`] - AWS Signature V4 headers for the intake and customer APIs
//! - [`CustomerClient`] - Customer profile lookup
//! - [`ClaimSubmitter`] - Claim submission with a speakable result for every
//!   failure
//!
//! # Tools
//!
//! - [`AssessSafety`] - `assess_safety`
//! - [`ExtractClaimInfo`] - `extract_claim_info`
//! - [`ValidateRequiredFields`] - `validate_required_fields`
//! - [`GetCustomerInfo`] - `get_customer_info`
//! - [`SubmitToFnolApi`] - `submit_to_fnol_api`
//!
//! # Example
//!
//! ```rust,no_run
//! use claim_core::ContextStore;
//! use fnol_tools::{fnol_registry, FnolConfig};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = FnolConfig::from_env();
//!     let store = Arc::new(ContextStore::with_ttl(config.session_ttl));
//!     let registry = fnol_registry(&config, store)?;
//!
//!     let output = registry
//!         .execute_json(
//!             "assess_safety",
//!             r#"{"is_safe": true, "needs_medical": false,
//!                 "police_contacted": true, "in_safe_location": true}"#,
//!         )
//!         .await?;
//!     println!("{}", output.content);
//!     Ok(())
//! }
//! ```

mod config;
mod customer;
mod error;
mod executor;
mod http;
mod registry;
mod signing;
mod submitter;
mod tool;
pub mod tools;

use std::sync::Arc;

use claim_core::{ContextStore, FieldExtractor};

pub use config::{FnolConfig, FnolConfigBuilder, DEFAULT_REGION};
pub use customer::{
    CustomerClient, CustomerLookupError, CustomerProfile, CustomerSummary, LicenseSummary,
    PolicySummary, LOOKUP_FAILED_MESSAGE,
};
pub use error::ToolError;
pub use executor::{RegistryToolExecutor, ToolPolicy};
pub use registry::ToolRegistry;
pub use signing::{
    signing_key, AwsCredentials, RequestSigner, SigV4Signer, SigningError, SigningRequest,
    UnsignedSigner, EXECUTE_API_SERVICE,
};
pub use submitter::{claim_reference, fallback_reference, ClaimSubmitter, SubmissionResult};
pub use tool::{Tool, ToolArgs, ToolOutput, DEFAULT_SESSION_ID};
pub use tools::{
    AssessSafety, ExtractClaimInfo, GetCustomerInfo, SubmitToFnolApi, ValidateRequiredFields,
};

// Re-export async_trait for convenience
pub use async_trait::async_trait;

/// Create a registry with all five FNOL tools, signing with the process's
/// AWS credentials.
///
/// Missing credentials are not an error here; each signed call then fails
/// with an authentication result.
pub fn fnol_registry(
    config: &FnolConfig,
    store: Arc<ContextStore>,
) -> Result<ToolRegistry, ToolError> {
    let signer: Arc<dyn RequestSigner> = Arc::new(SigV4Signer::from_env(config.region.clone()));
    fnol_registry_with_signer(config, store, signer)
}

/// Create a registry with all five FNOL tools and an explicit signer.
pub fn fnol_registry_with_signer(
    config: &FnolConfig,
    store: Arc<ContextStore>,
    signer: Arc<dyn RequestSigner>,
) -> Result<ToolRegistry, ToolError> {
    let customer_client = CustomerClient::new(
        config.customer_url(),
        config.customer_timeout,
        signer.clone(),
    )?;
    let submitter = ClaimSubmitter::new(
        config.fnol_api_endpoint.clone(),
        config.submit_timeout,
        signer,
    )?;

    let mut registry = ToolRegistry::new();
    registry.register(AssessSafety::new());
    registry.register(ExtractClaimInfo::new(FieldExtractor::new(store.clone())));
    registry.register(ValidateRequiredFields::new());
    registry.register(GetCustomerInfo::new(customer_client, store.clone()));
    registry.register(SubmitToFnolApi::new(submitter, store));
    Ok(registry)
}
