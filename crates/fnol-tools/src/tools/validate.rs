//! `validate_required_fields` tool.

use async_trait::async_trait;
use claim_core::validate_claim_map;
use tracing::debug;

use crate::error::ToolError;
use crate::tool::{Tool, ToolArgs, ToolOutput};

use super::VALIDATE_REQUIRED_FIELDS;

/// Checks a key-based claim map for submission readiness.
///
/// # Parameters
///
/// - `claim_data` (object): keys such as `location`, `dateTime`,
///   `policyNumber`, `policeFiled`, `otherPartyName`. Absent means empty.
#[derive(Debug, Default)]
pub struct ValidateRequiredFields;

impl ValidateRequiredFields {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Tool for ValidateRequiredFields {
    fn name(&self) -> &str {
        VALIDATE_REQUIRED_FIELDS
    }

    fn description(&self) -> &str {
        "Checks that every field needed for claim submission is present."
    }

    async fn execute(&self, args: ToolArgs) -> Result<ToolOutput, ToolError> {
        let claim_data = args.get_object_opt("claim_data")?.unwrap_or_default();
        let report = validate_claim_map(&claim_data);
        debug!(
            "Validation: valid={}, missing={:?}",
            report.is_valid, report.missing_fields
        );
        ToolOutput::json(true, &report)
    }
}
