//! `extract_claim_info` tool.

use async_trait::async_trait;
use claim_core::{ClaimUpdate, FieldExtractor};
use tracing::debug;

use crate::error::ToolError;
use crate::tool::{Tool, ToolArgs, ToolOutput};

use super::EXTRACT_CLAIM_INFO;

/// Folds any subset of the fourteen claim fields into the session.
///
/// # Parameters
///
/// - `occurrence_date_time`, `location_description`, `damage_description`,
///   `policy_id`, `drivers_license_number`, `license_plate_number`,
///   `other_party_first_name`, `other_party_last_name`,
///   `other_party_insurance_company`, `other_party_insurance_id` (strings;
///   the insurance id is accepted and dropped)
/// - `number_of_passengers` (integer)
/// - `was_driving`, `police_filed`, `police_receipt_available` (booleans)
/// - `session_id` (optional, default `"default"`)
///
/// # Examples
///
/// ```json
/// {"occurrence_date_time": "yesterday at 3pm", "session_id": "call-1"}
/// {"other_party_last_name": "Smith", "police_filed": false}
/// ```
pub struct ExtractClaimInfo {
    extractor: FieldExtractor,
}

impl ExtractClaimInfo {
    pub fn new(extractor: FieldExtractor) -> Self {
        Self { extractor }
    }
}

#[async_trait]
impl Tool for ExtractClaimInfo {
    fn name(&self) -> &str {
        EXTRACT_CLAIM_INFO
    }

    fn description(&self) -> &str {
        "Records claim details mentioned by the caller and reports which required fields are still missing."
    }

    async fn execute(&self, args: ToolArgs) -> Result<ToolOutput, ToolError> {
        let update: ClaimUpdate = args.deserialize()?;
        let session_id = args.session_id();
        debug!("Extracting claim info for session {}: {:?}", session_id, update);

        let outcome = self.extractor.extract(&session_id, update).await;
        ToolOutput::json(true, &outcome)
    }
}
