//! `assess_safety` tool.

use async_trait::async_trait;
use claim_core::{assess_safety, SafetySignals};
use tracing::info;

use crate::error::ToolError;
use crate::tool::{Tool, ToolArgs, ToolOutput};

use super::ASSESS_SAFETY;

/// Runs the safety gate over the caller's four answers.
///
/// # Parameters
///
/// - `is_safe`, `needs_medical`, `police_contacted`, `in_safe_location`
///   (all required booleans)
///
/// Persisting `safety_confirmed` is left to the caller.
#[derive(Debug, Default)]
pub struct AssessSafety;

impl AssessSafety {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Tool for AssessSafety {
    fn name(&self) -> &str {
        ASSESS_SAFETY
    }

    fn description(&self) -> &str {
        "Checks whether the caller is safe before any claim details are collected."
    }

    async fn execute(&self, args: ToolArgs) -> Result<ToolOutput, ToolError> {
        let signals = SafetySignals {
            is_safe: args.get_bool("is_safe")?,
            needs_medical: args.get_bool("needs_medical")?,
            police_contacted: args.get_bool("police_contacted")?,
            in_safe_location: args.get_bool("in_safe_location")?,
        };

        let assessment = assess_safety(signals);
        info!(
            "Safety assessment: confirmed={} (medical={}, safe_location={}, police={})",
            assessment.safety_confirmed,
            signals.needs_medical,
            signals.in_safe_location,
            signals.police_contacted
        );

        ToolOutput::json(true, &assessment)
    }
}
