//! Claim submission to the claims-intake API.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use claim_core::FnolPayload;
use reqwest::StatusCode;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error, info};

use crate::error::ToolError;
use crate::http::error_detail;
use crate::signing::{RequestSigner, SigningRequest};

/// Response fields that may carry the claim reference, in lookup order.
const REFERENCE_FIELDS: &[&str] = &["claimId", "claimNumber", "referenceNumber", "id"];

/// Outcome of one submission attempt, shaped as the tool's JSON result.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub claim_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SubmissionResult {
    fn failed(error: impl Into<String>, message: &str) -> Self {
        Self {
            success: false,
            claim_number: None,
            payload: None,
            message: message.to_string(),
            error: Some(error.into()),
        }
    }

    fn accepted(reference: String, payload: Value) -> Self {
        Self {
            success: true,
            message: format!(
                "Your claim has been submitted successfully. Your reference number is {}. You'll receive a confirmation email with your official claim number shortly.",
                reference
            ),
            claim_number: Some(reference),
            payload: Some(payload),
            error: None,
        }
    }
}

/// Signed POST of an [`FnolPayload`] with a bounded timeout.
///
/// [`submit`](Self::submit) never returns an error: every failure is a
/// [`SubmissionResult`] with a technical `error` and a speakable `message`.
pub struct ClaimSubmitter {
    client: reqwest::Client,
    endpoint: Option<String>,
    signer: Arc<dyn RequestSigner>,
}

impl ClaimSubmitter {
    pub fn new(
        endpoint: Option<String>,
        timeout: Duration,
        signer: Arc<dyn RequestSigner>,
    ) -> Result<Self, ToolError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint,
            signer,
        })
    }

    pub async fn submit(&self, payload: &FnolPayload) -> SubmissionResult {
        let Some(endpoint) = self.endpoint.as_deref() else {
            error!("FNOL_API_ENDPOINT not configured");
            return SubmissionResult::failed(
                "FNOL API endpoint not configured",
                "System configuration error. Please contact support.",
            );
        };

        let (payload_value, body) = match serde_json::to_value(payload)
            .and_then(|value| serde_json::to_string(&value).map(|body| (value, body)))
        {
            Ok(encoded) => encoded,
            Err(e) => return unexpected(e),
        };
        debug!("FNOL payload: {}", body);
        info!("Submitting claim to FNOL API: {}", endpoint);

        let headers = match self
            .signer
            .sign(&SigningRequest::json("POST", endpoint, body.clone()))
            .await
        {
            Ok(headers) => headers,
            Err(e) => {
                error!("Failed to generate SigV4 headers: {}", e);
                return SubmissionResult::failed(
                    format!("Failed to generate authentication headers: {}", e),
                    "Authentication error. Please contact support.",
                );
            }
        };

        let mut request = self.client.post(endpoint).body(body);
        for (name, value) in headers {
            request = request.header(name, value);
        }

        let (status, text) = match request.send().await {
            Ok(response) => {
                let status = response.status();
                match response.text().await {
                    Ok(text) => (status, text),
                    Err(e) => return transport_failure(e),
                }
            }
            Err(e) => return transport_failure(e),
        };
        info!("FNOL API response status: {}", status.as_u16());

        if status != StatusCode::OK {
            let detail = error_detail(status, &text, &["message", "error"]);
            error!("FNOL API error response: {}", detail);
            return SubmissionResult::failed(
                format!("FNOL API returned error: {}", detail),
                "Failed to submit claim. Please try again or use the form-based submission.",
            );
        }

        let reference = serde_json::from_str::<Value>(&text)
            .ok()
            .and_then(|response| claim_reference(&response))
            .unwrap_or_else(fallback_reference);
        info!("Claim submitted successfully with reference: {}", reference);

        SubmissionResult::accepted(reference, payload_value)
    }
}

/// First non-empty reference field in a success response.
pub fn claim_reference(response: &Value) -> Option<String> {
    REFERENCE_FIELDS
        .iter()
        .filter_map(|key| response.get(*key))
        .find_map(|value| match value {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
}

/// Temporary reference used when the API returns none.
pub fn fallback_reference() -> String {
    format!("FNOL-{}", Utc::now().format("%Y%m%d%H%M%S"))
}

fn transport_failure(e: reqwest::Error) -> SubmissionResult {
    if e.is_timeout() {
        error!("FNOL API request timeout");
        SubmissionResult::failed(
            "Request timeout",
            "The claim submission timed out. Please try again.",
        )
    } else {
        error!("FNOL API network error: {}", e);
        SubmissionResult::failed(
            format!("Network error: {}", e),
            "Unable to connect to the claims service. Please check your connection and try again.",
        )
    }
}

fn unexpected(e: impl std::fmt::Display) -> SubmissionResult {
    error!("Unexpected error during FNOL submission: {}", e);
    SubmissionResult::failed(
        format!("Unexpected error: {}", e),
        "An unexpected error occurred. Please try again or contact support.",
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_reference_lookup_order() {
        assert_eq!(
            claim_reference(&json!({"id": "X", "claimNumber": "CLM-1"})).as_deref(),
            Some("CLM-1")
        );
        assert_eq!(
            claim_reference(&json!({"claimId": "", "referenceNumber": "R-9"})).as_deref(),
            Some("R-9")
        );
        assert_eq!(claim_reference(&json!({"id": 42})).as_deref(), Some("42"));
        assert_eq!(claim_reference(&json!({})), None);
    }

    #[test]
    fn test_fallback_reference_shape() {
        let reference = fallback_reference();
        let digits = reference.strip_prefix("FNOL-").unwrap();
        assert_eq!(digits.len(), 14);
        assert!(digits.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_failure_serialization_omits_success_fields() {
        let result = SubmissionResult::failed("Request timeout", "try again");
        let wire = serde_json::to_value(&result).unwrap();
        assert_eq!(
            wire,
            json!({"success": false, "message": "try again", "error": "Request timeout"})
        );
    }
}
