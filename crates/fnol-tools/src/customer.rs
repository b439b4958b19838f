//! Customer profile lookup.

use std::sync::Arc;
use std::time::Duration;

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, error, info, warn};
use url::Url;

use crate::error::ToolError;
use crate::http::{error_detail, text_field};
use crate::signing::{RequestSigner, SigningError, SigningRequest};

/// Spoken whenever a lookup fails, whatever the reason.
pub const LOOKUP_FAILED_MESSAGE: &str =
    "I'm having trouble retrieving your information. Let me ask you a few questions to get started.";

/// Why a profile lookup failed.
#[derive(Debug, Error)]
pub enum CustomerLookupError {
    #[error("Customer API endpoint not configured")]
    NotConfigured,

    #[error("Failed to generate authentication headers: {0}")]
    Signing(#[from] SigningError),

    #[error("Request timeout")]
    Timeout,

    #[error("Network error: {0}")]
    Network(reqwest::Error),

    #[error("Customer API returned status {status}: {detail}")]
    Status { status: u16, detail: String },

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

impl From<reqwest::Error> for CustomerLookupError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            CustomerLookupError::Timeout
        } else if e.is_decode() {
            CustomerLookupError::Unexpected(e.to_string())
        } else {
            CustomerLookupError::Network(e)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerSummary {
    pub id: String,
    pub name: String,
    pub address: String,
}

/// The customer's first policy on file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicySummary {
    pub id: String,
    pub make: String,
    pub model: String,
    pub color: String,
    pub vin: String,
    pub year: String,
    #[serde(rename = "type")]
    pub policy_type: String,
    pub mileage: String,
}

impl PolicySummary {
    /// "{year} {color} {make} {model}", or empty when none are known.
    pub fn vehicle_description(&self) -> String {
        format!("{} {} {} {}", self.year, self.color, self.make, self.model)
            .trim()
            .to_string()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LicenseSummary {
    pub number: String,
    pub state: String,
    pub expiration_date: String,
    pub first_name: String,
    pub date_of_birth: String,
}

/// What is on file for a caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerProfile {
    pub customer: CustomerSummary,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub policy: Option<PolicySummary>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub drivers_license: Option<LicenseSummary>,
}

impl CustomerProfile {
    /// Map the customer API's record shape.
    ///
    /// Policy attributes arrive as DynamoDB typed values (`{"S": "..."}`).
    pub fn from_record(record: &Value) -> Self {
        let name = format!(
            "{} {}",
            text_field(record, "firstname"),
            text_field(record, "lastname")
        )
        .trim()
        .to_string();
        let address = format!(
            "{}, {}, {} {}",
            text_field(record, "street"),
            text_field(record, "city"),
            text_field(record, "state"),
            text_field(record, "zip")
        )
        .trim()
        .to_string();

        let drivers_license = record
            .get("driversLicense")
            .filter(|dl| dl.as_object().is_some_and(|o| !o.is_empty()))
            .map(|dl| LicenseSummary {
                number: text_field(dl, "documentNumber"),
                state: text_field(dl, "state"),
                expiration_date: text_field(dl, "expirationDate"),
                first_name: text_field(dl, "firstName"),
                date_of_birth: text_field(dl, "dateOfBirth"),
            });

        let policy = record
            .get("policies")
            .and_then(Value::as_array)
            .and_then(|policies| policies.first())
            .map(|policy| PolicySummary {
                id: dynamo_string(policy, "PK"),
                make: dynamo_string(policy, "make"),
                model: dynamo_string(policy, "model"),
                color: dynamo_string(policy, "color"),
                vin: dynamo_string(policy, "vin"),
                year: dynamo_string(policy, "year"),
                policy_type: dynamo_string(policy, "type"),
                mileage: dynamo_string(policy, "mileage"),
            });

        Self {
            customer: CustomerSummary {
                id: text_field(record, "PK"),
                name,
                address,
            },
            policy,
            drivers_license,
        }
    }

    /// The sentence the voice layer speaks after a successful lookup.
    pub fn greeting(&self) -> String {
        let vehicle = self
            .policy
            .as_ref()
            .map(PolicySummary::vehicle_description)
            .unwrap_or_default();

        if vehicle.is_empty() {
            format!(
                "I have your information on file. You're {}. Can you tell me what happened and where the accident occurred?",
                self.customer.name
            )
        } else {
            format!(
                "I have your information on file. You're {} and you're calling about your {}. Now, can you tell me what happened and where the accident occurred?",
                self.customer.name, vehicle
            )
        }
    }
}

fn dynamo_string(item: &Value, key: &str) -> String {
    item.get(key)
        .and_then(|attr| attr.get("S"))
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

/// Signed client for `GET {base}/customer?customerId=...`.
pub struct CustomerClient {
    client: reqwest::Client,
    url: Option<String>,
    signer: Arc<dyn RequestSigner>,
}

impl CustomerClient {
    pub fn new(
        url: Option<String>,
        timeout: Duration,
        signer: Arc<dyn RequestSigner>,
    ) -> Result<Self, ToolError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url,
            signer,
        })
    }

    /// Look up `customer_id`'s profile.
    pub async fn lookup(&self, customer_id: &str) -> Result<CustomerProfile, CustomerLookupError> {
        let base = self.url.as_deref().ok_or_else(|| {
            error!("CUSTOMER_API_ENDPOINT not configured");
            CustomerLookupError::NotConfigured
        })?;

        let mut url = Url::parse(base).map_err(|e| CustomerLookupError::Unexpected(e.to_string()))?;
        url.query_pairs_mut().append_pair("customerId", customer_id);

        info!("Calling Customer API: {}", base);

        let headers = self
            .signer
            .sign(&SigningRequest::json("GET", url.as_str(), ""))
            .await?;

        let mut request = self.client.get(url);
        for (name, value) in headers {
            request = request.header(name, value);
        }

        let response = request.send().await?;
        let status = response.status();
        info!("Customer API response status: {}", status.as_u16());

        let body = response.text().await?;
        if status != StatusCode::OK {
            let detail = error_detail(status, &body, &["message"]);
            return Err(CustomerLookupError::Status {
                status: status.as_u16(),
                detail,
            });
        }

        let record: Value =
            serde_json::from_str(&body).map_err(|e| CustomerLookupError::Unexpected(e.to_string()))?;
        debug!("Customer record: {}", record);

        let profile = CustomerProfile::from_record(&record);
        if profile.policy.is_none() {
            warn!("No policy information found in customer data");
        }
        if profile.drivers_license.is_none() {
            warn!("No driver's license information found in customer data");
        }
        Ok(profile)
    }
}
