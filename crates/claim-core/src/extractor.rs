//! Incremental claim extraction.
//!
//! Each `extract_claim_info` call carries whatever the caller has said since
//! the last one. [`apply_update`] folds it into the session context and
//! recomputes what is still missing.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::datetime::normalize_datetime;
use crate::parsed::Parsed;
use crate::schema::ConversationContext;
use crate::store::ContextStore;
use crate::validator::missing_context_fields;

/// A partial claim update. `None` means "not mentioned", never "clear".
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ClaimUpdate {
    pub occurrence_date_time: Option<String>,
    pub location_description: Option<String>,
    pub damage_description: Option<String>,
    pub policy_id: Option<String>,
    pub drivers_license_number: Option<String>,
    pub license_plate_number: Option<String>,
    pub number_of_passengers: Option<i64>,
    pub was_driving: Option<bool>,
    pub police_filed: Option<bool>,
    pub police_receipt_available: Option<bool>,
    pub other_party_first_name: Option<String>,
    pub other_party_last_name: Option<String>,
    pub other_party_insurance_company: Option<String>,
    /// Accepted from callers but never stored.
    pub other_party_insurance_id: Option<String>,
}

/// Snapshot of collected values, with unset fields as `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectedFields {
    pub occurrence_date_time: Option<String>,
    pub location: Option<String>,
    pub damage: Option<String>,
    pub policy_id: Option<String>,
    pub drivers_license: Option<String>,
    pub license_plate: Option<String>,
    pub passengers: Option<i64>,
    pub was_driving: Option<bool>,
    pub police_filed: Option<bool>,
    pub police_receipt: Option<bool>,
    pub other_party: Option<String>,
    pub other_party_insurance: Option<String>,
}

impl From<&ConversationContext> for CollectedFields {
    fn from(context: &ConversationContext) -> Self {
        Self {
            occurrence_date_time: context.occurrence_date_time.clone(),
            location: context.location_description.clone(),
            damage: context.damage_description.clone(),
            policy_id: context.policy_id.clone(),
            drivers_license: context.drivers_license.clone(),
            license_plate: context.license_plate.clone(),
            passengers: context.number_of_passengers,
            was_driving: context.was_driving,
            police_filed: context.police_filed,
            police_receipt: context.police_receipt,
            other_party: context.other_party_name.clone(),
            other_party_insurance: context.other_party_insurance.clone(),
        }
    }
}

/// Result of one extraction call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionOutcome {
    /// Always `"updated"`.
    pub status: String,
    pub collected_fields: CollectedFields,
    pub missing_fields: Vec<String>,
    /// Present when a date/time was supplied; `false` means it was kept raw.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub occurrence_date_time_parsed: Option<bool>,
}

/// Fold `update` into `context` and refresh `missing_fields`.
///
/// Returns the datetime parse outcome when the update carried one.
pub fn apply_update(
    context: &mut ConversationContext,
    update: ClaimUpdate,
    now: DateTime<Utc>,
) -> Option<Parsed<String>> {
    let mut parsed_datetime = None;
    if let Some(raw) = update.occurrence_date_time {
        let parsed = normalize_datetime(&raw, now);
        if parsed.is_fallback() {
            debug!("Could not normalize date/time '{}', keeping it raw", raw);
        }
        context.occurrence_date_time = Some(parsed.value().clone());
        parsed_datetime = Some(parsed);
    }

    replace(&mut context.location_description, update.location_description);
    replace(&mut context.damage_description, update.damage_description);
    replace(&mut context.policy_id, update.policy_id);
    replace(&mut context.drivers_license, update.drivers_license_number);
    replace(&mut context.license_plate, update.license_plate_number);
    replace(&mut context.number_of_passengers, update.number_of_passengers);
    replace(&mut context.was_driving, update.was_driving);
    replace(&mut context.police_filed, update.police_filed);
    replace(&mut context.police_receipt, update.police_receipt_available);
    replace(
        &mut context.other_party_insurance,
        update.other_party_insurance_company,
    );

    if update.other_party_first_name.is_some() || update.other_party_last_name.is_some() {
        let name = format!(
            "{} {}",
            update.other_party_first_name.unwrap_or_default(),
            update.other_party_last_name.unwrap_or_default()
        );
        context.other_party_name = Some(name.trim().to_string());
    }

    context.missing_fields = missing_context_fields(context);
    parsed_datetime
}

fn replace<T>(slot: &mut Option<T>, value: Option<T>) {
    if value.is_some() {
        *slot = value;
    }
}

/// Applies [`ClaimUpdate`]s to sessions held in a [`ContextStore`].
#[derive(Debug, Clone)]
pub struct FieldExtractor {
    store: Arc<ContextStore>,
}

impl FieldExtractor {
    pub fn new(store: Arc<ContextStore>) -> Self {
        Self { store }
    }

    pub async fn extract(&self, session_id: &str, update: ClaimUpdate) -> ExtractionOutcome {
        self.extract_at(session_id, update, Utc::now()).await
    }

    /// Like [`extract`](Self::extract), resolving relative dates against `now`.
    pub async fn extract_at(
        &self,
        session_id: &str,
        update: ClaimUpdate,
        now: DateTime<Utc>,
    ) -> ExtractionOutcome {
        let outcome = self
            .store
            .update(session_id, |context| {
                let parsed = apply_update(context, update, now);
                ExtractionOutcome {
                    status: "updated".to_string(),
                    collected_fields: CollectedFields::from(&*context),
                    missing_fields: context.missing_fields.clone(),
                    occurrence_date_time_parsed: parsed.map(|p| !p.is_fallback()),
                }
            })
            .await;

        debug!(
            "Session {} has {} required fields missing",
            session_id,
            outcome.missing_fields.len()
        );
        outcome
    }
}
