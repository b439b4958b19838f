//! Completeness checks over a context or a plain claim map.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::fields::{is_truthy, POLICE_FILED_KEY, REQUIRED_FIELDS};
use crate::schema::ConversationContext;

/// Claim-map key reported when no other-party information exists at all.
pub const INVOLVED_PARTIES_KEY: &str = "involvedParties";

/// Outcome of [`validate_claim_map`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub is_valid: bool,
    pub missing_fields: Vec<String>,
    pub ready_for_submission: bool,
}

/// Labels of required fields still missing from a context, in asking order.
pub fn missing_context_fields(context: &ConversationContext) -> Vec<String> {
    let police_filed = Value::from(context.police_filed);

    REQUIRED_FIELDS
        .iter()
        .filter(|field| field.applies(&police_filed))
        .filter(|field| !field.kind.is_present(&field.read(context)))
        .map(|field| field.label.to_string())
        .collect()
}

/// Check a key-based claim map for submission readiness.
///
/// Beyond the required keys, at least one of `otherPartyName`,
/// `otherPartyInsurance` or a non-empty `involvedParties` list must be
/// present; otherwise `involvedParties` is reported missing.
pub fn validate_claim_map(claim_data: &Map<String, Value>) -> ValidationReport {
    let police_filed = claim_data.get(POLICE_FILED_KEY).unwrap_or(&Value::Null);

    let mut fields: Vec<_> = REQUIRED_FIELDS
        .iter()
        .filter(|field| field.in_claim_map && field.applies(police_filed))
        .collect();
    fields.sort_by_key(|field| field.claim_rank);

    let mut missing: Vec<String> = fields
        .into_iter()
        .filter(|field| {
            let value = claim_data.get(field.claim_key).unwrap_or(&Value::Null);
            !field.kind.is_present(value)
        })
        .map(|field| field.claim_key.to_string())
        .collect();

    if !has_other_party_info(claim_data) {
        missing.push(INVOLVED_PARTIES_KEY.to_string());
    }

    let is_valid = missing.is_empty();
    ValidationReport {
        is_valid,
        missing_fields: missing,
        ready_for_submission: is_valid,
    }
}

fn has_other_party_info(claim_data: &Map<String, Value>) -> bool {
    let listed = claim_data
        .get(INVOLVED_PARTIES_KEY)
        .is_some_and(is_truthy);
    listed
        || ["otherPartyName", "otherPartyInsurance"]
            .iter()
            .any(|key| claim_data.get(*key).is_some_and(is_truthy))
}

impl ConversationContext {
    /// Render the context in the key-based claim-map shape.
    ///
    /// Absent fields are omitted rather than set to null.
    pub fn to_claim_map(&self) -> Map<String, Value> {
        let mut map = Map::new();
        for field in REQUIRED_FIELDS {
            let value = field.read(self);
            if !value.is_null() {
                map.insert(field.claim_key.to_string(), value);
            }
        }
        if let Some(name) = &self.other_party_name {
            map.insert("otherPartyName".to_string(), Value::String(name.clone()));
        }
        if let Some(insurance) = &self.other_party_insurance {
            map.insert(
                "otherPartyInsurance".to_string(),
                Value::String(insurance.clone()),
            );
        }
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn complete_context() -> ConversationContext {
        let mut context = ConversationContext::new("s");
        context.occurrence_date_time = Some("2024-05-15T15:00:00Z".to_string());
        context.location_description = Some("Main St, Phoenix AZ 85001".to_string());
        context.damage_description = Some("Dented bumper".to_string());
        context.policy_id = Some("POL-1".to_string());
        context.drivers_license = Some("D123".to_string());
        context.license_plate = Some("ABC123".to_string());
        context.number_of_passengers = Some(0);
        context.was_driving = Some(true);
        context.police_filed = Some(false);
        context
    }

    fn as_map(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_empty_context_missing_everything_in_order() {
        let missing = missing_context_fields(&ConversationContext::new("s"));
        assert_eq!(
            missing,
            vec![
                "date and time of accident",
                "accident location",
                "damage description",
                "policy number",
                "driver's license number",
                "license plate number",
                "number of passengers",
                "whether you were driving",
                "whether police report was filed",
            ]
        );
    }

    #[test]
    fn test_complete_context_has_nothing_missing() {
        assert!(missing_context_fields(&complete_context()).is_empty());
    }

    #[test]
    fn test_police_receipt_conditional() {
        let mut context = complete_context();
        context.police_filed = Some(true);
        assert_eq!(
            missing_context_fields(&context),
            vec!["whether you have the police report receipt"]
        );

        context.police_receipt = Some(false);
        assert!(missing_context_fields(&context).is_empty());

        context.police_filed = Some(false);
        context.police_receipt = None;
        assert!(missing_context_fields(&context).is_empty());
    }

    #[test]
    fn test_zero_passengers_and_false_flags_count_as_present() {
        let mut context = complete_context();
        context.number_of_passengers = Some(0);
        context.was_driving = Some(false);
        assert!(missing_context_fields(&context).is_empty());
    }

    #[test]
    fn test_empty_string_counts_as_missing() {
        let mut context = complete_context();
        context.policy_id = Some(String::new());
        assert_eq!(missing_context_fields(&context), vec!["policy number"]);
    }

    #[test]
    fn test_validate_empty_map() {
        let report = validate_claim_map(&Map::new());
        assert!(!report.is_valid);
        assert!(!report.ready_for_submission);
        assert_eq!(
            report.missing_fields,
            vec![
                "location",
                "dateTime",
                "damageDescription",
                "policyNumber",
                "driversLicense",
                "numberOfPassengers",
                "wasDriving",
                "policeFiled",
                "involvedParties",
            ]
        );
    }

    #[test]
    fn test_validate_map_with_police_filed() {
        let claim = as_map(json!({
            "location": "Phoenix",
            "dateTime": "2024-05-15T15:00:00Z",
            "damageDescription": "Dent",
            "policyNumber": "POL-1",
            "driversLicense": "D123",
            "numberOfPassengers": 0,
            "wasDriving": false,
            "policeFiled": true,
            "otherPartyName": "Jane Doe"
        }));
        let report = validate_claim_map(&claim);
        assert!(!report.is_valid);
        assert_eq!(report.missing_fields, vec!["policeReceipt"]);
    }

    #[test]
    fn test_validate_map_other_party_evidence() {
        let mut claim = as_map(json!({
            "location": "Phoenix",
            "dateTime": "2024-05-15T15:00:00Z",
            "damageDescription": "Dent",
            "policyNumber": "POL-1",
            "driversLicense": "D123",
            "numberOfPassengers": 1,
            "wasDriving": true,
            "policeFiled": false,
            "involvedParties": []
        }));
        assert_eq!(validate_claim_map(&claim).missing_fields, vec!["involvedParties"]);

        claim.insert("involvedParties".to_string(), json!([{"name": "Jane"}]));
        assert!(validate_claim_map(&claim).is_valid);

        claim.remove("involvedParties");
        claim.insert("otherPartyInsurance".to_string(), json!("Acme Mutual"));
        let report = validate_claim_map(&claim);
        assert!(report.is_valid);
        assert!(report.ready_for_submission);
    }

    #[test]
    fn test_context_to_claim_map_round_trips_through_validator() {
        let mut context = complete_context();
        context.other_party_name = Some("Jane Doe".to_string());
        let map = context.to_claim_map();

        assert_eq!(map.get("licensePlate"), Some(&json!("ABC123")));
        assert!(!map.contains_key("policeReceipt"));
        assert!(validate_claim_map(&map).is_valid);
    }
}
