//! Building the submission payload from a finished conversation.

use chrono::{DateTime, SecondsFormat, Utc};

use crate::error::ClaimError;
use crate::location::parse_location;
use crate::schema::{
    ConversationContext, FnolPayload, Incident, OtherParty, PersonalInformation, PoliceReport,
    Policy,
};
use crate::validator::missing_context_fields;

/// Assemble the FNOL payload for `context`, stamped with `now` as the
/// notice time.
///
/// Fails with [`ClaimError::MissingData`] listing every absent required
/// field. A missing receipt answer is submitted as `false` when no report
/// was filed.
pub fn assemble_payload(
    context: &ConversationContext,
    customer_id: &str,
    now: DateTime<Utc>,
) -> Result<FnolPayload, ClaimError> {
    let missing = missing_context_fields(context);
    if !missing.is_empty() {
        return Err(ClaimError::MissingData(missing));
    }

    let absent = || ClaimError::MissingData(missing_context_fields(context));
    let occurrence_date_time = context.occurrence_date_time.clone().ok_or_else(absent)?;
    let location = context.location_description.as_deref().ok_or_else(absent)?;
    let description = context.damage_description.clone().ok_or_else(absent)?;
    let policy_id = context.policy_id.clone().ok_or_else(absent)?;
    let drivers_license = context.drivers_license.clone().ok_or_else(absent)?;
    let license_plate = context.license_plate.clone().ok_or_else(absent)?;
    let passengers = context.number_of_passengers.ok_or_else(absent)?;
    let was_driving = context.was_driving.ok_or_else(absent)?;
    let police_filed = context.police_filed.ok_or_else(absent)?;

    let (first_name, last_name) = context
        .other_party_name
        .as_deref()
        .map(split_other_party_name)
        .unwrap_or((None, None));

    Ok(FnolPayload {
        incident: Incident {
            occurrence_date_time,
            fnol_date_time: now.to_rfc3339_opts(SecondsFormat::Secs, true),
            location: parse_location(location).into_inner(),
            description,
        },
        policy: Policy { id: policy_id },
        personal_information: PersonalInformation {
            customer_id: customer_id.to_string(),
            drivers_license_number: drivers_license,
            is_insurer_driver: was_driving,
            license_plate_number: license_plate,
            number_of_passengers: passengers,
        },
        police_report: PoliceReport {
            is_filed: police_filed,
            report_or_receipt_available: context.police_receipt.unwrap_or(false),
        },
        other_party: OtherParty {
            insurance_id: None,
            insurance_company: context.other_party_insurance.clone(),
            first_name,
            last_name,
        },
    })
}

/// Split a spoken full name into first name and the rest.
pub fn split_other_party_name(name: &str) -> (Option<String>, Option<String>) {
    let mut parts = name.split_whitespace();
    let first = parts.next().map(str::to_string);
    let rest = parts.collect::<Vec<_>>().join(" ");
    let last = (!rest.is_empty()).then_some(rest);
    (first, last)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn complete_context() -> ConversationContext {
        let mut context = ConversationContext::new("s");
        context.occurrence_date_time = Some("2024-05-19T15:00:00Z".to_string());
        context.location_description = Some("Main St, Phoenix AZ 85001".to_string());
        context.damage_description = Some("Rear bumper crushed".to_string());
        context.policy_id = Some("POL-123".to_string());
        context.drivers_license = Some("D1234567".to_string());
        context.license_plate = Some("ABC123".to_string());
        context.number_of_passengers = Some(1);
        context.was_driving = Some(true);
        context.police_filed = Some(false);
        context.other_party_name = Some("Mary Ann Smith".to_string());
        context.other_party_insurance = Some("Acme Mutual".to_string());
        context
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 20, 10, 0, 0).unwrap()
    }

    #[test]
    fn test_assemble_complete_context() {
        let payload = assemble_payload(&complete_context(), "CUST-1", now()).unwrap();

        assert_eq!(payload.incident.fnol_date_time, "2024-05-20T10:00:00Z");
        assert_eq!(payload.incident.location.state, "AZ");
        assert_eq!(payload.incident.location.zip, "85001");
        assert_eq!(payload.incident.location.road, "Main St, Phoenix AZ 85001");
        assert_eq!(payload.personal_information.customer_id, "CUST-1");
        assert!(!payload.police_report.report_or_receipt_available);
        assert_eq!(payload.other_party.first_name.as_deref(), Some("Mary"));
        assert_eq!(payload.other_party.last_name.as_deref(), Some("Ann Smith"));
        assert_eq!(payload.other_party.insurance_id, None);

        let wire = serde_json::to_value(&payload).unwrap();
        assert_eq!(wire["policy"], json!({"id": "POL-123"}));
        assert_eq!(wire["personalInformation"]["isInsurerDriver"], true);
        assert_eq!(wire["policeReport"]["isFiled"], false);
        assert!(wire["otherParty"].get("insuranceId").is_none());
    }

    #[test]
    fn test_incomplete_context_lists_missing() {
        let mut context = complete_context();
        context.policy_id = None;
        context.police_filed = Some(true);

        match assemble_payload(&context, "CUST-1", now()) {
            Err(ClaimError::MissingData(missing)) => assert_eq!(
                missing,
                vec![
                    "policy number",
                    "whether you have the police report receipt"
                ]
            ),
            other => panic!("expected missing data, got {:?}", other),
        }
    }

    #[test]
    fn test_split_name() {
        assert_eq!(
            split_other_party_name("Jane Doe"),
            (Some("Jane".to_string()), Some("Doe".to_string()))
        );
        assert_eq!(split_other_party_name("Cher"), (Some("Cher".to_string()), None));
        assert_eq!(split_other_party_name("   "), (None, None));
    }
}
