//! Claim data shapes.
//!
//! [`ConversationContext`] is the mutable per-session record built up during
//! a call. The remaining types make up [`FnolPayload`], the strict snapshot
//! sent to the claims-intake API; their serde names are the API's wire names.

use serde::{Deserialize, Serialize};

use crate::phase::ConversationPhase;

/// Everything gathered so far in one conversation.
///
/// A claim field is present iff it is `Some`. Fields are only ever replaced
/// by a later value, never cleared.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationContext {
    pub session_id: String,
    pub safety_confirmed: bool,
    pub current_phase: ConversationPhase,

    /// ISO 8601 once normalized; raw caller text if normalization missed.
    pub occurrence_date_time: Option<String>,
    /// Natural language location, parsed only at submission time.
    pub location_description: Option<String>,
    pub damage_description: Option<String>,
    pub customer_id: Option<String>,
    pub policy_id: Option<String>,
    pub drivers_license: Option<String>,
    pub license_plate: Option<String>,
    pub number_of_passengers: Option<i64>,
    pub was_driving: Option<bool>,
    pub police_filed: Option<bool>,
    /// Only meaningful when `police_filed` is `Some(true)`.
    pub police_receipt: Option<bool>,
    pub other_party_name: Option<String>,
    pub other_party_insurance: Option<String>,

    /// Human-readable labels of required fields still missing. Derived.
    pub missing_fields: Vec<String>,
    /// Append-only audit trail. Never read back to drive logic.
    pub conversation_history: Vec<HistoryEntry>,
}

impl ConversationContext {
    /// Create a context with every field at its default.
    pub fn new(session_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            safety_confirmed: false,
            current_phase: ConversationPhase::SafetyCheck,
            occurrence_date_time: None,
            location_description: None,
            damage_description: None,
            customer_id: None,
            policy_id: None,
            drivers_license: None,
            license_plate: None,
            number_of_passengers: None,
            was_driving: None,
            police_filed: None,
            police_receipt: None,
            other_party_name: None,
            other_party_insurance: None,
            missing_fields: Vec::new(),
            conversation_history: Vec::new(),
        }
    }

    /// Number of interruptions recorded in the history so far.
    pub fn interruption_count(&self) -> u32 {
        self.conversation_history
            .iter()
            .filter(|e| matches!(e, HistoryEntry::Interruption { .. }))
            .count() as u32
    }
}

/// One record in a conversation's audit trail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HistoryEntry {
    /// A spoken turn.
    Message {
        role: String,
        message: String,
        timestamp: String,
    },
    /// The caller talked over the agent.
    Interruption {
        reason: String,
        count: u32,
        timestamp: Option<String>,
    },
    /// A tool call completed.
    ToolCall {
        name: String,
        success: bool,
        timestamp: String,
    },
}

/// Accident location as the intake API expects it.
///
/// `road` always carries the full original description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuredLocation {
    pub country: String,
    pub state: String,
    pub city: String,
    pub zip: String,
    pub road: String,
}

impl StructuredLocation {
    /// Default country for locations without one.
    pub const DEFAULT_COUNTRY: &'static str = "USA";

    /// A location carrying only the original text.
    pub fn unstructured(text: impl Into<String>) -> Self {
        Self {
            country: Self::DEFAULT_COUNTRY.to_string(),
            state: String::new(),
            city: String::new(),
            zip: String::new(),
            road: text.into(),
        }
    }
}

/// Complete FNOL payload in the intake API's schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FnolPayload {
    pub incident: Incident,
    pub policy: Policy,
    pub personal_information: PersonalInformation,
    pub police_report: PoliceReport,
    pub other_party: OtherParty,
}

/// When, where and what happened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Incident {
    pub occurrence_date_time: String,
    pub fnol_date_time: String,
    pub location: StructuredLocation,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Policy {
    pub id: String,
}

/// The insured's details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalInformation {
    pub customer_id: String,
    pub drivers_license_number: String,
    pub is_insurer_driver: bool,
    pub license_plate_number: String,
    pub number_of_passengers: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoliceReport {
    pub is_filed: bool,
    pub report_or_receipt_available: bool,
}

/// The other party involved, when known.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OtherParty {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insurance_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insurance_company: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_new_context_defaults() {
        let context = ConversationContext::new("test-session-1");
        assert_eq!(context.session_id, "test-session-1");
        assert!(!context.safety_confirmed);
        assert_eq!(context.current_phase, ConversationPhase::SafetyCheck);
        assert!(context.missing_fields.is_empty());
        assert!(context.conversation_history.is_empty());
        assert!(context.policy_id.is_none());
    }

    #[test]
    fn test_payload_wire_names() {
        let payload = FnolPayload {
            incident: Incident {
                occurrence_date_time: "2024-05-15T15:00:00Z".to_string(),
                fnol_date_time: "2024-05-16T09:00:00Z".to_string(),
                location: StructuredLocation::unstructured("somewhere"),
                description: "rear-ended".to_string(),
            },
            policy: Policy {
                id: "POL-1".to_string(),
            },
            personal_information: PersonalInformation {
                customer_id: "CUST-1".to_string(),
                drivers_license_number: "D123".to_string(),
                is_insurer_driver: true,
                license_plate_number: "ABC123".to_string(),
                number_of_passengers: 0,
            },
            police_report: PoliceReport {
                is_filed: false,
                report_or_receipt_available: false,
            },
            other_party: OtherParty {
                first_name: Some("Jane".to_string()),
                ..Default::default()
            },
        };

        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value["incident"]["occurrenceDateTime"], "2024-05-15T15:00:00Z");
        assert_eq!(value["incident"]["location"]["country"], "USA");
        assert_eq!(value["personalInformation"]["isInsurerDriver"], true);
        assert_eq!(value["personalInformation"]["numberOfPassengers"], 0);
        assert_eq!(value["policeReport"]["reportOrReceiptAvailable"], false);
        assert_eq!(value["otherParty"], json!({"firstName": "Jane"}));
    }

    #[test]
    fn test_payload_rejects_missing_sections() {
        let partial = json!({
            "incident": {
                "occurrenceDateTime": "2024-05-15T15:00:00Z",
                "fnolDateTime": "2024-05-16T09:00:00Z",
                "location": {"country": "USA", "state": "", "city": "", "zip": "", "road": "x"},
                "description": "d"
            },
            "policy": {"id": "POL-1"}
        });
        assert!(serde_json::from_value::<FnolPayload>(partial).is_err());
    }

    #[test]
    fn test_history_entry_tagging() {
        let entry = HistoryEntry::Interruption {
            reason: "user_speech".to_string(),
            count: 1,
            timestamp: None,
        };
        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value["type"], "interruption");
        assert_eq!(value["count"], 1);
    }
}
