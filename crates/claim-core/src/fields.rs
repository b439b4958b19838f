//! The canonical required-field table.
//!
//! Both completeness checklists (the labelled one used while extracting and
//! the key-based one run over a plain claim map) are derived from
//! [`REQUIRED_FIELDS`]. Changing the required set means editing this table
//! and nothing else.

use serde_json::Value;

use crate::schema::ConversationContext;

/// How presence of a value is judged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Present when a non-empty string (or other truthy value).
    Text,
    /// Present when non-null, so `false` and `0` count.
    Value,
}

impl FieldKind {
    /// Whether `value` counts as present for this kind of field.
    pub fn is_present(self, value: &Value) -> bool {
        match self {
            FieldKind::Text => is_truthy(value),
            FieldKind::Value => !value.is_null(),
        }
    }
}

/// When a field is required.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    Always,
    /// Required only once the caller said a police report was filed.
    WhenPoliceFiled,
}

/// One entry in the required-field table.
#[derive(Debug, Clone, Copy)]
pub struct RequiredField {
    /// Phrase used when asking the caller for the field.
    pub label: &'static str,
    /// Key in the claim-map shape.
    pub claim_key: &'static str,
    pub kind: FieldKind,
    pub requirement: Requirement,
    /// Whether the claim-map checklist asks for this field.
    pub in_claim_map: bool,
    /// Position in the claim-map checklist's output.
    pub claim_rank: u8,
    read: fn(&ConversationContext) -> Value,
}

impl RequiredField {
    /// Read this field out of a context as JSON.
    pub fn read(&self, context: &ConversationContext) -> Value {
        (self.read)(context)
    }

    /// Whether the field is required given the police-filed answer.
    pub fn applies(&self, police_filed: &Value) -> bool {
        match self.requirement {
            Requirement::Always => true,
            Requirement::WhenPoliceFiled => police_filed == &Value::Bool(true),
        }
    }
}

fn text(value: &Option<String>) -> Value {
    value.clone().map(Value::String).unwrap_or(Value::Null)
}

fn flag(value: Option<bool>) -> Value {
    value.map(Value::Bool).unwrap_or(Value::Null)
}

/// Every required claim field, in the order the caller is asked for them.
pub const REQUIRED_FIELDS: &[RequiredField] = &[
    RequiredField {
        label: "date and time of accident",
        claim_key: "dateTime",
        kind: FieldKind::Text,
        requirement: Requirement::Always,
        in_claim_map: true,
        claim_rank: 1,
        read: |c| text(&c.occurrence_date_time),
    },
    RequiredField {
        label: "accident location",
        claim_key: "location",
        kind: FieldKind::Text,
        requirement: Requirement::Always,
        in_claim_map: true,
        claim_rank: 0,
        read: |c| text(&c.location_description),
    },
    RequiredField {
        label: "damage description",
        claim_key: "damageDescription",
        kind: FieldKind::Text,
        requirement: Requirement::Always,
        in_claim_map: true,
        claim_rank: 2,
        read: |c| text(&c.damage_description),
    },
    RequiredField {
        label: "policy number",
        claim_key: "policyNumber",
        kind: FieldKind::Text,
        requirement: Requirement::Always,
        in_claim_map: true,
        claim_rank: 3,
        read: |c| text(&c.policy_id),
    },
    RequiredField {
        label: "driver's license number",
        claim_key: "driversLicense",
        kind: FieldKind::Text,
        requirement: Requirement::Always,
        in_claim_map: true,
        claim_rank: 4,
        read: |c| text(&c.drivers_license),
    },
    RequiredField {
        label: "license plate number",
        claim_key: "licensePlate",
        kind: FieldKind::Text,
        requirement: Requirement::Always,
        in_claim_map: false,
        claim_rank: 5,
        read: |c| text(&c.license_plate),
    },
    RequiredField {
        label: "number of passengers",
        claim_key: "numberOfPassengers",
        kind: FieldKind::Value,
        requirement: Requirement::Always,
        in_claim_map: true,
        claim_rank: 6,
        read: |c| c.number_of_passengers.map(Value::from).unwrap_or(Value::Null),
    },
    RequiredField {
        label: "whether you were driving",
        claim_key: "wasDriving",
        kind: FieldKind::Value,
        requirement: Requirement::Always,
        in_claim_map: true,
        claim_rank: 7,
        read: |c| flag(c.was_driving),
    },
    RequiredField {
        label: "whether police report was filed",
        claim_key: "policeFiled",
        kind: FieldKind::Value,
        requirement: Requirement::Always,
        in_claim_map: true,
        claim_rank: 8,
        read: |c| flag(c.police_filed),
    },
    RequiredField {
        label: "whether you have the police report receipt",
        claim_key: "policeReceipt",
        kind: FieldKind::Value,
        requirement: Requirement::WhenPoliceFiled,
        in_claim_map: true,
        claim_rank: 9,
        read: |c| flag(c.police_receipt),
    },
];

/// Claim-map key of the police-filed answer the conditional rule reads.
pub(crate) const POLICE_FILED_KEY: &str = "policeFiled";

/// Truthiness in the loose sense conversational payloads use: null, `false`,
/// zero, and empty strings, arrays or objects are all "absent".
pub(crate) fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(true, |f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_kind_presence() {
        assert!(!FieldKind::Text.is_present(&json!("")));
        assert!(FieldKind::Text.is_present(&json!("x")));
        assert!(FieldKind::Value.is_present(&json!(false)));
        assert!(FieldKind::Value.is_present(&json!(0)));
        assert!(!FieldKind::Value.is_present(&Value::Null));
    }

    #[test]
    fn test_claim_ranks_are_unique() {
        let mut ranks: Vec<u8> = REQUIRED_FIELDS.iter().map(|f| f.claim_rank).collect();
        ranks.sort_unstable();
        ranks.dedup();
        assert_eq!(ranks.len(), REQUIRED_FIELDS.len());
    }

    #[test]
    fn test_only_receipt_is_conditional() {
        let conditional: Vec<&str> = REQUIRED_FIELDS
            .iter()
            .filter(|f| f.requirement == Requirement::WhenPoliceFiled)
            .map(|f| f.claim_key)
            .collect();
        assert_eq!(conditional, vec!["policeReceipt"]);
    }

    #[test]
    fn test_read_from_context() {
        let mut context = ConversationContext::new("s");
        context.number_of_passengers = Some(2);
        context.was_driving = Some(false);

        let passengers = REQUIRED_FIELDS
            .iter()
            .find(|f| f.claim_key == "numberOfPassengers")
            .unwrap();
        assert_eq!(passengers.read(&context), json!(2));

        let driving = REQUIRED_FIELDS.iter().find(|f| f.claim_key == "wasDriving").unwrap();
        assert_eq!(driving.read(&context), json!(false));
    }
}
