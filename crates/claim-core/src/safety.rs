//! Safety gate evaluated before any claim data is collected.

use serde::{Deserialize, Serialize};

const MEDICAL_GUIDANCE: &str = "Please call 911 or your local emergency number immediately if you need medical assistance. Your safety is the priority. We can help with your claim once you've received medical attention.";
const UNSAFE_LOCATION_GUIDANCE: &str = "Please move to a safe location away from traffic before we continue. Your safety is most important.";
const POLICE_GUIDANCE: &str = "I recommend contacting the police to file an accident report. This will help with your claim. Would you like to do that now, or shall we proceed with collecting your claim information?";
const PROCEED_GUIDANCE: &str =
    "I'm glad you're safe. Let's proceed with collecting your claim information.";

/// What the caller said about their situation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct SafetySignals {
    pub is_safe: bool,
    pub needs_medical: bool,
    pub police_contacted: bool,
    pub in_safe_location: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SafetyAssessment {
    pub safety_confirmed: bool,
    pub guidance: String,
}

/// Decide whether claim collection may start.
///
/// Medical need and an unsafe location block collection, in that order.
/// Missing police contact only adds a recommendation. `is_safe` is recorded
/// by callers but does not change the outcome.
pub fn assess_safety(signals: SafetySignals) -> SafetyAssessment {
    let (safety_confirmed, guidance) = if signals.needs_medical {
        (false, MEDICAL_GUIDANCE)
    } else if !signals.in_safe_location {
        (false, UNSAFE_LOCATION_GUIDANCE)
    } else if !signals.police_contacted {
        (true, POLICE_GUIDANCE)
    } else {
        (true, PROCEED_GUIDANCE)
    };

    SafetyAssessment {
        safety_confirmed,
        guidance: guidance.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signals(needs_medical: bool, in_safe_location: bool, police_contacted: bool) -> SafetySignals {
        SafetySignals {
            is_safe: true,
            needs_medical,
            police_contacted,
            in_safe_location,
        }
    }

    #[test]
    fn test_medical_need_blocks_first() {
        let assessment = assess_safety(signals(true, false, false));
        assert!(!assessment.safety_confirmed);
        assert!(assessment.guidance.starts_with("Please call 911"));
    }

    #[test]
    fn test_unsafe_location_blocks() {
        let assessment = assess_safety(signals(false, false, true));
        assert!(!assessment.safety_confirmed);
        assert_eq!(assessment.guidance, UNSAFE_LOCATION_GUIDANCE);
    }

    #[test]
    fn test_police_recommendation_still_proceeds() {
        let assessment = assess_safety(signals(false, true, false));
        assert!(assessment.safety_confirmed);
        assert!(assessment.guidance.contains("contacting the police"));
    }

    #[test]
    fn test_all_clear() {
        let assessment = assess_safety(signals(false, true, true));
        assert!(assessment.safety_confirmed);
        assert_eq!(assessment.guidance, PROCEED_GUIDANCE);
    }

    #[test]
    fn test_is_safe_does_not_gate() {
        let mut s = signals(false, true, true);
        s.is_safe = false;
        assert!(assess_safety(s).safety_confirmed);
    }
}
