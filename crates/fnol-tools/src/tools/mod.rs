//! The five tool entry points the voice runtime calls.

mod customer_info;
mod extract;
mod safety;
mod submit;
mod validate;

pub use customer_info::GetCustomerInfo;
pub use extract::ExtractClaimInfo;
pub use safety::AssessSafety;
pub use submit::SubmitToFnolApi;
pub use validate::ValidateRequiredFields;

pub const ASSESS_SAFETY: &str = "assess_safety";
pub const EXTRACT_CLAIM_INFO: &str = "extract_claim_info";
pub const VALIDATE_REQUIRED_FIELDS: &str = "validate_required_fields";
pub const GET_CUSTOMER_INFO: &str = "get_customer_info";
pub const SUBMIT_TO_FNOL_API: &str = "submit_to_fnol_api";
