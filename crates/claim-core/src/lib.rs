//! Conversation state and claim extraction for voice FNOL intake.
//!
//! This crate holds everything about a First Notice of Loss conversation that
//! has real state or rules, independent of the voice runtime and the HTTP
//! collaborators:
//!
//! - [`ConversationContext`] and the payload shapes in [`schema`]
//! - [`ContextStore`] - Per-session state with idle-TTL expiry
//! - [`FieldExtractor`] - Partial updates from tool arguments, with datetime
//!   normalization
//! - [`missing_context_fields`] / [`validate_claim_map`] - Both completeness
//!   checklists, derived from the single [`REQUIRED_FIELDS`] table
//! - [`parse_location`] - Best-effort address decomposition
//! - [`assess_safety`] - The safety gate in front of claim collection
//! - [`ConversationPhase`] - The explicit phase state machine
//!
//! # Example
//!
//! ```rust
//! use claim_core::{ClaimUpdate, ContextStore, FieldExtractor};
//! use std::sync::Arc;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let store = Arc::new(ContextStore::new());
//!     let extractor = FieldExtractor::new(store.clone());
//!
//!     let update = ClaimUpdate {
//!         policy_id: Some("POL-123".to_string()),
//!         ..Default::default()
//!     };
//!     let outcome = extractor.extract("session-1", update).await;
//!
//!     assert_eq!(outcome.collected_fields.policy_id.as_deref(), Some("POL-123"));
//!     assert!(outcome.missing_fields.contains(&"damage description".to_string()));
//! }
//! ```

mod datetime;
mod error;
mod extractor;
mod fields;
mod location;
mod parsed;
mod payload;
mod phase;
mod safety;
pub mod schema;
mod store;
mod validator;

pub use datetime::normalize_datetime;
pub use error::ClaimError;
pub use extractor::{apply_update, ClaimUpdate, CollectedFields, ExtractionOutcome, FieldExtractor};
pub use fields::{FieldKind, RequiredField, Requirement, REQUIRED_FIELDS};
pub use location::parse_location;
pub use parsed::Parsed;
pub use payload::{assemble_payload, split_other_party_name};
pub use phase::ConversationPhase;
pub use safety::{assess_safety, SafetyAssessment, SafetySignals};
pub use schema::{ConversationContext, FnolPayload, HistoryEntry, StructuredLocation};
pub use store::{ContextStore, DEFAULT_SESSION_TTL};
pub use validator::{missing_context_fields, validate_claim_map, ValidationReport};
