//! Scripted intake call.
//!
//! Plays one caller's side of a claim call through the orchestrator and
//! prints every tool result, without a voice runtime.
//!
//! Run with: cargo run -p intake-orchestrator --example scripted_call
//!
//! Configuration via .env file or environment variables:
//!   FNOL_API_ENDPOINT      - Claims-intake URL (submission fails without it)
//!   CUSTOMER_API_ENDPOINT  - Customer API base URL (lookup fails without it)
//!   CUSTOMER_ID            - Caller's customer id (default: CUST-DEMO)
//!   AWS_REGION / AWS_ACCESS_KEY_ID / AWS_SECRET_ACCESS_KEY - Request signing
//!   RUST_LOG               - Log filter

use std::env;
use std::time::Duration;

use intake_orchestrator::{FnolConfig, IntakeOrchestrator, ToolRequest};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// The caller's side of the conversation, as the tool calls a voice model
/// would make for it.
const SCRIPT: &[(&str, &str, &str)] = &[
    (
        "Is everyone okay? Are you somewhere safe?",
        "assess_safety",
        r#"{"is_safe": true, "needs_medical": false, "police_contacted": false, "in_safe_location": true}"#,
    ),
    ("Let me pull up your information.", "get_customer_info", "{}"),
    (
        "When and where did this happen?",
        "extract_claim_info",
        r#"{"occurrence_date_time": "yesterday at 3pm",
            "location_description": "Central Ave and McDowell Rd, Phoenix, AZ 85004"}"#,
    ),
    (
        "What was damaged, and were you driving?",
        "extract_claim_info",
        r#"{"damage_description": "Rear bumper and trunk dented", "was_driving": true,
            "number_of_passengers": 1, "license_plate_number": "AZ-7KD21",
            "police_filed": false}"#,
    ),
    (
        "Do you have the other driver's details?",
        "extract_claim_info",
        r#"{"other_party_first_name": "Jordan", "other_party_last_name": "Lee",
            "other_party_insurance_company": "Acme Mutual"}"#,
    ),
    ("Let me check I have everything.", "validate_required_fields", "{}"),
    ("I'll submit your claim now.", "submit_to_fnol_api", "{}"),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new("intake_orchestrator=debug,fnol_tools=debug,claim_core=debug")
        }))
        .init();

    let config = FnolConfig::from_env();
    if config.fnol_api_endpoint.is_none() {
        warn!("FNOL_API_ENDPOINT not set; the submission step will fail");
    }

    let orchestrator = IntakeOrchestrator::from_config(&config)?;
    let sweeper = orchestrator.spawn_sweeper(config.sweep_interval);

    let customer_id = env::var("CUSTOMER_ID").unwrap_or_else(|_| "CUST-DEMO".to_string());
    let session = orchestrator.start_session(Some(customer_id)).await;
    info!("Scripted call in session {}", session.session_id);

    for (turn, (agent_line, tool, arguments)) in SCRIPT.iter().enumerate() {
        orchestrator
            .record_message(&session, "assistant", agent_line)
            .await;

        let request = ToolRequest::from_call(format!("turn-{}", turn), tool.to_string(), arguments)?;
        let result = orchestrator.handle_tool_call(&session, request).await;

        println!("[{}] {} -> {}", orchestrator.phase(&session).await, tool, result.content);
        tokio::time::sleep(Duration::from_millis(100)).await;
    }

    let context = orchestrator.context(&session).await;
    println!(
        "Call finished in phase {} with {} history entries",
        context.current_phase,
        context.conversation_history.len()
    );

    sweeper.abort();
    Ok(())
}
