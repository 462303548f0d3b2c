// src/bin/test_lead_notifier.rs
// Sends one sample lead through the configured transports.
use anyhow::Result;
use dotenv::dotenv;
use std::env;

use yd_advisory::config::AppConfig;
use yd_advisory::models::LeadSubmission;
use yd_advisory::services::calculator::{FORM_TYPE, SERVICE_INTEREST};
use yd_advisory::services::notifier::FallbackNotifier;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    dotenv().ok();

    let config = AppConfig::from_env()?;
    let notifier = FallbackNotifier::from_config(&config.lead);
    println!("Transports: {:?}", notifier.transport_names());

    let email = env::var("TEST_LEAD_EMAIL").unwrap_or_else(|_| "test.lead@example.com".to_string());
    let lead = LeadSubmission {
        first_name: "Test".to_string(),
        last_name: "Lead".to_string(),
        email,
        phone: "+971500000000".to_string(),
        company: "Not provided".to_string(),
        subject: format!("{} Request - basic Tool", FORM_TYPE),
        message: "Connectivity check for the calculator lead pipeline.".to_string(),
        service_interest: SERVICE_INTEREST.to_string(),
        form_type: FORM_TYPE.to_string(),
    };

    let delivered_by = notifier.notify(&lead).await?;
    println!("Delivered via {}", delivered_by);
    Ok(())
}
