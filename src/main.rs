//! rime - demo walkthrough against a ServiceNow instance.
//!
//! Lists the SecOps group's change requests, fetches the first one in
//! detail, prints its plain-language summary, and posts a demo
//! approval.
//!
//! # Configuration
//!
//! Set the following environment variables (or use a `.env` file):
//!
//! - `SERVICENOW_INSTANCE`: instance hostname
//! - `SERVICENOW_USERNAME` / `SERVICENOW_PASSWORD`: basic auth pair
//! - `SERVICENOW_OAUTH_TOKEN`: bearer token (takes precedence)
//!
//! Unset values fall back to demo defaults that will not reach a real
//! instance.

use std::env;

use anyhow::{Context, Result};
use tracing_subscriber::{fmt, EnvFilter};

use rime::config::{Credential, ENV_INSTANCE, ENV_PASSWORD, ENV_USERNAME};
use rime::snow_client::SnowClient;
use rime::summary::summarize_change;

/// Assignment group queried by the demo.
const DEMO_GROUP: &str = "SecOps";

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (ignore errors if not found)
    dotenvy::dotenv().ok();

    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("rime=info")),
        )
        .init();

    tracing::info!("Starting rime demo v{}", env!("CARGO_PKG_VERSION"));

    // Demo fallbacks; production callers should use Config::from_env.
    let instance =
        env::var(ENV_INSTANCE).unwrap_or_else(|_| "example.service-now.com".to_string());
    let username = env::var(ENV_USERNAME).unwrap_or_else(|_| "admin".to_string());
    let password = env::var(ENV_PASSWORD).unwrap_or_else(|_| "password".to_string());

    let credential = Credential::resolve(Some(username), Some(password), None)
        .context("Failed to resolve credentials")?;
    let client =
        SnowClient::new(&instance, credential).context("Failed to create ServiceNow client")?;

    let tickets = client.list_tickets(DEMO_GROUP, None).await;
    if tickets.is_empty() {
        println!("No tickets found");
        return Ok(());
    }

    println!("Found {} tickets:", tickets.len());
    for ticket in &tickets {
        println!("- {}", ticket.display_summary());
    }

    let first_number = &tickets[0].number;
    let Some(details) = client.get_ticket_detail(first_number).await else {
        return Ok(());
    };

    println!("\nPlain language description:\n{}", summarize_change(&details));

    client
        .update_approval(
            first_number,
            "approved",
            "SecOps Engineer",
            Some("Approved via rime demo"),
        )
        .await;

    Ok(())
}
