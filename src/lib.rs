//! # rime
//!
//! rime is a small client for the ServiceNow table REST API, built for
//! security-operations change management. It fetches change-request
//! tickets and their change tasks, posts approval updates, and turns a
//! ticket's free-text description into a one-sentence plain-language
//! summary when it mentions firewall changes.
//!
//! ## Features
//!
//! - **Read operations**: list a group's tickets, fetch a ticket with
//!   its tasks embedded
//! - **Approval updates**: two-phase number-to-`sys_id` resolution,
//!   then a partial update of the approval and work-notes fields
//! - **Summaries**: a pure, rule-based firewall-change summarizer with
//!   no external dependencies
//! - **Security**: passwords and tokens are never logged or exposed in
//!   error messages
//!
//! ## Failure policy
//!
//! The four ticket operations never raise to the caller. Transport
//! failures and not-found lookups are logged and converted to the
//! operation's documented sentinel (an empty vector, `None`, or
//! `false`). There are no retries. Only construction can fail, and
//! only for configuration reasons.
//!
//! ## Architecture
//!
//! - [`config`] - Configuration loading and the credential sum type
//! - [`error`] - Error types with secret sanitization
//! - [`snow_client`] - HTTP client for the table API
//! - [`models`] - Ticket and task data models
//! - [`summary`] - Plain-language firewall change summaries
//!
//! ## Example
//!
//! ```ignore
//! use rime::config::Config;
//! use rime::snow_client::SnowClient;
//! use rime::summary::summarize_change;
//!
//! async fn example() -> Result<(), rime::error::RimeError> {
//!     let config = Config::from_env()?;
//!     let client = SnowClient::from_config(&config)?;
//!
//!     for ticket in client.list_tickets("SecOps", None).await {
//!         println!("{}", ticket.display_summary());
//!     }
//!
//!     if let Some(ticket) = client.get_ticket_detail("CHG0030042").await {
//!         println!("{}", summarize_change(&ticket));
//!     }
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod config;
pub mod error;
pub mod models;
pub mod snow_client;
pub mod summary;
