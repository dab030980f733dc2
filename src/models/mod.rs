//! Data models for the ServiceNow table API.
//!
//! All record fields are display-value strings, matching the
//! `sysparm_display_value=true` rendering the client requests.

mod common;
mod task;
mod ticket;

pub use common::TableResponse;
pub use task::Task;
pub use ticket::Ticket;
