//! Plain-language summaries of firewall change requests.
//!
//! A rule-based classifier over the ticket's free-text descriptions.
//! It is deliberately a fixed sequence of case-insensitive substring
//! tests, first match wins; the literal phrases and branch order are
//! the observable contract of this module, so they must not be
//! reworded or reordered. No network access, no NLP.

use crate::models::Ticket;

/// Sentence returned when the ticket does not mention a firewall.
const FALLBACK: &str = "This change includes technical modifications to network settings. \
                        Please review the technical details.";

/// Produces a one-sentence plain-language description of a change
/// request's intent.
///
/// The "firewall" gate inspects both the short and long descriptions;
/// every later clause inspects only the long description. Always
/// returns a non-empty string and never mutates the ticket.
///
/// # Example
///
/// ```
/// use rime::models::Ticket;
/// use rime::summary::summarize_change;
///
/// let ticket: Ticket = serde_json::from_str(
///     r#"{"number": "CHG1", "description": "firewall: allow web traffic"}"#,
/// ).unwrap();
/// assert!(summarize_change(&ticket).starts_with("This change will update the firewall rules"));
/// ```
pub fn summarize_change(ticket: &Ticket) -> String {
    let description = ticket.description.to_lowercase();
    let short_description = ticket.short_description.to_lowercase();

    if !description.contains("firewall") && !short_description.contains("firewall") {
        return FALLBACK.to_string();
    }

    let mut plain_text = String::from("This change will update the firewall rules to ");

    if description.contains("allow") {
        plain_text.push_str("allow ");
    } else if description.contains("block") {
        plain_text.push_str("block ");
    } else {
        plain_text.push_str("modify ");
    }

    if description.contains("web") {
        plain_text.push_str("web traffic ");
    } else if description.contains("database") {
        plain_text.push_str("database connections ");
    } else {
        plain_text.push_str("network traffic ");
    }

    if description.contains("from") && description.contains("to") {
        plain_text.push_str("from the source to the destination systems.");
    } else {
        plain_text.push_str("as specified in the technical details.");
    }

    plain_text
}
