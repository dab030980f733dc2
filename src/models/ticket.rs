//! Change-request ticket model.

use serde::{Deserialize, Serialize};

use crate::models::Task;

/// A change-request ticket.
///
/// The remote system owns the record; this client only reads it and
/// partially updates the approval and work-notes fields. Which fields
/// are populated depends on the operation: the list operation requests
/// a fixed field subset (which omits `sys_id`), while the detail fetch
/// returns every field and additionally embeds the ticket's change
/// tasks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ticket {
    /// Human-facing ticket number (e.g. `CHG0030042`).
    pub number: String,

    /// Server-assigned internal identifier. Empty when the record came
    /// from a field-limited list query.
    #[serde(default)]
    pub sys_id: String,

    /// One-line summary.
    #[serde(default)]
    pub short_description: String,

    /// Full free-text description of the change.
    #[serde(default)]
    pub description: String,

    /// Current state, as a display value.
    #[serde(default)]
    pub state: String,

    /// Approval status, as a display value.
    #[serde(default)]
    pub approval: String,

    /// Assignment group display name.
    #[serde(default)]
    pub assignment_group: String,

    /// Change tasks belonging to this ticket. Populated only by the
    /// detail fetch; empty otherwise.
    #[serde(default)]
    pub tasks: Vec<Task>,
}

impl Ticket {
    /// Returns a one-line `number: short_description` summary for display.
    pub fn display_summary(&self) -> String {
        format!("{}: {}", self.number, self.short_description)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_list_record_without_sys_id() {
        let body = r#"{
            "number": "CHG0030042",
            "short_description": "Open firewall for web tier",
            "description": "Allow web traffic from DMZ to app servers",
            "state": "Assess",
            "approval": "Requested",
            "assignment_group": "SecOps"
        }"#;
        let ticket: Ticket = serde_json::from_str(body).unwrap();
        assert_eq!(ticket.number, "CHG0030042");
        assert!(ticket.sys_id.is_empty());
        assert!(ticket.tasks.is_empty());
    }

    #[test]
    fn test_display_summary() {
        let ticket: Ticket = serde_json::from_str(
            r#"{"number": "CHG0030042", "short_description": "Open firewall for web tier"}"#,
        )
        .unwrap();
        assert_eq!(
            ticket.display_summary(),
            "CHG0030042: Open firewall for web tier"
        );
    }
}
