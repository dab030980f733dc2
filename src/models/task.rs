//! Change-task model.

use serde::{Deserialize, Serialize};

/// A change task, a sub-unit of work tied to one parent ticket.
///
/// Tasks are read-only from this client's perspective. The parent link
/// is by the ticket's `sys_id`, not its number.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    /// Human-facing task number (e.g. `CTASK0010001`).
    pub number: String,

    /// One-line summary.
    #[serde(default)]
    pub short_description: String,

    /// Full free-text description.
    #[serde(default)]
    pub description: String,

    /// Current state, as a display value.
    #[serde(default)]
    pub state: String,

    /// Assignee display name.
    #[serde(default)]
    pub assigned_to: String,

    /// Assignment group display name.
    #[serde(default)]
    pub assignment_group: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_task() {
        let body = r#"{
            "number": "CTASK0010001",
            "short_description": "Stage rule change",
            "state": "Open",
            "assigned_to": "Kim Larsen",
            "assignment_group": "SecOps"
        }"#;
        let task: Task = serde_json::from_str(body).unwrap();
        assert_eq!(task.number, "CTASK0010001");
        assert_eq!(task.assigned_to, "Kim Larsen");
        assert!(task.description.is_empty());
    }
}
