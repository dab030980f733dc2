//! Common types shared across table API models.

use serde::Deserialize;

/// Envelope wrapper for table API responses.
///
/// Every table endpoint wraps its payload in a `result` field holding
/// the matching records. A missing `result` field is a malformed body
/// and fails deserialization rather than being papered over.
#[derive(Debug, Clone, Deserialize)]
pub struct TableResponse<T> {
    /// The records matching the query.
    pub result: Vec<T>,
}

impl<T> TableResponse<T> {
    /// Consumes the envelope, returning the records.
    pub fn into_records(self) -> Vec<T> {
        self.result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Ticket;

    #[test]
    fn test_envelope_unwraps_records() {
        let body = r#"{"result": [{"number": "CHG0030001"}, {"number": "CHG0030002"}]}"#;
        let response: TableResponse<Ticket> = serde_json::from_str(body).unwrap();
        let records = response.into_records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].number, "CHG0030001");
    }

    #[test]
    fn test_envelope_empty_result() {
        let body = r#"{"result": []}"#;
        let response: TableResponse<Ticket> = serde_json::from_str(body).unwrap();
        assert!(response.into_records().is_empty());
    }

    #[test]
    fn test_envelope_missing_result_is_an_error() {
        let body = r#"{"error": {"message": "oops"}}"#;
        let response: Result<TableResponse<Ticket>, _> = serde_json::from_str(body);
        assert!(response.is_err());
    }
}
