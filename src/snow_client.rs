//! HTTP client for the ServiceNow table API.
//!
//! This module provides the `SnowClient` struct for making authenticated
//! requests against the `change_request` and `change_task` tables.
//!
//! # Failure policy
//!
//! The four public operations never raise past their boundary. Any
//! transport failure (connection error, non-2xx status, timeout) is
//! logged and converted into the operation's documented sentinel:
//! an empty `Vec`, `None`, or `false`. There is no retry and no
//! backoff; each logical operation is one or two sequential bounded
//! exchanges.
//!
//! # Security
//!
//! Credentials are never logged. Error messages are sanitized before
//! logging.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Client;
use serde::Deserialize;
use url::Url;

use crate::config::{Config, Credential};
use crate::error::RimeError;
use crate::models::{TableResponse, Task, Ticket};

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Result cap for the ticket list operation.
const TICKET_LIST_LIMIT: u32 = 10;

/// Change-request table name.
const CHANGE_REQUEST_TABLE: &str = "change_request";

/// Change-task table name.
const CHANGE_TASK_TABLE: &str = "change_task";

/// Field allowlist for the ticket list operation.
const TICKET_FIELDS: &str = "number,short_description,description,state,approval,assignment_group";

/// Field allowlist for the task list operation.
const TASK_FIELDS: &str = "number,short_description,description,state,assigned_to,assignment_group";

/// Maximum length for HTTP error response bodies kept in error values.
const MAX_ERROR_BODY_LEN: usize = 500;

/// HTTP client for the ServiceNow table API.
///
/// One instance holds exactly one authentication mode and one base URL
/// for its entire lifetime; both are immutable after construction, so
/// the client can be shared freely across tasks.
///
/// # Example
///
/// ```ignore
/// let config = Config::from_env()?;
/// let client = SnowClient::from_config(&config)?;
///
/// let tickets = client.list_tickets("SecOps", None).await;
/// ```
#[derive(Clone)]
pub struct SnowClient {
    /// The underlying HTTP client (cloning is cheap).
    http: Client,

    /// Base URL for the table API (e.g. `https://example.service-now.com/api/now`).
    base_url: String,

    /// Resolved authentication mode.
    /// SECURITY: the secret inside must never be logged.
    credential: Credential,

    /// Configured transport timeout, reported in timeout errors.
    timeout: Duration,
}

/// Minimal record for the number-to-sys_id resolution phase of
/// approval updates, where only `sys_id` is requested.
#[derive(Debug, Deserialize)]
struct SysIdRecord {
    sys_id: String,
}

impl SnowClient {
    /// Creates a client for a ServiceNow instance hostname.
    ///
    /// The base URL becomes `https://<instance>/api/now`. A bearer
    /// token is installed once into the default header map; a
    /// username/password pair is applied per request as HTTP Basic.
    ///
    /// # Errors
    ///
    /// Returns `RimeError::Config` if the instance does not form a
    /// valid URL, or `RimeError::HttpClient` if the HTTP client fails
    /// to initialize.
    pub fn new(instance: &str, credential: Credential) -> Result<Self, RimeError> {
        Self::from_base_url(format!("https://{}/api/now", instance), credential)
    }

    /// Creates a client from loaded configuration.
    ///
    /// # Errors
    ///
    /// Same as [`SnowClient::new`].
    pub fn from_config(config: &Config) -> Result<Self, RimeError> {
        Self::new(&config.instance, config.credential.clone())
    }

    /// Creates a client against an explicit base URL.
    ///
    /// Intended for tests against a local mock server and for
    /// instances reached through a gateway; production callers should
    /// prefer [`SnowClient::new`].
    ///
    /// # Errors
    ///
    /// Returns `RimeError::Config` if the URL does not parse, or
    /// `RimeError::HttpClient` if the HTTP client fails to initialize.
    pub fn from_base_url(
        base_url: impl Into<String>,
        credential: Credential,
    ) -> Result<Self, RimeError> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Url::parse(&base_url)
            .map_err(|e| RimeError::invalid_config(format!("invalid base URL: {}", e)))?;

        let timeout = Duration::from_secs(DEFAULT_TIMEOUT_SECS);
        let http = Self::build_http(&credential, timeout)?;

        Ok(Self {
            http,
            base_url,
            credential,
            timeout,
        })
    }

    /// Replaces the transport timeout, rebuilding the underlying HTTP
    /// client. The default is 30 seconds.
    ///
    /// # Errors
    ///
    /// Returns `RimeError::HttpClient` if the client fails to rebuild.
    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self, RimeError> {
        self.http = Self::build_http(&self.credential, timeout)?;
        self.timeout = timeout;
        Ok(self)
    }

    /// Builds the reqwest client with the fixed JSON headers and, for
    /// bearer credentials, the Authorization header installed once.
    fn build_http(credential: &Credential, timeout: Duration) -> Result<Client, RimeError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        if let Credential::Bearer { token } = credential {
            let mut value = HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|_| RimeError::invalid_config("oauth token contains invalid characters"))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()
            .map_err(RimeError::HttpClient)
    }

    /// Returns the browser URL for viewing a ticket in the ServiceNow UI.
    pub fn ticket_web_url(&self, sys_id: &str) -> String {
        let web_base = self.base_url.trim_end_matches("/api/now");
        format!(
            "{}/nav_to.do?uri={}",
            web_base,
            urlencoding::encode(&format!("change_request.do?sys_id={}", sys_id))
        )
    }

    // ========================================================================
    // Public operations (sentinel boundary)
    // ========================================================================

    /// Lists change-request tickets for an assignment group, optionally
    /// filtered by state. Capped at 10 results.
    ///
    /// Returns an empty vector on any transport failure; the error is
    /// logged, never raised.
    pub async fn list_tickets(
        &self,
        assignment_group: &str,
        status: Option<&str>,
    ) -> Vec<Ticket> {
        let mut query = TicketQuery::new()
            .with_clause(format!("assignment_group.name={}", assignment_group))
            .with_display_values()
            .with_fields(TICKET_FIELDS)
            .with_limit(TICKET_LIST_LIMIT);
        if let Some(status) = status {
            query = query.with_clause(format!("state={}", status));
        }

        match self
            .get_records::<Ticket>(CHANGE_REQUEST_TABLE, &query)
            .await
        {
            Ok(tickets) => {
                tracing::info!(count = tickets.len(), assignment_group, "retrieved tickets");
                tickets
            }
            Err(e) => {
                self.log_error("list_tickets", &e);
                Vec::new()
            }
        }
    }

    /// Gets a single ticket by number, with its change tasks embedded.
    ///
    /// Returns `None` if the number matches nothing (logged at warning
    /// level, and no task fetch is attempted) or on transport failure.
    pub async fn get_ticket_detail(&self, ticket_number: &str) -> Option<Ticket> {
        let query = TicketQuery::new()
            .with_clause(format!("number={}", ticket_number))
            .with_display_values()
            .with_limit(1);

        let mut tickets = match self
            .get_records::<Ticket>(CHANGE_REQUEST_TABLE, &query)
            .await
        {
            Ok(tickets) => tickets,
            Err(e) => {
                self.log_error("get_ticket_detail", &e);
                return None;
            }
        };

        if tickets.is_empty() {
            self.log_not_found("get_ticket_detail", ticket_number);
            return None;
        }

        let mut ticket = tickets.swap_remove(0);
        ticket.tasks = self.get_associated_tasks(&ticket.sys_id).await;
        Some(ticket)
    }

    /// Gets the change tasks associated with a change request, by the
    /// parent's `sys_id`.
    ///
    /// Returns an empty vector on transport failure or no matches. No
    /// result cap is applied; the service default governs.
    pub async fn get_associated_tasks(&self, change_sys_id: &str) -> Vec<Task> {
        let query = TicketQuery::new()
            .with_clause(format!("change_request={}", change_sys_id))
            .with_display_values()
            .with_fields(TASK_FIELDS);

        match self.get_records::<Task>(CHANGE_TASK_TABLE, &query).await {
            Ok(tasks) => {
                tracing::info!(count = tasks.len(), change_sys_id, "retrieved tasks");
                tasks
            }
            Err(e) => {
                self.log_error("get_associated_tasks", &e);
                Vec::new()
            }
        }
    }

    /// Updates the approval status of a ticket, writing a timestamped
    /// attribution line into its work notes.
    ///
    /// Two sequential exchanges with no transactional guarantee: the
    /// number is first resolved to a `sys_id` (a miss logs a warning
    /// and returns `false` without attempting the write), then a
    /// partial update sets `approval` and `work_notes`. Returns `true`
    /// only if both exchanges succeed.
    pub async fn update_approval(
        &self,
        ticket_number: &str,
        approval_status: &str,
        approver_name: &str,
        comment: Option<&str>,
    ) -> bool {
        let query = TicketQuery::new()
            .with_clause(format!("number={}", ticket_number))
            .with_fields("sys_id")
            .with_limit(1);

        let records = match self
            .get_records::<SysIdRecord>(CHANGE_REQUEST_TABLE, &query)
            .await
        {
            Ok(records) => records,
            Err(e) => {
                self.log_error("update_approval", &e);
                return false;
            }
        };

        let Some(record) = records.first() else {
            self.log_not_found("update_approval", ticket_number);
            return false;
        };
        if !is_valid_sys_id(&record.sys_id) {
            tracing::warn!(ticket_number, "service returned an unusable sys_id");
            return false;
        }

        let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
        let body = serde_json::json!({
            "approval": approval_status,
            "work_notes": attribution_line(approver_name, &timestamp, comment),
        });

        match self
            .put_record(CHANGE_REQUEST_TABLE, &record.sys_id, &body)
            .await
        {
            Ok(()) => {
                tracing::info!(ticket_number, approval_status, "updated ticket approval");
                true
            }
            Err(e) => {
                self.log_error("update_approval", &e);
                false
            }
        }
    }

    // ========================================================================
    // Private transport plumbing (Result-based)
    // ========================================================================

    /// Makes a GET request against a table endpoint and unwraps the
    /// `result` envelope.
    async fn get_records<T>(&self, table: &str, query: &TicketQuery) -> Result<Vec<T>, RimeError>
    where
        T: serde::de::DeserializeOwned,
    {
        let url = format!("{}/table/{}", self.base_url, table);

        tracing::debug!(table, "making table API GET request");

        let mut req = self.http.get(&url).query(&query.to_query_pairs());
        if let Credential::Basic { username, password } = &self.credential {
            req = req.basic_auth(username, Some(password));
        }

        let response = req.send().await.map_err(|e| self.classify_send_error(e, table))?;
        let status = response.status();
        if !status.is_success() {
            return Err(self.status_error(status, response).await);
        }

        let body = response.text().await.map_err(RimeError::Http)?;
        let envelope: TableResponse<T> = serde_json::from_str(&body)?;
        Ok(envelope.into_records())
    }

    /// Makes a PUT request against a single table record.
    async fn put_record(
        &self,
        table: &str,
        sys_id: &str,
        body: &serde_json::Value,
    ) -> Result<(), RimeError> {
        let url = format!("{}/table/{}/{}", self.base_url, table, sys_id);

        tracing::debug!(table, "making table API PUT request");

        let mut req = self.http.put(&url).json(body);
        if let Credential::Basic { username, password } = &self.credential {
            req = req.basic_auth(username, Some(password));
        }

        let response = req.send().await.map_err(|e| self.classify_send_error(e, table))?;
        let status = response.status();
        if !status.is_success() {
            return Err(self.status_error(status, response).await);
        }

        Ok(())
    }

    /// Classifies a reqwest send failure, distinguishing timeouts.
    fn classify_send_error(&self, e: reqwest::Error, table: &str) -> RimeError {
        if e.is_timeout() {
            return RimeError::timeout(self.timeout, format!("table/{}", table));
        }
        RimeError::Http(e)
    }

    /// Converts a non-2xx response into an error carrying a sanitized,
    /// length-capped body.
    async fn status_error(
        &self,
        status: reqwest::StatusCode,
        response: reqwest::Response,
    ) -> RimeError {
        let body = response.text().await.unwrap_or_default();
        let body = RimeError::sanitize_message(&body, self.credential.secret());
        RimeError::HttpStatus {
            status,
            body: truncate_for_log(&body),
        }
    }

    /// Logs a lookup that yielded no records at warning level.
    ///
    /// Not-found is a soft failure: it shares the sentinel return with
    /// transport errors but is distinguished here in the logs.
    fn log_not_found(&self, operation: &str, ticket_number: &str) {
        let e = RimeError::not_found(ticket_number);
        tracing::warn!(operation, error = %e, "lookup returned no records");
    }

    /// Logs a failed exchange at error level, sanitized.
    fn log_error(&self, operation: &str, e: &RimeError) {
        tracing::error!(
            operation,
            error = %RimeError::sanitize_message(&e.to_string(), self.credential.secret()),
            "table API request failed"
        );
    }
}

/// Caps a response body for inclusion in an error value.
///
/// The cut backs off to the nearest char boundary so multibyte text
/// can never split mid-character.
fn truncate_for_log(body: &str) -> String {
    if body.len() <= MAX_ERROR_BODY_LEN {
        return body.to_string();
    }
    let end = (0..=MAX_ERROR_BODY_LEN)
        .rev()
        .find(|&i| body.is_char_boundary(i))
        .unwrap_or(0);
    format!("{}...[truncated]", &body[..end])
}

/// Composes the work-notes attribution line for an approval update.
fn attribution_line(approver_name: &str, timestamp: &str, comment: Option<&str>) -> String {
    let mut line = format!("Approved by {} at {}", approver_name, timestamp);
    if let Some(comment) = comment {
        line.push_str(&format!(" - {}", comment));
    }
    line
}

/// Checks that a sys_id resolved from the service is safe to
/// interpolate into a URL path. ServiceNow sys_ids are 32 hex chars.
fn is_valid_sys_id(sys_id: &str) -> bool {
    !sys_id.is_empty() && sys_id.bytes().all(|b| b.is_ascii_alphanumeric())
}

/// Builder for a table API filter query.
///
/// Clauses are `field=value` expressions joined by `^`, the table
/// API's logical AND separator, carried in `sysparm_query`.
#[derive(Debug, Clone, Default)]
pub struct TicketQuery {
    clauses: Vec<String>,
    display_values: bool,
    fields: Option<String>,
    limit: Option<u32>,
}

impl TicketQuery {
    /// Creates an empty query.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a `field=value` filter clause.
    pub fn with_clause(mut self, clause: impl Into<String>) -> Self {
        self.clauses.push(clause.into());
        self
    }

    /// Requests display-value rendering instead of raw values.
    pub fn with_display_values(mut self) -> Self {
        self.display_values = true;
        self
    }

    /// Restricts the response to a comma-separated field allowlist.
    pub fn with_fields(mut self, fields: impl Into<String>) -> Self {
        self.fields = Some(fields.into());
        self
    }

    /// Caps the number of returned records.
    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Converts the query into `sysparm_*` parameter pairs.
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if !self.clauses.is_empty() {
            pairs.push(("sysparm_query", self.clauses.join("^")));
        }
        if self.display_values {
            pairs.push(("sysparm_display_value", "true".to_string()));
        }
        if let Some(fields) = &self.fields {
            pairs.push(("sysparm_fields", fields.clone()));
        }
        if let Some(limit) = self.limit {
            pairs.push(("sysparm_limit", limit.to_string()));
        }
        pairs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn test_credential() -> Credential {
        Credential::Basic {
            username: "admin".to_string(),
            password: "test_password".to_string(),
        }
    }

    #[test]
    fn test_new_builds_instance_base_url() {
        let client = SnowClient::new("example.service-now.com", test_credential()).unwrap();
        assert_eq!(client.base_url, "https://example.service-now.com/api/now");
    }

    #[test]
    fn test_from_base_url_trims_trailing_slash() {
        let client =
            SnowClient::from_base_url("http://127.0.0.1:8080/api/now/", test_credential())
                .unwrap();
        assert_eq!(client.base_url, "http://127.0.0.1:8080/api/now");
    }

    #[test]
    fn test_new_rejects_unparseable_instance() {
        let result = SnowClient::new("not a hostname", test_credential());
        assert!(result.is_err());
    }

    #[test]
    fn test_ticket_web_url_encodes_uri() {
        let client = SnowClient::new("example.service-now.com", test_credential()).unwrap();
        let url = client.ticket_web_url("abc123");
        assert_eq!(
            url,
            "https://example.service-now.com/nav_to.do?uri=change_request.do%3Fsys_id%3Dabc123"
        );
    }

    #[test]
    fn test_query_joins_clauses_with_caret() {
        let query = TicketQuery::new()
            .with_clause("assignment_group.name=SecOps")
            .with_clause("state=Assess");
        let pairs = query.to_query_pairs();
        assert_eq!(
            pairs,
            vec![(
                "sysparm_query",
                "assignment_group.name=SecOps^state=Assess".to_string()
            )]
        );
    }

    #[test]
    fn test_query_full_parameter_set() {
        let query = TicketQuery::new()
            .with_clause("number=CHG0030042")
            .with_display_values()
            .with_fields("sys_id")
            .with_limit(1);
        let pairs = query.to_query_pairs();
        assert_eq!(
            pairs,
            vec![
                ("sysparm_query", "number=CHG0030042".to_string()),
                ("sysparm_display_value", "true".to_string()),
                ("sysparm_fields", "sys_id".to_string()),
                ("sysparm_limit", "1".to_string()),
            ]
        );
    }

    #[test]
    fn test_empty_query_has_no_pairs() {
        assert!(TicketQuery::new().to_query_pairs().is_empty());
    }

    #[test]
    fn test_attribution_line_without_comment() {
        assert_eq!(
            attribution_line("SecOps Engineer", "2026-08-29 10:15:00", None),
            "Approved by SecOps Engineer at 2026-08-29 10:15:00"
        );
    }

    #[test]
    fn test_attribution_line_with_comment() {
        assert_eq!(
            attribution_line("SecOps Engineer", "2026-08-29 10:15:00", Some("LGTM")),
            "Approved by SecOps Engineer at 2026-08-29 10:15:00 - LGTM"
        );
    }

    #[test]
    fn test_truncate_for_log_keeps_short_body() {
        assert_eq!(truncate_for_log("not json"), "not json");
    }

    #[test]
    fn test_truncate_for_log_caps_long_body() {
        let body = "a".repeat(MAX_ERROR_BODY_LEN + 100);
        let capped = truncate_for_log(&body);
        assert!(capped.ends_with("...[truncated]"));
        assert_eq!(capped.len(), MAX_ERROR_BODY_LEN + "...[truncated]".len());
    }

    #[test]
    fn test_truncate_for_log_backs_off_multibyte_boundary() {
        // 'é' is two bytes and straddles the cap index, so the cut
        // must land one byte earlier instead of panicking.
        let body = format!("{}é{}", "a".repeat(MAX_ERROR_BODY_LEN - 1), "b".repeat(50));
        let capped = truncate_for_log(&body);
        assert!(capped.starts_with(&"a".repeat(MAX_ERROR_BODY_LEN - 1)));
        assert!(!capped.contains('é'));
        assert!(capped.ends_with("...[truncated]"));
    }

    #[test]
    fn test_with_timeout_stores_duration() {
        let client = SnowClient::new("example.service-now.com", test_credential())
            .unwrap()
            .with_timeout(Duration::from_secs(5))
            .unwrap();
        assert_eq!(client.timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_is_valid_sys_id() {
        assert!(is_valid_sys_id("46d44a5dc611227f0200308e0d9b2a6a"));
        assert!(!is_valid_sys_id(""));
        assert!(!is_valid_sys_id("../../etc/passwd"));
        assert!(!is_valid_sys_id("abc def"));
    }
}
