//! Configuration management for the rime client.
//!
//! This module handles loading configuration from environment variables
//! and resolving the authentication mode. Exactly one mode is active per
//! client instance: HTTP Basic (username/password) or a bearer token.
//! Supplying neither is a configuration error at construction time.

use crate::error::RimeError;
use std::env;

/// Environment variable holding the instance hostname.
pub const ENV_INSTANCE: &str = "SERVICENOW_INSTANCE";
/// Environment variable holding the basic-auth username.
pub const ENV_USERNAME: &str = "SERVICENOW_USERNAME";
/// Environment variable holding the basic-auth password.
pub const ENV_PASSWORD: &str = "SERVICENOW_PASSWORD";
/// Environment variable holding an OAuth bearer token.
pub const ENV_OAUTH_TOKEN: &str = "SERVICENOW_OAUTH_TOKEN";

/// Authentication mode for a client instance.
///
/// A tagged choice resolved once at construction; the client keeps it
/// immutable for its entire lifetime. When both a token and a
/// username/password pair are supplied, the token takes precedence.
#[derive(Clone)]
pub enum Credential {
    /// HTTP Basic authentication, applied per request.
    Basic {
        /// Basic-auth username.
        username: String,
        /// Basic-auth password. Never logged.
        password: String,
    },
    /// Bearer token authentication, installed once into the default
    /// `Authorization` header.
    Bearer {
        /// OAuth token. Never logged.
        token: String,
    },
}

impl Credential {
    /// Resolves optional credential parts into a concrete mode.
    ///
    /// A token wins over a username/password pair. Supplying neither a
    /// token nor a complete pair fails with `RimeError::Config`.
    ///
    /// # Errors
    ///
    /// Returns `RimeError::Config` if no usable credential is supplied.
    pub fn resolve(
        username: Option<String>,
        password: Option<String>,
        oauth_token: Option<String>,
    ) -> Result<Self, RimeError> {
        if let Some(token) = oauth_token {
            return Ok(Credential::Bearer { token });
        }
        match (username, password) {
            (Some(username), Some(password)) => Ok(Credential::Basic { username, password }),
            _ => Err(RimeError::invalid_config(
                "either (username, password) or an oauth token must be provided",
            )),
        }
    }

    /// Returns the secret part of the credential, for sanitizing
    /// error messages before logging. Never log this value directly.
    pub(crate) fn secret(&self) -> &str {
        match self {
            Credential::Basic { password, .. } => password,
            Credential::Bearer { token } => token,
        }
    }
}

// Manual Debug so a stray `{:?}` can never print a secret.
impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Credential::Basic { username, .. } => f
                .debug_struct("Basic")
                .field("username", username)
                .field("password", &"[REDACTED]")
                .finish(),
            Credential::Bearer { .. } => f
                .debug_struct("Bearer")
                .field("token", &"[REDACTED]")
                .finish(),
        }
    }
}

/// Configuration for connecting to a ServiceNow instance.
///
/// The instance is a bare hostname (e.g. `example.service-now.com`);
/// the client builds `https://<instance>/api/now` from it.
#[derive(Clone)]
pub struct Config {
    /// Instance hostname.
    pub instance: String,

    /// Resolved authentication mode.
    /// Secrets inside must never be logged.
    pub credential: Credential,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `SERVICENOW_INSTANCE`: instance hostname (required)
    /// - `SERVICENOW_USERNAME` / `SERVICENOW_PASSWORD`: basic auth pair
    /// - `SERVICENOW_OAUTH_TOKEN`: bearer token (takes precedence)
    ///
    /// # Errors
    ///
    /// Returns `RimeError::Config` if the instance is missing or no
    /// credential is supplied, or if values fail validation.
    ///
    /// # Example
    ///
    /// ```ignore
    /// dotenvy::dotenv().ok();
    /// let config = Config::from_env()?;
    /// ```
    pub fn from_env() -> Result<Self, RimeError> {
        let instance = Self::get_required_env(ENV_INSTANCE)?;
        let instance = Self::validate_instance(instance)?;

        let username = Self::get_optional_env(ENV_USERNAME);
        let password = Self::get_optional_env(ENV_PASSWORD);
        let oauth_token = Self::get_optional_env(ENV_OAUTH_TOKEN);

        if let Some(secret) = password.as_deref().or(oauth_token.as_deref()) {
            Self::validate_secret(secret)?;
        }

        let credential = Credential::resolve(username, password, oauth_token)?;

        Ok(Config {
            instance,
            credential,
        })
    }

    /// Gets a required environment variable, returning an error if missing or empty.
    fn get_required_env(name: &str) -> Result<String, RimeError> {
        env::var(name)
            .map_err(|_| RimeError::missing_env(name))
            .and_then(|value| {
                if value.trim().is_empty() {
                    Err(RimeError::missing_env(name))
                } else {
                    Ok(value)
                }
            })
    }

    /// Gets an optional environment variable, treating empty as absent.
    fn get_optional_env(name: &str) -> Option<String> {
        env::var(name).ok().filter(|v| !v.trim().is_empty())
    }

    /// Validates the instance value is a bare hostname, not a URL.
    fn validate_instance(instance: String) -> Result<String, RimeError> {
        let instance = instance.trim().trim_end_matches('/').to_string();

        if instance.contains("://") {
            return Err(RimeError::invalid_config(
                "SERVICENOW_INSTANCE must be a bare hostname, not a URL",
            ));
        }
        if instance.is_empty() {
            return Err(RimeError::missing_env(ENV_INSTANCE));
        }

        Ok(instance)
    }

    /// Validates a secret is not a placeholder value.
    fn validate_secret(secret: &str) -> Result<(), RimeError> {
        let lower = secret.to_lowercase();
        let placeholder_patterns = ["your_password", "your_token", "placeholder", "changeme"];

        for pattern in placeholder_patterns {
            if lower.contains(pattern) {
                return Err(RimeError::invalid_config(
                    "credential appears to be a placeholder value",
                ));
            }
        }

        Ok(())
    }
}
