//! Blocking HTTP transport for the rules endpoint
//!
//! Binds the bearer token once at construction and performs the two
//! control-plane exchanges (GET listing, POST bulk). Retry, backoff and
//! connection pooling stay inside the underlying `reqwest` client.

use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde_json::Value as JsonValue;
use tracing::debug;
use url::Url;

use crate::domain::result::{Error, Result};
use crate::ports::RulesTransport;

/// Default production rules endpoint (Twitter API v2 filtered stream)
const PRODUCTION_RULES_URL: &str = "https://api.twitter.com/2/tweets/search/stream/rules";

/// Environment variable to override the rules endpoint.
/// Set this to point at a staging or mock server for testing.
pub const RULES_ENDPOINT_ENV: &str = "STREAM_RULES_ENDPOINT";

/// Get the rules endpoint, checking the environment variable first
pub fn get_endpoint() -> String {
    std::env::var(RULES_ENDPOINT_ENV).unwrap_or_else(|_| PRODUCTION_RULES_URL.to_string())
}

/// Authenticated blocking HTTP transport
#[derive(Debug)]
pub struct HttpTransport {
    client: Client,
    endpoint: String,
}

impl HttpTransport {
    /// Create a transport that attaches `Authorization: Bearer <token>` to
    /// every request.
    ///
    /// Uses the `STREAM_RULES_ENDPOINT` environment variable if set,
    /// otherwise the production endpoint. An empty token is rejected up
    /// front as a configuration error rather than failing on first use.
    pub fn new(bearer_token: &str) -> Result<Self> {
        Self::new_with_endpoint(bearer_token, &get_endpoint())
    }

    /// Create a transport against a custom endpoint.
    ///
    /// Prefer `new()` with the `STREAM_RULES_ENDPOINT` env var for testing.
    pub fn new_with_endpoint(bearer_token: &str, endpoint: &str) -> Result<Self> {
        if bearer_token.is_empty() {
            return Err(Error::config("bearer token cannot be empty"));
        }

        let endpoint = validate_endpoint(endpoint)?;

        let mut headers = HeaderMap::new();
        let mut auth = HeaderValue::from_str(&format!("Bearer {bearer_token}"))
            .map_err(|_| Error::config("bearer token contains invalid header characters"))?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);

        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .default_headers(headers)
            .build()
            .map_err(|e| Error::transport(format!("failed to create HTTP client: {e}")))?;

        Ok(Self { client, endpoint })
    }

    /// Wrap a preconfigured client.
    ///
    /// The caller is responsible for authentication: any credential headers
    /// must already be bound into the client (for example via
    /// `default_headers`). This is the injection point for callers that
    /// manage their own pooling, TLS or proxy setup.
    pub fn from_client(client: Client, endpoint: &str) -> Result<Self> {
        let endpoint = validate_endpoint(endpoint)?;
        Ok(Self { client, endpoint })
    }

    /// Map request errors to user-friendly messages
    fn map_request_error(&self, error: reqwest::Error) -> Error {
        if error.is_timeout() {
            Error::transport("Connection timed out after 30 seconds")
        } else if error.is_connect() {
            Error::transport("Unable to connect to the rules endpoint")
        } else {
            Error::transport(format!("Request failed: {error}"))
        }
    }

    /// Check response status and return appropriate errors
    fn check_response_status(&self, response: &reqwest::blocking::Response) -> Result<()> {
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        match status.as_u16() {
            401 => Err(Error::transport(
                "Authentication failed. The bearer token may be invalid or revoked.",
            )),
            403 => Err(Error::transport(
                "Access denied. The token may lack filtered stream permissions.",
            )),
            429 => Err(Error::transport(
                "Rate limit exceeded. Wait a moment and try again.",
            )),
            code => Err(Error::transport(format!("Rules API error: HTTP {code}"))),
        }
    }
}

impl RulesTransport for HttpTransport {
    fn fetch_rules(&self) -> Result<JsonValue> {
        debug!(endpoint = %self.endpoint, "fetching rule set");

        let response = self
            .client
            .get(&self.endpoint)
            .send()
            .map_err(|e| self.map_request_error(e))?;

        self.check_response_status(&response)?;

        response
            .json()
            .map_err(|e| Error::transport(format!("Failed to read listing response: {e}")))
    }

    fn submit_bulk(&self, body: &JsonValue) -> Result<JsonValue> {
        debug!(endpoint = %self.endpoint, "submitting bulk rule payload");

        let response = self
            .client
            .post(&self.endpoint)
            .json(body)
            .send()
            .map_err(|e| self.map_request_error(e))?;

        self.check_response_status(&response)?;

        response
            .json()
            .map_err(|e| Error::transport(format!("Failed to read bulk response: {e}")))
    }
}

/// Validate the endpoint is a well-formed http(s) URL, trimming any
/// trailing slash.
fn validate_endpoint(endpoint: &str) -> Result<String> {
    let parsed =
        Url::parse(endpoint).map_err(|e| Error::config(format!("invalid endpoint URL: {e}")))?;

    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return Err(Error::config(format!(
            "endpoint must be http or https, got '{}'",
            parsed.scheme()
        )));
    }

    Ok(endpoint.trim_end_matches('/').to_string())
}
