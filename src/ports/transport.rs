//! Rules transport port
//!
//! Defines the authenticated request-execution capability the rule service
//! needs. Implementations own the connection, credentials, and any timeout
//! or retry policy; this crate never re-binds a transport after handing it
//! to a service.

use serde_json::Value as JsonValue;

use crate::domain::result::Result;

/// Authenticated access to the rules endpoint.
///
/// Exactly two exchanges exist on the control plane: fetching the current
/// rule set and submitting one batched add/delete payload. Both return the
/// raw response body; the wire module interprets it.
pub trait RulesTransport: Send + Sync {
    /// Fetch the current rule set (GET on the rules endpoint).
    fn fetch_rules(&self) -> Result<JsonValue>;

    /// Submit a batched add/delete payload (POST on the rules endpoint).
    fn submit_bulk(&self, body: &JsonValue) -> Result<JsonValue>;
}
