//! Wire format for bulk rule operations
//!
//! Builds the single request body for a batch of add/delete operations and
//! decodes the single response, including the API's `errors` array and the
//! `meta.summary` counters.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::domain::result::{Error, Result};
use crate::domain::Rule;

// =============================================================================
// Pending operations
// =============================================================================

/// An ephemeral batch of pending add/delete operations.
///
/// Built per request and consumed by [`RuleService::bulk`]; never persisted.
///
/// [`RuleService::bulk`]: crate::services::RuleService::bulk
#[derive(Debug, Clone, Default)]
pub struct BulkOperations {
    add: Vec<Rule>,
    delete: Vec<Rule>,
}

impl BulkOperations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue rules for creation.
    pub fn add(mut self, rules: impl IntoIterator<Item = Rule>) -> Self {
        self.add.extend(rules);
        self
    }

    /// Queue rules for deletion.
    ///
    /// Rules that were never created (no id) are kept here but silently
    /// dropped at encode time: deleting a never-created rule is a no-op,
    /// not an error.
    pub fn delete(mut self, rules: impl IntoIterator<Item = Rule>) -> Self {
        self.delete.extend(rules);
        self
    }

    /// Whether the batch contains no operations at all.
    pub fn is_empty(&self) -> bool {
        self.add.is_empty() && self.delete.is_empty()
    }

    /// Encode the batch into the request body.
    ///
    /// Add entries serialize as `{value, tag}` - the server assigns ids.
    /// Delete entries collapse to their id list, skipping unpersisted rules.
    /// A set with no entries contributes no key.
    pub fn encode(&self) -> Result<JsonValue> {
        let mut body = serde_json::Map::new();

        if !self.add.is_empty() {
            let entries: Vec<AddEntry<'_>> = self
                .add
                .iter()
                .map(|rule| AddEntry {
                    value: rule.value(),
                    tag: rule.tag(),
                })
                .collect();
            body.insert("add".to_string(), serde_json::to_value(entries)?);
        }

        if !self.delete.is_empty() {
            let ids: Vec<String> = self
                .delete
                .iter()
                .filter_map(|rule| rule.id().map(str::to_string))
                .collect();
            body.insert("delete".to_string(), serde_json::to_value(DeleteIds { ids })?);
        }

        Ok(JsonValue::Object(body))
    }
}

/// Add entry on the wire: no id, the server assigns it
#[derive(Serialize)]
struct AddEntry<'a> {
    value: &'a str,
    tag: &'a str,
}

#[derive(Serialize)]
struct DeleteIds {
    ids: Vec<String>,
}

// =============================================================================
// Response models (matching the filtered stream rules API)
// =============================================================================

/// Rule entry as returned by the API (listing and bulk `data`)
#[derive(Debug, Clone, Deserialize)]
struct RuleData {
    id: String,
    value: String,
    #[serde(default)]
    tag: Option<String>,
}

impl RuleData {
    /// Reconstruct a domain rule; a missing tag falls back to the value.
    fn into_rule(self) -> Rule {
        let rule = match self.tag {
            Some(tag) => Rule::tagged(self.value, tag),
            None => Rule::new(self.value),
        };
        rule.with_id(self.id)
    }
}

/// API-reported logical error object
#[derive(Debug, Clone, Deserialize)]
struct ApiError {
    #[serde(default)]
    title: String,
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    details: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct ListingResponse {
    #[serde(default)]
    data: Vec<RuleData>,
    #[serde(default)]
    errors: Vec<ApiError>,
}

#[derive(Debug, Clone, Deserialize)]
struct BulkResponse {
    #[serde(default)]
    data: Vec<RuleData>,
    #[serde(default)]
    errors: Vec<ApiError>,
    meta: Option<BulkMeta>,
}

#[derive(Debug, Clone, Deserialize)]
struct BulkMeta {
    summary: Option<BulkSummary>,
}

/// Per-request counters from `meta.summary`.
///
/// Present on bulk responses from the real API; absent fields default to
/// zero so partial summaries still decode.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct BulkSummary {
    #[serde(default)]
    pub created: u64,
    #[serde(default)]
    pub not_created: u64,
    #[serde(default)]
    pub deleted: u64,
    #[serde(default)]
    pub not_deleted: u64,
    #[serde(default)]
    pub valid: u64,
    #[serde(default)]
    pub invalid: u64,
}

/// Decoded result of one successful bulk exchange.
#[derive(Debug, Clone, Default)]
pub struct BulkOutcome {
    /// Rules echoed back by the server, ids populated
    pub rules: Vec<Rule>,
    /// Request counters, when the server sent them
    pub summary: Option<BulkSummary>,
}

// =============================================================================
// Decoding
// =============================================================================

/// Surface the first API-reported error, if any.
///
/// Only the first error is reported; the rest are dropped. This mirrors the
/// upstream client behaviour and keeps the failure a single synchronous
/// path. Multiple errors in one response are not aggregated.
fn first_error(errors: Vec<ApiError>) -> Option<Error> {
    errors.into_iter().next().map(|err| {
        let detail = err.details.into_iter().next().unwrap_or_default();
        Error::remote(err.title, detail, err.kind)
    })
}

/// Decode a listing response into the current rule set.
///
/// A response without a `data` key is a normal "no rules configured" state
/// and yields an empty vector.
pub(crate) fn decode_listing(body: JsonValue) -> Result<Vec<Rule>> {
    let listing: ListingResponse = serde_json::from_value(body)?;
    if let Some(err) = first_error(listing.errors) {
        return Err(err);
    }
    Ok(listing.data.into_iter().map(RuleData::into_rule).collect())
}

/// Decode a bulk response into rules and summary counters.
pub(crate) fn decode_bulk(body: JsonValue) -> Result<BulkOutcome> {
    let response: BulkResponse = serde_json::from_value(body)?;
    if let Some(err) = first_error(response.errors) {
        return Err(err);
    }
    Ok(BulkOutcome {
        rules: response.data.into_iter().map(RuleData::into_rule).collect(),
        summary: response.meta.and_then(|meta| meta.summary),
    })
}
