//! Rule service - the repository surface over the rules endpoint
//!
//! Orchestrates listing, creation and deletion of stream rules. Every
//! network-performing operation funnels through [`RuleService::bulk`],
//! which issues exactly one POST per batch regardless of how many add and
//! delete entries are combined.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::adapters::http::HttpTransport;
use crate::domain::result::Result;
use crate::domain::Rule;
use crate::ports::RulesTransport;
use crate::wire::{self, BulkOperations, BulkOutcome};

/// Collection-level operations on the remote rule set.
///
/// Holds the transport capability bound once at construction; there is no
/// process-wide state. Clone the `Arc` to share one binding across callers.
pub struct RuleService {
    transport: Arc<dyn RulesTransport>,
}

impl RuleService {
    /// Create a service over an already-bound transport.
    pub fn new(transport: Arc<dyn RulesTransport>) -> Self {
        Self { transport }
    }

    /// Convenience: bind a bearer-token HTTP transport and wrap it.
    pub fn with_bearer_token(bearer_token: &str) -> Result<Self> {
        let transport = HttpTransport::new(bearer_token)?;
        Ok(Self::new(Arc::new(transport)))
    }

    /// List all rules currently configured server-side.
    ///
    /// A response without rules is a normal state and yields an empty
    /// vector, never an error.
    pub fn all(&self) -> Result<Vec<Rule>> {
        let body = self.transport.fetch_rules()?;
        wire::decode_listing(body)
    }

    /// Construct a rule and create it server-side in one step.
    ///
    /// Returns the rule with its id populated on success.
    pub fn create(&self, value: &str, tag: Option<&str>) -> Result<Rule> {
        let rule = match tag {
            Some(tag) => Rule::tagged(value, tag),
            None => Rule::new(value),
        };
        self.add(rule)
    }

    /// Create a single rule, returning it annotated with the server id.
    ///
    /// The id is taken from the response entry whose value echoes the
    /// submitted rule; when the server does not echo values the first
    /// entry is trusted, matching the single-element request.
    pub fn add(&self, rule: Rule) -> Result<Rule> {
        let outcome = self.add_bulk(std::slice::from_ref(&rule))?;

        let id = outcome
            .rules
            .iter()
            .find(|echoed| echoed.value() == rule.value())
            .or_else(|| outcome.rules.first())
            .and_then(|echoed| echoed.id())
            .map(str::to_string);

        match id {
            Some(id) => Ok(rule.with_id(id)),
            None => Ok(rule),
        }
    }

    /// Create several rules in one network exchange.
    pub fn add_bulk(&self, rules: &[Rule]) -> Result<BulkOutcome> {
        self.bulk(BulkOperations::new().add(rules.iter().cloned()))
    }

    /// Delete a single rule server-side.
    ///
    /// The local value is left untouched; it simply goes stale.
    pub fn delete(&self, rule: &Rule) -> Result<BulkOutcome> {
        self.delete_bulk(std::slice::from_ref(rule))
    }

    /// Delete several rules in one network exchange.
    ///
    /// An empty input short-circuits to an empty outcome without any
    /// network call. Rules that were never created are dropped from the
    /// payload at encode time.
    pub fn delete_bulk(&self, rules: &[Rule]) -> Result<BulkOutcome> {
        if rules.is_empty() {
            return Ok(BulkOutcome::default());
        }
        self.bulk(BulkOperations::new().delete(rules.iter().cloned()))
    }

    /// Execute a batch of add/delete operations as one POST.
    ///
    /// This is the single network-performing primitive underlying the
    /// other write operations; callers that pre-group rules get real
    /// batching for free.
    pub fn bulk(&self, operations: BulkOperations) -> Result<BulkOutcome> {
        let body = operations.encode()?;
        debug!("submitting bulk rule operations");

        let response = self.transport.submit_bulk(&body)?;
        let outcome = wire::decode_bulk(response);

        if let Err(err) = &outcome {
            warn!(error = %err, "bulk rule operation rejected");
        }
        outcome
    }
}
