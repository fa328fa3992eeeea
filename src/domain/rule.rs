//! Filter rule domain entity

use serde::Serialize;

/// A single filter criterion governing which streamed items match.
///
/// A rule is an immutable value: the expression and tag are fixed at
/// construction, and the server-assigned id is attached by returning a new
/// value from [`Rule::with_id`]. A rule with `id == None` has never been
/// created server-side (or was reconstructed before creation); a populated
/// id means the rule existed server-side when this process last heard about
/// it. Deleting a rule does not clear the local fields - the value simply
/// goes stale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rule {
    /// Server-assigned identifier, None until created
    id: Option<String>,
    /// Filter expression
    value: String,
    /// Human-readable label, defaults to the expression
    tag: String,
}

impl Rule {
    /// Create a rule whose tag defaults to its value.
    ///
    /// The default lets callers track individual matches without inventing
    /// labels; use [`Rule::tagged`] to group several rules under one tag.
    pub fn new(value: impl Into<String>) -> Self {
        let value = value.into();
        let tag = value.clone();
        Self {
            id: None,
            value,
            tag,
        }
    }

    /// Create a rule with an explicit tag.
    pub fn tagged(value: impl Into<String>, tag: impl Into<String>) -> Self {
        Self {
            id: None,
            value: value.into(),
            tag: tag.into(),
        }
    }

    /// Return this rule annotated with a server-assigned id.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Server-assigned id, if the rule has been created or listed.
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// The filter expression.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// The human-readable label.
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Whether the rule carries a server-assigned id.
    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }
}
