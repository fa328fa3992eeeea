//! Stream Rules - client for the filtered stream rules control-plane API
//!
//! This crate manages the rule set that governs a filtered real-time stream,
//! following hexagonal architecture:
//!
//! - **domain**: Core value types (Rule) and the error taxonomy
//! - **ports**: Trait definitions for external dependencies (RulesTransport)
//! - **services**: Business logic orchestration (RuleService)
//! - **adapters**: Concrete implementations (blocking HTTP transport)
//!
//! The wire module encodes batched add/delete operations into a single
//! request body and decodes the response, including API-reported errors.

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;
pub mod wire;

// Re-export commonly used types at crate root
pub use adapters::http::HttpTransport;
pub use domain::result::{Error, Result};
pub use domain::Rule;
pub use ports::RulesTransport;
pub use services::RuleService;
pub use wire::{BulkOperations, BulkOutcome, BulkSummary};
