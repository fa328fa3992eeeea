//! Adapter implementations
//!
//! Adapters implement the port traits with concrete technologies:
//! - Blocking reqwest HTTP client for the RulesTransport port
//! - Mock rules API server for testing

pub mod http;

#[cfg(test)]
pub mod mock;
