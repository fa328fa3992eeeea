//! Service layer - business logic orchestration
//!
//! Services coordinate domain logic and port interactions.

mod rules;

pub use rules::RuleService;
