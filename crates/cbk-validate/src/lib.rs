//! Validation and derivation rules for decoded records.
//!
//! A [`RuleEngine`] holds an ordered list of [`Rule`]s. Each rule can reject
//! the record, change it in place, or raise a non-fatal warning.

pub mod config;
pub mod engine;
pub mod error;
pub mod rules;

pub use config::RuleConfig;
pub use engine::RuleEngine;
pub use error::{RuleConfigError, RuleError, ValidationError};
pub use rules::Rule;
