//! Data-driven rule configuration.
//!
//! Rules are described as a JSON list, one object per rule, tagged by `kind`:
//!
//! ```json
//! [
//!   {"kind": "allowed-set", "field": "status_code", "allowed": ["A", "N", "R"]},
//!   {"kind": "uppercase", "field": "customer_name"},
//!   {"kind": "derive-flag", "field": "status_code", "equals": "A", "target": "is_active"},
//!   {"kind": "threshold-warning", "field": "account_balance", "below": "-500.00", "id_field": "customer_id"}
//! ]
//! ```

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case", deny_unknown_fields)]
pub enum RuleConfig {
    /// Reject records whose `field` is missing or not one of `allowed`.
    AllowedSet { field: String, allowed: Vec<String> },

    /// Upper-case a text field in place.
    Uppercase { field: String },

    /// Add boolean `target`: whether `field` equals `equals`.
    DeriveFlag {
        field: String,
        equals: String,
        target: String,
    },

    /// Warn, without rejecting, when the numeric `field` is below `below`.
    /// `id_field` names a field quoted in the warning for context.
    ThresholdWarning {
        field: String,
        below: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        id_field: Option<String>,
    },
}

impl RuleConfig {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::AllowedSet { .. } => "allowed-set",
            Self::Uppercase { .. } => "uppercase",
            Self::DeriveFlag { .. } => "derive-flag",
            Self::ThresholdWarning { .. } => "threshold-warning",
        }
    }
}
