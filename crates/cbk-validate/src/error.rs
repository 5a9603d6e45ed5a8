use thiserror::Error;

/// A rule rejected the record. The record is reported as a failed line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ValidationError {
    pub rule: &'static str,
    pub field: String,
    pub message: String,
}

/// Outcome of a rule that did not accept the record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The record holds a value the rule was never meant to see, typically a
    /// rule pointed at a field of the wrong type.
    #[error("rule '{rule}' expected {expected} in field '{field}', found {found}")]
    TypeMismatch {
        rule: &'static str,
        field: String,
        expected: &'static str,
        found: &'static str,
    },
}

impl RuleError {
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

/// A rule configuration entry that cannot be turned into a rule.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleConfigError {
    #[error("rule #{index} ({kind}): field name is empty")]
    EmptyField { index: usize, kind: &'static str },

    #[error("rule #{index} (allowed-set): no allowed values given")]
    EmptyAllowedSet { index: usize },

    #[error("rule #{index} (derive-flag): target field name is empty")]
    EmptyTarget { index: usize },

    #[error("rule #{index} (threshold-warning): '{value}' is not a decimal number")]
    InvalidThreshold { index: usize, value: String },
}
