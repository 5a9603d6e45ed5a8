//! Resolved rules and their per-record behaviour.

use std::str::FromStr;

use cbk_model::{DecodedRecord, FieldValue, RecordWarning};
use rust_decimal::Decimal;
use tracing::warn;

use crate::config::RuleConfig;
use crate::error::{RuleConfigError, RuleError, ValidationError};

/// A validated rule, ready to run against records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rule {
    AllowedSet {
        field: String,
        allowed: Vec<String>,
    },
    Uppercase {
        field: String,
    },
    DeriveFlag {
        field: String,
        equals: String,
        target: String,
    },
    ThresholdWarning {
        field: String,
        below: Decimal,
        id_field: Option<String>,
    },
}

impl Rule {
    /// Resolve the `index`-th configuration entry.
    pub fn from_config(index: usize, config: &RuleConfig) -> Result<Self, RuleConfigError> {
        let kind = config.kind();
        let field = match config {
            RuleConfig::AllowedSet { field, .. }
            | RuleConfig::Uppercase { field }
            | RuleConfig::DeriveFlag { field, .. }
            | RuleConfig::ThresholdWarning { field, .. } => field.trim(),
        };
        if field.is_empty() {
            return Err(RuleConfigError::EmptyField { index, kind });
        }
        let field = field.to_string();
        match config {
            RuleConfig::AllowedSet { allowed, .. } => {
                if allowed.is_empty() {
                    return Err(RuleConfigError::EmptyAllowedSet { index });
                }
                Ok(Self::AllowedSet {
                    field,
                    allowed: allowed.clone(),
                })
            }
            RuleConfig::Uppercase { .. } => Ok(Self::Uppercase { field }),
            RuleConfig::DeriveFlag { equals, target, .. } => {
                if target.trim().is_empty() {
                    return Err(RuleConfigError::EmptyTarget { index });
                }
                Ok(Self::DeriveFlag {
                    field,
                    equals: equals.clone(),
                    target: target.trim().to_string(),
                })
            }
            RuleConfig::ThresholdWarning {
                below, id_field, ..
            } => {
                let below = Decimal::from_str(below.trim()).map_err(|_| {
                    RuleConfigError::InvalidThreshold {
                        index,
                        value: below.clone(),
                    }
                })?;
                Ok(Self::ThresholdWarning {
                    field,
                    below,
                    id_field: id_field.clone().filter(|name| !name.trim().is_empty()),
                })
            }
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::AllowedSet { .. } => "allowed-set",
            Self::Uppercase { .. } => "uppercase",
            Self::DeriveFlag { .. } => "derive-flag",
            Self::ThresholdWarning { .. } => "threshold-warning",
        }
    }

    /// The field the rule reads.
    pub fn field(&self) -> &str {
        match self {
            Self::AllowedSet { field, .. }
            | Self::Uppercase { field }
            | Self::DeriveFlag { field, .. }
            | Self::ThresholdWarning { field, .. } => field,
        }
    }

    /// Inverse of [`Rule::from_config`].
    pub fn to_config(&self) -> RuleConfig {
        match self {
            Self::AllowedSet { field, allowed } => RuleConfig::AllowedSet {
                field: field.clone(),
                allowed: allowed.clone(),
            },
            Self::Uppercase { field } => RuleConfig::Uppercase {
                field: field.clone(),
            },
            Self::DeriveFlag {
                field,
                equals,
                target,
            } => RuleConfig::DeriveFlag {
                field: field.clone(),
                equals: equals.clone(),
                target: target.clone(),
            },
            Self::ThresholdWarning {
                field,
                below,
                id_field,
            } => RuleConfig::ThresholdWarning {
                field: field.clone(),
                below: below.to_string(),
                id_field: id_field.clone(),
            },
        }
    }

    /// Run the rule. Warnings are appended to `warnings`; rejection and type
    /// mismatches come back as errors.
    pub fn apply(
        &self,
        record: &mut DecodedRecord,
        line_number: usize,
        warnings: &mut Vec<RecordWarning>,
    ) -> Result<(), RuleError> {
        match self {
            Self::AllowedSet { field, allowed } => {
                let Some(value) = record.get(field) else {
                    return Err(self.reject(format!("Missing required field '{field}'")));
                };
                let text = value.to_string();
                if allowed.iter().any(|candidate| *candidate == text) {
                    Ok(())
                } else {
                    Err(self.reject(format!("Invalid {field} '{text}'")))
                }
            }
            Self::Uppercase { field } => match record.get_mut(field) {
                None => Ok(()),
                Some(FieldValue::Text(text)) => {
                    *text = text.to_uppercase();
                    Ok(())
                }
                Some(other) => Err(self.mismatch("text", other)),
            },
            Self::DeriveFlag {
                field,
                equals,
                target,
            } => {
                let flag = record
                    .get(field)
                    .is_some_and(|value| value.to_string() == *equals);
                record.insert(target.clone(), flag);
                Ok(())
            }
            Self::ThresholdWarning {
                field,
                below,
                id_field,
            } => {
                let Some(value) = record.get(field) else {
                    return Ok(());
                };
                let Some(amount) = value.as_decimal() else {
                    return Err(self.mismatch("a number", value));
                };
                if amount >= *below {
                    return Ok(());
                }
                let context = id_field
                    .as_deref()
                    .and_then(|name| record.get(name).map(|id| format!("{name} {id}: ")))
                    .unwrap_or_default();
                let message = format!("{context}{field} {amount} is below {below}");
                warn!(line_number, rule = self.kind(), field = %field, "{message}");
                warnings.push(RecordWarning {
                    line_number,
                    rule: self.kind().to_string(),
                    field: field.clone(),
                    message,
                });
                Ok(())
            }
        }
    }

    fn reject(&self, message: String) -> RuleError {
        RuleError::Validation(ValidationError {
            rule: self.kind(),
            field: self.field().to_string(),
            message,
        })
    }

    fn mismatch(&self, expected: &'static str, found: &FieldValue) -> RuleError {
        RuleError::TypeMismatch {
            rule: self.kind(),
            field: self.field().to_string(),
            expected,
            found: found.type_name(),
        }
    }
}
