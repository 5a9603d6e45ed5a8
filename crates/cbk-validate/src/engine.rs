use cbk_model::{DecodedRecord, RecordWarning};
use rust_decimal::Decimal;
use tracing::trace;

use crate::config::RuleConfig;
use crate::error::{RuleConfigError, RuleError};
use crate::rules::Rule;

/// Ordered rule list applied to every decoded record.
///
/// Rules run in registration order and each sees the changes made by the ones
/// before it. The first rejection stops the chain for that record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleEngine {
    rules: Vec<Rule>,
}

impl RuleEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an engine from configuration entries, failing on the first
    /// entry that does not resolve.
    pub fn from_configs(configs: &[RuleConfig]) -> Result<Self, RuleConfigError> {
        let rules = configs
            .iter()
            .enumerate()
            .map(|(index, config)| Rule::from_config(index, config))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { rules })
    }

    /// The customer-record rule set: status must be A, N or R, the name is
    /// upper-cased, `is_active` is derived from status A, and balances below
    /// -500.00 raise a warning quoting the customer id.
    pub fn reference_rules() -> Self {
        Self::new()
            .with_rule(Rule::AllowedSet {
                field: "status_code".to_string(),
                allowed: vec!["A".to_string(), "N".to_string(), "R".to_string()],
            })
            .with_rule(Rule::Uppercase {
                field: "customer_name".to_string(),
            })
            .with_rule(Rule::DeriveFlag {
                field: "status_code".to_string(),
                equals: "A".to_string(),
                target: "is_active".to_string(),
            })
            .with_rule(Rule::ThresholdWarning {
                field: "account_balance".to_string(),
                below: Decimal::new(-50000, 2),
                id_field: Some("customer_id".to_string()),
            })
    }

    pub fn push(&mut self, rule: Rule) {
        self.rules.push(rule);
    }

    #[must_use]
    pub fn with_rule(mut self, rule: Rule) -> Self {
        self.push(rule);
        self
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn to_configs(&self) -> Vec<RuleConfig> {
        self.rules.iter().map(Rule::to_config).collect()
    }

    /// Run every rule over `record`.
    ///
    /// On success returns the warnings raised along the way. On failure the
    /// record may already hold changes from earlier rules and should be
    /// discarded; warnings raised before the failure are dropped with it.
    pub fn apply(
        &self,
        record: &mut DecodedRecord,
        line_number: usize,
    ) -> Result<Vec<RecordWarning>, RuleError> {
        let mut warnings = Vec::new();
        for rule in &self.rules {
            trace!(line_number, rule = rule.kind(), field = rule.field(), "applying rule");
            rule.apply(record, line_number, &mut warnings)?;
        }
        Ok(warnings)
    }
}

impl FromIterator<Rule> for RuleEngine {
    fn from_iter<I: IntoIterator<Item = Rule>>(iter: I) -> Self {
        Self {
            rules: iter.into_iter().collect(),
        }
    }
}
