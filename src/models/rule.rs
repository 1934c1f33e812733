// Aggregation rules as declared in the rule document.

use serde::Deserialize;

/// One rule record as it appears under an object name in the rule document.
/// Both camelCase and PascalCase field names are accepted.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleRecord {
    #[serde(alias = "Counters")]
    pub counters: Vec<String>,
    #[serde(alias = "AggregationExpression")]
    pub aggregation_expression: String,
    #[serde(default, alias = "InstanceSuffix")]
    pub instance_suffix: String,
}

/// A rule bound to the object it was declared under.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregationRule {
    pub source_object: String,
    pub counters: Vec<String>,
    pub expression: String,
    pub instance_suffix: String,
}

impl AggregationRule {
    pub fn new(
        source_object: impl Into<String>,
        counters: impl IntoIterator<Item = impl Into<String>>,
        expression: impl Into<String>,
        instance_suffix: impl Into<String>,
    ) -> Self {
        Self {
            source_object: source_object.into(),
            counters: counters.into_iter().map(Into::into).collect(),
            expression: expression.into(),
            instance_suffix: instance_suffix.into(),
        }
    }

    pub fn from_record(source_object: &str, record: RuleRecord) -> Self {
        Self {
            source_object: source_object.to_string(),
            counters: record.counters,
            expression: record.aggregation_expression,
            instance_suffix: record.instance_suffix,
        }
    }
}
