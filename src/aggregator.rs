// Aggregator unit: one compiled rule applied to a batch of same-timestamp samples.

use std::collections::{HashMap, HashSet};

use crate::error::Result;
use crate::expression::Expression;
use crate::models::{AggregationRule, CounterSample};

/// Compiled form of one [`AggregationRule`]. Immutable once built.
#[derive(Debug, Clone)]
pub struct AggregatorUnit {
    source_object: String,
    counters: HashSet<String>,
    instance_suffix: String,
    expression: Expression,
}

impl AggregatorUnit {
    /// Compiles the rule's expression. Counter-set validation is the caller's job.
    pub fn new(rule: &AggregationRule) -> Result<Self> {
        Ok(Self {
            source_object: rule.source_object.clone(),
            counters: rule.counters.iter().cloned().collect(),
            instance_suffix: rule.instance_suffix.clone(),
            expression: Expression::compile(&rule.expression)?,
        })
    }

    pub fn source_object(&self) -> &str {
        &self.source_object
    }

    pub fn expression(&self) -> &Expression {
        &self.expression
    }

    fn matches(&self, sample: &CounterSample) -> bool {
        sample.object == self.source_object && self.counters.contains(&sample.counter)
    }

    /// Emits one derived sample per matched counter, in first-seen counter order.
    /// `batch` must share one timestamp. Returns nothing when no sample matches.
    pub fn aggregate(&self, batch: &[CounterSample]) -> Vec<CounterSample> {
        let mut groups: Vec<Vec<&CounterSample>> = Vec::new();
        let mut index: HashMap<&str, usize> = HashMap::new();
        for sample in batch.iter().filter(|s| self.matches(s)) {
            let slot = *index.entry(sample.counter.as_str()).or_insert_with(|| {
                groups.push(Vec::new());
                groups.len() - 1
            });
            groups[slot].push(sample);
        }

        groups
            .into_iter()
            .map(|group| {
                let first = group[0];
                let values: Vec<f64> = group.iter().map(|s| s.value).collect();
                CounterSample {
                    timestamp: first.timestamp,
                    object: self.source_object.clone(),
                    counter: first.counter.clone(),
                    instance: format!("{}{}", first.instance, self.instance_suffix),
                    value: self.expression.evaluate(&values),
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ts() -> chrono::NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    #[test]
    fn groups_keep_first_seen_counter_order() {
        let rule = AggregationRule::new("Disk", ["ReadBytes", "WriteBytes"], "sum(values)", "_T");
        let unit = AggregatorUnit::new(&rule).unwrap();
        let batch = vec![
            CounterSample::new(ts(), "Disk", "WriteBytes", "C:", 1.0),
            CounterSample::new(ts(), "Disk", "ReadBytes", "C:", 2.0),
            CounterSample::new(ts(), "Disk", "WriteBytes", "D:", 3.0),
        ];
        let out = unit.aggregate(&batch);
        let counters: Vec<&str> = out.iter().map(|s| s.counter.as_str()).collect();
        assert_eq!(counters, vec!["WriteBytes", "ReadBytes"]);
        assert_eq!(out[0].value, 4.0);
        assert_eq!(out[0].instance, "C:_T");
    }
}
