// Rule document loading and compilation into aggregator units.
//
// The document keeps object order as written: units run in that order, so the
// per-object rule map is read with an order-preserving visitor rather than
// through a hash or B-tree map.

use std::fmt;
use std::path::Path;

use serde::de::{self, DeserializeSeed, IgnoredAny, MapAccess, Visitor};
use serde::{Deserialize, Deserializer};
use tracing::{debug, info, instrument};

use crate::aggregator::AggregatorUnit;
use crate::error::{Error, Result};
use crate::models::{AggregationRule, RuleRecord};

/// Top-level key holding the per-object rule map.
pub const DEFAULT_SECTION: &str = "perf.aggregation.rules";

/// Parsed rules, flattened in document order (objects first, then rules within each object).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuleSet {
    rules: Vec<AggregationRule>,
}

impl RuleSet {
    pub fn from_rules(rules: Vec<AggregationRule>) -> Self {
        Self { rules }
    }

    pub fn load(path: impl AsRef<Path>, section: &str) -> Result<Self> {
        let path = path.as_ref();
        let s = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        Self::from_json_str(&s, section)
    }

    /// Parse a rule document from a string (e.g. for tests).
    pub fn from_json_str(s: &str, section: &str) -> Result<Self> {
        let mut deserializer = serde_json::Deserializer::from_str(s);
        let objects = DocumentSeed { section }
            .deserialize(&mut deserializer)
            .and_then(|objects| deserializer.end().map(|()| objects))
            .map_err(|e| Error::Config(format!("invalid rule document: {e}")))?
            .ok_or_else(|| Error::Config(format!("missing section `{section}`")))?;

        let rules = objects
            .into_iter()
            .flat_map(|(object, records)| {
                records
                    .into_iter()
                    .map(move |record| AggregationRule::from_record(&object, record))
            })
            .collect();
        Ok(Self { rules })
    }

    pub fn rules(&self) -> &[AggregationRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// Builds one aggregator unit per rule, in document order.
/// Fails on an empty or blank counter list and on any expression that does not compile.
#[instrument(skip_all, fields(rules = rule_set.len()))]
pub fn compile(rule_set: &RuleSet) -> Result<Vec<AggregatorUnit>> {
    let mut units = Vec::with_capacity(rule_set.len());
    for (index, rule) in rule_set.rules().iter().enumerate() {
        validate(rule).map_err(|msg| rule_error(rule, index, msg))?;
        let unit =
            AggregatorUnit::new(rule).map_err(|e| rule_error(rule, index, e.to_string()))?;
        debug!(
            object = %rule.source_object,
            counters = rule.counters.len(),
            expression = %rule.expression,
            suffix = %rule.instance_suffix,
            "compiled aggregator"
        );
        units.push(unit);
    }
    info!(units = units.len(), "aggregation rules compiled");
    Ok(units)
}

fn validate(rule: &AggregationRule) -> std::result::Result<(), String> {
    if rule.counters.is_empty() {
        return Err("counters must be non-empty".into());
    }
    if rule.counters.iter().any(|c| c.is_empty()) {
        return Err("counter names must be non-empty".into());
    }
    Ok(())
}

fn rule_error(rule: &AggregationRule, index: usize, msg: String) -> Error {
    Error::Config(format!(
        "rule #{} (object `{}`): {}",
        index + 1,
        rule.source_object,
        msg
    ))
}

type ObjectRules = Vec<(String, Vec<RuleRecord>)>;

/// Picks the configured section out of the top-level document, skipping everything else.
struct DocumentSeed<'a> {
    section: &'a str,
}

impl<'de> DeserializeSeed<'de> for DocumentSeed<'_> {
    type Value = Option<ObjectRules>;

    fn deserialize<D: Deserializer<'de>>(
        self,
        deserializer: D,
    ) -> std::result::Result<Self::Value, D::Error> {
        deserializer.deserialize_map(self)
    }
}

impl<'de> Visitor<'de> for DocumentSeed<'_> {
    type Value = Option<ObjectRules>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a JSON object containing the rule section")
    }

    fn visit_map<A: MapAccess<'de>>(
        self,
        mut map: A,
    ) -> std::result::Result<Self::Value, A::Error> {
        let mut found = None;
        while let Some(key) = map.next_key::<String>()? {
            if key == self.section {
                if found.is_some() {
                    return Err(de::Error::custom(format_args!(
                        "duplicate section `{}`",
                        self.section
                    )));
                }
                found = Some(map.next_value::<OrderedObjects>()?.0);
            } else {
                map.next_value::<IgnoredAny>()?;
            }
        }
        Ok(found)
    }
}

/// Object name → rule list, in document order.
struct OrderedObjects(ObjectRules);

impl<'de> Deserialize<'de> for OrderedObjects {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct ObjectsVisitor;

        impl<'de> Visitor<'de> for ObjectsVisitor {
            type Value = OrderedObjects;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of object names to rule lists")
            }

            fn visit_map<A: MapAccess<'de>>(
                self,
                mut map: A,
            ) -> std::result::Result<Self::Value, A::Error> {
                let mut objects = Vec::new();
                while let Some(entry) = map.next_entry::<String, Vec<RuleRecord>>()? {
                    objects.push(entry);
                }
                Ok(OrderedObjects(objects))
            }
        }

        deserializer.deserialize_map(ObjectsVisitor)
    }
}
