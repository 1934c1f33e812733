// Aggregation pipeline: group by timestamp, run every aggregator per group, merge.
// Processor: pipeline + dictionary encoder, the unit the binary drives.

use std::collections::HashMap;

use chrono::NaiveDateTime;
use tracing::{info, instrument};

use crate::aggregator::AggregatorUnit;
use crate::encoder::DictionaryEncoder;
use crate::error::Result;
use crate::models::{CounterSample, EncodedSample};
use crate::rules::{self, RuleSet};

/// Splits `samples` into exact-timestamp groups. Groups come out in the order
/// their timestamp was first seen; samples keep their relative input order.
pub fn group_by_timestamp(
    samples: impl IntoIterator<Item = CounterSample>,
) -> Vec<Vec<CounterSample>> {
    let mut groups: Vec<Vec<CounterSample>> = Vec::new();
    let mut index: HashMap<NaiveDateTime, usize> = HashMap::new();
    for sample in samples {
        let slot = *index.entry(sample.timestamp).or_insert_with(|| {
            groups.push(Vec::new());
            groups.len() - 1
        });
        groups[slot].push(sample);
    }
    groups
}

/// Owns the compiled aggregator units; read-only after construction.
#[derive(Debug, Clone, Default)]
pub struct AggregationPipeline {
    units: Vec<AggregatorUnit>,
}

impl AggregationPipeline {
    pub fn new(units: Vec<AggregatorUnit>) -> Self {
        Self { units }
    }

    pub fn from_rule_set(rule_set: &RuleSet) -> Result<Self> {
        Ok(Self::new(rules::compile(rule_set)?))
    }

    pub fn units(&self) -> &[AggregatorUnit] {
        &self.units
    }

    /// Original samples first, then each unit's output in unit order.
    /// Every unit sees only the original group, never a sibling's output.
    pub fn process_group(&self, group: Vec<CounterSample>) -> Vec<CounterSample> {
        let derived: Vec<CounterSample> = self
            .units
            .iter()
            .flat_map(|unit| unit.aggregate(&group))
            .collect();
        let mut output = group;
        output.extend(derived);
        output
    }

    /// Runs every group in first-seen timestamp order and concatenates the results.
    pub fn process(
        &self,
        samples: impl IntoIterator<Item = CounterSample>,
    ) -> Vec<CounterSample> {
        group_by_timestamp(samples)
            .into_iter()
            .flat_map(|group| self.process_group(group))
            .collect()
    }
}

/// Pipeline plus the encoder whose dictionaries persist across `process` calls.
#[derive(Debug, Clone, Default)]
pub struct Processor {
    pipeline: AggregationPipeline,
    encoder: DictionaryEncoder,
}

impl Processor {
    pub fn new(pipeline: AggregationPipeline, encoder: DictionaryEncoder) -> Self {
        Self { pipeline, encoder }
    }

    pub fn from_rule_set(rule_set: &RuleSet) -> Result<Self> {
        Ok(Self::new(
            AggregationPipeline::from_rule_set(rule_set)?,
            DictionaryEncoder::new(),
        ))
    }

    /// Aggregates and encodes `samples`. Ids are assigned in output order.
    #[instrument(skip_all)]
    pub fn process(&mut self, samples: Vec<CounterSample>) -> Vec<EncodedSample> {
        let input = samples.len();
        let merged = self.pipeline.process(samples);
        let encoded: Vec<EncodedSample> =
            merged.iter().map(|s| self.encoder.encode(s)).collect();
        info!(
            input,
            output = encoded.len(),
            derived = encoded.len() - input,
            objects = self.encoder.objects().len(),
            counters = self.encoder.counters().len(),
            instances = self.encoder.instances().len(),
            "samples processed"
        );
        encoded
    }

    pub fn pipeline(&self) -> &AggregationPipeline {
        &self.pipeline
    }

    pub fn encoder(&self) -> &DictionaryEncoder {
        &self.encoder
    }
}
