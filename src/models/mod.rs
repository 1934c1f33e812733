// Domain models: counter samples and aggregation rules

mod rule;
mod sample;

pub use rule::{AggregationRule, RuleRecord};
pub use sample::{CounterSample, EncodedSample, TIMESTAMP_FORMAT};
