// Shared test helpers

#![allow(dead_code)]

use chrono::{NaiveDate, NaiveDateTime};
use perfagg::models::CounterSample;

pub fn ts(h: u32, m: u32, s: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, 1)
        .unwrap()
        .and_hms_opt(h, m, s)
        .unwrap()
}

pub fn sample(
    timestamp: NaiveDateTime,
    object: &str,
    counter: &str,
    instance: &str,
    value: f64,
) -> CounterSample {
    CounterSample::new(timestamp, object, counter, instance, value)
}

pub const RULES_JSON: &str = r#"{
  "perf.aggregation.rules": {
    "Disk": [
      {
        "counters": ["ReadBytes", "WriteBytes"],
        "aggregationExpression": "sum(values)",
        "instanceSuffix": "_Total"
      }
    ],
    "CPU": [
      {
        "counters": ["Time"],
        "aggregationExpression": "values.Average()",
        "instanceSuffix": "_Avg"
      },
      {
        "counters": ["Time"],
        "aggregationExpression": "max(values)",
        "instanceSuffix": "_Max"
      }
    ]
  }
}"#;
