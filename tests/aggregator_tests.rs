// Aggregator unit tests: filtering, per-counter grouping, instance suffix, timestamps

mod common;

use common::{sample, ts};
use perfagg::aggregator::AggregatorUnit;
use perfagg::models::AggregationRule;

fn unit(object: &str, counters: &[&str], expression: &str, suffix: &str) -> AggregatorUnit {
    let rule = AggregationRule::new(object, counters.iter().copied(), expression, suffix);
    AggregatorUnit::new(&rule).expect("unit")
}

#[test]
fn disk_scenario_emits_one_sample_per_counter() {
    let unit = unit("Disk", &["ReadBytes", "WriteBytes"], "sum(values)", "_Total");
    let batch = vec![
        sample(ts(0, 0, 0), "Disk", "ReadBytes", "C:", 100.0),
        sample(ts(0, 0, 0), "Disk", "WriteBytes", "C:", 50.0),
    ];
    let out = unit.aggregate(&batch);
    assert_eq!(
        out,
        vec![
            sample(ts(0, 0, 0), "Disk", "ReadBytes", "C:_Total", 100.0),
            sample(ts(0, 0, 0), "Disk", "WriteBytes", "C:_Total", 50.0),
        ]
    );
}

#[test]
fn values_across_instances_are_reduced_together() {
    let unit = unit("Disk", &["ReadBytes"], "sum(values)", "_Total");
    let batch = vec![
        sample(ts(0, 0, 0), "Disk", "ReadBytes", "C:", 100.0),
        sample(ts(0, 0, 0), "Disk", "ReadBytes", "D:", 25.0),
        sample(ts(0, 0, 0), "Disk", "ReadBytes", "E:", 5.0),
    ];
    let out = unit.aggregate(&batch);
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].value, 130.0);
    // Instance comes from the first matching sample.
    assert_eq!(out[0].instance, "C:_Total");
}

#[test]
fn non_matching_object_returns_empty() {
    let unit = unit("Disk", &["ReadBytes"], "sum(values)", "_Total");
    let batch = vec![sample(ts(0, 0, 0), "CPU", "ReadBytes", "0", 1.0)];
    assert!(unit.aggregate(&batch).is_empty());
}

#[test]
fn non_matching_counter_returns_empty() {
    let unit = unit("Disk", &["ReadBytes"], "count(values)", "_Total");
    let batch = vec![sample(ts(0, 0, 0), "Disk", "QueueLength", "C:", 1.0)];
    assert!(unit.aggregate(&batch).is_empty());
}

#[test]
fn empty_batch_returns_empty() {
    let unit = unit("Disk", &["ReadBytes"], "count(values)", "_Total");
    assert!(unit.aggregate(&[]).is_empty());
}

#[test]
fn only_listed_counters_contribute() {
    let unit = unit("Memory", &["Used"], "max(values)", "_Peak");
    let batch = vec![
        sample(ts(1, 2, 3), "Memory", "Used", "node1", 10.0),
        sample(ts(1, 2, 3), "Memory", "Free", "node1", 999.0),
        sample(ts(1, 2, 3), "Memory", "Used", "node2", 30.0),
    ];
    let out = unit.aggregate(&batch);
    assert_eq!(out, vec![sample(ts(1, 2, 3), "Memory", "Used", "node1_Peak", 30.0)]);
}

#[test]
fn derived_timestamp_equals_batch_timestamp() {
    let unit = unit("CPU", &["Time", "Idle"], "average(values)", "_Avg");
    let at = ts(23, 59, 59);
    let batch = vec![
        sample(at, "CPU", "Time", "0", 10.0),
        sample(at, "CPU", "Idle", "0", 90.0),
        sample(at, "CPU", "Time", "1", 30.0),
    ];
    let out = unit.aggregate(&batch);
    assert_eq!(out.len(), 2);
    assert!(out.iter().all(|s| s.timestamp == at));
    assert_eq!(out[0].value, 20.0);
    assert_eq!(out[1].value, 90.0);
}

#[test]
fn empty_instance_gets_suffix_only() {
    let unit = unit("Memory", &["Available"], "sum(values)", "_Total");
    let batch = vec![sample(ts(0, 0, 0), "Memory", "Available", "", 512.0)];
    let out = unit.aggregate(&batch);
    assert_eq!(out[0].instance, "_Total");
}

#[test]
fn empty_suffix_keeps_instance() {
    let unit = unit("Memory", &["Available"], "sum(values)", "");
    let batch = vec![sample(ts(0, 0, 0), "Memory", "Available", "node1", 512.0)];
    let out = unit.aggregate(&batch);
    assert_eq!(out[0].instance, "node1");
}

#[test]
fn invalid_expression_fails_at_construction() {
    let rule = AggregationRule::new("CPU", ["Time"], "median(values)", "_M");
    assert!(AggregatorUnit::new(&rule).is_err());
}
