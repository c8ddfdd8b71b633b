//! Metrics definitions for the traffic filter resources.

use shared::metrics_defs::{MetricDef, MetricType};

pub const MEMBERSHIP_WRITE: MetricDef = MetricDef {
    name: "association.membership.write",
    metric_type: MetricType::Counter,
    description: "Number of full traffic filter lists written back to a project",
};

pub const MEMBERSHIP_NOOP: MetricDef = MetricDef {
    name: "association.membership.noop",
    metric_type: MetricType::Counter,
    description: "Number of association operations that found the membership already settled",
};

pub const MEMBERSHIP_DRIFT: MetricDef = MetricDef {
    name: "association.membership.drift",
    metric_type: MetricType::Counter,
    description: "Number of reads that found a tracked association missing from its project",
};

pub const MEMBERSHIP_CONCURRENT_MODIFICATION: MetricDef = MetricDef {
    name: "association.membership.concurrent_modification",
    metric_type: MetricType::Counter,
    description: "Number of writes whose read-back differed from the written membership",
};

pub const FILTER_REMOVED: MetricDef = MetricDef {
    name: "traffic_filter.removed",
    metric_type: MetricType::Counter,
    description: "Number of reads that found a tracked traffic filter deleted server-side",
};

pub const ALL_METRICS: &[MetricDef] = &[
    MEMBERSHIP_WRITE,
    MEMBERSHIP_NOOP,
    MEMBERSHIP_DRIFT,
    MEMBERSHIP_CONCURRENT_MODIFICATION,
    FILTER_REMOVED,
];
