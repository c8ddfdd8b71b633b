//! Metrics definitions for the serverless API client.

use shared::metrics_defs::{MetricDef, MetricType};

pub const API_REQUEST_DURATION: MetricDef = MetricDef {
    name: "serverless_api.request.duration",
    metric_type: MetricType::Histogram,
    description: "Time to receive response headers from the serverless API in seconds",
};

pub const API_REQUEST_RETRY: MetricDef = MetricDef {
    name: "serverless_api.request.retry",
    metric_type: MetricType::Counter,
    description: "Number of requests retried after a retriable status code",
};

pub const ALL_METRICS: &[MetricDef] = &[API_REQUEST_DURATION, API_REQUEST_RETRY];
