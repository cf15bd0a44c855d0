pub mod metrics;
pub mod middleware;
pub mod server;

pub use metrics::{
    BucketSnapshot, MetricsAggregator, MetricsSnapshot, RequestContext, Summary,
    RETENTION_WINDOW, UNMATCHED_ROUTE,
};
