pub mod aggregator;
pub mod hierarchy;
pub mod render;
pub mod summary;
pub mod window;

use std::time::{Duration, Instant};

pub use aggregator::{BucketSnapshot, MetricsAggregator, MetricsSnapshot};
pub use summary::{summarize, Summary};

/// How long a latency sample stays in a bucket's sliding window.
pub const RETENTION_WINDOW: Duration = Duration::from_millis(60_000);

/// Route label used when the request matched no registered route.
/// Participates in the hierarchy like any real route pattern.
pub const UNMATCHED_ROUTE: &str = "invalid_route";

/// Everything the recorder needs from one completed request.
/// This is the "write" side — the HTTP layer builds one of these per
/// request and hands it to `MetricsAggregator::record`.
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// High-resolution mark taken before the request was processed.
    /// `None` when the caller never stamped one; the request is still
    /// counted, just without a timing sample.
    pub started: Option<Instant>,
    /// Matched route pattern, e.g. "/api/users/:id". `None` routes the
    /// observation to the [`UNMATCHED_ROUTE`] bucket.
    pub route: Option<String>,
    /// HTTP method, e.g. "GET".
    pub method: String,
    /// Response status code.
    pub status: u16,
    /// Set by the first `record` call; a second call with this flag up is
    /// a no-op apart from a warning.
    pub recorded: bool,
}

impl RequestContext {
    pub fn new(method: impl Into<String>, status: u16) -> Self {
        Self {
            started: None,
            route: None,
            method: method.into(),
            status,
            recorded: false,
        }
    }
}
