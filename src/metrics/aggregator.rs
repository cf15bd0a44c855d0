use std::panic::Location;
use std::time::Instant;

use parking_lot::Mutex;
use serde::Serialize;
use tracing::warn;

use super::hierarchy::BucketHierarchy;
use super::render::render_report;
use super::summary::{summarize, Summary};
use super::{RequestContext, UNMATCHED_ROUTE};

// ─── Public types ────────────────────────────────────────────────

/// Thread-safe aggregation engine.
/// The HTTP layer calls `record()` once per finished request; the scrape
/// endpoint calls `render()` or `snapshot()`.
///
/// Constructed once at process start and shared by handle; tests build
/// fresh instances for isolation. One lock guards the whole hierarchy;
/// that makes get-or-create atomic and serializes window mutation, and a
/// scrape-frequency read path has no contention worth sharding for.
pub struct MetricsAggregator {
    inner: Mutex<BucketHierarchy>,
}

/// JSON-ready view of the aggregation tree, shipped by `/metrics.json`.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    pub global: Summary,
    pub buckets: Vec<BucketSnapshot>,
}

/// One leaf bucket in the snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct BucketSnapshot {
    pub route: String,
    pub method: String,
    pub status: u16,
    pub request_count: u64,
    pub summary: Summary,
}

// ─── MetricsAggregator impl ──────────────────────────────────────

impl MetricsAggregator {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(BucketHierarchy::new()),
        }
    }

    /// Records one completed request. Call exactly once per request.
    ///
    /// A second call for the same context is a no-op apart from a warning
    /// that names the offending call site; counters and samples are left
    /// untouched. Missing route and missing start mark are both valid:
    /// the former lands in the [`UNMATCHED_ROUTE`] bucket, the latter
    /// counts the request without a timing sample.
    #[track_caller]
    pub fn record(&self, ctx: &mut RequestContext) {
        if ctx.recorded {
            warn!(
                route = ctx.route.as_deref().unwrap_or(UNMATCHED_ROUTE),
                method = %ctx.method,
                status = ctx.status,
                caller = %Location::caller(),
                "request already recorded, ignoring duplicate"
            );
            return;
        }
        ctx.recorded = true;

        let elapsed_ms = ctx
            .started
            .map(|started| started.elapsed().as_secs_f64() * 1000.0);
        self.observe(
            ctx.route.as_deref().unwrap_or(UNMATCHED_ROUTE),
            &ctx.method,
            ctx.status,
            elapsed_ms,
        );
    }

    /// Routes one observation into its bucket: evict, then append the
    /// sample (when elapsed time is known), then count. Exposed for
    /// callers that are not request-shaped (batch imports, tests).
    pub fn observe(
        &self,
        route: &str,
        method: &str,
        status: u16,
        elapsed_ms: Option<f64>,
    ) {
        let now = Instant::now();
        let mut buckets = self.inner.lock();
        let window = buckets.get_or_create(route, method, status);
        window.evict_stale(now);
        if let Some(elapsed_ms) = elapsed_ms {
            window.record_sample(now, elapsed_ms);
        }
        window.note_request();
    }

    /// Produces the text exposition. Never fails; with zero traffic the
    /// result is the header block alone. Walking evicts every visited
    /// window, so scrapes double as window maintenance.
    pub fn render(&self) -> String {
        render_report(&mut self.inner.lock(), Instant::now())
    }

    /// Produces the JSON snapshot: one entry per leaf bucket plus the
    /// global summary, evicting and summarizing with the same machinery
    /// as `render`.
    pub fn snapshot(&self) -> MetricsSnapshot {
        let now = Instant::now();
        let mut buckets = self.inner.lock();

        let mut entries = Vec::new();
        let mut retained: Vec<Vec<f64>> = Vec::new();

        for route_level in buckets.routes_mut() {
            let route = route_level.route().to_owned();
            for method_level in route_level.methods_mut() {
                let method = method_level.method().to_owned();
                for leaf in method_level.statuses_mut() {
                    let status = leaf.status();
                    let window = leaf.window_mut();
                    window.evict_stale(now);

                    let mut values = window.elapsed_values();
                    values.sort_by(|a, b| a.total_cmp(b));
                    let summary = summarize(&values);
                    if !values.is_empty() {
                        retained.push(values);
                    }
                    entries.push(BucketSnapshot {
                        route: route.clone(),
                        method: method.clone(),
                        status,
                        request_count: window.request_count(),
                        summary,
                    });
                }
            }
        }

        let mut flattened = retained.concat();
        flattened.sort_by(|a, b| a.total_cmp(b));
        MetricsSnapshot {
            global: summarize(&flattened),
            buckets: entries,
        }
    }
}

impl Default for MetricsAggregator {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Tests ───────────────────────────────────────────────────────
