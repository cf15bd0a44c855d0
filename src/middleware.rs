use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{MatchedPath, Request, State},
    middleware::Next,
    response::Response,
};

use crate::metrics::{MetricsAggregator, RequestContext};

/// Tower-compatible middleware that feeds every finished request into the
/// aggregator and adds an `X-Response-Time-Us` response header.
///
/// The start mark is taken before the downstream handler runs; the route
/// pattern comes from axum's `MatchedPath` (absent on fallback responses,
/// which then land in the unmatched-route bucket).
pub async fn track_requests(
    State(metrics): State<Arc<MetricsAggregator>>,
    req: Request,
    next: Next,
) -> Response {
    let method = req.method().to_string();
    let route = req
        .extensions()
        .get::<MatchedPath>()
        .map(|path| path.as_str().to_owned());

    let started = Instant::now();
    let mut response = next.run(req).await;

    // ── Inject response header ──────────────────────────────────
    let us = started.elapsed().as_micros();
    if let Ok(value) = us.to_string().parse() {
        response.headers_mut().insert("X-Response-Time-Us", value);
    }

    // ── Feed the aggregator ─────────────────────────────────────
    let mut ctx = RequestContext {
        started: Some(started),
        route,
        method,
        status: response.status().as_u16(),
        recorded: false,
    };
    metrics.record(&mut ctx);

    response
}
