use axum::{
    extract::State,
    http::header,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use crate::metrics::{MetricsAggregator, MetricsSnapshot};

/// Builds the scrape-side router: the text exposition plus a JSON view
/// for debugging. Mount this *outside* the tracking layer so scrapes do
/// not show up as route traffic.
pub fn create_router(metrics: Arc<MetricsAggregator>) -> Router {
    Router::new()
        .route("/metrics", get(scrape_metrics))
        .route("/metrics.json", get(metrics_snapshot))
        .with_state(metrics)
        .layer(CorsLayer::permissive())
}

// ─── GET /metrics ────────────────────────────────────────────────
/// Prometheus-style text exposition. Rendering evicts stale samples as a
/// side effect, so each scrape also trims the windows.

async fn scrape_metrics(
    State(metrics): State<Arc<MetricsAggregator>>,
) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        metrics.render(),
    )
}

// ─── GET /metrics.json ───────────────────────────────────────────
/// Same aggregation tree as JSON — useful for curl / debugging.

async fn metrics_snapshot(
    State(metrics): State<Arc<MetricsAggregator>>,
) -> Json<MetricsSnapshot> {
    Json(metrics.snapshot())
}
