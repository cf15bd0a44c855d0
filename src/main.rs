use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::Path,
    http::StatusCode,
    middleware as axum_mw,
    routing::get,
    Router,
};
use rand::Rng;

use solvronis_metrics::metrics::MetricsAggregator;
use solvronis_metrics::{middleware, server};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    println!();
    println!("╔══════════════════════════════════════════════════╗");
    println!("║   📈  SOLVRONIS REQUEST METRICS DEMO             ║");
    println!("╚══════════════════════════════════════════════════╝");
    println!();

    // ── 1. Build the aggregator ──────────────────────────────────
    let metrics = Arc::new(MetricsAggregator::new());

    // ── 2. Demo routes behind the tracking layer ─────────────────
    let app = Router::new()
        .route("/api/ping", get(ping))
        .route("/api/items/:id", get(lookup_item))
        .fallback(not_found)
        .layer(axum_mw::from_fn_with_state(
            metrics.clone(),
            middleware::track_requests,
        ))
        // ── Scrape endpoints, outside the tracking layer ────────
        .merge(server::create_router(metrics));

    // ── 3. Bind & serve ──────────────────────────────────────────
    let addr = "0.0.0.0:3000";
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to port 3000 — is it already in use?");

    println!("Server listening on http://localhost:3000");
    println!("Demo traffic    → http://localhost:3000/api/items/7");
    println!("Scrape (text)   → http://localhost:3000/metrics");
    println!("Scrape (JSON)   → http://localhost:3000/metrics.json");
    println!();

    axum::serve(listener, app)
        .await
        .expect("Server exited with error");
}

// ─── Demo handlers ───────────────────────────────────────────────
// Randomized latency and the occasional miss so a scrape right after
// startup already shows quantiles across several buckets.

async fn ping() -> &'static str {
    "pong"
}

async fn lookup_item(Path(id): Path<u32>) -> (StatusCode, String) {
    let delay_ms = { rand::thread_rng().gen_range(5..40) };
    tokio::time::sleep(Duration::from_millis(delay_ms)).await;

    if id % 13 == 0 {
        (StatusCode::NOT_FOUND, format!("no item {id}"))
    } else {
        (StatusCode::OK, format!("item {id}"))
    }
}

async fn not_found() -> (StatusCode, &'static str) {
    (StatusCode::NOT_FOUND, "no such route")
}
