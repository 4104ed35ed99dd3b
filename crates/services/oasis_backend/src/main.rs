// File: services/oasis_backend/src/main.rs
use axum::{routing::get, Router};
use oasis_common::{logging, NullInvoicing, TracingAuditSink};
use oasis_config::load_config;
use oasis_scheduling::catalog::{CatalogSeed, ResourceCatalog};
use oasis_scheduling::handlers::SchedulerState;
use oasis_scheduling::poll::RefreshTicker;
use oasis_scheduling::routes as scheduling_routes;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

const DEFAULT_SEED_PATH: &str = "config/catalog.seed.json";

fn load_catalog(seed_path: &str) -> ResourceCatalog {
    let raw = std::fs::read_to_string(seed_path)
        .unwrap_or_else(|err| panic!("Failed to read catalog seed {seed_path}: {err}"));
    let seed: CatalogSeed = serde_json::from_str(&raw)
        .unwrap_or_else(|err| panic!("Failed to parse catalog seed {seed_path}: {err}"));
    ResourceCatalog::from_seed(seed).expect("Catalog seed failed validation")
}

#[tokio::main]
async fn main() {
    logging::init();
    let config = Arc::new(load_config().expect("Failed to load config"));

    let seed_path = config
        .catalog
        .as_ref()
        .map(|c| c.seed_path.as_str())
        .unwrap_or(DEFAULT_SEED_PATH);
    let catalog = Arc::new(load_catalog(seed_path));

    let state = Arc::new(SchedulerState::new(
        &config,
        catalog,
        Arc::new(NullInvoicing),
        Arc::new(TracingAuditSink),
    ));

    // Periodic revision log so operators can see client-visible churn without
    // a metrics stack. Staff clients do their own polling via /api/bookings/changes.
    let feed = state.bookings.clone();
    let mut last_seen = feed.revision();
    let ticker = RefreshTicker::start(
        Duration::from_secs(config.scheduling.poll_interval_seconds),
        move || {
            let revision = feed.revision();
            if revision != last_seen {
                info!(from = last_seen, to = revision, "booking feed advanced");
                last_seen = revision;
            }
        },
    );

    let app = Router::new()
        .route("/", get(|| async { "Welcome to the Oasis scheduling API!" }))
        .nest("/api", scheduling_routes::routes(state))
        .layer(TraceLayer::new_for_http());

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await.unwrap();
    info!("Starting server at http://{addr}");
    info!("API endpoints available at http://{addr}/api");

    axum::serve(listener, app.into_make_service())
        .await
        .unwrap();

    ticker.stop().await;
}
