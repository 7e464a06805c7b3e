use std::sync::Arc;

use anyhow::{Context, Result};
use axum::http::Method;
use axum::routing::get;
use axum::Router;
use gazetteer::Locator;
use ingest::{Aggregator, AggregatorConfig, JsonFileCollector};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod api;
mod config;

use api::Snapshot;
use config::ServerConfig;

#[derive(Clone)]
pub struct AppState {
    snapshot: Arc<Snapshot>,
    locator: Arc<Locator>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = ServerConfig::from_env()?;

    let locator = match &config.gazetteer {
        Some(path) => Locator::load(path)
            .with_context(|| format!("loading gazetteer {}", path.display()))?,
        None => Locator::builtin(),
    };
    info!(countries = locator.countries().len(), "gazetteer ready");

    if config.data_files.is_empty() {
        warn!("OUTBREAK_DATA is empty; serving an empty dataset");
    }
    let mut aggregator = Aggregator::new(AggregatorConfig {
        timeout: config.collect_timeout,
        strategy: config.merge,
    });
    for path in &config.data_files {
        aggregator.add_collector(Arc::new(JsonFileCollector::new(path)));
    }

    let aggregation = aggregator.collect().await;
    let snapshot = Snapshot::build(aggregation, &locator);
    info!(
        points = snapshot.points.points.len(),
        failures = snapshot.report.failures.len(),
        "dataset ready"
    );

    let state = AppState {
        snapshot: Arc::new(snapshot),
        locator: Arc::new(locator),
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_headers(Any)
        .allow_methods([Method::GET, Method::OPTIONS]);

    let app = Router::new()
        .route("/healthz", get(api::healthz))
        .route("/api/points", get(api::get_points))
        .route("/api/dataset", get(api::get_dataset))
        .route("/api/failures", get(api::get_report))
        .route("/api/span", get(api::get_span))
        .route("/api/locate", get(api::locate))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .with_context(|| format!("binding {}", config.addr))?;
    info!("outbreak server listening on http://{}", config.addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;
    Ok(())
}
