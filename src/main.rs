mod routes;
mod controllers;
mod services;
mod models;
mod api_docs;
mod shared_state;
mod config;
mod error;

use std::net::SocketAddr;
use std::path::PathBuf;
use axum::{Router, routing::get, response::Html};
use crate::routes::estimate_routes::api_routes;
use utoipa::OpenApi;
use utoipa_scalar::Scalar;
use crate::api_docs::ApiDoc;
use crate::shared_state::AppState;
use crate::config::Config;
use crate::services::nasa_power::NasaPowerClient;

use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Logging (RUST_LOG, default info)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(true)
        .init();

    // 2. Load configuration
    let config_path = std::env::var("SOLAR_CONFIG").unwrap_or_else(|_| "config.json".to_string());
    let config = Config::load(&config_path)?;
    info!(
        path = %config_path,
        endpoint = %config.nasa_power.base_url,
        timeout_secs = ?config.nasa_power.timeout_secs,
        "configuration loaded"
    );

    // 3. Shared state: irradiance client + form state
    let power_client = NasaPowerClient::new(&config.nasa_power)?;
    let state = AppState::new(power_client, config.defaults.clone(), PathBuf::from(&config.export_dir));

    // 4. HTTP server: API, docs, static form
    let app = Router::new()
        .nest("/api", api_routes(state))
        .route("/scalar", get(|| async {
            Html(Scalar::new(ApiDoc::openapi()).to_html())
        }))
        .fallback_service(ServeDir::new(&config.static_dir))
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    info!("Form available on http://{}", addr);
    info!("Scalar UI: http://{}/scalar", addr);

    axum_server::bind(addr)
        .serve(app.into_make_service())
        .await?;

    Ok(())
}
