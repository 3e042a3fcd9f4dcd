//! Mapedit Server
//!
//! Axum REST persistence service for map features, plus SPA serving.
//! Static files are embedded in the binary via rust-embed.

use axum::{
    Router,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use http::{Method, header};
use mapedit_core::{AreaFeature, PointFeature};
use rust_embed::Embed;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::{
    config::Config,
    service::database::{Database, Seed},
};

mod config;
mod handler;
mod service;

/// Embedded static files from dist/ directory
#[derive(Embed)]
#[folder = "../../dist/"]
struct Assets;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;

    let database = Database::new();
    if config.seed {
        database.seed(Seed::bundled()?)?;
        tracing::info!(
            polygons = database.list::<AreaFeature>().len(),
            map_objects = database.list::<PointFeature>().len(),
            "Sample data loaded"
        );
    }

    let cors = cors_layer(&config);
    let listener = tokio::net::TcpListener::bind(config.addr).await?;

    tracing::info!("Server listening on {}", config.addr);
    tracing::info!("  - REST: http://{}/api/{{polygon,mapobject}}/*", config.addr);
    tracing::info!("  - SPA (embedded): http://{}/", config.addr);

    axum::serve(listener, app(database, cors)).await?;
    Ok(())
}

fn cors_layer(config: &Config) -> CorsLayer {
    let origin = if config.cors_origins.is_empty() {
        AllowOrigin::from(Any)
    } else {
        AllowOrigin::list(config.cors_origins.clone())
    };
    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
}

fn app(database: Database, cors: CorsLayer) -> Router {
    let api = Router::new()
        .nest("/polygon", handler::feature::router::<AreaFeature>())
        .nest("/mapobject", handler::feature::router::<PointFeature>());

    Router::new()
        .route("/healthz", get(healthz))
        .nest("/api", api)
        .fallback(serve_embedded)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(database)
}

async fn healthz() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

/// Serve embedded static files with SPA fallback
async fn serve_embedded(uri: axum::http::Uri) -> Response {
    let path = uri.path().trim_start_matches('/');
    let path = if path.is_empty() { "index.html" } else { path };

    // Unknown API paths are real 404s, not the SPA shell.
    if path.starts_with("api/") {
        return StatusCode::NOT_FOUND.into_response();
    }

    let (path, content) = match Assets::get(path) {
        Some(content) => (path, content),
        None => match Assets::get("index.html") {
            Some(content) => ("index.html", content),
            None => return StatusCode::NOT_FOUND.into_response(),
        },
    };
    let mime = mime_guess::from_path(path).first_or_octet_stream();
    (
        [(header::CONTENT_TYPE, mime.as_ref())],
        content.data.into_owned(),
    )
        .into_response()
}
