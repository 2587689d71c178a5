pub mod error;
pub mod routes;
pub mod state;

use axum::routing::{get, post};
use axum::Router;
use std::path::PathBuf;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Router over an already-loaded state.
pub fn router(app_state: state::AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Decision tree
        .route("/api/tree", get(routes::tree::get_tree))
        .route("/api/tree/{node}", get(routes::tree::get_node))
        .route("/api/traverse", post(routes::tree::traverse))
        // Classification
        .route("/api/classify", post(routes::classify::classify_answers))
        // Matching
        .route("/api/match", post(routes::matching::match_providers))
        // Metadata
        .route("/api/services", get(routes::services::list_services))
        .route("/api/health", get(routes::health::health))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(app_state)
}

/// Build the axum Router for a project root. Fails when a configured
/// decision tree cannot be loaded.
pub fn build_router(root: PathBuf) -> anyhow::Result<Router> {
    let app_state = state::AppState::load(root)?;
    Ok(router(app_state))
}

/// Start the plumb API server.
pub async fn serve(root: PathBuf, port: u16) -> anyhow::Result<()> {
    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    serve_on(root, listener).await
}

/// Like `serve`, but on an already-bound listener so the caller can read the
/// actual port first (useful with port 0).
pub async fn serve_on(root: PathBuf, listener: tokio::net::TcpListener) -> anyhow::Result<()> {
    let app = build_router(root)?;
    let actual_port = listener.local_addr()?.port();
    tracing::info!("plumb API listening on http://localhost:{actual_port}");
    axum::serve(listener, app).await?;
    Ok(())
}
