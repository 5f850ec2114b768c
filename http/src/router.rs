use crate::{
    stats,
    ws,
};
use axum::{
    routing::get,
    Router,
};
use node_dashboard_stats_gatherer::Hub;
use std::{
    path::Path,
    sync::Arc,
};
use tower_http::{
    services::{
        ServeDir,
        ServeFile,
    },
    trace::TraceLayer,
};

#[derive(Clone)]
pub struct AppState {
    pub hub: Arc<Hub>,
}

pub fn create_router(hub: Arc<Hub>, static_dir: &Path) -> Router {
    let state = AppState { hub };

    Router::new()
        .route("/healthz", get(healthz))
        .route("/api/stats", get(stats::handler))
        .route("/ws", get(ws::handler))
        .nest_service("/static", ServeDir::new(static_dir))
        .route_service("/", ServeFile::new(static_dir.join("index.html")))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn healthz() -> &'static str {
    "OK"
}
