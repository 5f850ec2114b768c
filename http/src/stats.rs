use crate::{
    error::AppError,
    router::AppState,
};
use axum::{
    extract::State,
    http::header,
    response::IntoResponse,
};

/// Served before the first collection cycle has finished.
const NO_DATA: &str = "{}";

pub async fn handler(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let body = match state.hub.latest() {
        Some(stats) => stats.to_json()?,
        None => NO_DATA.to_string(),
    };
    Ok(([(header::CONTENT_TYPE, "application/json")], body))
}
