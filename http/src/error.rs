use axum::{
    http::StatusCode,
    response::{
        IntoResponse,
        Response,
    },
};

#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("Serializing the node stats failed: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("Handling the websocket connection failed: {0}")]
    Socket(eyre::Report),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            AppError::Serialize(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Socket(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (
            self.status(),
            axum::Json(serde_json::json!({ "error": self.to_string() })),
        )
            .into_response()
    }
}
