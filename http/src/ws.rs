use crate::{
    error::AppError,
    router::AppState,
};
use axum::{
    extract::{
        ws::{
            Message,
            WebSocket,
            WebSocketUpgrade,
        },
        State,
    },
    response::Response,
};
use futures::{
    sink::SinkExt,
    stream::{
        SplitSink,
        StreamExt,
    },
};
use node_dashboard_stats_gatherer::{
    Payload,
    SinkFuture,
    SnapshotSink,
};

pub async fn handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: AppState) {
    info!("New WebSocket connection");

    let (sender, receiver) = socket.split();
    state.hub.connect(WebSocketSink(sender), receiver).await;

    info!("WebSocket connection finished");
}

/// Write half of a dashboard websocket, fed by the hub.
pub struct WebSocketSink(SplitSink<WebSocket, Message>);

impl SnapshotSink for WebSocketSink {
    fn send(&mut self, payload: Payload) -> SinkFuture<'_> {
        Box::pin(async move {
            self.0
                .send(Message::Text(payload.as_ref().into()))
                .await
                .map_err(|e| eyre::Report::new(AppError::Socket(e.into())))
        })
    }

    fn close(&mut self) -> SinkFuture<'_> {
        Box::pin(async move {
            self.0
                .close()
                .await
                .map_err(|e| eyre::Report::new(AppError::Socket(e.into())))
        })
    }
}
