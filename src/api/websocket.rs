//! WebSocket endpoint.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
};

use super::handlers::AppState;
use crate::connection::run_connection;
use crate::error::PlaygroundError;
use crate::lang::Language;
use crate::transport::Transport;
use crate::Result;

/// WebSocket upgrade handler.
pub async fn ws_handler<L: Language>(
    ws: WebSocketUpgrade,
    State(state): State<AppState<L>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| async move {
        run_connection(WsTransport::new(socket), &state.store, &*state.form).await;
    })
}

/// [`Transport`] over an upgraded axum WebSocket.
pub struct WsTransport {
    socket: WebSocket,
}

impl WsTransport {
    pub fn new(socket: WebSocket) -> Self {
        Self { socket }
    }
}

impl Transport for WsTransport {
    async fn send_text(&mut self, text: String) -> Result<()> {
        self.socket
            .send(Message::Text(text.into()))
            .await
            .map_err(|e| PlaygroundError::Transport(e.to_string()))
    }

    async fn recv_text(&mut self) -> Result<Option<String>> {
        loop {
            match self.socket.recv().await {
                Some(Ok(Message::Text(text))) => return Ok(Some(text.as_str().to_owned())),
                Some(Ok(Message::Binary(data))) => {
                    return Ok(Some(String::from_utf8_lossy(&data).into_owned()))
                }
                Some(Ok(Message::Close(_))) | None => return Ok(None),
                // Pings are answered by the socket itself.
                Some(Ok(Message::Ping(_) | Message::Pong(_))) => continue,
                Some(Err(e)) => return Err(PlaygroundError::Transport(e.to_string())),
            }
        }
    }
}
