//! WebSocket push channel to dashboard clients.
//!
//! Frames are JSON envelopes `{"event": <name>, "data": <payload>}`:
//! `connected` once on connect, then `message-received` for every event
//! the fan-out broadcasts while this client is connected.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use relay_types::now_iso;
use serde::Serialize;
use serde_json::json;
use tokio::sync::broadcast::error::RecvError;

use crate::AppState;

#[derive(Serialize)]
struct WsFrame<T: Serialize> {
    event: &'static str,
    data: T,
}

/// `GET /ws`
pub async fn upgrade(
    State(state): State<Arc<AppState>>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| connection(socket, state))
}

async fn connection(mut socket: WebSocket, state: Arc<AppState>) {
    let mut events = state.fanout.subscribe();

    let hello = WsFrame {
        event: "connected",
        data: json!({
            "message": "Connected to Consumer service",
            "timestamp": now_iso(),
        }),
    };
    if send_frame(&mut socket, &hello).await.is_err() {
        return;
    }
    tracing::info!("Dashboard client connected");

    loop {
        tokio::select! {
            msg = socket.recv() => match msg {
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => {} // inbound frames are ignored
                Some(Err(_)) => break,
            },
            event = events.recv() => match event {
                Ok(event) => {
                    let frame = WsFrame {
                        event: "message-received",
                        data: event,
                    };
                    if send_frame(&mut socket, &frame).await.is_err() {
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    // no backlog for slow listeners
                    tracing::debug!("WebSocket listener lagged, skipped {skipped} events");
                }
                Err(RecvError::Closed) => break,
            },
        }
    }

    tracing::info!("Dashboard client disconnected");
}

async fn send_frame<T: Serialize>(
    socket: &mut WebSocket,
    frame: &WsFrame<T>,
) -> Result<(), axum::Error> {
    match serde_json::to_string(frame) {
        Ok(text) => socket.send(Message::Text(text)).await,
        Err(e) => {
            tracing::error!("Failed to encode WebSocket frame: {e}");
            Ok(())
        }
    }
}
