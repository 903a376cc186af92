use super::ApiState;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::Response;
use tracing::{debug, warn};

pub async fn events_socket(ws: WebSocketUpgrade, State(state): State<ApiState>) -> Response {
    ws.on_upgrade(move |socket| stream_events(socket, state))
}

/// Forward lifecycle events as JSON text frames until either side goes away.
/// Inbound frames other than close are ignored.
async fn stream_events(mut socket: WebSocket, state: ApiState) {
    let mut subscription = state.orchestrator.subscribe();
    let subscription_id = subscription.id();
    let shutdown = state.orchestrator.shutdown_token();
    debug!("WebSocket client {} connected", subscription_id);

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            event = subscription.recv() => {
                let Some(event) = event else { break };
                let text = match event.to_json() {
                    Ok(text) => text,
                    Err(e) => {
                        warn!("Could not encode event for {}: {}", event.service_id(), e);
                        continue;
                    }
                };
                if socket.send(Message::Text(text)).await.is_err() {
                    break;
                }
            }
            inbound = socket.recv() => match inbound {
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                Some(Ok(_)) => {}
            },
        }
    }

    state.orchestrator.unsubscribe(subscription_id);
    debug!("WebSocket client {} disconnected", subscription_id);
}
