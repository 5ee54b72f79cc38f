//! WebSocket service in front of the engine

use anyhow::{Context, Result};
use futures_util::{SinkExt, StreamExt};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::{mpsc, Mutex};
use tokio_tungstenite::accept_async;
use tokio_tungstenite::tungstenite::Message;

use pitchwise_core::protocol::{dispatch, ClientMessage, MessageEnvelope, ServerEvent};
use pitchwise_core::Engine;

pub struct AppState {
    pub engine: Arc<Mutex<Engine>>,
}

pub async fn start_server(engine: Engine, addr: &str) -> Result<()> {
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind server to {}", addr))?;

    println!("pitchwise listening on: ws://{}", addr);
    log::info!("listening on {}", addr);

    let state = Arc::new(AppState {
        engine: Arc::new(Mutex::new(engine)),
    });

    loop {
        tokio::select! {
            accepted = listener.accept() => {
                let (stream, peer) = match accepted {
                    Ok(accepted) => accepted,
                    Err(err) => {
                        log::warn!("accept failed: {}", err);
                        continue;
                    }
                };
                let state = state.clone();
                tokio::spawn(async move {
                    match accept_async(stream).await {
                        Ok(ws_stream) => {
                            log::debug!("connection from {}", peer);
                            handle_connection(ws_stream, state).await;
                        }
                        Err(err) => {
                            log::warn!("websocket handshake with {} failed: {}", peer, err)
                        }
                    }
                });
            }
            _ = tokio::signal::ctrl_c() => {
                log::info!("shutting down");
                break;
            }
        }
    }

    Ok(())
}

async fn handle_connection(
    ws_stream: tokio_tungstenite::WebSocketStream<tokio::net::TcpStream>,
    state: Arc<AppState>,
) {
    let (mut ws_sender, mut ws_receiver) = ws_stream.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<MessageEnvelope<ServerEvent>>();

    // Forward envelopes to the socket
    let send_task = tokio::spawn(async move {
        while let Some(envelope) = rx.recv().await {
            let json = match serde_json::to_string(&envelope) {
                Ok(json) => json,
                Err(err) => {
                    log::warn!("could not encode {} event: {}", envelope.msg_type, err);
                    continue;
                }
            };
            if ws_sender.send(Message::Text(json)).await.is_err() {
                break;
            }
        }
    });

    let event_ids = AtomicU64::new(0);
    while let Some(Ok(msg)) = ws_receiver.next().await {
        match msg {
            Message::Text(text) => {
                let envelope = handle_text(&state.engine, &text, &event_ids).await;
                if tx.send(envelope).is_err() {
                    break;
                }
            }
            Message::Close(_) => break,
            _ => {}
        }
    }

    drop(tx);
    let _ = send_task.await;
}

/// Decode one text frame, run it and wrap the answer
pub async fn handle_text(
    engine: &Mutex<Engine>,
    text: &str,
    event_ids: &AtomicU64,
) -> MessageEnvelope<ServerEvent> {
    let event_id = event_ids.fetch_add(1, Ordering::Relaxed) + 1;
    match MessageEnvelope::<ClientMessage>::parse(text) {
        Ok(envelope) => {
            let request_id = envelope.request_id;
            let event = {
                let mut engine = engine.lock().await;
                dispatch(&mut engine, envelope.payload)
            };
            MessageEnvelope::event(request_id, event_id, event)
        }
        Err(err) => {
            log::warn!("rejected message: {}", err);
            MessageEnvelope::event(None, event_id, ServerEvent::error(&err))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pitchwise_core::{Config, KnowledgeBase};
    use serde_json::json;

    fn engine() -> Mutex<Engine> {
        let mut config = Config::default();
        config.marketing.seed = Some(3);
        Mutex::new(Engine::new(KnowledgeBase::embedded().unwrap(), config).unwrap())
    }

    #[tokio::test]
    async fn test_request_id_is_echoed() {
        let engine = engine();
        let ids = AtomicU64::new(0);
        let text = json!({
            "v": 1,
            "type": "elevator_pitch",
            "request_id": "6f9619ff-8b86-d011-b42d-00cf4fc964ff",
            "payload": {"type": "elevator_pitch", "industry": "retail", "business_size": "small", "role": "executive"}
        })
        .to_string();

        let first = handle_text(&engine, &text, &ids).await;
        assert_eq!(first.msg_type, "pitch");
        assert_eq!(first.event_id, Some(1));
        assert_eq!(
            first.request_id.map(|id| id.to_string()),
            Some("6f9619ff-8b86-d011-b42d-00cf4fc964ff".to_string())
        );

        let second = handle_text(&engine, &text, &ids).await;
        assert_eq!(second.event_id, Some(2));
    }

    #[tokio::test]
    async fn test_malformed_frame_yields_error() {
        let engine = engine();
        let ids = AtomicU64::new(0);
        let envelope = handle_text(&engine, "{\"v\": 1}", &ids).await;
        assert_eq!(envelope.msg_type, "error");
        assert!(envelope.request_id.is_none());
        assert!(matches!(envelope.payload, ServerEvent::Error { .. }));
    }
}
