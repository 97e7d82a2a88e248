use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::Message;
use crate::config::constants::PUSH_CHANNEL_PATH;
use crate::errors::{ClientError, ClientResult};
use crate::structs::push_connection::PushConnection;
use crate::structs::push_message::PushMessage;
use crate::traits::push_connector::PushConnector;

/// Push channel over a WebSocket at `<engine>/ws`.
pub struct WebSocketConnector;

#[async_trait]
impl PushConnector for WebSocketConnector {
    async fn connect(&self, engine_url: &str, api_key: &str) -> ClientResult<PushConnection> {
        let url = websocket_url(engine_url)?;
        let mut request = url.as_str().into_client_request()?;
        if !api_key.is_empty() {
            let credential = HeaderValue::from_str(&format!("Bearer {}", api_key))
                .map_err(|e| ClientError::config_error(&e.to_string(), Some("api_key"), Some("Remove whitespace or control characters from the API key")))?;
            request.headers_mut().insert("Authorization", credential);
        }

        let (socket, _) = connect_async(request).await?;
        log::info!("🔌 Push channel open at {}", url);

        let (mut sink, mut stream) = socket.split();
        let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel::<PushMessage>();
        let (inbound_tx, inbound_rx) = mpsc::unbounded_channel::<PushMessage>();

        // Writer: ends when every outbound sender is dropped.
        tokio::spawn(async move {
            while let Some(message) = outbound_rx.recv().await {
                let text = match serde_json::to_string(&message) {
                    Ok(text) => text,
                    Err(e) => {
                        log::warn!("⚠️ Dropping unserializable push message: {}", e);
                        continue;
                    }
                };
                if sink.send(Message::Text(text)).await.is_err() {
                    break;
                }
            }
            let _ = sink.close().await;
        });

        // Reader: ends on close or error, which closes `inbound`.
        tokio::spawn(async move {
            while let Some(frame) = stream.next().await {
                match frame {
                    Ok(Message::Text(text)) => match serde_json::from_str::<PushMessage>(&text) {
                        Ok(message) => {
                            if inbound_tx.send(message).is_err() {
                                break;
                            }
                        }
                        Err(e) => log::debug!("📭 Ignoring malformed push frame: {}", e),
                    },
                    Ok(Message::Close(_)) | Err(_) => break,
                    Ok(_) => {}
                }
            }
            log::debug!("🔌 Push channel reader finished");
        });

        Ok(PushConnection {
            outbound: outbound_tx,
            inbound: inbound_rx,
        })
    }
}

/// `http(s)://host[/base]` to `ws(s)://host[/base]/ws`.
pub fn websocket_url(engine_url: &str) -> ClientResult<String> {
    let trimmed = engine_url.trim().trim_end_matches('/');
    let rest = if let Some(rest) = trimmed.strip_prefix("https://") {
        format!("wss://{}", rest)
    } else if let Some(rest) = trimmed.strip_prefix("http://") {
        format!("ws://{}", rest)
    } else if trimmed.starts_with("ws://") || trimmed.starts_with("wss://") {
        trimmed.to_string()
    } else {
        return Err(ClientError::config_error(
            &format!("unsupported engine URL '{}'", engine_url),
            Some("engine_url"),
            Some("Use an http:// or https:// URL"),
        ));
    };
    Ok(format!("{}{}", rest, PUSH_CHANNEL_PATH))
}
