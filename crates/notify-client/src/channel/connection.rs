use futures_util::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;

use super::*;

#[derive(Debug, Deserialize)]
struct WireFrame {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    data: serde_json::Value,
}

#[derive(Debug, Serialize)]
struct RegisterFrame<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    #[serde(rename = "userId")]
    user_id: &'a str,
}

impl ChannelClient {
    pub(super) async fn connect_once(
        config: &ChannelConfig,
        event_tx: &mpsc::Sender<ChannelEvent>,
        shutdown_rx: &mut mpsc::Receiver<()>,
    ) -> Result<(), NotifyError> {
        use tokio_tungstenite::tungstenite::Message as Msg;

        tracing::info!(ws_url = %config.ws_url, "Connecting to notification channel");
        let (mut ws, _) = connect_async(&config.ws_url).await?;

        // Register before anything else so the server can route
        // notifications for this identity on the fresh connection.
        let register = serde_json::to_string(&RegisterFrame {
            kind: "register",
            user_id: &config.user_id,
        })?;
        ws.send(Msg::text(register)).await?;
        tracing::info!(user_id = %config.user_id, "Registered on notification channel");

        if event_tx.send(ChannelEvent::Connected).await.is_err() {
            let _ = ws.close(None).await;
            return Ok(());
        }

        loop {
            tokio::select! {
                _ = shutdown_rx.recv() => {
                    tracing::info!("Channel shutdown during listen");
                    let _ = ws.close(None).await;
                    return Ok(());
                }
                result = tokio::time::timeout(IDLE_TIMEOUT, ws.next()) => {
                    match result {
                        Ok(Some(Ok(Msg::Text(text)))) => {
                            if let Some(event) = Self::parse_frame(&text) {
                                if event_tx.send(ChannelEvent::Notification(event)).await.is_err() {
                                    let _ = ws.close(None).await;
                                    return Ok(());
                                }
                            }
                        }
                        Ok(Some(Ok(Msg::Ping(data)))) => {
                            let _ = ws.send(Msg::Pong(data)).await;
                        }
                        Ok(Some(Ok(Msg::Close(_)))) | Ok(None) => {
                            tracing::warn!("Channel WebSocket closed by server");
                            return Err(NotifyError::Channel("Server closed".into()));
                        }
                        Ok(Some(Err(e))) => return Err(NotifyError::WebSocket(e)),
                        Ok(Some(Ok(_))) => {}
                        Err(_) => {
                            tracing::warn!("Channel idle timeout");
                            return Err(NotifyError::Timeout);
                        }
                    }
                }
            }
        }
    }

    /// Parse one text frame into a notification event.
    ///
    /// `init` frames are informational, unknown frame types and
    /// malformed frames are ignored; none of them may kill the
    /// session.
    pub(super) fn parse_frame(text: &str) -> Option<NotificationEvent> {
        let frame: WireFrame = match serde_json::from_str(text) {
            Ok(frame) => frame,
            Err(e) => {
                tracing::debug!(error = %e, "Ignoring unparseable channel frame");
                return None;
            }
        };

        match frame.kind.as_str() {
            "notification" => match serde_json::from_value::<NotificationEvent>(frame.data) {
                Ok(event) => Some(event),
                Err(e) => {
                    tracing::debug!(error = %e, "Notification frame with invalid payload");
                    None
                }
            },
            "init" => {
                tracing::debug!(data = %frame.data, "Channel init frame");
                None
            }
            other => {
                tracing::debug!(kind = %other, "Ignoring unknown channel frame type");
                None
            }
        }
    }
}
