//! Real-time channel client.
//!
//! Connects to the notification server's WebSocket endpoint, registers
//! the user identity after every successful connect, and manages
//! automatic reconnection with exponential backoff. Incoming
//! notification events are delivered in arrival order over an mpsc
//! channel.

mod connection;

use std::time::{Duration, Instant};

use tokio::sync::mpsc;

use crate::{NotificationEvent, NotifyError};

const IDLE_TIMEOUT: Duration = Duration::from_secs(60);
const BASE_BACKOFF: Duration = Duration::from_secs(2);
const MAX_BACKOFF: Duration = Duration::from_secs(60);
const FAILURE_RESET_WINDOW: Duration = Duration::from_secs(5 * 60);

/// A lifecycle or payload event observed on the channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelEvent {
    /// The connection is established and `register` has been sent.
    /// The driver reacts by (re)ensuring the push subscription.
    Connected,
    Notification(NotificationEvent),
    Disconnected,
}

/// Channel client configuration.
pub struct ChannelConfig {
    pub ws_url: String,
    pub user_id: String,
}

/// Real-time channel client with auto-reconnect.
///
/// Events are delivered via `mpsc::Receiver<ChannelEvent>`.
pub struct ChannelClient;

impl ChannelClient {
    /// Start the channel loop. Returns an event receiver and shutdown
    /// sender; dropping the receiver or sending on the shutdown sender
    /// tears the connection down.
    pub fn connect(config: ChannelConfig) -> (mpsc::Receiver<ChannelEvent>, mpsc::Sender<()>) {
        let (event_tx, event_rx) = mpsc::channel::<ChannelEvent>(256);
        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>(1);
        tokio::spawn(Self::run_loop(config, event_tx, shutdown_rx));
        (event_rx, shutdown_tx)
    }

    async fn run_loop(
        config: ChannelConfig,
        event_tx: mpsc::Sender<ChannelEvent>,
        mut shutdown_rx: mpsc::Receiver<()>,
    ) {
        let mut failures: u32 = 0;
        let mut last_failure_at: Option<Instant> = None;
        loop {
            if shutdown_rx.try_recv().is_ok() {
                tracing::info!("Channel shutdown requested");
                return;
            }
            if let Some(last_failure) = last_failure_at {
                if last_failure.elapsed() >= FAILURE_RESET_WINDOW {
                    if failures > 0 {
                        tracing::info!(failures, "Channel failures reset after stable interval");
                    }
                    failures = 0;
                    last_failure_at = None;
                }
            }
            match Self::connect_once(&config, &event_tx, &mut shutdown_rx).await {
                Ok(()) => {
                    tracing::info!("Channel connection closed cleanly");
                    return;
                }
                Err(e) => {
                    let _ = event_tx.send(ChannelEvent::Disconnected).await;
                    failures += 1;
                    last_failure_at = Some(Instant::now());
                    let backoff = Self::backoff_duration(failures);
                    tracing::warn!(
                        error = %e, attempt = failures,
                        backoff_secs = backoff.as_secs(),
                        "Channel connection failed, will reconnect"
                    );
                    tokio::select! {
                        _ = shutdown_rx.recv() => {
                            tracing::info!("Channel shutdown requested during reconnect backoff");
                            return;
                        }
                        _ = tokio::time::sleep(backoff) => {}
                    }
                }
            }
        }
    }

    fn backoff_duration(failures: u32) -> Duration {
        let d = BASE_BACKOFF * 2u32.saturating_pow(failures.saturating_sub(1));
        d.min(MAX_BACKOFF)
    }
}
