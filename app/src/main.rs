//! Demo application: real-time notifications over a WebSocket channel
//! with a push-subscription fallback for when no page is open.

mod platform;

use std::path::PathBuf;
use std::sync::Arc;

use notify_client::channel::{ChannelClient, ChannelConfig, ChannelEvent};
use notify_client::reconcile::{DeliveryReconciler, DisplayAction, ReconcilerContext};
use notify_client::sound::{SoundGate, SoundPreference};
use notify_client::store::ClientStore;
use notify_client::subscription::{HttpSubscriptionApi, SubscriptionManager};
use notify_client::{NotificationEvent, PermissionState};
use tracing_subscriber::EnvFilter;

use platform::{DemoDisplay, DemoPushPlatform};

/// Determine the data directory for the application.
/// Priority: NOTIFY_DATA_DIR env var > ~/.notify-demo
fn data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("NOTIFY_DATA_DIR") {
        return PathBuf::from(dir);
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".notify-demo")
}

/// Load .env from multiple candidate paths.
fn load_dotenv() {
    let candidates = [".env", "../.env"];
    for path in &candidates {
        if dotenvy::from_filename(path).is_ok() {
            tracing::info!("Loaded .env from: {path}");
            return;
        }
    }
    tracing::info!("No .env file found, using system environment variables");
}

fn server_url() -> String {
    std::env::var("NOTIFY_SERVER_URL").unwrap_or_else(|_| "http://localhost:4001".to_string())
}

fn ws_url(server_url: &str) -> String {
    if let Ok(url) = std::env::var("NOTIFY_WS_URL") {
        return url;
    }
    let ws = server_url
        .replacen("https://", "wss://", 1)
        .replacen("http://", "ws://", 1);
    format!("{}/ws", ws.trim_end_matches('/'))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();
    load_dotenv();

    let dir = data_dir();
    std::fs::create_dir_all(&dir)?;
    let mut store = ClientStore::load(&dir)?;
    let user_id = store.ensure_user_id()?;

    let server_url = server_url();
    let manager = Arc::new(SubscriptionManager::new(HttpSubscriptionApi::new(
        &server_url,
    )?));
    let push_platform = Arc::new(DemoPushPlatform::default());
    let display = DemoDisplay::from_env();

    let mut reconciler = DeliveryReconciler::new();
    let mut gate = SoundGate::from_preference(store.sound_preference());
    let mut permission = display.initial_permission();

    let (mut events, _shutdown) = ChannelClient::connect(ChannelConfig {
        ws_url: ws_url(&server_url),
        user_id: user_id.clone(),
    });
    tracing::info!(server_url = %server_url, user_id = %user_id, "Notification client started");

    while let Some(event) = events.recv().await {
        match event {
            ChannelEvent::Connected => {
                tracing::info!("Connected to server");
                let manager = manager.clone();
                let push_platform = push_platform.clone();
                let user_id = user_id.clone();
                // Fire and forget: a slow or failing resubscription
                // must not delay real-time delivery.
                tokio::spawn(async move {
                    if let Err(e) = manager
                        .ensure_subscribed(push_platform.as_ref(), &user_id)
                        .await
                    {
                        tracing::warn!(
                            error = %e,
                            "Push resubscription failed; real-time channel remains primary"
                        );
                    }
                });
            }
            ChannelEvent::Notification(event) => {
                deliver(
                    event,
                    &mut reconciler,
                    &mut gate,
                    &mut store,
                    &display,
                    &mut permission,
                );
            }
            ChannelEvent::Disconnected => {
                tracing::warn!("Disconnected from server, channel will reconnect");
            }
        }
    }

    Ok(())
}

/// Drive one event through the reconciler, resolving permission and
/// sound prompts as the decision requires.
fn deliver(
    event: NotificationEvent,
    reconciler: &mut DeliveryReconciler,
    gate: &mut SoundGate,
    store: &mut ClientStore,
    display: &DemoDisplay,
    permission: &mut PermissionState,
) {
    let context = ReconcilerContext {
        permission: *permission,
        sound: gate.preference(),
    };
    let mut action = reconciler.on_notification_event(event.clone(), &context);

    loop {
        match action {
            DisplayAction::Record => {
                tracing::debug!(message = %event.message, "Recorded without display");
                return;
            }
            DisplayAction::RequestPermission => {
                *permission = display.request_permission();
                if *permission != PermissionState::Granted {
                    tracing::info!("Permission denied, notification recorded only");
                    return;
                }
                let context = ReconcilerContext {
                    permission: *permission,
                    sound: gate.preference(),
                };
                action = reconciler.redeliver(event.clone(), &context);
            }
            DisplayAction::PromptSound => {
                gate.defer(event.clone());
                let enabled = display.prompt_sound();
                let preference = if enabled {
                    SoundPreference::Enabled
                } else {
                    SoundPreference::Disabled
                };
                if let Err(e) = store.set_sound_preference(preference) {
                    tracing::warn!(error = %e, "Failed to persist sound preference");
                }
                // Deliver everything captured while the prompt was
                // outstanding, in arrival order.
                for held in gate.resolve(enabled) {
                    let context = ReconcilerContext {
                        permission: *permission,
                        sound: gate.preference(),
                    };
                    if let DisplayAction::Show(shown) = reconciler.redeliver(held, &context) {
                        display.show(&shown);
                    }
                }
                return;
            }
            DisplayAction::Show(shown) => {
                display.show(&shown);
                return;
            }
        }
    }
}
