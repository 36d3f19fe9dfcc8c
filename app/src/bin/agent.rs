//! Background delivery agent binary — runs without a page context.
//!
//! Simulates the platform waking the agent with a push payload while
//! no page is open: reads the raw payload from argv (or stdin when
//! absent) and renders the resulting notification to the log. With a
//! page open the platform would not invoke this path at all, so the
//! demo always reports zero open windows.

use std::io::Read;

use notify_worker::agent::WindowInfo;
use notify_worker::payload::NormalizedNotification;
use notify_worker::{DeliveryAgent, WorkerError, WorkerPlatform};
use tracing_subscriber::EnvFilter;

/// Log-backed platform with no open browsing contexts.
struct HeadlessPlatform;

impl WorkerPlatform for HeadlessPlatform {
    fn open_windows(&self) -> Vec<WindowInfo> {
        Vec::new()
    }

    fn show_notification(&self, notification: &NormalizedNotification) -> Result<(), WorkerError> {
        tracing::info!(
            title = %notification.title,
            body = %notification.body,
            tag = %notification.tag,
            url = %notification.url,
            "System notification displayed"
        );
        Ok(())
    }

    fn focus_window(&self, id: u64) -> Result<(), WorkerError> {
        tracing::info!(id, "Window focused");
        Ok(())
    }

    fn open_window(&self, url: &str) -> Result<(), WorkerError> {
        tracing::info!(url, "Window opened");
        Ok(())
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let payload = match std::env::args().nth(1) {
        Some(arg) => Some(arg.into_bytes()),
        None => {
            let mut buffer = Vec::new();
            std::io::stdin().read_to_end(&mut buffer)?;
            (!buffer.is_empty()).then_some(buffer)
        }
    };

    let agent = DeliveryAgent::new(HeadlessPlatform);
    agent.on_install();
    agent.on_activate();
    agent.on_push(payload.as_deref());

    Ok(())
}
