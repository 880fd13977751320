//! Autoplay recovery for the relay element.
//!
//! Hosts may refuse to start a media element before a user gesture. The
//! relay element is started eagerly at creation anyway, and the caller invokes
//! the watchdog whenever a new chunk of audio arrives so playback begins as
//! soon as the host allows it.

use crate::routing::{self, RelayOutput, StartOutcome};
use tracing::{debug, info, warn};

/// What a watchdog check did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchdogOutcome {
    /// Not a relayed session, or no element to check.
    NotApplicable,
    AlreadyPlaying,
    Restarted,
    /// The host refused to start the element again.
    Blocked(String),
}

/// Restart the relay element if it is paused. Never fails.
pub async fn ensure_playing(relay: &RelayOutput) -> WatchdogOutcome {
    if !relay.mode().is_relayed() {
        return WatchdogOutcome::NotApplicable;
    }

    let Some(element) = relay.element() else {
        return WatchdogOutcome::NotApplicable;
    };

    if !element.is_paused() {
        return WatchdogOutcome::AlreadyPlaying;
    }

    debug!("Relay element paused, restarting");
    match routing::start(element).await {
        StartOutcome::Started => {
            info!("Relay element restarted");
            WatchdogOutcome::Restarted
        }
        StartOutcome::Blocked(reason) => {
            warn!(reason = %reason, "Relay element restart blocked");
            WatchdogOutcome::Blocked(reason)
        }
    }
}
