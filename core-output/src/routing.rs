//! # Routing Strategy
//!
//! Where the graph's final output goes.
//!
//! - **Direct**: the analyser feeds the engine's native destination. The host
//!   opens the default output device for the engine.
//! - **Relayed**: the analyser feeds a synthetic media stream that a managed
//!   playback element plays. The engine never claims an output device, so
//!   other applications sharing the default sink are not disturbed.
//!
//! The playback element is owned here ([`RelayOutput`]) because both the
//! session factory and the device selector create one, and the watchdog
//! and close path operate on it.

use crate::config::RelayConfig;
use crate::error::Result;
use bridge_traits::{AudioEngine, MediaStreamSink, PlaybackElement};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info, warn};

/// Output path chosen at session creation. Immutable afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoutingMode {
    #[default]
    Direct,
    Relayed,
}

impl RoutingMode {
    /// Map the caller's boolean routing preference.
    pub fn from_relayed_flag(relayed: bool) -> Self {
        if relayed {
            RoutingMode::Relayed
        } else {
            RoutingMode::Direct
        }
    }

    pub fn is_relayed(&self) -> bool {
        matches!(self, RoutingMode::Relayed)
    }
}

impl fmt::Display for RoutingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoutingMode::Direct => f.write_str("direct"),
            RoutingMode::Relayed => f.write_str("relayed"),
        }
    }
}

/// Result of asking a playback element to start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartOutcome {
    Started,
    /// The host refused to start playback, usually autoplay policy.
    Blocked(String),
}

/// The optional playback element that relays the synthetic stream.
pub struct RelayOutput {
    mode: RoutingMode,
    config: RelayConfig,
    element: Option<Box<dyn PlaybackElement>>,
}

impl RelayOutput {
    pub fn new(mode: RoutingMode, config: RelayConfig) -> Self {
        Self {
            mode,
            config,
            element: None,
        }
    }

    pub fn mode(&self) -> RoutingMode {
        self.mode
    }

    pub fn element(&self) -> Option<&dyn PlaybackElement> {
        self.element.as_deref()
    }

    pub fn has_element(&self) -> bool {
        self.element.is_some()
    }

    /// Create a playback element bound to `sink`'s stream and try to start
    /// it. A blocked start is logged and left for the watchdog.
    ///
    /// An element that is already attached is kept as is and reported as
    /// started; the watchdog owns restarts.
    pub async fn attach(
        &mut self,
        engine: &dyn AudioEngine,
        sink: &MediaStreamSink,
    ) -> Result<StartOutcome> {
        if self.element.is_some() {
            debug!("Playback element already attached");
            return Ok(StartOutcome::Started);
        }

        let element = engine.create_playback_element(sink.stream)?;
        element.set_volume(self.config.volume);
        element.set_preload(self.config.preload);
        let element = self.element.insert(element);

        let outcome = start(&**element).await;
        match &outcome {
            StartOutcome::Started => info!(routing = %self.mode, "Playback element started"),
            StartOutcome::Blocked(reason) => warn!(
                routing = %self.mode,
                reason = %reason,
                "Playback element start blocked, will retry when audio arrives"
            ),
        }
        Ok(outcome)
    }

    /// Pause and drop the element, if any.
    pub fn stop(&mut self) {
        if let Some(element) = self.element.take() {
            if let Err(err) = element.pause() {
                warn!(error = %err, "Failed to pause playback element");
            }
            debug!("Playback element released");
        }
    }
}

impl fmt::Debug for RelayOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RelayOutput")
            .field("mode", &self.mode)
            .field("config", &self.config)
            .field(
                "element",
                &self.element.as_ref().map(|_| "PlaybackElement { ... }"),
            )
            .finish()
    }
}

/// Try to start `element`, folding a rejection into [`StartOutcome`].
pub(crate) async fn start(element: &dyn PlaybackElement) -> StartOutcome {
    match element.play().await {
        Ok(()) => StartOutcome::Started,
        Err(err) => StartOutcome::Blocked(err.to_string()),
    }
}
